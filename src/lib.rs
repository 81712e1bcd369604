#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Newton fractal renderer
//!
//! Newton's method finds a root of a polynomial by starting from a
//! guess and repeatedly sliding down the tangent line: `z <- z -
//! f(z)/f'(z)`.  Which root it lands on depends, in a wildly
//! intricate way, on where it started.  Coloring every point of the
//! complex plane by the root its iteration ends nearest to gives the
//! Newton fractal: smooth basins around each root, separated by
//! boundaries where every basin meets every other.
//!
//! The polynomial here is described by its roots rather than by its
//! coefficients, so that the roots can be dragged around and the
//! fractal re-rendered as they move.  A `FractalImage` owns the pixel
//! buffer, the map from pixels to the plane, the polynomial and its
//! colors, and paints the buffer in parallel when asked to.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod colors;
pub mod convergence;
pub mod error;
pub mod fractal;
pub mod planes;
pub mod polynomial;

pub use colors::ColorTable;
pub use error::{NewtonError, Result};
pub use fractal::{FractalConfig, FractalImage};
pub use planes::{Pixel, PixelPoint, PlaneBox, PlaneMapper};
pub use polynomial::Polynomial;
