// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The polynomial whose Newton fractal is being drawn.
//!
//! The polynomial is described by its roots: `f(z) = (z - r0)(z - r1)...`.
//! Newton iteration needs `f` and `f'` in coefficient form, so the
//! coefficients of both are expanded from the roots by
//! `prepare_derivative` and cached.  Any change to the roots marks the
//! cache stale, and evaluation refuses to run on a stale cache.

use num::{Complex, Zero};
use std::f64::consts::PI;

use crate::error::{invalid, NewtonError, Result};

/// Iteration limit used when nothing else is asked for.
pub const DEFAULT_ITERATIONS: usize = 32;

/// Irrational turn used to walk a candidate root position around the
/// unit circle until it no longer collides with an existing root.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// A monic polynomial held as an ordered list of roots, plus the
/// number of Newton steps each pixel is allowed.
#[derive(Debug, Clone)]
pub struct Polynomial {
    roots: Vec<Complex<f64>>,
    iteration_limit: usize,
    // Ascending powers: coefficients[k] multiplies z^k.
    coefficients: Vec<Complex<f64>>,
    derivative: Vec<Complex<f64>>,
    prepared: bool,
}

impl Polynomial {
    /// Builds a polynomial from at least one root and a positive
    /// iteration limit.
    pub fn new(roots: Vec<Complex<f64>>, iteration_limit: usize) -> Result<Self> {
        if roots.is_empty() {
            return Err(invalid("a polynomial needs at least one root"));
        }
        if iteration_limit < 1 {
            return Err(invalid("the iteration limit must be at least 1"));
        }
        Ok(Polynomial {
            roots,
            iteration_limit,
            coefficients: Vec::new(),
            derivative: Vec::new(),
            prepared: false,
        })
    }

    /// The `count` roots of unity, starting at 1 and going
    /// counterclockwise.
    pub fn roots_of_unity(count: usize) -> Vec<Complex<f64>> {
        (0..count)
            .map(|k| Complex::from_polar(&1.0, &(2.0 * PI * (k as f64) / (count as f64))))
            .collect()
    }

    /// The roots, in index order.
    pub fn roots(&self) -> &[Complex<f64>] {
        &self.roots
    }

    /// Mutable access to the roots.  Invalidates the coefficient cache.
    pub fn roots_mut(&mut self) -> &mut [Complex<f64>] {
        self.prepared = false;
        &mut self.roots
    }

    /// The number of roots, which is also the degree.
    pub fn degree(&self) -> usize {
        self.roots.len()
    }

    /// Maximum Newton steps per pixel.
    pub fn iteration_limit(&self) -> usize {
        self.iteration_limit
    }

    /// Moves one root.
    pub fn set_root(&mut self, index: usize, position: Complex<f64>) -> Result<()> {
        let count = self.roots.len();
        match self.roots.get_mut(index) {
            Some(root) => {
                *root = position;
                self.prepared = false;
                Ok(())
            }
            None => Err(NewtonError::RootOutOfRange { index, count }),
        }
    }

    /// Grows or shrinks the root list to `count` roots.  Shrinking
    /// drops roots from the end.  Growing appends roots on the unit
    /// circle, each at a position no other root holds.
    pub fn set_root_count(&mut self, count: usize) -> Result<()> {
        if count < 1 {
            return Err(invalid("the root count must be at least 1"));
        }
        self.roots.truncate(count);
        while self.roots.len() < count {
            let position = self.fresh_root_position(self.roots.len(), count);
            self.roots.push(position);
        }
        self.prepared = false;
        Ok(())
    }

    fn fresh_root_position(&self, index: usize, count: usize) -> Complex<f64> {
        let mut angle = 2.0 * PI * (index as f64) / (count as f64);
        let mut candidate = Complex::from_polar(&1.0, &angle);
        while self.roots.contains(&candidate) {
            angle += GOLDEN_ANGLE;
            candidate = Complex::from_polar(&1.0, &angle);
        }
        candidate
    }

    /// Changes how many Newton steps each pixel is allowed.
    pub fn set_iteration_limit(&mut self, limit: usize) -> Result<()> {
        if limit < 1 {
            return Err(invalid("the iteration limit must be at least 1"));
        }
        self.iteration_limit = limit;
        Ok(())
    }

    /// Expands the coefficients of `f` from the roots, and from them
    /// the coefficients of `f'`.  Must run after the last root change
    /// and before any evaluation.
    pub fn prepare_derivative(&mut self) {
        let mut coefficients = vec![Complex::new(1.0, 0.0)];
        for root in &self.roots {
            // Multiply the running product by (z - root).
            let mut next = vec![Complex::zero(); coefficients.len() + 1];
            for (k, c) in coefficients.iter().enumerate() {
                next[k + 1] += *c;
                next[k] -= *c * *root;
            }
            coefficients = next;
        }
        self.derivative = coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| *c * (k as f64))
            .collect();
        self.coefficients = coefficients;
        self.prepared = true;
    }

    /// Whether the cached coefficients match the current roots.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Coefficients of `f`, lowest power first.
    ///
    /// # Panics
    ///
    /// If the roots changed since the last `prepare_derivative`.
    pub fn coefficients(&self) -> &[Complex<f64>] {
        assert!(self.prepared, "coefficients read before prepare_derivative");
        &self.coefficients
    }

    /// Coefficients of `f'`, lowest power first.  Panics like
    /// `coefficients`.
    pub fn derivative_coefficients(&self) -> &[Complex<f64>] {
        assert!(self.prepared, "coefficients read before prepare_derivative");
        &self.derivative
    }

    /// f(z).  Panics on a stale cache, in release builds too.
    #[inline]
    pub fn evaluate(&self, z: Complex<f64>) -> Complex<f64> {
        horner(self.coefficients(), z)
    }

    /// f'(z).  Panics on a stale cache.
    #[inline]
    pub fn evaluate_derivative(&self, z: Complex<f64>) -> Complex<f64> {
        horner(self.derivative_coefficients(), z)
    }
}

impl Default for Polynomial {
    /// The cube roots of unity, which give the classic three-armed
    /// Newton fractal.
    fn default() -> Self {
        Polynomial {
            roots: Polynomial::roots_of_unity(3),
            iteration_limit: DEFAULT_ITERATIONS,
            coefficients: Vec::new(),
            derivative: Vec::new(),
            prepared: false,
        }
    }
}

#[inline]
fn horner(coefficients: &[Complex<f64>], z: Complex<f64>) -> Complex<f64> {
    coefficients
        .iter()
        .rev()
        .fold(Complex::zero(), |acc, c| acc * z + *c)
}
