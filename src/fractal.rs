// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fractal image: a pixel buffer together with everything needed
//! to fill it.  Mutators change the map, the roots or the limits;
//! `recompute` repaints the whole buffer.  Nothing here repaints on
//! its own, so a caller can batch several changes into one pass.

use image::{Rgb, RgbImage};
use itertools::iproduct;
use log::{debug, info, trace};
use num::Complex;
use std::f64::consts::PI;
use std::time::Instant;

use crate::colors::ColorTable;
use crate::convergence::render_band;
use crate::error::{invalid, NewtonError, Result};
use crate::planes::{Pixel, PixelPoint, PlaneBox, PlaneMapper, DEFAULT_SCALE, SCALE_CORRECTION};
use crate::polynomial::{Polynomial, DEFAULT_ITERATIONS};

/// Width and height of an image built from the default configuration.
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (500, 500);

/// How close, in plane units, a pointer has to be to a root to pick
/// it up.  Also the radius of the rings drawn by `mark_roots`.
pub const ROOT_PICK_RADIUS: f64 = 0.1;

/// Everything a fractal image starts out with.
#[derive(Debug, Clone)]
pub struct FractalConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Zoom, as a multiplier on `SCALE_CORRECTION` pixels per plane unit.
    pub scale: f64,
    /// The plane point shown at the image's center pixel.
    pub center: Complex<f64>,
    /// Initial roots.  Must not be empty.
    pub roots: Vec<Complex<f64>>,
    /// Newton steps allowed per pixel.
    pub iteration_limit: usize,
    /// Number of render threads.
    pub threads: usize,
}

impl Default for FractalConfig {
    fn default() -> Self {
        FractalConfig {
            width: DEFAULT_IMAGE_SIZE.0,
            height: DEFAULT_IMAGE_SIZE.1,
            scale: DEFAULT_SCALE,
            center: Complex::new(0.0, 0.0),
            roots: Polynomial::roots_of_unity(3),
            iteration_limit: DEFAULT_ITERATIONS,
            threads: num_cpus::get(),
        }
    }
}

/// A Newton fractal and the buffer it is rendered into.
///
/// Each pixel is bound to the plane coordinate it represents.  The
/// bindings depend only on the plane map, so they are regenerated when
/// the scale, center or size changes and left alone when roots move.
pub struct FractalImage {
    image: RgbImage,
    plane: PlaneMapper,
    polynomial: Polynomial,
    colors: ColorTable,
    bindings: Vec<Complex<f64>>,
    threads: usize,
}

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(invalid(format!(
            "image size {}x{} has no pixels",
            width, height
        )));
    }
    Ok(())
}

fn check_threads(threads: usize) -> Result<()> {
    if threads == 0 {
        return Err(invalid("at least one render thread is needed"));
    }
    Ok(())
}

impl FractalImage {
    /// Builds the image described by `config`.  The buffer starts out
    /// black; call `recompute` to paint it.
    pub fn new(config: FractalConfig) -> Result<Self> {
        check_size(config.width, config.height)?;
        check_threads(config.threads)?;
        let polynomial = Polynomial::new(config.roots, config.iteration_limit)?;
        let plane = PlaneMapper::new(
            config.width as usize,
            config.height as usize,
            config.scale,
            config.center,
        )?;
        let colors = ColorTable::for_roots(polynomial.degree());
        let mut fractal = FractalImage {
            image: RgbImage::new(config.width, config.height),
            plane,
            polynomial,
            colors,
            bindings: Vec::new(),
            threads: config.threads,
        };
        fractal.generate_bindings();
        Ok(fractal)
    }

    /// Reallocates the buffer at a new size.  The scale goes back to
    /// its default and the origin goes back to the center.
    pub fn set_image_size(&mut self, width: u32, height: u32) -> Result<()> {
        check_size(width, height)?;
        self.plane = PlaneMapper::new(
            width as usize,
            height as usize,
            DEFAULT_SCALE,
            Complex::new(0.0, 0.0),
        )?;
        self.image = RgbImage::new(width, height);
        info!("image resized to {}x{}", width, height);
        self.generate_bindings();
        Ok(())
    }

    /// Zooms around the current center.
    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        self.plane.set_scale(scale)?;
        self.generate_bindings();
        Ok(())
    }

    /// Pans so that `center` sits on the image's center pixel.  A
    /// non-finite component leaves that axis where it was.
    pub fn set_center(&mut self, center: Complex<f64>) -> Result<()> {
        self.plane.set_center(center)?;
        self.generate_bindings();
        Ok(())
    }

    /// Pans along the real axis only.
    pub fn set_center_real(&mut self, re: f64) -> Result<()> {
        self.set_center(Complex::new(re, std::f64::NAN))
    }

    /// Pans along the imaginary axis only.
    pub fn set_center_imag(&mut self, im: f64) -> Result<()> {
        self.set_center(Complex::new(std::f64::NAN, im))
    }

    /// Changes the degree of the polynomial and rebuilds the color table
    /// for the new number of roots.
    pub fn set_root_count(&mut self, count: usize) -> Result<()> {
        self.polynomial.set_root_count(count)?;
        self.regenerate_colors();
        info!("polynomial now has {} roots", count);
        Ok(())
    }

    /// Changes how many Newton steps each pixel is allowed.
    pub fn set_iteration_limit(&mut self, limit: usize) -> Result<()> {
        self.polynomial.set_iteration_limit(limit)
    }

    /// Changes how many threads `recompute` spreads its rows over.
    pub fn set_threads(&mut self, threads: usize) -> Result<()> {
        check_threads(threads)?;
        self.threads = threads;
        Ok(())
    }

    /// Moves one root.  Colors and bindings stay as they are; the
    /// caller decides when to `recompute`.
    pub fn move_root(&mut self, index: usize, position: Complex<f64>) -> Result<()> {
        self.polynomial.set_root(index, position)
    }

    /// Rebuilds the color table from the current number of roots.
    pub fn regenerate_colors(&mut self) {
        self.colors = ColorTable::for_roots(self.polynomial.degree());
    }

    /// Binds every pixel, in row-major order, to the plane coordinate
    /// it represents under the current map.
    fn generate_bindings(&mut self) {
        let plane = &self.plane;
        let (width, height) = (plane.integral_plane.0, plane.integral_plane.1);
        let mut bindings = Vec::with_capacity(plane.cell_count());
        bindings.extend(
            iproduct!(0..height, 0..width)
                .map(|(row, column)| plane.pixel_to_point(&Pixel(column, row).into())),
        );
        self.bindings = bindings;
        trace!(
            "bound {} pixels at scale {} around {}",
            self.bindings.len(),
            plane.scale(),
            plane.center()
        );
    }

    /// Repaints every pixel.  The coefficients are expanded once, up
    /// front; the rows are then split into one contiguous band per
    /// thread, and the call returns once every band is done.
    pub fn recompute(&mut self) -> Result<()> {
        let started = Instant::now();
        self.polynomial.prepare_derivative();
        let prepared = started.elapsed();

        let width = self.image.width() as usize;
        let height = self.image.height() as usize;
        let threads = self.threads.min(height);
        let band_cells = ((height + threads - 1) / threads) * width;

        let polynomial = &self.polynomial;
        let colors = &self.colors;
        let bindings = &self.bindings;
        let buffer: &mut [u8] = &mut self.image;
        crossbeam::scope(|spawner| {
            for (band, points) in buffer
                .chunks_mut(band_cells * 3)
                .zip(bindings.chunks(band_cells))
            {
                spawner.spawn(move |_| render_band(band, points, polynomial, colors));
            }
        })
        .map_err(|_| NewtonError::WorkerPanicked)?;

        debug!(
            "recomputed {}x{} on {} threads: prepare {:?}, total {:?}",
            width,
            height,
            threads,
            prepared,
            started.elapsed()
        );
        Ok(())
    }

    /// The rendered pixels.
    pub fn pixels(&self) -> &RgbImage {
        &self.image
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The roots, in index order.
    pub fn roots(&self) -> &[Complex<f64>] {
        self.polynomial.roots()
    }

    /// Newton steps allowed per pixel.
    pub fn iteration_limit(&self) -> usize {
        self.polynomial.iteration_limit()
    }

    /// The plane point at the image's center pixel.
    pub fn center(&self) -> Complex<f64> {
        self.plane.center()
    }

    /// The current zoom.
    pub fn scale(&self) -> f64 {
        self.plane.scale()
    }

    /// The color painted for each root.
    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    /// The plane coordinate bound to each pixel, row-major.
    pub fn bindings(&self) -> &[Complex<f64>] {
        &self.bindings
    }

    /// The plane point under a pixel position.
    pub fn to_plane(&self, pixel: &PixelPoint) -> Complex<f64> {
        self.plane.pixel_to_point(pixel)
    }

    /// The pixel position of a plane point.
    pub fn to_pixel(&self, point: &Complex<f64>) -> PixelPoint {
        self.plane.point_to_pixel(point)
    }

    /// The smallest box holding every root.  A lone root still gets a
    /// box of epsilon extents.
    pub fn root_bounding_box(&self) -> PlaneBox {
        let roots = self.polynomial.roots();
        roots[1..]
            .iter()
            .fold(PlaneBox::around(roots[0]), |bounds, root| {
                bounds.united(&PlaneBox::around(*root))
            })
    }

    /// The scale at which `bounds` just fits a viewport of the given
    /// width and height without distorting it.  Whichever axis needs
    /// the smaller zoom binds.
    pub fn fit_scale_for(bounds: &PlaneBox, viewport: (f64, f64)) -> f64 {
        let (viewport_width, viewport_height) = viewport;
        let pixels_per_unit = if bounds.aspect_ratio() < viewport_height / viewport_width {
            viewport_width / bounds.width
        } else {
            viewport_height / bounds.height
        };
        pixels_per_unit / SCALE_CORRECTION
    }

    /// The center to pass to `set_center` so that `bounds` is centered
    /// in the image.  The map already folds the flip of the imaginary
    /// axis and the negation of the real translation into its build, so
    /// this is the box's own midpoint.
    pub fn center_of(bounds: &PlaneBox) -> Complex<f64> {
        bounds.center()
    }

    /// Zooms and pans so that every root is in view.  The map is only
    /// replaced once both the new scale and center are known to work.
    pub fn fit_to_roots(&mut self) -> Result<()> {
        let bounds = self.root_bounding_box();
        let (width, height) = (self.plane.integral_plane.0, self.plane.integral_plane.1);
        let scale = FractalImage::fit_scale_for(&bounds, (width as f64, height as f64));
        self.plane = PlaneMapper::new(width, height, scale, FractalImage::center_of(&bounds))?;
        self.generate_bindings();
        Ok(())
    }

    /// The first root within `radius` plane units of the plane point
    /// under `pixel`, if any.
    pub fn pick_root(&self, pixel: &PixelPoint, radius: f64) -> Option<usize> {
        let point = self.to_plane(pixel);
        self.polynomial
            .roots()
            .iter()
            .position(|root| (*root - point).norm() < radius)
    }

    /// Draws a ring of radius `ROOT_PICK_RADIUS` around every root into
    /// the buffer.  The next `recompute` paints over them.
    pub fn mark_roots(&mut self, color: Rgb<u8>) {
        let width = self.image.width() as usize;
        let ring = ROOT_PICK_RADIUS * self.plane.pixels_per_unit();
        let most = 4 * (self.image.width() + self.image.height()) as usize;
        let steps = ((4.0 * PI * ring).ceil() as usize).max(32).min(most);
        for root in self.polynomial.roots() {
            for step in 0..steps {
                let angle = 2.0 * PI * (step as f64) / (steps as f64);
                let point = *root + Complex::from_polar(&ROOT_PICK_RADIUS, &angle);
                if let Some(offset) = self.plane.point_to_offset(&point) {
                    self.image
                        .put_pixel((offset % width) as u32, (offset / width) as u32, color);
                }
            }
        }
    }
}
