//! Contains the PlaneMapper struct, which describes the relationship
//! between the integral plane of an image, with its origin at the
//! left-upper pixel and rows growing downward, and the complex plane,
//! where the imaginary axis grows upward.  The mapping is an affine
//! transform parameterized by a scale and by the complex point that
//! lands on the image's center pixel.
use num::Complex;

use crate::error::{NewtonError, Result};

/// Pixels per unit of the complex plane when the scale is 1.0.  The
/// user-facing scale is a multiplier on this.
pub const SCALE_CORRECTION: f64 = 150.0;

/// The scale a freshly sized image starts at.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the column, row of a pixel cell in an image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// A position on the integral plane that need not sit on a cell
/// corner: pointer positions, or the exact image of a complex point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelPoint(pub f64, pub f64);

impl From<Pixel> for PixelPoint {
    fn from(pixel: Pixel) -> Self {
        PixelPoint(pixel.0 as f64, pixel.1 as f64)
    }
}

/// A 2x3 affine transform on the real plane:
///
/// ```text
/// x' = xx * x + xy * y + tx
/// y' = yx * x + yy * y + ty
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine {
    xx: f64,
    xy: f64,
    yx: f64,
    yy: f64,
    tx: f64,
    ty: f64,
}

impl Affine {
    /// Moves every point by (dx, dy).
    pub fn translation(dx: f64, dy: f64) -> Affine {
        Affine {
            xx: 1.0,
            xy: 0.0,
            yx: 0.0,
            yy: 1.0,
            tx: dx,
            ty: dy,
        }
    }

    /// Stretches each axis independently about the origin.
    pub fn scaling(sx: f64, sy: f64) -> Affine {
        Affine {
            xx: sx,
            xy: 0.0,
            yx: 0.0,
            yy: sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// The transform that applies `self` first and `next` second.
    pub fn then(self, next: Affine) -> Affine {
        Affine {
            xx: next.xx * self.xx + next.xy * self.yx,
            xy: next.xx * self.xy + next.xy * self.yy,
            yx: next.yx * self.xx + next.yy * self.yx,
            yy: next.yx * self.xy + next.yy * self.yy,
            tx: next.xx * self.tx + next.xy * self.ty + next.tx,
            ty: next.yx * self.tx + next.yy * self.ty + next.ty,
        }
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.yx
    }

    /// The reverse map, or None if this map collapses the plane or
    /// the reverse would not be finite.
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let xx = self.yy / det;
        let xy = -self.xy / det;
        let yx = -self.yx / det;
        let yy = self.xx / det;
        let inverse = Affine {
            xx,
            xy,
            yx,
            yy,
            tx: -(xx * self.tx + xy * self.ty),
            ty: -(yx * self.tx + yy * self.ty),
        };
        if inverse.is_finite() {
            Some(inverse)
        } else {
            None
        }
    }

    /// Maps one point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.xx * x + self.xy * y + self.tx,
            self.yx * x + self.yy * y + self.ty,
        )
    }

    fn is_finite(&self) -> bool {
        [self.xx, self.xy, self.yx, self.yy, self.tx, self.ty]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// An axis-aligned rectangle on the complex plane, held as its
/// left-lower corner plus extents so that an epsilon-sized box keeps
/// its size even where the corner coordinates cannot resolve it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneBox {
    /// The corner with the smallest real and imaginary parts.
    pub leftlower: Complex<f64>,
    /// Extent along the real axis.  Never zero.
    pub width: f64,
    /// Extent along the imaginary axis.  Never zero.
    pub height: f64,
}

impl PlaneBox {
    /// The smallest well-formed box containing a single point.
    pub fn around(point: Complex<f64>) -> PlaneBox {
        PlaneBox {
            leftlower: point,
            width: std::f64::EPSILON,
            height: std::f64::EPSILON,
        }
    }

    /// The smallest box containing both `self` and `other`.
    pub fn united(&self, other: &PlaneBox) -> PlaneBox {
        let left = self.leftlower.re.min(other.leftlower.re);
        let lower = self.leftlower.im.min(other.leftlower.im);
        let (mine, theirs) = (self.rightupper(), other.rightupper());
        let right = mine.re.max(theirs.re);
        let upper = mine.im.max(theirs.im);
        PlaneBox {
            leftlower: Complex::new(left, lower),
            width: (right - left).max(self.width).max(other.width),
            height: (upper - lower).max(self.height).max(other.height),
        }
    }

    /// The corner with the largest real and imaginary parts.
    pub fn rightupper(&self) -> Complex<f64> {
        Complex::new(self.leftlower.re + self.width, self.leftlower.im + self.height)
    }

    /// Geometric center of the box.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(
            self.leftlower.re + self.width / 2.0,
            self.leftlower.im + self.height / 2.0,
        )
    }

    /// Height over width.
    pub fn aspect_ratio(&self) -> f64 {
        self.height / self.width
    }
}

/// Maps points between an image's integral plane and the complex
/// plane.
///
/// The forward map (complex to pixel) is built in four steps: flip the
/// imaginary axis so it grows toward the top of the image, translate by
/// (-center.re, +center.im) so that `center` lands on the origin,
/// scale uniformly by `scale * SCALE_CORRECTION`, and translate the
/// origin to the image's center pixel.  The reverse map is the exact
/// inverse of that and is rebuilt together with it.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The right-lower hand corner of the integral cartesian plane.
    /// The left-upper is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    scale: f64,
    center: Complex<f64>,
    to_pixel: Affine,
    to_point: Affine,
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the image, the scale and the
    /// complex point to show at the image's center.
    pub fn new(width: usize, height: usize, scale: f64, center: Complex<f64>) -> Result<Self> {
        let integral_plane = IntegralPlane(width, height);
        let (to_pixel, to_point) = PlaneMapper::build(integral_plane, scale, center)?;
        Ok(PlaneMapper {
            integral_plane,
            scale,
            center,
            to_pixel,
            to_point,
        })
    }

    fn build(plane: IntegralPlane, scale: f64, center: Complex<f64>) -> Result<(Affine, Affine)> {
        let pixels_per_unit = scale * SCALE_CORRECTION;
        let to_pixel = Affine::scaling(1.0, -1.0)
            .then(Affine::translation(-center.re, center.im))
            .then(Affine::scaling(pixels_per_unit, pixels_per_unit))
            .then(Affine::translation(
                (plane.0 / 2) as f64,
                (plane.1 / 2) as f64,
            ));
        match to_pixel.inverse() {
            Some(to_point) => Ok((to_pixel, to_point)),
            None => Err(NewtonError::DegenerateTransform { scale, center }),
        }
    }

    /// Rebuilds both maps around a new scale, keeping the center.
    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        let (to_pixel, to_point) = PlaneMapper::build(self.integral_plane, scale, self.center)?;
        self.scale = scale;
        self.to_pixel = to_pixel;
        self.to_point = to_point;
        Ok(())
    }

    /// Rebuilds both maps around a new center, keeping the scale.  A
    /// non-finite component of `center` keeps the current value for
    /// that axis.
    pub fn set_center(&mut self, center: Complex<f64>) -> Result<()> {
        let center = Complex::new(
            if center.re.is_finite() {
                center.re
            } else {
                self.center.re
            },
            if center.im.is_finite() {
                center.im
            } else {
                self.center.im
            },
        );
        let (to_pixel, to_point) = PlaneMapper::build(self.integral_plane, self.scale, center)?;
        self.center = center;
        self.to_pixel = to_pixel;
        self.to_point = to_point;
        Ok(())
    }

    /// The user-facing scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The complex point shown at the image's center pixel.
    pub fn center(&self) -> Complex<f64> {
        self.center
    }

    /// How many pixels one unit of the complex plane spans.
    pub fn pixels_per_unit(&self) -> f64 {
        self.scale * SCALE_CORRECTION
    }

    /// Number of pixel cells the map covers, one binding each.
    pub fn cell_count(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Given a complex number corresponding to a location on the
    /// complex cartesian plane, find its exact position on the
    /// integral plane.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> PixelPoint {
        let (x, y) = self.to_pixel.apply(point.re, point.im);
        PixelPoint(x, y)
    }

    /// Given a position on the integral cartesian plane, find the
    /// complex number it represents.
    pub fn pixel_to_point(&self, pixel: &PixelPoint) -> Complex<f64> {
        let (re, im) = self.to_point.apply(pixel.0, pixel.1);
        Complex::new(re, im)
    }

    /// Maps a complex number to the linear offset of the cell it falls
    /// in, counted in cells from the start of a row-major buffer.
    /// Points that fall outside the image have no offset.
    pub fn point_to_offset(&self, point: &Complex<f64>) -> Option<usize> {
        let PixelPoint(left, top) = self.point_to_pixel(point);
        if !(left >= 0.0
            && left < (self.integral_plane.0 as f64)
            && top >= 0.0
            && top < (self.integral_plane.1 as f64))
        {
            return None;
        }
        Some((top as usize) * self.integral_plane.0 + (left as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn origin_lands_on_the_center_pixel() {
        let pm = PlaneMapper::new(500, 500, 1.0, Complex::new(0.0, 0.0)).unwrap();
        assert_eq!(
            pm.point_to_pixel(&Complex::new(0.0, 0.0)),
            PixelPoint(250.0, 250.0)
        );
        assert_eq!(pm.pixel_to_point(&Pixel(250, 250).into()), Complex::new(0.0, 0.0));
    }

    #[test]
    fn imaginary_axis_grows_toward_the_top() {
        let pm = PlaneMapper::new(500, 500, 1.0, Complex::new(0.0, 0.0)).unwrap();
        let PixelPoint(x, y) = pm.point_to_pixel(&Complex::new(1.0, 1.0));
        assert!(close(x, 400.0));
        assert!(close(y, 100.0));
    }

    #[test]
    fn center_is_shown_at_the_center_pixel() {
        let mut pm = PlaneMapper::new(400, 300, 2.0, Complex::new(0.0, 0.0)).unwrap();
        pm.set_center(Complex::new(-1.5, 0.75)).unwrap();
        let p = pm.pixel_to_point(&Pixel(200, 150).into());
        assert!(close(p.re, -1.5));
        assert!(close(p.im, 0.75));
    }

    #[test]
    fn round_trips_in_both_directions() {
        let mut pm = PlaneMapper::new(640, 480, 0.37, Complex::new(0.0, 0.0)).unwrap();
        pm.set_center(Complex::new(3.25, -7.5)).unwrap();
        for &(x, y) in &[(0.0, 0.0), (639.0, 479.0), (12.5, 300.25)] {
            let PixelPoint(bx, by) = pm.point_to_pixel(&pm.pixel_to_point(&PixelPoint(x, y)));
            assert!(close(bx, x) && close(by, y));
        }
        for z in &[Complex::new(-2.0, 1.0), Complex::new(10.0, -0.125)] {
            let back = pm.pixel_to_point(&pm.point_to_pixel(z));
            assert!(close(back.re, z.re) && close(back.im, z.im));
        }
    }

    #[test]
    fn non_finite_center_components_keep_their_axis() {
        let mut pm = PlaneMapper::new(100, 100, 1.0, Complex::new(1.0, 2.0)).unwrap();
        pm.set_center(Complex::new(std::f64::NAN, -4.0)).unwrap();
        assert_eq!(pm.center(), Complex::new(1.0, -4.0));
        pm.set_center(Complex::new(5.0, std::f64::INFINITY)).unwrap();
        assert_eq!(pm.center(), Complex::new(5.0, -4.0));
    }

    #[test]
    fn zero_scale_is_degenerate_and_changes_nothing() {
        let mut pm = PlaneMapper::new(100, 100, 1.0, Complex::new(0.0, 0.0)).unwrap();
        let before = pm.point_to_pixel(&Complex::new(0.5, 0.5));
        match pm.set_scale(0.0) {
            Err(NewtonError::DegenerateTransform { scale, .. }) => assert_eq!(scale, 0.0),
            other => panic!("expected a degenerate transform, got {:?}", other),
        }
        assert_eq!(pm.scale(), 1.0);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.5, 0.5)), before);
    }

    #[test]
    fn nan_scale_is_degenerate() {
        assert!(PlaneMapper::new(10, 10, std::f64::NAN, Complex::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn offsets_stay_inside_the_image() {
        let pm = PlaneMapper::new(10, 10, 1.0, Complex::new(0.0, 0.0)).unwrap();
        assert_eq!(pm.point_to_offset(&Complex::new(0.0, 0.0)), Some(55));
        assert_eq!(pm.point_to_offset(&Complex::new(1.0, 0.0)), None);
        assert_eq!(pm.point_to_offset(&Complex::new(0.0, -1.0)), None);
        assert_eq!(pm.cell_count(), 100);
    }

    #[test]
    fn inverse_undoes_composition() {
        let a = Affine::scaling(2.0, -3.0).then(Affine::translation(5.0, 1.0));
        let inv = a.inverse().unwrap();
        let (x, y) = a.apply(0.25, -4.0);
        let (bx, by) = inv.apply(x, y);
        assert!(close(bx, 0.25) && close(by, -4.0));
        assert!(Affine::scaling(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn planebox_union_and_center() {
        let a = PlaneBox::around(Complex::new(-2.0, -1.0));
        let b = PlaneBox::around(Complex::new(2.0, 1.0));
        let u = a.united(&b);
        assert!(close(u.width, 4.0));
        assert!(close(u.height, 2.0));
        assert!(close(u.center().re, 0.0) && close(u.center().im, 0.0));
        assert!(close(u.rightupper().re, 2.0));
    }

    #[test]
    fn planebox_of_one_point_is_not_degenerate() {
        let b = PlaneBox::around(Complex::new(2.0, 3.0));
        let u = b.united(&PlaneBox::around(Complex::new(2.0, 3.0)));
        assert!(u.width > 0.0 && u.height > 0.0);
        assert!(close(u.center().re, 2.0) && close(u.center().im, 3.0));
    }
}
