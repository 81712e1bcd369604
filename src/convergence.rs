// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-pixel half of the renderer.  Everything here is a pure
//! function of a starting point and read-only references to a prepared
//! polynomial and a color table, which is what lets the image pass
//! hand whole bands of pixels to separate threads.

use image::Rgb;
use num::{Complex, Zero};

use crate::colors::ColorTable;
use crate::polynomial::Polynomial;

/// Runs Newton-Raphson from `start` for at most the polynomial's
/// iteration limit and returns the point it stopped at.  Iteration
/// stops early only when `f` or `f'` is exactly zero.
pub fn newton(start: Complex<f64>, polynomial: &Polynomial) -> Complex<f64> {
    let mut z = start;
    for _ in 0..polynomial.iteration_limit() {
        let fz = polynomial.evaluate(z);
        if fz.is_zero() {
            break;
        }
        let fpz = polynomial.evaluate_derivative(z);
        if fpz.is_zero() {
            break;
        }
        z = z - fz / fpz;
    }
    z
}

/// Index of the root closest to `z`.  Ties, and points so far away
/// that every distance is NaN, go to the lowest index.
pub fn nearest_root(z: Complex<f64>, roots: &[Complex<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = std::f64::INFINITY;
    for (index, root) in roots.iter().enumerate() {
        let distance = (z - *root).norm_sqr();
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

/// The color of the pixel whose plane coordinate is `start`: the color
/// of whichever root Newton iteration ends up nearest.
#[inline]
pub fn converge(start: Complex<f64>, polynomial: &Polynomial, colors: &ColorTable) -> Rgb<u8> {
    let end = newton(start, polynomial);
    let index = nearest_root(end, polynomial.roots());
    colors.get(index).unwrap_or(Rgb([0, 0, 0]))
}

/// Renders a run of consecutive pixels: `points[i]` is the plane
/// coordinate bound to the cell whose three RGB bytes start at
/// `band[3 * i]`.
pub fn render_band(
    band: &mut [u8],
    points: &[Complex<f64>],
    polynomial: &Polynomial,
    colors: &ColorTable,
) {
    for (cell, point) in band.chunks_exact_mut(3).zip(points) {
        let Rgb(rgb) = converge(*point, polynomial, colors);
        cell.copy_from_slice(&rgb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic() -> (Polynomial, ColorTable) {
        let mut p = Polynomial::new(vec![Complex::new(-1.0, 0.0), Complex::new(1.0, 0.0)], 20)
            .unwrap();
        p.prepare_derivative();
        (p, ColorTable::for_roots(2))
    }

    #[test]
    fn starting_on_a_root_stays_there() {
        let mut p = Polynomial::new(
            vec![
                Complex::new(0.5, 0.5),
                Complex::new(-1.0, 2.0),
                Complex::new(3.0, -1.0),
            ],
            50,
        )
        .unwrap();
        p.prepare_derivative();
        let colors = ColorTable::for_roots(3);
        for (i, root) in p.roots().to_vec().into_iter().enumerate() {
            assert!((newton(root, &p) - root).norm() < 1e-12);
            assert_eq!(converge(root, &p, &colors), colors.get(i).unwrap());
        }
    }

    #[test]
    fn points_near_a_root_converge_to_it() {
        let (p, colors) = quadratic();
        assert_eq!(converge(Complex::new(-1.001, 0.002), &p, &colors), colors.get(0).unwrap());
        assert_eq!(converge(Complex::new(0.999, -0.003), &p, &colors), colors.get(1).unwrap());
    }

    #[test]
    fn half_planes_of_a_real_quadratic() {
        let (p, colors) = quadratic();
        assert_eq!(converge(Complex::new(-0.2, 3.0), &p, &colors), colors.get(0).unwrap());
        assert_eq!(converge(Complex::new(0.2, -3.0), &p, &colors), colors.get(1).unwrap());
        assert!((newton(Complex::new(-5.0, 1.0), &p) - Complex::new(-1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn vanishing_derivative_stops_and_still_colors() {
        // f'(0) = 0 for z^2 - 1: the point never moves and ties go to
        // root 0.
        let (p, colors) = quadratic();
        assert_eq!(newton(Complex::new(0.0, 0.0), &p), Complex::new(0.0, 0.0));
        assert_eq!(converge(Complex::new(0.0, 0.0), &p, &colors), colors.get(0).unwrap());
    }

    #[test]
    fn nearest_root_prefers_lowest_index_on_ties() {
        let roots = [Complex::new(-1.0, 0.0), Complex::new(1.0, 0.0)];
        assert_eq!(nearest_root(Complex::new(0.0, 5.0), &roots), 0);
        assert_eq!(nearest_root(Complex::new(0.1, 0.0), &roots), 1);
        assert_eq!(nearest_root(Complex::new(std::f64::NAN, 0.0), &roots), 0);
    }

    #[test]
    fn basins_do_not_depend_on_how_close_the_roots_are() {
        // A power of two keeps every product and quotient an exact
        // rescaling of the unit-sized computation.
        let shrink = (2.0f64).powi(-43);
        let unit = Polynomial::roots_of_unity(3);
        let mut large = Polynomial::new(unit.clone(), 32).unwrap();
        large.prepare_derivative();
        let mut tiny = Polynomial::new(unit.iter().map(|r| *r * shrink).collect(), 32).unwrap();
        tiny.prepare_derivative();
        for row in 0..30 {
            for column in 0..30 {
                let z = Complex::new(-1.5 + 0.1 * (column as f64), -1.5 + 0.1 * (row as f64));
                let expected = nearest_root(newton(z, &large), large.roots());
                let found = nearest_root(newton(z * shrink, &tiny), tiny.roots());
                assert_eq!(found, expected, "start {}", z);
            }
        }
    }

    #[test]
    fn single_root_colors_everything_the_same() {
        let mut p = Polynomial::new(vec![Complex::new(2.0, -1.0)], 5).unwrap();
        p.prepare_derivative();
        let colors = ColorTable::for_roots(1);
        let mut band = vec![0u8; 3 * 4];
        let points = [
            Complex::new(100.0, 0.0),
            Complex::new(-3.0, 7.0),
            Complex::new(0.0, 0.0),
            Complex::new(2.0, -1.0),
        ];
        render_band(&mut band, &points, &p, &colors);
        let Rgb(expected) = colors.get(0).unwrap();
        for cell in band.chunks(3) {
            assert_eq!(cell, &expected[..]);
        }
    }
}
