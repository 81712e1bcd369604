//! One color per root, evenly spaced around the hue wheel.

use image::Rgb;

/// Saturation shared by every root color, out of 255.
pub const ROOT_SATURATION: u8 = 150;

/// Value (brightness) shared by every root color, out of 255.
pub const ROOT_VALUE: u8 = 200;

/// The colors pixels are painted with, indexed by root.  Color identity
/// follows the root's index, not its position, so moving a root keeps
/// its color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    colors: Vec<Rgb<u8>>,
}

impl ColorTable {
    /// Builds a table for `count` roots: root `i` gets hue
    /// `i * 360 / count` degrees.
    pub fn for_roots(count: usize) -> ColorTable {
        let step = 360.0 / (count.max(1) as f64);
        let s = f64::from(ROOT_SATURATION) / 255.0;
        let v = f64::from(ROOT_VALUE) / 255.0;
        ColorTable {
            colors: (0..count)
                .map(|i| hsv_to_rgb((i as f64) * step, s, v))
                .collect(),
        }
    }

    /// The color of root `index`.
    pub fn get(&self, index: usize) -> Option<Rgb<u8>> {
        self.colors.get(index).cloned()
    }

    /// Number of colors, which matches the number of roots.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True for a table with no colors.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// All colors, in root order.
    pub fn as_slice(&self) -> &[Rgb<u8>] {
        &self.colors
    }
}

/// Converts hue in degrees, saturation and value in [0, 1] to RGB.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb<u8> {
    let h = hue.rem_euclid(360.0) / 60.0;
    let chroma = value * saturation;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let channel = |c: f64| ((c + m) * 255.0).round() as u8;
    Rgb([channel(r), channel(g), channel(b)])
}
