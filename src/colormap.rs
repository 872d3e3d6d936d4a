//! Sequential colour palettes sampled over `t` in `[0, 1]`.
//!
//! Stops are evenly spaced and interpolated linearly in sRGB, clamped at
//! both ends.

/// sRGB 8-bit triplet
pub type Rgb = [u8; 3];

/// Fill for countries with no recorded incidents
pub const NEUTRAL: Rgb = [0xf0, 0xf0, 0xf0];

/// Continuous palette with evenly spaced stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub stops: &'static [Rgb],
}

/// ColorBrewer "Greens", 9 classes
pub const GREENS: Palette = Palette {
    stops: &[
        [0xf7, 0xfc, 0xf5],
        [0xe5, 0xf5, 0xe0],
        [0xc7, 0xe9, 0xc0],
        [0xa1, 0xd9, 0x9b],
        [0x74, 0xc4, 0x76],
        [0x41, 0xab, 0x5d],
        [0x23, 0x8b, 0x45],
        [0x00, 0x6d, 0x2c],
        [0x00, 0x44, 0x1b],
    ],
};

/// Viridis, sampled at 9 evenly spaced points
pub const VIRIDIS: Palette = Palette {
    stops: &[
        [0x44, 0x01, 0x54],
        [0x47, 0x2d, 0x7b],
        [0x3b, 0x52, 0x8b],
        [0x2c, 0x72, 0x8e],
        [0x21, 0x91, 0x8c],
        [0x28, 0xae, 0x80],
        [0x5e, 0xc9, 0x62],
        [0xad, 0xdc, 0x30],
        [0xfd, 0xe7, 0x25],
    ],
};

impl Palette {
    /// Sample the palette at `t` (clamped to `[0, 1]`; NaN maps to the first stop)
    pub fn sample(&self, t: f64) -> Rgb {
        let n = self.stops.len();
        if n == 0 {
            return NEUTRAL;
        }
        if n == 1 || !(t > 0.0) {
            return self.stops[0];
        }
        if t >= 1.0 {
            return self.stops[n - 1];
        }

        let pos = t * (n - 1) as f64;
        let i = (pos.floor() as usize).min(n - 2);
        lerp_rgb(self.stops[i], self.stops[i + 1], pos - i as f64)
    }
}

/// Linear interpolation between two colours
pub fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Perceived brightness, used to pick readable text over a fill
pub fn luminance(c: Rgb) -> f64 {
    (0.2126 * c[0] as f64 + 0.7152 * c[1] as f64 + 0.0722 * c[2] as f64) / 255.0
}

/// Blend toward white; stands in for reduced opacity on a light background
pub fn fade(c: Rgb, amount: f64) -> Rgb {
    lerp_rgb(c, [0xff, 0xff, 0xff], amount)
}
