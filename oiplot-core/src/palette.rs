use crate::range::Range;
use serde::{Deserialize, Serialize};

/// Wavelength spans narrower than this (0.1 nm) are treated as a single colour.
pub const LAMBDA_EPSILON: f64 = 1e-10;

const WAVELENGTH_ALPHA: u8 = 204; // 0.8
const RAINBOW_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

const CATEGORY_COLORS: [Rgba; 10] = [
    Rgba::rgb(86, 156, 214),
    Rgba::rgb(220, 122, 95),
    Rgba::rgb(181, 206, 168),
    Rgba::rgb(197, 134, 192),
    Rgba::rgb(220, 220, 170),
    Rgba::rgb(156, 220, 254),
    Rgba::rgb(255, 204, 102),
    Rgba::rgb(206, 145, 120),
    Rgba::rgb(78, 201, 176),
    Rgba::rgb(214, 157, 133),
];

/// Colour of the category at position `idx` of the plot-wide distinct list.
pub fn category_color(idx: usize) -> Rgba {
    CATEGORY_COLORS[idx % CATEGORY_COLORS.len()]
}

/// Rainbow entry `idx` of 256: 0 is red, 255 is violet.
pub fn rainbow_color(idx: usize) -> Rgba {
    let t = idx.min(RAINBOW_SIZE - 1) as f64 / (RAINBOW_SIZE - 1) as f64;
    let color = colorous::SPECTRAL.eval_continuous(t);
    Rgba::rgb(color.r, color.g, color.b)
}

/// Per-channel colours for wavelength colour mapping.
///
/// Short wavelengths map to violet, long ones to red. All channels are black
/// when wavelengths are unused, unknown, or the global span is too narrow.
pub fn wavelength_colors(
    effective_wavelengths: &[f64],
    n_channels: usize,
    use_wavelengths: bool,
    global_range: Option<Range>,
) -> Vec<Rgba> {
    let range = match global_range {
        Some(range)
            if use_wavelengths
                && range.length() > LAMBDA_EPSILON
                && !effective_wavelengths.is_empty() =>
        {
            range
        }
        _ => return vec![Rgba::BLACK; n_channels],
    };
    let span = range.length();
    let max_idx = (RAINBOW_SIZE - 1) as f64;
    (0..n_channels)
        .map(|ch| {
            let Some(wl) = effective_wavelengths.get(ch).copied() else {
                return Rgba::BLACK;
            };
            let value = max_idx * (1.0 - (wl - range.min) / span);
            rainbow_color(value.round().clamp(0.0, max_idx) as usize).with_alpha(WAVELENGTH_ALPHA)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_palette_cycles() {
        assert_eq!(category_color(0), category_color(10));
        assert_ne!(category_color(0), category_color(1));
    }

    #[test]
    fn rainbow_runs_from_red_to_violet() {
        let red = rainbow_color(0);
        assert!(red.r > red.g && red.r > red.b);
        let violet = rainbow_color(255);
        assert!(violet.b > violet.r && violet.b > violet.g);
        assert_ne!(rainbow_color(128), red);
        assert_eq!(rainbow_color(300), violet);
    }

    #[test]
    fn wavelength_colors_span_spectrum() {
        let range = Some(Range::new(1.0e-6, 2.0e-6));
        let colors = wavelength_colors(&[1.0e-6, 2.0e-6], 2, true, range);
        assert_eq!(colors[0], rainbow_color(255).with_alpha(WAVELENGTH_ALPHA));
        assert_eq!(colors[1], rainbow_color(0).with_alpha(WAVELENGTH_ALPHA));
    }

    #[test]
    fn wavelength_colors_fall_back_to_black() {
        let narrow = Some(Range::new(1.0e-6, 1.0e-6));
        assert_eq!(wavelength_colors(&[1.0e-6], 1, true, narrow), vec![Rgba::BLACK]);
        let range = Some(Range::new(1.0e-6, 2.0e-6));
        assert_eq!(
            wavelength_colors(&[1.0e-6, 2.0e-6], 1, false, range),
            vec![Rgba::BLACK]
        );
    }
}
