//! Rank → color assignment policies.

use std::str::FromStr;

use image::Rgba;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::HeatfallError;

/// Default overlay opacity; cells stay readable over a base map.
pub const DEFAULT_FILL_ALPHA: u8 = 160;

/// Curated qualitative palette for the Distinct scheme, strong hues first,
/// their lighter companions after. Cycled into hue spacing past 20 levels.
static DISTINCT_PALETTE: Lazy<Vec<[u8; 3]>> = Lazy::new(|| {
    const HEX: [u32; 20] = [
        0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2,
        0x7f7f7f, 0xbcbd22, 0x17becf, 0xaec7e8, 0xffbb78, 0x98df8a, 0xff9896,
        0xc5b0d5, 0xc49c94, 0xf7b6d2, 0xc7c7c7, 0xdbdb8d, 0x9edae5,
    ];
    HEX.iter()
        .map(|&rgb| [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8])
        .collect()
});

/// How density ranks map to colors.
///
/// Distinct and Wheel are pure functions of the level count; Random without
/// a seed is the one sanctioned non-deterministic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    /// Curated, well-separated colors per rank.
    Distinct,
    /// Pseudo-random colors; reproducible when a seed is supplied.
    Random { seed: Option<u64> },
    /// Smooth hue gradient from rank 0 (red) around the color wheel.
    Wheel,
}

impl FromStr for ColorScheme {
    type Err = HeatfallError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "distinct" => Ok(ColorScheme::Distinct),
            "random" => Ok(ColorScheme::Random { seed: None }),
            "wheel" => Ok(ColorScheme::Wheel),
            other => Err(HeatfallError::InvalidScheme(other.to_string())),
        }
    }
}

impl ColorScheme {
    /// One color per density rank, index 0 = lowest rank, each carrying the
    /// uniform `alpha` in its alpha channel.
    pub fn ramp(&self, levels: usize, alpha: u8) -> Vec<Rgba<u8>> {
        let rgb: Vec<[u8; 3]> = match *self {
            ColorScheme::Distinct => distinct_ramp(levels),
            ColorScheme::Random { seed } => random_ramp(levels, seed),
            ColorScheme::Wheel => wheel_ramp(levels),
        };
        rgb.into_iter()
            .map(|[r, g, b]| Rgba([r, g, b, alpha]))
            .collect()
    }
}

fn distinct_ramp(levels: usize) -> Vec<[u8; 3]> {
    if levels <= DISTINCT_PALETTE.len() {
        return DISTINCT_PALETTE[..levels].to_vec();
    }
    // Past the curated palette: evenly spaced hues, alternating value bands
    // so neighbors in rank still separate visually.
    (0..levels)
        .map(|i| {
            let hue = 360.0 * i as f64 / levels as f64;
            let value = if i % 2 == 0 { 0.95 } else { 0.70 };
            hsv_to_rgb(hue, 0.85, value)
        })
        .collect()
}

fn random_ramp(levels: usize, seed: Option<u64>) -> Vec<[u8; 3]> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    // Channels sampled away from full black so cells never vanish into a
    // dark base map.
    (0..levels)
        .map(|_| {
            [
                rng.random_range(50..255),
                rng.random_range(50..255),
                rng.random_range(50..255),
            ]
        })
        .collect()
}

fn wheel_ramp(levels: usize) -> Vec<[u8; 3]> {
    (0..levels)
        .map(|i| hsv_to_rgb(360.0 * i as f64 / levels as f64, 0.85, 0.95))
        .collect()
}

/// HSV to RGB, hue in degrees, saturation/value in [0, 1].
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let chroma = value * saturation;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let m = value - chroma;
    [
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    ]
}
