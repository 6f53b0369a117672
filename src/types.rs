use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;
use crate::scheme::Palette;

#[derive(Debug)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    /// Where the palette came from: a scheme name, or `custom` for `--colors`.
    pub colorscheme: String,
    pub palette: Palette,
    pub metric: Metric,
    pub dither: DitherMode,
    pub dither_amount: f32,
    pub timing: bool,
    pub quiet: bool,
}

/// Distance used to pick the closest palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Squared Euclidean distance between sRGB triples.
    #[default]
    Rgb,
    /// CIEDE2000 difference in L*a*b*.
    Ciede2000,
}

impl FromStr for Metric {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" | "euclidean" => Ok(Metric::Rgb),
            "ciede2000" | "lab" => Ok(Metric::Ciede2000),
            _ => Err(AppError::InvalidSetting {
                key: "metric",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Rgb => f.write_str("rgb"),
            Metric::Ciede2000 => f.write_str("ciede2000"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherMode {
    #[default]
    None,
    FloydSteinberg,
    /// Random jitter before the lookup, scaled by the dither amount.
    Noise,
}

impl FromStr for DitherMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(DitherMode::None),
            "floyd-steinberg" | "fs" => Ok(DitherMode::FloydSteinberg),
            "noise" => Ok(DitherMode::Noise),
            _ => Err(AppError::InvalidSetting {
                key: "dither",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DitherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DitherMode::None => f.write_str("none"),
            DitherMode::FloydSteinberg => f.write_str("floyd-steinberg"),
            DitherMode::Noise => f.write_str("noise"),
        }
    }
}
