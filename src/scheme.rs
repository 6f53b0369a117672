use crate::colors::NORD;
use crate::error::AppError;
use crate::types::Metric;

use image::Rgb;
use palette::color_difference::ImprovedCiede2000;
use palette::{IntoColor, Lab, Srgb};
use std::str::FromStr;

/// An ordered, non-empty set of colors an image gets re-rendered with.
///
/// Each entry keeps its L*a*b* value next to the RGB triple so perceptual
/// matching doesn't convert the palette on every lookup.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
    lab: Vec<Lab>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb<u8>>) -> Result<Self, AppError> {
        if colors.is_empty() {
            return Err(AppError::EmptyPalette);
        }
        let lab = colors.iter().map(|c| rgb_to_lab(c.0)).collect();
        Ok(Palette { colors, lab })
    }

    /// Parses every token as a hex code, keeping their order.
    pub fn from_hex<S: AsRef<str>>(tokens: &[S]) -> Result<Self, AppError> {
        let colors = tokens
            .iter()
            .map(|t| parse_hex(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Palette::new(colors)
    }

    /// Parses a comma separated list such as `"2E3440,(3B4252), #434C5E"`.
    pub fn parse_list(list: &str) -> Result<Self, AppError> {
        let tokens: Vec<&str> = list.split(',').collect();
        Palette::from_hex(tokens.as_slice())
    }

    pub fn nord() -> Self {
        Palette::from_hex(&NORD).unwrap_or_else(|_| unreachable!("built-in palette is valid"))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    pub fn get(&self, index: usize) -> Rgb<u8> {
        self.colors[index]
    }

    pub fn contains(&self, color: &Rgb<u8>) -> bool {
        self.colors.contains(color)
    }

    /// Index of the entry closest to `color` under `metric`. Channels are in
    /// the 0..=255 range but may carry fractions (dithering error).
    /// Ties go to the earlier entry.
    pub fn nearest_index(&self, color: [f32; 3], metric: Metric) -> usize {
        let color = color.map(|c| c.clamp(0.0, 255.0));
        match metric {
            Metric::Rgb => min_index(self.colors.iter().map(|c| squared_distance(color, c))),
            Metric::Ciede2000 => {
                let original: Lab = Srgb::new(color[0] / 255.0, color[1] / 255.0, color[2] / 255.0)
                    .into_color();
                min_index(self.lab.iter().map(|&lab| original.improved_difference(lab)))
            }
        }
    }

    pub fn nearest(&self, rgb: [u8; 3], metric: Metric) -> Rgb<u8> {
        self.colors[self.nearest_index(rgb.map(f32::from), metric)]
    }
}

fn min_index(distances: impl Iterator<Item = f32>) -> usize {
    distances
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn squared_distance(a: [f32; 3], b: &Rgb<u8>) -> f32 {
    a.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = x - f32::from(y);
            d * d
        })
        .sum()
}

pub fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    Srgb::new(rgb[0], rgb[1], rgb[2])
        .into_format::<f32>()
        .into_color()
}

/// Parses one user supplied hex code. Surrounding whitespace, quotes,
/// parentheses and a leading `#` are ignored. Errors name the token as given.
pub fn parse_hex(token: &str) -> Result<Rgb<u8>, AppError> {
    let invalid = |reason: &str| AppError::InvalidColor {
        token: token.to_string(),
        reason: reason.to_string(),
    };

    let code = token
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();
    let code = code.strip_prefix('#').unwrap_or(code);

    if code.is_empty() {
        return Err(invalid("empty color"));
    }
    if !code.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("not a hexadecimal number"));
    }

    let rgb = Srgb::<u8>::from_str(code).map_err(|e| invalid(&e.to_string()))?;
    Ok(Rgb([rgb.red, rgb.green, rgb.blue]))
}
