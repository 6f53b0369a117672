//! Re-renders images with a fixed color palette.
//!
//! The pipeline is decode, resolve palette, map, encode. Each pixel is
//! replaced by the closest palette entry under the chosen [`Metric`],
//! optionally with dithering, so the output only ever contains palette colors.

pub mod colors;
pub mod config;
pub mod error;
pub mod image_io;
pub mod scheme;
pub mod timing;
pub mod transfer;
pub mod types;

pub use crate::error::AppError;
pub use crate::scheme::Palette;
pub use crate::types::{AppConfig, DitherMode, Metric};
