use crate::error::AppError;

use image::io::Reader as ImageReader;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const DEFAULT_FORMAT: ImageFormat = ImageFormat::Jpeg;
const DEFAULT_STEM: &str = "out";

pub struct DecodedImage {
    pub image: RgbImage,
    /// Format detected from the file contents, if any.
    pub format: Option<ImageFormat>,
}

/// Where the result goes and how it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub format: ImageFormat,
}

pub fn read_image(path: &Path) -> Result<DecodedImage, AppError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let image = reader.decode()?.to_rgb8();
    Ok(DecodedImage { image, format })
}

/// Formats the encoder side of `image` accepts 8-bit RGB buffers for.
pub fn writes_rgb8(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::Tiff
            | ImageFormat::Tga
            | ImageFormat::Pnm
            | ImageFormat::WebP
            | ImageFormat::Qoi
    )
}

/// Picks the encoding from the output extension, then the input format if it
/// can hold RGB8, then JPEG. Without an explicit path the result is
/// `out.<ext>`.
pub fn resolve_output(output: Option<&Path>, input_format: Option<ImageFormat>) -> OutputTarget {
    let format = output
        .and_then(|p| ImageFormat::from_path(p).ok())
        .or_else(|| input_format.filter(|f| writes_rgb8(*f)))
        .unwrap_or(DEFAULT_FORMAT);

    let path = match output {
        Some(p) => p.to_path_buf(),
        None => {
            let ext = format.extensions_str().first().copied().unwrap_or("img");
            PathBuf::from(format!("{}.{}", DEFAULT_STEM, ext))
        }
    };

    OutputTarget { path, format }
}

/// Encodes in memory first so a failed encode leaves nothing on disk.
pub fn write_image(image: &RgbImage, target: &OutputTarget) -> Result<(), AppError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), target.format)?;
    fs::write(&target.path, bytes)?;
    Ok(())
}
