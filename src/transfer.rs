use crate::scheme::Palette;
use crate::types::{AppConfig, DitherMode, Metric};

use dashmap::DashMap;
use image::{Rgb, RgbImage};
use indicatif::ProgressBar;
use rand::Rng;
use rayon::prelude::*;

/// Largest per-channel jitter, reached at a dither amount of 1.0.
const NOISE_SCALE: f32 = 64.0;

/// Memo of source color to palette color, shared across worker threads.
pub struct ColorMap(DashMap<[u8; 3], Rgb<u8>>);

impl ColorMap {
    pub fn new() -> Self {
        ColorMap(DashMap::with_capacity(1024))
    }

    pub fn get(&self, key: &[u8; 3]) -> Option<Rgb<u8>> {
        self.0.get(key).map(|v| *v)
    }

    pub fn insert(&self, key: [u8; 3], value: Rgb<u8>) {
        self.0.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-renders `img` with the configured palette. Every pixel of the result
/// is a palette entry. `pb` advances once per row.
pub fn transfer(
    img: &RgbImage,
    config: &AppConfig,
    color_map: &ColorMap,
    pb: &ProgressBar,
) -> RgbImage {
    pb.set_length(u64::from(img.height()));
    match config.dither {
        DitherMode::None => {
            let output = map_nearest(img, &config.palette, config.metric, color_map, pb);
            log::debug!(
                "mapped {}x{} pixels, {} distinct colors cached",
                img.width(),
                img.height(),
                color_map.len()
            );
            output
        }
        DitherMode::FloydSteinberg => floyd_steinberg(img, &config.palette, config.metric, pb),
        DitherMode::Noise => {
            map_with_noise(img, &config.palette, config.metric, config.dither_amount, pb)
        }
    }
}

pub fn map_nearest(
    img: &RgbImage,
    palette: &Palette,
    metric: Metric,
    color_map: &ColorMap,
    pb: &ProgressBar,
) -> RgbImage {
    map_rows(img, pb, |_, pixel| {
        memoized_find_closest_color(color_map, pixel.0, palette, metric)
    })
}

pub fn map_with_noise(
    img: &RgbImage,
    palette: &Palette,
    metric: Metric,
    amount: f32,
    pb: &ProgressBar,
) -> RgbImage {
    let amplitude = amount.clamp(0.0, 1.0) * NOISE_SCALE;
    map_rows(img, pb, |rng, pixel| {
        let jittered = pixel
            .0
            .map(|c| f32::from(c) + (rng.gen::<f32>() * 2.0 - 1.0) * amplitude);
        palette.get(palette.nearest_index(jittered, metric))
    })
}

/// Runs `map` over every pixel, one row per rayon task.
fn map_rows<F>(img: &RgbImage, pb: &ProgressBar, map: F) -> RgbImage
where
    F: Fn(&mut rand::rngs::ThreadRng, &Rgb<u8>) -> Rgb<u8> + Sync,
{
    let (width, height) = img.dimensions();
    let mut output = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return output;
    }

    let stride = width as usize * 3;
    output
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let mut rng = rand::thread_rng();
            for (x, out) in row.chunks_exact_mut(3).enumerate() {
                let pixel = img.get_pixel(x as u32, y as u32);
                out.copy_from_slice(&map(&mut rng, pixel).0);
            }
            pb.inc(1);
        });

    output
}

/// Error diffusion with the classic 7/16, 3/16, 5/16, 1/16 kernel, scanning
/// rows left to right.
pub fn floyd_steinberg(
    img: &RgbImage,
    palette: &Palette,
    metric: Metric,
    pb: &ProgressBar,
) -> RgbImage {
    let (width, height) = img.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut output = RgbImage::new(width, height);
    let mut work: Vec<[f32; 3]> = img.pixels().map(|p| p.0.map(f32::from)).collect();

    for y in 0..h {
        for x in 0..w {
            let value = work[y * w + x].map(|c| c.clamp(0.0, 255.0));
            let chosen = palette.get(palette.nearest_index(value, metric));
            output.put_pixel(x as u32, y as u32, chosen);

            let error = [
                value[0] - f32::from(chosen[0]),
                value[1] - f32::from(chosen[1]),
                value[2] - f32::from(chosen[2]),
            ];
            let mut spread = |dx: isize, dy: usize, weight: f32| {
                let nx = x as isize + dx;
                let ny = y + dy;
                if nx < 0 || nx as usize >= w || ny >= h {
                    return;
                }
                let target = &mut work[ny * w + nx as usize];
                for c in 0..3 {
                    target[c] += error[c] * weight;
                }
            };
            spread(1, 0, 7.0 / 16.0);
            spread(-1, 1, 3.0 / 16.0);
            spread(0, 1, 5.0 / 16.0);
            spread(1, 1, 1.0 / 16.0);
        }
        pb.inc(1);
    }

    output
}

fn memoized_find_closest_color(
    color_map: &ColorMap,
    key: [u8; 3],
    palette: &Palette,
    metric: Metric,
) -> Rgb<u8> {
    if let Some(rgb) = color_map.get(&key) {
        return rgb;
    }

    let closest = palette.nearest(key, metric);
    color_map.insert(key, closest);
    closest
}
