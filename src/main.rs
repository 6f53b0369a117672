use palette_transfer::config::init;
use palette_transfer::image_io::{read_image, resolve_output, write_image};
use palette_transfer::timing::Stopwatch;
use palette_transfer::transfer::{transfer, ColorMap};
use palette_transfer::AppConfig;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = init()?;
    let (output, elapsed) = process_image(&config)?;
    log::info!("saved {} in {:?}", output.display(), elapsed);
    Ok(())
}

fn process_image(config: &AppConfig) -> Result<(PathBuf, Duration)> {
    let mut watch = Stopwatch::new(config.timing);

    let decoded = read_image(&config.input_path)
        .with_context(|| format!("failed to read {}", config.input_path.display()))?;
    let target = resolve_output(config.output_path.as_deref(), decoded.format);
    log::debug!(
        "input {:?}, writing {:?} to {}",
        decoded.format,
        target.format,
        target.path.display()
    );
    watch.lap("Read");

    let pb = progress_bar(config)?;
    let color_map = ColorMap::new();
    let output = transfer(&decoded.image, config, &color_map, &pb);
    pb.finish_and_clear();
    watch.lap("Transfer");

    write_image(&output, &target)
        .with_context(|| format!("failed to write {}", target.path.display()))?;
    watch.lap("Write");

    Ok((target.path, watch.total()))
}

fn progress_bar(config: &AppConfig) -> Result<ProgressBar> {
    if config.quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Processing: {}", config.input_path.display()));
    Ok(pb)
}
