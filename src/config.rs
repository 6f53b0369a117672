use crate::colors::{builtin, DEFAULT_SCHEME};
use crate::error::AppError;
use crate::scheme::Palette;
use crate::types::{AppConfig, DitherMode, Metric};

use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use serde_derive::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
pub struct SerializedAppConfig {
    pub colorscheme: String,
    pub metric: String,
    pub dither: String,
    pub dither_amount: String,
}

#[derive(Debug, Deserialize)]
struct SchemeFile {
    colors: Vec<String>,
}

/// `~/.config/palette-transfer`, home of `config.toml` and scheme files.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from(""))
        .join(".config/palette-transfer")
}

pub fn load_config(
    default_path: &Path,
    config_path: Option<&Path>,
) -> Result<SerializedAppConfig, config::ConfigError> {
    let mut builder = ConfigBuilder::<DefaultState>::default()
        .set_default("colorscheme", DEFAULT_SCHEME)?
        .set_default("metric", "rgb")?
        .set_default("dither", "none")?
        .set_default("dither_amount", "0.1")?;

    if default_path.exists() {
        builder = builder.add_source(File::from(default_path.to_path_buf()).required(false));
    }

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path.to_path_buf()).required(true));
    }

    builder.build()?.try_deserialize()
}

/// Resolves a scheme name to a palette. A `<name>.toml` file in `config_dir`
/// shadows the built-in scheme of the same name.
pub fn load_colorscheme(name: &str, config_dir: &Path) -> Result<Palette, AppError> {
    let colorscheme_path = config_dir.join(format!("{}.toml", name));
    if colorscheme_path.exists() {
        let colorscheme_str = fs::read_to_string(&colorscheme_path)?;
        let colorscheme: SchemeFile =
            toml::from_str(&colorscheme_str).map_err(|source| AppError::SchemeFile {
                path: colorscheme_path,
                source,
            })?;
        Palette::from_hex(colorscheme.colors.as_slice())
    } else if let Some(colors) = builtin(name) {
        Palette::from_hex(colors)
    } else {
        Err(AppError::UnknownScheme(name.to_string()))
    }
}

pub fn cli() -> Command<'static> {
    Command::new("palette-transfer")
        .version(VERSION)
        .about("Converts image to color palette")
        .after_help("Settings are read from ~/.config/palette-transfer/config.toml when it exists (keys: colorscheme, metric, dither, dither_amount). A colorscheme NAME refers to ~/.config/palette-transfer/NAME.toml containing `colors = [\"#2E3440\", ...]`, or to a built-in scheme (nord).")
        .arg(
            Arg::new("image")
                .help("Image to convert")
                .required(true)
                .index(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("timing")
                .short('t')
                .long("timing")
                .help("Prints timings")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT")
                .help("Set output name. Tries to honour set extension. Example: output.png")
                .takes_value(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("colors")
                .short('c')
                .long("colors")
                .value_name("COLORS")
                .help("Hexcodes split by comma. Example: \"2E3440,3B4252,434C5E\". Uses the Nord color palette if not set: https://www.nordtheme.com/")
                .takes_value(true)
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("scheme")
                .short('s')
                .long("scheme")
                .value_name("NAME")
                .help("Named colorscheme, overrides the one set in config")
                .takes_value(true)
                .conflicts_with("colors")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("metric")
                .short('m')
                .long("metric")
                .value_name("METRIC")
                .help("Color distance used to pick the closest palette entry")
                .takes_value(true)
                .value_parser(PossibleValuesParser::new(["rgb", "ciede2000"])),
        )
        .arg(
            Arg::new("dither")
                .short('d')
                .long("dither")
                .value_name("MODE")
                .help("Dithering applied while mapping")
                .takes_value(true)
                .value_parser(PossibleValuesParser::new(["none", "floyd-steinberg", "noise"])),
        )
        .arg(
            Arg::new("dither-amount")
                .long("dither-amount")
                .value_name("AMOUNT")
                .help("[0.0-1.0] Strength of noise dithering")
                .takes_value(true)
                .allow_hyphen_values(true)
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("/path/to/config.toml")
                .help("Sets a custom config file")
                .takes_value(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Hides the progress bar")
                .action(ArgAction::SetTrue),
        )
}

/// Combines parsed arguments with file settings. Flags win over the config.
pub fn from_matches(
    matches: &ArgMatches,
    config: SerializedAppConfig,
    config_dir: &Path,
) -> Result<AppConfig, AppError> {
    let input_path = matches
        .get_one::<PathBuf>("image")
        .expect("image is a required argument")
        .clone();
    let output_path = matches.get_one::<PathBuf>("output").cloned();

    let colors = matches
        .get_one::<String>("colors")
        .filter(|c| !c.trim().is_empty());
    let (colorscheme, palette) = match colors {
        Some(list) => ("custom".to_string(), Palette::parse_list(list)?),
        None => {
            let name = matches
                .get_one::<String>("scheme")
                .unwrap_or(&config.colorscheme);
            (name.clone(), load_colorscheme(name, config_dir)?)
        }
    };

    let metric: Metric = matches
        .get_one::<String>("metric")
        .unwrap_or(&config.metric)
        .parse()?;

    let dither: DitherMode = matches
        .get_one::<String>("dither")
        .unwrap_or(&config.dither)
        .parse()?;

    let dither_amount = matches
        .get_one::<String>("dither-amount")
        .unwrap_or(&config.dither_amount);
    let dither_amount: f32 = dither_amount
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|a: &f32| (0.0..=1.0).contains(a))
        .ok_or_else(|| AppError::InvalidSetting {
            key: "dither_amount",
            value: dither_amount.clone(),
        })?;

    let timing = matches.get_one::<bool>("timing").copied().unwrap_or(false);
    let quiet = matches.get_one::<bool>("quiet").copied().unwrap_or(false);

    log::debug!(
        "palette '{}' with {} colors, metric {}, dither {}",
        colorscheme,
        palette.len(),
        metric,
        dither
    );

    Ok(AppConfig {
        input_path,
        output_path,
        colorscheme,
        palette,
        metric,
        dither,
        dither_amount,
        timing,
        quiet,
    })
}

pub fn init() -> Result<AppConfig, AppError> {
    let matches = cli().get_matches();
    let config_dir = config_dir();
    let config = load_config(
        &config_dir.join("config.toml"),
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
    )?;
    from_matches(&matches, config, &config_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::NORD;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "palette-transfer-config-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn resolve(args: &[&str], dir: &Path) -> Result<AppConfig, AppError> {
        let mut argv = vec!["palette-transfer"];
        argv.extend_from_slice(args);
        let matches = cli().try_get_matches_from(argv).unwrap();
        let config = load_config(&dir.join("config.toml"), None).unwrap();
        from_matches(&matches, config, dir)
    }

    #[test]
    fn defaults_to_nord() {
        let dir = scratch_dir("defaults");
        let config = resolve(&["photo.jpg"], &dir).unwrap();
        assert_eq!(config.input_path, PathBuf::from("photo.jpg"));
        assert_eq!(config.output_path, None);
        assert_eq!(config.colorscheme, "nord");
        assert_eq!(
            config.palette.colors(),
            Palette::from_hex(&NORD).unwrap().colors()
        );
        assert_eq!(config.metric, Metric::Rgb);
        assert_eq!(config.dither, DitherMode::None);
        assert!(!config.timing);
        assert!(!config.quiet);
    }

    #[test]
    fn colors_flag() {
        let dir = scratch_dir("colors");
        let config = resolve(
            &["photo.jpg", "-c", "FF0000,00FF00", "-o", "out.png", "-t"],
            &dir,
        )
        .unwrap();
        assert_eq!(config.colorscheme, "custom");
        assert_eq!(config.palette.len(), 2);
        assert_eq!(config.output_path, Some(PathBuf::from("out.png")));
        assert!(config.timing);
    }

    #[test]
    fn blank_colors_fall_back_to_scheme() {
        let dir = scratch_dir("blank");
        let config = resolve(&["photo.jpg", "--colors", " "], &dir).unwrap();
        assert_eq!(config.colorscheme, "nord");
    }

    #[test]
    fn bad_color_is_named() {
        let dir = scratch_dir("bad-color");
        match resolve(&["photo.jpg", "-c", "ZZZZZZ"], &dir) {
            Err(AppError::InvalidColor { token, .. }) => assert_eq!(token, "ZZZZZZ"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scheme_file_shadows_builtin() {
        let dir = scratch_dir("scheme-file");
        fs::write(dir.join("nord.toml"), "colors = [\"#000000\", \"(FFFFFF)\"]\n").unwrap();
        fs::write(dir.join("mono.toml"), "colors = [\"777777\"]\n").unwrap();

        let config = resolve(&["photo.jpg"], &dir).unwrap();
        assert_eq!(config.palette.len(), 2);

        let config = resolve(&["photo.jpg", "-s", "mono"], &dir).unwrap();
        assert_eq!(config.colorscheme, "mono");
        assert_eq!(config.palette.colors(), &[image::Rgb([0x77, 0x77, 0x77])]);
    }

    #[test]
    fn broken_scheme_file() {
        let dir = scratch_dir("broken-scheme");
        fs::write(dir.join("broken.toml"), "colors = 12").unwrap();
        assert!(matches!(
            resolve(&["photo.jpg", "-s", "broken"], &dir),
            Err(AppError::SchemeFile { .. })
        ));
    }

    #[test]
    fn unknown_scheme() {
        let dir = scratch_dir("unknown");
        assert!(matches!(
            resolve(&["photo.jpg", "--scheme", "solarized"], &dir),
            Err(AppError::UnknownScheme(name)) if name == "solarized"
        ));
    }

    #[test]
    fn config_file_is_overridden_by_flags() {
        let dir = scratch_dir("layered");
        fs::write(
            dir.join("config.toml"),
            "metric = \"ciede2000\"\ndither = \"fs\"\ndither_amount = 0.3\n",
        )
        .unwrap();

        let config = resolve(&["photo.jpg"], &dir).unwrap();
        assert_eq!(config.metric, Metric::Ciede2000);
        assert_eq!(config.dither, DitherMode::FloydSteinberg);
        assert!((config.dither_amount - 0.3).abs() < 1e-6);

        let config = resolve(&["photo.jpg", "-m", "rgb", "-d", "noise"], &dir).unwrap();
        assert_eq!(config.metric, Metric::Rgb);
        assert_eq!(config.dither, DitherMode::Noise);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = scratch_dir("explicit");
        assert!(load_config(&dir.join("config.toml"), Some(&dir.join("missing.toml"))).is_err());
    }

    #[test]
    fn dither_amount_range() {
        let dir = scratch_dir("amount");
        let config = resolve(&["photo.jpg", "--dither-amount", "0.75"], &dir).unwrap();
        assert!((config.dither_amount - 0.75).abs() < 1e-6);
        for bad in ["1.5", "-0.1", "lots"] {
            assert!(matches!(
                resolve(&["photo.jpg", "--dither-amount", bad], &dir),
                Err(AppError::InvalidSetting { key: "dither_amount", .. })
            ));
        }
    }

    #[test]
    fn cli_rejects_bad_usage() {
        let err = cli().try_get_matches_from(["palette-transfer"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = cli()
            .try_get_matches_from(["palette-transfer", "a.png", "-m", "taxicab"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let err = cli()
            .try_get_matches_from(["palette-transfer", "-h"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }
}
