//! Command-line flags layered over an optional TOML configuration file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use torus_life_core::RunConfig;

const DEFAULT_WIDTH: usize = 512;
const DEFAULT_HEIGHT: usize = 512;
const DEFAULT_TURNS: u64 = 10_000_000_000;
const DEFAULT_THREADS: usize = 8;
const DEFAULT_DENSITY: f64 = 0.25;

/// Runs Conway's Game of Life on a toroidal board.
///
/// Type `s` to save a snapshot, `p` to pause or resume and `q` to quit,
/// each followed by Enter.
#[derive(Debug, Parser)]
#[command(name = "torus-life", version)]
pub(crate) struct Cli {
    /// TOML file providing defaults for the flags below.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Board width in cells.
    #[arg(short = 'w', long)]
    pub(crate) width: Option<usize>,
    /// Board height in cells.
    #[arg(long)]
    pub(crate) height: Option<usize>,
    /// Number of generations to compute.
    #[arg(long)]
    pub(crate) turns: Option<u64>,
    /// Worker threads per generation.
    #[arg(short = 't', long)]
    pub(crate) threads: Option<usize>,
    /// Directory holding `<W>x<H>.pgm` input images.
    #[arg(long)]
    pub(crate) images: Option<PathBuf>,
    /// Directory receiving snapshots.
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Generate the initial board from this seed instead of loading an image.
    #[arg(long)]
    pub(crate) random_seed: Option<u64>,
    /// Share of alive cells in a generated board.
    #[arg(long)]
    pub(crate) density: Option<f64>,
    /// Most verbose log level to print.
    #[arg(long, default_value = "info")]
    pub(crate) log_level: tracing::Level,
}

/// Values accepted in the configuration file.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    width: Option<usize>,
    height: Option<usize>,
    turns: Option<u64>,
    threads: Option<usize>,
    images: Option<PathBuf>,
    out: Option<PathBuf>,
    random_seed: Option<u64>,
    density: Option<f64>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) run: RunConfig,
    pub(crate) images: PathBuf,
    pub(crate) out: PathBuf,
    pub(crate) board_source: BoardSource,
}

/// Where the initial board comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum BoardSource {
    /// Load `<W>x<H>.pgm` from the images directory.
    Image,
    /// Generate a board from a seeded random stream.
    Random { seed: u64, density: f64 },
}

impl Cli {
    /// Resolves flags, file values and defaults, in that order of precedence.
    pub(crate) fn settings(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    fn merge(&self, file: FileConfig) -> Result<Settings> {
        let run = RunConfig::new(
            self.width.or(file.width).unwrap_or(DEFAULT_WIDTH),
            self.height.or(file.height).unwrap_or(DEFAULT_HEIGHT),
            self.turns.or(file.turns).unwrap_or(DEFAULT_TURNS),
            self.threads.or(file.threads).unwrap_or(DEFAULT_THREADS),
        )
        .context("invalid run configuration")?;

        let board_source = match self.random_seed.or(file.random_seed) {
            Some(seed) => {
                let density = self.density.or(file.density).unwrap_or(DEFAULT_DENSITY);
                if !(0.0..=1.0).contains(&density) {
                    bail!("density must lie between 0 and 1 (received {density})");
                }
                BoardSource::Random { seed, density }
            }
            None => BoardSource::Image,
        };

        Ok(Settings {
            run,
            images: self
                .images
                .clone()
                .or(file.images)
                .unwrap_or_else(|| PathBuf::from("images")),
            out: self
                .out
                .clone()
                .or(file.out)
                .unwrap_or_else(|| PathBuf::from("out")),
            board_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardSource, Cli, FileConfig};
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("torus-life").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let settings = parse(&[]).merge(FileConfig::default()).expect("settings");

        assert_eq!(settings.run.image_width(), 512);
        assert_eq!(settings.run.image_height(), 512);
        assert_eq!(settings.run.turns(), 10_000_000_000);
        assert_eq!(settings.run.threads(), 8);
        assert_eq!(settings.images, PathBuf::from("images"));
        assert_eq!(settings.out, PathBuf::from("out"));
        assert_eq!(settings.board_source, BoardSource::Image);
    }

    #[test]
    fn flags_override_file_values() {
        let file: FileConfig = toml::from_str(
            r#"
                width = 64
                height = 32
                turns = 100
                threads = 4
                out = "snapshots"
            "#,
        )
        .expect("file config");

        let settings = parse(&["--height", "16", "-t", "2"])
            .merge(file)
            .expect("settings");

        assert_eq!(settings.run.image_width(), 64);
        assert_eq!(settings.run.image_height(), 16);
        assert_eq!(settings.run.turns(), 100);
        assert_eq!(settings.run.threads(), 2);
        assert_eq!(settings.out, PathBuf::from("snapshots"));
    }

    #[test]
    fn example_file_parses() {
        let file: FileConfig =
            toml::from_str(include_str!("../torus-life.example.toml")).expect("example config");
        let settings = parse(&[]).merge(file).expect("settings");
        assert_eq!(settings.run.turns(), 100);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("colour = \"green\"").is_err());
    }

    #[test]
    fn invalid_values_are_reported_not_coerced() {
        assert!(parse(&["--threads", "0"]).merge(FileConfig::default()).is_err());
        assert!(parse(&["--width", "0"]).merge(FileConfig::default()).is_err());
        assert!(parse(&["--height", "4", "--threads", "5"])
            .merge(FileConfig::default())
            .is_err());
        assert!(Cli::try_parse_from(["torus-life", "--threads", "-1"]).is_err());
        assert!(parse(&["--random-seed", "1", "--density", "1.5"])
            .merge(FileConfig::default())
            .is_err());
    }

    #[test]
    fn random_seed_selects_generated_board() {
        let settings = parse(&["--random-seed", "9", "--density", "0.5"])
            .merge(FileConfig::default())
            .expect("settings");
        assert_eq!(
            settings.board_source,
            BoardSource::Random {
                seed: 9,
                density: 0.5,
            }
        );
    }
}
