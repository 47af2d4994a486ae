//! seal-gen — генератор датасета синтетических печатей
//!
//! Пример: `seal-gen 100 --output dataset --fonts fonts --seed 42`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use seal_core::{DatasetBuilder, GeneratorConfig};

#[derive(Parser, Debug)]
#[command(name = "seal-gen")]
#[command(version, about = "Generate a labeled dataset of synthetic circular seals")]
struct Args {
    /// Number of images to generate
    #[arg(default_value_t = 3)]
    count: usize,

    /// Output directory (receives images/ and labels.json)
    #[arg(short, long, default_value = "dataset")]
    output: PathBuf,

    /// Directory with .ttf/.otf fonts
    #[arg(long, default_value = "fonts")]
    fonts: PathBuf,

    /// Master seed; overrides the seed from --config
    #[arg(long)]
    seed: Option<u64>,

    /// JSON generator configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads (defaults to one per CPU)
    #[arg(long)]
    jobs: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let builder = DatasetBuilder::from_font_dir(config, &args.fonts)
        .context("Failed to prepare seal generator")?
        .with_jobs(args.jobs);

    let dataset = builder
        .build(args.count, &args.output)
        .with_context(|| format!("Failed to generate dataset in {}", args.output.display()))?;

    log::info!(
        "Done: {} image(s) in {}, labels in {} (seed {})",
        dataset.len(),
        dataset.images_dir.display(),
        dataset.labels_path.display(),
        dataset.seed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["seal-gen"]);
        assert_eq!(args.count, 3);
        assert_eq!(args.output, PathBuf::from("dataset"));
        assert_eq!(args.fonts, PathBuf::from("fonts"));
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_seed_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"seed": 1, "canvas": {"width": 320, "height": 320}}"#).unwrap();

        let args = Args::parse_from([
            "seal-gen",
            "5",
            "--config",
            path.to_str().unwrap(),
            "--seed",
            "77",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.seed, Some(77));
        assert_eq!(config.canvas.width, 320);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let args = Args::parse_from(["seal-gen", "--config", "/nonexistent/seal.json"]);
        let err = load_config(&args).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load config"));
    }
}
