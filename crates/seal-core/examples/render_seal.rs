//! Preview of a single seal
//!
//! Usage: cargo run -p seal-core --example render_seal -- [FONT_DIR] [SEED]

use std::path::PathBuf;

use seal_core::{DatasetBuilder, GeneratorConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let font_dir = PathBuf::from(args.next().unwrap_or_else(|| "fonts".into()));
    let seed = match args.next() {
        Some(raw) => raw.parse()?,
        None => 1,
    };

    let config = GeneratorConfig {
        seed: Some(seed),
        ..GeneratorConfig::default()
    };
    let builder = DatasetBuilder::from_font_dir(config, &font_dir)?;
    let seal = builder.generate_one(1)?;

    let output = PathBuf::from("seal_preview.png");
    seal.image.save(&output)?;
    println!("Saved {:?} ({}x{})", output, seal.image.width(), seal.image.height());
    println!("{}", serde_json::to_string_pretty(&seal.metadata)?);
    Ok(())
}
