//! Generates code for the bundled monster schema.
//!
//! Run with: `cargo run --example generate -- [language] [output-dir]`
//!
//! Without a language every target is generated. Set `RUST_LOG=debug` to
//! follow the walk over the schema.

use std::path::PathBuf;

use ironfbs::prelude::*;

const MONSTER: &str = include_str!("../schemas/monster.json");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let languages = match args.next().as_deref() {
        None | Some("all") => TargetLanguage::ALL.to_vec(),
        Some(name) => vec![name.parse::<TargetLanguage>()?],
    };
    let output = args.next().map_or_else(|| PathBuf::from("generated"), PathBuf::from);

    let schema = parse_schema(MONSTER)?;
    let options = GeneratorOptions::default().object_api(true).mutable_buffer(true);

    for language in languages {
        let result = generate(language, &schema, &options, &output.join(language.name()))?;
        println!(
            "{:<12} {:>3} file(s) {:>6} line(s)",
            language.name(),
            result.files.len(),
            result.lines_generated
        );
    }
    Ok(())
}
