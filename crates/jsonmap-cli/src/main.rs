//! `jsonmap` CLI: decode JSON documents through declared schemas.
//!
//! ## Usage
//!
//! ```sh
//! # Normalize a document through a declared type (stdin → stdout)
//! echo '{"id":"7","extra":true}' | jsonmap decode --schema bakery.json --type Cookie
//!
//! # Decode an interface value, file to file, pretty-printed
//! jsonmap decode --schema bakery.json --type Dessert -i in.json -o out.json --pretty
//!
//! # List the types of a declaration document
//! jsonmap check --schema bakery.json
//! ```
//!
//! Set `RUST_LOG=debug` to see skipped fields and registry activity on stderr.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use jsonmap_core::{Codec, SchemaCatalog};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jsonmap",
    version,
    about = "Schema-driven JSON object mapping"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a document through a declared type and write it back out
    Decode {
        /// Declaration document describing the types
        #[arg(long)]
        schema: String,
        /// Type or interface id to decode as
        #[arg(long = "type")]
        type_id: String,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Load a declaration document and list its types
    Check {
        /// Declaration document describing the types
        #[arg(long)]
        schema: String,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            schema,
            type_id,
            input,
            output,
            pretty,
        } => {
            let catalog = load_catalog(&schema)?;
            let target = catalog
                .get_type(&type_id)
                .ok_or_else(|| anyhow!("Type '{}' is not declared in {}", type_id, schema))?;

            let codec = Codec::new();
            catalog
                .register_handlers(&codec)
                .context("Failed to register interface implementations")?;

            let text = read_input(input.as_deref())?;
            let record = codec
                .decode_str(target, &text)
                .with_context(|| format!("Failed to decode input as {}", type_id))?;
            if record.is_none() {
                debug!(type_id = %type_id, "input does not match the root type");
            }

            let encoded = match record {
                None => "null".to_string(),
                Some(record) if target.is_interface() => codec
                    .encode_polymorphic_to_string(&record)
                    .context("Failed to encode decoded value")?,
                Some(record) => codec
                    .encode_to_string(&record)
                    .context("Failed to encode decoded value")?,
            };
            let rendered = if pretty {
                let value: serde_json::Value = serde_json::from_str(&encoded)?;
                serde_json::to_string_pretty(&value)?
            } else {
                encoded
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Check { schema } => {
            let catalog = load_catalog(&schema)?;
            for t in catalog.types() {
                println!(
                    "{}\t{}\t{}\t{} fields",
                    t.id(),
                    t.kind().name(),
                    t.parent().map(|p| p.id()).unwrap_or("-"),
                    t.fields().len()
                );
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn load_catalog(path: &str) -> Result<SchemaCatalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema: {}", path))?;
    let catalog = SchemaCatalog::from_json(&text)
        .with_context(|| format!("Invalid schema declaration: {}", path))?;
    debug!(path, types = catalog.types().count(), "loaded schema declaration");
    Ok(catalog)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
