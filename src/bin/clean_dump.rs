//! Create a cleaned firmware dump containing only the static flash sections.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

use nrf_dump_clean::{clean_dump, default_output_path, parse_length, CleanOptions};

#[derive(Parser)]
#[command(name = "clean_dump")]
#[command(version, about = "Create a cleaned firmware dump containing only the static flash sections")]
struct Cli {
    /// Dirty flash dump to clean
    dump: PathBuf,

    /// Override application size (hex or decimal); default is the DFU settings value
    #[arg(long, value_name = "LENGTH", value_parser = length)]
    app_size: Option<u32>,

    /// Explicit path for the cleaned dump (default: <dump>_cleaned.bin)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Size of the cleaned image (hex or decimal); default is the size of the dump
    #[arg(long, value_name = "LENGTH", value_parser = length)]
    total_size: Option<u32>,
}

fn length(value: &str) -> Result<u32, String> {
    parse_length(value).map_err(|e| e.to_string())
}

/// Write through a temporary file in the same directory, so a failed run
/// leaves no partial output behind
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(bytes)
        .context("Failed to write cleaned dump")?;
    file.persist(path)
        .with_context(|| format!("Failed to move cleaned dump to {}", path.display()))?;

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nrf_dump_clean=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let dump = std::fs::read(&cli.dump)
        .with_context(|| format!("Failed to read dump {}", cli.dump.display()))?;

    let options = CleanOptions {
        app_size: cli.app_size,
        total_size: cli.total_size.map(|size| size as usize),
        ..CleanOptions::default()
    };

    let report = clean_dump(&dump, &options)?;

    let output_path = cli
        .output
        .unwrap_or_else(|| default_output_path(&cli.dump));
    write_atomically(&output_path, &report.image)?;

    println!(
        "Wrote cleaned dump to {} ({} bytes)",
        output_path.display(),
        report.image.len()
    );

    Ok(())
}
