//! Main entry point for the vpkscan CLI application.
//!
//! Reads a VPK directory file or a ZIP container, decodes every directory
//! file found, and prints the result as JSON or as a listing.

use anyhow::{Context, Result};
use clap::Parser;
use std::fmt::Write as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vpkscan::{
    ArchiveReport, Cli, InputFormat, LocalFileReader, ReadAt, TraversalOptions, TraversalResult,
    parse_vpk, scan_zip,
};

/// Decoded input, one archive or a whole container hierarchy
enum Scan {
    Single(ArchiveReport),
    Container(TraversalResult),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let reader = LocalFileReader::new(&cli.file)?;
    let data = reader
        .read_all()
        .await
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let scan = match cli.resolve_format(&data) {
        InputFormat::Zip => {
            let options = TraversalOptions {
                max_depth: cli.max_depth,
            };
            let result = scan_zip(data, options)
                .await
                .with_context(|| format!("Failed to open {}", cli.file.display()))?;
            Scan::Container(result)
        }
        InputFormat::Vpk | InputFormat::Auto => {
            let report = parse_vpk(&data)
                .with_context(|| format!("Failed to parse {}", cli.file.display()))?;
            Scan::Single(report)
        }
    };

    let rendered = if cli.is_listing() {
        render_listing(&scan, cli.long_list)?
    } else {
        render_json(&scan, cli.compact)?
    };

    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet {
                println!("{}", summary(&scan));
                println!("Output written to: {}", path.display());
            }
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

fn render_json(scan: &Scan, compact: bool) -> Result<String> {
    let mut json = match (scan, compact) {
        (Scan::Single(report), false) => serde_json::to_string_pretty(report)?,
        (Scan::Single(report), true) => serde_json::to_string(report)?,
        (Scan::Container(result), false) => serde_json::to_string_pretty(result)?,
        (Scan::Container(result), true) => serde_json::to_string(result)?,
    };
    json.push('\n');
    Ok(json)
}

/// Plain path list, or with `long` a table in the spirit of `unzip -v`.
///
/// Container listings prefix each path with the archive it came from.
fn render_listing(scan: &Scan, long: bool) -> Result<String> {
    let archives: Vec<(Option<&str>, &ArchiveReport)> = match scan {
        Scan::Single(report) => vec![(None, report)],
        Scan::Container(result) => result
            .archives
            .iter()
            .map(|(path, report)| (Some(path.as_str()), report))
            .collect(),
    };

    let mut out = String::new();
    if long {
        writeln!(
            out,
            "{:>8}  {:>5}  {:>7}  {:>10}  {:>10}  Name",
            "CRC", "Index", "Preload", "Offset", "Length"
        )?;
        writeln!(out, "{}", "-".repeat(70))?;
    }

    let mut total_size = 0u64;
    let mut file_count = 0u64;

    for (archive, report) in archives {
        for file in &report.files {
            let name = match archive {
                Some(archive) => format!("{archive}: {}", file.path),
                None => file.path.clone(),
            };

            if long {
                let index = if file.is_embedded() {
                    "dir".to_string()
                } else {
                    file.archive_index.to_string()
                };
                writeln!(
                    out,
                    "{:08x}  {:>5}  {:>7}  {:>10}  {:>10}  {}",
                    file.crc, index, file.preload_bytes, file.offset, file.length, name
                )?;
            } else {
                writeln!(out, "{name}")?;
            }
        }
        total_size += report.total_size();
        file_count += report.file_count as u64;
    }

    if long {
        writeln!(out, "{}", "-".repeat(70))?;
        writeln!(out, "{:>48}  {} files, {}", "", file_count, format_size(total_size))?;
    }

    Ok(out)
}

fn summary(scan: &Scan) -> String {
    match scan {
        Scan::Single(report) => format!(
            "Parsed {} files ({})",
            report.file_count,
            format_size(report.total_size())
        ),
        Scan::Container(result) => format!(
            "Found {} VPK archives with {} files ({} warnings)",
            result.archive_count(),
            result.file_count(),
            result.warnings.len()
        ),
    }
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
