use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::traverse::DEFAULT_MAX_DEPTH;
use crate::zip;

/// How to interpret the input file
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// Pick from the file name, then from the leading signature
    #[default]
    Auto,
    /// A single VPK directory file
    Vpk,
    /// A ZIP container searched recursively for VPK directory files
    Zip,
}

#[derive(Parser, Debug)]
#[command(name = "vpkscan")]
#[command(version)]
#[command(about = "List the contents of Valve VPK directory files", long_about = None)]
#[command(after_help = "Examples:\n  \
  vpkscan pak01_dir.vpk                   print the directory as JSON\n  \
  vpkscan pak01_dir.vpk -o pak01.json     write JSON to a file\n  \
  vpkscan -l workshop_bundle.zip          list files of every VPK inside a ZIP")]
pub struct Cli {
    /// VPK directory file (e.g. pak01_dir.vpk) or ZIP container
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "PATH", env = "VPKSCAN_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Input format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = InputFormat::Auto)]
    pub format: InputFormat,

    /// List file paths (short format)
    #[arg(short = 'l', conflicts_with = "long_list")]
    pub list: bool,

    /// List files with CRC, archive index, preload, offset and length
    #[arg(short = 'L')]
    pub long_list: bool,

    /// Emit single-line JSON
    #[arg(long)]
    pub compact: bool,

    /// Maximum nesting depth for ZIP containers inside ZIP containers
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH, env = "VPKSCAN_MAX_DEPTH")]
    pub max_depth: usize,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode: errors only, no summary
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Resolve [`InputFormat::Auto`] using the file name, then the first bytes
    pub fn resolve_format(&self, data: &[u8]) -> InputFormat {
        match self.format {
            InputFormat::Auto => detect_format(&self.file, data),
            other => other,
        }
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn is_listing(&self) -> bool {
        self.list || self.long_list
    }
}

pub fn detect_format(path: &Path, data: &[u8]) -> InputFormat {
    let by_name = path
        .file_name()
        .map(|name| zip::is_zip_name(&name.to_string_lossy()))
        .unwrap_or(false);

    if by_name || zip::has_zip_signature(data) {
        InputFormat::Zip
    } else {
        InputFormat::Vpk
    }
}
