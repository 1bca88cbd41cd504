//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "carch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new archive
    Create(CreateArgs),
    /// Extract archive contents
    Extract(ExtractArgs),
    /// Identify archive formats from their leading bytes
    Detect(DetectArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Output archive file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Source files or directories to archive
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Archive type: tar.gz, tgz, tar, tar.lz4, tz4 or zip
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "tar.gz")]
    pub archive_type: String,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Only archive files with these extensions (comma separated)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    pub include_ext: Vec<String>,

    /// Skip files with these extensions (comma separated)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    pub exclude_ext: Vec<String>,

    /// Only archive entries with these exact base names
    #[arg(long, value_name = "NAME")]
    pub include_name: Vec<String>,

    /// Skip entries with these exact base names
    #[arg(long, value_name = "NAME")]
    pub exclude_name: Vec<String>,

    /// Only archive paths matching this glob
    #[arg(long, value_name = "GLOB")]
    pub include_glob: Option<String>,

    /// Skip paths matching this glob
    #[arg(long, value_name = "GLOB")]
    pub exclude_glob: Option<String>,

    /// Include entries whose base name is a prefix of this name
    #[arg(long, value_name = "NAME")]
    pub include_anchored: Option<String>,

    /// Skip entries whose base name starts with this prefix
    #[arg(long, value_name = "PREFIX")]
    pub exclude_anchored: Option<String>,

    /// Only archive entries modified after this file was
    #[arg(long, value_name = "FILE")]
    pub newer_than: Option<PathBuf>,

    /// Store absolute paths instead of paths relative to each source
    #[arg(long)]
    pub full_path: bool,

    /// Remove the archived files once the archive is complete
    #[arg(long)]
    pub delete_sources: bool,

    /// Owner id written into every header
    #[arg(long, value_name = "UID")]
    pub owner: Option<u32>,

    /// Group id written into every header
    #[arg(long, value_name = "GID")]
    pub group: Option<u32>,

    /// Octal permission bits written into every header
    #[arg(long, value_name = "MODE", value_parser = parse_octal_mode)]
    pub mode: Option<u32>,

    /// What to do when OUTPUT already exists
    #[arg(long, value_enum, default_value_t = OnCollision::Fail)]
    pub on_collision: OnCollision,

    /// Overwrite output file if it exists (same as --on-collision overwrite)
    #[arg(short = 'f', long, conflicts_with = "on_collision")]
    pub force: bool,

    /// Capacity of the queue between the tree walkers and the writer
    #[arg(long, value_name = "N", default_value = "64", value_parser = clap::value_parser!(usize))]
    pub queue_capacity: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnCollision {
    /// Fail with an error
    Fail,
    /// Replace the existing file
    Overwrite,
    /// Append the current date and time to the name
    Date,
    /// Append a random number to the name
    Random,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip format detection and treat ARCHIVE as this format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Extract into a directory named after the archive
    #[arg(long)]
    pub create_dir: bool,
}

#[derive(clap::Args)]
pub struct DetectArgs {
    /// Files to identify
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parses permission bits written in octal, with or without a `0o` prefix.
fn parse_octal_mode(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let digits = s.strip_prefix("0o").unwrap_or(s);
    if digits.is_empty() {
        return Err("empty mode".to_string());
    }
    let mode = u32::from_str_radix(digits, 8).map_err(|_| format!("invalid octal mode: {s}"))?;
    if mode > 0o7777 {
        return Err(format!("mode out of range: {s}"));
    }
    Ok(mode)
}
