use crate::{
    constants::*,
    core::chromosome::UnknownContigPolicy,
    utils::util::expand_home,
};
use anyhow::{anyhow, Result};
use chrono::Datelike;
use clap::{ArgAction, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{io::Write, path::PathBuf};

/// Full version string including the crate version and git description.
///
/// # Examples
/// * `0.1.0-1ba958a-dirty` - while on a dirty branch
/// * `0.1.0-1ba958a` - with a fresh commit
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    let git_describe = option_env!("VERGEN_GIT_DESCRIBE").unwrap_or_default();
    if git_describe.is_empty() || git_describe == "VERGEN_IDEMPOTENT_OUTPUT" {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe)
    }
});

#[derive(Parser, Debug)]
#[command(name="varlabel",
          version=&**FULL_VERSION,
          about="Labeled variant dataset preparation",
          long_about = None,
          after_help = format!("Copyright (C) {}. This program comes with ABSOLUTELY NO WARRANTY.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Order(OrderArgs),
    Merge(MergeArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Order(_) => "order",
            Command::Merge(_) => "merge",
        }
    }
}

/// Sort a variant file by chromosome (1..22, X, Y, MT) and position
#[derive(Parser, Debug, Clone)]
#[command(arg_required_else_help(true))]
pub struct OrderArgs {
    /// Gzip-compressed tab-separated variant file
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        value_parser = check_file_exists
    )]
    pub input: PathBuf,

    /// Output file, `.gz` is appended when missing
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,

    /// Column holding the chromosome name
    #[arg(
        long = "chrom-column",
        value_name = "NAME",
        default_value = DEFAULT_CHROM_COLUMN,
        help_heading = "Advanced"
    )]
    pub chrom_column: String,

    /// Column holding the position
    #[arg(
        long = "pos-column",
        value_name = "NAME",
        default_value = DEFAULT_POS_COLUMN,
        help_heading = "Advanced"
    )]
    pub pos_column: String,

    #[command(flatten)]
    pub output_args: OutputArgs,
}

/// Merge annotation and clinical tables into a labeled training set
#[derive(Parser, Debug, Clone)]
#[command(arg_required_else_help(true))]
pub struct MergeArgs {
    /// Annotation file with %CHROM, %POS, %REF, %ALT and %SYMBOL_SOURCE columns
    #[arg(
        short = 'a',
        long = "annotation",
        value_name = "FILE",
        value_parser = check_file_exists
    )]
    pub annotation: PathBuf,

    /// Clinical file with #CHROM, POS, REF, ALT and clinsig columns
    #[arg(
        short = 'c',
        long = "clinical",
        value_name = "FILE",
        value_parser = check_file_exists
    )]
    pub clinical: PathBuf,

    /// Output file, `.gz` is appended when missing
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,

    /// Sort the merged rows by %CHROM and %POS before writing
    #[arg(long = "order")]
    pub order: bool,

    #[command(flatten)]
    pub output_args: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct OutputArgs {
    /// How to order contigs outside 1..22, X, Y, MT: reject|last
    #[arg(
        long = "unknown-contigs",
        value_name = "POLICY",
        default_value = "reject",
        value_parser = parse_unknown_contig_policy,
        help_heading = "Advanced"
    )]
    pub unknown_contigs: UnknownContigPolicy,

    /// Gzip compression level of the output (0-9)
    #[arg(
        long = "compression-level",
        value_name = "LEVEL",
        default_value_t = DEFAULT_COMPRESSION_LEVEL,
        value_parser = compression_level_in_range,
        help_heading = "Advanced"
    )]
    pub compression_level: u32,
}

/// Initializes the verbosity level for logging based on the command-line arguments.
///
/// Sets up the logger with a specific verbosity level that is determined
/// by the number of occurrences of the `-v` or `--verbose` flag in the command-line arguments.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

/// Expands a leading `~` and checks that the file exists.
fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = expand_home(s);
    if !path.exists() {
        return Err(anyhow!("File does not exist: {}", path.display()));
    }
    Ok(path)
}

fn compression_level_in_range(s: &str) -> Result<u32> {
    let level: u32 = s
        .parse::<u32>()
        .map_err(|_| anyhow!("`{}` is not a valid compression level", s))?;
    if level > 9 {
        return Err(anyhow!("Compression level must be between 0 and 9"));
    }
    Ok(level)
}

fn parse_unknown_contig_policy(s: &str) -> Result<UnknownContigPolicy> {
    s.parse::<UnknownContigPolicy>().map_err(|e| anyhow!("{e}"))
}
