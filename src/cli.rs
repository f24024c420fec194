use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (defaults to ./seedload.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bulk-load a CSV file into a table in fixed-size chunks
    Load(LoadArgs),
    /// Load the same CSV once per batch size and compare stage timings
    Bench(BenchArgs),
    /// Repeat a limited DELETE until a pass affects fewer rows than the limit
    Purge(PurgeArgs),
    /// Time repeated point lookups, e.g. indexed vs non-indexed columns
    Stress(StressArgs),
    /// Show the engine status counters the loader samples
    Status,
}

#[derive(ClapArgs, Debug)]
pub struct LoadArgs {
    /// CSV file with a header row naming the target columns
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long)]
    pub table: String,

    /// Rows per INSERT (overrides loader.batch_size)
    #[arg(long, allow_negative_numbers = true)]
    pub batch_size: Option<i64>,

    /// Sample engine status after every chunk
    #[arg(long)]
    pub engine_metrics: bool,

    /// After each chunk, delete half as many rows again, newest first by this column
    #[arg(long, value_name = "COLUMN")]
    pub delete_half_by: Option<String>,

    /// Print the stage report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct BenchArgs {
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long)]
    pub table: String,

    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [100, 1000, 5000, 10000],
        allow_negative_numbers = true
    )]
    pub batch_sizes: Vec<i64>,

    /// TRUNCATE the table before each stage
    #[arg(long)]
    pub truncate: bool,

    #[arg(long)]
    pub json: bool,
}

/// At least one of the caps is required; purging never runs unbounded.
#[derive(ClapArgs, Debug)]
#[command(group(
    ArgGroup::new("cap")
        .required(true)
        .multiple(true)
        .args(["max_attempts", "max_duration_secs"])
))]
pub struct PurgeArgs {
    #[arg(long)]
    pub table: String,

    /// Raw SQL condition for the DELETE
    #[arg(long = "where")]
    pub condition: Option<String>,

    /// Rows per DELETE pass
    #[arg(long)]
    pub limit: u64,

    #[arg(long, default_value_t = 3000)]
    pub delay_ms: u64,

    /// Give up after this many passes
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Give up after this many seconds
    #[arg(long)]
    pub max_duration_secs: Option<u64>,
}

#[derive(ClapArgs, Debug)]
pub struct StressArgs {
    /// Query to repeat; `{n}` becomes the iteration number. Repeat the flag to compare queries.
    #[arg(long = "query", required = true)]
    pub queries: Vec<String>,

    #[arg(long, default_value = "100")]
    pub iterations: NonZeroU32,

    /// Minimum time between progress log lines
    #[arg(long, default_value_t = 1000)]
    pub log_interval_ms: u64,

    #[arg(long)]
    pub json: bool,
}
