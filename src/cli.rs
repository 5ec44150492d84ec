// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI is described by plain structs and the
// #[arg(...)] attributes on their fields. Tunable options can also come from
// FUZZ_SENTINEL_* environment variables (clap's `env` feature), which is
// handy when the same settings are reused across many targets.
// =============================================================================

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use tokio::sync::Semaphore;

#[derive(Parser, Debug)]
#[command(
    name = "fuzz-sentinel",
    version,
    about = "Concurrent content discovery that backs off when a WAF pushes back",
    long_about = "fuzz-sentinel replaces FUZZ in a URL template with every word of a wordlist, \
                  requests each URL concurrently and prints what it finds. When the target starts \
                  rate limiting or serving WAF pages it pauses before carrying on."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging entirely
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Brute-force paths on a target
    ///
    /// Example: fuzz-sentinel run -u https://example.com/FUZZ -w words.txt -s 404 -T 20
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Target URL with FUZZ as the placeholder (e.g., https://example.com/FUZZ)
    #[arg(short, long)]
    pub url: String,

    /// Path to a newline-separated wordlist
    #[arg(short, long)]
    pub wordlist: PathBuf,

    /// Seconds to wait after blocking is detected
    #[arg(
        short = 't',
        long,
        visible_alias = "time",
        env = "FUZZ_SENTINEL_WAIT_SECONDS",
        default_value_t = 320
    )]
    pub wait_seconds: u64,

    /// Status codes to hide from output (comma-separated, e.g., 403,503,421)
    #[arg(
        short,
        long,
        visible_alias = "silent",
        env = "FUZZ_SENTINEL_SILENT_CODES",
        value_delimiter = ','
    )]
    pub silent_codes: Vec<String>,

    /// Maximum number of requests in flight
    #[arg(
        short = 'T',
        long,
        env = "FUZZ_SENTINEL_THREADS",
        default_value_t = 50,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=Semaphore::MAX_PERMITS as u64)
    )]
    pub threads: usize,

    /// Custom header in the format 'Key:Value' (repeatable)
    #[arg(short = 'H', long = "header", value_name = "KEY:VALUE")]
    pub headers: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "FUZZ_SENTINEL_TIMEOUT",
        default_value_t = 10,
        value_parser = RangedU64ValueParser::<u64>::new().range(1..)
    )]
    pub timeout: u64,

    /// Consecutive 403 responses that count as being blocked
    #[arg(
        long,
        env = "FUZZ_SENTINEL_BLOCK_THRESHOLD",
        default_value_t = 50,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub block_threshold: usize,

    /// Print findings as JSON lines instead of colored text
    #[arg(long)]
    pub json: bool,
}
