// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout only carries findings)
// 3. Validate the input and load the wordlist, before any request goes out
// 4. Hand everything to the dispatch engine and wait for it to finish
// 5. Exit with proper code (0 = done, 1 = some words dropped while blocked,
//    2 = error)
// =============================================================================

// Module declarations
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - input validation into a RunConfig
mod dispatch; // src/dispatch/ - the concurrent engine
mod probe; // src/probe/ - one request, one classification
mod report; // src/report.rs - console and JSON output
mod wordlist; // src/wordlist.rs - wordlist loading

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, RunArgs};
use config::RunConfig;
use dispatch::Engine;
use probe::HttpExecutor;
use report::{ConsoleReporter, JsonReporter, Reporter};

#[tokio::main]
async fn main() {
    // clap handles --help/--version (exit 0) and usage errors (exit 2) itself
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every word was probed
//   Ok(1) = run finished, but some words were dropped while blocked
//   Err = bad input or unexpected failure
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run(args) => handle_run(&args).await,
    }
}

async fn handle_run(args: &RunArgs) -> Result<i32> {
    // Nothing below this point may fail because of bad input
    let config = RunConfig::from_args(args)?;
    let words = wordlist::load_wordlist(&config.wordlist).await?;

    let reporter: Arc<dyn Reporter> = if config.json {
        Arc::new(JsonReporter::new())
    } else {
        println!(
            "🔍 Fuzzing {} with {} word(s), {} at a time",
            config.template.as_str(),
            words.len(),
            config.threads
        );
        Arc::new(ConsoleReporter::new())
    };

    let executor = Arc::new(HttpExecutor::new(config.headers.clone(), config.timeout)?);
    let engine = Engine::new(executor, reporter, config.dispatch());

    let summary = engine.run(&config.template, words).await;

    if summary.blocked > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins; otherwise -v flags pick the level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,hyper=warn,reqwest=warn,html5ever=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}


// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why validate everything before starting?
//    - A typo in a header or a missing FUZZ would otherwise be discovered
//      only after thousands of requests
//    - The engine can then assume its inputs are sane
//
// 2. Why Arc<dyn Reporter>?
//    - Every worker task needs to report, so the reporter is shared
//    - dyn lets us pick console or JSON output at runtime
//
// 3. Why logs on stderr?
//    - stdout carries the findings (possibly JSON), which people pipe
//      into other tools; warnings must not end up in there
// -----------------------------------------------------------------------------
