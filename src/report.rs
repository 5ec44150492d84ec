// src/report.rs
// =============================================================================
// Renders what the dispatch engine finds.
//
// The engine calls a Reporter:
// - once per finding that isn't hidden or blocked (result)
// - once per finished candidate (progress)
// - once at the very end (finish)
//
// Two implementations:
// - ConsoleReporter: colored lines plus a self-overwriting progress line
// - JsonReporter: one JSON object per finding (JSON Lines), for piping
//
// Reporters write straight to stdout with no buffering; logs go to stderr.
// =============================================================================

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::dispatch::{Progress, RunSummary};
use crate::probe::Category;

/// One line of output: a response worth showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub status: u16,
    pub url: String,
    pub title: String,
    pub content_length: usize,
    pub category: Category,
}

pub trait Reporter: Send + Sync {
    fn result(&self, hit: &Hit);

    fn progress(&self, completed: usize, total: usize);

    fn finish(&self, _summary: &RunSummary) {}
}

// Carriage return plus ANSI "erase entire line". A result line has to wipe
// the progress line it lands on, which `colored` has no helper for.
const CLEAR_LINE: &str = "\r\x1b[2K";

#[derive(Debug, Default)]
pub struct ConsoleReporter {
    // Highest progress count written so far
    shown: AtomicUsize,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    // Workers finish in any order, so an older count can arrive after a
    // newer one. Only counts above everything shown so far are drawn.
    fn advances(&self, completed: usize) -> bool {
        self.shown.fetch_max(completed, Ordering::SeqCst) < completed
    }
}

impl Reporter for ConsoleReporter {
    fn result(&self, hit: &Hit) {
        println!("{}{}", CLEAR_LINE, format_hit(hit));
    }

    fn progress(&self, completed: usize, total: usize) {
        // Checked under the stdout lock so draws happen in count order
        let mut stdout = io::stdout().lock();
        if !self.advances(completed) {
            return;
        }
        let _ = write!(stdout, "\r{}", format_progress(completed, total));
        let _ = stdout.flush();
    }

    fn finish(&self, summary: &RunSummary) {
        println!();
        println!();
        println!("📊 Summary:");
        println!("   ✅ Found: {}", summary.hits);
        println!("   🔇 Silenced: {}", summary.suppressed);
        println!("   ⚠️  Transport errors: {}", summary.transport_errors);
        println!("   🛑 Dropped while blocked: {}", summary.blocked);
        println!("   📋 Total: {}/{}", summary.completed, summary.total);
    }
}

#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for JsonReporter {
    fn result(&self, hit: &Hit) {
        match serde_json::to_string(hit) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to serialize result for {}: {}", hit.url, e),
        }
    }

    // Progress would corrupt the JSON stream
    fn progress(&self, _completed: usize, _total: usize) {}

    fn finish(&self, summary: &RunSummary) {
        match serde_json::to_string(&serde_json::json!({ "summary": summary })) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to serialize summary: {}", e),
        }
    }
}

// Formats a finding as "[status] url - [title] - [length]"
//
// Status and URL are colored by category, the title yellow and the length
// bright green.
pub fn format_hit(hit: &Hit) -> String {
    let head = color_for(hit.category, format!("[{}] {}", hit.status, hit.url));
    let title = format!("[{}]", hit.title).yellow();
    let length = format!("[{}]", hit.content_length).bright_green();
    format!("{} - {} - {}", head, title, length)
}

pub fn format_progress(completed: usize, total: usize) -> String {
    format!(
        "Progress: {:.2}% completed.",
        Progress::percent(completed, total)
    )
    .cyan()
    .to_string()
}

fn color_for(category: Category, text: String) -> ColoredString {
    match category {
        Category::Ok => text.blue(),
        Category::RedirectOrAuth => text.green(),
        Category::Other => text.red(),
    }
}
