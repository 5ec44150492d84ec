// src/probe/classify.rs
// =============================================================================
// This module decides what a response means.
//
// For every response we answer three questions:
// 1. Is the target pushing back on us? (WAF page, rate limit, 403 wall)
// 2. Did the operator ask us to hide this status code?
// 3. Which color bucket does it go in for display?
//
// Question 1 is partly stateful: a single 403 is normal, but a long run of
// them in a row usually means a WAF has started rejecting everything. That
// run length lives in a ForbiddenStreak shared by every worker.
// =============================================================================

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::http::Fetched;

/// Consecutive 403s needed before we treat them as blocking
pub const DEFAULT_BLOCK_THRESHOLD: usize = 50;

// Matched case-insensitively against the whole body
const BODY_MARKERS: &[&str] = &["captcha", "access denied"];

/// Run length of consecutive 403 responses, in completion order.
///
/// Updated by every classification from every worker. Under concurrency
/// the count is approximate (two workers can interleave a 403 and a 200),
/// which is fine for a heuristic; each individual update is atomic.
#[derive(Debug, Default)]
pub struct ForbiddenStreak {
    count: AtomicUsize,
}

impl ForbiddenStreak {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one completed response and returns the streak after it
    pub fn record(&self, status: u16) -> usize {
        if status == 403 {
            self.count.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.count.store(0, Ordering::SeqCst);
            0
        }
    }

    pub fn current(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Display bucket for a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// 200
    Ok,
    /// 301, 302, 400, 401
    RedirectOrAuth,
    /// Everything else
    Other,
}

impl Category {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => Category::Ok,
            301 | 302 | 400 | 401 => Category::RedirectOrAuth,
            _ => Category::Other,
        }
    }
}

/// Why a response was judged to be blocking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// 429 Too Many Requests
    RateLimited,
    /// The body contains one of the WAF marker phrases
    BodyMarker(&'static str),
    /// Too many 403s in a row
    Sustained403 { streak: usize },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::RateLimited => write!(f, "rate limiting (429 Too Many Requests)"),
            BlockReason::BodyMarker(marker) => write!(f, "WAF marker \"{}\" in response body", marker),
            BlockReason::Sustained403 { streak } => {
                write!(f, "{} consecutive 403 responses", streak)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Set when the response looks like the target is blocking us
    pub blocked: Option<BlockReason>,
    /// The status is in the operator's silent set
    pub suppress: bool,
    pub category: Category,
}

impl Classification {
    pub fn is_blocklike(&self) -> bool {
        self.blocked.is_some()
    }
}

// The classifier itself holds only run configuration; the mutable streak
// is passed in so the dispatch engine stays its owner.
#[derive(Debug, Clone)]
pub struct Classifier {
    block_threshold: usize,
    silent_codes: HashSet<u16>,
}

impl Classifier {
    pub fn new(block_threshold: usize, silent_codes: HashSet<u16>) -> Self {
        Self {
            block_threshold,
            silent_codes,
        }
    }

    pub fn classify(&self, response: &Fetched, streak: &ForbiddenStreak) -> Classification {
        let status = response.status;

        // Always update the streak, even if something else flags the response
        let run_length = streak.record(status);

        let blocked = if status == 403 && run_length >= self.block_threshold {
            Some(BlockReason::Sustained403 { streak: run_length })
        } else if status == 429 {
            Some(BlockReason::RateLimited)
        } else {
            find_body_marker(&response.body).map(BlockReason::BodyMarker)
        };

        Classification {
            blocked,
            suppress: self.silent_codes.contains(&status),
            category: Category::from_status(status),
        }
    }
}

fn find_body_marker(body: &str) -> Option<&'static str> {
    let lowered = body.to_lowercase();
    BODY_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(marker))
}
