// src/probe/mod.rs
// =============================================================================
// Everything needed to probe one candidate, with no notion of concurrency.
//
// Submodules:
// - target: URL templates and the per-word requests built from them
// - http: sends one request and maps transport failures to error kinds
// - html: pulls the <title> out of a response body
// - classify: blocking detection, suppression and display category
//
// The dispatch engine drives these for every word in the wordlist.
// =============================================================================

mod classify;
mod html;
mod http;
mod target;

pub use classify::{Category, Classifier, ForbiddenStreak, DEFAULT_BLOCK_THRESHOLD};
pub use http::{Execute, Fetched, HttpExecutor, TransportError, TransportErrorKind};
pub use target::{TargetRequest, UrlTemplate};
