// src/probe/target.rs
// =============================================================================
// URL templates and the per-word requests built from them.
//
// A template is a URL with one or more FUZZ markers in it, e.g.
//   https://example.com/FUZZ
//   https://example.com/FUZZ/FUZZ.bak
//
// Each word from the wordlist is substituted into every marker to produce a
// TargetRequest. Templates are validated once, before dispatch starts, so
// a worker never has to deal with a template that has nothing to replace.
// =============================================================================

use crate::config::InputError;

/// The marker that gets replaced by each wordlist entry
pub const PLACEHOLDER: &str = "FUZZ";

/// A URL template known to contain the placeholder at least once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
}

impl UrlTemplate {
    /// Validates that `raw` contains the placeholder
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        if !raw.contains(PLACEHOLDER) {
            return Err(InputError::MissingPlaceholder {
                url: raw.to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Builds the request for one candidate word
    pub fn resolve(&self, candidate: &str) -> TargetRequest {
        TargetRequest {
            candidate: candidate.to_string(),
            url: self.raw.replace(PLACEHOLDER, candidate),
        }
    }
}

/// One attempt: the candidate word and the URL it resolved to.
///
/// Built fresh for every attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRequest {
    candidate: String,
    url: String,
}

impl TargetRequest {
    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
