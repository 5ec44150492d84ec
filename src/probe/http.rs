// src/probe/http.rs
// =============================================================================
// This module performs a single probe: one GET for one resolved URL.
//
// Key functionality:
// - Sends the request with the run's header set and per-request timeout
// - Reads the whole body so we can measure it and look inside it
// - Maps every transport failure onto a small enum of error kinds
//
// It knows nothing about concurrency, blocking or output. The dispatch
// engine decides what to do with the result.
// =============================================================================

use std::error::Error as _;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::html::extract_title;
use super::target::TargetRequest;

// Why a request never produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// TLS handshake or certificate failure
    Tls,
    /// The resolved URL could not be parsed or sent
    InvalidUrl,
    /// Connection refused, reset, DNS failure, ...
    Connect,
    /// The per-request timeout elapsed
    Timeout,
    /// The response started but the body could not be read
    Body,
    /// Anything reqwest reports that doesn't fit above
    Other,
}

/// Transport failures that are expected noise at high concurrency.
///
/// These are logged at debug level only. Anything outside the set is logged
/// as a warning. Neither kind is printed or retried.
pub const IGNORED_TRANSPORT_ERRORS: &[TransportErrorKind] = &[
    TransportErrorKind::Tls,
    TransportErrorKind::InvalidUrl,
    TransportErrorKind::Connect,
    TransportErrorKind::Timeout,
    TransportErrorKind::Body,
];

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Tls => "tls",
            TransportErrorKind::InvalidUrl => "invalid url",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Other => "transport",
        }
    }

    pub fn is_ignored(&self) -> bool {
        IGNORED_TRANSPORT_ERRORS.contains(self)
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{kind} error for {url}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub url: String,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, url: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// A response that made it back to us in full
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    /// Body decoded as UTF-8, invalid sequences replaced
    pub body: String,
    /// Length of the raw body in bytes
    pub content_length: usize,
}

impl Fetched {
    pub fn title(&self) -> String {
        extract_title(&self.body)
    }
}

/// Something that can turn a target into a response.
///
/// The dispatch engine is generic over this so it can be driven by the real
/// HTTP client or by a scripted fake in tests.
#[async_trait]
pub trait Execute: Send + Sync {
    async fn execute(&self, target: &TargetRequest) -> Result<Fetched, TransportError>;
}

// The real executor, backed by one shared reqwest client.
//
// reqwest::Client pools connections internally, so a single instance is
// shared by every worker for the whole run.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Builds the client with the run's fixed header set and timeout
    pub fn new(headers: HeaderMap, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Execute for HttpExecutor {
    async fn execute(&self, target: &TargetRequest) -> Result<Fetched, TransportError> {
        // Words can contain anything, so the resolved URL may not be valid
        let url = Url::parse(target.url()).map_err(|e| {
            TransportError::new(TransportErrorKind::InvalidUrl, target.url(), e.to_string())
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| categorize_error(target.url(), e))?;

        let status = response.status().as_u16();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| categorize_error(target.url(), e))?;

        Ok(Fetched {
            status,
            content_length: bytes.len(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

// Categorizes a reqwest error into one of our kinds
//
// reqwest's top-level message is often just "error sending request", with
// the interesting part (e.g. "invalid peer certificate") buried in the
// source chain, so we flatten the chain before looking at it.
fn categorize_error(url: &str, error: reqwest::Error) -> TransportError {
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    let lowered = detail.to_lowercase();

    // TLS failures also report is_connect(), so check them first
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_builder() {
        TransportErrorKind::InvalidUrl
    } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl")
    {
        TransportErrorKind::Tls
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else if error.is_body() || error.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Other
    };

    TransportError::new(kind, url, detail)
}
