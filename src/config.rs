// src/config.rs
// =============================================================================
// Turns parsed command-line arguments into a validated RunConfig.
//
// Everything that can be wrong with the operator's input is caught here,
// before a single request goes out:
// - URL template without the FUZZ placeholder
// - header arguments that aren't "Key:Value"
// - silent codes that aren't numbers
// (wordlist problems are caught by the wordlist module with the same error type)
//
// Rust concepts:
// - thiserror: derive Display/Error for an enum of error cases
// - HeaderMap: reqwest's case-insensitive header collection
// =============================================================================

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use thiserror::Error;

use crate::cli::RunArgs;
use crate::dispatch::DispatchConfig;
use crate::probe::UrlTemplate;

// Problems with the operator's input. All of them abort the run before
// dispatch starts.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("wordlist file '{}' could not be read: {source}", .path.display())]
    WordlistUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no valid entries found in the wordlist '{}'", .path.display())]
    EmptyWordlist { path: PathBuf },

    #[error("the URL must contain the placeholder 'FUZZ': {url}")]
    MissingPlaceholder { url: String },

    #[error("invalid header format: {header}. Headers should be in the format 'Key:Value'")]
    MalformedHeader { header: String },

    #[error("invalid header '{header}': {reason}")]
    InvalidHeader { header: String, reason: String },

    #[error("invalid silent status code '{code}'")]
    InvalidSilentCode { code: String },
}

/// Everything a run needs, validated
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub template: UrlTemplate,
    pub wordlist: PathBuf,
    pub headers: HeaderMap,
    pub silent_codes: HashSet<u16>,
    pub threads: usize,
    pub wait: Duration,
    pub timeout: Duration,
    pub block_threshold: usize,
    pub json: bool,
}

impl RunConfig {
    pub fn from_args(args: &RunArgs) -> Result<Self, InputError> {
        let headers = build_headers(&args.headers)?;
        let silent_codes = parse_silent_codes(&args.silent_codes)?;
        let template = UrlTemplate::parse(&args.url)?;

        Ok(Self {
            template,
            wordlist: args.wordlist.clone(),
            headers,
            silent_codes,
            threads: args.threads,
            wait: Duration::from_secs(args.wait_seconds),
            timeout: Duration::from_secs(args.timeout),
            block_threshold: args.block_threshold,
            json: args.json,
        })
    }

    pub fn dispatch(&self) -> DispatchConfig {
        DispatchConfig {
            threads: self.threads,
            wait: self.wait,
            block_threshold: self.block_threshold,
            silent_codes: self.silent_codes.clone(),
        }
    }
}

/// The User-Agent sent unless the operator overrides it
pub fn default_user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; fuzz-sentinel/{})",
        env!("CARGO_PKG_VERSION")
    )
}

// Builds the run's header set: the default User-Agent first, then every
// operator header on top (so "-H 'User-Agent: x'" replaces ours)
pub fn build_headers(raw_headers: &[String]) -> Result<HeaderMap, InputError> {
    let mut headers = HeaderMap::new();

    let user_agent = HeaderValue::from_str(&default_user_agent()).map_err(|e| {
        InputError::InvalidHeader {
            header: USER_AGENT.to_string(),
            reason: e.to_string(),
        }
    })?;
    headers.insert(USER_AGENT, user_agent);

    for raw in raw_headers {
        let (name, value) = parse_header(raw)?;
        headers.insert(name, value);
    }

    Ok(headers)
}

// Parses one "Key:Value" argument
//
// Only the first ':' splits, so "Authorization: Bearer a:b" keeps its
// value intact. Both sides are trimmed.
pub fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), InputError> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| InputError::MalformedHeader {
            header: raw.to_string(),
        })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(InputError::MalformedHeader {
            header: raw.to_string(),
        });
    }

    let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| InputError::InvalidHeader {
        header: raw.to_string(),
        reason: e.to_string(),
    })?;
    let value = HeaderValue::from_str(value.trim()).map_err(|e| InputError::InvalidHeader {
        header: raw.to_string(),
        reason: e.to_string(),
    })?;

    Ok((name, value))
}

// Parses the silent codes; clap has already split on ','
pub fn parse_silent_codes(raw_codes: &[String]) -> Result<HashSet<u16>, InputError> {
    raw_codes
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .map(|code| {
            code.parse::<u16>()
                .map_err(|_| InputError::InvalidSilentCode {
                    code: code.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec![
            "fuzz-sentinel",
            "run",
            "-u",
            "https://ex.com/FUZZ",
            "-w",
            "words.txt",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_header() {
        let (name, value) = parse_header("Authorization: Bearer TOKEN").unwrap();
        assert_eq!(name.as_str(), "authorization");
        assert_eq!(value, "Bearer TOKEN");
    }

    #[test]
    fn test_parse_header_splits_on_first_colon() {
        let (name, value) = parse_header("X-Forwarded-For:10.0.0.1:8080").unwrap();
        assert_eq!(name.as_str(), "x-forwarded-for");
        assert_eq!(value, "10.0.0.1:8080");
    }

    #[test]
    fn test_header_without_colon_is_rejected() {
        let err = parse_header("NoColonHere").unwrap_err();
        assert!(matches!(err, InputError::MalformedHeader { ref header } if header == "NoColonHere"));
    }

    #[test]
    fn test_header_without_name_is_rejected() {
        assert!(matches!(
            parse_header(" : value").unwrap_err(),
            InputError::MalformedHeader { .. }
        ));
    }

    #[test]
    fn test_header_with_illegal_name_is_rejected() {
        assert!(matches!(
            parse_header("Bad Name: value").unwrap_err(),
            InputError::InvalidHeader { .. }
        ));
    }

    #[test]
    fn test_default_user_agent_is_present() {
        let headers = build_headers(&[]).unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), default_user_agent().as_str());
    }

    #[test]
    fn test_user_agent_override_is_case_insensitive() {
        let headers = build_headers(&strings(&["user-agent: custom/1.0", "X-Api-Key: k"])).unwrap();
        assert_eq!(headers.get_all(USER_AGENT).iter().count(), 1);
        assert_eq!(headers.get(USER_AGENT).unwrap(), "custom/1.0");
        assert_eq!(headers.get("x-api-key").unwrap(), "k");
    }

    #[test]
    fn test_parse_silent_codes() {
        let codes = parse_silent_codes(&strings(&["403", " 503", "421 ", ""])).unwrap();
        assert_eq!(codes, HashSet::from([403, 503, 421]));
    }

    #[test]
    fn test_invalid_silent_code() {
        let err = parse_silent_codes(&strings(&["404", "abc"])).unwrap_err();
        assert!(matches!(err, InputError::InvalidSilentCode { ref code } if code == "abc"));
    }

    #[test]
    fn test_run_config_from_defaults() {
        let config = RunConfig::from_args(&run_args(&[])).unwrap();
        assert_eq!(config.template.as_str(), "https://ex.com/FUZZ");
        assert_eq!(config.threads, 50);
        assert_eq!(config.wait, Duration::from_secs(320));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.block_threshold, 50);
        assert!(config.silent_codes.is_empty());
        assert!(config.headers.contains_key(USER_AGENT));

        let dispatch = config.dispatch();
        assert_eq!(dispatch.threads, 50);
        assert_eq!(dispatch.wait, Duration::from_secs(320));
    }

    #[test]
    fn test_run_config_rejects_malformed_header() {
        let err = RunConfig::from_args(&run_args(&["-H", "NoColonHere"])).unwrap_err();
        assert!(matches!(err, InputError::MalformedHeader { .. }));
        assert!(err.to_string().contains("'Key:Value'"));
    }

    #[test]
    fn test_run_config_rejects_template_without_placeholder() {
        let mut args = run_args(&[]);
        args.url = "https://ex.com/admin".to_string();
        let err = RunConfig::from_args(&args).unwrap_err();
        assert!(matches!(err, InputError::MissingPlaceholder { .. }));
    }

    #[test]
    fn test_run_config_silent_codes() {
        let config = RunConfig::from_args(&run_args(&["-s", "404, 403"])).unwrap();
        assert_eq!(config.silent_codes, HashSet::from([403, 404]));
    }
}
