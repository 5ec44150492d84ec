// src/probe/html.rs
// =============================================================================
// This module pulls the page title out of an HTML response body.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (tolerates broken markup the way browsers do)
// - Supports CSS selectors for finding elements
//
// The title is only used for display, so anything we can't find or can't
// make sense of collapses to the literal "No Title".
// =============================================================================

use scraper::{Html, Selector};

/// Shown when a page has no usable <title>
pub const NO_TITLE: &str = "No Title";

// Extracts the text of the first <title> element
//
// Parameters:
//   html: the response body (borrowed as &str)
//
// Returns: the trimmed title text, or NO_TITLE if absent or empty
//
// Example:
//   html = "<html><head><title> Admin Panel </title></head></html>"
//   result = "Admin Panel"
pub fn extract_title(html: &str) -> String {
    // Cheap early exit: most 404 bodies and JSON APIs have no title at all
    if !html.to_ascii_lowercase().contains("<title") {
        return NO_TITLE.to_string();
    }

    let document = Html::parse_document(html);

    // The selector is a constant, so a parse failure would be a bug here,
    // but we still fall back instead of panicking inside a worker
    let selector = match Selector::parse("title") {
        Ok(selector) => selector,
        Err(_) => return NO_TITLE.to_string(),
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}
