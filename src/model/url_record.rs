//! URL records and redirect traces
//!
//! A [`UrlRecord`] is created once per listing row, folded together with the
//! [`RedirectTrace`] of its resolution, and persisted in the manifest.

use serde::{Deserialize, Serialize};

/// Final URL placeholder for a row whose initial URL was never captured
pub const UNRESOLVED: &str = "unresolved";

/// Outcome of resolving one initial URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTrace {
    /// The URL resolution started from
    pub initial_url: String,

    /// Every distinct URL observed, in order; `chain[0] == initial_url`
    pub chain: Vec<String>,

    /// Last entry of `chain`
    pub final_url: String,

    /// Whether the initial navigation succeeded
    pub success: bool,

    /// Populated when `success` is false
    pub error_message: Option<String>,

    /// Document title at the end of resolution
    pub page_title: Option<String>,
}

impl RedirectTrace {
    /// A failed resolution: single-element chain, final URL is the initial URL
    pub fn failed(initial_url: &str, message: impl Into<String>) -> Self {
        Self {
            initial_url: initial_url.to_string(),
            chain: vec![initial_url.to_string()],
            final_url: initial_url.to_string(),
            success: false,
            error_message: Some(message.into()),
            page_title: None,
        }
    }

    /// Number of hops after the initial URL
    pub fn total_redirects(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }
}

/// One listing row and the result of resolving its link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// Label of the listing the row came from
    pub source: String,

    /// 1-based listing page
    pub page: u32,

    /// 1-based row within the page
    pub row: usize,

    /// Display name read from the row
    pub name: String,

    /// Resolved URL, or [`UNRESOLVED`]
    pub final_url: String,

    #[serde(default)]
    pub redirect_chain: Vec<String>,

    #[serde(default)]
    pub total_redirects: usize,

    #[serde(default)]
    pub page_title: Option<String>,

    #[serde(default)]
    pub resolved: bool,

    #[serde(default)]
    pub error: Option<String>,
}

impl UrlRecord {
    /// Creates a record for a row that has not been resolved yet
    pub fn pending(source: &str, page: u32, row: usize, name: &str) -> Self {
        Self {
            source: source.to_string(),
            page,
            row,
            name: name.to_string(),
            final_url: UNRESOLVED.to_string(),
            redirect_chain: Vec::new(),
            total_redirects: 0,
            page_title: None,
            resolved: false,
            error: None,
        }
    }

    /// Folds a redirect trace into the record
    ///
    /// A failed trace still leaves the initial URL as the final URL, so the
    /// fetch phase gets a chance at it.
    pub fn apply_trace(&mut self, trace: RedirectTrace) {
        self.total_redirects = trace.total_redirects();
        self.final_url = trace.final_url;
        self.redirect_chain = trace.chain;
        self.page_title = trace.page_title;
        self.resolved = trace.success;
        self.error = trace.error_message;
    }

    /// Marks the row as failed before any URL was captured
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.final_url = UNRESOLVED.to_string();
        self.resolved = false;
        self.error = Some(message.into());
    }

    /// The URL the fetch phase should load, if there is one
    pub fn usable_url(&self) -> Option<&str> {
        let url = self.final_url.trim();
        if url.is_empty() || url == UNRESOLVED {
            None
        } else {
            Some(url)
        }
    }
}
