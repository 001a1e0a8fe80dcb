//! Browser automation seam
//!
//! The pipeline never talks to a browser directly. It drives two kinds of
//! handles through these traits:
//!
//! - [`Navigator`]: one long-lived navigation handle (a tab) used for redirect
//!   resolution and browser-mode content fetches
//! - [`ListingDriver`]: the listing tab, its row handles and popup capture
//!
//! Every call is fallible and the callers treat a failure as a per-call error.
//! Methods take `&mut self`, so a handle can never be driven concurrently.

#[cfg(feature = "browser")]
pub mod chromium;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a browser driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {timeout_ms}ms waiting for selector '{selector}'")]
    SelectorTimeout { selector: String, timeout_ms: u64 },

    #[error("No popup opened within {timeout_ms}ms")]
    PopupTimeout { timeout_ms: u64 },

    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// How long `navigate` waits before returning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Return once the DOM is parsed
    DomContentLoaded,
    /// Return once the load event fired
    Load,
    /// Return once network activity settled
    NetworkIdle,
}

impl WaitPolicy {
    /// Whether a `document.readyState` value satisfies this policy
    pub fn is_reached_by(self, ready_state: &str) -> bool {
        match self {
            Self::DomContentLoaded => matches!(ready_state, "interactive" | "complete"),
            Self::Load | Self::NetworkIdle => ready_state == "complete",
        }
    }
}

impl fmt::Display for WaitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DomContentLoaded => "domcontentloaded",
            Self::Load => "load",
            Self::NetworkIdle => "networkidle",
        };
        f.write_str(name)
    }
}

/// A single navigation handle
#[allow(async_fn_in_trait)]
pub trait Navigator {
    /// Navigates to `url`
    async fn navigate(&mut self, url: &str, wait: WaitPolicy) -> DriverResult<()>;

    /// The URL the handle currently shows
    async fn current_url(&mut self) -> DriverResult<String>;

    /// Waits until network activity settles, bounded by `timeout`
    async fn wait_for_network_idle(&mut self, timeout: Duration) -> DriverResult<()>;

    /// Waits until `selector` matches an attached element
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> DriverResult<()>;

    /// The document title, if any
    async fn page_title(&mut self) -> DriverResult<Option<String>>;

    /// Serialized HTML of the current document
    async fn content(&mut self) -> DriverResult<String>;
}

/// A navigation context opened by a simulated click
#[allow(async_fn_in_trait)]
pub trait Popup {
    /// The URL the popup was opened with
    async fn url(&mut self) -> DriverResult<String>;

    /// Closes the popup
    async fn close(self) -> DriverResult<()>;
}

/// The listing tab and its rows
#[allow(async_fn_in_trait)]
pub trait ListingDriver {
    /// Handle to one result row
    type Row;

    /// Handle to a captured popup
    type Popup: Popup;

    /// Opens the listing page
    async fn open(&mut self, url: &str) -> DriverResult<()>;

    /// Waits until `selector` matches an attached element
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> DriverResult<()>;

    /// Collects all elements matching `selector`
    async fn query_all(&mut self, selector: &str) -> DriverResult<Vec<Self::Row>>;

    /// Reads a row's title from the element matching `selector` inside it
    async fn row_title(&mut self, row: &Self::Row, selector: &str) -> DriverResult<Option<String>>;

    /// Clicks a row and captures the popup it opens
    async fn click_for_popup(
        &mut self,
        row: &Self::Row,
        timeout: Duration,
    ) -> DriverResult<Self::Popup>;

    /// Activates the "next page" control
    ///
    /// Returns `Ok(false)` when the control is absent or disabled.
    async fn next_page(&mut self, selector: &str) -> DriverResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_policy_display() {
        assert_eq!(WaitPolicy::DomContentLoaded.to_string(), "domcontentloaded");
        assert_eq!(WaitPolicy::Load.to_string(), "load");
        assert_eq!(WaitPolicy::NetworkIdle.to_string(), "networkidle");
    }

    #[test]
    fn test_wait_policy_ready_states() {
        assert!(!WaitPolicy::DomContentLoaded.is_reached_by("loading"));
        assert!(WaitPolicy::DomContentLoaded.is_reached_by("interactive"));
        assert!(WaitPolicy::DomContentLoaded.is_reached_by("complete"));

        for policy in [WaitPolicy::Load, WaitPolicy::NetworkIdle] {
            assert!(!policy.is_reached_by("interactive"), "{}", policy);
            assert!(policy.is_reached_by("complete"), "{}", policy);
        }
    }

    #[test]
    fn test_error_messages_name_the_target() {
        let err = DriverError::Navigation {
            url: "https://example.com/".to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        };
        assert!(err.to_string().contains("https://example.com/"));

        let err = DriverError::SelectorTimeout {
            selector: "#mainContent".to_string(),
            timeout_ms: 8000,
        };
        assert!(err.to_string().contains("#mainContent"));
    }
}
