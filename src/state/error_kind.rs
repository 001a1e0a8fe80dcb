/// Record-level failure kinds
///
/// Every failed record in a batch carries exactly one of these. They are
/// persisted in `results.json` and shown in reports.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a record failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The page could not be loaded (network, HTTP status, timeout)
    Navigation,

    /// The content element never attached within the timeout
    SelectorTimeout,

    /// The page loaded but the content element was not in it
    ExtractionMiss,

    /// The record had no usable URL; nothing was fetched
    EmptyUrl,

    /// The element was found but could not be converted to markdown
    Conversion,
}

impl ErrorKind {
    /// Stable snake_case name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::SelectorTimeout => "selector_timeout",
            Self::ExtractionMiss => "extraction_miss",
            Self::EmptyUrl => "empty_url",
            Self::Conversion => "conversion",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
