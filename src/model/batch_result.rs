use crate::model::UrlRecord;
use crate::state::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extracted content of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub title: Option<String>,
    pub content: String,
    pub element_found: bool,
}

/// A contained, record-level failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RecordFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl RecordFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of processing one record; never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Index into the full record set
    pub record_index: usize,
    pub batch_number: usize,
    pub success: bool,
    #[serde(default)]
    pub payload: Option<Payload>,
    #[serde(default)]
    pub error_kind: Option<ErrorKind>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub name: String,
    pub source: String,
    pub url: String,
}

impl BatchResult {
    pub fn success(
        record_index: usize,
        batch_number: usize,
        record: &UrlRecord,
        payload: Payload,
    ) -> Self {
        Self {
            record_index,
            batch_number,
            success: true,
            payload: Some(payload),
            error_kind: None,
            error_message: None,
            name: record.name.clone(),
            source: record.source.clone(),
            url: record.final_url.clone(),
        }
    }

    pub fn failure(
        record_index: usize,
        batch_number: usize,
        record: &UrlRecord,
        failure: RecordFailure,
    ) -> Self {
        Self {
            record_index,
            batch_number,
            success: false,
            payload: None,
            error_kind: Some(failure.kind),
            error_message: Some(failure.message),
            name: record.name.clone(),
            source: record.source.clone(),
            url: record.final_url.clone(),
        }
    }

    /// 1-based position within the full record set
    pub fn ordinal(&self) -> usize {
        self.record_index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_kind_and_message() {
        let record = UrlRecord::pending("list", 1, 1, "Alpha");
        let result = BatchResult::failure(
            6,
            2,
            &record,
            RecordFailure::new(ErrorKind::EmptyUrl, "no usable URL"),
        );

        assert!(!result.success);
        assert_eq!(result.ordinal(), 7);
        assert_eq!(result.error_kind, Some(ErrorKind::EmptyUrl));
        assert_eq!(result.error_message.as_deref(), Some("no usable URL"));
        assert!(result.payload.is_none());
    }

    #[test]
    fn test_record_failure_display() {
        let failure = RecordFailure::new(ErrorKind::SelectorTimeout, "#main after 8000ms");
        assert_eq!(failure.to_string(), "selector_timeout: #main after 8000ms");
    }
}
