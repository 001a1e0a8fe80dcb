//! Browser-driven content fetcher
//!
//! Navigates a [`Navigator`] to the record's URL, waits for the content
//! selector to attach and extracts from the rendered DOM.

use crate::driver::{Navigator, WaitPolicy};
use crate::fetch::{ContentExtractor, RecordProcessor};
use crate::model::{Payload, RecordFailure, UrlRecord};
use crate::state::ErrorKind;
use std::time::Duration;

pub struct BrowserProcessor<N> {
    navigator: N,
    extractor: ContentExtractor,
    selector_timeout: Duration,
}

impl<N: Navigator> BrowserProcessor<N> {
    pub fn new(navigator: N, extractor: ContentExtractor, selector_timeout: Duration) -> Self {
        Self {
            navigator,
            extractor,
            selector_timeout,
        }
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }
}

impl<N: Navigator> RecordProcessor for BrowserProcessor<N> {
    async fn process(&mut self, url: &str, record: &UrlRecord) -> Result<Payload, RecordFailure> {
        self.navigator
            .navigate(url, WaitPolicy::Load)
            .await
            .map_err(|e| RecordFailure::new(ErrorKind::Navigation, e.to_string()))?;

        self.navigator
            .wait_for_selector(self.extractor.selector(), self.selector_timeout)
            .await
            .map_err(|e| RecordFailure::new(ErrorKind::SelectorTimeout, e.to_string()))?;

        let html = self
            .navigator
            .content()
            .await
            .map_err(|e| RecordFailure::new(ErrorKind::Navigation, e.to_string()))?;

        let extraction = self.extractor.extract(&html)?;
        if !extraction.element_found {
            return Err(RecordFailure::new(
                ErrorKind::ExtractionMiss,
                format!("'{}' not found", self.extractor.selector()),
            ));
        }

        let title = match extraction.title {
            Some(title) => Some(title),
            None => self.navigator.page_title().await.ok().flatten(),
        };

        Ok(Payload {
            title: title.or_else(|| record.page_title.clone()),
            content: extraction.content,
            element_found: true,
        })
    }
}
