//! HTML content extraction
//!
//! Selects the content element with `scraper` and converts it to markdown
//! with `htmd`.

use crate::model::RecordFailure;
use crate::state::ErrorKind;
use crate::ConfigError;
use htmd::HtmlToMarkdown;
use scraper::{Html, Selector};

/// What the extractor found in one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Markdown of the content element; empty when it was not found
    pub content: String,
    pub element_found: bool,
    pub title: Option<String>,
}

/// Extracts one element of a page as markdown
pub struct ContentExtractor {
    selector: Selector,
    selector_text: String,
    title_selector: Selector,
    converter: HtmlToMarkdown,
}

impl ContentExtractor {
    /// Creates an extractor for `selector`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSelector` if `selector` does not parse.
    pub fn new(selector: &str) -> Result<Self, ConfigError> {
        let parsed = Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("{}: {:?}", selector, e)))?;
        let title_selector = Selector::parse("title")
            .map_err(|e| ConfigError::InvalidSelector(format!("title: {:?}", e)))?;

        Ok(Self {
            selector: parsed,
            selector_text: selector.to_string(),
            title_selector,
            converter: HtmlToMarkdown::builder()
                .skip_tags(vec!["script", "style", "noscript"])
                .build(),
        })
    }

    /// The selector this extractor looks for
    pub fn selector(&self) -> &str {
        &self.selector_text
    }

    /// Extracts the content element from `html`
    ///
    /// A missing element is not an error here; callers decide what to do with
    /// `element_found == false`. A conversion failure is.
    pub fn extract(&self, html: &str) -> Result<Extraction, RecordFailure> {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title_selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let Some(element) = document.select(&self.selector).next() else {
            return Ok(Extraction {
                content: String::new(),
                element_found: false,
                title,
            });
        };

        let content = self
            .converter
            .convert(&element.html())
            .map_err(|e| RecordFailure::new(ErrorKind::Conversion, e.to_string()))?;

        Ok(Extraction {
            content: content.trim().to_string(),
            element_found: true,
            title,
        })
    }
}
