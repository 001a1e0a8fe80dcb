//! Content fetching for the batch phase
//!
//! A [`RecordProcessor`] turns one record's URL into a [`Payload`] or a
//! contained [`RecordFailure`]. Two implementations share the same
//! [`ContentExtractor`]:
//!
//! - [`HttpProcessor`]: a plain GET with `reqwest`
//! - [`BrowserProcessor`]: navigation through a [`Navigator`](crate::driver::Navigator),
//!   for pages that render their content with scripts

mod browser;
mod extract;
mod http;

pub use browser::BrowserProcessor;
pub use extract::{ContentExtractor, Extraction};
pub use http::{build_http_client, HttpProcessor};

use crate::model::{Payload, RecordFailure, UrlRecord};

/// Fetches and extracts the content of one record
#[allow(async_fn_in_trait)]
pub trait RecordProcessor {
    /// Processes `record`, whose usable URL is `url`
    ///
    /// Every failure is returned as a value; the batch runner records it and
    /// moves on.
    async fn process(&mut self, url: &str, record: &UrlRecord) -> Result<Payload, RecordFailure>;
}
