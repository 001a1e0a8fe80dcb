//! Both phases driven by a launched Chromium session
//!
//! The session is shut down whether the phase succeeds or not.

use crate::batch::RunContext;
use crate::clock::TokioClock;
use crate::config::Config;
use crate::driver::chromium::ChromiumSession;
use crate::fetch::{BrowserProcessor, ContentExtractor};
use crate::harvest::{enumerate_urls, fetch_content};
use crate::model::UrlRecord;
use crate::storage::Manifest;
use crate::Result;
use std::time::Duration;

/// Launches a browser and runs [`enumerate_urls`] with it
pub async fn enumerate_with_browser(config: &Config, fresh: bool) -> Result<Manifest> {
    let session = ChromiumSession::launch(&config.browser).await?;
    let result = enumerate_in(&session, config, fresh).await;
    session.shutdown().await;
    result
}

async fn enumerate_in(session: &ChromiumSession, config: &Config, fresh: bool) -> Result<Manifest> {
    let listing = session.listing().await?;
    let navigator = session.navigator().await?;
    enumerate_urls(config, listing, navigator, TokioClock, fresh).await
}

/// Launches a browser and runs [`fetch_content`] with a [`BrowserProcessor`]
pub async fn fetch_with_browser(
    config: &Config,
    ctx: &mut RunContext,
    records: &[UrlRecord],
) -> Result<()> {
    let extractor = ContentExtractor::new(&config.fetch.content_selector)?;
    let session = ChromiumSession::launch(&config.browser).await?;
    let result = fetch_in(&session, extractor, config, ctx, records).await;
    session.shutdown().await;
    result
}

async fn fetch_in(
    session: &ChromiumSession,
    extractor: ContentExtractor,
    config: &Config,
    ctx: &mut RunContext,
    records: &[UrlRecord],
) -> Result<()> {
    let navigator = session.navigator().await?;
    let mut processor = BrowserProcessor::new(
        navigator,
        extractor,
        Duration::from_secs(config.fetch.timeout_secs),
    );
    fetch_content(config, ctx, records, &mut processor, TokioClock).await
}
