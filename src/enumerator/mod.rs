//! Page enumeration
//!
//! Walks a paginated listing and yields one [`UrlRecord`] per row. For each
//! row the enumerator clicks the row, captures the popup's URL, closes the
//! popup and hands the URL to the [`RedirectResolver`], which runs on its own
//! long-lived handle.
//!
//! The sequence is lazy and cannot be restarted: callers pull items with
//! [`PageEnumerator::next_item`] until it returns `None`.

use crate::clock::Clock;
use crate::config::ListingConfig;
use crate::driver::{ListingDriver, Navigator, Popup};
use crate::model::UrlRecord;
use crate::resolver::RedirectResolver;
use std::collections::VecDeque;
use std::time::Duration;

/// Display name used when a row has no readable title
pub const UNKNOWN_NAME: &str = "unknown";

/// Listing knobs used by the enumerator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSettings {
    pub target_url: String,
    /// Last page to visit (1-based, inclusive)
    pub max_pages: u32,
    pub row_selector: String,
    pub title_selector: String,
    pub next_selector: String,
    pub wait_timeout: Duration,
    pub popup_timeout: Duration,
    pub settle: Duration,
    pub row_delay: Duration,
}

impl ListingSettings {
    pub fn from_config(config: &ListingConfig) -> Self {
        Self {
            target_url: config.target_url.clone(),
            max_pages: config.max_pages,
            row_selector: config.row_selector.clone(),
            title_selector: config.title_selector.clone(),
            next_selector: config.next_selector.clone(),
            wait_timeout: Duration::from_millis(config.wait_timeout_ms),
            popup_timeout: Duration::from_millis(config.popup_timeout_ms),
            settle: Duration::from_millis(config.settle_ms),
            row_delay: Duration::from_millis(config.row_delay_ms),
        }
    }
}

/// One step of the enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumeratedItem {
    /// A row, resolved or marked unresolved
    Record(UrlRecord),

    /// A page finished; `error` is set when the page could not be read
    PageDone {
        page: u32,
        rows: usize,
        error: Option<String>,
    },
}

enum Cursor<R> {
    Start,
    LoadPage,
    Rows(VecDeque<(usize, R)>),
    Advance,
    Finished,
}

/// Lazy, single-pass walk over a paginated listing
pub struct PageEnumerator<L: ListingDriver, N, C> {
    listing: L,
    resolver: RedirectResolver<N, C>,
    clock: C,
    settings: ListingSettings,
    start_page: u32,
    page: u32,
    rows_on_page: usize,
    cursor: Cursor<L::Row>,
    aborted: Option<String>,
}

impl<L, N, C> PageEnumerator<L, N, C>
where
    L: ListingDriver,
    N: Navigator,
    C: Clock,
{
    /// Creates an enumerator starting at page 1
    pub fn new(
        listing: L,
        resolver: RedirectResolver<N, C>,
        clock: C,
        settings: ListingSettings,
    ) -> Self {
        Self::starting_at(listing, resolver, clock, settings, 1)
    }

    /// Creates an enumerator that skips ahead to `start_page`
    ///
    /// Used to resume after the last page already present in a manifest.
    pub fn starting_at(
        listing: L,
        resolver: RedirectResolver<N, C>,
        clock: C,
        settings: ListingSettings,
        start_page: u32,
    ) -> Self {
        let start_page = start_page.max(1);
        Self {
            listing,
            resolver,
            clock,
            settings,
            start_page,
            page: start_page,
            rows_on_page: 0,
            cursor: Cursor::Start,
            aborted: None,
        }
    }

    /// The page currently being read
    pub fn current_page(&self) -> u32 {
        self.page
    }

    /// Why the walk stopped before the listing was exhausted, if it did
    ///
    /// `None` once `next_item` returned `None` means the last page or the page
    /// limit was reached.
    pub fn abort_reason(&self) -> Option<&str> {
        self.aborted.as_deref()
    }

    /// Returns the driver handles once enumeration is over
    pub fn into_parts(self) -> (L, RedirectResolver<N, C>) {
        (self.listing, self.resolver)
    }

    /// Pulls the next item, or `None` when the listing is exhausted
    pub async fn next_item(&mut self) -> Option<EnumeratedItem> {
        loop {
            match std::mem::replace(&mut self.cursor, Cursor::Finished) {
                Cursor::Finished => return None,
                Cursor::Start => {
                    if self.start_page > self.settings.max_pages {
                        tracing::info!(
                            "Start page {} is past the last page {}",
                            self.start_page,
                            self.settings.max_pages
                        );
                        return None;
                    }
                    match self.open().await {
                        Ok(true) => self.cursor = Cursor::LoadPage,
                        Ok(false) => {
                            tracing::info!("Listing ends before page {}", self.start_page);
                            return None;
                        }
                        Err(e) => {
                            tracing::error!("Failed to open listing: {}", e);
                            self.aborted = Some(format!("listing did not open: {}", e));
                            return Some(EnumeratedItem::PageDone {
                                page: self.page,
                                rows: 0,
                                error: Some(e.to_string()),
                            });
                        }
                    }
                }
                Cursor::LoadPage => match self.load_rows().await {
                    Ok(rows) => {
                        tracing::info!("Page {}: {} rows", self.page, rows.len());
                        self.rows_on_page = rows.len();
                        self.cursor = Cursor::Rows(rows);
                    }
                    Err(e) => {
                        tracing::error!("Page {} could not be read: {}", self.page, e);
                        self.cursor = Cursor::Advance;
                        return Some(EnumeratedItem::PageDone {
                            page: self.page,
                            rows: 0,
                            error: Some(e.to_string()),
                        });
                    }
                },
                Cursor::Rows(mut rows) => match rows.pop_front() {
                    Some((number, row)) => {
                        let record = self.process_row(number, &row).await;
                        self.cursor = Cursor::Rows(rows);
                        return Some(EnumeratedItem::Record(record));
                    }
                    None => {
                        self.cursor = Cursor::Advance;
                        return Some(EnumeratedItem::PageDone {
                            page: self.page,
                            rows: self.rows_on_page,
                            error: None,
                        });
                    }
                },
                Cursor::Advance => {
                    if self.page >= self.settings.max_pages {
                        tracing::info!("Reached page limit {}", self.settings.max_pages);
                        return None;
                    }
                    match self.listing.next_page(&self.settings.next_selector).await {
                        Ok(true) => {
                            self.page += 1;
                            self.clock.sleep(self.settings.settle).await;
                            self.cursor = Cursor::LoadPage;
                        }
                        Ok(false) => {
                            tracing::info!("No next page after page {}", self.page);
                            return None;
                        }
                        Err(e) => {
                            tracing::error!("Could not leave page {}: {}", self.page, e);
                            self.aborted = Some(format!("stuck on page {}: {}", self.page, e));
                            return None;
                        }
                    }
                }
            }
        }
    }

    /// Collects every remaining record, dropping page markers
    pub async fn collect_records(&mut self) -> Vec<UrlRecord> {
        let mut records = Vec::new();
        while let Some(item) = self.next_item().await {
            if let EnumeratedItem::Record(record) = item {
                records.push(record);
            }
        }
        records
    }

    /// Opens the listing and skips to the start page
    ///
    /// Returns `Ok(false)` if the listing has fewer pages than the start page.
    async fn open(&mut self) -> crate::driver::DriverResult<bool> {
        self.listing.open(&self.settings.target_url).await?;
        self.clock.sleep(self.settings.settle).await;

        for skipped in 1..self.start_page {
            if !self.listing.next_page(&self.settings.next_selector).await? {
                tracing::warn!("Listing has only {} pages", skipped);
                return Ok(false);
            }
            self.clock.sleep(self.settings.settle).await;
        }
        Ok(true)
    }

    async fn load_rows(&mut self) -> crate::driver::DriverResult<VecDeque<(usize, L::Row)>> {
        self.listing
            .wait_for_selector(&self.settings.row_selector, self.settings.wait_timeout)
            .await?;
        let rows = self.listing.query_all(&self.settings.row_selector).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| (i + 1, row))
            .collect())
    }

    /// Resolves one row; failures are folded into the record
    async fn process_row(&mut self, number: usize, row: &L::Row) -> UrlRecord {
        let source = format!("page {} row {}", self.page, number);

        let name = match self.listing.row_title(row, &self.settings.title_selector).await {
            Ok(Some(title)) if !title.trim().is_empty() => title.trim().to_string(),
            Ok(_) => UNKNOWN_NAME.to_string(),
            Err(e) => {
                tracing::debug!("No title for {}: {}", source, e);
                UNKNOWN_NAME.to_string()
            }
        };

        let mut record = UrlRecord::pending(&source, self.page, number, &name);

        match self.capture_initial_url(row).await {
            Ok(initial_url) => {
                let trace = self.resolver.resolve(&initial_url).await;
                record.apply_trace(trace);
                if record.resolved {
                    tracing::info!("{}: {} -> {}", source, name, record.final_url);
                }
            }
            Err(message) => {
                tracing::warn!("{}: {}", source, message);
                record.mark_failed(message);
            }
        }

        self.clock.sleep(self.settings.row_delay).await;
        record
    }

    async fn capture_initial_url(&mut self, row: &L::Row) -> Result<String, String> {
        let mut popup = self
            .listing
            .click_for_popup(row, self.settings.popup_timeout)
            .await
            .map_err(|e| e.to_string())?;

        let url = popup.url().await;
        if let Err(e) = popup.close().await {
            tracing::debug!("Failed to close popup: {}", e);
        }

        let url = url.map_err(|e| e.to_string())?;
        if url.trim().is_empty() || url == "about:blank" {
            return Err("popup opened without a URL".to_string());
        }
        Ok(url)
    }
}
