//! Enumeration phase with a fake listing and navigator

use crate::common::test_config;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use waymark::clock::VirtualClock;
use waymark::driver::{DriverError, DriverResult, ListingDriver, Navigator, Popup, WaitPolicy};
use waymark::harvest;
use waymark::model::UNRESOLVED;
use waymark::Manifest;

/// Navigator with a fixed table of server-side redirects
#[derive(Default)]
struct RedirectingNavigator {
    redirects: HashMap<String, String>,
    url: String,
}

impl RedirectingNavigator {
    fn with(redirects: &[(&str, &str)]) -> Self {
        Self {
            redirects: redirects
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            url: String::new(),
        }
    }
}

impl Navigator for RedirectingNavigator {
    async fn navigate(&mut self, url: &str, _wait: WaitPolicy) -> DriverResult<()> {
        self.url = self
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        Ok(())
    }

    async fn current_url(&mut self) -> DriverResult<String> {
        Ok(self.url.clone())
    }

    async fn wait_for_network_idle(&mut self, _timeout: Duration) -> DriverResult<()> {
        Ok(())
    }

    async fn wait_for_selector(&mut self, _selector: &str, _timeout: Duration) -> DriverResult<()> {
        Ok(())
    }

    async fn page_title(&mut self) -> DriverResult<Option<String>> {
        Ok(Some(format!("Title of {}", self.url)))
    }

    async fn content(&mut self) -> DriverResult<String> {
        Ok(String::new())
    }
}

struct StaticPopup(String);

impl Popup for StaticPopup {
    async fn url(&mut self) -> DriverResult<String> {
        Ok(self.0.clone())
    }

    async fn close(self) -> DriverResult<()> {
        Ok(())
    }
}

type Row = (&'static str, Option<&'static str>);

/// Listing of fixed pages; a row without a link never opens a popup
struct StaticListing {
    pages: Vec<Vec<Row>>,
    current: usize,
    opened: usize,
    stuck_on: Option<usize>,
}

impl StaticListing {
    fn new(pages: Vec<Vec<Row>>) -> Self {
        Self {
            pages,
            current: 0,
            opened: 0,
            stuck_on: None,
        }
    }
}

impl ListingDriver for StaticListing {
    type Row = Row;
    type Popup = StaticPopup;

    async fn open(&mut self, _url: &str) -> DriverResult<()> {
        self.opened += 1;
        self.current = 0;
        Ok(())
    }

    async fn wait_for_selector(&mut self, _selector: &str, _timeout: Duration) -> DriverResult<()> {
        Ok(())
    }

    async fn query_all(&mut self, _selector: &str) -> DriverResult<Vec<Row>> {
        Ok(self.pages[self.current].clone())
    }

    async fn row_title(&mut self, row: &Row, _selector: &str) -> DriverResult<Option<String>> {
        Ok(Some(row.0.to_string()))
    }

    async fn click_for_popup(&mut self, row: &Row, timeout: Duration) -> DriverResult<StaticPopup> {
        row.1
            .map(|url| StaticPopup(url.to_string()))
            .ok_or(DriverError::PopupTimeout {
                timeout_ms: timeout.as_millis() as u64,
            })
    }

    async fn next_page(&mut self, _selector: &str) -> DriverResult<bool> {
        if self.stuck_on == Some(self.current) {
            return Err(DriverError::Protocol("element is not clickable".to_string()));
        }
        if self.current + 1 < self.pages.len() {
            self.current += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn listing() -> StaticListing {
    StaticListing::new(vec![
        vec![
            ("Alpha", Some("https://go.test/a")),
            ("Beta", Some("https://site.test/b")),
        ],
        vec![("Gamma", None), ("Delta", Some("https://go.test/d"))],
        vec![("Epsilon", Some("https://site.test/e"))],
    ])
}

fn navigator() -> RedirectingNavigator {
    RedirectingNavigator::with(&[
        ("https://go.test/a", "https://site.test/a"),
        ("https://go.test/d", "https://site.test/d"),
    ])
}

#[tokio::test]
async fn test_enumeration_writes_manifest() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);

    let manifest = harvest::enumerate_urls(&config, listing(), navigator(), VirtualClock::new(), false)
        .await
        .expect("Enumeration failed");

    assert_eq!(manifest.metadata.total_count, 5);
    assert_eq!(manifest.metadata.success_count, 4);
    assert_eq!(manifest.metadata.failed_count, 1);
    assert!(manifest.metadata.is_complete);

    let saved = Manifest::load(Path::new(&config.output.manifest_path))
        .unwrap()
        .expect("Manifest should be on disk");
    assert_eq!(saved.urls, manifest.urls);

    let names: Vec<&str> = saved.urls.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]);

    let alpha = &saved.urls[0];
    assert_eq!(alpha.final_url, "https://site.test/a");
    assert_eq!(alpha.redirect_chain, vec!["https://go.test/a", "https://site.test/a"]);
    assert_eq!(alpha.total_redirects, 1);
    assert!(alpha.resolved);

    let beta = &saved.urls[1];
    assert_eq!(beta.total_redirects, 0);
    assert_eq!(beta.final_url, "https://site.test/b");

    let gamma = &saved.urls[2];
    assert_eq!((gamma.page, gamma.row), (2, 1));
    assert_eq!(gamma.final_url, UNRESOLVED);
    assert!(!gamma.resolved);
    assert!(gamma.error.is_some());
}

#[tokio::test]
async fn test_enumeration_respects_max_pages() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(temp.path(), 5);
    config.listing.max_pages = 1;

    let manifest = harvest::enumerate_urls(&config, listing(), navigator(), VirtualClock::new(), false)
        .await
        .unwrap();

    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.last_page(), Some(1));
}

#[tokio::test]
async fn test_enumeration_resumes_after_last_page() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let manifest_path = Path::new(&config.output.manifest_path);

    // A previous attempt that stopped after page 1
    let mut first = harvest::enumerate_urls(
        &config,
        StaticListing::new(listing().pages[..1].to_vec()),
        navigator(),
        VirtualClock::new(),
        false,
    )
    .await
    .unwrap();
    first.save(manifest_path, Utc::now(), false).unwrap();

    let manifest = harvest::enumerate_urls(&config, listing(), navigator(), VirtualClock::new(), false)
        .await
        .unwrap();

    let names: Vec<&str> = manifest.urls.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]);
}

#[tokio::test]
async fn test_failed_next_click_leaves_manifest_incomplete() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let mut stuck = listing();
    stuck.stuck_on = Some(1);

    let manifest = harvest::enumerate_urls(&config, stuck, navigator(), VirtualClock::new(), false)
        .await
        .unwrap();

    assert_eq!(manifest.len(), 4);
    assert!(!manifest.metadata.is_complete);
    let saved = Manifest::load(Path::new(&config.output.manifest_path))
        .unwrap()
        .unwrap();
    assert!(!saved.metadata.is_complete);

    // The next attempt picks up after the last saved page
    let manifest = harvest::enumerate_urls(&config, listing(), navigator(), VirtualClock::new(), false)
        .await
        .unwrap();
    assert_eq!(manifest.len(), 5);
    assert!(manifest.metadata.is_complete);
}

#[tokio::test]
async fn test_fresh_enumeration_discards_manifest() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);

    harvest::enumerate_urls(&config, listing(), navigator(), VirtualClock::new(), false)
        .await
        .unwrap();
    let manifest = harvest::enumerate_urls(&config, listing(), navigator(), VirtualClock::new(), true)
        .await
        .unwrap();

    assert_eq!(manifest.len(), 5);
}

#[test]
fn test_missing_manifest_is_reported() {
    let temp = TempDir::new().unwrap();
    let err = harvest::load_manifest_records(&temp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, waymark::WaymarkError::MissingManifest(_)));
}
