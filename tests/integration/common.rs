//! Shared fixtures for the integration tests

use std::path::Path;
use waymark::config::{
    BatchConfig, BrowserConfig, Config, FetchConfig, FetchMode, ListingConfig, OutputConfig,
    ResolverConfig,
};
use waymark::model::{Payload, RecordFailure};
use waymark::fetch::RecordProcessor;
use waymark::UrlRecord;

/// Creates a test configuration writing under `root`, with every delay zeroed
pub fn test_config(root: &Path, batch_size: usize) -> Config {
    Config {
        listing: ListingConfig {
            target_url: "https://list.test/".to_string(),
            max_pages: 10,
            row_selector: ".info-item".to_string(),
            title_selector: "a".to_string(),
            next_selector: "a.next".to_string(),
            wait_timeout_ms: 100,
            popup_timeout_ms: 100,
            settle_ms: 0,
            row_delay_ms: 0,
            save_every_pages: 1,
        },
        resolver: ResolverConfig {
            max_wait_seconds: 1,
            poll_interval_ms: 500,
            network_idle_timeout_ms: 100,
        },
        batch: BatchConfig {
            batch_size,
            record_delay_ms: 0,
            batch_delay_ms: 0,
        },
        fetch: FetchConfig {
            mode: FetchMode::Http,
            content_selector: "#mainContent".to_string(),
            timeout_secs: 5,
            user_agent: "WaymarkTest/1.0".to_string(),
        },
        browser: BrowserConfig::default(),
        output: OutputConfig {
            manifest_path: root.join("urls.json").display().to_string(),
            runs_root: root.join("runs").display().to_string(),
        },
    }
}

/// A resolved record pointing at `url`
pub fn record(n: usize, url: &str) -> UrlRecord {
    let mut record = UrlRecord::pending(&format!("page 1 row {}", n), 1, n, &format!("Item {}", n));
    record.final_url = url.to_string();
    record.resolved = true;
    record
}

/// Processor that succeeds for every URL and remembers what it saw
#[derive(Default)]
pub struct EchoProcessor {
    pub seen: Vec<String>,
}

impl RecordProcessor for EchoProcessor {
    async fn process(&mut self, url: &str, record: &UrlRecord) -> Result<Payload, RecordFailure> {
        self.seen.push(url.to_string());
        Ok(Payload {
            title: Some(record.name.clone()),
            content: format!("content of {}", url),
            element_found: true,
        })
    }
}
