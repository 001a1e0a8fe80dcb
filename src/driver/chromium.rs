//! Chromium implementation of the driver traits, built on `chromiumoxide`

use crate::config::BrowserConfig;
use crate::driver::{DriverError, DriverResult, ListingDriver, Navigator, Popup, WaitPolicy};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const DOM_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A launched browser and its CDP event loop
pub struct ChromiumSession {
    browser: Arc<Browser>,
    handler_task: JoinHandle<()>,
    request_timeout: Duration,
}

impl ChromiumSession {
    /// Launches Chrome/Chromium with the configured window and headless mode
    pub async fn launch(config: &BrowserConfig) -> DriverResult<Self> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);

        let mut builder = ChromeConfig::builder()
            .request_timeout(request_timeout)
            .window_size(config.window_width, config.window_height)
            .arg("--disable-popup-blocking")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-blink-features=AutomationControlled");
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        let chrome_config = builder.build().map_err(DriverError::Launch)?;

        tracing::info!("Launching browser (headless: {})", config.headless);
        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler error: {}", e);
                }
            }
            tracing::debug!("Browser event handler task completed");
        });

        Ok(Self {
            browser: Arc::new(browser),
            handler_task,
            request_timeout,
        })
    }

    async fn blank_page(&self) -> DriverResult<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))
    }

    /// Opens a tab used for resolution or content fetches
    pub async fn navigator(&self) -> DriverResult<ChromiumNavigator> {
        Ok(ChromiumNavigator {
            page: self.blank_page().await?,
            request_timeout: self.request_timeout,
        })
    }

    /// Opens the listing tab
    pub async fn listing(&self) -> DriverResult<ChromiumListing> {
        Ok(ChromiumListing {
            browser: Arc::clone(&self.browser),
            page: self.blank_page().await?,
            request_timeout: self.request_timeout,
        })
    }

    /// Closes the browser once no tab handle is left
    pub async fn shutdown(self) {
        match Arc::try_unwrap(self.browser) {
            Ok(mut browser) => {
                if let Err(e) = browser.close().await {
                    tracing::debug!("Browser close failed: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    tracing::debug!("Browser wait failed: {}", e);
                }
            }
            Err(_) => tracing::debug!("Browser still shared; leaving it to drop"),
        }
        self.handler_task.abort();
    }
}

async fn goto(page: &Page, url: &str, timeout: Duration) -> DriverResult<()> {
    match tokio::time::timeout(timeout, page.goto(url)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(DriverError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Err(DriverError::Navigation {
            url: url.to_string(),
            message: format!("timed out after {}ms", timeout.as_millis()),
        }),
    }
}

async fn wait_for_element(page: &Page, selector: &str, timeout: Duration) -> DriverResult<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if page.find_element(selector).await.is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(DriverError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(DOM_POLL_INTERVAL).await;
    }
}

async fn ready_state(page: &Page) -> Option<String> {
    page.evaluate("document.readyState")
        .await
        .ok()
        .and_then(|r| r.into_value::<String>().ok())
}

async fn wait_for_ready_state(page: &Page, wait: WaitPolicy, timeout: Duration) -> DriverResult<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(state) = ready_state(page).await {
            if wait.is_reached_by(&state) {
                return Ok(());
            }
        }
        if Instant::now() >= deadline {
            return Err(DriverError::Timeout {
                what: wait.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(DOM_POLL_INTERVAL).await;
    }
}

async fn page_url(page: &Page) -> DriverResult<String> {
    page.url()
        .await
        .map(|url| url.unwrap_or_default())
        .map_err(|e| DriverError::Protocol(e.to_string()))
}

/// One tab driven through [`Navigator`]
pub struct ChromiumNavigator {
    page: Page,
    request_timeout: Duration,
}

impl Navigator for ChromiumNavigator {
    async fn navigate(&mut self, url: &str, wait: WaitPolicy) -> DriverResult<()> {
        tracing::trace!("Navigating to {} (wait: {})", url, wait);
        goto(&self.page, url, self.request_timeout).await?;
        wait_for_ready_state(&self.page, wait, self.request_timeout).await
    }

    async fn current_url(&mut self) -> DriverResult<String> {
        page_url(&self.page).await
    }

    async fn wait_for_network_idle(&mut self, timeout: Duration) -> DriverResult<()> {
        wait_for_ready_state(&self.page, WaitPolicy::NetworkIdle, timeout).await
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> DriverResult<()> {
        wait_for_element(&self.page, selector, timeout).await
    }

    async fn page_title(&mut self) -> DriverResult<Option<String>> {
        self.page
            .get_title()
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))
    }

    async fn content(&mut self) -> DriverResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))
    }
}

/// A tab opened by clicking a listing row
pub struct ChromiumPopup {
    page: Page,
    load_timeout: Duration,
}

impl Popup for ChromiumPopup {
    async fn url(&mut self) -> DriverResult<String> {
        // The target exists before its first navigation commits
        let deadline = Instant::now() + self.load_timeout;
        loop {
            let url = page_url(&self.page).await?;
            if (!url.is_empty() && url != "about:blank") || Instant::now() >= deadline {
                return Ok(url);
            }
            tokio::time::sleep(DOM_POLL_INTERVAL).await;
        }
    }

    async fn close(self) -> DriverResult<()> {
        self.page
            .close()
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))
    }
}

/// The listing tab
pub struct ChromiumListing {
    browser: Arc<Browser>,
    page: Page,
    request_timeout: Duration,
}

impl ChromiumListing {
    async fn open_targets(&self) -> DriverResult<HashSet<String>> {
        let pages = self
            .browser
            .pages()
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))?;
        Ok(pages
            .iter()
            .map(|p| p.target_id().as_ref().to_string())
            .collect())
    }

    /// Waits until the clicked control leaves the DOM or the URL changes,
    /// then until the new page has loaded
    async fn wait_for_page_turn(&self, clicked: &Element, before: &str) -> DriverResult<()> {
        let deadline = Instant::now() + self.request_timeout;
        loop {
            // A dead remote object means the document was replaced
            let attached = clicked
                .call_js_fn("function() { return this.isConnected; }", false)
                .await
                .ok()
                .and_then(|r| r.result.value)
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if !attached || page_url(&self.page).await? != before {
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!("Next page did not replace the listing within {:?}", self.request_timeout);
                break;
            }
            tokio::time::sleep(DOM_POLL_INTERVAL).await;
        }

        wait_for_ready_state(&self.page, WaitPolicy::NetworkIdle, self.request_timeout).await
    }
}

impl ListingDriver for ChromiumListing {
    type Row = Element;
    type Popup = ChromiumPopup;

    async fn open(&mut self, url: &str) -> DriverResult<()> {
        tracing::info!("Opening listing {}", url);
        goto(&self.page, url, self.request_timeout).await
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> DriverResult<()> {
        wait_for_element(&self.page, selector, timeout).await
    }

    async fn query_all(&mut self, selector: &str) -> DriverResult<Vec<Element>> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))
    }

    async fn row_title(&mut self, row: &Element, selector: &str) -> DriverResult<Option<String>> {
        let Ok(link) = row.find_element(selector).await else {
            return Ok(None);
        };

        if let Ok(Some(title)) = link.attribute("title").await {
            if !title.trim().is_empty() {
                return Ok(Some(title));
            }
        }
        link.inner_text()
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))
    }

    async fn click_for_popup(&mut self, row: &Element, timeout: Duration) -> DriverResult<ChromiumPopup> {
        let before = self.open_targets().await?;

        if let Err(e) = row.scroll_into_view().await {
            tracing::trace!("scroll_into_view failed: {}", e);
        }
        row.click()
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))?;

        let deadline = Instant::now() + timeout;
        loop {
            let pages = self
                .browser
                .pages()
                .await
                .map_err(|e| DriverError::Protocol(e.to_string()))?;
            if let Some(page) = pages
                .into_iter()
                .find(|p| !before.contains(p.target_id().as_ref()))
            {
                return Ok(ChromiumPopup {
                    page,
                    load_timeout: timeout,
                });
            }
            if Instant::now() >= deadline {
                return Err(DriverError::PopupTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(DOM_POLL_INTERVAL).await;
        }
    }

    async fn next_page(&mut self, selector: &str) -> DriverResult<bool> {
        let Ok(next) = self.page.find_element(selector).await else {
            return Ok(false);
        };

        let disabled = next.attribute("disabled").await.ok().flatten().is_some()
            || next
                .attribute("class")
                .await
                .ok()
                .flatten()
                .map(|class| class.split_whitespace().any(|c| c == "disabled"))
                .unwrap_or(false);
        if disabled {
            return Ok(false);
        }

        let before = page_url(&self.page).await?;
        if let Err(e) = next.scroll_into_view().await {
            tracing::trace!("scroll_into_view failed: {}", e);
        }
        next.click()
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))?;

        self.wait_for_page_turn(&next, &before).await?;
        Ok(true)
    }
}
