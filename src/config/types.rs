use serde::Deserialize;

/// Main configuration structure for Waymark
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub listing: ListingConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Paginated listing that the enumerator walks
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Listing page to start from
    #[serde(rename = "target-url")]
    pub target_url: String,

    /// Maximum number of listing pages to visit
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Selector matching one element per result row
    #[serde(rename = "row-selector", default = "default_row_selector")]
    pub row_selector: String,

    /// Selector (relative to a row) for the element carrying the row title
    #[serde(rename = "title-selector", default = "default_title_selector")]
    pub title_selector: String,

    /// Selector for the "next page" control
    #[serde(rename = "next-selector", default = "default_next_selector")]
    pub next_selector: String,

    /// How long to wait for rows to attach (milliseconds)
    #[serde(rename = "wait-timeout-ms", default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,

    /// How long to wait for a popup after clicking a row (milliseconds)
    #[serde(rename = "popup-timeout-ms", default = "default_popup_timeout_ms")]
    pub popup_timeout_ms: u64,

    /// Pause after a page change before reading rows (milliseconds)
    #[serde(rename = "settle-ms", default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Pause after each row (milliseconds)
    #[serde(rename = "row-delay-ms", default = "default_row_delay_ms")]
    pub row_delay_ms: u64,

    /// Save the manifest every N completed pages
    #[serde(rename = "save-every-pages", default = "default_save_every_pages")]
    pub save_every_pages: u32,
}

/// Redirect resolution timing
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Length of the polling window (seconds)
    #[serde(rename = "max-wait-seconds", default = "default_max_wait_seconds")]
    pub max_wait_seconds: u64,

    /// Interval between URL polls (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Bounded wait for network quiescence after polling (milliseconds)
    #[serde(
        rename = "network-idle-timeout-ms",
        default = "default_network_idle_timeout_ms"
    )]
    pub network_idle_timeout_ms: u64,
}

/// Batch execution settings
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Number of records per batch
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause after each fetched record (milliseconds)
    #[serde(rename = "record-delay-ms", default = "default_record_delay_ms")]
    pub record_delay_ms: u64,

    /// Pause between batches (milliseconds)
    #[serde(rename = "batch-delay-ms", default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

/// How record content is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Plain HTTP GET
    Http,
    /// Headless browser navigation
    Browser,
}

/// Content fetch settings
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_mode")]
    pub mode: FetchMode,

    /// Selector of the element whose content is extracted
    #[serde(rename = "content-selector", default = "default_content_selector")]
    pub content_selector: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent for HTTP fetches
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Browser launch settings
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when absent
    #[serde(rename = "chrome-executable", default)]
    pub chrome_executable: Option<String>,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,

    /// Per-command timeout for the DevTools connection (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the URL manifest (JSON)
    #[serde(rename = "manifest-path", default = "default_manifest_path")]
    pub manifest_path: String,

    /// Directory holding one subdirectory per fetch run
    #[serde(rename = "runs-root", default = "default_runs_root")]
    pub runs_root: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_wait_seconds: default_max_wait_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
            network_idle_timeout_ms: default_network_idle_timeout_ms(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            record_delay_ms: default_record_delay_ms(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: default_fetch_mode(),
            content_selector: default_content_selector(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            runs_root: default_runs_root(),
        }
    }
}

fn default_max_pages() -> u32 {
    1
}

fn default_row_selector() -> String {
    ".info-item".to_string()
}

fn default_title_selector() -> String {
    "a".to_string()
}

fn default_next_selector() -> String {
    "a.next".to_string()
}

fn default_wait_timeout_ms() -> u64 {
    8000
}

fn default_popup_timeout_ms() -> u64 {
    10_000
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_row_delay_ms() -> u64 {
    1000
}

fn default_save_every_pages() -> u32 {
    1
}

fn default_max_wait_seconds() -> u64 {
    3
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_network_idle_timeout_ms() -> u64 {
    3000
}

fn default_batch_size() -> usize {
    50
}

fn default_record_delay_ms() -> u64 {
    1000
}

fn default_batch_delay_ms() -> u64 {
    3000
}

fn default_fetch_mode() -> FetchMode {
    FetchMode::Http
}

fn default_content_selector() -> String {
    "#mainContent".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_manifest_path() -> String {
    "./waymark_urls.json".to_string()
}

fn default_runs_root() -> String {
    "./waymark_runs".to_string()
}
