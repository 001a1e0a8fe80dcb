use crate::config::types::{
    BatchConfig, BrowserConfig, Config, FetchConfig, ListingConfig, OutputConfig, ResolverConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_listing_config(&config.listing)?;
    validate_resolver_config(&config.resolver)?;
    validate_batch_config(&config.batch)?;
    validate_fetch_config(&config.fetch)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates listing configuration
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.target_url, "target_url")?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    validate_selector(&config.row_selector, "row_selector")?;
    validate_selector(&config.title_selector, "title_selector")?;
    validate_selector(&config.next_selector, "next_selector")?;

    if config.wait_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "wait_timeout_ms must be >= 100ms, got {}ms",
            config.wait_timeout_ms
        )));
    }

    if config.popup_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "popup_timeout_ms must be >= 100ms, got {}ms",
            config.popup_timeout_ms
        )));
    }

    if config.save_every_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "save_every_pages must be >= 1, got {}",
            config.save_every_pages
        )));
    }

    Ok(())
}

/// Validates redirect resolution timing
fn validate_resolver_config(config: &ResolverConfig) -> Result<(), ConfigError> {
    if config.poll_interval_ms < 50 || config.poll_interval_ms > 10_000 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be between 50 and 10000, got {}",
            config.poll_interval_ms
        )));
    }

    if config.max_wait_seconds > 120 {
        return Err(ConfigError::Validation(format!(
            "max_wait_seconds must be <= 120, got {}",
            config.max_wait_seconds
        )));
    }

    Ok(())
}

/// Validates batch configuration
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 10_000 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 10000, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    validate_selector(&config.content_selector, "content_selector")?;

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.window_width < 320 || config.window_height < 240 {
        return Err(ConfigError::Validation(format!(
            "window size must be at least 320x240, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    if let Some(path) = &config.chrome_executable {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "chrome_executable cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.manifest_path.is_empty() {
        return Err(ConfigError::Validation(
            "manifest_path cannot be empty".to_string(),
        ));
    }

    if config.runs_root.is_empty() {
        return Err(ConfigError::Validation(
            "runs_root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a URL parses and uses an HTTP(S) scheme
fn validate_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Checks that a CSS selector is non-empty and parses
fn validate_selector(selector: &str, field: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{} cannot be empty",
            field
        )));
    }

    Selector::parse(selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("{} '{}': {:?}", field, selector, e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://example.com/list", "target_url").is_ok());
        assert!(validate_http_url("http://127.0.0.1:8080/", "target_url").is_ok());

        assert!(validate_http_url("", "target_url").is_err());
        assert!(validate_http_url("ftp://example.com/", "target_url").is_err());
        assert!(validate_http_url("not a url", "target_url").is_err());
    }

    #[test]
    fn test_validate_selector() {
        assert!(validate_selector(".info-item", "row_selector").is_ok());
        assert!(validate_selector("a.next", "next_selector").is_ok());
        assert!(validate_selector("#mainContent", "content_selector").is_ok());

        assert!(validate_selector("", "row_selector").is_err());
        assert!(validate_selector("   ", "row_selector").is_err());
        assert!(validate_selector("a[", "row_selector").is_err());
    }

    #[test]
    fn test_validate_resolver_bounds() {
        let mut config = ResolverConfig::default();
        assert!(validate_resolver_config(&config).is_ok());

        config.poll_interval_ms = 10;
        assert!(validate_resolver_config(&config).is_err());

        config.poll_interval_ms = 500;
        config.max_wait_seconds = 600;
        assert!(validate_resolver_config(&config).is_err());
    }
}
