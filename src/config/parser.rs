use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use waymark::config::load_config;
///
/// let config = load_config(Path::new("waymark.toml")).unwrap();
/// println!("Listing: {}", config.listing.target_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is stored in every checkpoint so a resumed run can tell whether
/// the configuration changed in between.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r##"
[listing]
target-url = "https://example.com/list.html"
max-pages = 20
row-selector = ".row"

[resolver]
max-wait-seconds = 5
poll-interval-ms = 250

[batch]
batch-size = 10

[fetch]
mode = "browser"
content-selector = "#content"

[output]
manifest-path = "./urls.json"
runs-root = "./runs"
"##;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.listing.max_pages, 20);
        assert_eq!(config.listing.row_selector, ".row");
        assert_eq!(config.listing.next_selector, "a.next");
        assert_eq!(config.resolver.poll_interval_ms, 250);
        assert_eq!(config.resolver.network_idle_timeout_ms, 3000);
        assert_eq!(config.batch.batch_size, 10);
        assert_eq!(config.fetch.mode, FetchMode::Browser);
        assert_eq!(config.output.runs_root, "./runs");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = create_temp_config(
            r#"
[listing]
target-url = "https://example.com/list.html"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.listing.max_pages, 1);
        assert_eq!(config.batch.batch_size, 50);
        assert_eq!(config.fetch.mode, FetchMode::Http);
        assert_eq!(config.fetch.content_selector, "#mainContent");
        assert!(config.browser.headless);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/waymark.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[listing]
target-url = "https://example.com/list.html"

[batch]
batch-size = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
