//! Backend connection configuration.

use serde::Deserialize;

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://127.0.0.1:8000`. A trailing `/` is ignored.
    pub base_url: String,
    /// Whole-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fill_missing_fields_with_defaults() {
        let config: BackendConfig = toml::from_str(r#"base_url = "http://backend:9000""#).unwrap();
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.timeout_secs, 30);
    }
}
