//! NATS connection configuration

use serde::{Deserialize, Serialize};

/// NATS connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    /// NATS server URLs (comma-separated when loaded from env)
    pub servers: Vec<String>,
    /// Subject prefix shared with the gateway (e.g. "prod", "dev")
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Optional credentials file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<String>,
}

fn default_prefix() -> String {
    "prod".to_string()
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["localhost:4222".to_string()],
            prefix: default_prefix(),
            credentials_file: None,
        }
    }
}

impl NatsConfig {
    pub fn new(servers: Vec<String>, prefix: impl Into<String>) -> Self {
        Self {
            servers,
            prefix: prefix.into(),
            credentials_file: None,
        }
    }

    /// Parse servers from a comma-separated URL string
    pub fn from_url(url: impl AsRef<str>, prefix: impl Into<String>) -> Self {
        let servers = url
            .as_ref()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self::new(servers, prefix)
    }

    pub fn with_credentials(mut self, file: impl Into<String>) -> Self {
        self.credentials_file = Some(file.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_localhost() {
        let cfg = NatsConfig::default();
        assert_eq!(cfg.servers, vec!["localhost:4222"]);
        assert_eq!(cfg.prefix, "prod");
        assert!(cfg.credentials_file.is_none());
    }

    #[test]
    fn test_from_url_splits_and_trims() {
        let cfg = NatsConfig::from_url("n1:4222 , n2:4222,", "dev");
        assert_eq!(cfg.servers, vec!["n1:4222", "n2:4222"]);
        assert_eq!(cfg.prefix, "dev");
    }

    #[test]
    fn test_with_credentials() {
        let cfg = NatsConfig::from_url("localhost:4222", "test").with_credentials("/etc/creds");
        assert_eq!(cfg.credentials_file, Some("/etc/creds".to_string()));
    }

    #[test]
    fn test_prefix_defaults_on_deserialization() {
        let cfg: NatsConfig = serde_json::from_str(r#"{"servers":["localhost:4222"]}"#).unwrap();
        assert_eq!(cfg.prefix, "prod");
    }

    #[test]
    fn test_credentials_omitted_in_json() {
        let cfg = NatsConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("credentials_file"));
    }
}
