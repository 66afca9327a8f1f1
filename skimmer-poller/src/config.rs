//! Poller configuration
//!
//! Every setting comes from the environment. Credential material is resolved
//! into a plain token once at startup and never re-read per poll.

use anyhow::Context;
use skimmer_client::SecretClient;
use std::fmt;
use std::time::Duration;

use crate::db;

/// Default name of the checkpoint table
pub const DEFAULT_CHECKPOINT_TABLE: &str = "search_checkpoint";

/// How the search provider token is supplied
#[derive(Clone, PartialEq, Eq)]
pub enum SearchCredential {
    /// Anonymous access
    None,
    Plaintext(String),
    /// Base64 ciphertext, decrypted at startup
    Encrypted(String),
}

impl fmt::Debug for SearchCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Plaintext(_) => f.write_str("Plaintext(<redacted>)"),
            Self::Encrypted(_) => f.write_str("Encrypted(<redacted>)"),
        }
    }
}

impl SearchCredential {
    /// Turns the configured credential into the token sent to the provider
    pub async fn resolve(
        &self,
        secrets: Option<&SecretClient>,
    ) -> anyhow::Result<Option<String>> {
        match self {
            Self::None => Ok(None),
            Self::Plaintext(token) => Ok(Some(token.clone())),
            Self::Encrypted(ciphertext) => {
                let secrets = secrets
                    .context("SECRET_DECRYPT_URL must be set to use SEARCH_API_TOKEN_ENCRYPTED")?;
                let token = secrets
                    .decrypt(ciphertext)
                    .await
                    .context("Failed to decrypt search API token")?;
                Ok(Some(token))
            }
        }
    }
}

/// Poller configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed search query text
    pub search_text: String,

    /// Search endpoint URL
    pub search_api_url: String,

    /// Credential for the search provider
    pub search_credential: SearchCredential,

    /// Decrypt endpoint used for encrypted credentials
    pub secret_decrypt_url: Option<String>,

    /// Maximum number of items per sink invocation
    pub batch_size: usize,

    /// Sink base URL
    pub sink_url: String,

    /// Downstream function that receives the batches
    pub sink_target: String,

    /// Whether the checkpoint is read and advanced on every poll
    pub stream_mode_enabled: bool,

    /// Checkpoint table name
    pub checkpoint_table: String,

    /// Postgres URL for the checkpoint table
    pub database_url: Option<String>,

    /// Poll repeatedly on this interval instead of running once
    pub poll_interval: Option<Duration>,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SEARCH_TEXT (required)
    /// - SEARCH_API_URL (required)
    /// - SEARCH_API_TOKEN or SEARCH_API_TOKEN_ENCRYPTED (optional, encrypted wins)
    /// - SECRET_DECRYPT_URL (required with SEARCH_API_TOKEN_ENCRYPTED)
    /// - BATCH_SIZE (required, positive integer)
    /// - SINK_URL (required)
    /// - SINK_TARGET (required)
    /// - STREAM_MODE_ENABLED (optional, "true" enables, default: false)
    /// - CHECKPOINT_TABLE_NAME (optional, default: search_checkpoint)
    /// - DATABASE_URL (required when stream mode is enabled)
    /// - POLL_INTERVAL (optional, seconds; unset runs a single poll)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable not set", key))
        };
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let search_text = required("SEARCH_TEXT")?;
        let search_api_url = required("SEARCH_API_URL")?;

        let search_credential = match (
            optional("SEARCH_API_TOKEN_ENCRYPTED"),
            optional("SEARCH_API_TOKEN"),
        ) {
            (Some(ciphertext), _) => SearchCredential::Encrypted(ciphertext),
            (None, Some(token)) => SearchCredential::Plaintext(token),
            (None, None) => SearchCredential::None,
        };

        let batch_size = required("BATCH_SIZE")?
            .trim()
            .parse::<usize>()
            .context("BATCH_SIZE must be a positive integer")?;

        let poll_interval = optional("POLL_INTERVAL")
            .map(|value| value.trim().parse::<u64>())
            .transpose()
            .context("POLL_INTERVAL must be a number of seconds")?
            .map(Duration::from_secs);

        Ok(Self {
            search_text,
            search_api_url,
            search_credential,
            secret_decrypt_url: optional("SECRET_DECRYPT_URL"),
            batch_size,
            sink_url: required("SINK_URL")?,
            sink_target: required("SINK_TARGET")?,
            stream_mode_enabled: lookup("STREAM_MODE_ENABLED").as_deref() == Some("true"),
            checkpoint_table: optional("CHECKPOINT_TABLE_NAME")
                .unwrap_or_else(|| DEFAULT_CHECKPOINT_TABLE.to_string()),
            database_url: optional("DATABASE_URL"),
            poll_interval,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.search_text.trim().is_empty() {
            anyhow::bail!("search_text cannot be empty");
        }

        if !is_http_url(&self.search_api_url) {
            anyhow::bail!("search_api_url must start with http:// or https://");
        }

        if !is_http_url(&self.sink_url) {
            anyhow::bail!("sink_url must start with http:// or https://");
        }

        if self.sink_target.trim().is_empty() {
            anyhow::bail!("sink_target cannot be empty");
        }

        if !skimmer_client::is_valid_target(&self.sink_target) {
            anyhow::bail!(
                "sink_target '{}' may only contain letters, digits, '-', '_', '.' or ':'",
                self.sink_target
            );
        }

        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than 0");
        }

        if matches!(self.search_credential, SearchCredential::Encrypted(_))
            && self.secret_decrypt_url.is_none()
        {
            anyhow::bail!("secret_decrypt_url is required for an encrypted search token");
        }

        if self
            .secret_decrypt_url
            .as_deref()
            .is_some_and(|url| !is_http_url(url))
        {
            anyhow::bail!("secret_decrypt_url must start with http:// or https://");
        }

        if self.stream_mode_enabled {
            if self.database_url.is_none() {
                anyhow::bail!("database_url is required when stream mode is enabled");
            }

            if !db::is_valid_identifier(&self.checkpoint_table) {
                anyhow::bail!(
                    "checkpoint_table '{}' is not a valid table name",
                    self.checkpoint_table
                );
            }
        }

        if self.poll_interval.is_some_and(|interval| interval.is_zero()) {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = [
            ("SEARCH_TEXT", "#rustlang"),
            (
                "SEARCH_API_URL",
                "https://search.example.com/1.1/search/tweets.json",
            ),
            ("BATCH_SIZE", "20"),
            ("SINK_URL", "http://localhost:9001"),
            ("SINK_TARGET", "item-processor"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (k, v) in pairs {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    fn load(vars: &HashMap<String, String>) -> anyhow::Result<Config> {
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_minimal_config() {
        let config = load(&env(&[])).unwrap();

        assert_eq!(config.batch_size, 20);
        assert!(!config.stream_mode_enabled);
        assert_eq!(config.checkpoint_table, DEFAULT_CHECKPOINT_TABLE);
        assert_eq!(config.search_credential, SearchCredential::None);
        assert!(config.poll_interval.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_required_variable() {
        let mut vars = env(&[]);
        vars.remove("SINK_TARGET");

        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("SINK_TARGET"));
    }

    #[test]
    fn test_batch_size_must_be_positive() {
        assert!(load(&env(&[("BATCH_SIZE", "lots")])).is_err());
        assert!(load(&env(&[("BATCH_SIZE", "-1")])).is_err());

        let config = load(&env(&[("BATCH_SIZE", "0")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stream_mode_requires_database() {
        let config = load(&env(&[("STREAM_MODE_ENABLED", "true")])).unwrap();
        assert!(config.stream_mode_enabled);
        assert!(config.validate().is_err());

        let config = load(&env(&[
            ("STREAM_MODE_ENABLED", "true"),
            ("DATABASE_URL", "postgres://skimmer@localhost/skimmer"),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stream_mode_only_on_exact_true() {
        let config = load(&env(&[("STREAM_MODE_ENABLED", "yes")])).unwrap();
        assert!(!config.stream_mode_enabled);
    }

    #[test]
    fn test_checkpoint_table_is_validated() {
        let config = load(&env(&[
            ("STREAM_MODE_ENABLED", "true"),
            ("DATABASE_URL", "postgres://skimmer@localhost/skimmer"),
            ("CHECKPOINT_TABLE_NAME", "cp; DROP TABLE cp"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_encrypted_token_wins_and_needs_decrypt_url() {
        let config = load(&env(&[
            ("SEARCH_API_TOKEN", "plain"),
            ("SEARCH_API_TOKEN_ENCRYPTED", "Y2lwaGVy"),
        ]))
        .unwrap();
        assert_eq!(
            config.search_credential,
            SearchCredential::Encrypted("Y2lwaGVy".to_string())
        );
        assert!(config.validate().is_err());

        let config = load(&env(&[
            ("SEARCH_API_TOKEN", "plain"),
            ("SEARCH_API_TOKEN_ENCRYPTED", ""),
        ]))
        .unwrap();
        assert_eq!(
            config.search_credential,
            SearchCredential::Plaintext("plain".to_string())
        );
    }

    #[test]
    fn test_invalid_urls_fail_validation() {
        let config = load(&env(&[("SINK_URL", "localhost:9001")])).unwrap();
        assert!(config.validate().is_err());

        let config = load(&env(&[("SEARCH_API_URL", "ftp://search")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sink_target_must_be_a_path_segment() {
        for target in ["a/b", "fn?x=1", "fn#frag"] {
            let config = load(&env(&[("SINK_TARGET", target)])).unwrap();
            assert!(config.validate().is_err(), "{} should be rejected", target);
        }

        let config = load(&env(&[("SINK_TARGET", "tweet_processor-v2")])).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_interval() {
        let config = load(&env(&[("POLL_INTERVAL", "60")])).unwrap();
        assert_eq!(config.poll_interval, Some(Duration::from_secs(60)));

        let config = load(&env(&[("POLL_INTERVAL", "0")])).unwrap();
        assert!(config.validate().is_err());

        assert!(load(&env(&[("POLL_INTERVAL", "soon")])).is_err());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = SearchCredential::Plaintext("hunter2".to_string());
        assert!(!format!("{:?}", credential).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_resolve_plaintext_and_anonymous() {
        assert_eq!(SearchCredential::None.resolve(None).await.unwrap(), None);
        assert_eq!(
            SearchCredential::Plaintext("t0k3n".to_string())
                .resolve(None)
                .await
                .unwrap(),
            Some("t0k3n".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_encrypted_without_secret_client_fails() {
        let credential = SearchCredential::Encrypted("Y2lwaGVy".to_string());
        assert!(credential.resolve(None).await.is_err());
    }
}
