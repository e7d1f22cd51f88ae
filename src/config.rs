//! Conversation store configuration
//!
//! Provides the configuration type for the conversation store: which key in
//! the shared medium holds the serialized thread map, and how long alert
//! body previews are allowed to be.

use thiserror::Error;

/// Default storage key for the serialized thread map
pub const DEFAULT_THREADS_KEY: &str = "ridechat.threads";

/// Default maximum length for alert body previews
pub const DEFAULT_ALERT_PREVIEW_LEN: usize = 120;

/// Conversation store configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Key in the shared medium under which the thread map is persisted
    pub threads_key: String,
    /// Maximum character length of an alert body before truncation
    pub alert_preview_len: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            threads_key: DEFAULT_THREADS_KEY.to_string(),
            alert_preview_len: DEFAULT_ALERT_PREVIEW_LEN,
        }
    }
}

impl ChatConfig {
    /// Create a new ChatConfigBuilder
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads_key.is_empty() {
            return Err(ConfigError::MissingValue("threads_key"));
        }
        if self.alert_preview_len < 4 {
            return Err(ConfigError::InvalidValue(
                "alert_preview_len must be at least 4".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ChatConfig
#[derive(Debug, Default)]
pub struct ChatConfigBuilder {
    threads_key: Option<String>,
    alert_preview_len: Option<usize>,
}

impl ChatConfigBuilder {
    /// Set the storage key for the thread map
    pub fn threads_key(mut self, key: impl Into<String>) -> Self {
        self.threads_key = Some(key.into());
        self
    }

    /// Set the alert body preview length
    pub fn alert_preview_len(mut self, len: usize) -> Self {
        self.alert_preview_len = Some(len);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ChatConfig, ConfigError> {
        let config = ChatConfig {
            threads_key: self
                .threads_key
                .unwrap_or_else(|| DEFAULT_THREADS_KEY.to_string()),
            alert_preview_len: self.alert_preview_len.unwrap_or(DEFAULT_ALERT_PREVIEW_LEN),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
