//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading settings at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Load(_) => {
                "A required setting is missing. Set CITY, OPENWEATHERMAP_API_KEY and SERVER_PATH."
            }
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }

    /// Wrap for reporting at startup: the user message leads, the cause follows.
    pub fn into_report(self) -> anyhow::Error {
        let hint = self.user_message();
        anyhow::Error::new(self).context(hint)
    }
}
