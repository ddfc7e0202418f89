//! Shared configuration for the switchboard dispatcher.
//!
//! [`Config`] carries the few knobs a host needs when embedding the
//! dispatcher: how telemetry is filtered and formatted, which base64 alphabet
//! payloads use, and how large a single inbound message line may be. Loading
//! goes through `ortho_config`, which layers defaults, configuration files,
//! `SWITCHBOARD_*` environment variables and command-line flags. The struct
//! also deserialises with defaults for every field so hosts can nest it in
//! their own configuration tree.

mod defaults;
mod encoding;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_MESSAGE_BYTES, default_log_filter, default_log_filter_string,
    default_log_format, default_max_message_bytes, default_payload_alphabet,
};
pub use self::encoding::{PayloadAlphabet, PayloadAlphabetParseError};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Environment variable overriding [`Config::log_filter`].
pub const ENV_LOG_FILTER: &str = "SWITCHBOARD_LOG_FILTER";
/// Environment variable overriding [`Config::log_format`].
pub const ENV_LOG_FORMAT: &str = "SWITCHBOARD_LOG_FORMAT";
/// Environment variable overriding [`Config::payload_alphabet`].
pub const ENV_PAYLOAD_ALPHABET: &str = "SWITCHBOARD_PAYLOAD_ALPHABET";
/// Environment variable overriding [`Config::max_message_bytes`].
pub const ENV_MAX_MESSAGE_BYTES: &str = "SWITCHBOARD_MAX_MESSAGE_BYTES";

/// Dispatcher and telemetry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "SWITCHBOARD")]
#[serde(default)]
pub struct Config {
    /// Tracing filter expression (`EnvFilter` syntax).
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for the tracing subscriber.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Base64 alphabet for message and reply payloads.
    #[ortho_config(default = default_payload_alphabet())]
    pub payload_alphabet: PayloadAlphabet,
    /// Largest inbound message line accepted, in bytes.
    #[ortho_config(default = default_max_message_bytes())]
    pub max_message_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            payload_alphabet: default_payload_alphabet(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl Config {
    /// Loads the configuration from the process arguments and environment,
    /// then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source cannot be read or parsed,
    /// and [`ConfigError::ZeroMessageLimit`] when validation fails.
    pub fn load_checked() -> Result<Self, ConfigError> {
        Self::load_checked_from_iter(std::env::args_os())
    }

    /// Loads the configuration from `args` and the environment, then
    /// validates it.
    ///
    /// The first argument is the program name, as with
    /// [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source cannot be read or parsed,
    /// and [`ConfigError::ZeroMessageLimit`] when validation fails.
    pub fn load_checked_from_iter<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let config = Self::load_from_iter(args).map_err(|source| ConfigError::Load { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMessageLimit`] when `max_message_bytes` is
    /// zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_bytes == 0 {
            return Err(ConfigError::ZeroMessageLimit);
        }
        Ok(())
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for the tracing subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Base64 alphabet for payloads.
    #[must_use]
    pub const fn payload_alphabet(&self) -> PayloadAlphabet {
        self.payload_alphabet
    }

    /// Largest inbound message line accepted, in bytes.
    #[must_use]
    pub const fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }
}

/// Errors raised while assembling a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read or parsed.
    #[error("failed to load configuration: {source}")]
    Load {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The inbound message size limit was zero.
    #[error("max_message_bytes must be greater than zero")]
    ZeroMessageLimit,
}
