//! Structured telemetry initialisation for hosts embedding the dispatcher.
//!
//! The library only emits `tracing` events. Hosts that do not install their
//! own subscriber can call [`initialise`] once at startup.
//!
//! Failed dispatches are logged at `warn` under the `switchboard::dispatch`
//! target. When the configured filter is limited to `error` and does not
//! mention that target, a `switchboard::dispatch=warn` directive is added so
//! error replies still leave a trace. Filters that name the target, or turn
//! logging off, are used as given.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use switchboard_config::{Config, LogFormat};
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt;

use crate::dispatch::DISPATCH_TARGET;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: only the first successful call installs the
/// subscriber, later calls return a fresh [`TelemetryHandle`].
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the configured filter does not
/// parse, or [`TelemetryError::Subscriber`] when another global subscriber is
/// already installed.
///
/// # Examples
///
/// ```rust
/// use switchboard::telemetry;
/// use switchboard_config::Config;
///
/// # fn main() -> Result<(), telemetry::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// drop(first);
/// drop(second);
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

/// Parses the configured filter expression, keeping dispatch warnings
/// visible under an `error`-only filter.
fn build_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    let expression = config.log_filter();
    let filter =
        EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let names_dispatch_target = expression.contains(DISPATCH_TARGET);
    if names_dispatch_target || filter.max_level_hint() != Some(LevelFilter::ERROR) {
        return Ok(filter);
    }

    let directive: Directive = format!("{DISPATCH_TARGET}=warn")
        .parse()
        .map_err(|error: tracing_subscriber::filter::ParseError| {
            TelemetryError::Filter(error.to_string())
        })?;
    Ok(filter.add_directive(directive))
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(io::stderr)
            // Avoid stray colour codes in non-TTY sinks while keeping colour on
            // interactive terminals.
            .with_ansi(io::stderr().is_terminal())
            // Timestamps let hosts line dispatch events up with their own logs.
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("info")]
    #[case::targeted("switchboard::dispatch=debug,warn")]
    fn accepts_valid_filters(#[case] filter: &str) {
        let config = Config {
            log_filter: filter.to_owned(),
            ..Config::default()
        };
        assert!(build_filter(&config).is_ok());
    }

    fn filter_for(expression: &str) -> EnvFilter {
        let config = Config {
            log_filter: expression.to_owned(),
            ..Config::default()
        };
        build_filter(&config).expect("filter parses")
    }

    #[test]
    fn error_only_filter_keeps_dispatch_warnings() {
        let filter = filter_for("error");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
        assert!(
            filter
                .to_string()
                .to_ascii_lowercase()
                .contains("switchboard::dispatch=warn"),
            "unexpected filter: {filter}"
        );
    }

    #[rstest]
    #[case::verbose("debug", LevelFilter::DEBUG)]
    #[case::names_target("error,switchboard::dispatch=error", LevelFilter::ERROR)]
    #[case::silenced("off", LevelFilter::OFF)]
    fn other_filters_are_used_as_given(#[case] expression: &str, #[case] level: LevelFilter) {
        assert_eq!(filter_for(expression).max_level_hint(), Some(level));
    }

    #[test]
    fn rejects_invalid_filter() {
        let config = Config {
            log_filter: "switchboard=loud".to_owned(),
            ..Config::default()
        };
        let error = build_filter(&config).expect_err("filter must not parse");
        assert!(matches!(error, TelemetryError::Filter(_)));
    }
}
