//! Error types for the monitor binary.
//!
//! [`MonitorError`] is the top-level error type that wraps all possible
//! failure modes during monitor startup.

/// Top-level error for the monitor binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: seismon_core::config::ConfigError,
    },

    /// Backend client construction failed.
    #[error("backend client error: {source}")]
    Backend {
        /// The underlying API error.
        #[from]
        source: seismon_api::error::ApiError,
    },

    /// Gateway server failed to start.
    #[error("gateway error: {source}")]
    Gateway {
        /// The underlying startup error.
        #[from]
        source: seismon_gateway::startup::StartupError,
    },
}
