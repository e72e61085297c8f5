//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the shell by any `risk-engine` subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file argument pointed at a path that doesn't exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// A flag or argument value was not one of the accepted values.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input file's JSON did not match the expected book/config schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The file that failed to parse.
        path: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The input file's TOML did not match the expected config schema.
    #[error("failed to parse {path}: {source}")]
    ParseToml {
        /// The file that failed to parse.
        path: String,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Engine configuration failed its own validation.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// An I/O error while reading or writing a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for CLI command implementations.
pub type Result<T> = std::result::Result<T, CliError>;
