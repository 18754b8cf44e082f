//! Error types for configuration and script loading.
//!
//! Steady-state playback never fails; these are only returned while building
//! an engine or reading its inputs from disk.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unreadable engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A virtualization window of zero segments.
    #[error("max_visible_segments must be at least 1")]
    InvalidWindow,

    /// A text field that must carry a value is empty.
    #[error("{0} must not be blank")]
    BlankField(&'static str),
}

/// Unreadable or malformed typing script.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("Failed to read script {path:?}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The script text is not valid TOML for this schema.
    #[error("Failed to parse script: {0}")]
    Parse(#[from] toml::de::Error),
}
