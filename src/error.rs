//! Error types and handling for `TripSense`

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// External collaborator that produced a [`TravelAiError::Tool`] failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Geocode,
    Weather,
    Places,
    Llm,
}

impl ToolKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Geocode => "geocode",
            ToolKind::Weather => "weather",
            ToolKind::Places => "places",
            ToolKind::Llm => "llm",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the `TripSense` application
#[derive(Error, Debug)]
pub enum TravelAiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A third-party tool (geocoder, weather, places, llm) failed
    #[error("{tool} tool failed: {message}")]
    Tool { tool: ToolKind, message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TravelAiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new tool failure
    pub fn tool<S: Into<String>>(tool: ToolKind, message: S) -> Self {
        Self::Tool {
            tool,
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// The failing tool, if this is a tool failure
    #[must_use]
    pub fn tool_kind(&self) -> Option<ToolKind> {
        match self {
            TravelAiError::Tool { tool, .. } => Some(*tool),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelAiError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            TravelAiError::Tool { tool, .. } => format!(
                "The {tool} service is unavailable right now. Please try again shortly."
            ),
            TravelAiError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TravelAiError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            TravelAiError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
