//! Error types for the publication registry.
//!
//! All errors are strongly typed using thiserror. Absent references handed
//! to mutating operations are not errors; they are silent no-ops.

use std::fmt;

use thiserror::Error;

use crate::identity::IdentityToken;

/// How a missing entry was addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKey {
    /// By published name.
    Name(String),
    /// By identity token.
    Identity(IdentityToken),
    /// By position in publication order.
    Index(usize),
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name '{name}'"),
            Self::Identity(token) => write!(f, "identity {token}"),
            Self::Index(index) => write!(f, "index {index}"),
        }
    }
}

/// Errors raised while loading or validating a [`RegistryConfig`](crate::RegistryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config field '{field}': {reason}")]
    InvalidField {
        field: String,
        reason: String,
    },
}

/// Top-level error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectKey),

    #[error("Registry capacity exceeded (max: {limit} objects)")]
    CapacityExceeded {
        limit: usize,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl RegistryError {
    /// Not-found error for a name lookup.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ObjectNotFound(ObjectKey::Name(name.into()))
    }

    /// Returns true if this is an object-not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound(_))
    }

    /// Returns true if a capacity limit was hit.
    #[must_use]
    pub const fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
