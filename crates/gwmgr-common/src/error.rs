//! Error types for gateway manager operations.
//!
//! This module defines the error types used throughout the gwmgr crates.
//! All errors implement `std::error::Error` via `thiserror`.

use thiserror::Error;

/// Result type alias for gateway manager operations.
pub type GwMgrResult<T> = Result<T, GwMgrError>;

/// Errors that can occur during gateway manager operations.
#[derive(Debug, Error)]
pub enum GwMgrError {
    /// A controller API call failed.
    #[error("Controller call '{operation}' failed for gateway '{gateway}': {message}")]
    ApiCall {
        /// The API operation that failed (e.g., "enable_snat").
        operation: String,
        /// The gateway the call was issued for.
        gateway: String,
        /// Error message from the client.
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Gateway not found on the controller.
    #[error("Gateway '{gateway}' not found")]
    GatewayNotFound {
        /// The gateway name.
        gateway: String,
    },

    /// SNAT is not enabled on the remote gateway.
    #[error("SNAT is not enabled for gateway '{gateway}'")]
    SnatDisabled {
        /// The gateway name.
        gateway: String,
    },

    /// Table entry not found.
    #[error("Table entry not found: {table}:{key}")]
    EntryNotFound {
        /// The table name.
        table: String,
        /// The key.
        key: String,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl GwMgrError {
    /// Creates a controller API call error.
    pub fn api_call(
        operation: impl Into<String>,
        gateway: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ApiCall {
            operation: operation.into(),
            gateway: gateway.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a gateway not found error.
    pub fn gateway_not_found(gateway: impl Into<String>) -> Self {
        Self::GatewayNotFound {
            gateway: gateway.into(),
        }
    }

    /// Creates a SNAT disabled error.
    pub fn snat_disabled(gateway: impl Into<String>) -> Self {
        Self::SnatDisabled {
            gateway: gateway.into(),
        }
    }

    /// Creates an entry not found error.
    pub fn entry_not_found(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::EntryNotFound {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GwMgrError::ApiCall { .. })
    }
}
