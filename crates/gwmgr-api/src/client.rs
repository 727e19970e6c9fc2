//! Gateway-management API client trait.
//!
//! The controller transport (connection handling, authentication,
//! retry/backoff) lives behind this trait. Managers only construct
//! request structs and interpret response structs.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{GatewayDetail, GatewayInfo, SnatRequest};

/// Result type alias for controller API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors reported by a controller client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The referenced gateway does not exist on the controller.
    #[error("gateway not found")]
    NotFound,

    /// The controller rejected the request.
    #[error("controller rejected '{operation}': {message}")]
    Rejected {
        /// The API operation that was rejected.
        operation: String,
        /// Reason reported by the controller.
        message: String,
    },

    /// Transport-level failure while talking to the controller.
    #[error("controller transport failure during '{operation}': {message}")]
    Transport {
        /// The API operation in flight.
        operation: String,
        /// Failure description.
        message: String,
    },
}

impl ApiError {
    /// Creates a rejection error.
    pub fn rejected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error means the gateway is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

/// Client operations against the gateway-management controller.
///
/// Implementations own the session with the controller; the trait only
/// exposes the four calls the SNAT manager needs. All calls are issued
/// sequentially by the managers.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Enables SNAT on a gateway according to the request struct.
    ///
    /// Re-issuing the call replaces the gateway's SNAT configuration
    /// with the one described by `request`.
    async fn enable_snat(&self, request: &SnatRequest) -> ApiResult<()>;

    /// Disables SNAT on the named gateway.
    async fn disable_snat(&self, gw_name: &str) -> ApiResult<()>;

    /// Fetches summary state for the named gateway.
    async fn get_gateway(&self, gw_name: &str) -> ApiResult<GatewayInfo>;

    /// Fetches detail state (including installed policy rules) for the
    /// named gateway.
    async fn get_gateway_detail(&self, gw_name: &str) -> ApiResult<GatewayDetail>;
}
