//! Gateway-management API surface.
//!
//! This crate holds the request/response structs exchanged with the
//! gateway-management controller and the [`GatewayApi`] trait that
//! transports implement. Managers depend on this crate for struct
//! construction and response interpretation only; no transport code
//! lives here.

pub mod client;
pub mod types;

// Re-export commonly used items at crate root
pub use client::{ApiError, ApiResult, GatewayApi};
pub use types::{
    wire_modes, GatewayDetail, GatewayInfo, PolicyRule, SnatRequest, NAT_DISABLED, NAT_ENABLED,
};
