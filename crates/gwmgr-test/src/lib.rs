//! Test infrastructure for gateway configuration managers
//!
//! Provides:
//! - Scripted in-memory controller implementing the gateway API
//! - Declarative-change fixtures for table-driven tests
//! - Call-sequence recording for imperative-side assertions

pub mod fixtures;
pub mod mock_api;

pub use fixtures::*;
pub use mock_api::{GatewayRecord, MockController};
