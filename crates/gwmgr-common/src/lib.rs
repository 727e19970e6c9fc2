//! Common infrastructure for gateway configuration manager daemons.
//!
//! This crate provides shared functionality for the gwmgr daemons
//! (snatmgrd and siblings):
//!
//! - [`ResourceMgr`]: Base trait for managers reconciling declarative
//!   tables against a remote management API
//! - [`error`]: Error types for manager operations
//! - Field-value helpers for raw table entries
//!
//! # Architecture
//!
//! Resource managers follow this pattern:
//!
//! 1. Subscribe to declarative configuration tables
//! 2. Validate and translate entries into API request structs
//! 3. Issue imperative calls against the controller client
//! 4. Reconcile the reported remote state back into the model
//!
//! # Example
//!
//! ```ignore
//! use gwmgr_common::{FieldValues, FieldValuesExt, GwMgrResult, GwMgrError};
//!
//! fn mode_of(values: &FieldValues) -> GwMgrResult<&str> {
//!     values
//!         .get_field("snat_mode")
//!         .ok_or_else(|| GwMgrError::invalid_config("snat_mode", "missing"))
//! }
//! ```

pub mod error;
pub mod resource;

// Re-export commonly used items at crate root
pub use error::{GwMgrError, GwMgrResult};
pub use resource::{
    FieldValue, FieldValues, FieldValuesExt, Mgr, ResourceMgr, OP_DEL, OP_SET,
};
