//! # snatmgrd - Gateway Source-NAT Configuration Manager
//!
//! This module implements the SNAT configuration manager daemon for
//! gateways managed through the remote controller API. It translates
//! declarative SNAT configuration into controller calls and reconciles
//! the reported gateway state back into the model.
//!
//! ## Responsibilities
//! - Per-gateway SNAT mode configuration (single_ip / multiple_ips /
//!   customized_snat)
//! - Policy rule list management for customized_snat gateways
//! - Mode/policy coupling validation
//! - Remote state reconciliation, including import by gateway name
//!
//! ## Configuration Sources
//! - `GATEWAY_SNAT` table: per-gateway mode
//! - `GATEWAY_SNAT_POLICY` table: per-rule entries, keyed `<gateway>|<seq>`
//!
//! ## Key Features
//! - No local translation work; all SNAT programming is delegated to
//!   the controller through the client trait
//! - A mode change disables SNAT before re-enabling with the new mode
//! - A policy refresh re-enables in place, without a disable
//! - Policy entries arriving before their gateway entry are held until
//!   the gateway entry lands

mod schema;
mod snat_mgr;
mod types;

pub use schema::*;
pub use snat_mgr::SnatMgr;
pub use types::*;
