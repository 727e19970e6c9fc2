//! Test fixtures for gateway manager scenarios.
//!
//! Provides reusable declarative-change builders for manager testing.

use std::collections::BTreeMap;

use gwmgr_common::FieldValues;

/// Configuration change operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOp {
    /// SET operation (add or update).
    Set,
    /// DEL operation (delete).
    Del,
}

impl ConfigOp {
    /// Returns the operation string as delivered to managers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigOp::Set => "SET",
            ConfigOp::Del => "DEL",
        }
    }
}

/// Represents a declarative table change event.
#[derive(Debug, Clone)]
pub struct ConfigChange {
    /// Table name (e.g., "GATEWAY_SNAT").
    pub table: String,
    /// Key within the table.
    pub key: String,
    /// Operation type.
    pub op: ConfigOp,
    /// Field-value pairs (for SET operations).
    pub fields: BTreeMap<String, String>,
}

impl ConfigChange {
    /// Create a SET operation.
    pub fn set(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            op: ConfigOp::Set,
            fields: BTreeMap::new(),
        }
    }

    /// Create a DEL operation.
    pub fn del(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            op: ConfigOp::Del,
            fields: BTreeMap::new(),
        }
    }

    /// Add a field to a SET operation.
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Add multiple fields to a SET operation.
    pub fn with_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (field, value) in fields {
            self.fields.insert(field.into(), value.into());
        }
        self
    }

    /// Returns the fields as the field-value list managers consume.
    pub fn field_values(&self) -> FieldValues {
        self.fields
            .iter()
            .map(|(f, v)| (f.clone(), v.clone()))
            .collect()
    }
}

/// Builds a GATEWAY_SNAT entry for a gateway with the given mode.
pub fn snat_entry(gw_name: &str, snat_mode: &str) -> ConfigChange {
    ConfigChange::set("GATEWAY_SNAT", gw_name).with_field("snat_mode", snat_mode)
}

/// Builds a GATEWAY_SNAT_POLICY entry with a representative rule.
pub fn policy_entry(gw_name: &str, seq: u32) -> ConfigChange {
    ConfigChange::set("GATEWAY_SNAT_POLICY", format!("{}|{}", gw_name, seq)).with_fields([
        ("src_cidr", "10.0.1.0/24"),
        ("src_port", "1024"),
        ("dst_cidr", "192.168.10.0/24"),
        ("dst_port", "443"),
        ("protocol", "tcp"),
        ("interface", "eth0"),
        ("mark", "100"),
        ("snat_ips", "172.16.0.5"),
        ("snat_port", "8443"),
        ("exclude_rtb", "rtb-0a1b2c3d"),
    ])
}
