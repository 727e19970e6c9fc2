//! Resource manager traits and common abstractions.
//!
//! This module provides the base traits implemented by all gateway
//! resource manager daemons, plus the field-value model used to carry
//! raw declarative table entries into the managers.

use async_trait::async_trait;

/// Table operation string for SET (add or update) entries.
pub const OP_SET: &str = "SET";

/// Table operation string for DEL (delete) entries.
pub const OP_DEL: &str = "DEL";

/// Base trait for all gateway managers.
///
/// Each manager implements this trait to participate in the daemon
/// event loop. The daemon calls these methods in response to
/// declarative table changes.
#[async_trait]
pub trait Mgr: Send + Sync {
    /// Returns the name of this manager (for logging and debugging).
    fn name(&self) -> &str;

    /// Processes pending tasks from all subscribed tables.
    ///
    /// This is the main entry point called by the daemon when
    /// data is available on any of this manager's tables.
    async fn do_task(&mut self);

    /// Returns true if this manager has pending work.
    fn has_pending_tasks(&self) -> bool {
        false
    }

    /// Dumps pending tasks for debugging.
    ///
    /// Returns a list of human-readable strings describing pending work.
    fn dump_pending_tasks(&self) -> Vec<String> {
        vec![]
    }
}

/// Base trait for resource manager daemons.
///
/// This trait extends [`Mgr`] with functionality specific to daemons
/// that reconcile declarative resource tables against a remote
/// management API.
///
/// # Example
///
/// ```ignore
/// use gwmgr_common::{Mgr, ResourceMgr};
///
/// struct MyMgr {
///     // ... state
/// }
///
/// #[async_trait]
/// impl Mgr for MyMgr {
///     fn name(&self) -> &str { "mymgr" }
///     async fn do_task(&mut self) { /* ... */ }
/// }
///
/// #[async_trait]
/// impl ResourceMgr for MyMgr {
///     fn daemon_name(&self) -> &str { "mymgrd" }
///
///     fn config_table_names(&self) -> &[&str] {
///         &["MY_TABLE"]
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceMgr: Mgr {
    /// Returns the daemon name (e.g., "snatmgrd").
    ///
    /// This is used for logging and process identification.
    fn daemon_name(&self) -> &str;

    /// Returns the subscribed configuration table names.
    fn config_table_names(&self) -> &[&str];
}

/// Key-value tuple representing a field and its value.
pub type FieldValue = (String, String);

/// Collection of field-value pairs for a table entry.
pub type FieldValues = Vec<FieldValue>;

/// Helper trait for working with field-value collections.
pub trait FieldValuesExt {
    /// Gets the value for a field, if present.
    fn get_field(&self, field: &str) -> Option<&str>;

    /// Gets the value for a field, returning the default if not present.
    fn get_field_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str;

    /// Checks if a field exists.
    fn has_field(&self, field: &str) -> bool;
}

impl FieldValuesExt for FieldValues {
    fn get_field(&self, field: &str) -> Option<&str> {
        self.iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    fn get_field_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str {
        self.get_field(field).unwrap_or(default)
    }

    fn has_field(&self, field: &str) -> bool {
        self.iter().any(|(f, _)| f == field)
    }
}

/// Builds a FieldValues collection from key-value pairs.
#[macro_export]
macro_rules! field_values {
    ($($field:expr => $value:expr),* $(,)?) => {
        vec![
            $(($field.to_string(), $value.to_string()),)*
        ]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_values_ext() {
        let fvs: FieldValues = vec![
            ("snat_mode".to_string(), "single_ip".to_string()),
            ("src_cidr".to_string(), "10.0.0.0/24".to_string()),
        ];

        assert_eq!(fvs.get_field("snat_mode"), Some("single_ip"));
        assert_eq!(fvs.get_field("src_cidr"), Some("10.0.0.0/24"));
        assert_eq!(fvs.get_field("nonexistent"), None);

        assert_eq!(fvs.get_field_or("snat_mode", "customized_snat"), "single_ip");
        assert_eq!(fvs.get_field_or("nonexistent", "default"), "default");

        assert!(fvs.has_field("snat_mode"));
        assert!(!fvs.has_field("nonexistent"));
    }

    #[test]
    fn test_field_values_macro() {
        let fvs = field_values! {
            "snat_mode" => "customized_snat",
            "protocol" => "tcp",
        };

        assert_eq!(fvs.len(), 2);
        assert_eq!(fvs.get_field("snat_mode"), Some("customized_snat"));
        assert_eq!(fvs.get_field("protocol"), Some("tcp"));
    }

    #[test]
    fn test_op_constants() {
        assert_eq!(OP_SET, "SET");
        assert_eq!(OP_DEL, "DEL");
    }
}
