//! Table and field name declarations for snatmgrd

use gwmgr_common::{GwMgrError, GwMgrResult};

/// Gateway SNAT table (one entry per gateway)
pub const CFG_GATEWAY_SNAT_TABLE_NAME: &str = "GATEWAY_SNAT";

/// Gateway SNAT policy table (one entry per rule, keyed `<gateway>|<seq>`)
pub const CFG_GATEWAY_SNAT_POLICY_TABLE_NAME: &str = "GATEWAY_SNAT_POLICY";

/// Field names used in the SNAT tables
pub mod fields {
    pub const SNAT_MODE: &str = "snat_mode";

    pub const SRC_CIDR: &str = "src_cidr";
    pub const SRC_PORT: &str = "src_port";
    pub const DST_CIDR: &str = "dst_cidr";
    pub const DST_PORT: &str = "dst_port";
    pub const PROTOCOL: &str = "protocol";
    pub const INTERFACE: &str = "interface";
    pub const CONNECTION: &str = "connection";
    pub const MARK: &str = "mark";
    pub const SNAT_IPS: &str = "snat_ips";
    pub const SNAT_PORT: &str = "snat_port";
    pub const EXCLUDE_RTB: &str = "exclude_rtb";
}

/// Special constants
pub mod constants {
    /// Mode applied when an entry omits snat_mode
    pub const DEFAULT_SNAT_MODE: &str = "single_ip";

    /// Default connection tag for policy rules
    pub const DEFAULT_CONNECTION: &str = "None";

    /// Separator between gateway name and rule sequence in policy keys
    pub const POLICY_KEY_SEPARATOR: char = '|';
}

/// Splits a policy table key into gateway name and rule sequence.
///
/// Policy keys have the form `<gateway>|<seq>`; the sequence orders the
/// rules within a gateway's policy list.
pub fn parse_policy_key(key: &str) -> GwMgrResult<(String, u32)> {
    let (gw_name, seq) = key
        .rsplit_once(constants::POLICY_KEY_SEPARATOR)
        .ok_or_else(|| {
            GwMgrError::invalid_config(
                "key",
                format!("policy key '{}' is not of the form <gateway>|<seq>", key),
            )
        })?;

    if gw_name.is_empty() {
        return Err(GwMgrError::invalid_config(
            "key",
            format!("policy key '{}' has an empty gateway name", key),
        ));
    }

    let seq = seq.parse::<u32>().map_err(|_| {
        GwMgrError::invalid_config(
            "key",
            format!("policy key '{}' has a non-numeric sequence", key),
        )
    })?;

    Ok((gw_name.to_string(), seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy_key() {
        let (gw, seq) = parse_policy_key("gw-east-1|10").unwrap();
        assert_eq!(gw, "gw-east-1");
        assert_eq!(seq, 10);
    }

    #[test]
    fn test_parse_policy_key_no_separator() {
        assert!(parse_policy_key("gw-east-1").is_err());
    }

    #[test]
    fn test_parse_policy_key_bad_sequence() {
        assert!(parse_policy_key("gw-east-1|ten").is_err());
        assert!(parse_policy_key("gw-east-1|").is_err());
    }

    #[test]
    fn test_parse_policy_key_empty_gateway() {
        assert!(parse_policy_key("|10").is_err());
    }

    #[test]
    fn test_table_names() {
        assert_eq!(CFG_GATEWAY_SNAT_TABLE_NAME, "GATEWAY_SNAT");
        assert_eq!(CFG_GATEWAY_SNAT_POLICY_TABLE_NAME, "GATEWAY_SNAT_POLICY");
    }
}
