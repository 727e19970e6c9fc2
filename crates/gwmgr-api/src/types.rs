//! Request and response structs for the gateway-management API.
//!
//! The structs here mirror the controller's wire vocabulary. Translation
//! between this vocabulary and the declarative configuration model is
//! the manager's job; nothing here validates anything.

use serde::{Deserialize, Serialize};

/// Wire value indicating NAT is enabled on a gateway.
pub const NAT_ENABLED: &str = "yes";

/// Wire value indicating NAT is disabled on a gateway.
pub const NAT_DISABLED: &str = "no";

/// SNAT mode discriminators as the controller speaks them.
///
/// The request side and the response side use different spellings for
/// policy-based SNAT: requests say `custom`, gateway reports say
/// `customized`. Both are kept here so neither side leaks into the other.
pub mod wire_modes {
    /// Request-side discriminator for secondary-IP SNAT.
    pub const SECONDARY: &str = "secondary";

    /// Request-side discriminator for policy-based SNAT.
    pub const CUSTOM: &str = "custom";

    /// Response-side spelling for policy-based SNAT.
    pub const CUSTOMIZED: &str = "customized";
}

/// A single SNAT policy rule as carried on the wire.
///
/// All fields are optional qualifier strings; empty means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Source IP address range the rule applies to.
    #[serde(default)]
    pub src_ip: String,

    /// Source port the rule applies to.
    #[serde(default)]
    pub src_port: String,

    /// Destination IP address range the rule applies to.
    #[serde(default)]
    pub dst_ip: String,

    /// Destination port the rule applies to.
    #[serde(default)]
    pub dst_port: String,

    /// Protocol the rule applies to.
    #[serde(default)]
    pub protocol: String,

    /// Output interface the rule applies to.
    #[serde(default)]
    pub interface: String,

    /// Connection tag.
    #[serde(default)]
    pub connection: String,

    /// Mark of a TCP session the rule applies to.
    #[serde(default)]
    pub mark: String,

    /// Replacement source IP address when all qualifiers match.
    #[serde(default)]
    pub new_src_ip: String,

    /// Replacement source port when all qualifiers match.
    #[serde(default)]
    pub new_src_port: String,

    /// Private route table excluded from default-route programming.
    #[serde(default)]
    pub exclude_rtb: String,
}

/// Request struct for `enable_snat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnatRequest {
    /// Name of the gateway.
    pub gateway_name: String,

    /// NAT enablement flag ("yes"/"no").
    pub enable_nat: String,

    /// SNAT mode discriminator; empty for plain single-IP SNAT.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub snat_mode: String,

    /// Policy rules; populated only for policy-based SNAT.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snat_policy: Vec<PolicyRule>,
}

impl SnatRequest {
    /// Creates an enable request for the named gateway with no mode
    /// discriminator (single-IP SNAT).
    pub fn new(gateway_name: impl Into<String>) -> Self {
        Self {
            gateway_name: gateway_name.into(),
            enable_nat: NAT_ENABLED.to_string(),
            snat_mode: String::new(),
            snat_policy: Vec::new(),
        }
    }

    /// Sets the mode discriminator.
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.snat_mode = mode.into();
        self
    }

    /// Sets the policy rule list.
    pub fn with_policy(mut self, policy: Vec<PolicyRule>) -> Self {
        self.snat_policy = policy;
        self
    }
}

/// Response struct for `get_gateway`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayInfo {
    /// Name of the gateway.
    pub gw_name: String,

    /// NAT enablement flag as reported by the gateway.
    #[serde(default)]
    pub enable_nat: String,

    /// SNAT mode as reported by the gateway ("customized", "secondary",
    /// or empty).
    #[serde(default)]
    pub snat_mode: String,
}

impl GatewayInfo {
    /// Returns true if the gateway reports NAT enabled.
    pub fn nat_enabled(&self) -> bool {
        self.enable_nat == NAT_ENABLED
    }
}

/// Response struct for `get_gateway_detail`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayDetail {
    /// Name of the gateway.
    pub gw_name: String,

    /// Installed SNAT policy rules.
    #[serde(default)]
    pub snat_policy: Vec<PolicyRule>,
}
