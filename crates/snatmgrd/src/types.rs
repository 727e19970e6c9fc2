//! Type definitions for snatmgrd

use serde::{Deserialize, Serialize};

use gwmgr_api::{wire_modes, PolicyRule, SnatRequest};
use gwmgr_common::{FieldValues, FieldValuesExt, GwMgrError, GwMgrResult};

use crate::schema::{constants, fields};

/// SNAT mode of a gateway.
///
/// `SingleIp` and `MultipleIps` take no policy rules; `CustomizedSnat`
/// requires at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnatMode {
    /// Translate to the gateway's primary IP
    SingleIp,
    /// Translate to the gateway's secondary IPs
    MultipleIps,
    /// Translate according to an explicit policy rule list
    CustomizedSnat,
}

impl SnatMode {
    /// Returns the mode name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            SnatMode::SingleIp => "single_ip",
            SnatMode::MultipleIps => "multiple_ips",
            SnatMode::CustomizedSnat => "customized_snat",
        }
    }

    /// Parses a configuration mode string.
    pub fn parse(s: &str) -> GwMgrResult<Self> {
        match s {
            "single_ip" => Ok(SnatMode::SingleIp),
            "multiple_ips" => Ok(SnatMode::MultipleIps),
            "customized_snat" => Ok(SnatMode::CustomizedSnat),
            other => Err(GwMgrError::invalid_config(
                fields::SNAT_MODE,
                format!(
                    "unknown mode '{}', valid values are 'single_ip', 'multiple_ips' and 'customized_snat'",
                    other
                ),
            )),
        }
    }

    /// Returns the request-side wire discriminator for this mode.
    ///
    /// Single-IP SNAT has no discriminator on the wire.
    pub fn request_mode(&self) -> &'static str {
        match self {
            SnatMode::SingleIp => "",
            SnatMode::MultipleIps => wire_modes::SECONDARY,
            SnatMode::CustomizedSnat => wire_modes::CUSTOM,
        }
    }

    /// Maps a gateway-reported mode back into the configuration model.
    ///
    /// Gateways report policy SNAT as `customized` and secondary-IP SNAT
    /// as `secondary`; anything else on an enabled gateway is single-IP.
    pub fn from_reported(reported: &str) -> Self {
        match reported {
            wire_modes::CUSTOMIZED => SnatMode::CustomizedSnat,
            wire_modes::SECONDARY => SnatMode::MultipleIps,
            _ => SnatMode::SingleIp,
        }
    }
}

impl Default for SnatMode {
    fn default() -> Self {
        SnatMode::SingleIp
    }
}

impl std::fmt::Display for SnatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declarative SNAT policy rule.
///
/// All qualifier fields are strings; empty means "not set". At least
/// one of the replacement fields should be set for a rule to have an
/// effect, but the controller owns that check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySpec {
    /// Source IP address range the rule applies to
    pub src_cidr: String,
    /// Source port the rule applies to
    pub src_port: String,
    /// Destination IP address range the rule applies to
    pub dst_cidr: String,
    /// Destination port the rule applies to
    pub dst_port: String,
    /// Protocol the rule applies to
    pub protocol: String,
    /// Output interface the rule applies to
    pub interface: String,
    /// Connection tag
    pub connection: String,
    /// Mark of a TCP session the rule applies to
    pub mark: String,
    /// Replacement source IP address when all qualifiers match
    pub snat_ips: String,
    /// Replacement source port when all qualifiers match
    pub snat_port: String,
    /// Private route table excluded from default-route programming
    pub exclude_rtb: String,
}

impl Default for PolicySpec {
    fn default() -> Self {
        Self {
            src_cidr: String::new(),
            src_port: String::new(),
            dst_cidr: String::new(),
            dst_port: String::new(),
            protocol: String::new(),
            interface: String::new(),
            connection: constants::DEFAULT_CONNECTION.to_string(),
            mark: String::new(),
            snat_ips: String::new(),
            snat_port: String::new(),
            exclude_rtb: String::new(),
        }
    }
}

impl PolicySpec {
    /// Builds a rule from a policy table entry.
    pub fn from_field_values(values: &FieldValues) -> Self {
        Self {
            src_cidr: values.get_field_or(fields::SRC_CIDR, "").to_string(),
            src_port: values.get_field_or(fields::SRC_PORT, "").to_string(),
            dst_cidr: values.get_field_or(fields::DST_CIDR, "").to_string(),
            dst_port: values.get_field_or(fields::DST_PORT, "").to_string(),
            protocol: values.get_field_or(fields::PROTOCOL, "").to_string(),
            interface: values.get_field_or(fields::INTERFACE, "").to_string(),
            connection: values
                .get_field_or(fields::CONNECTION, constants::DEFAULT_CONNECTION)
                .to_string(),
            mark: values.get_field_or(fields::MARK, "").to_string(),
            snat_ips: values.get_field_or(fields::SNAT_IPS, "").to_string(),
            snat_port: values.get_field_or(fields::SNAT_PORT, "").to_string(),
            exclude_rtb: values.get_field_or(fields::EXCLUDE_RTB, "").to_string(),
        }
    }

    /// Translates the rule into the wire struct, field by field.
    pub fn to_wire(&self) -> PolicyRule {
        PolicyRule {
            src_ip: self.src_cidr.clone(),
            src_port: self.src_port.clone(),
            dst_ip: self.dst_cidr.clone(),
            dst_port: self.dst_port.clone(),
            protocol: self.protocol.clone(),
            interface: self.interface.clone(),
            connection: self.connection.clone(),
            mark: self.mark.clone(),
            new_src_ip: self.snat_ips.clone(),
            new_src_port: self.snat_port.clone(),
            exclude_rtb: self.exclude_rtb.clone(),
        }
    }

    /// Translates a wire rule back into the declarative model.
    pub fn from_wire(rule: &PolicyRule) -> Self {
        Self {
            src_cidr: rule.src_ip.clone(),
            src_port: rule.src_port.clone(),
            dst_cidr: rule.dst_ip.clone(),
            dst_port: rule.dst_port.clone(),
            protocol: rule.protocol.clone(),
            interface: rule.interface.clone(),
            connection: rule.connection.clone(),
            mark: rule.mark.clone(),
            snat_ips: rule.new_src_ip.clone(),
            snat_port: rule.new_src_port.clone(),
            exclude_rtb: rule.exclude_rtb.clone(),
        }
    }
}

/// Desired SNAT configuration for one gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnatConfig {
    /// Name of the gateway (also the resource id)
    pub gw_name: String,
    /// Desired SNAT mode
    pub snat_mode: SnatMode,
    /// Policy rules; only meaningful for `customized_snat`
    pub snat_policy: Vec<PolicySpec>,
}

impl SnatConfig {
    /// Creates a configuration with the default mode and no policy.
    pub fn new(gw_name: impl Into<String>) -> Self {
        Self {
            gw_name: gw_name.into(),
            snat_mode: SnatMode::default(),
            snat_policy: Vec::new(),
        }
    }

    /// Sets the SNAT mode.
    pub fn with_mode(mut self, mode: SnatMode) -> Self {
        self.snat_mode = mode;
        self
    }

    /// Sets the policy rule list.
    pub fn with_policy(mut self, policy: Vec<PolicySpec>) -> Self {
        self.snat_policy = policy;
        self
    }

    /// Checks the mode/policy coupling invariant.
    ///
    /// The policy list must be empty unless the mode is
    /// `customized_snat`, in which case it must be non-empty.
    pub fn validate(&self) -> GwMgrResult<()> {
        match self.snat_mode {
            SnatMode::SingleIp | SnatMode::MultipleIps => {
                if !self.snat_policy.is_empty() {
                    return Err(GwMgrError::invalid_config(
                        "snat_policy",
                        format!(
                            "'snat_policy' must be empty for 'snat_mode' of '{}'",
                            self.snat_mode
                        ),
                    ));
                }
            }
            SnatMode::CustomizedSnat => {
                if self.snat_policy.is_empty() {
                    return Err(GwMgrError::invalid_config(
                        "snat_policy",
                        "specify 'snat_policy' for 'snat_mode' of 'customized_snat'",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Builds the enable request for this configuration.
    ///
    /// The policy list is translated only for `customized_snat`; the
    /// other modes send none regardless of local state.
    pub fn to_request(&self) -> SnatRequest {
        let mut request = SnatRequest::new(&self.gw_name).with_mode(self.snat_mode.request_mode());
        if self.snat_mode == SnatMode::CustomizedSnat {
            request = request.with_policy(self.snat_policy.iter().map(PolicySpec::to_wire).collect());
        }
        request
    }
}

/// Reconciled SNAT state of one gateway, as read back from the
/// controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnatState {
    /// Resource id (equals the gateway name)
    pub id: String,
    /// Name of the gateway
    pub gw_name: String,
    /// SNAT mode reported by the gateway
    pub snat_mode: SnatMode,
    /// Policy rules reported by the gateway; empty outside
    /// `customized_snat`
    pub snat_policy: Vec<PolicySpec>,
}
