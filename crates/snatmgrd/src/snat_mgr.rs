//! SnatMgr - Gateway source-NAT configuration manager implementation

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use gwmgr_api::GatewayApi;
use gwmgr_common::{
    FieldValues, FieldValuesExt, GwMgrError, GwMgrResult, Mgr, ResourceMgr, OP_DEL, OP_SET,
};

use crate::schema::{
    constants, fields, parse_policy_key, CFG_GATEWAY_SNAT_POLICY_TABLE_NAME,
    CFG_GATEWAY_SNAT_TABLE_NAME,
};
use crate::types::{PolicySpec, SnatConfig, SnatMode, SnatState};

/// SnatMgr reconciles declarative gateway SNAT configuration against
/// the controller.
///
/// Configuration flow:
/// 1. GATEWAY_SNAT table → desired mode per gateway
/// 2. GATEWAY_SNAT_POLICY table → desired rule list per gateway
/// 3. Desired config → enable/disable calls against the controller
/// 4. Reported gateway state → reconciled back into the model
pub struct SnatMgr<C: GatewayApi> {
    /// Controller client
    client: C,

    /// Desired SNAT mode per gateway, as last seen from config
    mode_cache: HashMap<String, SnatMode>,

    /// Desired policy rules per gateway, keyed by rule sequence
    policy_cache: HashMap<String, BTreeMap<u32, PolicySpec>>,

    /// Reconciled state per gateway whose SNAT has been applied
    applied: HashMap<String, SnatState>,
}

impl<C: GatewayApi> SnatMgr<C> {
    /// Creates a new SnatMgr driving the given controller client.
    pub fn new(client: C) -> Self {
        Self {
            client,
            mode_cache: HashMap::new(),
            policy_cache: HashMap::new(),
            applied: HashMap::new(),
        }
    }

    /// Returns the controller client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the last reconciled state for a gateway, if any.
    pub fn applied_state(&self, gw_name: &str) -> Option<&SnatState> {
        self.applied.get(gw_name)
    }

    /// Assembles the desired configuration for a gateway from the
    /// cached table entries.
    fn desired_config(&self, gw_name: &str) -> SnatConfig {
        let snat_mode = self.mode_cache.get(gw_name).copied().unwrap_or_default();
        let snat_policy = self
            .policy_cache
            .get(gw_name)
            .map(|rules| rules.values().cloned().collect())
            .unwrap_or_default();
        SnatConfig {
            gw_name: gw_name.to_string(),
            snat_mode,
            snat_policy,
        }
    }

    /// Enables SNAT for a gateway that has no applied state yet.
    ///
    /// Validates the mode/policy coupling, issues `enable_snat`, then
    /// reconciles by reading the gateway back.
    #[instrument(skip(self, config))]
    pub async fn create(&mut self, config: &SnatConfig) -> GwMgrResult<SnatState> {
        config.validate()?;

        let request = config.to_request();
        self.client.enable_snat(&request).await.map_err(|e| {
            GwMgrError::api_call("enable_snat", &config.gw_name, e.to_string())
        })?;
        info!(
            "SNAT mode '{}' enabled for gateway {}",
            config.snat_mode, config.gw_name
        );

        match self.read(&config.gw_name, &config.gw_name).await? {
            Some(state) => Ok(state),
            None => Err(GwMgrError::gateway_not_found(&config.gw_name)),
        }
    }

    /// Reconciles remote SNAT state into the declarative model.
    ///
    /// An empty gateway name means the resource is being imported; the
    /// resource id is adopted as the name. A vanished gateway clears the
    /// applied state and returns `None`.
    #[instrument(skip(self))]
    pub async fn read(&mut self, gw_name: &str, id: &str) -> GwMgrResult<Option<SnatState>> {
        let gw_name = if gw_name.is_empty() {
            debug!("No gateway name in config, adopting import id {}", id);
            id
        } else {
            gw_name
        };

        let info = match self.client.get_gateway(gw_name).await {
            Ok(info) => info,
            Err(e) if e.is_not_found() => {
                debug!("Gateway {} is gone, clearing applied state", gw_name);
                self.applied.remove(gw_name);
                return Ok(None);
            }
            Err(e) => {
                return Err(GwMgrError::api_call("get_gateway", gw_name, e.to_string()));
            }
        };

        if !info.nat_enabled() {
            return Err(GwMgrError::snat_disabled(gw_name));
        }

        let snat_mode = SnatMode::from_reported(&info.snat_mode);
        let snat_policy = if snat_mode == SnatMode::CustomizedSnat {
            let detail = self.client.get_gateway_detail(gw_name).await.map_err(|e| {
                GwMgrError::api_call("get_gateway_detail", gw_name, e.to_string())
            })?;
            detail
                .snat_policy
                .iter()
                .map(PolicySpec::from_wire)
                .collect()
        } else {
            Vec::new()
        };

        let state = SnatState {
            id: gw_name.to_string(),
            gw_name: info.gw_name,
            snat_mode,
            snat_policy,
        };
        self.applied.insert(gw_name.to_string(), state.clone());
        Ok(Some(state))
    }

    /// Reconciles a changed declarative configuration against the
    /// applied state.
    ///
    /// A mode change disables SNAT and re-enables it with the new
    /// request. A policy-only change refreshes the policy in place and
    /// is valid only under `customized_snat`.
    #[instrument(skip(self, config))]
    pub async fn update(&mut self, config: &SnatConfig) -> GwMgrResult<SnatState> {
        let prev = self
            .applied
            .get(&config.gw_name)
            .cloned()
            .ok_or_else(|| GwMgrError::gateway_not_found(&config.gw_name))?;

        let mode_changed = prev.snat_mode != config.snat_mode;
        let policy_changed = prev.snat_policy != config.snat_policy;

        if mode_changed {
            config.validate()?;
            let request = config.to_request();

            self.client
                .disable_snat(&config.gw_name)
                .await
                .map_err(|e| {
                    GwMgrError::api_call("disable_snat", &config.gw_name, e.to_string())
                })?;
            self.client.enable_snat(&request).await.map_err(|e| {
                GwMgrError::api_call("enable_snat", &config.gw_name, e.to_string())
            })?;
            info!(
                "SNAT mode changed from '{}' to '{}' for gateway {}",
                prev.snat_mode, config.snat_mode, config.gw_name
            );
        } else if policy_changed {
            if config.snat_mode != SnatMode::CustomizedSnat {
                return Err(GwMgrError::invalid_config(
                    "snat_policy",
                    format!(
                        "cannot update 'snat_policy' for 'snat_mode' of '{}'",
                        config.snat_mode
                    ),
                ));
            }
            config.validate()?;
            let request = config.to_request();

            self.client.enable_snat(&request).await.map_err(|e| {
                GwMgrError::api_call("enable_snat", &config.gw_name, e.to_string())
            })?;
            info!(
                "SNAT policy refreshed for gateway {} ({} rules)",
                config.gw_name,
                config.snat_policy.len()
            );
        } else {
            debug!("No SNAT change for gateway {}", config.gw_name);
        }

        match self.read(&config.gw_name, &config.gw_name).await? {
            Some(state) => Ok(state),
            None => Err(GwMgrError::gateway_not_found(&config.gw_name)),
        }
    }

    /// Disables SNAT for a gateway and drops its applied state.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, gw_name: &str) -> GwMgrResult<()> {
        self.client
            .disable_snat(gw_name)
            .await
            .map_err(|e| GwMgrError::api_call("disable_snat", gw_name, e.to_string()))?;
        self.applied.remove(gw_name);
        info!("SNAT disabled for gateway {}", gw_name);
        Ok(())
    }

    /// Applies the desired configuration, creating or updating as
    /// appropriate.
    async fn apply(&mut self, config: &SnatConfig) -> GwMgrResult<()> {
        if self.applied.contains_key(&config.gw_name) {
            self.update(config).await?;
        } else {
            self.create(config).await?;
        }
        Ok(())
    }

    /// Handles GATEWAY_SNAT table SET/DEL operations.
    ///
    /// Returns `Ok(false)` when the entry cannot be applied yet (policy
    /// SNAT configured before its rules arrived) and should be retried.
    pub async fn do_snat_task(
        &mut self,
        gw_name: &str,
        op: &str,
        values: &FieldValues,
    ) -> GwMgrResult<bool> {
        match op {
            OP_SET => {
                let mode = SnatMode::parse(
                    values.get_field_or(fields::SNAT_MODE, constants::DEFAULT_SNAT_MODE),
                )?;
                self.mode_cache.insert(gw_name.to_string(), mode);

                let config = self.desired_config(gw_name);
                if mode == SnatMode::CustomizedSnat && config.snat_policy.is_empty() {
                    debug!("Gateway {} waits for policy entries", gw_name);
                    return Ok(false);
                }
                self.apply(&config).await?;
                Ok(true)
            }
            OP_DEL => {
                self.mode_cache.remove(gw_name);
                if self.applied.contains_key(gw_name) {
                    self.delete(gw_name).await?;
                }
                Ok(true)
            }
            other => Err(GwMgrError::invalid_config(
                "op",
                format!("Unknown operation: {}", other),
            )),
        }
    }

    /// Handles GATEWAY_SNAT_POLICY table SET/DEL operations.
    ///
    /// Rule entries for gateways without a SNAT entry are cached until
    /// the gateway entry arrives. Returns `Ok(false)` when the change
    /// leaves a policy-SNAT gateway without rules.
    pub async fn do_policy_task(
        &mut self,
        key: &str,
        op: &str,
        values: &FieldValues,
    ) -> GwMgrResult<bool> {
        let (gw_name, seq) = parse_policy_key(key)?;

        match op {
            OP_SET => {
                let spec = PolicySpec::from_field_values(values);
                self.policy_cache
                    .entry(gw_name.clone())
                    .or_default()
                    .insert(seq, spec);
            }
            OP_DEL => {
                if let Some(rules) = self.policy_cache.get_mut(&gw_name) {
                    rules.remove(&seq);
                    if rules.is_empty() {
                        self.policy_cache.remove(&gw_name);
                    }
                }
            }
            other => {
                return Err(GwMgrError::invalid_config(
                    "op",
                    format!("Unknown operation: {}", other),
                ));
            }
        }

        let Some(mode) = self.mode_cache.get(&gw_name).copied() else {
            debug!("Policy entry for unconfigured gateway {}, cached only", gw_name);
            return Ok(true);
        };

        let config = self.desired_config(&gw_name);
        if mode != SnatMode::CustomizedSnat {
            if !config.snat_policy.is_empty() {
                return Err(GwMgrError::invalid_config(
                    "snat_policy",
                    format!("'snat_policy' must be empty for 'snat_mode' of '{}'", mode),
                ));
            }
            // A rule removal under the other modes needs no call
            return Ok(true);
        }
        if config.snat_policy.is_empty() {
            warn!(
                "Gateway {} has 'customized_snat' mode but no policy rules left",
                gw_name
            );
            return Ok(false);
        }

        self.apply(&config).await?;
        Ok(true)
    }
}

/// Mgr trait implementation
#[async_trait]
impl<C: GatewayApi> Mgr for SnatMgr<C> {
    fn name(&self) -> &str {
        "snatmgr"
    }

    async fn do_task(&mut self) {
        // The daemon drains its table consumers into do_snat_task /
        // do_policy_task; nothing is buffered here between drains.
        debug!("do_task called with no pending entries");
    }

    fn has_pending_tasks(&self) -> bool {
        self.mode_cache
            .keys()
            .any(|gw| !self.applied.contains_key(gw))
    }

    fn dump_pending_tasks(&self) -> Vec<String> {
        self.mode_cache
            .keys()
            .filter(|gw| !self.applied.contains_key(*gw))
            .map(|gw| format!("gateway {} configured but not applied", gw))
            .collect()
    }
}

/// ResourceMgr trait implementation
#[async_trait]
impl<C: GatewayApi> ResourceMgr for SnatMgr<C> {
    fn daemon_name(&self) -> &str {
        "snatmgrd"
    }

    fn config_table_names(&self) -> &[&str] {
        &[
            CFG_GATEWAY_SNAT_TABLE_NAME,
            CFG_GATEWAY_SNAT_POLICY_TABLE_NAME,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwmgr_api::{ApiError, NAT_DISABLED, NAT_ENABLED};
    use gwmgr_common::field_values;
    use gwmgr_test::MockController;

    fn sample_policy() -> PolicySpec {
        PolicySpec {
            src_cidr: "10.0.1.0/24".to_string(),
            protocol: "tcp".to_string(),
            snat_ips: "172.16.0.5".to_string(),
            ..Default::default()
        }
    }

    fn mgr() -> SnatMgr<MockController> {
        SnatMgr::new(MockController::new())
    }

    #[tokio::test]
    async fn test_create_single_ip() {
        let mut mgr = mgr();
        let state = mgr.create(&SnatConfig::new("gw1")).await.unwrap();

        assert_eq!(state.id, "gw1");
        assert_eq!(state.snat_mode, SnatMode::SingleIp);
        assert!(state.snat_policy.is_empty());

        assert_eq!(mgr.client().calls(), vec!["enable_snat gw1", "get_gateway gw1"]);
    }

    #[tokio::test]
    async fn test_create_customized_reads_detail_back() {
        let mut mgr = mgr();
        let config = SnatConfig::new("gw1")
            .with_mode(SnatMode::CustomizedSnat)
            .with_policy(vec![sample_policy()]);
        let state = mgr.create(&config).await.unwrap();

        assert_eq!(state.snat_mode, SnatMode::CustomizedSnat);
        assert_eq!(state.snat_policy, vec![sample_policy()]);

        assert_eq!(
            mgr.client().calls(),
            vec![
                "enable_snat gw1",
                "get_gateway gw1",
                "get_gateway_detail gw1"
            ]
        );
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_coupling() {
        let mut mgr = mgr();

        let err = mgr
            .create(&SnatConfig::new("gw1").with_policy(vec![sample_policy()]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be empty"));

        let err = mgr
            .create(&SnatConfig::new("gw1").with_mode(SnatMode::CustomizedSnat))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("specify 'snat_policy'"));

        // Validation failures never reach the controller
        assert!(mgr.client().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_wraps_client_error() {
        let mut mgr = mgr();
        mgr.client()
            .fail_next("enable_snat", ApiError::rejected("enable_snat", "quota"));

        let err = mgr.create(&SnatConfig::new("gw1")).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("enable_snat"));
        assert!(err.to_string().contains("gw1"));
        assert!(err.to_string().contains("quota"));
    }

    #[tokio::test]
    async fn test_read_import_adopts_id() {
        let mut mgr = mgr();
        mgr.client()
            .seed_gateway("gw1", NAT_ENABLED, "secondary", vec![]);

        let state = mgr.read("", "gw1").await.unwrap().unwrap();
        assert_eq!(state.id, "gw1");
        assert_eq!(state.gw_name, "gw1");
        assert_eq!(state.snat_mode, SnatMode::MultipleIps);
    }

    #[tokio::test]
    async fn test_read_gone_gateway_clears_state() {
        let mut mgr = mgr();
        mgr.create(&SnatConfig::new("gw1")).await.unwrap();
        assert!(mgr.applied_state("gw1").is_some());

        // Simulate the gateway vanishing behind our back
        mgr.client()
            .fail_next("get_gateway", ApiError::NotFound);

        let state = mgr.read("gw1", "gw1").await.unwrap();
        assert!(state.is_none());
        assert!(mgr.applied_state("gw1").is_none());
    }

    #[tokio::test]
    async fn test_read_nat_disabled_is_error() {
        let mut mgr = mgr();
        mgr.client().seed_gateway("gw1", NAT_DISABLED, "", vec![]);

        let err = mgr.read("gw1", "gw1").await.unwrap_err();
        assert!(err.to_string().contains("SNAT is not enabled"));
    }

    #[tokio::test]
    async fn test_update_mode_change_disables_then_enables() {
        let mut mgr = mgr();
        mgr.create(&SnatConfig::new("gw1")).await.unwrap();
        mgr.client().clear_calls();

        let state = mgr
            .update(&SnatConfig::new("gw1").with_mode(SnatMode::MultipleIps))
            .await
            .unwrap();
        assert_eq!(state.snat_mode, SnatMode::MultipleIps);

        assert_eq!(
            mgr.client().calls(),
            vec!["disable_snat gw1", "enable_snat gw1", "get_gateway gw1"]
        );
    }

    #[tokio::test]
    async fn test_update_policy_only_refreshes_in_place() {
        let mut mgr = mgr();
        let config = SnatConfig::new("gw1")
            .with_mode(SnatMode::CustomizedSnat)
            .with_policy(vec![sample_policy()]);
        mgr.create(&config).await.unwrap();
        mgr.client().clear_calls();

        let mut changed = sample_policy();
        changed.snat_port = "8443".to_string();
        let state = mgr
            .update(&config.clone().with_policy(vec![changed.clone()]))
            .await
            .unwrap();
        assert_eq!(state.snat_policy, vec![changed]);

        // No disable on a policy refresh
        assert_eq!(
            mgr.client().calls(),
            vec![
                "enable_snat gw1",
                "get_gateway gw1",
                "get_gateway_detail gw1"
            ]
        );
    }

    #[tokio::test]
    async fn test_update_policy_under_wrong_mode_is_rejected() {
        let mut mgr = mgr();
        mgr.create(&SnatConfig::new("gw1")).await.unwrap();
        mgr.client().clear_calls();

        let err = mgr
            .update(&SnatConfig::new("gw1").with_policy(vec![sample_policy()]))
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("cannot update 'snat_policy' for 'snat_mode' of 'single_ip'"));
        assert!(mgr.client().calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_without_applied_state() {
        let mut mgr = mgr();
        let err = mgr.update(&SnatConfig::new("gw1")).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_update_no_change_still_reconciles() {
        let mut mgr = mgr();
        mgr.create(&SnatConfig::new("gw1")).await.unwrap();
        mgr.client().clear_calls();

        mgr.update(&SnatConfig::new("gw1")).await.unwrap();
        assert_eq!(mgr.client().calls(), vec!["get_gateway gw1"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let mut mgr = mgr();
        mgr.create(&SnatConfig::new("gw1")).await.unwrap();
        mgr.client().clear_calls();

        mgr.delete("gw1").await.unwrap();
        assert!(mgr.applied_state("gw1").is_none());
        assert_eq!(mgr.client().calls(), vec!["disable_snat gw1"]);
    }

    #[tokio::test]
    async fn test_do_snat_task_set_and_del() {
        let mut mgr = mgr();

        let done = mgr
            .do_snat_task("gw1", OP_SET, &field_values! { "snat_mode" => "single_ip" })
            .await
            .unwrap();
        assert!(done);
        assert!(mgr.applied_state("gw1").is_some());

        let done = mgr.do_snat_task("gw1", OP_DEL, &vec![]).await.unwrap();
        assert!(done);
        assert!(mgr.applied_state("gw1").is_none());
    }

    #[tokio::test]
    async fn test_do_snat_task_defaults_mode() {
        let mut mgr = mgr();
        mgr.do_snat_task("gw1", OP_SET, &vec![]).await.unwrap();

        let state = mgr.applied_state("gw1").unwrap();
        assert_eq!(state.snat_mode, SnatMode::SingleIp);
    }

    #[tokio::test]
    async fn test_do_snat_task_waits_for_policy() {
        let mut mgr = mgr();

        let done = mgr
            .do_snat_task(
                "gw1",
                OP_SET,
                &field_values! { "snat_mode" => "customized_snat" },
            )
            .await
            .unwrap();
        assert!(!done);
        assert!(mgr.client().calls().is_empty());
        assert!(mgr.has_pending_tasks());

        let done = mgr
            .do_policy_task(
                "gw1|10",
                OP_SET,
                &field_values! { "src_cidr" => "10.0.1.0/24", "snat_ips" => "172.16.0.5" },
            )
            .await
            .unwrap();
        assert!(done);
        assert!(!mgr.has_pending_tasks());

        let state = mgr.applied_state("gw1").unwrap();
        assert_eq!(state.snat_mode, SnatMode::CustomizedSnat);
        assert_eq!(state.snat_policy.len(), 1);
        assert_eq!(state.snat_policy[0].src_cidr, "10.0.1.0/24");
    }

    #[tokio::test]
    async fn test_do_policy_task_orders_rules_by_sequence() {
        let mut mgr = mgr();
        mgr.do_policy_task("gw1|20", OP_SET, &field_values! { "src_cidr" => "10.0.2.0/24" })
            .await
            .unwrap();
        mgr.do_policy_task("gw1|10", OP_SET, &field_values! { "src_cidr" => "10.0.1.0/24" })
            .await
            .unwrap();
        mgr.do_snat_task(
            "gw1",
            OP_SET,
            &field_values! { "snat_mode" => "customized_snat" },
        )
        .await
        .unwrap();

        let state = mgr.applied_state("gw1").unwrap();
        assert_eq!(state.snat_policy[0].src_cidr, "10.0.1.0/24");
        assert_eq!(state.snat_policy[1].src_cidr, "10.0.2.0/24");
    }

    #[tokio::test]
    async fn test_do_policy_task_for_unconfigured_gateway_caches_only() {
        let mut mgr = mgr();
        let done = mgr
            .do_policy_task("gw1|10", OP_SET, &field_values! { "src_cidr" => "10.0.1.0/24" })
            .await
            .unwrap();
        assert!(done);
        assert!(mgr.client().calls().is_empty());
    }

    #[tokio::test]
    async fn test_do_policy_task_rejects_rules_under_single_ip() {
        let mut mgr = mgr();
        mgr.do_snat_task("gw1", OP_SET, &field_values! { "snat_mode" => "single_ip" })
            .await
            .unwrap();

        let err = mgr
            .do_policy_task("gw1|10", OP_SET, &field_values! { "src_cidr" => "10.0.1.0/24" })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be empty"));
    }

    #[tokio::test]
    async fn test_do_policy_task_last_rule_removed() {
        let mut mgr = mgr();
        mgr.do_policy_task("gw1|10", OP_SET, &field_values! { "src_cidr" => "10.0.1.0/24" })
            .await
            .unwrap();
        mgr.do_snat_task(
            "gw1",
            OP_SET,
            &field_values! { "snat_mode" => "customized_snat" },
        )
        .await
        .unwrap();

        let done = mgr.do_policy_task("gw1|10", OP_DEL, &vec![]).await.unwrap();
        assert!(!done);
    }

    #[tokio::test]
    async fn test_do_snat_task_unknown_op() {
        let mut mgr = mgr();
        let err = mgr.do_snat_task("gw1", "FLUSH", &vec![]).await.unwrap_err();
        assert!(err.to_string().contains("Unknown operation"));
    }

    #[tokio::test]
    async fn test_do_snat_task_invalid_mode() {
        let mut mgr = mgr();
        let err = mgr
            .do_snat_task("gw1", OP_SET, &field_values! { "snat_mode" => "secondary" })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("valid values"));
    }

    #[test]
    fn test_resource_mgr_trait() {
        let mgr = mgr();
        assert_eq!(mgr.name(), "snatmgr");
        assert_eq!(mgr.daemon_name(), "snatmgrd");

        let tables = mgr.config_table_names();
        assert_eq!(tables.len(), 2);
        assert!(tables.contains(&"GATEWAY_SNAT"));
        assert!(tables.contains(&"GATEWAY_SNAT_POLICY"));
    }

    #[tokio::test]
    async fn test_dump_pending_tasks() {
        let mut mgr = mgr();
        mgr.do_snat_task(
            "gw1",
            OP_SET,
            &field_values! { "snat_mode" => "customized_snat" },
        )
        .await
        .unwrap();

        let pending = mgr.dump_pending_tasks();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].contains("gw1"));
    }
}
