//! Scripted in-memory controller for manager tests.
//!
//! [`MockController`] implements [`GatewayApi`] over a hash map of
//! gateway records. It records every call for sequence assertions and
//! can be scripted to fail specific operations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use gwmgr_api::{
    wire_modes, ApiError, ApiResult, GatewayApi, GatewayDetail, GatewayInfo, PolicyRule,
    SnatRequest, NAT_DISABLED, NAT_ENABLED,
};

/// Remote-side view of one gateway held by the mock.
#[derive(Debug, Clone, Default)]
pub struct GatewayRecord {
    /// NAT enablement flag ("yes"/"no").
    pub enable_nat: String,
    /// SNAT mode in the controller's reporting vocabulary.
    pub snat_mode: String,
    /// Installed policy rules.
    pub snat_policy: Vec<PolicyRule>,
}

#[derive(Default)]
struct Inner {
    gateways: HashMap<String, GatewayRecord>,
    calls: Vec<String>,
    failures: Vec<(String, ApiError)>,
}

/// In-memory [`GatewayApi`] implementation for tests.
///
/// Calls are recorded as `"<operation> <gateway>"` strings in issue
/// order. The mock mirrors the controller's vocabulary asymmetry:
/// an enable request with mode `custom` is reported back as
/// `customized`.
#[derive(Default)]
pub struct MockController {
    inner: Mutex<Inner>,
}

impl MockController {
    /// Creates an empty mock controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a gateway record directly, bypassing the API surface.
    pub fn seed_gateway(
        &self,
        gw_name: impl Into<String>,
        enable_nat: &str,
        snat_mode: &str,
        snat_policy: Vec<PolicyRule>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.gateways.insert(
            gw_name.into(),
            GatewayRecord {
                enable_nat: enable_nat.to_string(),
                snat_mode: snat_mode.to_string(),
                snat_policy,
            },
        );
    }

    /// Scripts the next call to `operation` to fail with `error`.
    pub fn fail_next(&self, operation: &str, error: ApiError) {
        let mut inner = self.inner.lock().unwrap();
        inner.failures.push((operation.to_string(), error));
    }

    /// Returns the recorded calls in issue order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Clears the recorded calls.
    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    /// Returns the current record for a gateway, if any.
    pub fn gateway(&self, gw_name: &str) -> Option<GatewayRecord> {
        self.inner.lock().unwrap().gateways.get(gw_name).cloned()
    }

    fn begin(&self, operation: &str, gw_name: &str) -> ApiResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("{} {}", operation, gw_name));
        if let Some(pos) = inner.failures.iter().position(|(op, _)| op == operation) {
            let (_, error) = inner.failures.remove(pos);
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl GatewayApi for MockController {
    async fn enable_snat(&self, request: &SnatRequest) -> ApiResult<()> {
        self.begin("enable_snat", &request.gateway_name)?;

        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .gateways
            .entry(request.gateway_name.clone())
            .or_default();
        record.enable_nat = NAT_ENABLED.to_string();
        // The controller reports policy SNAT with its own spelling
        record.snat_mode = if request.snat_mode == wire_modes::CUSTOM {
            wire_modes::CUSTOMIZED.to_string()
        } else {
            request.snat_mode.clone()
        };
        record.snat_policy = request.snat_policy.clone();
        Ok(())
    }

    async fn disable_snat(&self, gw_name: &str) -> ApiResult<()> {
        self.begin("disable_snat", gw_name)?;

        let mut inner = self.inner.lock().unwrap();
        let record = inner.gateways.get_mut(gw_name).ok_or(ApiError::NotFound)?;
        record.enable_nat = NAT_DISABLED.to_string();
        record.snat_mode.clear();
        record.snat_policy.clear();
        Ok(())
    }

    async fn get_gateway(&self, gw_name: &str) -> ApiResult<GatewayInfo> {
        self.begin("get_gateway", gw_name)?;

        let inner = self.inner.lock().unwrap();
        let record = inner.gateways.get(gw_name).ok_or(ApiError::NotFound)?;
        Ok(GatewayInfo {
            gw_name: gw_name.to_string(),
            enable_nat: record.enable_nat.clone(),
            snat_mode: record.snat_mode.clone(),
        })
    }

    async fn get_gateway_detail(&self, gw_name: &str) -> ApiResult<GatewayDetail> {
        self.begin("get_gateway_detail", gw_name)?;

        let inner = self.inner.lock().unwrap();
        let record = inner.gateways.get(gw_name).ok_or(ApiError::NotFound)?;
        Ok(GatewayDetail {
            gw_name: gw_name.to_string(),
            snat_policy: record.snat_policy.clone(),
        })
    }
}
