//! Currency capability adapter.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use paygrid_core::{
    CapabilityKind, ConfigurationError, Currency, CurrencyApiError, CurrencyCapability,
    PluginError, Rate,
};
use serde_json::json;

use crate::bridge::PluginBridge;

pub struct CurrencyBridge {
    bridge: Arc<PluginBridge>,
}

impl CurrencyBridge {
    /// Wrap `bridge` as a currency capability. The descriptor must declare
    /// [`CapabilityKind::Currency`].
    pub fn new(bridge: Arc<PluginBridge>) -> Result<Self, ConfigurationError> {
        if !bridge.descriptor().declares(CapabilityKind::Currency) {
            return Err(ConfigurationError(format!(
                "plugin `{}` does not declare the currency capability",
                bridge.name()
            )));
        }
        Ok(Self { bridge })
    }

    pub fn plugin_name(&self) -> &str {
        self.bridge.name()
    }
}

#[async_trait]
impl CurrencyCapability for CurrencyBridge {
    async fn base_currencies(&self) -> Result<Vec<Currency>, PluginError<CurrencyApiError>> {
        self.bridge
            .invoke_typed(CapabilityKind::Currency, "base_currencies", json!({}))
            .await
    }

    async fn latest_conversion_time(
        &self,
        base: Currency,
    ) -> Result<Option<DateTime<Utc>>, PluginError<CurrencyApiError>> {
        self.bridge
            .invoke_typed(
                CapabilityKind::Currency,
                "latest_conversion_time",
                json!({ "base": base }),
            )
            .await
    }

    async fn current_rates(
        &self,
        base: Currency,
    ) -> Result<Vec<Rate>, PluginError<CurrencyApiError>> {
        self.bridge
            .invoke_typed(
                CapabilityKind::Currency,
                "current_rates",
                json!({ "base": base }),
            )
            .await
    }

    async fn rates_at(
        &self,
        base: Currency,
        at: DateTime<Utc>,
    ) -> Result<Vec<Rate>, PluginError<CurrencyApiError>> {
        self.bridge
            .invoke_typed(
                CapabilityKind::Currency,
                "rates_at",
                json!({ "base": base, "at": at }),
            )
            .await
    }
}
