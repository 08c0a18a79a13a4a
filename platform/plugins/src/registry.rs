//! Capability lookup by plugin name.
//!
//! The registry only ever holds adapters for started plugins: the host
//! registers at `StartPlugin` and unregisters at `StopPlugin`, so a
//! successful lookup hands back an adapter that is safe to invoke.

use std::collections::HashMap;
use std::sync::Arc;

use paygrid_core::{ConfigurationError, CurrencyCapability, PaymentCapability};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct PluginRegistry {
    payments: RwLock<HashMap<String, Arc<dyn PaymentCapability>>>,
    currencies: RwLock<HashMap<String, Arc<dyn CurrencyCapability>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a payment adapter under `name`. A name already registered
    /// for the capability is a wiring bug and fails.
    pub async fn register_payment(
        &self,
        name: impl Into<String>,
        adapter: Arc<dyn PaymentCapability>,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        let mut payments = self.payments.write().await;
        if payments.contains_key(&name) {
            return Err(ConfigurationError(format!(
                "payment plugin `{name}` is already registered"
            )));
        }
        debug!(plugin = %name, "payment adapter registered");
        payments.insert(name, adapter);
        Ok(())
    }

    pub async fn register_currency(
        &self,
        name: impl Into<String>,
        adapter: Arc<dyn CurrencyCapability>,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        let mut currencies = self.currencies.write().await;
        if currencies.contains_key(&name) {
            return Err(ConfigurationError(format!(
                "currency plugin `{name}` is already registered"
            )));
        }
        debug!(plugin = %name, "currency adapter registered");
        currencies.insert(name, adapter);
        Ok(())
    }

    pub async fn payment(&self, name: &str) -> Option<Arc<dyn PaymentCapability>> {
        self.payments.read().await.get(name).cloned()
    }

    pub async fn currency(&self, name: &str) -> Option<Arc<dyn CurrencyCapability>> {
        self.currencies.read().await.get(name).cloned()
    }

    /// Names of registered payment plugins, sorted.
    pub async fn payments(&self) -> Vec<String> {
        let mut names: Vec<String> = self.payments.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of registered currency plugins, sorted.
    pub async fn currencies(&self) -> Vec<String> {
        let mut names: Vec<String> = self.currencies.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every adapter registered under `name`. Returns whether any
    /// capability was removed.
    pub async fn unregister(&self, name: &str) -> bool {
        let removed_payment = self.payments.write().await.remove(name).is_some();
        let removed_currency = self.currencies.write().await.remove(name).is_some();
        if removed_payment || removed_currency {
            debug!(plugin = %name, "plugin unregistered");
        }
        removed_payment || removed_currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::PluginBridge;
    use crate::currency::CurrencyBridge;
    use crate::payment::PaymentBridge;
    use crate::testutil::{descriptor, StubRuntime};
    use paygrid_core::CapabilityKind;

    fn payment_adapter(name: &str) -> Arc<dyn PaymentCapability> {
        let bridge = Arc::new(PluginBridge::new(
            descriptor(name, &[CapabilityKind::Payment]),
            Arc::new(StubRuntime::new()),
        ));
        Arc::new(PaymentBridge::new(bridge).unwrap())
    }

    fn currency_adapter(name: &str) -> Arc<dyn CurrencyCapability> {
        let bridge = Arc::new(PluginBridge::new(
            descriptor(name, &[CapabilityKind::Currency]),
            Arc::new(StubRuntime::new()),
        ));
        Arc::new(CurrencyBridge::new(bridge).unwrap())
    }

    #[tokio::test]
    async fn register_then_lookup_then_unregister() {
        let registry = PluginRegistry::new();
        registry
            .register_payment("acme-gateway", payment_adapter("acme-gateway"))
            .await
            .unwrap();

        assert!(registry.payment("acme-gateway").await.is_some());
        assert!(registry.payment("unknown").await.is_none());
        assert!(registry.currency("acme-gateway").await.is_none());

        assert!(registry.unregister("acme-gateway").await);
        assert!(registry.payment("acme-gateway").await.is_none());
        assert!(!registry.unregister("acme-gateway").await);
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let registry = PluginRegistry::new();
        registry
            .register_payment("acme-gateway", payment_adapter("acme-gateway"))
            .await
            .unwrap();
        let err = registry
            .register_payment("acme-gateway", payment_adapter("acme-gateway"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn name_is_reusable_after_unregistration() {
        let registry = PluginRegistry::new();
        registry
            .register_currency("fx-feed", currency_adapter("fx-feed"))
            .await
            .unwrap();
        registry.unregister("fx-feed").await;
        registry
            .register_currency("fx-feed", currency_adapter("fx-feed"))
            .await
            .unwrap();
        assert_eq!(registry.currencies().await, vec!["fx-feed"]);
    }

    #[tokio::test]
    async fn listings_are_sorted_and_per_capability() {
        let registry = PluginRegistry::new();
        registry
            .register_payment("zeta-pay", payment_adapter("zeta-pay"))
            .await
            .unwrap();
        registry
            .register_payment("acme-gateway", payment_adapter("acme-gateway"))
            .await
            .unwrap();
        registry
            .register_currency("fx-feed", currency_adapter("fx-feed"))
            .await
            .unwrap();

        assert_eq!(registry.payments().await, vec!["acme-gateway", "zeta-pay"]);
        assert_eq!(registry.currencies().await, vec!["fx-feed"]);
    }
}
