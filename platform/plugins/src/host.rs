//! The plugin host, driven by the platform lifecycle.
//!
//! Owns every installed plugin and walks it through the lifecycle levels:
//! bridges and adapters are built at `init_plugin`, started and registered
//! at `start_plugin`, and unregistered then stopped at `stop_plugin`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use paygrid_core::{CapabilityKind, CurrencyCapability, PaymentCapability};
use paygrid_lifecycle::{
    LifecycleError, LifecycleHandler, LifecycleLevel, LifecycleOrchestrator,
};
use tracing::{info, warn};

use crate::bridge::PluginBridge;
use crate::currency::CurrencyBridge;
use crate::descriptor::PluginDescriptor;
use crate::payment::PaymentBridge;
use crate::registry::PluginRegistry;
use crate::runtime::PluginRuntime;

const COMPONENT: &str = "plugin-host";

struct HostedPlugin {
    bridge: Arc<PluginBridge>,
    payment: Option<Arc<PaymentBridge>>,
    currency: Option<Arc<CurrencyBridge>>,
}

pub struct PluginHost {
    installed: Vec<(PluginDescriptor, Arc<dyn PluginRuntime>)>,
    registry: Arc<PluginRegistry>,
    hosted: Mutex<Vec<Arc<HostedPlugin>>>,
}

impl PluginHost {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            installed: Vec::new(),
            registry,
            hosted: Mutex::new(Vec::new()),
        }
    }

    /// Install a plugin. Installation happens during wiring, before the
    /// lifecycle runs; descriptors are validated at `init_plugin`.
    pub fn add_plugin(&mut self, descriptor: PluginDescriptor, runtime: Arc<dyn PluginRuntime>) {
        self.installed.push((descriptor, runtime));
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Wire this host into the orchestrator at the three plugin levels.
    pub fn register_with(
        self: &Arc<Self>,
        orchestrator: &mut LifecycleOrchestrator,
    ) -> Result<(), LifecycleError> {
        for level in [
            LifecycleLevel::InitPlugin,
            LifecycleLevel::StartPlugin,
            LifecycleLevel::StopPlugin,
        ] {
            orchestrator.register_handler(
                level,
                COMPONENT,
                Arc::clone(self) as Arc<dyn LifecycleHandler>,
            )?;
        }
        Ok(())
    }

    fn init_plugins(&self) -> anyhow::Result<()> {
        let mut names = HashSet::new();
        let mut hosted = Vec::with_capacity(self.installed.len());
        for (descriptor, runtime) in &self.installed {
            descriptor.validate()?;
            if !names.insert(descriptor.name.clone()) {
                anyhow::bail!("plugin `{}` is installed twice", descriptor.name);
            }
            let bridge = Arc::new(PluginBridge::new(descriptor.clone(), Arc::clone(runtime)));
            let payment = descriptor
                .declares(CapabilityKind::Payment)
                .then(|| PaymentBridge::new(Arc::clone(&bridge)).map(Arc::new))
                .transpose()?;
            let currency = descriptor
                .declares(CapabilityKind::Currency)
                .then(|| CurrencyBridge::new(Arc::clone(&bridge)).map(Arc::new))
                .transpose()?;
            info!(plugin = %descriptor.name, version = %descriptor.version, "plugin initialized");
            hosted.push(Arc::new(HostedPlugin {
                bridge,
                payment,
                currency,
            }));
        }
        *self.hosted.lock().expect("host plugin lock poisoned") = hosted;
        Ok(())
    }

    fn hosted_plugins(&self) -> Vec<Arc<HostedPlugin>> {
        self.hosted.lock().expect("host plugin lock poisoned").clone()
    }

    async fn start_plugins(&self) -> anyhow::Result<()> {
        for plugin in self.hosted_plugins() {
            let name = plugin.bridge.name().to_string();
            plugin
                .bridge
                .start()
                .await
                .with_context(|| format!("starting plugin `{name}`"))?;
            if let Some(payment) = &plugin.payment {
                self.registry
                    .register_payment(&name, Arc::clone(payment) as Arc<dyn PaymentCapability>)
                    .await?;
            }
            if let Some(currency) = &plugin.currency {
                self.registry
                    .register_currency(&name, Arc::clone(currency) as Arc<dyn CurrencyCapability>)
                    .await?;
            }
        }
        Ok(())
    }

    /// Unregister and stop every started plugin, in reverse start order.
    /// Stop faults are logged, never propagated.
    async fn stop_plugins(&self) {
        for plugin in self.hosted_plugins().into_iter().rev() {
            let name = plugin.bridge.name();
            self.registry.unregister(name).await;
            if let Err(err) = plugin.bridge.stop().await {
                warn!(plugin = %name, error = %err, "plugin failed to stop cleanly");
            }
        }
    }
}

#[async_trait]
impl LifecycleHandler for PluginHost {
    fn name(&self) -> &str {
        COMPONENT
    }

    async fn on_level(&self, level: LifecycleLevel) -> anyhow::Result<()> {
        match level {
            LifecycleLevel::InitPlugin => self.init_plugins(),
            LifecycleLevel::StartPlugin => self.start_plugins().await,
            LifecycleLevel::StopPlugin => {
                self.stop_plugins().await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
