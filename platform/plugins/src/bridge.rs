//! The invocation bridge over a single plugin instance.
//!
//! Tracks the plugin's lifecycle state, forwards capability calls to the
//! embedded runtime, and normalizes every failure into the platform error
//! taxonomy. One bridge per plugin instance; capability adapters share it
//! through an `Arc`.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use paygrid_core::{
    CapabilityKind, DomainFault, InvocationError, PluginError, PluginState, PluginStateError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::descriptor::PluginDescriptor;
use crate::runtime::{PluginRuntime, RuntimeFault};

/// Error type for start/stop, which have no domain faults.
pub type ControlError = PluginError<Infallible>;

pub struct PluginBridge {
    descriptor: PluginDescriptor,
    runtime: Arc<dyn PluginRuntime>,
    state: RwLock<PluginState>,
}

impl PluginBridge {
    pub fn new(descriptor: PluginDescriptor, runtime: Arc<dyn PluginRuntime>) -> Self {
        Self {
            descriptor,
            runtime,
            state: RwLock::new(PluginState::Registered),
        }
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn state(&self) -> PluginState {
        *self.state.read().expect("bridge state lock poisoned")
    }

    /// `Registered -> Started`. The runtime starts first; a start fault
    /// leaves the bridge `Registered` so a later attempt can retry.
    ///
    /// Start and stop are driven by the host during lifecycle dispatch and
    /// are not called concurrently.
    pub async fn start(&self) -> Result<(), ControlError> {
        let state = self.state();
        if state != PluginState::Registered {
            return Err(self.state_error(state).into());
        }
        self.runtime
            .start()
            .await
            .map_err(|fault| self.control_fault("start", fault))?;
        *self.state.write().expect("bridge state lock poisoned") = PluginState::Started;
        info!(plugin = %self.descriptor.name, "plugin started");
        Ok(())
    }

    /// `Started -> Stopped`. The state flips before the runtime is asked
    /// to stop, so no new dispatch can race past a stopping plugin.
    pub async fn stop(&self) -> Result<(), ControlError> {
        {
            let mut state = self.state.write().expect("bridge state lock poisoned");
            if *state != PluginState::Started {
                return Err(self.state_error(*state).into());
            }
            *state = PluginState::Stopped;
        }
        let result = self
            .runtime
            .stop()
            .await
            .map_err(|fault| self.control_fault("stop", fault));
        info!(plugin = %self.descriptor.name, "plugin stopped");
        result
    }

    /// Forward one capability call, classifying the outcome.
    ///
    /// Requires the bridge to be `Started`. Domain faults decode through
    /// `E::from_runtime` and pass to the caller unchanged in meaning;
    /// anything else becomes an [`InvocationError`]. No retries, no
    /// per-call serialization.
    pub async fn invoke<E: DomainFault>(
        &self,
        capability: CapabilityKind,
        method: &str,
        args: Value,
    ) -> Result<Value, PluginError<E>> {
        let state = self.state();
        if state != PluginState::Started {
            return Err(self.state_error(state).into());
        }
        debug!(plugin = %self.descriptor.name, %capability, method, "invoking plugin");
        match self.runtime.invoke(capability, method, args).await {
            Ok(value) => Ok(value),
            Err(RuntimeFault::Domain { code, message }) => {
                Err(PluginError::Domain(E::from_runtime(&code, &message)))
            }
            Err(RuntimeFault::Internal { message, detail }) => {
                Err(PluginError::Invocation(InvocationError {
                    plugin: self.descriptor.name.clone(),
                    method: method.to_string(),
                    message,
                    detail,
                }))
            }
        }
    }

    /// [`invoke`](Self::invoke), deserializing the JSON result. A result
    /// the host cannot decode counts as an invocation failure.
    pub async fn invoke_typed<T, E>(
        &self,
        capability: CapabilityKind,
        method: &str,
        args: Value,
    ) -> Result<T, PluginError<E>>
    where
        T: DeserializeOwned,
        E: DomainFault,
    {
        let value = self.invoke::<E>(capability, method, args).await?;
        serde_json::from_value(value).map_err(|e| {
            PluginError::Invocation(InvocationError {
                plugin: self.descriptor.name.clone(),
                method: method.to_string(),
                message: format!("malformed result: {e}"),
                detail: None,
            })
        })
    }

    fn capability_set(&self) -> BTreeSet<CapabilityKind> {
        self.descriptor.capabilities.iter().copied().collect()
    }

    fn state_error(&self, state: PluginState) -> PluginStateError {
        PluginStateError {
            plugin: self.descriptor.name.clone(),
            state,
        }
    }

    fn control_fault(&self, method: &str, fault: RuntimeFault) -> ControlError {
        let (message, detail) = match fault {
            RuntimeFault::Domain { code, message } => (format!("{code}: {message}"), None),
            RuntimeFault::Internal { message, detail } => (message, detail),
        };
        PluginError::Invocation(InvocationError {
            plugin: self.descriptor.name.clone(),
            method: method.to_string(),
            message,
            detail,
        })
    }
}

/// Two bridges are the same plugin iff they wrap the same runtime instance
/// and claim the same capability set.
impl PartialEq for PluginBridge {
    fn eq(&self, other: &Self) -> bool {
        self.runtime.instance_id() == other.runtime.instance_id()
            && self.capability_set() == other.capability_set()
    }
}

impl Eq for PluginBridge {}

impl Hash for PluginBridge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.runtime.instance_id().hash(state);
        for capability in self.capability_set() {
            capability.hash(state);
        }
    }
}

impl fmt::Display for PluginBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.runtime.display_name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}#{}", self.descriptor.name, self.runtime.instance_id()),
        }
    }
}

impl fmt::Debug for PluginBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginBridge")
            .field("descriptor", &self.descriptor)
            .field("instance_id", &self.runtime.instance_id())
            .field("state", &self.state())
            .finish()
    }
}
