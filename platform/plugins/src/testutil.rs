//! Shared test doubles for the plugins crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use paygrid_core::CapabilityKind;
use serde_json::Value;
use uuid::Uuid;

use crate::descriptor::PluginDescriptor;
use crate::runtime::{PluginRuntime, RuntimeFault};

pub(crate) fn descriptor(name: &str, capabilities: &[CapabilityKind]) -> PluginDescriptor {
    PluginDescriptor {
        name: name.to_string(),
        entry_point: format!("{name}.Main"),
        version: "1.4.0".into(),
        capabilities: capabilities.to_vec(),
    }
}

/// Scriptable in-memory runtime. Responses are keyed by method name;
/// unscripted methods fail with an internal fault.
pub(crate) struct StubRuntime {
    pub id: Uuid,
    display_name: Option<String>,
    start_fault: Option<RuntimeFault>,
    stop_fault: Option<RuntimeFault>,
    responses: HashMap<String, Result<Value, RuntimeFault>>,
    pub calls: Mutex<Vec<(CapabilityKind, String, Value)>>,
}

impl StubRuntime {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: None,
            start_fault: None,
            stop_fault: None,
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, method: &str, result: Result<Value, RuntimeFault>) -> Self {
        self.responses.insert(method.to_string(), result);
        self
    }

    pub fn fail_start(mut self, fault: RuntimeFault) -> Self {
        self.start_fault = Some(fault);
        self
    }

    pub fn fail_stop(mut self, fault: RuntimeFault) -> Self {
        self.stop_fault = Some(fault);
        self
    }

    pub fn display(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<(CapabilityKind, String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PluginRuntime for StubRuntime {
    fn instance_id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> Option<String> {
        self.display_name.clone()
    }

    async fn start(&self) -> Result<(), RuntimeFault> {
        match &self.start_fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    async fn stop(&self) -> Result<(), RuntimeFault> {
        match &self.stop_fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    async fn invoke(
        &self,
        capability: CapabilityKind,
        method: &str,
        args: Value,
    ) -> Result<Value, RuntimeFault> {
        self.calls
            .lock()
            .unwrap()
            .push((capability, method.to_string(), args));
        match self.responses.get(method) {
            Some(result) => result.clone(),
            None => Err(RuntimeFault::internal(format!("no stub for {method}"))),
        }
    }
}
