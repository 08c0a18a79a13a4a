//! The seam between the host and the embedded plugin runtime.
//!
//! Everything the host asks of a plugin goes through [`PluginRuntime`]:
//! arguments and results cross as JSON, and every failure comes back as a
//! [`RuntimeFault`] classified at the boundary. The host never matches on
//! runtime internals.

use async_trait::async_trait;
use paygrid_core::CapabilityKind;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// A plugin instance living inside the embedded execution runtime.
#[async_trait]
pub trait PluginRuntime: Send + Sync {
    /// Identity of the wrapped instance, stable for its whole life.
    fn instance_id(&self) -> Uuid;

    /// Optional display override for diagnostics output.
    fn display_name(&self) -> Option<String> {
        None
    }

    async fn start(&self) -> Result<(), RuntimeFault>;

    async fn stop(&self) -> Result<(), RuntimeFault>;

    /// Invoke `method` of `capability` with JSON-marshalled arguments.
    async fn invoke(
        &self,
        capability: CapabilityKind,
        method: &str,
        args: Value,
    ) -> Result<Value, RuntimeFault>;
}

/// A failure crossing the runtime boundary.
///
/// The runtime adapter tags each failure as it crosses; nothing downstream
/// re-inspects payloads to guess what happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeFault {
    /// Declared by the capability contract the plugin was invoked under.
    /// Decoded into that contract's domain error and handed to the caller.
    #[error("{code}: {message}")]
    Domain { code: String, message: String },

    /// Anything else that escaped the runtime.
    #[error("{message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl RuntimeFault {
    pub fn domain(code: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeFault::Domain {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RuntimeFault::Internal {
            message: message.into(),
            detail: None,
        }
    }
}
