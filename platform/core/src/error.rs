use thiserror::Error;

use crate::types::PluginState;

/// Malformed or missing required configuration.
///
/// Fatal where it occurs: configuration problems are never retried or
/// papered over at runtime.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("configuration error: {0}")]
pub struct ConfigurationError(pub String);

/// An encrypted property value could not be recovered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to decrypt value for `{key}`: {reason}")]
pub struct DecryptionError {
    /// Property key whose value failed to decrypt. The value itself is
    /// never included.
    pub key: String,
    pub reason: String,
}

/// A call hit a plugin that is not in the state the call requires.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("plugin `{plugin}` is {state}")]
pub struct PluginStateError {
    pub plugin: String,
    pub state: PluginState,
}

/// An embedded-runtime failure outside any capability contract, normalized
/// at the boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("plugin `{plugin}` failed in `{method}`: {message}")]
pub struct InvocationError {
    pub plugin: String,
    pub method: String,
    pub message: String,
    pub detail: Option<String>,
}

/// Error returned by every capability method.
///
/// `Domain` is the only branch callers are expected to match on
/// programmatically; `State` and `Invocation` are host-side failures.
#[derive(Debug, Error)]
pub enum PluginError<E: std::error::Error> {
    #[error(transparent)]
    State(#[from] PluginStateError),

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// Failure declared by the capability contract, passed through from
    /// the plugin unchanged in meaning.
    #[error("{0}")]
    Domain(E),
}

impl<E: std::error::Error> PluginError<E> {
    /// Returns the domain fault if this is a declared capability failure.
    pub fn as_domain(&self) -> Option<&E> {
        match self {
            PluginError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Decodes a capability's declared fault from the `(code, message)` pair
/// carried across the runtime boundary.
///
/// Unknown codes must map to the contract's catch-all variant rather than
/// fail, so a plugin built against a newer fault list degrades gracefully.
pub trait DomainFault: std::error::Error + Sized {
    fn from_runtime(code: &str, message: &str) -> Self;
}
