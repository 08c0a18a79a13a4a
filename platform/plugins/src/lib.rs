//! The bridge between the platform and its plugins.
//!
//! A plugin lives inside an embedded execution runtime; the host talks to
//! it through a [`PluginBridge`] that tracks lifecycle state and normalizes
//! failures. Capability adapters expose each bridge under the typed
//! contracts from `paygrid-core`, the [`PluginRegistry`] hands adapters out
//! by plugin name, and the [`PluginHost`] drives the whole set through the
//! platform lifecycle.

pub mod bridge;
pub mod currency;
pub mod descriptor;
pub mod host;
pub mod payment;
pub mod registry;
pub mod runtime;

#[cfg(test)]
pub(crate) mod testutil;

pub use bridge::{ControlError, PluginBridge};
pub use currency::CurrencyBridge;
pub use descriptor::PluginDescriptor;
pub use host::PluginHost;
pub use payment::PaymentBridge;
pub use registry::PluginRegistry;
pub use runtime::{PluginRuntime, RuntimeFault};
