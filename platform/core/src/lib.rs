pub mod currency;
pub mod error;
pub mod payment;
pub mod types;

pub use currency::{CurrencyApiError, CurrencyCapability, Rate};
pub use error::{
    ConfigurationError, DecryptionError, DomainFault, InvocationError, PluginError,
    PluginStateError,
};
pub use payment::{
    PaymentApiError, PaymentCapability, PaymentStatus, PaymentTransaction, TransactionType,
};
pub use types::{CapabilityKind, Currency, PluginState};
