use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Capability kinds a plugin may declare in its descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Payment,
    Currency,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Payment => write!(f, "payment"),
            CapabilityKind::Currency => write!(f, "currency"),
        }
    }
}

impl FromStr for CapabilityKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(CapabilityKind::Payment),
            "currency" => Ok(CapabilityKind::Currency),
            other => Err(ConfigurationError(format!(
                "unknown capability kind: {other}"
            ))),
        }
    }
}

/// Lifecycle state of a bridged plugin instance.
///
/// Transitions are one-directional: `Registered -> Started -> Stopped`.
/// A stopped plugin is never restarted; a new instance is registered instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    Registered,
    Started,
    Stopped,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginState::Registered => write!(f, "registered"),
            PluginState::Started => write!(f, "started"),
            PluginState::Stopped => write!(f, "stopped"),
        }
    }
}

/// ISO 4217 currency codes supported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    AUD,
    CAD,
    CHF,
    BRL,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::CHF => "CHF",
            Currency::BRL => "BRL",
        };
        write!(f, "{code}")
    }
}

impl FromStr for Currency {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "AUD" => Ok(Currency::AUD),
            "CAD" => Ok(Currency::CAD),
            "CHF" => Ok(Currency::CHF),
            "BRL" => Ok(Currency::BRL),
            other => Err(ConfigurationError(format!("unknown currency code: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_kind_round_trips_through_str() {
        for kind in [CapabilityKind::Payment, CapabilityKind::Currency] {
            assert_eq!(kind.to_string().parse::<CapabilityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_capability_kind_is_rejected() {
        assert!("billing".parse::<CapabilityKind>().is_err());
    }

    #[test]
    fn currency_round_trips_through_str() {
        for c in [Currency::USD, Currency::JPY, Currency::BRL] {
            assert_eq!(c.to_string().parse::<Currency>().unwrap(), c);
        }
    }

    #[test]
    fn currency_serializes_as_bare_code() {
        assert_eq!(serde_json::to_string(&Currency::EUR).unwrap(), "\"EUR\"");
    }
}
