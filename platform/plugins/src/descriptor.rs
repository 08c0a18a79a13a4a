//! Plugin descriptor: what the platform knows about one installed plugin.

use paygrid_core::CapabilityKind;
use serde::{Deserialize, Serialize};

/// Describes one plugin installation.
///
/// Discovery and packaging live elsewhere; by the time a descriptor
/// reaches the host it is already paired with a runtime instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Stable key the plugin is registered and addressed under.
    pub name: String,
    /// Identifier of the plugin's main entry inside the embedded runtime.
    pub entry_point: String,
    pub version: String,
    /// Capabilities the plugin claims to implement.
    pub capabilities: Vec<CapabilityKind>,
}

impl PluginDescriptor {
    /// Validate the descriptor for required fields.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            anyhow::bail!("plugin descriptor missing 'name'");
        }
        if self.entry_point.is_empty() {
            anyhow::bail!("plugin `{}` missing 'entry_point'", self.name);
        }
        if self.version.is_empty() {
            anyhow::bail!("plugin `{}` missing 'version'", self.name);
        }
        if self.capabilities.is_empty() {
            anyhow::bail!("plugin `{}` declares no capabilities", self.name);
        }
        let mut seen = self.capabilities.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != self.capabilities.len() {
            anyhow::bail!("plugin `{}` declares a capability twice", self.name);
        }
        Ok(())
    }

    pub fn declares(&self, kind: CapabilityKind) -> bool {
        self.capabilities.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> PluginDescriptor {
        PluginDescriptor {
            name: "acme-gateway".into(),
            entry_point: "acme.Gateway".into(),
            version: "1.4.0".into(),
            capabilities: vec![CapabilityKind::Payment],
        }
    }

    #[test]
    fn valid_descriptor_passes() {
        assert!(descriptor().validate().is_ok());
    }

    #[test]
    fn missing_fields_fail() {
        let mut d = descriptor();
        d.name.clear();
        assert!(d.validate().is_err());

        let mut d = descriptor();
        d.entry_point.clear();
        assert!(d.validate().is_err());

        let mut d = descriptor();
        d.capabilities.clear();
        assert!(d.validate().is_err());
    }

    #[test]
    fn duplicate_capability_fails() {
        let mut d = descriptor();
        d.capabilities = vec![CapabilityKind::Payment, CapabilityKind::Payment];
        assert!(d.validate().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let d = descriptor();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(serde_json::from_str::<PluginDescriptor>(&json).unwrap(), d);
    }
}
