//! Layered configuration for the PayGrid platform.
//!
//! Provides:
//! - Source-labelled property collection with wait-free snapshot reads
//! - `PAYGRID_*` environment overlay
//! - Flat YAML property files
//! - Layered resolution with per-key provenance
//! - Eager `ENC(...)` secret decryption
//! - Redaction for safe logging/display

pub mod collector;
pub mod env;
pub mod error;
pub mod file;
pub mod redact;
pub mod resolver;
pub mod secrets;

pub use collector::{PropertySourceCollector, PropertyWithSource};
pub use env::{environment_properties, environment_properties_from, property_key_for, ENV_PREFIX};
pub use error::ConfigError;
pub use file::{default_properties_path, load_properties_file};
pub use redact::{is_sensitive_key, redact_value};
pub use resolver::{
    ConfigResolver, ResolvedConfig, SECRETS_ALGORITHM_KEY, SECRETS_ENABLED_KEY,
    SECRETS_PASSWORD_KEY,
};
pub use secrets::{SecretsAlgorithm, SecretsCipher};
