//! Layered configuration resolution.
//!
//! Five layers contribute properties, later layers overriding earlier ones
//! key for key: embedded defaults, the properties file, system properties,
//! explicit overrides, and the environment. Every contribution is recorded
//! in a [`PropertySourceCollector`] before merging, so provenance survives
//! the merge.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use paygrid_core::ConfigurationError;
use tracing::debug;

use crate::collector::PropertySourceCollector;
use crate::env;
use crate::error::ConfigError;
use crate::file;
use crate::redact;
use crate::secrets::{SecretsAlgorithm, SecretsCipher};

pub const SECRETS_ENABLED_KEY: &str = "paygrid.secrets.enabled";
pub const SECRETS_ALGORITHM_KEY: &str = "paygrid.secrets.algorithm";
pub const SECRETS_PASSWORD_KEY: &str = "paygrid.secrets.password";

fn embedded_defaults() -> Vec<(String, String)> {
    vec![(SECRETS_ENABLED_KEY.to_string(), "false".to_string())]
}

/// Builder for a [`ResolvedConfig`].
pub struct ConfigResolver {
    file_path: Option<PathBuf>,
    system_properties: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
    environment: Option<Vec<(String, String)>>,
    collector: Arc<PropertySourceCollector>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::with_collector(Arc::new(PropertySourceCollector::new()))
    }

    /// Use a shared collector so several resolutions (or other components)
    /// record into one provenance log.
    pub fn with_collector(collector: Arc<PropertySourceCollector>) -> Self {
        Self {
            file_path: None,
            system_properties: Vec::new(),
            overrides: Vec::new(),
            environment: None,
            collector,
        }
    }

    /// Explicit properties file. Resolution fails if the file is missing;
    /// without this call the default location is used only when present.
    pub fn properties_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Properties handed down by the embedding process.
    pub fn system_properties<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.system_properties.extend(pairs);
        self
    }

    /// Caller-supplied overrides, above system properties and below the
    /// environment.
    pub fn overrides<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.overrides.extend(pairs);
        self
    }

    /// Replace the process environment with the given variables (testing).
    pub fn environment<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.environment = Some(vars.into_iter().collect());
        self
    }

    pub fn collector(&self) -> &Arc<PropertySourceCollector> {
        &self.collector
    }

    /// Merge all layers, decrypt encrypted values, and freeze the result.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let mut layers: Vec<(String, Vec<(String, String)>)> = Vec::new();
        layers.push(("defaults".to_string(), embedded_defaults()));

        match &self.file_path {
            Some(path) => {
                let label = format!("file:{}", path.display());
                layers.push((label, file::load_properties_file(path)?));
            }
            None => {
                if let Some(path) = file::default_properties_path() {
                    if path.exists() {
                        let label = format!("file:{}", path.display());
                        layers.push((label, file::load_properties_file(&path)?));
                    }
                }
            }
        }

        layers.push(("system".to_string(), self.system_properties));
        layers.push(("overrides".to_string(), self.overrides));
        let env_pairs = match self.environment {
            Some(vars) => env::environment_properties_from(vars),
            None => env::environment_properties(),
        };
        layers.push(("environment".to_string(), env_pairs));

        let mut entries: HashMap<String, ResolvedEntry> = HashMap::new();
        for (label, pairs) in layers {
            self.collector.add_properties(&label, pairs.clone());
            for (key, value) in pairs {
                entries.insert(
                    key,
                    ResolvedEntry {
                        value,
                        source: label.clone(),
                        decrypted: false,
                    },
                );
            }
        }

        let decrypted = decrypt_entries(&mut entries)?;
        debug!(
            keys = entries.len(),
            decrypted, "configuration resolution complete"
        );

        Ok(ResolvedConfig { entries })
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrypt every `ENC(...)` value in place. Returns the number of values
/// decrypted; zero when secrets are disabled.
fn decrypt_entries(entries: &mut HashMap<String, ResolvedEntry>) -> Result<usize, ConfigError> {
    let enabled = entries
        .get(SECRETS_ENABLED_KEY)
        .map(|e| e.value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !enabled {
        return Ok(0);
    }

    let algorithm = require(entries, SECRETS_ALGORITHM_KEY)?.parse::<SecretsAlgorithm>()?;
    let password = require(entries, SECRETS_PASSWORD_KEY)?;
    let cipher = SecretsCipher::new(algorithm, &password)?;

    let mut decrypted = 0;
    for (key, entry) in entries.iter_mut() {
        if SecretsCipher::is_encrypted(&entry.value) {
            entry.value = cipher.decrypt_value(key, &entry.value)?;
            entry.decrypted = true;
            decrypted += 1;
        }
    }
    Ok(decrypted)
}

fn require(
    entries: &HashMap<String, ResolvedEntry>,
    key: &str,
) -> Result<String, ConfigurationError> {
    match entries.get(key) {
        Some(entry) if !entry.value.is_empty() => Ok(entry.value.clone()),
        _ => Err(ConfigurationError(format!(
            "secrets are enabled but `{key}` is missing or empty"
        ))),
    }
}

#[derive(Debug, Clone)]
struct ResolvedEntry {
    value: String,
    source: String,
    decrypted: bool,
}

/// Immutable view of fully resolved configuration.
///
/// Reloading configuration means building a new instance; existing
/// references keep seeing the values they resolved with.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    entries: HashMap<String, ResolvedEntry>,
}

impl ResolvedConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// `true`/`false` in any case; anything else is `None`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)?.parse().ok()
    }

    /// Whether this key's value arrived wrapped in `ENC(...)` and was
    /// decrypted during resolution.
    pub fn was_decrypted(&self, key: &str) -> bool {
        self.entries.get(key).map(|e| e.decrypted).unwrap_or(false)
    }

    /// Label of the layer that won this key.
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.source.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e.value.as_str()))
    }

    /// Safe-to-log view: decrypted values and password-like keys are
    /// masked. Sorted by key for stable output.
    pub fn redacted_properties(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let value = if entry.decrypted || redact::is_sensitive_key(key) {
                    redact::redact_value(&entry.value)
                } else {
                    entry.value.clone()
                };
                (key.clone(), value)
            })
            .collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolver() -> ConfigResolver {
        // Empty environment keeps host variables out of the tests.
        ConfigResolver::new().environment(Vec::new())
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let config = resolver()
            .system_properties(pairs(&[("db.pool.size", "10"), ("db.url", "sys")]))
            .overrides(pairs(&[("db.pool.size", "20")]))
            .environment(pairs(&[("PAYGRID_DB_POOL_SIZE", "30")]))
            .resolve()
            .unwrap();

        assert_eq!(config.get("db.pool.size"), Some("30"));
        assert_eq!(config.get("db.url"), Some("sys"));
        assert_eq!(config.source_of("db.pool.size"), Some("environment"));
        assert_eq!(config.source_of("db.url"), Some("system"));
    }

    #[test]
    fn embedded_defaults_are_present_and_overridable() {
        let config = resolver().resolve().unwrap();
        assert_eq!(config.get_bool(SECRETS_ENABLED_KEY), Some(false));
        assert_eq!(config.source_of(SECRETS_ENABLED_KEY), Some("defaults"));

        let config = resolver()
            .overrides(pairs(&[(SECRETS_ENABLED_KEY, "false")]))
            .resolve()
            .unwrap();
        assert_eq!(config.source_of(SECRETS_ENABLED_KEY), Some("overrides"));
    }

    #[test]
    fn properties_file_layer_sits_between_defaults_and_system() {
        let path = std::env::temp_dir().join(format!("paygrid-resolver-{}.yaml", std::process::id()));
        fs::write(&path, "db.url: from-file\nlogging.level: debug\n").unwrap();

        let config = resolver()
            .properties_file(&path)
            .system_properties(pairs(&[("db.url", "from-system")]))
            .resolve()
            .unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.get("db.url"), Some("from-system"));
        assert_eq!(config.get("logging.level"), Some("debug"));
        assert_eq!(
            config.source_of("logging.level"),
            Some(format!("file:{}", path.display()).as_str())
        );
    }

    #[test]
    fn explicit_missing_file_fails_resolution() {
        let err = resolver()
            .properties_file(Path::new("/nonexistent/paygrid.yaml"))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn collector_keeps_shadowed_values() {
        let collector = Arc::new(PropertySourceCollector::new());
        ConfigResolver::with_collector(Arc::clone(&collector))
            .environment(Vec::new())
            .system_properties(pairs(&[("k", "sys")]))
            .overrides(pairs(&[("k", "over")]))
            .resolve()
            .unwrap();

        let recorded: Vec<_> = collector
            .all_properties()
            .iter()
            .filter(|p| p.key == "k")
            .map(|p| (p.source.clone(), p.value.clone()))
            .collect();
        assert_eq!(
            recorded,
            vec![
                ("system".to_string(), "sys".to_string()),
                ("overrides".to_string(), "over".to_string()),
            ]
        );
    }

    fn secrets_layer(algorithm: &str, password: &str) -> Vec<(String, String)> {
        pairs(&[
            (SECRETS_ENABLED_KEY, "true"),
            (SECRETS_ALGORITHM_KEY, algorithm),
            (SECRETS_PASSWORD_KEY, password),
        ])
    }

    #[test]
    fn encrypted_values_are_decrypted_eagerly() {
        let cipher = SecretsCipher::new(SecretsAlgorithm::XChaCha20Poly1305, "pw-123").unwrap();
        let sealed = cipher.encrypt_value("s3cr3t-dsn").unwrap();

        let mut layer = secrets_layer("xchacha20-poly1305", "pw-123");
        layer.push(("db.url".to_string(), sealed));
        let config = resolver().overrides(layer).resolve().unwrap();

        assert_eq!(config.get("db.url"), Some("s3cr3t-dsn"));
        assert!(config.was_decrypted("db.url"));
        assert!(!config.was_decrypted(SECRETS_ENABLED_KEY));
    }

    #[test]
    fn disabled_secrets_pass_through_verbatim() {
        let config = resolver()
            .overrides(pairs(&[("db.url", "ENC(AAAA)")]))
            .resolve()
            .unwrap();
        assert_eq!(config.get("db.url"), Some("ENC(AAAA)"));
        assert!(!config.was_decrypted("db.url"));
    }

    #[test]
    fn enabled_without_algorithm_is_a_configuration_error() {
        let err = resolver()
            .overrides(pairs(&[
                (SECRETS_ENABLED_KEY, "true"),
                (SECRETS_PASSWORD_KEY, "pw"),
            ]))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Configuration(_)));
    }

    #[test]
    fn enabled_with_unknown_algorithm_is_a_configuration_error() {
        let err = resolver()
            .overrides(secrets_layer("rot13", "pw"))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Configuration(_)));
    }

    #[test]
    fn undecryptable_value_fails_naming_the_key() {
        let mut layer = secrets_layer("aes-256-gcm", "pw");
        layer.push(("db.password".to_string(), "ENC()".to_string()));
        let err = resolver().overrides(layer).resolve().unwrap_err();
        match err {
            ConfigError::Decryption(e) => assert_eq!(e.key, "db.password"),
            other => panic!("expected decryption error, got {other}"),
        }
    }

    #[test]
    fn typed_accessors() {
        let config = resolver()
            .overrides(pairs(&[("a", "42"), ("b", "TRUE"), ("c", "nope")]))
            .resolve()
            .unwrap();
        assert_eq!(config.get_u64("a"), Some(42));
        assert_eq!(config.get_bool("b"), Some(true));
        assert_eq!(config.get_bool("c"), None);
        assert_eq!(config.get_or("missing", "fallback"), "fallback");
    }

    #[test]
    fn redacted_view_masks_secrets() {
        let cipher = SecretsCipher::new(SecretsAlgorithm::Aes256Gcm, "pw-123").unwrap();
        let sealed = cipher.encrypt_value("plain-but-was-encrypted").unwrap();

        let mut layer = secrets_layer("aes-256-gcm", "pw-123");
        layer.push(("db.url".to_string(), sealed));
        layer.push(("gateway.token".to_string(), "tok-abcdef".to_string()));
        layer.push(("logging.level".to_string(), "info".to_string()));
        let config = resolver().overrides(layer).resolve().unwrap();

        let redacted: HashMap<_, _> = config.redacted_properties().into_iter().collect();
        assert_eq!(redacted["db.url"], "plai***");
        assert_eq!(redacted["gateway.token"], "tok-***");
        assert_eq!(redacted["logging.level"], "info");
        assert!(redacted[SECRETS_PASSWORD_KEY].ends_with("***"));
    }
}
