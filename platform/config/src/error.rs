use paygrid_core::{ConfigurationError, DecryptionError};
use thiserror::Error;

/// Failures raised while loading and resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Decryption(#[from] DecryptionError),

    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
