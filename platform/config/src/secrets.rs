//! Encrypted property values.
//!
//! An encrypted value has the exact form `ENC(<base64 payload>)` where the
//! payload is `nonce || ciphertext` under an AEAD cipher. The key is the
//! SHA-256 digest of the configured password. Decryption happens eagerly
//! at resolution time; a value that fails to decrypt fails the whole
//! resolution, naming the key but never the payload.

use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use once_cell::sync::Lazy;
use paygrid_core::{ConfigurationError, DecryptionError};
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Matches the full encrypted-value wrapper. Parentheses are mandatory;
/// an empty payload still matches and is rejected during decryption.
static ENC_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ENC\((.*)\)$").unwrap());

/// AEAD cipher used for encrypted property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretsAlgorithm {
    /// 12-byte nonce.
    Aes256Gcm,
    /// 24-byte nonce.
    XChaCha20Poly1305,
}

impl SecretsAlgorithm {
    fn nonce_len(self) -> usize {
        match self {
            SecretsAlgorithm::Aes256Gcm => 12,
            SecretsAlgorithm::XChaCha20Poly1305 => 24,
        }
    }
}

impl fmt::Display for SecretsAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretsAlgorithm::Aes256Gcm => write!(f, "aes-256-gcm"),
            SecretsAlgorithm::XChaCha20Poly1305 => write!(f, "xchacha20-poly1305"),
        }
    }
}

impl FromStr for SecretsAlgorithm {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aes-256-gcm" => Ok(SecretsAlgorithm::Aes256Gcm),
            "xchacha20-poly1305" => Ok(SecretsAlgorithm::XChaCha20Poly1305),
            other => Err(ConfigurationError(format!(
                "unknown secrets algorithm: {other}"
            ))),
        }
    }
}

/// Cipher for `ENC(...)` property values.
pub struct SecretsCipher {
    algorithm: SecretsAlgorithm,
    key: [u8; 32],
}

impl SecretsCipher {
    /// Build a cipher from the configured algorithm and password.
    pub fn new(algorithm: SecretsAlgorithm, password: &str) -> Result<Self, ConfigurationError> {
        if password.is_empty() {
            return Err(ConfigurationError(
                "secrets are enabled but the password is empty".into(),
            ));
        }
        Ok(Self {
            algorithm,
            key: Sha256::digest(password.as_bytes()).into(),
        })
    }

    /// Whether a value carries the encrypted wrapper.
    pub fn is_encrypted(value: &str) -> bool {
        ENC_PATTERN.is_match(value)
    }

    /// Encrypt a plaintext into the `ENC(...)` form.
    pub fn encrypt_value(&self, plaintext: &str) -> Result<String, ConfigurationError> {
        let mut nonce = vec![0u8; self.algorithm.nonce_len()];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .seal(&nonce, plaintext.as_bytes())
            .map_err(|e| ConfigurationError(format!("encryption failed: {e}")))?;

        let mut payload = nonce;
        payload.extend_from_slice(&ciphertext);
        Ok(format!("ENC({})", BASE64.encode(payload)))
    }

    /// Decrypt an `ENC(...)` value. `key` is the property key, used only
    /// for error reporting.
    pub fn decrypt_value(&self, key: &str, value: &str) -> Result<String, DecryptionError> {
        let payload = ENC_PATTERN
            .captures(value)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| self.error(key, "value is not in ENC(...) form"))?;

        if payload.is_empty() {
            return Err(self.error(key, "empty payload"));
        }

        let bytes = BASE64
            .decode(payload)
            .map_err(|_| self.error(key, "payload is not valid base64"))?;

        let nonce_len = self.algorithm.nonce_len();
        if bytes.len() <= nonce_len {
            return Err(self.error(key, "payload is truncated"));
        }
        let (nonce, ciphertext) = bytes.split_at(nonce_len);

        let plaintext = self
            .open(nonce, ciphertext)
            .map_err(|_| self.error(key, "authentication failed"))?;

        String::from_utf8(plaintext).map_err(|_| self.error(key, "plaintext is not valid UTF-8"))
    }

    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, aes_gcm::aead::Error> {
        match self.algorithm {
            SecretsAlgorithm::Aes256Gcm => {
                Aes256Gcm::new((&self.key).into()).encrypt(Nonce::from_slice(nonce), plaintext)
            }
            SecretsAlgorithm::XChaCha20Poly1305 => XChaCha20Poly1305::new((&self.key).into())
                .encrypt(XNonce::from_slice(nonce), plaintext),
        }
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, aes_gcm::aead::Error> {
        match self.algorithm {
            SecretsAlgorithm::Aes256Gcm => {
                Aes256Gcm::new((&self.key).into()).decrypt(Nonce::from_slice(nonce), ciphertext)
            }
            SecretsAlgorithm::XChaCha20Poly1305 => XChaCha20Poly1305::new((&self.key).into())
                .decrypt(XNonce::from_slice(nonce), ciphertext),
        }
    }

    fn error(&self, key: &str, reason: &str) -> DecryptionError {
        DecryptionError {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Debug for SecretsCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key bytes stay out of debug output.
        f.debug_struct("SecretsCipher")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
