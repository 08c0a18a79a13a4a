//! Redaction for safe-to-share configuration output.
//!
//! Masks values under password-like keys and values that were decrypted,
//! keeping a short prefix hint so operators can still tell values apart.

/// Key fragments that mark a property as sensitive.
static SENSITIVE_KEY_TOKENS: &[&str] = &["password", "secret", "token", "apikey", "api_key", "key"];

/// Whether a property key names something that must not be logged.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEY_TOKENS.iter().any(|token| key.contains(token))
}

/// Mask a value, keeping the first 4 characters as a hint when the value
/// is long enough to keep them without giving much away.
pub fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if value.chars().count() > 4 {
        let hint: String = value.chars().take(4).collect();
        format!("{hint}***")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_like_keys_are_sensitive() {
        assert!(is_sensitive_key("db.password"));
        assert!(is_sensitive_key("paygrid.secrets.password"));
        assert!(is_sensitive_key("gateway.apiKey"));
        assert!(is_sensitive_key("webhook.secret"));
        assert!(is_sensitive_key("oauth.token"));
    }

    #[test]
    fn plain_keys_are_not() {
        assert!(!is_sensitive_key("db.url"));
        assert!(!is_sensitive_key("logging.level"));
    }

    #[test]
    fn long_values_keep_a_hint() {
        assert_eq!(redact_value("sk-abcdef123456"), "sk-a***");
    }

    #[test]
    fn short_values_are_fully_masked() {
        assert_eq!(redact_value("pw"), "***");
        assert_eq!(redact_value(""), "");
    }
}
