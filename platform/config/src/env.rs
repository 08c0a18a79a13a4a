//! Environment overlay: `PAYGRID_*` variables become property keys.
//!
//! The variable name is mapped by stripping the prefix, lowercasing, and
//! replacing every underscore with a period, so `PAYGRID_DB_POOL_SIZE`
//! becomes `db.pool.size`. A doubled underscore therefore yields two
//! adjacent periods. The mapping is one-directional; nothing here writes
//! back to the environment.

/// Prefix selecting which environment variables participate.
pub const ENV_PREFIX: &str = "PAYGRID_";

/// Map an environment variable name to its property key, or `None` when
/// the variable does not carry the platform prefix.
pub fn property_key_for(var: &str) -> Option<String> {
    let rest = var.strip_prefix(ENV_PREFIX)?;
    Some(rest.to_ascii_lowercase().replace('_', "."))
}

/// Snapshot the process environment as property pairs.
pub fn environment_properties() -> Vec<(String, String)> {
    environment_properties_from(std::env::vars())
}

/// Map a provided set of variables (useful for testing).
pub fn environment_properties_from<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| property_key_for(&name).map(|key| (key, value)))
        .collect()
}
