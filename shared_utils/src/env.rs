//! Environment variable access used for provider credentials and config lookup.

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads a required environment variable.
///
/// Empty values are treated the same as unset ones, since an empty API key is
/// never usable.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    optional_env_var(name).ok_or_else(|| MissingEnvVarError(name.to_string()))
}

/// Reads an environment variable that may legitimately be absent.
pub fn optional_env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
