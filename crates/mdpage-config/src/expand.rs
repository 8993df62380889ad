//! Environment variable expansion for configuration strings.

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Supports:
/// - `${VAR}` - expands to the value of VAR, errors if unset
/// - `${VAR:-default}` - expands to VAR if set, otherwise uses default
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Expand environment variable references in a path.
///
/// Paths that are not valid UTF-8 cannot contain `${}` references written in
/// TOML and are returned unchanged.
pub(crate) fn expand_env_path(path: &Path, field: &str) -> Result<PathBuf, ConfigError> {
    match path.to_str() {
        Some(value) => expand_env(value, field).map(PathBuf::from),
        None => Ok(path.to_path_buf()),
    }
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}
