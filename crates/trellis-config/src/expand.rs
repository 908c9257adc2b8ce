//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_default_uses_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TRELLIS_TEST_HOST", "0.0.0.0");
        }
        let result = expand_env("${TRELLIS_TEST_HOST:-127.0.0.1}", "server.host").unwrap();
        assert_eq!(result, "0.0.0.0");
        unsafe {
            std::env::remove_var("TRELLIS_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TRELLIS_UNSET_HOST");
        }
        let result = expand_env("${TRELLIS_UNSET_HOST:-127.0.0.1}", "server.host").unwrap();
        assert_eq!(result, "127.0.0.1");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TRELLIS_MISSING_VAR");
        }
        let err = expand_env("${TRELLIS_MISSING_VAR}", "server.host").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("TRELLIS_MISSING_VAR"));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("$VAR", "server.host").unwrap();
        assert_eq!(result, "$VAR");
    }
}
