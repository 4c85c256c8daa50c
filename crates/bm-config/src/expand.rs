//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Supports:
/// - `${VAR}` - expands to the value of VAR, errors if unset
/// - `${VAR:-default}` - expands to VAR if set, otherwise uses default
///
/// Returns the original string unchanged if no `${}` patterns are present.
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

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("BM_TEST_VAR_SIMPLE", "hello");
        }
        let result = expand_env("${BM_TEST_VAR_SIMPLE}", "test.field").unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("BM_TEST_VAR_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("BM_UNSET_VAR_TEST");
        }
        let result = expand_env("${BM_UNSET_VAR_TEST:-sqlite://local.db}", "test.field").unwrap();
        assert_eq!(result, "sqlite://local.db");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("BM_MISSING_VAR_TEST");
        }
        let err = expand_env("${BM_MISSING_VAR_TEST}", "delivery.api_key").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("BM_MISSING_VAR_TEST"));
        assert!(err.to_string().contains("delivery.api_key"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("BM_HOST_TEST", "mail.example.com");
        }
        let result = expand_env("https://${BM_HOST_TEST}/api", "links.api_base").unwrap();
        assert_eq!(result, "https://mail.example.com/api");
        unsafe {
            std::env::remove_var("BM_HOST_TEST");
        }
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(expand_env("literal", "f").unwrap(), "literal");
        assert_eq!(expand_env("https://example.com/$path", "f").unwrap(), "https://example.com/$path");
    }
}
