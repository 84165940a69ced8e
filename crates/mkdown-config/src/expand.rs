//! `${VAR}` / `${VAR:-default}` expansion for string settings.

use crate::ConfigError;

/// Expand `${VAR}` references in `value`.
///
/// Unset variables without a `:-default` fail with [`ConfigError::EnvVar`]
/// naming `field`. Values without any `${` are returned untouched, so a
/// plain `$VAR` stays literal; once a value contains `${`, bare `$VAR`
/// references in it are expanded as well.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |var: &str| {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    };
    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        })
}

/// Name of a variable that is not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MKDOWN_TEST_ENGINE", "pulldown-cmark");
        }
        let result = expand_env("${MKDOWN_TEST_ENGINE}", "convert.engine").unwrap();
        assert_eq!(result, "pulldown-cmark");
        unsafe {
            std::env::remove_var("MKDOWN_TEST_ENGINE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MKDOWN_TEST_SANITIZER", "dom");
        }
        let result = expand_env("${MKDOWN_TEST_SANITIZER:-ammonia}", "sanitizer.backend").unwrap();
        assert_eq!(result, "dom");
        unsafe {
            std::env::remove_var("MKDOWN_TEST_SANITIZER");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MKDOWN_UNSET_VAR_TEST");
        }
        let result = expand_env("${MKDOWN_UNSET_VAR_TEST:-comrak}", "convert.engine").unwrap();
        assert_eq!(result, "comrak");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MKDOWN_MISSING_VAR_TEST");
        }
        let err = expand_env("${MKDOWN_MISSING_VAR_TEST}", "convert.engine").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MKDOWN_MISSING_VAR_TEST"));
        assert!(err.to_string().contains("convert.engine"));
    }

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env("comrak", "convert.engine").unwrap();
        assert_eq!(result, "comrak");
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("$ENGINE", "convert.engine").unwrap();
        assert_eq!(result, "$ENGINE");
    }

    #[test]
    fn test_bare_dollar_expanded_alongside_braced_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MKDOWN_TEST_PREFIX", "pulldown");
            std::env::set_var("MKDOWN_TEST_SUFFIX", "-cmark");
        }
        let result =
            expand_env("${MKDOWN_TEST_PREFIX}$MKDOWN_TEST_SUFFIX", "convert.engine").unwrap();
        assert_eq!(result, "pulldown-cmark");
        unsafe {
            std::env::remove_var("MKDOWN_TEST_PREFIX");
            std::env::remove_var("MKDOWN_TEST_SUFFIX");
        }
    }
}
