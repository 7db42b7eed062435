//! Template functions: env_var() and log().

use minijinja::value::Value;
use minijinja::Error;

/// Create the env_var() function that reads process environment variables
///
/// Usage in templates:
/// ```jinja
/// {{ env_var('TARGET_SCHEMA') }}
/// {{ env_var('TARGET_SCHEMA', 'public') }}
/// ```
pub(crate) fn make_env_var_fn(
) -> impl Fn(&str, Option<Value>) -> Result<String, Error> + Send + Sync + Clone + 'static {
    |name: &str, default: Option<Value>| match std::env::var(name) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(d) => Ok(d.to_string()),
            None => Err(Error::new(
                minijinja::ErrorKind::InvalidOperation,
                format!(
                    "Environment variable '{}' is not set and no default provided",
                    name
                ),
            )),
        },
    }
}

/// Create the `log(msg)` function; writes at info level and renders nothing
pub(crate) fn make_log_fn() -> impl Fn(&str) -> String + Send + Sync + Clone + 'static {
    |msg: &str| {
        log::info!("[template] {}", msg);
        String::new()
    }
}
