//! Shell-style environment variable expansion for connection strings.

use regex::{Captures, Regex};
use std::sync::OnceLock;

static ENV_VAR_RE: OnceLock<Regex> = OnceLock::new();

fn env_pattern() -> &'static Regex {
    ENV_VAR_RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("valid regex")
    })
}

/// Expand `$VAR` and `${VAR}` references using the process environment.
///
/// Unset variables expand to an empty string and are logged at warn level.
pub fn expand_env_vars(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expand variable references using a custom lookup.
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_pattern()
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match lookup(name) {
                Some(value) => value,
                None => {
                    log::warn!("Environment variable '{}' is not set", name);
                    String::new()
                }
            }
        })
        .into_owned()
}
