//! Shared helpers for reading environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Parse an environment variable as a boolean, returning `default` if unset.
///
/// Recognises `1`, `true`, `yes`, `y`, `on` (case-insensitive) as `true`;
/// everything else maps to `false`.
pub fn env_var_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => parse_bool(&value),
        Err(_) => default,
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// Parse an environment variable with `FromStr`, falling back to `default` if unset.
///
/// Returns the parse error message when the variable is set but invalid.
pub fn env_var_parse<T>(name: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value.trim().parse::<T>().map_err(|e| e.to_string()),
        Err(_) => Ok(default),
    }
}

/// Parse an environment variable holding a millisecond count.
pub fn env_var_millis(name: &str, default_ms: u64) -> Result<Duration, String> {
    env_var_parse(name, default_ms).map(Duration::from_millis)
}
