use anyhow::{Context, Error};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;

pub fn get_env_var(key: &str) -> Result<String, Error> {
    dotenv().ok();
    Ok(env::var(key)?)
}

/// Reads `key` through `lookup` and parses it, falling back to `default` when unset or blank.
pub fn parse_var_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        _ => Ok(default),
    }
}

pub fn var_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod get_env_tests {
    use crate::utils::get_env::{parse_var_or, var_or};

    fn lookup(key: &str) -> Option<String> {
        match key {
            "PORT" => Some("9000".to_string()),
            "BLANK" => Some("   ".to_string()),
            "BROKEN" => Some("nine".to_string()),
            _ => None,
        }
    }

    #[test]
    pub fn test_parse_var_or() {
        assert_eq!(parse_var_or(&lookup, "PORT", 1u16).unwrap(), 9000);
        assert_eq!(parse_var_or(&lookup, "MISSING", 1u16).unwrap(), 1);
        assert_eq!(parse_var_or(&lookup, "BLANK", 1u16).unwrap(), 1);
        assert!(parse_var_or(&lookup, "BROKEN", 1u16).is_err());
    }

    #[test]
    pub fn test_var_or() {
        assert_eq!(var_or(&lookup, "PORT", "x"), "9000");
        assert_eq!(var_or(&lookup, "BLANK", "x"), "x");
    }
}
