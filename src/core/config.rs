use crate::utils::constants::{
    DEFAULT_FRONTEND_PORT, DEFAULT_LANDMARK_SERVICE_URL, DEFAULT_MAX_HANDS,
    DEFAULT_PALM_THRESHOLD, DEFAULT_PRESENCE_THRESHOLD, DEFAULT_SERVICE_PORT,
    LANDMARK_MODEL_FILE_NAME, LANDMARK_MODEL_URL, PALM_MODEL_FILE_NAME, PALM_MODEL_URL,
    SERVER_REQUEST_BODY_LIMIT,
};
use crate::utils::get_env::{get_env_var, parse_var_or, var_or};
use crate::utils::urls::to_http_url;
use anyhow::{Error, ensure};
use std::path::PathBuf;
use url::Url;

/// Where one model file lives and how to obtain it.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub path: PathBuf,
    pub url: Url,
    pub sha3_256: Option<String>,
}

/// The two networks behind the detector and the knobs applied to their outputs.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub palm: ArtifactConfig,
    pub landmark: ArtifactConfig,
    pub palm_threshold: f32,
    pub presence_threshold: f32,
    pub max_hands: usize,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub request_body_limit: usize,
    pub model: ModelConfig,
}

#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub port: u16,
    pub landmark_service_url: Url,
}

fn env_lookup(key: &str) -> Option<String> {
    get_env_var(key).ok()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_var_or(&lookup, "PORT", DEFAULT_SERVICE_PORT)?;
        let request_body_limit =
            parse_var_or(&lookup, "REQUEST_BODY_LIMIT", SERVER_REQUEST_BODY_LIMIT)?;
        let palm_threshold = unit_var(&lookup, "PALM_THRESHOLD", DEFAULT_PALM_THRESHOLD)?;
        let presence_threshold =
            unit_var(&lookup, "PRESENCE_THRESHOLD", DEFAULT_PRESENCE_THRESHOLD)?;
        let max_hands = parse_var_or(&lookup, "MAX_HANDS", DEFAULT_MAX_HANDS)?;
        ensure!(max_hands > 0, "MAX_HANDS must be at least 1");

        Ok(Self {
            port,
            request_body_limit,
            model: ModelConfig {
                palm: artifact_from_lookup(
                    &lookup,
                    "PALM",
                    PALM_MODEL_FILE_NAME,
                    PALM_MODEL_URL,
                )?,
                landmark: artifact_from_lookup(
                    &lookup,
                    "LANDMARK",
                    LANDMARK_MODEL_FILE_NAME,
                    LANDMARK_MODEL_URL,
                )?,
                palm_threshold,
                presence_threshold,
                max_hands,
            },
        })
    }
}

fn unit_var<F>(lookup: &F, key: &str, default: f32) -> Result<f32, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_var_or(lookup, key, default)?;
    ensure!(
        (0.0..=1.0).contains(&value),
        "{} must be within [0, 1], got {}",
        key,
        value
    );
    Ok(value)
}

/// Reads `<prefix>_MODEL_PATH`, `<prefix>_MODEL_URL` and `<prefix>_MODEL_SHA3_256`.
fn artifact_from_lookup<F>(
    lookup: &F,
    prefix: &str,
    file_name: &str,
    url: &str,
) -> Result<ArtifactConfig, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let key = |suffix: &str| format!("{}_MODEL_{}", prefix, suffix);
    let sha3_256 = lookup(&key("SHA3_256"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(ArtifactConfig {
        path: PathBuf::from(var_or(lookup, &key("PATH"), file_name)),
        url: to_http_url(&var_or(lookup, &key("URL"), url))?,
        sha3_256,
    })
}

impl FrontendConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: parse_var_or(&lookup, "FRONTEND_PORT", DEFAULT_FRONTEND_PORT)?,
            landmark_service_url: to_http_url(&var_or(
                &lookup,
                "LANDMARK_SERVICE_URL",
                DEFAULT_LANDMARK_SERVICE_URL,
            ))?,
        })
    }
}
