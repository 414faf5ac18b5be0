use crate::core::config::ArtifactConfig;
use crate::utils::hash::{digest_matches, finalize_hex, new_sha3_256, sha3_256_hex};
use anyhow::{Context, Error, anyhow, ensure};
use futures_util::StreamExt;
use reqwest::Client;
use sha3::Digest;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource {
    Cached,
    Downloaded,
}

/// Makes sure the artifact exists at `artifact.path`, downloading it from `artifact.url` once.
pub async fn ensure_artifact(
    http_client: &Client,
    artifact: &ArtifactConfig,
) -> Result<ArtifactSource, Error> {
    if tokio::fs::try_exists(&artifact.path).await? {
        if let Some(expected) = &artifact.sha3_256 {
            verify_file(&artifact.path, expected).await?;
        }
        tracing::info!("Using cached model artifact {}", artifact.path.display());
        return Ok(ArtifactSource::Cached);
    }

    tracing::info!(
        "Model artifact {} missing, downloading from {}",
        artifact.path.display(),
        artifact.url
    );
    let download_start = std::time::Instant::now();
    let size = download_model(
        http_client,
        &artifact.url,
        &artifact.path,
        artifact.sha3_256.as_deref(),
    )
    .await?;
    tracing::info!(
        "Downloaded {} bytes to {} in {:?}",
        size,
        artifact.path.display(),
        download_start.elapsed()
    );

    Ok(ArtifactSource::Downloaded)
}

async fn verify_file(path: &Path, expected: &str) -> Result<(), Error> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let digest = sha3_256_hex(&data);
    ensure!(
        digest_matches(&digest, expected),
        "model artifact {} has SHA3-256 {}, expected {}",
        path.display(),
        digest,
        expected
    );
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.part", Uuid::new_v4()));
    path.with_file_name(name)
}

async fn download_model(
    http_client: &Client,
    url: &Url,
    path: &Path,
    expected_sha3: Option<&str>,
) -> Result<usize, Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let part = part_path(path);
    match fetch_to(http_client, url, &part, expected_sha3).await {
        Ok(size) => {
            tokio::fs::rename(&part, path).await.with_context(|| {
                format!("failed to move {} into {}", part.display(), path.display())
            })?;
            Ok(size)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            Err(e)
        }
    }
}

async fn fetch_to(
    http_client: &Client,
    url: &Url,
    part: &Path,
    expected_sha3: Option<&str>,
) -> Result<usize, Error> {
    let response = http_client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("failed to request {}", url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("model download from {} failed: {}", url, status));
    }

    let mut file = tokio::fs::File::create(part).await?;
    let mut hasher = new_sha3_256();
    let mut total_bytes = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("error reading body from {}", url))?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        total_bytes += chunk.len();
    }
    file.flush().await?;
    file.sync_all().await?;

    ensure!(total_bytes > 0, "model download from {} was empty", url);

    if let Some(expected) = expected_sha3 {
        let digest = finalize_hex(hasher);
        ensure!(
            digest_matches(&digest, expected),
            "downloaded model has SHA3-256 {}, expected {}",
            digest,
            expected
        );
    }

    Ok(total_bytes)
}
