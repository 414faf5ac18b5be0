use url::{ParseError, Url};

pub fn to_url(host: &str) -> Result<Url, ParseError> {
    Url::parse(host)
}

/// Only http(s) URLs are accepted for remote endpoints and artifacts.
pub fn to_http_url(raw: &str) -> Result<Url, anyhow::Error> {
    let url = to_url(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("unsupported URL scheme '{}' in {}", other, raw),
    }
}
