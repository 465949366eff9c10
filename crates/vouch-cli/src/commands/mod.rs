pub mod decrypt;
pub mod issue;
pub mod keygen;
pub mod present;
pub mod resolve;
pub mod status;
pub mod verify;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:60071";

/// Response envelope of every node route.
#[derive(Deserialize)]
pub struct Envelope {
    pub error: Option<String>,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// Read `value` from the file it names, or use it as-is.
pub fn inline_or_file(value: &str) -> anyhow::Result<String> {
    if std::path::Path::new(value).is_file() {
        Ok(std::fs::read_to_string(value)?.trim().to_string())
    } else {
        Ok(value.to_string())
    }
}

/// Send a request and unwrap the envelope, failing on non-success.
pub async fn call(request: reqwest::RequestBuilder, what: &str) -> anyhow::Result<serde_json::Value> {
    let resp = request
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("could not reach node: {}", e))?;
    let status = resp.status();
    tracing::debug!(what, status = status.as_u16(), "node responded");
    let envelope: Option<Envelope> = resp.json().await.ok();
    match envelope {
        Some(env) if status.is_success() => Ok(env.content),
        Some(env) => anyhow::bail!(
            "{} failed (HTTP {}): {}",
            what,
            status,
            env.error.unwrap_or_else(|| env.content.to_string())
        ),
        None => anyhow::bail!("{} failed (HTTP {})", what, status),
    }
}

pub async fn post<T: Serialize>(
    endpoint: &str,
    path: &str,
    body: &T,
    what: &str,
) -> anyhow::Result<serde_json::Value> {
    let url = format!("{}/api/v0{}", endpoint, path);
    tracing::debug!(url = %url, "POST");
    call(reqwest::Client::new().post(&url).json(body), what).await
}

pub async fn get(endpoint: &str, path: &str, what: &str) -> anyhow::Result<serde_json::Value> {
    let url = format!("{}/api/v0{}", endpoint, path);
    tracing::debug!(url = %url, "GET");
    call(reqwest::Client::new().get(&url), what).await
}
