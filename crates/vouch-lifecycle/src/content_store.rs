use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::LifecycleError;
use crate::records::SmartCareer;

/// Read access to content-addressed career documents.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, hash: &str) -> Result<SmartCareer, LifecycleError>;
}

fn check_hash(hash: &str) -> Result<(), LifecycleError> {
    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LifecycleError::ClientFault(format!(
            "invalid content hash {:?}",
            hash
        )));
    }
    Ok(())
}

/// Gateway-backed store: documents live at `{url_prefix}{hash}`.
pub struct HttpContentStore {
    http: reqwest::Client,
    url_prefix: String,
}

impl HttpContentStore {
    pub fn new(url_prefix: impl Into<String>, timeout: Duration) -> Result<Self, LifecycleError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LifecycleError::ContentStoreUnavailable(e.to_string()))?;
        Ok(Self {
            http,
            url_prefix: url_prefix.into(),
        })
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch(&self, hash: &str) -> Result<SmartCareer, LifecycleError> {
        check_hash(hash)?;
        let url = format!("{}{}", self.url_prefix, hash);
        let response = self.http.get(&url).send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "content store request failed");
            LifecycleError::ContentStoreUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(hash = %hash, status = status.as_u16(), "content store rejected fetch");
            return Err(LifecycleError::ContentStore {
                hash: hash.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| LifecycleError::ContentStore {
            hash: hash.to_string(),
            status: 502,
            body: e.to_string(),
        })
    }
}

/// Map-backed store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryContentStore {
    documents: DashMap<String, SmartCareer>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, hash: impl Into<String>, career: SmartCareer) {
        self.documents.insert(hash.into(), career);
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn fetch(&self, hash: &str) -> Result<SmartCareer, LifecycleError> {
        check_hash(hash)?;
        self.documents
            .get(hash)
            .map(|e| e.value().clone())
            .ok_or_else(|| LifecycleError::ContentStore {
                hash: hash.to_string(),
                status: 404,
                body: "not found".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use vouch_core::{ClaimContent, ErrorKind};

    async fn spawn_gateway() -> String {
        async fn document(Path(hash): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
            if hash == "QmKnown" {
                Ok(Json(serde_json::json!({
                    "holder": "did:ethr:0x435df3eda57154cf8cf7926079881f2912f54db4",
                    "issuer": "did:ethr:0x8f4d2b0a6a3c1e5d7f9b2c4e6a8d0f1b3c5e7a9d",
                    "content": {"from": "2018", "to": "2020", "where": "Globex", "what": "Analyst"}
                })))
            } else {
                Err(StatusCode::NOT_FOUND)
            }
        }
        let app = Router::new().route("/ipfs/{hash}", get(document));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/ipfs/", addr)
    }

    #[tokio::test]
    async fn test_http_fetch() {
        let prefix = spawn_gateway().await;
        let store = HttpContentStore::new(prefix, Duration::from_secs(5)).unwrap();

        let career = store.fetch("QmKnown").await.unwrap();
        assert_eq!(career.content.workplace, "Globex");
        assert!(career.holder.starts_with("did:ethr:"));

        let err = store.fetch("QmMissing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MicroserviceError);
        assert_eq!(err.downstream().map(|(s, _)| s), Some(404));
    }

    #[tokio::test]
    async fn test_http_unreachable() {
        let store = HttpContentStore::new("http://127.0.0.1:1/ipfs/", Duration::from_secs(2)).unwrap();
        let err = store.fetch("QmKnown").await.unwrap_err();
        assert!(matches!(err, LifecycleError::ContentStoreUnavailable(_)));
        assert_eq!(err.downstream().map(|(s, _)| s), Some(503));
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryContentStore::new();
        store.put(
            "QmA",
            SmartCareer {
                holder: String::new(),
                issuer: String::new(),
                content: ClaimContent::new("a", "b", "c", "d"),
            },
        );
        assert_eq!(store.fetch("QmA").await.unwrap().content.what, "d");
        assert!(store.fetch("QmB").await.is_err());
    }

    #[tokio::test]
    async fn test_hash_must_be_plain() {
        let store = InMemoryContentStore::new();
        for bad in ["", "../etc", "Qm A", "a/b"] {
            let err = store.fetch(bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ClientFault, "{:?}", bad);
        }
    }
}
