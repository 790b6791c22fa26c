//! BioModels repository client.
//!
//! Provides the three read operations the harness consumes, routed through
//! the response cache:
//!
//! - **List**: `GET {api}/model/identifiers?format=json`
//! - **Metadata**: `GET {api}/{model_id}?format=json`
//! - **Download**: `GET {api}/model/download/{model_id}?filename={name}`
//!
//! ### Cache read-through
//! The request URL is the cache key. In `reuse` mode every call replays the
//! stored response and a missing entry is a `CACHE_MISS` (no network
//! fallback). In `store` mode every live response is recorded. In `off` mode
//! the cache is never touched.

pub mod response;

pub use response::{FileEntry, IdentifierList, ModelFiles, ModelFormat, ModelInfo};

use bmcheck_core::{CacheMode, Error, ResponseCache};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::{Endpoints, FetchClient};

/// Read operations against a model repository.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// All model identifiers, in listing order.
    async fn list_identifiers(&self) -> Result<Vec<String>, Error>;

    /// Metadata for one model.
    async fn model_info(&self, model_id: &str) -> Result<ModelInfo, Error>;

    /// Raw content of one named file of a model.
    async fn download(&self, model_id: &str, filename: &str) -> Result<Bytes, Error>;

    /// Human-facing page for a model, used in report links.
    fn model_page(&self, model_id: &str) -> String;
}

/// Cached form of a download body; hex keeps the JSON envelope compact enough.
#[derive(Debug, Serialize, Deserialize)]
struct CachedBody {
    #[serde(with = "hex")]
    bytes: Vec<u8>,
}

/// BioModels REST client with response cache read-through.
#[derive(Debug, Clone)]
pub struct BioModelsClient {
    fetch: FetchClient,
    cache: ResponseCache,
    endpoints: Endpoints,
}

impl BioModelsClient {
    pub fn new(fetch: FetchClient, cache: ResponseCache, endpoints: Endpoints) -> Self {
        Self { fetch, cache, endpoints }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn read_through_json(&self, url: &Url) -> Result<serde_json::Value, Error> {
        let key = url.as_str();

        if self.cache.mode() == CacheMode::Reuse {
            return self.cache.load(key);
        }

        let value = self.fetch.get_json(url).await?;

        if self.cache.mode() == CacheMode::Store {
            self.cache.store(key, &value)?;
        }

        Ok(value)
    }
}

#[async_trait::async_trait]
impl Repository for BioModelsClient {
    async fn list_identifiers(&self) -> Result<Vec<String>, Error> {
        let url = self.endpoints.identifiers();
        let value = self.read_through_json(&url).await?;
        let list: IdentifierList = serde_json::from_value(value)
            .map_err(|e| Error::InvalidResponse(format!("{url}: unexpected identifier listing: {e}")))?;

        tracing::info!(count = list.models.len(), "listed model identifiers");
        Ok(list.models)
    }

    async fn model_info(&self, model_id: &str) -> Result<ModelInfo, Error> {
        let url = self.endpoints.model_info(model_id);
        let value = self.read_through_json(&url).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::InvalidResponse(format!("{url}: unexpected model metadata: {e}")))
    }

    async fn download(&self, model_id: &str, filename: &str) -> Result<Bytes, Error> {
        let url = self.endpoints.download(model_id, filename);
        let key = url.as_str();

        if self.cache.mode() == CacheMode::Reuse {
            let body: CachedBody = self.cache.load(key)?;
            return Ok(Bytes::from(body.bytes));
        }

        let response = self.fetch.fetch(&url).await?;

        if self.cache.mode() == CacheMode::Store {
            self.cache
                .store(key, &CachedBody { bytes: response.bytes.to_vec() })?;
        }

        Ok(response.bytes)
    }

    fn model_page(&self, model_id: &str) -> String {
        self.endpoints.model_page(model_id).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use serde_json::json;

    const BASE: &str = "https://www.ebi.ac.uk/biomodels";

    fn client(cache: ResponseCache) -> BioModelsClient {
        BioModelsClient::new(
            FetchClient::new(FetchConfig::default()).unwrap(),
            cache,
            Endpoints::new(BASE, "json").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_reuse_replays_stored_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let endpoints = Endpoints::new(BASE, "json").unwrap();

        let writer = ResponseCache::configure(CacheMode::Store, tmp.path()).unwrap();
        writer
            .store(endpoints.identifiers().as_str(), &json!({"models": ["BIOMD0000000001", "MODEL1"]}))
            .unwrap();
        writer
            .store(
                endpoints.model_info("BIOMD0000000001").as_str(),
                &json!({
                    "name": "Edelstein1996",
                    "format": {"name": "SBML"},
                    "files": {"main": [{"name": "model.xml"}]}
                }),
            )
            .unwrap();

        let client = client(ResponseCache::configure(CacheMode::Reuse, tmp.path()).unwrap());

        let ids = client.list_identifiers().await.unwrap();
        assert_eq!(ids, ["BIOMD0000000001", "MODEL1"]);

        let info = client.model_info("BIOMD0000000001").await.unwrap();
        assert_eq!(info.name, "Edelstein1996");
        assert_eq!(info.files.main[0].name, "model.xml");
    }

    #[tokio::test]
    async fn test_reuse_replays_stored_download() {
        let tmp = tempfile::tempdir().unwrap();
        let endpoints = Endpoints::new(BASE, "json").unwrap();
        let body = b"<?xml version=\"1.0\"?><sbml/>".to_vec();

        ResponseCache::configure(CacheMode::Store, tmp.path())
            .unwrap()
            .store(endpoints.download("M1", "m1.xml").as_str(), &CachedBody { bytes: body.clone() })
            .unwrap();

        let client = client(ResponseCache::configure(CacheMode::Reuse, tmp.path()).unwrap());
        let bytes = client.download("M1", "m1.xml").await.unwrap();
        assert_eq!(bytes.as_ref(), body.as_slice());
    }

    #[tokio::test]
    async fn test_reuse_miss_does_not_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let client = client(ResponseCache::configure(CacheMode::Reuse, tmp.path()).unwrap());

        let result = client.model_info("BIOMD0000000001").await;
        assert!(matches!(result, Err(Error::CacheMiss { key }) if key.ends_with("BIOMD0000000001?format=json")));

        let result = client.download("BIOMD0000000001", "a.xml").await;
        assert!(matches!(result, Err(Error::CacheMiss { .. })));
    }

    #[tokio::test]
    async fn test_reuse_invalid_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let endpoints = Endpoints::new(BASE, "json").unwrap();
        ResponseCache::configure(CacheMode::Store, tmp.path())
            .unwrap()
            .store(endpoints.identifiers().as_str(), &json!({"unexpected": true}))
            .unwrap();

        let client = client(ResponseCache::configure(CacheMode::Reuse, tmp.path()).unwrap());
        let result = client.list_identifiers().await;
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn test_cached_body_is_hex() {
        let json = serde_json::to_string(&CachedBody { bytes: vec![0xde, 0xad] }).unwrap();
        assert_eq!(json, r#"{"bytes":"dead"}"#);
    }

    #[test]
    fn test_model_page() {
        let tmp = tempfile::tempdir().unwrap();
        let client = client(ResponseCache::configure(CacheMode::Off, tmp.path()).unwrap());
        assert_eq!(client.model_page("BIOMD0000000001"), "https://www.ebi.ac.uk/biomodels/BIOMD0000000001");
    }
}
