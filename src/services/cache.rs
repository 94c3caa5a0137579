// src/services/cache.rs
// DOCUMENTATION: Persistent request cache in front of every provider call
// PURPOSE: Make repeated queries free - a key seen once is never fetched again

use crate::errors::PlacesError;
use crate::services::cache_key::{derive_key, QueryParams, SECRET_PARAMS};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outbound HTTP GET
/// DOCUMENTATION: The only place network I/O happens; the cache owns one
pub trait HttpTransport {
    /// Issue a GET and return the body of a successful (2xx) response
    fn get(
        &self,
        url: &str,
        params: Option<&QueryParams>,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<String, PlacesError>> + Send;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create transport whose requests fail after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlacesError::NetworkError(format!("Client setup failed: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        params: Option<&QueryParams>,
        headers: &[(String, String)],
    ) -> Result<String, PlacesError> {
        let mut request = self.client.get(url);
        if let Some(params) = params {
            request = request.query(params);
        }
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            log::error!("Request to {} failed: {}", url, e);
            PlacesError::NetworkError(format!("Request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("API error from {} {}: {}", url, status, body);
            return Err(PlacesError::NetworkError(format!("API error {}: {}", status, body)));
        }

        response.text().await.map_err(|e| {
            log::error!("Failed to read body from {}: {}", url, e);
            PlacesError::NetworkError(format!("Body read failed: {}", e))
        })
    }
}

/// How a response body becomes the stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Plain JSON document
    Json,
    /// JSON wrapped in a callback, e.g. `jsonFlickrApi({...})`
    WrappedJson,
    /// Raw text, stored as a JSON string
    Text,
}

impl ResponseFormat {
    /// Decode a body; malformed bodies are never cached
    pub fn decode(self, body: &str) -> Result<Value, PlacesError> {
        match self {
            ResponseFormat::Json => serde_json::from_str(body)
                .map_err(|e| PlacesError::DecodeError(format!("Invalid JSON: {}", e))),
            ResponseFormat::WrappedJson => {
                let inner = strip_wrapper(body)?;
                serde_json::from_str(inner)
                    .map_err(|e| PlacesError::DecodeError(format!("Invalid wrapped JSON: {}", e)))
            }
            ResponseFormat::Text => Ok(Value::String(body.to_string())),
        }
    }
}

/// Slice between the first `(` and the last `)`
fn strip_wrapper(body: &str) -> Result<&str, PlacesError> {
    let body = body.trim();
    match (body.find('('), body.rfind(')')) {
        (Some(start), Some(end)) if start < end => Ok(&body[start + 1..end]),
        _ => Err(PlacesError::DecodeError(
            "Response is not wrapped in a callback".to_string(),
        )),
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Persistent key -> response cache
/// DOCUMENTATION: Loaded once at startup, consulted before every network call,
/// flushed in full after every miss. Entries never expire.
/// Not safe for concurrent writers on the same file; share it behind a lock.
pub struct RequestCache<T = ReqwestTransport> {
    path: PathBuf,
    entries: HashMap<String, Value>,
    transport: T,
    hits: u64,
    misses: u64,
}

impl<T: HttpTransport> RequestCache<T> {
    /// Load the durable cache
    /// DOCUMENTATION: A missing or unreadable file starts an empty cache
    pub fn load(path: impl Into<PathBuf>, transport: T) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        log::info!(
            "Loaded request cache from {} ({} entries)",
            path.display(),
            entries.len()
        );

        Self {
            path,
            entries,
            transport,
            hits: 0,
            misses: 0,
        }
    }

    /// Fetch through the cache
    /// DOCUMENTATION: A hit returns the stored value with no network access.
    /// A miss fetches, decodes, stores and flushes the whole map. Fetch and decode
    /// failures store nothing; a flush failure is reported but the entry is kept.
    ///
    /// # Arguments
    /// * `url` - Base address of the request
    /// * `params` - Query parameters (secret names are left out of the key)
    /// * `headers` - Request headers, never part of the key
    /// * `format` - How to decode the body
    pub async fn fetch(
        &mut self,
        url: &str,
        params: Option<&QueryParams>,
        headers: &[(String, String)],
        format: ResponseFormat,
    ) -> Result<Value, PlacesError> {
        self.fetch_as(url, params, headers, format, |_: &Value| Ok(()))
            .await
    }

    /// Fetch through the cache into a typed document
    /// DOCUMENTATION: The decoded body must deserialize into `R` and pass `validate`
    /// before it is stored, so a provider error document or an unexpected shape is
    /// never cached. Hits are checked the same way.
    pub async fn fetch_as<R, V>(
        &mut self,
        url: &str,
        params: Option<&QueryParams>,
        headers: &[(String, String)],
        format: ResponseFormat,
        validate: V,
    ) -> Result<R, PlacesError>
    where
        R: DeserializeOwned,
        V: FnOnce(&R) -> Result<(), PlacesError>,
    {
        let key = derive_key(url, params, SECRET_PARAMS);

        if let Some(value) = self.entries.get(&key) {
            log::debug!("Cache HIT for key: {}", key);
            self.hits += 1;
            let document = decode_document(value.clone(), url)?;
            validate(&document)?;
            return Ok(document);
        }

        log::info!("Cache MISS for key: {} - requesting new data", key);
        self.misses += 1;

        let body = self.transport.get(url, params, headers).await?;
        let value = format.decode(&body)?;
        let document = decode_document(value.clone(), url)?;
        validate(&document)?;

        self.entries.insert(key, value);
        self.flush()?;

        Ok(document)
    }

    /// Fetch a page as raw text (no parameters, key = URL)
    pub async fn fetch_text(&mut self, url: &str) -> Result<Value, PlacesError> {
        self.fetch(url, None, &[], ResponseFormat::Text).await
    }

    /// Write the whole map to the durable file
    pub fn flush(&self) -> Result<(), PlacesError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    PlacesError::CacheIoError(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        let json = serde_json::to_string(&self.entries)
            .map_err(|e| PlacesError::CacheIoError(format!("Serialize failed: {}", e)))?;

        fs::write(&self.path, json).map_err(|e| {
            log::error!("Failed to write request cache {}: {}", self.path.display(), e);
            PlacesError::CacheIoError(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Stored value for a key, without touching counters
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Seed an entry in memory (not flushed)
    pub fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

fn decode_document<R: DeserializeOwned>(value: Value, url: &str) -> Result<R, PlacesError> {
    serde_json::from_value(value).map_err(|e| {
        log::error!("Unexpected response from {}: {}", url, e);
        PlacesError::DecodeError(format!("Unexpected response from {}: {}", url, e))
    })
}

fn read_entries(path: &Path) -> HashMap<String, Value> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No request cache at {}, starting empty", path.display());
            return HashMap::new();
        }
        Err(e) => {
            log::warn!("Could not read request cache {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        log::warn!("Request cache {} is corrupt, starting empty: {}", path.display(), e);
        HashMap::new()
    })
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedTransport::new().with("https://api/x", r#"{"results": [1, 2]}"#);
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);
        let p = params(&[("query", "Lake Tahoe")]);

        let first = cache
            .fetch("https://api/x", Some(&p), &[], ResponseFormat::Json)
            .await
            .unwrap();
        let second = cache
            .fetch("https://api/x", Some(&p), &[], ResponseFormat::Json)
            .await
            .unwrap();

        assert_eq!(first, json!({"results": [1, 2]}));
        assert_eq!(first, second);
        assert_eq!(cache.transport().calls(), 1);
        assert_eq!(cache.stats(), CacheStats { total_entries: 1, hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_preseeded_entry_triggers_no_network() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, r#"{"https://api/x": "<html>seeded</html>"}"#).unwrap();

        let mut cache = RequestCache::load(&path, ScriptedTransport::new());
        let value = cache.fetch_text("https://api/x").await.unwrap();

        assert_eq!(value, json!("<html>seeded</html>"));
        assert_eq!(cache.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_secret_param_does_not_cause_refetch() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedTransport::new().with("https://api/x", r#"{"ok": true}"#);
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);

        let a = params(&[("lat", "1.5"), ("api_key", "first")]);
        let b = params(&[("lat", "1.5"), ("api_key", "rotated")]);
        cache.fetch("https://api/x", Some(&a), &[], ResponseFormat::Json).await.unwrap();
        cache.fetch("https://api/x", Some(&b), &[], ResponseFormat::Json).await.unwrap();

        assert_eq!(cache.transport().calls(), 1);
    }

    #[tokio::test]
    async fn test_miss_persists_and_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        let transport = ScriptedTransport::new().with("https://api/x", r#"{"n": 42}"#);
        let mut cache = RequestCache::load(&path, transport);
        let p = params(&[("q", "league")]);

        cache.fetch("https://api/x", Some(&p), &[], ResponseFormat::Json).await.unwrap();
        assert!(path.exists());

        let mut reloaded = RequestCache::load(&path, ScriptedTransport::new());
        assert_eq!(reloaded.len(), 1);
        let value = reloaded
            .fetch("https://api/x", Some(&p), &[], ResponseFormat::Json)
            .await
            .unwrap();
        assert_eq!(value, json!({"n": 42}));
        assert_eq!(reloaded.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let mut cache = RequestCache::load(dir.path().join("cache.json"), ScriptedTransport::new());

        let err = cache.fetch_text("https://down/").await.unwrap_err();
        assert!(matches!(err, PlacesError::NetworkError(_)));
        assert!(cache.is_empty());

        cache.fetch_text("https://down/").await.unwrap_err();
        assert_eq!(cache.transport().calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedTransport::new().with("https://api/x", "not json");
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);
        let p = params(&[("a", "1")]);

        let err = cache
            .fetch("https://api/x", Some(&p), &[], ResponseFormat::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, PlacesError::DecodeError(_)));
        assert!(cache.is_empty());
        assert!(!dir.path().join("cache.json").exists());
    }

    #[tokio::test]
    async fn test_wrapped_json_is_unwrapped() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedTransport::new().with(
            "https://api.flickr.com/services/rest/",
            r#"jsonFlickrApi({"photos": {"photo": []}, "stat": "ok"})"#,
        );
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);
        let p = params(&[("method", "flickr.photos.search")]);

        let value = cache
            .fetch(
                "https://api.flickr.com/services/rest/",
                Some(&p),
                &[],
                ResponseFormat::WrappedJson,
            )
            .await
            .unwrap();
        assert_eq!(value["stat"], "ok");
    }

    #[tokio::test]
    async fn test_write_failure_keeps_entry_in_memory() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be written as a file
        let transport = ScriptedTransport::new().with("https://api/x", r#"{"v": 1}"#);
        let mut cache = RequestCache::load(dir.path(), transport);
        let p = params(&[("a", "1")]);

        let err = cache
            .fetch("https://api/x", Some(&p), &[], ResponseFormat::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, PlacesError::CacheIoError(_)));

        let value = cache
            .fetch("https://api/x", Some(&p), &[], ResponseFormat::Json)
            .await
            .unwrap();
        assert_eq!(value, json!({"v": 1}));
        assert_eq!(cache.transport().calls(), 1);
    }

    #[derive(Debug, Deserialize)]
    struct StatusDocument {
        status: String,
    }

    fn require_ok(doc: &StatusDocument) -> Result<(), PlacesError> {
        match doc.status.as_str() {
            "OK" => Ok(()),
            other => Err(PlacesError::ExternalApiError(other.to_string())),
        }
    }

    #[tokio::test]
    async fn test_rejected_document_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let transport =
            ScriptedTransport::new().with("https://api/x", r#"{"status": "REQUEST_DENIED"}"#);
        let mut cache = RequestCache::load(&path, transport);
        let p = params(&[("query", "Lake Tahoe")]);

        for _ in 0..2 {
            let err = cache
                .fetch_as("https://api/x", Some(&p), &[], ResponseFormat::Json, require_ok)
                .await
                .unwrap_err();
            assert!(matches!(err, PlacesError::ExternalApiError(ref m) if m == "REQUEST_DENIED"));
        }

        assert!(cache.is_empty());
        assert!(!path.exists());
        assert_eq!(cache.transport().calls(), 2);
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedTransport::new().with("https://api/x", r#"{"unexpected": true}"#);
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);
        let p = params(&[("query", "Lake Tahoe")]);

        for _ in 0..2 {
            let err = cache
                .fetch_as("https://api/x", Some(&p), &[], ResponseFormat::Json, require_ok)
                .await
                .unwrap_err();
            assert!(matches!(err, PlacesError::DecodeError(_)));
        }

        assert!(cache.is_empty());
        assert_eq!(cache.transport().calls(), 2);
    }

    #[tokio::test]
    async fn test_accepted_document_is_cached() {
        let dir = TempDir::new().unwrap();
        let transport = ScriptedTransport::new().with("https://api/x", r#"{"status": "OK"}"#);
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);
        let p = params(&[("query", "Lake Tahoe")]);

        let first: StatusDocument = cache
            .fetch_as("https://api/x", Some(&p), &[], ResponseFormat::Json, require_ok)
            .await
            .unwrap();
        let second: StatusDocument = cache
            .fetch_as("https://api/x", Some(&p), &[], ResponseFormat::Json, require_ok)
            .await
            .unwrap();

        assert_eq!(first.status, "OK");
        assert_eq!(second.status, "OK");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.transport().calls(), 1);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ this is not json").unwrap();

        let cache = RequestCache::load(&path, ScriptedTransport::new());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let cache = RequestCache::load(dir.path().join("absent.json"), ScriptedTransport::new());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_strip_wrapper() {
        assert_eq!(strip_wrapper("cb({\"a\":1})").unwrap(), "{\"a\":1}");
        assert!(strip_wrapper("{\"a\":1}").is_err());
    }
}
