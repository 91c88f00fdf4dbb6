//! Store backed by a Firebase-style realtime database, spoken to over its REST
//! interface: `PATCH {base}/{path}.json` merges, `PUT` replaces, `GET` reads.

use std::sync::OnceLock;
use std::time::Duration;

use codeviz_core::{path_segments, Store};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FirebaseError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid path: {0:?}")]
    InvalidPath(String),
    #[error("http: {0}")]
    Http(String),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serde: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub database_url: String,
    /// Database secret or ID token, sent as the `auth` query parameter.
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl FirebaseConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            auth_token: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

pub struct FirebaseStore {
    base_url: String,
    auth_token: Option<String>,
    timeout: Duration,
    // Built on first use: the blocking client must not be created on an async worker.
    client: OnceLock<Client>,
}

impl FirebaseStore {
    pub fn new(cfg: FirebaseConfig) -> Result<Self, FirebaseError> {
        let base_url = cfg.database_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(FirebaseError::InvalidConfig("database_url is empty".into()));
        }
        let parsed = Url::parse(&base_url)
            .map_err(|e| FirebaseError::InvalidConfig(format!("database_url {base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(FirebaseError::InvalidConfig(format!(
                "database_url must be an http(s) url, got {base_url}"
            )));
        }
        let auth_token = cfg
            .auth_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self {
            base_url,
            auth_token,
            timeout: Duration::from_millis(cfg.timeout_ms),
            client: OnceLock::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// REST endpoint for a store path, without the auth parameter.
    ///
    /// Each segment is percent-encoded on its own, so a segment can never add
    /// path levels, a query or a fragment. Dot segments are refused.
    pub fn url_for(&self, path: &str) -> Result<String, FirebaseError> {
        let segs: Vec<&str> = path_segments(path).collect();
        let Some((last, parents)) = segs.split_last() else {
            return Err(FirebaseError::InvalidPath(path.to_string()));
        };
        if segs.iter().any(|s| matches!(*s, "." | "..")) {
            return Err(FirebaseError::InvalidPath(path.to_string()));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FirebaseError::InvalidConfig(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| FirebaseError::InvalidConfig(self.base_url.clone()))?
            .pop_if_empty()
            .extend(parents)
            .push(&format!("{last}.json"));
        Ok(url.into())
    }

    fn client(&self) -> Result<&Client, FirebaseError> {
        if let Some(c) = self.client.get() {
            return Ok(c);
        }
        let built = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FirebaseError::Http(e.to_string()))?;
        Ok(self.client.get_or_init(|| built))
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => req.query(&[("auth", token)]),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder) -> Result<reqwest::blocking::Response, FirebaseError> {
        let resp = self
            .with_auth(req)
            .send()
            .map_err(|e| FirebaseError::Http(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(FirebaseError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl Store for FirebaseStore {
    type Error = FirebaseError;

    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<(), Self::Error> {
        let url = self.url_for(path)?;
        debug!(%path, "firebase patch");
        self.send(self.client()?.patch(url).json(fields))?;
        Ok(())
    }

    fn set(&self, path: &str, value: &Value) -> Result<(), Self::Error> {
        let url = self.url_for(path)?;
        debug!(%path, "firebase put");
        self.send(self.client()?.put(url).json(value))?;
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Option<Value>, Self::Error> {
        let url = self.url_for(path)?;
        debug!(%path, "firebase get");
        let resp = self.send(self.client()?.get(url))?;
        let value: Value = resp.json().map_err(|e| FirebaseError::Serde(e.to_string()))?;
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}
