//! Client configuration and URL composition.
//!
//! # Design
//! The base URL lives in an explicit `ClientConfig` value that is built once
//! and handed to the client, instead of process-wide state. A config can
//! only be obtained through a constructor that checks the URL, so "used
//! before initialization" cannot happen at call time.

use url::Url;

use crate::error::ConfigError;

/// Environment variable read by `ClientConfig::from_env`.
pub const BASE_URL_ENV: &str = "STORY_SCHEMATICS_API";

/// Arguments of `init`.
#[derive(Debug, Clone)]
pub struct InitProps {
    /// The URL of the API server.
    pub base_url: String,
}

/// Build the configuration every resource operation is issued against.
pub fn init(props: InitProps) -> Result<ClientConfig, ConfigError> {
    ClientConfig::new(&props.base_url)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    /// A trailing `/` on `base_url` is dropped so that paths can be appended
    /// verbatim.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::MissingBaseUrl(BASE_URL_ENV));
        }
        Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
            url: trimmed.to_string(),
            source,
        })?;
        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Read the base URL from `STORY_SCHEMATICS_API`, loading `.env` first if
    /// one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var(BASE_URL_ENV).map_err(|_| ConfigError::MissingBaseUrl(BASE_URL_ENV))?;
        Self::new(&base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path`, with `query` attached when it has any pairs.
    pub fn api_path(&self, path: &str, query: Option<&QueryParams>) -> Result<Url, ConfigError> {
        let raw = format!("{}{path}", self.base_url);
        let mut url = Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl {
            url: raw.clone(),
            source,
        })?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(query.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

/// Ordered `application/x-www-form-urlencoded` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
        self
    }

    /// Set `key` only for present, non-zero values. Zero limits and offsets
    /// are the server defaults and are not sent.
    pub fn set_count(&mut self, key: &str, value: Option<u32>) -> &mut Self {
        if let Some(value) = value.filter(|v| *v > 0) {
            self.set(key, value);
        }
        self
    }

    pub fn set_opt(&mut self, key: &str, value: Option<impl ToString>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
