//! Versioned response cache with a network-first policy.
//!
//! [`CacheWorker`] reacts to the three lifecycle events of an offline cache:
//!
//! - **install** - fetch the asset manifest into the current generation
//! - **fetch** - network first; 200 responses are stored, network failures
//!   fall back to any cached copy, then to the root document for navigations
//! - **activate** - delete every generation except the current one
//!
//! Nothing is retried. A network failure is either masked by a cached copy
//! or reported once.

pub mod network;
pub mod storage;

pub use network::{HttpNetwork, Network};
pub use storage::{CacheStorage, MemoryCacheStorage, SqliteCacheStorage};

use crate::{Error, Result};
use serde::Serialize;

/// Default cache generation name
pub const DEFAULT_CACHE_NAME: &str = "hubdeck-v1";

/// Document served for navigations that are neither online nor cached
pub const DEFAULT_OFFLINE_FALLBACK: &str = "/index.html";

/// Tag handled by [`CacheWorker::sync`]
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// Assets cached at install time when no manifest is configured.
pub const DEFAULT_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/app.js",
    "/manifest.json",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

/// How a request was initiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// Top-level page load
    Navigate,
    #[default]
    Subresource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub mode: RequestMode,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Subresource,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Where a fetched response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Network,
    Cache,
    /// The root document served in place of an uncached navigation
    Fallback,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub cache: String,
    pub cached: Vec<String>,
}

/// Worker settings.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub cache_name: String,
    /// Base for relative URLs, e.g. `http://localhost:8080`
    pub origin: String,
    pub manifest: Vec<String>,
    pub offline_fallback: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            origin: String::new(),
            manifest: DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect(),
            offline_fallback: DEFAULT_OFFLINE_FALLBACK.to_string(),
        }
    }
}

pub struct CacheWorker<N, C> {
    network: N,
    caches: C,
    settings: CacheSettings,
}

impl<N: Network, C: CacheStorage> CacheWorker<N, C> {
    pub fn new(network: N, caches: C, settings: CacheSettings) -> Self {
        Self {
            network,
            caches,
            settings,
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.settings.cache_name
    }

    pub fn caches(&self) -> &C {
        &self.caches
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Absolute cache key for a URL or origin-relative path.
    pub fn resolve(&self, url: &str) -> String {
        if url.contains("://") || self.settings.origin.is_empty() {
            return url.to_string();
        }
        let origin = self.settings.origin.trim_end_matches('/');
        if url.starts_with('/') {
            format!("{}{}", origin, url)
        } else {
            format!("{}/{}", origin, url)
        }
    }

    /// Populate the current generation with the manifest.
    ///
    /// Every asset is fetched before anything is written, so a failed
    /// install leaves the cache untouched.
    pub fn install(&mut self) -> Result<InstallReport> {
        let mut fetched = Vec::with_capacity(self.settings.manifest.len());
        for asset in &self.settings.manifest {
            let url = self.resolve(asset);
            let response = self.network.fetch(&Request::get(url.clone()))?;
            if !response.is_ok() {
                return Err(Error::Other(format!(
                    "install failed: {} returned HTTP {}",
                    url, response.status
                )));
            }
            fetched.push((url, response));
        }

        let name = self.settings.cache_name.clone();
        self.caches.open(&name)?;
        for (url, response) in &fetched {
            self.caches.put(&name, url, response)?;
        }
        tracing::info!(cache = %name, count = fetched.len(), "opened cache");

        Ok(InstallReport {
            cache: name,
            cached: fetched.into_iter().map(|(url, _)| url).collect(),
        })
    }

    /// Network first, cache fallback.
    pub fn fetch(&mut self, request: &Request) -> Result<FetchOutcome> {
        let url = self.resolve(&request.url);
        let resolved = Request {
            url: url.clone(),
            mode: request.mode,
        };

        match self.network.fetch(&resolved) {
            Ok(response) => {
                if response.status == 200 {
                    let name = self.settings.cache_name.clone();
                    if let Err(e) = self.caches.put(&name, &url, &response) {
                        tracing::warn!(%url, cache = %name, error = %e, "failed to cache response");
                    }
                }
                Ok(FetchOutcome {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(network_err) => {
                tracing::debug!(%url, error = %network_err, "network failed, trying cache");
                if let Some(response) = self.caches.match_any(&url)? {
                    return Ok(FetchOutcome {
                        response,
                        source: ResponseSource::Cache,
                    });
                }
                if request.mode == RequestMode::Navigate {
                    let fallback = self.resolve(&self.settings.offline_fallback);
                    if let Some(response) = self.caches.match_any(&fallback)? {
                        return Ok(FetchOutcome {
                            response,
                            source: ResponseSource::Fallback,
                        });
                    }
                }
                Err(Error::Offline(format!(
                    "network unavailable and {} is not cached",
                    url
                )))
            }
        }
    }

    /// Delete every generation except the current one.
    pub fn activate(&mut self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.caches.keys()? {
            if name != self.settings.cache_name {
                tracing::info!(cache = %name, "deleting old cache");
                self.caches.delete(&name)?;
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Background sync event. Returns whether the tag was handled.
    pub fn sync(&mut self, tag: &str) -> bool {
        if tag == BACKGROUND_SYNC_TAG {
            tracing::info!("background sync triggered");
            true
        } else {
            tracing::debug!(tag, "ignoring sync tag");
            false
        }
    }
}
