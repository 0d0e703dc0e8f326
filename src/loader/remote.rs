use anyhow::Result;
use chrono::TimeDelta;
use reqwest::blocking::Client;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::cache::TtlCache;
use crate::config::{ConfigProvider, EnvConfig};
use crate::error::LoadError;
use crate::loader::workbook::decode_workbook;
use crate::table::SheetCollection;
use crate::utils::{Clock, SystemClock, short_cause};

/// Configuration key holding the public workbook URL
pub const PUBLIC_EXCEL_URL_KEY: &str = "PUBLIC_EXCEL_URL";

/// How long a fetched workbook is reused before the URL is fetched again
pub const DEFAULT_CACHE_TTL_SECS: i64 = 600;

/// Upper bound on a single HTTP fetch, connection included
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Retrieves the raw bytes behind a URL
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher with a request timeout
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        Ok(bytes.to_vec())
    }
}

/// Loads the public equivalence workbook from the URL found in configuration
pub struct RemoteLoader {
    config: Box<dyn ConfigProvider>,
    config_key: String,
    fetcher: Box<dyn Fetcher>,
    cache: TtlCache<Arc<SheetCollection>>,
}

pub struct RemoteLoaderBuilder {
    config: Box<dyn ConfigProvider>,
    config_key: String,
    fetcher: Option<Box<dyn Fetcher>>,
    ttl: TimeDelta,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl RemoteLoaderBuilder {
    /// Create a new RemoteLoaderBuilder
    ///
    /// # Arguments
    /// * `config` - Where the workbook URL is looked up
    pub fn new(config: impl ConfigProvider + 'static) -> Self {
        RemoteLoaderBuilder {
            config: Box::new(config),
            config_key: PUBLIC_EXCEL_URL_KEY.to_string(),
            fetcher: None,
            ttl: TimeDelta::seconds(DEFAULT_CACHE_TTL_SECS),
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            clock: Arc::new(SystemClock),
        }
    }

    /// Read the URL from another configuration key
    pub fn config_key(mut self, key: impl Into<String>) -> Self {
        self.config_key = key.into();
        self
    }

    pub fn ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    /// Timeout for the default HTTP fetcher. Ignored when a custom fetcher is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the RemoteLoader, creating the HTTP client unless a fetcher was supplied
    pub fn build(self) -> Result<RemoteLoader> {
        let fetcher: Box<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(HttpFetcher::new(self.timeout)?),
        };

        Ok(RemoteLoader {
            config: self.config,
            config_key: self.config_key,
            fetcher,
            cache: TtlCache::with_clock(self.ttl, self.clock),
        })
    }
}

impl RemoteLoader {
    /// Loader backed by the process environment and `.env`, with default TTL and timeout
    pub fn from_env() -> Result<Self> {
        RemoteLoaderBuilder::new(EnvConfig::new()).build()
    }

    pub fn config_key(&self) -> &str {
        &self.config_key
    }

    /// Fetch and decode the configured workbook, reusing a cached copy while it is fresh.
    ///
    /// The URL is resolved from configuration on every call. Only successful loads are
    /// cached; failures are retried by the next call.
    #[instrument(skip(self), fields(key = %self.config_key))]
    pub fn load_from_url(&self) -> Result<Arc<SheetCollection>, LoadError> {
        let url = self.resolve_url()?;
        self.cache
            .get_or_try_insert_with(&url, || self.fetch_and_decode(&url))
    }

    /// Drop any cached workbook so the next load fetches again
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    fn resolve_url(&self) -> Result<String, LoadError> {
        match self.config.get(&self.config_key) {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => {
                warn!("Workbook URL is not configured");
                Err(LoadError::Configuration {
                    key: self.config_key.clone(),
                })
            }
        }
    }

    fn fetch_and_decode(&self, url: &str) -> Result<Arc<SheetCollection>, LoadError> {
        info!(url, "Fetching remote workbook");

        let bytes = self.fetcher.fetch(url).map_err(|e| {
            warn!(url, error = %format!("{e:#}"), "Remote workbook fetch failed");
            LoadError::Fetch {
                cause: short_cause(&format_args!("{e:#}")),
            }
        })?;

        let sheets = decode_workbook(Cursor::new(bytes)).map_err(|e| {
            warn!(url, error = %e, "Remote workbook could not be decoded");
            LoadError::Fetch {
                cause: short_cause(&e),
            }
        })?;

        if sheets.is_empty() {
            warn!(url, "Remote workbook has no sheets");
            return Err(LoadError::EmptyRemoteWorkbook);
        }

        info!(url, sheets = sheets.len(), "Remote workbook loaded");
        Ok(Arc::new(sheets))
    }
}
