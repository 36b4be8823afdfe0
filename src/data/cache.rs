//! Local data caching
//!
//! Caches option chain snapshots on disk to cut API calls and allow offline
//! surface building.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::OptionChainSource;
use crate::core::{OptionChainSnapshot, PricerResult};

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Maximum age before refresh (in hours)
    pub max_age_hours: i64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            max_age_hours: 24,
            enabled: true,
        }
    }
}

/// Data cache manager
pub struct DataCache {
    config: CacheConfig,
}

impl DataCache {
    pub fn new(config: CacheConfig) -> PricerResult<Self> {
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }

        Ok(Self { config })
    }

    fn chain_path(&self, symbol: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{}_chain.json", symbol.to_ascii_uppercase()))
    }

    /// Cached chain exists and is younger than the max age
    pub fn is_valid(&self, symbol: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        let modified = fs::metadata(self.chain_path(symbol)).and_then(|m| m.modified());
        match modified {
            Ok(modified) => {
                let modified: DateTime<Utc> = modified.into();
                Utc::now() - modified < Duration::hours(self.config.max_age_hours)
            }
            Err(_) => false,
        }
    }

    pub fn save_chain(&self, chain: &OptionChainSnapshot) -> PricerResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.chain_path(&chain.symbol);
        fs::write(&path, serde_json::to_string_pretty(chain)?)?;

        tracing::info!("cached {} quotes for {} at {:?}", chain.len(), chain.symbol, path);
        Ok(())
    }

    pub fn load_chain(&self, symbol: &str) -> PricerResult<Option<OptionChainSnapshot>> {
        if !self.is_valid(symbol) {
            return Ok(None);
        }

        let json = fs::read_to_string(self.chain_path(symbol))?;
        let chain: OptionChainSnapshot = serde_json::from_str(&json)?;

        tracing::info!("loaded chain for {} from cache", symbol);
        Ok(Some(chain))
    }

    pub fn clear(&self, symbol: &str) -> PricerResult<()> {
        let path = self.chain_path(symbol);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Symbols with a cached chain
    pub fn list_cached(&self) -> PricerResult<Vec<String>> {
        let mut symbols = Vec::new();

        if !self.config.cache_dir.exists() {
            return Ok(symbols);
        }

        for entry in fs::read_dir(&self.config.cache_dir)? {
            let file_name = entry?.file_name().to_string_lossy().to_string();
            if let Some(symbol) = file_name.strip_suffix("_chain.json") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

/// Chain source that answers from cache and refills it from `inner`
pub struct CachedChainSource<S> {
    cache: DataCache,
    inner: S,
}

impl<S: OptionChainSource> CachedChainSource<S> {
    pub fn new(inner: S, config: CacheConfig) -> PricerResult<Self> {
        Ok(Self {
            cache: DataCache::new(config)?,
            inner,
        })
    }

    /// Force a fresh fetch
    pub fn refresh(&self, symbol: &str) -> PricerResult<OptionChainSnapshot> {
        self.cache.clear(symbol)?;
        self.option_chain(symbol)
    }
}

impl<S: OptionChainSource> OptionChainSource for CachedChainSource<S> {
    fn option_chain(&self, symbol: &str) -> PricerResult<OptionChainSnapshot> {
        if let Some(chain) = self.cache.load_chain(symbol)? {
            return Ok(chain);
        }

        tracing::info!("fetching fresh chain for {}", symbol);
        let chain = self.inner.option_chain(symbol)?;

        // Empty chains are usually transient upstream failures
        if !chain.is_empty() {
            self.cache.save_chain(&chain)?;
        }
        Ok(chain)
    }
}
