//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TRIAGE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::constants::{
    DEFAULT_CACHE_SIZE, DEFAULT_CACHE_TTL_SECS, DEFAULT_EMBEDDING_DIM,
    DEFAULT_NEAR_AMBIGUOUS_THRESHOLD, DEFAULT_MIN_SIMILARITY,
};
use crate::retrieval::RetrieverConfig;
use crate::scoring::ScorerConfig;

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TRIAGE_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the per-category index artifacts. Default: `./.data/indices`.
    pub index_dir: PathBuf,

    /// JSON Lines FAQ dataset used to (re)build indices.
    pub dataset_path: Option<PathBuf>,

    /// Max entries per query cache. Default: `1000`.
    pub cache_size: u64,

    /// Query cache entry lifetime. Default: one hour.
    pub cache_ttl: Duration,

    /// Margin below which a classification is flagged near-ambiguous. Default: `0.05`.
    pub near_ambiguous_threshold: f64,

    /// Similarity gate for retrieved answers. Default: `0.7`.
    pub min_similarity: f32,

    /// Upper bound on one embedder call. Default: none.
    pub embed_timeout: Option<Duration>,

    /// Dimension of the bundled hashing embedder. Default: `256`.
    pub embedding_dim: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./.data/indices"),
            dataset_path: None,
            cache_size: DEFAULT_CACHE_SIZE,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            near_ambiguous_threshold: DEFAULT_NEAR_AMBIGUOUS_THRESHOLD,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            embed_timeout: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl Config {
    const ENV_INDEX_DIR: &'static str = "TRIAGE_INDEX_DIR";
    const ENV_DATASET_PATH: &'static str = "TRIAGE_DATASET_PATH";
    const ENV_CACHE_SIZE: &'static str = "TRIAGE_CACHE_SIZE";
    const ENV_CACHE_TTL_SECS: &'static str = "TRIAGE_CACHE_TTL_SECS";
    const ENV_NEAR_AMBIGUOUS: &'static str = "TRIAGE_NEAR_AMBIGUOUS_THRESHOLD";
    const ENV_MIN_SIMILARITY: &'static str = "TRIAGE_MIN_SIMILARITY";
    const ENV_EMBED_TIMEOUT_MS: &'static str = "TRIAGE_EMBED_TIMEOUT_MS";
    const ENV_EMBEDDING_DIM: &'static str = "TRIAGE_EMBEDDING_DIM";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            index_dir: Self::parse_path_from_env(Self::ENV_INDEX_DIR, defaults.index_dir),
            dataset_path: Self::parse_optional_path_from_env(Self::ENV_DATASET_PATH),
            cache_size: Self::parse_from_env(Self::ENV_CACHE_SIZE, defaults.cache_size)?,
            cache_ttl: Duration::from_secs(Self::parse_from_env(
                Self::ENV_CACHE_TTL_SECS,
                defaults.cache_ttl.as_secs(),
            )?),
            near_ambiguous_threshold: Self::parse_from_env(
                Self::ENV_NEAR_AMBIGUOUS,
                defaults.near_ambiguous_threshold,
            )?,
            min_similarity: Self::parse_from_env(Self::ENV_MIN_SIMILARITY, defaults.min_similarity)?,
            embed_timeout: Self::parse_optional_from_env::<u64>(Self::ENV_EMBED_TIMEOUT_MS)?
                .map(Duration::from_millis),
            embedding_dim: Self::parse_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges and paths (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_dir.exists() && !self.index_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.index_dir.clone(),
            });
        }

        if let Some(ref path) = self.dataset_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if self.cache_size == 0 {
            return Err(ConfigError::Zero {
                name: Self::ENV_CACHE_SIZE,
            });
        }
        if self.embedding_dim == 0 {
            return Err(ConfigError::Zero {
                name: Self::ENV_EMBEDDING_DIM,
            });
        }
        if self.embed_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Zero {
                name: Self::ENV_EMBED_TIMEOUT_MS,
            });
        }

        Self::check_threshold(Self::ENV_NEAR_AMBIGUOUS, self.near_ambiguous_threshold)?;
        Self::check_threshold(Self::ENV_MIN_SIMILARITY, f64::from(self.min_similarity))?;

        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.cache_size)
            .ttl(self.cache_ttl)
    }

    pub fn scorer_config(&self) -> ScorerConfig {
        ScorerConfig::default().with_near_ambiguous_threshold(self.near_ambiguous_threshold)
    }

    pub fn retriever_config(&self) -> RetrieverConfig {
        let config = RetrieverConfig::default().with_min_similarity(self.min_similarity);
        match self.embed_timeout {
            Some(timeout) => config.with_embed_timeout(timeout),
            None => config,
        }
    }

    fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ThresholdOutOfRange { name, value });
        }
        Ok(())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(Self::parse_optional_from_env(var_name)?.unwrap_or(default))
    }

    fn parse_optional_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Ok(value) = env::var(var_name) else {
            return Ok(None);
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: var_name,
                value: value.clone(),
                reason: e.to_string(),
            })
    }
}
