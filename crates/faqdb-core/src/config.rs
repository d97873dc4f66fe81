//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nesting levels, e.g. `APP_RETRIEVAL__TOP_K=3`). Every
//! setting has a default, so running without any config file is valid.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> { Self::load_from("config.toml") }

    /// Load `path` plus its environment-specific sibling (`config.dev.toml`
    /// next to `config.toml`, selected by `RUST_ENV`), then `APP_*` overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("config");

        let mut figment = Figment::new().merge(Toml::file(path));
        let env_file = match env_name.as_str() {
            "dev" | "development" => Some("dev"),
            "prod" | "production" => Some("prod"),
            "test" | "testing" => Some("test"),
            _ => None,
        };
        if let Some(suffix) = env_file {
            figment = figment.merge(Toml::file(base_dir.join(format!("{}.{}.toml", stem, suffix))));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        tracing::debug!(env = %env_name, config = %path.display(), "configuration sources merged");

        Ok(Self { figment, base_dir })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract and validate the typed settings. Relative store paths are
    /// resolved against the directory holding the config file.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to parse settings: {}", e))?;
        settings.validate()?;
        settings.store.path = resolve_with_base(&self.base_dir, &settings.store.path).to_string_lossy().into_owned();
        if let Some(dir) = settings.embedding.model_dir.take() {
            settings.embedding.model_dir = Some(resolve_with_base(&self.base_dir, dir).to_string_lossy().into_owned());
        }
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        if self.embedding.fake_dim == 0 {
            return Err(Error::invalid_config("embedding.fake_dim must be greater than 0"));
        }
        if self.store.dim == Some(0) {
            return Err(Error::invalid_config("store.dim must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks concatenated into an answer.
    pub top_k: usize,
    /// Hits scoring below this cosine similarity are dropped. Unset keeps
    /// the top `k` unconditionally.
    pub min_score: Option<f32>,
}

impl Default for RetrievalConfig {
    fn default() -> Self { Self { top_k: 2, min_score: None } }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::invalid_config("retrieval.top_k must be greater than 0"));
        }
        if let Some(min) = self.min_score {
            if !(-1.0..=1.0).contains(&min) {
                return Err(Error::invalid_config(format!("retrieval.min_score must lie in [-1, 1], got {}", min)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Lance,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: String,
    pub table: String,
    /// Fix the embedding dimensionality up front instead of taking it from
    /// the first stored vector.
    pub dim: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Lance, path: "./faqdb_index".to_string(), table: "faq_chunks".to_string(), dim: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    Bert,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub fake_dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self { Self { provider: EmbeddingProviderKind::Bert, model_dir: None, max_len: 256, fake_dim: 384 } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
