//! Embedding providers behind `faqdb_core::traits::Embedder`.
//!
//! `SentenceEmbedder` runs a BERT-family sentence-transformer (e.g.
//! all-MiniLM-L6-v2) with candle; `FakeEmbedder` is a deterministic hashing
//! stand-in for tests and offline development.

mod device;
mod pool;
mod tokenize;

pub use device::select_device;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_on_device;

use anyhow::{Result as AnyResult, anyhow};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use faqdb_core::config::{EmbeddingConfig, EmbeddingProviderKind};
use faqdb_core::traits::Embedder;
use faqdb_core::{Error, Result};

const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";
const BERT_PAD_ID: u32 = 0;

pub struct SentenceEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl SentenceEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> AnyResult<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading sentence-transformer");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let shape: serde_json::Value = serde_json::from_str(&raw_config)?;
        let dim = shape["hidden_size"].as_u64().ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;
        let max_positions = shape["max_position_embeddings"].as_u64().unwrap_or(512) as usize;
        let safetensors = model_dir.join("model.safetensors");
        let weights: std::collections::HashMap<String, Tensor> = if safetensors.exists() {
            candle_core::safetensors::load(&safetensors, &device)?
        } else {
            candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?.into_iter().collect()
        };
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        let max_len = max_len.min(max_positions);
        tracing::info!(dim, max_len, "sentence-transformer loaded");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    fn embed_text(&self, text: &str) -> AnyResult<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, BERT_PAD_ID, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        if emb.len() != self.dim { return Err(anyhow!("model produced {} values, expected {}", emb.len(), self.dim)); }
        if start.elapsed().as_millis() > 100 { tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "slow embedding"); }
        Ok(emb)
    }
}

impl Embedder for SentenceEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed(&self, text: &str) -> Result<Vec<f32>> { self.embed_text(text).map_err(Error::embedding) }
}

/// Deterministic bag-of-words hashing embedder. Identical input always yields
/// the identical L2-normalised vector.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder { pub fn new(dim: usize) -> Self { Self { dim } } }

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher}; use twox_hash::XxHash64;
        if self.dim == 0 { return Err(Error::invalid_config("FakeEmbedder dimension must be greater than 0")); }
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6); for x in &mut v { *x /= norm; } Ok(v)
    }
}

/// Build the embedder selected by configuration.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the fake provider regardless of config.
pub fn get_default_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    if use_fake || config.provider == EmbeddingProviderKind::Fake {
        tracing::info!(dim = config.fake_dim, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(config.fake_dim)));
    }
    let model_dir = resolve_model_dir(config.model_dir.as_deref())?;
    let model = SentenceEmbedder::load(&model_dir, config.max_len).map_err(Error::embedding)?;
    Ok(Box::new(model))
}

/// An explicitly configured directory is used as-is; the env vars and
/// `models/` fallbacks only apply when none is configured.
fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = PathBuf::from(dir);
        if p.join("config.json").exists() { return Ok(p); }
        return Err(Error::EmbeddingUnavailable(format!("no model found in configured model_dir {}", p.display())));
    }
    let candidates = std::env::var("APP_MODEL_DIR").ok().map(PathBuf::from).into_iter()
        .chain(std::env::var("MODEL_DIR").ok().map(PathBuf::from))
        .chain([Path::new("models").join(DEFAULT_MODEL), Path::new("../models").join(DEFAULT_MODEL)]);
    for p in candidates {
        if p.join("config.json").exists() { tracing::debug!(dir = %p.display(), "model dir resolved"); return Ok(p); }
    }
    Err(Error::EmbeddingUnavailable(format!("could not locate {} model directory (set embedding.model_dir or APP_MODEL_DIR)", DEFAULT_MODEL)))
}
