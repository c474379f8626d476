//! Local sentence embeddings with candle.
//!
//! [`MiniLmEmbedder`] runs a BERT-family sentence encoder
//! (`all-MiniLM-L6-v2` by default): tokenize, forward pass, attention-masked
//! mean pooling, L2 normalisation. [`FakeEmbedder`] is a deterministic hashing
//! stand-in for tests, selected with `use_fake_embeddings`.

use anyhow::{Context, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;

use matchscore_core::config::Settings;
use matchscore_core::types::Embedding;
use matchscore_core::{Embedder, Error, Result};

pub mod device;
pub mod model_files;
pub mod pool;
pub mod tokenize;

pub use device::select_device;
pub use pool::masked_mean_l2;

/// Output width of the fake embedder, matching MiniLM.
pub const FAKE_DIM: usize = 384;

pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    model_dir: PathBuf,
}

impl MiniLmEmbedder {
    /// Resolve (and if needed download) the configured model, then load it.
    pub fn load(settings: &Settings) -> Result<Self> {
        let start = Instant::now();
        let device = select_device();
        let model_dir = model_files::resolve_model_dir(settings).map_err(|e| Error::ModelLoad(format!("{e:#}")))?;
        let embedder = Self::from_dir(&model_dir, settings.max_len, device)
            .map_err(|e| Error::ModelLoad(format!("{}: {e:#}", model_dir.display())))?;
        tracing::info!(dir = %model_dir.display(), dim = embedder.dim, elapsed_ms = start.elapsed().as_millis() as u64, "model loaded");
        Ok(embedder)
    }

    pub fn from_dir(model_dir: &Path, max_len: usize, device: Device) -> anyhow::Result<Self> {
        tracing::debug!("loading tokenizer");
        let tokenizer_path = model_dir.join(model_files::TOKENIZER_FILE);
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        tracing::debug!("loading model config");
        let config_path = model_dir.join(model_files::CONFIG_FILE);
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        let shape: serde_json::Value = serde_json::from_str(&raw_config)?;
        let dim = shape["hidden_size"].as_u64().ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;
        let max_positions = shape["max_position_embeddings"].as_u64().map_or(max_len, |n| n as usize);
        let max_len = max_len.min(max_positions);
        tokenize::configure_truncation(&mut tokenizer, max_len)?;

        tracing::debug!("loading model weights");
        let weights_path = model_files::weights_path(model_dir)
            .ok_or_else(|| anyhow!("no {} or {} in {}", model_files::SAFETENSORS_FILE, model_files::PICKLE_FILE, model_dir.display()))?;
        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            // SAFETY: the file is memory-mapped read-only and not modified while the model is alive.
            unsafe { VarBuilder::from_mmaped_safetensors(&[&weights_path], DTYPE, &device)? }
        } else {
            let weights = candle_core::pickle::read_all(&weights_path)?;
            let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
            VarBuilder::from_tensors(weights_map, DTYPE, &device)
        };
        let model = BertModel::load(vb, &config)?;

        Ok(Self { model, tokenizer, device, dim, max_len, model_dir: model_dir.to_path_buf() })
    }

    pub fn model_dir(&self) -> &Path { &self.model_dir }

    fn forward(&self, text: &str) -> anyhow::Result<Embedding> {
        let start = Instant::now();
        let enc = tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let hidden = self.model.forward(&enc.input_ids, &enc.token_type_ids, Some(&enc.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &enc.attention_mask)?;
        let emb = pooled.squeeze(0)?.to_dtype(DType::F32)?.to_device(&Device::Cpu)?.to_vec1::<f32>()?;
        anyhow::ensure!(emb.len() == self.dim, "expected {} dims, got {}", self.dim, emb.len());
        let tokens = enc.input_ids.dim(1)?;
        tracing::debug!(tokens, elapsed_ms = start.elapsed().as_millis() as u64, "embedded text");
        Ok(emb)
    }
}

impl Embedder for MiniLmEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_text(&self, text: &str) -> Result<Embedding> {
        self.forward(text).map_err(|e| Error::Embedding(format!("{e:#}")))
    }
}

/// Hashes whitespace tokens into buckets; identical texts map to identical
/// vectors, overlapping vocabularies to nearby ones. Not semantic.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder { pub fn new(dim: usize) -> Self { Self { dim } } }

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_text(&self, text: &str) -> Result<Embedding> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if token.is_empty() { continue; }
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        Ok(v)
    }
}

pub fn get_default_embedder(settings: &Settings) -> Result<Box<dyn Embedder>> {
    if settings.use_fake_embeddings {
        tracing::warn!("using FakeEmbedder, scores are not semantic");
        return Ok(Box::new(FakeEmbedder::new(FAKE_DIM)));
    }
    Ok(Box::new(MiniLmEmbedder::load(settings)?))
}
