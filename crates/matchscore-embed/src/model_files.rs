//! Locating model files on disk, fetching them from the Hugging Face hub
//! into the model cache when nothing local is available.

use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use matchscore_core::config::Settings;

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const SAFETENSORS_FILE: &str = "model.safetensors";
pub const PICKLE_FILE: &str = "pytorch_model.bin";

/// Files fetched on a cache miss.
pub const DOWNLOAD_FILES: [&str; 3] = [CONFIG_FILE, TOKENIZER_FILE, SAFETENSORS_FILE];

const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

/// Weights file inside `dir`, preferring safetensors.
pub fn weights_path(dir: &Path) -> Option<PathBuf> {
    [SAFETENSORS_FILE, PICKLE_FILE].iter().map(|f| dir.join(f)).find(|p| p.is_file())
}

pub fn is_complete(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).is_file() && dir.join(TOKENIZER_FILE).is_file() && weights_path(dir).is_some()
}

/// `org/name` -> `org--name`, safe as a single path component.
pub fn cache_key(model_id: &str) -> String {
    model_id.trim_matches('/').replace('/', "--")
}

pub fn resolve_model_dir(settings: &Settings) -> Result<PathBuf> {
    if let Some(p) = settings.model_dir_path() {
        if p.exists() { tracing::info!(dir = %p.display(), "using configured model_dir"); return Ok(p); }
        tracing::warn!(dir = %p.display(), "configured model_dir does not exist, ignoring");
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() { tracing::info!(dir = %p.display(), "using MODEL_DIR"); return Ok(p); }
    }
    let short_name = settings.model_id.rsplit('/').next().unwrap_or(settings.model_id.as_str());
    let local = Path::new("models").join(short_name);
    if is_complete(&local) { tracing::info!(dir = %local.display(), "using local model dir"); return Ok(local); }

    let cached = settings.cache_dir_path().join(cache_key(&settings.model_id));
    if is_complete(&cached) { tracing::info!(dir = %cached.display(), "using cached model"); return Ok(cached); }

    if settings.offline {
        bail!("model {} not found locally and offline mode is enabled (looked in {})", settings.model_id, cached.display());
    }
    download_model(&hub_endpoint(), &settings.model_id, &settings.revision, &cached)?;
    Ok(cached)
}

fn hub_endpoint() -> String {
    std::env::var("HF_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
}

pub fn file_url(endpoint: &str, model_id: &str, revision: &str, file: &str) -> String {
    format!("{}/{}/resolve/{}/{}", endpoint.trim_end_matches('/'), model_id.trim_matches('/'), revision, file)
}

pub fn download_model(endpoint: &str, model_id: &str, revision: &str, dest: &Path) -> Result<()> {
    tracing::info!(model_id, revision, dest = %dest.display(), "downloading model");
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let client = reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .user_agent(concat!("matchscore/", env!("CARGO_PKG_VERSION")))
        .build()?;
    for file in DOWNLOAD_FILES {
        let target = dest.join(file);
        if target.is_file() { tracing::debug!(file, "already present"); continue; }
        download_file(&client, &file_url(endpoint, model_id, revision, file), &target)?;
    }
    Ok(())
}

/// Streams `url` into `target` through a temp file in the same directory so an
/// interrupted download never leaves a truncated file behind.
fn download_file(client: &reqwest::blocking::Client, url: &str, target: &Path) -> Result<()> {
    let dir = target.parent().ok_or_else(|| anyhow!("{} has no parent directory", target.display()))?;
    let response = client.get(url).send()
        .with_context(|| format!("Request to {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Download of {} failed", url))?;

    let pb = ProgressBar::new(response.content_length().unwrap_or(0));
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")?.progress_chars("#>-"));
    pb.set_message(target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    let written = std::io::copy(&mut pb.wrap_read(response), tmp.as_file_mut())
        .with_context(|| format!("Failed while reading {}", url))?;
    tmp.persist(target).with_context(|| format!("Failed to write {}", target.display()))?;
    pb.finish_and_clear();
    tracing::debug!(url, bytes = written, "downloaded");
    Ok(())
}
