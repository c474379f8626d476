use matchscore_core::config::Config;
use matchscore_core::Embedder;
use matchscore_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = get_default_embedder(&settings)?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={} max_len={}", embs.len(), embedder.dim(), embedder.max_len());
    Ok(())
}
