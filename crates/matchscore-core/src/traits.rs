use crate::error::Result;
use crate::types::Embedding;

/// Text in, fixed-length float vector out. Implementations must be
/// deterministic for a given model version.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_text(&self, text: &str) -> Result<Embedding>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn dim(&self) -> usize { (**self).dim() }
    fn max_len(&self) -> usize { (**self).max_len() }
    fn embed_text(&self, text: &str) -> Result<Embedding> { (**self).embed_text(text) }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> { (**self).embed_batch(texts) }
}
