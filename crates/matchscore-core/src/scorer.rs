//! Resume / job-description scoring on top of any [`Embedder`].

use std::path::Path;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::similarity::cosine_similarity;
use crate::traits::Embedder;
use crate::types::Document;

/// Holds a loaded embedder so several comparisons can share one model.
pub struct Scorer<E: Embedder> {
    embedder: E,
}

impl<E: Embedder> Scorer<E> {
    pub fn new(embedder: E) -> Self { Self { embedder } }

    pub fn embedder(&self) -> &E { &self.embedder }

    /// Reads both files and scores them. Either path failing to read is an
    /// [`Error::Io`] naming that path.
    pub fn score_files(&self, resume: &Path, job_description: &Path) -> Result<f32> {
        let resume = Document::read(resume)?;
        let job_description = Document::read(job_description)?;
        self.score_documents(&resume, &job_description)
    }

    /// Blank documents fail with [`Error::DegenerateInput`] naming the file.
    pub fn score_documents(&self, resume: &Document, job_description: &Document) -> Result<f32> {
        resume.require_text()?;
        job_description.require_text()?;
        self.compare(&resume.text, &job_description.text)
    }

    /// Cosine similarity of the two texts' embeddings, in `[-1, 1]`.
    pub fn score_texts(&self, a: &str, b: &str) -> Result<f32> {
        if a.trim().is_empty() || b.trim().is_empty() {
            return Err(Error::DegenerateInput("input text is empty".into()));
        }
        self.compare(a, b)
    }

    fn compare(&self, a: &str, b: &str) -> Result<f32> {
        let start = Instant::now();
        let emb_a = self.embedder.embed_text(a)?;
        let emb_b = self.embedder.embed_text(b)?;
        for emb in [&emb_a, &emb_b] {
            if emb.len() != self.embedder.dim() {
                return Err(Error::DimensionMismatch { left: emb.len(), right: self.embedder.dim() });
            }
        }
        let score = cosine_similarity(&emb_a, &emb_b)?;
        tracing::debug!(score, elapsed_ms = start.elapsed().as_millis() as u64, "scored pair");
        Ok(score)
    }
}
