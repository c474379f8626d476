//! Domain types shared by the scorer and the embedding backends.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Fixed-length sentence vector produced by an [`crate::Embedder`].
pub type Embedding = Vec<f32>;

/// Text of one input file, kept together with where it came from.
///
/// - `path`: the path as given by the caller, used in error messages
/// - `text`: full file contents, verbatim; the file must be valid UTF-8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

impl Document {
    pub fn read(path: &Path) -> Result<Self> {
        // Invalid UTF-8 surfaces as `InvalidData` and is an I/O failure like any other.
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self { path: path.to_path_buf(), text })
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Empty or whitespace-only input carries nothing to compare.
    pub fn require_text(&self) -> Result<()> {
        if self.is_blank() {
            return Err(Error::DegenerateInput(format!("{} is empty", self.path.display())));
        }
        Ok(())
    }
}
