//! Deterministic embedder for tests and offline demos.
//!
//! Every image maps to the same configured vector; each known text maps to
//! its configured vector and unknown texts to a zero vector (which scores a
//! cosine of 0 against anything). The image file must exist, so callers
//! still exercise upload staging. Either side can be set to fail, which
//! stands in for an undecodable photo or a broken model.

use super::{Embedder, VisionError, VisionResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Embedder returning preconfigured vectors
#[derive(Debug)]
pub struct FixedEmbedder {
    image: Vec<f32>,
    texts: HashMap<String, Vec<f32>>,
    image_error: Option<String>,
    text_error: Option<String>,
    last_image: Mutex<Option<PathBuf>>,
}

impl FixedEmbedder {
    /// Creates an embedder returning `image` for every image.
    pub fn new(image: Vec<f32>) -> Self {
        Self {
            image,
            texts: HashMap::new(),
            image_error: None,
            text_error: None,
            last_image: Mutex::new(None),
        }
    }

    /// Registers the vector returned for `text`.
    pub fn with_text(mut self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.texts.insert(text.into(), embedding);
        self
    }

    /// Makes `embed_image` fail with [`VisionError::ImageEmbedding`] after
    /// recording the path.
    pub fn with_image_error(mut self, message: impl Into<String>) -> Self {
        self.image_error = Some(message.into());
        self
    }

    /// Makes `embed_texts` fail with [`VisionError::TextEmbedding`].
    pub fn with_text_error(mut self, message: impl Into<String>) -> Self {
        self.text_error = Some(message.into());
        self
    }

    /// Path of the most recently embedded image.
    pub fn last_image_path(&self) -> Option<PathBuf> {
        self.last_image.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Embedder for FixedEmbedder {
    fn model_name(&self) -> &str {
        "fixed"
    }

    fn embed_image(&self, path: &Path) -> VisionResult<Vec<f32>> {
        if !path.is_file() {
            return Err(VisionError::ImageEmbedding(format!(
                "{} is not a readable file",
                path.display()
            )));
        }

        if let Ok(mut last) = self.last_image.lock() {
            *last = Some(path.to_path_buf());
        }

        if let Some(message) = &self.image_error {
            return Err(VisionError::ImageEmbedding(message.clone()));
        }

        Ok(self.image.clone())
    }

    fn embed_texts(&self, texts: &[String]) -> VisionResult<Vec<Vec<f32>>> {
        if let Some(message) = &self.text_error {
            return Err(VisionError::TextEmbedding(message.clone()));
        }

        Ok(texts
            .iter()
            .map(|t| {
                self.texts
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0; self.image.len()])
            })
            .collect())
    }
}
