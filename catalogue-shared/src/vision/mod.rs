//! Image-to-component matching with a vision-language model.
//!
//! An [`Embedder`] turns an image file and a list of component names into
//! vectors in a shared space. [`ImageMatcher`] scores the names against the
//! image (CLIP zero-shot softmax) and applies the acceptance threshold.
//!
//! Implementations:
//! - **`ClipEmbedder`** (feature `clip`): CLIP ViT-B/32 image and text
//!   encoders run locally through fastembed.
//! - **[`FixedEmbedder`]**: deterministic vectors for tests and demos.
//!
//! The embedder is built once at startup and shared read-only. Scoring is
//! CPU-bound and blocking; async callers run it on `spawn_blocking`.

#[cfg(feature = "clip")]
mod clip;
mod fixed;
pub mod similarity;
pub mod upload;

#[cfg(feature = "clip")]
pub use clip::{ClipConfig, ClipEmbedder};
pub use fixed::FixedEmbedder;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Default minimum score for an image search to count as a match
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.60;

/// CLIP's learned temperature (`exp(4.6052)`), applied before the softmax
pub const DEFAULT_LOGIT_SCALE: f32 = 100.0;

/// Errors raised while embedding or scoring
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The model could not be loaded
    #[error("Failed to load embedding model: {0}")]
    ModelLoad(String),

    /// The uploaded file could not be embedded (unreadable or not an image)
    #[error("Failed to embed image: {0}")]
    ImageEmbedding(String),

    /// Text encoding failed
    #[error("Failed to embed text: {0}")]
    TextEmbedding(String),

    /// The embedder returned a different number of vectors than requested
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// Shared model state is unusable (poisoned lock)
    #[error("Embedding model unavailable: {0}")]
    Unavailable(String),
}

/// Vision result type alias
pub type VisionResult<T> = Result<T, VisionError>;

/// Encodes images and texts into one embedding space.
pub trait Embedder: Send + Sync {
    /// Model identifier, for logs and health output
    fn model_name(&self) -> &str;

    /// Embeds the image stored at `path`.
    fn embed_image(&self, path: &Path) -> VisionResult<Vec<f32>>;

    /// Embeds each text, preserving order.
    fn embed_texts(&self, texts: &[String]) -> VisionResult<Vec<Vec<f32>>>;
}

/// Where inference runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceDevice {
    /// GPU when the runtime provides one, CPU otherwise
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl FromStr for InferenceDevice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!("Unknown inference device: {}", other)),
        }
    }
}

impl fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
        }
    }
}

/// Best-scoring candidate of one search
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    /// Candidate component name
    pub name: String,

    /// Softmax probability in `[0, 1]`
    pub score: f32,

    /// Whether `score` reached the matcher's threshold
    pub accepted: bool,
}

/// Scores component names against an uploaded image
pub struct ImageMatcher {
    embedder: Arc<dyn Embedder>,
    logit_scale: f32,
    threshold: f32,
}

impl ImageMatcher {
    pub fn new(embedder: Arc<dyn Embedder>, logit_scale: f32, threshold: f32) -> Self {
        Self {
            embedder,
            logit_scale,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Probability of each candidate name for the image; sums to 1.
    ///
    /// Empty `candidates` yields an empty vector without running the model.
    pub fn score(&self, image: &Path, candidates: &[String]) -> VisionResult<Vec<f32>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let image_embedding = self.embedder.embed_image(image)?;
        let text_embeddings = self.embedder.embed_texts(candidates)?;

        if text_embeddings.len() != candidates.len() {
            return Err(VisionError::CountMismatch {
                expected: candidates.len(),
                actual: text_embeddings.len(),
            });
        }

        Ok(similarity::zero_shot_scores(
            &image_embedding,
            &text_embeddings,
            self.logit_scale,
        ))
    }

    /// The highest-scoring candidate, or `None` when there are no candidates.
    pub fn best_match(&self, image: &Path, candidates: &[String]) -> VisionResult<Option<ScoredMatch>> {
        let scores = self.score(image, candidates)?;

        let Some((index, score)) = similarity::argmax(&scores) else {
            return Ok(None);
        };

        let best = ScoredMatch {
            name: candidates[index].clone(),
            score,
            accepted: score >= self.threshold,
        };

        debug!(
            candidate = %best.name,
            score = best.score,
            accepted = best.accepted,
            candidates = candidates.len(),
            "Scored uploaded image"
        );

        Ok(Some(best))
    }
}
