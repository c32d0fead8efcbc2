//! CLIP ViT-B/32 through fastembed.
//!
//! Both encoders are ONNX sessions downloaded from the Hugging Face hub on
//! first use and cached in `cache_dir`. fastembed sessions need exclusive
//! access while running, so each encoder sits behind its own mutex.
//!
//! The requested [`InferenceDevice`] becomes an ordered list of ONNX Runtime
//! execution providers. CUDA is only registered in builds with the `cuda`
//! feature; ONNX Runtime skips a provider it cannot initialise, so CPU is
//! always last.

use super::{Embedder, InferenceDevice, VisionError, VisionResult};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProviderDispatch,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

const MODEL_NAME: &str = "clip-vit-b-32";

/// Model loading options
#[derive(Debug, Clone, Default)]
pub struct ClipConfig {
    /// Where model files are cached (fastembed default when `None`)
    pub cache_dir: Option<PathBuf>,

    /// Requested inference device
    pub device: InferenceDevice,

    /// Print download progress on first start
    pub show_download_progress: bool,
}

/// ONNX Runtime execution provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionTarget {
    Cuda,
    Cpu,
}

/// Providers to register for `device`, in the order ONNX Runtime tries them.
pub fn execution_plan(device: InferenceDevice) -> Vec<ExecutionTarget> {
    match device {
        InferenceDevice::Cpu => vec![ExecutionTarget::Cpu],
        InferenceDevice::Auto | InferenceDevice::Cuda if cfg!(feature = "cuda") => {
            vec![ExecutionTarget::Cuda, ExecutionTarget::Cpu]
        }
        InferenceDevice::Auto | InferenceDevice::Cuda => vec![ExecutionTarget::Cpu],
    }
}

fn execution_providers(plan: &[ExecutionTarget]) -> Vec<ExecutionProviderDispatch> {
    plan.iter()
        .map(|target| match target {
            ExecutionTarget::Cuda => CUDAExecutionProvider::default().build(),
            ExecutionTarget::Cpu => CPUExecutionProvider::default().build(),
        })
        .collect()
}

/// CLIP image and text encoders
pub struct ClipEmbedder {
    image: Mutex<fastembed::ImageEmbedding>,
    text: Mutex<fastembed::TextEmbedding>,
}

impl ClipEmbedder {
    /// Loads both encoders. Blocking; call once at startup.
    pub fn load(config: &ClipConfig) -> VisionResult<Self> {
        let plan = execution_plan(config.device);
        if config.device == InferenceDevice::Cuda && !plan.contains(&ExecutionTarget::Cuda) {
            warn!("CUDA requested but this build has no CUDA support; running on CPU");
        }
        info!(
            model = MODEL_NAME,
            device = %config.device,
            providers = ?plan,
            "Loading CLIP encoders"
        );

        let providers = execution_providers(&plan);
        let mut image_options = fastembed::ImageInitOptions::new(fastembed::ImageEmbeddingModel::ClipVitB32)
            .with_execution_providers(providers.clone())
            .with_show_download_progress(config.show_download_progress);
        let mut text_options = fastembed::InitOptions::new(fastembed::EmbeddingModel::ClipVitB32)
            .with_execution_providers(providers)
            .with_show_download_progress(config.show_download_progress);

        if let Some(dir) = &config.cache_dir {
            image_options = image_options.with_cache_dir(dir.clone());
            text_options = text_options.with_cache_dir(dir.clone());
        }

        let image = fastembed::ImageEmbedding::try_new(image_options)
            .map_err(|e| VisionError::ModelLoad(format!("image encoder: {}", e)))?;
        let text = fastembed::TextEmbedding::try_new(text_options)
            .map_err(|e| VisionError::ModelLoad(format!("text encoder: {}", e)))?;

        info!(model = MODEL_NAME, "CLIP encoders ready");
        Ok(Self {
            image: Mutex::new(image),
            text: Mutex::new(text),
        })
    }
}

impl Embedder for ClipEmbedder {
    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn embed_image(&self, path: &Path) -> VisionResult<Vec<f32>> {
        let mut model = self
            .image
            .lock()
            .map_err(|e| VisionError::Unavailable(e.to_string()))?;

        model
            .embed(vec![path.to_path_buf()], None)
            .map_err(|e| VisionError::ImageEmbedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or(VisionError::CountMismatch {
                expected: 1,
                actual: 0,
            })
    }

    fn embed_texts(&self, texts: &[String]) -> VisionResult<Vec<Vec<f32>>> {
        let mut model = self
            .text
            .lock()
            .map_err(|e| VisionError::Unavailable(e.to_string()))?;

        model
            .embed(texts.to_vec(), None)
            .map_err(|e| VisionError::TextEmbedding(e.to_string()))
    }
}
