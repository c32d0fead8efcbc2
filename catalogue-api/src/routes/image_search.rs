/// Photo-based component lookup
///
/// ```text
/// POST /image-search
/// Content-Type: multipart/form-data; boundary=...
///
/// image=<file>
/// ```
///
/// The photo is compared with the *names* of every component that has at least
/// one reference image. The best name wins if its probability reaches the
/// configured threshold:
///
/// - match: `303 See Other` to `/components/{id}/sheet`
/// - no match: `200` with `{"error": "...", "best_match": "...", "score": 0.41}`
///
/// The uploaded file is staged under `<MEDIA_ROOT>/temp/` and removed before
/// the response is sent, on every path.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use bytes::Bytes;
use catalogue_shared::{
    models::component::{Component, ComponentImage},
    vision::{upload::StagedUpload, ScoredMatch},
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

/// Multipart field carrying the photo
pub const IMAGE_FIELD: &str = "image";

/// Body returned when no component is similar enough
#[derive(Debug, Serialize)]
pub struct NoMatchResponse {
    pub error: String,
    /// Closest candidate, if there was any
    pub best_match: Option<String>,
    pub score: Option<f32>,
}

impl NoMatchResponse {
    fn new(threshold: f32, best: Option<ScoredMatch>) -> Self {
        let (best_match, score) = match best {
            Some(best) => (Some(best.name), Some(best.score)),
            None => (None, None),
        };

        Self {
            error: format!(
                "No component matches this image with at least {:.0}% similarity",
                threshold * 100.0
            ),
            best_match,
            score,
        }
    }
}

struct UploadedImage {
    file_name: String,
    bytes: Bytes,
}

pub async fn image_search(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let upload = read_image_field(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::BadRequest("No image was uploaded".to_string()))?;

    let media_root = state.config.media.root.clone();
    let staged = tokio::task::spawn_blocking(move || {
        StagedUpload::write(&media_root, &upload.file_name, &upload.bytes)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Upload task failed: {}", e)))?
    .map_err(|e| ApiError::InternalError(format!("Failed to stage upload: {}", e)))?;

    let images = Component::all_images(&state.db).await?;
    let candidates = candidate_names(&images);

    let matcher = state.matcher.clone();
    let best = tokio::task::spawn_blocking(move || {
        let result = matcher.best_match(staged.path(), &candidates);
        drop(staged);
        result
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Inference task failed: {}", e)))??;

    let threshold = state.matcher.threshold();

    match best {
        Some(best) if best.accepted => {
            let component = Component::find_by_name(&state.db, &best.name)
                .await?
                .ok_or_else(|| {
                    warn!(name = %best.name, "Matched image name has no component");
                    ApiError::NotFound(format!("Component '{}' not found", best.name))
                })?;

            info!(
                component_id = component.id,
                score = best.score,
                "Image search matched component"
            );

            Ok(Redirect::to(&format!("/components/{}/sheet", component.id)).into_response())
        }
        best => {
            info!(
                best_match = best.as_ref().map(|b| b.name.as_str()),
                score = best.as_ref().map(|b| b.score),
                threshold,
                "Image search found no match"
            );

            Ok(Json(NoMatchResponse::new(threshold, best)).into_response())
        }
    }
}

/// Returns the first non-empty `image` field. Other fields are skipped.
async fn read_image_field(multipart: &mut Multipart) -> ApiResult<Option<UploadedImage>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if !bytes.is_empty() {
            return Ok(Some(UploadedImage { file_name, bytes }));
        }
    }

    Ok(None)
}

/// Distinct component names, in image load order.
pub fn candidate_names(images: &[ComponentImage]) -> Vec<String> {
    let mut seen = HashSet::new();
    images
        .iter()
        .filter(|image| seen.insert(image.component_name.as_str()))
        .map(|image| image.component_name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i64, component_id: i64, name: &str) -> ComponentImage {
        ComponentImage {
            id,
            component_id,
            image_path: format!("images/{}.jpg", id),
            component_name: name.to_string(),
        }
    }

    #[test]
    fn test_candidate_names_are_distinct_in_order() {
        let images = vec![
            image(1, 3, "Pump-A"),
            image(2, 5, "Valve-B"),
            image(3, 3, "Pump-A"),
            image(4, 7, "Motor-C"),
        ];

        assert_eq!(candidate_names(&images), vec!["Pump-A", "Valve-B", "Motor-C"]);
    }

    #[test]
    fn test_candidate_names_empty() {
        assert!(candidate_names(&[]).is_empty());
    }

    #[test]
    fn test_no_match_response_with_candidate() {
        let body = NoMatchResponse::new(
            0.6,
            Some(ScoredMatch {
                name: "Pump-A".to_string(),
                score: 0.41,
                accepted: false,
            }),
        );

        assert_eq!(body.error, "No component matches this image with at least 60% similarity");
        assert_eq!(body.best_match.as_deref(), Some("Pump-A"));
        assert_eq!(body.score, Some(0.41));
    }

    #[test]
    fn test_no_match_response_without_candidates() {
        let json = serde_json::to_value(NoMatchResponse::new(0.6, None)).unwrap();
        assert!(json["best_match"].is_null());
        assert!(json["score"].is_null());
        assert!(json["error"].as_str().unwrap().starts_with("No component matches"));
    }
}
