/// Component detail endpoints
///
/// - `GET /components/:component_id/model3d` - URL of the first 3D model
/// - `GET /components/:component_id/sheet` - full technical sheet
///
/// Stored file paths are turned into public URLs with the configured media
/// prefix (`MEDIA_URL`).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use catalogue_shared::models::component::{
    Component, ComponentDescriptionParagraph, ComponentDetail, ComponentVideo, TechnicalSheet,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 3D model lookup result
#[derive(Debug, Serialize)]
pub struct Model3DResponse {
    /// `null` when the component has no model attached
    pub model3d_url: Option<String>,
    pub name: String,
}

/// Returns the first 3D model of a component.
///
/// # Errors
///
/// - `404`: unknown component
pub async fn get_model3d(
    State(state): State<AppState>,
    Path(component_id): Path<i64>,
) -> ApiResult<Json<Model3DResponse>> {
    let component = Component::find_by_id(&state.db, component_id)
        .await?
        .ok_or_else(|| component_not_found(component_id))?;

    let model3d_url = Component::first_model3d(&state.db, component_id)
        .await?
        .map(|model| model.url(&state.config.media.url));

    Ok(Json(Model3DResponse {
        model3d_url,
        name: component.name,
    }))
}

/// Sheet header
#[derive(Debug, Serialize)]
pub struct ComponentView {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Attached model with its public URL
#[derive(Debug, Serialize)]
pub struct Model3DView {
    pub id: i64,
    pub url: String,
}

/// Attached document with its public URL
#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub id: i64,
    pub title: String,
    pub url: String,
}

/// Technical sheet view
#[derive(Debug, Serialize)]
pub struct TechnicalSheetResponse {
    pub component: ComponentView,
    pub model3d: Option<Model3DView>,
    /// Ascending `sequence`
    pub paragraphs: Vec<ComponentDescriptionParagraph>,
    pub details: Vec<ComponentDetail>,
    pub documents: Vec<DocumentView>,
    pub videos: Vec<ComponentVideo>,
}

impl TechnicalSheetResponse {
    fn from_sheet(sheet: TechnicalSheet, media_prefix: &str) -> Self {
        let model3d = sheet.model3d.map(|model| Model3DView {
            id: model.id,
            url: model.url(media_prefix),
        });

        let documents = sheet
            .documents
            .into_iter()
            .map(|document| DocumentView {
                id: document.id,
                url: document.url(media_prefix),
                title: document.title,
            })
            .collect();

        let component = sheet.component;

        Self {
            component: ComponentView {
                id: component.id,
                parent_id: component.parent_id,
                name: component.name,
                description: component.description,
                created_at: component.created_at,
            },
            model3d,
            paragraphs: sheet.paragraphs,
            details: sheet.details,
            documents,
            videos: sheet.videos,
        }
    }
}

/// Returns a component with all of its attachments.
///
/// # Errors
///
/// - `404`: unknown component
pub async fn technical_sheet(
    State(state): State<AppState>,
    Path(component_id): Path<i64>,
) -> ApiResult<Json<TechnicalSheetResponse>> {
    let sheet = Component::technical_sheet(&state.db, component_id)
        .await?
        .ok_or_else(|| component_not_found(component_id))?;

    Ok(Json(TechnicalSheetResponse::from_sheet(
        sheet,
        &state.config.media.url,
    )))
}

fn component_not_found(component_id: i64) -> ApiError {
    ApiError::NotFound(format!("Component {} not found", component_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogue_shared::models::component::{ComponentDocument, ComponentModel3D};

    fn sheet() -> TechnicalSheet {
        TechnicalSheet {
            component: Component {
                id: 3,
                parent_id: Some(1),
                name: "Pump-A".to_string(),
                description: "Feed pump".to_string(),
                created_at: Utc::now(),
            },
            model3d: Some(ComponentModel3D {
                id: 9,
                component_id: 3,
                file_path: "models3d/pump-a.glb".to_string(),
            }),
            paragraphs: vec![],
            details: vec![],
            documents: vec![ComponentDocument {
                id: 4,
                component_id: 3,
                title: "Manual".to_string(),
                file_path: "documents/pump-a.pdf".to_string(),
            }],
            videos: vec![],
        }
    }

    #[test]
    fn test_sheet_view_builds_media_urls() {
        let view = TechnicalSheetResponse::from_sheet(sheet(), "/media/");

        assert_eq!(view.component.name, "Pump-A");
        assert_eq!(view.model3d.unwrap().url, "/media/models3d/pump-a.glb");
        assert_eq!(view.documents[0].url, "/media/documents/pump-a.pdf");
        assert_eq!(view.documents[0].title, "Manual");
    }

    #[test]
    fn test_sheet_view_without_model() {
        let mut sheet = sheet();
        sheet.model3d = None;

        let json = serde_json::to_value(TechnicalSheetResponse::from_sheet(sheet, "/media/")).unwrap();
        assert!(json["model3d"].is_null());
    }

    #[test]
    fn test_component_not_found_message() {
        match component_not_found(42) {
            ApiError::NotFound(message) => assert_eq!(message, "Component 42 not found"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
