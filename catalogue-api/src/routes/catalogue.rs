/// Home page data
///
/// ```text
/// GET /
/// ```
///
/// Returns the logged-in technician, every component of the catalogue (no
/// pagination, storage order) and the navigation root.

use crate::{app::AppState, error::ApiResult, session::SessionContext};
use axum::{extract::State, Extension, Json};
use catalogue_shared::models::component::Component;
use serde::Serialize;
use tracing::debug;

/// Home view
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub technician: SessionContext,
    pub components: Vec<Component>,
    /// First parentless component, `null` for an empty catalogue
    pub root: Option<Component>,
}

pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<HomeResponse>> {
    let components = Component::list_all(&state.db).await?;
    let root = Component::find_root(&state.db).await?;

    debug!(
        technician_id = %session.technician_id,
        components = components.len(),
        has_root = root.is_some(),
        "Rendering home"
    );

    Ok(Json(HomeResponse {
        technician: session,
        components,
        root,
    }))
}
