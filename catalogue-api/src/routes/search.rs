/// Component name search
///
/// ```text
/// GET /search?q=pump
/// ```
///
/// ```json
/// [{"id": 3, "name": "Pump-A"}, {"id": 8, "name": "Booster pump"}]
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Json,
};
use catalogue_shared::models::component::{Component, ComponentSummary};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    /// Query text as sent, spaces included; empty when `q` is absent.
    pub fn text(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

/// Case-insensitive substring search, at most 10 hits. A missing or empty
/// query returns `[]`.
pub async fn search_components(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ComponentSummary>>> {
    let text = query.text();
    if text.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let results = Component::search_by_name(&state.db, text).await?;
    debug!(query = text, hits = results.len(), "Component search");

    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text() {
        assert_eq!(SearchQuery::default().text(), "");
        assert_eq!(SearchQuery { q: Some(String::new()) }.text(), "");
        assert_eq!(SearchQuery { q: Some("   ".into()) }.text(), "   ");
        assert_eq!(SearchQuery { q: Some("pump ".into()) }.text(), "pump ");
    }
}
