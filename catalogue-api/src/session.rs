/// Session cookie handling
///
/// The browser holds an opaque token in the `catalogue_session` cookie. The
/// authentication layer resolves it to a [`SessionContext`] and inserts it
/// into request extensions:
///
/// ```no_run
/// use axum::Extension;
/// use catalogue_api::session::SessionContext;
///
/// async fn handler(Extension(session): Extension<SessionContext>) -> String {
///     format!("Bonjour {}", session.display_name)
/// }
/// ```

use axum::http::{header::COOKIE, HeaderMap};
use catalogue_shared::models::session::Session;
use serde::Serialize;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "catalogue_session";

/// Authenticated technician attached to a request
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub technician_id: Uuid,
    pub display_name: String,
}

impl From<Session> for SessionContext {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            technician_id: session.technician_id,
            display_name: session.display_name,
        }
    }
}

/// Reads the session token from the `Cookie` header.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == SESSION_COOKIE_NAME && !value.is_empty()).then(|| value.to_string())
        })
}

/// `Set-Cookie` value that stores `token` for `max_age_seconds`.
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE_NAME, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}
