/// Technician login and logout
///
/// # Endpoints
///
/// - `POST /login` - form fields `email`, `password`; opens a session
/// - `GET|POST /logout` - closes the session
///
/// Technician accounts are provisioned elsewhere; there is no registration
/// endpoint. Passwords are verified against Argon2id hashes.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    session::{clear_session_cookie, extract_session_cookie, session_cookie},
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use catalogue_shared::{
    auth::{
        password,
        session::{generate_session_token, hash_session_token},
    },
    models::{
        session::{CreateSession, Session},
        technician::Technician,
    },
};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

/// Login form
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/x-www-form-urlencoded
///
/// email=tech%40example.com&password=...
/// ```
///
/// On success responds `303 See Other` to `/` with the session cookie set.
///
/// # Errors
///
/// - `422`: malformed form
/// - `404 not_found`: no technician with that email ("Technician not found")
/// - `401 invalid_credential`: wrong password ("Incorrect password")
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let technician = Technician::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| {
            info!(email = %req.email, "Login attempt for unknown technician");
            ApiError::NotFound("Technician not found".to_string())
        })?;

    // Argon2 verification is CPU-heavy; keep it off the async workers.
    let stored_hash = technician.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || {
        password::verify_password(&req.password, &stored_hash)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Password task failed: {}", e)))??;

    if !valid {
        warn!(technician_id = %technician.id, "Login rejected: incorrect password");
        return Err(ApiError::InvalidCredential("Incorrect password".to_string()));
    }

    let token = generate_session_token();
    let ttl = state.config.session_ttl();

    Session::create(
        &state.db,
        CreateSession {
            token_hash: token.hash,
            technician_id: technician.id,
            display_name: technician.display_name.clone(),
            ttl,
        },
    )
    .await?;

    Technician::update_last_login(&state.db, technician.id).await?;

    info!(technician_id = %technician.id, "Technician logged in");

    let cookie = session_cookie(&token.value, ttl.num_seconds(), state.config.api.production);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// Logout endpoint
///
/// Always succeeds: deletes the session named by the cookie (if any),
/// expires the cookie and redirects (`303`) to `/login`.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_session_cookie(&headers) {
        match Session::delete_by_token_hash(&state.db, &hash_session_token(&token)).await {
            Ok(removed) => info!(removed, "Technician logged out"),
            Err(e) => warn!(error = %e, "Failed to delete session on logout"),
        }
    }

    let cookie = clear_session_cookie(state.config.api.production);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "tech@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = LoginRequest {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let empty_password = LoginRequest {
            email: "tech@example.com".to_string(),
            password: String::new(),
        };
        let errors = empty_password.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_validation_maps_to_api_error() {
        let req = LoginRequest {
            email: "nope".to_string(),
            password: String::new(),
        };
        let err: ApiError = req.validate().unwrap_err().into();

        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details.len(), 2);
                assert!(details.iter().any(|d| d.message == "Invalid email format"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
