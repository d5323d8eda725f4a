use axum::{async_trait, extract::FromRequestParts, http::request::Parts, Json};
use hyper::{http::HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const ADMIN_HEADER: &str = "x-user-is-admin";

#[derive(Serialize, Deserialize, ToSchema)]
pub enum AuthError {
    #[schema(example = "User not authenticated")]
    Unauthenticated(String),
    #[schema(example = "Admin access required")]
    Forbidden(String),
}

/// Caller identity injected by the auth proxy in front of this service.
/// Requests are authenticated upstream; the headers are trusted as-is.
#[derive(Clone, Debug)]
pub struct Identity {
    pub username: String,
    pub user_id: i32,
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<AuthError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = header_value(&parts.headers, USER_NAME_HEADER);
        let user_id =
            header_value(&parts.headers, USER_ID_HEADER).and_then(|v| v.parse::<i32>().ok());

        match (username, user_id) {
            (Some(username), Some(user_id)) => Ok(Identity { username, user_id }),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(AuthError::Unauthenticated(
                    "User not authenticated".to_string(),
                )),
            )),
        }
    }
}

/// Marker extractor for admin-only routes; rejects with 403 unless the proxy
/// flagged the caller as an admin.
pub struct Admin;

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<AuthError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match header_value(&parts.headers, ADMIN_HEADER).as_deref() {
            Some("true") => Ok(Admin),
            _ => Err((
                StatusCode::FORBIDDEN,
                Json(AuthError::Forbidden("Admin access required".to_string())),
            )),
        }
    }
}

/// The signed-in username, when present. Some endpoints degrade gracefully
/// without it instead of rejecting.
pub fn username_from(headers: &HeaderMap) -> Option<String> {
    header_value(headers, USER_NAME_HEADER)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
