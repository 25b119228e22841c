use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from the bearer JWT.
///
/// Rejects with 401 before the handler body runs, so protected handlers
/// never touch storage for anonymous callers.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_from_headers(&parts.headers).map_err(ApiError::unauthorized)?;

        let claims = validate_jwt(&token, &state.config.security.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser::from(claims))
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn requires_bearer_scheme() {
        let mut headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def.ghi");
    }
}
