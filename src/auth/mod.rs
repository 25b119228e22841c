use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Bearer token claims; `sub` is the user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry (HS256) and return the claims.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_subject() {
        let id = Uuid::new_v4();
        let token = generate_jwt(&Claims::new(id, None, 1), "segredo").unwrap();
        let claims = validate_jwt(&token, "segredo").unwrap();
        assert_eq!(claims.sub, id);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_jwt(&Claims::new(Uuid::new_v4(), None, 1), "segredo").unwrap();
        assert!(matches!(validate_jwt(&token, "outro"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let mut claims = Claims::new(Uuid::new_v4(), None, 1);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = generate_jwt(&claims, "segredo").unwrap();
        assert!(validate_jwt(&token, "segredo").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let claims = Claims::new(Uuid::new_v4(), None, 1);
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
    }
}
