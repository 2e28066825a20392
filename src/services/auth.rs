use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AppError, LogErr, Result};
use crate::models::{Claims, CurrentUser};

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Resolve the request's bearer credential to the authenticated principal
    pub fn authenticate(headers: &HeaderMap, jwt: &JwtConfig) -> Result<CurrentUser> {
        let token = Self::bearer_token(headers)?;
        let user_id = Self::validate_token(token, jwt)?;
        Ok(CurrentUser {
            id: user_id.to_string(),
        })
    }

    /// Extract the token from an `Authorization: Bearer <token>` header
    pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Couldn't find JWT".to_string()))?
            .to_str()
            .log_unauthorized("Couldn't find JWT")?;

        match header.strip_prefix("Bearer ").map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AppError::Unauthorized("Couldn't find JWT".to_string())),
        }
    }

    /// Validate access token and return the user id from its subject claim.
    /// The current secret is tried first, then previous ones.
    pub fn validate_token(token: &str, jwt: &JwtConfig) -> Result<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[jwt.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let keys = std::iter::once(jwt.secret.as_str())
            .chain(jwt.previous_secrets.iter().map(|s| s.as_str()))
            .filter(|s| !s.is_empty());

        for secret in keys {
            match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            {
                Ok(token_data) => {
                    return Uuid::parse_str(&token_data.claims.sub)
                        .log_unauthorized("Couldn't validate JWT");
                }
                Err(e) => tracing::debug!("JWT rejected: {:?}", e.kind()),
            }
        }

        Err(AppError::Unauthorized("Couldn't validate JWT".to_string()))
    }

    /// Generate access token (JWT)
    pub fn issue_token(user_id: &str, jwt: &JwtConfig) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::minutes(jwt.access_token_expire_minutes as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            iss: jwt.issuer.clone(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(jwt.secret.as_bytes()),
        )?;

        Ok(token)
    }
}
