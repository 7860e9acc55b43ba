//! JWT auth: registration, login, and the bearer-token middleware.
//!
//! - `POST /api/v1/auth/register` creates an account (PBKDF2-hashed password)
//! - `POST /api/v1/auth/login` returns a JWT valid for `JWT_TTL_DAYS`
//! - Task endpoints require `Authorization: Bearer <jwt>`; the middleware
//!   resolves the token to an [`AuthUser`] before any task operation runs
//!
//! # Security notes
//! - Use a strong `JWT_SECRET` in production.
//! - Login answers identically for unknown email and wrong password.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use sha2::Sha256;
use uuid::Uuid;

use super::routes::AppState;
use super::types::{LoginRequest, LoginResponse, LoginUser, UserSummary};
use crate::error::ApiError;
use crate::model::NewUser;

/// PBKDF2 work factor for newly created password hashes.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Identity resolved from a bearer credential, injected into protected
/// handlers. Every task operation is scoped to `id`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    /// Subject: the user id
    sub: String,
    /// Issued-at unix seconds
    iat: i64,
    /// Expiration unix seconds
    exp: i64,
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for i in 0..a.len() {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

/// Hash a password as `pbkdf2:{iterations}:{hex_salt}:{hex_hash}`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut hash = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);
    format!(
        "pbkdf2:{}:{}:{}",
        PBKDF2_ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Verify a password against a stored `pbkdf2:...` hash in constant time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("pbkdf2"), Some(iterations), Some(salt_hex), Some(hash_hex)) => {
            let Ok(iterations) = iterations.parse::<u32>() else {
                return false;
            };
            let Ok(salt) = hex::decode(salt_hex) else {
                return false;
            };
            let Ok(expected) = hex::decode(hash_hex) else {
                return false;
            };
            let mut actual = vec![0u8; expected.len()];
            pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut actual);
            constant_time_eq(&actual, &expected)
        }
        _ => false,
    }
}

fn issue_token(user_id: Uuid, secret: &str, ttl_days: i64) -> Result<String, ApiError> {
    let now = Utc::now();
    let exp = now + Duration::days(ttl_days.max(1));
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {}", e)))
}

fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let new_user = payload.validated().map_err(ApiError::Validation)?;

    if state
        .store
        .find_user_by_email(&new_user.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(&new_user.password);
    let user = state
        .store
        .insert_user(&new_user.name, &new_user.email, &password_hash)
        .await?;

    tracing::info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(UserSummary::from(&user))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let email = req.email.trim().to_lowercase();

    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => {
            return Err(ApiError::Unauthorized(
                "Invalid email or password".to_string(),
            ))
        }
    };

    let token = issue_token(user.id, &state.config.jwt.secret, state.config.jwt.ttl_days)?;
    Ok(Json(LoginResponse {
        access_token: token,
        user: LoginUser {
            id: user.id,
            email: user.email,
        },
    }))
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .unwrap_or("");

    if token.is_empty() {
        return Err(ApiError::Unauthorized("Access token required".to_string()));
    }

    let claims = verify_token(token, &state.config.jwt.secret)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    // The account may have been removed since the token was issued.
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct-horse");
        assert!(hash.starts_with("pbkdf2:100000:"));
        assert!(verify_password("correct-horse", &hash));
        assert!(!verify_password("wrong-horse", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        // Fresh random salt per hash.
        assert_ne!(hash_password("secret-pw"), hash_password("secret-pw"));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "pbkdf2:notanumber:aa:bb"));
        assert!(!verify_password("pw", "bcrypt:10:aa:bb"));
    }

    #[test]
    fn token_round_trip_and_tampering() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "secret", 7).expect("token issued");

        let claims = verify_token(&token, "secret").expect("token verifies");
        assert_eq!(claims.sub, user_id.to_string());

        assert!(verify_token(&token, "other-secret").is_none());
        let tampered = format!("{}x", token);
        assert!(verify_token(&tampered, "secret").is_none());
    }

    #[test]
    fn constant_time_eq_compares_lengths_first() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
