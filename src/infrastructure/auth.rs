use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Json},
    http::{StatusCode, request::Parts},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::config::JwtSettings;

const PENDING_LOGIN_PURPOSE: &str = "pending_2fa";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingLoginClaims {
    sub: String,
    purpose: String,
    exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32, DomainError> {
        self.sub
            .parse()
            .map_err(|_| DomainError::Unauthorized("Invalid token subject".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    JwtSettings: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing Authorization header" })),
            ))?;

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid Authorization header format" })),
            ));
        };

        let settings = JwtSettings::from_ref(state);
        decode_jwt(&settings, token).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid or expired token" })),
            )
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Session token for a fully authenticated user
pub fn create_jwt(
    settings: &JwtSettings,
    user_id: i32,
    email: &str,
    role: &str,
) -> Result<String, String> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_owned(),
        role: role.to_owned(),
        exp: expires_in(Duration::hours(settings.expiry_hours))?,
    };
    sign(settings, &claims)
}

pub fn decode_jwt(settings: &JwtSettings, token: &str) -> Result<Claims, String> {
    verify::<Claims>(settings, token)
}

/// Short-lived token proving the password step of a two-factor login.
/// It carries no email or role, so it never passes as a session token.
pub fn create_pending_token(
    settings: &JwtSettings,
    user_id: i32,
    ttl_minutes: i64,
) -> Result<String, String> {
    let claims = PendingLoginClaims {
        sub: user_id.to_string(),
        purpose: PENDING_LOGIN_PURPOSE.to_string(),
        exp: expires_in(Duration::minutes(ttl_minutes))?,
    };
    sign(settings, &claims)
}

/// User id of a valid pending-login token
pub fn decode_pending_token(settings: &JwtSettings, token: &str) -> Result<i32, String> {
    let claims = verify::<PendingLoginClaims>(settings, token)?;
    if claims.purpose != PENDING_LOGIN_PURPOSE {
        return Err("Wrong token purpose".to_string());
    }
    claims.sub.parse().map_err(|_| "Invalid token subject".to_string())
}

fn expires_in(lifetime: Duration) -> Result<usize, String> {
    Utc::now()
        .checked_add_signed(lifetime)
        .map(|t| t.timestamp() as usize)
        .ok_or_else(|| "Token expiry overflow".to_string())
}

fn sign<T: Serialize>(settings: &JwtSettings, claims: &T) -> Result<String, String> {
    if settings.secret.is_empty() {
        return Err("JWT secret is not configured".to_string());
    }
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

fn verify<T: DeserializeOwned>(settings: &JwtSettings, token: &str) -> Result<T, String> {
    if settings.secret.is_empty() {
        return Err("JWT secret is not configured".to_string());
    }
    decode::<T>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
