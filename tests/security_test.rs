mod common;

use axum::http::StatusCode;
use common::{PASSWORD, spawn_app};
use invest_hub::auth::{
    create_jwt, create_pending_token, decode_jwt, decode_pending_token, hash_password,
    verify_password,
};
use invest_hub::config::JwtSettings;
use invest_hub::domain::DomainError;
use invest_hub::models::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;

#[tokio::test]
async fn test_password_hashing() {
    let password = "super_secret_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[tokio::test]
async fn test_jwt_creation_and_verification() {
    let settings = JwtSettings::default();
    let token =
        create_jwt(&settings, 42, "jane@example.com", "admin").expect("Failed to create JWT");
    assert!(!token.is_empty());

    let claims = decode_jwt(&settings, &token).expect("Failed to verify JWT");
    assert_eq!(claims.sub, "42");
    assert_eq!(claims.user_id().unwrap(), 42);
    assert_eq!(claims.email, "jane@example.com");
    assert!(claims.is_admin());

    assert!(decode_jwt(&settings, "not.a.token").is_err());

    let other_key = JwtSettings {
        secret: "another-secret".to_string(),
        ..JwtSettings::default()
    };
    assert!(decode_jwt(&other_key, &token).is_err());
}

#[tokio::test]
async fn test_pending_login_tokens_are_not_sessions() {
    let settings = JwtSettings::default();
    let pending = create_pending_token(&settings, 7, 5).unwrap();
    let session = create_jwt(&settings, 7, "kim@example.com", "user").unwrap();

    assert_eq!(decode_pending_token(&settings, &pending).unwrap(), 7);
    assert!(decode_jwt(&settings, &pending).is_err());
    assert!(decode_pending_token(&settings, &session).is_err());
}

#[tokio::test]
async fn test_duplicate_email_row_is_a_conflict() {
    let app = spawn_app().await;
    app.register_verified("twice@example.com").await;

    let now = chrono::Utc::now().to_rfc3339();
    let err = user::ActiveModel {
        email: Set("twice@example.com".to_string()),
        full_name: Set("Twice".to_string()),
        password_hash: Set(hash_password(PASSWORD).unwrap()),
        role: Set("user".to_string()),
        is_verified: Set(false),
        two_factor_enabled: Set(false),
        two_factor_method: Set(None),
        totp_secret: Set(None),
        totp_failed_attempts: Set(0),
        last_login_at: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap_err();

    assert!(matches!(DomainError::from(err), DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_secrets_are_never_exposed() {
    let app = spawn_app().await;
    let token = app.register_verified("secret@example.com").await;
    app.request("POST", "/api/auth/2fa/setup", Some(&token), None)
        .await;

    let (status, body) = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("totp_secret").is_none());

    // Only a digest of each OTP is stored
    let stored = user::Entity::find()
        .filter(user::Column::Email.eq("secret@example.com"))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.password_hash.starts_with("$argon2"));
    let codes = invest_hub::models::otp_code::Entity::find()
        .all(&app.db)
        .await
        .unwrap();
    assert!(!codes.is_empty());
    assert!(codes.iter().all(|c| c.code_hash.len() == 64));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    for (method, uri) in [
        ("GET", "/api/auth/me"),
        ("GET", "/api/investments"),
        ("GET", "/api/investments/portfolio"),
        ("GET", "/api/dashboard"),
        ("GET", "/api/logs"),
        ("GET", "/api/transactions"),
        ("GET", "/api/transactions/export"),
    ] {
        let (status, body) = app.request(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert!(body["error"].as_str().is_some());
    }

    let (status, _) = app
        .request("GET", "/api/auth/me", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_management_is_admin_only() {
    let app = spawn_app().await;
    let user = app.register_verified("plain@example.com").await;

    let (status, _) = app
        .request("POST", "/api/products", Some(&user), Some(common::etf_product()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let id = app.create_product(&admin, common::etf_product()).await;

    let (status, _) = app
        .request("DELETE", &format!("/api/products/{id}"), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Login with the seeded admin still works with the shared password
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "admin@investhub.test", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
