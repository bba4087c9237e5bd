#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use invest_hub::config::{Config, OtpSettings};
use invest_hub::domain::DomainError;
use invest_hub::infrastructure::AppState;
use invest_hub::services::{OtpMailer, OtpPurpose};
use invest_hub::{db, seed, server};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // for `oneshot`

pub const PASSWORD: &str = "Sup3rSecret!";

/// Keeps every OTP instead of mailing it
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<(String, OtpPurpose, String)>>,
}

impl CapturingMailer {
    pub fn last_code(&self, email: &str, purpose: OtpPurpose) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, p, _)| to == email && *p == purpose)
            .map(|(_, _, code)| code.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpMailer for CapturingMailer {
    async fn send_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), DomainError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), purpose, code.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub mailer: Arc<CapturingMailer>,
}

/// OTP cooldown disabled so flows can request several codes in a row
pub async fn spawn_app() -> TestApp {
    spawn_app_with(OtpSettings {
        resend_cooldown_secs: 0,
        ..OtpSettings::default()
    })
    .await
}

pub async fn spawn_app_with(otp: OtpSettings) -> TestApp {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let config = Config {
        otp,
        ..Config::default()
    };
    let mailer = Arc::new(CapturingMailer::default());
    let state = AppState::with_mailer(db.clone(), config, mailer.clone());

    TestApp {
        router: server::build_router(state),
        db,
        mailer,
    }
}

impl TestApp {
    pub async fn request_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes.to_vec())
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.request_raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Register, confirm the emailed code and return a session token
    pub async fn register_verified(&self, email: &str) -> String {
        let (status, _) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": PASSWORD, "full_name": "Test User" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let code = self
            .mailer
            .last_code(email, OtpPurpose::EmailVerification)
            .expect("verification code was not sent");
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/verify-email",
                None,
                Some(json!({ "email": email, "otp": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Seeded admin account, logged in
    pub async fn admin_token(&self) -> String {
        seed::seed_admin(&self.db, "admin@investhub.test", PASSWORD)
            .await
            .expect("Failed to seed admin");
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "admin@investhub.test", "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Create a product through the admin API and return its id
    pub async fn create_product(&self, admin: &str, product: Value) -> i64 {
        let (status, body) = self
            .request("POST", "/api/products", Some(admin), Some(product))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["product"]["id"].as_i64().unwrap()
    }
}

pub fn bond_product() -> Value {
    json!({
        "name": "Treasury Bond 2030",
        "category": "bond",
        "description": "Five year sovereign bond",
        "risk_level": "low",
        "expected_return": 7.5,
        "min_investment": 1000.0,
        "max_investment": 100000.0,
        "tenure_months": 60
    })
}

pub fn etf_product() -> Value {
    json!({
        "name": "Index ETF",
        "category": "etf",
        "risk_level": "medium",
        "expected_return": 12.0,
        "min_investment": 500.0
    })
}
