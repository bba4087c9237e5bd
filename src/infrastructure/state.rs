//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::ProductRepository;
use crate::infrastructure::SeaOrmProductRepository;
use crate::infrastructure::config::{Config, JwtSettings};
use crate::services::auth_service::AuthContext;
use crate::services::{LogMailer, OtpMailer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Delivers OTP codes to users
    pub mailer: Arc<dyn OtpMailer>,
    pub product_repo: Arc<dyn ProductRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self::with_mailer(db, config, Arc::new(LogMailer))
    }

    pub fn with_mailer(db: DatabaseConnection, config: Config, mailer: Arc<dyn OtpMailer>) -> Self {
        let product_repo = Arc::new(SeaOrmProductRepository::new(db.clone()));

        Self {
            db,
            config: Arc::new(config),
            mailer,
            product_repo,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn auth_context(&self) -> AuthContext<'_> {
        AuthContext {
            db: &self.db,
            otp: &self.config.otp,
            jwt: &self.config.jwt,
            mailer: self.mailer.as_ref(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for JwtSettings {
    fn from_ref(state: &AppState) -> Self {
        state.config.jwt.clone()
    }
}
