pub mod auth;
pub mod calculators;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod investments;
pub mod logs;
pub mod pagination;
pub mod products;
pub mod transactions;
pub mod two_factor;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::AppState;

pub use error::{ApiError, ApiResult};

/// All `/api` routes, state attached
pub fn api_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/resend-otp", post(auth::resend_otp))
        .route("/auth/login", post(auth::login))
        .route("/auth/login/verify-otp", post(auth::verify_login_otp))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/me", get(auth::get_me))
        .route("/auth/change-password", post(auth::change_password))
        // Two-factor
        .route("/auth/2fa/enable", post(two_factor::enable))
        .route("/auth/2fa/setup", post(two_factor::setup))
        .route("/auth/2fa/verify", post(two_factor::verify))
        .route("/auth/2fa/disable", post(two_factor::disable))
        // Products
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // Investments
        .route(
            "/investments",
            get(investments::list_investments).post(investments::create_investment),
        )
        .route("/investments/portfolio", get(investments::portfolio))
        .route("/investments/:id", get(investments::get_investment))
        .route("/investments/:id/cancel", post(investments::cancel_investment))
        // Dashboard, logs, transactions
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/logs", get(logs::list_logs))
        .route("/transactions", get(transactions::list_transactions))
        .route("/transactions/export", get(transactions::export_transactions))
        // Calculators
        .route("/calculators/simple-interest", post(calculators::simple_interest))
        .route("/calculators/compound-interest", post(calculators::compound_interest))
        .route("/calculators/sip", post(calculators::sip))
        .route("/calculators/bond-yield", post(calculators::bond_yield))
        .route("/calculators/etf", post(calculators::etf))
        .with_state(state)
}
