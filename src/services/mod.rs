//! Services Layer
//!
//! Business logic kept apart from the HTTP handlers.

pub mod activity_service;
pub mod auth_service;
pub mod calculator;
pub mod investment_service;
pub mod mailer;
pub mod otp_service;
pub mod portfolio_service;
pub mod transaction_service;

pub use mailer::{LogMailer, OtpMailer};
pub use otp_service::OtpPurpose;
