//! Delivery of one-time passwords to users

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::services::otp_service::OtpPurpose;

/// Sends an OTP to the user's mailbox
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, email: &str, purpose: OtpPurpose, code: &str)
    -> Result<(), DomainError>;
}

/// Mailer that only emits a tracing event. Used until an SMTP relay is configured.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(
        &self,
        email: &str,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), DomainError> {
        tracing::info!(
            target: "invest_hub::mail",
            email = %email,
            purpose = purpose.as_str(),
            "OTP issued"
        );
        tracing::debug!(target: "invest_hub::mail", "OTP for {}: {}", email, code);
        Ok(())
    }
}
