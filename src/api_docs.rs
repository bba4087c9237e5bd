use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::register,
        api::auth::verify_email,
        api::auth::resend_otp,
        api::auth::login,
        api::auth::verify_login_otp,
        api::auth::forgot_password,
        api::auth::reset_password,
        api::auth::get_me,
        api::auth::change_password,
        api::two_factor::enable,
        api::two_factor::setup,
        api::two_factor::verify,
        api::two_factor::disable,
        api::products::list_products,
        api::products::get_product,
        api::products::create_product,
        api::products::update_product,
        api::products::delete_product,
        api::investments::create_investment,
        api::investments::list_investments,
        api::investments::get_investment,
        api::investments::cancel_investment,
        api::investments::portfolio,
        api::dashboard::get_dashboard,
        api::logs::list_logs,
        api::transactions::list_transactions,
        api::transactions::export_transactions,
        api::calculators::simple_interest,
        api::calculators::compound_interest,
        api::calculators::sip,
        api::calculators::bond_yield,
        api::calculators::etf,
    ),
    components(
        schemas(
            api::auth::LoginRequest,
            api::auth::OtpRequest,
            api::auth::LoginOtpRequest,
            api::auth::ResendOtpRequest,
            api::auth::ForgotPasswordRequest,
            api::auth::ResetPasswordRequest,
            api::auth::ChangePasswordRequest,
            api::two_factor::EnableRequest,
            api::two_factor::VerifyRequest,
            api::two_factor::DisableRequest,
            crate::services::auth_service::RegisterInput,
            crate::services::auth_service::TotpSetup,
            crate::services::OtpPurpose,
            crate::models::user::UserDto,
            crate::models::investment::CreateInvestmentDto,
            crate::models::product::Product,
            crate::services::calculator::SimpleInterestInput,
            crate::services::calculator::SimpleInterestResult,
            crate::services::calculator::CompoundInterestInput,
            crate::services::calculator::CompoundInterestResult,
            crate::services::calculator::YearlyBreakdown,
            crate::services::calculator::SipInput,
            crate::services::calculator::SipResult,
            crate::services::calculator::BondYieldInput,
            crate::services::calculator::BondYieldResult,
            crate::services::calculator::EtfInput,
            crate::services::calculator::EtfResult,
            crate::services::calculator::EtfProjection,
        )
    ),
    tags(
        (name = "invest-hub", description = "Investment platform API")
    )
)]
pub struct ApiDoc;
