//! Stateless financial calculators

use axum::Json;

use crate::api::error::ApiResult;
use crate::services::calculator::{
    self, BondYieldInput, BondYieldResult, CompoundInterestInput, CompoundInterestResult,
    EtfInput, EtfResult, SimpleInterestInput, SimpleInterestResult, SipInput, SipResult,
};

#[utoipa::path(
    post,
    path = "/api/calculators/simple-interest",
    request_body = SimpleInterestInput,
    responses(
        (status = 200, description = "Simple interest", body = SimpleInterestResult),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn simple_interest(
    Json(input): Json<SimpleInterestInput>,
) -> ApiResult<Json<SimpleInterestResult>> {
    Ok(Json(calculator::simple_interest(&input)?))
}

#[utoipa::path(
    post,
    path = "/api/calculators/compound-interest",
    request_body = CompoundInterestInput,
    responses(
        (status = 200, description = "Compound interest with yearly breakdown", body = CompoundInterestResult),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn compound_interest(
    Json(input): Json<CompoundInterestInput>,
) -> ApiResult<Json<CompoundInterestResult>> {
    Ok(Json(calculator::compound_interest(&input)?))
}

#[utoipa::path(
    post,
    path = "/api/calculators/sip",
    request_body = SipInput,
    responses(
        (status = 200, description = "SIP future value", body = SipResult),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn sip(Json(input): Json<SipInput>) -> ApiResult<Json<SipResult>> {
    Ok(Json(calculator::sip(&input)?))
}

#[utoipa::path(
    post,
    path = "/api/calculators/bond-yield",
    request_body = BondYieldInput,
    responses(
        (status = 200, description = "Bond yields", body = BondYieldResult),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn bond_yield(Json(input): Json<BondYieldInput>) -> ApiResult<Json<BondYieldResult>> {
    Ok(Json(calculator::bond_yield(&input)?))
}

#[utoipa::path(
    post,
    path = "/api/calculators/etf",
    request_body = EtfInput,
    responses(
        (status = 200, description = "ETF projection", body = EtfResult),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn etf(Json(input): Json<EtfInput>) -> ApiResult<Json<EtfResult>> {
    Ok(Json(calculator::etf(&input)?))
}
