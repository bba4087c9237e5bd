//! Investment calculators
//!
//! Pure arithmetic behind the `/calculators/*` endpoints. Rates are annual
//! percentages (`8.5` means 8.5 % a year). Results are rounded to two decimals.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::utils::format::round2;
use crate::utils::validation::validate_amount;

fn validate_rate(field: &str, rate: f64) -> Result<(), DomainError> {
    if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
        return Err(DomainError::validation(format!(
            "{} must be between 0 and 100",
            field
        )));
    }
    Ok(())
}

fn validate_years(years: f64) -> Result<(), DomainError> {
    if !years.is_finite() || years <= 0.0 || years > 100.0 {
        return Err(DomainError::validation(
            "years must be greater than 0 and at most 100",
        ));
    }
    Ok(())
}

// --- Simple interest ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SimpleInterestInput {
    pub principal: f64,
    pub annual_rate: f64,
    pub years: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SimpleInterestResult {
    pub principal: f64,
    pub interest: f64,
    pub maturity_amount: f64,
}

pub fn simple_interest(input: &SimpleInterestInput) -> Result<SimpleInterestResult, DomainError> {
    validate_amount("principal", input.principal)?;
    validate_rate("annual_rate", input.annual_rate)?;
    validate_years(input.years)?;

    let interest = input.principal * input.annual_rate * input.years / 100.0;
    Ok(SimpleInterestResult {
        principal: round2(input.principal),
        interest: round2(interest),
        maturity_amount: round2(input.principal + interest),
    })
}

// --- Compound interest ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CompoundInterestInput {
    pub principal: f64,
    pub annual_rate: f64,
    pub years: f64,
    /// Compounding periods per year (1 = yearly, 4 = quarterly, 12 = monthly)
    #[serde(default = "default_compounds")]
    pub compounds_per_year: u32,
}

fn default_compounds() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct YearlyBreakdown {
    pub year: u32,
    pub opening_balance: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompoundInterestResult {
    pub principal: f64,
    pub maturity_amount: f64,
    pub interest_earned: f64,
    pub breakdown: Vec<YearlyBreakdown>,
}

/// A = P (1 + r/n)^(n t)
pub fn compound_interest(
    input: &CompoundInterestInput,
) -> Result<CompoundInterestResult, DomainError> {
    validate_amount("principal", input.principal)?;
    validate_rate("annual_rate", input.annual_rate)?;
    validate_years(input.years)?;
    if input.compounds_per_year == 0 || input.compounds_per_year > 365 {
        return Err(DomainError::validation(
            "compounds_per_year must be between 1 and 365",
        ));
    }

    let n = input.compounds_per_year as f64;
    let rate = input.annual_rate / 100.0 / n;
    let grow = |years: f64| input.principal * (1.0 + rate).powf(n * years);

    let mut breakdown = Vec::new();
    let full_years = input.years.ceil() as u32;
    let mut opening = input.principal;
    for year in 1..=full_years {
        let closing = grow((year as f64).min(input.years));
        breakdown.push(YearlyBreakdown {
            year,
            opening_balance: round2(opening),
            interest: round2(closing - opening),
            closing_balance: round2(closing),
        });
        opening = closing;
    }

    let maturity = grow(input.years);
    Ok(CompoundInterestResult {
        principal: round2(input.principal),
        maturity_amount: round2(maturity),
        interest_earned: round2(maturity - input.principal),
        breakdown,
    })
}

// --- SIP ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SipInput {
    pub monthly_investment: f64,
    pub annual_rate: f64,
    pub years: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SipResult {
    pub total_invested: f64,
    pub estimated_returns: f64,
    pub total_value: f64,
}

/// Future value of `months` deposits made at the start of each month
fn sip_future_value(monthly: f64, monthly_rate: f64, months: f64) -> f64 {
    if monthly_rate == 0.0 {
        return monthly * months;
    }
    monthly * ((1.0 + monthly_rate).powf(months) - 1.0) / monthly_rate * (1.0 + monthly_rate)
}

pub fn sip(input: &SipInput) -> Result<SipResult, DomainError> {
    validate_amount("monthly_investment", input.monthly_investment)?;
    validate_rate("annual_rate", input.annual_rate)?;
    validate_years(input.years)?;

    let months = (input.years * 12.0).round();
    let total_value = sip_future_value(input.monthly_investment, input.annual_rate / 1200.0, months);
    let total_invested = input.monthly_investment * months;

    Ok(SipResult {
        total_invested: round2(total_invested),
        estimated_returns: round2(total_value - total_invested),
        total_value: round2(total_value),
    })
}

// --- Bond yield ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BondYieldInput {
    pub face_value: f64,
    /// Annual coupon rate in percent of face value
    pub coupon_rate: f64,
    pub market_price: f64,
    pub years_to_maturity: f64,
    #[serde(default = "default_payments")]
    pub payments_per_year: u32,
}

fn default_payments() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BondYieldResult {
    pub annual_coupon: f64,
    pub current_yield: f64,
    pub approximate_ytm: f64,
    pub yield_to_maturity: f64,
    pub total_coupon_income: f64,
    pub capital_gain: f64,
}

/// Price of the bond discounted at annual yield `y` (fraction)
fn bond_price(face: f64, coupon: f64, periods: u32, freq: f64, y: f64) -> f64 {
    let r = y / freq;
    let mut price = 0.0;
    for k in 1..=periods {
        price += coupon / (1.0 + r).powi(k as i32);
    }
    price + face / (1.0 + r).powi(periods as i32)
}

/// Solve price(y) = market price by bisection. Price falls as yield rises.
fn solve_ytm(face: f64, coupon: f64, periods: u32, freq: f64, market: f64) -> Option<f64> {
    let (mut lo, mut hi) = (-0.99, 10.0);
    let f = |y: f64| bond_price(face, coupon, periods, freq, y) - market;
    if f(lo) < 0.0 || f(hi) > 0.0 {
        return None;
    }
    for _ in 0..200 {
        let mid = (lo + hi) / 2.0;
        if f(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-9 {
            break;
        }
    }
    Some((lo + hi) / 2.0)
}

pub fn bond_yield(input: &BondYieldInput) -> Result<BondYieldResult, DomainError> {
    validate_amount("face_value", input.face_value)?;
    validate_rate("coupon_rate", input.coupon_rate)?;
    validate_amount("market_price", input.market_price)?;
    validate_years(input.years_to_maturity)?;
    if input.face_value == 0.0 || input.market_price == 0.0 {
        return Err(DomainError::validation(
            "face_value and market_price must be greater than 0",
        ));
    }
    if !matches!(input.payments_per_year, 1 | 2 | 4 | 12) {
        return Err(DomainError::validation(
            "payments_per_year must be 1, 2, 4 or 12",
        ));
    }

    let face = input.face_value;
    let price = input.market_price;
    let years = input.years_to_maturity;
    let freq = input.payments_per_year as f64;

    let annual_coupon = face * input.coupon_rate / 100.0;
    let current_yield = annual_coupon / price * 100.0;
    let approximate_ytm = (annual_coupon + (face - price) / years) / ((face + price) / 2.0) * 100.0;

    let periods = (years * freq).round().max(1.0) as u32;
    let ytm = solve_ytm(face, annual_coupon / freq, periods, freq, price)
        .ok_or_else(|| DomainError::validation("No yield to maturity matches this price"))?;

    Ok(BondYieldResult {
        annual_coupon: round2(annual_coupon),
        current_yield: round2(current_yield),
        approximate_ytm: round2(approximate_ytm),
        yield_to_maturity: round2(ytm * 100.0),
        total_coupon_income: round2(annual_coupon / freq * periods as f64),
        capital_gain: round2(face - price),
    })
}

// --- ETF (lump sum + monthly SIP) ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EtfInput {
    #[serde(default)]
    pub initial_investment: f64,
    #[serde(default)]
    pub monthly_sip: f64,
    pub expected_annual_return: f64,
    /// Annual fund expense in percent, deducted from the return
    #[serde(default)]
    pub expense_ratio: f64,
    pub years: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EtfProjection {
    pub year: u32,
    pub invested: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EtfResult {
    pub net_annual_return: f64,
    pub total_invested: f64,
    pub lumpsum_value: f64,
    pub sip_value: f64,
    pub total_value: f64,
    pub total_gain: f64,
    pub projection: Vec<EtfProjection>,
}

pub fn etf(input: &EtfInput) -> Result<EtfResult, DomainError> {
    validate_amount("initial_investment", input.initial_investment)?;
    validate_amount("monthly_sip", input.monthly_sip)?;
    validate_rate("expected_annual_return", input.expected_annual_return)?;
    validate_rate("expense_ratio", input.expense_ratio)?;
    validate_years(input.years)?;
    if input.initial_investment == 0.0 && input.monthly_sip == 0.0 {
        return Err(DomainError::validation(
            "Provide an initial investment, a monthly SIP, or both",
        ));
    }

    let net_rate = (input.expected_annual_return - input.expense_ratio).max(0.0);
    let monthly_rate = net_rate / 1200.0;
    let value_after = |months: f64| {
        let lumpsum = input.initial_investment * (1.0 + monthly_rate).powf(months);
        let sip = sip_future_value(input.monthly_sip, monthly_rate, months);
        (lumpsum, sip)
    };

    let months = (input.years * 12.0).round();
    let mut projection = Vec::new();
    for year in 1..=(input.years.ceil() as u32) {
        let m = (year as f64 * 12.0).min(months);
        let (lumpsum, sip) = value_after(m);
        projection.push(EtfProjection {
            year,
            invested: round2(input.initial_investment + input.monthly_sip * m),
            value: round2(lumpsum + sip),
        });
    }

    let (lumpsum_value, sip_value) = value_after(months);
    let total_invested = input.initial_investment + input.monthly_sip * months;
    let total_value = lumpsum_value + sip_value;

    Ok(EtfResult {
        net_annual_return: round2(net_rate),
        total_invested: round2(total_invested),
        lumpsum_value: round2(lumpsum_value),
        sip_value: round2(sip_value),
        total_value: round2(total_value),
        total_gain: round2(total_value - total_invested),
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_simple_interest() {
        let result = simple_interest(&SimpleInterestInput {
            principal: 10_000.0,
            annual_rate: 8.0,
            years: 3.0,
        })
        .unwrap();
        assert_eq!(result.interest, 2400.0);
        assert_eq!(result.maturity_amount, 12_400.0);
    }

    #[test]
    fn test_compound_interest_yearly() {
        let result = compound_interest(&CompoundInterestInput {
            principal: 1000.0,
            annual_rate: 10.0,
            years: 2.0,
            compounds_per_year: 1,
        })
        .unwrap();
        assert_eq!(result.maturity_amount, 1210.0);
        assert_eq!(result.interest_earned, 210.0);
        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.breakdown[0].closing_balance, 1100.0);
        assert_eq!(result.breakdown[1].interest, 110.0);
    }

    #[test]
    fn test_compound_interest_partial_year() {
        let result = compound_interest(&CompoundInterestInput {
            principal: 1000.0,
            annual_rate: 12.0,
            years: 1.5,
            compounds_per_year: 12,
        })
        .unwrap();
        // 1000 * 1.01^18
        assert!(close(result.maturity_amount, 1196.15, 0.01));
        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(
            result.breakdown.last().unwrap().closing_balance,
            result.maturity_amount
        );
    }

    #[test]
    fn test_sip_future_value() {
        let result = sip(&SipInput {
            monthly_investment: 1000.0,
            annual_rate: 12.0,
            years: 1.0,
        })
        .unwrap();
        // 1000 * ((1.01^12 - 1) / 0.01) * 1.01
        assert!(close(result.total_value, 12809.33, 0.01));
        assert_eq!(result.total_invested, 12000.0);
        assert!(close(result.estimated_returns, 809.33, 0.01));
    }

    #[test]
    fn test_sip_zero_rate() {
        let result = sip(&SipInput {
            monthly_investment: 500.0,
            annual_rate: 0.0,
            years: 2.0,
        })
        .unwrap();
        assert_eq!(result.total_value, 12_000.0);
        assert_eq!(result.estimated_returns, 0.0);
    }

    #[test]
    fn test_bond_at_par_yields_coupon() {
        let result = bond_yield(&BondYieldInput {
            face_value: 1000.0,
            coupon_rate: 6.0,
            market_price: 1000.0,
            years_to_maturity: 5.0,
            payments_per_year: 2,
        })
        .unwrap();
        assert_eq!(result.annual_coupon, 60.0);
        assert_eq!(result.current_yield, 6.0);
        assert_eq!(result.approximate_ytm, 6.0);
        assert!(close(result.yield_to_maturity, 6.0, 0.01));
        assert_eq!(result.total_coupon_income, 300.0);
        assert_eq!(result.capital_gain, 0.0);
    }

    #[test]
    fn test_discount_bond_yields_more_than_coupon() {
        let result = bond_yield(&BondYieldInput {
            face_value: 1000.0,
            coupon_rate: 5.0,
            market_price: 950.0,
            years_to_maturity: 10.0,
            payments_per_year: 1,
        })
        .unwrap();
        assert!(close(result.current_yield, 5.26, 0.01));
        assert!(close(result.approximate_ytm, 5.64, 0.01));
        assert!(result.yield_to_maturity > 5.26);
        assert!(close(result.yield_to_maturity, 5.67, 0.02));
        assert_eq!(result.capital_gain, 50.0);
    }

    #[test]
    fn test_bond_rejects_bad_frequency() {
        let err = bond_yield(&BondYieldInput {
            face_value: 1000.0,
            coupon_rate: 5.0,
            market_price: 950.0,
            years_to_maturity: 10.0,
            payments_per_year: 3,
        });
        assert!(matches!(err, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_etf_combines_lumpsum_and_sip() {
        let result = etf(&EtfInput {
            initial_investment: 10_000.0,
            monthly_sip: 1000.0,
            expected_annual_return: 13.0,
            expense_ratio: 1.0,
            years: 1.0,
        })
        .unwrap();
        assert_eq!(result.net_annual_return, 12.0);
        assert_eq!(result.total_invested, 22_000.0);
        // 10000 * 1.01^12
        assert!(close(result.lumpsum_value, 11268.25, 0.01));
        assert!(close(result.sip_value, 12809.33, 0.01));
        assert_eq!(result.projection.len(), 1);
        assert_eq!(result.projection[0].value, result.total_value);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(
            simple_interest(&SimpleInterestInput {
                principal: -5.0,
                annual_rate: 5.0,
                years: 1.0
            })
            .is_err()
        );
        assert!(
            sip(&SipInput {
                monthly_investment: 100.0,
                annual_rate: 150.0,
                years: 1.0
            })
            .is_err()
        );
        assert!(
            etf(&EtfInput {
                initial_investment: 0.0,
                monthly_sip: 0.0,
                expected_annual_return: 10.0,
                expense_ratio: 0.0,
                years: 5.0
            })
            .is_err()
        );
    }
}
