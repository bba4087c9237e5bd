//! Portfolio valuation
//!
//! Investments grow at their snapshot rate, compounded yearly, from
//! `invested_at` until now or the maturity date, whichever comes first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::investment::{self, STATUS_ACTIVE, STATUS_CANCELLED, STATUS_MATURED};
use crate::utils::format::{format_currency, format_percentage, round2};

fn parse(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Value of an investment at `now`. Cancelled investments are worth their refunded principal.
pub fn current_value(investment: &investment::Model, now: DateTime<Utc>) -> f64 {
    if investment.status == STATUS_CANCELLED {
        return investment.amount;
    }

    let Some(start) = parse(&investment.invested_at) else {
        return investment.amount;
    };
    let end = investment
        .maturity_date
        .as_deref()
        .and_then(parse)
        .map_or(now, |maturity| maturity.min(now));

    let years = (end - start).num_seconds().max(0) as f64 / (365.0 * 86_400.0);
    investment.amount * (1.0 + investment.expected_return / 100.0).powf(years)
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAllocation {
    pub category: String,
    pub amount: f64,
    pub current_value: f64,
    /// Share of the total invested amount
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormattedTotals {
    pub total_invested: String,
    pub current_value: String,
    pub total_gain: String,
    pub gain_percentage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub current_value: f64,
    pub total_gain: f64,
    pub gain_percentage: f64,
    pub active_count: u64,
    pub matured_count: u64,
    pub cancelled_count: u64,
    pub allocation: Vec<CategoryAllocation>,
    pub formatted: FormattedTotals,
}

/// Summarise `(investment, product category)` pairs.
pub fn summarize(
    holdings: &[(investment::Model, String)],
    now: DateTime<Utc>,
    currency: &str,
) -> PortfolioSummary {
    let mut total_invested = 0.0;
    let mut total_value = 0.0;
    let (mut active_count, mut matured_count, mut cancelled_count) = (0, 0, 0);
    let mut by_category: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for (inv, category) in holdings {
        match inv.status.as_str() {
            STATUS_CANCELLED => {
                cancelled_count += 1;
                continue;
            }
            STATUS_MATURED => matured_count += 1,
            STATUS_ACTIVE => active_count += 1,
            other => {
                tracing::warn!("Investment {} has unknown status '{}'", inv.id, other);
                continue;
            }
        }

        let value = current_value(inv, now);
        total_invested += inv.amount;
        total_value += value;
        let entry = by_category.entry(category.as_str()).or_insert((0.0, 0.0));
        entry.0 += inv.amount;
        entry.1 += value;
    }

    let allocation = by_category
        .into_iter()
        .map(|(category, (amount, value))| CategoryAllocation {
            category: category.to_string(),
            amount: round2(amount),
            current_value: round2(value),
            percentage: if total_invested > 0.0 {
                round2(amount / total_invested * 100.0)
            } else {
                0.0
            },
        })
        .collect();

    let total_gain = total_value - total_invested;
    let gain_percentage = if total_invested > 0.0 {
        total_gain / total_invested * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        total_invested: round2(total_invested),
        current_value: round2(total_value),
        total_gain: round2(total_gain),
        gain_percentage: round2(gain_percentage),
        active_count,
        matured_count,
        cancelled_count,
        allocation,
        formatted: FormattedTotals {
            total_invested: format_currency(total_invested, currency),
            current_value: format_currency(total_value, currency),
            total_gain: format_currency(total_gain, currency),
            gain_percentage: format_percentage(gain_percentage, 2),
        },
    }
}
