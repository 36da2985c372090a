use valuation_core::{numeric::or_zero, IncomeStatement};

use crate::config::DepreciationSign;

/// Estimate EBITDA for a period that did not report one.
///
/// Returns `None` when EBITDA was provided (non-zero), when EBIT is zero, or
/// when there is no depreciation figure to add back.
pub fn estimate_ebitda(income: &IncomeStatement, sign: DepreciationSign) -> Option<f64> {
    if provided_ebitda(income).is_some() {
        return None;
    }
    let ebit = or_zero(income.ebit);
    if ebit == 0.0 {
        return None;
    }
    let depreciation = income.depreciation.filter(|d| *d != 0.0)?;
    let estimate = match sign {
        DepreciationSign::AsStored => ebit - depreciation,
        DepreciationSign::Expense => ebit + depreciation.abs(),
    };
    Some(estimate)
}

/// EBITDA as reported, treating zero as not reported.
pub fn provided_ebitda(income: &IncomeStatement) -> Option<f64> {
    income.ebitda.filter(|v| *v != 0.0)
}

/// EBITDA used for aggregation: reported, else estimated, else 0.
pub fn effective_ebitda(income: &IncomeStatement, estimated: Option<f64>) -> f64 {
    provided_ebitda(income).or(estimated).unwrap_or(0.0)
}
