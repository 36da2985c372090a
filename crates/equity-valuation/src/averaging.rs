use valuation_core::{stats, ValuationRange};

use crate::calculator::EquityBreakdown;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragedValuation {
    pub average: f64,
    pub included_count: usize,
    pub range: ValuationRange,
}

/// Values that count towards the average: positive book value, positive
/// asset-based value, then every positive business-based method value.
///
/// A company with no business signal therefore falls back to book value and
/// net cash on its own; an empty list means nothing was positive.
pub fn included_values(breakdown: &EquityBreakdown) -> Vec<f64> {
    let mut values = Vec::with_capacity(breakdown.methods.len() + 2);
    if breakdown.book_value > 0.0 {
        values.push(breakdown.book_value);
    }
    if breakdown.asset_based_value > 0.0 {
        values.push(breakdown.asset_based_value);
    }
    values.extend(breakdown.methods.iter().filter_map(|m| m.included_value()));
    values
}

/// `average * (1 -/+ band)`. The low end is floored at zero unless the
/// average itself is negative.
pub fn confidence_range(average: f64, band: f64) -> ValuationRange {
    let low = average * (1.0 - band);
    ValuationRange {
        low: if average < 0.0 { low } else { low.max(0.0) },
        high: average * (1.0 + band),
    }
}

pub fn average_equity(breakdown: &EquityBreakdown, band: f64) -> AveragedValuation {
    let values = included_values(breakdown);
    let average = stats::mean(&values);
    AveragedValuation {
        average,
        included_count: values.len(),
        range: confidence_range(average, band),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use valuation_core::{MethodApplicability, MethodValuation, NotApplicableReason, ValuationMethod};

    fn business(method: ValuationMethod, equity_value: f64) -> MethodValuation {
        MethodValuation {
            method,
            figure: 0.0,
            multiple: 0.0,
            enterprise_value: equity_value,
            applicability: MethodApplicability::BusinessBased { equity_value },
        }
    }

    fn not_applicable(method: ValuationMethod) -> MethodValuation {
        MethodValuation {
            method,
            figure: 0.0,
            multiple: 0.0,
            enterprise_value: 0.0,
            applicability: MethodApplicability::NotApplicable {
                reason: NotApplicableReason::CoveredByNetCash,
            },
        }
    }

    #[test]
    fn test_revenue_and_book_value_average() {
        let breakdown = EquityBreakdown {
            book_value: 300_000.0,
            net_debt: 0.0,
            asset_based_value: 0.0,
            methods: vec![
                business(ValuationMethod::RevenueMultiple, 1_000_000.0),
                not_applicable(ValuationMethod::EbitMultiple),
            ],
        };
        let result = average_equity(&breakdown, 0.2);
        assert_eq!(result.included_count, 2);
        assert_relative_eq!(result.average, 650_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.range.low, 520_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.range.high, 780_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_business_value_is_excluded() {
        let breakdown = EquityBreakdown {
            book_value: 100.0,
            net_debt: 500.0,
            asset_based_value: 0.0,
            methods: vec![business(ValuationMethod::EbitMultiple, 0.0)],
        };
        assert_eq!(included_values(&breakdown), vec![100.0]);
    }

    #[test]
    fn test_nothing_positive_gives_zero() {
        let breakdown = EquityBreakdown {
            book_value: -20_000.0,
            net_debt: 20_000.0,
            asset_based_value: 0.0,
            methods: vec![not_applicable(ValuationMethod::RevenueMultiple)],
        };
        let result = average_equity(&breakdown, 0.2);
        assert_eq!(result.average, 0.0);
        assert_eq!(result.included_count, 0);
        assert_eq!(result.range, ValuationRange { low: 0.0, high: 0.0 });
    }

    #[test]
    fn test_range_low_is_clamped_only_for_non_negative_average() {
        let range = confidence_range(100.0, 0.2);
        assert_relative_eq!(range.low, 80.0, epsilon = 1e-6);
        assert_relative_eq!(range.high, 120.0, epsilon = 1e-6);

        let range = confidence_range(100.0, 0.0);
        assert_eq!(range.low, 100.0);

        let range = confidence_range(-100.0, 0.2);
        assert_relative_eq!(range.low, -80.0, epsilon = 1e-6);
        assert_relative_eq!(range.high, -120.0, epsilon = 1e-6);
    }
}
