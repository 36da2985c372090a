use valuation_core::{FinancialFigures, FinancialPeriod};

/// Raw figures for one period, with EBITDA already completed.
pub fn period_figures(period: &FinancialPeriod, ebitda: f64) -> FinancialFigures {
    FinancialFigures {
        revenue: period.revenue(),
        ebit: period.ebit(),
        ebitda,
        net_income: period.net_income(),
    }
}

/// Weighted sum of each figure. `figures` and `weights` are paired by
/// position; extra entries on either side are ignored.
pub fn aggregate(figures: &[FinancialFigures], weights: &[f64]) -> FinancialFigures {
    figures
        .iter()
        .zip(weights)
        .fold(FinancialFigures::default(), |acc, (f, &w)| FinancialFigures {
            revenue: acc.revenue + f.revenue * w,
            ebit: acc.ebit + f.ebit * w,
            ebitda: acc.ebitda + f.ebitda * w,
            net_income: acc.net_income + f.net_income * w,
        })
}

/// Per figure, keep the weighted value unless it is exactly zero, in which
/// case take the newest period's raw value.
pub fn with_fallback(weighted: &FinancialFigures, newest: &FinancialFigures) -> FinancialFigures {
    fn pick(weighted: f64, raw: f64) -> f64 {
        if weighted == 0.0 {
            raw
        } else {
            weighted
        }
    }
    FinancialFigures {
        revenue: pick(weighted.revenue, newest.revenue),
        ebit: pick(weighted.ebit, newest.ebit),
        ebitda: pick(weighted.ebitda, newest.ebitda),
        net_income: pick(weighted.net_income, newest.net_income),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn figures(revenue: f64, ebit: f64, ebitda: f64, net_income: f64) -> FinancialFigures {
        FinancialFigures {
            revenue,
            ebit,
            ebitda,
            net_income,
        }
    }

    #[test]
    fn test_weighted_sum() {
        let periods = [
            figures(1_000.0, 100.0, 150.0, 70.0),
            figures(800.0, 60.0, 110.0, 40.0),
        ];
        let result = aggregate(&periods, &[0.75, 0.25]);
        assert_relative_eq!(result.revenue, 950.0);
        assert_relative_eq!(result.ebit, 90.0);
        assert_relative_eq!(result.ebitda, 140.0);
        assert_relative_eq!(result.net_income, 62.5);
    }

    #[test]
    fn test_single_period_equals_raw() {
        let raw = figures(1_234.5, -10.0, 0.0, 3.25);
        assert_eq!(aggregate(&[raw], &[1.0]), raw);
    }

    #[test]
    fn test_losses_can_cancel_to_zero_and_fall_back() {
        let periods = [figures(100.0, 50.0, 0.0, 10.0), figures(100.0, -50.0, 0.0, -10.0)];
        let weighted = aggregate(&periods, &[0.5, 0.5]);
        assert_eq!(weighted.ebit, 0.0);

        let resolved = with_fallback(&weighted, &periods[0]);
        assert_eq!(resolved.ebit, 50.0);
        assert_eq!(resolved.net_income, 10.0);
        assert_eq!(resolved.revenue, 100.0);
        assert_eq!(resolved.ebitda, 0.0);
    }

    #[test]
    fn test_fallback_keeps_non_zero_weighted() {
        let weighted = figures(900.0, -5.0, 20.0, 1.0);
        let newest = figures(1_000.0, 30.0, 40.0, 2.0);
        assert_eq!(with_fallback(&weighted, &newest), weighted);
    }
}
