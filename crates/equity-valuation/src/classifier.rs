use serde::{Deserialize, Serialize};
use valuation_core::{stats, BusinessPattern, FinancialPeriod};

use crate::config::{ValuationConfig, MIN_PERIODS_FOR_CLASSIFICATION};

/// Pattern label plus the two scores it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAssessment {
    pub pattern: BusinessPattern,
    pub volatility_score: f64,
    pub growth_rate: f64,
    pub ebit_sign_change: bool,
}

impl PatternAssessment {
    fn insufficient_data() -> Self {
        Self {
            pattern: BusinessPattern::Stable,
            volatility_score: 0.0,
            growth_rate: 0.0,
            ebit_sign_change: false,
        }
    }
}

/// Business pattern classifier
#[derive(Debug, Clone, Copy)]
pub struct PatternClassifier {
    growth_threshold: f64,
    volatility_threshold: f64,
}

impl PatternClassifier {
    pub fn new(config: &ValuationConfig) -> Self {
        Self {
            growth_threshold: config.growth_threshold,
            volatility_threshold: config.volatility_threshold,
        }
    }

    /// Classify a history given newest period first.
    pub fn classify<'a, I>(&self, periods: I) -> PatternAssessment
    where
        I: IntoIterator<Item = &'a FinancialPeriod>,
    {
        let mut count = 0usize;
        let mut revenues = Vec::new();
        let mut ebits = Vec::new();
        for period in periods {
            count += 1;
            let revenue = period.revenue();
            if revenue > 0.0 {
                revenues.push(revenue);
            }
            ebits.push(period.ebit());
        }

        if count < MIN_PERIODS_FOR_CLASSIFICATION {
            return PatternAssessment::insufficient_data();
        }

        let volatility_score = stats::coefficient_of_variation(&revenues);
        let growth_rate = match (revenues.first(), revenues.last()) {
            (Some(&newest), Some(&oldest)) => {
                stats::cagr(newest, oldest, revenues.len().saturating_sub(1))
            }
            _ => 0.0,
        };
        let ebit_sign_change = stats::has_sign_change(&ebits);

        let pattern = if growth_rate > self.growth_threshold {
            BusinessPattern::Growth
        } else if ebit_sign_change || volatility_score > self.volatility_threshold {
            BusinessPattern::Cyclical
        } else {
            BusinessPattern::Stable
        };

        PatternAssessment {
            pattern,
            volatility_score,
            growth_rate,
            ebit_sign_change,
        }
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new(&ValuationConfig::default())
    }
}
