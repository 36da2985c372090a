use valuation_core::{BusinessPattern, PeriodWeighting};

use crate::classifier::PatternAssessment;
use crate::config::ValuationConfig;

/// Exponentially decaying weights, newest first, normalized to sum to 1.
///
/// Raw weight at position `i` is `(1 - alpha)^i`. Returns an empty vector
/// for zero periods.
pub fn decay_weights(alpha: f64, count: usize) -> Vec<f64> {
    let retention = 1.0 - alpha;
    let raw: Vec<f64> = (0..count).map(|i| retention.powi(i as i32)).collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return raw;
    }
    raw.into_iter().map(|w| w / total).collect()
}

/// Build the full weighting record for `count` periods.
pub fn build_weighting(
    assessment: &PatternAssessment,
    count: usize,
    config: &ValuationConfig,
) -> PeriodWeighting {
    let alpha = config.alpha_for(assessment.pattern);
    PeriodWeighting {
        pattern: assessment.pattern,
        alpha,
        volatility_score: assessment.volatility_score,
        growth_rate: assessment.growth_rate,
        weights: decay_weights(alpha, count),
        explanation: explanation(assessment, alpha),
    }
}

fn explanation(assessment: &PatternAssessment, alpha: f64) -> String {
    let detail = format!(
        "alpha {:.2}, revenue CAGR {:.1}%, revenue volatility {:.2}",
        alpha,
        assessment.growth_rate * 100.0,
        assessment.volatility_score
    );
    match assessment.pattern {
        BusinessPattern::Growth => format!(
            "Growth business: the most recent periods carry almost all of the weight, \
             since earlier figures understate current earning power ({detail})."
        ),
        BusinessPattern::Cyclical => format!(
            "Cyclical business: weight is spread across periods to average out the cycle ({detail})."
        ),
        BusinessPattern::Stable => format!(
            "Stable business: recent periods weigh more, older periods still contribute ({detail})."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assessment(pattern: BusinessPattern) -> PatternAssessment {
        PatternAssessment {
            pattern,
            volatility_score: 0.1,
            growth_rate: 0.05,
            ebit_sign_change: false,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let config = ValuationConfig::default();
        for pattern in [
            BusinessPattern::Growth,
            BusinessPattern::Cyclical,
            BusinessPattern::Stable,
        ] {
            for count in 1..=12 {
                let weights = decay_weights(config.alpha_for(pattern), count);
                assert_eq!(weights.len(), count);
                assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_weights_decay_monotonically() {
        let config = ValuationConfig::default();
        for pattern in [
            BusinessPattern::Growth,
            BusinessPattern::Cyclical,
            BusinessPattern::Stable,
        ] {
            let weights = decay_weights(config.alpha_for(pattern), 8);
            for pair in weights.windows(2) {
                assert!(pair[0] >= pair[1], "{pattern}: {weights:?}");
            }
        }
    }

    #[test]
    fn test_higher_alpha_concentrates_on_newest() {
        let growth = decay_weights(0.9, 3);
        let stable = decay_weights(0.7, 3);
        let cyclical = decay_weights(0.5, 3);
        assert!(growth[0] > stable[0]);
        assert!(stable[0] > cyclical[0]);
    }

    #[test]
    fn test_cyclical_three_periods() {
        // Raw 1, 0.5, 0.25 over 1.75
        let weights = decay_weights(0.5, 3);
        assert_relative_eq!(weights[0], 4.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(weights[1], 2.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(weights[2], 1.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_period_gets_full_weight() {
        assert_eq!(decay_weights(0.7, 1), vec![1.0]);
        assert!(decay_weights(0.7, 0).is_empty());
    }

    #[test]
    fn test_build_weighting_carries_traceability() {
        let config = ValuationConfig::default();
        let weighting = build_weighting(&assessment(BusinessPattern::Growth), 2, &config);
        assert_eq!(weighting.pattern, BusinessPattern::Growth);
        assert_eq!(weighting.alpha, 0.9);
        assert_eq!(weighting.volatility_score, 0.1);
        assert_eq!(weighting.growth_rate, 0.05);
        assert_eq!(weighting.weights.len(), 2);
        assert!(weighting.explanation.starts_with("Growth business"));
        assert!(weighting.explanation.contains("alpha 0.90"));
    }
}
