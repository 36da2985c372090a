use serde::{Deserialize, Serialize};

use crate::types::{BusinessPattern, FinancialPeriod, PeriodRange, WeightingScope};

/// Pattern-derived period weights, newest period first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWeighting {
    pub pattern: BusinessPattern,
    /// Decay parameter; higher means older periods fade faster
    pub alpha: f64,
    /// Coefficient of variation of positive revenues
    pub volatility_score: f64,
    /// Revenue CAGR over the positive-revenue periods
    pub growth_rate: f64,
    pub weights: Vec<f64>,
    pub explanation: String,
}

/// The four income-statement figures the valuation methods consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialFigures {
    pub revenue: f64,
    pub ebit: f64,
    pub ebitda: f64,
    pub net_income: f64,
}

/// Multiple-based valuation methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValuationMethod {
    RevenueMultiple,
    EbitMultiple,
    EbitdaMultiple,
    EarningsMultiple,
}

impl ValuationMethod {
    pub const ALL: [ValuationMethod; 4] = [
        ValuationMethod::RevenueMultiple,
        ValuationMethod::EbitMultiple,
        ValuationMethod::EbitdaMultiple,
        ValuationMethod::EarningsMultiple,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ValuationMethod::RevenueMultiple => "Revenue Multiple",
            ValuationMethod::EbitMultiple => "EV/EBIT",
            ValuationMethod::EbitdaMultiple => "EV/EBITDA",
            ValuationMethod::EarningsMultiple => "P/E",
        }
    }
}

/// Why a method did not produce a business-based value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotApplicableReason {
    /// Figure or multiple missing or non-positive
    NoBusinessSignal,
    /// No business signal, but the company holds net cash; that cash is
    /// already counted by the asset-based value
    CoveredByNetCash,
}

/// Applicability tag for one method's output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "applicability",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum MethodApplicability {
    BusinessBased { equity_value: f64 },
    NotApplicable { reason: NotApplicableReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodValuation {
    pub method: ValuationMethod,
    /// Financial figure the multiple was applied to
    pub figure: f64,
    pub multiple: f64,
    /// Zero for the earnings method, which values equity directly
    pub enterprise_value: f64,
    #[serde(flatten)]
    pub applicability: MethodApplicability,
}

impl MethodValuation {
    /// Equity value if this method counts towards the average.
    pub fn included_value(&self) -> Option<f64> {
        match self.applicability {
            MethodApplicability::BusinessBased { equity_value } if equity_value > 0.0 => {
                Some(equity_value)
            }
            MethodApplicability::BusinessBased { .. } => None,
            MethodApplicability::NotApplicable { .. } => None,
        }
    }

    pub fn equity_value(&self) -> f64 {
        match self.applicability {
            MethodApplicability::BusinessBased { equity_value } => equity_value,
            MethodApplicability::NotApplicable { .. } => 0.0,
        }
    }

    pub fn is_business_based(&self) -> bool {
        matches!(self.applicability, MethodApplicability::BusinessBased { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationRange {
    pub low: f64,
    pub high: f64,
}

/// Valuation output attached to the most recent period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationMetrics {
    pub book_value: f64,
    /// Interest-bearing debt minus cash; negative means net cash
    pub net_debt: f64,
    pub asset_based_value: f64,
    pub methods: Vec<MethodValuation>,
    pub average_equity_valuation: f64,
    pub methods_included_count: usize,
    pub equity_valuation_range: ValuationRange,
}

impl ValuationMetrics {
    pub fn method(&self, method: ValuationMethod) -> Option<&MethodValuation> {
        self.methods.iter().find(|m| m.method == method)
    }
}

/// Outcome of one valuation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValuationStatus {
    /// No periods at all; nothing to value
    NoData,
    /// Computed, but no method produced a positive value
    NotMeaningful,
    Valued,
}

/// One pooled period after enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPeriod {
    pub document_id: String,
    pub weight: f64,
    /// EBITDA derived from EBIT and depreciation when none was provided
    pub ebitda_estimated: Option<f64>,
    /// Present on the newest period only
    pub weighted_figures: Option<FinancialFigures>,
    #[serde(flatten)]
    pub period: FinancialPeriod,
}

impl EnrichedPeriod {
    pub fn period_range(&self) -> Option<PeriodRange> {
        self.period.period_range
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentWeighting {
    pub document_id: String,
    pub weighting: PeriodWeighting,
}

/// Everything the downstream report consumer receives for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationReport {
    pub company_id: String,
    pub status: ValuationStatus,
    pub scope: WeightingScope,
    /// Weighting that produced the weighted figures used for valuation
    pub weighting: Option<PeriodWeighting>,
    pub documents: Vec<DocumentWeighting>,
    /// Newest first
    pub periods: Vec<EnrichedPeriod>,
    pub metrics: Option<ValuationMetrics>,
}

impl ValuationReport {
    pub fn empty(company_id: &str, scope: WeightingScope) -> Self {
        Self {
            company_id: company_id.to_string(),
            status: ValuationStatus::NoData,
            scope,
            weighting: None,
            documents: Vec::new(),
            periods: Vec::new(),
            metrics: None,
        }
    }

    pub fn newest_period(&self) -> Option<&EnrichedPeriod> {
        self.periods.first()
    }

    pub fn average_equity_valuation(&self) -> f64 {
        self.metrics
            .as_ref()
            .map_or(0.0, |m| m.average_equity_valuation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_applicability_wire_format() {
        let mv = MethodValuation {
            method: ValuationMethod::RevenueMultiple,
            figure: 1_000_000.0,
            multiple: 1.0,
            enterprise_value: 1_000_000.0,
            applicability: MethodApplicability::BusinessBased {
                equity_value: 1_000_000.0,
            },
        };
        let value = serde_json::to_value(mv).unwrap();
        assert_eq!(value["method"], json!("revenueMultiple"));
        assert_eq!(value["applicability"], json!("businessBased"));
        assert_eq!(value["equityValue"], json!(1_000_000.0));

        let na = MethodValuation {
            applicability: MethodApplicability::NotApplicable {
                reason: NotApplicableReason::CoveredByNetCash,
            },
            ..mv
        };
        let value = serde_json::to_value(na).unwrap();
        assert_eq!(value["applicability"], json!("notApplicable"));
        assert_eq!(value["reason"], json!("coveredByNetCash"));
    }

    #[test]
    fn test_included_value() {
        let base = MethodValuation {
            method: ValuationMethod::EbitMultiple,
            figure: 100.0,
            multiple: 5.0,
            enterprise_value: 500.0,
            applicability: MethodApplicability::BusinessBased { equity_value: 0.0 },
        };
        // Debt swallowed the whole enterprise value
        assert_eq!(base.included_value(), None);
        assert!(base.is_business_based());

        let positive = MethodValuation {
            applicability: MethodApplicability::BusinessBased { equity_value: 450.0 },
            ..base
        };
        assert_eq!(positive.included_value(), Some(450.0));
        assert_eq!(positive.equity_value(), 450.0);
    }
}
