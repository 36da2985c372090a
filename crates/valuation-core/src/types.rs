use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::numeric::{coerce, or_zero};

/// Fiscal period boundaries (date-only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Normalized income statement for one fiscal period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub other_income: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub materials_and_services: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub personnel_expenses: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub other_expenses: Option<f64>,
    /// Stored with whatever sign the upstream extractor used; often negative.
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub depreciation: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub ebit: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub ebitda: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub financial_income_expenses: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub taxes: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub net_income: Option<f64>,
}

/// Balance sheet. Only the three totals feed the valuation; the remaining
/// line items are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub total_assets: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub total_liabilities: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub equity: Option<f64>,
    #[serde(flatten)]
    pub other_items: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashAndDebt {
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub cash: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub interest_bearing_debt: Option<f64>,
}

/// An externally determined multiple with the reasoning behind it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationMultiple {
    #[serde(default, deserialize_with = "crate::numeric::lenient")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "crate::numeric::or_none")]
    pub justification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationMultiples {
    #[serde(default, deserialize_with = "lenient_multiple")]
    pub revenue_multiple: Option<ValuationMultiple>,
    #[serde(default, deserialize_with = "lenient_multiple")]
    pub ev_to_ebit: Option<ValuationMultiple>,
    #[serde(default, deserialize_with = "lenient_multiple")]
    pub ev_to_ebitda: Option<ValuationMultiple>,
    #[serde(default, deserialize_with = "lenient_multiple")]
    pub price_to_earnings: Option<ValuationMultiple>,
}

impl ValuationMultiples {
    fn value_of(multiple: &Option<ValuationMultiple>) -> f64 {
        or_zero(multiple.as_ref().and_then(|m| m.value))
    }

    pub fn revenue(&self) -> f64 {
        Self::value_of(&self.revenue_multiple)
    }

    pub fn ev_ebit(&self) -> f64 {
        Self::value_of(&self.ev_to_ebit)
    }

    pub fn ev_ebitda(&self) -> f64 {
        Self::value_of(&self.ev_to_ebitda)
    }

    pub fn price_earnings(&self) -> f64 {
        Self::value_of(&self.price_to_earnings)
    }
}

/// One fiscal period extracted from one source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialPeriod {
    #[serde(default, deserialize_with = "crate::numeric::or_none")]
    pub period_range: Option<PeriodRange>,
    #[serde(default, deserialize_with = "crate::numeric::or_default")]
    pub income_statement: IncomeStatement,
    #[serde(default, deserialize_with = "crate::numeric::or_default")]
    pub balance_sheet: BalanceSheet,
    #[serde(default, deserialize_with = "crate::numeric::or_default")]
    pub cash_and_debt: CashAndDebt,
    #[serde(default, deserialize_with = "crate::numeric::or_default")]
    pub valuation_multiples: ValuationMultiples,
}

/// A multiple is normally `{value, justification}`, but a bare number or
/// numeric string is taken as the value. Anything else counts as missing.
fn lenient_multiple<'de, D>(deserializer: D) -> Result<Option<ValuationMultiple>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let multiple = match value {
        object @ Value::Object(_) => serde_json::from_value(object).ok(),
        other => coerce(&other).map(|v| ValuationMultiple {
            value: Some(v),
            justification: None,
        }),
    };
    Ok(multiple)
}

impl FinancialPeriod {
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.period_range.map(|r| r.end)
    }

    pub fn revenue(&self) -> f64 {
        or_zero(self.income_statement.revenue)
    }

    pub fn ebit(&self) -> f64 {
        or_zero(self.income_statement.ebit)
    }

    pub fn net_income(&self) -> f64 {
        or_zero(self.income_statement.net_income)
    }

    pub fn equity(&self) -> f64 {
        or_zero(self.balance_sheet.equity)
    }

    pub fn total_assets(&self) -> f64 {
        or_zero(self.balance_sheet.total_assets)
    }

    pub fn total_liabilities(&self) -> f64 {
        or_zero(self.balance_sheet.total_liabilities)
    }

    pub fn cash(&self) -> f64 {
        or_zero(self.cash_and_debt.cash)
    }

    pub fn interest_bearing_debt(&self) -> f64 {
        or_zero(self.cash_and_debt.interest_bearing_debt)
    }
}

/// Ordered periods from one source file (one filing, one upload).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, deserialize_with = "crate::numeric::or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::numeric::each_or_default")]
    pub periods: Vec<FinancialPeriod>,
}

/// Everything known about one company's financials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFinancials {
    #[serde(default, deserialize_with = "crate::numeric::or_default")]
    pub company_id: String,
    #[serde(default, deserialize_with = "crate::numeric::each_or_default")]
    pub documents: Vec<Document>,
}

impl CompanyFinancials {
    pub fn period_count(&self) -> usize {
        self.documents.iter().map(|d| d.periods.len()).sum()
    }
}

/// Business trajectory classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum BusinessPattern {
    /// Compound revenue growth above the growth threshold
    Growth,

    /// EBIT flips sign or revenue swings widely
    Cyclical,

    /// Everything else, including histories too short to judge
    Stable,
}

impl BusinessPattern {
    pub fn name(&self) -> &'static str {
        match self {
            BusinessPattern::Growth => "growth",
            BusinessPattern::Cyclical => "cyclical",
            BusinessPattern::Stable => "stable",
        }
    }

    /// Parse a free-form label. Unrecognized labels map to `Stable`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "growth" => BusinessPattern::Growth,
            "cyclical" => BusinessPattern::Cyclical,
            _ => BusinessPattern::Stable,
        }
    }
}

impl From<String> for BusinessPattern {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl std::fmt::Display for BusinessPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether periods are pooled across a company's documents before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightingScope {
    #[default]
    Company,
    Document,
}

impl std::str::FromStr for WeightingScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "company" => Ok(WeightingScope::Company),
            "document" => Ok(WeightingScope::Document),
            other => Err(format!("unknown weighting scope '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_period_decodes_lenient_figures() {
        let period: FinancialPeriod = serde_json::from_value(json!({
            "periodRange": {"start": "2023-01-01", "end": "2023-12-31"},
            "incomeStatement": {
                "revenue": "1,200,000",
                "ebit": 150000,
                "ebitda": null,
                "netIncome": "n/a"
            },
            "balanceSheet": {"equity": 400000, "inventories": 35000},
            "cashAndDebt": {"cash": 90000},
            "valuationMultiples": {
                "revenueMultiple": {"value": "0.8", "justification": "sector median"}
            }
        }))
        .unwrap();

        assert_eq!(period.revenue(), 1_200_000.0);
        assert_eq!(period.ebit(), 150_000.0);
        assert_eq!(period.income_statement.ebitda, None);
        assert_eq!(period.net_income(), 0.0);
        assert_eq!(period.interest_bearing_debt(), 0.0);
        assert_eq!(period.valuation_multiples.revenue(), 0.8);
        assert_eq!(period.valuation_multiples.ev_ebit(), 0.0);
        assert_eq!(period.balance_sheet.other_items.get("inventories"), Some(&json!(35000)));
        assert_eq!(
            period.end_date(),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_empty_period_is_valid() {
        let period: FinancialPeriod = serde_json::from_value(json!({})).unwrap();
        assert_eq!(period.revenue(), 0.0);
        assert!(period.period_range.is_none());
    }

    #[test]
    fn test_null_and_malformed_sections_decode_as_empty() {
        let period: FinancialPeriod = serde_json::from_value(json!({
            "periodRange": {"start": "2023-01-01"},
            "incomeStatement": null,
            "balanceSheet": [1, 2, 3],
            "cashAndDebt": {"cash": "25,000"},
            "valuationMultiples": null
        }))
        .unwrap();

        assert!(period.period_range.is_none());
        assert_eq!(period.income_statement, IncomeStatement::default());
        assert_eq!(period.balance_sheet, BalanceSheet::default());
        assert_eq!(period.cash(), 25_000.0);
        assert_eq!(period.valuation_multiples, ValuationMultiples::default());
    }

    #[test]
    fn test_bad_period_dates_are_dropped() {
        let period: FinancialPeriod = serde_json::from_value(json!({
            "periodRange": {"start": "2023-01-01", "end": "31.12.2023"},
            "incomeStatement": {"revenue": 500}
        }))
        .unwrap();
        assert!(period.end_date().is_none());
        assert_eq!(period.revenue(), 500.0);
    }

    #[test]
    fn test_bare_number_multiples() {
        let multiples: ValuationMultiples = serde_json::from_value(json!({
            "revenueMultiple": 1.2,
            "evToEbit": "8.5",
            "evToEbitda": "n/a",
            "priceToEarnings": {"value": 14, "justification": 3}
        }))
        .unwrap();

        assert_eq!(
            multiples.revenue_multiple,
            Some(ValuationMultiple {
                value: Some(1.2),
                justification: None
            })
        );
        assert_eq!(multiples.ev_ebit(), 8.5);
        assert!(multiples.ev_to_ebitda.is_none());
        assert_eq!(multiples.price_earnings(), 14.0);
    }

    #[test]
    fn test_malformed_periods_keep_their_place() {
        let company: CompanyFinancials = serde_json::from_value(json!({
            "companyId": null,
            "documents": [{
                "id": "fy.pdf",
                "periods": [null, {"incomeStatement": {"revenue": 10}}, "garbage"]
            }]
        }))
        .unwrap();

        assert_eq!(company.company_id, "");
        assert_eq!(company.period_count(), 3);
        assert_eq!(company.documents[0].periods[1].revenue(), 10.0);
        assert_eq!(company.documents[0].periods[0], FinancialPeriod::default());
    }

    #[test]
    fn test_pattern_labels_decode_leniently() {
        let pattern: BusinessPattern = serde_json::from_value(json!("Growth")).unwrap();
        assert_eq!(pattern, BusinessPattern::Growth);
        let pattern: BusinessPattern = serde_json::from_value(json!("turnaround")).unwrap();
        assert_eq!(pattern, BusinessPattern::Stable);
        assert_eq!(serde_json::to_value(BusinessPattern::Cyclical).unwrap(), json!("cyclical"));
    }

    #[test]
    fn test_pattern_from_label() {
        assert_eq!(BusinessPattern::from_label("Growth"), BusinessPattern::Growth);
        assert_eq!(BusinessPattern::from_label(" cyclical "), BusinessPattern::Cyclical);
        assert_eq!(BusinessPattern::from_label("stable"), BusinessPattern::Stable);
        assert_eq!(BusinessPattern::from_label("turnaround"), BusinessPattern::Stable);
    }

    #[test]
    fn test_weighting_scope_from_str() {
        assert_eq!("Document".parse::<WeightingScope>(), Ok(WeightingScope::Document));
        assert_eq!("company".parse::<WeightingScope>(), Ok(WeightingScope::Company));
        assert!("global".parse::<WeightingScope>().is_err());
    }
}
