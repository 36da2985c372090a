use crate::{CompanyFinancials, ValuationReport};

/// Trait for engines that turn a company's financial documents into a
/// valuation report.
///
/// Implementations must be pure: the same input always yields the same
/// report, and no state carries over between calls.
pub trait CompanyValuator: Send + Sync {
    fn value_company(&self, company: &CompanyFinancials) -> ValuationReport;
}
