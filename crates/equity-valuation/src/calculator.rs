use valuation_core::{
    FinancialFigures, FinancialPeriod, MethodApplicability, MethodValuation, NotApplicableReason,
    ValuationMethod,
};

/// Per-method equity values for the newest period, before averaging.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityBreakdown {
    pub book_value: f64,
    pub net_debt: f64,
    pub asset_based_value: f64,
    pub methods: Vec<MethodValuation>,
}

pub struct EquityValuationCalculator;

impl EquityValuationCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Reported equity when positive, otherwise assets minus liabilities.
    fn calculate_book_value(&self, period: &FinancialPeriod) -> f64 {
        let equity = period.equity();
        if equity > 0.0 {
            equity
        } else {
            period.total_assets() - period.total_liabilities()
        }
    }

    fn calculate_net_debt(&self, period: &FinancialPeriod) -> f64 {
        period.interest_bearing_debt() - period.cash()
    }

    /// Only a net cash surplus counts. Net debt is already deducted in the
    /// enterprise-value methods.
    fn calculate_asset_based_value(&self, net_debt: f64) -> f64 {
        (-net_debt).max(0.0)
    }

    fn calculate_enterprise_value(&self, figure: f64, multiple: f64) -> Option<f64> {
        if figure > 0.0 && multiple > 0.0 {
            Some(figure * multiple)
        } else {
            None
        }
    }

    /// Enterprise-value method (revenue, EBIT, EBITDA).
    pub fn value_by_multiple(
        &self,
        method: ValuationMethod,
        figure: f64,
        multiple: f64,
        net_debt: f64,
    ) -> MethodValuation {
        let enterprise_value = self.calculate_enterprise_value(figure, multiple).unwrap_or(0.0);
        let applicability = if enterprise_value > 0.0 {
            MethodApplicability::BusinessBased {
                equity_value: (enterprise_value - net_debt).max(0.0),
            }
        } else if net_debt < 0.0 {
            MethodApplicability::NotApplicable {
                reason: NotApplicableReason::CoveredByNetCash,
            }
        } else {
            MethodApplicability::NotApplicable {
                reason: NotApplicableReason::NoBusinessSignal,
            }
        };
        MethodValuation {
            method,
            figure,
            multiple,
            enterprise_value,
            applicability,
        }
    }

    /// P/E method: values equity directly, so net debt does not apply.
    pub fn value_by_earnings(&self, net_income: f64, pe_multiple: f64) -> MethodValuation {
        let applicability = if net_income > 0.0 && pe_multiple > 0.0 {
            MethodApplicability::BusinessBased {
                equity_value: net_income * pe_multiple,
            }
        } else {
            MethodApplicability::NotApplicable {
                reason: NotApplicableReason::NoBusinessSignal,
            }
        };
        MethodValuation {
            method: ValuationMethod::EarningsMultiple,
            figure: net_income,
            multiple: pe_multiple,
            enterprise_value: 0.0,
            applicability,
        }
    }

    /// Value the newest period using the (weighted) figures and that period's
    /// own balance sheet, cash position and multiples.
    pub fn calculate(&self, period: &FinancialPeriod, figures: &FinancialFigures) -> EquityBreakdown {
        let book_value = self.calculate_book_value(period);
        let net_debt = self.calculate_net_debt(period);
        let asset_based_value = self.calculate_asset_based_value(net_debt);
        let multiples = &period.valuation_multiples;

        let methods = ValuationMethod::ALL
            .iter()
            .map(|&method| match method {
                ValuationMethod::RevenueMultiple => {
                    self.value_by_multiple(method, figures.revenue, multiples.revenue(), net_debt)
                }
                ValuationMethod::EbitMultiple => {
                    self.value_by_multiple(method, figures.ebit, multiples.ev_ebit(), net_debt)
                }
                ValuationMethod::EbitdaMultiple => {
                    self.value_by_multiple(method, figures.ebitda, multiples.ev_ebitda(), net_debt)
                }
                ValuationMethod::EarningsMultiple => {
                    self.value_by_earnings(figures.net_income, multiples.price_earnings())
                }
            })
            .collect();

        EquityBreakdown {
            book_value,
            net_debt,
            asset_based_value,
            methods,
        }
    }
}

impl Default for EquityValuationCalculator {
    fn default() -> Self {
        Self::new()
    }
}
