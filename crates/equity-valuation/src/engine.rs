use rayon::prelude::*;
use valuation_core::{
    CompanyFinancials, CompanyValuator, DocumentWeighting, EnrichedPeriod, FinancialFigures,
    FinancialPeriod, PeriodWeighting, ValuationMetrics, ValuationReport, ValuationResult,
    ValuationStatus, WeightingScope,
};

use crate::aggregator::{aggregate, period_figures, with_fallback};
use crate::averaging::average_equity;
use crate::calculator::EquityValuationCalculator;
use crate::classifier::PatternClassifier;
use crate::config::ValuationConfig;
use crate::ebitda::{effective_ebitda, estimate_ebitda};
use crate::weights::build_weighting;

/// A period borrowed from its document, tagged with where it came from.
#[derive(Debug, Clone, Copy)]
struct PooledPeriod<'a> {
    document_index: usize,
    period: &'a FinancialPeriod,
}

/// Which weights apply to which pooled period, and which periods feed the
/// weighted figures.
struct WeightingPlan {
    documents: Vec<DocumentWeighting>,
    /// Aligned with the pooled period list
    period_weights: Vec<f64>,
    primary: PeriodWeighting,
    /// Pooled indices aggregated into the weighted figures
    members: Vec<usize>,
}

/// Multi-period weighted equity valuation engine
pub struct ValuationEngine {
    config: ValuationConfig,
    classifier: PatternClassifier,
    calculator: EquityValuationCalculator,
}

impl ValuationEngine {
    pub fn new(config: ValuationConfig) -> ValuationResult<Self> {
        config.validate()?;
        Ok(Self {
            classifier: PatternClassifier::new(&config),
            calculator: EquityValuationCalculator::new(),
            config,
        })
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Run the full pipeline for one company. Never fails: degenerate input
    /// is reported through [`ValuationStatus`].
    pub fn value_company(&self, company: &CompanyFinancials) -> ValuationReport {
        let scope = self.config.weighting_scope;
        let pooled = pool_periods(company);
        if pooled.is_empty() {
            tracing::warn!("{}: no financial periods, nothing to value", company.company_id);
            return ValuationReport::empty(&company.company_id, scope);
        }

        let estimates: Vec<Option<f64>> = pooled
            .iter()
            .map(|p| estimate_ebitda(&p.period.income_statement, self.config.depreciation_sign))
            .collect();
        let figures: Vec<FinancialFigures> = pooled
            .iter()
            .zip(&estimates)
            .map(|(p, est)| period_figures(p.period, effective_ebitda(&p.period.income_statement, *est)))
            .collect();

        let plan = match scope {
            WeightingScope::Company => self.plan_company(company, &pooled),
            WeightingScope::Document => self.plan_per_document(company, &pooled),
        };
        tracing::debug!(
            "{}: {} pattern over {} periods (alpha {:.2}, growth {:.3}, volatility {:.3})",
            company.company_id,
            plan.primary.pattern,
            plan.members.len(),
            plan.primary.alpha,
            plan.primary.growth_rate,
            plan.primary.volatility_score
        );

        let member_figures: Vec<FinancialFigures> = plan.members.iter().map(|&i| figures[i]).collect();
        let member_weights: Vec<f64> = plan.members.iter().map(|&i| plan.period_weights[i]).collect();
        let weighted = aggregate(&member_figures, &member_weights);
        let resolved = with_fallback(&weighted, &figures[0]);
        tracing::debug!(
            "{}: weighted revenue {:.0}, ebit {:.0}, ebitda {:.0}, net income {:.0}",
            company.company_id,
            resolved.revenue,
            resolved.ebit,
            resolved.ebitda,
            resolved.net_income
        );

        let newest = pooled[0].period;
        let breakdown = self.calculator.calculate(newest, &resolved);
        for method in &breakdown.methods {
            tracing::debug!(
                "{}: {} x{:.2} on {:.0} => equity {:.0} ({})",
                company.company_id,
                method.method.name(),
                method.multiple,
                method.figure,
                method.equity_value(),
                if method.is_business_based() { "business-based" } else { "not applicable" }
            );
        }
        let averaged = average_equity(&breakdown, self.config.range_band);

        let status = if averaged.included_count == 0 {
            tracing::warn!(
                "{}: no positive valuation basis, valuation not meaningful",
                company.company_id
            );
            ValuationStatus::NotMeaningful
        } else {
            ValuationStatus::Valued
        };
        tracing::info!(
            "{}: equity value {:.0} ({} methods, range {:.0} - {:.0})",
            company.company_id,
            averaged.average,
            averaged.included_count,
            averaged.range.low,
            averaged.range.high
        );

        let metrics = ValuationMetrics {
            book_value: breakdown.book_value,
            net_debt: breakdown.net_debt,
            asset_based_value: breakdown.asset_based_value,
            methods: breakdown.methods,
            average_equity_valuation: averaged.average,
            methods_included_count: averaged.included_count,
            equity_valuation_range: averaged.range,
        };

        let periods = pooled
            .iter()
            .enumerate()
            .map(|(i, p)| EnrichedPeriod {
                document_id: company.documents[p.document_index].id.clone(),
                weight: plan.period_weights[i],
                ebitda_estimated: estimates[i],
                weighted_figures: (i == 0).then_some(weighted),
                period: p.period.clone(),
            })
            .collect();

        ValuationReport {
            company_id: company.company_id.clone(),
            status,
            scope,
            weighting: Some(plan.primary),
            documents: plan.documents,
            periods,
            metrics: Some(metrics),
        }
    }

    /// Value many companies in parallel. Output order matches input order.
    pub fn value_companies(&self, companies: &[CompanyFinancials]) -> Vec<ValuationReport> {
        companies
            .par_iter()
            .map(|company| self.value_company(company))
            .collect()
    }

    /// One weighting over every period of every document.
    fn plan_company(&self, company: &CompanyFinancials, pooled: &[PooledPeriod<'_>]) -> WeightingPlan {
        let assessment = self.classifier.classify(pooled.iter().map(|p| p.period));
        let weighting = build_weighting(&assessment, pooled.len(), &self.config);
        let documents = company
            .documents
            .iter()
            .map(|doc| DocumentWeighting {
                document_id: doc.id.clone(),
                weighting: weighting.clone(),
            })
            .collect();

        WeightingPlan {
            documents,
            period_weights: weighting.weights.clone(),
            primary: weighting,
            members: (0..pooled.len()).collect(),
        }
    }

    /// A separate weighting per document; the document holding the newest
    /// period drives the valuation.
    fn plan_per_document(
        &self,
        company: &CompanyFinancials,
        pooled: &[PooledPeriod<'_>],
    ) -> WeightingPlan {
        let mut period_weights = vec![0.0; pooled.len()];
        let mut per_document: Vec<(Vec<usize>, PeriodWeighting)> =
            Vec::with_capacity(company.documents.len());

        for document_index in 0..company.documents.len() {
            let indices: Vec<usize> = pooled
                .iter()
                .enumerate()
                .filter(|(_, p)| p.document_index == document_index)
                .map(|(i, _)| i)
                .collect();
            let assessment = self
                .classifier
                .classify(indices.iter().map(|&i| pooled[i].period));
            let weighting = build_weighting(&assessment, indices.len(), &self.config);
            for (position, &i) in indices.iter().enumerate() {
                period_weights[i] = weighting.weights[position];
            }
            per_document.push((indices, weighting));
        }

        let documents = company
            .documents
            .iter()
            .zip(&per_document)
            .map(|(doc, (_, weighting))| DocumentWeighting {
                document_id: doc.id.clone(),
                weighting: weighting.clone(),
            })
            .collect();
        let (members, primary) = per_document.swap_remove(pooled[0].document_index);

        WeightingPlan {
            documents,
            period_weights,
            primary,
            members,
        }
    }
}

impl CompanyValuator for ValuationEngine {
    fn value_company(&self, company: &CompanyFinancials) -> ValuationReport {
        ValuationEngine::value_company(self, company)
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self {
            config: ValuationConfig::default(),
            classifier: PatternClassifier::default(),
            calculator: EquityValuationCalculator::default(),
        }
    }
}

/// Every period of every document, newest first by period end date.
/// Undated periods sort last; ties keep document order.
fn pool_periods(company: &CompanyFinancials) -> Vec<PooledPeriod<'_>> {
    let mut pooled: Vec<PooledPeriod<'_>> = company
        .documents
        .iter()
        .enumerate()
        .flat_map(|(document_index, doc)| {
            doc.periods.iter().map(move |period| PooledPeriod {
                document_index,
                period,
            })
        })
        .collect();
    pooled.sort_by(|a, b| b.period.end_date().cmp(&a.period.end_date()));
    pooled
}
