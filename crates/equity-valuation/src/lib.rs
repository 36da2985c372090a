//! Equity Valuation Module
//!
//! Values a company from several fiscal periods at once. Each history is
//! classified as growth, cyclical or stable, periods are weighted with an
//! exponential decay tuned to that pattern, and the weighted figures are
//! priced with revenue, EBIT, EBITDA and P/E multiples alongside book value
//! and net cash.

pub mod aggregator;
pub mod averaging;
pub mod calculator;
pub mod classifier;
pub mod config;
pub mod ebitda;
pub mod engine;
pub mod weights;


pub use averaging::{average_equity, AveragedValuation};
pub use calculator::{EquityBreakdown, EquityValuationCalculator};
pub use classifier::{PatternAssessment, PatternClassifier};
pub use config::{DepreciationSign, ValuationConfig};
pub use ebitda::estimate_ebitda;
pub use engine::ValuationEngine;
pub use weights::{build_weighting, decay_weights};
