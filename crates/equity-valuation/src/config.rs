use std::env;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use valuation_core::{BusinessPattern, ValuationError, ValuationResult, WeightingScope};

/// Decay parameter for growth businesses: recent periods dominate.
pub const GROWTH_ALPHA: f64 = 0.9;
/// Decay parameter for cyclical businesses: weight spread across the cycle.
pub const CYCLICAL_ALPHA: f64 = 0.5;
/// Decay parameter for stable businesses and unrecognized labels.
pub const STABLE_ALPHA: f64 = 0.7;

/// Revenue CAGR above which a history counts as growth.
pub const GROWTH_THRESHOLD: f64 = 0.15;
/// Revenue coefficient of variation above which a history counts as cyclical.
pub const VOLATILITY_THRESHOLD: f64 = 0.25;
/// Half-width of the confidence range around the average equity value.
pub const RANGE_BAND: f64 = 0.2;
/// Shorter histories are always classified stable.
pub const MIN_PERIODS_FOR_CLASSIFICATION: usize = 2;

/// How the stored depreciation figure combines with EBIT when EBITDA has to
/// be estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DepreciationSign {
    /// `ebit - depreciation`, sign taken as stored. Upstream usually stores
    /// depreciation as a negative expense, which turns this into an addition.
    #[default]
    AsStored,
    /// Depreciation is a magnitude: `ebit + |depreciation|`.
    Expense,
}

impl FromStr for DepreciationSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "as_stored" | "asstored" | "stored" => Ok(DepreciationSign::AsStored),
            "expense" | "magnitude" => Ok(DepreciationSign::Expense),
            other => Err(format!("unknown depreciation sign convention '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationConfig {
    pub growth_alpha: f64,
    pub cyclical_alpha: f64,
    pub stable_alpha: f64,
    pub growth_threshold: f64,
    pub volatility_threshold: f64,
    pub range_band: f64,
    pub weighting_scope: WeightingScope,
    pub depreciation_sign: DepreciationSign,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            growth_alpha: GROWTH_ALPHA,
            cyclical_alpha: CYCLICAL_ALPHA,
            stable_alpha: STABLE_ALPHA,
            growth_threshold: GROWTH_THRESHOLD,
            volatility_threshold: VOLATILITY_THRESHOLD,
            range_band: RANGE_BAND,
            weighting_scope: WeightingScope::Company,
            depreciation_sign: DepreciationSign::AsStored,
        }
    }
}

impl ValuationConfig {
    /// Load from `VALUATION_*` environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> ValuationResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`, so callers can supply their own source.
    pub fn from_lookup<F>(lookup: F) -> ValuationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            growth_alpha: parse_var(&lookup, "VALUATION_GROWTH_ALPHA", defaults.growth_alpha)?,
            cyclical_alpha: parse_var(&lookup, "VALUATION_CYCLICAL_ALPHA", defaults.cyclical_alpha)?,
            stable_alpha: parse_var(&lookup, "VALUATION_STABLE_ALPHA", defaults.stable_alpha)?,
            growth_threshold: parse_var(
                &lookup,
                "VALUATION_GROWTH_THRESHOLD",
                defaults.growth_threshold,
            )?,
            volatility_threshold: parse_var(
                &lookup,
                "VALUATION_VOLATILITY_THRESHOLD",
                defaults.volatility_threshold,
            )?,
            range_band: parse_var(&lookup, "VALUATION_RANGE_BAND", defaults.range_band)?,
            weighting_scope: parse_var(
                &lookup,
                "VALUATION_WEIGHTING_SCOPE",
                defaults.weighting_scope,
            )?,
            depreciation_sign: parse_var(
                &lookup,
                "VALUATION_DEPRECIATION_SIGN",
                defaults.depreciation_sign,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ValuationResult<()> {
        for (name, alpha) in [
            ("growth_alpha", self.growth_alpha),
            ("cyclical_alpha", self.cyclical_alpha),
            ("stable_alpha", self.stable_alpha),
        ] {
            if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
                return Err(ValuationError::InvalidConfig(format!(
                    "{name} must be strictly between 0 and 1, got {alpha}"
                )));
            }
        }
        if self.growth_threshold.is_nan() || self.growth_threshold < 0.0 {
            return Err(ValuationError::InvalidConfig(
                "growth_threshold must be non-negative".to_string(),
            ));
        }
        if self.volatility_threshold.is_nan() || self.volatility_threshold < 0.0 {
            return Err(ValuationError::InvalidConfig(
                "volatility_threshold must be non-negative".to_string(),
            ));
        }
        if self.range_band.is_nan() || self.range_band < 0.0 || self.range_band >= 1.0 {
            return Err(ValuationError::InvalidConfig(format!(
                "range_band must be in [0, 1), got {}",
                self.range_band
            )));
        }
        Ok(())
    }

    /// Decay parameter for a business pattern.
    pub fn alpha_for(&self, pattern: BusinessPattern) -> f64 {
        match pattern {
            BusinessPattern::Growth => self.growth_alpha,
            BusinessPattern::Cyclical => self.cyclical_alpha,
            BusinessPattern::Stable => self.stable_alpha,
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> ValuationResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| ValuationError::InvalidConfig(format!("{key}={raw}: {e}"))),
        _ => Ok(default),
    }
}
