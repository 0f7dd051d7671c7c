pub mod strategy;
pub mod summary;
pub mod volatility;

use crate::types::RiskProfile;
use smallvec::SmallVec;

/// Annualization basis for daily returns
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Regime band lower bounds (inclusive). Below the first is LOW.
const MODERATE_VOL_FLOOR: f64 = 0.15;
const ELEVATED_VOL_FLOOR: f64 = 0.25;
const HIGH_VOL_FLOOR: f64 = 0.35;

/// Trailing windows reported alongside the full-history volatility
const DEFAULT_ROLLING_WINDOWS: [usize; 3] = [10, 30, 60];

/// Rolling window whose history the percentile is ranked against
const PERCENTILE_WINDOW: usize = 30;

/// How far back the percentile ranking looks (rolling observations)
const PERCENTILE_LOOKBACK: usize = 252;

/// Short-strike target delta per risk profile.
/// 0.16 sits one standard deviation out (~84% OTM at expiration).
const CONSERVATIVE_DELTA: f64 = 0.10;
const MODERATE_DELTA: f64 = 0.16;
const AGGRESSIVE_DELTA: f64 = 0.25;

/// Scales the phi-proxy leg premiums into price terms
const PREMIUM_FACTOR: f64 = 1.0;

/// Credit at or below this fails the evaluation instead of being floored
const MIN_CREDIT: f64 = 0.05;

/// Long puts must clear this to count as a real strike
const MIN_STRIKE: f64 = 1e-6;

/// Every tunable the analyzer and the strategy calculator consult, in one
/// named structure so the decision rules are inspectable and testable
/// instead of buried as module literals. `Default` gives the documented
/// values; the config layer may override the rolling windows.
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    pub trading_days_per_year: f64,
    pub moderate_vol_floor: f64,
    pub elevated_vol_floor: f64,
    pub high_vol_floor: f64,
    pub rolling_windows: SmallVec<[usize; 4]>,
    pub percentile_window: usize,
    pub percentile_lookback: usize,
    pub conservative_delta: f64,
    pub moderate_delta: f64,
    pub aggressive_delta: f64,
    pub premium_factor: f64,
    pub min_credit: f64,
    pub min_strike: f64,
}

impl AnalysisParams {
    /// The profile-to-delta table. Closed match: a new profile variant
    /// fails to compile until it gets a row here.
    #[inline]
    pub fn target_delta(&self, profile: RiskProfile) -> f64 {
        match profile {
            RiskProfile::Conservative => self.conservative_delta,
            RiskProfile::Moderate => self.moderate_delta,
            RiskProfile::Aggressive => self.aggressive_delta,
        }
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            moderate_vol_floor: MODERATE_VOL_FLOOR,
            elevated_vol_floor: ELEVATED_VOL_FLOOR,
            high_vol_floor: HIGH_VOL_FLOOR,
            rolling_windows: SmallVec::from_slice(&DEFAULT_ROLLING_WINDOWS),
            percentile_window: PERCENTILE_WINDOW,
            percentile_lookback: PERCENTILE_LOOKBACK,
            conservative_delta: CONSERVATIVE_DELTA,
            moderate_delta: MODERATE_DELTA,
            aggressive_delta: AGGRESSIVE_DELTA,
            premium_factor: PREMIUM_FACTOR,
            min_credit: MIN_CREDIT,
            min_strike: MIN_STRIKE,
        }
    }
}
