use crate::errors::{CondorError, CondorResult};
use chrono::{DateTime, NaiveDate, Utc};
use smallvec::SmallVec;

// ── Price history (input boundary) ──

/// One daily observation. Stack-allocated.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

/// Validated daily price history: chronologically ascending, duplicate-free,
/// strictly positive closes. The constructor is the only way in, so every
/// consumer can rely on those guarantees.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> CondorResult<Self> {
        for (i, p) in points.iter().enumerate() {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(CondorError::InvalidSeries(format!(
                    "non-positive close {} at {} (index {i})",
                    p.close, p.date
                )));
            }
            if i > 0 {
                let prev = &points[i - 1];
                if p.date == prev.date {
                    return Err(CondorError::InvalidSeries(format!(
                        "duplicate date {} at index {i}",
                        p.date
                    )));
                }
                if p.date < prev.date {
                    return Err(CondorError::InvalidSeries(format!(
                        "out-of-order date {} after {} at index {i}",
                        p.date, prev.date
                    )));
                }
            }
        }
        Ok(Self { points })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    #[inline]
    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    #[inline]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    #[inline]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Daily log returns, one per consecutive close pair.
    pub fn log_returns(&self) -> CondorResult<ReturnSeries> {
        if self.points.len() < 2 {
            return Err(CondorError::InsufficientData {
                observations: self.points.len(),
            });
        }
        let values = self
            .points
            .windows(2)
            .map(|w| (w[1].close / w[0].close).ln())
            .collect();
        Ok(ReturnSeries { values })
    }

    /// Descriptive price statistics for presentation. None on an empty series.
    pub fn stats(&self) -> Option<PriceStats> {
        let last = self.points.last()?;
        let n = self.points.len() as f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut close_sum = 0.0;
        let mut volume_sum = 0.0;
        for p in &self.points {
            min = min.min(p.close);
            max = max.max(p.close);
            close_sum += p.close;
            volume_sum += p.volume;
        }
        Some(PriceStats {
            current: last.close,
            mean: close_sum / n,
            min,
            max,
            avg_volume: volume_sum / n,
        })
    }
}

/// Derived daily log returns. Immutable once computed.
#[derive(Debug, Clone)]
pub struct ReturnSeries {
    values: Vec<f64>,
}

impl ReturnSeries {
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PriceStats {
    pub current: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub avg_volume: f64,
}

// ── Volatility ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolRegime {
    Low,
    Moderate,
    Elevated,
    High,
}

impl std::fmt::Display for VolRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Elevated => write!(f, "ELEVATED"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Annualized volatility over one trailing window.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RollingVol {
    pub window: usize,
    pub annualized: f64,
}

/// Everything the analyzer knows about realized volatility.
/// Windows without enough history are absent from `rolling`, never zeroed;
/// `percentile` is None when the rolling history is too short to rank against.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VolatilitySummary {
    pub annualized: f64,
    pub rolling: SmallVec<[RollingVol; 4]>,
    pub regime: VolRegime,
    pub percentile: Option<f64>,
}

impl VolatilitySummary {
    #[inline]
    pub fn rolling_for(&self, window: usize) -> Option<f64> {
        self.rolling
            .iter()
            .find(|r| r.window == window)
            .map(|r| r.annualized)
    }
}

// ── Strategy configuration ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conservative => write!(f, "CONSERVATIVE"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Aggressive => write!(f, "AGGRESSIVE"),
        }
    }
}

impl std::str::FromStr for RiskProfile {
    type Err = CondorError;

    /// Closed parse: unknown profile names are errors, never a fallback.
    fn from_str(s: &str) -> CondorResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(CondorError::Config(format!(
                "unknown risk profile: {other:?} (expected conservative, moderate or aggressive)"
            ))),
        }
    }
}

/// Caller-supplied knobs for one evaluation. Immutable once built.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct StrategyConfig {
    pub days_to_expiration: u32,
    pub risk_profile: RiskProfile,
    pub wing_width: f64,
}

// ── Strategy output ──

/// The four legs, lowest strike first, plus the one-sigma expected move
/// that placed them. Invariant (enforced downstream):
/// long_put < short_put < spot < short_call < long_call, both wings equal.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[repr(C)]
pub struct StrikeSet {
    pub long_put: f64,
    pub short_put: f64,
    pub short_call: f64,
    pub long_call: f64,
    pub expected_move: f64,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PayoffMetrics {
    pub credit_received: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub breakeven_lower: f64,
    pub breakeven_upper: f64,
    pub probability_of_profit: f64,
    /// None when max_loss is exactly zero (nothing at risk).
    pub return_on_risk: Option<f64>,
    pub profit_zone_width: f64,
}

/// The single immutable artifact handed to reports and charts.
/// Assembled once per run by the summarizer; never mutated after.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResultRecord {
    pub volatility: VolatilitySummary,
    pub strikes: StrikeSet,
    pub payoff: PayoffMetrics,
    pub current_price: f64,
    pub as_of: DateTime<Utc>,
}
