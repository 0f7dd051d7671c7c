use crate::analysis::AnalysisParams;
use crate::errors::CondorResult;
use crate::types::{PriceSeries, RollingVol, VolRegime, VolatilitySummary};
use smallvec::SmallVec;

/// Realized-volatility analysis over a daily price history.
///
/// annualized = stdev(log returns) * sqrt(trading_days_per_year)
///
/// Pure function of the series: no side effects, no logging, bit-identical
/// output for identical input. Fails with InsufficientData below 2 closes;
/// rolling windows longer than the history are omitted rather than failing.
pub fn analyze(prices: &PriceSeries, params: &AnalysisParams) -> CondorResult<VolatilitySummary> {
    let returns = prices.log_returns()?;
    let r = returns.values();

    let annualized = annualized_vol(r, params.trading_days_per_year);

    let mut rolling: SmallVec<[RollingVol; 4]> = SmallVec::new();
    for &window in &params.rolling_windows {
        if window >= 2 && r.len() >= window {
            let tail = &r[r.len() - window..];
            rolling.push(RollingVol {
                window,
                annualized: annualized_vol(tail, params.trading_days_per_year),
            });
        }
    }

    let regime = classify_regime(annualized, params);
    let percentile = volatility_percentile(r, annualized, params);

    Ok(VolatilitySummary {
        annualized,
        rolling,
        regime,
        percentile,
    })
}

/// Total function over the volatility level. Bands are inclusive at the
/// lower bound: exactly 0.15 is MODERATE, exactly 0.35 is HIGH.
#[inline]
pub fn classify_regime(annualized: f64, params: &AnalysisParams) -> VolRegime {
    if annualized < params.moderate_vol_floor {
        VolRegime::Low
    } else if annualized < params.elevated_vol_floor {
        VolRegime::Moderate
    } else if annualized < params.high_vol_floor {
        VolRegime::Elevated
    } else {
        VolRegime::High
    }
}

/// Annualized sample standard deviation (n-1 denominator) of a return slice.
/// Returns 0.0 below 2 observations.
#[inline]
fn annualized_vol(returns: &[f64], trading_days_per_year: f64) -> f64 {
    let n = returns.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = returns.iter().sum::<f64>() / nf;
    let var_sum: f64 = returns.iter().map(|r| (r - mean) * (r - mean)).sum();
    (var_sum / (nf - 1.0)).sqrt() * trading_days_per_year.sqrt()
}

/// Percentile rank of the current volatility against its own trailing
/// rolling-volatility history: the share of recent rolling observations at
/// or below the current level, scaled to [0, 100]. None when fewer than 2
/// rolling observations exist; callers must surface that as unavailable,
/// not substitute a midpoint.
fn volatility_percentile(returns: &[f64], current: f64, params: &AnalysisParams) -> Option<f64> {
    let w = params.percentile_window;
    if w < 2 || returns.len() < w {
        return None;
    }

    let mut history: Vec<f64> = returns
        .windows(w)
        .map(|chunk| annualized_vol(chunk, params.trading_days_per_year))
        .collect();

    if history.len() > params.percentile_lookback {
        let start = history.len() - params.percentile_lookback;
        history.drain(..start);
    }
    if history.len() < 2 {
        return None;
    }

    let at_or_below = history.iter().filter(|&&v| v <= current).count();
    Some(at_or_below as f64 / history.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CondorError;
    use crate::types::{PricePoint, PriceSeries};
    use chrono::{Datelike, NaiveDate};

    /// Builds a weekday-only series from closes, starting 2025-01-06 (a Monday).
    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut date = start;
        let points = closes
            .iter()
            .map(|&close| {
                let p = PricePoint {
                    date,
                    close,
                    volume: 2.0e9,
                };
                date = date.succ_opt().unwrap();
                while matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
                    date = date.succ_opt().unwrap();
                }
                p
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    /// Alternating up/down closes so the stdev is well away from zero.
    fn choppy_series(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        series(&closes)
    }

    #[test]
    fn test_insufficient_data_below_two_closes() {
        let err = analyze(&series(&[100.0]), &AnalysisParams::default()).unwrap_err();
        assert!(
            matches!(err, CondorError::InsufficientData { observations: 1 }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_annualized_is_non_negative_and_flat_series_is_zero() {
        let params = AnalysisParams::default();
        let flat = analyze(&series(&[100.0, 100.0, 100.0, 100.0]), &params).unwrap();
        assert_eq!(flat.annualized, 0.0);
        assert_eq!(flat.regime, VolRegime::Low);

        let choppy = analyze(&choppy_series(20), &params).unwrap();
        assert!(choppy.annualized > 0.0);
    }

    #[test]
    fn test_annualized_matches_hand_computation() {
        let params = AnalysisParams::default();
        let got = analyze(&series(&[100.0, 110.0, 99.0]), &params).unwrap();

        let r1 = (110.0_f64 / 100.0).ln();
        let r2 = (99.0_f64 / 110.0).ln();
        let mean = (r1 + r2) / 2.0;
        let var = ((r1 - mean).powi(2) + (r2 - mean).powi(2)) / 1.0;
        let expected = var.sqrt() * 252.0_f64.sqrt();
        assert!(
            (got.annualized - expected).abs() < 1e-12,
            "annualized {} != {expected}",
            got.annualized
        );
    }

    #[test]
    fn test_regime_boundaries_are_lower_inclusive() {
        let params = AnalysisParams::default();
        assert_eq!(classify_regime(0.1499, &params), VolRegime::Low);
        assert_eq!(classify_regime(0.15, &params), VolRegime::Moderate);
        assert_eq!(classify_regime(0.2499, &params), VolRegime::Moderate);
        assert_eq!(classify_regime(0.25, &params), VolRegime::Elevated);
        assert_eq!(classify_regime(0.3499, &params), VolRegime::Elevated);
        assert_eq!(classify_regime(0.35, &params), VolRegime::High);
        assert_eq!(classify_regime(0.80, &params), VolRegime::High);
        assert_eq!(classify_regime(0.0, &params), VolRegime::Low);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let params = AnalysisParams::default();
        let s = choppy_series(80);
        let a = analyze(&s, &params).unwrap();
        let b = analyze(&s, &params).unwrap();
        assert_eq!(a.annualized.to_bits(), b.annualized.to_bits());
        assert_eq!(a.regime, b.regime);
        assert_eq!(a.rolling.len(), b.rolling.len());
        for (x, y) in a.rolling.iter().zip(b.rolling.iter()) {
            assert_eq!(x.window, y.window);
            assert_eq!(x.annualized.to_bits(), y.annualized.to_bits());
        }
        assert_eq!(
            a.percentile.map(f64::to_bits),
            b.percentile.map(f64::to_bits)
        );
    }

    #[test]
    fn test_short_history_omits_long_windows() {
        let params = AnalysisParams::default();
        // 15 closes -> 14 returns: enough for the 10-day window only.
        let got = analyze(&choppy_series(15), &params).unwrap();
        assert!(got.rolling_for(10).is_some());
        assert!(got.rolling_for(30).is_none(), "30-day window must be absent");
        assert!(got.rolling_for(60).is_none(), "60-day window must be absent");
    }

    #[test]
    fn test_full_history_reports_all_windows() {
        let params = AnalysisParams::default();
        let got = analyze(&choppy_series(80), &params).unwrap();
        assert_eq!(got.rolling.len(), 3);
        for rv in &got.rolling {
            assert!(rv.annualized > 0.0, "window {} should be positive", rv.window);
        }
    }

    #[test]
    fn test_percentile_none_without_rolling_history() {
        let params = AnalysisParams::default();
        // 20 closes -> 19 returns: below the 30-observation percentile window.
        let got = analyze(&choppy_series(20), &params).unwrap();
        assert_eq!(got.percentile, None);
    }

    #[test]
    fn test_percentile_within_bounds_and_high_for_spiking_vol() {
        let params = AnalysisParams::default();
        // Calm first, violent at the end: current vol should rank high.
        let mut closes: Vec<f64> = Vec::new();
        let mut px = 100.0;
        for i in 0..60 {
            px *= if i % 2 == 0 { 1.001 } else { 0.9995 };
            closes.push(px);
        }
        for i in 0..20 {
            px *= if i % 2 == 0 { 1.04 } else { 0.962 };
            closes.push(px);
        }
        let got = analyze(&series(&closes), &params).unwrap();
        let pct = got.percentile.expect("enough history for a percentile");
        assert!((0.0..=100.0).contains(&pct), "percentile {pct} out of range");
        assert!(pct > 50.0, "vol spike should rank above median, got {pct}");
    }
}
