use crate::analysis::AnalysisParams;
use crate::errors::{CondorError, CondorResult};
use crate::types::{PayoffMetrics, StrategyConfig, StrikeSet, VolatilitySummary};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Iron Condor strike selection and payoff evaluation.
///
/// Model: log returns ~ N(0, sigma_period^2) with
///   sigma_period = annualized_vol * sqrt(dte / trading_days_per_year)
///
/// Short strikes sit at the profile's target delta:
///   z          = Phi^-1(1 - target_delta)
///   short_call = S * exp(+z * sigma_period)
///   short_put  = S * exp(-z * sigma_period)
///
/// Long strikes sit one wing width beyond the shorts. Leg premiums use a
/// phi-density proxy, S * sigma_period * phi(z_leg) * premium_factor, and
/// the probability of profit is Phi(d_upper) - Phi(d_lower) over the
/// breakevens in log-price terms. This is a deliberate simplification of
/// real option pricing: no implied-volatility surface, no Greeks beyond
/// the delta-style placement, no transaction costs.
///
/// Pure function: deterministic output from inputs only, no logging.
pub fn recommend(
    current_price: f64,
    vol: &VolatilitySummary,
    config: &StrategyConfig,
    params: &AnalysisParams,
) -> CondorResult<(StrikeSet, PayoffMetrics)> {
    let invalid = |reason: String| CondorError::InvalidConfiguration {
        reason,
        price: current_price,
        volatility: vol.annualized,
        days_to_expiration: config.days_to_expiration,
        wing_width: config.wing_width,
    };

    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(invalid(format!("non-positive current price {current_price}")));
    }
    if config.days_to_expiration == 0 {
        return Err(invalid("days to expiration must be positive".into()));
    }
    if !config.wing_width.is_finite() || config.wing_width <= 0.0 {
        return Err(invalid(format!(
            "non-positive wing width {}",
            config.wing_width
        )));
    }
    if !vol.annualized.is_finite() || vol.annualized < 0.0 {
        return Err(invalid(format!(
            "annualized volatility {} is not a usable number",
            vol.annualized
        )));
    }
    let target_delta = params.target_delta(config.risk_profile);
    if !(0.0..0.5).contains(&target_delta) || target_delta == 0.0 {
        return Err(invalid(format!(
            "target delta {target_delta} outside (0, 0.5)"
        )));
    }

    let sigma_period = vol.annualized
        * (f64::from(config.days_to_expiration) / params.trading_days_per_year).sqrt();

    // Zero volatility collapses every leg onto the spot and every premium
    // to zero. Flag it before the strike math divides by sigma_period.
    if sigma_period < 1e-12 {
        return Err(CondorError::ZeroCredit {
            credit: 0.0,
            price: current_price,
            volatility: vol.annualized,
            days_to_expiration: config.days_to_expiration,
            wing_width: config.wing_width,
        });
    }

    let normal = Normal::standard();
    let z = normal.inverse_cdf(1.0 - target_delta);

    let expected_move = current_price * sigma_period;
    let short_call = current_price * (z * sigma_period).exp();
    let short_put = current_price * (-z * sigma_period).exp();
    let long_put = short_put - config.wing_width;
    let long_call = short_call + config.wing_width;

    if long_put <= params.min_strike {
        return Err(invalid(format!(
            "wing width {} drives long put to {long_put:.4}",
            config.wing_width
        )));
    }

    // Each leg's premium at its own standardized log distance from spot.
    // The shorts share z; the longs sit further out and cost less, so the
    // net credit is positive whenever sigma_period is.
    let scale = current_price * sigma_period * params.premium_factor;
    let short_premium = scale * normal.pdf(z);
    let z_long_put = (long_put / current_price).ln().abs() / sigma_period;
    let z_long_call = (long_call / current_price).ln() / sigma_period;
    let credit = (short_premium - scale * normal.pdf(z_long_put))
        + (short_premium - scale * normal.pdf(z_long_call));

    if credit <= params.min_credit {
        return Err(CondorError::ZeroCredit {
            credit,
            price: current_price,
            volatility: vol.annualized,
            days_to_expiration: config.days_to_expiration,
            wing_width: config.wing_width,
        });
    }

    let max_profit = credit;
    let max_loss = config.wing_width - credit;
    if max_loss < 0.0 {
        return Err(invalid(format!(
            "credit {credit:.4} exceeds wing width {}; max loss would be negative",
            config.wing_width
        )));
    }

    let breakeven_lower = short_put - credit;
    let breakeven_upper = short_call + credit;

    let d_lower = (breakeven_lower / current_price).ln() / sigma_period;
    let d_upper = (breakeven_upper / current_price).ln() / sigma_period;
    let probability_of_profit = normal.cdf(d_upper) - normal.cdf(d_lower);

    let return_on_risk = if max_loss > 0.0 {
        Some(max_profit / max_loss)
    } else {
        None
    };

    let strikes = StrikeSet {
        long_put,
        short_put,
        short_call,
        long_call,
        expected_move,
    };
    let payoff = PayoffMetrics {
        credit_received: credit,
        max_profit,
        max_loss,
        breakeven_lower,
        breakeven_upper,
        probability_of_profit,
        return_on_risk,
        profit_zone_width: breakeven_upper - breakeven_lower,
    };

    Ok((strikes, payoff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskProfile, VolRegime};
    use smallvec::SmallVec;

    fn vol(annualized: f64) -> VolatilitySummary {
        VolatilitySummary {
            annualized,
            rolling: SmallVec::new(),
            regime: VolRegime::Moderate,
            percentile: None,
        }
    }

    fn cfg(dte: u32, profile: RiskProfile, wing: f64) -> StrategyConfig {
        StrategyConfig {
            days_to_expiration: dte,
            risk_profile: profile,
            wing_width: wing,
        }
    }

    #[test]
    fn test_moderate_45dte_scenario() {
        let params = AnalysisParams::default();
        let (strikes, payoff) = recommend(
            5800.0,
            &vol(0.18),
            &cfg(45, RiskProfile::Moderate, 50.0),
            &params,
        )
        .unwrap();

        // Shorts symmetric around spot in log space.
        let up = (strikes.short_call / 5800.0).ln();
        let down = (strikes.short_put / 5800.0).ln();
        assert!(
            (up + down).abs() < 1e-9,
            "log asymmetry {up} vs {down}"
        );

        // Wings exactly one wing width wide.
        assert!((strikes.short_put - strikes.long_put - 50.0).abs() < 1e-9);
        assert!((strikes.long_call - strikes.short_call - 50.0).abs() < 1e-9);

        // Expected move matches the trading-day scaling.
        let expected = 5800.0 * 0.18 * (45.0_f64 / 252.0).sqrt();
        assert!((strikes.expected_move - expected).abs() < 1e-9);

        // Payoff algebra is exact.
        assert_eq!(payoff.max_profit, payoff.credit_received);
        assert!(
            (payoff.max_profit + payoff.max_loss - 50.0).abs() < 1e-9,
            "profit {} + loss {} != wing",
            payoff.max_profit,
            payoff.max_loss
        );
        assert!(
            (payoff.breakeven_lower - (strikes.short_put - payoff.credit_received)).abs() < 1e-9
        );
        assert!(
            (payoff.breakeven_upper - (strikes.short_call + payoff.credit_received)).abs() < 1e-9
        );
        assert!(
            (payoff.profit_zone_width - (payoff.breakeven_upper - payoff.breakeven_lower)).abs()
                < 1e-9
        );

        assert!(
            payoff.probability_of_profit > 0.60 && payoff.probability_of_profit < 0.95,
            "pop {} outside (0.60, 0.95)",
            payoff.probability_of_profit
        );

        let ror = payoff.return_on_risk.expect("max loss is positive");
        assert!((ror - payoff.max_profit / payoff.max_loss).abs() < 1e-12);
    }

    #[test]
    fn test_strike_ordering_holds_across_inputs() {
        let params = AnalysisParams::default();
        for profile in [
            RiskProfile::Conservative,
            RiskProfile::Moderate,
            RiskProfile::Aggressive,
        ] {
            for dte in [15, 45, 90] {
                for v in [0.12, 0.18, 0.30] {
                    let (s, _) =
                        recommend(5800.0, &vol(v), &cfg(dte, profile, 50.0), &params).unwrap();
                    assert!(
                        s.long_put < s.short_put
                            && s.short_put < 5800.0
                            && 5800.0 < s.short_call
                            && s.short_call < s.long_call,
                        "ordering broken for {profile:?} dte={dte} vol={v}: {s:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_conservative_sits_furthest_from_spot() {
        let params = AnalysisParams::default();
        let spot = 5800.0;
        let v = vol(0.18);
        let (cons, _) =
            recommend(spot, &v, &cfg(45, RiskProfile::Conservative, 50.0), &params).unwrap();
        let (modr, _) =
            recommend(spot, &v, &cfg(45, RiskProfile::Moderate, 50.0), &params).unwrap();
        let (aggr, _) =
            recommend(spot, &v, &cfg(45, RiskProfile::Aggressive, 50.0), &params).unwrap();

        assert!(cons.short_call > modr.short_call && modr.short_call > aggr.short_call);
        assert!(cons.short_put < modr.short_put && modr.short_put < aggr.short_put);
    }

    #[test]
    fn test_longer_dte_widens_the_short_strangle() {
        let params = AnalysisParams::default();
        let v = vol(0.18);
        let (near, _) = recommend(5800.0, &v, &cfg(30, RiskProfile::Moderate, 50.0), &params).unwrap();
        let (far, _) = recommend(5800.0, &v, &cfg(60, RiskProfile::Moderate, 50.0), &params).unwrap();
        assert!(
            far.short_call - far.short_put > near.short_call - near.short_put,
            "60 dte strangle should be wider than 30 dte"
        );
    }

    #[test]
    fn test_higher_vol_collects_more_credit() {
        let params = AnalysisParams::default();
        let (_, calm) =
            recommend(5800.0, &vol(0.12), &cfg(45, RiskProfile::Moderate, 50.0), &params).unwrap();
        let (_, wild) =
            recommend(5800.0, &vol(0.30), &cfg(45, RiskProfile::Moderate, 50.0), &params).unwrap();
        assert!(wild.credit_received > calm.credit_received);
    }

    #[test]
    fn test_zero_dte_rejected() {
        let params = AnalysisParams::default();
        let err =
            recommend(5800.0, &vol(0.18), &cfg(0, RiskProfile::Moderate, 50.0), &params)
                .unwrap_err();
        assert!(matches!(err, CondorError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_non_positive_wing_rejected() {
        let params = AnalysisParams::default();
        for wing in [0.0, -25.0] {
            let err =
                recommend(5800.0, &vol(0.18), &cfg(45, RiskProfile::Moderate, wing), &params)
                    .unwrap_err();
            assert!(matches!(err, CondorError::InvalidConfiguration { .. }));
        }
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let params = AnalysisParams::default();
        let err =
            recommend(0.0, &vol(0.18), &cfg(45, RiskProfile::Moderate, 50.0), &params)
                .unwrap_err();
        assert!(matches!(err, CondorError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_zero_volatility_yields_zero_credit() {
        let params = AnalysisParams::default();
        let err =
            recommend(5800.0, &vol(0.0), &cfg(45, RiskProfile::Moderate, 50.0), &params)
                .unwrap_err();
        assert!(
            matches!(err, CondorError::ZeroCredit { credit, .. } if credit == 0.0),
            "got {err:?}"
        );
    }

    #[test]
    fn test_oversized_wing_rejected() {
        let params = AnalysisParams::default();
        // Wing wider than the entire put side pushes the long put below zero.
        let err =
            recommend(5800.0, &vol(0.18), &cfg(45, RiskProfile::Moderate, 6000.0), &params)
                .unwrap_err();
        assert!(
            matches!(err, CondorError::InvalidConfiguration { .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_inflated_premium_factor_breaks_max_loss() {
        let mut params = AnalysisParams::default();
        params.premium_factor = 3.0;
        let err =
            recommend(5800.0, &vol(0.18), &cfg(45, RiskProfile::Moderate, 50.0), &params)
                .unwrap_err();
        assert!(
            matches!(err, CondorError::InvalidConfiguration { .. }),
            "credit above the wing must be rejected, got {err:?}"
        );
    }
}
