use crate::errors::{CondorError, CondorResult};
use crate::types::{PayoffMetrics, ResultRecord, StrikeSet, VolatilitySummary};
use chrono::{DateTime, Utc};

/// Tolerance for the algebraic cross-checks below
const CONSISTENCY_TOL: f64 = 1e-9;

/// Assembles the final record, re-verifying the invariants the upstream
/// arithmetic guarantees: strike ordering around spot, wing symmetry,
/// payoff algebra, breakeven placement, and probability range. Any
/// violation maps to `InconsistentResult` naming the broken relation.
/// No computation happens here beyond validation and packaging.
pub fn summarize(
    volatility: VolatilitySummary,
    strikes: StrikeSet,
    payoff: PayoffMetrics,
    current_price: f64,
    as_of: DateTime<Utc>,
) -> CondorResult<ResultRecord> {
    let inconsistent = |relation: String| CondorError::InconsistentResult(relation);

    if !(strikes.long_put < strikes.short_put
        && strikes.short_put < current_price
        && current_price < strikes.short_call
        && strikes.short_call < strikes.long_call)
    {
        return Err(inconsistent(format!(
            "strike ordering violated: {} / {} / spot {} / {} / {}",
            strikes.long_put,
            strikes.short_put,
            current_price,
            strikes.short_call,
            strikes.long_call
        )));
    }

    let put_wing = strikes.short_put - strikes.long_put;
    let call_wing = strikes.long_call - strikes.short_call;
    if (put_wing - call_wing).abs() > CONSISTENCY_TOL {
        return Err(inconsistent(format!(
            "asymmetric wings: put {put_wing} vs call {call_wing}"
        )));
    }

    if payoff.credit_received <= 0.0 {
        return Err(inconsistent(format!(
            "non-positive credit {} survived to the record",
            payoff.credit_received
        )));
    }
    if payoff.max_loss < 0.0 {
        return Err(inconsistent(format!("negative max loss {}", payoff.max_loss)));
    }
    if (payoff.max_profit - payoff.credit_received).abs() > CONSISTENCY_TOL {
        return Err(inconsistent(format!(
            "max profit {} != credit {}",
            payoff.max_profit, payoff.credit_received
        )));
    }
    if (payoff.max_profit + payoff.max_loss - put_wing).abs() > CONSISTENCY_TOL {
        return Err(inconsistent(format!(
            "payoff algebra broken: profit {} + loss {} != wing {put_wing}",
            payoff.max_profit, payoff.max_loss
        )));
    }

    let lower = strikes.short_put - payoff.credit_received;
    let upper = strikes.short_call + payoff.credit_received;
    if (payoff.breakeven_lower - lower).abs() > CONSISTENCY_TOL
        || (payoff.breakeven_upper - upper).abs() > CONSISTENCY_TOL
    {
        return Err(inconsistent(format!(
            "breakevens {} / {} disagree with strikes and credit ({lower} / {upper})",
            payoff.breakeven_lower, payoff.breakeven_upper
        )));
    }
    if (payoff.profit_zone_width - (upper - lower)).abs() > CONSISTENCY_TOL {
        return Err(inconsistent(format!(
            "profit zone width {} != breakeven span {}",
            payoff.profit_zone_width,
            upper - lower
        )));
    }

    if !(0.0..=1.0).contains(&payoff.probability_of_profit) {
        return Err(inconsistent(format!(
            "probability of profit {} outside [0, 1]",
            payoff.probability_of_profit
        )));
    }

    Ok(ResultRecord {
        volatility,
        strikes,
        payoff,
        current_price,
        as_of,
    })
}
