use super::{breakeven_std_devs, pct_of_spot};
use crate::types::{ResultRecord, StrategyConfig, VolRegime};

const RULE_WIDTH: usize = 80;

/// Plain-text analysis report, section by section. Built as a line list
/// and joined once, so every row is a single format call.
pub fn render(record: &ResultRecord, config: StrategyConfig) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let spot = record.current_price;
    let strikes = &record.strikes;
    let payoff = &record.payoff;
    let vol = &record.volatility;

    let mut lines: Vec<String> = Vec::new();
    lines.push(heavy.clone());
    lines.push("IRON CONDOR STRATEGY - ANALYSIS REPORT".to_string());
    lines.push(heavy.clone());
    lines.push(String::new());
    lines.push(format!(
        "Generated: {}",
        record.as_of.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    close_section(&mut lines, &light);

    open_section(&mut lines, &light, "MARKET OVERVIEW");
    lines.push(format!("Current Underlying Price: ${spot:.2}"));
    lines.push(format!("Days to Expiration: {}", config.days_to_expiration));
    lines.push(format!("Risk Profile: {}", config.risk_profile));
    lines.push(format!(
        "Expected Move: ${:.2} ({:.2}%)",
        strikes.expected_move,
        pct_of_spot(strikes.expected_move, spot)
    ));
    close_section(&mut lines, &light);

    open_section(&mut lines, &light, "VOLATILITY ANALYSIS");
    lines.push(format!(
        "Current Volatility: {:.2}%",
        vol.annualized * 100.0
    ));
    for rolling in &vol.rolling {
        lines.push(format!(
            "{}-Day Volatility: {:.2}%",
            rolling.window,
            rolling.annualized * 100.0
        ));
    }
    match vol.percentile {
        Some(p) => lines.push(format!("Volatility Percentile: {p:.1}%")),
        None => lines.push("Volatility Percentile: n/a (insufficient history)".to_string()),
    }
    lines.push(format!("Volatility Regime: {}", vol.regime));
    close_section(&mut lines, &light);

    open_section(&mut lines, &light, "IRON CONDOR STRATEGY");
    lines.push(String::new());
    lines.push("STRIKE PRICES (All 4 Legs):".to_string());
    lines.push(format!("  1. {:<18} ${:>8.0}", "Long Put (Buy):", strikes.long_put));
    lines.push(format!("  2. {:<18} ${:>8.0}", "Short Put (Sell):", strikes.short_put));
    lines.push(format!("  3. {:<18} ${:>8.0}", "Short Call (Sell):", strikes.short_call));
    lines.push(format!("  4. {:<18} ${:>8.0}", "Long Call (Buy):", strikes.long_call));
    lines.push(String::new());
    lines.push(format!(
        "Put Spread Width: ${:.0}",
        strikes.short_put - strikes.long_put
    ));
    lines.push(format!(
        "Call Spread Width: ${:.0}",
        strikes.long_call - strikes.short_call
    ));
    close_section(&mut lines, &light);

    open_section(&mut lines, &light, "PROFIT & LOSS ANALYSIS");
    lines.push(format!(
        "Estimated Credit Received: ${:.2}",
        payoff.credit_received
    ));
    lines.push(format!("Maximum Profit: ${:.2}", payoff.max_profit));
    lines.push(format!("Maximum Loss: ${:.2}", payoff.max_loss));
    match payoff.return_on_risk {
        Some(r) => lines.push(format!("Return on Risk: {:.2}%", r * 100.0)),
        None => lines.push("Return on Risk: n/a (nothing at risk)".to_string()),
    }
    if payoff.max_profit > 0.0 {
        lines.push(format!(
            "Risk/Reward Ratio: {:.2}",
            payoff.max_loss / payoff.max_profit
        ));
    }
    close_section(&mut lines, &light);

    open_section(&mut lines, &light, "BREAKEVEN ANALYSIS");
    lines.push(format!("Lower Breakeven: ${:.2}", payoff.breakeven_lower));
    lines.push(format!("Upper Breakeven: ${:.2}", payoff.breakeven_upper));
    lines.push(format!(
        "Breakeven Range: ${:.2} ({:.2}%)",
        payoff.profit_zone_width,
        pct_of_spot(payoff.profit_zone_width, spot)
    ));
    close_section(&mut lines, &light);

    open_section(&mut lines, &light, "PROBABILITY ANALYSIS");
    lines.push(format!(
        "Probability of Profit: {:.2}%",
        payoff.probability_of_profit * 100.0
    ));
    lines.push(format!(
        "Lower Breakeven (Std Dev): {:.2}",
        breakeven_std_devs(payoff.breakeven_lower, record)
    ));
    lines.push(format!(
        "Upper Breakeven (Std Dev): {:.2}",
        breakeven_std_devs(payoff.breakeven_upper, record)
    ));
    close_section(&mut lines, &light);

    open_section(&mut lines, &light, "TRADING RECOMMENDATIONS");
    lines.push(String::new());
    lines.push("ENTRY STRATEGY:".to_string());
    lines.push("  \u{2022} Enter when volatility is in the moderate to elevated range".to_string());
    lines.push("  \u{2022} Aim for 30-45 days to expiration for optimal time decay".to_string());
    lines.push("  \u{2022} Target credit of 25-35% of the spread width".to_string());
    lines.push(String::new());
    lines.push("MANAGEMENT RULES:".to_string());
    lines.push("  \u{2022} Take profit at 50% of max profit".to_string());
    lines.push("  \u{2022} Cut losses at 200% of credit received".to_string());
    lines.push("  \u{2022} Consider rolling if 21 days remain and position is challenged".to_string());
    lines.push(String::new());
    lines.push("RISK MANAGEMENT:".to_string());
    lines.push("  \u{2022} Never risk more than 2-5% of account on a single trade".to_string());
    lines.push("  \u{2022} Monitor position daily for any breach of short strikes".to_string());
    lines.push("  \u{2022} Have an exit plan before entering the trade".to_string());
    close_section(&mut lines, &light);

    open_section(&mut lines, &light, "CURRENT MARKET CONDITIONS");
    for row in regime_guidance(vol.regime) {
        lines.push(row.to_string());
    }
    lines.push(String::new());
    lines.push(heavy.clone());
    lines.push(String::new());
    lines.push("DISCLAIMER: This analysis is for educational purposes only.".to_string());
    lines.push("Not financial advice. Trade at your own risk.".to_string());
    lines.push(heavy);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn open_section(lines: &mut Vec<String>, light: &str, title: &str) {
    lines.push(title.to_string());
    lines.push(light.to_string());
}

fn close_section(lines: &mut Vec<String>, light: &str) {
    lines.push(String::new());
    lines.push(light.to_string());
    lines.push(String::new());
}

/// Two-line market read per regime, shared with the HTML report.
pub(crate) fn regime_guidance(regime: VolRegime) -> [&'static str; 2] {
    match regime {
        VolRegime::Low => [
            "\u{26a0} Low volatility environment - smaller credits expected",
            "  Consider waiting for higher volatility or using tighter strikes",
        ],
        VolRegime::Moderate => [
            "\u{2713} Moderate volatility - Good environment for Iron Condors",
            "  Balanced risk/reward with reasonable credit potential",
        ],
        VolRegime::Elevated => [
            "\u{2713} Elevated volatility - Excellent for Iron Condors",
            "  Higher credits available, but increased risk of price movement",
        ],
        VolRegime::High => [
            "\u{26a0} High volatility - Risky environment",
            "  Consider wider strikes or waiting for volatility to decrease",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_record;
    use crate::types::RiskProfile;

    fn config() -> StrategyConfig {
        StrategyConfig {
            days_to_expiration: 45,
            risk_profile: RiskProfile::Moderate,
            wing_width: 50.0,
        }
    }

    #[test]
    fn test_report_carries_every_section() {
        let out = render(&sample_record(), config());
        for section in [
            "MARKET OVERVIEW",
            "VOLATILITY ANALYSIS",
            "IRON CONDOR STRATEGY",
            "PROFIT & LOSS ANALYSIS",
            "BREAKEVEN ANALYSIS",
            "PROBABILITY ANALYSIS",
            "TRADING RECOMMENDATIONS",
            "CURRENT MARKET CONDITIONS",
            "DISCLAIMER",
        ] {
            assert!(out.contains(section), "missing section {section}");
        }
    }

    #[test]
    fn test_report_numbers_come_from_record() {
        let record = sample_record();
        let out = render(&record, config());
        assert!(out.contains(&format!("${:.2}", record.current_price)));
        assert!(out.contains(&format!("{:.0}", record.strikes.short_put)));
        assert!(out.contains(&format!("${:.2}", record.payoff.credit_received)));
        assert!(out.contains(&format!(
            "{:.2}%",
            record.payoff.probability_of_profit * 100.0
        )));
        assert!(out.contains("Days to Expiration: 45"));
        assert!(out.contains("10-Day Volatility: 21.00%"));
        assert!(out.contains("Volatility Percentile: 62.5%"));
    }

    #[test]
    fn test_moderate_regime_reads_as_favorable() {
        let out = render(&sample_record(), config());
        assert!(out.contains("Good environment for Iron Condors"));
    }

    #[test]
    fn test_missing_percentile_renders_as_unavailable() {
        let mut record = sample_record();
        record.volatility.percentile = None;
        let out = render(&record, config());
        assert!(out.contains("Volatility Percentile: n/a"));
    }
}
