mod analysis;
mod config;
mod errors;
mod feeds;
mod report;
mod types;

use crate::analysis::{strategy, summary, volatility};
use crate::config::AppConfig;
use crate::errors::{CondorError, CondorResult};
use crate::types::{PriceSeries, ResultRecord, VolRegime};
use chrono::Utc;

const RULE_WIDTH: usize = 70;

#[tokio::main]
async fn main() {
    // Structured logging on stderr; stdout stays clean for the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cfg).await {
        tracing::error!("analysis failed: {e}");
        println!("\n❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: AppConfig) -> CondorResult<()> {
    print_banner();
    tracing::info!(
        symbol = %cfg.symbol,
        range = %cfg.range,
        profile = %cfg.risk_profile,
        "starting iron condor analysis"
    );

    step_heading("STEP 1: Fetching Historical Price Data");
    let series = load_history(&cfg).await?;
    let stats = series
        .stats()
        .ok_or(CondorError::InsufficientData { observations: 0 })?;

    println!("\n✓ Successfully retrieved {} days of data", series.len());
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        println!("  Data Range: {first} to {last}");
    }
    println!("  Current {} Price: ${:.2}", cfg.symbol, stats.current);
    println!("  Period High: ${:.2}", stats.max);
    println!("  Period Low: ${:.2}", stats.min);
    println!("  Average Volume: {}", group_thousands(stats.avg_volume));

    step_heading("STEP 2: Analyzing Market Volatility");
    let params = cfg.analysis_params();
    let vol = volatility::analyze(&series, &params)?;

    println!("\n✓ Volatility Analysis Complete");
    println!("  Current Volatility: {:.2}%", vol.annualized * 100.0);
    for r in &vol.rolling {
        println!("  {}-Day Volatility: {:.2}%", r.window, r.annualized * 100.0);
    }
    println!("  Volatility Regime: {}", vol.regime);
    match vol.percentile {
        Some(p) => println!("  Volatility Percentile: {p:.1}%"),
        None => println!("  Volatility Percentile: n/a (insufficient history)"),
    }

    step_heading("STEP 3: Calculating Iron Condor Strategy");
    let strat_cfg = cfg.strategy();
    let (strikes, payoff) = strategy::recommend(stats.current, &vol, &strat_cfg, &params)?;
    let record = summary::summarize(vol, strikes, payoff, stats.current, Utc::now())?;

    println!("\n✓ Iron Condor Strategy Calculated");
    print_strike_box(&record);
    print_profit_loss_box(&record);
    print_breakeven_box(&record);

    step_heading("STEP 4: Generating Visual Charts");
    let paths = report::write_reports(&record, &series, strat_cfg, &cfg.output_dir)?;
    println!("\n✓ Generated {} visualization charts:", paths.charts.len());
    for (i, chart) in paths.charts.iter().enumerate() {
        println!("  {}. {}", i + 1, chart.display());
    }

    step_heading("STEP 5: Generating Detailed Reports");
    println!("\n✓ Text Report: {}", paths.text.display());
    println!("✓ HTML Report: {}", paths.html.display());
    println!("✓ CSV Data: {}", paths.price_csv.display());
    println!("✓ CSV Summary: {}", paths.summary_csv.display());

    step_heading("MARKET RECOMMENDATIONS");
    print_market_recommendations(record.volatility.regime);

    step_heading("ANALYSIS COMPLETE");
    println!(
        "\n✓ All reports and charts saved to: {}/",
        cfg.output_dir.display()
    );
    println!("✓ Open the HTML report for the full analysis");
    println!("\n  HTML Report: {}", paths.html.display());
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("\nDISCLAIMER: This analysis is for educational purposes only.");
    println!("Not financial advice. Trade at your own risk.");
    println!("{}\n", "=".repeat(RULE_WIDTH));

    tracing::info!("iron condor analysis completed");
    Ok(())
}

/// Live fetch with a synthetic fallback, so the tool still produces a full
/// analysis when the market data endpoint is unreachable.
async fn load_history(cfg: &AppConfig) -> CondorResult<PriceSeries> {
    if cfg.demo_mode {
        tracing::info!("demo mode enabled, generating synthetic history");
        return feeds::demo::demo_history(&cfg.range);
    }
    match feeds::yahoo::fetch_daily_history(&cfg.symbol, &cfg.range).await {
        Ok(series) => Ok(series),
        Err(e) => {
            tracing::warn!("live fetch failed ({e}), falling back to demo data");
            feeds::demo::demo_history(&cfg.range)
        }
    }
}

fn print_banner() {
    let bar = "═".repeat(63);
    println!("\n╔{bar}╗");
    println!("║{:^63}║", "");
    println!("║{:^63}║", "IRON CONDOR TRADING BOT");
    println!("║{:^63}║", "Advanced Options Strategy Analyzer");
    println!("║{:^63}║", "");
    println!("╚{bar}╝");
}

fn step_heading(title: &str) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("{title}");
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn print_box(title: &str, rows: &[(&str, String)]) {
    println!("\n  {title}:");
    println!("  ┌{}┐", "─".repeat(45));
    for (label, value) in rows {
        println!("  │ {label:<23}{value:>14}       │");
    }
    println!("  └{}┘", "─".repeat(45));
}

fn print_strike_box(record: &ResultRecord) {
    let s = &record.strikes;
    print_box(
        "STRIKE PRICES (All 4 Legs)",
        &[
            ("1. Long Put (Buy):", format!("${:.0}", s.long_put)),
            ("2. Short Put (Sell):", format!("${:.0}", s.short_put)),
            ("3. Short Call (Sell):", format!("${:.0}", s.short_call)),
            ("4. Long Call (Buy):", format!("${:.0}", s.long_call)),
        ],
    );
}

fn print_profit_loss_box(record: &ResultRecord) {
    let p = &record.payoff;
    let ror = match p.return_on_risk {
        Some(r) => format!("{:.2}%", r * 100.0),
        None => "n/a".to_string(),
    };
    print_box(
        "PROFIT & LOSS",
        &[
            ("Max Profit:", format!("${:.2}", p.max_profit)),
            ("Max Loss:", format!("${:.2}", p.max_loss)),
            ("Return on Risk:", ror),
            (
                "Probability of Profit:",
                format!("{:.2}%", p.probability_of_profit * 100.0),
            ),
        ],
    );
}

fn print_breakeven_box(record: &ResultRecord) {
    let p = &record.payoff;
    print_box(
        "BREAKEVEN POINTS",
        &[
            ("Lower Breakeven:", format!("${:.2}", p.breakeven_lower)),
            ("Upper Breakeven:", format!("${:.2}", p.breakeven_upper)),
            ("Profit Range:", format!("${:.2}", p.profit_zone_width)),
        ],
    );
}

fn print_market_recommendations(regime: VolRegime) {
    match regime {
        VolRegime::Low => {
            println!("\n⚠  LOW VOLATILITY ENVIRONMENT");
            println!("   • Smaller credits expected");
            println!("   • Consider waiting for higher volatility");
            println!("   • Or use tighter strikes with lower risk");
        }
        VolRegime::Moderate => {
            println!("\n✓  MODERATE VOLATILITY - GOOD FOR IRON CONDORS");
            println!("   • Balanced risk/reward environment");
            println!("   • Reasonable credit potential");
            println!("   • Proceed with standard position sizing");
        }
        VolRegime::Elevated => {
            println!("\n✓  ELEVATED VOLATILITY - EXCELLENT FOR IRON CONDORS");
            println!("   • Higher credits available");
            println!("   • Good premium collection environment");
            println!("   • Monitor for increased price movement");
        }
        VolRegime::High => {
            println!("\n⚠  HIGH VOLATILITY - RISKY ENVIRONMENT");
            println!("   • Significant price swings expected");
            println!("   • Consider wider strikes");
            println!("   • Reduce position size or wait for calm");
        }
    }
}

/// Comma-grouped integer rendering for volume figures
fn group_thousands(value: f64) -> String {
    let raw = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(3_500_000_000.0), "3,500,000,000");
        assert_eq!(group_thousands(-45_210.0), "-45,210");
    }
}
