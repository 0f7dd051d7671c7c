pub mod charts;
pub mod csv;
pub mod html;
pub mod text;

use crate::errors::CondorResult;
use crate::types::{PriceSeries, ResultRecord, StrategyConfig};
use std::path::{Path, PathBuf};

/// Everything one run writes to disk
#[derive(Debug)]
pub struct ReportPaths {
    pub text: PathBuf,
    pub html: PathBuf,
    pub price_csv: PathBuf,
    pub summary_csv: PathBuf,
    pub charts: Vec<PathBuf>,
}

/// Renders and writes the full report set: three SVG charts, the text and
/// HTML reports (the HTML inlines the chart markup, so the document is
/// self-contained), and the two CSV files. All model numbers come straight
/// from the record; the renderers only add display arithmetic such as
/// strike distances and percent-of-spot.
pub fn write_reports(
    record: &ResultRecord,
    series: &PriceSeries,
    config: StrategyConfig,
    output_dir: &Path,
) -> CondorResult<ReportPaths> {
    std::fs::create_dir_all(output_dir)?;

    let rendered = [
        ("price_history.svg", charts::price_history(series)),
        ("volatility_analysis.svg", charts::volatility_profile(record)),
        ("iron_condor_payoff.svg", charts::payoff_diagram(record)),
    ];
    let mut chart_paths = Vec::with_capacity(rendered.len());
    for (name, svg) in &rendered {
        let path = output_dir.join(name);
        std::fs::write(&path, svg)?;
        tracing::info!(path = %path.display(), "chart written");
        chart_paths.push(path);
    }

    let text = output_dir.join("iron_condor_report.txt");
    std::fs::write(&text, text::render(record, config))?;
    tracing::info!(path = %text.display(), "text report written");

    let html = output_dir.join("iron_condor_report.html");
    std::fs::write(&html, html::render(record, config, &rendered))?;
    tracing::info!(path = %html.display(), "html report written");

    let price_csv = output_dir.join("strategy_data.csv");
    csv::write_price_data(series, &price_csv)?;
    let summary_csv = output_dir.join("strategy_summary.csv");
    csv::write_summary(record, config, &summary_csv)?;
    tracing::info!(path = %price_csv.display(), "csv data written");

    Ok(ReportPaths {
        text,
        html,
        price_csv,
        summary_csv,
        charts: chart_paths,
    })
}

/// `value` as a percentage of `spot`, for distance annotations
#[inline]
pub(crate) fn pct_of_spot(value: f64, spot: f64) -> f64 {
    value / spot * 100.0
}

/// Breakeven distance in expected-move standard deviations.
/// The record stores the one-sigma dollar move, so sigma in return
/// space is expected_move / spot.
#[inline]
pub(crate) fn breakeven_std_devs(breakeven: f64, record: &ResultRecord) -> f64 {
    let sigma = record.strikes.expected_move / record.current_price;
    (breakeven / record.current_price).ln() / sigma
}

/// Fully populated record shared by the renderer tests.
#[cfg(test)]
pub(crate) fn sample_record() -> ResultRecord {
    use crate::analysis::{strategy, summary, AnalysisParams};
    use crate::types::{RiskProfile, RollingVol, StrategyConfig, VolRegime, VolatilitySummary};
    use chrono::TimeZone;

    let vol = VolatilitySummary {
        annualized: 0.18,
        rolling: smallvec::smallvec![
            RollingVol { window: 10, annualized: 0.21 },
            RollingVol { window: 30, annualized: 0.17 },
            RollingVol { window: 60, annualized: 0.19 },
        ],
        regime: VolRegime::Moderate,
        percentile: Some(62.5),
    };
    let config = StrategyConfig {
        days_to_expiration: 45,
        risk_profile: RiskProfile::Moderate,
        wing_width: 50.0,
    };
    let (strikes, payoff) =
        strategy::recommend(5800.0, &vol, &config, &AnalysisParams::default()).unwrap();
    let as_of = chrono::Utc.with_ymd_and_hms(2026, 8, 25, 14, 30, 0).unwrap();
    summary::summarize(vol, strikes, payoff, 5800.0, as_of).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakeven_std_devs_sign() {
        let record = sample_record();
        assert!(breakeven_std_devs(record.payoff.breakeven_lower, &record) < 0.0);
        assert!(breakeven_std_devs(record.payoff.breakeven_upper, &record) > 0.0);
    }

    #[test]
    fn test_pct_of_spot() {
        assert!((pct_of_spot(58.0, 5800.0) - 1.0).abs() < 1e-12);
    }
}
