use crate::errors::{CondorError, CondorResult};
use crate::types::{PriceSeries, ResultRecord, StrategyConfig};
use chrono::NaiveDate;
use std::path::Path;

#[derive(serde::Serialize)]
struct PriceRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// One headline row per analysis run.
/// Values are written exactly as the record stores them: volatility and
/// probability stay fractional, the percent scaling is a display concern.
#[derive(serde::Serialize)]
struct SummaryRow {
    #[serde(rename = "Analysis Date")]
    analysis_date: String,
    #[serde(rename = "Current Price")]
    current_price: f64,
    #[serde(rename = "DTE")]
    days_to_expiration: u32,
    #[serde(rename = "Volatility")]
    volatility: f64,
    #[serde(rename = "Long Put")]
    long_put: f64,
    #[serde(rename = "Short Put")]
    short_put: f64,
    #[serde(rename = "Short Call")]
    short_call: f64,
    #[serde(rename = "Long Call")]
    long_call: f64,
    #[serde(rename = "Max Profit")]
    max_profit: f64,
    #[serde(rename = "Max Loss")]
    max_loss: f64,
    #[serde(rename = "PoP")]
    probability_of_profit: f64,
}

pub fn render_price_data(series: &PriceSeries) -> CondorResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for p in series.points() {
        writer.serialize(PriceRow {
            date: p.date,
            close: p.close,
            volume: p.volume,
        })?;
    }
    finish(writer)
}

pub fn render_summary(record: &ResultRecord, config: StrategyConfig) -> CondorResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(SummaryRow {
        analysis_date: record.as_of.format("%Y-%m-%d %H:%M:%S").to_string(),
        current_price: record.current_price,
        days_to_expiration: config.days_to_expiration,
        volatility: record.volatility.annualized,
        long_put: record.strikes.long_put,
        short_put: record.strikes.short_put,
        short_call: record.strikes.short_call,
        long_call: record.strikes.long_call,
        max_profit: record.payoff.max_profit,
        max_loss: record.payoff.max_loss,
        probability_of_profit: record.payoff.probability_of_profit,
    })?;
    finish(writer)
}

pub fn write_price_data(series: &PriceSeries, path: &Path) -> CondorResult<()> {
    std::fs::write(path, render_price_data(series)?)?;
    Ok(())
}

pub fn write_summary(
    record: &ResultRecord,
    config: StrategyConfig,
    path: &Path,
) -> CondorResult<()> {
    std::fs::write(path, render_summary(record, config)?)?;
    Ok(())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> CondorResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CondorError::Report(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CondorError::Report(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_record;
    use crate::types::{PricePoint, RiskProfile};

    fn config() -> StrategyConfig {
        StrategyConfig {
            days_to_expiration: 45,
            risk_profile: RiskProfile::Moderate,
            wing_width: 50.0,
        }
    }

    #[test]
    fn test_price_csv_layout() {
        let series = PriceSeries::new(vec![
            PricePoint {
                date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                close: 100.0,
                volume: 1.0e9,
            },
            PricePoint {
                date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
                close: 101.5,
                volume: 2.0e9,
            },
        ])
        .unwrap();

        let out = render_price_data(&series).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Date,Close,Volume");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2026-01-05,100"), "got {}", lines[1]);
        assert!(lines[2].starts_with("2026-01-06,101.5"), "got {}", lines[2]);
    }

    #[test]
    fn test_summary_csv_is_one_row() {
        let record = sample_record();
        let out = render_summary(&record, config()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "header plus one data row");
        assert_eq!(
            lines[0],
            "Analysis Date,Current Price,DTE,Volatility,Long Put,Short Put,\
             Short Call,Long Call,Max Profit,Max Loss,PoP"
        );
        assert!(lines[1].contains("5800"));
        assert!(lines[1].contains(",45,"));
        assert!(lines[1].contains("0.18"));
    }

    #[test]
    fn test_summary_csv_round_trips() {
        let record = sample_record();
        let out = render_summary(&record, config()).unwrap();
        let mut reader = csv::Reader::from_reader(out.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row.len(), 11);
        let pop: f64 = row[10].parse().unwrap();
        assert!((pop - record.payoff.probability_of_profit).abs() < 1e-9);
    }
}
