use crate::errors::{CondorError, CondorResult};
use crate::types::{PricePoint, PriceSeries};
use chrono::DateTime;
use reqwest::Client;

/// Yahoo Finance v8 chart endpoint. No API key required.
const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo rejects requests without a browser-style user agent
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Daily close history for `symbol` over a Yahoo range string ("1y", "2y", ...).
/// Index symbols like ^GSPC are percent-encoded by the URL layer.
pub async fn fetch_daily_history(symbol: &str, range: &str) -> CondorResult<PriceSeries> {
    tracing::info!(symbol, range, "fetching daily history");

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default();

    let url = format!("{CHART_BASE_URL}/{symbol}");
    let resp = client
        .get(&url)
        .query(&[("range", range), ("interval", "1d")])
        .send()
        .await
        .map_err(|e| CondorError::Fetch(format!("request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(CondorError::Fetch(format!("HTTP {status}: {body}")));
    }

    let data: ChartResponse = resp
        .json()
        .await
        .map_err(|e| CondorError::Fetch(format!("parse: {e}")))?;

    let series = chart_to_series(data)?;
    tracing::info!(rows = series.len(), "daily history parsed");
    Ok(series)
}

// Actual Yahoo chart response format (trimmed):
// {
//   "chart": {
//     "result": [
//       {
//         "meta": { "symbol": "^GSPC", "regularMarketPrice": 6449.8 },
//         "timestamp": [1754919000, 1755005400, 1755091800],
//         "indicators": {
//           "quote": [
//             {
//               "close": [6445.76, null, 6466.58],
//               "volume": [5160430000, 4881810000, null]
//             }
//           ]
//         }
//       }
//     ],
//     "error": null
//   }
// }

#[derive(serde::Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(serde::Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct ChartResult {
    #[allow(dead_code)]
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(serde::Deserialize)]
struct ChartMeta {
    #[allow(dead_code)]
    symbol: Option<String>,
    #[allow(dead_code)]
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(serde::Deserialize)]
struct Indicators {
    quote: Option<Vec<Quote>>,
}

#[derive(serde::Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Maps the chart payload into a validated series. Null closes (holidays,
/// half sessions) are dropped the way a dataframe dropna would; a missing
/// volume becomes 0.0 rather than losing the row.
fn chart_to_series(data: ChartResponse) -> CondorResult<PriceSeries> {
    let chart = data
        .chart
        .ok_or_else(|| CondorError::Fetch("no chart object in response".into()))?;

    if let Some(err) = &chart.error {
        if !err.is_null() {
            return Err(CondorError::Fetch(format!("chart error: {err}")));
        }
    }

    let result = chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| CondorError::Fetch("empty chart result".into()))?;

    let timestamps = result
        .timestamp
        .ok_or_else(|| CondorError::Fetch("no timestamps in chart result".into()))?;
    let quote = result
        .indicators
        .and_then(|i| i.quote)
        .and_then(|mut q| if q.is_empty() { None } else { Some(q.remove(0)) })
        .ok_or_else(|| CondorError::Fetch("no quote block in chart result".into()))?;
    let closes = quote
        .close
        .ok_or_else(|| CondorError::Fetch("no close array in quote block".into()))?;
    let volumes = quote.volume.unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, (&ts, close)) in timestamps.iter().zip(closes.iter()).enumerate() {
        let Some(close) = *close else { continue };
        if !close.is_finite() || close <= 0.0 {
            continue;
        }
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let volume = volumes.get(i).copied().flatten().unwrap_or(0.0);
        points.push(PricePoint {
            date,
            close,
            volume,
        });
    }

    if points.is_empty() {
        return Err(CondorError::Fetch("no usable rows in chart response".into()));
    }

    PriceSeries::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn parse(payload: &str) -> ChartResponse {
        serde_json::from_str(payload).unwrap()
    }

    #[test]
    fn test_chart_payload_maps_to_series() {
        // 2025-08-11 .. 2025-08-13, 13:30 UTC session opens
        let payload = r#"{
            "chart": {
                "result": [{
                    "meta": { "symbol": "^GSPC", "regularMarketPrice": 6466.58 },
                    "timestamp": [1754919000, 1755005400, 1755091800],
                    "indicators": {
                        "quote": [{
                            "close": [6445.76, null, 6466.58],
                            "volume": [5160430000, 4881810000, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let series = chart_to_series(parse(payload)).unwrap();
        assert_eq!(series.len(), 2, "null close row must be dropped");
        let points = series.points();
        assert_eq!(points[0].date.day(), 11);
        assert_eq!(points[0].close, 6445.76);
        assert_eq!(points[0].volume, 5160430000.0);
        assert_eq!(points[1].date.day(), 13);
        assert_eq!(points[1].close, 6466.58);
        assert_eq!(points[1].volume, 0.0, "missing volume keeps the row");
        assert_eq!(series.last_close(), Some(6466.58));
    }

    #[test]
    fn test_chart_error_field_is_surfaced() {
        let payload = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found" }
            }
        }"#;
        let err = chart_to_series(parse(payload)).unwrap_err();
        assert!(
            matches!(&err, CondorError::Fetch(msg) if msg.contains("Not Found")),
            "expected chart error to surface, got {err:?}"
        );
    }

    #[test]
    fn test_empty_result_is_rejected() {
        let payload = r#"{ "chart": { "result": [], "error": null } }"#;
        let err = chart_to_series(parse(payload)).unwrap_err();
        assert!(matches!(err, CondorError::Fetch(_)));
    }

    #[test]
    fn test_all_null_closes_are_rejected() {
        let payload = r#"{
            "chart": {
                "result": [{
                    "meta": null,
                    "timestamp": [1754919000, 1755005400],
                    "indicators": { "quote": [{ "close": [null, null], "volume": [1, 2] }] }
                }],
                "error": null
            }
        }"#;
        let err = chart_to_series(parse(payload)).unwrap_err();
        assert!(
            matches!(&err, CondorError::Fetch(msg) if msg.contains("no usable rows")),
            "got {err:?}"
        );
    }
}
