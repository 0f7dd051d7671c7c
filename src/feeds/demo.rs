use crate::errors::{CondorError, CondorResult};
use crate::types::{PricePoint, PriceSeries};
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

/// Fixed seed: a demo run prints the same numbers every time
const DEMO_SEED: u64 = 42;

/// Synthetic index path parameters: 10% annual drift, 18% annualized vol,
/// anchored at 4200 with a linear 20% lift across the window
const START_PRICE: f64 = 4200.0;
const ANNUAL_DRIFT: f64 = 0.10;
const ANNUAL_VOL: f64 = 0.18;
const TREND_LIFT: f64 = 0.2;

const TRADING_DAYS_PER_YEAR: usize = 252;

/// Volume draws, clipped from below
const MEAN_VOLUME: f64 = 3.5e9;
const VOLUME_STDDEV: f64 = 0.5e9;
const MIN_VOLUME: f64 = 1.0e9;

/// Seeded geometric Brownian motion stand-in for the live feed, used when
/// the network is unavailable or DEMO_MODE is set. Only year ranges are
/// supported ("1y", "2y", ...); each year contributes 252 business days
/// ending at the most recent weekday.
pub fn demo_history(range: &str) -> CondorResult<PriceSeries> {
    let days = demo_days(range)?;
    let dates = business_days_back(Utc::now().date_naive(), days);

    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    let normal = Normal::standard();
    let drift = ANNUAL_DRIFT / TRADING_DAYS_PER_YEAR as f64;
    let vol = ANNUAL_VOL / (TRADING_DAYS_PER_YEAR as f64).sqrt();

    // Log-price path first, volume draws second, matching index by index.
    let mut log_levels = Vec::with_capacity(days);
    let mut level = 0.0;
    log_levels.push(level);
    for _ in 1..days {
        level += drift + vol * normal.sample(&mut rng);
        log_levels.push(level);
    }

    let span = (days - 1).max(1) as f64;
    let mut points = Vec::with_capacity(days);
    for (i, (date, log_level)) in dates.iter().zip(&log_levels).enumerate() {
        let trend = 1.0 + TREND_LIFT * i as f64 / span;
        let close = START_PRICE * log_level.exp() * trend;
        let volume = (MEAN_VOLUME + VOLUME_STDDEV * normal.sample(&mut rng)).max(MIN_VOLUME);
        points.push(PricePoint {
            date: *date,
            close,
            volume,
        });
    }

    let series = PriceSeries::new(points)?;
    tracing::info!(
        days = series.len(),
        last_close = series.last_close().unwrap_or(0.0),
        "generated demo history"
    );
    Ok(series)
}

fn demo_days(range: &str) -> CondorResult<usize> {
    let years = range
        .trim()
        .strip_suffix('y')
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| {
            CondorError::Config(format!(
                "demo mode supports year ranges like 1y or 2y, got {range:?}"
            ))
        })?;
    if years == 0 {
        return Err(CondorError::Config(
            "demo mode needs at least one year of history".to_string(),
        ));
    }
    Ok(years * TRADING_DAYS_PER_YEAR)
}

/// The last `count` weekdays ending at `end` (rolled back off a weekend),
/// in ascending order.
fn business_days_back(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut day = end;
    while dates.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    dates.reverse();
    dates
}
