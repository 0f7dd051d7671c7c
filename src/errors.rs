/// Domain-specific error types for the analysis pipeline.
/// Every variant is terminal for the evaluation it occurs in: the core
/// computes one recommendation snapshot and either succeeds or reports
/// exactly why it could not. Retries belong to the fetch layer, not here.
#[derive(Debug, thiserror::Error)]
pub enum CondorError {
    #[error("insufficient data: {observations} price observation(s), need at least 2")]
    InsufficientData { observations: usize },

    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    #[error(
        "invalid configuration: {reason} \
         (price={price}, vol={volatility}, dte={days_to_expiration}, wing={wing_width})"
    )]
    InvalidConfiguration {
        reason: String,
        price: f64,
        volatility: f64,
        days_to_expiration: u32,
        wing_width: f64,
    },

    #[error(
        "non-positive credit {credit:.4} \
         (price={price}, vol={volatility}, dte={days_to_expiration}, wing={wing_width})"
    )]
    ZeroCredit {
        credit: f64,
        price: f64,
        volatility: f64,
        days_to_expiration: u32,
        wing_width: f64,
    },

    #[error("inconsistent result: {0}")]
    InconsistentResult(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("report error: {0}")]
    Report(String),
}

impl From<reqwest::Error> for CondorError {
    fn from(e: reqwest::Error) -> Self {
        CondorError::Fetch(e.to_string())
    }
}

impl From<std::io::Error> for CondorError {
    fn from(e: std::io::Error) -> Self {
        CondorError::Report(e.to_string())
    }
}

impl From<csv::Error> for CondorError {
    fn from(e: csv::Error) -> Self {
        CondorError::Report(e.to_string())
    }
}

pub type CondorResult<T> = Result<T, CondorError>;
