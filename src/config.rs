use crate::analysis::AnalysisParams;
use crate::errors::{CondorError, CondorResult};
use crate::types::{RiskProfile, StrategyConfig};
use smallvec::SmallVec;
use std::path::PathBuf;

/// Wing width defaults per risk profile, in index points
const CONSERVATIVE_WING: f64 = 50.0;
const MODERATE_WING: f64 = 50.0;
const AGGRESSIVE_WING: f64 = 25.0;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub symbol: String,
    pub range: String,
    pub days_to_expiration: u32,
    pub risk_profile: RiskProfile,
    /// Explicit override; None falls back to the profile default.
    pub wing_width: Option<f64>,
    pub rolling_windows: SmallVec<[usize; 4]>,
    pub output_dir: PathBuf,
    pub demo_mode: bool,
}

impl AppConfig {
    pub fn from_env() -> CondorResult<Self> {
        dotenvy::dotenv().ok();

        let days_to_expiration = env_var_or("DAYS_TO_EXPIRATION", "45")
            .parse::<u32>()
            .map_err(|e| CondorError::Config(format!("DAYS_TO_EXPIRATION: {e}")))?;
        if days_to_expiration == 0 {
            return Err(CondorError::Config(
                "DAYS_TO_EXPIRATION: must be at least 1".to_string(),
            ));
        }

        let risk_profile = env_var_or("RISK_PROFILE", "moderate").parse::<RiskProfile>()?;

        let wing_width = match std::env::var("WING_WIDTH") {
            Ok(raw) => {
                let width = raw
                    .parse::<f64>()
                    .map_err(|e| CondorError::Config(format!("WING_WIDTH: {e}")))?;
                if !width.is_finite() || width <= 0.0 {
                    return Err(CondorError::Config(format!(
                        "WING_WIDTH: must be a positive number, got {width}"
                    )));
                }
                Some(width)
            }
            Err(_) => None,
        };

        let rolling_windows = parse_windows(&env_var_or("ROLLING_WINDOWS", "10,30,60"))?;

        let demo_mode = env_var_or("DEMO_MODE", "false")
            .parse::<bool>()
            .map_err(|e| CondorError::Config(format!("DEMO_MODE: {e}")))?;

        Ok(Self {
            symbol: env_var_or("SYMBOL", "^GSPC"),
            range: env_var_or("RANGE", "2y"),
            days_to_expiration,
            risk_profile,
            wing_width,
            rolling_windows,
            output_dir: PathBuf::from(env_var_or("OUTPUT_DIR", "output")),
            demo_mode,
        })
    }

    /// Strategy knobs for one evaluation, wing width resolved.
    pub fn strategy(&self) -> StrategyConfig {
        StrategyConfig {
            days_to_expiration: self.days_to_expiration,
            risk_profile: self.risk_profile,
            wing_width: self
                .wing_width
                .unwrap_or_else(|| default_wing_width(self.risk_profile)),
        }
    }

    /// Analyzer tunables: documented defaults, configured rolling windows.
    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            rolling_windows: self.rolling_windows.clone(),
            ..AnalysisParams::default()
        }
    }
}

fn default_wing_width(profile: RiskProfile) -> f64 {
    match profile {
        RiskProfile::Conservative => CONSERVATIVE_WING,
        RiskProfile::Moderate => MODERATE_WING,
        RiskProfile::Aggressive => AGGRESSIVE_WING,
    }
}

/// Parses a comma-separated window list, e.g. "10,30,60".
/// A rolling window needs at least two returns, so 0 and 1 are rejected.
fn parse_windows(raw: &str) -> CondorResult<SmallVec<[usize; 4]>> {
    let mut windows = SmallVec::new();
    for part in raw.split(',') {
        let window = part
            .trim()
            .parse::<usize>()
            .map_err(|e| CondorError::Config(format!("ROLLING_WINDOWS: {part:?}: {e}")))?;
        if window < 2 {
            return Err(CondorError::Config(format!(
                "ROLLING_WINDOWS: window must be at least 2, got {window}"
            )));
        }
        windows.push(window);
    }
    if windows.is_empty() {
        return Err(CondorError::Config(
            "ROLLING_WINDOWS: at least one window required".to_string(),
        ));
    }
    Ok(windows)
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
