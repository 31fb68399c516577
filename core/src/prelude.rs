use serde::{Deserialize, Serialize};

/// Shared constants used by the derivation stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Washout applied to vertical acceleration before integration (s).
    pub az_washout_tc: f64,
    /// Complementary filter time constant for rate of climb (s).
    pub rate_of_climb_lag_tc: f64,
    /// Standard gravity (ft/s²).
    pub gravity: f64,
    pub kts_to_fps: f64,
    pub hysteresis_fpalt: f64,
    pub hysteresis_fpalt_ccd: f64,
    pub hysteresis_fp_rad_alt: f64,
    pub hysteresis_fpias: f64,
    /// Longest masked run, in seconds, that `repair_mask` will bridge.
    pub repair_duration: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            az_washout_tc: 60.0,
            rate_of_climb_lag_tc: 6.0,
            gravity: 32.2,
            kts_to_fps: 1.68781,
            hysteresis_fpalt: 200.0,
            hysteresis_fpalt_ccd: 500.0,
            hysteresis_fp_rad_alt: 5.0,
            hysteresis_fpias: 10.0,
            repair_duration: 10.0,
        }
    }
}

/// Common error type for node derivation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DeriveError {
    #[error("dependency unavailable: {0}")]
    Unavailable(String),
    #[error("derivation not implemented: {0}")]
    NotImplemented(String),
    #[error("misaligned inputs '{left}' and '{right}': {detail}")]
    Misaligned {
        left: String,
        right: String,
        detail: String,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("dependency cycle between nodes: {0:?}")]
    DependencyCycle(Vec<String>),
    #[error("node registered twice: {0}")]
    DuplicateNode(String),
}

impl DeriveError {
    /// Absorbed by the resolver as a skip rather than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::NotImplemented(_))
    }
}

pub type DeriveResult<T> = Result<T, DeriveError>;
