use serde::{Deserialize, Serialize};
use std::fmt;

/// How a concentration relates to its guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceedanceType {
    AboveMax,
    BelowMin,
    WithinRange,
    /// No usable guideline or concentration; nothing can be said.
    Undetermined,
}

impl ExceedanceType {
    pub fn is_exceedance(&self) -> bool {
        matches!(self, ExceedanceType::AboveMax | ExceedanceType::BelowMin)
    }
}

impl fmt::Display for ExceedanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceedanceType::AboveMax => write!(f, "above_max"),
            ExceedanceType::BelowMin => write!(f, "below_min"),
            ExceedanceType::WithinRange => write!(f, "within_range"),
            ExceedanceType::Undetermined => write!(f, "undetermined"),
        }
    }
}

/// A measurement that exceeds its guideline (exceedances-only report).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceedanceRow {
    pub sample_id: String,
    pub sample_name: Option<String>,
    pub parameter: String,
    pub soil_type: String,
    pub land_use: Option<String>,
    pub concentration_value: f64,
    /// Guideline text as stored, e.g. "12" or "6.0-8.5".
    pub guideline_value: String,
    pub exceeds: bool,
}

/// A row of the full exceedance table, annotated with ratio and type.
#[derive(Debug, Clone, Serialize)]
pub struct RatedExceedance {
    pub sample_id: String,
    pub sample_name: Option<String>,
    pub parameter: String,
    pub soil_type: String,
    pub land_use: Option<String>,
    pub concentration_value: f64,
    /// Numeric guideline; `None` when the text was missing or not a single number.
    pub guideline_value: Option<f64>,
    /// concentration / guideline rounded to 2 decimals. May be infinite or
    /// NaN when the guideline is zero.
    pub exceedance_ratio: Option<f64>,
    pub exceedance_type: ExceedanceType,
}
