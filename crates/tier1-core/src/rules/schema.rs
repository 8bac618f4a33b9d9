use serde::{Deserialize, Serialize};
use std::fmt;

/// How a concentration is compared with its guideline threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonRule {
    /// Exceeds when below the minimum or above the maximum.
    Range,
    /// Exceeds only when above the maximum.
    #[default]
    UpperBound,
}

impl fmt::Display for ComparisonRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonRule::Range => write!(f, "range"),
            ComparisonRule::UpperBound => write!(f, "upper_bound"),
        }
    }
}

/// A comparison rule file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Rule for parameters without an explicit entry.
    #[serde(default)]
    pub default_rule: ComparisonRule,
    #[serde(default)]
    pub rules: Vec<ParameterRuleDef>,
}

/// A rule override for one parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterRuleDef {
    /// Parameter label; matched after trimming and lower-casing.
    pub parameter: String,
    pub rule: ComparisonRule,
    #[serde(default)]
    pub note: Option<String>,
}
