pub mod builtin;
pub mod schema;

use crate::error::Tier1Error;
use crate::model::NormKey;
use schema::{ComparisonRule, RuleSetDef};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Load a rule set from a JSON file.
pub fn load_ruleset(path: &Path) -> Result<RuleSetDef, Tier1Error> {
    let content = std::fs::read_to_string(path).map_err(|e| Tier1Error::RulesLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_ruleset(&content, path)
}

/// Parse a rule set from a JSON string.
pub fn parse_ruleset(json: &str, source: &Path) -> Result<RuleSetDef, Tier1Error> {
    let ruleset: RuleSetDef = serde_json::from_str(json).map_err(|e| Tier1Error::RulesLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Parse a rule set from a JSON string (no file path context).
pub fn parse_ruleset_str(json: &str) -> Result<RuleSetDef, Tier1Error> {
    let ruleset: RuleSetDef = serde_json::from_str(json).map_err(Tier1Error::Json)?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Validate that a rule set is well-formed.
pub fn validate_ruleset(ruleset: &RuleSetDef) -> Result<(), Tier1Error> {
    let mut seen = HashSet::new();
    for rule in &ruleset.rules {
        let key = NormKey::new(&rule.parameter);
        if key.as_str().is_empty() {
            return Err(Tier1Error::RulesInvalid(
                "parameter name must not be empty".into(),
            ));
        }
        if !seen.insert(key) {
            return Err(Tier1Error::RulesInvalid(format!(
                "parameter '{}' has more than one rule",
                rule.parameter.trim()
            )));
        }
    }
    Ok(())
}

/// Comparison rules resolved by normalized parameter.
#[derive(Debug, Clone)]
pub struct RuleTable {
    default_rule: ComparisonRule,
    by_parameter: HashMap<NormKey, ComparisonRule>,
}

impl RuleTable {
    pub fn from_ruleset(ruleset: &RuleSetDef) -> Self {
        let by_parameter = ruleset
            .rules
            .iter()
            .map(|r| (NormKey::new(&r.parameter), r.rule))
            .collect();
        RuleTable {
            default_rule: ruleset.default_rule,
            by_parameter,
        }
    }

    /// The builtin Tier 1 rules: pH by range, everything else by upper bound.
    pub fn tier1() -> Result<Self, Tier1Error> {
        Ok(Self::from_ruleset(&builtin::load_preset("tier1")?))
    }

    pub fn rule_for(&self, parameter: &NormKey) -> ComparisonRule {
        self.by_parameter
            .get(parameter)
            .copied()
            .unwrap_or(self.default_rule)
    }

    pub fn default_rule(&self) -> ComparisonRule {
        self.default_rule
    }
}
