use crate::error::Tier1Error;
use crate::rules::schema::RuleSetDef;
use crate::rules::validate_ruleset;

const TIER1_RULES_JSON: &str = include_str!("../../../../rules/comparison-rules.json");

/// Available predefined rule sets.
pub const PRESETS: &[&str] = &["tier1"];

/// Load a predefined rule set by name.
pub fn load_preset(name: &str) -> Result<RuleSetDef, Tier1Error> {
    match name {
        "tier1" => {
            let ruleset: RuleSetDef = serde_json::from_str(TIER1_RULES_JSON)?;
            validate_ruleset(&ruleset)?;
            Ok(ruleset)
        }
        _ => Err(Tier1Error::RulesInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
