use std::path::Path;
use tier1_core::error::Tier1Error;
use tier1_core::rules::builtin;
use tier1_core::rules::schema::{ComparisonRule, RuleSetDef};

pub fn list() -> Result<(), Tier1Error> {
    println!("Available predefined rule sets:\n");
    for name in builtin::PRESETS {
        let rs = builtin::load_preset(name)?;
        println!("  {:<8} {} (v{})", name, rs.name, rs.version);
        if let Some(ref desc) = rs.description {
            println!("           {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), Tier1Error> {
    let rs = builtin::load_preset(preset)?;
    print_ruleset(&rs);
    Ok(())
}

fn describe(rule: ComparisonRule) -> &'static str {
    match rule {
        ComparisonRule::Range => "exceeds below the minimum or above the maximum of a \"min-max\" guideline",
        ComparisonRule::UpperBound => "exceeds above the guideline value",
    }
}

fn print_ruleset(rs: &RuleSetDef) {
    println!("{} (version {})\n", rs.name, rs.version);

    if let Some(ref desc) = rs.description {
        println!("{}\n", desc);
    }

    println!(
        "Parameters without their own rule use '{}': {}.\n",
        rs.default_rule,
        describe(rs.default_rule)
    );

    if rs.rules.is_empty() {
        return;
    }

    let width = rs
        .rules
        .iter()
        .map(|r| r.parameter.len())
        .max()
        .unwrap_or(20);

    println!("  {:<width$}  Rule", "Parameter", width = width);
    println!("  {}", "-".repeat(width + 14));
    for rule in &rs.rules {
        println!("  {:<width$}  {}", rule.parameter, rule.rule, width = width);
        if let Some(ref note) = rule.note {
            println!("  {:<width$}    {}", "", note, width = width);
        }
    }
    println!();
    println!("Parameter names are matched ignoring case and surrounding whitespace.");
}

pub fn validate(file: &Path) -> Result<(), Tier1Error> {
    let rs = tier1_core::rules::load_ruleset(file)?;

    println!("Rule set '{}' (v{}) is valid.", rs.name, rs.version);
    println!("  Default rule: {}", rs.default_rule);
    println!("  Rules: {} parameter(s)", rs.rules.len());

    let redundant: Vec<_> = rs
        .rules
        .iter()
        .filter(|r| r.rule == rs.default_rule)
        .collect();
    if !redundant.is_empty() {
        println!("\nWarnings:");
        for r in redundant {
            println!(
                "  - parameter '{}' repeats the default rule '{}'",
                r.parameter, r.rule
            );
        }
    }

    Ok(())
}
