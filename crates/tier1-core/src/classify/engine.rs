use crate::classify::outcome::{ExceedanceRow, ExceedanceType};
use crate::join::JoinedRow;
use crate::model::Threshold;
use crate::parsing::parse_guideline_value;
use crate::rules::schema::ComparisonRule;
use crate::rules::RuleTable;

/// Compare a concentration with a threshold under a comparison rule.
///
/// A missing bound never triggers: a range without a minimum cannot be
/// "below min", and an upper-bound rule without a maximum is undetermined.
/// Values equal to a bound are within range.
pub fn assess(rule: ComparisonRule, value: f64, threshold: &Threshold) -> ExceedanceType {
    if value.is_nan() || !threshold.is_evaluable() {
        return ExceedanceType::Undetermined;
    }

    match rule {
        ComparisonRule::Range => {
            if threshold.min.is_some_and(|min| value < min) {
                ExceedanceType::BelowMin
            } else if threshold.max.is_some_and(|max| value > max) {
                ExceedanceType::AboveMax
            } else {
                ExceedanceType::WithinRange
            }
        }
        ComparisonRule::UpperBound => match threshold.max {
            Some(max) if value > max => ExceedanceType::AboveMax,
            Some(_) => ExceedanceType::WithinRange,
            None => ExceedanceType::Undetermined,
        },
    }
}

/// Keep only the joined rows whose concentration exceeds the guideline.
///
/// The guideline text is parsed as a threshold (single upper bound or
/// `min-max` range) and compared with the rule the table assigns to the
/// row's parameter. Rows with no guideline, an unparseable guideline or no
/// usable bound are dropped.
pub fn calculate_exceedances(rows: &[JoinedRow], rules: &RuleTable) -> Vec<ExceedanceRow> {
    let mut exceedances = Vec::new();
    let mut unparseable = 0usize;

    for row in rows {
        let threshold = parse_guideline_value(row.guideline_value());
        if row.guideline.is_some() && !threshold.is_evaluable() {
            unparseable += 1;
            log::debug!(
                "sample {} {}: guideline '{}' is not a number or range",
                row.sample_id,
                row.parameter(),
                row.guideline_value().unwrap_or_default()
            );
        }

        let rule = rules.rule_for(row.parameter_key());
        let outcome = assess(rule, row.concentration_value, &threshold);
        if !outcome.is_exceedance() {
            continue;
        }

        log::debug!(
            "sample {} {}: {} {} guideline {} ({} rule)",
            row.sample_id,
            row.parameter(),
            row.concentration_value,
            outcome,
            row.guideline_value().unwrap_or_default(),
            rule
        );

        exceedances.push(ExceedanceRow {
            sample_id: row.sample_id.clone(),
            sample_name: row.sample_name.clone(),
            parameter: row.parameter().to_string(),
            soil_type: row.soil_type().to_string(),
            land_use: row.land_use.clone(),
            concentration_value: row.concentration_value,
            guideline_value: row.guideline_value().unwrap_or_default().to_string(),
            exceeds: true,
        });
    }

    if unparseable > 0 {
        log::warn!("{unparseable} matched guideline value(s) could not be parsed and were not evaluated");
    }
    log::info!(
        "{} exceedance(s) in {} joined row(s)",
        exceedances.len(),
        rows.len()
    );
    exceedances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::GuidelineMatch;

    fn row(param: &str, value: f64, guideline: Option<&str>) -> JoinedRow {
        JoinedRow::new(
            "1",
            Some("BH-01".into()),
            param,
            "Fine",
            Some("Agricultural".into()),
            value,
            guideline.map(|g| GuidelineMatch {
                guideline_value: g.into(),
                units: "mg/kg".into(),
                notes: String::new(),
            }),
        )
    }

    const PH: &str = "pH (in 0.01M CaCl2)";

    #[test]
    fn test_assess_upper_bound() {
        let t = Threshold::upper(100.0);
        assert_eq!(assess(ComparisonRule::UpperBound, 120.0, &t), ExceedanceType::AboveMax);
        assert_eq!(assess(ComparisonRule::UpperBound, 100.0, &t), ExceedanceType::WithinRange);
        assert_eq!(assess(ComparisonRule::UpperBound, 1.0, &t), ExceedanceType::WithinRange);
    }

    #[test]
    fn test_assess_upper_bound_without_max_never_exceeds() {
        for value in [0.0, 1e9, -5.0] {
            assert!(!assess(ComparisonRule::UpperBound, value, &Threshold::ABSENT).is_exceedance());
            let min_only = Threshold { min: Some(1.0), max: None };
            assert!(!assess(ComparisonRule::UpperBound, value, &min_only).is_exceedance());
        }
    }

    #[test]
    fn test_assess_range_boundaries_inclusive() {
        let t = Threshold::range(5.5, 8.5);
        assert_eq!(assess(ComparisonRule::Range, 5.5, &t), ExceedanceType::WithinRange);
        assert_eq!(assess(ComparisonRule::Range, 8.5, &t), ExceedanceType::WithinRange);
        assert_eq!(assess(ComparisonRule::Range, 6.0, &t), ExceedanceType::WithinRange);
        assert_eq!(assess(ComparisonRule::Range, 5.4, &t), ExceedanceType::BelowMin);
        assert_eq!(assess(ComparisonRule::Range, 8.6, &t), ExceedanceType::AboveMax);
    }

    #[test]
    fn test_assess_range_missing_min() {
        let t = Threshold::upper(8.5);
        assert_eq!(assess(ComparisonRule::Range, 0.1, &t), ExceedanceType::WithinRange);
        assert_eq!(assess(ComparisonRule::Range, 9.0, &t), ExceedanceType::AboveMax);
    }

    #[test]
    fn test_assess_nan_is_undetermined() {
        assert_eq!(
            assess(ComparisonRule::UpperBound, f64::NAN, &Threshold::upper(1.0)),
            ExceedanceType::Undetermined
        );
    }

    #[test]
    fn test_upper_bound_exceedance_kept() {
        let rules = RuleTable::tier1().unwrap();
        let out = calculate_exceedances(&[row("Arsenic", 120.0, Some("100"))], &rules);
        assert_eq!(out.len(), 1);
        assert!(out[0].exceeds);
        assert_eq!(out[0].guideline_value, "100");
        assert_eq!(out[0].sample_name.as_deref(), Some("BH-01"));
    }

    #[test]
    fn test_ph_within_range_not_flagged() {
        let rules = RuleTable::tier1().unwrap();
        let out = calculate_exceedances(&[row(PH, 6.0, Some("5.5-8.5"))], &rules);
        assert!(out.is_empty());
    }

    #[test]
    fn test_ph_below_min_flagged_regardless_of_case() {
        let rules = RuleTable::tier1().unwrap();
        let out = calculate_exceedances(&[row("PH (IN 0.01M CACL2)", 4.9, Some("5.5-8.5"))], &rules);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_non_ph_range_guideline_uses_max_only() {
        let rules = RuleTable::tier1().unwrap();
        let rows = [
            row("Electrical conductivity", 1.0, Some("2-4")),
            row("Electrical conductivity", 5.0, Some("2-4")),
        ];
        let out = calculate_exceedances(&rows, &rules);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].concentration_value, 5.0);
    }

    #[test]
    fn test_missing_or_bad_guideline_excluded() {
        let rules = RuleTable::tier1().unwrap();
        let rows = [
            row("Arsenic", 1e6, None),
            row("Arsenic", 1e6, Some("See note")),
            row(PH, 1.0, Some("5.5-x")),
        ];
        assert!(calculate_exceedances(&rows, &rules).is_empty());
    }
}
