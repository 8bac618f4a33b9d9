use crate::model::Threshold;

/// Parse a guideline value string into a [`Threshold`].
///
/// Handles formats like:
/// - "12" -> max 12
/// - "2000" -> max 2000
/// - "5.5-8.5" -> min 5.5, max 8.5
/// - "", "n/a", "6-" or "1-2-3" -> absent
///
/// Never fails: anything unparseable yields [`Threshold::ABSENT`], which the
/// classifier treats as "not evaluable".
pub fn parse_guideline_value(value: Option<&str>) -> Threshold {
    let Some(value) = value else {
        return Threshold::ABSENT;
    };
    let value = value.trim();
    if value.is_empty() {
        return Threshold::ABSENT;
    }

    if value.contains('-') {
        let parts: Vec<&str> = value.split('-').collect();
        if parts.len() != 2 {
            return Threshold::ABSENT;
        }
        return match (parse_float(parts[0]), parse_float(parts[1])) {
            (Some(min), Some(max)) => Threshold::range(min, max),
            _ => Threshold::ABSENT,
        };
    }

    match parse_float(value) {
        Some(max) => Threshold::upper(max),
        None => Threshold::ABSENT,
    }
}

/// Coerce a cell to a number, returning `None` for anything non-numeric.
///
/// Used where the whole string must be a single number (the ratio table
/// treats a range guideline as missing).
pub fn parse_numeric(s: &str) -> Option<f64> {
    parse_float(s)
}

fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_is_upper_bound() {
        assert_eq!(parse_guideline_value(Some("12")), Threshold::upper(12.0));
        assert_eq!(parse_guideline_value(Some(" 0.25 ")), Threshold::upper(0.25));
    }

    #[test]
    fn test_range_value() {
        assert_eq!(
            parse_guideline_value(Some("5.5-8.5")),
            Threshold::range(5.5, 8.5)
        );
        assert_eq!(
            parse_guideline_value(Some("6.0 - 8.0")),
            Threshold::range(6.0, 8.0)
        );
    }

    #[test]
    fn test_malformed_range_side_is_absent() {
        assert_eq!(parse_guideline_value(Some("5.5-abc")), Threshold::ABSENT);
        assert_eq!(parse_guideline_value(Some("x-8.5")), Threshold::ABSENT);
        assert_eq!(parse_guideline_value(Some("6-")), Threshold::ABSENT);
    }

    #[test]
    fn test_three_part_range_is_absent() {
        assert_eq!(parse_guideline_value(Some("1-2-3")), Threshold::ABSENT);
    }

    #[test]
    fn test_missing_and_empty_are_absent() {
        assert_eq!(parse_guideline_value(None), Threshold::ABSENT);
        assert_eq!(parse_guideline_value(Some("")), Threshold::ABSENT);
        assert_eq!(parse_guideline_value(Some("   ")), Threshold::ABSENT);
    }

    #[test]
    fn test_text_is_absent() {
        assert_eq!(parse_guideline_value(Some("See note")), Threshold::ABSENT);
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("120"), Some(120.0));
        assert_eq!(parse_numeric(" 1.5 "), Some(1.5));
        assert_eq!(parse_numeric("5.5-8.5"), None);
        assert_eq!(parse_numeric(""), None);
    }
}
