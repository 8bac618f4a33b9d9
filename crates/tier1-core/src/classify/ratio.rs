use crate::classify::outcome::{ExceedanceType, RatedExceedance};
use crate::join::JoinedRow;
use crate::parsing::parse_numeric;
use std::collections::HashSet;

/// Build the full exceedance table: every joined row with its
/// concentration/guideline ratio and exceedance type.
///
/// Unlike [`calculate_exceedances`](super::calculate_exceedances) this path
/// assumes one numeric guideline per row. Range text such as "6.0-8.5" is
/// not a number here, so such rows get no ratio and an undetermined type.
/// Exact duplicate output rows are dropped, keeping the first.
pub fn generate_exceedance_table(rows: &[JoinedRow]) -> Vec<RatedExceedance> {
    let mut seen = HashSet::new();
    let mut table = Vec::with_capacity(rows.len());

    for row in rows {
        let concentration = row.concentration_value;
        let guideline = row.guideline_value().and_then(parse_numeric);
        let ratio = guideline.map(|g| round2(concentration / g));
        let exceedance_type = match guideline {
            Some(g) if !concentration.is_nan() && !g.is_nan() => {
                if concentration > g {
                    ExceedanceType::AboveMax
                } else if concentration < g {
                    ExceedanceType::BelowMin
                } else {
                    ExceedanceType::WithinRange
                }
            }
            _ => ExceedanceType::Undetermined,
        };

        let rated = RatedExceedance {
            sample_id: row.sample_id.clone(),
            sample_name: row.sample_name.clone(),
            parameter: row.parameter().to_string(),
            soil_type: row.soil_type().to_string(),
            land_use: row.land_use.clone(),
            concentration_value: concentration,
            guideline_value: guideline,
            exceedance_ratio: ratio,
            exceedance_type,
        };

        if seen.insert(RowKey::of(&rated)) {
            table.push(rated);
        }
    }

    let dropped = rows.len() - table.len();
    if dropped > 0 {
        log::info!("dropped {dropped} duplicate row(s) from the exceedance table");
    }
    table
}

/// Round to two decimals, halves to even. Non-finite values pass through.
fn round2(x: f64) -> f64 {
    if x.is_finite() {
        (x * 100.0).round_ties_even() / 100.0
    } else {
        x
    }
}

/// Identity of an output row across all of its columns.
#[derive(PartialEq, Eq, Hash)]
struct RowKey {
    text: [Option<String>; 5],
    numbers: [Option<u64>; 3],
    exceedance_type: ExceedanceType,
}

impl RowKey {
    fn of(r: &RatedExceedance) -> Self {
        RowKey {
            text: [
                Some(r.sample_id.clone()),
                r.sample_name.clone(),
                Some(r.parameter.clone()),
                Some(r.soil_type.clone()),
                r.land_use.clone(),
            ],
            numbers: [
                float_bits(Some(r.concentration_value)),
                float_bits(r.guideline_value),
                float_bits(r.exceedance_ratio),
            ],
            exceedance_type: r.exceedance_type,
        }
    }
}

/// Bit pattern with all NaNs and both zeros folded together.
fn float_bits(v: Option<f64>) -> Option<u64> {
    v.map(|x| {
        if x.is_nan() {
            f64::NAN.to_bits()
        } else if x == 0.0 {
            0
        } else {
            x.to_bits()
        }
    })
}
