use crate::classify::ExceedanceRow;
use crate::model::NormKey;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Column an exceedance count is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Parameter,
    SampleName,
    SoilType,
    LandUse,
}

impl GroupKey {
    pub const ALL: [GroupKey; 4] = [
        GroupKey::Parameter,
        GroupKey::SampleName,
        GroupKey::SoilType,
        GroupKey::LandUse,
    ];

    /// Header of the key column in the count CSV.
    pub fn column_name(&self) -> &'static str {
        match self {
            GroupKey::Parameter => "parameter",
            GroupKey::SampleName => "sample_name",
            GroupKey::SoilType => "soil_type",
            GroupKey::LandUse => "land_use",
        }
    }

    /// File the count table is written to.
    pub fn file_name(&self) -> &'static str {
        match self {
            GroupKey::Parameter => "fails_per_parameter.csv",
            GroupKey::SampleName => "fails_per_sample.csv",
            GroupKey::SoilType => "fails_per_soil.csv",
            GroupKey::LandUse => "fails_per_landuse.csv",
        }
    }

    /// Group value of `row`. Parameter, soil type and land use are the
    /// normalized keys the join matched on; sample names are kept verbatim.
    fn value(&self, row: &ExceedanceRow) -> Option<String> {
        match self {
            GroupKey::Parameter => Some(NormKey::new(&row.parameter).to_string()),
            GroupKey::SampleName => row.sample_name.clone(),
            GroupKey::SoilType => Some(NormKey::new(&row.soil_type).to_string()),
            GroupKey::LandUse => row.land_use.as_deref().map(|l| NormKey::new(l).to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub fail_count: usize,
}

/// Count exceedance rows per distinct key value, sorted by key.
///
/// Rows without a value for the key (e.g. no sample name) are not counted.
/// `"Arsenic"` and `" ARSENIC"` fall in the same `arsenic` group.
pub fn count_by(rows: &[ExceedanceRow], key: GroupKey) -> Vec<GroupCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        if let Some(value) = key.value(row) {
            *counts.entry(value).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(key, fail_count)| GroupCount { key, fail_count })
        .collect()
}

/// Exceedance counts with parameters as rows and soil types as columns.
///
/// Row and column labels are normalized keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    /// Distinct normalized soil types, sorted.
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub parameter: String,
    /// One count per entry of [`PivotTable::columns`]; zero where no row matched.
    pub counts: Vec<usize>,
}

impl PivotTable {
    /// Count for a parameter and soil type, looked up by normalized key.
    pub fn get(&self, parameter: &str, soil_type: &str) -> Option<usize> {
        let soil_type = NormKey::new(soil_type);
        let parameter = NormKey::new(parameter);
        let col = self.columns.iter().position(|c| c == soil_type.as_str())?;
        self.rows
            .iter()
            .find(|r| r.parameter == parameter.as_str())
            .map(|r| r.counts[col])
    }
}

/// Cross-tabulate exceedances by normalized parameter and soil type.
pub fn pivot_parameter_by_soil(rows: &[ExceedanceRow]) -> PivotTable {
    let keyed: Vec<(NormKey, NormKey)> = rows
        .iter()
        .map(|r| (NormKey::new(&r.parameter), NormKey::new(&r.soil_type)))
        .collect();

    let columns: BTreeSet<&NormKey> = keyed.iter().map(|(_, soil)| soil).collect();
    let columns: Vec<String> = columns.into_iter().map(NormKey::to_string).collect();

    let mut cells: BTreeMap<&NormKey, Vec<usize>> = BTreeMap::new();
    for (parameter, soil) in &keyed {
        // Every soil key of `keyed` is in `columns`.
        let col = columns
            .iter()
            .position(|c| c == soil.as_str())
            .unwrap_or_default();
        cells
            .entry(parameter)
            .or_insert_with(|| vec![0; columns.len()])[col] += 1;
    }

    PivotTable {
        rows: cells
            .into_iter()
            .map(|(parameter, counts)| PivotRow {
                parameter: parameter.to_string(),
                counts,
            })
            .collect(),
        columns,
    }
}

/// Everything the exceedance report writes.
#[derive(Debug, Clone, Serialize)]
pub struct ExceedanceSummary {
    pub exceedances: Vec<ExceedanceRow>,
    pub per_parameter: Vec<GroupCount>,
    pub per_sample: Vec<GroupCount>,
    pub per_soil_type: Vec<GroupCount>,
    pub per_land_use: Vec<GroupCount>,
    pub pivot: PivotTable,
}

impl ExceedanceSummary {
    pub fn from_exceedances(exceedances: Vec<ExceedanceRow>) -> Self {
        ExceedanceSummary {
            per_parameter: count_by(&exceedances, GroupKey::Parameter),
            per_sample: count_by(&exceedances, GroupKey::SampleName),
            per_soil_type: count_by(&exceedances, GroupKey::SoilType),
            per_land_use: count_by(&exceedances, GroupKey::LandUse),
            pivot: pivot_parameter_by_soil(&exceedances),
            exceedances,
        }
    }

    pub fn counts(&self, key: GroupKey) -> &[GroupCount] {
        match key {
            GroupKey::Parameter => &self.per_parameter,
            GroupKey::SampleName => &self.per_sample,
            GroupKey::SoilType => &self.per_soil_type,
            GroupKey::LandUse => &self.per_land_use,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exceedance(sample: Option<&str>, param: &str, soil: &str, land_use: &str) -> ExceedanceRow {
        ExceedanceRow {
            sample_id: "1".into(),
            sample_name: sample.map(str::to_string),
            parameter: param.into(),
            soil_type: soil.into(),
            land_use: Some(land_use.into()),
            concentration_value: 100.0,
            guideline_value: "12".into(),
            exceeds: true,
        }
    }

    fn fixture() -> Vec<ExceedanceRow> {
        vec![
            exceedance(Some("BH-02"), "Lead", "Fine", "Industrial"),
            exceedance(Some("BH-01"), "Arsenic", "Coarse", "Agricultural"),
            exceedance(Some("BH-01"), "Arsenic", "Fine", "Agricultural"),
            exceedance(None, "Arsenic", "Fine", "Industrial"),
        ]
    }

    #[test]
    fn test_count_by_parameter_sorted() {
        let counts = count_by(&fixture(), GroupKey::Parameter);
        assert_eq!(
            counts,
            vec![
                GroupCount { key: "arsenic".into(), fail_count: 3 },
                GroupCount { key: "lead".into(), fail_count: 1 },
            ]
        );
    }

    #[test]
    fn test_count_by_is_order_independent() {
        let mut reversed = fixture();
        reversed.reverse();
        assert_eq!(
            count_by(&fixture(), GroupKey::Parameter),
            count_by(&reversed, GroupKey::Parameter)
        );
    }

    #[test]
    fn test_count_by_skips_missing_keys() {
        let counts = count_by(&fixture(), GroupKey::SampleName);
        let total: usize = counts.iter().map(|c| c.fail_count).sum();
        assert_eq!(total, 3);
        assert_eq!(counts[0].key, "BH-01");
        assert_eq!(counts[0].fail_count, 2);
    }

    #[test]
    fn test_pivot_zero_filled() {
        let pivot = pivot_parameter_by_soil(&fixture());
        assert_eq!(pivot.columns, vec!["coarse", "fine"]);
        assert_eq!(pivot.get("Arsenic", "Coarse"), Some(1));
        assert_eq!(pivot.get("Arsenic", "Fine"), Some(2));
        assert_eq!(pivot.get("Lead", "Coarse"), Some(0));
        assert_eq!(pivot.get("Lead", "Fine"), Some(1));
        assert_eq!(pivot.get("Zinc", "Fine"), None);
    }

    #[test]
    fn test_empty_pivot() {
        let pivot = pivot_parameter_by_soil(&[]);
        assert!(pivot.columns.is_empty());
        assert!(pivot.rows.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let summary = ExceedanceSummary::from_exceedances(fixture());
        assert_eq!(summary.exceedances.len(), 4);
        assert_eq!(summary.counts(GroupKey::SoilType).len(), 2);
        assert_eq!(summary.counts(GroupKey::LandUse)[0].key, "agricultural");
    }

    #[test]
    fn test_mixed_case_labels_share_one_group() {
        let rows = vec![
            exceedance(Some("BH-01"), "pH (in 0.01M CaCl2)", "Fine", "Natural Area"),
            exceedance(Some("bh-01"), "PH (IN 0.01M CACL2)", "fine ", " NATURAL AREA"),
            exceedance(Some("BH-01"), "Arsenic", "FINE", "Natural Area"),
        ];

        let per_parameter = count_by(&rows, GroupKey::Parameter);
        assert_eq!(
            per_parameter,
            vec![
                GroupCount { key: "arsenic".into(), fail_count: 1 },
                GroupCount { key: "ph (in 0.01m cacl2)".into(), fail_count: 2 },
            ]
        );
        assert_eq!(
            count_by(&rows, GroupKey::SoilType),
            vec![GroupCount { key: "fine".into(), fail_count: 3 }]
        );
        assert_eq!(
            count_by(&rows, GroupKey::LandUse),
            vec![GroupCount { key: "natural area".into(), fail_count: 3 }]
        );
        // Sample names are not match keys and stay verbatim.
        assert_eq!(count_by(&rows, GroupKey::SampleName).len(), 2);

        let pivot = pivot_parameter_by_soil(&rows);
        assert_eq!(pivot.columns, vec!["fine"]);
        assert_eq!(pivot.rows.len(), 2);
        assert_eq!(pivot.rows[1].parameter, "ph (in 0.01m cacl2)");
        assert_eq!(pivot.rows[1].counts, vec![2]);
        assert_eq!(pivot.get("pH (in 0.01M CaCl2)", "Fine"), Some(2));
    }
}
