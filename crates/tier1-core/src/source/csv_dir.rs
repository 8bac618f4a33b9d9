use crate::error::Tier1Error;
use crate::join::{GuidelineMatch, JoinedRow};
use crate::model::{GuidelineRecord, Sample, SampleResult, DEFAULT_UNITS};
use crate::parsing::parse_numeric;
use crate::source::{
    require_columns, TableSource, Tables, GUIDELINES_TABLE, GUIDELINE_COLUMNS, RESULTS_TABLE,
    RESULT_COLUMNS, SAMPLES_TABLE, SAMPLE_COLUMNS,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Columns of a joined table fed to the full-table exceedance variant.
pub const JOINED_COLUMNS: &[&str] = &[
    "sample_id",
    "sample_name",
    "parameter",
    "soil_type",
    "land_use",
    "concentration_value",
    "guideline_value",
];

/// Reads `results.csv`, `samples.csv` and `guidelines.csv` from a directory.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvDirSource { dir: dir.into() }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }
}

impl TableSource for CsvDirSource {
    fn load(&self) -> Result<Tables, Tier1Error> {
        let results = read_results(open(&self.table_path(RESULTS_TABLE))?)?;
        let samples = read_samples(open(&self.table_path(SAMPLES_TABLE))?)?;
        let guidelines = read_guidelines(open(&self.table_path(GUIDELINES_TABLE))?)?;
        log::info!(
            "read {} result(s), {} sample(s), {} guideline(s) from {}",
            results.len(),
            samples.len(),
            guidelines.len(),
            self.dir.display()
        );
        Ok(Tables {
            results,
            samples,
            guidelines,
        })
    }

    fn describe(&self) -> String {
        format!("csv directory {}", self.dir.display())
    }
}

#[derive(Deserialize)]
struct ResultCsvRow {
    sample_id: String,
    parameter: String,
    soil_type: String,
    concentration_value: String,
}

#[derive(Deserialize)]
struct SampleCsvRow {
    sample_id: String,
    sample_name: Option<String>,
    land_use: Option<String>,
}

#[derive(Deserialize)]
struct GuidelineCsvRow {
    parameter: String,
    soil_type: String,
    land_use: String,
    guideline_value: Option<String>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
struct JoinedCsvRow {
    sample_id: String,
    sample_name: Option<String>,
    parameter: String,
    soil_type: String,
    land_use: Option<String>,
    concentration_value: String,
    guideline_value: Option<String>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Concentrations that are not numbers become NaN so they propagate
/// through comparisons instead of failing the load.
fn concentration(raw: &str) -> f64 {
    parse_numeric(raw).unwrap_or(f64::NAN)
}

pub fn read_results<R: Read>(reader: R) -> Result<Vec<SampleResult>, Tier1Error> {
    let rows: Vec<ResultCsvRow> = read_table(RESULTS_TABLE, reader, RESULT_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|r| {
            SampleResult::new(
                r.sample_id,
                r.parameter,
                r.soil_type,
                concentration(&r.concentration_value),
            )
        })
        .collect())
}

pub fn read_samples<R: Read>(reader: R) -> Result<Vec<Sample>, Tier1Error> {
    let rows: Vec<SampleCsvRow> = read_table(SAMPLES_TABLE, reader, SAMPLE_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|r| Sample::new(r.sample_id, r.sample_name, r.land_use))
        .collect())
}

pub fn read_guidelines<R: Read>(reader: R) -> Result<Vec<GuidelineRecord>, Tier1Error> {
    let rows: Vec<GuidelineCsvRow> = read_table(GUIDELINES_TABLE, reader, GUIDELINE_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|r| {
            GuidelineRecord::new(
                r.parameter,
                r.soil_type,
                r.land_use,
                r.guideline_value.unwrap_or_default(),
                r.units.unwrap_or_else(|| DEFAULT_UNITS.to_string()),
                r.notes.unwrap_or_default(),
            )
        })
        .collect())
}

/// Read an already-joined table. An empty `guideline_value` means no
/// guideline matched.
pub fn read_joined_rows<R: Read>(reader: R) -> Result<Vec<JoinedRow>, Tier1Error> {
    let rows: Vec<JoinedCsvRow> = read_table("joined", reader, JOINED_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|r| {
            let guideline = r.guideline_value.map(|guideline_value| GuidelineMatch {
                guideline_value,
                units: r.units.unwrap_or_else(|| DEFAULT_UNITS.to_string()),
                notes: r.notes.unwrap_or_default(),
            });
            JoinedRow::new(
                r.sample_id,
                r.sample_name,
                r.parameter,
                r.soil_type,
                r.land_use,
                concentration(&r.concentration_value),
                guideline,
            )
        })
        .collect())
}

pub fn read_joined_csv(path: &Path) -> Result<Vec<JoinedRow>, Tier1Error> {
    read_joined_rows(open(path)?)
}

fn open(path: &Path) -> Result<std::fs::File, Tier1Error> {
    std::fs::File::open(path).map_err(|e| {
        Tier1Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}

fn read_table<T, R>(table: &str, reader: R, required: &[&str]) -> Result<Vec<T>, Tier1Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let present: Vec<&str> = headers.iter().collect();
    require_columns(table, &present, required)?;

    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    log::debug!("{table}: {} row(s)", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_results_keeps_bad_concentration_as_nan() {
        let csv = "sample_id,parameter,concentration_value,soil_type,lab\n\
                   1,Arsenic,8.5,Fine,ALS\n\
                   2,Lead,<0.5,Coarse,ALS\n";
        let results = read_results(csv.as_bytes()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].concentration_value, 8.5);
        assert!(results[1].concentration_value.is_nan());
        assert_eq!(results[1].soil_key().as_str(), "coarse");
    }

    #[test]
    fn test_read_samples_empty_cells_are_none() {
        let csv = "sample_id,sample_name,land_use\n1,BH-01,Industrial\n2,,\n";
        let samples = read_samples(csv.as_bytes()).unwrap();
        assert_eq!(samples[0].land_use(), Some("Industrial"));
        assert!(samples[1].sample_name.is_none());
        assert!(samples[1].land_use_key().is_none());
    }

    #[test]
    fn test_read_guidelines_optional_columns() {
        let csv = "parameter,soil_type,land_use,guideline_value\nArsenic,Fine,Industrial,12\n";
        let guidelines = read_guidelines(csv.as_bytes()).unwrap();
        assert_eq!(guidelines[0].units, "mg/kg");
        assert_eq!(guidelines[0].notes, "");
        assert_eq!(guidelines[0].key(), &crate::model::MatchKey::new("arsenic", "fine", "industrial"));
    }

    #[test]
    fn test_missing_column_reported() {
        let csv = "sample_id,parameter,soil_type\n1,Arsenic,Fine\n";
        let err = read_results(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Tier1Error::MissingColumn { ref table, ref column }
                if table == "results" && column == "concentration_value"
        ));
    }

    #[test]
    fn test_read_joined_rows() {
        let csv = "sample_id,sample_name,parameter,soil_type,land_use,concentration_value,guideline_value\n\
                   1,BH-01,Arsenic,Fine,Industrial,20,12\n\
                   2,,Boron,Fine,,1,\n";
        let rows = read_joined_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].guideline_value(), Some("12"));
        assert!(rows[1].guideline.is_none());
        assert!(rows[1].land_use.is_none());
    }

    #[test]
    fn test_csv_dir_source_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("results.csv"),
            "sample_id,parameter,concentration_value,soil_type\n1,Arsenic,20,Fine\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("samples.csv"),
            "sample_id,sample_name,land_use\n1,BH-01,Industrial\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("guidelines.csv"),
            "parameter,soil_type,land_use,guideline_value,units,notes\nArsenic,Fine,Industrial,12,mg/kg,\n",
        )
        .unwrap();

        let tables = CsvDirSource::new(dir.path()).load().unwrap();
        assert_eq!(tables.results.len(), 1);
        assert_eq!(tables.samples.len(), 1);
        assert_eq!(tables.guidelines.len(), 1);
    }

    #[test]
    fn test_csv_dir_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvDirSource::new(dir.path()).load();
        assert!(matches!(result, Err(Tier1Error::Io(_))));
    }
}
