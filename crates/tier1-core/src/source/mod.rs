pub mod csv_dir;
pub mod sqlite;

use crate::error::Tier1Error;
use crate::model::{GuidelineRecord, Sample, SampleResult};

pub use csv_dir::CsvDirSource;
pub use sqlite::SqliteSource;

pub const RESULTS_TABLE: &str = "results";
pub const SAMPLES_TABLE: &str = "samples";
pub const GUIDELINES_TABLE: &str = "guidelines";

pub const RESULT_COLUMNS: &[&str] = &["sample_id", "parameter", "concentration_value", "soil_type"];
pub const SAMPLE_COLUMNS: &[&str] = &["sample_id", "sample_name", "land_use"];
pub const GUIDELINE_COLUMNS: &[&str] = &["parameter", "soil_type", "land_use", "guideline_value"];

/// The three input relations of the exceedance pipeline.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub results: Vec<SampleResult>,
    pub samples: Vec<Sample>,
    pub guidelines: Vec<GuidelineRecord>,
}

/// Trait for the store holding results, samples and guidelines.
pub trait TableSource {
    /// Read all three tables. Any failure is fatal; no partial tables are
    /// returned.
    fn load(&self) -> Result<Tables, Tier1Error>;

    /// Short description of the source (for diagnostics).
    fn describe(&self) -> String;
}

/// Fail with [`Tier1Error::MissingColumn`] unless every required column is present.
pub(crate) fn require_columns(
    table: &str,
    present: &[&str],
    required: &[&str],
) -> Result<(), Tier1Error> {
    for &column in required {
        if !present.iter().any(|c| c.trim() == column) {
            return Err(Tier1Error::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
