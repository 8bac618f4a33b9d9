//! CSV rendering for every table the pipelines produce.
//!
//! Writers render into memory; [`write_file`] and
//! [`ExceedanceSummary::write_all`] touch the filesystem only once every
//! table has rendered.

use crate::classify::{ExceedanceRow, RatedExceedance};
use crate::error::Tier1Error;
use crate::model::GuidelineRecord;
use crate::report::{ExceedanceSummary, GroupCount, GroupKey, PivotTable};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the exceedances-only table in a report directory.
pub const EXCEEDANCES_FILE: &str = "exceedances_raw.csv";
/// File name of the parameter by soil type pivot in a report directory.
pub const PIVOT_FILE: &str = "pivot_parameter_vs_soil.csv";

/// Format a float the way the CSV outputs show it: shortest round-trip
/// text, `NaN`/`inf`/`-inf` for non-finite values.
fn float(v: f64) -> String {
    v.to_string()
}

fn opt_str(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}

fn opt_float(v: Option<f64>) -> String {
    v.map(float).unwrap_or_default()
}

fn finish<W: Write>(wtr: csv::Writer<W>) -> Result<W, Tier1Error> {
    wtr.into_inner()
        .map_err(|e| Tier1Error::Io(std::io::Error::new(e.error().kind(), e.to_string())))
}

pub fn write_guidelines<W: Write>(out: W, records: &[GuidelineRecord]) -> Result<W, Tier1Error> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "parameter",
        "soil_type",
        "land_use",
        "guideline_value",
        "units",
        "notes",
    ])?;
    for r in records {
        wtr.write_record([
            r.parameter(),
            r.soil_type(),
            r.land_use(),
            r.guideline_value.as_str(),
            r.units.as_str(),
            r.notes.as_str(),
        ])?;
    }
    finish(wtr)
}

pub fn write_exceedances<W: Write>(out: W, rows: &[ExceedanceRow]) -> Result<W, Tier1Error> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "sample_id",
        "sample_name",
        "parameter",
        "soil_type",
        "land_use",
        "concentration_value",
        "guideline_value",
        "exceeds",
    ])?;
    for r in rows {
        wtr.write_record([
            r.sample_id.as_str(),
            opt_str(&r.sample_name),
            r.parameter.as_str(),
            r.soil_type.as_str(),
            opt_str(&r.land_use),
            float(r.concentration_value).as_str(),
            r.guideline_value.as_str(),
            if r.exceeds { "True" } else { "False" },
        ])?;
    }
    finish(wtr)
}

pub fn write_rated_table<W: Write>(out: W, rows: &[RatedExceedance]) -> Result<W, Tier1Error> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "sample_id",
        "sample_name",
        "parameter",
        "soil_type",
        "land_use",
        "concentration_value",
        "guideline_value",
        "exceedance_ratio",
        "exceedance_type",
    ])?;
    for r in rows {
        wtr.write_record([
            r.sample_id.as_str(),
            opt_str(&r.sample_name),
            r.parameter.as_str(),
            r.soil_type.as_str(),
            opt_str(&r.land_use),
            float(r.concentration_value).as_str(),
            opt_float(r.guideline_value).as_str(),
            opt_float(r.exceedance_ratio).as_str(),
            r.exceedance_type.to_string().as_str(),
        ])?;
    }
    finish(wtr)
}

/// Write `<key_header>,fail_count` rows.
pub fn write_group_counts<W: Write>(
    out: W,
    key_header: &str,
    counts: &[GroupCount],
) -> Result<W, Tier1Error> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([key_header, "fail_count"])?;
    for c in counts {
        wtr.write_record([c.key.as_str(), c.fail_count.to_string().as_str()])?;
    }
    finish(wtr)
}

/// Write the pivot with `parameter` as the first column and one column
/// per soil type.
pub fn write_pivot<W: Write>(out: W, pivot: &PivotTable) -> Result<W, Tier1Error> {
    let mut wtr = csv::Writer::from_writer(out);
    let mut header = vec!["parameter".to_string()];
    header.extend(pivot.columns.iter().cloned());
    wtr.write_record(&header)?;
    for row in &pivot.rows {
        let mut record = vec![row.parameter.clone()];
        record.extend(row.counts.iter().map(usize::to_string));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

/// Write rendered bytes to `path`.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), Tier1Error> {
    std::fs::write(path, bytes).map_err(|e| {
        Tier1Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}

impl ExceedanceSummary {
    /// Render every report table.
    pub fn render(&self) -> Result<Vec<(&'static str, Vec<u8>)>, Tier1Error> {
        let mut files = vec![(EXCEEDANCES_FILE, write_exceedances(Vec::new(), &self.exceedances)?)];
        for key in GroupKey::ALL {
            files.push((
                key.file_name(),
                write_group_counts(Vec::new(), key.column_name(), self.counts(key))?,
            ));
        }
        files.push((PIVOT_FILE, write_pivot(Vec::new(), &self.pivot)?));
        Ok(files)
    }

    /// Write the six report files into `dir`, creating it if needed.
    /// Returns the paths written.
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>, Tier1Error> {
        let files = self.render()?;
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(files.len());
        for (name, bytes) in files {
            let path = dir.join(name);
            write_file(&path, &bytes)?;
            written.push(path);
        }
        log::info!("wrote {} report file(s) to {}", written.len(), dir.display());
        Ok(written)
    }
}
