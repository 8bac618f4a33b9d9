use std::path::PathBuf;
use tier1_core::error::Tier1Error;
use tier1_core::output::{write_file, write_rated_table};
use tier1_core::rules::{self, RuleTable};
use tier1_core::source::{CsvDirSource, SqliteSource, TableSource};

use crate::output;

pub fn run(
    db: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
    rule_file: Option<PathBuf>,
    out_dir: PathBuf,
    full_table: Option<PathBuf>,
    output_format: &str,
) -> Result<(), Tier1Error> {
    let rule_table = match rule_file {
        Some(path) => RuleTable::from_ruleset(&rules::load_ruleset(&path)?),
        None => RuleTable::tier1()?,
    };

    let source: Box<dyn TableSource> = match (db, csv_dir) {
        (Some(db), _) => Box::new(SqliteSource::new(db)),
        (None, Some(dir)) => Box::new(CsvDirSource::new(dir)),
        (None, None) => {
            return Err(Tier1Error::ParseError(
                "one of --db or --csv-dir is required".into(),
            ))
        }
    };

    log::info!("loading tables from {}", source.describe());
    let tables = source.load()?;
    let summary = tier1_core::exceedance_summary(&tables, &rule_table);

    // Rendered before any report file is written.
    let rated = match &full_table {
        Some(_) => Some(write_rated_table(
            Vec::new(),
            &tier1_core::run_exceedance_table(&tables),
        )?),
        None => None,
    };

    let written = summary.write_all(&out_dir)?;
    if let (Some(path), Some(bytes)) = (&full_table, &rated) {
        write_file(path, bytes)?;
        eprintln!("Saved full exceedance table to {}", path.display());
    }

    match output_format {
        "json" => output::json::print(&summary)?,
        _ => output::table::print(&summary),
    }

    eprintln!(
        "Saved {} exceedance(s) and {} summary file(s) to {}",
        summary.exceedances.len(),
        written.len(),
        out_dir.display()
    );
    Ok(())
}
