pub mod classify;
pub mod error;
pub mod extraction;
pub mod join;
pub mod model;
pub mod output;
pub mod parsing;
pub mod report;
pub mod rules;
pub mod source;

use classify::RatedExceedance;
use error::Tier1Error;
use extraction::{ExtractionConfig, TableExtractor};
use model::GuidelineRecord;
use report::ExceedanceSummary;
use rules::RuleTable;
use source::{TableSource, Tables};

/// Extract the Tier 1 guideline records from a guideline document.
///
/// Fails with [`Tier1Error::UnsupportedDocument`] when the document has no
/// tables in the configured pages, or none of its rows yield a record.
pub fn extract_guideline_document(
    document: &[u8],
    extractor: &dyn TableExtractor,
    config: &ExtractionConfig,
) -> Result<Vec<GuidelineRecord>, Tier1Error> {
    let tables = extractor.extract_tables(document, &config.pages)?;
    if tables.is_empty() {
        return Err(Tier1Error::UnsupportedDocument(format!(
            "no tables found on pages {} ({} backend)",
            config.pages,
            extractor.backend_name()
        )));
    }

    let records = extraction::extract_guidelines(&tables, config);
    if records.is_empty() {
        return Err(Tier1Error::UnsupportedDocument(format!(
            "{} table(s) on pages {} held no guideline rows",
            tables.len(),
            config.pages
        )));
    }

    log::info!(
        "extracted {} guideline record(s) from {} table(s)",
        records.len(),
        tables.len()
    );
    Ok(records)
}

/// Exceedances-only pipeline: load, join, keep exceeding rows, aggregate.
pub fn run_exceedance_report(
    source: &dyn TableSource,
    rules: &RuleTable,
) -> Result<ExceedanceSummary, Tier1Error> {
    log::info!("loading tables from {}", source.describe());
    let tables = source.load()?;
    Ok(exceedance_summary(&tables, rules))
}

/// Exceedances-only pipeline over tables already in memory.
pub fn exceedance_summary(tables: &Tables, rules: &RuleTable) -> ExceedanceSummary {
    let joined = join::join_all(&tables.results, &tables.samples, &tables.guidelines);
    let exceedances = classify::calculate_exceedances(&joined, rules);
    ExceedanceSummary::from_exceedances(exceedances)
}

/// Full-table pipeline: join and rate every row against a single numeric
/// guideline.
pub fn run_exceedance_table(tables: &Tables) -> Vec<RatedExceedance> {
    let joined = join::join_all(&tables.results, &tables.samples, &tables.guidelines);
    classify::generate_exceedance_table(&joined)
}
