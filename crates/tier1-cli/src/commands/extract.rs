use std::path::{Path, PathBuf};
use tier1_core::error::Tier1Error;
use tier1_core::extraction::json_tables::JsonTableExtractor;
use tier1_core::extraction::pdftotext_tables::PdftotextTableExtractor;
use tier1_core::extraction::xlsx_tables::XlsxTableExtractor;
use tier1_core::extraction::{ExtractionConfig, PageRange, TableExtractor};
use tier1_core::output::{write_file, write_guidelines};

pub fn run(
    document: PathBuf,
    pages: PageRange,
    format: Option<&str>,
    header_rows: usize,
    out: Option<PathBuf>,
) -> Result<(), Tier1Error> {
    let extractor = extractor_for(&document, format)?;
    let config = ExtractionConfig {
        pages,
        header_rows,
        ..Default::default()
    };

    let bytes = std::fs::read(&document)?;
    let records = tier1_core::extract_guideline_document(&bytes, extractor.as_ref(), &config)?;
    let csv = write_guidelines(Vec::new(), &records)?;

    match out {
        Some(path) => {
            write_file(&path, &csv)?;
            eprintln!(
                "Saved {} guideline record(s) to {}",
                records.len(),
                path.display()
            );
        }
        None => print!("{}", String::from_utf8_lossy(&csv)),
    }
    Ok(())
}

fn extractor_for(
    document: &Path,
    format: Option<&str>,
) -> Result<Box<dyn TableExtractor>, Tier1Error> {
    let format = match format {
        Some(f) => f.to_ascii_lowercase(),
        None => document
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default(),
    };

    match format.as_str() {
        "pdf" => Ok(Box::new(PdftotextTableExtractor::new())),
        "json" => Ok(Box::new(JsonTableExtractor::new())),
        "xlsx" => Ok(Box::new(XlsxTableExtractor::new())),
        other => Err(Tier1Error::UnsupportedDocument(format!(
            "unknown table format '{other}' for {} (expected pdf, json or xlsx)",
            document.display()
        ))),
    }
}
