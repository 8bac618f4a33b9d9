pub mod json_tables;
pub mod layout;
pub mod pdftotext_tables;
pub mod xlsx_tables;

use crate::error::Tier1Error;
use crate::model::{GuidelineRecord, LandUse, SoilType, DEFAULT_UNITS, LAND_USE_ORDER};
use crate::parsing::collapse_whitespace;
use layout::parse_row;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A lattice table lifted from one page of the guideline document.
///
/// Rows keep the cell text exactly as the table renderer produced it,
/// including embedded line breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    #[serde(alias = "page_number")]
    pub page: usize,
    pub rows: Vec<Vec<String>>,
    /// Leading header rows of this table. `None` defers to
    /// [`ExtractionConfig::header_rows`]; backends that emit data rows only
    /// set `Some(0)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_rows: Option<usize>,
}

impl RawTable {
    pub fn new(page: usize, rows: Vec<Vec<String>>) -> Self {
        RawTable {
            page,
            rows,
            header_rows: None,
        }
    }
}

/// Inclusive, 1-based page range (e.g. "43-48").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: usize,
    pub last: usize,
}

impl PageRange {
    pub fn new(first: usize, last: usize) -> Result<Self, Tier1Error> {
        if first == 0 || last < first {
            return Err(Tier1Error::InvalidPageRange(format!("{first}-{last}")));
        }
        Ok(PageRange { first, last })
    }

    pub fn contains(&self, page: usize) -> bool {
        page >= self.first && page <= self.last
    }
}

impl Default for PageRange {
    /// Pages holding the Tier 1 soil guideline tables.
    fn default() -> Self {
        PageRange { first: 43, last: 48 }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

impl FromStr for PageRange {
    type Err = Tier1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Tier1Error::InvalidPageRange(s.to_string());
        let s = s.trim();
        let (first, last) = match s.split_once('-') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (s, s),
        };
        let first: usize = first.parse().map_err(|_| invalid())?;
        let last: usize = last.parse().map_err(|_| invalid())?;
        PageRange::new(first, last).map_err(|_| invalid())
    }
}

/// Document constants for guideline extraction.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub pages: PageRange,
    /// Leading rows of every table that are header boilerplate.
    pub header_rows: usize,
    pub units: String,
    /// Land-use categories in the column order of the value cells.
    pub land_uses: Vec<LandUse>,
    /// Cell tokens that stand for "no value".
    pub placeholders: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            pages: PageRange::default(),
            header_rows: 3,
            units: DEFAULT_UNITS.to_string(),
            land_uses: LAND_USE_ORDER.to_vec(),
            placeholders: vec!["-".into(), ".".into(), "\u{2014}".into()],
        }
    }
}

impl ExtractionConfig {
    pub fn is_placeholder(&self, token: &str) -> bool {
        self.placeholders.iter().any(|p| p == token)
    }
}

/// Trait for table extraction backends.
pub trait TableExtractor: Send + Sync {
    /// Extract the lattice tables of the pages in `pages`, in page order.
    fn extract_tables(
        &self,
        document: &[u8],
        pages: &PageRange,
    ) -> Result<Vec<RawTable>, Tier1Error>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Turn raw guideline tables into normalized guideline records.
///
/// The first `header_rows` rows of every table are dropped. Each data row
/// yields one record per fine value and one per coarse value, paired with
/// land uses in column order. Notes belong to their own row only.
pub fn extract_guidelines(tables: &[RawTable], config: &ExtractionConfig) -> Vec<GuidelineRecord> {
    let mut records = Vec::new();

    for table in tables {
        let before = records.len();
        let header_rows = table.header_rows.unwrap_or(config.header_rows);
        for (row_idx, cells) in table.rows.iter().enumerate().skip(header_rows) {
            let row = parse_row(cells, config);
            log::debug!(
                "page {} row {}: {:?} layout, parameter '{}', {} fine, {} coarse",
                table.page,
                row_idx,
                row.layout,
                row.parameter,
                row.fine.len(),
                row.coarse.len()
            );

            for (soil_type, values) in [(SoilType::Fine, &row.fine), (SoilType::Coarse, &row.coarse)] {
                if values.len() > config.land_uses.len() {
                    log::warn!(
                        "page {} row {}: '{}' has {} {} values for {} land uses, extra values dropped",
                        table.page,
                        row_idx,
                        row.parameter,
                        values.len(),
                        soil_type,
                        config.land_uses.len()
                    );
                }
                for (value, land_use) in values.iter().zip(config.land_uses.iter()) {
                    if value.is_empty() {
                        continue;
                    }
                    records.push(GuidelineRecord::new(
                        collapse_whitespace(&row.parameter),
                        collapse_whitespace(&soil_type.to_string()),
                        collapse_whitespace(land_use.label()),
                        collapse_whitespace(value),
                        collapse_whitespace(&config.units),
                        collapse_whitespace(&row.notes),
                    ));
                }
            }
        }
        log::info!(
            "page {}: {} guideline records",
            table.page,
            records.len() - before
        );
    }

    records
}
