use std::io::Cursor;

use calamine::{Reader, Xlsx};

use crate::error::Tier1Error;
use crate::extraction::{PageRange, RawTable, TableExtractor};

/// Table backend reading guideline tables from an `.xlsx` workbook.
///
/// Each worksheet holds the table of one document page. The page number is
/// taken from a trailing number in the sheet name ("Page 43", "43"); sheets
/// without one are numbered by position, starting at 1.
pub struct XlsxTableExtractor;

impl XlsxTableExtractor {
    pub fn new() -> Self {
        XlsxTableExtractor
    }
}

impl Default for XlsxTableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TableExtractor for XlsxTableExtractor {
    fn extract_tables(
        &self,
        document: &[u8],
        pages: &PageRange,
    ) -> Result<Vec<RawTable>, Tier1Error> {
        let cursor = Cursor::new(document);
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
            .map_err(|e| Tier1Error::Extraction(format!("failed to open xlsx: {e}")))?;

        let mut tables = Vec::new();
        for (idx, name) in workbook.sheet_names().into_iter().enumerate() {
            let page = page_number_from_sheet_name(&name).unwrap_or(idx + 1);
            if !pages.contains(page) {
                continue;
            }

            let range = workbook.worksheet_range(&name).map_err(|e| {
                Tier1Error::Extraction(format!("failed to read sheet '{name}': {e}"))
            })?;

            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_as_string).collect())
                .collect();

            log::debug!("sheet '{}' -> page {} ({} rows)", name, page, rows.len());
            tables.push(RawTable::new(page, rows));
        }

        tables.sort_by_key(|t| t.page);
        log::info!(
            "{}: {} table(s) within pages {}",
            self.backend_name(),
            tables.len(),
            pages
        );
        Ok(tables)
    }

    fn backend_name(&self) -> &str {
        "xlsx"
    }
}

/// Trailing number of a sheet name, e.g. "Page 43" -> 43.
fn page_number_from_sheet_name(name: &str) -> Option<usize> {
    let trimmed = name.trim_end();
    let digits_start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    trimmed[digits_start..].parse().ok()
}

/// Cell text, keeping embedded line breaks. Empty cells become "".
fn cell_as_string(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::String(s) => s.clone(),
        calamine::Data::Float(f) => f.to_string(),
        calamine::Data::Int(i) => i.to_string(),
        calamine::Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}
