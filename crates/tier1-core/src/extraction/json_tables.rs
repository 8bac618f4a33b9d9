use crate::error::Tier1Error;
use crate::extraction::{PageRange, RawTable, TableExtractor};

/// Table backend reading a JSON dump of lattice tables.
///
/// Expected shape: an array of `{ "page": 43, "rows": [["cell", ...], ...] }`
/// objects, one per table, as written by a lattice table extractor run over
/// the guideline PDF.
pub struct JsonTableExtractor;

impl JsonTableExtractor {
    pub fn new() -> Self {
        JsonTableExtractor
    }
}

impl Default for JsonTableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TableExtractor for JsonTableExtractor {
    fn extract_tables(
        &self,
        document: &[u8],
        pages: &PageRange,
    ) -> Result<Vec<RawTable>, Tier1Error> {
        let mut tables: Vec<RawTable> = serde_json::from_slice(document)
            .map_err(|e| Tier1Error::Extraction(format!("invalid table dump: {e}")))?;

        let total = tables.len();
        tables.retain(|t| pages.contains(t.page));
        // Stable sort keeps multiple tables of one page in document order.
        tables.sort_by_key(|t| t.page);

        log::info!(
            "{}: {} of {} table(s) within pages {}",
            self.backend_name(),
            tables.len(),
            total,
            pages
        );
        Ok(tables)
    }

    fn backend_name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"[
        {"page": 48, "rows": [["h"], ["Zinc", "200", "", ""]]},
        {"page": 12, "rows": [["outside"]]},
        {"page": 43, "rows": [["h"], ["Arsenic", "12", "17", ""]]}
    ]"#;

    #[test]
    fn test_filters_and_orders_pages() {
        let tables = JsonTableExtractor::new()
            .extract_tables(DUMP.as_bytes(), &PageRange::default())
            .unwrap();
        let pages: Vec<usize> = tables.iter().map(|t| t.page).collect();
        assert_eq!(pages, vec![43, 48]);
        assert_eq!(tables[0].rows[1][0], "Arsenic");
    }

    #[test]
    fn test_page_number_alias() {
        let dump = r#"[{"page_number": 43, "rows": []}]"#;
        let tables = JsonTableExtractor::new()
            .extract_tables(dump.as_bytes(), &PageRange::default())
            .unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].header_rows, None);
    }

    #[test]
    fn test_per_table_header_rows() {
        let dump = r#"[{"page": 43, "header_rows": 0, "rows": [["Zinc", "200", "", ""]]}]"#;
        let tables = JsonTableExtractor::new()
            .extract_tables(dump.as_bytes(), &PageRange::default())
            .unwrap();
        assert_eq!(tables[0].header_rows, Some(0));
    }

    #[test]
    fn test_invalid_json_is_extraction_error() {
        let result = JsonTableExtractor::new().extract_tables(b"not json", &PageRange::default());
        assert!(matches!(result, Err(Tier1Error::Extraction(_))));
    }
}
