use crate::error::Tier1Error;
use crate::extraction::layout::strip_thousands_separators;
use crate::extraction::{ExtractionConfig, PageRange, RawTable, TableExtractor};
use crate::parsing::parse_guideline_value;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Fine values followed by coarse values: five land uses each.
const VALUES_PER_ROW: usize = 10;
const FINE_VALUES: usize = 5;

/// Table backend reading the guideline PDF through pdftotext (from
/// poppler-utils).
///
/// `pdftotext -bbox` gives every word with its bounding box. Words are
/// regrouped into visual lines, and a line holding at least two value tokens
/// is a guideline row: the words left of its values are the parameter, the
/// words right of them the notes. A text-only line directly below a row
/// continues it; one directly above a row with no parameter text supplies
/// the parameter. Titles, column headers and footers are dropped, so every
/// table comes out with no header rows.
pub struct PdftotextTableExtractor {
    placeholders: Vec<String>,
}

impl PdftotextTableExtractor {
    pub fn new() -> Self {
        PdftotextTableExtractor {
            placeholders: ExtractionConfig::default().placeholders,
        }
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    /// Rebuild the guideline tables of a `pdftotext -bbox` dump whose first
    /// page is `first_page`. Pages without guideline rows yield no table.
    pub fn tables_from_bbox(&self, xml: &str, first_page: usize) -> Vec<RawTable> {
        parse_bbox_pages(xml, first_page)
            .into_iter()
            .filter_map(|page| {
                let rows = self.rows_from_words(page.words);
                log::debug!("page {}: {} guideline row(s)", page.number, rows.len());
                if rows.is_empty() {
                    return None;
                }
                Some(RawTable {
                    page: page.number,
                    rows,
                    header_rows: Some(0),
                })
            })
            .collect()
    }

    fn rows_from_words(&self, words: Vec<Word>) -> Vec<Vec<String>> {
        let mut rows: Vec<GuidelineRow> = Vec::new();
        let mut pending: Vec<TextLine> = Vec::new();

        for line in group_lines(words) {
            match self.split_line(&line) {
                Some(mut row) => {
                    if row.parameter.is_empty() {
                        row.take_parameter_from(&pending);
                    }
                    pending.clear();
                    rows.push(row);
                }
                None => match rows.last_mut() {
                    Some(row) if pending.is_empty() && row.continues_into(&line) => {
                        row.continue_with(line)
                    }
                    _ => pending.push(line),
                },
            }
        }

        rows.into_iter()
            .filter(|row| {
                if row.parameter.is_empty() {
                    log::debug!("values without a parameter dropped: {:?}", row.values);
                }
                !row.parameter.is_empty()
            })
            .map(GuidelineRow::into_cells)
            .collect()
    }

    /// Split a line around its run of value tokens. `None` when the line
    /// holds fewer than two values.
    fn split_line(&self, line: &TextLine) -> Option<GuidelineRow> {
        let words = &line.words;
        let first = words.iter().position(|w| self.is_value(&w.text))?;
        let mut end = first;
        while end < words.len() && end - first < VALUES_PER_ROW && self.is_value(&words[end].text) {
            end += 1;
        }
        if end - first < 2 {
            return None;
        }

        let text = |words: &[Word]| -> Vec<String> { words.iter().map(|w| w.text.clone()).collect() };
        Some(GuidelineRow {
            parameter: text(&words[..first]),
            values: text(&words[first..end]),
            notes: text(&words[end..]),
            values_left: words[first].x_min,
            values_right: words[end - 1].x_max,
            top: line.y_min,
            bottom: line.y_max,
        })
    }

    /// A number, a `min-max` range or a placeholder.
    fn is_value(&self, token: &str) -> bool {
        if self.placeholders.iter().any(|p| p == token) {
            return true;
        }
        token.starts_with(|c: char| c.is_ascii_digit() || c == '.')
            && parse_guideline_value(Some(strip_thousands_separators(token).as_str())).is_evaluable()
    }
}

impl Default for PdftotextTableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TableExtractor for PdftotextTableExtractor {
    fn extract_tables(
        &self,
        document: &[u8],
        pages: &PageRange,
    ) -> Result<Vec<RawTable>, Tier1Error> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| Tier1Error::Extraction(e.to_string()))?;
        tmpfile
            .write_all(document)
            .map_err(|e| Tier1Error::Extraction(e.to_string()))?;

        let xml = run_pdftotext(tmpfile.path(), pages)?;
        let tables = self.tables_from_bbox(&xml, pages.first);

        log::info!(
            "{}: {} table(s) within pages {}",
            self.backend_name(),
            tables.len(),
            pages
        );
        Ok(tables)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

fn run_pdftotext(pdf_path: &Path, pages: &PageRange) -> Result<String, Tier1Error> {
    let output = Command::new("pdftotext")
        .arg("-bbox")
        .arg("-f")
        .arg(pages.first.to_string())
        .arg("-l")
        .arg(pages.last.to_string())
        .arg(pdf_path)
        .arg("-")
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Tier1Error::PdftotextNotFound
            } else {
                Tier1Error::Extraction(format!("pdftotext -bbox failed: {e}"))
            }
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(Tier1Error::PdftotextFailed { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[derive(Debug, Clone, PartialEq)]
struct Word {
    text: String,
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl Word {
    fn y_center(&self) -> f32 {
        (self.y_min + self.y_max) / 2.0
    }
}

#[derive(Debug)]
struct PageWords {
    number: usize,
    words: Vec<Word>,
}

/// Collect the words of each `<page>`. `-bbox` output carries no page
/// numbers, so pages are numbered from `first_page` in document order.
fn parse_bbox_pages(xml: &str, first_page: usize) -> Vec<PageWords> {
    let mut pages: Vec<PageWords> = Vec::new();

    for raw in xml.lines() {
        let line = raw.trim();

        if line.starts_with("<page ") || line == "<page>" {
            pages.push(PageWords {
                number: first_page + pages.len(),
                words: Vec::new(),
            });
            continue;
        }

        if line.starts_with("<word ") {
            if let (Some(page), Some(word)) = (pages.last_mut(), parse_word(line)) {
                page.words.push(word);
            }
        }
    }

    pages
}

fn parse_word(tag: &str) -> Option<Word> {
    let start = tag.find('>')? + 1;
    let end = tag.rfind("</word>")?;
    let text = decode_xml_entities(tag.get(start..end)?).trim().to_string();
    if text.is_empty() {
        return None;
    }
    Some(Word {
        text,
        x_min: parse_attr_f32(tag, "xMin")?,
        y_min: parse_attr_f32(tag, "yMin")?,
        x_max: parse_attr_f32(tag, "xMax")?,
        y_max: parse_attr_f32(tag, "yMax")?,
    })
}

fn parse_attr_f32(tag: &str, name: &str) -> Option<f32> {
    let needle = format!("{name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let rest = &tag[start..];
    let end = rest.find('"')?;
    rest[..end].parse().ok()
}

fn decode_xml_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Words sharing a baseline, left to right.
#[derive(Debug)]
struct TextLine {
    y_min: f32,
    y_max: f32,
    words: Vec<Word>,
}

impl TextLine {
    fn new(word: Word) -> Self {
        TextLine {
            y_min: word.y_min,
            y_max: word.y_max,
            words: vec![word],
        }
    }

    fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// A word belongs to the line when its vertical centre lies within half
    /// a line height of the line's centre.
    fn holds(&self, word: &Word) -> bool {
        let center = (self.y_min + self.y_max) / 2.0;
        (word.y_center() - center).abs() <= self.height() / 2.0
    }

    fn push(&mut self, word: Word) {
        self.y_min = self.y_min.min(word.y_min);
        self.y_max = self.y_max.max(word.y_max);
        self.words.push(word);
    }
}

fn group_lines(mut words: Vec<Word>) -> Vec<TextLine> {
    words.sort_by(|a, b| a.y_center().total_cmp(&b.y_center()));

    let mut lines: Vec<TextLine> = Vec::new();
    for word in words {
        match lines.last_mut() {
            Some(line) if line.holds(&word) => line.push(word),
            _ => lines.push(TextLine::new(word)),
        }
    }

    for line in &mut lines {
        line.words.sort_by(|a, b| a.x_min.total_cmp(&b.x_min));
    }
    lines
}

/// One guideline row under reconstruction.
#[derive(Debug, Clone, PartialEq)]
struct GuidelineRow {
    parameter: Vec<String>,
    values: Vec<String>,
    notes: Vec<String>,
    values_left: f32,
    values_right: f32,
    top: f32,
    bottom: f32,
}

impl GuidelineRow {
    /// Lines closer than half their height belong to the same cell.
    fn continues_into(&self, line: &TextLine) -> bool {
        line.y_min - self.bottom <= line.height() / 2.0
    }

    /// Words left of the values continue the parameter, words right of them
    /// continue the notes.
    fn continue_with(&mut self, line: TextLine) {
        for word in line.words {
            if word.x_max <= self.values_left {
                self.parameter.push(word.text);
            } else if word.x_min >= self.values_right {
                self.notes.push(word.text);
            }
        }
        self.bottom = self.bottom.max(line.y_max);
    }

    /// Take the parameter from the run of `pending` lines that ends directly
    /// above this row.
    fn take_parameter_from(&mut self, pending: &[TextLine]) {
        let mut top = self.top;
        let mut above: Vec<&TextLine> = Vec::new();
        for line in pending.iter().rev() {
            if top - line.y_max > line.height() / 2.0 {
                break;
            }
            top = line.y_min;
            above.push(line);
        }

        let left = self.values_left;
        for line in above.into_iter().rev() {
            self.parameter.extend(
                line.words
                    .iter()
                    .filter(|w| w.x_max <= left)
                    .map(|w| w.text.clone()),
            );
        }
    }

    /// Split-layout cells: parameter, fine values, coarse values, notes.
    fn into_cells(self) -> Vec<String> {
        let split = self.values.len().min(FINE_VALUES);
        let (fine, coarse) = self.values.split_at(split);
        vec![
            self.parameter.join(" "),
            fine.join("\n"),
            coarse.join("\n"),
            self.notes.join(" "),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::extract_guidelines;

    /// Words of one visual line: parameter words from x=10, values from
    /// x=150 and notes from x=420, each 20 wide and 10 high.
    fn line(y: f32, parameter: &[&str], values: &[&str], notes: &[&str]) -> Vec<(String, f32, f32)> {
        let place = |words: &[&str], x0: f32| -> Vec<(String, f32, f32)> {
            words
                .iter()
                .enumerate()
                .map(|(i, w)| (w.to_string(), x0 + 25.0 * i as f32, y))
                .collect()
        };
        let mut out = place(parameter, 10.0);
        out.extend(place(values, 150.0));
        out.extend(place(notes, 420.0));
        out
    }

    fn page_xml(lines: &[Vec<(String, f32, f32)>]) -> String {
        let mut xml = String::from("  <page width=\"612.000000\" height=\"792.000000\">\n");
        for (text, x, y) in lines.iter().flatten() {
            xml.push_str(&format!(
                "    <word xMin=\"{x:.6}\" yMin=\"{y:.6}\" xMax=\"{:.6}\" yMax=\"{:.6}\">{text}</word>\n",
                x + 20.0,
                y + 10.0
            ));
        }
        xml.push_str("  </page>\n");
        xml
    }

    fn doc(pages: &[String]) -> String {
        format!("<body>\n<doc>\n{}</doc>\n</body>\n", pages.concat())
    }

    fn guideline_page() -> String {
        let fine = ["12"; 5];
        let coarse = ["17"; 5];
        let arsenic_values: Vec<&str> = fine.iter().chain(coarse.iter()).copied().collect();
        page_xml(&[
            line(20.0, &["Table", "A-1"], &[], &[]),
            line(40.0, &[], &["NA", "AG", "R/P", "C", "I"], &[]),
            line(60.0, &["Arsenic"], &arsenic_values, &["See", "note", "3"]),
            line(80.0, &["pH", "(in"], &["6.0-8.5"; 10], &[]),
            line(92.0, &["0.01M", "CaCl2)"], &[], &[]),
            line(
                110.0,
                &["Barium"],
                &["500", "500", "500", "2,000", "2,000", "500", "500", "500", "2,000", "2,000"],
                &[],
            ),
            line(200.0, &["Lead"], &[], &[]),
            line(212.0, &[], &["140", "140", "140", "260", "260"], &[]),
            line(700.0, &[], &["43"], &[]),
        ])
    }

    #[test]
    fn test_parse_bbox_pages_numbers_from_first_page() {
        let xml = doc(&[
            page_xml(&[line(20.0, &["Oil", "&amp;", "Grease"], &[], &[])]),
            page_xml(&[]),
        ]);
        let pages = parse_bbox_pages(&xml, 43);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 43);
        assert_eq!(pages[1].number, 44);
        assert_eq!(pages[0].words[1].text, "&");
        assert_eq!(pages[0].words[0].x_min, 10.0);
        assert!(pages[1].words.is_empty());
    }

    #[test]
    fn test_words_grouped_into_lines() {
        let xml = doc(&[page_xml(&[
            vec![("Zinc".to_string(), 150.0, 61.0), ("Copper".to_string(), 10.0, 60.0)],
            line(90.0, &["Nickel"], &[], &[]),
        ])]);
        let mut pages = parse_bbox_pages(&xml, 1);
        let lines = group_lines(pages.remove(0).words);
        assert_eq!(lines.len(), 2);
        let first: Vec<&str> = lines[0].words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(first, vec!["Copper", "Zinc"]);
    }

    #[test]
    fn test_value_tokens() {
        let extractor = PdftotextTableExtractor::new();
        assert!(extractor.is_value("12"));
        assert!(extractor.is_value("2,000"));
        assert!(extractor.is_value("0.046"));
        assert!(extractor.is_value("6.0-8.5"));
        assert!(extractor.is_value("-"));
        assert!(!extractor.is_value("0.01M"));
        assert!(!extractor.is_value("1,1,1-Trichloroethane"));
        assert!(!extractor.is_value("(C6-C10)"));
        assert!(!extractor.is_value("inf"));
    }

    #[test]
    fn test_rows_rebuilt_as_split_cells() {
        let tables = PdftotextTableExtractor::new().tables_from_bbox(&doc(&[guideline_page()]), 43);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].page, 43);
        assert_eq!(tables[0].header_rows, Some(0));

        let rows = &tables[0].rows;
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0],
            vec!["Arsenic", "12\n12\n12\n12\n12", "17\n17\n17\n17\n17", "See note 3"]
        );
        // Wrapped parameter text continues the row above it.
        assert_eq!(rows[1][0], "pH (in 0.01M CaCl2)");
        assert_eq!(rows[2][1], "500\n500\n500\n2,000\n2,000");
        // Parameter printed above its values.
        assert_eq!(rows[3][0], "Lead");
        assert!(rows[3][2].is_empty());
    }

    #[test]
    fn test_pages_without_rows_yield_no_table() {
        let xml = doc(&[
            page_xml(&[line(20.0, &["Contents"], &[], &[]), line(700.0, &[], &["42"], &[])]),
            guideline_page(),
        ]);
        let tables = PdftotextTableExtractor::new().tables_from_bbox(&xml, 42);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].page, 43);
    }

    #[test]
    fn test_rebuilt_tables_yield_guideline_records() {
        let tables = PdftotextTableExtractor::new().tables_from_bbox(&doc(&[guideline_page()]), 43);
        let records = extract_guidelines(&tables, &ExtractionConfig::default());
        assert_eq!(records.len(), 35);

        let arsenic: Vec<_> = records.iter().filter(|r| r.parameter() == "Arsenic").collect();
        assert_eq!(arsenic.len(), 10);
        assert!(arsenic.iter().all(|r| r.notes == "See note 3"));

        let barium = records
            .iter()
            .find(|r| r.parameter() == "Barium" && r.soil_type() == "Coarse" && r.land_use() == "Industrial")
            .unwrap();
        assert_eq!(barium.guideline_value, "2000");

        assert!(records
            .iter()
            .any(|r| r.parameter() == "pH (in 0.01M CaCl2)" && r.guideline_value == "6.0-8.5"));
    }

    #[test]
    fn test_invalid_pdf_is_pdftotext_failure() {
        if !PdftotextTableExtractor::is_available() {
            return;
        }
        let result = PdftotextTableExtractor::new().extract_tables(b"not a pdf", &PageRange::default());
        assert!(matches!(result, Err(Tier1Error::PdftotextFailed { .. })));
    }
}
