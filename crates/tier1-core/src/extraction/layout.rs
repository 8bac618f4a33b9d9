use crate::extraction::ExtractionConfig;

/// Number of value columns per soil type in a guideline row.
const VALUES_PER_SOIL: usize = 5;

/// How a guideline row's cells were laid out by the table renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// Everything crammed into the first cell, one token per line.
    Packed,
    /// Parameter, fine values, coarse values and notes in their own cells.
    Split,
}

/// A guideline row split into its logical parts (text not yet collapsed).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub layout: RowLayout,
    pub parameter: String,
    pub fine: Vec<String>,
    pub coarse: Vec<String>,
    pub notes: String,
}

/// Detect the row layout: packed when columns 2-4 are all empty.
///
/// Missing trailing cells count as empty.
pub fn detect_layout(cells: &[String]) -> RowLayout {
    let secondary_empty = (1..4).all(|i| cell(cells, i).trim().is_empty());
    if secondary_empty {
        RowLayout::Packed
    } else {
        RowLayout::Split
    }
}

/// Parse one data row of a guideline table.
pub fn parse_row(cells: &[String], config: &ExtractionConfig) -> ParsedRow {
    match detect_layout(cells) {
        RowLayout::Packed => parse_packed(cells, config),
        RowLayout::Split => parse_split(cells, config),
    }
}

fn parse_packed(cells: &[String], config: &ExtractionConfig) -> ParsedRow {
    let tokens: Vec<String> = cell(cells, 0)
        .split('\n')
        .map(str::trim)
        .filter(|t| !t.is_empty() && !config.is_placeholder(t))
        .map(str::to_string)
        .collect();

    if tokens.len() < 1 + VALUES_PER_SOIL {
        log::warn!(
            "packed guideline row has {} token(s), fine values incomplete: {:?}",
            tokens.len(),
            tokens
        );
    }

    let fine_end = 1 + VALUES_PER_SOIL;
    let coarse_end = fine_end + VALUES_PER_SOIL;

    ParsedRow {
        layout: RowLayout::Packed,
        parameter: tokens.first().cloned().unwrap_or_default(),
        fine: slice(&tokens, 1, fine_end),
        coarse: slice(&tokens, fine_end, coarse_end),
        notes: tokens.get(coarse_end).cloned().unwrap_or_default(),
    }
}

fn parse_split(cells: &[String], config: &ExtractionConfig) -> ParsedRow {
    ParsedRow {
        layout: RowLayout::Split,
        parameter: cell(cells, 0).trim().to_string(),
        fine: split_vertical(cell(cells, 1), config),
        coarse: split_vertical(cell(cells, 2), config),
        notes: cell(cells, 3).trim().to_string(),
    }
}

/// Split a multi-line value cell into its values.
///
/// Thousands separators between digits are removed first ("2,000" -> "2000"),
/// then the cell is split on line breaks with blanks and placeholders dropped.
pub fn split_vertical(cell: &str, config: &ExtractionConfig) -> Vec<String> {
    strip_thousands_separators(cell)
        .split('\n')
        .map(str::trim)
        .filter(|v| !v.is_empty() && !config.is_placeholder(v))
        .map(str::to_string)
        .collect()
}

/// Remove commas that sit between two digits.
pub(crate) fn strip_thousands_separators(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ','
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
        {
            continue;
        }
        out.push(c);
    }
    out
}

fn cell(cells: &[String], idx: usize) -> &str {
    cells.get(idx).map(String::as_str).unwrap_or("")
}

/// Positional slice that tolerates short token lists.
fn slice(tokens: &[String], start: usize, end: usize) -> Vec<String> {
    let end = end.min(tokens.len());
    if start >= end {
        return Vec::new();
    }
    tokens[start..end].to_vec()
}
