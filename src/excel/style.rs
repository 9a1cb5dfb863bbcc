//! Worksheet sizing and table naming rules.

use std::collections::BTreeSet;

const COLUMN_PADDING: usize = 1;
const DEFAULT_COLUMN_WIDTH: usize = 12;
const MAX_COLUMN_WIDTH: usize = 255;
const MIN_CHAR_WIDTH: usize = 4;
const MAX_HEADER_LINES: usize = 4;
const MAX_TABLE_NAME_LEN: usize = 250;

/// Longest line of a cell value, in characters.
pub fn display_length(value: &str) -> usize {
    value.lines().map(|line| line.chars().count()).max().unwrap_or(0)
}

pub fn longest_word_length(text: &str) -> usize {
    text.split_whitespace()
        .map(|word| word.chars().count())
        .max()
        .unwrap_or(0)
}

/// Column width for a header over data of the given maximum display length:
/// data width plus padding, never narrower than the longest header word,
/// widened to cap header wrapping at four lines, clamped to [4, 255], and 12
/// for columns with neither data nor header.
pub fn column_width(header: &str, data_width: usize) -> usize {
    let header_total = display_length(header);
    let header_word = longest_word_length(header);

    let mut width = if data_width > 0 { data_width + COLUMN_PADDING } else { 0 };
    width = width.max(header_word);

    if header_total > 0 && width > 0 {
        let estimated_lines = header_total.div_ceil(width);
        if estimated_lines > MAX_HEADER_LINES {
            width = width.max(header_total.div_ceil(MAX_HEADER_LINES));
        }
    }

    if width == 0 {
        width = DEFAULT_COLUMN_WIDTH;
    }

    width.clamp(MIN_CHAR_WIDTH, MAX_COLUMN_WIDTH)
}

/// Sanitize a candidate into a valid Excel table name.
pub fn sanitize_table_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('_');

    let mut name = if cleaned.is_empty() {
        "Table".to_string()
    } else {
        cleaned.to_string()
    };

    let starts_ok = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !starts_ok {
        name.insert(0, '_');
    }

    name.truncate(MAX_TABLE_NAME_LEN);
    name
}

/// Hands out sanitized, workbook-unique table names.
#[derive(Debug, Default)]
pub struct TableNamer {
    used: BTreeSet<String>,
}

impl TableNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, raw: &str) -> String {
        let base = sanitize_table_name(raw);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_column_gets_default_width() {
        assert_eq!(column_width("", 0), DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_data_width_plus_padding() {
        assert_eq!(column_width("id", 10), 11);
    }

    #[test]
    fn test_header_word_sets_floor() {
        assert_eq!(column_width("financial_minAnnualTuition", 3), 26);
    }

    #[test]
    fn test_long_header_wrapping_is_capped_at_four_lines() {
        // 40-char single-word-free header over narrow data: width must grow to
        // ceil(40 / 4) = 10 so the header wraps into at most four lines.
        let header = "aaaa bbbb cccc dddd eeee ffff gggg hhhh";
        let width = column_width(header, 4);
        assert_eq!(width, header.len().div_ceil(4));
    }

    #[test]
    fn test_width_clamps_at_maximum() {
        assert_eq!(column_width("x", 500), 255);
    }

    #[test]
    fn test_width_never_below_minimum() {
        assert_eq!(column_width("ab", 1), 4);
    }

    #[test]
    fn test_display_length_uses_longest_line() {
        assert_eq!(display_length("short\na much longer line"), 18);
        assert_eq!(display_length(""), 0);
    }

    #[test]
    fn test_sanitize_table_name() {
        assert_eq!(sanitize_table_name("Vendor Types_table"), "Vendor_Types_table");
        assert_eq!(sanitize_table_name("___"), "Table");
        assert_eq!(sanitize_table_name("1st"), "_1st");
    }

    #[test]
    fn test_namer_deduplicates() {
        let mut namer = TableNamer::new();
        assert_eq!(namer.assign("Overview_table"), "Overview_table");
        assert_eq!(namer.assign("Overview_table"), "Overview_table_1");
        assert_eq!(namer.assign("Overview table"), "Overview_table_2");
    }
}
