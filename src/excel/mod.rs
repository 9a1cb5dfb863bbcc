//! Styled workbook assembly.
//!
//! Every sheet renders as an Excel-native table (filterable, row-striped)
//! with a frozen, wrapped, white-on-dark-blue header row and columns sized
//! to their data.

pub mod style;

pub use style::{column_width, display_length, sanitize_table_name, TableNamer};

use rust_xlsxwriter::{
    Color, Format, FormatAlign, Table, TableColumn, TableStyle, Workbook, XlsxError,
};
use std::path::Path;

const HEADER_FILL: u32 = 0x1F3864;

pub struct WorkbookBuilder {
    workbook: Workbook,
    namer: TableNamer,
    header_format: Format,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        let header_format = Format::new()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();

        Self {
            workbook: Workbook::new(),
            namer: TableNamer::new(),
            header_format,
        }
    }

    /// Add one sheet rendered as a filterable table.
    pub fn add_table_sheet(
        &mut self,
        title: &str,
        fields: &[String],
        rows: &[Vec<String>],
    ) -> Result<(), XlsxError> {
        let table_name = self.namer.assign(&format!("{title}_table"));
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(title)?;

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    worksheet.write_string((r + 1) as u32, c as u16, cell)?;
                }
            }
        }

        let columns: Vec<TableColumn> = fields
            .iter()
            .map(|field| {
                TableColumn::new()
                    .set_header(field)
                    .set_header_format(&self.header_format)
            })
            .collect();
        let table = Table::new()
            .set_name(&table_name)
            .set_style(TableStyle::Medium16)
            .set_columns(&columns);

        // Excel tables need at least one data row; empty sheets keep a blank one.
        let last_row = rows.len().max(1) as u32;
        let last_col = fields.len().saturating_sub(1) as u16;
        worksheet.add_table(0, 0, last_row, last_col, &table)?;

        worksheet.set_freeze_panes(1, 0)?;

        for (c, field) in fields.iter().enumerate() {
            let data_width = rows
                .iter()
                .map(|row| row.get(c).map(|cell| display_length(cell)).unwrap_or(0))
                .max()
                .unwrap_or(0);
            worksheet.set_column_width(c as u16, column_width(field, data_width) as f64)?;
        }

        Ok(())
    }

    /// Write the workbook to disk.
    pub fn save(mut self, path: &Path) -> Result<(), XlsxError> {
        self.workbook.save(path)
    }
}

impl Default for WorkbookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_workbook_with_data_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut builder = WorkbookBuilder::new();
        builder
            .add_table_sheet(
                "Vendors",
                &fields(&["id", "name"]),
                &[vec!["1".to_string(), "Vendor One".to_string()]],
            )
            .unwrap();
        builder.save(&path).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_empty_feed_still_produces_every_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        let mut builder = WorkbookBuilder::new();
        for title in ["Overview", "Vendors", "Vendor Types", "Field Inventory"] {
            builder
                .add_table_sheet(title, &fields(&["key", "value"]), &[])
                .unwrap();
        }
        builder.save(&path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_duplicate_titles_get_distinct_table_names() {
        // Same worksheet title twice is an error, but the table namer must
        // never emit a duplicate name even for colliding sanitized inputs.
        let mut builder = WorkbookBuilder::new();
        builder
            .add_table_sheet("Bonus Tags", &fields(&["a"]), &[])
            .unwrap();
        builder
            .add_table_sheet("Bonus_Tags", &fields(&["a"]), &[])
            .unwrap();
    }
}
