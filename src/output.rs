//! CSV interchange between the scrape and build commands.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Write a table as CSV, creating parent directories as needed.
pub fn write_csv(path: &Path, fields: &[String], rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(fields)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Read a CSV back into (header, rows).
pub fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let fields: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed CSV row in {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok((fields, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (Vec<String>, Vec<Vec<String>>) {
        let fields = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Comma, Inc.".to_string()],
            vec!["2".to_string(), "Quote \"Q\"".to_string()],
        ];
        (fields, rows)
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let (fields, rows) = table();

        write_csv(&path, &fields, &rows).unwrap();
        let (read_fields, read_rows) = read_csv(&path).unwrap();

        assert_eq!(read_fields, fields);
        assert_eq!(read_rows, rows);
    }

    #[test]
    fn test_write_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let (fields, rows) = table();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        write_csv(&a, &fields, &rows).unwrap();
        write_csv(&b, &fields, &rows).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_csv(&dir.path().join("absent.csv")).is_err());
    }
}
