//! Publishing: copy the workbook and emit the static download page.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Copy the workbook into the publish directory and write `index.html`
/// linking to it. Returns the published workbook path.
pub fn publish_workbook(
    workbook_path: &Path,
    publish_dir: &Path,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf> {
    fs::create_dir_all(publish_dir)
        .with_context(|| format!("Failed to create {}", publish_dir.display()))?;

    let file_name = workbook_path
        .file_name()
        .context("Workbook path has no file name")?
        .to_string_lossy()
        .into_owned();

    let published = publish_dir.join(&file_name);
    fs::copy(workbook_path, &published).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            workbook_path.display(),
            published.display()
        )
    })?;

    let index = publish_dir.join("index.html");
    fs::write(&index, download_page(&file_name, generated_at))
        .with_context(|| format!("Failed to write {}", index.display()))?;

    Ok(published)
}

fn download_page(file_name: &str, generated_at: DateTime<Utc>) -> String {
    let timestamp = generated_at.format("%Y-%m-%d %H:%M UTC");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Texas ESA Vendor Directory</title>
  <style>
    body {{ font-family: sans-serif; max-width: 40rem; margin: 4rem auto; padding: 0 1rem; }}
    a {{ font-size: 1.2rem; }}
    p.meta {{ color: #555; }}
  </style>
</head>
<body>
  <h1>Texas ESA Vendor Directory</h1>
  <p>Vendor listings joined with TEA education service center regions, counties,
  and school districts.</p>
  <p><a href="{file_name}" download>Download the latest workbook</a></p>
  <p class="meta">Generated {timestamp}</p>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_copies_workbook_and_writes_page() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = dir.path().join("tx_efa_finder.xlsx");
        fs::write(&workbook, b"workbook bytes").unwrap();

        let publish_dir = dir.path().join("docs");
        let published = publish_workbook(&workbook, &publish_dir, Utc::now()).unwrap();

        assert_eq!(fs::read(&published).unwrap(), b"workbook bytes");
        let page = fs::read_to_string(publish_dir.join("index.html")).unwrap();
        assert!(page.contains(r#"href="tx_efa_finder.xlsx""#));
        assert!(page.contains("Generated "));
    }
}
