//! Delimited Table Reader
//!
//! Shared reader for the flat files behind the part catalog and the
//! composition store: a header row followed by data rows, comma or tab
//! separated depending on the file extension.

use anyhow::{Context, Result};
use std::path::Path;

/// Supported delimited file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimitedFormat {
    Csv,
    Tsv,
}

impl DelimitedFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            _ => None,
        }
    }

    pub fn delimiter(&self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

/// A delimited file split into normalized headers and raw rows.
#[derive(Debug, Clone, Default)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    /// Data rows with their 1-based line numbers in the source file.
    pub rows: Vec<(usize, Vec<String>)>,
    pub warnings: Vec<String>,
}

impl DelimitedTable {
    pub fn read(data: &[u8], format: DelimitedFormat) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter())
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read header row")?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        let mut warnings = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    if record.iter().all(|cell| cell.is_empty()) {
                        continue;
                    }
                    rows.push((idx + 2, record.iter().map(str::to_string).collect()));
                }
                Err(e) => {
                    warnings.push(format!("Row {}: Parse error - {}", idx + 2, e));
                }
            }
        }

        Ok(Self {
            headers,
            rows,
            warnings,
        })
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let format = DelimitedFormat::from_extension(path)
            .with_context(|| format!("Unsupported file type: {}", path.display()))?;
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::read(&data, format)
    }

    /// Index of the first header matching any candidate, in candidate order.
    pub fn find_column(&self, candidates: &[String]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|candidate| self.headers.iter().position(|h| h == candidate))
    }
}

/// Lower-cases a header and folds spaces and hyphens to underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Gets a trimmed, non-empty cell
pub fn cell(row: &[String], column: Option<usize>) -> Option<&str> {
    let value = row.get(column?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(DelimitedFormat::from_extension(Path::new("PCA-1.csv")), Some(DelimitedFormat::Csv));
        assert_eq!(DelimitedFormat::from_extension(Path::new("PCA-1.TSV")), Some(DelimitedFormat::Tsv));
        assert_eq!(DelimitedFormat::from_extension(Path::new("PCA-1.xlsx")), None);
        assert_eq!(DelimitedFormat::from_extension(Path::new("PCA-1")), None);
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("\u{feff}Part Number"), "part_number");
        assert_eq!(normalize_header("  Ref-Des "), "ref_des");
        assert_eq!(normalize_header("QTY"), "qty");
    }

    #[test]
    fn test_read_tolerates_ragged_rows() {
        let data = b"IPN,Qty,Description\nRES-001,2\nCAP-001,1,100nF,extra\n,,\n";
        let table = DelimitedTable::read(data, DelimitedFormat::Csv).unwrap();
        assert_eq!(table.headers, vec!["ipn", "qty", "description"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].0, 2);
        assert_eq!(cell(&table.rows[0].1, Some(2)), None);
        assert_eq!(cell(&table.rows[1].1, Some(2)), Some("100nF"));
    }

    #[test]
    fn test_read_tab_separated() {
        let data = b"pn\tqty\nRES-001\t4\n";
        let table = DelimitedTable::read(data, DelimitedFormat::Tsv).unwrap();
        assert_eq!(table.find_column(&["pn".to_string()]), Some(0));
        assert_eq!(cell(&table.rows[0].1, Some(1)), Some("4"));
    }

    #[test]
    fn test_empty_input() {
        let table = DelimitedTable::read(b"", DelimitedFormat::Csv).unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }
}
