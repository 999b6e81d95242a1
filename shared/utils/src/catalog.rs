//! Part Catalog
//!
//! Flat-file part store: every delimited file directly under the parts root
//! or in one of its immediate subdirectories contributes rows keyed by IPN.
//! The whole index is rebuilt on each load; callers keep one index per
//! request.

use partforge_models::Part;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::delimited::{cell, DelimitedFormat, DelimitedTable};

/// Point lookups by IPN
pub trait PartCatalog: Send + Sync {
    fn lookup_part(&self, ipn: &str) -> Option<&Part>;

    /// Catalog description, or an empty string when the part is unknown.
    fn description_of(&self, ipn: &str) -> String {
        self.lookup_part(ipn)
            .map(|part| part.description.clone())
            .unwrap_or_default()
    }
}

/// In-memory IPN index
#[derive(Debug, Clone, Default)]
pub struct PartIndex {
    parts: HashMap<String, Part>,
}

impl PartIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        let mut index = Self::new();
        for part in parts {
            index.insert(part);
        }
        index
    }

    /// Adds a part unless its IPN is already indexed. Returns whether it was
    /// added.
    pub fn insert(&mut self, part: Part) -> bool {
        if self.parts.contains_key(&part.ipn) {
            return false;
        }
        self.parts.insert(part.ipn.clone(), part);
        true
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl PartCatalog for PartIndex {
    fn lookup_part(&self, ipn: &str) -> Option<&Part> {
        self.parts.get(ipn)
    }
}

/// Loader for the flat-file part catalog
#[derive(Debug, Clone)]
pub struct FlatFileCatalog {
    root: PathBuf,
    ipn_columns: Vec<String>,
    description_columns: Vec<String>,
    mpn_columns: Vec<String>,
    manufacturer_columns: Vec<String>,
}

impl FlatFileCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ipn_columns: vec![
                "ipn".to_string(),
                "part_number".to_string(),
                "part_no".to_string(),
                "pn".to_string(),
            ],
            description_columns: vec![
                "description".to_string(),
                "desc".to_string(),
                "part_description".to_string(),
            ],
            mpn_columns: vec![
                "mpn".to_string(),
                "manufacturer_part_number".to_string(),
                "mfr_part_number".to_string(),
                "mfr_pn".to_string(),
            ],
            manufacturer_columns: vec![
                "manufacturer".to_string(),
                "mfr".to_string(),
                "mfg".to_string(),
            ],
        }
    }

    /// Scans the catalog files and builds a fresh index.
    ///
    /// Unreadable files are skipped with a warning and a missing root yields
    /// an empty index.
    pub fn load(&self) -> PartIndex {
        let mut index = PartIndex::new();

        for path in self.catalog_files() {
            match DelimitedTable::read_file(&path) {
                Ok(table) => self.index_table(&path, &table, &mut index),
                Err(e) => warn!(file = %path.display(), error = %e, "Skipping unreadable catalog file"),
            }
        }

        debug!(root = %self.root.display(), parts = index.len(), "Part catalog loaded");
        index
    }

    fn catalog_files(&self) -> Vec<PathBuf> {
        let mut files = list_delimited_files(&self.root);
        let mut subdirs: Vec<PathBuf> = read_dir_paths(&self.root)
            .into_iter()
            .filter(|path| path.is_dir())
            .collect();
        subdirs.sort();
        for dir in subdirs {
            files.extend(list_delimited_files(&dir));
        }
        files
    }

    fn index_table(&self, path: &Path, table: &DelimitedTable, index: &mut PartIndex) {
        let ipn_col = table.find_column(&self.ipn_columns).unwrap_or(0);
        let description_col = table.find_column(&self.description_columns);
        let mpn_col = table.find_column(&self.mpn_columns);
        let manufacturer_col = table.find_column(&self.manufacturer_columns);
        let known = [Some(ipn_col), description_col, mpn_col, manufacturer_col];

        for (line, row) in &table.rows {
            let Some(ipn) = cell(row, Some(ipn_col)) else {
                continue;
            };

            let fields = table
                .headers
                .iter()
                .enumerate()
                .filter(|(i, header)| !known.contains(&Some(*i)) && !header.is_empty())
                .filter_map(|(i, header)| cell(row, Some(i)).map(|v| (header.clone(), v.to_string())))
                .collect();

            let part = Part {
                ipn: ipn.to_string(),
                description: cell(row, description_col).unwrap_or_default().to_string(),
                mpn: cell(row, mpn_col).map(str::to_string),
                manufacturer: cell(row, manufacturer_col).map(str::to_string),
                fields,
            };

            if !index.insert(part) {
                warn!(ipn = %ipn, file = %path.display(), line = line, "Duplicate IPN in catalog, keeping first");
            }
        }
    }
}

fn read_dir_paths(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Catalog directory not readable");
            Vec::new()
        }
    }
}

fn list_delimited_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = read_dir_paths(dir)
        .into_iter()
        .filter(|path| path.is_file() && DelimitedFormat::from_extension(path).is_some())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_indexes_root_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("passives")).unwrap();
        fs::write(
            dir.path().join("ics.csv"),
            "IPN,Description,MPN,Manufacturer,Package\nIC-001,MCU,STM32F0,ST,QFN32\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("passives/res.tsv"),
            "Part Number\tDesc\nRES-001\t10k 0402\n",
        )
        .unwrap();

        let index = FlatFileCatalog::new(dir.path()).load();
        assert_eq!(index.len(), 2);

        let mcu = index.lookup_part("IC-001").unwrap();
        assert_eq!(mcu.description, "MCU");
        assert_eq!(mcu.mpn.as_deref(), Some("STM32F0"));
        assert_eq!(mcu.manufacturer.as_deref(), Some("ST"));
        assert_eq!(mcu.field("package"), Some("QFN32"));

        assert_eq!(index.description_of("RES-001"), "10k 0402");
        assert_eq!(index.description_of("RES-404"), "");
    }

    #[test]
    fn test_first_duplicate_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "ipn,description\nRES-001,first\n").unwrap();
        fs::write(dir.path().join("b.csv"), "ipn,description\nRES-001,second\n").unwrap();

        let index = FlatFileCatalog::new(dir.path()).load();
        assert_eq!(index.description_of("RES-001"), "first");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let index = PartIndex::from_parts([Part::new("RES-001", "10k")]);
        assert!(index.lookup_part("RES-001").is_some());
        assert!(index.lookup_part("res-001").is_none());
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = FlatFileCatalog::new(dir.path().join("absent")).load();
        assert!(index.is_empty());
    }
}
