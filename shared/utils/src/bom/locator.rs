//! Composition Locator
//!
//! Finds and loads the composition file that defines an assembly's direct
//! children. A missing or unreadable file is not an error: the assembly just
//! has no children.

use partforge_models::CompositionEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::parser::CompositionParser;
use crate::validation::validate_ipn;

/// Source of per-assembly composition rows
pub trait CompositionSource: Send + Sync {
    /// Ordered BOM lines of `ipn`, or `None` when no composition is defined.
    fn load(&self, ipn: &str) -> Option<Vec<CompositionEntry>>;
}

/// Composition files named `{IPN}.{ext}` under a root directory or one of its
/// immediate subdirectories.
#[derive(Debug, Clone)]
pub struct CompositionDirectory {
    root: PathBuf,
    extensions: Vec<String>,
}

impl CompositionDirectory {
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the composition file for `ipn`, if any.
    ///
    /// The root is searched first, then its subdirectories in lexical order.
    /// IPNs that are not safe file stems are never located.
    pub fn locate(&self, ipn: &str) -> Option<PathBuf> {
        if let Err(e) = validate_ipn(ipn) {
            warn!(ipn = %ipn, error = %e, "Refusing composition lookup for malformed IPN");
            return None;
        }

        if let Some(found) = self.find_in(&self.root, ipn) {
            return Some(found);
        }

        let mut subdirs: Vec<PathBuf> = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .collect(),
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "Composition root not readable");
                return None;
            }
        };
        subdirs.sort();

        subdirs.iter().find_map(|dir| self.find_in(dir, ipn))
    }

    fn find_in(&self, dir: &Path, ipn: &str) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| dir.join(format!("{}.{}", ipn, ext)))
            .find(|candidate| candidate.is_file())
    }
}

impl CompositionSource for CompositionDirectory {
    fn load(&self, ipn: &str) -> Option<Vec<CompositionEntry>> {
        let path = self.locate(ipn)?;

        match CompositionParser::new().parse_file(&path) {
            Ok(parsed) => {
                for warning in &parsed.warnings {
                    warn!(ipn = %ipn, file = %path.display(), "{}", warning);
                }
                debug!(ipn = %ipn, file = %path.display(), lines = parsed.entries.len(), "Loaded composition");
                Some(parsed.entries)
            }
            Err(e) => {
                warn!(ipn = %ipn, file = %path.display(), error = %e, "Unreadable composition file, treating as empty");
                Some(Vec::new())
            }
        }
    }
}

/// In-memory composition store for testing
#[derive(Debug, Clone, Default)]
pub struct InMemoryCompositions {
    compositions: HashMap<String, Vec<CompositionEntry>>,
}

impl InMemoryCompositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ipn: impl Into<String>, entries: Vec<CompositionEntry>) {
        self.compositions.insert(ipn.into(), entries);
    }

    pub fn with(mut self, ipn: impl Into<String>, entries: Vec<CompositionEntry>) -> Self {
        self.insert(ipn, entries);
        self
    }
}

impl CompositionSource for InMemoryCompositions {
    fn load(&self, ipn: &str) -> Option<Vec<CompositionEntry>> {
        self.compositions.get(ipn).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn extensions() -> Vec<String> {
        vec!["csv".to_string(), "tsv".to_string()]
    }

    #[test]
    fn test_locate_prefers_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("boards")).unwrap();
        fs::write(dir.path().join("PCA-A.csv"), "ipn\nRES-001\n").unwrap();
        fs::write(dir.path().join("boards/PCA-A.csv"), "ipn\nRES-002\n").unwrap();

        let store = CompositionDirectory::new(dir.path(), &extensions());
        assert_eq!(store.locate("PCA-A"), Some(dir.path().join("PCA-A.csv")));
    }

    #[test]
    fn test_locate_in_sorted_subdirectories_only_one_level() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::create_dir_all(dir.path().join("a/deeper")).unwrap();
        fs::write(dir.path().join("b/PCA-A.tsv"), "ipn\tqty\nRES-001\t2\n").unwrap();
        fs::write(dir.path().join("a/deeper/PCA-A.csv"), "ipn\nRES-009\n").unwrap();

        let store = CompositionDirectory::new(dir.path(), &extensions());
        assert_eq!(store.locate("PCA-A"), Some(dir.path().join("b/PCA-A.tsv")));

        let entries = store.load("PCA-A").unwrap();
        assert_eq!(entries, vec![CompositionEntry::new("RES-001", 2.0)]);
    }

    #[test]
    fn test_missing_composition_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CompositionDirectory::new(dir.path(), &extensions());
        assert!(store.load("PCA-NONE").is_none());

        let absent = CompositionDirectory::new(dir.path().join("missing"), &extensions());
        assert!(absent.load("PCA-NONE").is_none());
    }

    #[test]
    fn test_stem_match_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pca-a.csv"), "ipn\nRES-001\n").unwrap();
        fs::write(dir.path().join("PCA-A.txt"), "ipn\nRES-001\n").unwrap();

        let store = CompositionDirectory::new(dir.path(), &extensions());
        assert_eq!(store.locate("PCA-A.csv"), None);
        assert_eq!(store.locate("PCA-AB"), None);
    }

    #[test]
    fn test_lookup_never_leaves_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("bom");
        fs::create_dir_all(root.join("PCA-a")).unwrap();
        fs::create_dir_all(dir.path().join("outside")).unwrap();
        fs::write(dir.path().join("outside/PCA-S.csv"), "ipn\nSECRET-001\n").unwrap();

        let store = CompositionDirectory::new(&root, &extensions());
        assert_eq!(store.locate("PCA-a/../../outside/PCA-S"), None);
        assert!(store.load("PCA-a/../../outside/PCA-S").is_none());
        assert_eq!(store.locate("../outside/PCA-S"), None);
    }
}
