//! Script entry discovery.
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::BundleError;

/// Extensions recognised as script entry points.
pub const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "mjsx"];

/// Output name → source file, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntryMap(BTreeMap<String, PathBuf>);

impl EntryMap {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no entry was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Source file of the entry called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.0.get(name).map(PathBuf::as_path)
    }

    /// Iterate `(name, source)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Insert an entry, rejecting a second file for the same name.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::EntryCollision`] if `name` is already taken.
    pub fn insert(&mut self, name: String, source: PathBuf) -> Result<(), BundleError> {
        match self.0.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(source);
                Ok(())
            }
            Entry::Occupied(slot) => Err(BundleError::EntryCollision {
                name: slot.key().clone(),
                first: slot.get().clone(),
                second: source,
            }),
        }
    }
}

/// Find every file directly inside `dir` whose extension is in `extensions`.
///
/// The output name is the file name with its final extension removed.
/// A missing directory yields an empty map.
///
/// # Errors
///
/// Returns [`BundleError::Glob`] if a directory entry cannot be read and
/// [`BundleError::EntryCollision`] if two files share an output name.
pub fn discover(dir: &Path, extensions: &[&str]) -> Result<EntryMap, BundleError> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut paths = Vec::new();
    for ext in extensions {
        let pattern = format!("{base}/*.{ext}");
        let matches = glob::glob(&pattern).map_err(|e| BundleError::Glob(e.to_string()))?;
        for path in matches {
            paths.push(path.map_err(|e| BundleError::Glob(e.to_string()))?);
        }
    }
    paths.sort();

    let mut entries = EntryMap::default();
    for path in paths {
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        entries.insert(name, path)?;
    }
    Ok(entries)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn maps_basename_to_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "main.ts");
        touch(dir.path(), "vendor.js");
        touch(dir.path(), "style.scss");
        touch(dir.path(), "README.md");

        let entries = discover(dir.path(), SCRIPT_EXTENSIONS).unwrap();
        let names: Vec<&str> = entries.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["main", "vendor"]);
        assert_eq!(entries.get("main"), Some(dir.path().join("main.ts").as_path()));
    }

    #[test]
    fn strips_only_final_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app.worker.mjs");
        let entries = discover(dir.path(), SCRIPT_EXTENSIONS).unwrap();
        assert!(entries.get("app.worker").is_some());
    }

    #[test]
    fn empty_directory_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), SCRIPT_EXTENSIONS).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let entries = discover(&dir.path().join("res"), SCRIPT_EXTENSIONS).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn subdirectories_are_not_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lib.js")).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested"), "deep.js");
        assert!(discover(dir.path(), SCRIPT_EXTENSIONS).unwrap().is_empty());
    }

    #[test]
    fn basename_collision_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app.js");
        touch(dir.path(), "app.ts");
        let err = discover(dir.path(), SCRIPT_EXTENSIONS).unwrap_err();
        match err {
            BundleError::EntryCollision {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "app");
                assert_eq!(first, dir.path().join("app.js"));
                assert_eq!(second, dir.path().join("app.ts"));
            }
            other => panic!("expected collision, got {other}"),
        }
    }
}
