//! Dual-mode content source
//!
//! Pages come from exactly one place, fixed at construction: the
//! filesystem under a content root (authoring mode, edits show up
//! without a restart) or a prebuilt in-memory snapshot (deployed
//! builds). A miss in one source never falls through to the other.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::resolver::ResolveError;

/// Immutable snapshot of the content tree, keyed by relative path
/// (with extension), built once before serving.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    entries: HashMap<String, String>,
}

impl ContentStore {
    /// Build a snapshot by reading every markdown file under `root`.
    ///
    /// Keys are `/`-separated paths relative to the root, extension
    /// included (`guide/intro.md`). Readme files are stored too; what
    /// counts as a post is the caller's concern, not the store's.
    pub fn build<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = root.as_ref();
        let mut entries = HashMap::new();

        if !root.is_dir() {
            return Ok(Self { entries });
        }

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !name.to_ascii_lowercase().ends_with(".md") {
                continue;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.insert(key, fs::read_to_string(entry.path())?);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
impl FromIterator<(String, String)> for ContentStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Where raw page text comes from, chosen once per process
pub enum ContentSource {
    Filesystem { root: PathBuf },
    Snapshot { store: ContentStore },
}

impl ContentSource {
    /// Read pages from disk under `root`
    pub fn filesystem<P: Into<PathBuf>>(root: P) -> Self {
        Self::Filesystem { root: root.into() }
    }

    /// Read pages from a prebuilt snapshot
    pub fn snapshot(store: ContentStore) -> Self {
        Self::Snapshot { store }
    }

    /// Fetch the raw document for a page id (a relative path without
    /// extension). A missing page is `ResolveError::NotFound`; the
    /// alternate source is never consulted.
    pub fn fetch(&self, page_id: &str) -> Result<String, ResolveError> {
        match self {
            Self::Filesystem { root } => {
                // Keep lookups inside the content root
                let id_path = Path::new(page_id);
                let escapes = id_path.components().any(|c| {
                    matches!(
                        c,
                        Component::ParentDir | Component::RootDir | Component::Prefix(_)
                    )
                });
                if escapes {
                    return Err(ResolveError::NotFound(page_id.to_string()));
                }

                let path = root.join(format!("{}.md", page_id));
                match fs::read_to_string(&path) {
                    Ok(raw) => Ok(raw),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        Err(ResolveError::NotFound(page_id.to_string()))
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Self::Snapshot { store } => store
                .get(&format!("{}.md", page_id))
                .map(str::to_string)
                .ok_or_else(|| ResolveError::NotFound(page_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_filesystem_fetch() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("guide/intro.md"), "# Intro\n").unwrap();

        let source = ContentSource::filesystem(dir.path());
        assert_eq!(source.fetch("guide/intro").unwrap(), "# Intro\n");
        assert!(matches!(
            source.fetch("guide/missing"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_filesystem_rejects_escaping_ids() {
        let dir = tempfile::tempdir().unwrap();
        let source = ContentSource::filesystem(dir.path().join("pages"));
        assert!(matches!(
            source.fetch("../secrets"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_snapshot_fetch() {
        let store: ContentStore = [("guide/intro.md".to_string(), "# Intro\n".to_string())]
            .into_iter()
            .collect();
        let source = ContentSource::snapshot(store);
        assert_eq!(source.fetch("guide/intro").unwrap(), "# Intro\n");
        assert!(matches!(
            source.fetch("guide/missing"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_store_build_includes_readmes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide/advanced")).unwrap();
        fs::write(dir.path().join("guide/intro.md"), "intro").unwrap();
        fs::write(dir.path().join("guide/README.md"), "readme").unwrap();
        fs::write(dir.path().join("guide/advanced/tips.md"), "tips").unwrap();
        fs::write(dir.path().join("guide/notes.txt"), "not markdown").unwrap();

        let store = ContentStore::build(dir.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("guide/intro.md"), Some("intro"));
        assert_eq!(store.get("guide/README.md"), Some("readme"));
        assert_eq!(store.get("guide/advanced/tips.md"), Some("tips"));
        assert_eq!(store.get("guide/notes.txt"), None);
    }

    #[test]
    fn test_store_build_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::build(dir.path().join("nope")).unwrap();
        assert!(store.is_empty());
    }
}
