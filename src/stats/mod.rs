//! Content-tree statistics for the dashboard

use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counts over one traversal of the content tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Top-level directories under the content root
    pub categories: usize,
    /// Directories nested below a category, at any depth
    pub sections: usize,
    /// Markdown files inside category subtrees, readmes excluded
    pub posts: usize,
}

/// Walks a content root and counts categories, sections and posts.
///
/// The root is fixed at construction; every `compute` call recounts
/// from scratch, so the dashboard always sees the current tree.
pub struct TreeStatsAggregator {
    content_root: PathBuf,
}

impl TreeStatsAggregator {
    pub fn new<P: Into<PathBuf>>(content_root: P) -> Self {
        Self {
            content_root: content_root.into(),
        }
    }

    /// Count the tree in a single pass.
    ///
    /// Directories directly under the root are categories; every deeper
    /// directory is a section whether or not it holds any markdown.
    /// Files directly under the root and unreadable entries are
    /// ignored. A missing root yields zero counts so the dashboard
    /// stays usable before any content exists.
    pub fn compute(&self) -> TreeStats {
        let mut stats = TreeStats::default();

        if !self.content_root.is_dir() {
            return stats;
        }

        for entry in WalkDir::new(&self.content_root)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_dir() {
                if entry.depth() == 1 {
                    stats.categories += 1;
                } else {
                    stats.sections += 1;
                }
            } else if entry.depth() > 1 && is_post_file(&entry.file_name().to_string_lossy()) {
                stats.posts += 1;
            }
        }

        stats
    }
}

/// Post rule: `*.md` case-insensitively, except a bare `readme.md`
pub(crate) fn is_post_file(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.ends_with(".md") && name != "readme.md"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_single_category() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("guide")).unwrap();
        touch(&dir.path().join("guide/intro.md"));
        touch(&dir.path().join("guide/readme.md"));

        let stats = TreeStatsAggregator::new(dir.path()).compute();
        assert_eq!(
            stats,
            TreeStats {
                categories: 1,
                sections: 0,
                posts: 1
            }
        );
    }

    #[test]
    fn test_nested_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide/advanced")).unwrap();
        touch(&dir.path().join("guide/intro.md"));
        touch(&dir.path().join("guide/advanced/tips.md"));
        touch(&dir.path().join("guide/README.md"));

        let stats = TreeStatsAggregator::new(dir.path()).compute();
        assert_eq!(
            stats,
            TreeStats {
                categories: 1,
                sections: 1,
                posts: 2
            }
        );
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let stats = TreeStatsAggregator::new(dir.path().join("does-not-exist")).compute();
        assert_eq!(stats, TreeStats::default());
    }

    #[test]
    fn test_case_insensitive_matching() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("guide")).unwrap();
        touch(&dir.path().join("guide/Post.MD"));
        touch(&dir.path().join("guide/README.MD"));

        let stats = TreeStatsAggregator::new(dir.path()).compute();
        assert_eq!(stats.posts, 1);
    }

    #[test]
    fn test_empty_sections_still_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide/empty/deeper")).unwrap();

        let stats = TreeStatsAggregator::new(dir.path()).compute();
        assert_eq!(
            stats,
            TreeStats {
                categories: 1,
                sections: 2,
                posts: 0
            }
        );
    }

    #[test]
    fn test_top_level_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("guide")).unwrap();
        touch(&dir.path().join("index.md"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("guide/page.md"));
        touch(&dir.path().join("guide/data.json"));

        let stats = TreeStatsAggregator::new(dir.path()).compute();
        assert_eq!(
            stats,
            TreeStats {
                categories: 1,
                sections: 0,
                posts: 1
            }
        );
    }

    #[test]
    fn test_deep_nesting() {
        let dir = tempfile::tempdir().unwrap();
        let mut deep = dir.path().join("api");
        for i in 0..30 {
            deep = deep.join(format!("level{}", i));
        }
        fs::create_dir_all(&deep).unwrap();
        touch(&deep.join("leaf.md"));

        let stats = TreeStatsAggregator::new(dir.path()).compute();
        assert_eq!(
            stats,
            TreeStats {
                categories: 1,
                sections: 30,
                posts: 1
            }
        );
    }
}
