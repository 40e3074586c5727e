//! Page resolution pipeline
//!
//! Composes a `ContentSource` with the `MarkdownCompiler`: fetch the raw
//! document, compile it, hand back a `CompiledPost` or a typed failure.

use thiserror::Error;

use super::markdown::{CompileError, CompiledPost, MarkdownCompiler};
use super::source::ContentSource;

/// Why a page request failed
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The active source has no document for this page id (404-equivalent)
    #[error("no page found for `{0}`")]
    NotFound(String),

    /// The document exists but did not compile (500-equivalent)
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The document exists but could not be read (500-equivalent)
    #[error("failed to read page source: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Resolves page ids to compiled posts
pub struct PostResolver {
    source: ContentSource,
    compiler: MarkdownCompiler,
}

impl PostResolver {
    /// Both the source mode and the compiler settings are fixed here;
    /// nothing about a resolver mutates after construction.
    pub fn new(source: ContentSource, compiler: MarkdownCompiler) -> Self {
        Self { source, compiler }
    }

    /// Resolve a page id to a compiled post.
    ///
    /// A source miss fails immediately with `NotFound`; compile errors
    /// propagate unchanged. Compilation is deterministic over the same
    /// bytes, so nothing is retried.
    pub fn resolve(&self, page_id: &str) -> Result<CompiledPost, ResolveError> {
        let raw = self.source.fetch(page_id)?;
        Ok(self.compiler.compile(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::source::ContentStore;
    use std::fs;

    fn filesystem_resolver(root: &std::path::Path) -> PostResolver {
        PostResolver::new(
            ContentSource::filesystem(root),
            MarkdownCompiler::new(),
        )
    }

    #[test]
    fn test_resolve_from_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(
            dir.path().join("guide/intro.md"),
            "---\ntitle: Intro\n---\n# Welcome\n",
        )
        .unwrap();

        let resolver = filesystem_resolver(dir.path());
        let post = resolver.resolve("guide/intro").unwrap();
        assert!(post.body.contains("<h1>Welcome</h1>"));
        assert_eq!(
            post.metadata.get("title").and_then(|v| v.as_str()),
            Some("Intro")
        );
    }

    #[test]
    fn test_missing_page_is_not_found_in_each_mode() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = filesystem_resolver(dir.path());
        assert!(resolver.resolve("guide/missing").unwrap_err().is_not_found());

        let resolver = PostResolver::new(
            ContentSource::snapshot(ContentStore::default()),
            MarkdownCompiler::new(),
        );
        assert!(resolver.resolve("guide/missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_snapshot_mode_never_reads_disk() {
        // The page exists on disk, but a snapshot resolver must not see it
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("guide/intro.md"), "# On disk\n").unwrap();

        let resolver = PostResolver::new(
            ContentSource::snapshot(ContentStore::default()),
            MarkdownCompiler::new(),
        );
        assert!(resolver.resolve("guide/intro").unwrap_err().is_not_found());
    }

    #[test]
    fn test_compile_error_propagates() {
        let store: ContentStore = [(
            "guide/bad.md".to_string(),
            "---\ntitle: [broken\n---\nBody.\n".to_string(),
        )]
        .into_iter()
        .collect();
        let resolver = PostResolver::new(
            ContentSource::snapshot(store),
            MarkdownCompiler::new(),
        );
        assert!(matches!(
            resolver.resolve("guide/bad"),
            Err(ResolveError::Compile(_))
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(
            dir.path().join("guide/intro.md"),
            "---\ntitle: Intro\n---\nSame *content*.\n",
        )
        .unwrap();

        let resolver = filesystem_resolver(dir.path());
        let first = resolver.resolve("guide/intro").unwrap();
        let second = resolver.resolve("guide/intro").unwrap();
        assert_eq!(first, second);
    }
}
