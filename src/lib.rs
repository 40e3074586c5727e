//! docpress: a dev server and content pipeline for markdown documentation sites
//!
//! This crate resolves markdown pages from a content tree (or a prebuilt
//! in-memory snapshot), compiles them with front-matter extraction, and
//! serves a dashboard with content-tree statistics.

pub mod commands;
pub mod config;
pub mod content;
pub mod server;
pub mod stats;

use anyhow::Result;
use std::path::Path;

/// The main docpress application
#[derive(Clone)]
pub struct Docpress {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory (the root of the documentation site)
    pub base_dir: std::path::PathBuf,
    /// Content root holding category directories and markdown pages
    pub pages_dir: std::path::PathBuf,
    /// Theme directory (metadata lookup only)
    pub theme_dir: std::path::PathBuf,
    /// Static dashboard UI directory
    pub ui_dir: std::path::PathBuf,
}

impl Docpress {
    /// Create a new docpress instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("docpress.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let pages_dir = base_dir.join(&config.pages_dir);
        let theme_dir = base_dir.join(&config.theme_dir);
        let ui_dir = base_dir.join(&config.ui_dir);

        Ok(Self {
            config,
            base_dir,
            pages_dir,
            theme_dir,
            ui_dir,
        })
    }

    /// Initialize a new documentation site
    pub fn init(&self) -> Result<()> {
        commands::init::init_site(&self.base_dir)
    }

    /// Create a new page
    pub fn new_page(&self, title: &str, category: &str, path: Option<&str>) -> Result<()> {
        commands::new::create_page(self, title, category, path)
    }

    /// Compute content-tree statistics for the dashboard
    pub fn stats(&self) -> stats::TreeStats {
        stats::TreeStatsAggregator::new(&self.pages_dir).compute()
    }
}
