//! Initialize a new documentation site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("pages/guide"))?;
    fs::create_dir_all(target_dir.join("theme/meta"))?;
    fs::create_dir_all(target_dir.join("ui"))?;
    fs::create_dir_all(target_dir.join("scaffolds"))?;

    let config_content = r#"# docpress configuration

# Site
title: Documentation
description: ''
author: ''
language: en

# URL
url: http://localhost
root: /

# Directory
pages_dir: pages
theme_dir: theme
ui_dir: ui

# Writing
new_page_name: :title.md

# Rendering
highlight:
  enable: true
  line_number: true
  theme: base16-ocean.dark

# Server
port: 8080
"#;
    fs::write(target_dir.join("docpress.yml"), config_content)?;

    let intro_content = r#"---
title: Introduction
---

# Introduction

Welcome to your documentation site. Edit this page under
`pages/guide/intro.md` and the dev server will pick it up live.
"#;
    fs::write(target_dir.join("pages/guide/intro.md"), intro_content)?;

    let readme_content = r#"# guide

Pages in this directory belong to the "guide" category. A readme.md
describes the directory and is not listed as a post.
"#;
    fs::write(target_dir.join("pages/guide/readme.md"), readme_content)?;

    let theme_meta = r#"{
  "name": "docpress-default",
  "version": "0.1.0"
}
"#;
    fs::write(target_dir.join("theme/meta/package.json"), theme_meta)?;

    Ok(())
}
