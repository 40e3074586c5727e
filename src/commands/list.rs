//! List site content

use anyhow::Result;
use std::fs;
use walkdir::WalkDir;

use crate::content::frontmatter;
use crate::stats::is_post_file;
use crate::Docpress;

/// List site content by type
pub fn run(app: &Docpress, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => list_posts(app),
        "category" | "categories" => list_categories(app),
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category",
                content_type
            );
        }
    }
}

fn list_posts(app: &Docpress) -> Result<()> {
    let mut posts = Vec::new();

    for entry in WalkDir::new(&app.pages_dir)
        .min_depth(2)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_post_file(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let rel = path
            .strip_prefix(&app.pages_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        // Front-matter title when there is one, filename otherwise
        let title = fs::read_to_string(path)
            .ok()
            .and_then(|raw| frontmatter::split(&raw).ok().map(|(fields, _)| fields))
            .and_then(|fields| {
                fields
                    .get("title")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled")
                    .to_string()
            });

        posts.push((rel, title));
    }

    posts.sort();

    println!("Posts ({}):", posts.len());
    for (rel, title) in posts {
        println!("  {} [{}]", title, rel);
    }

    Ok(())
}

fn list_categories(app: &Docpress) -> Result<()> {
    let mut categories = Vec::new();

    if app.pages_dir.is_dir() {
        for entry in fs::read_dir(&app.pages_dir)?.filter_map(|e| e.ok()) {
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let count = WalkDir::new(entry.path())
                .min_depth(1)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.file_type().is_file() && is_post_file(&e.file_name().to_string_lossy())
                })
                .count();

            categories.push((entry.file_name().to_string_lossy().to_string(), count));
        }
    }

    categories.sort();

    println!("Categories ({}):", categories.len());
    for (name, count) in categories {
        println!("  {} ({})", name, count);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_runs_on_empty_site() {
        let dir = tempfile::tempdir().unwrap();
        let app = Docpress::new(dir.path()).unwrap();
        run(&app, "posts").unwrap();
        run(&app, "categories").unwrap();
        assert!(run(&app, "nonsense").is_err());
    }
}
