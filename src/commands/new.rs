//! Create a new page

use anyhow::Result;
use std::fs;

use crate::Docpress;

/// Create a new page under the given category.
///
/// `path` optionally nests the page into a section inside the category
/// (`--path tutorials/setup` lands under
/// `pages/<category>/tutorials/setup/`).
pub fn create_page(app: &Docpress, title: &str, category: &str, path: Option<&str>) -> Result<()> {
    let now = chrono::Local::now();

    let target_dir = match path {
        Some(sub) => app.pages_dir.join(category).join(sub),
        None => app.pages_dir.join(category),
    };
    fs::create_dir_all(&target_dir)?;

    let slug = slug::slugify(title);
    let filename = app
        .config
        .new_page_name
        .replace(":title", &slug)
        .replace(":year", &now.format("%Y").to_string())
        .replace(":month", &now.format("%m").to_string())
        .replace(":day", &now.format("%d").to_string());

    let file_path = target_dir.join(&filename);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    // User scaffold wins over the built-in one
    let scaffold_path = app.base_dir.join("scaffolds").join("page.md");
    let scaffold_content = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
    } else {
        "---\ntitle: {{ title }}\ndate: {{ date }}\n---\n".to_string()
    };

    let content = scaffold_content
        .replace("{{ title }}", title)
        .replace("{{ date }}", &now.format("%Y-%m-%d %H:%M:%S").to_string());

    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter;

    fn app_in(dir: &std::path::Path) -> Docpress {
        Docpress::new(dir).unwrap()
    }

    #[test]
    fn test_create_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());

        create_page(&app, "Getting Started", "guide", None).unwrap();

        let page_path = dir.path().join("pages/guide/getting-started.md");
        assert!(page_path.is_file());

        let raw = fs::read_to_string(&page_path).unwrap();
        let (fields, _) = frontmatter::split(&raw).unwrap();
        assert_eq!(
            fields.get("title").and_then(|v| v.as_str()),
            Some("Getting Started")
        );
    }

    #[test]
    fn test_create_page_in_section() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());

        create_page(&app, "Setup", "guide", Some("tutorials")).unwrap();
        assert!(dir.path().join("pages/guide/tutorials/setup.md").is_file());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());

        create_page(&app, "Setup", "guide", None).unwrap();
        assert!(create_page(&app, "Setup", "guide", None).is_err());
    }

    #[test]
    fn test_user_scaffold() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("scaffolds")).unwrap();
        fs::write(
            dir.path().join("scaffolds/page.md"),
            "---\ntitle: {{ title }}\ndraft: true\n---\n",
        )
        .unwrap();
        let app = app_in(dir.path());

        create_page(&app, "Custom", "guide", None).unwrap();
        let raw = fs::read_to_string(dir.path().join("pages/guide/custom.md")).unwrap();
        assert!(raw.contains("draft: true"));
        assert!(raw.contains("title: Custom"));
    }
}
