//! Slug derivation from legacy file locations
//!
//! Legacy documents live in per-entity directories named after the entity:
//!
//! - members:  `contents/members/<...>/<slug>/index.md`
//! - articles: `contents/articles/<year>/<MM-DD>_<name>/index.md` → `<year>-<MM-DD>-<name>`
//! - projects: `contents/projects/<...>/<slug>/index.md`

use std::path::{Component, Path};

/// Directory components of `file` below `root`, as strings
fn relative_dir_parts(root: &Path, file: &Path) -> Vec<String> {
    let dir = file.parent().unwrap_or(file);
    let relative = dir.strip_prefix(root).unwrap_or(dir);

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Member slug: last directory segment below the members root
///
/// Returns `None` for a document placed directly in the root.
pub fn member_slug(members_root: &Path, file: &Path) -> Option<String> {
    relative_dir_parts(members_root, file).pop()
}

/// Article slug: `{year}-{monthDay}-{rest}` from `<year>/<monthDay>_<rest...>`
///
/// Underscores in the remainder become hyphens.
pub fn article_slug(articles_root: &Path, file: &Path) -> String {
    let parts = relative_dir_parts(articles_root, file);
    let name = parts.last().map(String::as_str).unwrap_or("");
    let year = parts
        .len()
        .checked_sub(2)
        .and_then(|i| parts.get(i))
        .map(String::as_str)
        .unwrap_or("");

    let mut segments = name.split('_');
    let month_day = segments.next().unwrap_or("");
    let rest: Vec<&str> = segments.collect();

    format!("{}-{}-{}", year, month_day, rest.join("-"))
}

/// Project slug: name of the directory holding the document
pub fn project_slug(file: &Path) -> Option<String> {
    file.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
}

/// Member slug from a `"YYYY/member-slug"` reference
pub fn member_ref_slug(reference: &str) -> Option<&str> {
    reference
        .trim()
        .rsplit('/')
        .next()
        .filter(|slug| !slug.is_empty())
}
