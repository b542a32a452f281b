//! Slugs for content files.
//!
//! Post slugs come from the file's path below `posts/`: every directory and
//! the file stem are slugified on their own and joined with `/`, so nested
//! collections keep their structure in the URL:
//!
//! - `posts/Ops Notes/Why We Page.md` → `ops-notes/why-we-page`
//! - `posts/2024/runbook_drills.mdx` → `2024/runbook-drills`
//!
//! Slugs are lowercase ASCII alphanumerics and single dashes.

use std::path::{Component, Path};

const MAX_SEGMENT_LEN: usize = 80;

/// Extensions accepted as post files.
pub const POST_EXTENSIONS: &[&str] = &["md", "mdx"];

/// Slugify a single path segment or title.
///
/// - Lowercases ASCII letters
/// - Replaces every other non-alphanumeric character with a dash
/// - Collapses consecutive dashes and strips leading and trailing ones
/// - Truncates to `MAX_SEGMENT_LEN` characters, breaking at the last dash
///   before the limit when there is one
pub fn slugify(segment: &str) -> String {
    let mut slug = String::with_capacity(segment.len());
    let mut prev_dash = true;
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');

    if slug.len() <= MAX_SEGMENT_LEN {
        return slug.to_string();
    }
    let truncated = &slug[..MAX_SEGMENT_LEN];
    match truncated.rfind('-') {
        Some(pos) if pos > 0 => truncated[..pos].to_string(),
        _ => truncated.to_string(),
    }
}

/// Whether `path` has one of the [`POST_EXTENSIONS`].
pub fn is_post_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| POST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Slug for a post file, given its path relative to the posts directory.
///
/// Returns `None` when any segment slugifies to nothing.
pub fn slug_from_path(relative: &Path) -> Option<String> {
    let without_ext = relative.with_extension("");
    let mut segments = Vec::new();
    for component in without_ext.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        let slug = slugify(&part.to_string_lossy());
        if slug.is_empty() {
            return None;
        }
        segments.push(slug);
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
