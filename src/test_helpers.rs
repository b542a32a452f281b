//! Shared test utilities for the stackbound test suite.
//!
//! Provides the fixture content tree, terse builders for records, and lookup
//! helpers that panic with a useful message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let source = LocalSource::load(tmp.path()).unwrap();
//!
//! let posts = vec![
//!     post("lead").format(PostFormat::Feature).at("2024-03-01").build(),
//!     post("brief").format(PostFormat::Brief).build(),
//! ];
//! let lineup = build_issue_lineup(&posts, &issue("ops", "spring"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::cover::CoverSpec;
use crate::types::{
    CoverSlot, Difficulty, Issue, IssueStatus, Post, PostBody, PostData, PostFormat, Publication,
};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Record builders
// =========================================================================

/// A publication with no sections, not featured.
pub fn publication(id: &str) -> Publication {
    Publication {
        id: id.to_string(),
        name: format!("{id} magazine"),
        description: String::new(),
        accent: "#c2410c".to_string(),
        display_font: "serif".to_string(),
        sections: Vec::new(),
        is_featured: false,
        default_cover_spec: None,
    }
}

/// An open issue dated 2024-01-01 with the fallback cover.
pub fn issue(publication_id: &str, issue_slug: &str) -> Issue {
    Issue {
        publication_id: publication_id.to_string(),
        issue_slug: issue_slug.to_string(),
        display_title: issue_slug.to_string(),
        volume: 1,
        number: 1,
        date: "2024-01-01".to_string(),
        theme: String::new(),
        status: IssueStatus::Open,
        notes_from_editor: None,
        cover_overrides: None,
        cover_lines: Vec::new(),
        price: None,
        cover_status_label: None,
        cover_image: None,
        cover_spec: CoverSpec::fallback(issue_slug),
    }
}

/// Start building a post. Defaults: publication `ops`, no issue, a column
/// published 2024-01-01 whose headline is the slug.
pub fn post(slug: &str) -> PostBuilder {
    PostBuilder {
        slug: slug.to_string(),
        data: PostData {
            publication_id: "ops".to_string(),
            issue_slug: None,
            section_id: "dispatch".to_string(),
            format: PostFormat::Column,
            difficulty: Difficulty::All,
            published_at: "2024-01-01".to_string(),
            updated_at: None,
            headline: slug.to_string(),
            dek: String::new(),
            summary: String::new(),
            tags: Vec::new(),
            draft: false,
            cover_slot: None,
            cover_priority: None,
            hero_image: None,
            hero_alt: None,
        },
        body: String::new(),
    }
}

pub struct PostBuilder {
    slug: String,
    data: PostData,
    body: String,
}

impl PostBuilder {
    pub fn format(mut self, format: PostFormat) -> Self {
        self.data.format = format;
        self
    }

    pub fn slot(mut self, slot: CoverSlot) -> Self {
        self.data.cover_slot = Some(slot);
        self
    }

    pub fn priority(mut self, priority: f64) -> Self {
        self.data.cover_priority = Some(priority);
        self
    }

    pub fn at(mut self, published_at: &str) -> Self {
        self.data.published_at = published_at.to_string();
        self
    }

    pub fn headline(mut self, headline: &str) -> Self {
        self.data.headline = headline.to_string();
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.data.summary = summary.to_string();
        self
    }

    pub fn issue(mut self, publication_id: &str, issue_slug: &str) -> Self {
        self.data.publication_id = publication_id.to_string();
        self.data.issue_slug = Some(issue_slug.to_string());
        self
    }

    pub fn draft(mut self) -> Self {
        self.data.draft = true;
        self
    }

    pub fn body(mut self, markdown: &str) -> Self {
        self.body = markdown.to_string();
        self
    }

    pub fn build(self) -> Post {
        Post::new(self.slug, self.data, PostBody::Markdown(self.body))
    }
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// All post slugs in order.
pub fn post_slugs(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.slug.as_str()).collect()
}

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(posts: &'a [Post], slug: &str) -> &'a Post {
    posts.iter().find(|p| p.slug == slug).unwrap_or_else(|| {
        panic!(
            "post '{slug}' not found. Available: {:?}",
            post_slugs(posts)
        )
    })
}

/// Read a generated file below `root`. Panics with the path if missing.
pub fn read_output(root: &Path, relative: &str) -> String {
    let path = root.join(relative);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("could not read {}: {e}", path.display()))
}
