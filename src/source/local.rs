//! Local file provider.
//!
//! Reads the whole content root once, at construction, into an immutable
//! in-memory snapshot:
//!
//! ```text
//! content/
//! ├── publications/<id>.json     # one Publication per file
//! ├── issues/<anything>.json     # one issue per file
//! └── posts/**/<slug>.md         # YAML front matter + Markdown (.md or .mdx)
//! ```
//!
//! Post slugs come from the path below `posts/` (see [`crate::naming`]).
//! Issues are normalized against their publication's default cover spec
//! while loading. Any malformed file fails the load with an error naming it;
//! missing directories are simply empty collections.

use super::{
    ContentSource, PostQuery, SourceError, sort_issues_newest_first, sort_posts_newest_first,
};
use crate::frontmatter;
use crate::naming::{is_post_file, slug_from_path};
use crate::types::{Issue, IssueRecord, Post, Publication, issue_key};
use log::debug;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const PUBLICATIONS_DIR: &str = "publications";
pub const ISSUES_DIR: &str = "issues";
pub const POSTS_DIR: &str = "posts";

#[derive(Debug)]
pub struct LocalSource {
    publications: Vec<Publication>,
    /// Newest first.
    issues: Vec<Issue>,
    /// Newest first, drafts included.
    posts: Vec<Post>,
}

impl LocalSource {
    /// Load every publication, issue and post below `root`.
    pub fn load(root: &Path) -> Result<Self, SourceError> {
        let publications = load_publications(&root.join(PUBLICATIONS_DIR))?;
        let issues = load_issues(&root.join(ISSUES_DIR), &publications)?;
        let posts = load_posts(&root.join(POSTS_DIR))?;
        debug!(
            "loaded {} publications, {} issues, {} posts from {}",
            publications.len(),
            issues.len(),
            posts.len(),
            root.display()
        );
        Ok(Self::from_parts(publications, issues, posts))
    }

    /// Build a source from records already in memory.
    pub fn from_parts(publications: Vec<Publication>, mut issues: Vec<Issue>, mut posts: Vec<Post>) -> Self {
        sort_issues_newest_first(&mut issues);
        sort_posts_newest_first(&mut posts);
        Self {
            publications,
            issues,
            posts,
        }
    }

    fn published(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.data.draft)
    }
}

impl ContentSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    fn publications(&self) -> Result<Vec<Publication>, SourceError> {
        Ok(self.publications.clone())
    }

    fn featured_publications(&self) -> Result<Vec<Publication>, SourceError> {
        Ok(self
            .publications
            .iter()
            .filter(|p| p.is_featured)
            .cloned()
            .collect())
    }

    fn publication(&self, id: &str) -> Result<Option<Publication>, SourceError> {
        Ok(self.publications.iter().find(|p| p.id == id).cloned())
    }

    fn issue(
        &self,
        publication_id: &str,
        issue_slug: &str,
    ) -> Result<Option<Issue>, SourceError> {
        Ok(self
            .issues
            .iter()
            .find(|i| i.publication_id == publication_id && i.issue_slug == issue_slug)
            .cloned())
    }

    fn issues_for_publication(&self, publication_id: &str) -> Result<Vec<Issue>, SourceError> {
        Ok(self
            .issues
            .iter()
            .filter(|i| i.publication_id == publication_id)
            .cloned()
            .collect())
    }

    fn latest_locked_issue_for_publication(
        &self,
        publication_id: &str,
    ) -> Result<Option<Issue>, SourceError> {
        Ok(self
            .issues
            .iter()
            .find(|i| i.publication_id == publication_id && i.is_locked())
            .cloned())
    }

    fn latest_issues(&self, limit: usize) -> Result<Vec<Issue>, SourceError> {
        Ok(self
            .issues
            .iter()
            .filter(|i| i.is_locked())
            .take(limit)
            .cloned()
            .collect())
    }

    fn posts_for_issue(
        &self,
        publication_id: &str,
        issue_slug: &str,
    ) -> Result<Vec<Post>, SourceError> {
        Ok(self
            .published()
            .filter(|p| p.belongs_to_issue(publication_id, issue_slug))
            .cloned()
            .collect())
    }

    fn posts_by_publication(&self, publication_id: &str) -> Result<Vec<Post>, SourceError> {
        Ok(self
            .published()
            .filter(|p| p.data.publication_id == publication_id)
            .cloned()
            .collect())
    }

    fn latest_posts(&self, limit: usize) -> Result<Vec<Post>, SourceError> {
        Ok(self.published().take(limit).cloned().collect())
    }

    fn post_by_slug(&self, slug: &str, query: PostQuery) -> Result<Option<Post>, SourceError> {
        Ok(self
            .posts
            .iter()
            .find(|p| p.slug == slug && (query.include_draft || !p.data.draft))
            .cloned())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// `*.json` files directly inside `dir`, sorted by name. A missing directory
/// is empty.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| SourceError::InvalidRecord {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn load_publications(dir: &Path) -> Result<Vec<Publication>, SourceError> {
    let mut publications: Vec<Publication> = Vec::new();
    for path in json_files(dir)? {
        let publication: Publication = read_json(&path)?;
        if publications.iter().any(|p| p.id == publication.id) {
            return Err(SourceError::InvalidRecord {
                path: path.display().to_string(),
                message: format!("duplicate publication id {:?}", publication.id),
            });
        }
        publications.push(publication);
    }
    Ok(publications)
}

fn load_issues(dir: &Path, publications: &[Publication]) -> Result<Vec<Issue>, SourceError> {
    let defaults: HashMap<&str, &serde_json::Value> = publications
        .iter()
        .filter_map(|p| p.default_cover_spec.as_ref().map(|d| (p.id.as_str(), d)))
        .collect();

    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for path in json_files(dir)? {
        let record: IssueRecord = read_json(&path)?;
        let key = issue_key(&record.publication_id, &record.issue_slug);
        if !seen.insert(key.clone()) {
            return Err(SourceError::InvalidRecord {
                path: path.display().to_string(),
                message: format!("duplicate issue {key}"),
            });
        }
        let default = defaults.get(record.publication_id.as_str()).copied();
        issues.push(Issue::from_record(record, default));
    }
    Ok(issues)
}

fn load_posts(dir: &Path) -> Result<Vec<Post>, SourceError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut seen = HashSet::new();
    let mut posts = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_post_file(path) {
            continue;
        }
        let display = path.display().to_string();
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let slug = slug_from_path(relative).ok_or_else(|| SourceError::InvalidRecord {
            path: display.clone(),
            message: "file name does not produce a slug".into(),
        })?;
        if !seen.insert(slug.clone()) {
            return Err(SourceError::InvalidRecord {
                path: display,
                message: format!("duplicate post slug {slug:?}"),
            });
        }
        let content = fs::read_to_string(path)?;
        let post = frontmatter::parse_post(&slug, &content).map_err(|source| {
            SourceError::Yaml {
                path: display.clone(),
                source,
            }
        })?;
        posts.push(post);
    }
    Ok(posts)
}
