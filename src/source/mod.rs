//! Content sources.
//!
//! Every page is built from the same read-only queries regardless of where
//! content lives. [`ContentSource`] is that contract; two providers implement
//! it:
//!
//! | Provider                 | Reads from                                  |
//! |--------------------------|---------------------------------------------|
//! | [`local::LocalSource`]   | JSON and Markdown files under the content root |
//! | [`cms::CmsSource`]       | GROQ queries against the headless CMS       |
//!
//! [`from_config`] picks one at startup. Callers hold a
//! `Box<dyn ContentSource>` and never learn which one they got. Wrap it in
//! [`crate::cache::CachedSource`] to memoize repeated lookups.
//!
//! ## Shared semantics
//!
//! - Drafts never appear in listings. Only [`ContentSource::post_by_slug`] can
//!   return one, and only when asked to.
//! - Posts are ordered newest `publishedAt` first, issues newest `date` first.
//!   Equal timestamps keep provider order.
//! - Every issue carries a normalized cover spec.
//! - A missing entity is `Ok(None)`, not an error.

pub mod cms;
pub mod local;

use crate::config::SiteConfig;
use crate::frontmatter::FrontMatterError;
use crate::types::{Issue, Post, Publication};
use log::info;
use std::path::Path;
use thiserror::Error;

/// Home page post count when none is configured.
pub const DEFAULT_LATEST_POSTS: usize = 12;
/// Home page issue count when none is configured.
pub const DEFAULT_LATEST_ISSUES: usize = 6;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Front matter error in {path}: {source}")]
    Yaml {
        path: String,
        source: FrontMatterError,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CMS error: {0}")]
    Cms(String),
    #[error("Invalid record {path}: {message}")]
    InvalidRecord { path: String, message: String },
}

/// Options for [`ContentSource::post_by_slug`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Return the post even if it is a draft.
    pub include_draft: bool,
}

/// Read-only access to publications, issues and posts.
pub trait ContentSource: Send + Sync {
    /// Short provider name for logs and CLI output.
    fn name(&self) -> &'static str;

    fn publications(&self) -> Result<Vec<Publication>, SourceError>;
    fn featured_publications(&self) -> Result<Vec<Publication>, SourceError>;
    fn publication(&self, id: &str) -> Result<Option<Publication>, SourceError>;

    fn issue(&self, publication_id: &str, issue_slug: &str)
    -> Result<Option<Issue>, SourceError>;
    /// All issues of a publication, newest first.
    fn issues_for_publication(&self, publication_id: &str) -> Result<Vec<Issue>, SourceError>;
    /// The newest locked issue of a publication.
    fn latest_locked_issue_for_publication(
        &self,
        publication_id: &str,
    ) -> Result<Option<Issue>, SourceError>;
    /// Locked issues across all publications, newest first.
    fn latest_issues(&self, limit: usize) -> Result<Vec<Issue>, SourceError>;

    /// Non-draft posts filed under an issue, newest first.
    fn posts_for_issue(
        &self,
        publication_id: &str,
        issue_slug: &str,
    ) -> Result<Vec<Post>, SourceError>;
    /// Non-draft posts of a publication, newest first.
    fn posts_by_publication(&self, publication_id: &str) -> Result<Vec<Post>, SourceError>;
    /// Non-draft posts across all publications, newest first.
    fn latest_posts(&self, limit: usize) -> Result<Vec<Post>, SourceError>;
    fn post_by_slug(&self, slug: &str, query: PostQuery) -> Result<Option<Post>, SourceError>;
}

/// Choose the content source for this run.
///
/// The CMS is used when `cms.enabled` is set and both `cms.project_id` and
/// `cms.dataset` are present (after environment overrides); otherwise content
/// is read from `content_root`.
pub fn from_config(
    config: &SiteConfig,
    content_root: &Path,
) -> Result<Box<dyn ContentSource>, SourceError> {
    if let Some((project_id, dataset)) = config.cms.target() {
        info!("content source: CMS project {project_id}, dataset {dataset}");
        let source = cms::CmsSource::from_config(&config.cms, project_id, dataset)?;
        return Ok(Box::new(source));
    }
    if config.cms.enabled {
        info!("CMS enabled but project id or dataset missing; using local files");
    }
    info!("content source: local files in {}", content_root.display());
    Ok(Box::new(local::LocalSource::load(content_root)?))
}

/// Newest `publishedAt` first; stable for equal timestamps.
pub(crate) fn sort_posts_newest_first(posts: &mut [Post]) {
    posts.sort_by_key(|p| std::cmp::Reverse(p.published_time()));
}

/// Newest `date` first; stable for equal dates.
pub(crate) fn sort_issues_newest_first(issues: &mut [Issue]) {
    issues.sort_by_key(|i| std::cmp::Reverse(i.date_time()));
}
