//! Memoizing content source.
//!
//! A single build asks for the same publication, issue list or post many
//! times (every issue page needs its publication, every publication page its
//! posts). Against the CMS each of those is an HTTP round trip.
//! [`CachedSource`] wraps any [`ContentSource`] and remembers successful
//! answers for the life of the wrapper.
//!
//! # Design
//!
//! The wrapper is explicit and injectable: nothing is cached unless the
//! caller wraps its source, and [`CachedSource::clear`] drops everything.
//!
//! ## Cache keys
//!
//! | Lookup                                 | Key                        |
//! |----------------------------------------|----------------------------|
//! | `publication`                          | publication id             |
//! | `issue`, `posts_for_issue`             | `"{publication}:{issue}"`  |
//! | `issues_for_publication`, `posts_by_publication`, `latest_locked_issue_for_publication` | publication id |
//! | `post_by_slug` (published only)        | slug                       |
//! | `latest_posts`, `latest_issues`        | limit                      |
//! | `publications`, `featured_publications` | (single entry)            |
//!
//! Misses (`None`) are cached like hits. Errors are not cached, so a failed
//! request is retried on the next lookup. Draft lookups always go to the
//! wrapped source.
//!
//! ## Concurrency
//!
//! Each table sits behind its own mutex, which is never held while the
//! wrapped source is queried. Two threads missing the same key at once both
//! fetch; the second insert wins.

use crate::source::{ContentSource, PostQuery, SourceError};
use crate::types::{Issue, Post, Publication, issue_key};
use log::trace;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} fetched ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} fetched", self.misses)
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One memo table.
struct Memo<V> {
    name: &'static str,
    entries: Mutex<HashMap<String, V>>,
}

impl<V: Clone> Memo<V> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get_or_fetch(
        &self,
        key: String,
        stats: &Mutex<CacheStats>,
        fetch: impl FnOnce() -> Result<V, SourceError>,
    ) -> Result<V, SourceError> {
        if let Some(value) = lock(&self.entries).get(&key) {
            trace!("cache hit: {} {key}", self.name);
            lock(stats).hit();
            return Ok(value.clone());
        }
        lock(stats).miss();
        let value = fetch()?;
        lock(&self.entries).insert(key, value.clone());
        Ok(value)
    }

    fn clear(&self) {
        lock(&self.entries).clear();
    }
}

/// A [`ContentSource`] that memoizes the source it wraps.
pub struct CachedSource {
    inner: Box<dyn ContentSource>,
    stats: Mutex<CacheStats>,
    publication_lists: Memo<Vec<Publication>>,
    publication: Memo<Option<Publication>>,
    issue: Memo<Option<Issue>>,
    issue_lists: Memo<Vec<Issue>>,
    post_lists: Memo<Vec<Post>>,
    post: Memo<Option<Post>>,
}

impl CachedSource {
    pub fn new(inner: Box<dyn ContentSource>) -> Self {
        Self {
            inner,
            stats: Mutex::new(CacheStats::default()),
            publication_lists: Memo::new("publications"),
            publication: Memo::new("publication"),
            issue: Memo::new("issue"),
            issue_lists: Memo::new("issues"),
            post_lists: Memo::new("posts"),
            post: Memo::new("post"),
        }
    }

    /// Forget everything and reset the statistics.
    pub fn clear(&self) {
        self.publication_lists.clear();
        self.publication.clear();
        self.issue.clear();
        self.issue_lists.clear();
        self.post_lists.clear();
        self.post.clear();
        *lock(&self.stats) = CacheStats::default();
    }

    pub fn stats(&self) -> CacheStats {
        *lock(&self.stats)
    }
}

impl ContentSource for CachedSource {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn publications(&self) -> Result<Vec<Publication>, SourceError> {
        self.publication_lists
            .get_or_fetch("all".into(), &self.stats, || self.inner.publications())
    }

    fn featured_publications(&self) -> Result<Vec<Publication>, SourceError> {
        self.publication_lists.get_or_fetch("featured".into(), &self.stats, || {
            self.inner.featured_publications()
        })
    }

    fn publication(&self, id: &str) -> Result<Option<Publication>, SourceError> {
        self.publication
            .get_or_fetch(id.into(), &self.stats, || self.inner.publication(id))
    }

    fn issue(
        &self,
        publication_id: &str,
        issue_slug: &str,
    ) -> Result<Option<Issue>, SourceError> {
        self.issue.get_or_fetch(
            format!("issue:{}", issue_key(publication_id, issue_slug)),
            &self.stats,
            || self.inner.issue(publication_id, issue_slug),
        )
    }

    fn issues_for_publication(&self, publication_id: &str) -> Result<Vec<Issue>, SourceError> {
        self.issue_lists
            .get_or_fetch(format!("pub:{publication_id}"), &self.stats, || {
                self.inner.issues_for_publication(publication_id)
            })
    }

    fn latest_locked_issue_for_publication(
        &self,
        publication_id: &str,
    ) -> Result<Option<Issue>, SourceError> {
        self.issue
            .get_or_fetch(format!("locked:{publication_id}"), &self.stats, || {
                self.inner.latest_locked_issue_for_publication(publication_id)
            })
    }

    fn latest_issues(&self, limit: usize) -> Result<Vec<Issue>, SourceError> {
        self.issue_lists
            .get_or_fetch(format!("latest:{limit}"), &self.stats, || {
                self.inner.latest_issues(limit)
            })
    }

    fn posts_for_issue(
        &self,
        publication_id: &str,
        issue_slug: &str,
    ) -> Result<Vec<Post>, SourceError> {
        self.post_lists.get_or_fetch(
            format!("issue:{}", issue_key(publication_id, issue_slug)),
            &self.stats,
            || self.inner.posts_for_issue(publication_id, issue_slug),
        )
    }

    fn posts_by_publication(&self, publication_id: &str) -> Result<Vec<Post>, SourceError> {
        self.post_lists
            .get_or_fetch(format!("pub:{publication_id}"), &self.stats, || {
                self.inner.posts_by_publication(publication_id)
            })
    }

    fn latest_posts(&self, limit: usize) -> Result<Vec<Post>, SourceError> {
        self.post_lists
            .get_or_fetch(format!("latest:{limit}"), &self.stats, || {
                self.inner.latest_posts(limit)
            })
    }

    fn post_by_slug(&self, slug: &str, query: PostQuery) -> Result<Option<Post>, SourceError> {
        if query.include_draft {
            return self.inner.post_by_slug(slug, query);
        }
        self.post
            .get_or_fetch(slug.into(), &self.stats, || self.inner.post_by_slug(slug, query))
    }
}
