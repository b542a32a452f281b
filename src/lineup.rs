//! Issue lineups and cover lines.
//!
//! A lineup partitions an issue's posts into one lead, up to four secondary
//! stories and the remaining briefs. Editors steer it in three ways, strongest
//! first:
//!
//! 1. **Overrides** on the issue (`coverOverrides.leadPostSlug`,
//!    `coverOverrides.secondaryPostSlugs`) pin specific posts.
//! 2. **Slots** on posts (`coverSlot`, ranked by `coverPriority`) nominate
//!    candidates.
//! 3. **Format and recency**: features lead, newer posts come first.
//!
//! Everything here is a pure function of its input. Ties fall back to the
//! order of the (deduplicated) input slice, so callers that pass posts in a
//! stable order get stable lineups.

use crate::types::{CoverSlot, Issue, Post, PostFormat};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// At most this many secondary stories appear on a cover.
pub const MAX_SECONDARY: usize = 4;
/// Default number of lines on a cover.
pub const DEFAULT_MAX_COVER_LINES: usize = 6;

const FILLER_INSIDE: &str = "Inside: field notes and tools";
const FILLER_DISPATCH: &str = "Plus: editor dispatch";

/// The lead/secondary/brief partition of an issue's posts.
///
/// A post appears in at most one of the three groups. `lead` is `None` only
/// for an issue without posts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Lineup<'a> {
    pub lead: Option<&'a Post>,
    pub secondary: Vec<&'a Post>,
    pub briefs: Vec<&'a Post>,
}

impl Lineup<'_> {
    /// Slugs in reading order: lead, secondary, briefs.
    pub fn slugs(&self) -> Vec<&str> {
        self.lead
            .iter()
            .chain(self.secondary.iter())
            .chain(self.briefs.iter())
            .map(|p| p.slug.as_str())
            .collect()
    }
}

/// Partition `posts` into a lineup for `issue`.
///
/// `posts` should be the issue's non-draft posts; no membership filtering
/// happens here. Duplicate slugs keep their first occurrence.
pub fn build_issue_lineup<'a>(posts: &'a [Post], issue: &Issue) -> Lineup<'a> {
    let posts = dedupe_by_slug(posts);
    let overrides = issue.cover_overrides.as_ref();

    let lead = overrides
        .and_then(|o| o.lead_post_slug.as_deref())
        .and_then(|slug| find_slug(&posts, slug))
        .or_else(|| select_lead(&posts));
    let lead_slug = lead.map(|p| p.slug.as_str());
    let is_lead = |p: &Post| Some(p.slug.as_str()) == lead_slug;

    let mut secondary = overrides
        .map(|o| resolve_pinned(&posts, &o.secondary_post_slugs, lead_slug))
        .unwrap_or_default();

    if secondary.is_empty() {
        let mut slotted: Vec<&Post> = posts
            .iter()
            .copied()
            .filter(|p| p.data.cover_slot == Some(CoverSlot::Secondary) && !is_lead(p))
            .collect();
        slotted.sort_by(by_priority_then_recency);

        secondary = if slotted.is_empty() {
            let mut rest: Vec<&Post> = posts
                .iter()
                .copied()
                .filter(|p| !p.is_brief() && !is_lead(p))
                .collect();
            rest.sort_by(by_recency);
            rest
        } else {
            slotted
        };
        secondary.truncate(MAX_SECONDARY);
    }

    let taken: HashSet<&str> = secondary.iter().map(|p| p.slug.as_str()).collect();
    let mut briefs: Vec<&Post> = posts
        .iter()
        .copied()
        .filter(|p| p.is_brief() && !is_lead(p) && !taken.contains(p.slug.as_str()))
        .collect();
    briefs.sort_by(by_recency);

    Lineup {
        lead,
        secondary,
        briefs,
    }
}

/// Lead selection without overrides: slotted lead, then feature, then any
/// non-brief, then anything at all.
fn select_lead<'a>(posts: &[&'a Post]) -> Option<&'a Post> {
    let slotted = posts
        .iter()
        .copied()
        .filter(|p| p.data.cover_slot == Some(CoverSlot::Lead));
    if let Some(lead) = first_by(slotted, by_priority_then_recency) {
        return Some(lead);
    }

    let features = posts
        .iter()
        .copied()
        .filter(|p| p.data.format == PostFormat::Feature);
    if let Some(lead) = first_by(features, by_recency) {
        return Some(lead);
    }

    let non_briefs = posts.iter().copied().filter(|p| !p.is_brief());
    first_by(non_briefs, by_recency).or_else(|| first_by(posts.iter().copied(), by_recency))
}

/// Resolve pinned secondary slugs: unknown and lead slugs are skipped,
/// repeats collapse, at most [`MAX_SECONDARY`] survive.
fn resolve_pinned<'a>(
    posts: &[&'a Post],
    slugs: &[String],
    lead_slug: Option<&str>,
) -> Vec<&'a Post> {
    let mut seen = HashSet::new();
    slugs
        .iter()
        .filter(|slug| Some(slug.as_str()) != lead_slug)
        .filter_map(|slug| find_slug(posts, slug))
        .filter(|p| seen.insert(p.slug.as_str()))
        .take(MAX_SECONDARY)
        .collect()
}

/// Headlines for a cover, best first, padded with stock lines.
///
/// Non-brief headlines come first (by priority, then recency); briefs only
/// fill in when fewer than three lines exist. Blank and repeated headlines
/// are skipped. The result never exceeds `max` lines.
pub fn cover_lines_from_posts(posts: &[Post], max: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    let mut primaries: Vec<&Post> = posts.iter().filter(|p| !p.is_brief()).collect();
    primaries.sort_by(by_priority_then_recency);
    for post in primaries {
        push_line(&mut lines, &post.data.headline);
    }

    if lines.len() < 3 {
        let mut briefs: Vec<&Post> = posts.iter().filter(|p| p.is_brief()).collect();
        briefs.sort_by(by_recency);
        for post in briefs {
            push_line(&mut lines, &post.data.headline);
        }
    }
    if lines.len() < 3 {
        lines.push(FILLER_INSIDE.to_string());
    }
    if lines.len() < 4 {
        lines.push(FILLER_DISPATCH.to_string());
    }

    lines.truncate(max);
    lines
}

/// Cover lines for an issue: hand-written lines win over derived ones.
pub fn issue_cover_lines(issue: &Issue, posts: &[Post], max: usize) -> Vec<String> {
    let mut manual: Vec<String> = Vec::new();
    for line in issue.cover_lines.iter().map(|l| l.trim()) {
        if !line.is_empty() && !manual.iter().any(|m| m == line) {
            manual.push(line.to_string());
        }
    }
    if manual.is_empty() {
        return cover_lines_from_posts(posts, max);
    }
    manual.truncate(max);
    manual
}

fn push_line(lines: &mut Vec<String>, headline: &str) {
    if !headline.trim().is_empty() && !lines.iter().any(|l| l == headline) {
        lines.push(headline.to_string());
    }
}

fn dedupe_by_slug(posts: &[Post]) -> Vec<&Post> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter(|p| seen.insert(p.slug.as_str()))
        .collect()
}

fn find_slug<'a>(posts: &[&'a Post], slug: &str) -> Option<&'a Post> {
    posts.iter().copied().find(|p| p.slug == slug)
}

/// The first element in `ordering`, keeping the earliest on ties.
fn first_by<'a>(
    posts: impl Iterator<Item = &'a Post>,
    ordering: fn(&&'a Post, &&'a Post) -> Ordering,
) -> Option<&'a Post> {
    posts.fold(None, |best, post| match best {
        Some(b) if ordering(&post, &b) != Ordering::Less => Some(b),
        _ => Some(post),
    })
}

/// Newest first.
fn by_recency(a: &&Post, b: &&Post) -> Ordering {
    b.published_time().cmp(&a.published_time())
}

/// Highest `coverPriority` first, then newest.
fn by_priority_then_recency(a: &&Post, b: &&Post) -> Ordering {
    b.priority()
        .total_cmp(&a.priority())
        .then_with(|| by_recency(a, b))
}
