//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (publication, issue, post) is its semantic identity:
//! positional index and title. Ids, slugs and output paths are secondary
//! context on indented lines or after an arrow. The output reads as a content
//! inventory while still letting users trace data back to records.
//!
//! # Entity Display Contract
//!
//! Every entity follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + title (+ optional detail like a count)
//! 2. **Context lines**: indented `Id:`, `Cover:`, `Posts:` and so on
//!
//! [`entity_header`] enforces this so `check`, `lineup` and `build` look
//! consistent for the same entities.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Publications
//! 001 Field Guide (1 issue, 1 post)
//!     Id: field-guide
//!     001 First Light (locked)
//!         Cover: classic, 1 block
//!         Posts: 1
//! 002 Ops Quarterly (2 issues, 6 posts) [featured]
//!     Id: ops-quarterly
//!     001 Summer 2024 (open)
//!         Cover: bulletin, 2 blocks
//!         Posts: 1
//!
//! Latest issues
//!     001 First Light
//!     002 Spring 2024: Quiet Pagers
//! ```
//!
//! ## Lineup
//!
//! ```text
//! Spring 2024: Quiet Pagers (ops-quarterly:2024-spring)
//! Cover lines
//!     001 Drill your runbooks before they drill you
//!     002 Plus: editor dispatch
//! Lead
//!     Pager fatigue is a design bug
//!         Slug: pager-fatigue
//! Secondary
//!     001 Drill your runbooks before they drill you
//!         Slug: runbook-drills
//! Briefs
//!     001 Quick hits from the on-call channel
//!         Slug: quick-hits
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Ops Quarterly → publications/ops-quarterly/index.html
//!     Issue Spring 2024 → publications/ops-quarterly/issues/2024-spring/index.html
//!     Post Pager fatigue is a design bug → posts/pager-fatigue/index.html
//!
//! Generated 2 publications, 3 issues, 7 posts, 3 feeds
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::{BuildSummary, PageKind, SiteSnapshot};
use crate::lineup::Lineup;
use crate::types::{Issue, IssueStatus, Post};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 issue`, `2 issues`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 Ops Quarterly (2 issues, 6 posts)
/// 001 Spring 2024
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn issue_title(issue: &Issue) -> &str {
    if issue.display_title.trim().is_empty() {
        &issue.issue_slug
    } else {
        &issue.display_title
    }
}

fn status_word(status: IssueStatus) -> &'static str {
    match status {
        IssueStatus::Open => "open",
        IssueStatus::Locked => "locked",
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the content inventory shown by `check`.
pub fn format_check_output(snapshot: &SiteSnapshot) -> Vec<String> {
    let mut lines = vec!["Publications".to_string()];

    if snapshot.editions.is_empty() {
        lines.push("    (none)".to_string());
    }

    for (i, edition) in snapshot.editions.iter().enumerate() {
        let publication = &edition.publication;
        let detail = format!(
            "{}, {}",
            plural(edition.issues.len(), "issue"),
            plural(edition.posts.len(), "post")
        );
        let mut header = entity_header(i + 1, &publication.name, Some(&detail));
        if publication.is_featured {
            header.push_str(" [featured]");
        }
        lines.push(header);
        lines.push(format!("{}Id: {}", indent(1), publication.id));
        if !publication.description.is_empty() {
            lines.push(format!(
                "{}{}",
                indent(1),
                truncate_desc(publication.description.trim(), 60)
            ));
        }

        for (j, content) in edition.issues.iter().enumerate() {
            let issue = &content.issue;
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(j + 1, issue_title(issue), Some(status_word(issue.status)))
            ));
            let spec = &issue.cover_spec;
            lines.push(format!(
                "{}Cover: {}, {}",
                indent(2),
                spec.template,
                plural(spec.blocks.len(), "block")
            ));
            lines.push(format!("{}Posts: {}", indent(2), content.posts.len()));
        }
    }

    if !snapshot.latest_issues.is_empty() {
        lines.push(String::new());
        lines.push("Latest issues".to_string());
        for (i, issue) in snapshot.latest_issues.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(i + 1, issue_title(issue), None)
            ));
        }
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(snapshot: &SiteSnapshot) {
    for line in format_check_output(snapshot) {
        println!("{}", line);
    }
}

// ============================================================================
// Lineup
// ============================================================================

fn post_lines(lines: &mut Vec<String>, index: Option<usize>, post: &Post) {
    let header = match index {
        Some(i) => entity_header(i, &post.data.headline, None),
        None => post.data.headline.clone(),
    };
    lines.push(format!("{}{}", indent(1), header));
    lines.push(format!("{}Slug: {}", indent(2), post.slug));
}

/// Format an issue's cover lines and lineup.
pub fn format_lineup_output(issue: &Issue, lineup: &Lineup, cover_lines: &[String]) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", issue_title(issue), issue.key())];

    lines.push("Cover lines".to_string());
    for (i, line) in cover_lines.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), line));
    }

    lines.push("Lead".to_string());
    match lineup.lead {
        Some(post) => post_lines(&mut lines, None, post),
        None => lines.push(format!("{}(none)", indent(1))),
    }

    if !lineup.secondary.is_empty() {
        lines.push("Secondary".to_string());
        for (i, post) in lineup.secondary.iter().enumerate() {
            post_lines(&mut lines, Some(i + 1), post);
        }
    }

    if !lineup.briefs.is_empty() {
        lines.push("Briefs".to_string());
        for (i, post) in lineup.briefs.iter().enumerate() {
            post_lines(&mut lines, Some(i + 1), post);
        }
    }

    lines
}

/// Print lineup output to stdout.
pub fn print_lineup_output(issue: &Issue, lineup: &Lineup, cover_lines: &[String]) {
    for line in format_lineup_output(issue, lineup, cover_lines) {
        println!("{}", line);
    }
}

// ============================================================================
// Post
// ============================================================================

/// Format a single post's record, as shown by `post`.
pub fn format_post_output(post: &Post) -> Vec<String> {
    let data = &post.data;
    let mut lines = vec![data.headline.clone()];
    lines.push(format!("{}Slug: {}", indent(1), post.slug));
    lines.push(format!("{}Publication: {}", indent(1), data.publication_id));
    if let Some(issue_slug) = &data.issue_slug {
        lines.push(format!("{}Issue: {}", indent(1), issue_slug));
    }
    lines.push(format!("{}Format: {}", indent(1), data.format.label()));
    lines.push(format!("{}Published: {}", indent(1), data.published_at));
    lines.push(format!(
        "{}Reading time: {} min",
        indent(1),
        post.reading_time_minutes
    ));
    if data.draft {
        lines.push(format!("{}Draft: yes", indent(1)));
    }
    if !data.summary.is_empty() {
        lines.push(format!("{}{}", indent(1), truncate_desc(data.summary.trim(), 60)));
    }
    lines
}

/// Print post output to stdout.
pub fn print_post_output(post: &Post) {
    for line in format_post_output(post) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format build output: every written page, then totals.
///
/// Information-first: each entity leads with its title, followed by `→` and
/// the output path. Issues and posts are indented under their publication.
pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let mut publication_index = 0;

    for page in &summary.pages {
        let line = match page.kind {
            PageKind::Home => format!("Home \u{2192} {}", page.path),
            PageKind::Publication => {
                publication_index += 1;
                format!(
                    "{} \u{2192} {}",
                    entity_header(publication_index, &page.title, None),
                    page.path
                )
            }
            PageKind::Issue => format!("{}Issue {} \u{2192} {}", indent(1), page.title, page.path),
            PageKind::Post => format!("{}Post {} \u{2192} {}", indent(1), page.title, page.path),
        };
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}, {}",
        plural(summary.count(PageKind::Publication), "publication"),
        plural(summary.count(PageKind::Issue), "issue"),
        plural(summary.count(PageKind::Post), "post"),
        plural(summary.feeds, "feed")
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}
