//! # Stackbound
//!
//! A static magazine generator. Publications publish numbered issues; each
//! issue has a declarative cover and a lineup of posts. Content comes either
//! from a directory of JSON and Markdown files or from a headless CMS, and is
//! rendered to plain HTML plus RSS feeds.
//!
//! # Architecture: Source → Snapshot → Site
//!
//! ```text
//! 1. Load      config.toml + env          →  SiteConfig
//! 2. Select    SiteConfig                 →  Box<dyn ContentSource> (local or CMS)
//! 3. Fetch     ContentSource              →  SiteSnapshot (immutable)
//! 4. Render    SiteSnapshot               →  dist/ (HTML in parallel, then feeds)
//! ```
//!
//! Everything the pages need is read in step 3, so rendering is a pure
//! function of the snapshot and runs on a rayon pool without locking.
//!
//! The editorial core is three total functions with no I/O:
//!
//! - [`cover::normalize_cover_spec`] turns loosely typed cover JSON into a
//!   renderable [`cover::CoverSpec`], degrading to a one-block fallback.
//! - [`lineup::build_issue_lineup`] picks the lead, secondary and brief posts
//!   of an issue.
//! - [`lineup::cover_lines_from_posts`] summarizes an issue into short cover
//!   lines.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, stock defaults, env overrides, validation, CSS color generation |
//! | [`types`] | Canonical records: `Publication`, `Issue`, `Post` and their enums |
//! | [`cover`] | Cover spec model and normalization |
//! | [`lineup`] | Issue lineup builder and cover line summarizer |
//! | [`source`] | The `ContentSource` trait, source selection, local and CMS providers |
//! | [`cache`] | `CachedSource`, a memoizing wrapper around any source |
//! | [`frontmatter`] | YAML front matter splitting and parsing for Markdown posts |
//! | [`naming`] | Slugs from post file paths |
//! | [`portable_text`] | CMS rich text to HTML and plain text |
//! | [`generate`] | Snapshot fetch and HTML rendering with Maud |
//! | [`feed`] | RSS 2.0 feeds for the site and each publication |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## One Contract, Two Providers
//!
//! Pages never know where content lives. [`source::ContentSource`] is the only
//! way in; [`source::from_config`] picks the provider once at startup and
//! hands back a boxed trait object. Drafts, ordering and cover normalization
//! behave the same in both providers.
//!
//! ## Covers Are Data
//!
//! A cover is a CSS grid declared in JSON: named areas plus typed blocks
//! (masthead, title, feature list, sticker and so on). [`cover::CoverBlock`]
//! is a closed enum and the renderer matches it exhaustively, so adding a
//! block type is a compile error until every consumer handles it.
//!
//! ## Maud for HTML and XML
//!
//! Pages and feeds are built with [Maud](https://maud.lambda.xyz/). All
//! interpolation is escaped; only rendered Markdown and the stylesheet go in
//! as `PreEscaped`.
//!
//! ## Memoization Is Explicit
//!
//! Repeated lookups are cached by wrapping a source in
//! [`cache::CachedSource`], which has a `clear()` and reports hit counts.
//! There is no global cache.

pub mod cache;
pub mod config;
pub mod cover;
pub mod feed;
pub mod frontmatter;
pub mod generate;
pub mod lineup;
pub mod naming;
pub mod output;
pub mod portable_text;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
