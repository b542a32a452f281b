//! HTML site generation.
//!
//! The last stage of a build. All content is read from the
//! [`ContentSource`] first into a [`SiteSnapshot`]; pages are then rendered
//! from that immutable snapshot in parallel and written to the output
//! directory, followed by the RSS feeds.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): featured publications with their latest locked
//!   cover, latest issues, latest posts
//! - **Publication pages** (`/publications/{id}/index.html`): every issue and
//!   every published post of one publication
//! - **Issue pages** (`/publications/{id}/issues/{slug}/index.html`): the
//!   rendered cover, cover lines, editor's notes and the lineup (lead,
//!   secondary, briefs)
//! - **Post pages** (`/posts/{slug}/index.html`): the article
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── rss.xml
//! ├── publications/
//! │   └── ops-quarterly/
//! │       ├── index.html
//! │       ├── rss.xml
//! │       └── issues/
//! │           └── 2024-spring/
//! │               └── index.html
//! └── posts/
//!     ├── pager-fatigue/
//!     │   └── index.html
//!     └── field-notes/
//!         └── night-shift/
//!             └── index.html
//! ```
//!
//! ## Covers
//!
//! A [`CoverSpec`] becomes a CSS grid: `layout.cols`, `layout.rows` and
//! `layout.areas` map to the `grid-template-*` properties, the theme to
//! `--cover-*` custom properties, and each visible block is placed with
//! `grid-area`. Every [`CoverBlock`] variant has its own markup.
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time and inlined into every
//! page, preceded by the color variables generated from `config.toml`.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping. Markdown
//! bodies go through pulldown-cmark, CMS bodies through
//! [`portable_text::to_html`].

use crate::config::{self, SiteConfig};
use crate::cover::{CoverBlock, CoverSpec};
use crate::feed::{self, FeedError};
use crate::lineup::{Lineup, build_issue_lineup, issue_cover_lines};
use crate::naming::slugify;
use crate::portable_text;
use crate::source::{ContentSource, SourceError};
use crate::types::{Issue, IssueStatus, Post, PostBody, Publication};
use chrono::DateTime;
use log::{debug, info};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("Unsafe output path for {0:?}")]
    UnsafePath(String),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Relative widths of the decorative barcode bars.
const BARCODE_BARS: [u8; 23] = [
    2, 1, 1, 3, 1, 2, 1, 1, 2, 3, 1, 1, 2, 1, 3, 1, 1, 2, 1, 2, 1, 3, 2,
];

// ============================================================================
// Snapshot
// ============================================================================

/// A featured publication and the cover it shows on the home page.
#[derive(Debug, Clone)]
pub struct Featured {
    pub publication: Publication,
    pub latest_locked: Option<Issue>,
}

/// An issue with the published posts filed under it.
#[derive(Debug, Clone)]
pub struct IssueContent {
    pub issue: Issue,
    pub posts: Vec<Post>,
}

/// Everything one publication contributes to the site.
#[derive(Debug, Clone)]
pub struct Edition {
    pub publication: Publication,
    /// Newest first.
    pub issues: Vec<IssueContent>,
    /// Published posts, newest first.
    pub posts: Vec<Post>,
}

impl Edition {
    fn issue(&self, issue_slug: &str) -> Option<&Issue> {
        self.issues
            .iter()
            .map(|c| &c.issue)
            .find(|i| i.issue_slug == issue_slug)
    }
}

/// All the content a build renders, read once from the source.
#[derive(Debug, Clone)]
pub struct SiteSnapshot {
    pub featured: Vec<Featured>,
    pub latest_issues: Vec<Issue>,
    pub latest_posts: Vec<Post>,
    pub editions: Vec<Edition>,
}

impl SiteSnapshot {
    pub fn fetch(source: &dyn ContentSource, config: &SiteConfig) -> Result<Self, SourceError> {
        let mut featured = Vec::new();
        for publication in source.featured_publications()? {
            let latest_locked = source.latest_locked_issue_for_publication(&publication.id)?;
            featured.push(Featured {
                publication,
                latest_locked,
            });
        }

        let mut editions = Vec::new();
        for publication in source.publications()? {
            let mut issues = Vec::new();
            for issue in source.issues_for_publication(&publication.id)? {
                let posts = source.posts_for_issue(&publication.id, &issue.issue_slug)?;
                issues.push(IssueContent { issue, posts });
            }
            let posts = source.posts_by_publication(&publication.id)?;
            editions.push(Edition {
                publication,
                issues,
                posts,
            });
        }

        Ok(Self {
            featured,
            latest_issues: source.latest_issues(config.listing.latest_issues)?,
            latest_posts: source.latest_posts(config.listing.latest_posts)?,
            editions,
        })
    }

    fn publication(&self, id: &str) -> Option<&Publication> {
        self.editions
            .iter()
            .map(|e| &e.publication)
            .find(|p| p.id == id)
    }
}

// ============================================================================
// Build
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Publication,
    Issue,
    Post,
}

/// One written page, for the build summary.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub kind: PageKind,
    pub title: String,
    /// Output path relative to the output directory, `/`-separated.
    pub path: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    /// In render order: home, then per publication its page, issues and posts.
    pub pages: Vec<GeneratedPage>,
    pub feeds: usize,
}

impl BuildSummary {
    pub fn count(&self, kind: PageKind) -> usize {
        self.pages.iter().filter(|p| p.kind == kind).count()
    }
}

enum PageJob<'a> {
    Home,
    Publication(&'a Edition),
    Issue(&'a Edition, &'a IssueContent),
    Post(&'a Edition, &'a Post),
}

struct RenderContext<'a> {
    config: &'a SiteConfig,
    snapshot: &'a SiteSnapshot,
    css: &'a str,
}

/// Build the whole site from `source` into `output_dir`.
pub fn generate(
    source: &dyn ContentSource,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<BuildSummary, GenerateError> {
    let snapshot = SiteSnapshot::fetch(source, config)?;
    info!(
        "rendering {} publications from {} source",
        snapshot.editions.len(),
        source.name()
    );

    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);
    let ctx = RenderContext {
        config,
        snapshot: &snapshot,
        css: &css,
    };

    fs::create_dir_all(output_dir)?;

    let mut jobs = vec![PageJob::Home];
    for edition in &snapshot.editions {
        jobs.push(PageJob::Publication(edition));
        jobs.extend(edition.issues.iter().map(|c| PageJob::Issue(edition, c)));
        jobs.extend(edition.posts.iter().map(|p| PageJob::Post(edition, p)));
    }

    let pages = jobs
        .par_iter()
        .map(|job| -> Result<GeneratedPage, GenerateError> {
            let (page, markup) = render_job(&ctx, job);
            let path = output_path(output_dir, &page.path)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, markup.into_string())?;
            debug!("wrote {}", page.path);
            Ok(page)
        })
        .collect::<Result<Vec<GeneratedPage>, GenerateError>>()?;

    let feeds = feed::write_feeds(source, config, output_dir)?;

    Ok(BuildSummary { pages, feeds })
}

fn render_job(ctx: &RenderContext, job: &PageJob) -> (GeneratedPage, Markup) {
    match job {
        PageJob::Home => (
            GeneratedPage {
                kind: PageKind::Home,
                title: ctx.config.title.clone(),
                path: "index.html".to_string(),
            },
            render_home(ctx),
        ),
        PageJob::Publication(edition) => (
            GeneratedPage {
                kind: PageKind::Publication,
                title: edition.publication.name.clone(),
                path: page_file(&publication_href(&edition.publication.id)),
            },
            render_publication_page(ctx, edition),
        ),
        PageJob::Issue(edition, content) => (
            GeneratedPage {
                kind: PageKind::Issue,
                title: issue_title(&content.issue).to_string(),
                path: page_file(&issue_href(&content.issue)),
            },
            render_issue_page(ctx, edition, content),
        ),
        PageJob::Post(edition, post) => (
            GeneratedPage {
                kind: PageKind::Post,
                title: post.data.headline.clone(),
                path: page_file(&post_href(&post.slug)),
            },
            render_post_page(ctx, edition, post),
        ),
    }
}

// ============================================================================
// URLs and paths
// ============================================================================

fn publication_href(id: &str) -> String {
    format!("/publications/{id}/")
}

fn issue_href(issue: &Issue) -> String {
    format!(
        "/publications/{}/issues/{}/",
        issue.publication_id, issue.issue_slug
    )
}

fn post_href(slug: &str) -> String {
    format!("/posts/{slug}/")
}

/// `/posts/a/` → `posts/a/index.html`.
fn page_file(href: &str) -> String {
    format!("{}index.html", href.trim_start_matches('/'))
}

/// Resolve a page path below `output_dir`, refusing anything that would
/// escape it. Slugs from the CMS are not slugified, so this is checked.
fn output_path(output_dir: &Path, relative: &str) -> Result<PathBuf, GenerateError> {
    let mut path = output_dir.to_path_buf();
    for segment in relative.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return Err(GenerateError::UnsafePath(relative.to_string()));
        }
        path.push(segment);
    }
    Ok(path)
}

// ============================================================================
// Formatting helpers
// ============================================================================

fn issue_title(issue: &Issue) -> &str {
    if issue.display_title.trim().is_empty() {
        &issue.issue_slug
    } else {
        &issue.display_title
    }
}

fn issue_status_label(issue: &Issue) -> &str {
    match (&issue.cover_status_label, issue.status) {
        (Some(label), _) if !label.trim().is_empty() => label.as_str(),
        (_, IssueStatus::Locked) => "Locked",
        (_, IssueStatus::Open) => "Open",
    }
}

/// `2024-03-02T08:00:00Z` → `2 March 2024`. Unparseable input is shown as is.
fn display_date(value: &str) -> String {
    let millis = crate::types::timestamp(value);
    if millis == 0 {
        return value.to_string();
    }
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%-d %B %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Strip characters that could end a CSS declaration early.
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect()
}

fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_SMART_PUNCTUATION;
    let parser = Parser::new_ext(markdown, options);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

fn render_body(body: &PostBody) -> Markup {
    match body {
        PostBody::Markdown(markdown) => PreEscaped(markdown_to_html(markdown)),
        PostBody::PortableText(blocks) => portable_text::to_html(blocks),
    }
}

/// Hero image URL: either a plain string or an object with a `url`.
fn hero_url(hero: Option<&Value>) -> Option<&str> {
    let url = match hero? {
        Value::String(url) => Some(url.as_str()),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str),
        _ => None,
    };
    url.filter(|url| !url.trim().is_empty())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="alternate" type="application/rss+xml" title=(title) href="/rss.xml";
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the site header with breadcrumb and navigation
fn site_header(breadcrumb: Markup, nav: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
            nav.site-nav {
                (nav)
            }
        }
    }
}

/// Publication links, the current one marked.
fn render_nav(publications: &[&Publication], current: Option<&str>) -> Markup {
    html! {
        ul {
            @for publication in publications {
                @let is_current = current == Some(publication.id.as_str());
                li class=[is_current.then_some("current")] {
                    a href=(publication_href(&publication.id)) { (publication.name) }
                }
            }
            li.nav-feed {
                a href="/rss.xml" { "RSS" }
            }
        }
    }
}

fn page_header(ctx: &RenderContext, current: Option<&str>, trail: Markup) -> Markup {
    let publications: Vec<&Publication> = ctx
        .snapshot
        .editions
        .iter()
        .map(|e| &e.publication)
        .collect();
    let breadcrumb = html! {
        a href="/" { (ctx.config.title) }
        (trail)
    };
    site_header(breadcrumb, render_nav(&publications, current))
}

fn post_card(post: &Post, publication: Option<&Publication>, variant: &str) -> Markup {
    html! {
        article class={ "post-card post-card-" (variant) } {
            p.kicker {
                (post.data.format.label())
                @if let Some(publication) = publication {
                    @if !post.data.section_id.is_empty() {
                        " · " (publication.section_label(&post.data.section_id))
                    }
                }
            }
            h3 { a href=(post_href(&post.slug)) { (post.data.headline) } }
            @if !post.data.dek.is_empty() {
                p.dek { (post.data.dek) }
            }
            p.byline {
                time datetime=(post.data.published_at) { (display_date(&post.data.published_at)) }
                " · " (post.reading_time_minutes) " min read"
            }
        }
    }
}

fn issue_card(issue: &Issue, publication: Option<&Publication>) -> Markup {
    html! {
        a.issue-card href=(issue_href(issue)) {
            div.issue-card-cover {
                (render_cover(&issue.cover_spec, issue_title(issue)))
            }
            span.issue-card-title { (issue_title(issue)) }
            span.issue-card-meta {
                @if let Some(publication) = publication {
                    (publication.name) " · "
                }
                "Vol. " (issue.volume) ", No. " (issue.number)
                " · " (display_date(&issue.date))
            }
        }
    }
}

// ============================================================================
// Covers
// ============================================================================

/// Inline style of the cover grid: layout plus theme custom properties.
fn cover_style(spec: &CoverSpec) -> String {
    let layout = &spec.layout;
    let mut decls = vec![
        format!("grid-template-columns: {}", css_value(&layout.cols)),
        format!("grid-template-areas: {}", css_value(&layout.template_areas())),
    ];
    if let Some(rows) = &layout.rows {
        decls.push(format!("grid-template-rows: {}", css_value(rows)));
    }
    if let Some(gap) = &layout.gap {
        decls.push(format!("gap: {}", css_value(gap)));
    }
    if let Some(pad) = &layout.pad {
        decls.push(format!("padding: {}", css_value(pad)));
    }
    if let Some(min_height) = layout.min_height {
        decls.push(format!("min-height: {min_height}px"));
    }
    if let Some(theme) = &spec.theme {
        for (name, value) in theme.css_properties() {
            decls.push(format!("{name}: {}", css_value(value)));
        }
    }
    decls.join("; ")
}

/// Render a normalized cover. Hidden blocks are skipped.
pub fn render_cover(spec: &CoverSpec, label: &str) -> Markup {
    html! {
        div class={ "cover cover-" (slugify(&spec.template)) } style=(cover_style(spec)) aria-label=(label) {
            @for block in spec.blocks.iter().filter(|b| !b.common().hidden) {
                (render_cover_block(block))
            }
        }
    }
}

fn render_cover_block(block: &CoverBlock) -> Markup {
    let common = block.common();

    let mut style = format!("grid-area: {}", css_value(&common.area));
    if let Some(degrees) = common.rotate {
        style.push_str(&format!("; transform: rotate({degrees}deg)"));
    }
    if let Some(align) = common.align {
        style.push_str(&format!("; justify-self: {}", align.as_str()));
    }
    let class = match common.tone {
        Some(tone) => format!("cover-block block-{} tone-{}", block.kind(), tone.as_str()),
        None => format!("cover-block block-{}", block.kind()),
    };

    let inner = match block {
        CoverBlock::Masthead(b) => html! {
            span.masthead-name { (b.publication_name) }
            @if let Some(status) = &b.status_text {
                span.masthead-status { (status) }
            }
        },
        CoverBlock::Title(b) => html! {
            h2.cover-title { (b.title) }
            @if let Some(dek) = &b.dek {
                p.cover-dek { (dek) }
            }
        },
        CoverBlock::Meta(b) => html! {
            @if let Some(left) = &b.left { span.meta-left { (left) } }
            @if let Some(right) = &b.right { span.meta-right { (right) } }
            @if let Some(price) = &b.price { span.meta-price { (price) } }
        },
        CoverBlock::Art(b) => html! {
            div.art-fill style=[b.background.as_deref().map(|bg| format!("background: {}", css_value(bg)))] {}
        },
        CoverBlock::FeatureList(b) => html! {
            @if let Some(heading) = &b.heading {
                h3.feature-heading { (heading) }
            }
            ol.feature-items {
                @for item in &b.items {
                    li {
                        @if let Some(no) = &item.no { span.feature-no { (no) } " " }
                        span.feature-text { (item.text) }
                    }
                }
            }
            @if let Some(hint) = &b.hint {
                p.feature-hint { (hint) }
            }
        },
        CoverBlock::Sticker(b) => html! {
            span.sticker-big { (b.big) }
            @if let Some(small) = &b.small {
                span.sticker-small { (small) }
            }
        },
        CoverBlock::Barcode(_) => html! {
            div.barcode aria-hidden="true" {
                @for width in BARCODE_BARS {
                    span style={ "flex-grow: " (width) } {}
                }
            }
        },
        CoverBlock::Cta(b) => html! { p.cta-text { (b.text) } },
        CoverBlock::Spine(b) => html! { span.spine-text { (b.text) } },
    };

    html! {
        div class=(class) data-block=(common.id) style=(style) {
            (inner)
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_home(ctx: &RenderContext) -> Markup {
    let snapshot = ctx.snapshot;
    let content = html! {
        (page_header(ctx, None, html! {}))
        main.home-page {
            header.home-intro {
                h1 { (ctx.config.title) }
                p.home-description { (ctx.config.description) }
            }
            @if !snapshot.featured.is_empty() {
                section.featured {
                    h2 { "Featured" }
                    div.featured-grid {
                        @for featured in &snapshot.featured {
                            article.featured-publication {
                                h3 {
                                    a href=(publication_href(&featured.publication.id)) {
                                        (featured.publication.name)
                                    }
                                }
                                @if !featured.publication.description.is_empty() {
                                    p { (featured.publication.description) }
                                }
                                @if let Some(issue) = &featured.latest_locked {
                                    (issue_card(issue, None))
                                }
                            }
                        }
                    }
                }
            }
            @if !snapshot.latest_issues.is_empty() {
                section.latest-issues {
                    h2 { "Latest issues" }
                    div.issue-grid {
                        @for issue in &snapshot.latest_issues {
                            (issue_card(issue, snapshot.publication(&issue.publication_id)))
                        }
                    }
                }
            }
            section.latest-posts {
                h2 { "Latest posts" }
                @if snapshot.latest_posts.is_empty() {
                    p.empty { "Nothing published yet." }
                } @else {
                    div.post-list {
                        @for post in &snapshot.latest_posts {
                            (post_card(post, snapshot.publication(&post.data.publication_id), "list"))
                        }
                    }
                }
            }
        }
    };

    base_document(&ctx.config.title, ctx.css, Some("home"), content)
}

fn render_publication_page(ctx: &RenderContext, edition: &Edition) -> Markup {
    let publication = &edition.publication;
    let trail = html! {
        " › "
        (publication.name)
    };
    let accent = (!publication.accent.is_empty())
        .then(|| format!("--pub-accent: {}", css_value(&publication.accent)));

    let content = html! {
        (page_header(ctx, Some(&publication.id), trail))
        main.publication-page style=[accent] {
            header.publication-header {
                h1 class={ "display-" (slugify(&publication.display_font)) } { (publication.name) }
                @if !publication.description.is_empty() {
                    p.publication-description { (publication.description) }
                }
                a.feed-link href={ (publication_href(&publication.id)) "rss.xml" } { "RSS" }
            }
            section.issues {
                h2 { "Issues" }
                @if edition.issues.is_empty() {
                    p.empty { "No issues yet." }
                } @else {
                    div.issue-grid {
                        @for content in &edition.issues {
                            (issue_card(&content.issue, None))
                        }
                    }
                }
            }
            section.posts {
                h2 { "Posts" }
                @if edition.posts.is_empty() {
                    p.empty { "Nothing published yet." }
                } @else {
                    div.post-list {
                        @for post in &edition.posts {
                            (post_card(post, Some(publication), "list"))
                        }
                    }
                }
            }
        }
    };

    let title = format!("{} — {}", publication.name, ctx.config.title);
    base_document(&title, ctx.css, Some("publication"), content)
}

fn render_lineup(lineup: &Lineup, publication: &Publication) -> Markup {
    html! {
        section.lineup {
            @if let Some(lead) = lineup.lead {
                div.lineup-lead { (post_card(lead, Some(publication), "lead")) }
            }
            @if !lineup.secondary.is_empty() {
                div.lineup-secondary {
                    @for post in &lineup.secondary {
                        (post_card(post, Some(publication), "secondary"))
                    }
                }
            }
            @if !lineup.briefs.is_empty() {
                section.lineup-briefs {
                    h2 { "Briefs" }
                    ul {
                        @for post in &lineup.briefs {
                            li { a href=(post_href(&post.slug)) { (post.data.headline) } }
                        }
                    }
                }
            }
        }
    }
}

fn render_issue_page(ctx: &RenderContext, edition: &Edition, content: &IssueContent) -> Markup {
    let publication = &edition.publication;
    let issue = &content.issue;
    let lineup = build_issue_lineup(&content.posts, issue);
    let cover_lines = issue_cover_lines(issue, &content.posts, ctx.config.listing.cover_lines);
    let placed = lineup.slugs();
    let more: Vec<&Post> = content
        .posts
        .iter()
        .filter(|p| !placed.contains(&p.slug.as_str()))
        .collect();

    let trail = html! {
        " › "
        a href=(publication_href(&publication.id)) { (publication.name) }
        " › "
        (issue_title(issue))
    };

    let body = html! {
        (page_header(ctx, Some(&publication.id), trail))
        main.issue-page {
            div.issue-cover {
                (render_cover(&issue.cover_spec, issue_title(issue)))
            }
            header.issue-header {
                p.kicker {
                    "Vol. " (issue.volume) ", No. " (issue.number)
                    " · " (display_date(&issue.date))
                    " · " span.issue-status { (issue_status_label(issue)) }
                    @if let Some(price) = &issue.price { " · " (price) }
                }
                h1 { (issue_title(issue)) }
                @if !issue.theme.is_empty() {
                    p.issue-theme { "Theme: " (issue.theme) }
                }
            }
            @if !cover_lines.is_empty() {
                ul.cover-lines {
                    @for line in &cover_lines {
                        li { (line) }
                    }
                }
            }
            @if let Some(notes) = &issue.notes_from_editor {
                section.editor-notes {
                    h2 { "From the editor" }
                    (PreEscaped(markdown_to_html(notes)))
                }
            }
            (render_lineup(&lineup, publication))
            @if !more.is_empty() {
                section.more-in-issue {
                    h2 { "Also in this issue" }
                    div.post-list {
                        @for post in &more {
                            (post_card(post, Some(publication), "list"))
                        }
                    }
                }
            }
        }
    };

    let title = format!("{} — {}", issue_title(issue), publication.name);
    base_document(&title, ctx.css, Some("issue"), body)
}

fn render_post_page(ctx: &RenderContext, edition: &Edition, post: &Post) -> Markup {
    let publication = &edition.publication;
    let issue = post
        .data
        .issue_slug
        .as_deref()
        .and_then(|slug| edition.issue(slug));

    let trail = html! {
        " › "
        a href=(publication_href(&publication.id)) { (publication.name) }
        @if let Some(issue) = issue {
            " › "
            a href=(issue_href(issue)) { (issue_title(issue)) }
        }
    };

    let content = html! {
        (page_header(ctx, Some(&publication.id), trail))
        main.post-page {
            article.post {
                header.post-header {
                    p.kicker {
                        (post.data.format.label())
                        @if !post.data.section_id.is_empty() {
                            " · " (publication.section_label(&post.data.section_id))
                        }
                    }
                    h1 { (post.data.headline) }
                    @if !post.data.dek.is_empty() {
                        p.dek { (post.data.dek) }
                    }
                    p.byline {
                        time datetime=(post.data.published_at) { (display_date(&post.data.published_at)) }
                        " · " (post.reading_time_minutes) " min read"
                        @if let Some(updated) = &post.data.updated_at {
                            " · Updated " (display_date(updated))
                        }
                    }
                }
                @if let Some(src) = hero_url(post.data.hero_image.as_ref()) {
                    figure.hero {
                        img src=(src) alt=(post.data.hero_alt.as_deref().unwrap_or_default());
                    }
                }
                div.post-body {
                    (render_body(&post.body))
                }
                @if !post.data.tags.is_empty() {
                    ul.tags {
                        @for tag in &post.data.tags {
                            li { (tag) }
                        }
                    }
                }
            }
        }
    };

    let title = format!("{} — {}", post.data.headline, publication.name);
    base_document(&title, ctx.css, Some("post"), content)
}

// ============================================================================
// Tests
// ============================================================================
