//! RSS 2.0 feeds.
//!
//! Two kinds of feed are written next to the HTML:
//!
//! | Feed                              | Items                                |
//! |-----------------------------------|--------------------------------------|
//! | `rss.xml`                         | every published post on the site     |
//! | `publications/<id>/rss.xml`       | published posts of one publication   |
//!
//! Items are newest first and drafts never appear. Each item links to the
//! post page at `{base_url}/posts/{slug}/`, which also serves as its `guid`.
//!
//! The XML is produced with maud like the HTML pages: element content is
//! escaped the same way, which is all RSS needs.

use crate::config::SiteConfig;
use crate::source::{ContentSource, SourceError, sort_posts_newest_first};
use crate::types::{Post, Publication};
use chrono::DateTime;
use log::debug;
use maud::{Markup, PreEscaped, html};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const FEED_FILE: &str = "rss.xml";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Channel-level metadata of one feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Channel {
    /// The site-wide channel.
    pub fn site(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            link: format!("{}/", config.origin()),
            description: config.description.clone(),
        }
    }

    /// A publication's channel, titled `"{name} — {site title}"`.
    pub fn publication(config: &SiteConfig, publication: &Publication) -> Self {
        let description = if publication.description.is_empty() {
            config.description.clone()
        } else {
            publication.description.clone()
        };
        Self {
            title: format!("{} — {}", publication.name, config.title),
            link: format!("{}/publications/{}/", config.origin(), publication.id),
            description,
        }
    }
}

/// Absolute URL of a post page.
pub fn post_url(config: &SiteConfig, post: &Post) -> String {
    format!("{}/posts/{}/", config.origin(), post.slug)
}

/// RFC 2822 date for `pubDate`; `None` when the timestamp does not parse.
fn pub_date(post: &Post) -> Option<String> {
    let millis = post.published_time();
    if millis == 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis).map(|dt| dt.to_rfc2822())
}

fn render_item(config: &SiteConfig, post: &Post) -> Markup {
    let url = post_url(config, post);
    html! {
        item {
            title { (post.data.headline) }
            link { (url) }
            guid isPermaLink="true" { (url) }
            @if let Some(date) = pub_date(post) {
                pubDate { (date) }
            }
            @if !post.data.summary.is_empty() {
                description { (post.data.summary) }
            }
        }
    }
}

/// Render a complete RSS document. Drafts in `posts` are skipped and the
/// rest are emitted newest first.
pub fn render_rss(config: &SiteConfig, channel: &Channel, posts: &[Post]) -> String {
    let mut items: Vec<Post> = posts.iter().filter(|p| !p.data.draft).cloned().collect();
    sort_posts_newest_first(&mut items);

    let markup = html! {
        (PreEscaped(XML_DECLARATION))
        rss version="2.0" {
            channel {
                title { (channel.title) }
                link { (channel.link) }
                description { (channel.description) }
                generator { "stackbound " (env!("CARGO_PKG_VERSION")) }
                @for post in &items {
                    (render_item(config, post))
                }
            }
        }
    };
    markup.into_string()
}

/// Write `rss.xml` at the site root and one per publication.
///
/// Returns the number of feed files written.
pub fn write_feeds(
    source: &dyn ContentSource,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<usize, FeedError> {
    let mut site_posts = Vec::new();
    let mut written = 0;

    for publication in source.publications()? {
        let posts = source.posts_by_publication(&publication.id)?;
        let dir = output_dir.join("publications").join(&publication.id);
        fs::create_dir_all(&dir)?;
        let channel = Channel::publication(config, &publication);
        fs::write(dir.join(FEED_FILE), render_rss(config, &channel, &posts))?;
        debug!("wrote feed for {} ({} items)", publication.id, posts.len());
        written += 1;
        site_posts.extend(posts);
    }

    fs::create_dir_all(output_dir)?;
    let channel = Channel::site(config);
    fs::write(
        output_dir.join(FEED_FILE),
        render_rss(config, &channel, &site_posts),
    )?;
    Ok(written + 1)
}
