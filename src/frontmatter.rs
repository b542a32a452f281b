//! Markdown posts with YAML front matter.
//!
//! A post file starts with a `---` line, then YAML describing the post, then a
//! closing `---` line; everything after that is the Markdown body:
//!
//! ```text
//! ---
//! publicationId: ops
//! issueSlug: 2024-spring
//! format: feature
//! publishedAt: 2024-03-04
//! headline: Why we page
//! ---
//! Body in **Markdown**.
//! ```
//!
//! The YAML keys are the same camelCase names the CMS uses, so both providers
//! end up with the same [`PostData`].

use crate::types::{Post, PostBody, PostData};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("missing front matter: file must start with a `---` line")]
    Missing,
    #[error("unterminated front matter: no closing `---` line")]
    Unterminated,
    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Split a document into its raw YAML header and Markdown body.
///
/// Leading blank lines and a UTF-8 BOM are tolerated before the opening
/// delimiter. Delimiter lines may carry trailing whitespace.
pub fn split(source: &str) -> Result<(&str, &str), FrontMatterError> {
    let source = source.trim_start_matches('\u{feff}').trim_start();
    let rest = source
        .strip_prefix(DELIMITER)
        .ok_or(FrontMatterError::Missing)?;
    let rest = match rest.find('\n') {
        Some(pos) if rest[..pos].trim().is_empty() => &rest[pos + 1..],
        _ => return Err(FrontMatterError::Missing),
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((header, body));
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

/// Parse a post document into front matter fields and Markdown body.
pub fn parse(source: &str) -> Result<(PostData, String), FrontMatterError> {
    let (header, body) = split(source)?;
    let data: PostData = serde_yaml_ng::from_str(header)?;
    Ok((data, body.trim_start_matches(['\r', '\n']).to_string()))
}

/// Parse a post document into a [`Post`] with the given slug.
pub fn parse_post(slug: &str, source: &str) -> Result<Post, FrontMatterError> {
    let (data, body) = parse(source)?;
    Ok(Post::new(slug, data, PostBody::Markdown(body)))
}
