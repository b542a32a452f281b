//! Canonical content records shared by every stage.
//!
//! Publications, issues and posts look the same regardless of where they came
//! from: the local provider deserializes them from JSON files and Markdown
//! front matter, the CMS provider from GROQ query results. Field names follow
//! the camelCase used by both origins so records pass through serde unchanged.
//!
//! Timestamps are kept as the original strings. Ordering goes through
//! [`timestamp`], which accepts RFC 3339 datetimes and bare `YYYY-MM-DD` dates
//! and treats anything else as the epoch.

use crate::cover::CoverSpec;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Words per minute used for the reading-time estimate.
const WORDS_PER_MINUTE: f64 = 200.0;

/// A named section of a publication (e.g. "Dispatches", "Toolbox").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// CSS color used for rules and highlights on publication pages.
    #[serde(default)]
    pub accent: String,
    /// Font token, mapped to a font stack by the stylesheet.
    #[serde(default)]
    pub display_font: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub is_featured: bool,
    /// Partial cover spec used for issues that don't carry their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cover_spec: Option<Value>,
}

impl Publication {
    /// Label for a section id, falling back to the id itself.
    pub fn section_label<'a>(&'a self, section_id: &'a str) -> &'a str {
        self.sections
            .iter()
            .find(|s| s.id == section_id)
            .map(|s| s.label.as_str())
            .unwrap_or(section_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    Locked,
}

/// Manual pins an editor can put on an issue's cover.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_post_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_post_slugs: Vec<String>,
}

/// An issue as stored: the cover spec is still raw JSON.
///
/// Providers deserialize into this and turn it into an [`Issue`] with
/// [`Issue::from_record`], which is where cover normalization happens.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    pub publication_id: String,
    pub issue_slug: String,
    #[serde(default)]
    pub display_title: String,
    #[serde(default)]
    pub volume: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub theme: String,
    pub status: IssueStatus,
    #[serde(default)]
    pub notes_from_editor: Option<String>,
    #[serde(default)]
    pub cover_overrides: Option<CoverOverrides>,
    #[serde(default)]
    pub cover_lines: Vec<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub cover_status_label: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub cover_spec: Option<Value>,
    /// The owning publication's default spec, when the provider can project it.
    #[serde(default)]
    pub default_cover_spec: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub publication_id: String,
    pub issue_slug: String,
    pub display_title: String,
    pub volume: u32,
    pub number: u32,
    pub date: String,
    pub theme: String,
    pub status: IssueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_from_editor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_overrides: Option<CoverOverrides>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cover_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_status_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub cover_spec: CoverSpec,
}

impl Issue {
    /// Build an issue from its stored form, normalizing the cover spec.
    ///
    /// The issue's own spec wins; the publication default is used when the
    /// issue has none; the synthesized fallback titled after the issue covers
    /// everything else.
    pub fn from_record(record: IssueRecord, publication_default: Option<&Value>) -> Self {
        let fallback_title = if record.display_title.trim().is_empty() {
            record.issue_slug.as_str()
        } else {
            record.display_title.as_str()
        };
        let default = record.default_cover_spec.as_ref().or(publication_default);
        let cover_spec = CoverSpec::resolve(record.cover_spec.as_ref(), default, fallback_title);

        Self {
            publication_id: record.publication_id,
            issue_slug: record.issue_slug,
            display_title: record.display_title,
            volume: record.volume,
            number: record.number,
            date: record.date,
            theme: record.theme,
            status: record.status,
            notes_from_editor: record.notes_from_editor,
            cover_overrides: record.cover_overrides,
            cover_lines: record.cover_lines,
            price: record.price,
            cover_status_label: record.cover_status_label,
            cover_image: record.cover_image,
            cover_spec,
        }
    }

    /// `"{publication}:{issue}"`, the issue's identity as a single key.
    pub fn key(&self) -> String {
        issue_key(&self.publication_id, &self.issue_slug)
    }

    pub fn is_locked(&self) -> bool {
        self.status == IssueStatus::Locked
    }

    pub fn date_time(&self) -> i64 {
        timestamp(&self.date)
    }
}

pub fn issue_key(publication_id: &str, issue_slug: &str) -> String {
    format!("{publication_id}:{issue_slug}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostFormat {
    Feature,
    Column,
    Brief,
    FieldNotes,
    Postmortem,
    ToolDrop,
}

impl PostFormat {
    pub fn label(self) -> &'static str {
        match self {
            PostFormat::Feature => "Feature",
            PostFormat::Column => "Column",
            PostFormat::Brief => "Brief",
            PostFormat::FieldNotes => "Field notes",
            PostFormat::Postmortem => "Postmortem",
            PostFormat::ToolDrop => "Tool drop",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverSlot {
    Lead,
    Secondary,
    Brief,
}

/// Post fields as authored, shared by Markdown front matter and CMS documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub publication_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub section_id: String,
    pub format: PostFormat,
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: Difficulty,
    pub published_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub headline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dek: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_slot: Option<CoverSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_alt: Option<String>,
}

/// CMS documents send `null` for unset fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Article body in whichever form the provider stores it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum PostBody {
    Markdown(String),
    PortableText(Vec<Value>),
}

impl PostBody {
    /// Plain text of the body, for word counts and excerpts.
    pub fn plain_text(&self) -> String {
        match self {
            PostBody::Markdown(md) => md.clone(),
            PostBody::PortableText(blocks) => crate::portable_text::plain_text(blocks),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub slug: String,
    #[serde(flatten)]
    pub data: PostData,
    pub reading_time_minutes: u32,
    #[serde(skip)]
    pub body: PostBody,
}

impl Post {
    /// Assemble a post, deriving its reading time from the body.
    pub fn new(slug: impl Into<String>, data: PostData, body: PostBody) -> Self {
        let reading_time_minutes = reading_time_minutes(&body.plain_text());
        Self {
            slug: slug.into(),
            data,
            reading_time_minutes,
            body,
        }
    }

    /// Briefs are demoted below lead and secondary unless explicitly slotted.
    pub fn is_brief(&self) -> bool {
        self.data.format == PostFormat::Brief || self.data.cover_slot == Some(CoverSlot::Brief)
    }

    pub fn published_time(&self) -> i64 {
        timestamp(&self.data.published_at)
    }

    pub fn priority(&self) -> f64 {
        self.data.cover_priority.unwrap_or(0.0)
    }

    pub fn belongs_to_issue(&self, publication_id: &str, issue_slug: &str) -> bool {
        self.data.publication_id == publication_id
            && self.data.issue_slug.as_deref() == Some(issue_slug)
    }
}

/// Estimated minutes to read `text`: whole minutes, never less than one.
pub fn reading_time_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count() as f64;
    ((words / WORDS_PER_MINUTE).round() as u32).max(1)
}

/// Milliseconds since the epoch for an ISO date or datetime string.
///
/// Unparseable values map to 0 so they sort as the oldest entries instead of
/// failing the build.
pub fn timestamp(value: &str) -> i64 {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp_millis();
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}
