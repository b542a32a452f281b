//! Headless CMS provider.
//!
//! Content is fetched with GROQ queries over the CMS's HTTP query API. The
//! transport sits behind [`QueryClient`], so the provider logic (queries,
//! decoding, normalization) is testable without a network; [`SanityClient`]
//! is the real implementation on `reqwest::blocking`.
//!
//! ## Queries
//!
//! Documents are projected into the same camelCase shape the local files use:
//!
//! - posts: `publicationId` from the `publication` reference, `slug` from
//!   `slug.current`, body as PortableText
//! - issues: `publicationId` and the publication's `defaultCoverSpec` from the
//!   `publication` reference
//!
//! Drafts are filtered in the query itself. Draft lookups by slug go through
//! a separate preview client (live API, `previewDrafts` perspective), which
//! exists only when a read token is configured.

use super::{
    ContentSource, PostQuery, SourceError, sort_issues_newest_first, sort_posts_newest_first,
};
use crate::config::CmsConfig;
use crate::types::{Issue, IssueRecord, Post, PostBody, PostData, Publication};
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

const PUBLICATIONS: &str = r#"*[_type=="publication"] | order(id asc)"#;
const PUBLISHED_POSTS: &str = r#"*[_type=="post" && (!draft || draft==false)]"#;
const POST_PROJECTION: &str = r#"{..., "publicationId": publication->id, "slug": slug.current}"#;
const ISSUE_PROJECTION: &str = r#"{..., "publicationId": publication->id, "defaultCoverSpec": publication->defaultCoverSpec}"#;

/// Perspective that overlays unpublished drafts on published documents.
const PREVIEW_PERSPECTIVE: &str = "previewDrafts";

/// Executes a GROQ query and returns the `result` member of the response.
///
/// `params` are bound as `$name` query parameters.
pub trait QueryClient: Send + Sync {
    fn fetch(&self, query: &str, params: &[(&str, Value)]) -> Result<Value, SourceError>;
}

/// Blocking HTTP client for the CMS query API.
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    token: Option<String>,
    perspective: Option<String>,
}

impl SanityClient {
    pub fn new(
        project_id: &str,
        dataset: &str,
        api_version: &str,
        use_cdn: bool,
        token: Option<String>,
    ) -> Result<Self, SourceError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("stackbound/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: query_endpoint(project_id, dataset, api_version, use_cdn),
            token,
            perspective: None,
        })
    }

    /// Query through a perspective, e.g. `previewDrafts`.
    pub fn with_perspective(mut self, perspective: &str) -> Self {
        self.perspective = Some(perspective.to_string());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `https://{project}.api[cdn].sanity.io/v{version}/data/query/{dataset}`
pub fn query_endpoint(project_id: &str, dataset: &str, api_version: &str, use_cdn: bool) -> String {
    let host = if use_cdn { "apicdn" } else { "api" };
    let version = api_version.trim_start_matches('v');
    format!("https://{project_id}.{host}.sanity.io/v{version}/data/query/{dataset}")
}

impl QueryClient for SanityClient {
    fn fetch(&self, query: &str, params: &[(&str, Value)]) -> Result<Value, SourceError> {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            pairs.push((format!("${name}"), serde_json::to_string(value)?));
        }
        if let Some(perspective) = &self.perspective {
            pairs.push(("perspective".to_string(), perspective.clone()));
        }

        let mut request = self.http.get(&self.endpoint).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        debug!("GROQ {} {query}", self.endpoint);
        let response = request.send()?;
        let status = response.status();
        let body: Value = response.json()?;
        if !status.is_success() {
            return Err(SourceError::Cms(format!(
                "query failed with {status}: {}",
                error_message(&body)
            )));
        }
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}

/// Best-effort error text from a CMS error response.
fn error_message(body: &Value) -> &str {
    body.pointer("/error/description")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
}

/// A post document as projected by the queries.
#[derive(Debug, Deserialize)]
struct CmsPost {
    slug: String,
    #[serde(flatten)]
    data: PostData,
    #[serde(default)]
    body: Option<Vec<Value>>,
}

impl From<CmsPost> for Post {
    fn from(doc: CmsPost) -> Self {
        Post::new(
            doc.slug,
            doc.data,
            PostBody::PortableText(doc.body.unwrap_or_default()),
        )
    }
}

pub struct CmsSource<C: QueryClient> {
    client: C,
    preview: Option<C>,
}

impl CmsSource<SanityClient> {
    /// Build the published and (with a token) preview clients.
    pub fn from_config(cms: &CmsConfig, project_id: &str, dataset: &str) -> Result<Self, SourceError> {
        let client = SanityClient::new(
            project_id,
            dataset,
            &cms.api_version,
            cms.use_cdn,
            cms.token.clone(),
        )?;
        let preview = match &cms.token {
            Some(token) => Some(
                SanityClient::new(project_id, dataset, &cms.api_version, false, Some(token.clone()))?
                    .with_perspective(PREVIEW_PERSPECTIVE),
            ),
            None => None,
        };
        Ok(Self::new(client, preview))
    }
}

impl<C: QueryClient> CmsSource<C> {
    pub fn new(client: C, preview: Option<C>) -> Self {
        Self { client, preview }
    }

    fn fetch_list<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, Value)],
    ) -> Result<Vec<T>, SourceError> {
        match self.client.fetch(query, params)? {
            Value::Null => Ok(Vec::new()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    fn fetch_posts(&self, query: &str, params: &[(&str, Value)]) -> Result<Vec<Post>, SourceError> {
        let docs: Vec<CmsPost> = self.fetch_list(query, params)?;
        let mut posts: Vec<Post> = docs.into_iter().map(Post::from).collect();
        sort_posts_newest_first(&mut posts);
        Ok(posts)
    }

    fn fetch_issues(&self, query: &str, params: &[(&str, Value)]) -> Result<Vec<Issue>, SourceError> {
        let records: Vec<IssueRecord> = self.fetch_list(query, params)?;
        let mut issues: Vec<Issue> = records
            .into_iter()
            .map(|r| Issue::from_record(r, None))
            .collect();
        sort_issues_newest_first(&mut issues);
        Ok(issues)
    }

    fn fetch_issue(&self, query: &str, params: &[(&str, Value)]) -> Result<Option<Issue>, SourceError> {
        let record: Option<IssueRecord> = decode_optional(self.client.fetch(query, params)?)?;
        Ok(record.map(|r| Issue::from_record(r, None)))
    }
}

fn decode_optional<T: DeserializeOwned>(value: Value) -> Result<Option<T>, SourceError> {
    match value {
        Value::Null => Ok(None),
        value => Ok(Some(serde_json::from_value(value)?)),
    }
}

impl<C: QueryClient> ContentSource for CmsSource<C> {
    fn name(&self) -> &'static str {
        "cms"
    }

    fn publications(&self) -> Result<Vec<Publication>, SourceError> {
        self.fetch_list(&format!("{PUBLICATIONS}{{...}}"), &[])
    }

    fn featured_publications(&self) -> Result<Vec<Publication>, SourceError> {
        self.fetch_list(
            r#"*[_type=="publication" && isFeatured==true] | order(id asc){...}"#,
            &[],
        )
    }

    fn publication(&self, id: &str) -> Result<Option<Publication>, SourceError> {
        decode_optional(self.client.fetch(
            r#"*[_type=="publication" && id==$id][0]{...}"#,
            &[("id", json!(id))],
        )?)
    }

    fn issue(
        &self,
        publication_id: &str,
        issue_slug: &str,
    ) -> Result<Option<Issue>, SourceError> {
        self.fetch_issue(
            &format!(
                r#"*[_type=="issue" && issueSlug==$slug && publication->id==$pub][0]{ISSUE_PROJECTION}"#
            ),
            &[("slug", json!(issue_slug)), ("pub", json!(publication_id))],
        )
    }

    fn issues_for_publication(&self, publication_id: &str) -> Result<Vec<Issue>, SourceError> {
        self.fetch_issues(
            &format!(
                r#"*[_type=="issue" && publication->id==$pub]{ISSUE_PROJECTION} | order(date desc)"#
            ),
            &[("pub", json!(publication_id))],
        )
    }

    fn latest_locked_issue_for_publication(
        &self,
        publication_id: &str,
    ) -> Result<Option<Issue>, SourceError> {
        self.fetch_issue(
            &format!(
                r#"*[_type=="issue" && publication->id==$pub && status=="locked"]{ISSUE_PROJECTION} | order(date desc)[0]"#
            ),
            &[("pub", json!(publication_id))],
        )
    }

    fn latest_issues(&self, limit: usize) -> Result<Vec<Issue>, SourceError> {
        self.fetch_issues(
            &format!(
                r#"*[_type=="issue" && status=="locked"]{ISSUE_PROJECTION} | order(date desc)[0...$limit]"#
            ),
            &[("limit", json!(limit))],
        )
    }

    fn posts_for_issue(
        &self,
        publication_id: &str,
        issue_slug: &str,
    ) -> Result<Vec<Post>, SourceError> {
        self.fetch_posts(
            &format!(
                "{PUBLISHED_POSTS}[publication->id==$pub && issueSlug==$slug]{POST_PROJECTION}"
            ),
            &[("pub", json!(publication_id)), ("slug", json!(issue_slug))],
        )
    }

    fn posts_by_publication(&self, publication_id: &str) -> Result<Vec<Post>, SourceError> {
        self.fetch_posts(
            &format!(
                "{PUBLISHED_POSTS}[publication->id==$pub]{POST_PROJECTION} | order(publishedAt desc)"
            ),
            &[("pub", json!(publication_id))],
        )
    }

    fn latest_posts(&self, limit: usize) -> Result<Vec<Post>, SourceError> {
        self.fetch_posts(
            &format!("{PUBLISHED_POSTS}{POST_PROJECTION} | order(publishedAt desc)[0...$limit]"),
            &[("limit", json!(limit))],
        )
    }

    fn post_by_slug(&self, slug: &str, query: PostQuery) -> Result<Option<Post>, SourceError> {
        let params = [("slug", json!(slug))];
        let raw = if query.include_draft {
            let client = self.preview.as_ref().unwrap_or(&self.client);
            client.fetch(
                &format!(
                    r#"*[_type=="post" && slug.current==$slug] | order(_updatedAt desc)[0]{POST_PROJECTION}"#
                ),
                &params,
            )?
        } else {
            self.client.fetch(
                &format!("{PUBLISHED_POSTS}[slug.current==$slug][0]{POST_PROJECTION}"),
                &params,
            )?
        };
        let doc: Option<CmsPost> = decode_optional(raw)?;
        Ok(doc.map(Post::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostFormat;
    use std::sync::Mutex;

    /// Answers queries from canned responses, matched by substring.
    #[derive(Default)]
    struct FakeClient {
        responses: Vec<(&'static str, Value)>,
        calls: Mutex<Vec<(String, Vec<(String, Value)>)>>,
    }

    impl FakeClient {
        fn with(responses: Vec<(&'static str, Value)>) -> Self {
            Self {
                responses,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(String, Vec<(String, Value)>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl QueryClient for FakeClient {
        fn fetch(&self, query: &str, params: &[(&str, Value)]) -> Result<Value, SourceError> {
            self.calls.lock().unwrap().push((
                query.to_string(),
                params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ));
            Ok(self
                .responses
                .iter()
                .find(|(needle, _)| query.contains(needle))
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null))
        }
    }

    fn post_doc(slug: &str, published_at: &str, body_words: usize) -> Value {
        json!({
            "_id": format!("post-{slug}"),
            "_type": "post",
            "slug": slug,
            "publicationId": "ops",
            "issueSlug": "spring",
            "sectionId": "dispatch",
            "format": "feature",
            "difficulty": "advanced",
            "publishedAt": published_at,
            "headline": format!("Headline {slug}"),
            "dek": null,
            "tags": null,
            "draft": null,
            "body": [{
                "_type": "block",
                "children": [{ "_type": "span", "text": "word ".repeat(body_words) }]
            }]
        })
    }

    // =========================================================================
    // Endpoint and errors
    // =========================================================================

    #[test]
    fn endpoint_uses_cdn_host() {
        assert_eq!(
            query_endpoint("abc123", "production", "2024-01-01", true),
            "https://abc123.apicdn.sanity.io/v2024-01-01/data/query/production"
        );
        assert_eq!(
            query_endpoint("abc123", "production", "v2024-01-01", false),
            "https://abc123.api.sanity.io/v2024-01-01/data/query/production"
        );
    }

    #[test]
    fn error_message_prefers_description() {
        let body = json!({ "error": { "description": "param $pub missing" } });
        assert_eq!(error_message(&body), "param $pub missing");
        assert_eq!(error_message(&json!({ "message": "nope" })), "nope");
        assert_eq!(error_message(&json!({})), "unknown error");
    }

    #[test]
    fn from_config_builds_preview_only_with_token() {
        let mut cms = CmsConfig::default();
        let source = CmsSource::from_config(&cms, "abc123", "production").unwrap();
        assert!(source.preview.is_none());
        assert!(source.client.endpoint().contains(".apicdn."));

        cms.token = Some("sk-read".into());
        let source = CmsSource::from_config(&cms, "abc123", "production").unwrap();
        let preview = source.preview.unwrap();
        assert!(preview.endpoint().contains(".api.sanity.io"));
        assert_eq!(preview.perspective.as_deref(), Some("previewDrafts"));
    }

    // =========================================================================
    // Publications and issues
    // =========================================================================

    #[test]
    fn decodes_publications_ignoring_cms_fields() {
        let client = FakeClient::with(vec![(
            "_type==\"publication\"",
            json!([{ "_id": "x", "_rev": "r", "id": "ops", "name": "Ops Quarterly",
                     "sections": [{ "_key": "k", "id": "dispatch", "label": "Dispatch" }] }]),
        )]);
        let source = CmsSource::new(client, None);
        let pubs = source.publications().unwrap();
        assert_eq!(pubs[0].id, "ops");
        assert_eq!(pubs[0].section_label("dispatch"), "Dispatch");
    }

    #[test]
    fn missing_publication_is_none() {
        let source = CmsSource::new(FakeClient::default(), None);
        assert!(source.publication("ghost").unwrap().is_none());
        assert!(source.publications().unwrap().is_empty());
    }

    #[test]
    fn issues_are_normalized_with_projected_default() {
        let client = FakeClient::with(vec![(
            "_type==\"issue\"",
            json!([
                { "publicationId": "ops", "issueSlug": "old", "displayTitle": "Old",
                  "date": "2024-01-01", "status": "locked" },
                { "publicationId": "ops", "issueSlug": "new", "displayTitle": "New",
                  "date": "2024-06-01", "status": "open",
                  "defaultCoverSpec": { "template": "ledger",
                      "blocks": [{ "_type": "spine", "_key": "s1", "area": "spine", "text": "OPS" }] } }
            ]),
        )]);
        let source = CmsSource::new(client, None);
        let issues = source.issues_for_publication("ops").unwrap();
        assert_eq!(issues[0].issue_slug, "new");
        assert_eq!(issues[0].cover_spec.template, "ledger");
        assert_eq!(issues[0].cover_spec.blocks[0].common().id, "s1");
        assert_eq!(issues[1].cover_spec.template, "classic");

        let calls = source.client.calls();
        assert!(calls[0].0.contains("publication->id==$pub"));
        assert_eq!(calls[0].1, vec![("pub".to_string(), json!("ops"))]);
    }

    #[test]
    fn latest_issues_binds_limit() {
        let source = CmsSource::new(FakeClient::default(), None);
        assert!(source.latest_issues(6).unwrap().is_empty());
        let calls = source.client.calls();
        assert!(calls[0].0.contains("status==\"locked\""));
        assert_eq!(calls[0].1, vec![("limit".to_string(), json!(6))]);
    }

    // =========================================================================
    // Posts
    // =========================================================================

    #[test]
    fn posts_for_issue_filters_drafts_and_sorts() {
        let client = FakeClient::with(vec![(
            "_type==\"post\"",
            json!([post_doc("older", "2024-01-01T09:00:00Z", 10), post_doc("newer", "2024-02-01T09:00:00Z", 600)]),
        )]);
        let source = CmsSource::new(client, None);
        let posts = source.posts_for_issue("ops", "spring").unwrap();

        assert_eq!(posts[0].slug, "newer");
        assert_eq!(posts[0].reading_time_minutes, 3);
        assert_eq!(posts[1].reading_time_minutes, 1);
        assert_eq!(posts[0].data.format, PostFormat::Feature);
        assert!(posts[0].data.tags.is_empty());
        assert!(matches!(posts[0].body, PostBody::PortableText(_)));

        let calls = source.client.calls();
        assert!(calls[0].0.starts_with(PUBLISHED_POSTS));
        assert!(calls[0].0.contains("\"slug\": slug.current"));
    }

    #[test]
    fn post_by_slug_uses_preview_for_drafts() {
        let published = FakeClient::default();
        let preview = FakeClient::with(vec![("slug.current==$slug", post_doc("wip", "2024-03-01", 5))]);
        let source = CmsSource::new(published, Some(preview));

        let hidden = source.post_by_slug("wip", PostQuery::default()).unwrap();
        assert!(hidden.is_none());
        let shown = source
            .post_by_slug("wip", PostQuery { include_draft: true })
            .unwrap();
        assert_eq!(shown.unwrap().slug, "wip");

        let preview_calls = source.preview.as_ref().unwrap().calls();
        assert_eq!(preview_calls.len(), 1);
        assert!(!preview_calls[0].0.contains("!draft"));
    }

    #[test]
    fn post_by_slug_without_preview_falls_back_to_client() {
        let client = FakeClient::with(vec![("slug.current==$slug", post_doc("wip", "2024-03-01", 5))]);
        let source = CmsSource::new(client, None);
        let post = source
            .post_by_slug("wip", PostQuery { include_draft: true })
            .unwrap();
        assert!(post.is_some());
    }

    #[test]
    fn malformed_documents_are_json_errors() {
        let client = FakeClient::with(vec![("_type==\"post\"", json!([{ "slug": "x" }]))]);
        let source = CmsSource::new(client, None);
        assert!(matches!(source.latest_posts(12), Err(SourceError::Json(_))));
    }
}
