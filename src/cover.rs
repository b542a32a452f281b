//! Cover specifications and their normalization.
//!
//! A cover is declared as a template tag, an optional theme, a CSS grid layout
//! and a list of blocks placed into named grid areas:
//!
//! ```json
//! {
//!   "template": "ops-bulletin",
//!   "theme": { "paper": "#f4efe6", "accent": "#ff4f00" },
//!   "layout": { "cols": "1fr 1fr", "areas": ["mast mast", "title art"] },
//!   "blocks": [
//!     { "id": "mast", "type": "masthead", "area": "mast", "publicationName": "Ops Quarterly" },
//!     { "id": "headline", "type": "title", "area": "title", "title": "Pager Fatigue" }
//!   ]
//! }
//! ```
//!
//! Input comes from hand-written JSON or from CMS documents and is loosely
//! typed: fields may be missing, of the wrong type, or use CMS spellings
//! (`_type`, `_key`). [`normalize_cover_spec`] turns any JSON value into a
//! renderable [`CoverSpec`] and never fails:
//!
//! - non-object input, or input whose blocks all fail to resolve, becomes the
//!   canonical one-block fallback titled after the issue;
//! - blocks with an unknown type or no area are dropped, the rest keep their
//!   order;
//! - missing required text defaults to `""`.
//!
//! The output serializes back to the same camelCase shape, and normalizing
//! that JSON again yields an equal spec.

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_TEMPLATE: &str = "classic";
const FALLBACK_TITLE: &str = "Untitled issue";
const FALLBACK_MIN_HEIGHT: f64 = 520.0;
const FALLBACK_PAD: &str = "12px 12px 12px 42px";

/// Fully normalized cover: always at least one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverSpec {
    pub template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<CoverTheme>,
    pub layout: CoverLayout,
    pub blocks: Vec<CoverBlock>,
}

/// Cover colors and patterns, exposed to the stylesheet as `--cover-*` properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverTheme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Gradient or `url(...)` behind art blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Rotation of the whole cover, e.g. `"-1.25deg"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tilt: Option<String>,
}

impl CoverTheme {
    fn is_empty(&self) -> bool {
        *self == CoverTheme::default()
    }

    /// `(custom property, value)` pairs for the fields that are set.
    pub fn css_properties(&self) -> Vec<(&'static str, &str)> {
        [
            ("--cover-paper", &self.paper),
            ("--cover-ink", &self.ink),
            ("--cover-accent", &self.accent),
            ("--cover-alt", &self.alt),
            ("--cover-photo", &self.photo),
            ("--cover-tilt", &self.tilt),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// CSS grid description. Each `areas` entry is one row of area names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLayout {
    pub cols: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<String>,
    pub areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
}

impl CoverLayout {
    /// `grid-template-areas` value: each row quoted.
    pub fn template_areas(&self) -> String {
        self.areas
            .iter()
            .map(|row| format!("\"{}\"", row.replace('"', "")))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether `area` is named anywhere in the grid.
    pub fn has_area(&self, area: &str) -> bool {
        self.areas
            .iter()
            .any(|row| row.split_whitespace().any(|name| name == area))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Paper,
    Ink,
    Muted,
    Accent,
}

impl Tone {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "paper" => Some(Tone::Paper),
            "ink" => Some(Tone::Ink),
            "muted" => Some(Tone::Muted),
            "accent" => Some(Tone::Accent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Paper => "paper",
            Tone::Ink => "ink",
            Tone::Muted => "muted",
            Tone::Accent => "accent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Start,
    Center,
    End,
}

impl Align {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "start" => Some(Align::Start),
            "center" => Some(Align::Center),
            "end" => Some(Align::End),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Align::Start => "start",
            Align::Center => "center",
            Align::End => "end",
        }
    }
}

/// Fields every block carries, whatever its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockCommon {
    pub id: String,
    /// Grid area name the block is placed into.
    pub area: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    /// Degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MastheadBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub publication_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dek: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    /// CSS background value (gradient or `url(...)`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureListBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub items: Vec<FeatureItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StickerBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub big: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    #[serde(flatten)]
    pub common: BlockCommon,
    pub text: String,
}

/// One positioned element of a cover.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CoverBlock {
    Masthead(MastheadBlock),
    Title(TitleBlock),
    Meta(MetaBlock),
    Art(ArtBlock),
    FeatureList(FeatureListBlock),
    Sticker(StickerBlock),
    Barcode(BarcodeBlock),
    Cta(TextBlock),
    Spine(TextBlock),
}

impl CoverBlock {
    pub fn common(&self) -> &BlockCommon {
        match self {
            CoverBlock::Masthead(b) => &b.common,
            CoverBlock::Title(b) => &b.common,
            CoverBlock::Meta(b) => &b.common,
            CoverBlock::Art(b) => &b.common,
            CoverBlock::FeatureList(b) => &b.common,
            CoverBlock::Sticker(b) => &b.common,
            CoverBlock::Barcode(b) => &b.common,
            CoverBlock::Cta(b) => &b.common,
            CoverBlock::Spine(b) => &b.common,
        }
    }

    /// The block's type tag as it appears in JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            CoverBlock::Masthead(_) => "masthead",
            CoverBlock::Title(_) => "title",
            CoverBlock::Meta(_) => "meta",
            CoverBlock::Art(_) => "art",
            CoverBlock::FeatureList(_) => "featureList",
            CoverBlock::Sticker(_) => "sticker",
            CoverBlock::Barcode(_) => "barcode",
            CoverBlock::Cta(_) => "cta",
            CoverBlock::Spine(_) => "spine",
        }
    }
}

impl CoverSpec {
    /// The canonical single-title cover used whenever input is unusable.
    pub fn fallback(title: &str) -> Self {
        let title = if title.is_empty() { FALLBACK_TITLE } else { title };
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            theme: None,
            layout: CoverLayout {
                cols: "1fr".to_string(),
                rows: None,
                areas: vec!["title".to_string()],
                gap: None,
                pad: Some(FALLBACK_PAD.to_string()),
                min_height: Some(FALLBACK_MIN_HEIGHT),
            },
            blocks: vec![CoverBlock::Title(TitleBlock {
                common: BlockCommon {
                    id: "title".to_string(),
                    area: "title".to_string(),
                    tone: None,
                    rotate: None,
                    align: None,
                    hidden: false,
                },
                title: title.to_string(),
                dek: None,
            })],
        }
    }

    /// Pick the first usable source: the issue's own spec, then the
    /// publication default, then the fallback.
    ///
    /// A source counts as present when it is a JSON object; a present source
    /// with no valid blocks still yields the fallback rather than falling
    /// through to the next one.
    pub fn resolve(own: Option<&Value>, default: Option<&Value>, title: &str) -> Self {
        let raw = own
            .filter(|v| v.is_object())
            .or(default.filter(|v| v.is_object()));
        match raw {
            Some(raw) => normalize_cover_spec(raw, title),
            None => Self::fallback(title),
        }
    }
}

/// Normalize loosely typed cover input into a renderable [`CoverSpec`].
pub fn normalize_cover_spec(raw: &Value, fallback_title: &str) -> CoverSpec {
    let Some(obj) = raw.as_object() else {
        debug!("cover spec is not an object; using fallback for {fallback_title:?}");
        return CoverSpec::fallback(fallback_title);
    };

    let template = obj
        .get("template")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TEMPLATE)
        .to_string();
    let theme = normalize_theme(obj.get("theme"));
    let layout = normalize_layout(obj.get("layout"));
    let blocks = normalize_blocks(obj.get("blocks"));

    if blocks.is_empty() {
        debug!("cover spec has no usable blocks; using fallback for {fallback_title:?}");
        return CoverSpec::fallback(fallback_title);
    }

    CoverSpec {
        template,
        theme,
        layout,
        blocks,
    }
}

fn normalize_theme(raw: Option<&Value>) -> Option<CoverTheme> {
    let obj = raw?.as_object()?;
    let theme = CoverTheme {
        paper: opt_str(obj, "paper"),
        ink: opt_str(obj, "ink"),
        accent: opt_str(obj, "accent"),
        alt: opt_str(obj, "alt"),
        photo: opt_str(obj, "photo"),
        tilt: opt_str(obj, "tilt"),
    };
    (!theme.is_empty()).then_some(theme)
}

fn normalize_layout(raw: Option<&Value>) -> CoverLayout {
    let empty = Map::new();
    let obj = raw.and_then(Value::as_object).unwrap_or(&empty);

    let areas: Vec<String> = obj
        .get("areas")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(stringify)
                .filter(|row| !row.is_empty())
                .collect()
        })
        .unwrap_or_default();

    CoverLayout {
        cols: opt_str(obj, "cols").unwrap_or_else(|| "1fr".to_string()),
        rows: opt_str(obj, "rows"),
        areas: if areas.is_empty() {
            vec!["title".to_string()]
        } else {
            areas
        },
        gap: opt_str(obj, "gap"),
        pad: opt_str(obj, "pad"),
        min_height: obj.get("minHeight").and_then(Value::as_f64),
    }
}

fn normalize_feature_items(raw: Option<&Value>) -> Vec<FeatureItem> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let text = opt_str(item, "text").filter(|t| !t.is_empty())?;
            Some(FeatureItem {
                no: opt_str(item, "no"),
                text,
            })
        })
        .collect()
}

fn normalize_blocks(raw: Option<&Value>) -> Vec<CoverBlock> {
    let Some(entries) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let block = normalize_block(idx, entry);
            if block.is_none() {
                debug!("dropping cover block #{idx}: unknown type or missing area");
            }
            block
        })
        .collect()
}

fn normalize_block(idx: usize, raw: &Value) -> Option<CoverBlock> {
    let b = raw.as_object()?;

    let kind = b
        .get("type")
        .filter(|v| !v.is_null())
        .or_else(|| b.get("_type"))
        .map(stringify)
        .unwrap_or_default();
    let area = opt_str(b, "area").unwrap_or_default();
    if kind.is_empty() || area.is_empty() {
        return None;
    }

    let id = opt_str(b, "id")
        .or_else(|| opt_str(b, "_key"))
        .unwrap_or_else(|| format!("{kind}-{idx}"));
    let common = BlockCommon {
        id,
        area,
        tone: b.get("tone").and_then(Value::as_str).and_then(Tone::parse),
        rotate: b.get("rotate").and_then(Value::as_f64),
        align: b.get("align").and_then(Value::as_str).and_then(Align::parse),
        hidden: b.get("hidden").is_some_and(truthy),
    };

    let block = match kind.as_str() {
        "masthead" => CoverBlock::Masthead(MastheadBlock {
            common,
            publication_name: req_str(b, "publicationName"),
            status_text: opt_str(b, "statusText"),
        }),
        "title" => CoverBlock::Title(TitleBlock {
            common,
            title: req_str(b, "title"),
            dek: opt_str(b, "dek"),
        }),
        "meta" => CoverBlock::Meta(MetaBlock {
            common,
            left: opt_str(b, "left"),
            right: opt_str(b, "right"),
            price: opt_str(b, "price"),
        }),
        "art" => CoverBlock::Art(ArtBlock {
            common,
            background: opt_str(b, "background"),
        }),
        "featureList" => CoverBlock::FeatureList(FeatureListBlock {
            common,
            heading: opt_str(b, "heading"),
            hint: opt_str(b, "hint"),
            items: normalize_feature_items(b.get("items")),
        }),
        "sticker" => CoverBlock::Sticker(StickerBlock {
            common,
            big: req_str(b, "big"),
            small: opt_str(b, "small"),
        }),
        "barcode" => CoverBlock::Barcode(BarcodeBlock { common }),
        "cta" => CoverBlock::Cta(TextBlock {
            common,
            text: req_str(b, "text"),
        }),
        "spine" => CoverBlock::Spine(TextBlock {
            common,
            text: req_str(b, "text"),
        }),
        _ => return None,
    };
    Some(block)
}

/// A string field, only when it actually is a string.
fn opt_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// A required text field: scalars are stringified, anything else is `""`.
fn req_str(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).map(stringify).unwrap_or_default()
}

/// Text form of a scalar JSON value. Null, arrays and objects become `""`.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_is_fallback(spec: &CoverSpec, title: &str) {
        assert_eq!(*spec, CoverSpec::fallback(title));
        assert_eq!(spec.blocks.len(), 1);
        assert_eq!(spec.blocks[0].kind(), "title");
    }

    fn full_spec() -> Value {
        json!({
            "template": "  ops-bulletin ",
            "theme": { "paper": "#f4efe6", "ink": "#111", "tilt": "-1.25deg", "bogus": "x" },
            "layout": {
                "cols": "2fr 1fr",
                "rows": "auto 1fr auto",
                "areas": ["mast mast", "title art", "meta meta"],
                "gap": "12px",
                "minHeight": 640
            },
            "blocks": [
                { "id": "mast", "type": "masthead", "area": "mast", "publicationName": "Ops Quarterly", "statusText": "LOCKED" },
                { "id": "headline", "type": "title", "area": "title", "title": "Pager Fatigue", "dek": "Why alerts rot", "rotate": -2, "tone": "accent" },
                { "id": "art", "type": "art", "area": "art", "background": "linear-gradient(#000, #333)" },
                { "id": "meta", "type": "meta", "area": "meta", "left": "Vol. 3", "right": "No. 2", "price": "$9" }
            ]
        })
    }

    // =========================================================================
    // Fallback behavior
    // =========================================================================

    #[test]
    fn absent_spec_is_fallback() {
        assert_is_fallback(&normalize_cover_spec(&Value::Null, "Spring"), "Spring");
    }

    #[test]
    fn non_object_spec_is_fallback() {
        assert_is_fallback(&normalize_cover_spec(&json!("classic"), "Spring"), "Spring");
        assert_is_fallback(&normalize_cover_spec(&json!([1, 2]), "Spring"), "Spring");
        assert_is_fallback(&normalize_cover_spec(&json!(42), "Spring"), "Spring");
    }

    #[test]
    fn spec_without_valid_blocks_is_fallback() {
        let raw = json!({
            "template": "neon-pop",
            "theme": { "paper": "#fff" },
            "blocks": [
                { "type": "hologram", "area": "title" },
                { "type": "title", "title": "no area" },
                { "type": "title", "area": "" },
                "not an object",
                null
            ]
        });
        assert_is_fallback(&normalize_cover_spec(&raw, "Spring"), "Spring");
    }

    #[test]
    fn fallback_layout_values() {
        let spec = CoverSpec::fallback("Spring");
        assert_eq!(spec.template, "classic");
        assert_eq!(spec.layout.cols, "1fr");
        assert_eq!(spec.layout.areas, vec!["title"]);
        assert_eq!(spec.layout.min_height, Some(520.0));
        assert_eq!(spec.layout.pad.as_deref(), Some("12px 12px 12px 42px"));
        assert!(spec.theme.is_none());
    }

    #[test]
    fn fallback_with_empty_title_uses_untitled() {
        let spec = CoverSpec::fallback("");
        match &spec.blocks[0] {
            CoverBlock::Title(t) => assert_eq!(t.title, "Untitled issue"),
            other => panic!("expected title block, got {other:?}"),
        }
    }

    // =========================================================================
    // Field projection
    // =========================================================================

    #[test]
    fn template_is_trimmed() {
        let spec = normalize_cover_spec(&full_spec(), "x");
        assert_eq!(spec.template, "ops-bulletin");
    }

    #[test]
    fn blank_template_defaults_to_classic() {
        let raw = json!({ "template": "   ", "blocks": [{ "type": "barcode", "area": "title" }] });
        assert_eq!(normalize_cover_spec(&raw, "x").template, "classic");
        let raw = json!({ "template": 7, "blocks": [{ "type": "barcode", "area": "title" }] });
        assert_eq!(normalize_cover_spec(&raw, "x").template, "classic");
    }

    #[test]
    fn theme_keeps_only_known_string_fields() {
        let spec = normalize_cover_spec(&full_spec(), "x");
        let theme = spec.theme.unwrap();
        assert_eq!(theme.paper.as_deref(), Some("#f4efe6"));
        assert_eq!(theme.ink.as_deref(), Some("#111"));
        assert_eq!(theme.tilt.as_deref(), Some("-1.25deg"));
        assert_eq!(theme.accent, None);
    }

    #[test]
    fn theme_without_strings_is_absent() {
        let raw = json!({
            "theme": { "paper": 1, "ink": null },
            "blocks": [{ "type": "barcode", "area": "title" }]
        });
        assert!(normalize_cover_spec(&raw, "x").theme.is_none());
    }

    #[test]
    fn layout_projection() {
        let spec = normalize_cover_spec(&full_spec(), "x");
        assert_eq!(spec.layout.cols, "2fr 1fr");
        assert_eq!(spec.layout.rows.as_deref(), Some("auto 1fr auto"));
        assert_eq!(spec.layout.gap.as_deref(), Some("12px"));
        assert_eq!(spec.layout.pad, None);
        assert_eq!(spec.layout.min_height, Some(640.0));
        assert_eq!(spec.layout.areas.len(), 3);
    }

    #[test]
    fn layout_defaults_when_missing_or_mistyped() {
        let raw = json!({
            "layout": { "cols": 3, "minHeight": "tall", "areas": [null, ""] },
            "blocks": [{ "type": "barcode", "area": "title" }]
        });
        let layout = normalize_cover_spec(&raw, "x").layout;
        assert_eq!(layout.cols, "1fr");
        assert_eq!(layout.min_height, None);
        assert_eq!(layout.areas, vec!["title"]);
    }

    #[test]
    fn layout_areas_stringify_scalars() {
        let raw = json!({
            "layout": { "areas": ["a b", 12, true] },
            "blocks": [{ "type": "barcode", "area": "a" }]
        });
        let layout = normalize_cover_spec(&raw, "x").layout;
        assert_eq!(layout.areas, vec!["a b", "12", "true"]);
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    #[test]
    fn blocks_keep_input_order_and_drop_invalid() {
        let raw = json!({
            "blocks": [
                { "id": "a", "type": "spine", "area": "spine", "text": "VOL 3" },
                { "id": "b", "type": "unknown", "area": "x" },
                { "id": "c", "type": "cta", "area": "cta", "text": "Read inside" },
                { "id": "d", "type": "sticker" },
                { "id": "e", "type": "sticker", "area": "sticker", "big": "NEW" }
            ]
        });
        let spec = normalize_cover_spec(&raw, "x");
        let ids: Vec<&str> = spec.blocks.iter().map(|b| b.common().id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "e"]);
    }

    #[test]
    fn block_id_falls_back_to_key_then_index() {
        let raw = json!({
            "blocks": [
                { "_key": "k1", "type": "barcode", "area": "a" },
                { "type": "barcode", "area": "a" }
            ]
        });
        let spec = normalize_cover_spec(&raw, "x");
        assert_eq!(spec.blocks[0].common().id, "k1");
        assert_eq!(spec.blocks[1].common().id, "barcode-1");
    }

    #[test]
    fn cms_type_field_is_accepted() {
        let raw = json!({ "blocks": [{ "_type": "cta", "area": "a", "text": "Subscribe" }] });
        let spec = normalize_cover_spec(&raw, "x");
        assert_eq!(spec.blocks[0].kind(), "cta");
    }

    #[test]
    fn missing_required_text_defaults_to_empty() {
        let raw = json!({
            "blocks": [
                { "type": "masthead", "area": "a" },
                { "type": "title", "area": "b", "title": 2024 },
                { "type": "sticker", "area": "c", "big": null }
            ]
        });
        let spec = normalize_cover_spec(&raw, "x");
        match &spec.blocks[0] {
            CoverBlock::Masthead(m) => assert_eq!(m.publication_name, ""),
            other => panic!("unexpected {other:?}"),
        }
        match &spec.blocks[1] {
            CoverBlock::Title(t) => assert_eq!(t.title, "2024"),
            other => panic!("unexpected {other:?}"),
        }
        match &spec.blocks[2] {
            CoverBlock::Sticker(s) => assert_eq!(s.big, ""),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn common_fields_are_projected() {
        let raw = json!({
            "blocks": [{
                "type": "title", "area": "t", "title": "T",
                "tone": "muted", "align": "center", "rotate": 3.5, "hidden": 1
            }, {
                "type": "title", "area": "t", "title": "U",
                "tone": "neon", "align": "middle", "rotate": "3deg"
            }]
        });
        let spec = normalize_cover_spec(&raw, "x");
        let first = spec.blocks[0].common();
        assert_eq!(first.tone, Some(Tone::Muted));
        assert_eq!(first.align, Some(Align::Center));
        assert_eq!(first.rotate, Some(3.5));
        assert!(first.hidden);

        let second = spec.blocks[1].common();
        assert_eq!(second.tone, None);
        assert_eq!(second.align, None);
        assert_eq!(second.rotate, None);
        assert!(!second.hidden);
    }

    #[test]
    fn feature_list_items_require_text() {
        let raw = json!({
            "blocks": [{
                "type": "featureList", "area": "list", "heading": "Inside",
                "items": [
                    { "no": "01", "text": "Pager fatigue" },
                    { "no": "02", "text": "" },
                    { "text": "Runbooks that work" },
                    { "no": "04" },
                    "bare string"
                ]
            }]
        });
        let spec = normalize_cover_spec(&raw, "x");
        match &spec.blocks[0] {
            CoverBlock::FeatureList(list) => {
                assert_eq!(list.heading.as_deref(), Some("Inside"));
                assert_eq!(list.items.len(), 2);
                assert_eq!(list.items[0].no.as_deref(), Some("01"));
                assert_eq!(list.items[1].no, None);
                assert_eq!(list.items[1].text, "Runbooks that work");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // =========================================================================
    // Serialization and idempotence
    // =========================================================================

    #[test]
    fn serializes_with_type_tag_and_camel_case() {
        let spec = normalize_cover_spec(&full_spec(), "x");
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["blocks"][0]["type"], "masthead");
        assert_eq!(value["blocks"][0]["publicationName"], "Ops Quarterly");
        assert_eq!(value["blocks"][0]["statusText"], "LOCKED");
        assert_eq!(value["layout"]["minHeight"], 640.0);
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [full_spec(), Value::Null, json!({ "blocks": [] })] {
            let once = normalize_cover_spec(&raw, "Issue");
            let again = normalize_cover_spec(&serde_json::to_value(&once).unwrap(), "Other");
            assert_eq!(once, again);
        }
    }

    #[test]
    fn resolve_prefers_own_then_default() {
        let own = json!({ "template": "own", "blocks": [{ "type": "barcode", "area": "title" }] });
        let default = json!({ "template": "default", "blocks": [{ "type": "barcode", "area": "title" }] });

        assert_eq!(CoverSpec::resolve(Some(&own), Some(&default), "x").template, "own");
        assert_eq!(CoverSpec::resolve(None, Some(&default), "x").template, "default");
        assert_eq!(
            CoverSpec::resolve(Some(&Value::Null), Some(&default), "x").template,
            "default"
        );
        assert_is_fallback(&CoverSpec::resolve(None, None, "x"), "x");
    }

    #[test]
    fn layout_helpers() {
        let spec = normalize_cover_spec(&full_spec(), "x");
        assert_eq!(
            spec.layout.template_areas(),
            r#""mast mast" "title art" "meta meta""#
        );
        assert!(spec.layout.has_area("art"));
        assert!(!spec.layout.has_area("spine"));
    }
}
