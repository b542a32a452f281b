//! PortableText, the CMS's rich-text format.
//!
//! A body is a JSON array of blocks. Text blocks (`_type: "block"`) carry a
//! `style` (`normal`, `h2`, `h3`, `blockquote`), optional list membership
//! (`listItem: "bullet" | "number"`), inline `children` spans with `marks`,
//! and `markDefs` for annotations such as links. Custom objects sit between
//! text blocks: `pullQuote`, `sidebar` (with its own nested body) and
//! `figureBlock`.
//!
//! Two views are provided: [`plain_text`] for word counts and excerpts, and
//! [`to_html`] for article pages. Unknown block types are skipped in both.

use log::debug;
use maud::{Markup, html};
use serde_json::Value;

/// Plain text of a body: span texts, pull quotes and sidebar bodies,
/// space-separated.
pub fn plain_text(blocks: &[Value]) -> String {
    blocks
        .iter()
        .map(block_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn block_text(block: &Value) -> String {
    match block_type(block) {
        "block" => spans(block)
            .iter()
            .filter_map(|span| span.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        "pullQuote" => str_field(block, "quote").unwrap_or_default().to_string(),
        "sidebar" => block
            .get("body")
            .and_then(Value::as_array)
            .map(|body| plain_text(body))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

// ============================================================================
// HTML
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListKind {
    Bullet,
    Number,
}

/// A top-level node after grouping consecutive list items.
enum Node<'a> {
    Block(&'a Value),
    List(ListKind, Vec<&'a Value>),
}

fn list_kind(block: &Value) -> Option<ListKind> {
    if block_type(block) != "block" {
        return None;
    }
    match str_field(block, "listItem")? {
        "bullet" => Some(ListKind::Bullet),
        "number" => Some(ListKind::Number),
        _ => None,
    }
}

fn group(blocks: &[Value]) -> Vec<Node<'_>> {
    let mut nodes: Vec<Node> = Vec::new();
    for block in blocks {
        let Some(kind) = list_kind(block) else {
            nodes.push(Node::Block(block));
            continue;
        };
        if let Some(Node::List(current, items)) = nodes.last_mut()
            && *current == kind
        {
            items.push(block);
        } else {
            nodes.push(Node::List(kind, vec![block]));
        }
    }
    nodes
}

/// Render a body to HTML. Text is escaped by maud.
pub fn to_html(blocks: &[Value]) -> Markup {
    html! {
        @for node in group(blocks) {
            @match node {
                Node::List(ListKind::Bullet, items) => {
                    ul { @for item in items { li { (render_children(item)) } } }
                }
                Node::List(ListKind::Number, items) => {
                    ol { @for item in items { li { (render_children(item)) } } }
                }
                Node::Block(block) => { (render_block(block)) }
            }
        }
    }
}

fn render_block(block: &Value) -> Markup {
    match block_type(block) {
        "block" => {
            let children = render_children(block);
            match str_field(block, "style").unwrap_or("normal") {
                "h2" => html! { h2 { (children) } },
                "h3" => html! { h3 { (children) } },
                "blockquote" => html! { blockquote { (children) } },
                _ => html! { p { (children) } },
            }
        }
        "pullQuote" => html! {
            figure.pull-quote {
                div.pull-quote-text { (str_field(block, "quote").unwrap_or_default()) }
                @if let Some(attribution) = str_field(block, "attribution") {
                    figcaption { (attribution) }
                }
            }
        },
        "sidebar" => {
            let tone = str_field(block, "tone").unwrap_or("note");
            let body = block
                .get("body")
                .and_then(Value::as_array)
                .map(|b| to_html(b));
            html! {
                aside class={ "sidebar sidebar-" (tone) } {
                    @if let Some(title) = str_field(block, "title") {
                        div.sidebar-title { (title) }
                    }
                    @if let Some(body) = body { (body) }
                }
            }
        }
        "figureBlock" => {
            let caption = str_field(block, "caption");
            let credit = str_field(block, "credit");
            html! {
                figure.figure {
                    @if let Some(src) = str_field(block, "imageUrl") {
                        img src=(src) alt=(str_field(block, "alt").unwrap_or_default()) loading="lazy";
                    }
                    @if caption.is_some() || credit.is_some() {
                        figcaption {
                            @if let Some(caption) = caption { (caption) }
                            @if let Some(credit) = credit { span.credit { "[" (credit) "]" } }
                        }
                    }
                }
            }
        }
        other => {
            debug!("skipping unsupported PortableText block type {other:?}");
            html! {}
        }
    }
}

fn render_children(block: &Value) -> Markup {
    let mark_defs: &[Value] = block
        .get("markDefs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    html! {
        @for span in spans(block) {
            @let text = span.get("text").and_then(Value::as_str).unwrap_or_default();
            @let marks: Vec<&str> = span
                .get("marks")
                .and_then(Value::as_array)
                .map(|m| m.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            (render_marked(text, &marks, mark_defs))
        }
    }
}

/// Wrap `text` in its marks, outermost first.
fn render_marked(text: &str, marks: &[&str], mark_defs: &[Value]) -> Markup {
    let Some((mark, rest)) = marks.split_first() else {
        return html! { (text) };
    };
    let inner = render_marked(text, rest, mark_defs);
    match *mark {
        "strong" => html! { strong { (inner) } },
        "em" => html! { em { (inner) } },
        "code" => html! { code { (inner) } },
        "underline" => html! { u { (inner) } },
        "strike-through" => html! { s { (inner) } },
        key => match mark_defs.iter().find(|d| str_field(d, "_key") == Some(key)) {
            Some(def) if block_type(def) == "link" => {
                let href = str_field(def, "href").unwrap_or("#");
                let new_tab = def.get("openInNewTab").and_then(Value::as_bool) == Some(true);
                html! {
                    @if new_tab {
                        a href=(href) target="_blank" rel="noreferrer" { (inner) }
                    } @else {
                        a href=(href) { (inner) }
                    }
                }
            }
            _ => inner,
        },
    }
}

fn block_type(block: &Value) -> &str {
    str_field(block, "_type").unwrap_or_default()
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn spans(block: &Value) -> &[Value] {
    block
        .get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
