//! HTML serialisation of a render tree, served by the live-preview endpoints.

use crate::render::tree::{Node, RenderTree, Tag};

/// Serialises the tree to a standalone HTML fragment. All text and attribute
/// values are escaped; nothing from the document is emitted raw.
pub fn to_html(tree: &RenderTree) -> String {
    let mut out = String::with_capacity(4096);
    write_node(&tree.root, &mut out);
    out
}

/// Wraps the fragment in a minimal document so it can be opened directly.
pub fn to_html_page(tree: &RenderTree, title: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body style=\"margin:0;background:#f1f5f9\">{}</body></html>",
        escape(title),
        to_html(tree)
    )
}

fn write_node(node: &Node, out: &mut String) {
    let tag = node.tag.as_str();
    out.push('<');
    out.push_str(tag);
    if let Some(id) = &node.id {
        push_attr(out, "id", id);
    }
    if let Some(class) = &node.class {
        push_attr(out, "class", class);
    }
    let css = node.style.to_css();
    if !css.is_empty() {
        push_attr(out, "style", &css);
    }
    if let Some(href) = node.href.as_deref().filter(|h| is_safe_href(h)) {
        push_attr(out, "href", href);
        push_attr(out, "rel", "noopener noreferrer");
    }

    out.push('>');
    if node.tag == Tag::Hr {
        return;
    }

    if let Some(text) = &node.text {
        out.push_str(&escape(text));
    }
    for child in &node.children {
        write_node(child, out);
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Only absolute http(s) and mailto links become clickable; anything else
/// (`javascript:`, `data:`, relative paths) is shown as text only.
fn is_safe_href(href: &str) -> bool {
    let Some((scheme, _)) = href.trim().split_once(':') else {
        return false;
    };
    matches!(
        scheme.to_ascii_lowercase().as_str(),
        "http" | "https" | "mailto"
    )
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tree::PREVIEW_ROOT_ID;

    #[test]
    fn test_root_id_and_text_emitted() {
        let tree = RenderTree::new(
            Node::new(Tag::Div)
                .with_id(PREVIEW_ROOT_ID)
                .child(Node::text(Tag::H1, "Ada")),
        );
        let html = to_html(&tree);
        assert!(html.starts_with("<div id=\"resume-preview\""));
        assert!(html.contains("<h1>Ada</h1>"));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_document_text_is_escaped() {
        let tree = RenderTree::new(Node::text(Tag::P, "<script>alert(\"x\")</script> & co"));
        let html = to_html(&tree);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp; co"));
    }

    #[test]
    fn test_link_attributes_escaped() {
        let tree = RenderTree::new(Node::link("GitHub", "https://x.dev/\"onload=\""));
        let html = to_html(&tree);
        assert!(html.contains("href=\"https://x.dev/&quot;onload=&quot;\""));
    }

    #[test]
    fn test_script_urls_are_not_linked() {
        for href in ["javascript:alert(1)", " JavaScript:alert(1)", "data:text/html,x", "java\tscript:alert(1)"] {
            let tree = RenderTree::new(Node::link("Portfolio", href));
            let html = to_html(&tree);
            assert!(!html.contains("href="), "{href} was linked: {html}");
            assert!(html.contains("Portfolio"));
        }

        let html = to_html(&RenderTree::new(Node::link("Mail", "mailto:ada@example.com")));
        assert!(html.contains("href=\"mailto:ada@example.com\""));
    }

    #[test]
    fn test_page_wraps_fragment() {
        let tree = RenderTree::new(Node::new(Tag::Div));
        let page = to_html_page(&tree, "Résumé <draft>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Résumé &lt;draft&gt;</title>"));
    }
}
