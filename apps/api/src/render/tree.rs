//! Render tree: the layout-ready output of a template.
//!
//! A small, closed subset of what a browser DOM offers: block and inline
//! nodes, a handful of typographic properties, and the layout-affecting
//! properties (`width`, `overflow`, `white_space`, `word_break`, `zoom`) that
//! the PDF export pins before measuring.

use serde::{Deserialize, Serialize};

/// Id of the single node that represents the whole rendered résumé.
pub const PREVIEW_ROOT_ID: &str = "resume-preview";

/// A4 width in millimetres and at the 96 DPI CSS reference resolution.
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;
pub const CSS_DPI: f32 = 96.0;
pub const A4_WIDTH_PX: f32 = 794.0;

pub const MM_PER_PX: f32 = 25.4 / CSS_DPI;
pub const MM_PER_PT: f32 = 25.4 / 72.0;

// ────────────────────────────────────────────────────────────────────────────
// Style primitives
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Div,
    Header,
    Section,
    H1,
    H2,
    H3,
    P,
    Span,
    Ul,
    Li,
    A,
    Hr,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::Header => "header",
            Tag::Section => "section",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::P => "p",
            Tag::Span => "span",
            Tag::Ul => "ul",
            Tag::Li => "li",
            Tag::A => "a",
            Tag::Hr => "hr",
        }
    }

    /// Inline nodes flow inside their parent's line box instead of starting one.
    pub fn is_inline(self) -> bool {
        matches!(self, Tag::Span | Tag::A)
    }
}

/// Type families available to templates. Each maps onto a PDF base-14 face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Helvetica,
    Times,
}

impl FontFamily {
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Helvetica => "Helvetica, Arial, sans-serif",
            FontFamily::Times => "'Times New Roman', Times, serif",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum Length {
    Px(f32),
    Mm(f32),
}

impl Length {
    pub fn to_mm(self) -> f32 {
        match self {
            Length::Px(px) => px * MM_PER_PX,
            Length::Mm(mm) => mm,
        }
    }

    fn css(self) -> String {
        match self {
            Length::Px(px) => format!("{px}px"),
            Length::Mm(mm) => format!("{mm}mm"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteSpace {
    Normal,
    NoWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordBreak {
    Normal,
    BreakAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0x0f, 0x17, 0x2a);
    pub const SLATE: Color = Color(0x47, 0x55, 0x69);
    pub const MUTED: Color = Color(0x64, 0x74, 0x8b);
    pub const RULE: Color = Color(0x94, 0xa3, 0xb8);
    pub const LINK: Color = Color(0x25, 0x63, 0xeb);

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Components in 0.0..=1.0 for PDF colour operators.
    pub fn unit_rgb(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

/// Declared style of a single node.
///
/// `Option` fields are inherited from the parent when `None` (typography and
/// text-wrapping, as in CSS). The box fields apply to this node only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub font: Option<FontFamily>,
    pub size_pt: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<Color>,
    pub align: Option<Align>,
    pub white_space: Option<WhiteSpace>,
    pub word_break: Option<WordBreak>,

    pub margin_top_mm: f32,
    pub margin_bottom_mm: f32,
    pub padding_mm: f32,
    pub indent_mm: f32,
    pub rule_below: Option<Color>,
    /// Children share one line: the first to the left, the rest flush right.
    pub row: bool,
    pub width: Option<Length>,
    pub overflow: Option<Overflow>,
    pub zoom: Option<f32>,
}

impl Style {
    pub fn to_css(&self) -> String {
        let mut decls: Vec<String> = Vec::new();
        if let Some(font) = self.font {
            decls.push(format!("font-family:{}", font.css_stack()));
        }
        if let Some(size) = self.size_pt {
            decls.push(format!("font-size:{size}pt"));
        }
        if let Some(bold) = self.bold {
            decls.push(format!("font-weight:{}", if bold { "700" } else { "400" }));
        }
        if let Some(italic) = self.italic {
            decls.push(format!("font-style:{}", if italic { "italic" } else { "normal" }));
        }
        if let Some(color) = self.color {
            decls.push(format!("color:{}", color.hex()));
        }
        if let Some(align) = self.align {
            let value = match align {
                Align::Left => "left",
                Align::Center => "center",
                Align::Right => "right",
            };
            decls.push(format!("text-align:{value}"));
        }
        if let Some(ws) = self.white_space {
            let value = match ws {
                WhiteSpace::Normal => "normal",
                WhiteSpace::NoWrap => "nowrap",
            };
            decls.push(format!("white-space:{value}"));
        }
        if let Some(wb) = self.word_break {
            let value = match wb {
                WordBreak::Normal => "normal",
                WordBreak::BreakAll => "break-all",
            };
            decls.push(format!("word-break:{value}"));
        }
        if self.margin_top_mm != 0.0 || self.margin_bottom_mm != 0.0 {
            decls.push(format!(
                "margin:{}mm 0 {}mm 0",
                self.margin_top_mm, self.margin_bottom_mm
            ));
        }
        if self.padding_mm != 0.0 {
            decls.push(format!("padding:{}mm", self.padding_mm));
        }
        if self.indent_mm != 0.0 {
            decls.push(format!("padding-left:{}mm", self.indent_mm));
        }
        if let Some(color) = self.rule_below {
            decls.push(format!("border-bottom:1px solid {}", color.hex()));
        }
        if self.row {
            decls.push("display:flex;justify-content:space-between".to_string());
        }
        if let Some(width) = self.width {
            decls.push(format!("width:{}", width.css()));
        }
        if let Some(overflow) = self.overflow {
            let value = match overflow {
                Overflow::Visible => "visible",
                Overflow::Hidden => "hidden",
            };
            decls.push(format!("overflow:{value}"));
        }
        if let Some(zoom) = self.zoom {
            decls.push(format!("zoom:{zoom}"));
        }
        decls.join(";")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Nodes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub tag: Tag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            class: None,
            style: Style::default(),
            text: None,
            href: None,
            children: Vec::new(),
        }
    }

    pub fn text(tag: Tag, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(tag)
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::text(Tag::A, text)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn styled(mut self, f: impl FnOnce(&mut Style)) -> Self {
        f(&mut self.style);
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    /// Depth-first, pre-order, including `self`.
    pub fn walk(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    /// Concatenated text of this node and its descendants, with no separators
    /// inserted between nodes (the DOM `textContent` rule).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
        });
        out
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

/// The output of a template: exactly one root node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderTree {
    pub root: Node,
}

impl RenderTree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.root.find_by_id(id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.root.find_by_id_mut(id)
    }

    pub fn text_content(&self) -> String {
        self.root.text_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> RenderTree {
        RenderTree::new(
            Node::new(Tag::Div).with_id(PREVIEW_ROOT_ID).children([
                Node::text(Tag::H1, "Ada Lovelace"),
                Node::new(Tag::Section)
                    .with_id("education")
                    .child(Node::text(Tag::P, "State University")),
            ]),
        )
    }

    #[test]
    fn test_find_by_id_nested() {
        let tree = sample_tree();
        assert!(tree.find_by_id(PREVIEW_ROOT_ID).is_some());
        assert_eq!(
            tree.find_by_id("education").map(|n| n.tag),
            Some(Tag::Section)
        );
        assert!(tree.find_by_id("missing").is_none());
    }

    #[test]
    fn test_text_content_concatenates_without_separators() {
        assert_eq!(sample_tree().text_content(), "Ada LovelaceState University");
    }

    #[test]
    fn test_length_px_to_mm_at_96_dpi() {
        let mm = Length::Px(A4_WIDTH_PX).to_mm();
        assert!((mm - A4_WIDTH_MM).abs() < 0.2, "794px should be ~210mm, got {mm}");
    }

    #[test]
    fn test_style_css_includes_layout_properties() {
        let style = Style {
            width: Some(Length::Px(794.0)),
            overflow: Some(Overflow::Hidden),
            white_space: Some(WhiteSpace::NoWrap),
            ..Default::default()
        };
        let css = style.to_css();
        assert!(css.contains("width:794px"));
        assert!(css.contains("overflow:hidden"));
        assert!(css.contains("white-space:nowrap"));
    }

    #[test]
    fn test_node_count_includes_root() {
        assert_eq!(sample_tree().root.node_count(), 4);
    }
}
