//! Flow layout: turns a render tree into a continuous column of positioned
//! text lines and rules, measured in millimetres.
//!
//! Greedy word-wrap over styled runs, using the static metric tables. Block
//! nodes stack vertically; inline nodes (`span`, `a`) flow inside their
//! parent's line boxes. CPU-bound: callers on the async runtime must run it
//! inside `tokio::task::spawn_blocking`.

use thiserror::Error;

use crate::export::font_metrics::{get_metrics, line_height_mm, BASELINE_OFFSET};
use crate::render::tree::{
    Align, Color, FontFamily, Node, Overflow, Style, Tag, WhiteSpace, WordBreak, A4_WIDTH_MM,
    MM_PER_PT,
};

const ROW_GAP_MM: f32 = 4.0;
const RULE_GAP_MM: f32 = 0.8;
const LIST_MARKER: &str = "•";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("layout width must be positive, got {0}mm")]
    InvalidWidth(f32),
    #[error("zoom must be positive, got {0}")]
    InvalidZoom(f32),
    #[error("page margin {0}mm leaves no printable area")]
    InvalidMargin(f32),
    #[error("layout produced a non-finite coordinate")]
    NonFinite,
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A run of text drawn in one face at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x_mm: f32,
    pub text: String,
    pub font: FontFamily,
    pub bold: bool,
    pub italic: bool,
    pub size_pt: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text {
        top_mm: f32,
        height_mm: f32,
        /// Baseline position measured from the top of the column.
        baseline_mm: f32,
        segments: Vec<Segment>,
    },
    Rule {
        top_mm: f32,
        x_mm: f32,
        width_mm: f32,
        color: Color,
    },
}

impl Fragment {
    pub fn top_mm(&self) -> f32 {
        match self {
            Fragment::Text { top_mm, .. } | Fragment::Rule { top_mm, .. } => *top_mm,
        }
    }

    /// Vertical extent; rules are drawn as hairlines and take no height.
    pub fn height_mm(&self) -> f32 {
        match self {
            Fragment::Text { height_mm, .. } => *height_mm,
            Fragment::Rule { .. } => 0.0,
        }
    }

    pub fn bottom_mm(&self) -> f32 {
        self.top_mm() + self.height_mm()
    }

    /// Moves the fragment by the given offsets.
    pub fn translated(&self, dx: f32, dy: f32) -> Fragment {
        match self {
            Fragment::Text {
                top_mm,
                height_mm,
                baseline_mm,
                segments,
            } => Fragment::Text {
                top_mm: top_mm + dy,
                height_mm: *height_mm,
                baseline_mm: baseline_mm + dy,
                segments: segments
                    .iter()
                    .map(|s| Segment {
                        x_mm: s.x_mm + dx,
                        ..s.clone()
                    })
                    .collect(),
            },
            Fragment::Rule {
                top_mm,
                x_mm,
                width_mm,
                color,
            } => Fragment::Rule {
                top_mm: top_mm + dy,
                x_mm: x_mm + dx,
                width_mm: *width_mm,
                color: *color,
            },
        }
    }

    fn scaled(&self, k: f32) -> Fragment {
        match self {
            Fragment::Text {
                top_mm,
                height_mm,
                baseline_mm,
                segments,
            } => Fragment::Text {
                top_mm: top_mm * k,
                height_mm: height_mm * k,
                baseline_mm: baseline_mm * k,
                segments: segments
                    .iter()
                    .map(|s| Segment {
                        x_mm: s.x_mm * k,
                        size_pt: s.size_pt * k,
                        ..s.clone()
                    })
                    .collect(),
            },
            Fragment::Rule {
                top_mm,
                x_mm,
                width_mm,
                color,
            } => Fragment::Rule {
                top_mm: top_mm * k,
                x_mm: x_mm * k,
                width_mm: width_mm * k,
                color: *color,
            },
        }
    }

    /// Concatenated text of a line, for tests and diagnostics.
    pub fn text(&self) -> String {
        match self {
            Fragment::Text { segments, .. } => segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Fragment::Rule { .. } => String::new(),
        }
    }
}

/// A laid-out column: `width_mm` wide, `content_height_mm` tall.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub width_mm: f32,
    pub content_height_mm: f32,
    pub fragments: Vec<Fragment>,
}

impl LayoutResult {
    /// Uniformly scales geometry and type sizes by `k`.
    pub fn scaled(&self, k: f32) -> LayoutResult {
        LayoutResult {
            width_mm: self.width_mm * k,
            content_height_mm: self.content_height_mm * k,
            fragments: self.fragments.iter().map(|f| f.scaled(k)).collect(),
        }
    }

    /// Bottom edge of the lowest drawn fragment. Unlike `content_height_mm`
    /// this ignores trailing padding and margins.
    pub fn drawn_height_mm(&self) -> f32 {
        self.fragments
            .iter()
            .map(Fragment::bottom_mm)
            .fold(0.0_f32, f32::max)
    }

    pub fn line_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| matches!(f, Fragment::Text { .. }))
            .count()
    }
}

/// Page-layout engine seam. The export pipeline calls `layout` exactly once
/// per export, on the normalised preview root.
pub trait LayoutEngine: Send + Sync {
    fn layout(&self, root: &Node) -> Result<LayoutResult, LayoutError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Computed style
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Computed {
    font: FontFamily,
    size_pt: f32,
    bold: bool,
    italic: bool,
    color: Color,
    align: Align,
    white_space: WhiteSpace,
    word_break: WordBreak,
}

impl Default for Computed {
    fn default() -> Self {
        Self {
            font: FontFamily::Helvetica,
            size_pt: 10.0,
            bold: false,
            italic: false,
            color: Color::BLACK,
            align: Align::Left,
            white_space: WhiteSpace::Normal,
            word_break: WordBreak::Normal,
        }
    }
}

impl Computed {
    fn inherit(&self, style: &Style) -> Computed {
        Computed {
            font: style.font.unwrap_or(self.font),
            size_pt: style.size_pt.unwrap_or(self.size_pt),
            bold: style.bold.unwrap_or(self.bold),
            italic: style.italic.unwrap_or(self.italic),
            color: style.color.unwrap_or(self.color),
            align: style.align.unwrap_or(self.align),
            white_space: style.white_space.unwrap_or(self.white_space),
            word_break: style.word_break.unwrap_or(self.word_break),
        }
    }

    fn word_mm(&self, word: &str) -> f32 {
        get_metrics(self.font).measure_mm(word, self.size_pt, self.bold)
    }

    fn space_mm(&self) -> f32 {
        get_metrics(self.font).space_mm(self.size_pt)
    }
}

/// One word with the style it is drawn in.
#[derive(Debug, Clone)]
struct Token {
    word: String,
    style: Computed,
    space_before: bool,
}

/// A word placed on a line, `x` relative to the line start.
#[derive(Debug, Clone)]
struct Placed {
    token: Token,
    x: f32,
    width: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Flow layout
// ────────────────────────────────────────────────────────────────────────────

/// Default engine. `width`, `overflow`, `white_space` and `word_break` are
/// honoured as declared; `zoom` is honoured on the root only.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowLayout;

struct Column {
    y: f32,
    fragments: Vec<Fragment>,
}

impl LayoutEngine for FlowLayout {
    fn layout(&self, root: &Node) -> Result<LayoutResult, LayoutError> {
        let width = root
            .style
            .width
            .map(|w| w.to_mm())
            .unwrap_or(A4_WIDTH_MM);
        if !(width.is_finite() && width > 0.0) {
            return Err(LayoutError::InvalidWidth(width));
        }
        let zoom = root.style.zoom.unwrap_or(1.0);
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(LayoutError::InvalidZoom(zoom));
        }

        let mut column = Column {
            y: 0.0,
            fragments: Vec::new(),
        };
        layout_block(root, Computed::default(), 0.0, width, None, &mut column);

        let result = LayoutResult {
            width_mm: width,
            content_height_mm: column.y,
            fragments: column.fragments,
        };
        let result = if (zoom - 1.0).abs() > f32::EPSILON {
            result.scaled(zoom)
        } else {
            result
        };
        if !result.content_height_mm.is_finite()
            || result.fragments.iter().any(|f| !f.top_mm().is_finite())
        {
            return Err(LayoutError::NonFinite);
        }
        Ok(result)
    }
}

fn layout_block(
    node: &Node,
    inherited: Computed,
    x: f32,
    width: f32,
    clip: Option<(f32, f32)>,
    column: &mut Column,
) {
    let style = inherited.inherit(&node.style);
    let s = &node.style;
    let clip = if s.overflow == Some(Overflow::Hidden) {
        Some(match clip {
            Some((l, r)) => (l.max(x), r.min(x + width)),
            None => (x, x + width),
        })
    } else {
        clip
    };

    column.y += s.margin_top_mm + s.padding_mm;
    let inner_x = x + s.padding_mm + s.indent_mm;
    let inner_w = (width - 2.0 * s.padding_mm - s.indent_mm).max(1.0);

    if node.tag == Tag::Hr {
        push_rule(column, x, width, style.color);
    } else if s.row && node.children.len() >= 2 {
        layout_row(node, style, inner_x, inner_w, clip, column);
    } else {
        let mut runs: Vec<Token> = Vec::new();
        let mut ended_with_space = true;
        if node.tag == Tag::Li {
            push_words(LIST_MARKER, style, &mut runs, &mut ended_with_space);
            ended_with_space = true;
        }
        if let Some(text) = &node.text {
            push_words(text, style, &mut runs, &mut ended_with_space);
        }
        for child in &node.children {
            if child.tag.is_inline() {
                collect_inline(child, style, &mut runs, &mut ended_with_space);
            } else {
                flush_paragraph(&mut runs, style, inner_x, inner_w, clip, column);
                ended_with_space = true;
                layout_block(child, style, inner_x, inner_w, clip, column);
            }
        }
        flush_paragraph(&mut runs, style, inner_x, inner_w, clip, column);
    }

    column.y += s.padding_mm;
    if let Some(color) = s.rule_below {
        column.y += RULE_GAP_MM;
        push_rule(column, x, width, color);
        column.y += RULE_GAP_MM;
    }
    column.y += s.margin_bottom_mm;
}

fn push_rule(column: &mut Column, x: f32, width: f32, color: Color) {
    column.fragments.push(Fragment::Rule {
        top_mm: column.y,
        x_mm: x,
        width_mm: width,
        color,
    });
}

fn push_words(text: &str, style: Computed, out: &mut Vec<Token>, ended_with_space: &mut bool) {
    let starts_with_space = text.starts_with(char::is_whitespace);
    for (i, word) in text.split_whitespace().enumerate() {
        out.push(Token {
            word: word.to_string(),
            style,
            space_before: if i == 0 {
                *ended_with_space || starts_with_space
            } else {
                true
            },
        });
    }
    if !text.is_empty() {
        *ended_with_space = text.ends_with(char::is_whitespace);
    }
}

fn collect_inline(node: &Node, inherited: Computed, out: &mut Vec<Token>, ended_with_space: &mut bool) {
    let style = inherited.inherit(&node.style);
    if let Some(text) = &node.text {
        push_words(text, style, out, ended_with_space);
    }
    for child in &node.children {
        collect_inline(child, style, out, ended_with_space);
    }
}

/// Greedy word-wrap of `tokens` into lines at most `width` wide. Returns the
/// placed words per line and each line's used width.
fn wrap(tokens: &[Token], width: f32, block: Computed) -> Vec<(Vec<Placed>, f32)> {
    let mut lines: Vec<(Vec<Placed>, f32)> = Vec::new();
    let mut current: Vec<Placed> = Vec::new();
    let mut used = 0.0_f32;
    let wraps = block.white_space == WhiteSpace::Normal;

    for token in tokens {
        let pieces = if wraps && block.word_break == WordBreak::BreakAll {
            break_word(token, width - used, width)
        } else {
            vec![token.clone()]
        };
        for piece in pieces {
            let word_w = piece.style.word_mm(&piece.word);
            let mut space_w = if current.is_empty() || !piece.space_before {
                0.0
            } else {
                piece.style.space_mm()
            };
            if wraps && !current.is_empty() && used + space_w + word_w > width {
                lines.push((std::mem::take(&mut current), used));
                used = 0.0;
                space_w = 0.0;
            }
            current.push(Placed {
                x: used + space_w,
                width: word_w,
                token: piece,
            });
            used += space_w + word_w;
        }
    }
    if !current.is_empty() {
        lines.push((current, used));
    }
    lines
}

/// Splits a word at character boundaries so each piece fits: the first piece
/// into `room`, the rest into full lines.
fn break_word(token: &Token, room: f32, width: f32) -> Vec<Token> {
    if token.style.word_mm(&token.word) <= room.max(0.0) {
        return vec![token.clone()];
    }
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut limit = room.max(0.0);
    for c in token.word.chars() {
        let mut candidate = piece.clone();
        candidate.push(c);
        if !piece.is_empty() && token.style.word_mm(&candidate) > limit {
            pieces.push(std::mem::take(&mut piece));
            limit = width;
            piece.push(c);
        } else {
            piece = candidate;
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, word)| Token {
            word,
            style: token.style,
            space_before: i == 0 && token.space_before,
        })
        .collect()
}

fn flush_paragraph(
    tokens: &mut Vec<Token>,
    block: Computed,
    x: f32,
    width: f32,
    clip: Option<(f32, f32)>,
    column: &mut Column,
) {
    if tokens.is_empty() {
        return;
    }
    for (placed, used) in wrap(tokens, width, block) {
        let offset = match block.align {
            Align::Left => 0.0,
            Align::Center => ((width - used) / 2.0).max(0.0),
            Align::Right => (width - used).max(0.0),
        };
        let positioned: Vec<Placed> = placed
            .into_iter()
            .map(|p| Placed {
                x: x + offset + p.x,
                ..p
            })
            .collect();
        emit_line(positioned, clip, column);
    }
    tokens.clear();
}

/// Children of a row share one line: the first on the left, the rest flush
/// right. Falls back to stacking when they do not fit side by side.
fn layout_row(
    node: &Node,
    style: Computed,
    x: f32,
    width: f32,
    clip: Option<(f32, f32)>,
    column: &mut Column,
) {
    let mut left: Vec<Token> = Vec::new();
    let mut right: Vec<Token> = Vec::new();
    for (i, child) in node.children.iter().enumerate() {
        let target = if i == 0 { &mut left } else { &mut right };
        let mut ended_with_space = true;
        collect_inline(child, style, target, &mut ended_with_space);
    }
    let left_lines = wrap(&left, f32::INFINITY, style);
    let right_lines = wrap(&right, f32::INFINITY, style);
    let left_w = left_lines.first().map(|l| l.1).unwrap_or(0.0);
    let right_w = right_lines.first().map(|l| l.1).unwrap_or(0.0);

    let fits = left_w + ROW_GAP_MM + right_w <= width;
    if fits || style.white_space == WhiteSpace::NoWrap {
        let mut placed: Vec<Placed> = Vec::new();
        for (line, _) in left_lines {
            placed.extend(line.into_iter().map(|p| Placed { x: x + p.x, ..p }));
        }
        let right_x = x + (width - right_w).max(left_w + ROW_GAP_MM);
        for (line, _) in right_lines {
            placed.extend(line.into_iter().map(|p| Placed {
                x: right_x + p.x,
                ..p
            }));
        }
        emit_line(placed, clip, column);
    } else {
        let left_block = Computed {
            align: Align::Left,
            ..style
        };
        let right_block = Computed {
            align: Align::Right,
            ..style
        };
        flush_paragraph(&mut left, left_block, x, width, clip, column);
        flush_paragraph(&mut right, right_block, x, width, clip, column);
    }
}

/// Appends one line box at the column cursor, merging adjacent words that
/// share a face into a single segment.
fn emit_line(placed: Vec<Placed>, clip: Option<(f32, f32)>, column: &mut Column) {
    let visible: Vec<Placed> = match clip {
        Some((left, right)) => placed
            .into_iter()
            .filter(|p| p.x >= left - 0.01 && p.x + p.width <= right + 0.01)
            .collect(),
        None => placed,
    };
    // A clipped-away line still takes up its height.
    let size = visible
        .iter()
        .map(|p| p.token.style.size_pt)
        .fold(0.0_f32, f32::max);
    let size = if size > 0.0 { size } else { 10.0 };
    let height = line_height_mm(size);
    let top = column.y;

    let mut segments: Vec<Segment> = Vec::new();
    let mut last_end = f32::NEG_INFINITY;
    for p in visible {
        let st = p.token.style;
        if let Some(seg) = segments.last_mut() {
            let same_face = seg.font == st.font
                && seg.bold == st.bold
                && seg.italic == st.italic
                && seg.color == st.color
                && (seg.size_pt - st.size_pt).abs() < f32::EPSILON;
            let contiguous = (p.x - last_end - st.space_mm()).abs() < 0.01 || (p.x - last_end).abs() < 0.01;
            if same_face && contiguous {
                if p.x - last_end > 0.01 {
                    seg.text.push(' ');
                }
                seg.text.push_str(&p.token.word);
                last_end = p.x + p.width;
                continue;
            }
        }
        segments.push(Segment {
            x_mm: p.x,
            text: p.token.word.clone(),
            font: st.font,
            bold: st.bold,
            italic: st.italic,
            size_pt: st.size_pt,
            color: st.color,
        });
        last_end = p.x + p.width;
    }

    if !segments.is_empty() {
        column.fragments.push(Fragment::Text {
            top_mm: top,
            height_mm: height,
            baseline_mm: top + size * BASELINE_OFFSET * MM_PER_PT,
            segments,
        });
    }
    column.y += height;
}
