//! PDF serialisation of paginated fragments with `pdf-writer`.
//!
//! Text is drawn with the standard Type1 faces in WinAnsi encoding, so no font
//! programs are embedded and the text stays selectable. Output is a pure
//! function of its input: no timestamps or random ids end up in the file.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::export::layout::{Fragment, Segment};
use crate::export::paginate::{Page, PageGeometry};
use crate::render::tree::{FontFamily, MM_PER_PT};

const RULE_WIDTH_PT: f32 = 0.6;

/// Resource names and base fonts, indexed by `face_index`.
const FACES: [(&[u8], &[u8]); 8] = [
    (b"F0", b"Helvetica"),
    (b"F1", b"Helvetica-Bold"),
    (b"F2", b"Helvetica-Oblique"),
    (b"F3", b"Helvetica-BoldOblique"),
    (b"F4", b"Times-Roman"),
    (b"F5", b"Times-Bold"),
    (b"F6", b"Times-Italic"),
    (b"F7", b"Times-BoldItalic"),
];

fn face_index(font: FontFamily, bold: bool, italic: bool) -> usize {
    let family = match font {
        FontFamily::Helvetica => 0,
        FontFamily::Times => 4,
    };
    family + usize::from(bold) + 2 * usize::from(italic)
}

fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

/// Maps text onto WinAnsiEncoding. Characters outside it become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Writes one PDF with one A4 page per entry in `pages`.
pub fn write_pdf(pages: &[Page], geometry: &PageGeometry) -> Vec<u8> {
    let mut next_id = 1;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    let catalog_id = alloc();
    let page_tree_id = alloc();
    let font_ids: Vec<Ref> = FACES.iter().map(|_| alloc()).collect();
    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc(), alloc())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);

    for ((_, base_font), id) in FACES.iter().zip(&font_ids) {
        pdf.type1_font(*id)
            .base_font(Name(base_font))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let page_w = mm_to_pt(geometry.width_mm);
    let page_h = mm_to_pt(geometry.height_mm);

    for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        let content = page_content(page, page_h);
        pdf.stream(*content_id, &content);

        let mut writer = pdf.page(*page_id);
        writer.media_box(Rect::new(0.0, 0.0, page_w, page_h));
        writer.parent(page_tree_id);
        writer.contents(*content_id);
        {
            let mut resources = writer.resources();
            let mut fonts = resources.fonts();
            for ((name, _), font_id) in FACES.iter().zip(&font_ids) {
                fonts.pair(Name(name), *font_id);
            }
        }
        writer.finish();
    }

    pdf.finish()
}

fn page_content(page: &Page, page_h: f32) -> Vec<u8> {
    let mut content = Content::new();
    for fragment in &page.fragments {
        match fragment {
            Fragment::Text {
                baseline_mm,
                segments,
                ..
            } => {
                let y = page_h - mm_to_pt(*baseline_mm);
                for segment in segments {
                    draw_segment(&mut content, segment, y);
                }
            }
            Fragment::Rule {
                top_mm,
                x_mm,
                width_mm,
                color,
            } => {
                let (r, g, b) = color.unit_rgb();
                let y = page_h - mm_to_pt(*top_mm);
                content.set_stroke_rgb(r, g, b);
                content.set_line_width(RULE_WIDTH_PT);
                content.move_to(mm_to_pt(*x_mm), y);
                content.line_to(mm_to_pt(x_mm + width_mm), y);
                content.stroke();
            }
        }
    }
    content.finish()
}

fn draw_segment(content: &mut Content, segment: &Segment, y: f32) {
    let (name, _) = FACES[face_index(segment.font, segment.bold, segment.italic)];
    let (r, g, b) = segment.color.unit_rgb();
    let encoded = encode_win_ansi(&segment.text);
    content.begin_text();
    content.set_font(Name(name), segment.size_pt);
    content.set_fill_rgb(r, g, b);
    content.next_line(mm_to_pt(segment.x_mm), y);
    content.show(Str(&encoded));
    content.end_text();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tree::Color;

    fn page_with(text: &str) -> Page {
        Page {
            index: 0,
            fragments: vec![
                Fragment::Text {
                    top_mm: 10.0,
                    height_mm: 4.4,
                    baseline_mm: 13.4,
                    segments: vec![Segment {
                        x_mm: 10.0,
                        text: text.to_string(),
                        font: FontFamily::Times,
                        bold: true,
                        italic: false,
                        size_pt: 11.0,
                        color: Color::BLACK,
                    }],
                },
                Fragment::Rule {
                    top_mm: 16.0,
                    x_mm: 10.0,
                    width_mm: 190.0,
                    color: Color::RULE,
                },
            ],
        }
    }

    #[test]
    fn test_face_index_covers_all_faces() {
        assert_eq!(FACES[face_index(FontFamily::Helvetica, false, false)].1, b"Helvetica");
        assert_eq!(FACES[face_index(FontFamily::Times, true, true)].1, b"Times-BoldItalic");
        assert_eq!(FACES[face_index(FontFamily::Times, false, true)].1, b"Times-Italic");
    }

    #[test]
    fn test_win_ansi_maps_typographic_characters() {
        assert_eq!(encode_win_ansi("a•b–c"), vec![b'a', 0x95, b'b', 0x96, b'c']);
        assert_eq!(encode_win_ansi("é"), vec![0xe9]);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn test_output_is_a_pdf_with_one_page_per_entry() {
        let geometry = PageGeometry::a4(10.0).unwrap();
        let bytes = write_pdf(&[page_with("One"), page_with("Two")], &geometry);
        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/Times-Bold"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let geometry = PageGeometry::a4(10.0).unwrap();
        let pages = [page_with("Same input")];
        assert_eq!(write_pdf(&pages, &geometry), write_pdf(&pages, &geometry));
    }
}
