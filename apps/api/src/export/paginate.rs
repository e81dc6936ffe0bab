//! Pagination: slices a laid-out column into A4 pages.
//!
//! The column is cut into bands of the usable page height. A fragment goes
//! to the band containing its top edge unless it would cross that band's
//! bottom, then is shifted so that each page carries the same left and top
//! margins.

use serde::Serialize;

use crate::export::layout::{Fragment, LayoutError, LayoutResult};
use crate::render::tree::{A4_HEIGHT_MM, A4_WIDTH_MM};

pub const DEFAULT_MARGIN_MM: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageGeometry {
    /// A4 portrait with the same margin on all four sides.
    pub fn a4(margin_mm: f32) -> Result<Self, LayoutError> {
        let max = A4_WIDTH_MM.min(A4_HEIGHT_MM) / 2.0;
        if !(margin_mm.is_finite() && (0.0..max).contains(&margin_mm)) {
            return Err(LayoutError::InvalidMargin(margin_mm));
        }
        Ok(Self {
            width_mm: A4_WIDTH_MM,
            height_mm: A4_HEIGHT_MM,
            margin_mm,
        })
    }

    pub fn usable_height_mm(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm
    }

    pub fn printable_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: usize,
    /// Fragments in page coordinates (millimetres from the page's top-left corner).
    pub fragments: Vec<Fragment>,
}

/// Slack for float error when comparing a line's bottom with a page edge.
const EDGE_EPSILON_MM: f32 = 1e-3;

/// Assigns fragments to pages in column order. A line that would cross the
/// bottom of its band starts the next page instead, and everything after it
/// moves down by the same amount. Pages exist only for drawn content, so
/// trailing padding never produces a blank page.
pub fn paginate(layout: &LayoutResult, geometry: &PageGeometry) -> Vec<Page> {
    let usable = geometry.usable_height_mm();
    let mut pages: Vec<Page> = vec![Page {
        index: 0,
        fragments: Vec::new(),
    }];
    // Total distance lines have been pushed down so far.
    let mut shift = 0.0_f32;

    for fragment in &layout.fragments {
        let mut top = fragment.top_mm() + shift;
        let mut band = (top / usable).floor().max(0.0) as usize;
        let band_end = (band + 1) as f32 * usable;
        let crosses = top + fragment.height_mm() > band_end + EDGE_EPSILON_MM;
        let band_has_content = pages.get(band).is_some_and(|p| !p.fragments.is_empty());
        if crosses && band_has_content && fragment.height_mm() <= usable {
            shift += band_end - top;
            top = band_end;
            band += 1;
        }

        while pages.len() <= band {
            pages.push(Page {
                index: pages.len(),
                fragments: Vec::new(),
            });
        }
        let dy = geometry.margin_mm + (top - fragment.top_mm()) - band as f32 * usable;
        pages[band]
            .fragments
            .push(fragment.translated(geometry.margin_mm, dy));
    }

    // Bands skipped by a gap taller than a page carry nothing.
    pages.retain(|p| !p.fragments.is_empty() || p.index == 0);
    for (index, page) in pages.iter_mut().enumerate() {
        page.index = index;
    }
    pages
}
