//! Scoped normalisation of layout-affecting styles.
//!
//! While a `StyleGuard` is alive the preview subtree is pinned to a fixed A4
//! width with visible overflow and normal wrapping, so layout never depends on
//! how the preview happened to be displayed. Dropping the guard puts every
//! touched property back, on the success path and on every error path alike.

use crate::render::tree::{Length, Node, Overflow, Style, WhiteSpace, WordBreak, A4_WIDTH_PX};

/// The properties a guard overrides, saved per node in pre-order.
#[derive(Debug, Clone, PartialEq)]
struct SavedLayout {
    width: Option<Length>,
    overflow: Option<Overflow>,
    white_space: Option<WhiteSpace>,
    word_break: Option<WordBreak>,
    zoom: Option<f32>,
}

impl SavedLayout {
    fn capture(style: &Style) -> Self {
        Self {
            width: style.width,
            overflow: style.overflow,
            white_space: style.white_space,
            word_break: style.word_break,
            zoom: style.zoom,
        }
    }

    fn restore(self, style: &mut Style) {
        style.width = self.width;
        style.overflow = self.overflow;
        style.white_space = self.white_space;
        style.word_break = self.word_break;
        style.zoom = self.zoom;
    }
}

pub struct StyleGuard<'a> {
    root: &'a mut Node,
    saved: Vec<SavedLayout>,
}

impl<'a> StyleGuard<'a> {
    pub fn normalize(root: &'a mut Node) -> Self {
        let mut saved = Vec::with_capacity(root.node_count());
        root.walk_mut(&mut |node| {
            saved.push(SavedLayout::capture(&node.style));
            node.style.overflow = Some(Overflow::Visible);
            node.style.white_space = Some(WhiteSpace::Normal);
            node.style.word_break = Some(WordBreak::Normal);
            node.style.zoom = None;
        });
        root.style.width = Some(Length::Px(A4_WIDTH_PX));
        Self { root, saved }
    }

    pub fn node(&self) -> &Node {
        &*self.root
    }
}

impl Drop for StyleGuard<'_> {
    fn drop(&mut self) {
        let mut saved = std::mem::take(&mut self.saved).into_iter();
        self.root.walk_mut(&mut |node| {
            if let Some(original) = saved.next() {
                original.restore(&mut node.style);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tree::{Tag, PREVIEW_ROOT_ID};

    fn squeezed_preview() -> Node {
        Node::new(Tag::Div)
            .with_id(PREVIEW_ROOT_ID)
            .styled(|s| {
                s.width = Some(Length::Px(320.0));
                s.overflow = Some(Overflow::Hidden);
                s.zoom = Some(0.5);
            })
            .child(Node::text(Tag::P, "text").styled(|s| {
                s.white_space = Some(WhiteSpace::NoWrap);
                s.word_break = Some(WordBreak::BreakAll);
            }))
    }

    #[test]
    fn test_normalize_pins_layout_properties() {
        let mut root = squeezed_preview();
        let guard = StyleGuard::normalize(&mut root);
        let node = guard.node();
        assert_eq!(node.style.width, Some(Length::Px(A4_WIDTH_PX)));
        assert_eq!(node.style.overflow, Some(Overflow::Visible));
        assert_eq!(node.style.zoom, None);
        assert_eq!(node.children[0].style.white_space, Some(WhiteSpace::Normal));
        assert_eq!(node.children[0].style.word_break, Some(WordBreak::Normal));
    }

    #[test]
    fn test_drop_restores_every_node() {
        let mut root = squeezed_preview();
        let before = root.clone();
        {
            let _guard = StyleGuard::normalize(&mut root);
        }
        assert_eq!(root, before);
    }

    #[test]
    fn test_restores_on_early_return() {
        fn fails_midway(root: &mut Node) -> Result<(), &'static str> {
            let _guard = StyleGuard::normalize(root);
            Err("layout failed")
        }
        let mut root = squeezed_preview();
        let before = root.clone();
        assert!(fails_midway(&mut root).is_err());
        assert_eq!(root, before);
    }

    #[test]
    fn test_unset_properties_are_restored_to_unset() {
        let mut root = Node::new(Tag::Div).child(Node::text(Tag::P, "x"));
        {
            let _guard = StyleGuard::normalize(&mut root);
        }
        assert_eq!(root.style.width, None);
        assert_eq!(root.children[0].style.white_space, None);
    }
}
