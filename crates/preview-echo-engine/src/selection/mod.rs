//! From a native selection in the preview to a block-relative
//! [`SelectionDescriptor`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{error::SelectionError, host::SelectionRange, models::SelectionDescriptor};

pub mod dom;
pub mod leaf_index;

pub use dom::DomView;
pub use leaf_index::{Leaf, LeafIndex};

/// Tag names that count as blocks for offset addressing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockTags(BTreeSet<String>);

impl Default for BlockTags {
    fn default() -> Self {
        Self::new(["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol"])
    }
}

impl BlockTags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(|t| t.into().to_ascii_lowercase()).collect())
    }

    pub fn with(mut self, tag: &str) -> Self {
        self.0.insert(tag.to_ascii_lowercase());
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Nearest ancestor-or-self of `node` whose tag is a block.
pub fn enclosing_block<D>(dom: &D, node: D::Node, blocks: &BlockTags) -> Option<D::Node>
where
    D: DomView + ?Sized,
{
    std::iter::successors(Some(node), |&n| dom.parent(n))
        .find(|&n| dom.tag_name(n).is_some_and(|tag| blocks.contains(tag)))
}

#[derive(Debug, Clone, Default)]
pub struct SelectionExtractor {
    blocks: BlockTags,
}

impl SelectionExtractor {
    pub fn new(blocks: BlockTags) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &BlockTags {
        &self.blocks
    }

    /// Describe `range` relative to the single block that contains it.
    ///
    /// Does not touch the tree.
    pub fn extract<D>(
        &self,
        dom: &D,
        range: &SelectionRange<D::Node>,
    ) -> Result<SelectionDescriptor, SelectionError>
    where
        D: DomView + ?Sized,
    {
        let selected = range.text.trim();
        if range.is_collapsed() || selected.is_empty() {
            return Err(SelectionError::EmptySelection);
        }

        let start_block = enclosing_block(dom, range.start.node, &self.blocks);
        let end_block = enclosing_block(dom, range.end.node, &self.blocks);
        let block = match (start_block, end_block) {
            (Some(start), Some(end)) if start == end => start,
            _ => return Err(SelectionError::MultiBlockSelection),
        };

        if dom.text(range.start.node).is_none() || dom.text(range.end.node).is_none() {
            return Err(SelectionError::NonTextNode);
        }

        let index = LeafIndex::build(dom, block);
        let start = index
            .offset_of(range.start.node, range.start.offset)
            .ok_or(SelectionError::OffsetComputationFailed)?;
        let end = index
            .offset_of(range.end.node, range.end.offset)
            .ok_or(SelectionError::OffsetComputationFailed)?;
        let length = end
            .checked_sub(start)
            .ok_or(SelectionError::OffsetComputationFailed)?;

        Ok(SelectionDescriptor {
            block_text: index.text().to_string(),
            offset: start,
            length,
            selected_text: selected.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BoundaryPoint;
    use preview_echo_html::{NodeId, Tree, parse};
    use pretty_assertions::assert_eq;

    fn select(start: (NodeId, usize), end: (NodeId, usize), text: &str) -> SelectionRange<NodeId> {
        SelectionRange::new(
            BoundaryPoint::new(start.0, start.1),
            BoundaryPoint::new(end.0, end.1),
            text,
        )
    }

    fn leaves(tree: &Tree) -> Vec<NodeId> {
        tree.text_nodes(tree.root())
    }

    #[test]
    fn describes_selection_within_one_leaf() {
        let tree = parse("<p>Hello there.</p>").unwrap();
        let t = leaves(&tree)[0];
        let descriptor = SelectionExtractor::default()
            .extract(&tree, &select((t, 6), (t, 11), "there"))
            .unwrap();
        assert_eq!(descriptor, SelectionDescriptor::new("Hello there.", 6, 5, "there"));
    }

    #[test]
    fn offsets_span_inline_formatting() {
        let tree = parse("<h2>Big <em>bold</em> title</h2>").unwrap();
        let l = leaves(&tree);
        let descriptor = SelectionExtractor::default()
            .extract(&tree, &select((l[1], 1), (l[2], 3), "old ti"))
            .unwrap();
        assert_eq!(descriptor.block_text, "Big bold title");
        assert_eq!(descriptor.offset, 5);
        assert_eq!(descriptor.length, 6);
    }

    #[test]
    fn selected_text_is_trimmed() {
        let tree = parse("<p>a b c</p>").unwrap();
        let t = leaves(&tree)[0];
        let descriptor = SelectionExtractor::default()
            .extract(&tree, &select((t, 1), (t, 4), " b \u{a0}"))
            .unwrap();
        assert_eq!(descriptor.selected_text, "b");
    }

    #[test]
    fn selections_with_edge_spaces_resolve_to_the_word() {
        let tree = parse("<p>a b c</p>").unwrap();
        let t = leaves(&tree)[0];
        let extractor = SelectionExtractor::default();
        let resolver = crate::resolve::PositionResolver::default();
        for (from, to, text) in [(1, 3, " b"), (2, 4, "b "), (1, 4, " b ")] {
            let descriptor = extractor.extract(&tree, &select((t, from), (t, to), text)).unwrap();
            assert_eq!(
                resolver.resolve(&descriptor, "a b c"),
                Ok(crate::models::EditorRange::new(2, 1)),
                "selection {text:?}"
            );
        }
    }

    #[test]
    fn collapsed_or_blank_selection_is_empty() {
        let tree = parse("<p>a   b</p>").unwrap();
        let t = leaves(&tree)[0];
        let extractor = SelectionExtractor::default();
        assert_eq!(
            extractor.extract(&tree, &select((t, 1), (t, 1), "")),
            Err(SelectionError::EmptySelection)
        );
        assert_eq!(
            extractor.extract(&tree, &select((t, 1), (t, 4), "   ")),
            Err(SelectionError::EmptySelection)
        );
    }

    #[test]
    fn cross_block_selection_is_rejected() {
        let tree = parse("<p>one</p><p>two</p>").unwrap();
        let l = leaves(&tree);
        assert_eq!(
            SelectionExtractor::default().extract(&tree, &select((l[0], 1), (l[1], 2), "ne\ntw")),
            Err(SelectionError::MultiBlockSelection)
        );
    }

    #[test]
    fn selection_outside_any_block_is_rejected() {
        let tree = parse("<div>loose</div>").unwrap();
        let t = leaves(&tree)[0];
        assert_eq!(
            SelectionExtractor::default().extract(&tree, &select((t, 0), (t, 5), "loose")),
            Err(SelectionError::MultiBlockSelection)
        );
    }

    #[test]
    fn element_boundaries_are_not_addressable() {
        let tree = parse("<p>ab<em>cd</em></p>").unwrap();
        let p = tree.children(tree.root())[0];
        let t = leaves(&tree)[0];
        assert_eq!(
            SelectionExtractor::default().extract(&tree, &select((p, 0), (t, 2), "ab")),
            Err(SelectionError::NonTextNode)
        );
    }

    #[test]
    fn local_offset_past_leaf_fails() {
        let tree = parse("<p>ab</p>").unwrap();
        let t = leaves(&tree)[0];
        assert_eq!(
            SelectionExtractor::default().extract(&tree, &select((t, 0), (t, 9), "ab")),
            Err(SelectionError::OffsetComputationFailed)
        );
    }

    #[test]
    fn backwards_range_fails() {
        let tree = parse("<p>abcd</p>").unwrap();
        let t = leaves(&tree)[0];
        assert_eq!(
            SelectionExtractor::default().extract(&tree, &select((t, 3), (t, 1), "bc")),
            Err(SelectionError::OffsetComputationFailed)
        );
    }

    #[test]
    fn nearest_block_wins_inside_lists() {
        let tree = parse("<ul><li>first</li><li>second</li></ul>").unwrap();
        let l = leaves(&tree);
        let descriptor = SelectionExtractor::default()
            .extract(&tree, &select((l[1], 0), (l[1], 3), "sec"))
            .unwrap();
        assert_eq!(descriptor.block_text, "second");
    }

    #[test]
    fn extra_block_tags_are_honoured() {
        let tree = parse("<blockquote>quoted words</blockquote>").unwrap();
        let t = leaves(&tree)[0];
        let range = select((t, 7), (t, 12), "words");

        assert_eq!(
            SelectionExtractor::default().extract(&tree, &range),
            Err(SelectionError::MultiBlockSelection)
        );
        let extractor = SelectionExtractor::new(BlockTags::default().with("blockquote"));
        assert_eq!(extractor.extract(&tree, &range).unwrap().offset, 7);
    }
}
