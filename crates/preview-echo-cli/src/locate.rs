//! Turning "the first place this text appears in the preview" into the
//! selection a user would have made there.

use preview_echo_engine::{
    BlockTags, BoundaryPoint, LeafIndex, SelectionRange, text::occurrences,
};
use preview_echo_html::{NodeId, Tree};

/// Select the first occurrence of `needle` inside a single block.
///
/// Innermost blocks are preferred, so a needle inside a list item selects
/// within the `<li>` rather than its `<ul>`.
pub fn select_text(tree: &Tree, blocks: &BlockTags, needle: &str) -> Option<SelectionRange<NodeId>> {
    let candidates: Vec<(NodeId, LeafIndex<NodeId>, usize)> = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|&n| tree.tag(n).is_some_and(|tag| blocks.contains(tag)))
        .filter_map(|block| {
            let index = LeafIndex::build(tree, block);
            let at = occurrences(index.text(), needle).into_iter().next()?;
            Some((block, index, at))
        })
        .collect();

    let (_, index, at) = candidates.iter().find(|(block, _, _)| {
        !candidates
            .iter()
            .any(|(other, _, _)| other != block && tree.ancestors(*other).any(|a| a == *block))
    })?;

    let end = at + needle.chars().count();
    let (start_node, start_offset) = index.locate(*at)?;
    let (end_node, end_offset) = index.locate(end)?;
    Some(SelectionRange::new(
        BoundaryPoint::new(start_node, start_offset),
        BoundaryPoint::new(end_node, end_offset),
        needle,
    ))
}
