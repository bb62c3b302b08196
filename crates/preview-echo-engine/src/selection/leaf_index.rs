use super::dom::DomView;

/// One text leaf of a block and where its text starts in the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf<N> {
    pub node: N,
    /// Char offset of the leaf's first char in the block text.
    pub start: usize,
    /// Length in chars.
    pub len: usize,
}

impl<N> Leaf<N> {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Ordered text leaves of one block.
///
/// Built once per gesture so that block-relative offsets are a lookup
/// instead of a walk over every node before the selection boundary.
#[derive(Debug, Clone)]
pub struct LeafIndex<N> {
    leaves: Vec<Leaf<N>>,
    text: String,
}

impl<N: Copy + Eq> LeafIndex<N> {
    /// Index the text nodes under `block` in document order.
    pub fn build<D>(dom: &D, block: N) -> Self
    where
        D: DomView<Node = N> + ?Sized,
    {
        let mut leaves = Vec::new();
        let mut text = String::new();
        let mut offset = 0;

        let mut stack = vec![block];
        while let Some(node) = stack.pop() {
            if let Some(leaf_text) = dom.text(node) {
                let len = leaf_text.chars().count();
                leaves.push(Leaf {
                    node,
                    start: offset,
                    len,
                });
                text.push_str(leaf_text);
                offset += len;
                continue;
            }
            stack.extend(dom.children(node).into_iter().rev());
        }

        Self { leaves, text }
    }

    /// Concatenated text of every leaf.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total length in chars.
    pub fn len(&self) -> usize {
        self.leaves.last().map_or(0, Leaf::end)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn leaves(&self) -> &[Leaf<N>] {
        &self.leaves
    }

    /// Block-relative offset of a boundary point inside leaf `node`.
    ///
    /// `None` when `node` is not a leaf of this block or `local` is past
    /// the leaf's end.
    pub fn offset_of(&self, node: N, local: usize) -> Option<usize> {
        let leaf = self.leaves.iter().find(|leaf| leaf.node == node)?;
        (local <= leaf.len).then(|| leaf.start + local)
    }

    /// The leaf and local offset a block-relative offset falls in.
    ///
    /// An offset on a leaf boundary resolves to the start of the next leaf,
    /// except at the very end of the block.
    pub fn locate(&self, offset: usize) -> Option<(N, usize)> {
        self.leaves
            .iter()
            .find(|leaf| offset >= leaf.start && offset < leaf.end())
            .or_else(|| self.leaves.iter().rev().find(|leaf| leaf.end() == offset))
            .map(|leaf| (leaf.node, offset - leaf.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preview_echo_html::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn leaves_follow_document_order() {
        let tree = parse("<p>Hello <b>big <i>bright</i></b> world</p>").unwrap();
        let p = tree.children(tree.root())[0];
        let index = LeafIndex::build(&tree, p);

        assert_eq!(index.text(), "Hello big bright world");
        let spans: Vec<_> = index.leaves().iter().map(|l| (l.start, l.len)).collect();
        assert_eq!(spans, vec![(0, 6), (6, 4), (10, 6), (16, 6)]);
        assert_eq!(index.len(), 22);
    }

    #[test]
    fn offsets_are_leaf_start_plus_local() {
        let tree = parse("<p>ab<em>cd</em>ef</p>").unwrap();
        let p = tree.children(tree.root())[0];
        let index = LeafIndex::build(&tree, p);
        let em_text = tree.text_nodes(p)[1];

        assert_eq!(index.offset_of(em_text, 0), Some(2));
        assert_eq!(index.offset_of(em_text, 2), Some(4));
        assert_eq!(index.offset_of(em_text, 3), None);
        assert_eq!(index.offset_of(p, 0), None);
    }

    #[test]
    fn locate_inverts_offset_of() {
        let tree = parse("<p>ab<em>cd</em>ef</p>").unwrap();
        let p = tree.children(tree.root())[0];
        let index = LeafIndex::build(&tree, p);
        let leaves = tree.text_nodes(p);

        assert_eq!(index.locate(0), Some((leaves[0], 0)));
        assert_eq!(index.locate(2), Some((leaves[1], 0)));
        assert_eq!(index.locate(5), Some((leaves[2], 1)));
        assert_eq!(index.locate(6), Some((leaves[2], 2)));
        assert_eq!(index.locate(7), None);
    }

    #[test]
    fn offsets_count_chars() {
        let tree = parse("<p>café <b>crème</b></p>").unwrap();
        let p = tree.children(tree.root())[0];
        let index = LeafIndex::build(&tree, p);
        let b_text = tree.text_nodes(p)[1];
        assert_eq!(index.offset_of(b_text, 1), Some(6));
    }
}
