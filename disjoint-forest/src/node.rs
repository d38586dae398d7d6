/// A single element of the forest: caller payload plus tree links.
///
/// `parent` holds the slot of the parent node; `None` marks a root. Ranks
/// upper-bound subtree height and only guide union order; they are not exact
/// once path compression or contraction has run.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) data: T,
    pub(crate) parent: Option<u32>,
    pub(crate) rank: u32,
    /// Slot this node occupies in the forest's slot table.
    pub(crate) slot: u32,
}

impl<T> Node<T> {
    /// A fresh singleton root.
    pub(crate) fn root(data: T, slot: u32) -> Self {
        Node {
            data,
            parent: None,
            rank: 0,
            slot,
        }
    }

}
