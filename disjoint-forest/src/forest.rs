use smallvec::SmallVec;

use crate::error::ForestError;
use crate::handle::NodeHandle;
use crate::node::Node;

/// Slot table entry. Occupied slots point into the dense node vector; free
/// slots chain into an intrusive free list for reuse by `make_set`.
#[derive(Debug, Clone)]
enum SlotState {
    Occupied { index: usize },
    Free { next: Option<u32> },
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    state: SlotState,
}

/// A disjoint-set forest over payloads of type `T`.
///
/// The forest owns every node it creates; callers hold [`NodeHandle`]s and
/// pass them back into [`find`](Forest::find), [`union_sets`](Forest::union_sets)
/// and [`contract`](Forest::contract). Lookups use full path compression and
/// merges use union by rank, so a `find`/`union_sets` sequence runs in
/// near-constant amortized time. [`contract`](Forest::contract) removes a
/// single node while keeping the rest of its class connected; it scans all
/// live nodes and is O(n).
///
/// Nodes live in a dense vector in creation order, addressed through a
/// generation-tagged slot table. Removing a node bumps its slot's generation,
/// so handles left over from `contract` or `clear` fail with
/// [`ForestError::InvalidHandle`] instead of aliasing a later node.
#[derive(Debug, Clone)]
pub struct Forest<T> {
    /// Live nodes, dense, in creation order. Removal keeps relative order.
    nodes: Vec<Node<T>>,
    slots: Vec<Slot>,
    free_head: Option<u32>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Forest::new()
    }
}

impl<T> Forest<T> {
    /// An empty forest with no reserved storage.
    pub fn new() -> Self {
        Forest {
            nodes: Vec::new(),
            slots: Vec::new(),
            free_head: None,
        }
    }

    /// An empty forest with storage reserved for `capacity` nodes.
    ///
    /// Purely an allocation hint: growth past it is always permitted.
    pub fn with_capacity(capacity: usize) -> Self {
        Forest {
            nodes: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free_head: None,
        }
    }

    /// Create a new singleton class holding `data`.
    ///
    /// The new node is the root of its own class, with rank 0.
    pub fn make_set(&mut self, data: T) -> NodeHandle {
        let index = self.nodes.len();
        let slot = match self.free_head {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                let SlotState::Free { next } = entry.state else {
                    unreachable!("free list points at an occupied slot");
                };
                self.free_head = next;
                entry.state = SlotState::Occupied { index };
                slot
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Occupied { index },
                });
                slot
            }
        };
        self.nodes.push(Node::root(data, slot));
        self.handle_at(slot)
    }

    /// Return the representative of `handle`'s class.
    ///
    /// Walks the parent chain to the root, then rewrites the parent link of
    /// every walked node directly to that root, so later lookups along the
    /// same path are O(1). Compression never changes class membership or any
    /// rank.
    pub fn find(&mut self, handle: NodeHandle) -> Result<NodeHandle, ForestError> {
        let start = self.resolve(handle)?;

        // Walk up, remembering the path; it stays short once compression
        // has run.
        let mut path: SmallVec<[u32; 16]> = SmallVec::new();
        let mut cur = start;
        while let Some(parent) = self.nodes[cur].parent {
            path.push(self.nodes[cur].slot);
            cur = self.index_of(parent);
        }
        let root_slot = self.nodes[cur].slot;

        for slot in path {
            let index = self.index_of(slot);
            self.nodes[index].parent = Some(root_slot);
        }

        Ok(self.handle_at(root_slot))
    }

    /// Merge the classes containing `a` and `b`.
    ///
    /// A no-op when both are already in the same class. Merging attaches the
    /// root of smaller rank beneath the root of larger rank; on a tie the
    /// surviving root's rank grows by one. Which of the two roots survives a
    /// tie is deterministic but not part of the contract.
    pub fn union_sets(&mut self, a: NodeHandle, b: NodeHandle) -> Result<(), ForestError> {
        // Validate both handles before compressing anything.
        self.resolve(a)?;
        self.resolve(b)?;

        let root_a = self.find(a)?;
        let root_b = self.find(b)?;
        if root_a == root_b {
            return Ok(());
        }

        let (mut parent, mut child) = (root_a.slot, root_b.slot);
        let (mut parent_rank, mut child_rank) = (self.rank_of(parent), self.rank_of(child));
        if parent_rank < child_rank {
            std::mem::swap(&mut parent, &mut child);
            std::mem::swap(&mut parent_rank, &mut child_rank);
        }

        let child_index = self.index_of(child);
        self.nodes[child_index].parent = Some(parent);
        if parent_rank == child_rank {
            let parent_index = self.index_of(parent);
            self.nodes[parent_index].rank += 1;
        }
        Ok(())
    }

    /// Reserve storage for `additional` more nodes beyond the current
    /// capacity.
    ///
    /// Fails with [`ForestError::InvalidCapacity`] when `additional` is zero.
    /// Has no effect on contents or class structure.
    pub fn expand(&mut self, additional: usize) -> Result<(), ForestError> {
        if additional == 0 {
            return Err(ForestError::InvalidCapacity);
        }
        let node_target = self.nodes.capacity() + additional;
        self.nodes.reserve(node_target - self.nodes.len());
        let slot_target = self.slots.capacity() + additional;
        self.slots.reserve(slot_target - self.slots.len());
        Ok(())
    }

    /// Remove a single node, returning its payload.
    ///
    /// Direct children of the removed node are reattached so the rest of its
    /// class stays connected:
    ///
    /// * removing a root promotes its first direct child (in storage order)
    ///   to be the new root and hangs the remaining direct children beneath
    ///   it; the promoted child keeps its old rank, which may understate
    ///   true height after repeated contractions;
    /// * removing an interior node moves its direct children one hop up, to
    ///   the removed node's own parent.
    ///
    /// Nodes whose paths were already compressed past the removed node never
    /// routed through it and are unaffected. Scans every live node: O(n).
    pub fn contract(&mut self, handle: NodeHandle) -> Result<T, ForestError> {
        let index = self.resolve(handle)?;
        let slot = handle.slot;

        match self.nodes[index].parent {
            None => {
                let mut promoted: Option<u32> = None;
                for node in &mut self.nodes {
                    if node.parent != Some(slot) {
                        continue;
                    }
                    match promoted {
                        None => {
                            node.parent = None;
                            promoted = Some(node.slot);
                        }
                        Some(root) => node.parent = Some(root),
                    }
                }
            }
            Some(parent) => {
                for node in &mut self.nodes {
                    if node.parent == Some(slot) {
                        node.parent = Some(parent);
                    }
                }
            }
        }

        Ok(self.remove_at(index))
    }

    /// Remove every node and reset the size to zero.
    ///
    /// All outstanding handles go stale. Reserved storage is kept; capacity
    /// is a hint, not contents.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_head = None;
        for (slot, entry) in self.slots.iter_mut().enumerate().rev() {
            entry.generation = entry.generation.wrapping_add(1);
            entry.state = SlotState::Free {
                next: self.free_head,
            };
            self.free_head = Some(slot as u32);
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reserved node storage.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `handle` names a live node in this forest.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Snapshot of all live node handles, in internal storage order.
    ///
    /// The order is an implementation artifact (creation order of the live
    /// nodes), not a semantic guarantee.
    pub fn handles(&self) -> Vec<NodeHandle> {
        self.nodes.iter().map(|n| self.handle_at(n.slot)).collect()
    }

    /// Shared access to a node's payload.
    pub fn get(&self, handle: NodeHandle) -> Result<&T, ForestError> {
        let index = self.resolve(handle)?;
        Ok(&self.nodes[index].data)
    }

    /// Exclusive access to a node's payload. The payload is opaque to the
    /// forest; mutating it never affects class structure.
    pub fn get_mut(&mut self, handle: NodeHandle) -> Result<&mut T, ForestError> {
        let index = self.resolve(handle)?;
        Ok(&mut self.nodes[index].data)
    }

    /// The node's current rank: an upper bound on the height of the subtree
    /// rooted at it, not an exact height once compression or contraction has
    /// run.
    pub fn rank(&self, handle: NodeHandle) -> Result<u32, ForestError> {
        let index = self.resolve(handle)?;
        Ok(self.nodes[index].rank)
    }

    /// Map a handle to its dense index, rejecting stale or absent handles.
    fn resolve(&self, handle: NodeHandle) -> Result<usize, ForestError> {
        let entry = self
            .slots
            .get(handle.slot as usize)
            .ok_or(ForestError::InvalidHandle)?;
        if entry.generation != handle.generation {
            return Err(ForestError::InvalidHandle);
        }
        match entry.state {
            SlotState::Occupied { index } => Ok(index),
            SlotState::Free { .. } => Err(ForestError::InvalidHandle),
        }
    }

    /// Dense index of a live slot. Parent links only ever name live slots.
    fn index_of(&self, slot: u32) -> usize {
        match self.slots[slot as usize].state {
            SlotState::Occupied { index } => index,
            SlotState::Free { .. } => unreachable!("parent link names a freed slot"),
        }
    }

    fn handle_at(&self, slot: u32) -> NodeHandle {
        NodeHandle {
            slot,
            generation: self.slots[slot as usize].generation,
        }
    }

    fn rank_of(&self, slot: u32) -> u32 {
        self.nodes[self.index_of(slot)].rank
    }

    /// Drop the node at `index` from dense storage, keeping relative order,
    /// and retire its slot to the free list under a fresh generation.
    fn remove_at(&mut self, index: usize) -> T {
        let node = self.nodes.remove(index);
        for shifted in &self.nodes[index..] {
            if let SlotState::Occupied { index: dense } =
                &mut self.slots[shifted.slot as usize].state
            {
                *dense -= 1;
            }
        }
        let entry = &mut self.slots[node.slot as usize];
        entry.generation = entry.generation.wrapping_add(1);
        entry.state = SlotState::Free {
            next: self.free_head,
        };
        self.free_head = Some(node.slot);
        node.data
    }
}
