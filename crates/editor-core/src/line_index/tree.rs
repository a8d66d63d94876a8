/// Augmented search tree over the line breaks of a text store.
///
/// One node per break, keyed by byte offset but stored in relative form (see
/// [`LineNode`]), with a per-subtree line count. That pair of aggregates is
/// what keeps every operation logarithmic in the number of breaks: a plain
/// character edit adjusts a handful of relative offsets instead of renumbering
/// every later line.
///
/// The tree performs no rebalancing. Ascending single inserts (a file scanned
/// left to right) degrade to a right-leaning chain; the bulk-load path
/// ([`LineTree::from_text`]) avoids that by building a balanced tree straight
/// from the sorted scan.
///
/// [`LineNode`]: crate::line_index::node::LineNode
#[derive(Debug)]
pub struct LineTree {
    nodes: Vec<crate::line_index::node::LineNode>,
    free: Vec<crate::line_index::node::NodeId>,
    root: Option<crate::line_index::node::NodeId>,
}

/*

====================
===== CREATION =====
====================

*/

impl LineTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
        }
    }

    /// Builds the index for `bytes` in one pass.
    ///
    /// Scans for breaks with `memchr` and hands the ascending offsets to
    /// [`LineTree::from_sorted_offsets`]; repeated `insert` calls on the same
    /// scan would chain every node down the right spine.
    #[must_use]
    pub fn from_text(bytes: &[u8]) -> Self {
        let offsets: Vec<u64> = memchr::memchr_iter(b'\n', bytes)
            .map(|position| position as u64)
            .collect();

        Self::from_sorted_offsets(&offsets)
    }

    /// Builds a balanced tree from strictly ascending absolute offsets.
    #[must_use]
    pub fn from_sorted_offsets(offsets: &[u64]) -> Self {
        debug_assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));

        let mut tree = Self::new();
        tree.nodes.reserve(offsets.len());
        tree.root = tree.build_balanced(offsets, 0, None);
        tree
    }

    // `base` is the absolute offset of the nearest ancestor whose right
    // subtree this slice lands in (zero along the leftmost edge).
    fn build_balanced(
        &mut self,
        offsets: &[u64],
        base: u64,
        parent: Option<crate::line_index::node::NodeId>,
    ) -> Option<crate::line_index::node::NodeId> {
        if offsets.is_empty() {
            return None;
        }

        let mid = offsets.len() / 2;
        let id = self.alloc(crate::line_index::node::LineNode::leaf(
            offsets[mid] - base,
            parent,
        ));
        let left = self.build_balanced(&offsets[..mid], base, Some(id));
        let right = self.build_balanced(&offsets[mid + 1..], offsets[mid], Some(id));
        let count = 1 + self.count(left) + self.count(right);
        let node = self.node_mut(id);

        node.left = left;
        node.right = right;
        node.subtree_lines = count;

        Some(id)
    }
}

/*

=====================
===== INSERTION =====
=====================

*/

impl LineTree {
    /// Records a line break just written at `offset`.
    ///
    /// Every break at or after `offset` now sits one byte later, so each node
    /// the descent leaves on its left absorbs the break byte into its relative
    /// offset along with the new subtree line; nodes passed on the way right
    /// are untouched. The new node lands as a leaf carrying whatever offset
    /// remains after the right-turn subtractions.
    pub fn insert(&mut self, offset: u64) {
        let mut remaining = offset;
        let mut parent = None;
        let mut went_right = false;
        let mut cur = self.root;

        while let Some(id) = cur {
            parent = Some(id);

            let node = self.node_mut(id);
            node.subtree_lines += 1;

            if remaining > node.relative_offset {
                remaining -= node.relative_offset;
                went_right = true;
                cur = node.right;
            } else {
                node.relative_offset += 1;
                went_right = false;
                cur = node.left;
            }
        }

        let id = self.alloc(crate::line_index::node::LineNode::leaf(remaining, parent));

        match parent {
            None => self.root = Some(id),
            Some(p) if went_right => self.node_mut(p).right = Some(id),
            Some(p) => self.node_mut(p).left = Some(id),
        }
    }
}

/*

=================
===== SHIFT =====
=================

*/

impl LineTree {
    /// Moves every break at or after `offset` by `delta` bytes.
    ///
    /// This is the update for a plain (non-break) character edit: tree shape
    /// is untouched, only the relative offsets along the went-left frontier
    /// of one descent change.
    pub fn shift(&mut self, offset: u64, delta: u64, direction: crate::enums::ShiftDirection) {
        let mut remaining = offset;
        let mut cur = self.root;

        while let Some(id) = cur {
            let node = self.node_mut(id);

            if remaining > node.relative_offset {
                remaining -= node.relative_offset;
                cur = node.right;
            } else {
                match direction {
                    crate::enums::ShiftDirection::Forward => node.relative_offset += delta,
                    crate::enums::ShiftDirection::Backward => {
                        // An underflow here means the caller shifted across a
                        // break instead of deleting it.
                        debug_assert!(node.relative_offset >= delta);
                        node.relative_offset -= delta;
                    }
                }
                cur = node.left;
            }
        }
    }
}

/*

====================
===== DELETION =====
====================

*/

impl LineTree {
    /// Removes the break recorded at exactly `offset`.
    ///
    /// Returns `false`, with the tree untouched, when no break lives there.
    /// Otherwise every strictly later break slides back by the removed byte,
    /// and the node comes out through a standard transplant (splice, single
    /// child, or in-order successor). Relative offsets of re-parented
    /// subtrees are re-derived from the accumulation rule and subtree counts
    /// are rebuilt along the touched path.
    pub fn delete(&mut self, offset: u64) -> bool {
        let Some(z) = self.find(offset) else {
            return false;
        };

        // The removed break's own byte: later breaks all move back by one.
        self.shift(offset + 1, 1, crate::enums::ShiftDirection::Backward);

        let z_rel = self.node(z).relative_offset;
        let z_left = self.node(z).left;
        let z_right = self.node(z).right;
        let z_parent = self.node(z).parent;

        // The nodes anchored to z are exactly the left spine of its right
        // subtree; each re-bases to whatever takes z's slot. Everything
        // else keeps its relative offset through the transplants.
        let refresh_from = match (z_left, z_right) {
            (None, None) => {
                self.transplant(z, None);
                z_parent
            }
            (None, Some(right)) => {
                // The spine hangs one level higher now and re-bases to z's
                // own anchor, absorbing z's offset.
                let mut spine = Some(right);
                while let Some(id) = spine {
                    self.node_mut(id).relative_offset += z_rel;
                    spine = self.node(id).left;
                }
                self.transplant(z, Some(right));
                z_parent
            }
            (Some(left), None) => {
                // A left child never accumulated z's offset, so it moves up
                // unchanged.
                self.transplant(z, Some(left));
                z_parent
            }
            (Some(left), Some(right)) => {
                let y = self.minimum(right);
                let y_rel = self.node(y).relative_offset;

                let refresh_from = if y == right {
                    Some(y)
                } else {
                    // The spine above the successor re-bases from z to y;
                    // y's own right subtree stays y-anchored and only
                    // changes slots.
                    let mut spine = right;
                    while spine != y {
                        self.node_mut(spine).relative_offset -= y_rel;
                        spine = self.node(spine).left.expect("spine leads to the minimum");
                    }

                    let y_parent = self.node(y).parent;
                    let y_right = self.node(y).right;

                    self.transplant(y, y_right);
                    self.node_mut(y).right = Some(right);
                    self.node_mut(right).parent = Some(y);
                    y_parent
                };

                self.transplant(z, Some(y));
                self.node_mut(y).left = Some(left);
                self.node_mut(left).parent = Some(y);
                self.node_mut(y).relative_offset += z_rel;
                refresh_from
            }
        };

        self.refresh_counts_from(refresh_from);
        self.free.push(z);
        true
    }
}

/*

===================
===== QUERIES =====
===================

*/

impl LineTree {
    /// Number of tracked line breaks.
    ///
    /// The document always spans one more line than this, even at zero.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        self.count(self.root)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Handle of the break recorded at exactly `offset`.
    #[must_use]
    pub fn find(&self, offset: u64) -> Option<crate::line_index::node::NodeId> {
        let mut remaining = offset;
        let mut cur = self.root;

        while let Some(id) = cur {
            let node = self.node(id);

            if remaining > node.relative_offset {
                remaining -= node.relative_offset;
                cur = node.right;
            } else if remaining == node.relative_offset {
                return Some(id);
            } else {
                cur = node.left;
            }
        }

        None
    }

    /// Start offset and length of `line`, its terminating break excluded.
    ///
    /// `text_len` bounds the final line, which has no break of its own.
    /// `None` when `line` exceeds the tracked line count.
    #[must_use]
    pub fn line_at(&self, line: u32, text_len: u64) -> Option<(u64, u64)> {
        let breaks = self.len();

        if line > breaks {
            return None;
        }

        let start = if line == 0 {
            0
        } else {
            self.select(line - 1)? + 1
        };

        let length = if line == breaks {
            debug_assert!(text_len >= start);
            text_len - start
        } else {
            self.select(line)? - start
        };

        Some((start, length))
    }

    // Absolute offset of the k-th break (0-based, in-order): the rank query
    // driven by the subtree line counts.
    fn select(&self, mut k: u32) -> Option<u64> {
        let mut accumulated = 0u64;
        let mut cur = self.root;

        while let Some(id) = cur {
            let node = self.node(id);
            let left_lines = self.count(node.left);

            if k < left_lines {
                cur = node.left;
            } else if k == left_lines {
                return Some(accumulated + node.relative_offset);
            } else {
                k -= left_lines + 1;
                accumulated += node.relative_offset;
                cur = node.right;
            }
        }

        None
    }

    /// Absolute byte offset of a break, re-accumulated along the root path.
    #[must_use]
    pub fn offset_of(&self, id: crate::line_index::node::NodeId) -> u64 {
        let mut absolute = self.node(id).relative_offset;
        let mut child = id;
        let mut cur = self.node(id).parent;

        while let Some(p) = cur {
            if self.node(p).right == Some(child) {
                absolute += self.node(p).relative_offset;
            }
            child = p;
            cur = self.node(p).parent;
        }

        absolute
    }
}

/*

=====================
===== TRAVERSAL =====
=====================

*/

impl LineTree {
    /// First (lowest-offset) tracked break.
    #[must_use]
    pub fn first(&self) -> Option<crate::line_index::node::NodeId> {
        self.root.map(|root| self.minimum(root))
    }

    /// Last (highest-offset) tracked break.
    #[must_use]
    pub fn last(&self) -> Option<crate::line_index::node::NodeId> {
        self.root.map(|root| self.maximum(root))
    }

    /// In-order successor: the break after `id`, if any.
    #[must_use]
    pub fn next_line(
        &self,
        id: crate::line_index::node::NodeId,
    ) -> Option<crate::line_index::node::NodeId> {
        if let Some(right) = self.node(id).right {
            return Some(self.minimum(right));
        }

        let mut child = id;
        let mut cur = self.node(id).parent;

        while let Some(p) = cur {
            if self.node(p).left == Some(child) {
                return Some(p);
            }
            child = p;
            cur = self.node(p).parent;
        }

        None
    }

    /// In-order predecessor: the break before `id`, if any.
    #[must_use]
    pub fn prev_line(
        &self,
        id: crate::line_index::node::NodeId,
    ) -> Option<crate::line_index::node::NodeId> {
        if let Some(left) = self.node(id).left {
            return Some(self.maximum(left));
        }

        let mut child = id;
        let mut cur = self.node(id).parent;

        while let Some(p) = cur {
            if self.node(p).right == Some(child) {
                return Some(p);
            }
            child = p;
            cur = self.node(p).parent;
        }

        None
    }

    /// In-order walk over the absolute offsets of every tracked break.
    #[must_use]
    pub fn breaks(&self) -> crate::line_index::iter::BreakIter<'_> {
        crate::line_index::iter::BreakIter::new(self)
    }
}

/*

========================
===== ARENA ACCESS =====
========================

*/

impl LineTree {
    pub(crate) fn root(&self) -> Option<crate::line_index::node::NodeId> {
        self.root
    }

    #[inline]
    pub(crate) fn node(
        &self,
        id: crate::line_index::node::NodeId,
    ) -> &crate::line_index::node::LineNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    fn node_mut(
        &mut self,
        id: crate::line_index::node::NodeId,
    ) -> &mut crate::line_index::node::LineNode {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    fn count(&self, id: Option<crate::line_index::node::NodeId>) -> u32 {
        id.map_or(0, |id| self.node(id).subtree_lines)
    }

    fn alloc(
        &mut self,
        node: crate::line_index::node::LineNode,
    ) -> crate::line_index::node::NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0 as usize] = node;
                id
            }
            None => {
                let id = crate::line_index::node::NodeId(self.nodes.len() as u32);
                self.nodes.push(node);
                id
            }
        }
    }

    fn minimum(
        &self,
        mut id: crate::line_index::node::NodeId,
    ) -> crate::line_index::node::NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    fn maximum(
        &self,
        mut id: crate::line_index::node::NodeId,
    ) -> crate::line_index::node::NodeId {
        while let Some(right) = self.node(id).right {
            id = right;
        }
        id
    }

    // Replaces the subtree rooted at `u` with the one rooted at `v`,
    // rewiring the parent links on both sides.
    fn transplant(
        &mut self,
        u: crate::line_index::node::NodeId,
        v: Option<crate::line_index::node::NodeId>,
    ) {
        let parent = self.node(u).parent;

        match parent {
            None => self.root = v,
            Some(p) => {
                if self.node(p).left == Some(u) {
                    self.node_mut(p).left = v;
                } else {
                    self.node_mut(p).right = v;
                }
            }
        }

        if let Some(v) = v {
            self.node_mut(v).parent = parent;
        }
    }

    // Recomputes subtree line counts from `cur` up to the root.
    fn refresh_counts_from(&mut self, mut cur: Option<crate::line_index::node::NodeId>) {
        while let Some(id) = cur {
            let left = self.node(id).left;
            let right = self.node(id).right;
            let count = 1 + self.count(left) + self.count(right);
            let node = self.node_mut(id);

            node.subtree_lines = count;
            cur = node.parent;
        }
    }
}

impl Default for LineTree {
    fn default() -> Self {
        Self::new()
    }
}
