use std::cmp::Ordering;

use waygrid_core::Point;

/// Index of a node inside its task's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a node stands in the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Membership {
    #[default]
    Unvisited,
    Open,
    Closed,
}

/// A node of one task's search tree.
///
/// `g` is the cost of the best known route from the origin; `h` is the
/// straight-line distance to the destination, fixed at creation.
#[derive(Debug, Clone)]
pub struct PathNode {
    pos: Point,
    parent: Option<NodeId>,
    g: f64,
    h: f64,
    membership: Membership,
    // Sequence stamp of the node's live open-list entry.
    pub(crate) seq: u64,
}

impl PathNode {
    /// Create an unvisited node.
    pub fn new(parent: Option<NodeId>, pos: Point, g: f64, h: f64) -> Self {
        Self {
            pos,
            parent,
            g,
            h,
            membership: Membership::Unvisited,
            seq: 0,
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Accumulated cost from the origin.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.g
    }

    /// Heuristic distance to the destination.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.h
    }

    /// Priority key: `g + h`.
    #[inline]
    pub fn total_cost(&self) -> f64 {
        self.g + self.h
    }

    #[inline]
    pub fn membership(&self) -> Membership {
        self.membership
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.membership == Membership::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.membership == Membership::Closed
    }

    /// Move an unvisited node onto the frontier. Returns `false` if the
    /// node was already open or closed.
    pub fn open(&mut self) -> bool {
        if self.membership != Membership::Unvisited {
            return false;
        }
        self.membership = Membership::Open;
        true
    }

    /// Mark an open node as expanded. Closed nodes never reopen.
    pub fn close(&mut self) -> bool {
        if self.membership != Membership::Open {
            return false;
        }
        self.membership = Membership::Closed;
        true
    }

    /// Record a cheaper route to this node.
    pub fn reparent(&mut self, parent: NodeId, g: f64) {
        debug_assert!(!self.is_closed(), "closed nodes are never reparented");
        self.parent = Some(parent);
        self.g = g;
    }
}

/// Open-list entry, ordered so that `BinaryHeap` pops the lowest `f`
/// first and, among equal `f`, the earliest pushed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenRef {
    pub(crate) node: NodeId,
    pub(crate) f: f64,
    pub(crate) seq: u64,
}

impl Ord for OpenRef {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenRef {}
