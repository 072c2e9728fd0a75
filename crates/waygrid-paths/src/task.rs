use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use waygrid_core::{Point, euclidean};

use crate::node::{NodeId, OpenRef, PathNode};

/// Identity of a path request, used to correlate results and cancellations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receives the waypoints (origin to destination, inclusive) and the total
/// cost of a resolved task, or `None` and `0.0` when no route exists.
pub type TaskCallback = Box<dyn FnOnce(Option<Vec<Point>>, f64)>;

/// Convenience constructor for a [`TaskCallback`].
pub fn callback<F>(f: F) -> TaskCallback
where
    F: FnOnce(Option<Vec<Point>>, f64) + 'static,
{
    Box::new(f)
}

/// Lifecycle of a [`PathTask`].
///
/// `Idle → Processing → {Complete | Failed | Canceled}`; an idle task may
/// also be canceled directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Processing,
    Complete,
    Failed,
    Canceled,
}

impl TaskState {
    /// Whether no further transition is possible.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Canceled)
    }
}

/// One point-to-point request and its private search tree.
///
/// Nodes live in an arena; parents are [`NodeId`]s into it, and a
/// coordinate map gives O(1) "seen this cell?" checks during expansion.
/// The open list is a binary heap with lazy invalidation: when an open node
/// is reparented a fresh entry is pushed and the old one is skipped on pop.
pub struct PathTask {
    id: TaskId,
    origin: Point,
    destination: Point,
    nodes: Vec<PathNode>,
    index: HashMap<Point, NodeId>,
    open: BinaryHeap<OpenRef>,
    seq: u64,
    state: TaskState,
    callback: Option<TaskCallback>,
    expanded: usize,
}

impl PathTask {
    /// Create an idle task seeded with its origin node.
    pub fn new(id: TaskId, origin: Point, destination: Point, callback: TaskCallback) -> Self {
        let mut task = Self {
            id,
            origin,
            destination,
            nodes: Vec::new(),
            index: HashMap::new(),
            open: BinaryHeap::new(),
            seq: 0,
            state: TaskState::Idle,
            callback: Some(callback),
            expanded: 0,
        };
        task.add_node(None, origin, 0.0);
        task
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[inline]
    pub fn destination(&self) -> Point {
        self.destination
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Number of nodes closed so far.
    #[inline]
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Number of coordinates this task has ever visited.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &PathNode {
        &self.nodes[id.0]
    }

    /// The node created for `p`, if any.
    pub fn pick_node(&self, p: Point) -> Option<NodeId> {
        self.index.get(&p).copied()
    }

    /// Create and open a node for a coordinate seen for the first time.
    pub fn add_node(&mut self, parent: Option<NodeId>, pos: Point, g: f64) -> NodeId {
        debug_assert!(!self.index.contains_key(&pos));
        let id = NodeId(self.nodes.len());
        let mut node = PathNode::new(parent, pos, g, euclidean(pos, self.destination));
        node.open();
        self.nodes.push(node);
        self.index.insert(pos, id);
        self.push_open(id);
        id
    }

    /// Offer a route of cost `g` through `parent` to an existing node.
    ///
    /// Only open nodes are updated; a closed node keeps its first route even
    /// if the overlay has since made a cheaper one available.
    pub fn improve(&mut self, id: NodeId, parent: NodeId, g: f64) -> bool {
        let node = &mut self.nodes[id.0];
        if !node.is_open() || g >= node.cost() {
            return false;
        }
        node.reparent(parent, g);
        self.push_open(id);
        true
    }

    /// Pop the open node with the lowest `g + h`, skipping stale entries.
    pub fn take_next(&mut self) -> Option<NodeId> {
        while let Some(entry) = self.open.pop() {
            let node = &self.nodes[entry.node.0];
            if node.is_open() && node.seq == entry.seq {
                return Some(entry.node);
            }
        }
        None
    }

    /// Close an open node after it has been selected for expansion.
    pub fn close(&mut self, id: NodeId) {
        if self.nodes[id.0].close() {
            self.expanded += 1;
        }
    }

    /// Waypoints from the origin to `id`, inclusive.
    pub fn path_to(&self, id: NodeId) -> Vec<Point> {
        let mut path = Vec::new();
        let mut cur = Some(id);
        while let Some(ci) = cur {
            let node = &self.nodes[ci.0];
            path.push(node.pos());
            cur = node.parent();
        }
        path.reverse();
        path
    }

    /// `Idle → Processing`. No effect in any other state.
    pub fn begin(&mut self) {
        if self.state == TaskState::Idle {
            self.state = TaskState::Processing;
        }
    }

    /// Resolve with the route ending at `id` and hand it to the callback.
    pub fn complete(&mut self, id: NodeId) {
        if self.state.is_terminal() {
            return;
        }
        self.state = TaskState::Complete;
        let path = self.path_to(id);
        let cost = self.nodes[id.0].cost();
        if let Some(cb) = self.callback.take() {
            cb(Some(path), cost);
        }
    }

    /// Resolve without a route.
    pub fn fail(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = TaskState::Failed;
        if let Some(cb) = self.callback.take() {
            cb(None, 0.0);
        }
    }

    /// Abandon the task; its callback is dropped without being called.
    /// Returns `false` if the task had already resolved.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = TaskState::Canceled;
        self.callback = None;
        true
    }

    fn push_open(&mut self, id: NodeId) {
        let seq = self.seq;
        self.seq += 1;
        let node = &mut self.nodes[id.0];
        node.seq = seq;
        self.open.push(OpenRef {
            node: id,
            f: node.total_cost(),
            seq,
        });
    }
}

impl fmt::Debug for PathTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathTask")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("state", &self.state)
            .field("nodes", &self.nodes.len())
            .field("expanded", &self.expanded)
            .finish()
    }
}
