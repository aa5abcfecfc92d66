//! The merged path-segment graph.
//!
//! # Invariants
//!
//! A finished [`PathGraph`] always satisfies:
//! - **Rooted**: node `0` is the root, its name is empty and nothing links
//!   back to it.
//! - **Acyclic**: links only ever lead away from the root.
//! - **Sorted children**: every node's edges are ordered by segment name
//!   (byte order), and among equal names a terminal edge precedes a node
//!   edge. A node has at most one node edge per name.
//! - **Breadth-first ids**: node ids follow a breadth-first walk from the root
//!   that visits children in edge order, so two structurally equal graphs are
//!   also equal value for value.
//! - **Merged**: no two nodes share both a name and an edge list.

use std::collections::VecDeque;

use super::builder::PathGraphBuilder;

/// Position of a node inside a [`PathGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every graph.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index of the node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an edge leads: either another node, or the end of a path.
///
/// `Terminal` orders before any `Node`, which is the tie-break used for
/// edges sharing a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Link {
    /// The path ends with this edge's segment.
    Terminal,
    /// The path continues at the given node.
    Node(NodeId),
}

/// A named edge from a node to its continuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    name: String,
    link: Link,
}

impl Edge {
    pub(crate) fn new(name: impl Into<String>, link: Link) -> Self {
        Self { name: name.into(), link }
    }

    /// The path segment this edge stands for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where this edge leads.
    pub fn link(&self) -> Link {
        self.link
    }

    /// Whether a path ends with this edge.
    pub fn is_terminal(&self) -> bool {
        self.link == Link::Terminal
    }
}

/// One path segment at one position in the merged graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    id: NodeId,
    name: String,
    children: Vec<Edge>,
}

impl PathNode {
    /// The structural identity of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The segment name every edge into this node carries. Empty for the
    /// root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outgoing edges in sorted order.
    pub fn children(&self) -> &[Edge] {
        &self.children
    }

    /// Returns the node edge named `name`, if any.
    pub fn child_node(&self, name: &str) -> Option<NodeId> {
        self.children
            .iter()
            .filter(|edge| edge.name == name)
            .find_map(|edge| match edge.link {
                Link::Node(id) => Some(id),
                Link::Terminal => None,
            })
    }
}

/// Arena holding every node of a merged path graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGraph {
    nodes: Vec<PathNode>,
}

/// The empty graph: a root without children.
impl Default for PathGraph {
    fn default() -> Self {
        Self {
            nodes: vec![PathNode {
                id: NodeId::ROOT,
                name: String::new(),
                children: Vec::new(),
            }],
        }
    }
}

impl PathGraph {
    /// Folds all `paths` into a merged graph.
    ///
    /// Paths are split on `/` and empty segments are dropped, so `/a/b`,
    /// `a/b/` and `/a//b` all describe the same two-segment path.
    pub fn build<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = PathGraphBuilder::default();
        builder.extend(paths);
        builder.build()
    }

    /// Assembles a graph from loose `(name, edges)` records, renumbering the
    /// nodes in breadth-first order from `root`. Records not reachable from
    /// `root` are dropped. Links inside `records` refer to record positions.
    pub(crate) fn from_records(root: usize, records: Vec<(String, Vec<Edge>)>) -> Self {
        let mut ids: Vec<Option<NodeId>> = vec![None; records.len()];
        let mut order = Vec::with_capacity(records.len());
        let mut queue = VecDeque::from([root]);
        ids[root] = Some(NodeId::ROOT);

        while let Some(current) = queue.pop_front() {
            order.push(current);
            for edge in &records[current].1 {
                if let Link::Node(next) = edge.link {
                    if ids[next.0].is_none() {
                        ids[next.0] = Some(NodeId(order.len() + queue.len()));
                        queue.push_back(next.0);
                    }
                }
            }
        }

        let mut records: Vec<Option<(String, Vec<Edge>)>> = records.into_iter().map(Some).collect();
        let nodes = order
            .into_iter()
            .enumerate()
            .filter_map(|(position, index)| {
                let (name, edges) = records[index].take()?;
                let children = edges
                    .into_iter()
                    .map(|edge| match edge.link {
                        Link::Node(next) => Edge {
                            link: ids[next.0].map_or(Link::Terminal, Link::Node),
                            name: edge.name,
                        },
                        Link::Terminal => edge,
                    })
                    .collect();
                Some(PathNode { id: NodeId(position), name, children })
            })
            .collect();

        Self { nodes }
    }

    /// The root node.
    pub fn root(&self) -> &PathNode {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&PathNode> {
        self.nodes.get(id.0)
    }

    /// Iterates over all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &PathNode> {
        self.nodes.iter()
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no paths at all.
    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    /// Follows `segments` from the root along node edges.
    pub fn walk<'a, I>(&self, segments: I) -> Option<&PathNode>
    where
        I: IntoIterator<Item = &'a str>,
    {
        segments
            .into_iter()
            .try_fold(self.root(), |node, segment| self.node(node.child_node(segment)?))
    }

    /// Replays every root-to-terminal walk as a `/`-joined path.
    ///
    /// Paths come out depth first in edge order. A path folded in twice is
    /// returned twice.
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        let mut buffer = String::new();

        // Each frame is (node, next edge to visit, buffer length of the node's prefix).
        let mut stack = vec![(NodeId::ROOT, 0usize, 0usize)];

        while let Some(frame) = stack.last_mut() {
            let (id, next, base) = *frame;
            let Some(edge) = self.nodes[id.0].children.get(next) else {
                stack.pop();
                continue;
            };
            frame.1 += 1;

            buffer.truncate(base);
            buffer.push('/');
            buffer.push_str(&edge.name);

            match edge.link {
                Link::Terminal => paths.push(buffer.clone()),
                Link::Node(child) => stack.push((child, 0, buffer.len())),
            }
        }

        paths
    }
}
