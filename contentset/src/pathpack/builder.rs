//! Folding of path strings into a merged [`PathGraph`].
//!
//! Building happens in two phases. Paths are first folded into a plain tree
//! where every node has exactly one parent. Once all paths are in, the tree
//! is collapsed bottom-up: each node is interned by its name and its edge
//! list (with children already replaced by their interned ids), so any two
//! subtrees that read the same from that point on end up as one node. This
//! is the classic minimisation of an acyclic automaton, and it is what lets
//! hundreds of `.../os`, `.../source/SRPMS` and `.../debug` tails share
//! storage.

use std::collections::HashMap;

use super::graph::{Edge, Link, NodeId, PathGraph};

/// Tree node used while folding; links point at other tree nodes.
#[derive(Debug)]
struct TreeNode {
    name: String,
    children: Vec<Edge>,
}

/// Incremental builder for a [`PathGraph`].
#[derive(Debug)]
pub struct PathGraphBuilder {
    nodes: Vec<TreeNode>,
}

impl Default for PathGraphBuilder {
    fn default() -> Self {
        Self {
            nodes: vec![TreeNode { name: String::new(), children: Vec::new() }],
        }
    }
}

impl<S: AsRef<str>> Extend<S> for PathGraphBuilder {
    fn extend<I: IntoIterator<Item = S>>(&mut self, paths: I) {
        for path in paths {
            self.insert(path.as_ref());
        }
    }
}

impl PathGraphBuilder {
    /// Folds one path into the tree. A path without any non-empty segment is
    /// ignored.
    pub fn insert(&mut self, path: &str) {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty()).peekable();
        let mut current = 0;

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                self.push_terminal(current, segment);
            } else {
                current = self.child_or_insert(current, segment);
            }
        }
    }

    /// Adds a terminal edge ahead of any node edge with the same name.
    fn push_terminal(&mut self, parent: usize, segment: &str) {
        let children = &mut self.nodes[parent].children;
        let position = children.partition_point(|edge| edge.name() < segment);
        children.insert(position, Edge::new(segment, Link::Terminal));
    }

    /// Returns the tree node reached from `parent` via `segment`, creating it
    /// when it does not exist yet.
    fn child_or_insert(&mut self, parent: usize, segment: &str) -> usize {
        let children = &self.nodes[parent].children;
        let start = children.partition_point(|edge| edge.name() < segment);
        let end = children.partition_point(|edge| edge.name() <= segment);

        if let Some(Link::Node(id)) = children[start..end].last().map(Edge::link) {
            return id.index();
        }

        let child = self.nodes.len();
        self.nodes.push(TreeNode { name: segment.to_string(), children: Vec::new() });
        self.nodes[parent]
            .children
            .insert(end, Edge::new(segment, Link::Node(NodeId::new(child))));

        child
    }

    /// Number of tree nodes folded so far, before merging.
    pub fn tree_size(&self) -> usize {
        self.nodes.len()
    }

    /// Merges structurally identical subtrees and returns the finished graph.
    pub fn build(self) -> PathGraph {
        let tree_size = self.nodes.len();
        let mut interned: HashMap<(String, Vec<Edge>), usize> = HashMap::with_capacity(tree_size);
        let mut canonical = vec![0; tree_size];

        // A child is always created after its parent, so walking the tree
        // backwards reaches every child before its parent.
        for (index, node) in self.nodes.into_iter().enumerate().rev() {
            let children = node
                .children
                .into_iter()
                .map(|edge| match edge.link() {
                    Link::Node(child) => Edge::new(
                        edge.name(),
                        Link::Node(NodeId::new(canonical[child.index()])),
                    ),
                    Link::Terminal => edge,
                })
                .collect();

            let next = interned.len();
            canonical[index] = *interned.entry((node.name, children)).or_insert(next);
        }

        let mut records: Vec<_> = interned.into_iter().map(|(record, id)| (id, record)).collect();
        records.sort_unstable_by_key(|(id, _)| *id);
        let records: Vec<_> = records.into_iter().map(|(_, record)| record).collect();

        tracing::trace!(tree_size, merged_size = records.len(), "merged path tree");

        PathGraph::from_records(canonical[0], records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathpack::PathNode;

    fn body_paths() -> Vec<String> {
        (0..20)
            .map(|i| format!("/head/neck/shoulders/heart{i}/waist{i}/leg/foot/heel"))
            .collect()
    }

    #[test]
    fn children_are_sorted_alphabetically() {
        let graph = PathGraph::build(["/BBB", "/CCC", "/AAA"]);

        let names: Vec<&str> = graph.root().children().iter().map(Edge::name).collect();
        assert_eq!(names, ["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn shared_suffix_is_stored_once() {
        let graph = PathGraph::build(body_paths());

        let mut legs = Vec::new();
        let mut feet = Vec::new();
        for i in 0..20 {
            let heart = format!("heart{i}");
            let waist = format!("waist{i}");
            let prefix = ["head", "neck", "shoulders", heart.as_str(), waist.as_str()];

            let waist_node = graph.walk(prefix).expect("waist node exists");
            let leg = waist_node.child_node("leg").expect("leg node exists");
            let leg_node = graph.node(leg).expect("leg node is in the arena");
            let foot = leg_node.child_node("foot").expect("foot node exists");
            let foot_node = graph.node(foot).expect("foot node is in the arena");

            assert_eq!(foot_node.children().len(), 1);
            assert_eq!(foot_node.children()[0].name(), "heel");
            assert!(foot_node.children()[0].is_terminal());

            legs.push(leg);
            feet.push(foot);
        }

        legs.dedup();
        feet.dedup();
        assert_eq!(legs.len(), 1, "every path should reach the same leg node");
        assert_eq!(feet.len(), 1, "every path should reach the same foot node");
    }

    #[test]
    fn shared_prefix_is_stored_once() {
        let graph = PathGraph::build(body_paths());

        let shoulders = graph.walk(["head", "neck", "shoulders"]).expect("shoulders exists");
        assert_eq!(shoulders.children().len(), 20);

        let head_nodes = graph.nodes().filter(|node| node.name() == "head").count();
        let neck_nodes = graph.nodes().filter(|node| node.name() == "neck").count();
        let shoulder_nodes = graph.nodes().filter(|node| node.name() == "shoulders").count();
        assert_eq!((head_nodes, neck_nodes, shoulder_nodes), (1, 1, 1));

        // root, head, neck, shoulders, 20 hearts, 20 waists, leg, foot
        assert_eq!(graph.len(), 46);
    }

    #[test]
    fn nodes_with_different_names_are_not_merged() {
        let graph = PathGraph::build(["/x/leg", "/y/leg"]);

        let x = graph.root().child_node("x").expect("x exists");
        let y = graph.root().child_node("y").expect("y exists");
        assert_ne!(x, y);
        assert_eq!(graph.node(x).map(PathNode::children), graph.node(y).map(PathNode::children));
    }

    #[test]
    fn identical_trees_collapse_across_branches() {
        let graph = PathGraph::build([
            "/content/dist/rhel/server/7/os",
            "/content/dist/rhel/server/7/debug",
            "/content/beta/rhel/server/7/os",
            "/content/beta/rhel/server/7/debug",
        ]);

        let dist = graph.walk(["content", "dist", "rhel"]).map(PathNode::id);
        let beta = graph.walk(["content", "beta", "rhel"]).map(PathNode::id);
        assert!(dist.is_some());
        assert_eq!(dist, beta);

        // root, content, dist, beta, rhel, server, 7
        assert_eq!(graph.len(), 7);
    }

    #[test]
    fn tree_size_counts_unmerged_nodes() {
        let mut builder = PathGraphBuilder::default();
        builder.insert("/a/b/c");
        builder.insert("/x/b/c");
        builder.insert("/");

        assert_eq!(builder.tree_size(), 5);
        assert_eq!(builder.build().len(), 4);
    }
}
