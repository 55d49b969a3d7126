//! Namespace graph.
//!
//! A `petgraph::DiGraph` whose nodes hold the names declared directly in one
//! namespace and whose edges are either `Contains(name)` (parent to child) or
//! `Uses` (a `using namespace` directive). Nodes only map names to hashes;
//! the entries themselves live in [`SymbolRegistry`](crate::SymbolRegistry).

use libscript_core::{OperatorKind, TypeHash};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

/// Edge kinds in the namespace graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEdge {
    /// Parent contains the child namespace with this simple name.
    Contains(String),
    /// `using namespace`: the source imports the target.
    Uses,
}

/// Names declared directly in one namespace.
#[derive(Debug, Default, Clone)]
pub struct NamespaceData {
    /// Classes, enums, closures and aliases by simple name.
    pub types: FxHashMap<String, TypeHash>,
    /// Overload sets by simple name.
    pub functions: FxHashMap<String, Vec<TypeHash>>,
    pub function_templates: FxHashMap<String, Vec<TypeHash>>,
    pub class_templates: FxHashMap<String, TypeHash>,
    pub globals: FxHashMap<String, TypeHash>,
    /// Values of unscoped enums, visible without qualification.
    pub enum_values: FxHashMap<String, (TypeHash, i64)>,
    /// Free operator functions.
    pub operators: FxHashMap<OperatorKind, Vec<TypeHash>>,
}

impl NamespaceData {
    /// Whether anything named `name` is declared here.
    pub fn declares(&self, name: &str) -> bool {
        self.types.contains_key(name)
            || self.functions.contains_key(name)
            || self.function_templates.contains_key(name)
            || self.class_templates.contains_key(name)
            || self.globals.contains_key(name)
            || self.enum_values.contains_key(name)
    }
}

/// The namespace hierarchy.
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    graph: DiGraph<NamespaceData, NamespaceEdge>,
    root: NodeIndex,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(NamespaceData::default());
        Self { graph, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn namespace(&self, node: NodeIndex) -> Option<&NamespaceData> {
        self.graph.node_weight(node)
    }

    pub fn namespace_mut(&mut self, node: NodeIndex) -> Option<&mut NamespaceData> {
        self.graph.node_weight_mut(node)
    }

    /// Data of a node obtained from this tree.
    pub(crate) fn data_mut(&mut self, node: NodeIndex) -> &mut NamespaceData {
        &mut self.graph[node]
    }

    pub fn find_child(&self, parent: NodeIndex, name: &str) -> Option<NodeIndex> {
        self.graph.edges(parent).find_map(|edge| match edge.weight() {
            NamespaceEdge::Contains(child) if child == name => Some(edge.target()),
            _ => None,
        })
    }

    pub fn get_or_create_child(&mut self, parent: NodeIndex, name: &str) -> NodeIndex {
        if let Some(child) = self.find_child(parent, name) {
            return child;
        }
        let child = self.graph.add_node(NamespaceData::default());
        self.graph.add_edge(parent, child, NamespaceEdge::Contains(name.to_string()));
        child
    }

    /// Node for `a::b::c`, creating missing levels. `""` is the root.
    pub fn get_or_create_path(&mut self, path: &str) -> NodeIndex {
        segments(path).fold(self.root, |node, segment| self.get_or_create_child(node, segment))
    }

    /// Node for `a::b::c` if every level exists.
    pub fn get_path(&self, path: &str) -> Option<NodeIndex> {
        segments(path).try_fold(self.root, |node, segment| self.find_child(node, segment))
    }

    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find(|edge| matches!(edge.weight(), NamespaceEdge::Contains(_)))
            .map(|edge| edge.source())
    }

    /// `node`, its parent, and so on up to the root.
    pub fn ancestors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(Some(node), move |n| self.parent(*n))
    }

    /// Full `a::b` path of a node. The root is `""`.
    pub fn path_of(&self, node: NodeIndex) -> String {
        let mut names: Vec<&str> = self
            .ancestors(node)
            .filter_map(|n| {
                self.graph
                    .edges_directed(n, Direction::Incoming)
                    .find_map(|edge| match edge.weight() {
                        NamespaceEdge::Contains(name) => Some(name.as_str()),
                        NamespaceEdge::Uses => None,
                    })
            })
            .collect();
        names.reverse();
        names.join("::")
    }

    /// Record `using namespace target` inside `from`.
    pub fn add_using(&mut self, from: NodeIndex, target: NodeIndex) {
        let exists = self
            .graph
            .edges(from)
            .any(|e| e.target() == target && *e.weight() == NamespaceEdge::Uses);
        if !exists && from != target {
            self.graph.add_edge(from, target, NamespaceEdge::Uses);
        }
    }

    /// Namespaces imported into `node` by `using` directives, in declaration order.
    pub fn imports(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut targets: Vec<(usize, NodeIndex)> = self
            .graph
            .edges(node)
            .filter(|e| *e.weight() == NamespaceEdge::Uses)
            .map(|e| (e.id().index(), e.target()))
            .collect();
        targets.sort_unstable_by_key(|(id, _)| *id);
        targets.into_iter().map(|(_, t)| t).collect()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split("::").filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_create_nested_levels() {
        let mut tree = NamespaceTree::new();
        let inner = tree.get_or_create_path("Game::World");
        let outer = tree.get_path("Game").expect("outer exists");
        assert_eq!(tree.parent(inner), Some(outer));
        assert_eq!(tree.parent(outer), Some(tree.root()));
        assert_eq!(tree.path_of(inner), "Game::World");
        assert_eq!(tree.path_of(tree.root()), "");
    }

    #[test]
    fn get_path_does_not_create() {
        let tree = NamespaceTree::new();
        assert!(tree.get_path("Missing").is_none());
        assert_eq!(tree.get_path(""), Some(tree.root()));
    }

    #[test]
    fn ancestors_end_at_root() {
        let mut tree = NamespaceTree::new();
        let node = tree.get_or_create_path("a::b::c");
        let chain: Vec<_> = tree.ancestors(node).collect();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.last().copied(), Some(tree.root()));
    }

    #[test]
    fn using_edges_are_not_parents() {
        let mut tree = NamespaceTree::new();
        let a = tree.get_or_create_path("a");
        let b = tree.get_or_create_path("b");
        tree.add_using(a, b);
        tree.add_using(a, b);
        assert_eq!(tree.imports(a), vec![b]);
        assert_eq!(tree.parent(b), Some(tree.root()));
        assert_eq!(tree.path_of(b), "b");
    }

    #[test]
    fn declares_checks_every_table() {
        let mut data = NamespaceData::default();
        assert!(!data.declares("x"));
        data.globals.insert("x".into(), TypeHash(1));
        assert!(data.declares("x"));
    }
}
