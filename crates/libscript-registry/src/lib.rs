//! Symbol registry for libscript.
//!
//! [`SymbolRegistry`] owns every registered type, function and template;
//! [`NamespaceTree`] maps names to them per namespace.

mod builtins;
mod namespace_tree;
mod registry;

pub use builtins::InitializerListTemplate;
pub use namespace_tree::{NamespaceData, NamespaceEdge, NamespaceTree};
pub use registry::SymbolRegistry;

pub use petgraph::graph::NodeIndex;
