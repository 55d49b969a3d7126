//! Operator candidate sets.

use bitflags::bitflags;
use libscript_core::{DataType, FunctionKind, OperatorKind, TypeHash};
use libscript_registry::SymbolRegistry;

use super::Scope;

bitflags! {
    /// How an operator candidate set is gathered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OperatorLookup: u8 {
        /// Drop candidates whose signature repeats an earlier one.
        const REMOVE_DUPLICATES = 0b0001;
        /// Include member operators inherited from base classes.
        const FETCH_PARENT_OPERATORS = 0b0010;
        /// Search the namespaces of the scope chain and their imports
        /// instead of only the root namespace.
        const CONSIDER_CURRENT_SCOPE = 0b0100;
    }
}

/// Candidates for `op` applied to operands of `operand_types`: built-ins,
/// free operators, then member operators of the first operand's class.
pub(crate) fn gather(
    registry: &SymbolRegistry,
    op: OperatorKind,
    operand_types: &[DataType],
    scope: &Scope,
    flags: OperatorLookup,
) -> Vec<TypeHash> {
    let mut found: Vec<TypeHash> = registry.builtin_operators(op).to_vec();

    let tree = registry.namespaces();
    let mut nodes = Vec::new();
    if flags.contains(OperatorLookup::CONSIDER_CURRENT_SCOPE) {
        for path in scope.namespaces() {
            if let Some(node) = tree.get_path(path) {
                nodes.push(node);
            }
        }
        let imported: Vec<_> = nodes.iter().flat_map(|node| tree.imports(*node)).collect();
        nodes.extend(imported);
    } else {
        nodes.push(tree.root());
    }
    for node in nodes {
        if let Some(ops) = tree.namespace(node).and_then(|data| data.operators.get(&op)) {
            found.extend(ops);
        }
    }

    if let Some(object) = operand_types.first().filter(|ty| registry.get_class(ty.type_hash).is_some()) {
        let chain = registry.base_chain(object.type_hash);
        let classes = if flags.contains(OperatorLookup::FETCH_PARENT_OPERATORS) {
            &chain[..]
        } else {
            &chain[..chain.len().min(1)]
        };
        for class in classes {
            found.extend(
                registry
                    .methods(*class)
                    .filter(|m| m.def.kind == FunctionKind::Operator(op))
                    .map(|m| m.func_hash()),
            );
        }
    }

    if flags.contains(OperatorLookup::REMOVE_DUPLICATES) {
        remove_duplicates(registry, &mut found);
    }
    found
}

/// Keep the first of several candidates with the same hash or signature.
fn remove_duplicates(registry: &SymbolRegistry, found: &mut Vec<TypeHash>) {
    let mut kept: Vec<TypeHash> = Vec::with_capacity(found.len());
    for hash in found.drain(..) {
        let duplicate = kept.iter().any(|k| {
            *k == hash
                || match (registry.get_function(*k), registry.get_function(hash)) {
                    (Some(a), Some(b)) => a.def.owner == b.def.owner && a.def.same_signature(&b.def),
                    _ => false,
                }
        });
        if !duplicate {
            kept.push(hash);
        }
    }
    *found = kept;
}
