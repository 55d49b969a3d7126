//! Local variables of one block.
//!
//! Nested blocks are separate [`ScopeLevel::Block`] levels; a variable in an
//! inner block hides an outer one until that level is left. Slots keep
//! counting across nested blocks of one function body.
//!
//! [`ScopeLevel::Block`]: super::ScopeLevel::Block

use libscript_core::{DataType, SemanticError};
use rustc_hash::FxHashMap;

/// A declared local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub name: String,
    pub data_type: DataType,
    /// Stack slot index.
    pub slot: u32,
}

/// Locals declared directly in one block.
#[derive(Debug, Clone, Default)]
pub struct LocalScope {
    variables: FxHashMap<String, LocalVar>,
    next_slot: u32,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty block whose first variable takes `slot`.
    pub(crate) fn starting_at(slot: u32) -> Self {
        Self {
            variables: FxHashMap::default(),
            next_slot: slot,
        }
    }

    pub(crate) fn next_slot(&self) -> u32 {
        self.next_slot
    }

    /// Declare a variable in this block. Returns its slot.
    pub fn declare(&mut self, name: impl Into<String>, data_type: DataType) -> Result<u32, SemanticError> {
        let name = name.into();
        if self.variables.contains_key(&name) {
            return Err(SemanticError::VariableRedeclaration { name });
        }

        let slot = self.next_slot;
        self.next_slot += 1;
        self.variables.insert(name.clone(), LocalVar { name, data_type, slot });
        Ok(slot)
    }

    pub fn get(&self, name: &str) -> Option<&LocalVar> {
        self.variables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libscript_core::primitives;

    fn int() -> DataType {
        DataType::simple(primitives::INT)
    }

    #[test]
    fn declare_variable() {
        let mut scope = LocalScope::new();
        assert_eq!(scope.declare("x", int()).unwrap(), 0);
        assert_eq!(scope.declare("y", int()).unwrap(), 1);
        assert_eq!(scope.get("x").unwrap().data_type, int());
        assert!(scope.get("z").is_none());
    }

    #[test]
    fn redeclaration_in_the_same_block_fails() {
        let mut scope = LocalScope::new();
        scope.declare("x", int()).unwrap();
        let err = scope.declare("x", DataType::simple(primitives::FLOAT)).unwrap_err();
        assert!(matches!(err, SemanticError::VariableRedeclaration { .. }));
    }

    #[test]
    fn continued_block_keeps_counting_slots() {
        let mut inner = LocalScope::starting_at(3);
        assert_eq!(inner.declare("tmp", int()).unwrap(), 3);
        assert_eq!(inner.next_slot(), 4);
    }
}
