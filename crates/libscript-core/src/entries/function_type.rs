//! Function signature types and closure types.

use crate::{DataType, TypeHash, data_type_identity};

/// A function type `R(P...)`. Values of this type are callable references.
///
/// Parameter types may mention template parameter placeholders, in which
/// case the entry serves as a deduction pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeEntry {
    pub type_hash: TypeHash,
    pub return_type: DataType,
    pub params: Vec<DataType>,
}

impl FunctionTypeEntry {
    pub fn new(return_type: DataType, params: Vec<DataType>) -> Self {
        let param_ids: Vec<u64> = params.iter().map(data_type_identity).collect();
        Self {
            type_hash: TypeHash::from_function_type(data_type_identity(&return_type), &param_ids),
            return_type,
            params,
        }
    }
}

/// A captured variable of a lambda.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub name: String,
    pub data_type: DataType,
}

/// The unique type of a lambda expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureEntry {
    pub type_hash: TypeHash,
    pub name: String,
    pub captures: Vec<Capture>,
    /// Function invoked when the closure is called.
    pub call_operator: Option<TypeHash>,
}

impl ClosureEntry {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            type_hash: TypeHash::from_name(&format!("$closure:{name}")),
            name,
            captures: Vec::new(),
            call_operator: None,
        }
    }

    pub fn with_capture(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.captures.push(Capture {
            name: name.into(),
            data_type,
        });
        self
    }

    pub fn find_capture(&self, name: &str) -> Option<(usize, &Capture)> {
        self.captures.iter().enumerate().find(|(_, c)| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn function_types_are_structural() {
        let a = FunctionTypeEntry::new(DataType::void(), vec![DataType::simple(primitives::INT)]);
        let b = FunctionTypeEntry::new(DataType::void(), vec![DataType::simple(primitives::INT)]);
        let c = FunctionTypeEntry::new(DataType::void(), vec![DataType::const_ref(primitives::INT)]);
        assert_eq!(a.type_hash, b.type_hash);
        assert_ne!(a.type_hash, c.type_hash);
    }
}
