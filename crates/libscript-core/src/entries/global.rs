//! Namespace-scope variables.

use crate::{DataType, TypeHash};

use super::qualify;

/// Where a variable was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalKind {
    /// Namespace variable registered by the host.
    Namespace,
    /// Global declared in script source.
    Script,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalEntry {
    pub name: String,
    pub namespace: String,
    pub qualified_name: String,
    pub hash: TypeHash,
    pub data_type: DataType,
    pub kind: GlobalKind,
}

impl GlobalEntry {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, data_type: DataType, kind: GlobalKind) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let qualified_name = qualify(&namespace, &name);
        Self {
            hash: TypeHash::from_name(&format!("$global:{qualified_name}")),
            name,
            namespace,
            qualified_name,
            data_type,
            kind,
        }
    }
}
