//! Enum type entry.

use crate::TypeHash;

use super::qualify;

/// Registry entry for an enumeration.
///
/// Values of an unscoped enum are visible in the enclosing namespace;
/// values of an `enum class` only through the enum's name.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub name: String,
    pub namespace: String,
    pub qualified_name: String,
    pub type_hash: TypeHash,
    pub values: Vec<(String, i64)>,
    pub is_enum_class: bool,
}

impl EnumEntry {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let qualified_name = qualify(&namespace, &name);
        Self {
            type_hash: TypeHash::from_name(&qualified_name),
            name,
            namespace,
            qualified_name,
            values: Vec::new(),
            is_enum_class: false,
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.values.push((name.into(), value));
        self
    }

    pub fn as_enum_class(mut self) -> Self {
        self.is_enum_class = true;
        self
    }

    pub fn value(&self, name: &str) -> Option<i64> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}
