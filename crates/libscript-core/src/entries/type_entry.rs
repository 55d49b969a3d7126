//! TypeEntry: every kind of type the registry stores, in one enum.

use crate::{FundamentalKind, TypeHash};

use super::{ClassEntry, ClosureEntry, EnumEntry, FunctionTypeEntry, PatternEntry, TemplateParamEntry};

/// Registry storage for a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeEntry {
    Fundamental(FundamentalKind),
    Class(ClassEntry),
    Enum(EnumEntry),
    FunctionType(FunctionTypeEntry),
    Closure(ClosureEntry),
    /// Placeholder for a template parameter.
    TemplateParam(TemplateParamEntry),
    /// Dependent template-id inside a template signature.
    Pattern(PatternEntry),
}

impl TypeEntry {
    pub fn type_hash(&self) -> TypeHash {
        match self {
            TypeEntry::Fundamental(k) => k.hash(),
            TypeEntry::Class(e) => e.type_hash,
            TypeEntry::Enum(e) => e.type_hash,
            TypeEntry::FunctionType(e) => e.type_hash,
            TypeEntry::Closure(e) => e.type_hash,
            TypeEntry::TemplateParam(e) => e.type_hash,
            TypeEntry::Pattern(e) => e.type_hash,
        }
    }

    /// Unqualified name. Function types and patterns have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeEntry::Fundamental(k) => Some(k.name()),
            TypeEntry::Class(e) => Some(&e.name),
            TypeEntry::Enum(e) => Some(&e.name),
            TypeEntry::Closure(e) => Some(&e.name),
            TypeEntry::TemplateParam(e) => Some(&e.name),
            TypeEntry::FunctionType(_) | TypeEntry::Pattern(_) => None,
        }
    }

    // === Type Checks ===

    pub fn is_class(&self) -> bool {
        matches!(self, TypeEntry::Class(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, TypeEntry::Enum(_))
    }

    /// Enum, closure and function types: values that only copy and never
    /// accept list syntax.
    pub fn is_opaque_value(&self) -> bool {
        matches!(self, TypeEntry::Enum(_) | TypeEntry::Closure(_) | TypeEntry::FunctionType(_))
    }

    /// Placeholder or dependent pattern; never the type of a value.
    pub fn is_dependent(&self) -> bool {
        matches!(self, TypeEntry::TemplateParam(_) | TypeEntry::Pattern(_))
    }

    // === Downcasts ===

    pub fn as_fundamental(&self) -> Option<FundamentalKind> {
        match self {
            TypeEntry::Fundamental(k) => Some(*k),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassEntry> {
        match self {
            TypeEntry::Class(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassEntry> {
        match self {
            TypeEntry::Class(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumEntry> {
        match self {
            TypeEntry::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_function_type(&self) -> Option<&FunctionTypeEntry> {
        match self {
            TypeEntry::FunctionType(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&ClosureEntry> {
        match self {
            TypeEntry::Closure(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_template_param(&self) -> Option<&TemplateParamEntry> {
        match self {
            TypeEntry::TemplateParam(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&PatternEntry> {
        match self {
            TypeEntry::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClassEntry> for TypeEntry {
    fn from(e: ClassEntry) -> Self {
        TypeEntry::Class(e)
    }
}

impl From<EnumEntry> for TypeEntry {
    fn from(e: EnumEntry) -> Self {
        TypeEntry::Enum(e)
    }
}

impl From<FunctionTypeEntry> for TypeEntry {
    fn from(e: FunctionTypeEntry) -> Self {
        TypeEntry::FunctionType(e)
    }
}

impl From<ClosureEntry> for TypeEntry {
    fn from(e: ClosureEntry) -> Self {
        TypeEntry::Closure(e)
    }
}

impl From<PatternEntry> for TypeEntry {
    fn from(e: PatternEntry) -> Self {
        TypeEntry::Pattern(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_values() {
        assert!(TypeEntry::from(EnumEntry::new("", "Color")).is_opaque_value());
        assert!(TypeEntry::from(ClosureEntry::new("lambda0")).is_opaque_value());
        assert!(!TypeEntry::from(ClassEntry::new("", "Point")).is_opaque_value());
        assert!(!TypeEntry::Fundamental(FundamentalKind::Int).is_opaque_value());
    }

    #[test]
    fn downcasts() {
        let e = TypeEntry::from(ClassEntry::new("", "Point"));
        assert_eq!(e.as_class().map(|c| c.name.as_str()), Some("Point"));
        assert!(e.as_enum().is_none());
        assert_eq!(e.name(), Some("Point"));
    }
}
