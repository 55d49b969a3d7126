//! Template arguments and parameters.

use std::fmt;

use crate::{DataType, TypeHash, hash_constants};

/// A concrete template argument: a type, or a non-type bool/integer value.
///
/// Two argument lists are equal iff they are pairwise tag-and-value equal,
/// which makes `Vec<TemplateArgument>` usable as an instantiation cache key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateArgument {
    Type(DataType),
    Bool(bool),
    Integer(i64),
}

impl TemplateArgument {
    pub fn kind(&self) -> TemplateParamKind {
        match self {
            TemplateArgument::Type(_) => TemplateParamKind::Type,
            TemplateArgument::Bool(_) => TemplateParamKind::Bool,
            TemplateArgument::Integer(_) => TemplateParamKind::Integer,
        }
    }

    pub fn as_type(&self) -> Option<DataType> {
        match self {
            TemplateArgument::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    /// Component hash used when building instance identities.
    pub(crate) fn identity(&self) -> u64 {
        match self {
            TemplateArgument::Type(ty) => data_type_identity(ty),
            TemplateArgument::Bool(b) => hash_constants::BOOL_ARG ^ u64::from(*b),
            TemplateArgument::Integer(i) => hash_constants::INT_ARG ^ (*i as u64).rotate_left(7),
        }
    }
}

/// Hash of a qualified type, distinguishing `T`, `const T` and `T&`.
pub fn data_type_identity(ty: &DataType) -> u64 {
    let mut h = ty.type_hash.0;
    if ty.is_const() {
        h ^= hash_constants::CONST;
    }
    if ty.is_reference() {
        h ^= hash_constants::REFERENCE;
    }
    if ty.is_array() {
        h = h.rotate_left(3);
    }
    h
}

impl From<DataType> for TemplateArgument {
    fn from(ty: DataType) -> Self {
        TemplateArgument::Type(ty)
    }
}

impl From<TypeHash> for TemplateArgument {
    fn from(hash: TypeHash) -> Self {
        TemplateArgument::Type(DataType::simple(hash))
    }
}

impl fmt::Debug for TemplateArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for TemplateArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateArgument::Type(ty) => write!(f, "{ty}"),
            TemplateArgument::Bool(b) => write!(f, "{b}"),
            TemplateArgument::Integer(i) => write!(f, "{i}"),
        }
    }
}

/// What a template parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateParamKind {
    Type,
    Bool,
    Integer,
}

/// Default value of a template parameter.
///
/// Named defaults are resolved in the scope of the template declaration:
/// earlier parameters of the same template first, then the declaring
/// namespace and its parents.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateDefault {
    Value(TemplateArgument),
    Named(String),
}

/// A declared template parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameter {
    pub name: String,
    pub kind: TemplateParamKind,
    /// Placeholder type registered for this parameter.
    pub type_hash: TypeHash,
    pub default: Option<TemplateDefault>,
}

impl TemplateParameter {
    pub fn new(owner: TypeHash, index: usize, name: impl Into<String>, kind: TemplateParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_hash: TypeHash::from_template_param(owner, index),
            default: None,
        }
    }

    pub fn with_default(mut self, default: TemplateDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Placeholder type usable in parameter patterns.
    pub fn placeholder(&self) -> DataType {
        DataType::simple(self.type_hash)
    }
}
