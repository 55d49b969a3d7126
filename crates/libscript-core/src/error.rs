//! Error types shared by the libscript crates.
//!
//! ```text
//! RegistrationError - building the symbol registry
//! SemanticError     - conversion, overload, lookup and template failures
//! ```
//!
//! Semantic analysis returns failures as values (invalid conversions,
//! failed resolutions). `SemanticError` is what a caller gets when it
//! decides to escalate one of those values into a compilation error.

use thiserror::Error;

use crate::{DataType, TemplateArgument, TypeHash};

// ============================================================================
// Registration Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    #[error("function '{name}' is already registered with the same signature")]
    DuplicateFunction { name: String },

    #[error("template '{name}' is already registered")]
    DuplicateTemplate { name: String },

    #[error("variable '{name}' is already registered")]
    DuplicateGlobal { name: String },

    #[error("unknown type {hash}")]
    UnknownType { hash: TypeHash },

    #[error("'{name}' names an owner {owner} that is not a registered class")]
    InvalidOwner { name: String, owner: TypeHash },

    #[error("invalid namespace path '{path}'")]
    InvalidNamespace { path: String },
}

// ============================================================================
// Semantic Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("cannot convert from '{from}' to '{to}'")]
    NotConvertible { from: DataType, to: DataType },

    #[error("conversion from '{from}' to '{to}' is ambiguous between {} candidates", .candidates.len())]
    AmbiguousConversion {
        from: DataType,
        to: DataType,
        candidates: Vec<TypeHash>,
    },

    #[error("narrowing conversion from '{from}' to '{to}' in list-initialization")]
    NarrowingConversionRejected { from: DataType, to: DataType },

    #[error("no viable candidate among {} for arguments {arguments:?}", .candidates.len())]
    NoViableCandidate {
        candidates: Vec<TypeHash>,
        arguments: Vec<DataType>,
    },

    #[error("call is ambiguous between {} candidates", .candidates.len())]
    AmbiguousOverload {
        candidates: Vec<TypeHash>,
        arguments: Vec<DataType>,
    },

    #[error("invalid argument for template parameter {index} of {template}: {reason}")]
    InvalidTemplateArgument {
        template: TypeHash,
        index: usize,
        reason: String,
    },

    #[error("conflicting deductions for template parameter {index}: '{first}' and '{second}'")]
    TemplateDeductionConflict {
        template: TypeHash,
        index: usize,
        first: TemplateArgument,
        second: TemplateArgument,
    },

    #[error("template parameter '{name}' could not be deduced and has no default")]
    MissingNonDefaultedTemplateParameter {
        template: TypeHash,
        index: usize,
        name: String,
    },

    #[error("template {template} recursively requires its own instantiation with {arguments:?}")]
    RecursiveInstantiation {
        template: TypeHash,
        arguments: Vec<TemplateArgument>,
    },

    #[error("instantiation of template {template} failed: {reason}")]
    InstantiationFailed { template: TypeHash, reason: String },

    #[error("unknown identifier '{name}'")]
    UnknownIdentifier { name: String },

    #[error("'{name}' does not name a function or a constructible type")]
    NotCallable { name: String },

    #[error("variable '{name}' is already declared in this block")]
    VariableRedeclaration { name: String },
}
