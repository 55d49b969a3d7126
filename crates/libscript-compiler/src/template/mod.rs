//! Template argument deduction and instantiation.
//!
//! - [`deduction`]: matching parameter patterns against argument types
//! - [`substitution`]: replacing placeholders with concrete arguments
//! - [`instantiation`]: argument completion and class template instances
//! - [`processor`]: the function template pipeline (deduce, complete,
//!   substitute, instantiate)
//! - [`cache`]: instance identity and the in-progress set used to detect
//!   recursive instantiation
//!
//! Failures before a body is compiled are soft: during overload resolution a
//! template whose deduction or substitution fails simply contributes no
//! candidate. Only the body of the selected instance is compiled, and its
//! failure is a hard error.

mod cache;
mod deduction;
mod instantiation;
mod processor;
mod substitution;

pub use cache::TemplateInstanceCache;
pub use deduction::{Deduction, TemplateArgumentDeduction};
pub use instantiation::{complete_arguments, instantiate_class_template};
pub use processor::{DeclaredInstance, FunctionTemplateProcessor};
pub use substitution::{SubstitutionMap, build_substitution_map, substitute_argument, substitute_type};

use libscript_core::{DataType, RegistrationError, SemanticError, TemplateArgument, TypeHash};
use thiserror::Error;

/// Failure while deducing, completing or instantiating a template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("unknown template {template}")]
    UnknownTemplate { template: TypeHash },

    #[error("argument {argument} of type '{found}' does not match the pattern '{pattern}'")]
    DeductionMismatch {
        template: TypeHash,
        argument: usize,
        pattern: DataType,
        found: DataType,
    },

    #[error("conflicting deductions for template parameter {index}: '{first}' and '{second}'")]
    DeductionConflict {
        template: TypeHash,
        index: usize,
        first: TemplateArgument,
        second: TemplateArgument,
    },

    #[error("template parameter '{name}' could not be deduced and has no default")]
    MissingNonDefaultedParameter {
        template: TypeHash,
        index: usize,
        name: String,
    },

    #[error("invalid argument for template parameter {index}: {reason}")]
    InvalidArgument {
        template: TypeHash,
        index: usize,
        reason: String,
    },

    #[error("template takes {expected} arguments but {provided} were given")]
    TooManyArguments {
        template: TypeHash,
        expected: usize,
        provided: usize,
    },

    #[error("template {template} recursively requires its own instantiation with {arguments:?}")]
    RecursiveInstantiation {
        template: TypeHash,
        arguments: Vec<TemplateArgument>,
    },

    #[error("instantiation depth limit of {limit} reached while instantiating {template}")]
    DepthLimitExceeded { template: TypeHash, limit: usize },

    #[error("instantiation of template {template} failed: {reason}")]
    InstantiationFailed { template: TypeHash, reason: String },

    #[error("no body compiler is installed for script template {template}")]
    NoBodyCompiler { template: TypeHash },

    #[error("registering an instance of {template} failed: {source}")]
    Registration {
        template: TypeHash,
        #[source]
        source: RegistrationError,
    },
}

impl TemplateError {
    /// Failures that only remove a template from a candidate set.
    pub fn is_deduction_failure(&self) -> bool {
        matches!(
            self,
            TemplateError::DeductionMismatch { .. }
                | TemplateError::DeductionConflict { .. }
                | TemplateError::MissingNonDefaultedParameter { .. }
                | TemplateError::InvalidArgument { .. }
                | TemplateError::TooManyArguments { .. }
        )
    }

    pub fn template(&self) -> TypeHash {
        match self {
            TemplateError::UnknownTemplate { template }
            | TemplateError::DeductionMismatch { template, .. }
            | TemplateError::DeductionConflict { template, .. }
            | TemplateError::MissingNonDefaultedParameter { template, .. }
            | TemplateError::InvalidArgument { template, .. }
            | TemplateError::TooManyArguments { template, .. }
            | TemplateError::RecursiveInstantiation { template, .. }
            | TemplateError::DepthLimitExceeded { template, .. }
            | TemplateError::InstantiationFailed { template, .. }
            | TemplateError::NoBodyCompiler { template }
            | TemplateError::Registration { template, .. } => *template,
        }
    }
}

impl From<TemplateError> for SemanticError {
    fn from(err: TemplateError) -> Self {
        let reason = err.to_string();
        match err {
            TemplateError::DeductionMismatch { template, argument, .. } => SemanticError::InvalidTemplateArgument {
                template,
                index: argument,
                reason,
            },
            TemplateError::InvalidArgument { template, index, .. } => {
                SemanticError::InvalidTemplateArgument { template, index, reason }
            }
            TemplateError::TooManyArguments { template, expected, .. } => SemanticError::InvalidTemplateArgument {
                template,
                index: expected,
                reason,
            },
            TemplateError::DeductionConflict {
                template,
                index,
                first,
                second,
            } => SemanticError::TemplateDeductionConflict {
                template,
                index,
                first,
                second,
            },
            TemplateError::MissingNonDefaultedParameter { template, index, name } => {
                SemanticError::MissingNonDefaultedTemplateParameter { template, index, name }
            }
            TemplateError::RecursiveInstantiation { template, arguments } => {
                SemanticError::RecursiveInstantiation { template, arguments }
            }
            TemplateError::UnknownTemplate { template } => SemanticError::UnknownIdentifier {
                name: template.to_string(),
            },
            TemplateError::DepthLimitExceeded { template, .. }
            | TemplateError::InstantiationFailed { template, .. }
            | TemplateError::NoBodyCompiler { template }
            | TemplateError::Registration { template, .. } => {
                SemanticError::InstantiationFailed { template, reason }
            }
        }
    }
}
