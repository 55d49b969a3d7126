//! Core type and entity model for libscript.
//!
//! Everything the semantic analysis crates share lives here:
//!
//! - [`TypeHash`] and [`DataType`]: type identity and qualifiers
//! - [`primitives`]: fundamental types and engine sentinels
//! - [`TemplateArgument`] and [`TemplateParameter`]
//! - entry types stored by the registry ([`ClassEntry`], [`FunctionEntry`], ...)
//! - [`Expression`]: the view of compiled expressions that analysis needs
//! - error enums ([`RegistrationError`], [`SemanticError`])

mod data_type;
pub mod entries;
mod error;
mod expression;
mod operator;
pub mod primitives;
mod template_argument;
mod type_hash;

pub use data_type::{DataType, Qualifiers};
pub use entries::*;
pub use error::{RegistrationError, SemanticError};
pub use expression::Expression;
pub use operator::OperatorKind;
pub use primitives::FundamentalKind;
pub use template_argument::{
    TemplateArgument, TemplateDefault, TemplateParamKind, TemplateParameter, data_type_identity,
};
pub use type_hash::{TypeHash, hash_constants};
