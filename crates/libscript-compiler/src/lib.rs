//! libscript semantic analysis
//!
//! Decides how values convert, how variables initialize, which overload a
//! call picks, what a name means, and how templates become concrete
//! functions and classes.
//!
//! ## Modules
//!
//! - [`conversion`]: Standard and user-defined conversions with ranks
//! - [`initialization`]: Initialization of a target type from an expression
//! - [`overload`]: Overload resolution over a candidate set
//! - [`lookup`]: Name lookup through namespaces, classes and blocks
//! - [`template`]: Template argument deduction and instantiation
//!
//! A [`Session`] owns the [`SymbolRegistry`](libscript_registry::SymbolRegistry)
//! for one compilation and caches every template instance it creates.

mod context;
pub mod conversion;
pub mod initialization;
pub mod lookup;
pub mod overload;
mod session;
pub mod template;

pub use context::CompilationContext;
pub use conversion::{
    Conversion, ConversionError, ConversionPolicy, ConversionRank, InitFlavor, NumericConversion,
    NumericPromotion, QualificationAdjustment, StandardConversion,
};
pub use initialization::{
    Construction, ConstructionForm, InitCategory, InitFailure, InitStyle, Initialization,
};
pub use lookup::{
    CallResolution, Identifier, LocalScope, LocalVar, LookupResult, NameLookup, OperatorLookup,
    ResultType, Scope, ScopeLevel,
};
pub use overload::{
    ArgumentKind, Arguments, CandidateReport, ImplicitObject, OverloadMatch, OverloadResolution,
    ResolutionFailure, ResolutionState, Viability,
};
pub use session::{BodyRequest, Session, SessionOptions, TemplateBodyCompiler};
pub use template::{
    DeclaredInstance, Deduction, FunctionTemplateProcessor, TemplateArgumentDeduction, TemplateError,
    TemplateInstanceCache,
};

// Re-export SemanticError from core for convenience
pub use libscript_core::SemanticError;
