//! libscript
//!
//! Semantic core of the libscript embeddable scripting language: the type
//! model, the symbol registry, and the compiler passes that decide
//! conversions, initialization, overloads, names and templates.
//!
//! ## Crates
//!
//! - [`core`]: `TypeHash`, `DataType`, registry entries, error enums
//! - [`registry`]: `SymbolRegistry` and the namespace graph
//! - [`compiler`]: conversions, initialization, overload resolution, name
//!   lookup, template deduction and instantiation
//!
//! ## Example
//!
//! ```
//! use libscript::prelude::*;
//!
//! let mut registry = SymbolRegistry::with_builtins();
//! let int = DataType::simple(primitives::INT);
//! let foo = registry
//!     .register_function(FunctionEntry::global("", "foo", vec![Param::of(int)], DataType::void()))
//!     .unwrap();
//!
//! let mut session = Session::new(registry);
//! let call = NameLookup::new(&mut session)
//!     .resolve_call(
//!         &Identifier::simple("foo"),
//!         &Scope::global(),
//!         Arguments::Types(vec![DataType::simple(primitives::CHAR)]),
//!         ImplicitObject::None,
//!     )
//!     .unwrap();
//! assert_eq!(call.resolution.selected(), Some(foo));
//! ```

pub use libscript_compiler as compiler;
pub use libscript_core as core;
pub use libscript_registry as registry;

pub use libscript_compiler::{
    Arguments, CompilationContext, Conversion, ConversionPolicy, ConversionRank, Identifier,
    ImplicitObject, Initialization, InitStyle, LookupResult, NameLookup, OverloadResolution,
    Scope, Session, SessionOptions, StandardConversion, TemplateBodyCompiler, TemplateError,
};
pub use libscript_core::{DataType, RegistrationError, SemanticError, TypeHash};
pub use libscript_registry::SymbolRegistry;

/// Everything needed to set up a registry and run the semantic passes.
pub mod prelude {
    pub use libscript_compiler::{
        Arguments, BodyRequest, CallResolution, CompilationContext, Conversion, ConversionPolicy,
        ConversionRank, FunctionTemplateProcessor, Identifier, ImplicitObject, InitCategory,
        InitStyle, Initialization, LocalScope, LookupResult, NameLookup, OperatorLookup,
        OverloadResolution, Scope, ScopeLevel, Session, SessionOptions, StandardConversion,
        TemplateBodyCompiler, TemplateError,
    };
    pub use libscript_core::{
        ClassEntry, DataType, EnumEntry, Expression, FunctionEntry, GlobalEntry, GlobalKind,
        OperatorKind, Param, RegistrationError, SemanticError, TemplateArgument, TypeHash,
        primitives,
    };
    pub use libscript_registry::SymbolRegistry;
}
