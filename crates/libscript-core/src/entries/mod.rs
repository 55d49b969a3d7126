//! Registry entry types.
//!
//! - [`TypeEntry`]: one enum over every type kind
//! - [`ClassEntry`], [`EnumEntry`], [`FunctionTypeEntry`], [`ClosureEntry`]
//! - [`TemplateParamEntry`], [`PatternEntry`]: placeholders in template signatures
//! - [`FunctionEntry`]: signature plus implementation
//! - [`FunctionTemplateEntry`], [`ClassTemplateEntry`]
//! - [`GlobalEntry`]: namespace and script variables

mod class;
mod enum_entry;
mod function;
mod function_type;
mod global;
mod template;
mod type_entry;

pub use class::{ClassEntry, ClassFlags, DataMember, StaticMember};
pub use enum_entry::EnumEntry;
pub use function::{
    BodyId, FunctionDef, FunctionEntry, FunctionImpl, FunctionKind, FunctionTraits, NativeId, Param, qualify,
};
pub use function_type::{Capture, ClosureEntry, FunctionTypeEntry};
pub use global::{GlobalEntry, GlobalKind};
pub use template::{
    ClassInstance, ClassTemplateEntry, FunctionTemplateBackend, FunctionTemplateEntry, NativeClassTemplate,
    NativeFunctionTemplate, PatternEntry, TemplateParamEntry,
};
pub use type_entry::TypeEntry;
