//! CompilationContext - read-only view of the registry for semantic queries.
//!
//! Conversion, initialization and overload resolution only ever read the
//! registry. They go through this context so the type classification rules
//! (what counts as a class, an enum, an opaque value type) live in one place.

use libscript_core::{ClassEntry, DataType, FunctionEntry, FundamentalKind, TypeEntry, TypeHash};
use libscript_registry::SymbolRegistry;

/// Borrowed registry plus type classification helpers.
#[derive(Debug, Clone, Copy)]
pub struct CompilationContext<'a> {
    registry: &'a SymbolRegistry,
}

impl<'a> CompilationContext<'a> {
    pub fn new(registry: &'a SymbolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a SymbolRegistry {
        self.registry
    }

    // =========================================================================
    // Entity access
    // =========================================================================

    pub fn get_type(&self, hash: TypeHash) -> Option<&'a TypeEntry> {
        self.registry.get(hash)
    }

    pub fn get_class(&self, hash: TypeHash) -> Option<&'a ClassEntry> {
        self.registry.get_class(hash)
    }

    pub fn get_function(&self, hash: TypeHash) -> Option<&'a FunctionEntry> {
        self.registry.get_function(hash)
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Fundamental kind of a non-array type.
    pub fn fundamental(&self, ty: DataType) -> Option<FundamentalKind> {
        if ty.is_array() {
            return None;
        }
        self.get_type(ty.type_hash).and_then(TypeEntry::as_fundamental)
    }

    pub fn is_class(&self, ty: DataType) -> bool {
        !ty.is_array() && self.get_class(ty.type_hash).is_some()
    }

    pub fn is_enum(&self, ty: DataType) -> bool {
        !ty.is_array() && self.get_type(ty.type_hash).is_some_and(TypeEntry::is_enum)
    }

    /// Enums, closures and function types: values that only convert to
    /// themselves (enums also to `int`) and reject brace lists.
    pub fn is_opaque_value(&self, ty: DataType) -> bool {
        !ty.is_array() && self.get_type(ty.type_hash).is_some_and(TypeEntry::is_opaque_value)
    }

    pub fn is_registered(&self, ty: DataType) -> bool {
        self.get_type(ty.type_hash).is_some()
    }

    // =========================================================================
    // Class structure
    // =========================================================================

    pub fn inheritance_depth(&self, derived: TypeHash, base: TypeHash) -> Option<usize> {
        self.registry.inheritance_depth(derived, base)
    }

    pub fn is_copy_constructible(&self, class: TypeHash) -> bool {
        self.registry.is_copy_constructible(class)
    }

    /// Element type when `ty` is an `initializer_list<T>` instance.
    pub fn list_element_type(&self, ty: DataType) -> Option<DataType> {
        if ty.is_array() {
            return None;
        }
        self.registry.list_element_type(ty.type_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libscript_core::{ClassEntry, EnumEntry, primitives};

    #[test]
    fn classification_ignores_arrays() {
        let mut registry = SymbolRegistry::with_builtins();
        let widget = registry.register_type(ClassEntry::new("", "Widget")).unwrap();
        let ctx = CompilationContext::new(&registry);

        assert!(ctx.is_class(DataType::simple(widget)));
        let array = DataType::with_qualifiers(widget, libscript_core::Qualifiers::ARRAY);
        assert!(!ctx.is_class(array));
        assert_eq!(ctx.fundamental(DataType::const_ref(primitives::INT)), Some(FundamentalKind::Int));
    }

    #[test]
    fn enums_are_opaque_values() {
        let mut registry = SymbolRegistry::with_builtins();
        let mode = registry.register_type(EnumEntry::new("", "Mode").with_value("A", 0)).unwrap();
        let ctx = CompilationContext::new(&registry);

        assert!(ctx.is_enum(DataType::simple(mode)));
        assert!(ctx.is_opaque_value(DataType::simple(mode)));
        assert!(!ctx.is_opaque_value(DataType::simple(primitives::INT)));
    }
}
