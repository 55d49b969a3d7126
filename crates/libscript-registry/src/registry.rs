//! SymbolRegistry: storage for every type, function and template.
//!
//! # Storage Model
//!
//! - **Types**: every [`TypeEntry`] keyed by its [`TypeHash`]
//! - **Functions**: every [`FunctionEntry`] (free functions, members,
//!   constructors, casts, operators, template instances) keyed by hash.
//!   Classes and namespaces refer to functions by hash only.
//! - **Templates**: function and class templates, each with placeholder
//!   types registered for their parameters
//! - **Namespaces**: a [`NamespaceTree`] mapping simple names to hashes
//!
//! The registry answers the structural questions semantic analysis needs:
//! inheritance depth, constructor and cast sets, copy/default
//! constructibility, and whether a type is the built-in list type.
//!
//! # Example
//!
//! ```
//! use libscript_core::{ClassEntry, primitives};
//! use libscript_registry::SymbolRegistry;
//!
//! let mut registry = SymbolRegistry::with_builtins();
//! let base = registry.register_type(ClassEntry::new("", "Shape")).unwrap();
//! let derived = registry
//!     .register_type(ClassEntry::new("", "Circle").with_base(base))
//!     .unwrap();
//!
//! assert_eq!(registry.inheritance_depth(derived, base), Some(1));
//! assert!(registry.get(primitives::INT).is_some());
//! ```

use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;

use libscript_core::{
    ClassEntry, ClassTemplateEntry, DataType, EnumEntry, FunctionEntry, FunctionKind, FunctionTemplateEntry,
    FunctionTraits, FunctionTypeEntry, GlobalEntry, OperatorKind, PatternEntry, RegistrationError,
    TemplateArgument, TypeEntry, TypeHash, primitives,
};

use crate::{NamespaceData, NamespaceTree};
use crate::builtins;

/// Central storage for types, functions and templates.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    types: FxHashMap<TypeHash, TypeEntry>,
    functions: FxHashMap<TypeHash, FunctionEntry>,
    function_templates: FxHashMap<TypeHash, FunctionTemplateEntry>,
    class_templates: FxHashMap<TypeHash, ClassTemplateEntry>,
    globals: FxHashMap<TypeHash, GlobalEntry>,
    builtin_operators: FxHashMap<OperatorKind, Vec<TypeHash>>,
    namespaces: NamespaceTree,
}

impl SymbolRegistry {
    /// An empty registry. Not even `int` is known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the fundamental types, the built-in operators and the
    /// `initializer_list<T>` class template.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a type and file its name into its namespace.
    ///
    /// Structural types (function types, dependent patterns, placeholders)
    /// are interned: registering an equal entry twice is not an error.
    pub fn register_type(&mut self, entry: impl Into<TypeEntry>) -> Result<TypeHash, RegistrationError> {
        let entry = entry.into();
        let hash = entry.type_hash();

        if let Some(existing) = self.types.get(&hash) {
            let structural = matches!(
                entry,
                TypeEntry::FunctionType(_) | TypeEntry::Pattern(_) | TypeEntry::TemplateParam(_)
            );
            if structural && *existing == entry {
                return Ok(hash);
            }
            return Err(RegistrationError::DuplicateType {
                name: entry.name().unwrap_or("<anonymous>").to_string(),
            });
        }

        match &entry {
            TypeEntry::Class(class) => {
                let node = self.namespaces.get_or_create_path(&class.namespace);
                self.namespace_data(node).types.insert(class.name.clone(), hash);
            }
            TypeEntry::Enum(e) => {
                let node = self.namespaces.get_or_create_path(&e.namespace);
                let data = self.namespace_data(node);
                data.types.insert(e.name.clone(), hash);
                if !e.is_enum_class {
                    for (name, value) in &e.values {
                        data.enum_values.insert(name.clone(), (hash, *value));
                    }
                }
            }
            TypeEntry::Closure(c) => {
                let root = self.namespaces.root();
                self.namespace_data(root).types.insert(c.name.clone(), hash);
            }
            TypeEntry::Fundamental(_)
            | TypeEntry::FunctionType(_)
            | TypeEntry::TemplateParam(_)
            | TypeEntry::Pattern(_) => {}
        }

        self.types.insert(hash, entry);
        Ok(hash)
    }

    /// Intern the function type `R(P...)`.
    pub fn function_type(&mut self, return_type: DataType, params: Vec<DataType>) -> TypeHash {
        let entry = FunctionTypeEntry::new(return_type, params);
        let hash = entry.type_hash;
        self.types.entry(hash).or_insert(TypeEntry::FunctionType(entry));
        hash
    }

    /// Intern the dependent template-id `template<args...>` used in template
    /// signatures.
    pub fn pattern(&mut self, template: TypeHash, arguments: Vec<TemplateArgument>) -> TypeHash {
        let entry = PatternEntry::new(template, arguments);
        let hash = entry.type_hash;
        self.types.entry(hash).or_insert(TypeEntry::Pattern(entry));
        hash
    }

    /// Register a function. Members are filed into their owning class.
    pub fn register_function(&mut self, entry: FunctionEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.func_hash();
        if self.functions.contains_key(&hash) {
            return Err(RegistrationError::DuplicateFunction {
                name: entry.def.name.clone(),
            });
        }

        if let Some(owner) = entry.def.owner {
            let is_instance = matches!(entry.def.kind, FunctionKind::TemplateInstance { .. });
            let class = self
                .get_class_mut(owner)
                .ok_or_else(|| RegistrationError::InvalidOwner {
                    name: entry.def.name.clone(),
                    owner,
                })?;
            match entry.def.kind {
                FunctionKind::Constructor => class.constructors.push(hash),
                FunctionKind::Destructor => class.destructor = Some(hash),
                FunctionKind::Cast => class.casts.push(hash),
                _ if is_instance => {}
                _ => class.methods.push(hash),
            }
        } else if entry.def.traits.contains(FunctionTraits::BUILTIN) {
            if let Some(op) = entry.def.operator() {
                self.builtin_operators.entry(op).or_default().push(hash);
            }
        } else {
            let node = self.namespaces.get_or_create_path(&entry.def.namespace);
            let data = self.namespace_data(node);
            match &entry.def.kind {
                FunctionKind::Operator(op) => data.operators.entry(*op).or_default().push(hash),
                FunctionKind::TemplateInstance { .. } => {}
                _ => data.functions.entry(entry.def.name.clone()).or_default().push(hash),
            }
        }

        self.functions.insert(hash, entry);
        Ok(hash)
    }

    /// Register a function template together with its placeholder types.
    pub fn register_function_template(&mut self, entry: FunctionTemplateEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash;
        if self.function_templates.contains_key(&hash) {
            return Err(RegistrationError::DuplicateTemplate {
                name: entry.qualified_name.clone(),
            });
        }
        for placeholder in entry.placeholder_entries() {
            self.register_type(TypeEntry::TemplateParam(placeholder))?;
        }
        if let Some(owner) = entry.owner {
            let class = self.get_class_mut(owner).ok_or_else(|| RegistrationError::InvalidOwner {
                name: entry.name.clone(),
                owner,
            })?;
            class.member_templates.push(hash);
        } else {
            let node = self.namespaces.get_or_create_path(&entry.namespace);
            self.namespace_data(node)
                .function_templates
                .entry(entry.name.clone())
                .or_default()
                .push(hash);
        }
        self.function_templates.insert(hash, entry);
        Ok(hash)
    }

    /// Register a class template together with its placeholder types.
    pub fn register_class_template(&mut self, entry: ClassTemplateEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash;
        if self.class_templates.contains_key(&hash) {
            return Err(RegistrationError::DuplicateTemplate {
                name: entry.qualified_name.clone(),
            });
        }
        for placeholder in entry.placeholder_entries() {
            self.register_type(TypeEntry::TemplateParam(placeholder))?;
        }
        let node = self.namespaces.get_or_create_path(&entry.namespace);
        self.namespace_data(node).class_templates.insert(entry.name.clone(), hash);
        self.class_templates.insert(hash, entry);
        Ok(hash)
    }

    pub fn register_global(&mut self, entry: GlobalEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.hash;
        if self.globals.contains_key(&hash) {
            return Err(RegistrationError::DuplicateGlobal {
                name: entry.qualified_name.clone(),
            });
        }
        let node = self.namespaces.get_or_create_path(&entry.namespace);
        self.namespace_data(node).globals.insert(entry.name.clone(), hash);
        self.globals.insert(hash, entry);
        Ok(hash)
    }

    /// `using namespace target;` inside namespace `from`.
    pub fn add_using(&mut self, from: &str, target: &str) -> Result<(), RegistrationError> {
        let target = self
            .namespaces
            .get_path(target)
            .ok_or_else(|| RegistrationError::InvalidNamespace { path: target.to_string() })?;
        let from = self.namespaces.get_or_create_path(from);
        self.namespaces.add_using(from, target);
        Ok(())
    }

    /// Replace a function entry. Used to attach bodies to template instances.
    pub fn update_function(&mut self, entry: FunctionEntry) -> Result<(), RegistrationError> {
        let slot = self
            .functions
            .get_mut(&entry.func_hash())
            .ok_or(RegistrationError::UnknownType { hash: entry.func_hash() })?;
        *slot = entry;
        Ok(())
    }

    /// Remove a function. Only template instances that failed to compile are
    /// ever removed, and those are never filed into namespaces.
    pub fn remove_function(&mut self, hash: TypeHash) -> Option<FunctionEntry> {
        self.functions.remove(&hash)
    }

    /// Remove a type. Used to roll back failed class instantiations.
    pub fn remove_type(&mut self, hash: TypeHash) -> Option<TypeEntry> {
        let removed = self.types.remove(&hash)?;
        if let TypeEntry::Class(class) = &removed {
            if let Some(node) = self.namespaces.get_path(&class.namespace) {
                self.namespace_data(node).types.remove(&class.name);
            }
            for f in class.constructors.iter().chain(&class.casts).chain(&class.methods) {
                self.functions.remove(f);
            }
        }
        Some(removed)
    }

    fn namespace_data(&mut self, node: NodeIndex) -> &mut NamespaceData {
        self.namespaces.data_mut(node)
    }

    // =========================================================================
    // Lookup by hash
    // =========================================================================

    pub fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    pub fn get_mut(&mut self, hash: TypeHash) -> Option<&mut TypeEntry> {
        self.types.get_mut(&hash)
    }

    pub fn get_class(&self, hash: TypeHash) -> Option<&ClassEntry> {
        self.get(hash).and_then(TypeEntry::as_class)
    }

    pub fn get_class_mut(&mut self, hash: TypeHash) -> Option<&mut ClassEntry> {
        self.get_mut(hash).and_then(TypeEntry::as_class_mut)
    }

    pub fn get_enum(&self, hash: TypeHash) -> Option<&EnumEntry> {
        self.get(hash).and_then(TypeEntry::as_enum)
    }

    pub fn get_function(&self, hash: TypeHash) -> Option<&FunctionEntry> {
        self.functions.get(&hash)
    }

    pub fn get_function_template(&self, hash: TypeHash) -> Option<&FunctionTemplateEntry> {
        self.function_templates.get(&hash)
    }

    pub fn get_class_template(&self, hash: TypeHash) -> Option<&ClassTemplateEntry> {
        self.class_templates.get(&hash)
    }

    pub fn get_global(&self, hash: TypeHash) -> Option<&GlobalEntry> {
        self.globals.get(&hash)
    }

    pub fn namespaces(&self) -> &NamespaceTree {
        &self.namespaces
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Built-in operator functions for `op`.
    pub fn builtin_operators(&self, op: OperatorKind) -> &[TypeHash] {
        self.builtin_operators.get(&op).map_or(&[], Vec::as_slice)
    }

    // =========================================================================
    // Class structure
    // =========================================================================

    /// `class`, its base, its base's base, ... Stops at unknown types and
    /// never loops on a malformed cyclic hierarchy.
    pub fn base_chain(&self, class: TypeHash) -> Vec<TypeHash> {
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(hash) = current {
            if chain.contains(&hash) || self.get_class(hash).is_none() {
                break;
            }
            chain.push(hash);
            current = self.get_class(hash).and_then(|c| c.base_class);
        }
        chain
    }

    /// Number of inheritance steps from `derived` up to `base`; `Some(0)` when
    /// they are the same class, `None` when `base` is not an ancestor.
    pub fn inheritance_depth(&self, derived: TypeHash, base: TypeHash) -> Option<usize> {
        self.base_chain(derived).iter().position(|h| *h == base)
    }

    pub fn constructors(&self, class: TypeHash) -> impl Iterator<Item = &FunctionEntry> + '_ {
        self.members(class, |c| &c.constructors)
    }

    pub fn casts(&self, class: TypeHash) -> impl Iterator<Item = &FunctionEntry> + '_ {
        self.members(class, |c| &c.casts)
    }

    pub fn methods(&self, class: TypeHash) -> impl Iterator<Item = &FunctionEntry> + '_ {
        self.members(class, |c| &c.methods)
    }

    fn members<'a>(
        &'a self,
        class: TypeHash,
        select: impl Fn(&'a ClassEntry) -> &'a Vec<TypeHash>,
    ) -> impl Iterator<Item = &'a FunctionEntry> + 'a {
        self.get_class(class)
            .map(select)
            .into_iter()
            .flatten()
            .filter_map(|h| self.functions.get(h))
    }

    /// Copy constructor of `class`, if one is declared.
    pub fn copy_constructor(&self, class: TypeHash) -> Option<&FunctionEntry> {
        self.constructors(class).find(|f| {
            f.def.params.len() == 1 && f.def.params[0].data_type.base() == DataType::simple(class)
        })
    }

    pub fn is_copy_constructible(&self, class: TypeHash) -> bool {
        let Some(entry) = self.get_class(class) else {
            return false;
        };
        if entry.flags.contains(libscript_core::ClassFlags::NON_COPYABLE) {
            return false;
        }
        self.copy_constructor(class).is_none_or(|f| !f.def.is_deleted())
    }

    /// A class without declared constructors gets an implicit default one.
    pub fn is_default_constructible(&self, class: TypeHash) -> bool {
        let Some(entry) = self.get_class(class) else {
            return false;
        };
        if entry.constructors.is_empty() {
            return true;
        }
        self.constructors(class)
            .any(|f| f.def.min_args() == 0 && !f.def.is_deleted())
    }

    // =========================================================================
    // Built-in list type
    // =========================================================================

    /// Whether `ty` is an instance of the built-in `initializer_list<T>`.
    pub fn is_list_type(&self, ty: TypeHash) -> bool {
        self.get_class(ty)
            .is_some_and(|c| c.is_instance_of(primitives::INITIALIZER_LIST_TEMPLATE))
    }

    /// Element type of an `initializer_list<T>` instance.
    pub fn list_element_type(&self, ty: TypeHash) -> Option<DataType> {
        self.get_class(ty)
            .filter(|c| c.is_instance_of(primitives::INITIALIZER_LIST_TEMPLATE))
            .and_then(|c| c.template_args.first())
            .and_then(TemplateArgument::as_type)
    }
}
