//! Name lookup.
//!
//! [`NameLookup`] resolves an [`Identifier`] against a [`Scope`] chain.
//!
//! ## Order
//!
//! A simple name is searched innermost level first and the first level
//! that declares it wins:
//!
//! 1. locals of the current function, then lambda captures
//! 2. members of the enclosing class and its bases
//! 3. bound template parameters
//! 4. enclosing namespaces, innermost first
//! 5. namespaces imported by `using namespace` into any of those
//!
//! Within one namespace: types, enum values, child namespaces, function
//! overload sets (with function templates), class templates, variables.
//! Within one class: data members (own first, then inherited), static
//! members, nested types, then methods.
//!
//! `A::B` resolves `A` to a namespace, type or template and looks `B` up
//! inside it only. `name<args>` instantiates a class template, or attaches
//! explicit arguments to a function template set.

mod identifier;
mod local_scope;
mod operators;
mod scope;

pub use identifier::Identifier;
pub use local_scope::{LocalScope, LocalVar};
pub use operators::OperatorLookup;
pub use scope::{Scope, ScopeLevel};

use libscript_core::{
    DataType, OperatorKind, SemanticError, TemplateArgument, TypeEntry, TypeHash, primitives,
};
use libscript_registry::{NodeIndex, SymbolRegistry};

use crate::overload::{Arguments, ImplicitObject, OverloadResolution};
use crate::session::Session;
use crate::template::{DeclaredInstance, FunctionTemplateProcessor, TemplateError};

// ============================================================================
// Results
// ============================================================================

/// What a name refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Unknown,
    /// Overloads sharing a name. `explicit_arguments` are the template
    /// arguments written at the use site, which only `templates` accept.
    FunctionSet {
        functions: Vec<TypeHash>,
        templates: Vec<TypeHash>,
        explicit_arguments: Vec<TemplateArgument>,
    },
    /// A class template named without arguments.
    Template { template: TypeHash },
    Type { data_type: DataType },
    /// A template parameter bound to a value.
    Variable { data_type: DataType, value: TemplateArgument },
    /// Non-static data member. `index` counts from the root base.
    DataMember { class: TypeHash, index: usize, data_type: DataType },
    StaticDataMember { class: TypeHash, data_type: DataType },
    Global { global: TypeHash, data_type: DataType },
    Local { slot: u32, data_type: DataType },
    EnumValue { enum_type: TypeHash, value: i64 },
    Namespace { path: String },
    Capture { closure: TypeHash, index: usize, data_type: DataType },
}

/// Tag of a [`LookupResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Unknown,
    FunctionSet,
    Template,
    Type,
    Variable,
    DataMember,
    StaticDataMember,
    Global,
    Local,
    EnumValue,
    Namespace,
    Capture,
}

impl LookupResult {
    pub fn kind(&self) -> ResultType {
        match self {
            LookupResult::Unknown => ResultType::Unknown,
            LookupResult::FunctionSet { .. } => ResultType::FunctionSet,
            LookupResult::Template { .. } => ResultType::Template,
            LookupResult::Type { .. } => ResultType::Type,
            LookupResult::Variable { .. } => ResultType::Variable,
            LookupResult::DataMember { .. } => ResultType::DataMember,
            LookupResult::StaticDataMember { .. } => ResultType::StaticDataMember,
            LookupResult::Global { .. } => ResultType::Global,
            LookupResult::Local { .. } => ResultType::Local,
            LookupResult::EnumValue { .. } => ResultType::EnumValue,
            LookupResult::Namespace { .. } => ResultType::Namespace,
            LookupResult::Capture { .. } => ResultType::Capture,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, LookupResult::Unknown)
    }

    /// The type a value-like result has.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            LookupResult::Type { data_type }
            | LookupResult::Variable { data_type, .. }
            | LookupResult::DataMember { data_type, .. }
            | LookupResult::StaticDataMember { data_type, .. }
            | LookupResult::Global { data_type, .. }
            | LookupResult::Local { data_type, .. }
            | LookupResult::Capture { data_type, .. } => Some(*data_type),
            LookupResult::EnumValue { enum_type, .. } => Some(DataType::simple(*enum_type)),
            _ => None,
        }
    }

    fn functions(functions: Vec<TypeHash>, templates: Vec<TypeHash>) -> Self {
        if functions.is_empty() && templates.is_empty() {
            return LookupResult::Unknown;
        }
        LookupResult::FunctionSet {
            functions,
            templates,
            explicit_arguments: Vec::new(),
        }
    }
}

/// Outcome of resolving a call by name.
#[derive(Debug, Clone)]
pub struct CallResolution {
    pub resolution: OverloadResolution,
    /// Function templates left out because deduction or substitution failed.
    pub rejected_templates: Vec<(TypeHash, TemplateError)>,
}

// ============================================================================
// NameLookup
// ============================================================================

/// Resolves names against a scope chain.
///
/// Lookup itself never changes the scope. Template-ids instantiate through
/// the session, which is why it is borrowed mutably.
pub struct NameLookup<'s> {
    session: &'s mut Session,
}

impl<'s> NameLookup<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    fn registry(&self) -> &SymbolRegistry {
        self.session.registry()
    }

    /// Resolve `identifier` as seen from `scope`. An unknown name is
    /// `Ok(LookupResult::Unknown)`; errors come from template instantiation.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(&mut self, identifier: &Identifier, scope: &Scope) -> Result<LookupResult, SemanticError> {
        let result = match identifier {
            Identifier::Simple(name) => self.resolve_simple(name, scope),
            Identifier::Operator(op) => LookupResult::functions(
                operators::gather(
                    self.registry(),
                    *op,
                    &[],
                    scope,
                    OperatorLookup::CONSIDER_CURRENT_SCOPE | OperatorLookup::REMOVE_DUPLICATES,
                ),
                Vec::new(),
            ),
            Identifier::Scoped { lhs, rhs } => {
                let qualifier = self.resolve_qualifier(lhs, scope)?;
                self.resolve_in(&qualifier, rhs)?
            }
            Identifier::Template { name, arguments } => {
                let base = self.resolve_simple(name, scope);
                self.apply_template_arguments(base, arguments)?
            }
        };
        tracing::trace!(%identifier, kind = ?result.kind(), "resolved name");
        Ok(result)
    }

    /// Like [`resolve`](Self::resolve), with an unknown name as an error.
    pub fn try_resolve(&mut self, identifier: &Identifier, scope: &Scope) -> Result<LookupResult, SemanticError> {
        match self.resolve(identifier, scope)? {
            LookupResult::Unknown => Err(SemanticError::UnknownIdentifier {
                name: identifier.to_string(),
            }),
            found => Ok(found),
        }
    }

    /// Member `name` of `class` or one of its bases.
    pub fn member(&self, class: TypeHash, name: &str) -> LookupResult {
        let registry = self.registry();
        let chain = registry.base_chain(class);
        if chain.is_empty() {
            return LookupResult::Unknown;
        }

        let mut offset: usize = chain
            .iter()
            .filter_map(|c| registry.get_class(*c))
            .map(|c| c.data_members.len())
            .sum();
        for hash in &chain {
            let Some(entry) = registry.get_class(*hash) else {
                continue;
            };
            offset -= entry.data_members.len();
            if let Some((index, member)) = entry.find_data_member(name) {
                return LookupResult::DataMember {
                    class: *hash,
                    index: offset + index,
                    data_type: member.data_type,
                };
            }
        }

        self.static_member(&chain, name)
    }

    /// Operator candidates for `op` with operands of `operand_types`.
    pub fn operators(
        &self,
        op: OperatorKind,
        operand_types: &[DataType],
        scope: &Scope,
        flags: OperatorLookup,
    ) -> Vec<TypeHash> {
        operators::gather(self.registry(), op, operand_types, scope, flags)
    }

    /// Resolve a call `identifier(arguments)`.
    ///
    /// Function templates in the set are deduced against the argument types
    /// and compete with their substituted signatures; those whose deduction
    /// or substitution fails drop out. Only a winning template instance has
    /// its body compiled, and a body failure fails the call. A name
    /// that resolves to a class calls its constructors.
    #[tracing::instrument(level = "debug", skip_all, fields(callee = %identifier, arguments = arguments.len()))]
    pub fn resolve_call(
        &mut self,
        identifier: &Identifier,
        scope: &Scope,
        arguments: Arguments,
        object: ImplicitObject,
    ) -> Result<CallResolution, SemanticError> {
        let (mut candidates, templates, explicit) = match self.resolve(identifier, scope)? {
            LookupResult::FunctionSet {
                functions,
                templates,
                explicit_arguments,
            } => (functions, templates, explicit_arguments),
            LookupResult::Type { data_type } if self.registry().get_class(data_type.type_hash).is_some() => {
                let ctors = self
                    .registry()
                    .constructors(data_type.type_hash)
                    .map(|f| f.func_hash())
                    .collect();
                (ctors, Vec::new(), Vec::new())
            }
            LookupResult::Unknown => {
                return Err(SemanticError::UnknownIdentifier {
                    name: identifier.to_string(),
                });
            }
            _ => {
                return Err(SemanticError::NotCallable {
                    name: identifier.to_string(),
                });
            }
        };

        let arg_types = arguments.types();
        let mut rejected_templates = Vec::new();
        let mut declared = Vec::new();
        for template in templates {
            match FunctionTemplateProcessor::new(self.session).declare(template, &explicit, &arg_types) {
                Ok(instance) => {
                    candidates.push(instance.function());
                    if let DeclaredInstance::Signature { function, arguments } = instance {
                        declared.push((template, function, arguments));
                    }
                }
                Err(err) => {
                    tracing::debug!(%template, error = %err, "template dropped from candidate set");
                    rejected_templates.push((template, err));
                }
            }
        }

        let mut resolution = OverloadResolution::new().with_implicit_object(object);
        resolution.process(&self.session.context(), &candidates, arguments);

        // Declared signatures only served the ranking; the winner is rebuilt
        // with its body through the instance cache
        for (_, function, _) in &declared {
            self.session.registry_mut().remove_function(*function);
        }
        let winner = declared
            .into_iter()
            .find(|(_, function, _)| resolution.selected() == Some(*function));
        if let Some((template, function, arguments)) = winner {
            let instance = self.session.instantiate_function(template, &arguments)?;
            debug_assert_eq!(instance, function);
        }

        Ok(CallResolution {
            resolution,
            rejected_templates,
        })
    }

    // =========================================================================
    // Simple names
    // =========================================================================

    fn resolve_simple(&self, name: &str, scope: &Scope) -> LookupResult {
        if let Some(kind) = libscript_core::FundamentalKind::from_keyword(name) {
            return LookupResult::Type {
                data_type: DataType::simple(kind.hash()),
            };
        }
        if name == "auto" {
            return LookupResult::Type {
                data_type: DataType::simple(primitives::AUTO),
            };
        }

        let registry = self.registry();
        let tree = registry.namespaces();
        for level in scope.levels() {
            let found = match level {
                ScopeLevel::Block(locals) => locals
                    .get(name)
                    .map_or(LookupResult::Unknown, |var| LookupResult::Local {
                        slot: var.slot,
                        data_type: var.data_type,
                    }),
                ScopeLevel::Lambda(closure) => registry
                    .get(*closure)
                    .and_then(TypeEntry::as_closure)
                    .and_then(|c| c.find_capture(name))
                    .map_or(LookupResult::Unknown, |(index, capture)| LookupResult::Capture {
                        closure: *closure,
                        index,
                        data_type: capture.data_type,
                    }),
                ScopeLevel::Class(class) => self.member(*class, name),
                ScopeLevel::TemplateArguments(bindings) => bindings
                    .iter()
                    .find(|(bound, _)| bound == name)
                    .map_or(LookupResult::Unknown, |(_, arg)| bound_argument(*arg)),
                ScopeLevel::Namespace(path) => tree
                    .get_path(path)
                    .map_or(LookupResult::Unknown, |node| self.in_namespace(node, name)),
            };
            if !found.is_unknown() {
                return found;
            }
        }

        for path in scope.namespaces() {
            let Some(node) = tree.get_path(path) else {
                continue;
            };
            for import in tree.imports(node) {
                let found = self.in_namespace(import, name);
                if !found.is_unknown() {
                    return found;
                }
            }
        }
        LookupResult::Unknown
    }

    /// Names declared directly in one namespace.
    fn in_namespace(&self, node: NodeIndex, name: &str) -> LookupResult {
        let registry = self.registry();
        let tree = registry.namespaces();
        let Some(data) = tree.namespace(node) else {
            return LookupResult::Unknown;
        };

        if let Some(hash) = data.types.get(name) {
            return LookupResult::Type {
                data_type: DataType::simple(*hash),
            };
        }
        if let Some((enum_type, value)) = data.enum_values.get(name) {
            return LookupResult::EnumValue {
                enum_type: *enum_type,
                value: *value,
            };
        }
        if let Some(child) = tree.find_child(node, name) {
            return LookupResult::Namespace {
                path: tree.path_of(child),
            };
        }
        let functions = data.functions.get(name).cloned().unwrap_or_default();
        let templates = data.function_templates.get(name).cloned().unwrap_or_default();
        if !functions.is_empty() || !templates.is_empty() {
            return LookupResult::functions(functions, templates);
        }
        if let Some(template) = data.class_templates.get(name) {
            return LookupResult::Template { template: *template };
        }
        if let Some(global) = data.globals.get(name).and_then(|g| registry.get_global(*g)) {
            return LookupResult::Global {
                global: global.hash,
                data_type: global.data_type,
            };
        }
        LookupResult::Unknown
    }

    /// Everything but non-static data members, searched along `chain`.
    fn static_member(&self, chain: &[TypeHash], name: &str) -> LookupResult {
        let registry = self.registry();
        let classes: Vec<_> = chain.iter().filter_map(|c| registry.get_class(*c)).collect();

        for class in &classes {
            if let Some(member) = class.find_static_member(name) {
                return LookupResult::StaticDataMember {
                    class: class.type_hash,
                    data_type: member.data_type,
                };
            }
        }
        for class in &classes {
            let nested = class
                .nested_types
                .iter()
                .find(|h| registry.get(**h).and_then(TypeEntry::name) == Some(name));
            if let Some(nested) = nested {
                return LookupResult::Type {
                    data_type: DataType::simple(*nested),
                };
            }
        }
        // Methods of the most derived class declaring the name hide the rest.
        for class in &classes {
            let functions: Vec<TypeHash> = registry
                .methods(class.type_hash)
                .filter(|m| m.def.name == name)
                .map(|m| m.func_hash())
                .collect();
            let templates: Vec<TypeHash> = class
                .member_templates
                .iter()
                .copied()
                .filter(|t| registry.get_function_template(*t).is_some_and(|e| e.name == name))
                .collect();
            if !functions.is_empty() || !templates.is_empty() {
                return LookupResult::functions(functions, templates);
            }
        }
        LookupResult::Unknown
    }

    // =========================================================================
    // Qualified names and template-ids
    // =========================================================================

    /// Resolve the left side of `A::B`. A name that does not denote a
    /// namespace, type or template still qualifies if a namespace of that
    /// name is visible.
    fn resolve_qualifier(&mut self, lhs: &Identifier, scope: &Scope) -> Result<LookupResult, SemanticError> {
        let result = self.resolve(lhs, scope)?;
        if matches!(
            result,
            LookupResult::Namespace { .. } | LookupResult::Type { .. } | LookupResult::Template { .. }
        ) {
            return Ok(result);
        }
        let Identifier::Simple(name) = lhs else {
            return Ok(LookupResult::Unknown);
        };
        let tree = self.registry().namespaces();
        let found = scope
            .namespaces()
            .filter_map(|path| tree.get_path(path))
            .find_map(|node| tree.find_child(node, name))
            .map_or(LookupResult::Unknown, |child| LookupResult::Namespace {
                path: tree.path_of(child),
            });
        Ok(found)
    }

    /// Look `rhs` up inside an already resolved qualifier only.
    fn resolve_in(&mut self, qualifier: &LookupResult, rhs: &Identifier) -> Result<LookupResult, SemanticError> {
        if let Identifier::Scoped { lhs, rhs: last } = rhs {
            let inner = self.resolve_in(qualifier, lhs)?;
            return self.resolve_in(&inner, last);
        }

        match qualifier {
            LookupResult::Namespace { path } => {
                let tree = self.registry().namespaces();
                let Some(node) = tree.get_path(path) else {
                    return Ok(LookupResult::Unknown);
                };
                match rhs {
                    Identifier::Simple(name) => Ok(self.in_namespace_or_imports(node, name)),
                    Identifier::Template { name, arguments } => {
                        let base = self.in_namespace_or_imports(node, name);
                        self.apply_template_arguments(base, arguments)
                    }
                    Identifier::Operator(op) => {
                        let functions = tree
                            .namespace(node)
                            .and_then(|data| data.operators.get(op))
                            .cloned()
                            .unwrap_or_default();
                        Ok(LookupResult::functions(functions, Vec::new()))
                    }
                    Identifier::Scoped { .. } => Ok(LookupResult::Unknown),
                }
            }
            LookupResult::Type { data_type } => {
                let registry = self.registry();
                if let Some(e) = registry.get_enum(data_type.type_hash) {
                    let found = rhs.name().and_then(|name| e.value(name));
                    return Ok(found.map_or(LookupResult::Unknown, |value| LookupResult::EnumValue {
                        enum_type: e.type_hash,
                        value,
                    }));
                }
                match rhs {
                    Identifier::Simple(name) => Ok(self.static_member(&registry.base_chain(data_type.type_hash), name)),
                    Identifier::Template { name, arguments } => {
                        let base = self.static_member(&registry.base_chain(data_type.type_hash), name);
                        self.apply_template_arguments(base, arguments)
                    }
                    Identifier::Operator(op) => {
                        let functions = registry
                            .methods(data_type.type_hash)
                            .filter(|m| m.def.operator() == Some(*op))
                            .map(|m| m.func_hash())
                            .collect();
                        Ok(LookupResult::functions(functions, Vec::new()))
                    }
                    Identifier::Scoped { .. } => Ok(LookupResult::Unknown),
                }
            }
            _ => Ok(LookupResult::Unknown),
        }
    }

    fn in_namespace_or_imports(&self, node: NodeIndex, name: &str) -> LookupResult {
        let found = self.in_namespace(node, name);
        if !found.is_unknown() {
            return found;
        }
        let tree = self.registry().namespaces();
        tree.imports(node)
            .into_iter()
            .map(|import| self.in_namespace(import, name))
            .find(|r| !r.is_unknown())
            .unwrap_or(LookupResult::Unknown)
    }

    fn apply_template_arguments(
        &mut self,
        base: LookupResult,
        arguments: &[TemplateArgument],
    ) -> Result<LookupResult, SemanticError> {
        match base {
            LookupResult::Template { template } => {
                let instance = self.session.instantiate_class(template, arguments)?;
                Ok(LookupResult::Type {
                    data_type: DataType::simple(instance),
                })
            }
            LookupResult::FunctionSet { templates, .. } if !templates.is_empty() => Ok(LookupResult::FunctionSet {
                functions: Vec::new(),
                templates,
                explicit_arguments: arguments.to_vec(),
            }),
            _ => Ok(LookupResult::Unknown),
        }
    }
}

fn bound_argument(arg: TemplateArgument) -> LookupResult {
    match arg {
        TemplateArgument::Type(data_type) => LookupResult::Type { data_type },
        TemplateArgument::Bool(_) => LookupResult::Variable {
            data_type: DataType::constant(primitives::BOOL),
            value: arg,
        },
        TemplateArgument::Integer(_) => LookupResult::Variable {
            data_type: DataType::constant(primitives::INT),
            value: arg,
        },
    }
}
