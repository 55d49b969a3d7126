//! Initialization of variables, parameters and return values.
//!
//! An [`Initialization`] describes how a destination of some type acquires
//! its value:
//!
//! - **Default**: no initializer. Fundamentals and classes with a usable
//!   default constructor are valid.
//! - **Copy / Direct**: from a value, through a [`Conversion`]. Direct
//!   initialization may use explicit constructors and casts.
//! - **Reference**: the destination is a reference.
//! - **List**: from a brace list. The destination is the built-in list type,
//!   or a class with an initializer-list constructor or a positional
//!   constructor taking one argument per element.
//! - **Aggregate**: from a brace list into a class without constructors, one
//!   element per data member.
//!
//! Brace lists never accept narrowing conversions. A failed initialization is
//! still a value, carrying an [`InitFailure`] that explains why.

use std::cmp::Ordering;

use libscript_core::{DataType, Expression, FunctionEntry, SemanticError, TypeHash, primitives};
use thiserror::Error;

use crate::context::CompilationContext;
use crate::conversion::{Conversion, ConversionError, ConversionPolicy, ConversionRank};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitCategory {
    Invalid,
    Default,
    Direct,
    Copy,
    Reference,
    List,
    Aggregate,
}

/// Syntax of a value initialization: `T x = v;` versus `T x(v);`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InitStyle {
    Direct,
    #[default]
    Copy,
}

impl InitStyle {
    pub fn policy(self) -> ConversionPolicy {
        match self {
            InitStyle::Direct => ConversionPolicy::AllowExplicitConversions,
            InitStyle::Copy => ConversionPolicy::NoExplicitConversions,
        }
    }

    fn category(self) -> InitCategory {
        match self {
            InitStyle::Direct => InitCategory::Direct,
            InitStyle::Copy => InitCategory::Copy,
        }
    }
}

/// Shape of a structured initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructionForm {
    Default,
    BuiltinList,
    InitializerListConstructor,
    PositionalConstructor,
    Aggregate,
}

impl ConstructionForm {
    fn is_list(self) -> bool {
        self != ConstructionForm::Default
    }

    /// Lower is preferred when two list initializations compete.
    fn preference(self) -> u8 {
        match self {
            ConstructionForm::BuiltinList | ConstructionForm::InitializerListConstructor => 0,
            _ => 1,
        }
    }
}

/// A constructor call or list built from child initializations.
#[derive(Debug, Clone, PartialEq)]
pub struct Construction {
    pub dest: DataType,
    pub constructor: Option<TypeHash>,
    pub children: Vec<Initialization>,
    pub form: ConstructionForm,
}

/// Why an initialization is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitFailure {
    #[error("cannot convert from '{from}' to '{to}'")]
    NotConvertible { from: DataType, to: DataType },

    #[error("conversion from '{from}' to '{to}' is ambiguous")]
    AmbiguousConversion {
        from: DataType,
        to: DataType,
        candidates: Vec<TypeHash>,
    },

    #[error("element {index}: narrowing conversion from '{from}' to '{to}'")]
    Narrowing { index: usize, from: DataType, to: DataType },

    #[error("'{dest}' cannot be initialized from a brace list")]
    ListNotAllowed { dest: DataType },

    #[error("no constructor of '{dest}' takes {elements} elements")]
    NoMatchingConstructor { dest: DataType, elements: usize },

    #[error("'{dest}' is not default constructible")]
    NotDefaultConstructible { dest: DataType },

    #[error("element {index}: {failure}")]
    Element { index: usize, failure: Box<InitFailure> },
}

impl From<ConversionError> for InitFailure {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::NotConvertible { from, to } => InitFailure::NotConvertible { from, to },
            ConversionError::Ambiguous { from, to, candidates } => {
                InitFailure::AmbiguousConversion { from, to, candidates }
            }
        }
    }
}

impl From<InitFailure> for SemanticError {
    fn from(failure: InitFailure) -> Self {
        let list = DataType::simple(primitives::INITIALIZER_LIST);
        match failure {
            InitFailure::NotConvertible { from, to } => SemanticError::NotConvertible { from, to },
            InitFailure::AmbiguousConversion { from, to, candidates } => {
                SemanticError::AmbiguousConversion { from, to, candidates }
            }
            InitFailure::Narrowing { from, to, .. } => SemanticError::NarrowingConversionRejected { from, to },
            InitFailure::ListNotAllowed { dest } | InitFailure::NoMatchingConstructor { dest, .. } => {
                SemanticError::NotConvertible { from: list, to: dest }
            }
            InitFailure::NotDefaultConstructible { dest } => SemanticError::NotConvertible {
                from: DataType::void(),
                to: dest,
            },
            InitFailure::Element { failure, .. } => SemanticError::from(*failure),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum InitPayload {
    Conversion(Conversion),
    Construction(Construction),
    Failure(InitFailure),
}

/// How one destination acquires its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Initialization {
    category: InitCategory,
    payload: InitPayload,
}

// ============================================================================
// Construction
// ============================================================================

impl Initialization {
    pub fn failed(failure: InitFailure) -> Self {
        Self {
            category: InitCategory::Invalid,
            payload: InitPayload::Failure(failure),
        }
    }

    fn converted(category: InitCategory, conversion: Conversion) -> Self {
        Self {
            category,
            payload: InitPayload::Conversion(conversion),
        }
    }

    fn constructed(category: InitCategory, construction: Construction) -> Self {
        Self {
            category,
            payload: InitPayload::Construction(construction),
        }
    }

    /// Initialization without an initializer.
    pub fn default(ctx: &CompilationContext<'_>, dest: DataType) -> Self {
        let not_constructible = || Self::failed(InitFailure::NotDefaultConstructible { dest });
        let construct = |constructor| {
            Self::constructed(
                InitCategory::Default,
                Construction {
                    dest,
                    constructor,
                    children: Vec::new(),
                    form: ConstructionForm::Default,
                },
            )
        };

        if dest.is_reference() || ctx.is_opaque_value(dest) {
            return not_constructible();
        }
        if dest.is_array() {
            return construct(None);
        }
        if let Some(kind) = ctx.fundamental(dest) {
            return if kind == libscript_core::FundamentalKind::Void {
                not_constructible()
            } else {
                construct(None)
            };
        }
        let Some(class) = ctx.get_class(dest.type_hash) else {
            return not_constructible();
        };
        if class.constructors.is_empty() {
            return construct(None);
        }
        match ctx
            .registry()
            .constructors(dest.type_hash)
            .find(|f| f.def.min_args() == 0 && !f.def.is_deleted())
        {
            Some(ctor) => construct(Some(ctor.func_hash())),
            None => not_constructible(),
        }
    }

    /// Initialization from a value of type `src`.
    #[tracing::instrument(level = "trace", skip(ctx))]
    pub fn from_type(ctx: &CompilationContext<'_>, dest: DataType, src: DataType, style: InitStyle) -> Self {
        let policy = style.policy();
        let category = if dest.is_reference() {
            InitCategory::Reference
        } else {
            style.category()
        };

        match Conversion::try_compute(ctx, src, dest, policy) {
            Ok(conv) => Self::converted(category, conv),
            Err(ConversionError::NotConvertible { .. }) if dest.is_const_ref() => {
                match Conversion::try_compute(ctx, src, dest.without_ref(), policy) {
                    Ok(conv) => Self::converted(InitCategory::Reference, conv),
                    Err(err) => Self::failed(err.into()),
                }
            }
            Err(err) => Self::failed(err.into()),
        }
    }

    /// Initialization from a compiled expression. Brace lists become list
    /// initialization; everything else is copy-initialization.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn from_expression(ctx: &CompilationContext<'_>, dest: DataType, expr: &Expression) -> Self {
        match expr.elements() {
            Some(elements) => Self::from_list(ctx, dest, elements),
            None => Self::from_type(ctx, dest, expr.data_type(), InitStyle::Copy),
        }
    }

    fn from_list(ctx: &CompilationContext<'_>, dest: DataType, elements: &[Expression]) -> Self {
        if ctx.is_opaque_value(dest) || dest.is_mutable_ref() {
            return Self::failed(InitFailure::ListNotAllowed { dest });
        }

        if let Some(element) = ctx.list_element_type(dest) {
            return match initialize_elements(ctx, element, elements) {
                Ok(children) => Self::list(dest, None, children, ConstructionForm::BuiltinList),
                Err(failure) => Self::failed(failure),
            };
        }

        if elements.is_empty() {
            return Self::default(ctx, dest.without_ref());
        }

        let Some(class) = ctx.get_class(dest.type_hash).filter(|_| !dest.is_array()) else {
            return Self::failed(InitFailure::ListNotAllowed { dest });
        };

        if class.constructors.is_empty() {
            return Self::aggregate(ctx, dest, elements);
        }

        // Brace lists are copy-list-initialization: explicit constructors are skipped
        let constructors: Vec<&FunctionEntry> = ctx
            .registry()
            .constructors(dest.type_hash)
            .filter(|f| !f.def.is_deleted() && !f.def.is_explicit())
            .collect();

        // An initializer-list constructor decides the outcome on its own
        if let Some((ctor, element)) = constructors
            .iter()
            .find_map(|ctor| initializer_list_parameter(ctx, ctor).map(|element| (ctor, element)))
        {
            return match initialize_elements(ctx, element, elements) {
                Ok(children) => {
                    Self::list(dest, Some(ctor.func_hash()), children, ConstructionForm::InitializerListConstructor)
                }
                Err(failure) => Self::failed(failure),
            };
        }

        let mut narrowing = None;
        for ctor in &constructors {
            if ctor.def.params.len() != elements.len() {
                continue;
            }
            match positional_arguments(ctx, ctor, elements) {
                Ok(children) => {
                    return Self::list(dest, Some(ctor.func_hash()), children, ConstructionForm::PositionalConstructor);
                }
                Err(failure @ InitFailure::Narrowing { .. }) => {
                    narrowing.get_or_insert(failure);
                }
                Err(_) => {}
            }
        }

        Self::failed(narrowing.unwrap_or(InitFailure::NoMatchingConstructor {
            dest,
            elements: elements.len(),
        }))
    }

    fn aggregate(ctx: &CompilationContext<'_>, dest: DataType, elements: &[Expression]) -> Self {
        let Some(class) = ctx.get_class(dest.type_hash) else {
            return Self::failed(InitFailure::ListNotAllowed { dest });
        };
        if class.data_members.len() != elements.len() {
            return Self::failed(InitFailure::NoMatchingConstructor {
                dest,
                elements: elements.len(),
            });
        }
        let types = class.data_members.iter().map(|m| m.data_type);
        match initialize_each(ctx, types, elements) {
            Ok(children) => Self::constructed(
                InitCategory::Aggregate,
                Construction {
                    dest,
                    constructor: None,
                    children,
                    form: ConstructionForm::Aggregate,
                },
            ),
            Err(failure) => Self::failed(failure),
        }
    }

    fn list(
        dest: DataType,
        constructor: Option<TypeHash>,
        children: Vec<Initialization>,
        form: ConstructionForm,
    ) -> Self {
        Self::constructed(
            InitCategory::List,
            Construction {
                dest,
                constructor,
                children,
                form,
            },
        )
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn category(&self) -> InitCategory {
        self.category
    }

    pub fn is_valid(&self) -> bool {
        match &self.payload {
            InitPayload::Conversion(conv) => conv.is_valid(),
            InitPayload::Construction(_) => true,
            InitPayload::Failure(_) => false,
        }
    }

    pub fn conversion(&self) -> Option<&Conversion> {
        match &self.payload {
            InitPayload::Conversion(conv) => Some(conv),
            _ => None,
        }
    }

    pub fn construction(&self) -> Option<&Construction> {
        match &self.payload {
            InitPayload::Construction(c) => Some(c),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&InitFailure> {
        match &self.payload {
            InitPayload::Failure(f) => Some(f),
            _ => None,
        }
    }

    /// Constructor selected by a structured initialization.
    pub fn constructor(&self) -> Option<TypeHash> {
        self.construction().and_then(|c| c.constructor)
    }

    pub fn children(&self) -> &[Initialization] {
        self.construction().map_or(&[], |c| c.children.as_slice())
    }

    pub fn is_list(&self) -> bool {
        self.construction().is_some_and(|c| c.form.is_list())
    }

    /// Only a direct conversion can narrow; list children are checked when
    /// the list is built.
    pub fn is_narrowing(&self) -> bool {
        self.conversion().is_some_and(Conversion::is_narrowing)
    }

    /// Worst rank involved. Structured initializations take their worst child.
    pub fn rank(&self) -> ConversionRank {
        match &self.payload {
            InitPayload::Conversion(conv) => conv.rank(),
            InitPayload::Construction(c) => c
                .children
                .iter()
                .map(Initialization::rank)
                .max()
                .unwrap_or(ConversionRank::ExactMatch),
            InitPayload::Failure(_) => ConversionRank::NotConvertible,
        }
    }

    /// `Less` when `self` is better.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (true, true) => {}
        }
        match (&self.payload, &other.payload) {
            (InitPayload::Conversion(a), InitPayload::Conversion(b)) => a.compare(b),
            (InitPayload::Construction(a), InitPayload::Construction(b)) => {
                match (a.form.is_list(), b.form.is_list()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => a
                        .form
                        .preference()
                        .cmp(&b.form.preference())
                        .then_with(|| self.rank().cmp(&other.rank())),
                }
            }
            _ => match (self.is_list(), other.is_list()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }

    /// The initialization, or the reason it is invalid.
    pub fn into_result(self) -> Result<Self, InitFailure> {
        match self.payload {
            InitPayload::Failure(failure) => Err(failure),
            InitPayload::Conversion(conv) if !conv.is_valid() => Err(InitFailure::NotConvertible {
                from: conv.source(),
                to: conv.destination(),
            }),
            _ => Ok(self),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Element type of a constructor taking only an `initializer_list<T>`.
fn initializer_list_parameter(ctx: &CompilationContext<'_>, ctor: &FunctionEntry) -> Option<DataType> {
    match ctor.def.params.as_slice() {
        [param] => ctx.list_element_type(param.data_type.base()),
        _ => None,
    }
}

fn initialize_elements(
    ctx: &CompilationContext<'_>,
    element: DataType,
    elements: &[Expression],
) -> Result<Vec<Initialization>, InitFailure> {
    initialize_each(ctx, std::iter::repeat(element), elements)
}

fn positional_arguments(
    ctx: &CompilationContext<'_>,
    ctor: &FunctionEntry,
    elements: &[Expression],
) -> Result<Vec<Initialization>, InitFailure> {
    initialize_each(ctx, ctor.def.params.iter().map(|p| p.data_type), elements)
}

/// Initialize each element against its destination, stopping at the first
/// invalid or narrowing element.
fn initialize_each(
    ctx: &CompilationContext<'_>,
    dests: impl IntoIterator<Item = DataType>,
    elements: &[Expression],
) -> Result<Vec<Initialization>, InitFailure> {
    let mut children = Vec::with_capacity(elements.len());
    for (index, (dest, element)) in dests.into_iter().zip(elements).enumerate() {
        let child = Initialization::from_expression(ctx, dest, element);
        if let Some(failure) = child.failure() {
            return Err(InitFailure::Element {
                index,
                failure: Box::new(failure.clone()),
            });
        }
        if child.is_narrowing() {
            return Err(InitFailure::Narrowing {
                index,
                from: element.data_type(),
                to: dest,
            });
        }
        children.push(child);
    }
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use libscript_core::{ClassEntry, ClassFlags, EnumEntry, Param, TemplateArgument};
    use libscript_registry::SymbolRegistry;
    use pretty_assertions::assert_eq;

    fn int() -> DataType {
        DataType::simple(primitives::INT)
    }

    fn lit(hash: TypeHash) -> Expression {
        Expression::literal(hash)
    }

    /// Registers `initializer_list<T>` directly, the way the template
    /// instantiation path would.
    fn list_of(registry: &mut SymbolRegistry, element: TypeHash) -> TypeHash {
        let args = vec![TemplateArgument::from(element)];
        let hash = TypeHash::from_template_instance(primitives::INITIALIZER_LIST_TEMPLATE, &args);
        let name = format!("initializer_list<{}>", DataType::simple(element));
        let class = ClassEntry::with_identity(name.clone(), "", name, hash)
            .with_template_instance(primitives::INITIALIZER_LIST_TEMPLATE, args);
        registry.register_type(class).unwrap()
    }

    #[test]
    fn default_of_fundamentals_and_classes() {
        let mut registry = SymbolRegistry::with_builtins();
        let plain = registry.register_type(ClassEntry::new("", "Plain")).unwrap();
        let strict = registry.register_type(ClassEntry::new("", "Strict")).unwrap();
        registry
            .register_function(FunctionEntry::constructor(strict, vec![Param::of(int())]))
            .unwrap();
        let ctx = CompilationContext::new(&registry);

        assert!(Initialization::default(&ctx, int()).is_valid());
        assert!(Initialization::default(&ctx, DataType::simple(plain)).is_valid());
        assert!(!Initialization::default(&ctx, DataType::void()).is_valid());
        assert!(!Initialization::default(&ctx, DataType::reference(primitives::INT)).is_valid());

        let failed = Initialization::default(&ctx, DataType::simple(strict));
        assert_eq!(
            failed.failure(),
            Some(&InitFailure::NotDefaultConstructible {
                dest: DataType::simple(strict)
            })
        );
    }

    #[test]
    fn default_of_enum_is_invalid() {
        let mut registry = SymbolRegistry::with_builtins();
        let side = registry.register_type(EnumEntry::new("", "Side").with_value("Left", 0)).unwrap();
        let ctx = CompilationContext::new(&registry);
        assert_eq!(Initialization::default(&ctx, DataType::simple(side)).category(), InitCategory::Invalid);
    }

    #[test]
    fn copy_and_direct_categories() {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let double = DataType::simple(primitives::DOUBLE);

        let copy = Initialization::from_type(&ctx, double, int(), InitStyle::Copy);
        assert_eq!(copy.category(), InitCategory::Copy);
        assert_eq!(copy.rank(), ConversionRank::Promotion);

        let direct = Initialization::from_type(&ctx, double, int(), InitStyle::Direct);
        assert_eq!(direct.category(), InitCategory::Direct);

        let reference = Initialization::from_type(&ctx, DataType::const_ref(primitives::INT), int(), InitStyle::Copy);
        assert_eq!(reference.category(), InitCategory::Reference);
    }

    #[test]
    fn non_list_expression_is_copy_initialization() {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let init = Initialization::from_expression(&ctx, int(), &lit(primitives::CHAR));
        assert_eq!(init.category(), InitCategory::Copy);
        assert!(init.is_valid());
    }

    #[test]
    fn opaque_destinations_reject_lists() {
        let mut registry = SymbolRegistry::with_builtins();
        let side = registry.register_type(EnumEntry::new("", "Side").with_value("Left", 0)).unwrap();
        let ctx = CompilationContext::new(&registry);
        let init = Initialization::from_expression(&ctx, DataType::simple(side), &Expression::list(vec![]));
        assert!(matches!(init.failure(), Some(InitFailure::ListNotAllowed { .. })));
    }

    #[test]
    fn builtin_list_initializes_each_element() {
        let mut registry = SymbolRegistry::with_builtins();
        let list = list_of(&mut registry, primitives::DOUBLE);
        let ctx = CompilationContext::new(&registry);

        let expr = Expression::list(vec![lit(primitives::INT), lit(primitives::FLOAT)]);
        let init = Initialization::from_expression(&ctx, DataType::simple(list), &expr);
        assert_eq!(init.category(), InitCategory::List);
        assert_eq!(init.children().len(), 2);
        assert_eq!(init.rank(), ConversionRank::Promotion);
    }

    #[test]
    fn builtin_list_fails_fast_on_bad_element() {
        let mut registry = SymbolRegistry::with_builtins();
        let list = list_of(&mut registry, primitives::INT);
        let ctx = CompilationContext::new(&registry);

        let expr = Expression::list(vec![lit(primitives::INT), lit(primitives::VOID), lit(primitives::DOUBLE)]);
        let init = Initialization::from_expression(&ctx, DataType::simple(list), &expr);
        assert!(matches!(init.failure(), Some(InitFailure::Element { index: 1, .. })));
    }

    #[test]
    fn list_rejects_narrowing_that_a_call_would_accept() {
        let mut registry = SymbolRegistry::with_builtins();
        let meters = registry.register_type(ClassEntry::new("", "Meters")).unwrap();
        registry
            .register_function(FunctionEntry::constructor(meters, vec![Param::of(int())]))
            .unwrap();
        let ctx = CompilationContext::new(&registry);
        let dest = DataType::simple(meters);

        let by_value = Initialization::from_type(&ctx, dest, DataType::simple(primitives::DOUBLE), InitStyle::Copy);
        assert!(by_value.is_valid());

        let listed = Initialization::from_expression(&ctx, dest, &Expression::list(vec![lit(primitives::DOUBLE)]));
        assert!(matches!(listed.failure(), Some(InitFailure::Narrowing { index: 0, .. })));
    }

    #[test]
    fn positional_constructor_matches_element_count() {
        let mut registry = SymbolRegistry::with_builtins();
        let point = registry.register_type(ClassEntry::new("", "Point")).unwrap();
        registry
            .register_function(FunctionEntry::constructor(point, vec![Param::of(int())]))
            .unwrap();
        let two = registry
            .register_function(FunctionEntry::constructor(point, vec![Param::of(int()), Param::of(int())]))
            .unwrap();
        let ctx = CompilationContext::new(&registry);

        let expr = Expression::list(vec![lit(primitives::INT), lit(primitives::CHAR)]);
        let init = Initialization::from_expression(&ctx, DataType::simple(point), &expr);
        assert_eq!(init.constructor(), Some(two));
        assert_eq!(init.construction().map(|c| c.form), Some(ConstructionForm::PositionalConstructor));

        let three = Expression::list(vec![lit(primitives::INT); 3]);
        let failed = Initialization::from_expression(&ctx, DataType::simple(point), &three);
        assert!(matches!(failed.failure(), Some(InitFailure::NoMatchingConstructor { elements: 3, .. })));
    }

    #[test]
    fn initializer_list_constructor_wins() {
        let mut registry = SymbolRegistry::with_builtins();
        let list = list_of(&mut registry, primitives::INT);
        let bag = registry.register_type(ClassEntry::new("", "Bag")).unwrap();
        registry
            .register_function(FunctionEntry::constructor(bag, vec![Param::of(int())]))
            .unwrap();
        let from_list = registry
            .register_function(FunctionEntry::constructor(bag, vec![Param::of(DataType::const_ref(list))]))
            .unwrap();
        let ctx = CompilationContext::new(&registry);

        let init = Initialization::from_expression(&ctx, DataType::simple(bag), &Expression::list(vec![lit(primitives::INT)]));
        assert_eq!(init.constructor(), Some(from_list));
        assert_eq!(init.construction().map(|c| c.form), Some(ConstructionForm::InitializerListConstructor));
    }

    #[test]
    fn initializer_list_constructor_rejects_narrowing_elements() {
        let mut registry = SymbolRegistry::with_builtins();
        let list = list_of(&mut registry, primitives::INT);
        let bag = registry.register_type(ClassEntry::new("", "Bag")).unwrap();
        registry
            .register_function(FunctionEntry::constructor(bag, vec![Param::of(DataType::simple(primitives::DOUBLE))]))
            .unwrap();
        registry
            .register_function(FunctionEntry::constructor(bag, vec![Param::of(DataType::const_ref(list))]))
            .unwrap();
        let ctx = CompilationContext::new(&registry);
        let dest = DataType::simple(bag);

        // Bag(double) would take the element, but the list constructor decides
        let narrowed = Initialization::from_expression(&ctx, dest, &Expression::list(vec![lit(primitives::DOUBLE)]));
        assert!(!narrowed.is_valid());
        assert!(matches!(narrowed.failure(), Some(InitFailure::Narrowing { index: 0, .. })));

        let unconvertible = Initialization::from_expression(&ctx, dest, &Expression::list(vec![lit(primitives::VOID)]));
        assert!(matches!(unconvertible.failure(), Some(InitFailure::Element { index: 0, .. })));
    }

    #[test]
    fn list_skips_explicit_positional_constructors() {
        let mut registry = SymbolRegistry::with_builtins();
        let seconds = registry.register_type(ClassEntry::new("", "Seconds")).unwrap();
        registry
            .register_function(FunctionEntry::constructor(seconds, vec![Param::of(int())]).as_explicit())
            .unwrap();
        let meters = registry.register_type(ClassEntry::new("", "Meters")).unwrap();
        registry
            .register_function(FunctionEntry::constructor(meters, vec![Param::of(int())]))
            .unwrap();
        let ctx = CompilationContext::new(&registry);
        let one = Expression::list(vec![lit(primitives::INT)]);

        let explicit = Initialization::from_expression(&ctx, DataType::simple(seconds), &one);
        assert!(matches!(explicit.failure(), Some(InitFailure::NoMatchingConstructor { elements: 1, .. })));
        assert!(Initialization::from_expression(&ctx, DataType::simple(meters), &one).is_valid());
    }

    #[test]
    fn empty_list_default_initializes() {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let init = Initialization::from_expression(&ctx, int(), &Expression::list(vec![]));
        assert_eq!(init.category(), InitCategory::Default);
    }

    #[test]
    fn mutable_reference_rejects_lists() {
        let mut registry = SymbolRegistry::with_builtins();
        let point = registry.register_type(ClassEntry::new("", "Point")).unwrap();
        let ctx = CompilationContext::new(&registry);
        let init = Initialization::from_expression(&ctx, DataType::reference(point), &Expression::list(vec![]));
        assert!(matches!(init.failure(), Some(InitFailure::ListNotAllowed { .. })));
    }

    #[test]
    fn aggregate_fills_data_members() {
        let mut registry = SymbolRegistry::with_builtins();
        let pair = registry
            .register_type(
                ClassEntry::new("", "Pair")
                    .with_data_member("first", int())
                    .with_data_member("second", DataType::simple(primitives::DOUBLE)),
            )
            .unwrap();
        let ctx = CompilationContext::new(&registry);

        let expr = Expression::list(vec![lit(primitives::INT), lit(primitives::FLOAT)]);
        let init = Initialization::from_expression(&ctx, DataType::simple(pair), &expr);
        assert_eq!(init.category(), InitCategory::Aggregate);
        assert_eq!(init.children().len(), 2);
    }

    #[test]
    fn fundamental_rejects_non_empty_list() {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let init = Initialization::from_expression(&ctx, int(), &Expression::list(vec![lit(primitives::INT)]));
        assert!(!init.is_valid());
    }

    #[test]
    fn comparison_prefers_valid_then_list() {
        let mut registry = SymbolRegistry::with_builtins();
        let list = list_of(&mut registry, primitives::INT);
        let ctx = CompilationContext::new(&registry);

        let listed = Initialization::from_expression(&ctx, DataType::simple(list), &Expression::list(vec![lit(primitives::INT)]));
        let copied = Initialization::from_type(&ctx, int(), int(), InitStyle::Copy);
        let invalid = Initialization::from_type(&ctx, int(), DataType::void(), InitStyle::Copy);

        assert_eq!(listed.compare(&copied), Ordering::Less);
        assert_eq!(copied.compare(&invalid), Ordering::Less);
        assert_eq!(invalid.compare(&invalid), Ordering::Equal);
    }

    #[test]
    fn non_copyable_class_binds_by_reference_only() {
        let mut registry = SymbolRegistry::with_builtins();
        let lock = registry.register_type(ClassEntry::new("", "Lock").non_copyable()).unwrap();
        assert!(registry.get_class(lock).unwrap().flags.contains(ClassFlags::NON_COPYABLE));
        let ctx = CompilationContext::new(&registry);
        let ty = DataType::simple(lock);

        assert!(!Initialization::from_type(&ctx, ty, ty, InitStyle::Copy).is_valid());
        assert!(Initialization::from_type(&ctx, DataType::const_ref(lock), ty, InitStyle::Copy).is_valid());
    }

    #[test]
    fn failures_escalate() {
        let failure = InitFailure::Element {
            index: 0,
            failure: Box::new(InitFailure::Narrowing {
                index: 0,
                from: DataType::simple(primitives::DOUBLE),
                to: int(),
            }),
        };
        assert!(matches!(
            SemanticError::from(failure),
            SemanticError::NarrowingConversionRejected { .. }
        ));
    }
}
