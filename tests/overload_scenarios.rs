//! Overload resolution scenarios
//!
//! Each test sets up a small registry, resolves one call and checks the
//! selected candidate or the failure with its per-candidate reports.

use libscript::prelude::*;
use libscript_compiler::{ResolutionFailure, Viability};
use pretty_assertions::assert_eq;

fn ty(hash: TypeHash) -> DataType {
    DataType::simple(hash)
}

fn foo(registry: &mut SymbolRegistry, params: &[DataType]) -> TypeHash {
    let params = params.iter().copied().map(Param::of).collect();
    registry
        .register_function(FunctionEntry::global("", "foo", params, DataType::void()))
        .unwrap()
}

fn call(session: &mut Session, arguments: Vec<DataType>) -> OverloadResolution {
    NameLookup::new(session)
        .resolve_call(
            &Identifier::simple("foo"),
            &Scope::global(),
            Arguments::Types(arguments),
            ImplicitObject::None,
        )
        .unwrap()
        .resolution
}

#[test]
fn exact_match_is_selected_over_arity_mismatch() {
    let mut registry = SymbolRegistry::with_builtins();
    foo(&mut registry, &[]);
    let with_int = foo(&mut registry, &[ty(primitives::INT)]);
    let mut session = Session::new(registry);

    let resolution = call(&mut session, vec![ty(primitives::INT)]);
    let best = resolution.into_result().unwrap();
    assert_eq!(best.function, with_int);
    assert_eq!(best.initializations[0].category(), InitCategory::Copy);
    assert_eq!(best.initializations[0].rank(), ConversionRank::ExactMatch);
}

#[test]
fn equal_conversions_are_ambiguous() {
    let mut registry = SymbolRegistry::with_builtins();
    let to_int = foo(&mut registry, &[ty(primitives::INT)]);
    let to_char = foo(&mut registry, &[ty(primitives::CHAR)]);
    let mut session = Session::new(registry);

    let resolution = call(&mut session, vec![ty(primitives::FLOAT)]);
    assert!(resolution.reports().iter().all(|r| r.is_viable()));
    assert_eq!(
        resolution.failure(),
        Some(&ResolutionFailure::Ambiguous {
            tied: vec![to_int, to_char]
        })
    );
}

#[test]
fn overloads_differing_only_in_return_type_are_ambiguous() {
    let mut registry = SymbolRegistry::with_builtins();
    let returns_void = foo(&mut registry, &[]);
    let returns_int = registry
        .register_function(
            FunctionEntry::global("", "foo", Vec::new(), ty(primitives::INT))
                .with_hash(TypeHash::from_name("foo -> int")),
        )
        .unwrap();
    let mut session = Session::new(registry);

    let err = call(&mut session, Vec::new()).into_result().unwrap_err();
    assert_eq!(
        err,
        SemanticError::AmbiguousOverload {
            candidates: vec![returns_void, returns_int],
            arguments: Vec::new(),
        }
    );
}

#[test]
fn no_viable_candidate_reports_each_reason() {
    let mut registry = SymbolRegistry::with_builtins();
    let class_a = registry.register_type(ClassEntry::new("", "ClassA")).unwrap();
    let one = foo(&mut registry, &[ty(primitives::INT)]);
    let two = foo(&mut registry, &[ty(primitives::BOOL), ty(class_a)]);
    let mut session = Session::new(registry);

    let resolution = call(&mut session, vec![ty(primitives::INT), ty(primitives::FLOAT)]);
    assert_eq!(resolution.failure(), Some(&ResolutionFailure::NoViableCandidate));

    let reports = resolution.reports();
    assert_eq!(reports[0].function, one);
    assert_eq!(
        reports[0].viability,
        Viability::IncorrectParameterCount {
            min: 1,
            max: 1,
            provided: 2
        }
    );
    assert_eq!(reports[1].function, two);
    assert!(matches!(
        reports[1].viability,
        Viability::CouldNotConvertArgument { index: 1, .. }
    ));

    let err = resolution.into_result().unwrap_err();
    assert!(matches!(err, SemanticError::NoViableCandidate { ref candidates, .. } if candidates.len() == 2));
}

#[test]
fn promotion_is_preferred_over_conversion() {
    let mut registry = SymbolRegistry::with_builtins();
    foo(&mut registry, &[ty(primitives::CHAR)]);
    let to_double = foo(&mut registry, &[ty(primitives::DOUBLE)]);
    let mut session = Session::new(registry);

    let resolution = call(&mut session, vec![ty(primitives::FLOAT)]);
    assert_eq!(resolution.selected(), Some(to_double));
}

#[test]
fn shallower_base_is_preferred() {
    let mut registry = SymbolRegistry::with_builtins();
    let shape = registry.register_type(ClassEntry::new("", "Shape")).unwrap();
    let ellipse = registry.register_type(ClassEntry::new("", "Ellipse").with_base(shape)).unwrap();
    let circle = registry.register_type(ClassEntry::new("", "Circle").with_base(ellipse)).unwrap();
    foo(&mut registry, &[DataType::const_ref(shape)]);
    let near = foo(&mut registry, &[DataType::const_ref(ellipse)]);
    let mut session = Session::new(registry);

    let resolution = call(&mut session, vec![ty(circle)]);
    assert_eq!(resolution.selected(), Some(near));
}

#[test]
fn user_defined_conversion_ranks_below_standard() {
    let mut registry = SymbolRegistry::with_builtins();
    let meters = registry.register_type(ClassEntry::new("", "Meters")).unwrap();
    registry
        .register_function(FunctionEntry::constructor(meters, vec![Param::of(ty(primitives::DOUBLE))]))
        .unwrap();
    let by_class = foo(&mut registry, &[ty(meters)]);
    let by_bool = foo(&mut registry, &[ty(primitives::BOOL)]);
    let mut session = Session::new(registry);

    let resolution = call(&mut session, vec![ty(primitives::DOUBLE)]);
    assert_eq!(resolution.selected(), Some(by_bool));
    let ranks: Vec<_> = resolution
        .reports()
        .iter()
        .map(|r| match &r.viability {
            Viability::Viable { ranks } => ranks[0],
            _ => ConversionRank::NotConvertible,
        })
        .collect();
    assert_eq!(ranks, vec![ConversionRank::UserDefinedConversion, ConversionRank::Conversion]);
    assert_ne!(resolution.selected(), Some(by_class));
}

#[test]
fn list_argument_prefers_initializer_list_constructor() {
    let registry = SymbolRegistry::with_builtins();
    let mut session = Session::new(registry);
    let list = session
        .instantiate_class(primitives::INITIALIZER_LIST_TEMPLATE, &[primitives::INT.into()])
        .unwrap();

    let registry = session.registry_mut();
    let bag = registry.register_type(ClassEntry::new("", "Bag")).unwrap();
    let positional = registry
        .register_function(FunctionEntry::constructor(bag, vec![Param::of(ty(primitives::INT))]))
        .unwrap();
    let context = session.context();
    let five = Expression::list(vec![Expression::literal(primitives::INT)]);

    let init = Initialization::from_expression(&context, ty(bag), &five);
    assert_eq!(init.constructor(), Some(positional));

    let registry = session.registry_mut();
    let from_list = registry
        .register_function(FunctionEntry::constructor(bag, vec![Param::of(DataType::const_ref(list))]))
        .unwrap();
    let context = session.context();
    let init = Initialization::from_expression(&context, ty(bag), &five);
    assert_eq!(init.constructor(), Some(from_list));
}
