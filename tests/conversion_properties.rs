//! Conversion ranks and overload order independence.
//!
//! The fundamental table is checked cell by cell; the ordering laws are
//! checked with proptest over random fundamental types and candidate orders.

use libscript::prelude::*;
use libscript_compiler::ResolutionFailure;
use libscript_core::FundamentalKind;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use libscript::ConversionRank::{Conversion as Conv, ExactMatch as Exact, NotConvertible as No, Promotion as Promo};

fn ty(kind: FundamentalKind) -> DataType {
    DataType::simple(kind.hash())
}

fn kind_strategy() -> impl Strategy<Value = FundamentalKind> {
    prop::sample::select(FundamentalKind::ALL.to_vec())
}

/// Rows are sources, columns destinations, both in `FundamentalKind::ALL` order.
const TABLE: [[ConversionRank; 6]; 6] = [
    [Exact, No, No, No, No, No],
    [No, Exact, Promo, Promo, Promo, Promo],
    [No, Conv, Exact, Promo, Promo, Promo],
    [No, Conv, Conv, Exact, Promo, Promo],
    [No, Conv, Conv, Conv, Exact, Promo],
    [No, Conv, Conv, Conv, Conv, Exact],
];

#[test]
fn fundamental_table() {
    let registry = SymbolRegistry::with_builtins();
    let ctx = CompilationContext::new(&registry);

    for (row, src) in FundamentalKind::ALL.into_iter().enumerate() {
        for (column, dest) in FundamentalKind::ALL.into_iter().enumerate() {
            let rank = StandardConversion::compute(&ctx, ty(src), ty(dest)).rank();
            assert_eq!(rank, TABLE[row][column], "{} -> {}", src.name(), dest.name());
        }
    }
}

#[test]
fn promotions_never_narrow() {
    let registry = SymbolRegistry::with_builtins();
    let ctx = CompilationContext::new(&registry);

    for src in FundamentalKind::ALL {
        for dest in FundamentalKind::ALL {
            let conv = StandardConversion::compute(&ctx, ty(src), ty(dest));
            match conv.rank() {
                Promo | Exact => assert!(!conv.is_narrowing()),
                Conv => assert!(conv.is_narrowing()),
                _ => {}
            }
        }
    }
}

#[test]
fn mutable_references_bind_only_identical_types() {
    let registry = SymbolRegistry::with_builtins();
    let ctx = CompilationContext::new(&registry);
    let int_ref = DataType::reference(primitives::INT);

    assert_eq!(
        StandardConversion::compute(&ctx, DataType::simple(primitives::INT), int_ref).rank(),
        Exact
    );
    assert_eq!(
        StandardConversion::compute(&ctx, DataType::simple(primitives::CHAR), int_ref).rank(),
        No
    );
    assert_eq!(
        StandardConversion::compute(&ctx, DataType::constant(primitives::INT), int_ref).rank(),
        No
    );

    let widened = StandardConversion::compute(&ctx, DataType::simple(primitives::CHAR), DataType::const_ref(primitives::INT));
    assert_eq!(widened.rank(), Promo);
    assert!(!widened.is_reference_binding());
}

fn overloads() -> (SymbolRegistry, Vec<TypeHash>) {
    let mut registry = SymbolRegistry::with_builtins();
    let candidates = FundamentalKind::ALL[1..]
        .iter()
        .map(|kind| {
            registry
                .register_function(FunctionEntry::global("", "f", vec![Param::of(ty(*kind))], DataType::void()))
                .unwrap()
        })
        .collect();
    (registry, candidates)
}

fn outcome(resolution: &OverloadResolution) -> (Option<TypeHash>, Vec<TypeHash>) {
    let mut tied = match resolution.failure() {
        Some(ResolutionFailure::Ambiguous { tied }) => tied.clone(),
        _ => Vec::new(),
    };
    tied.sort();
    (resolution.selected(), tied)
}

proptest! {
    #[test]
    fn identical_types_are_exact(kind in kind_strategy(), constant in any::<bool>()) {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let t = if constant { DataType::constant(kind.hash()) } else { ty(kind) };

        let conv = StandardConversion::compute(&ctx, t, t);
        prop_assert_eq!(conv.rank(), Exact);
        prop_assert_eq!(Conversion::compute(&ctx, t, t, ConversionPolicy::NoExplicitConversions).rank(), Exact);
    }

    #[test]
    fn global_rank_is_the_worst(pairs in prop::collection::vec((kind_strategy(), kind_strategy()), 1..8)) {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let conversions: Vec<Conversion> = pairs
            .iter()
            .map(|(s, d)| Conversion::compute(&ctx, ty(*s), ty(*d), ConversionPolicy::NoExplicitConversions))
            .collect();

        let worst = conversions.iter().map(Conversion::rank).max().unwrap();
        prop_assert_eq!(Conversion::global_rank(&conversions), worst);
    }

    #[test]
    fn not_convertible_absorbs(pairs in prop::collection::vec((kind_strategy(), kind_strategy()), 0..8)) {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let mut conversions: Vec<Conversion> = pairs
            .iter()
            .map(|(s, d)| Conversion::compute(&ctx, ty(*s), ty(*d), ConversionPolicy::NoExplicitConversions))
            .collect();
        conversions.push(Conversion::not_convertible(DataType::void(), ty(FundamentalKind::Int)));

        prop_assert_eq!(Conversion::global_rank(&conversions), No);
    }

    #[test]
    fn resolution_ignores_candidate_order(
        order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle(),
        args in prop::collection::vec(kind_strategy(), 1..2),
    ) {
        let (registry, candidates) = overloads();
        let ctx = CompilationContext::new(&registry);
        let arguments: Vec<DataType> = args.into_iter().map(ty).collect();
        let shuffled: Vec<TypeHash> = order.iter().map(|i| candidates[*i]).collect();

        let canonical = OverloadResolution::resolve(&ctx, &candidates, Arguments::Types(arguments.clone()));
        let permuted = OverloadResolution::resolve(&ctx, &shuffled, Arguments::Types(arguments));
        prop_assert_eq!(outcome(&canonical), outcome(&permuted));
    }
}
