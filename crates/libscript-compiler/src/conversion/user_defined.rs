//! User-defined conversions: converting constructors and conversion operators.
//!
//! Every viable constructor of the destination class and every viable cast of
//! the source class (or one of its bases) becomes a candidate. A candidate
//! wins when it is at least as good as every other one on both standard steps
//! and strictly better on one of them; anything else is ambiguous.

use std::cmp::Ordering;

use libscript_core::{DataType, FunctionDef, Qualifiers, TypeHash};

use super::{Conversion, ConversionError, ConversionPolicy, StandardConversion};
use crate::context::CompilationContext;

/// Find the unique best user-defined conversion from `src` to `dest`.
///
/// `Ok(None)` when there is no candidate at all.
pub(super) fn find_user_conversion(
    ctx: &CompilationContext<'_>,
    src: DataType,
    dest: DataType,
    policy: ConversionPolicy,
) -> Result<Option<Conversion>, ConversionError> {
    let mut candidates = Vec::new();
    if ctx.is_class(dest) && !dest.is_mutable_ref() {
        constructor_candidates(ctx, src, dest, policy, &mut candidates);
    }
    if ctx.is_class(src) {
        cast_candidates(ctx, src, dest, policy, &mut candidates);
    }
    select_unique(candidates, src, dest)
}

fn usable(def: &FunctionDef, policy: ConversionPolicy) -> bool {
    !def.is_deleted() && (!def.is_explicit() || policy.allows_explicit())
}

fn constructor_candidates(
    ctx: &CompilationContext<'_>,
    src: DataType,
    dest: DataType,
    policy: ConversionPolicy,
    out: &mut Vec<Conversion>,
) {
    let produced = DataType::simple(dest.type_hash);
    let conv2 = if dest.is_reference() {
        StandardConversion::compute(ctx, produced, dest)
    } else {
        StandardConversion::none()
    };

    for ctor in ctx.registry().constructors(dest.type_hash) {
        let def = &ctor.def;
        if !usable(def, policy) || def.params.is_empty() || def.min_args() > 1 {
            continue;
        }
        let param = def.params[0].data_type;
        // The copy constructor is what a standard conversion already uses.
        if param.base() == produced {
            continue;
        }
        let conv1 = StandardConversion::compute(ctx, src, param);
        if conv1.is_convertible() {
            out.push(Conversion::user_defined(conv1, ctor.func_hash(), conv2, src, dest));
        }
    }
}

fn cast_candidates(
    ctx: &CompilationContext<'_>,
    src: DataType,
    dest: DataType,
    policy: ConversionPolicy,
    out: &mut Vec<Conversion>,
) {
    for class in ctx.registry().base_chain(src.type_hash) {
        for cast in ctx.registry().casts(class) {
            let def = &cast.def;
            if !usable(def, policy) {
                continue;
            }
            let result = def.return_type;
            if dest.is_mutable_ref() && !result.is_reference() {
                continue;
            }
            let mut object = Qualifiers::REFERENCE;
            if def.is_const() {
                object |= Qualifiers::CONST;
            }
            let conv1 = StandardConversion::compute(ctx, src, DataType::with_qualifiers(class, object));
            if !conv1.is_convertible() {
                continue;
            }
            let conv2 = StandardConversion::compute(ctx, result, dest);
            if conv2.is_convertible() {
                out.push(Conversion::user_defined(conv1, cast.func_hash(), conv2, src, dest));
            }
        }
    }
}

fn dominates(a: &Conversion, b: &Conversion) -> bool {
    let first = a.first().compare(&b.first());
    let second = a.second().compare(&b.second());
    first != Ordering::Greater
        && second != Ordering::Greater
        && (first == Ordering::Less || second == Ordering::Less)
}

fn select_unique(
    mut candidates: Vec<Conversion>,
    src: DataType,
    dest: DataType,
) -> Result<Option<Conversion>, ConversionError> {
    if candidates.len() <= 1 {
        return Ok(candidates.pop());
    }

    let best = (0..candidates.len()).find(|&i| {
        (0..candidates.len()).all(|j| i == j || dominates(&candidates[i], &candidates[j]))
    });
    match best {
        Some(i) => Ok(Some(candidates.swap_remove(i))),
        None => {
            let functions: Vec<TypeHash> = candidates.iter().filter_map(Conversion::function).collect();
            tracing::debug!(from = %src, to = %dest, candidates = functions.len(), "ambiguous user-defined conversion");
            Err(ConversionError::Ambiguous {
                from: src,
                to: dest,
                candidates: functions,
            })
        }
    }
}
