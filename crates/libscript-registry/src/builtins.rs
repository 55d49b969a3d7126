//! Engine built-ins: fundamental types, operators on them, and the
//! `initializer_list<T>` class template.

use std::sync::Arc;

use libscript_core::{
    ClassInstance, ClassTemplateEntry, DataType, FunctionEntry, FundamentalKind, NativeClassTemplate,
    OperatorKind, Param, TemplateArgument, TemplateParamKind, TypeEntry, primitives,
};

use crate::SymbolRegistry;

/// The built-in list type. Instances carry their element type as the only
/// template argument and need no members.
#[derive(Debug, Default)]
pub struct InitializerListTemplate;

impl NativeClassTemplate for InitializerListTemplate {
    fn instantiate(&self, arguments: &[TemplateArgument], _instance: &mut ClassInstance) -> Result<(), String> {
        match arguments {
            [TemplateArgument::Type(ty)] if !ty.is_reference() => Ok(()),
            [TemplateArgument::Type(ty)] => Err(format!("list elements cannot be references ({ty})")),
            _ => Err("initializer_list takes exactly one type argument".to_string()),
        }
    }
}

pub(crate) fn install(registry: &mut SymbolRegistry) {
    for kind in FundamentalKind::ALL {
        // A fresh registry has no types, so these cannot collide.
        let _ = registry.register_type(TypeEntry::Fundamental(kind));
    }

    let list = ClassTemplateEntry::new("", "initializer_list", Arc::new(InitializerListTemplate))
        .with_param("T", TemplateParamKind::Type)
        .with_identity(primitives::INITIALIZER_LIST_TEMPLATE);
    let _ = registry.register_class_template(list);

    for entry in operator_table() {
        let _ = registry.register_function(entry);
    }
}

fn operator_table() -> Vec<FunctionEntry> {
    use OperatorKind::*;

    let arithmetic = [FundamentalKind::Int, FundamentalKind::Float, FundamentalKind::Double];
    let comparable = [
        FundamentalKind::Char,
        FundamentalKind::Int,
        FundamentalKind::Float,
        FundamentalKind::Double,
    ];
    let bool_ty = DataType::simple(primitives::BOOL);

    let mut table = Vec::new();
    for kind in arithmetic {
        let t = DataType::simple(kind.hash());
        for op in [Add, Sub, Mul, Div] {
            table.push(builtin(op, vec![t, t], t));
        }
        table.push(builtin(Negate, vec![t], t));
    }
    let int = DataType::simple(primitives::INT);
    table.push(builtin(Rem, vec![int, int], int));

    for kind in comparable {
        let t = DataType::simple(kind.hash());
        for op in [Equal, NotEqual, Less, LessEqual, Greater, GreaterEqual] {
            table.push(builtin(op, vec![t, t], bool_ty));
        }
    }
    table.push(builtin(Equal, vec![bool_ty, bool_ty], bool_ty));
    table.push(builtin(NotEqual, vec![bool_ty, bool_ty], bool_ty));
    table.push(builtin(LogicalAnd, vec![bool_ty, bool_ty], bool_ty));
    table.push(builtin(LogicalOr, vec![bool_ty, bool_ty], bool_ty));
    table.push(builtin(LogicalNot, vec![bool_ty], bool_ty));

    for kind in FundamentalKind::ALL.into_iter().filter(|k| *k != FundamentalKind::Void) {
        let t = DataType::simple(kind.hash());
        let target = DataType::reference(kind.hash());
        table.push(builtin(Assign, vec![target, t], target));
    }
    table
}

fn builtin(op: OperatorKind, params: Vec<DataType>, return_type: DataType) -> FunctionEntry {
    FunctionEntry::operator("", op, params.into_iter().map(Param::of).collect(), return_type)
        .with_traits(libscript_core::FunctionTraits::BUILTIN)
}
