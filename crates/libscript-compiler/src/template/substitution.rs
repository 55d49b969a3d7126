//! Placeholder substitution.
//!
//! A [`SubstitutionMap`] maps each placeholder hash to its concrete
//! argument. Substituting a type keeps the qualifiers written in the pattern
//! and adds them to the argument: with `T = int`, `const T&` becomes
//! `const int&`. Dependent template-ids instantiate their class template and
//! function types are re-interned with substituted components.

use libscript_core::{DataType, Param, TemplateArgument, TemplateParameter, TypeEntry, TypeHash};
use rustc_hash::FxHashMap;

use super::TemplateError;
use crate::session::Session;

/// Placeholder type hash to concrete argument.
pub type SubstitutionMap = FxHashMap<TypeHash, TemplateArgument>;

pub fn build_substitution_map(params: &[TemplateParameter], args: &[TemplateArgument]) -> SubstitutionMap {
    params.iter().zip(args).map(|(p, a)| (p.type_hash, *a)).collect()
}

/// Substitute every placeholder in `ty`.
pub fn substitute_type(session: &mut Session, ty: DataType, map: &SubstitutionMap) -> Result<DataType, TemplateError> {
    if let Some(arg) = map.get(&ty.type_hash) {
        return match arg {
            TemplateArgument::Type(concrete) => Ok(concrete.add(ty.qualifiers)),
            value => {
                let (template, index) = match session.registry().get(ty.type_hash).and_then(TypeEntry::as_template_param) {
                    Some(param) => (param.owner, param.index),
                    None => (ty.type_hash, 0),
                };
                Err(TemplateError::InvalidArgument {
                    template,
                    index,
                    reason: format!("value '{value}' used where a type is required"),
                })
            }
        };
    }

    match session.registry().get(ty.type_hash) {
        Some(TypeEntry::Pattern(pattern)) => {
            let template = pattern.template;
            let arguments = pattern.arguments.clone();
            let concrete = arguments
                .into_iter()
                .map(|arg| substitute_argument(session, arg, map))
                .collect::<Result<Vec<_>, _>>()?;
            let instance = session.instantiate_class(template, &concrete)?;
            Ok(DataType::with_qualifiers(instance, ty.qualifiers))
        }
        Some(TypeEntry::FunctionType(function)) => {
            let return_type = function.return_type;
            let params = function.params.clone();
            let return_type = substitute_type(session, return_type, map)?;
            let params = params
                .into_iter()
                .map(|p| substitute_type(session, p, map))
                .collect::<Result<Vec<_>, _>>()?;
            let hash = session.registry_mut().function_type(return_type, params);
            Ok(DataType::with_qualifiers(hash, ty.qualifiers))
        }
        _ => Ok(ty),
    }
}

/// Substitute inside a template argument. A placeholder standing for a
/// non-type parameter becomes that parameter's value.
pub fn substitute_argument(
    session: &mut Session,
    arg: TemplateArgument,
    map: &SubstitutionMap,
) -> Result<TemplateArgument, TemplateError> {
    match arg {
        TemplateArgument::Type(ty) => match map.get(&ty.type_hash) {
            Some(value @ (TemplateArgument::Bool(_) | TemplateArgument::Integer(_))) => Ok(*value),
            _ => substitute_type(session, ty, map).map(TemplateArgument::Type),
        },
        value => Ok(value),
    }
}

pub(crate) fn substitute_params(
    session: &mut Session,
    params: &[Param],
    map: &SubstitutionMap,
) -> Result<Vec<Param>, TemplateError> {
    params
        .iter()
        .map(|p| {
            Ok(Param {
                data_type: substitute_type(session, p.data_type, map)?,
                ..p.clone()
            })
        })
        .collect()
}
