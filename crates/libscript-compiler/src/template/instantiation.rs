//! Argument completion and class template instantiation.
//!
//! An argument list is completed parameter by parameter: explicit arguments
//! first, then deductions, then defaults. Named defaults resolve against the
//! template's own earlier parameters, then fundamental keywords, then the
//! declaring namespace and its parents.
//!
//! Class instances are built by the template's native callback and rolled
//! back from the registry if any of their members fail to register.

use libscript_core::{
    ClassEntry, ClassInstance, FundamentalKind, TemplateArgument, TemplateDefault, TemplateParameter,
    TypeHash, qualify,
};
use libscript_registry::SymbolRegistry;

use super::{Deduction, TemplateError};
use crate::session::{InstanceKind, Session};

/// Complete the argument list of `template`.
pub fn complete_arguments(
    registry: &SymbolRegistry,
    template: TypeHash,
    namespace: &str,
    params: &[TemplateParameter],
    explicit: &[TemplateArgument],
    deductions: &[Deduction],
) -> Result<Vec<TemplateArgument>, TemplateError> {
    if explicit.len() > params.len() {
        return Err(TemplateError::TooManyArguments {
            template,
            expected: params.len(),
            provided: explicit.len(),
        });
    }

    let mut completed = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        let value = if let Some(arg) = explicit.get(index) {
            *arg
        } else if let Some(deduced) = deductions.iter().find(|d| d.index == index) {
            deduced.value
        } else if let Some(default) = &param.default {
            resolve_default(registry, template, namespace, params, &completed, index, default)?
        } else {
            return Err(TemplateError::MissingNonDefaultedParameter {
                template,
                index,
                name: param.name.clone(),
            });
        };

        if value.kind() != param.kind {
            return Err(TemplateError::InvalidArgument {
                template,
                index,
                reason: format!("'{value}' is not a valid {:?} argument for '{}'", param.kind, param.name),
            });
        }
        completed.push(value);
    }
    Ok(completed)
}

fn resolve_default(
    registry: &SymbolRegistry,
    template: TypeHash,
    namespace: &str,
    params: &[TemplateParameter],
    bound: &[TemplateArgument],
    index: usize,
    default: &TemplateDefault,
) -> Result<TemplateArgument, TemplateError> {
    let name = match default {
        TemplateDefault::Value(value) => return Ok(*value),
        TemplateDefault::Named(name) => name.as_str(),
    };

    if let Some(earlier) = params[..bound.len()].iter().position(|p| p.name == name) {
        return Ok(bound[earlier]);
    }
    if let Some(kind) = FundamentalKind::from_keyword(name) {
        return Ok(TemplateArgument::from(kind.hash()));
    }
    find_type(registry, namespace, name)
        .map(TemplateArgument::from)
        .ok_or_else(|| TemplateError::InvalidArgument {
            template,
            index,
            reason: format!("default '{name}' does not name a type"),
        })
}

/// Find a type by name as seen from `namespace`.
fn find_type(registry: &SymbolRegistry, namespace: &str, name: &str) -> Option<TypeHash> {
    let tree = registry.namespaces();
    if let Some((path, simple)) = name.rsplit_once("::") {
        let node = tree.get_path(path.trim_start_matches("::"))?;
        return tree.namespace(node)?.types.get(simple).copied();
    }
    let start = tree.get_path(namespace).unwrap_or_else(|| tree.root());
    tree.ancestors(start)
        .find_map(|node| tree.namespace(node).and_then(|data| data.types.get(name).copied()))
}

/// Instance of class template `template` for `explicit` arguments, built on
/// first use.
pub fn instantiate_class_template(
    session: &mut Session,
    template: TypeHash,
    explicit: &[TemplateArgument],
) -> Result<TypeHash, TemplateError> {
    let entry = session
        .registry()
        .get_class_template(template)
        .cloned()
        .ok_or(TemplateError::UnknownTemplate { template })?;
    let args = complete_arguments(session.registry(), template, &entry.namespace, &entry.params, explicit, &[])?;

    session.get_or_instantiate(InstanceKind::Class, template, &args, |session| {
        let hash = TypeHash::from_template_instance(template, &args);
        if session.registry().get(hash).is_some() {
            return Ok(hash);
        }

        let name = entry.instance_name(&args);
        let class = ClassEntry::with_identity(name.clone(), entry.namespace.clone(), qualify(&entry.namespace, &name), hash)
            .with_template_instance(template, args.clone());
        let mut instance = ClassInstance {
            class,
            functions: Vec::new(),
        };
        entry
            .backend
            .instantiate(&args, &mut instance)
            .map_err(|reason| TemplateError::InstantiationFailed { template, reason })?;

        let registry = session.registry_mut();
        let hash = registry
            .register_type(instance.class)
            .map_err(|source| TemplateError::Registration { template, source })?;
        for function in instance.functions {
            if let Err(source) = registry.register_function(function) {
                registry.remove_type(hash);
                return Err(TemplateError::Registration { template, source });
            }
        }
        Ok(hash)
    })
}
