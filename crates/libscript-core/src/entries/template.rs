//! Function templates, class templates and their parameters.
//!
//! A template's signature is written with placeholder types: each
//! [`TemplateParameter`] owns a hash registered as a
//! [`TemplateParamEntry`], and a dependent template-id such as `List<T>` is
//! registered as a [`PatternEntry`]. Deduction matches these placeholders
//! structurally against concrete argument types.

use std::fmt;
use std::sync::Arc;

use crate::{
    DataType, FunctionEntry, FunctionImpl, Param, TemplateArgument, TemplateDefault, TemplateParamKind,
    TemplateParameter, TypeHash,
};

use super::{BodyId, ClassEntry, qualify};

// ============================================================================
// Placeholders
// ============================================================================

/// Placeholder type standing for a template parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParamEntry {
    pub type_hash: TypeHash,
    pub name: String,
    /// Template declaring the parameter.
    pub owner: TypeHash,
    pub index: usize,
    pub kind: TemplateParamKind,
}

/// A dependent template-id (`List<T>`) used in parameter patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternEntry {
    pub type_hash: TypeHash,
    pub template: TypeHash,
    pub arguments: Vec<TemplateArgument>,
}

impl PatternEntry {
    pub fn new(template: TypeHash, arguments: Vec<TemplateArgument>) -> Self {
        Self {
            type_hash: TypeHash::from_template_instance(template, &arguments),
            template,
            arguments,
        }
    }
}

// ============================================================================
// Native callbacks
// ============================================================================

/// Host hooks for a natively implemented function template.
pub trait NativeFunctionTemplate: Send + Sync {
    /// Adjust the substituted signature before it is registered.
    fn substitute(&self, _arguments: &[TemplateArgument], _function: &mut FunctionEntry) -> Result<(), String> {
        Ok(())
    }

    /// Produce the body of the instance.
    fn instantiate(&self, arguments: &[TemplateArgument], function: &FunctionEntry) -> Result<FunctionImpl, String>;
}

/// A class template instance under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInstance {
    pub class: ClassEntry,
    /// Members to register alongside the class. Owners are already set.
    pub functions: Vec<FunctionEntry>,
}

/// Host hook filling in the members of a class template instance.
pub trait NativeClassTemplate: Send + Sync {
    fn instantiate(&self, arguments: &[TemplateArgument], instance: &mut ClassInstance) -> Result<(), String>;
}

/// How instances of a function template get their bodies.
#[derive(Clone)]
pub enum FunctionTemplateBackend {
    Native(Arc<dyn NativeFunctionTemplate>),
    /// Script body compiled by the host for each instance.
    Script(BodyId),
}

impl fmt::Debug for FunctionTemplateBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionTemplateBackend::Native(_) => f.write_str("Native(..)"),
            FunctionTemplateBackend::Script(body) => f.debug_tuple("Script").field(body).finish(),
        }
    }
}

// ============================================================================
// Function templates
// ============================================================================

/// Registry entry for a function template.
#[derive(Debug, Clone)]
pub struct FunctionTemplateEntry {
    pub name: String,
    pub namespace: String,
    pub qualified_name: String,
    pub type_hash: TypeHash,
    /// Owning class for member templates.
    pub owner: Option<TypeHash>,
    pub params: Vec<TemplateParameter>,
    /// Parameter patterns, written with placeholder types.
    pub signature: Vec<Param>,
    pub return_type: DataType,
    pub backend: FunctionTemplateBackend,
}

impl FunctionTemplateEntry {
    /// New template. `overload` distinguishes templates sharing a name;
    /// placeholders depend on it, so it is fixed at construction.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        overload: u32,
        backend: FunctionTemplateBackend,
    ) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let qualified_name = qualify(&namespace, &name);
        let type_hash = TypeHash::from_function(&format!("template {qualified_name}"), &[TypeHash(u64::from(overload) + 1)]);
        Self {
            name,
            namespace,
            qualified_name,
            type_hash,
            owner: None,
            params: Vec::new(),
            signature: Vec::new(),
            return_type: DataType::void(),
            backend,
        }
    }

    // === Builder Methods ===

    pub fn with_param(mut self, name: impl Into<String>, kind: TemplateParamKind) -> Self {
        let index = self.params.len();
        self.params.push(TemplateParameter::new(self.type_hash, index, name, kind));
        self
    }

    pub fn with_defaulted_param(
        mut self,
        name: impl Into<String>,
        kind: TemplateParamKind,
        default: TemplateDefault,
    ) -> Self {
        let index = self.params.len();
        self.params
            .push(TemplateParameter::new(self.type_hash, index, name, kind).with_default(default));
        self
    }

    pub fn with_signature(mut self, params: Vec<Param>, return_type: DataType) -> Self {
        self.signature = params;
        self.return_type = return_type;
        self
    }

    pub fn with_owner(mut self, owner: TypeHash) -> Self {
        self.owner = Some(owner);
        self
    }

    // === Queries ===

    /// Placeholder for parameter `index`, for writing signatures.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Intended for registration code.
    pub fn placeholder(&self, index: usize) -> DataType {
        self.params[index].placeholder()
    }

    /// Index of the parameter whose placeholder is `hash`.
    pub fn param_index(&self, hash: TypeHash) -> Option<usize> {
        self.params.iter().position(|p| p.type_hash == hash)
    }

    /// Placeholder entries to register with the template.
    pub fn placeholder_entries(&self) -> Vec<TemplateParamEntry> {
        placeholder_entries(self.type_hash, &self.params)
    }
}

// ============================================================================
// Class templates
// ============================================================================

/// Registry entry for a class template.
#[derive(Clone)]
pub struct ClassTemplateEntry {
    pub name: String,
    pub namespace: String,
    pub qualified_name: String,
    pub type_hash: TypeHash,
    pub params: Vec<TemplateParameter>,
    pub backend: Arc<dyn NativeClassTemplate>,
}

impl ClassTemplateEntry {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, backend: Arc<dyn NativeClassTemplate>) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let qualified_name = qualify(&namespace, &name);
        Self {
            type_hash: TypeHash::from_name(&qualified_name),
            name,
            namespace,
            qualified_name,
            params: Vec::new(),
            backend,
        }
    }

    /// Template with a fixed identity, for engine built-ins.
    pub fn with_identity(mut self, type_hash: TypeHash) -> Self {
        self.type_hash = type_hash;
        self.params = self
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| TemplateParameter {
                type_hash: TypeHash::from_template_param(type_hash, i),
                ..p.clone()
            })
            .collect();
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, kind: TemplateParamKind) -> Self {
        let index = self.params.len();
        self.params.push(TemplateParameter::new(self.type_hash, index, name, kind));
        self
    }

    pub fn placeholder(&self, index: usize) -> DataType {
        self.params[index].placeholder()
    }

    pub fn placeholder_entries(&self) -> Vec<TemplateParamEntry> {
        placeholder_entries(self.type_hash, &self.params)
    }

    /// Name of the instance for `args`, e.g. `List<int>`.
    pub fn instance_name(&self, args: &[TemplateArgument]) -> String {
        let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
        format!("{}<{}>", self.name, rendered.join(", "))
    }
}

impl fmt::Debug for ClassTemplateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassTemplateEntry")
            .field("qualified_name", &self.qualified_name)
            .field("type_hash", &self.type_hash)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn placeholder_entries(owner: TypeHash, params: &[TemplateParameter]) -> Vec<TemplateParamEntry> {
    params
        .iter()
        .enumerate()
        .map(|(index, p)| TemplateParamEntry {
            type_hash: p.type_hash,
            name: p.name.clone(),
            owner,
            index,
            kind: p.kind,
        })
        .collect()
}
