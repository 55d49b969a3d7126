//! Function entries.
//!
//! A [`FunctionEntry`] pairs a signature ([`FunctionDef`]) with the body that
//! implements it. The role a function plays (free function, constructor,
//! conversion operator, template instance...) is a [`FunctionKind`] chosen at
//! construction time.

use bitflags::bitflags;

use crate::{DataType, OperatorKind, TemplateArgument, TypeHash};

bitflags! {
    /// Boolean traits of a function.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionTraits: u8 {
        /// Member callable on a const object.
        const CONST = 0b0000_0001;
        /// Member without an implicit object.
        const STATIC = 0b0000_0010;
        /// Constructor or cast not usable for implicit conversions.
        const EXPLICIT = 0b0000_0100;
        /// Declared `= delete`.
        const DELETED = 0b0000_1000;
        const VIRTUAL = 0b0001_0000;
        /// Operator provided by the engine for fundamental types.
        const BUILTIN = 0b0010_0000;
    }
}

/// The role a function plays.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    Regular,
    Constructor,
    Destructor,
    /// Conversion operator to the function's return type.
    Cast,
    Operator(OperatorKind),
    /// Instantiation of a function template.
    TemplateInstance {
        template: TypeHash,
        arguments: Vec<TemplateArgument>,
    },
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub data_type: DataType,
    pub has_default: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            has_default: false,
        }
    }

    /// Unnamed parameter.
    pub fn of(data_type: DataType) -> Self {
        Self::new("", data_type)
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// Function signature and traits.
///
/// Parameter lists never include the implicit object of member functions.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub func_hash: TypeHash,
    pub name: String,
    /// Namespace path the function was declared in (`""` for the root).
    pub namespace: String,
    pub kind: FunctionKind,
    pub params: Vec<Param>,
    pub return_type: DataType,
    /// Owning class for members and constructors.
    pub owner: Option<TypeHash>,
    pub traits: FunctionTraits,
}

impl FunctionDef {
    /// Number of arguments that must be supplied.
    ///
    /// Defaults only apply to a trailing run of parameters.
    pub fn min_args(&self) -> usize {
        self.params.iter().rposition(|p| !p.has_default).map_or(0, |i| i + 1)
    }

    pub fn max_args(&self) -> usize {
        self.params.len()
    }

    /// Whether calls pass an implicit object.
    pub fn has_implicit_object(&self) -> bool {
        self.owner.is_some()
            && !self.traits.contains(FunctionTraits::STATIC)
            && !matches!(self.kind, FunctionKind::Constructor)
    }

    pub fn is_const(&self) -> bool {
        self.traits.contains(FunctionTraits::CONST)
    }

    pub fn is_explicit(&self) -> bool {
        self.traits.contains(FunctionTraits::EXPLICIT)
    }

    pub fn is_deleted(&self) -> bool {
        self.traits.contains(FunctionTraits::DELETED)
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, FunctionKind::Constructor)
    }

    pub fn is_cast(&self) -> bool {
        matches!(self.kind, FunctionKind::Cast)
    }

    pub fn operator(&self) -> Option<OperatorKind> {
        match self.kind {
            FunctionKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn param_type(&self, index: usize) -> Option<DataType> {
        self.params.get(index).map(|p| p.data_type)
    }

    /// Whether two functions have identical parameter lists and object
    /// constness. Used to de-duplicate operator candidates.
    pub fn same_signature(&self, other: &FunctionDef) -> bool {
        self.is_const() == other.is_const()
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.data_type == b.data_type)
    }
}

/// Handle to a compiled script body, issued by the host compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub u32);

/// Handle to a native callable, issued by the host bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId(pub u32);

/// What executes when the function is called.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionImpl {
    Native(Option<NativeId>),
    Script(BodyId),
    /// Signature known, body not produced yet (a template instance being
    /// instantiated, or a forward declaration).
    Pending,
}

/// Registry entry for a function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    pub def: FunctionDef,
    pub implementation: FunctionImpl,
}

impl FunctionEntry {
    fn build(
        name: impl Into<String>,
        namespace: impl Into<String>,
        kind: FunctionKind,
        owner: Option<TypeHash>,
        params: Vec<Param>,
        return_type: DataType,
        traits: FunctionTraits,
    ) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let param_hashes: Vec<TypeHash> = params.iter().map(|p| param_identity(p.data_type)).collect();
        let func_hash = match (&kind, owner) {
            (FunctionKind::Constructor, Some(owner)) => TypeHash::from_constructor(owner, &param_hashes),
            (FunctionKind::Cast, Some(owner)) => {
                TypeHash::from_method(owner, &format!("$cast:{}", return_type.type_hash), &param_hashes, true)
            }
            (FunctionKind::TemplateInstance { template, arguments }, _) => {
                TypeHash::from_template_instance(*template, arguments)
            }
            (_, Some(owner)) => TypeHash::from_method(
                owner,
                &name,
                &param_hashes,
                traits.contains(FunctionTraits::CONST),
            ),
            (_, None) => TypeHash::from_function(&qualify(&namespace, &name), &param_hashes),
        };
        Self {
            def: FunctionDef {
                func_hash,
                name,
                namespace,
                kind,
                params,
                return_type,
                owner,
                traits,
            },
            implementation: FunctionImpl::Native(None),
        }
    }

    /// Free function in `namespace` (`""` for the root).
    pub fn global(
        namespace: impl Into<String>,
        name: impl Into<String>,
        params: Vec<Param>,
        return_type: DataType,
    ) -> Self {
        Self::build(name, namespace, FunctionKind::Regular, None, params, return_type, FunctionTraits::empty())
    }

    /// Free operator function.
    pub fn operator(
        namespace: impl Into<String>,
        op: OperatorKind,
        params: Vec<Param>,
        return_type: DataType,
    ) -> Self {
        Self::build(
            op.to_string(),
            namespace,
            FunctionKind::Operator(op),
            None,
            params,
            return_type,
            FunctionTraits::empty(),
        )
    }

    /// Non-static method of `owner`.
    pub fn method(owner: TypeHash, name: impl Into<String>, params: Vec<Param>, return_type: DataType) -> Self {
        Self::build(name, "", FunctionKind::Regular, Some(owner), params, return_type, FunctionTraits::empty())
    }

    /// Member operator of `owner`. The left operand is the implicit object.
    pub fn member_operator(owner: TypeHash, op: OperatorKind, params: Vec<Param>, return_type: DataType) -> Self {
        Self::build(
            op.to_string(),
            "",
            FunctionKind::Operator(op),
            Some(owner),
            params,
            return_type,
            FunctionTraits::empty(),
        )
    }

    pub fn constructor(owner: TypeHash, params: Vec<Param>) -> Self {
        Self::build(
            "$ctor",
            "",
            FunctionKind::Constructor,
            Some(owner),
            params,
            DataType::simple(owner),
            FunctionTraits::empty(),
        )
    }

    /// Conversion operator of `owner` producing `target`.
    pub fn cast(owner: TypeHash, target: DataType) -> Self {
        Self::build("$cast", "", FunctionKind::Cast, Some(owner), Vec::new(), target, FunctionTraits::CONST)
    }

    pub fn destructor(owner: TypeHash) -> Self {
        Self::build(
            "$dtor",
            "",
            FunctionKind::Destructor,
            Some(owner),
            Vec::new(),
            DataType::void(),
            FunctionTraits::empty(),
        )
    }

    /// Instance of a function template. The hash identifies the instance by
    /// template and arguments.
    pub fn template_instance(
        template: TypeHash,
        arguments: Vec<TemplateArgument>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        owner: Option<TypeHash>,
        params: Vec<Param>,
        return_type: DataType,
    ) -> Self {
        let mut entry = Self::build(
            name,
            namespace,
            FunctionKind::TemplateInstance { template, arguments },
            owner,
            params,
            return_type,
            FunctionTraits::empty(),
        );
        entry.implementation = FunctionImpl::Pending;
        entry
    }

    // === Builder Methods ===

    pub fn with_traits(mut self, traits: FunctionTraits) -> Self {
        let was_const = self.def.is_const();
        self.def.traits |= traits;
        if !was_const && self.def.is_const() {
            if let (Some(owner), FunctionKind::Regular | FunctionKind::Operator(_)) = (self.def.owner, &self.def.kind) {
                let params: Vec<TypeHash> = self.def.params.iter().map(|p| param_identity(p.data_type)).collect();
                self.def.func_hash = TypeHash::from_method(owner, &self.def.name, &params, true);
            }
        }
        self
    }

    pub fn as_const(self) -> Self {
        self.with_traits(FunctionTraits::CONST)
    }

    pub fn as_explicit(self) -> Self {
        self.with_traits(FunctionTraits::EXPLICIT)
    }

    pub fn as_static(self) -> Self {
        self.with_traits(FunctionTraits::STATIC)
    }

    pub fn as_deleted(self) -> Self {
        self.with_traits(FunctionTraits::DELETED)
    }

    pub fn with_implementation(mut self, implementation: FunctionImpl) -> Self {
        self.implementation = implementation;
        self
    }

    pub fn with_hash(mut self, func_hash: TypeHash) -> Self {
        self.def.func_hash = func_hash;
        self
    }

    pub fn func_hash(&self) -> TypeHash {
        self.def.func_hash
    }

    pub fn is_native(&self) -> bool {
        matches!(self.implementation, FunctionImpl::Native(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.implementation, FunctionImpl::Pending)
    }
}

fn param_identity(ty: DataType) -> TypeHash {
    TypeHash(crate::data_type_identity(&ty))
}

/// `ns::name`, or `name` in the root namespace.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}::{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn trailing_defaults_reduce_min_args() {
        let f = FunctionEntry::global(
            "",
            "clamp",
            vec![
                Param::of(DataType::simple(primitives::INT)),
                Param::of(DataType::simple(primitives::INT)).with_default(),
                Param::of(DataType::simple(primitives::INT)).with_default(),
            ],
            DataType::simple(primitives::INT),
        );
        assert_eq!(f.def.min_args(), 1);
        assert_eq!(f.def.max_args(), 3);
    }

    #[test]
    fn overloads_get_distinct_hashes() {
        let a = FunctionEntry::global("", "foo", vec![Param::of(primitives::INT.into())], DataType::void());
        let b = FunctionEntry::global("", "foo", vec![Param::of(primitives::CHAR.into())], DataType::void());
        assert_ne!(a.func_hash(), b.func_hash());
    }

    #[test]
    fn constructors_have_no_implicit_object() {
        let owner = TypeHash::from_name("Point");
        let ctor = FunctionEntry::constructor(owner, vec![]);
        let method = FunctionEntry::method(owner, "len", vec![], DataType::simple(primitives::FLOAT));
        assert!(!ctor.def.has_implicit_object());
        assert!(method.def.has_implicit_object());
        assert!(!method.clone().as_static().def.has_implicit_object());
    }

    #[test]
    fn const_changes_method_identity() {
        let owner = TypeHash::from_name("Point");
        let m = FunctionEntry::method(owner, "len", vec![], DataType::simple(primitives::FLOAT));
        let c = m.clone().as_const();
        assert!(c.def.is_const());
        assert_ne!(m.func_hash(), c.func_hash());
    }

    #[test]
    fn qualify_joins_namespace() {
        assert_eq!(qualify("", "f"), "f");
        assert_eq!(qualify("a::b", "f"), "a::b::f");
    }
}
