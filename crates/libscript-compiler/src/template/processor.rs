//! Function template pipeline.
//!
//! ```text
//! explicit args + call argument types
//!     -> deduce        (TemplateArgumentDeduction)
//!     -> complete      (explicit, deduced, defaults)
//!     -> instantiate   (cached per template and argument list)
//!          substitute signature -> register Pending entry -> produce body
//! ```
//!
//! A call site only needs signatures to rank candidates, so
//! [`FunctionTemplateProcessor::declare`] stops after substitution. The
//! body of a declared instance is compiled once it has won resolution.
//!
//! Native templates produce their body through their callback; script
//! templates go through the session's [`TemplateBodyCompiler`]. An instance
//! whose body fails is removed from the registry again.
//!
//! [`TemplateBodyCompiler`]: crate::TemplateBodyCompiler

use libscript_core::{DataType, FunctionEntry, FunctionTemplateBackend, FunctionTemplateEntry, TemplateArgument, TypeHash};

use super::substitution::{build_substitution_map, substitute_params, substitute_type};
use super::{Deduction, TemplateArgumentDeduction, TemplateError, complete_arguments};
use crate::session::{BodyRequest, InstanceKind, Session};

/// A function template instance offered to overload resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredInstance {
    /// Already registered: compiled, or compiling further up the stack.
    Existing(TypeHash),
    /// Signature registered for ranking only. The body is not compiled.
    Signature {
        function: TypeHash,
        arguments: Vec<TemplateArgument>,
    },
}

impl DeclaredInstance {
    pub fn function(&self) -> TypeHash {
        match self {
            DeclaredInstance::Existing(function) | DeclaredInstance::Signature { function, .. } => *function,
        }
    }
}

/// Deduces, completes and instantiates function templates.
pub struct FunctionTemplateProcessor<'s> {
    session: &'s mut Session,
}

impl<'s> FunctionTemplateProcessor<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    fn template(&self, template: TypeHash) -> Result<FunctionTemplateEntry, TemplateError> {
        self.session
            .registry()
            .get_function_template(template)
            .cloned()
            .ok_or(TemplateError::UnknownTemplate { template })
    }

    /// Deduce the arguments not given explicitly from call argument types.
    pub fn deduce(
        &self,
        template: TypeHash,
        explicit: &[TemplateArgument],
        arg_types: &[DataType],
    ) -> Result<Vec<Deduction>, TemplateError> {
        let entry = self.template(template)?;
        if explicit.len() > entry.params.len() {
            return Err(TemplateError::TooManyArguments {
                template,
                expected: entry.params.len(),
                provided: explicit.len(),
            });
        }
        let mut deduction = TemplateArgumentDeduction::new(self.session.registry(), template, explicit.len());
        deduction.deduce_all(&entry.signature, arg_types)?;
        deduction.agglomerate()
    }

    /// Full argument list from explicit arguments, deductions and defaults.
    pub fn complete(
        &self,
        template: TypeHash,
        explicit: &[TemplateArgument],
        deductions: &[Deduction],
    ) -> Result<Vec<TemplateArgument>, TemplateError> {
        let entry = self.template(template)?;
        complete_arguments(
            self.session.registry(),
            template,
            &entry.namespace,
            &entry.params,
            explicit,
            deductions,
        )
    }

    /// Concrete signature of `template<arguments>`, neither registered nor
    /// compiled. `arguments` must be complete.
    pub fn substitute(&mut self, template: TypeHash, arguments: &[TemplateArgument]) -> Result<FunctionEntry, TemplateError> {
        let entry = self.template(template)?;
        instance_signature(self.session, &entry, arguments)
    }

    /// Deduce and complete the arguments for a call, then make the instance
    /// signature visible to overload resolution without compiling its body.
    pub fn declare(
        &mut self,
        template: TypeHash,
        explicit: &[TemplateArgument],
        arg_types: &[DataType],
    ) -> Result<DeclaredInstance, TemplateError> {
        let deductions = self.deduce(template, explicit, arg_types)?;
        let arguments = self.complete(template, explicit, &deductions)?;
        if let Some(instance) = self.session.function_instances().get(template, &arguments) {
            return Ok(DeclaredInstance::Existing(instance));
        }

        let function = self.substitute(template, &arguments)?;
        let hash = function.func_hash();
        if self.session.registry().get_function(hash).is_some() {
            return Ok(DeclaredInstance::Existing(hash));
        }
        self.session
            .registry_mut()
            .register_function(function)
            .map_err(|source| TemplateError::Registration { template, source })?;
        tracing::trace!(%template, ?arguments, "declared template instance signature");
        Ok(DeclaredInstance::Signature {
            function: hash,
            arguments,
        })
    }

    /// Instance of `template` for `arguments`. Missing trailing arguments are
    /// filled from defaults.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn instantiate(&mut self, template: TypeHash, arguments: &[TemplateArgument]) -> Result<TypeHash, TemplateError> {
        let entry = self.template(template)?;
        let args = self.complete(template, arguments, &[])?;
        self.session
            .get_or_instantiate(InstanceKind::Function, template, &args, |session| {
                build_instance(session, &entry, &args)
            })
    }

    /// Deduce, complete and instantiate in one step, as a call does.
    pub fn deduce_and_instantiate(
        &mut self,
        template: TypeHash,
        explicit: &[TemplateArgument],
        arg_types: &[DataType],
    ) -> Result<TypeHash, TemplateError> {
        let deductions = self.deduce(template, explicit, arg_types)?;
        let args = self.complete(template, explicit, &deductions)?;
        tracing::trace!(%template, ?args, "deduced template arguments");
        self.instantiate(template, &args)
    }
}

fn instance_signature(
    session: &mut Session,
    template: &FunctionTemplateEntry,
    args: &[TemplateArgument],
) -> Result<FunctionEntry, TemplateError> {
    let template_hash = template.type_hash;
    let map = build_substitution_map(&template.params, args);
    let params = substitute_params(session, &template.signature, &map)?;
    let return_type = substitute_type(session, template.return_type, &map)?;

    let mut function = FunctionEntry::template_instance(
        template_hash,
        args.to_vec(),
        template.name.clone(),
        template.namespace.clone(),
        template.owner,
        params,
        return_type,
    );
    if let FunctionTemplateBackend::Native(native) = &template.backend {
        native
            .substitute(args, &mut function)
            .map_err(|reason| TemplateError::InstantiationFailed {
                template: template_hash,
                reason,
            })?;
    }
    Ok(function)
}

fn build_instance(
    session: &mut Session,
    template: &FunctionTemplateEntry,
    args: &[TemplateArgument],
) -> Result<TypeHash, TemplateError> {
    let template_hash = template.type_hash;
    let function = instance_signature(session, template, args)?;
    let hash = session
        .registry_mut()
        .register_function(function.clone())
        .map_err(|source| TemplateError::Registration {
            template: template_hash,
            source,
        })?;

    let body = match &template.backend {
        FunctionTemplateBackend::Native(native) => native
            .instantiate(args, &function)
            .map_err(|reason| TemplateError::InstantiationFailed {
                template: template_hash,
                reason,
            }),
        FunctionTemplateBackend::Script(body) => match session.body_compiler() {
            Some(compiler) => compiler.compile(
                session,
                &BodyRequest {
                    template: template_hash,
                    body: *body,
                    arguments: args,
                    function: &function,
                },
            ),
            None => Err(TemplateError::NoBodyCompiler { template: template_hash }),
        },
    };

    match body {
        Ok(implementation) => {
            session
                .registry_mut()
                .update_function(function.with_implementation(implementation))
                .map_err(|source| TemplateError::Registration {
                    template: template_hash,
                    source,
                })?;
            Ok(hash)
        }
        Err(err) => {
            session.registry_mut().remove_function(hash);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TemplateBodyCompiler;
    use libscript_core::{
        BodyId, FunctionImpl, NativeFunctionTemplate, Param, Qualifiers, TemplateDefault, TemplateParamKind,
        primitives,
    };
    use libscript_registry::SymbolRegistry;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    struct Native;

    impl NativeFunctionTemplate for Native {
        fn instantiate(&self, _: &[TemplateArgument], _: &FunctionEntry) -> Result<FunctionImpl, String> {
            Ok(FunctionImpl::Native(None))
        }
    }

    /// Counts compiled bodies.
    struct Counting(Rc<Cell<usize>>);

    impl TemplateBodyCompiler for Counting {
        fn compile(&self, _: &mut Session, request: &BodyRequest<'_>) -> Result<FunctionImpl, TemplateError> {
            self.0.set(self.0.get() + 1);
            Ok(FunctionImpl::Script(request.body))
        }
    }

    struct Failing;

    impl TemplateBodyCompiler for Failing {
        fn compile(&self, _: &mut Session, request: &BodyRequest<'_>) -> Result<FunctionImpl, TemplateError> {
            Err(TemplateError::InstantiationFailed {
                template: request.template,
                reason: "body does not type-check".to_string(),
            })
        }
    }

    fn identity(registry: &mut SymbolRegistry, backend: FunctionTemplateBackend) -> TypeHash {
        let entry = FunctionTemplateEntry::new("", "identity", 0, backend).with_param("T", TemplateParamKind::Type);
        let t = entry.placeholder(0);
        let entry = entry.with_signature(vec![Param::of(t.add(Qualifiers::CONST | Qualifiers::REFERENCE))], t);
        registry.register_function_template(entry).unwrap()
    }

    #[test]
    fn declaring_registers_a_signature_without_a_body() {
        let compiled = Rc::new(Cell::new(0));
        let mut registry = SymbolRegistry::with_builtins();
        let template = identity(&mut registry, FunctionTemplateBackend::Script(BodyId(4)));
        let mut session = Session::new(registry).with_body_compiler(Counting(compiled.clone()));
        let int = DataType::simple(primitives::INT);

        let declared = FunctionTemplateProcessor::new(&mut session)
            .declare(template, &[], &[int])
            .unwrap();
        let DeclaredInstance::Signature { function, arguments } = &declared else {
            panic!("expected a fresh signature, got {declared:?}");
        };
        assert_eq!(arguments, &vec![TemplateArgument::from(primitives::INT)]);
        let entry = session.registry().get_function(*function).unwrap();
        assert!(entry.is_pending());
        assert_eq!(entry.def.return_type, int);
        assert_eq!(compiled.get(), 0);
        assert!(session.function_instances().is_empty());

        session.registry_mut().remove_function(*function);
        let instance = session.instantiate_function(template, arguments).unwrap();
        assert_eq!(instance, declared.function());
        assert_eq!(compiled.get(), 1);

        let again = FunctionTemplateProcessor::new(&mut session)
            .declare(template, &[], &[int])
            .unwrap();
        assert_eq!(again, DeclaredInstance::Existing(instance));
    }

    #[test]
    fn deduced_instances_have_concrete_signatures() {
        let mut registry = SymbolRegistry::with_builtins();
        let template = identity(&mut registry, FunctionTemplateBackend::Native(Arc::new(Native)));
        let mut session = Session::new(registry);

        let instance = FunctionTemplateProcessor::new(&mut session)
            .deduce_and_instantiate(template, &[], &[DataType::simple(primitives::FLOAT)])
            .unwrap();

        let function = session.registry().get_function(instance).unwrap();
        assert_eq!(function.def.params[0].data_type, DataType::const_ref(primitives::FLOAT));
        assert_eq!(function.def.return_type, DataType::simple(primitives::FLOAT));
        assert!(!function.is_pending());
    }

    #[test]
    fn same_arguments_share_one_instance() {
        let compiled = Rc::new(Cell::new(0));
        let mut registry = SymbolRegistry::with_builtins();
        let template = identity(&mut registry, FunctionTemplateBackend::Script(BodyId(7)));
        let mut session = Session::new(registry).with_body_compiler(Counting(compiled.clone()));

        let a = session.instantiate_function(template, &[primitives::INT.into()]).unwrap();
        let b = FunctionTemplateProcessor::new(&mut session)
            .deduce_and_instantiate(template, &[], &[DataType::reference(primitives::INT)])
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(compiled.get(), 1);
        assert_eq!(
            session.registry().get_function(a).unwrap().implementation,
            FunctionImpl::Script(BodyId(7))
        );
    }

    #[test]
    fn failed_bodies_are_rolled_back() {
        let mut registry = SymbolRegistry::with_builtins();
        let template = identity(&mut registry, FunctionTemplateBackend::Script(BodyId(1)));
        let mut session = Session::new(registry).with_body_compiler(Failing);
        let functions = session.registry().function_count();

        let err = session.instantiate_function(template, &[primitives::INT.into()]).unwrap_err();
        assert!(matches!(err, TemplateError::InstantiationFailed { .. }));
        assert_eq!(session.registry().function_count(), functions);
        assert!(session.function_instances().is_empty());
    }

    #[test]
    fn script_templates_need_a_body_compiler() {
        let mut registry = SymbolRegistry::with_builtins();
        let template = identity(&mut registry, FunctionTemplateBackend::Script(BodyId(1)));
        let mut session = Session::new(registry);

        let err = session.instantiate_function(template, &[primitives::INT.into()]).unwrap_err();
        assert_eq!(err, TemplateError::NoBodyCompiler { template });
    }

    #[test]
    fn undeducible_parameters_fall_back_to_defaults() {
        let mut registry = SymbolRegistry::with_builtins();
        let entry = FunctionTemplateEntry::new("", "make", 0, FunctionTemplateBackend::Native(Arc::new(Native)))
            .with_param("T", TemplateParamKind::Type)
            .with_defaulted_param("R", TemplateParamKind::Type, TemplateDefault::Named("T".to_string()));
        let (t, r) = (entry.placeholder(0), entry.placeholder(1));
        let entry = entry.with_signature(vec![Param::of(t)], r);
        let template = registry.register_function_template(entry).unwrap();
        let mut session = Session::new(registry);
        let mut processor = FunctionTemplateProcessor::new(&mut session);

        let deductions = processor
            .deduce(template, &[], &[DataType::simple(primitives::CHAR)])
            .unwrap();
        let args = processor.complete(template, &[], &deductions).unwrap();
        assert_eq!(args, vec![primitives::CHAR.into(), primitives::CHAR.into()]);

        let instance = processor.instantiate(template, &args).unwrap();
        let function = session.registry().get_function(instance).unwrap();
        assert_eq!(function.def.return_type, DataType::simple(primitives::CHAR));
    }

    #[test]
    fn missing_parameters_without_defaults_fail() {
        let mut registry = SymbolRegistry::with_builtins();
        let entry = FunctionTemplateEntry::new("", "zero", 0, FunctionTemplateBackend::Native(Arc::new(Native)))
            .with_param("T", TemplateParamKind::Type);
        let t = entry.placeholder(0);
        let entry = entry.with_signature(Vec::new(), t);
        let template = registry.register_function_template(entry).unwrap();
        let mut session = Session::new(registry);

        let err = FunctionTemplateProcessor::new(&mut session)
            .deduce_and_instantiate(template, &[], &[])
            .unwrap_err();
        assert!(err.is_deduction_failure());
        assert!(matches!(err, TemplateError::MissingNonDefaultedParameter { index: 0, .. }));
    }
}
