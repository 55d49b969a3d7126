//! Compilation session.
//!
//! A [`Session`] owns the [`SymbolRegistry`] for one compilation together
//! with the template instance caches. Instantiating a template registers new
//! entries, so everything that may instantiate takes `&mut Session`; pure
//! analysis (conversions, overload ranking) works on the borrowed
//! [`CompilationContext`] view instead.

use std::fmt;
use std::rc::Rc;

use libscript_core::{BodyId, FunctionEntry, FunctionImpl, TemplateArgument, TypeHash};
use libscript_registry::SymbolRegistry;

use crate::context::CompilationContext;
use crate::template::{
    FunctionTemplateProcessor, TemplateError, TemplateInstanceCache, instantiate_class_template,
};

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Nested instantiations allowed before giving up.
    pub max_instantiation_depth: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_instantiation_depth: 64,
        }
    }
}

/// What a body compiler is asked to compile.
#[derive(Debug)]
pub struct BodyRequest<'a> {
    pub template: TypeHash,
    pub body: BodyId,
    pub arguments: &'a [TemplateArgument],
    /// The substituted, already registered instance.
    pub function: &'a FunctionEntry,
}

/// Host hook compiling script template bodies for concrete arguments.
///
/// Compiling a body may instantiate further templates through the session.
pub trait TemplateBodyCompiler {
    fn compile(&self, session: &mut Session, request: &BodyRequest<'_>) -> Result<FunctionImpl, TemplateError>;
}

/// Which cache an instantiation goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InstanceKind {
    Function,
    Class,
}

pub struct Session {
    registry: SymbolRegistry,
    function_instances: TemplateInstanceCache,
    class_instances: TemplateInstanceCache,
    body_compiler: Option<Rc<dyn TemplateBodyCompiler>>,
    options: SessionOptions,
    depth: usize,
}

impl Session {
    pub fn new(registry: SymbolRegistry) -> Self {
        Self {
            registry,
            function_instances: TemplateInstanceCache::new(),
            class_instances: TemplateInstanceCache::new(),
            body_compiler: None,
            options: SessionOptions::default(),
            depth: 0,
        }
    }

    // === Builder Methods ===

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_body_compiler(mut self, compiler: impl TemplateBodyCompiler + 'static) -> Self {
        self.body_compiler = Some(Rc::new(compiler));
        self
    }

    // === Accessors ===

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SymbolRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> SymbolRegistry {
        self.registry
    }

    /// Read-only view for conversion and overload analysis.
    pub fn context(&self) -> CompilationContext<'_> {
        CompilationContext::new(&self.registry)
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn function_instances(&self) -> &TemplateInstanceCache {
        &self.function_instances
    }

    pub fn class_instances(&self) -> &TemplateInstanceCache {
        &self.class_instances
    }

    /// Current instantiation nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn body_compiler(&self) -> Option<Rc<dyn TemplateBodyCompiler>> {
        self.body_compiler.clone()
    }

    // === Instantiation ===

    /// Instance of a class template. `arguments` may omit defaulted
    /// trailing parameters.
    pub fn instantiate_class(
        &mut self,
        template: TypeHash,
        arguments: &[TemplateArgument],
    ) -> Result<TypeHash, TemplateError> {
        instantiate_class_template(self, template, arguments)
    }

    /// Instance of a function template for explicit arguments.
    pub fn instantiate_function(
        &mut self,
        template: TypeHash,
        arguments: &[TemplateArgument],
    ) -> Result<TypeHash, TemplateError> {
        FunctionTemplateProcessor::new(self).instantiate(template, arguments)
    }

    /// Return the cached instance of `template<arguments>` or build it.
    ///
    /// `arguments` must be complete. While `build` runs the key counts as in
    /// progress; meeting it again is a recursive instantiation.
    pub(crate) fn get_or_instantiate(
        &mut self,
        kind: InstanceKind,
        template: TypeHash,
        arguments: &[TemplateArgument],
        build: impl FnOnce(&mut Session) -> Result<TypeHash, TemplateError>,
    ) -> Result<TypeHash, TemplateError> {
        let cache = self.cache(kind);
        if let Some(instance) = cache.get(template, arguments) {
            tracing::trace!(%template, %instance, "template instance cache hit");
            return Ok(instance);
        }
        if cache.is_in_progress(template, arguments) {
            return Err(TemplateError::RecursiveInstantiation {
                template,
                arguments: arguments.to_vec(),
            });
        }
        if self.depth >= self.options.max_instantiation_depth {
            return Err(TemplateError::DepthLimitExceeded {
                template,
                limit: self.options.max_instantiation_depth,
            });
        }

        self.cache_mut(kind).begin(template, arguments.to_vec());
        self.depth += 1;
        let result = build(self);
        self.depth -= 1;

        match &result {
            Ok(instance) => {
                tracing::debug!(%template, %instance, ?kind, "instantiated template");
                self.cache_mut(kind).finish(template, arguments.to_vec(), *instance);
            }
            Err(err) => {
                tracing::debug!(%template, error = %err, "template instantiation failed");
                self.cache_mut(kind).abandon(template, arguments);
            }
        }
        result
    }

    fn cache(&self, kind: InstanceKind) -> &TemplateInstanceCache {
        match kind {
            InstanceKind::Function => &self.function_instances,
            InstanceKind::Class => &self.class_instances,
        }
    }

    fn cache_mut(&mut self, kind: InstanceKind) -> &mut TemplateInstanceCache {
        match kind {
            InstanceKind::Function => &mut self.function_instances,
            InstanceKind::Class => &mut self.class_instances,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("types", &self.registry.type_count())
            .field("functions", &self.registry.function_count())
            .field("function_instances", &self.function_instances.len())
            .field("class_instances", &self.class_instances.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_instances_skip_the_builder() {
        let mut session = Session::new(SymbolRegistry::with_builtins());
        let template = TypeHash::from_name("Pair");
        let args = [TemplateArgument::Integer(1)];
        let instance = TypeHash::from_template_instance(template, &args);

        let first = session.get_or_instantiate(InstanceKind::Class, template, &args, |_| Ok(instance));
        assert_eq!(first, Ok(instance));

        let second = session.get_or_instantiate(InstanceKind::Class, template, &args, |_| {
            panic!("builder must not run for a cached instance")
        });
        assert_eq!(second, Ok(instance));
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn reentering_the_same_key_is_recursive() {
        let mut session = Session::new(SymbolRegistry::with_builtins());
        let template = TypeHash::from_name("Loop");
        let args = [TemplateArgument::Bool(true)];

        let result = session.get_or_instantiate(InstanceKind::Function, template, &args, |session| {
            session.get_or_instantiate(InstanceKind::Function, template, &args, |_| Ok(TypeHash(1)))
        });
        assert!(matches!(result, Err(TemplateError::RecursiveInstantiation { .. })));
        assert!(!session.function_instances().is_in_progress(template, &args));
    }

    #[test]
    fn depth_limit_stops_unbounded_nesting() {
        let mut session = Session::new(SymbolRegistry::with_builtins()).with_options(SessionOptions {
            max_instantiation_depth: 3,
        });
        let template = TypeHash::from_name("Nest");

        fn nest(session: &mut Session, template: TypeHash, n: i64) -> Result<TypeHash, TemplateError> {
            let args = [TemplateArgument::Integer(n)];
            session.get_or_instantiate(InstanceKind::Class, template, &args, |s| nest(s, template, n + 1))
        }

        let result = nest(&mut session, template, 0);
        assert_eq!(result, Err(TemplateError::DepthLimitExceeded { template, limit: 3 }));
        assert!(session.class_instances().is_empty());
    }
}
