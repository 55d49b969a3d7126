//! Overload resolution for function calls.
//!
//! [`OverloadResolution`] selects the best function from a candidate set for
//! a list of arguments.
//!
//! ## Algorithm
//!
//! 1. Bind the implicit object argument (member candidates only)
//! 2. Check the argument count against required and defaulted parameters
//! 3. Initialize every parameter from its argument
//! 4. Compare viable candidates pairwise, argument by argument
//! 5. A candidate wins if it is at least as good everywhere and strictly
//!    better somewhere than every other viable candidate. Several candidates
//!    that nobody beats make the call ambiguous.
//!
//! Every candidate gets a [`CandidateReport`] in input order so callers can
//! explain a failed call.

mod ranking;

use libscript_core::{DataType, Expression, FunctionDef, FunctionEntry, Qualifiers, SemanticError, TypeHash};

use crate::context::CompilationContext;
use crate::conversion::{ConversionRank, StandardConversion};
use crate::initialization::{InitFailure, InitStyle, Initialization};
use ranking::Candidate;

// ============================================================================
// Inputs
// ============================================================================

/// Call arguments, either bare types or compiled expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Types(Vec<DataType>),
    Expressions(Vec<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Types,
    Expressions,
}

impl Arguments {
    pub fn len(&self) -> usize {
        match self {
            Arguments::Types(types) => types.len(),
            Arguments::Expressions(exprs) => exprs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ArgumentKind {
        match self {
            Arguments::Types(_) => ArgumentKind::Types,
            Arguments::Expressions(_) => ArgumentKind::Expressions,
        }
    }

    pub fn type_at(&self, index: usize) -> Option<DataType> {
        match self {
            Arguments::Types(types) => types.get(index).copied(),
            Arguments::Expressions(exprs) => exprs.get(index).map(Expression::data_type),
        }
    }

    pub fn types(&self) -> Vec<DataType> {
        (0..self.len()).filter_map(|i| self.type_at(i)).collect()
    }

    fn initialize(&self, ctx: &CompilationContext<'_>, index: usize, param: DataType) -> Initialization {
        match self {
            Arguments::Types(types) => Initialization::from_type(ctx, param, types[index], InitStyle::Copy),
            Arguments::Expressions(exprs) => Initialization::from_expression(ctx, param, &exprs[index]),
        }
    }
}

/// The object a member call is made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImplicitObject {
    /// Free call; member candidates are matched on their explicit parameters.
    #[default]
    None,
    /// `object.f(args)`.
    Provided(DataType),
    /// Operator call: the first argument is the object for member candidates
    /// and an ordinary argument for free ones.
    FirstArgument,
}

// ============================================================================
// Outputs
// ============================================================================

/// A successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct OverloadMatch {
    pub function: TypeHash,
    /// Binding of the implicit object, for member calls.
    pub object: Option<StandardConversion>,
    /// One per explicit argument; defaulted parameters have none.
    pub initializations: Vec<Initialization>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionFailure {
    NoViableCandidate,
    Ambiguous { tied: Vec<TypeHash> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionState {
    Initial,
    Processing,
    Succeeded(OverloadMatch),
    Failed(ResolutionFailure),
}

/// Verdict for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Viability {
    Viable { ranks: Vec<ConversionRank> },
    IncorrectParameterCount { min: usize, max: usize, provided: usize },
    CouldNotConvertArgument { index: usize, failure: InitFailure },
    CouldNotConvertObject { from: DataType, to: DataType },
    UnknownFunction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateReport {
    pub function: TypeHash,
    pub viability: Viability,
}

impl CandidateReport {
    pub fn is_viable(&self) -> bool {
        matches!(self.viability, Viability::Viable { .. })
    }
}

// ============================================================================
// OverloadResolution
// ============================================================================

#[derive(Debug, Clone)]
pub struct OverloadResolution {
    state: ResolutionState,
    object: ImplicitObject,
    candidates: Vec<TypeHash>,
    arguments: Option<Arguments>,
    reports: Vec<CandidateReport>,
}

impl Default for OverloadResolution {
    fn default() -> Self {
        Self::new()
    }
}

impl OverloadResolution {
    pub fn new() -> Self {
        Self {
            state: ResolutionState::Initial,
            object: ImplicitObject::None,
            candidates: Vec::new(),
            arguments: None,
            reports: Vec::new(),
        }
    }

    pub fn with_implicit_object(mut self, object: ImplicitObject) -> Self {
        self.object = object;
        self
    }

    /// Resolve in one step.
    pub fn resolve(ctx: &CompilationContext<'_>, candidates: &[TypeHash], arguments: Arguments) -> Self {
        let mut resolution = Self::new();
        resolution.process(ctx, candidates, arguments);
        resolution
    }

    /// Run resolution. Returns whether a unique best candidate was found.
    ///
    /// Calling this again starts over with the new inputs.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(candidates = candidates.len(), arguments = arguments.len())
    )]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn process(&mut self, ctx: &CompilationContext<'_>, candidates: &[TypeHash], arguments: Arguments) -> bool {
        self.state = ResolutionState::Processing;
        self.candidates = candidates.to_vec();
        self.reports = Vec::with_capacity(candidates.len());

        let mut viable = Vec::new();
        for &hash in candidates {
            let viability = match ctx.get_function(hash) {
                Some(function) => match self.evaluate(ctx, function, &arguments) {
                    Ok(candidate) => {
                        let ranks = candidate.ranks();
                        viable.push(candidate);
                        Viability::Viable { ranks }
                    }
                    Err(viability) => viability,
                },
                None => Viability::UnknownFunction,
            };
            tracing::trace!(function = %hash, ?viability, "candidate evaluated");
            self.reports.push(CandidateReport { function: hash, viability });
        }

        self.state = match ranking::select_best(&viable, self.object) {
            ranking::Selection::Winner(index) => {
                let winner = viable.swap_remove(index);
                tracing::debug!(selected = %winner.function, "overload resolved");
                ResolutionState::Succeeded(winner.into_match())
            }
            ranking::Selection::Tied(indices) => {
                // Tied candidates keep their input order.
                let mut tied: Vec<TypeHash> = indices.into_iter().map(|i| viable[i].function).collect();
                tied.sort_by_key(|h| candidates.iter().position(|c| c == h));
                tracing::debug!(tied = tied.len(), "ambiguous call");
                ResolutionState::Failed(ResolutionFailure::Ambiguous { tied })
            }
            ranking::Selection::Empty => {
                tracing::debug!("no viable candidate");
                ResolutionState::Failed(ResolutionFailure::NoViableCandidate)
            }
        };
        self.arguments = Some(arguments);
        self.succeeded()
    }

    fn evaluate(
        &self,
        ctx: &CompilationContext<'_>,
        function: &FunctionEntry,
        arguments: &Arguments,
    ) -> Result<Candidate, Viability> {
        let def = &function.def;
        let member = def.has_implicit_object();

        let (object, offset) = match self.object {
            ImplicitObject::Provided(ty) if member => (Some(ty), 0),
            ImplicitObject::FirstArgument if member => match arguments.type_at(0) {
                Some(ty) => (Some(ty), 1),
                None => {
                    return Err(Viability::IncorrectParameterCount {
                        min: def.min_args() + 1,
                        max: def.max_args() + 1,
                        provided: 0,
                    });
                }
            },
            _ => (None, 0),
        };

        let provided = arguments.len() - offset;
        if provided < def.min_args() || provided > def.max_args() {
            return Err(Viability::IncorrectParameterCount {
                min: def.min_args() + offset,
                max: def.max_args() + offset,
                provided: arguments.len(),
            });
        }

        let object = match object {
            Some(from) => {
                let to = object_parameter(def);
                let binding = StandardConversion::compute(ctx, from, to);
                if !binding.is_reference_binding() {
                    return Err(Viability::CouldNotConvertObject { from, to });
                }
                Some(binding)
            }
            None => None,
        };

        let mut initializations = Vec::with_capacity(provided);
        for (i, param) in def.params.iter().take(provided).enumerate() {
            let index = i + offset;
            let init = arguments.initialize(ctx, index, param.data_type);
            if let Some(failure) = init.failure() {
                return Err(Viability::CouldNotConvertArgument {
                    index,
                    failure: failure.clone(),
                });
            }
            initializations.push(init);
        }

        Ok(Candidate {
            function: function.func_hash(),
            object,
            leading_object: offset == 1,
            initializations,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.state, ResolutionState::Succeeded(_))
    }

    pub fn failed(&self) -> bool {
        matches!(self.state, ResolutionState::Failed(_))
    }

    pub fn best_match(&self) -> Option<&OverloadMatch> {
        match &self.state {
            ResolutionState::Succeeded(m) => Some(m),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<TypeHash> {
        self.best_match().map(|m| m.function)
    }

    pub fn failure(&self) -> Option<&ResolutionFailure> {
        match &self.state {
            ResolutionState::Failed(f) => Some(f),
            _ => None,
        }
    }

    /// Candidates tied for best in an ambiguous call.
    pub fn tied(&self) -> &[TypeHash] {
        match &self.state {
            ResolutionState::Failed(ResolutionFailure::Ambiguous { tied }) => tied,
            _ => &[],
        }
    }

    pub fn candidates(&self) -> &[TypeHash] {
        &self.candidates
    }

    pub fn reports(&self) -> &[CandidateReport] {
        &self.reports
    }

    pub fn arguments(&self) -> Option<&Arguments> {
        self.arguments.as_ref()
    }

    pub fn argument_kind(&self) -> Option<ArgumentKind> {
        self.arguments.as_ref().map(Arguments::kind)
    }

    /// The match, or the error describing why there is none.
    pub fn into_result(self) -> Result<OverloadMatch, SemanticError> {
        let arguments = self.arguments.as_ref().map(Arguments::types).unwrap_or_default();
        match self.state {
            ResolutionState::Succeeded(m) => Ok(m),
            ResolutionState::Failed(ResolutionFailure::Ambiguous { tied }) => Err(SemanticError::AmbiguousOverload {
                candidates: tied,
                arguments,
            }),
            ResolutionState::Failed(ResolutionFailure::NoViableCandidate)
            | ResolutionState::Initial
            | ResolutionState::Processing => Err(SemanticError::NoViableCandidate {
                candidates: self.candidates,
                arguments,
            }),
        }
    }
}

/// Reference to the owning class, const for const methods.
fn object_parameter(def: &FunctionDef) -> DataType {
    let mut qualifiers = Qualifiers::REFERENCE;
    if def.is_const() {
        qualifiers |= Qualifiers::CONST;
    }
    DataType::with_qualifiers(def.owner.unwrap_or_default(), qualifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use libscript_core::{ClassEntry, Param, primitives};
    use libscript_registry::SymbolRegistry;
    use pretty_assertions::assert_eq;

    fn ty(hash: TypeHash) -> DataType {
        DataType::simple(hash)
    }

    fn global(registry: &mut SymbolRegistry, params: &[DataType], ret: DataType) -> TypeHash {
        let params = params.iter().copied().map(Param::of).collect();
        registry.register_function(FunctionEntry::global("", "foo", params, ret)).unwrap()
    }

    #[test]
    fn exact_match_over_arity_mismatch() {
        let mut registry = SymbolRegistry::with_builtins();
        let none = global(&mut registry, &[], DataType::void());
        let one = global(&mut registry, &[ty(primitives::INT)], DataType::void());
        let ctx = CompilationContext::new(&registry);

        let resolution = OverloadResolution::resolve(&ctx, &[none, one], Arguments::Types(vec![ty(primitives::INT)]));
        assert_eq!(resolution.selected(), Some(one));
        assert_eq!(
            resolution.reports()[0].viability,
            Viability::IncorrectParameterCount {
                min: 0,
                max: 0,
                provided: 1
            }
        );
        assert_eq!(resolution.argument_kind(), Some(ArgumentKind::Types));
    }

    #[test]
    fn promotion_beats_conversion() {
        let mut registry = SymbolRegistry::with_builtins();
        let to_double = global(&mut registry, &[ty(primitives::DOUBLE)], DataType::void());
        let to_char = global(&mut registry, &[ty(primitives::CHAR)], DataType::void());
        let ctx = CompilationContext::new(&registry);

        let resolution =
            OverloadResolution::resolve(&ctx, &[to_char, to_double], Arguments::Types(vec![ty(primitives::INT)]));
        assert_eq!(resolution.selected(), Some(to_double));
    }

    #[test]
    fn defaulted_parameters_allow_fewer_arguments() {
        let mut registry = SymbolRegistry::with_builtins();
        let f = registry
            .register_function(FunctionEntry::global(
                "",
                "draw",
                vec![Param::of(ty(primitives::INT)), Param::of(ty(primitives::BOOL)).with_default()],
                DataType::void(),
            ))
            .unwrap();
        let ctx = CompilationContext::new(&registry);

        let resolution = OverloadResolution::resolve(&ctx, &[f], Arguments::Types(vec![ty(primitives::INT)]));
        let m = resolution.best_match().unwrap();
        assert_eq!(m.initializations.len(), 1);
    }

    #[test]
    fn crossing_preferences_are_ambiguous() {
        let mut registry = SymbolRegistry::with_builtins();
        let a = global(&mut registry, &[ty(primitives::INT), ty(primitives::DOUBLE)], DataType::void());
        let b = global(&mut registry, &[ty(primitives::DOUBLE), ty(primitives::INT)], DataType::void());
        let ctx = CompilationContext::new(&registry);

        let resolution = OverloadResolution::resolve(
            &ctx,
            &[a, b],
            Arguments::Types(vec![ty(primitives::INT), ty(primitives::INT)]),
        );
        assert_eq!(resolution.tied(), &[a, b]);
        let err = resolution.into_result().unwrap_err();
        assert!(matches!(err, SemanticError::AmbiguousOverload { ref candidates, .. } if candidates.len() == 2));
    }

    #[test]
    fn member_call_binds_object_by_reference() {
        let mut registry = SymbolRegistry::with_builtins();
        let counter = registry.register_type(ClassEntry::new("", "Counter")).unwrap();
        let get = registry
            .register_function(FunctionEntry::method(counter, "value", vec![], ty(primitives::INT)).as_const())
            .unwrap();
        let bump = registry
            .register_function(FunctionEntry::method(counter, "bump", vec![], DataType::void()))
            .unwrap();
        let ctx = CompilationContext::new(&registry);

        let on_const = ImplicitObject::Provided(DataType::constant(counter));
        let mut resolution = OverloadResolution::new().with_implicit_object(on_const);
        assert!(resolution.process(&ctx, &[get], Arguments::Types(vec![])));

        let mut resolution = OverloadResolution::new().with_implicit_object(on_const);
        assert!(!resolution.process(&ctx, &[bump], Arguments::Types(vec![])));
        assert!(matches!(
            resolution.reports()[0].viability,
            Viability::CouldNotConvertObject { .. }
        ));
    }

    #[test]
    fn non_const_method_preferred_for_mutable_object() {
        let mut registry = SymbolRegistry::with_builtins();
        let buffer = registry.register_type(ClassEntry::new("", "Buffer")).unwrap();
        let read = registry
            .register_function(FunctionEntry::method(buffer, "at", vec![], ty(primitives::INT)).as_const())
            .unwrap();
        let write = registry
            .register_function(FunctionEntry::method(buffer, "at", vec![], DataType::reference(primitives::INT)))
            .unwrap();
        let ctx = CompilationContext::new(&registry);

        let mut resolution =
            OverloadResolution::new().with_implicit_object(ImplicitObject::Provided(DataType::simple(buffer)));
        resolution.process(&ctx, &[read, write], Arguments::Types(vec![]));
        assert_eq!(resolution.selected(), Some(write));
    }

    #[test]
    fn first_argument_mode_mixes_members_and_free_functions() {
        let mut registry = SymbolRegistry::with_builtins();
        let vec2 = registry.register_type(ClassEntry::new("", "Vec2")).unwrap();
        let member = registry
            .register_function(
                FunctionEntry::member_operator(
                    vec2,
                    libscript_core::OperatorKind::Add,
                    vec![Param::of(DataType::const_ref(vec2))],
                    ty(vec2),
                )
                .as_const(),
            )
            .unwrap();
        let free = registry
            .register_function(FunctionEntry::operator(
                "",
                libscript_core::OperatorKind::Add,
                vec![Param::of(DataType::const_ref(vec2)), Param::of(ty(primitives::FLOAT))],
                ty(vec2),
            ))
            .unwrap();
        let ctx = CompilationContext::new(&registry);

        let mut resolution = OverloadResolution::new().with_implicit_object(ImplicitObject::FirstArgument);
        resolution.process(&ctx, &[member, free], Arguments::Types(vec![ty(vec2), ty(primitives::FLOAT)]));
        assert_eq!(resolution.selected(), Some(free));

        let mut resolution = OverloadResolution::new().with_implicit_object(ImplicitObject::FirstArgument);
        resolution.process(&ctx, &[member, free], Arguments::Types(vec![ty(vec2), ty(vec2)]));
        assert_eq!(resolution.selected(), Some(member));
    }

    #[test]
    fn unknown_candidates_are_reported() {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let ghost = TypeHash::from_name("ghost");
        let resolution = OverloadResolution::resolve(&ctx, &[ghost], Arguments::Types(vec![]));
        assert_eq!(resolution.failure(), Some(&ResolutionFailure::NoViableCandidate));
        assert_eq!(resolution.reports()[0].viability, Viability::UnknownFunction);
    }

    #[test]
    fn empty_candidate_set_fails() {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let resolution = OverloadResolution::resolve(&ctx, &[], Arguments::Expressions(vec![]));
        assert!(resolution.failed());
        assert!(matches!(
            resolution.into_result(),
            Err(SemanticError::NoViableCandidate { .. })
        ));
    }
}
