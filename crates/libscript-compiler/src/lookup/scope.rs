//! The scope chain a name is looked up from.
//!
//! Levels are pushed outermost first: the root namespace, nested
//! namespaces, an enclosing class, function locals, lambdas. Lookup walks
//! them innermost first.

use libscript_core::{TemplateArgument, TypeHash};

use super::LocalScope;

/// One level of the scope chain.
#[derive(Debug, Clone)]
pub enum ScopeLevel {
    /// Namespace by full path (`""` for the root).
    Namespace(String),
    /// Inside a class body or method: members are visible unqualified.
    Class(TypeHash),
    /// Locals of a function body.
    Block(LocalScope),
    /// Inside a lambda; its captures are visible.
    Lambda(TypeHash),
    /// Template parameter names bound to concrete arguments, as seen while
    /// compiling an instance body.
    TemplateArguments(Vec<(String, TemplateArgument)>),
}

#[derive(Debug, Clone)]
pub struct Scope {
    levels: Vec<ScopeLevel>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::global()
    }
}

impl Scope {
    /// Just the root namespace.
    pub fn global() -> Self {
        Self {
            levels: vec![ScopeLevel::Namespace(String::new())],
        }
    }

    /// The root namespace and every namespace down to `path`.
    pub fn in_namespace(path: &str) -> Self {
        let mut scope = Self::global();
        let mut current = String::new();
        for segment in path.split("::").filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push_str("::");
            }
            current.push_str(segment);
            scope.enter(ScopeLevel::Namespace(current.clone()));
        }
        scope
    }

    pub fn with(mut self, level: ScopeLevel) -> Self {
        self.enter(level);
        self
    }

    pub fn enter(&mut self, level: ScopeLevel) {
        self.levels.push(level);
    }

    /// Open a nested block. Its slots continue after those of the enclosing
    /// blocks of the same function body.
    pub fn enter_block(&mut self) {
        let next_slot = self
            .levels()
            .take_while(|level| !matches!(level, ScopeLevel::Lambda(_)))
            .find_map(|level| match level {
                ScopeLevel::Block(locals) => Some(locals.next_slot()),
                _ => None,
            })
            .unwrap_or(0);
        self.enter(ScopeLevel::Block(LocalScope::starting_at(next_slot)));
    }

    pub fn leave(&mut self) -> Option<ScopeLevel> {
        self.levels.pop()
    }

    /// Levels from innermost to outermost.
    pub fn levels(&self) -> impl Iterator<Item = &ScopeLevel> {
        self.levels.iter().rev()
    }

    /// Namespace paths from innermost to outermost.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.levels().filter_map(|level| match level {
            ScopeLevel::Namespace(path) => Some(path.as_str()),
            _ => None,
        })
    }

    pub fn current_namespace(&self) -> &str {
        self.namespaces().next().unwrap_or("")
    }

    pub fn enclosing_class(&self) -> Option<TypeHash> {
        self.levels().find_map(|level| match level {
            ScopeLevel::Class(class) => Some(*class),
            _ => None,
        })
    }

    /// Innermost function locals.
    pub fn locals_mut(&mut self) -> Option<&mut LocalScope> {
        self.levels.iter_mut().rev().find_map(|level| match level {
            ScopeLevel::Block(locals) => Some(locals),
            _ => None,
        })
    }
}
