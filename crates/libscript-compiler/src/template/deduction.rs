//! Template argument deduction.
//!
//! Each call argument type is matched against its parameter pattern:
//!
//! - a bare placeholder (`T`, `const T&`) binds the argument's base type
//! - a dependent template-id (`List<T>`) matches instances of the same class
//!   template and recurses into their arguments, where matching is exact
//! - a function type (`void(T)`) matches function types component-wise
//! - a pattern without placeholders deduces nothing and is left to overload
//!   resolution
//!
//! Deductions for parameters given explicitly are dropped. After all
//! arguments are matched the deductions are agglomerated: duplicates merge,
//! two different values for one parameter are a conflict.

use libscript_core::{DataType, Param, TemplateArgument, TemplateParamKind, TypeEntry, TypeHash};
use libscript_registry::SymbolRegistry;

use super::TemplateError;

/// One deduced template argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deduction {
    pub index: usize,
    pub value: TemplateArgument,
}

/// Deduction state for one template against one argument list.
#[derive(Debug, Clone)]
pub struct TemplateArgumentDeduction<'a> {
    registry: &'a SymbolRegistry,
    template: TypeHash,
    /// Parameters below this index were given explicitly.
    explicit: usize,
    deductions: Vec<Deduction>,
}

impl<'a> TemplateArgumentDeduction<'a> {
    pub fn new(registry: &'a SymbolRegistry, template: TypeHash, explicit: usize) -> Self {
        Self {
            registry,
            template,
            explicit,
            deductions: Vec::new(),
        }
    }

    /// Match every argument against its parameter pattern. Arguments past the
    /// end of `patterns` are ignored; arity is checked by overload resolution.
    pub fn deduce_all(&mut self, patterns: &[Param], args: &[DataType]) -> Result<(), TemplateError> {
        for (position, (pattern, arg)) in patterns.iter().zip(args).enumerate() {
            self.deduce(pattern.data_type, *arg, position)?;
        }
        Ok(())
    }

    /// Match one argument type against one parameter pattern.
    pub fn deduce(&mut self, pattern: DataType, arg: DataType, position: usize) -> Result<(), TemplateError> {
        if let Some((index, kind)) = self.placeholder(pattern) {
            if kind != TemplateParamKind::Type {
                return Err(self.mismatch(position, pattern, arg));
            }
            let bound = if pattern.is_array() {
                if !arg.is_array() {
                    return Err(self.mismatch(position, pattern, arg));
                }
                DataType::simple(arg.type_hash)
            } else {
                arg.base()
            };
            self.record(index, TemplateArgument::Type(bound));
            return Ok(());
        }

        if !self.is_dependent(pattern) {
            return Ok(());
        }
        self.deduce_structure(pattern, arg, position)
    }

    /// Record a deduction. Explicitly given parameters are never overridden.
    pub fn record(&mut self, index: usize, value: TemplateArgument) {
        if index < self.explicit {
            return;
        }
        self.deductions.push(Deduction { index, value });
    }

    pub fn deductions(&self) -> &[Deduction] {
        &self.deductions
    }

    /// Merge duplicate deductions and reject conflicting ones. The result is
    /// sorted by parameter index.
    pub fn agglomerate(self) -> Result<Vec<Deduction>, TemplateError> {
        let template = self.template;
        let mut deductions = self.deductions;
        deductions.sort_by_key(|d| d.index);
        deductions.dedup();
        if let Some(pair) = deductions.windows(2).find(|w| w[0].index == w[1].index) {
            return Err(TemplateError::DeductionConflict {
                template,
                index: pair[0].index,
                first: pair[0].value,
                second: pair[1].value,
            });
        }
        Ok(deductions)
    }

    // =========================================================================
    // Structural matching
    // =========================================================================

    fn deduce_structure(&mut self, pattern: DataType, arg: DataType, position: usize) -> Result<(), TemplateError> {
        let registry = self.registry;
        match registry.get(pattern.type_hash) {
            Some(TypeEntry::Pattern(p)) => {
                let class = registry
                    .get_class(arg.type_hash)
                    .filter(|c| c.template == Some(p.template) && c.template_args.len() == p.arguments.len())
                    .ok_or_else(|| self.mismatch(position, pattern, arg))?;
                for (expected, actual) in p.arguments.iter().zip(&class.template_args) {
                    self.deduce_exact(*expected, *actual, position)?;
                }
                Ok(())
            }
            Some(TypeEntry::FunctionType(f)) => {
                let actual = registry
                    .get(arg.type_hash)
                    .and_then(TypeEntry::as_function_type)
                    .filter(|a| a.params.len() == f.params.len())
                    .ok_or_else(|| self.mismatch(position, pattern, arg))?;
                self.deduce_exact(f.return_type.into(), actual.return_type.into(), position)?;
                for (expected, found) in f.params.iter().zip(&actual.params) {
                    self.deduce_exact((*expected).into(), (*found).into(), position)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Match inside a template-id or function type: no conversions apply,
    /// so qualifiers must line up exactly.
    fn deduce_exact(
        &mut self,
        expected: TemplateArgument,
        actual: TemplateArgument,
        position: usize,
    ) -> Result<(), TemplateError> {
        let TemplateArgument::Type(pattern) = expected else {
            return if expected == actual {
                Ok(())
            } else {
                Err(self.value_mismatch(position, expected, actual))
            };
        };

        if let Some((index, kind)) = self.placeholder(pattern) {
            return match (kind, actual) {
                (TemplateParamKind::Type, TemplateArgument::Type(found)) if found.qualifiers.contains(pattern.qualifiers) => {
                    let bound = DataType::with_qualifiers(found.type_hash, found.qualifiers - pattern.qualifiers);
                    self.record(index, TemplateArgument::Type(bound));
                    Ok(())
                }
                (TemplateParamKind::Bool, TemplateArgument::Bool(_))
                | (TemplateParamKind::Integer, TemplateArgument::Integer(_)) => {
                    self.record(index, actual);
                    Ok(())
                }
                _ => Err(self.value_mismatch(position, expected, actual)),
            };
        }

        match actual {
            TemplateArgument::Type(found) if self.is_dependent(pattern) => {
                if found.qualifiers != pattern.qualifiers {
                    return Err(self.mismatch(position, pattern, found));
                }
                self.deduce_structure(pattern, found, position)
            }
            TemplateArgument::Type(found) if found == pattern => Ok(()),
            _ => Err(self.value_mismatch(position, expected, actual)),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Index and kind if `ty` is a placeholder of this template.
    fn placeholder(&self, ty: DataType) -> Option<(usize, TemplateParamKind)> {
        self.registry
            .get(ty.type_hash)
            .and_then(TypeEntry::as_template_param)
            .filter(|p| p.owner == self.template)
            .map(|p| (p.index, p.kind))
    }

    /// Whether `ty` mentions a placeholder of this template anywhere.
    fn is_dependent(&self, ty: DataType) -> bool {
        match self.registry.get(ty.type_hash) {
            Some(TypeEntry::TemplateParam(p)) => p.owner == self.template,
            Some(TypeEntry::Pattern(p)) => p.arguments.iter().any(|a| match a {
                TemplateArgument::Type(t) => self.is_dependent(*t),
                _ => false,
            }),
            Some(TypeEntry::FunctionType(f)) => {
                self.is_dependent(f.return_type) || f.params.iter().any(|p| self.is_dependent(*p))
            }
            _ => false,
        }
    }

    fn mismatch(&self, position: usize, pattern: DataType, found: DataType) -> TemplateError {
        TemplateError::DeductionMismatch {
            template: self.template,
            argument: position,
            pattern,
            found,
        }
    }

    fn value_mismatch(&self, position: usize, expected: TemplateArgument, actual: TemplateArgument) -> TemplateError {
        TemplateError::InvalidArgument {
            template: self.template,
            index: position,
            reason: format!("'{actual}' does not match '{expected}'"),
        }
    }
}
