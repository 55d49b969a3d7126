//! Pairwise ranking of viable candidates.
//!
//! Candidates are compared position by position over the call's argument
//! list. In operator calls a member candidate's first position is its
//! implicit object while a free candidate's is an ordinary parameter; those
//! mixed positions compare by rank alone.

use std::cmp::Ordering;

use libscript_core::TypeHash;

use super::{ImplicitObject, OverloadMatch};
use crate::conversion::{ConversionRank, StandardConversion};
use crate::initialization::Initialization;

/// A candidate that passed every viability check.
#[derive(Debug, Clone)]
pub(super) struct Candidate {
    pub function: TypeHash,
    pub object: Option<StandardConversion>,
    /// The object took the place of the first argument.
    pub leading_object: bool,
    pub initializations: Vec<Initialization>,
}

enum Slot<'a> {
    Object(&'a StandardConversion),
    Argument(&'a Initialization),
}

impl Slot<'_> {
    fn rank(&self) -> ConversionRank {
        match self {
            Slot::Object(conv) => conv.rank(),
            Slot::Argument(init) => init.rank(),
        }
    }

    fn compare(&self, other: &Slot<'_>) -> Ordering {
        match (self, other) {
            (Slot::Object(a), Slot::Object(b)) => a.compare(b),
            (Slot::Argument(a), Slot::Argument(b)) => a.compare(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Candidate {
    /// Slot at argument position `index`.
    fn slot(&self, index: usize) -> Option<Slot<'_>> {
        if self.leading_object {
            if index == 0 {
                return self.object.as_ref().map(Slot::Object);
            }
            return self.initializations.get(index - 1).map(Slot::Argument);
        }
        self.initializations.get(index).map(Slot::Argument)
    }

    fn positions(&self) -> usize {
        self.initializations.len() + usize::from(self.leading_object)
    }

    /// Rank per argument position.
    pub fn ranks(&self) -> Vec<ConversionRank> {
        (0..self.positions())
            .filter_map(|i| self.slot(i))
            .map(|slot| slot.rank())
            .collect()
    }

    pub fn into_match(self) -> OverloadMatch {
        OverloadMatch {
            function: self.function,
            object: self.object,
            initializations: self.initializations,
        }
    }
}

/// At least as good everywhere and strictly better somewhere.
fn dominates(a: &Candidate, b: &Candidate, mode: ImplicitObject) -> bool {
    let mut strictly_better = false;

    if let (ImplicitObject::Provided(_), Some(x), Some(y)) = (mode, &a.object, &b.object) {
        match x.compare(y) {
            Ordering::Greater => return false,
            Ordering::Less => strictly_better = true,
            Ordering::Equal => {}
        }
    }

    let positions = a.positions().min(b.positions());
    for i in 0..positions {
        let (Some(x), Some(y)) = (a.slot(i), b.slot(i)) else {
            continue;
        };
        match x.compare(&y) {
            Ordering::Greater => return false,
            Ordering::Less => strictly_better = true,
            Ordering::Equal => {}
        }
    }
    strictly_better
}

pub(super) enum Selection {
    Winner(usize),
    /// Indices of every candidate no other candidate beats. A lone unbeaten
    /// candidate is listed with the candidates it fails to beat.
    Tied(Vec<usize>),
    Empty,
}

/// Pick the candidate that beats all others. The result does not depend on
/// the order of `viable`.
pub(super) fn select_best(viable: &[Candidate], mode: ImplicitObject) -> Selection {
    if viable.is_empty() {
        return Selection::Empty;
    }

    let unbeaten: Vec<usize> = (0..viable.len())
        .filter(|&i| !(0..viable.len()).any(|j| j != i && dominates(&viable[j], &viable[i], mode)))
        .collect();

    match *unbeaten.as_slice() {
        [] => Selection::Tied((0..viable.len()).collect()),
        [winner] => {
            // Mixed object/argument slots make dominance non-transitive
            let tied: Vec<usize> = (0..viable.len())
                .filter(|&j| j == winner || !dominates(&viable[winner], &viable[j], mode))
                .collect();
            if tied.len() == 1 {
                Selection::Winner(winner)
            } else {
                Selection::Tied(tied)
            }
        }
        _ => Selection::Tied(unbeaten),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;
    use crate::initialization::InitStyle;
    use libscript_core::{ClassEntry, DataType, primitives};
    use libscript_registry::SymbolRegistry;

    fn free(function: u64, initializations: Vec<Initialization>) -> Candidate {
        Candidate {
            function: TypeHash(function),
            object: None,
            leading_object: false,
            initializations,
        }
    }

    #[test]
    fn lone_unbeaten_candidate_ties_with_what_it_cannot_beat() {
        let mut registry = SymbolRegistry::with_builtins();
        let base = registry.register_type(ClassEntry::new("", "Base")).unwrap();
        let derived = registry
            .register_type(ClassEntry::new("", "Derived").with_base(base))
            .unwrap();
        let ctx = CompilationContext::new(&registry);
        let int = DataType::simple(primitives::INT);
        let exact = Initialization::from_type(&ctx, int, int, InitStyle::Copy);
        let promoted = Initialization::from_type(&ctx, int, DataType::simple(primitives::CHAR), InitStyle::Copy);
        let via_base = Initialization::from_type(&ctx, DataType::const_ref(base), DataType::simple(derived), InitStyle::Copy);
        let same = Initialization::from_type(&ctx, DataType::const_ref(base), DataType::simple(base), InitStyle::Copy);

        // `first` beats `member`, `member` beats `last`, but `first` and
        // `last` are incomparable
        let first = free(1, vec![via_base, exact.clone(), exact.clone()]);
        let member = Candidate {
            function: TypeHash(2),
            object: Some(StandardConversion::compute(&ctx, int, int)),
            leading_object: true,
            initializations: vec![promoted.clone(), exact],
        };
        let last = free(3, vec![same, promoted.clone(), promoted]);
        let viable = [first, member, last];

        let Selection::Tied(tied) = select_best(&viable, ImplicitObject::FirstArgument) else {
            panic!("expected an ambiguity");
        };
        assert_eq!(tied, vec![0, 2]);
    }

    #[test]
    fn dominating_candidate_wins() {
        let registry = SymbolRegistry::with_builtins();
        let ctx = CompilationContext::new(&registry);
        let int = DataType::simple(primitives::INT);
        let exact = Initialization::from_type(&ctx, int, int, InitStyle::Copy);
        let promoted = Initialization::from_type(&ctx, int, DataType::simple(primitives::CHAR), InitStyle::Copy);

        let viable = [free(1, vec![promoted.clone(), exact.clone()]), free(2, vec![exact.clone(), exact])];
        assert!(matches!(select_best(&viable, ImplicitObject::None), Selection::Winner(1)));
        assert!(matches!(select_best(&[], ImplicitObject::None), Selection::Empty));
    }
}
