//! Type conversion system.
//!
//! A [`Conversion`] is the full recipe for turning a value of one type into
//! another: a [`StandardConversion`], optionally followed by one user-defined
//! conversion function and a second standard conversion on its result.
//!
//! ## Conversion Priority
//!
//! 1. Standard conversion alone (exact, promotion, numeric conversion,
//!    derived-to-base)
//! 2. Converting constructor of the destination class
//! 3. Conversion operator of the source class (or one of its bases)
//!
//! Explicit constructors and casts are only considered under
//! [`ConversionPolicy::AllowExplicitConversions`].

use std::cmp::Ordering;

use libscript_core::{DataType, SemanticError, TypeHash};
use thiserror::Error;

use crate::context::CompilationContext;

mod standard;
mod user_defined;

pub use standard::{
    InitFlavor, NumericConversion, NumericPromotion, QualificationAdjustment, StandardConversion,
};

/// Quality of a conversion, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversionRank {
    ExactMatch,
    Promotion,
    Conversion,
    UserDefinedConversion,
    NotConvertible,
}

impl ConversionRank {
    pub fn is_viable(self) -> bool {
        self != ConversionRank::NotConvertible
    }
}

/// Whether explicit constructors and casts may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionPolicy {
    #[default]
    NoExplicitConversions,
    AllowExplicitConversions,
}

impl ConversionPolicy {
    pub fn allows_explicit(self) -> bool {
        self == ConversionPolicy::AllowExplicitConversions
    }
}

/// Why a conversion could not be formed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("cannot convert from '{from}' to '{to}'")]
    NotConvertible { from: DataType, to: DataType },

    #[error("conversion from '{from}' to '{to}' is ambiguous between {} candidates", .candidates.len())]
    Ambiguous {
        from: DataType,
        to: DataType,
        candidates: Vec<TypeHash>,
    },
}

impl From<ConversionError> for SemanticError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::NotConvertible { from, to } => SemanticError::NotConvertible { from, to },
            ConversionError::Ambiguous { from, to, candidates } => {
                SemanticError::AmbiguousConversion { from, to, candidates }
            }
        }
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// `conv1`, then optionally `function`, then `conv2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    conv1: StandardConversion,
    function: Option<TypeHash>,
    conv2: StandardConversion,
    src: DataType,
    dest: DataType,
}

impl Conversion {
    pub fn standard(conv: StandardConversion, src: DataType, dest: DataType) -> Self {
        Self {
            conv1: conv,
            function: None,
            conv2: StandardConversion::none(),
            src,
            dest,
        }
    }

    pub fn user_defined(
        conv1: StandardConversion,
        function: TypeHash,
        conv2: StandardConversion,
        src: DataType,
        dest: DataType,
    ) -> Self {
        Self {
            conv1,
            function: Some(function),
            conv2,
            src,
            dest,
        }
    }

    pub fn not_convertible(src: DataType, dest: DataType) -> Self {
        Self::standard(StandardConversion::not_convertible(), src, dest)
    }

    /// Find the conversion from `src` to `dest`, reporting why none exists.
    #[tracing::instrument(level = "trace", skip(ctx))]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn try_compute(
        ctx: &CompilationContext<'_>,
        src: DataType,
        dest: DataType,
        policy: ConversionPolicy,
    ) -> Result<Self, ConversionError> {
        let conv = StandardConversion::compute(ctx, src, dest);
        if conv.is_convertible() {
            return Ok(Self::standard(conv, src, dest));
        }
        user_defined::find_user_conversion(ctx, src, dest, policy)?
            .ok_or(ConversionError::NotConvertible { from: src, to: dest })
    }

    /// Like [`try_compute`](Self::try_compute), collapsing every failure into
    /// a not-convertible value.
    pub fn compute(
        ctx: &CompilationContext<'_>,
        src: DataType,
        dest: DataType,
        policy: ConversionPolicy,
    ) -> Self {
        Self::try_compute(ctx, src, dest, policy).unwrap_or_else(|_| Self::not_convertible(src, dest))
    }

    // === Queries ===

    pub fn first(&self) -> StandardConversion {
        self.conv1
    }

    /// Constructor or cast used, if any.
    pub fn function(&self) -> Option<TypeHash> {
        self.function
    }

    pub fn second(&self) -> StandardConversion {
        self.conv2
    }

    pub fn source(&self) -> DataType {
        self.src
    }

    pub fn destination(&self) -> DataType {
        self.dest
    }

    pub fn is_user_defined(&self) -> bool {
        self.function.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.rank().is_viable()
    }

    pub fn is_narrowing(&self) -> bool {
        self.conv1.is_narrowing() || self.conv2.is_narrowing()
    }

    /// Whether the destination reference binds the source object itself.
    pub fn is_reference_binding(&self) -> bool {
        self.function.is_none() && self.conv1.is_reference_binding()
    }

    pub fn rank(&self) -> ConversionRank {
        if !self.conv1.is_convertible() || !self.conv2.is_convertible() {
            return ConversionRank::NotConvertible;
        }
        if self.function.is_some() {
            return ConversionRank::UserDefinedConversion;
        }
        self.conv1.rank().max(self.conv2.rank())
    }

    /// `Less` when `self` is better. A standard conversion beats a
    /// user-defined one; two standard conversions compare their single step;
    /// two user-defined conversions compare the step after the function.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (true, true) => {}
        }
        match (self.function, other.function) {
            (None, None) => self.conv1.compare(&other.conv1),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(_), Some(_)) => self.conv2.compare(&other.conv2),
        }
    }

    /// Worst rank among `conversions`; exact match for an empty list.
    pub fn global_rank<'c>(conversions: impl IntoIterator<Item = &'c Conversion>) -> ConversionRank {
        conversions
            .into_iter()
            .map(Conversion::rank)
            .max()
            .unwrap_or(ConversionRank::ExactMatch)
    }
}
