//! Standard conversions.
//!
//! A [`StandardConversion`] classifies one built-in step from a source type to
//! a destination type. It records the numeric promotion or conversion that
//! takes place, whether `const` had to be added, how many derived-to-base hops
//! were taken, and whether the destination binds the source or receives a
//! copy of it.
//!
//! ## Fundamental table
//!
//! ```text
//! src \ dest   void   bool   char   int    float  double
//! void         exact  -      -      -      -      -
//! bool         -      exact  int-p  int-p  fp-p   fp-p
//! char         -      bool-c exact  int-p  fp-p   fp-p
//! int          -      bool-c int-c  exact  fp-p   fp-p
//! float        -      bool-c int-c  int-c  exact  fp-p
//! double       -      bool-c int-c  int-c  fp-c   exact
//! ```
//!
//! ## References
//!
//! A mutable reference binds a non-const value of the same type, or of a
//! derived class. A const reference of the same base type binds directly,
//! adding `const` when the source lacks it. A fundamental conversion into a
//! const reference binds a converted temporary (copy-of-reference).

use std::cmp::Ordering;

use libscript_core::{DataType, FundamentalKind};

use super::ConversionRank;
use crate::context::CompilationContext;

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum NumericPromotion {
    #[default]
    None,
    Integral,
    FloatingPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum NumericConversion {
    #[default]
    None,
    Integral,
    FloatingPoint,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum QualificationAdjustment {
    #[default]
    None,
    AddConst,
}

/// How the destination acquires the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InitFlavor {
    /// The destination reference binds the source directly.
    Reference,
    /// The destination receives a copy.
    #[default]
    Copy,
    /// A const reference binds a converted temporary.
    CopyRef,
    NotConvertible,
}

impl InitFlavor {
    fn preference(self) -> u8 {
        match self {
            InitFlavor::Reference => 0,
            InitFlavor::Copy | InitFlavor::CopyRef => 1,
            InitFlavor::NotConvertible => 2,
        }
    }
}

// ============================================================================
// StandardConversion
// ============================================================================

/// One built-in conversion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardConversion {
    promotion: NumericPromotion,
    conversion: NumericConversion,
    qualification: QualificationAdjustment,
    derived_to_base: usize,
    flavor: InitFlavor,
}

impl Default for StandardConversion {
    fn default() -> Self {
        Self::none()
    }
}

const EXACT: StandardConversion = StandardConversion::none();
const INT_PROMO: StandardConversion = StandardConversion::promotion(NumericPromotion::Integral);
const FP_PROMO: StandardConversion = StandardConversion::promotion(NumericPromotion::FloatingPoint);
const INT_CONV: StandardConversion = StandardConversion::numeric(NumericConversion::Integral);
const FP_CONV: StandardConversion = StandardConversion::numeric(NumericConversion::FloatingPoint);
const BOOL_CONV: StandardConversion = StandardConversion::numeric(NumericConversion::Boolean);
const NO: StandardConversion = StandardConversion::not_convertible();

/// Indexed by [`FundamentalKind::index`] of source, then destination.
const FUNDAMENTAL_TABLE: [[StandardConversion; 6]; 6] = [
    [EXACT, NO, NO, NO, NO, NO],
    [NO, EXACT, INT_PROMO, INT_PROMO, FP_PROMO, FP_PROMO],
    [NO, BOOL_CONV, EXACT, INT_PROMO, FP_PROMO, FP_PROMO],
    [NO, BOOL_CONV, INT_CONV, EXACT, FP_PROMO, FP_PROMO],
    [NO, BOOL_CONV, INT_CONV, INT_CONV, EXACT, FP_PROMO],
    [NO, BOOL_CONV, INT_CONV, INT_CONV, FP_CONV, EXACT],
];

impl StandardConversion {
    /// Exact match by copy.
    pub const fn none() -> Self {
        Self {
            promotion: NumericPromotion::None,
            conversion: NumericConversion::None,
            qualification: QualificationAdjustment::None,
            derived_to_base: 0,
            flavor: InitFlavor::Copy,
        }
    }

    /// Exact match by direct reference binding.
    pub const fn reference() -> Self {
        Self {
            flavor: InitFlavor::Reference,
            ..Self::none()
        }
    }

    pub const fn not_convertible() -> Self {
        Self {
            flavor: InitFlavor::NotConvertible,
            ..Self::none()
        }
    }

    const fn promotion(promotion: NumericPromotion) -> Self {
        Self {
            promotion,
            ..Self::none()
        }
    }

    const fn numeric(conversion: NumericConversion) -> Self {
        Self {
            conversion,
            ..Self::none()
        }
    }

    /// Classify the conversion from `src` to `dest`.
    pub fn compute(ctx: &CompilationContext<'_>, src: DataType, dest: DataType) -> Self {
        if src.is_null() || dest.is_null() || !ctx.is_registered(src) || !ctx.is_registered(dest) {
            return Self::not_convertible();
        }

        if dest.is_mutable_ref() {
            return Self::bind_mutable(ctx, src, dest);
        }

        if src.same_base(&dest) {
            return Self::same_type(ctx, src, dest);
        }

        if src.is_array() || dest.is_array() {
            return Self::not_convertible();
        }

        if let (Some(from), Some(to)) = (ctx.fundamental(src), ctx.fundamental(dest)) {
            let conv = FUNDAMENTAL_TABLE[from.index()][to.index()];
            return conv.into_destination(dest);
        }

        if ctx.is_enum(src) {
            return match ctx.fundamental(dest) {
                Some(FundamentalKind::Int) => INT_CONV.into_destination(dest),
                _ => Self::not_convertible(),
            };
        }

        if ctx.is_class(src) && ctx.is_class(dest) {
            let Some(depth) = ctx.inheritance_depth(src.type_hash, dest.type_hash) else {
                return Self::not_convertible();
            };
            if dest.is_reference() {
                return Self::reference()
                    .with_derived_to_base(depth)
                    .with(added_const(src, dest));
            }
            if ctx.is_copy_constructible(dest.type_hash) {
                return Self::none().with_derived_to_base(depth);
            }
        }

        Self::not_convertible()
    }

    fn bind_mutable(ctx: &CompilationContext<'_>, src: DataType, dest: DataType) -> Self {
        if src.is_const() {
            return Self::not_convertible();
        }
        if src.same_base(&dest) {
            return Self::reference();
        }
        if ctx.is_class(src) && ctx.is_class(dest) {
            if let Some(depth) = ctx.inheritance_depth(src.type_hash, dest.type_hash) {
                return Self::reference().with_derived_to_base(depth);
            }
        }
        Self::not_convertible()
    }

    fn same_type(ctx: &CompilationContext<'_>, src: DataType, dest: DataType) -> Self {
        if dest.is_reference() {
            return Self::reference().with(added_const(src, dest));
        }
        if ctx.is_class(dest) && !ctx.is_copy_constructible(dest.type_hash) {
            return Self::not_convertible();
        }
        Self::none()
    }

    fn into_destination(self, dest: DataType) -> Self {
        if self.is_convertible() && dest.is_reference() {
            self.with_flavor(InitFlavor::CopyRef)
        } else {
            self
        }
    }

    // === Composition ===

    /// Apply a qualification adjustment. Not-convertible stays not-convertible.
    pub fn with(self, qualification: QualificationAdjustment) -> Self {
        if !self.is_convertible() {
            return self;
        }
        Self {
            qualification,
            ..self
        }
    }

    pub fn with_flavor(self, flavor: InitFlavor) -> Self {
        if !self.is_convertible() || flavor == InitFlavor::NotConvertible {
            return Self::not_convertible();
        }
        Self { flavor, ..self }
    }

    pub fn with_derived_to_base(self, depth: usize) -> Self {
        if !self.is_convertible() {
            return self;
        }
        Self {
            derived_to_base: depth,
            ..self
        }
    }

    // === Queries ===

    pub fn numeric_promotion(&self) -> NumericPromotion {
        self.promotion
    }

    pub fn numeric_conversion(&self) -> NumericConversion {
        self.conversion
    }

    pub fn qualification(&self) -> QualificationAdjustment {
        self.qualification
    }

    /// Inheritance hops taken; 0 when no derived-to-base step happened.
    pub fn derived_to_base_depth(&self) -> usize {
        self.derived_to_base
    }

    pub fn flavor(&self) -> InitFlavor {
        self.flavor
    }

    pub fn is_convertible(&self) -> bool {
        self.flavor != InitFlavor::NotConvertible
    }

    pub fn is_reference_binding(&self) -> bool {
        self.flavor == InitFlavor::Reference
    }

    /// Any numeric conversion may lose information. Promotions never do.
    pub fn is_narrowing(&self) -> bool {
        self.is_convertible() && self.conversion != NumericConversion::None
    }

    pub fn rank(&self) -> ConversionRank {
        if !self.is_convertible() {
            ConversionRank::NotConvertible
        } else if self.conversion != NumericConversion::None {
            ConversionRank::Conversion
        } else if self.promotion != NumericPromotion::None {
            ConversionRank::Promotion
        } else {
            ConversionRank::ExactMatch
        }
    }

    /// Total preorder; `Less` means `self` is the better conversion.
    ///
    /// Rank first, then fewer derived-to-base hops, then no added const,
    /// then direct binding over copying.
    pub fn compare(&self, other: &Self) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal || !self.is_convertible() {
            return by_rank;
        }
        self.derived_to_base
            .cmp(&other.derived_to_base)
            .then(self.qualification.cmp(&other.qualification))
            .then(self.flavor.preference().cmp(&other.flavor.preference()))
    }
}

fn added_const(src: DataType, dest: DataType) -> QualificationAdjustment {
    if dest.is_const() && !src.is_const() {
        QualificationAdjustment::AddConst
    } else {
        QualificationAdjustment::None
    }
}
