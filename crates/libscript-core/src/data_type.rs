//! DataType: a type identity plus qualifiers.
//!
//! [`TypeHash`] names the base type; [`DataType`] adds the `const`,
//! reference and array-of qualifiers that conversions care about.
//!
//! ```
//! use libscript_core::{DataType, primitives};
//!
//! let int = DataType::simple(primitives::INT);
//! let cref = DataType::const_ref(primitives::INT);
//!
//! assert!(cref.is_const_ref());
//! assert_eq!(cref.base(), int);
//! ```

use std::fmt;

use bitflags::bitflags;

use crate::{TypeHash, primitives};

bitflags! {
    /// Qualifiers applied to a base type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Qualifiers: u8 {
        const CONST = 0b0001;
        const REFERENCE = 0b0010;
        /// Array-of the base type.
        const ARRAY = 0b0100;
    }
}

/// A base type with qualifiers. `Copy`, cheap to pass around.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    pub type_hash: TypeHash,
    pub qualifiers: Qualifiers,
}

impl DataType {
    /// The `Null` type: no type at all.
    pub const NULL: DataType = DataType::simple(primitives::NULL);

    /// Unqualified type.
    #[inline]
    pub const fn simple(type_hash: TypeHash) -> Self {
        Self {
            type_hash,
            qualifiers: Qualifiers::empty(),
        }
    }

    #[inline]
    pub const fn with_qualifiers(type_hash: TypeHash, qualifiers: Qualifiers) -> Self {
        Self { type_hash, qualifiers }
    }

    /// `const T`
    #[inline]
    pub const fn constant(type_hash: TypeHash) -> Self {
        Self::with_qualifiers(type_hash, Qualifiers::CONST)
    }

    /// `T&`
    #[inline]
    pub const fn reference(type_hash: TypeHash) -> Self {
        Self::with_qualifiers(type_hash, Qualifiers::REFERENCE)
    }

    /// `const T&`
    #[inline]
    pub const fn const_ref(type_hash: TypeHash) -> Self {
        Self::with_qualifiers(type_hash, Qualifiers::CONST.union(Qualifiers::REFERENCE))
    }

    #[inline]
    pub const fn void() -> Self {
        Self::simple(primitives::VOID)
    }

    #[inline]
    pub const fn auto() -> Self {
        Self::simple(primitives::AUTO)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.type_hash == primitives::NULL
    }

    #[inline]
    pub fn is_auto(&self) -> bool {
        self.type_hash == primitives::AUTO
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.qualifiers.contains(Qualifiers::CONST)
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        self.qualifiers.contains(Qualifiers::REFERENCE)
    }

    #[inline]
    pub fn is_const_ref(&self) -> bool {
        self.qualifiers.contains(Qualifiers::CONST | Qualifiers::REFERENCE)
    }

    /// Non-const reference: binds only to an identical mutable value.
    #[inline]
    pub fn is_mutable_ref(&self) -> bool {
        self.is_reference() && !self.is_const()
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.qualifiers.contains(Qualifiers::ARRAY)
    }

    #[inline]
    pub fn is_fundamental(&self) -> bool {
        primitives::is_fundamental(self.type_hash) && !self.is_array()
    }

    /// The type with const and reference removed. Array-of is kept since it
    /// changes the value type.
    #[inline]
    pub fn base(self) -> Self {
        Self::with_qualifiers(self.type_hash, self.qualifiers & Qualifiers::ARRAY)
    }

    /// Same base type, ignoring const and reference.
    #[inline]
    pub fn same_base(&self, other: &DataType) -> bool {
        self.base() == other.base()
    }

    #[inline]
    pub fn without_ref(self) -> Self {
        Self::with_qualifiers(self.type_hash, self.qualifiers - Qualifiers::REFERENCE)
    }

    #[inline]
    pub fn without_const(self) -> Self {
        Self::with_qualifiers(self.type_hash, self.qualifiers - Qualifiers::CONST)
    }

    #[inline]
    pub fn add(self, qualifiers: Qualifiers) -> Self {
        Self::with_qualifiers(self.type_hash, self.qualifiers | qualifiers)
    }
}

impl From<TypeHash> for DataType {
    fn from(type_hash: TypeHash) -> Self {
        DataType::simple(type_hash)
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const() {
            write!(f, "const ")?;
        }
        match primitives::FundamentalKind::from_hash(self.type_hash) {
            Some(kind) => write!(f, "{}", kind.name())?,
            None if self.is_null() => write!(f, "<null>")?,
            None if self.is_auto() => write!(f, "auto")?,
            None => write!(f, "{}", self.type_hash)?,
        }
        if self.is_array() {
            write!(f, "[]")?;
        }
        if self.is_reference() {
            write!(f, "&")?;
        }
        Ok(())
    }
}
