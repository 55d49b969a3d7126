//! Built-in type identities.
//!
//! Fundamental types are registered by [`SymbolRegistry::with_builtins`] under
//! these hashes. `NULL`, `AUTO` and `INITIALIZER_LIST` are sentinels: they
//! never name a registered type but appear in [`DataType`] values.
//!
//! [`SymbolRegistry::with_builtins`]: ../../libscript_registry/struct.SymbolRegistry.html
//! [`DataType`]: crate::DataType

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::TypeHash;

/// The invalid type.
pub const NULL: TypeHash = TypeHash::EMPTY;

pub const VOID: TypeHash = TypeHash(0x5f1c_04a9_6e3d_0001);
pub const BOOL: TypeHash = TypeHash(0x5f1c_04a9_6e3d_0002);
pub const CHAR: TypeHash = TypeHash(0x5f1c_04a9_6e3d_0003);
pub const INT: TypeHash = TypeHash(0x5f1c_04a9_6e3d_0004);
pub const FLOAT: TypeHash = TypeHash(0x5f1c_04a9_6e3d_0005);
pub const DOUBLE: TypeHash = TypeHash(0x5f1c_04a9_6e3d_0006);

/// Placeholder for a type deduced from context.
pub const AUTO: TypeHash = TypeHash(0x5f1c_04a9_6e3d_00a0);

/// Type of a brace-enclosed literal list before it is bound to a destination.
pub const INITIALIZER_LIST: TypeHash = TypeHash(0x5f1c_04a9_6e3d_00a1);

/// The built-in `initializer_list<T>` class template.
pub const INITIALIZER_LIST_TEMPLATE: TypeHash = TypeHash(0x5f1c_04a9_6e3d_00a2);

/// The fundamental types, in conversion-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum FundamentalKind {
    Void = 0,
    Bool = 1,
    Char = 2,
    Int = 3,
    Float = 4,
    Double = 5,
}

impl FundamentalKind {
    pub const ALL: [FundamentalKind; 6] = [
        FundamentalKind::Void,
        FundamentalKind::Bool,
        FundamentalKind::Char,
        FundamentalKind::Int,
        FundamentalKind::Float,
        FundamentalKind::Double,
    ];

    /// Identify a fundamental type from its hash.
    pub fn from_hash(hash: TypeHash) -> Option<Self> {
        match hash {
            VOID => Some(FundamentalKind::Void),
            BOOL => Some(FundamentalKind::Bool),
            CHAR => Some(FundamentalKind::Char),
            INT => Some(FundamentalKind::Int),
            FLOAT => Some(FundamentalKind::Float),
            DOUBLE => Some(FundamentalKind::Double),
            _ => None,
        }
    }

    /// Identify a fundamental type from its source spelling.
    pub fn from_keyword(name: &str) -> Option<Self> {
        match name {
            "void" => Some(FundamentalKind::Void),
            "bool" => Some(FundamentalKind::Bool),
            "char" => Some(FundamentalKind::Char),
            "int" => Some(FundamentalKind::Int),
            "float" => Some(FundamentalKind::Float),
            "double" => Some(FundamentalKind::Double),
            _ => None,
        }
    }

    pub fn hash(self) -> TypeHash {
        match self {
            FundamentalKind::Void => VOID,
            FundamentalKind::Bool => BOOL,
            FundamentalKind::Char => CHAR,
            FundamentalKind::Int => INT,
            FundamentalKind::Float => FLOAT,
            FundamentalKind::Double => DOUBLE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FundamentalKind::Void => "void",
            FundamentalKind::Bool => "bool",
            FundamentalKind::Char => "char",
            FundamentalKind::Int => "int",
            FundamentalKind::Float => "float",
            FundamentalKind::Double => "double",
        }
    }

    /// Row/column of this kind in a conversion table.
    #[inline]
    pub fn index(self) -> usize {
        u8::from(self) as usize
    }

    /// Whether values of this kind participate in arithmetic.
    pub fn is_arithmetic(self) -> bool {
        !matches!(self, FundamentalKind::Void | FundamentalKind::Bool)
    }
}

/// Whether `hash` is one of the fundamental types.
#[inline]
pub fn is_fundamental(hash: TypeHash) -> bool {
    FundamentalKind::from_hash(hash).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_round_trip_through_kind() {
        for kind in FundamentalKind::ALL {
            assert_eq!(FundamentalKind::from_hash(kind.hash()), Some(kind));
            assert_eq!(FundamentalKind::from_keyword(kind.name()), Some(kind));
        }
    }

    #[test]
    fn table_indices_follow_declaration_order() {
        assert_eq!(FundamentalKind::Void.index(), 0);
        assert_eq!(FundamentalKind::Double.index(), 5);
        assert!(matches!(FundamentalKind::try_from(3u8), Ok(FundamentalKind::Int)));
        assert!(FundamentalKind::try_from(6u8).is_err());
    }

    #[test]
    fn sentinels_are_not_fundamental() {
        assert!(!is_fundamental(NULL));
        assert!(!is_fundamental(AUTO));
        assert!(!is_fundamental(INITIALIZER_LIST));
        assert!(is_fundamental(CHAR));
    }
}
