//! Deterministic identities for types, functions and templates.
//!
//! Every entity the compiler knows about is keyed by a [`TypeHash`]: a 64-bit
//! xxh64 digest of its qualified name (types) or of its name plus signature
//! (functions). Hashes can be computed before the entity is registered, so a
//! class can refer to itself or to a type declared later in the script.
//!
//! Each entity family mixes in its own domain constant, which keeps a function
//! called `Vec` from colliding with a class called `Vec`.
//!
//! ```
//! use libscript_core::TypeHash;
//!
//! let a = TypeHash::from_name("Game::Player");
//! let b = TypeHash::from_name("Game::Player");
//! assert_eq!(a, b);
//!
//! let int = TypeHash::from_name("int");
//! let float = TypeHash::from_name("float");
//! assert_ne!(
//!     TypeHash::from_function("max", &[int, float]),
//!     TypeHash::from_function("max", &[float, int]),
//! );
//! ```

use std::fmt;

use xxhash_rust::xxh64::xxh64;

use crate::TemplateArgument;

/// Domain constants mixed into each entity family.
pub mod hash_constants {
    /// Combines successive components of a signature.
    pub const SEP: u64 = 0xf2a74de452e6b438;
    /// Type names.
    pub const TYPE: u64 = 0x6513270e269e0d37;
    /// Free functions.
    pub const FUNCTION: u64 = 0x0c5c7fd0a6a3a450;
    /// Methods (owner-qualified).
    pub const METHOD: u64 = 0xd23f0824128b2f33;
    /// Constructors.
    pub const CONSTRUCTOR: u64 = 0x1818e811892f902b;
    /// Template instances (class or function).
    pub const INSTANCE: u64 = 0x9531985d5d9dc9f8;
    /// Function signature types.
    pub const FUNCTION_TYPE: u64 = 0xe8e25d940ed90475;
    /// Template parameters.
    pub const TEMPLATE_PARAM: u64 = 0x36f675cc81e74ef5;
    /// Non-type template argument of kind bool.
    pub const BOOL_ARG: u64 = 0x1600a35a099950d8;
    /// Non-type template argument of kind integer.
    pub const INT_ARG: u64 = 0x6b0d549b6f03675a;
    /// Mixed in for const-qualified components.
    pub const CONST: u64 = 0x3d9c172411e20b8f;
    /// Mixed in for reference components.
    pub const REFERENCE: u64 = 0x8d116ece1738f7d9;
}

/// A deterministic 64-bit identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// The invalid hash. Used as the `Null` type.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a (qualified) type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a free function from its qualified name and parameter types.
    ///
    /// Parameter order matters.
    #[inline]
    pub fn from_function(name: &str, params: &[TypeHash]) -> Self {
        let seed = hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_sequence(seed, params.iter().map(|p| p.0)))
    }

    /// Hash of a method. Constness of the method is part of its identity.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, params: &[TypeHash], is_const: bool) -> Self {
        let mut seed = hash_constants::METHOD ^ owner.0.rotate_left(17) ^ xxh64(name.as_bytes(), 0);
        if is_const {
            seed ^= hash_constants::CONST;
        }
        TypeHash(mix_sequence(seed, params.iter().map(|p| p.0)))
    }

    /// Hash of a constructor of `owner`.
    #[inline]
    pub fn from_constructor(owner: TypeHash, params: &[TypeHash]) -> Self {
        let seed = hash_constants::CONSTRUCTOR ^ owner.0;
        TypeHash(mix_sequence(seed, params.iter().map(|p| p.0)))
    }

    /// Hash of a template instance (`List<int>`, `max<float>`).
    ///
    /// Equal argument lists always produce the same hash.
    pub fn from_template_instance(template: TypeHash, args: &[TemplateArgument]) -> Self {
        let seed = hash_constants::INSTANCE ^ template.0;
        TypeHash(mix_sequence(seed, args.iter().map(TemplateArgument::identity)))
    }

    /// Hash of a function signature type `R(P...)`.
    pub fn from_function_type(return_type: u64, params: &[u64]) -> Self {
        let seed = hash_constants::FUNCTION_TYPE ^ return_type;
        TypeHash(mix_sequence(seed, params.iter().copied()))
    }

    /// Hash of the `index`-th template parameter of `owner`.
    #[inline]
    pub fn from_template_param(owner: TypeHash, index: usize) -> Self {
        TypeHash(
            (hash_constants::TEMPLATE_PARAM ^ owner.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(index as u64 + 1),
        )
    }

    /// Whether this is the empty hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Order-sensitive fold of a sequence of component hashes into a seed.
fn mix_sequence(seed: u64, items: impl Iterator<Item = u64>) -> u64 {
    items.enumerate().fold(seed, |acc, (i, item)| {
        let position = (i as u64 + 1).wrapping_mul(hash_constants::SEP).rotate_left(29);
        acc.wrapping_mul(hash_constants::SEP).wrapping_add(position ^ item)
    })
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
