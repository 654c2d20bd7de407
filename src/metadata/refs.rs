//! Method and field references with identity semantics.
//!
//! References are interned by the [`crate::metadata::registry::RefRegistry`]: two
//! references to the same member resolve to the same allocation and the same
//! [`Token`]. `Eq` and `Hash` delegate to the token, so reference sets compare by
//! identity rather than structure — the reference-set arithmetic of the allocator
//! depends on that being cheap.

use std::fmt;
use std::sync::Arc;

use crate::metadata::token::Token;
use crate::metadata::types::DexTypeRc;

/// A reference-counted pointer to a [`MethodRef`]
pub type MethodRefRc = Arc<MethodRef>;

/// A reference-counted pointer to a [`FieldRef`]
pub type FieldRefRc = Arc<FieldRef>;

/// A reference to a method, as it would appear in the `method_ids` pool.
#[derive(Debug)]
pub struct MethodRef {
    token: Token,
    owner: DexTypeRc,
    name: String,
    proto: String,
}

impl MethodRef {
    pub(crate) fn new(
        token: Token,
        owner: DexTypeRc,
        name: impl Into<String>,
        proto: impl Into<String>,
    ) -> Self {
        MethodRef {
            token,
            owner,
            name: name.into(),
            proto: proto.into(),
        }
    }

    /// The interning token of this reference
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The type declaring the referenced method
    #[must_use]
    pub fn owner(&self) -> &DexTypeRc {
        &self.owner
    }

    /// The simple name of the referenced method
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shorty-style prototype of the referenced method, e.g. `()V`
    #[must_use]
    pub fn proto(&self) -> &str {
        &self.proto
    }
}

impl PartialEq for MethodRef {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for MethodRef {}

impl std::hash::Hash for MethodRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner.name(), self.name, self.proto)
    }
}

/// A reference to a field, as it would appear in the `field_ids` pool.
#[derive(Debug)]
pub struct FieldRef {
    token: Token,
    owner: DexTypeRc,
    name: String,
}

impl FieldRef {
    pub(crate) fn new(token: Token, owner: DexTypeRc, name: impl Into<String>) -> Self {
        FieldRef {
            token,
            owner,
            name: name.into(),
        }
    }

    /// The interning token of this reference
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The type declaring the referenced field
    #[must_use]
    pub fn owner(&self) -> &DexTypeRc {
        &self.owner
    }

    /// The simple name of the referenced field
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for FieldRef {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for FieldRef {}

impl std::hash::Hash for FieldRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner.name(), self.name)
    }
}
