//! Interned dex type descriptors.
//!
//! A [`DexType`] names a class in JVM descriptor form (`Lcom/app/Main;`). Types are
//! interned by the [`crate::metadata::registry::RefRegistry`], so two `DexType`
//! instances with the same descriptor are the same allocation and carry the same
//! [`Token`].

use std::fmt;
use std::sync::Arc;

use crate::metadata::token::Token;

/// A reference-counted pointer to a [`DexType`]
pub type DexTypeRc = Arc<DexType>;

/// An interned type descriptor.
#[derive(Debug)]
pub struct DexType {
    /// Interning token; value equality of tokens is identity equality of types.
    token: Token,
    /// Full descriptor, e.g. `Lcom/app/Main;`.
    name: String,
}

impl DexType {
    /// Creates a new type descriptor. Only the registry constructs these.
    pub(crate) fn new(token: Token, name: impl Into<String>) -> Self {
        DexType {
            token,
            name: name.into(),
        }
    }

    /// The interning token of this type
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The full descriptor of this type, e.g. `Lcom/app/Main;`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for DexType {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for DexType {}

impl std::hash::Hash for DexType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl fmt::Display for DexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
