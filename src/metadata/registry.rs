//! Interning registry for types, method references and field references.
//!
//! The [`RefRegistry`] is the single authority handing out [`Token`]s. Every distinct
//! type descriptor, `(owner, name, proto)` method triple and `(owner, name)` field pair
//! is interned exactly once, which is what makes token equality identity equality for
//! the whole class model.
//!
//! # Thread Safety
//!
//! The registry is lock-free for its hot paths: entities live in
//! [`crossbeam_skiplist::SkipMap`]s keyed by token, name lookups go through
//! [`dashmap::DashMap`]s, and row indices are allocated from per-pool atomics. The
//! allocator itself is single-threaded, but class-model construction (loaders, test
//! fixtures, plugins) may happen concurrently.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::metadata::{
    refs::{FieldRef, FieldRefRc, MethodRef, MethodRefRc},
    token::{TableId, Token},
    types::{DexType, DexTypeRc},
};

/// Descriptor of the root object type, the default super class.
pub const OBJECT_TYPE_NAME: &str = "Ljava/lang/Object;";

/// Interning authority for the dex class model.
///
/// Rows are allocated starting at 1 so that the null token never collides with an
/// interned entity.
pub struct RefRegistry {
    types: SkipMap<Token, DexTypeRc>,
    methods: SkipMap<Token, MethodRefRc>,
    fields: SkipMap<Token, FieldRefRc>,

    type_names: DashMap<String, Token>,
    method_keys: DashMap<(Token, String, String), Token>,
    field_keys: DashMap<(Token, String), Token>,

    next_type_row: AtomicU32,
    next_method_row: AtomicU32,
    next_field_row: AtomicU32,
}

impl Default for RefRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RefRegistry {
    /// Creates a new registry with the object type pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let registry = RefRegistry {
            types: SkipMap::new(),
            methods: SkipMap::new(),
            fields: SkipMap::new(),
            type_names: DashMap::new(),
            method_keys: DashMap::new(),
            field_keys: DashMap::new(),
            next_type_row: AtomicU32::new(1),
            next_method_row: AtomicU32::new(1),
            next_field_row: AtomicU32::new(1),
        };
        registry.get_or_intern_type(OBJECT_TYPE_NAME);
        registry
    }

    /// Returns the interned type for `name`, creating it if necessary.
    pub fn get_or_intern_type(&self, name: &str) -> DexTypeRc {
        if let Some(existing) = self.type_names.get(name) {
            if let Some(entry) = self.types.get(existing.value()) {
                return entry.value().clone();
            }
        }

        let entry = self.type_names.entry(name.to_string()).or_insert_with(|| {
            let token = Token::from_parts(
                TableId::TypeId,
                self.next_type_row.fetch_add(1, Ordering::Relaxed),
            );
            self.types
                .insert(token, Arc::new(DexType::new(token, name)));
            token
        });
        let token = *entry.value();
        drop(entry);
        self.types
            .get(&token)
            .map(|e| e.value().clone())
            .unwrap_or_else(|| unreachable!("type interned above"))
    }

    /// Looks up an already-interned type by descriptor.
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<DexTypeRc> {
        let token = *self.type_names.get(name)?.value();
        self.types.get(&token).map(|e| e.value().clone())
    }

    /// The pre-registered object type (`Ljava/lang/Object;`).
    #[must_use]
    pub fn object_type(&self) -> DexTypeRc {
        self.type_by_name(OBJECT_TYPE_NAME)
            .unwrap_or_else(|| unreachable!("object type registered at construction"))
    }

    /// Returns the interned method reference for `(owner, name, proto)`, creating it
    /// if necessary.
    pub fn intern_method(&self, owner: &DexTypeRc, name: &str, proto: &str) -> MethodRefRc {
        let key = (owner.token(), name.to_string(), proto.to_string());
        let entry = self.method_keys.entry(key).or_insert_with(|| {
            let token = Token::from_parts(
                TableId::MethodId,
                self.next_method_row.fetch_add(1, Ordering::Relaxed),
            );
            self.methods
                .insert(token, Arc::new(MethodRef::new(token, owner.clone(), name, proto)));
            token
        });
        let token = *entry.value();
        drop(entry);
        self.methods
            .get(&token)
            .map(|e| e.value().clone())
            .unwrap_or_else(|| unreachable!("method interned above"))
    }

    /// Returns the interned field reference for `(owner, name)`, creating it if
    /// necessary.
    pub fn intern_field(&self, owner: &DexTypeRc, name: &str) -> FieldRefRc {
        let key = (owner.token(), name.to_string());
        let entry = self.field_keys.entry(key).or_insert_with(|| {
            let token = Token::from_parts(
                TableId::FieldId,
                self.next_field_row.fetch_add(1, Ordering::Relaxed),
            );
            self.fields
                .insert(token, Arc::new(FieldRef::new(token, owner.clone(), name)));
            token
        });
        let token = *entry.value();
        drop(entry);
        self.fields
            .get(&token)
            .map(|e| e.value().clone())
            .unwrap_or_else(|| unreachable!("field interned above"))
    }

    /// Number of interned types
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of interned method references
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Number of interned field references
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl std::fmt::Debug for RefRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefRegistry")
            .field("types", &self.types.len())
            .field("methods", &self.methods.len())
            .field("fields", &self.fields.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_interning_is_identity() {
        let registry = RefRegistry::new();
        let a = registry.get_or_intern_type("Lcom/app/A;");
        let b = registry.get_or_intern_type("Lcom/app/A;");
        assert_eq!(a.token(), b.token());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_object_type_preregistered() {
        let registry = RefRegistry::new();
        assert_eq!(registry.object_type().name(), OBJECT_TYPE_NAME);
        assert_eq!(registry.type_count(), 1);
    }

    #[test]
    fn test_method_interning_dedups_by_triple() {
        let registry = RefRegistry::new();
        let owner = registry.get_or_intern_type("Lcom/app/A;");
        let m1 = registry.intern_method(&owner, "run", "()V");
        let m2 = registry.intern_method(&owner, "run", "()V");
        let m3 = registry.intern_method(&owner, "run", "(I)V");
        assert_eq!(m1.token(), m2.token());
        assert_ne!(m1.token(), m3.token());
        assert_eq!(registry.method_count(), 2);
    }

    #[test]
    fn test_field_interning_dedups_by_pair() {
        let registry = RefRegistry::new();
        let a = registry.get_or_intern_type("Lcom/app/A;");
        let b = registry.get_or_intern_type("Lcom/app/B;");
        let f1 = registry.intern_field(&a, "value");
        let f2 = registry.intern_field(&a, "value");
        let f3 = registry.intern_field(&b, "value");
        assert_eq!(f1.token(), f2.token());
        assert_ne!(f1.token(), f3.token());
    }

    #[test]
    fn test_tokens_carry_pool_codes() {
        let registry = RefRegistry::new();
        let ty = registry.get_or_intern_type("Lcom/app/A;");
        let method = registry.intern_method(&ty, "run", "()V");
        let field = registry.intern_field(&ty, "value");
        assert_eq!(ty.token().table(), TableId::TypeId as u8);
        assert_eq!(method.token().table(), TableId::MethodId as u8);
        assert_eq!(field.token().table(), TableId::FieldId as u8);
    }
}
