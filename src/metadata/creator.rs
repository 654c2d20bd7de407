//! Builder for class definitions.
//!
//! [`ClassCreator`] offers a fluent API for constructing [`DexClass`] instances
//! against a [`RefRegistry`]. The allocator uses it to synthesize canary sentinel
//! classes; loaders and test fixtures use it to assemble inputs.
//!
//! # Example
//!
//! ```rust
//! use interdex::metadata::creator::ClassCreator;
//! use interdex::metadata::class::ClassAccessFlags;
//! use interdex::metadata::registry::RefRegistry;
//!
//! let registry = RefRegistry::new();
//! let cls = ClassCreator::new(&registry, "Lcom/app/Main;")
//!     .set_access(ClassAccessFlags::PUBLIC)
//!     .set_super(registry.object_type())
//!     .create();
//! assert_eq!(cls.name(), "Lcom/app/Main;");
//! ```

use std::sync::Arc;

use crate::metadata::class::{
    ClassAccessFlags, DexClass, DexClassRc, DexInstruction, DexMethod, MethodAccessFlags,
};
use crate::metadata::refs::FieldRefRc;
use crate::metadata::registry::RefRegistry;
use crate::metadata::types::DexTypeRc;

/// Provides a fluent API for building class definitions
pub struct ClassCreator<'a> {
    registry: &'a RefRegistry,
    ty: DexTypeRc,
    access: ClassAccessFlags,
    super_class: Option<DexTypeRc>,
    interfaces: Vec<DexTypeRc>,
    dmethods: Vec<DexMethod>,
    vmethods: Vec<DexMethod>,
    ifields: Vec<FieldRefRc>,
    sfields: Vec<FieldRefRc>,
    can_rename: bool,
}

impl<'a> ClassCreator<'a> {
    /// Starts building a class with the given descriptor.
    ///
    /// The type is interned immediately; the class itself materializes on
    /// [`ClassCreator::create`].
    #[must_use]
    pub fn new(registry: &'a RefRegistry, name: &str) -> Self {
        ClassCreator {
            registry,
            ty: registry.get_or_intern_type(name),
            access: ClassAccessFlags::PUBLIC,
            super_class: None,
            interfaces: Vec::new(),
            dmethods: Vec::new(),
            vmethods: Vec::new(),
            ifields: Vec::new(),
            sfields: Vec::new(),
            can_rename: true,
        }
    }

    /// Sets the access flags
    #[must_use]
    pub fn set_access(mut self, access: ClassAccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Sets the super class
    #[must_use]
    pub fn set_super(mut self, super_class: DexTypeRc) -> Self {
        self.super_class = Some(super_class);
        self
    }

    /// Adds an implemented interface
    #[must_use]
    pub fn implements(mut self, interface: DexTypeRc) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Marks the class as not renameable (kept by the cold-start pruner)
    #[must_use]
    pub fn keep_name(mut self) -> Self {
        self.can_rename = false;
        self
    }

    /// Adds a direct method with the given code items
    #[must_use]
    pub fn direct_method(
        mut self,
        name: &str,
        proto: &str,
        access: MethodAccessFlags,
        code: Vec<DexInstruction>,
    ) -> Self {
        let id = self.registry.intern_method(&self.ty, name, proto);
        self.dmethods.push(DexMethod::new(id, access, code));
        self
    }

    /// Adds a virtual method with the given code items
    #[must_use]
    pub fn virtual_method(
        mut self,
        name: &str,
        proto: &str,
        access: MethodAccessFlags,
        code: Vec<DexInstruction>,
    ) -> Self {
        let id = self.registry.intern_method(&self.ty, name, proto);
        self.vmethods.push(DexMethod::new(id, access, code));
        self
    }

    /// Adds an instance field
    #[must_use]
    pub fn ifield(mut self, name: &str) -> Self {
        let id = self.registry.intern_field(&self.ty, name);
        self.ifields.push(id);
        self
    }

    /// Adds a static field
    #[must_use]
    pub fn sfield(mut self, name: &str) -> Self {
        let id = self.registry.intern_field(&self.ty, name);
        self.sfields.push(id);
        self
    }

    /// Materializes the class definition.
    #[must_use]
    pub fn create(self) -> DexClassRc {
        Arc::new(DexClass {
            ty: self.ty,
            super_class: self.super_class,
            interfaces: self.interfaces,
            access_flags: self.access,
            dmethods: self.dmethods,
            vmethods: self.vmethods,
            ifields: self.ifields,
            sfields: self.sfields,
            can_rename: self.can_rename,
        })
    }
}
