//! Class model for the allocator.
//!
//! A [`DexClass`] is the unit the allocator places into containers. It exposes exactly
//! the surface the packing algorithm needs: member lists for the linear-alloc
//! estimate, gather operations for reference-set accounting, the super type for the
//! vtable-penalty heuristic, and the rename permission consulted by the cold-start
//! pruner.
//!
//! # Key Types
//! - [`ClassAccessFlags`], [`MethodAccessFlags`]: dex access flag bitfields
//! - [`DexInstruction`]: the iteration primitive the pruner walks
//! - [`DexMethod`]: a defined method with its code items
//! - [`DexClass`]: the class definition itself
//!
//! Class identity is the identity of its type token; two classes with the same
//! interned type are the same class as far as emission bookkeeping is concerned.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::metadata::refs::{FieldRefRc, MethodRefRc};
use crate::metadata::token::Token;
use crate::metadata::types::DexTypeRc;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Class-level dex access flags
    pub struct ClassAccessFlags: u32 {
        /// Class is public
        const PUBLIC = 0x0001;
        /// Class is final
        const FINAL = 0x0010;
        /// Class is an interface
        const INTERFACE = 0x0200;
        /// Class is abstract
        const ABSTRACT = 0x0400;
        /// Class is compiler-synthesized
        const SYNTHETIC = 0x1000;
        /// Class is an enum
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method-level dex access flags
    pub struct MethodAccessFlags: u32 {
        /// Method is public
        const PUBLIC = 0x0001;
        /// Method is private
        const PRIVATE = 0x0002;
        /// Method is static
        const STATIC = 0x0008;
        /// Method is final
        const FINAL = 0x0010;
        /// Method is native
        const NATIVE = 0x0100;
        /// Method is abstract
        const ABSTRACT = 0x0400;
        /// Method is a constructor
        const CONSTRUCTOR = 0x10000;
    }
}

/// One instruction of a method body, reduced to its reference payload.
///
/// The allocator never interprets opcodes; it only needs to know which pool entry an
/// instruction names, so code items are modeled as their operand kind.
#[derive(Debug, Clone)]
pub enum DexInstruction {
    /// An invoke-style instruction naming a method reference
    Invoke(MethodRefRc),
    /// A field access instruction naming a field reference
    FieldOp(FieldRefRc),
    /// A type-referencing instruction (`new-instance`, `check-cast`, `const-class`, ...)
    TypeOp(DexTypeRc),
    /// Any instruction without a pool operand
    Plain,
}

/// A method defined by a class, with its code items.
#[derive(Debug, Clone)]
pub struct DexMethod {
    /// Identity of the method in the `method_ids` pool
    pub id: MethodRefRc,
    /// Access flags of the definition
    pub access_flags: MethodAccessFlags,
    /// Code items, empty for abstract and native methods
    pub code: Vec<DexInstruction>,
}

impl DexMethod {
    /// Creates a method definition.
    #[must_use]
    pub fn new(id: MethodRefRc, access_flags: MethodAccessFlags, code: Vec<DexInstruction>) -> Self {
        DexMethod {
            id,
            access_flags,
            code,
        }
    }

    /// True if the method is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }
}

/// A reference-counted pointer to a [`DexClass`]
pub type DexClassRc = Arc<DexClass>;

/// An ordered list of classes forming one output container ("dex")
pub type DexClasses = Vec<DexClassRc>;

/// The ordered sequence of output containers produced by an allocation run
pub type DexClassesVector = Vec<DexClasses>;

/// A class definition.
///
/// Constructed through [`crate::metadata::creator::ClassCreator`]; immutable
/// afterwards. The allocator never mutates classes.
#[derive(Debug)]
pub struct DexClass {
    pub(crate) ty: DexTypeRc,
    pub(crate) super_class: Option<DexTypeRc>,
    pub(crate) interfaces: Vec<DexTypeRc>,
    pub(crate) access_flags: ClassAccessFlags,
    pub(crate) dmethods: Vec<DexMethod>,
    pub(crate) vmethods: Vec<DexMethod>,
    pub(crate) ifields: Vec<FieldRefRc>,
    pub(crate) sfields: Vec<FieldRefRc>,
    pub(crate) can_rename: bool,
}

impl DexClass {
    /// The interned type of this class
    #[must_use]
    pub fn ty(&self) -> &DexTypeRc {
        &self.ty
    }

    /// The full descriptor of this class, e.g. `Lcom/app/Main;`
    #[must_use]
    pub fn name(&self) -> &str {
        self.ty.name()
    }

    /// The super class type, if any
    #[must_use]
    pub fn super_class(&self) -> Option<&DexTypeRc> {
        self.super_class.as_ref()
    }

    /// Access flags of this class
    #[must_use]
    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    /// True if the class is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }

    /// True if the class may be renamed.
    ///
    /// Classes reachable from native code or reflection must keep their names; the
    /// cold-start pruner treats them as always referenced.
    #[must_use]
    pub fn can_rename(&self) -> bool {
        self.can_rename
    }

    /// Direct methods (static, private, constructors) defined by this class
    #[must_use]
    pub fn dmethods(&self) -> &[DexMethod] {
        &self.dmethods
    }

    /// Virtual methods defined by this class
    #[must_use]
    pub fn vmethods(&self) -> &[DexMethod] {
        &self.vmethods
    }

    /// Instance fields defined by this class
    #[must_use]
    pub fn ifields(&self) -> &[FieldRefRc] {
        &self.ifields
    }

    /// Static fields defined by this class
    #[must_use]
    pub fn sfields(&self) -> &[FieldRefRc] {
        &self.sfields
    }

    /// Iterates all defined methods, direct first.
    pub fn all_methods(&self) -> impl Iterator<Item = &DexMethod> {
        self.dmethods.iter().chain(self.vmethods.iter())
    }

    /// Collects every method reference this class would pull into a dex: the ids of
    /// its own methods plus every invoke operand in its code.
    pub fn gather_methods(&self, refs: &mut Vec<MethodRefRc>) {
        for method in self.all_methods() {
            refs.push(method.id.clone());
            for insn in &method.code {
                if let DexInstruction::Invoke(mref) = insn {
                    refs.push(mref.clone());
                }
            }
        }
    }

    /// Collects every field reference this class would pull into a dex: its own
    /// instance and static fields plus every field-access operand in its code.
    pub fn gather_fields(&self, refs: &mut Vec<FieldRefRc>) {
        refs.extend(self.ifields.iter().cloned());
        refs.extend(self.sfields.iter().cloned());
        for method in self.all_methods() {
            for insn in &method.code {
                if let DexInstruction::FieldOp(fref) = insn {
                    refs.push(fref.clone());
                }
            }
        }
    }

    /// Collects every type this class refers to: super class, interfaces, type
    /// operands in code, and the owners of gathered method/field references.
    pub fn gather_types(&self, types: &mut Vec<DexTypeRc>) {
        if let Some(super_class) = &self.super_class {
            types.push(super_class.clone());
        }
        types.extend(self.interfaces.iter().cloned());
        types.extend(self.ifields.iter().map(|f| f.owner().clone()));
        types.extend(self.sfields.iter().map(|f| f.owner().clone()));
        for method in self.all_methods() {
            types.push(method.id.owner().clone());
            for insn in &method.code {
                match insn {
                    DexInstruction::Invoke(mref) => types.push(mref.owner().clone()),
                    DexInstruction::FieldOp(fref) => types.push(fref.owner().clone()),
                    DexInstruction::TypeOp(ty) => types.push(ty.clone()),
                    DexInstruction::Plain => {}
                }
            }
        }
    }

    /// Identity token of this class (its type token).
    #[must_use]
    pub fn token(&self) -> Token {
        self.ty.token()
    }
}

impl PartialEq for DexClass {
    fn eq(&self, other: &Self) -> bool {
        self.ty.token() == other.ty.token()
    }
}

impl Eq for DexClass {}

impl std::hash::Hash for DexClass {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ty.token().hash(state);
    }
}

impl fmt::Display for DexClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
