//! # interdex Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! traits of the library. Import it to get quick access to the essentials for
//! driving an allocation run.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all interdex operations
pub use crate::Error;

/// The result type used throughout interdex
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The allocation driver
pub use crate::interdex::{DexConfig, InterDex, InterDexConfig, InterDexPlugin};

/// Mixed-mode bookkeeping
pub use crate::interdex::{DexStatus, MixedModeInfo};

/// Run statistics
pub use crate::interdex::DexStats;

/// Side-channel asset file management
pub use crate::apk::ApkManager;

// ================================================================================================
// Metadata System - Core Types
// ================================================================================================

/// Interning token type for types and member references
pub use crate::metadata::token::{TableId, Token};

/// Class model types
pub use crate::metadata::class::{
    ClassAccessFlags, DexClass, DexClassRc, DexClasses, DexClassesVector, DexInstruction,
    DexMethod, MethodAccessFlags,
};

/// Class builder
pub use crate::metadata::creator::ClassCreator;

/// The interning registry
pub use crate::metadata::registry::RefRegistry;

/// Reference types
pub use crate::metadata::refs::{FieldRef, FieldRefRc, MethodRef, MethodRefRc};

/// Type descriptors
pub use crate::metadata::types::{DexType, DexTypeRc};

/// Diagnostics collection
pub use crate::metadata::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics,
};
