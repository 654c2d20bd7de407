//! The dex class model consumed by the allocator.
//!
//! This module provides the entities the packing algorithm operates on: interned
//! types and member references with identity semantics, class definitions with their
//! member lists and code items, a builder for synthesizing classes, and the
//! diagnostics container recoverable anomalies are reported to.
//!
//! # Key Components
//!
//! - [`token`] - Interning tokens; value equality is identity equality
//! - [`types`] - Interned type descriptors
//! - [`refs`] - Method and field references
//! - [`registry`] - The interning authority handing out tokens
//! - [`class`] - Class definitions, access flags, and the gather primitives
//! - [`creator`] - Fluent builder for class definitions
//! - [`diagnostics`] - Collection of recoverable anomalies

/// Implementation of class definitions and their member model
pub mod class;
/// Implementation of the fluent class builder
pub mod creator;
/// Implementation of the diagnostics collector
pub mod diagnostics;
/// Implementation of method and field references
pub mod refs;
/// Implementation of the interning registry
pub mod registry;
/// Commonly used interning token type
pub mod token;
/// Implementation of interned type descriptors
pub mod types;
