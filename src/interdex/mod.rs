//! The allocator core.
//!
//! This module implements the packing algorithm with marker-driven partitioning: the
//! capacity model over reference sets and the linear-alloc estimate, the launch
//! profile with its section markers, the cold-start pruning fixpoint, the plugin
//! contract, the container-flush protocol with canary insertion, and the driver
//! state machine tying them together.
//!
//! # Key Components
//!
//! - [`driver`] - The [`InterDex`] driver, flush protocol and mixed-mode scheduler
//! - [`tracker`] - Mutable state of the in-progress container
//! - [`estimator`] - Conservative linear-alloc estimation per class
//! - [`pruner`] - Static pruning of stale cold-start classes
//! - [`profile`] - Launch profile with pre-computed marker positions
//! - [`plugin`] - The extension contract plugins implement
//! - [`mixed_mode`] - Bookkeeping for the dedicated mixed-mode container
//! - [`refs`] - Reference-set arithmetic backing the capacity model
//! - [`stats`] - Aggregate statistics of a run

/// Implementation of the run configuration
pub mod config;
/// Implementation of the packing driver and flush protocol
pub mod driver;
/// Implementation of the linear-alloc estimator
pub mod estimator;
/// Implementation of mixed-mode class bookkeeping
pub mod mixed_mode;
/// Implementation of the plugin contract
pub mod plugin;
/// Implementation of the launch profile and marker positions
pub mod profile;
/// Implementation of the cold-start pruning fixpoint
pub mod pruner;
/// Implementation of reference-set arithmetic
pub mod refs;
/// Implementation of run statistics
pub mod stats;
/// Implementation of the emit tracker
pub mod tracker;

pub use config::InterDexConfig;
pub use driver::{DexConfig, InterDex, CANARY_PREFIX, MAX_DEX_NUM, MAX_FIELD_REFS, MAX_METHOD_REFS};
pub use mixed_mode::{DexStatus, MixedModeInfo};
pub use plugin::InterDexPlugin;
pub use stats::DexStats;
