// Copyright 2025-2026 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # interdex
//!
//! An inter-dex class allocator: partitions a large set of compiled classes across an
//! ordered sequence of output dex containers, each of which has hard capacity limits on
//! the number of method references, field references, and an estimated linear-alloc
//! budget. Classes named in a launch profile (the cold-start order) are placed in the
//! earliest containers, marker-delimited subsets land in dedicated containers, and
//! canary sentinel classes identify each secondary container for downstream tooling.
//!
//! # Architecture
//!
//! The library is organized into two layers that work together to produce a dex layout:
//!
//! - **Metadata Layer**: The class model the allocator consumes — interned types,
//!   method/field references with identity semantics, access flags, and synthetic
//!   class creation
//! - **Allocator Layer**: The packing state machine — capacity tracking, the
//!   cold-start pruner, marker-driven container boundaries, mixed-mode scheduling,
//!   and the container-flush protocol
//!
//! ## Key Components
//!
//! - [`crate::interdex::InterDex`] - Main entry point, drives a full allocation run
//! - [`crate::interdex::InterDexPlugin`] - Extension point for skipping, augmenting
//!   and contributing classes
//! - [`crate::metadata`] - Class, reference and type model with interning registry
//! - [`crate::metadata::diagnostics`] - Collection of recoverable anomalies observed
//!   during a run
//! - [`crate::prelude`] - Convenient re-exports of commonly used types
//! - [`crate::Error`] and [`crate::Result`] - Comprehensive error handling
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use interdex::prelude::*;
//!
//! let registry = Arc::new(RefRegistry::new());
//! let classes = vec![
//!     ClassCreator::new(&registry, "Lcom/app/Main;").create(),
//!     ClassCreator::new(&registry, "Lcom/app/Feed;").create(),
//! ];
//!
//! let mut interdex = InterDex::new(
//!     registry,
//!     vec![classes],
//!     vec!["Lcom/app/Main;".to_string()],
//!     MixedModeInfo::default(),
//!     ApkManager::new("assets"),
//!     InterDexConfig::default(),
//!     Vec::new(),
//! );
//! let dexen = interdex.run()?;
//! println!("emitted {} dexes", dexen.len());
//! # Ok::<(), interdex::Error>(())
//! ```
//!
//! # Determinism
//!
//! A run is a single synchronous pass, deterministic in its inputs. All counters and
//! statistics are owned by the [`crate::interdex::InterDex`] instance and reset at the
//! top of each run.

/// Side-channel asset file management (`mixed_mode.txt` and friends)
pub mod apk;
mod error;
/// The allocator core: tracker, pruner, flusher, driver and mixed-mode scheduler
pub mod interdex;
/// The dex class model: tokens, types, references, classes and diagnostics
pub mod metadata;
/// Convenient re-exports of the most commonly used types
pub mod prelude;

pub use error::{Error, Result};
pub use interdex::InterDex;
