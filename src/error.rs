use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can
/// potentially return.
///
/// Fatal invariant violations of the allocator surface as dedicated variants so that
/// callers can distinguish a broken input contract from an environmental failure.
/// Recoverable anomalies never surface here; they are collected in
/// [`crate::metadata::diagnostics::Diagnostics`] while execution continues.
///
/// # Error Categories
///
/// ## Allocation Invariant Violations
/// - [`Error::PrimaryOverflow`] - A class could not fit into the frozen primary dex
/// - [`Error::DexLimit`] - More containers requested than the canary naming scheme allows
/// - [`Error::MixedModeDexCount`] - A second mixed-mode container was requested
/// - [`Error::MixedModeOrder`] - An extended-section mixed-mode class survived past the
///   point where it should have been cleared
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors from the side-channel asset manager
#[derive(Error, Debug)]
pub enum Error {
    /// Emitting a class into the primary dex would overflow one of its capacity limits.
    ///
    /// The primary dex is frozen: its class set must not spill into a secondary
    /// container. The payload names all three capacity values at the point of failure.
    #[error("would have to do an early flush on the primary dex - la {la_size}:{la_limit}, mrefs {mrefs}:{mref_limit}, frefs {frefs}:{fref_limit}")]
    PrimaryOverflow {
        /// Linear-alloc estimate the primary dex would reach with the class added
        la_size: u64,
        /// Configured linear-alloc limit per dex
        la_limit: u64,
        /// Method-ref count the primary dex would reach with the class added
        mrefs: usize,
        /// Hard method-ref limit per dex
        mref_limit: usize,
        /// Field-ref count the primary dex would reach with the class added
        frefs: usize,
        /// Hard field-ref limit per dex
        fref_limit: usize,
    },

    /// The output sequence grew past the canary naming limit.
    ///
    /// Canary class names encode a two-digit dex index, which caps the number of
    /// secondary containers at [`crate::interdex::MAX_DEX_NUM`].
    #[error("max dex number surpassed: {0}")]
    DexLimit(usize),

    /// A second mixed-mode container was requested within a single run.
    ///
    /// Only one mixed-mode dex is accepted; downstream tooling resolves the
    /// `mixed_mode.txt` manifest against exactly one canary name.
    #[error("only one mixed mode dex is accepted per run")]
    MixedModeDexCount,

    /// An extended-section mixed-mode class was reached after the mixed-mode dex had
    /// already been emitted and cleared.
    #[error("mixed mode class {0} in the extended section should have been cleared when emitting the mixed mode dex")]
    MixedModeOrder(String),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors raised while opening or appending to side-channel
    /// asset files.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
