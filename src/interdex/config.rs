//! Configuration for an allocation run.

/// Controls the allocation pass: capacity budget, primary-dex handling, pruning and
/// marker behavior.
#[derive(Debug, Clone)]
pub struct InterDexConfig {
    /// Linear-alloc budget per container (default: 11600 KiB).
    pub linear_alloc_limit: u64,

    /// Drop cold-start classes no longer referenced from the cold-start set
    /// (default: false).
    pub static_prune_classes: bool,

    /// Treat the primary dex as a normal dex, reordering its classes into the
    /// cold-start section instead of freezing it (default: false).
    pub normal_primary_dex: bool,

    /// Append a canary sentinel class to every secondary container (default: true).
    pub emit_canaries: bool,

    /// Close a dedicated container at the scroll-list end marker (default: false).
    pub emit_scroll_set_marker: bool,
}

impl Default for InterDexConfig {
    fn default() -> Self {
        InterDexConfig {
            linear_alloc_limit: 11600 * 1024,
            static_prune_classes: false,
            normal_primary_dex: false,
            emit_canaries: true,
            emit_scroll_set_marker: false,
        }
    }
}
