//! Mutable state for the in-progress output container.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::interdex::refs::{FieldRefs, MethodRefs};
use crate::metadata::class::DexClassRc;

/// Tracks the container currently being filled and the emission history of the run.
///
/// `start_new_dex` resets only the in-flight part; the name lookup and the set of
/// classes already placed into any container survive container boundaries.
#[derive(Debug, Default)]
pub struct DexEmitTracker {
    /// Ordered classes pending in the current container
    pub outs: Vec<DexClassRc>,
    /// Method references accumulated for `outs`
    pub mrefs: MethodRefs,
    /// Field references accumulated for `outs`
    pub frefs: FieldRefs,
    /// Accumulated linear-alloc estimate for `outs`
    pub la_size: u64,
    /// Name to class lookup over the input scope; immutable after initial build
    pub clookup: FxHashMap<String, DexClassRc>,
    /// Classes already placed into any prior or current container
    pub emitted: FxHashSet<DexClassRc>,
}

impl DexEmitTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        DexEmitTracker::default()
    }

    /// Closes out the current container state.
    ///
    /// Clears the pending classes, both reference sets and the linear-alloc
    /// accumulator; `emitted` and `clookup` are left untouched.
    pub fn start_new_dex(&mut self) {
        self.outs.clear();
        self.mrefs.clear();
        self.frefs.clear();
        self.la_size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::creator::ClassCreator;
    use crate::metadata::registry::RefRegistry;

    #[test]
    fn test_start_new_dex_keeps_history() {
        let registry = RefRegistry::new();
        let a = ClassCreator::new(&registry, "Lcom/app/A;").create();
        let ty = registry.get_or_intern_type("Lcom/app/B;");
        let mref = registry.intern_method(&ty, "run", "()V");

        let mut tracker = DexEmitTracker::new();
        tracker.clookup.insert(a.name().to_string(), a.clone());
        tracker.outs.push(a.clone());
        tracker.mrefs.insert(mref);
        tracker.la_size = 100;
        tracker.emitted.insert(a.clone());

        tracker.start_new_dex();

        assert!(tracker.outs.is_empty());
        assert!(tracker.mrefs.is_empty());
        assert!(tracker.frefs.is_empty());
        assert_eq!(tracker.la_size, 0);
        assert!(tracker.emitted.contains(&a));
        assert!(tracker.clookup.contains_key("Lcom/app/A;"));
    }
}
