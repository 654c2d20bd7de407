//! Plugin contract for the allocator.
//!
//! Plugins observe and influence the class stream without owning the packing logic:
//! they can veto classes, contribute extra references that emission accounting must
//! reserve room for, append generated classes to a container being flushed, and hand
//! over leftovers at the end of the run.
//!
//! Plugins are borrowed for the duration of a [`crate::interdex::InterDex::run`] and
//! never retained beyond it.

use crate::metadata::class::{DexClassRc, DexClasses, DexClassesVector};
use crate::metadata::refs::{FieldRefRc, MethodRefRc};

/// A plugin participating in an allocation run.
///
/// All operations are assumed total; panics propagate to the caller of
/// [`crate::interdex::InterDex::run`]. Default implementations make every operation
/// a no-op, so implementors only override what they need.
pub trait InterDexPlugin {
    /// Should this class be withheld from regular emission?
    ///
    /// Skipped classes do not appear in any output container unless the plugin
    /// reintroduces them through [`InterDexPlugin::leftover_classes`].
    fn should_skip_class(&self, _clazz: &DexClassRc) -> bool {
        false
    }

    /// Contributes additional method and field references a class will pull into its
    /// container beyond what its own code declares.
    ///
    /// Called during emission accounting; the contributed references count against
    /// the container's capacity limits.
    fn gather_mrefs(
        &self,
        _clazz: &DexClassRc,
        _mrefs: &mut Vec<MethodRefRc>,
        _frefs: &mut Vec<FieldRefRc>,
    ) {
    }

    /// Classes to append to the container currently being flushed.
    ///
    /// `outdex` is the output sequence so far, `current` the ordered classes of the
    /// container being closed. Returned classes are recorded as emitted.
    fn additional_classes(
        &self,
        _outdex: &DexClassesVector,
        _current: &[DexClassRc],
    ) -> DexClasses {
        Vec::new()
    }

    /// Classes the plugin still wants placed after the main pass.
    ///
    /// Emitted at the tail of the run, bypassing skip checks.
    fn leftover_classes(&self) -> DexClasses {
        Vec::new()
    }
}

/// True if any plugin vetoes the class.
pub(crate) fn should_skip_class(
    plugins: &[Box<dyn InterDexPlugin>],
    clazz: &DexClassRc,
) -> bool {
    plugins.iter().any(|plugin| plugin.should_skip_class(clazz))
}
