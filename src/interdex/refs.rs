//! Reference-set arithmetic.
//!
//! The capacity model works on sets of method and field references keyed by interning
//! token, so membership tests and unions hash a single `u32` per element. All
//! operations here are pure with respect to their inputs.

use std::hash::Hash;

use rustc_hash::FxHashSet;

use crate::interdex::plugin::InterDexPlugin;
use crate::metadata::class::DexClassRc;
use crate::metadata::refs::{FieldRefRc, MethodRefRc};

/// The method references accumulated for a container
pub type MethodRefs = FxHashSet<MethodRefRc>;

/// The field references accumulated for a container
pub type FieldRefs = FxHashSet<FieldRefRc>;

/// Collects the references `clazz` would pull into a container: its declared method
/// and field references plus whatever each plugin contributes.
pub fn gather_refs(
    plugins: &[Box<dyn InterDexPlugin>],
    clazz: &DexClassRc,
    mrefs: &mut MethodRefs,
    frefs: &mut FieldRefs,
) {
    let mut method_refs = Vec::new();
    let mut field_refs = Vec::new();
    clazz.gather_methods(&mut method_refs);
    clazz.gather_fields(&mut field_refs);
    for plugin in plugins {
        plugin.gather_mrefs(clazz, &mut method_refs, &mut field_refs);
    }
    mrefs.extend(method_refs);
    frefs.extend(field_refs);
}

/// Removes the elements of `b` from `a`. Runs in O(|a|), so it works best if
/// |a| << |b|.
pub fn set_difference<T>(a: &FxHashSet<T>, b: &FxHashSet<T>) -> FxHashSet<T>
where
    T: Eq + Hash + Clone,
{
    let mut result = FxHashSet::default();
    for v in a {
        if !b.contains(v) {
            result.insert(v.clone());
        }
    }
    result
}
