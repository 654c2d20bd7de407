//! Linear-alloc estimation.
//!
//! The runtime reserves linear-alloc space per class for vtables, method records and
//! instance-field records. The allocator cannot measure that exactly ahead of time;
//! this estimator reproduces the conservative heuristic of the classic dalvik stats
//! tooling so that container boundaries land where that tooling expects them.

use crate::metadata::class::DexClassRc;

/// Default vtable penalty when no suffix pattern matches
pub const OBJECT_VTABLE: u32 = 48;
/// Linear-alloc bytes per method record
pub const METHOD_SIZE: u32 = 52;
/// Linear-alloc bytes per instance-field record
pub const INSTANCE_FIELD_SIZE: u32 = 16;
/// Linear-alloc bytes per vtable slot
pub const VTABLE_SLOT_SIZE: u32 = 4;

/// Suffix patterns carrying a vtable penalty for framework-derived classes.
const PENALTY_PATTERNS: [(&str, u32); 4] = [
    ("Layout;", 1500),
    ("View;", 1500),
    ("ViewGroup;", 1800),
    ("Activity;", 1500),
];

/// Returns the vtable penalty for `name` if a suffix pattern matches. Patterns are
/// tried in table order; the first match wins.
fn matches_penalty(name: &str) -> Option<u32> {
    PENALTY_PATTERNS
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|&(_, penalty)| penalty)
}

/// Estimates the linear alloc space consumed by the class at runtime.
///
/// Interfaces carry no vtable. For everything else the vtable penalty is looked up
/// against the class's own name first, then against its super class's name, falling
/// back to [`OBJECT_VTABLE`].
#[must_use]
pub fn estimate_linear_alloc(clazz: &DexClassRc) -> u32 {
    let mut lasize = 0;
    if !clazz.is_interface() {
        let mut vtable_penalty = OBJECT_VTABLE;
        match matches_penalty(clazz.name()) {
            Some(penalty) => vtable_penalty = penalty,
            None => {
                if let Some(super_class) = clazz.super_class() {
                    if let Some(penalty) = matches_penalty(super_class.name()) {
                        vtable_penalty = penalty;
                    }
                }
            }
        }
        lasize += vtable_penalty;
        lasize += clazz.vmethods().len() as u32 * VTABLE_SLOT_SIZE;
    }
    lasize += clazz.dmethods().len() as u32 * METHOD_SIZE;
    lasize += clazz.vmethods().len() as u32 * METHOD_SIZE;
    lasize += clazz.ifields().len() as u32 * INSTANCE_FIELD_SIZE;
    lasize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::class::{ClassAccessFlags, MethodAccessFlags};
    use crate::metadata::creator::ClassCreator;
    use crate::metadata::registry::RefRegistry;

    #[test]
    fn test_plain_class_gets_object_vtable() {
        let registry = RefRegistry::new();
        let cls = ClassCreator::new(&registry, "Lcom/app/Plain;").create();
        assert_eq!(estimate_linear_alloc(&cls), OBJECT_VTABLE);
    }

    #[test]
    fn test_interface_has_no_vtable() {
        let registry = RefRegistry::new();
        let cls = ClassCreator::new(&registry, "Lcom/app/Iface;")
            .set_access(ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE)
            .create();
        assert_eq!(estimate_linear_alloc(&cls), 0);
    }

    #[test]
    fn test_own_name_penalty_wins() {
        let registry = RefRegistry::new();
        let cls = ClassCreator::new(&registry, "Lcom/app/MainActivity;").create();
        assert_eq!(estimate_linear_alloc(&cls), 1500);
    }

    #[test]
    fn test_viewgroup_penalty() {
        let registry = RefRegistry::new();
        let cls = ClassCreator::new(&registry, "Lcom/app/FeedViewGroup;").create();
        assert_eq!(estimate_linear_alloc(&cls), 1800);
    }

    #[test]
    fn test_super_name_penalty_used_on_miss() {
        let registry = RefRegistry::new();
        let super_ty = registry.get_or_intern_type("Landroid/view/View;");
        let cls = ClassCreator::new(&registry, "Lcom/app/Widget;")
            .set_super(super_ty)
            .create();
        assert_eq!(estimate_linear_alloc(&cls), 1500);
    }

    #[test]
    fn test_member_contributions() {
        let registry = RefRegistry::new();
        let cls = ClassCreator::new(&registry, "Lcom/app/Members;")
            .direct_method("<init>", "()V", MethodAccessFlags::PUBLIC, Vec::new())
            .virtual_method("go", "()V", MethodAccessFlags::PUBLIC, Vec::new())
            .ifield("count")
            .create();
        // 48 vtable + 1 slot * 4 + 2 methods * 52 + 1 field * 16
        assert_eq!(
            estimate_linear_alloc(&cls),
            OBJECT_VTABLE + VTABLE_SLOT_SIZE + 2 * METHOD_SIZE + INSTANCE_FIELD_SIZE
        );
    }
}
