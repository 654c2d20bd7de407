//! Static pruning of the cold-start set.
//!
//! A launch profile ages: classes it names may no longer be reachable from the rest
//! of the cold-start set after earlier optimization passes. Shipping them in the
//! cold-start containers wastes the budget those containers exist to protect, so the
//! pruner computes which profile classes nothing in the cold-start set still
//! references and hands them back to the driver, which places them with the
//! leftovers instead.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::interdex::profile::LaunchProfile;
use crate::metadata::class::{DexClassRc, DexClasses, DexInstruction};
use crate::metadata::diagnostics::{DiagnosticCategory, Diagnostics};
use crate::metadata::token::Token;

/// Resolves the class declaring the referent of an instruction.
fn referenced_class(
    insn: &DexInstruction,
    class_by_type: &FxHashMap<Token, DexClassRc>,
) -> Option<DexClassRc> {
    let ty = match insn {
        DexInstruction::Invoke(mref) => mref.owner(),
        DexInstruction::FieldOp(fref) => fref.owner(),
        DexInstruction::TypeOp(ty) => ty,
        DexInstruction::Plain => return None,
    };
    class_by_type.get(&ty.token()).cloned()
}

/// Computes the cold-start classes that no cold-start class references.
///
/// Starting from the classes the profile names, the fixpoint repeatedly collects the
/// set of cold-to-cold references (instruction referents of cold-start code, classes
/// that must keep their names, and the type closure over both) and prunes every
/// renameable cold-start class outside that set. The loop terminates because the
/// cold-start set shrinks monotonically.
///
/// Returns the empty set without doing any analysis when `static_prune_classes` is
/// off.
pub fn find_unreferenced_coldstart_classes(
    scope: &DexClasses,
    clookup: &FxHashMap<String, DexClassRc>,
    profile: &LaunchProfile,
    static_prune_classes: bool,
    class_by_type: &FxHashMap<Token, DexClassRc>,
    diagnostics: &Diagnostics,
) -> FxHashSet<DexClassRc> {
    let mut unreferenced_classes = FxHashSet::default();
    if !static_prune_classes {
        return unreferenced_classes;
    }

    let mut coldstart_classes = FxHashSet::default();
    for entry in profile.entries() {
        if let Some(clazz) = clookup.get(entry) {
            coldstart_classes.insert(clazz.clone());
        }
    }

    let mut old_no_ref = usize::MAX;
    let mut new_no_ref = 0;
    while old_no_ref != new_no_ref {
        old_no_ref = new_no_ref;

        let mut cold_cold_references = FxHashSet::default();

        // Instruction referents of cold-start code, own-class references excluded.
        for clazz in scope {
            if !coldstart_classes.contains(clazz) {
                continue;
            }
            for method in clazz.all_methods() {
                for insn in &method.code {
                    if let Some(called_cls) = referenced_class(insn, class_by_type) {
                        if &called_cls != clazz && coldstart_classes.contains(&called_cls) {
                            cold_cold_references.insert(called_cls);
                        }
                    }
                }
            }
        }

        // Classes which might be called from native code keep their names; never
        // drop them.
        for clazz in scope {
            if !clazz.can_rename() {
                cold_cold_references.insert(clazz.clone());
            }
        }

        // Pull in everything the reference set names through its types, even when no
        // opcode references it directly.
        let closure_seed: Vec<DexClassRc> = scope
            .iter()
            .filter(|clazz| cold_cold_references.contains(*clazz))
            .cloned()
            .collect();
        for clazz in closure_seed {
            let mut types = Vec::new();
            clazz.gather_types(&mut types);
            for ty in types {
                if let Some(ref_cls) = class_by_type.get(&ty.token()) {
                    cold_cold_references.insert(ref_cls.clone());
                }
            }
        }

        let mut kept = FxHashSet::default();
        for clazz in &coldstart_classes {
            if clazz.can_rename() && !cold_cold_references.contains(clazz) {
                unreferenced_classes.insert(clazz.clone());
            } else {
                kept.insert(clazz.clone());
            }
        }
        new_no_ref = unreferenced_classes.len();
        diagnostics.info(
            DiagnosticCategory::Prune,
            format!("found {new_no_ref} classes in coldstart with no references"),
        );
        coldstart_classes = kept;
    }

    unreferenced_classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::class::MethodAccessFlags;
    use crate::metadata::creator::ClassCreator;
    use crate::metadata::registry::RefRegistry;

    fn lookup_maps(
        scope: &DexClasses,
    ) -> (FxHashMap<String, DexClassRc>, FxHashMap<Token, DexClassRc>) {
        let mut clookup = FxHashMap::default();
        let mut class_by_type = FxHashMap::default();
        for clazz in scope {
            clookup.insert(clazz.name().to_string(), clazz.clone());
            class_by_type.insert(clazz.token(), clazz.clone());
        }
        (clookup, class_by_type)
    }

    #[test]
    fn test_disabled_returns_empty() {
        let registry = RefRegistry::new();
        let scope = vec![ClassCreator::new(&registry, "Lcom/app/A;").create()];
        let (clookup, class_by_type) = lookup_maps(&scope);
        let profile = LaunchProfile::new(vec!["Lcom/app/A;".to_string()]);
        let diagnostics = Diagnostics::new();

        let pruned = find_unreferenced_coldstart_classes(
            &scope,
            &clookup,
            &profile,
            false,
            &class_by_type,
            &diagnostics,
        );
        assert!(pruned.is_empty());
        assert!(!diagnostics.has_any());
    }

    #[test]
    fn test_orphans_are_pruned() {
        let registry = RefRegistry::new();
        let a = ClassCreator::new(&registry, "Lcom/app/A;").create();
        let b = ClassCreator::new(&registry, "Lcom/app/B;").create();
        let scope = vec![a.clone(), b.clone()];
        let (clookup, class_by_type) = lookup_maps(&scope);
        let profile =
            LaunchProfile::new(vec!["Lcom/app/A;".to_string(), "Lcom/app/B;".to_string()]);
        let diagnostics = Diagnostics::new();

        let pruned = find_unreferenced_coldstart_classes(
            &scope,
            &clookup,
            &profile,
            true,
            &class_by_type,
            &diagnostics,
        );
        assert!(pruned.contains(&a));
        assert!(pruned.contains(&b));
    }

    #[test]
    fn test_referenced_class_is_kept() {
        let registry = RefRegistry::new();
        let b_ty = registry.get_or_intern_type("Lcom/app/B;");
        let b_run = registry.intern_method(&b_ty, "run", "()V");

        // A survives through its rename bar; B survives because A's code calls it.
        let a = ClassCreator::new(&registry, "Lcom/app/A;")
            .keep_name()
            .direct_method(
                "main",
                "()V",
                MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
                vec![DexInstruction::Invoke(b_run)],
            )
            .create();
        let b = ClassCreator::new(&registry, "Lcom/app/B;").create();
        let scope = vec![a.clone(), b.clone()];
        let (clookup, class_by_type) = lookup_maps(&scope);
        let profile =
            LaunchProfile::new(vec!["Lcom/app/A;".to_string(), "Lcom/app/B;".to_string()]);
        let diagnostics = Diagnostics::new();

        let pruned = find_unreferenced_coldstart_classes(
            &scope,
            &clookup,
            &profile,
            true,
            &class_by_type,
            &diagnostics,
        );
        assert!(pruned.is_empty());
    }

    #[test]
    fn test_pruning_cascades_through_dropped_referencers() {
        let registry = RefRegistry::new();
        let b_ty = registry.get_or_intern_type("Lcom/app/B;");
        let b_run = registry.intern_method(&b_ty, "run", "()V");

        // A calls B.run but is itself unreferenced; once A is pruned its
        // reference no longer protects B.
        let a = ClassCreator::new(&registry, "Lcom/app/A;")
            .direct_method(
                "main",
                "()V",
                MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
                vec![DexInstruction::Invoke(b_run)],
            )
            .create();
        let b = ClassCreator::new(&registry, "Lcom/app/B;").create();
        let scope = vec![a.clone(), b.clone()];
        let (clookup, class_by_type) = lookup_maps(&scope);
        let profile =
            LaunchProfile::new(vec!["Lcom/app/A;".to_string(), "Lcom/app/B;".to_string()]);
        let diagnostics = Diagnostics::new();

        let pruned = find_unreferenced_coldstart_classes(
            &scope,
            &clookup,
            &profile,
            true,
            &class_by_type,
            &diagnostics,
        );
        assert!(pruned.contains(&a));
        assert!(pruned.contains(&b));
    }

    #[test]
    fn test_unrenameable_class_is_kept() {
        let registry = RefRegistry::new();
        let a = ClassCreator::new(&registry, "Lcom/app/A;").keep_name().create();
        let scope = vec![a.clone()];
        let (clookup, class_by_type) = lookup_maps(&scope);
        let profile = LaunchProfile::new(vec!["Lcom/app/A;".to_string()]);
        let diagnostics = Diagnostics::new();

        let pruned = find_unreferenced_coldstart_classes(
            &scope,
            &clookup,
            &profile,
            true,
            &class_by_type,
            &diagnostics,
        );
        assert!(pruned.is_empty());
    }

    #[test]
    fn test_type_closure_keeps_super() {
        let registry = RefRegistry::new();
        let base_ty = registry.get_or_intern_type("Lcom/app/Base;");

        // Main cannot be renamed, so its type closure (Base via super) survives.
        let main = ClassCreator::new(&registry, "Lcom/app/Main;")
            .set_super(base_ty)
            .keep_name()
            .create();
        let base = ClassCreator::new(&registry, "Lcom/app/Base;").create();
        let scope = vec![main.clone(), base.clone()];
        let (clookup, class_by_type) = lookup_maps(&scope);
        let profile = LaunchProfile::new(vec![
            "Lcom/app/Main;".to_string(),
            "Lcom/app/Base;".to_string(),
        ]);
        let diagnostics = Diagnostics::new();

        let pruned = find_unreferenced_coldstart_classes(
            &scope,
            &clookup,
            &profile,
            true,
            &class_by_type,
            &diagnostics,
        );
        assert!(!pruned.contains(&main));
        assert!(!pruned.contains(&base));
    }
}
