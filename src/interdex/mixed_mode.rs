//! Mixed-mode class bookkeeping.
//!
//! Callers may tag a set of classes for placement in one dedicated "mixed-mode"
//! container, tied to a status describing which container that should be (the first
//! cold-start dex, the first extended dex, or the scroll dex). The allocator consults
//! and consumes this set during the run: classes are removed as they are placed or as
//! touch permissions forbid moving them.

use std::fmt;

use rustc_hash::FxHashSet;
use strum::{Display, EnumIter};

use crate::metadata::class::DexClassRc;

/// Which container of the output sequence the mixed-mode dex should coincide with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DexStatus {
    /// The first container carrying cold-start classes
    FirstColdstartDex,
    /// The first container carrying extended-set classes
    FirstExtendedDex,
    /// The container carrying scroll classes
    ScrollDex,
}

/// The mixed-mode class set and its touch permissions.
#[derive(Debug, Default)]
pub struct MixedModeInfo {
    classes: FxHashSet<DexClassRc>,
    statuses: FxHashSet<DexStatus>,
    can_touch_coldstart_set: bool,
    can_touch_coldstart_extended_set: bool,
}

impl MixedModeInfo {
    /// Creates mixed-mode bookkeeping from a predefined class set.
    #[must_use]
    pub fn new(
        classes: impl IntoIterator<Item = DexClassRc>,
        statuses: impl IntoIterator<Item = DexStatus>,
        can_touch_coldstart_set: bool,
        can_touch_coldstart_extended_set: bool,
    ) -> Self {
        MixedModeInfo {
            classes: classes.into_iter().collect(),
            statuses: statuses.into_iter().collect(),
            can_touch_coldstart_set,
            can_touch_coldstart_extended_set,
        }
    }

    /// True if any predefined mixed-mode classes remain.
    #[must_use]
    pub fn has_predefined_classes(&self) -> bool {
        !self.classes.is_empty()
    }

    /// True if the class is currently tagged as mixed-mode.
    #[must_use]
    pub fn is_mixed_mode_class(&self, clazz: &DexClassRc) -> bool {
        self.classes.contains(clazz)
    }

    /// Removes a single class from the mixed-mode set.
    pub fn remove_mixed_mode_class(&mut self, clazz: &DexClassRc) {
        self.classes.remove(clazz);
    }

    /// Clears the entire mixed-mode set.
    pub fn remove_all_mixed_mode_classes(&mut self) {
        self.classes.clear();
    }

    /// The remaining mixed-mode classes, ordered by class token for deterministic
    /// iteration.
    #[must_use]
    pub fn mixed_mode_classes(&self) -> Vec<DexClassRc> {
        let mut classes: Vec<_> = self.classes.iter().cloned().collect();
        classes.sort_by_key(|c| c.token());
        classes
    }

    /// True if the given status was requested.
    #[must_use]
    pub fn has_status(&self, status: DexStatus) -> bool {
        self.statuses.contains(&status)
    }

    /// May cold-start classes be pulled out of their profile position?
    #[must_use]
    pub fn can_touch_coldstart_set(&self) -> bool {
        self.can_touch_coldstart_set
    }

    /// May extended-set classes be pulled out of their profile position?
    #[must_use]
    pub fn can_touch_coldstart_extended_set(&self) -> bool {
        self.can_touch_coldstart_extended_set
    }
}

impl fmt::Display for MixedModeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MixedModeInfo({} classes, touch coldstart: {}, touch extended: {})",
            self.classes.len(),
            self.can_touch_coldstart_set,
            self.can_touch_coldstart_extended_set
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::creator::ClassCreator;
    use crate::metadata::registry::RefRegistry;

    #[test]
    fn test_default_is_empty() {
        let info = MixedModeInfo::default();
        assert!(!info.has_predefined_classes());
        assert!(!info.has_status(DexStatus::ScrollDex));
        assert!(!info.can_touch_coldstart_set());
    }

    #[test]
    fn test_membership_and_removal() {
        let registry = RefRegistry::new();
        let a = ClassCreator::new(&registry, "Lcom/app/A;").create();
        let b = ClassCreator::new(&registry, "Lcom/app/B;").create();

        let mut info = MixedModeInfo::new(
            [a.clone(), b.clone()],
            [DexStatus::FirstExtendedDex],
            false,
            true,
        );
        assert!(info.is_mixed_mode_class(&a));
        assert!(info.has_status(DexStatus::FirstExtendedDex));
        assert!(!info.has_status(DexStatus::ScrollDex));

        info.remove_mixed_mode_class(&a);
        assert!(!info.is_mixed_mode_class(&a));
        assert!(info.has_predefined_classes());

        info.remove_all_mixed_mode_classes();
        assert!(!info.has_predefined_classes());
    }

    #[test]
    fn test_deterministic_iteration_order() {
        let registry = RefRegistry::new();
        let a = ClassCreator::new(&registry, "Lcom/app/A;").create();
        let b = ClassCreator::new(&registry, "Lcom/app/B;").create();
        let c = ClassCreator::new(&registry, "Lcom/app/C;").create();

        let info = MixedModeInfo::new([c, a, b], [], true, true);
        let ordered = info.mixed_mode_classes();
        let tokens: Vec<_> = ordered.iter().map(|c| c.token()).collect();
        let mut sorted = tokens.clone();
        sorted.sort();
        assert_eq!(tokens, sorted);
    }
}
