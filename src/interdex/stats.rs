//! Aggregate statistics of an allocation run.

use crate::metadata::class::DexClassRc;

/// Counters accumulated over one [`crate::interdex::InterDex::run`].
///
/// Owned by the driver instance and reset at the top of each run, so repeated runs
/// and concurrent driver instances never share counter state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DexStats {
    /// Classes placed across all output containers
    pub cls_count: usize,
    /// Direct methods across all placed classes
    pub dmeth_count: usize,
    /// Static methods among the direct methods
    pub smeth_count: usize,
    /// Virtual methods across all placed classes
    pub vmeth_count: usize,
    /// Distinct method references summed over containers
    pub methref_count: usize,
    /// Distinct field references summed over containers
    pub fieldref_count: usize,
    /// Cold-start classes dropped from the primary dex by the pruner
    pub cls_skipped_in_primary: usize,
    /// Cold-start classes dropped from secondary dexes by the pruner
    pub cls_skipped_in_secondary: usize,
}

impl DexStats {
    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = DexStats::default();
    }

    /// Accounts one placed class.
    pub fn update_class(&mut self, clazz: &DexClassRc) {
        self.smeth_count += clazz
            .dmethods()
            .iter()
            .filter(|method| method.is_static())
            .count();
        self.dmeth_count += clazz.dmethods().len();
        self.vmeth_count += clazz.vmethods().len();
    }

    /// Accounts one flushed container.
    pub fn update_dex(&mut self, cls_cnt: usize, methrefs_cnt: usize, frefs_cnt: usize) {
        self.cls_count += cls_cnt;
        self.methref_count += methrefs_cnt;
        self.fieldref_count += frefs_cnt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::class::MethodAccessFlags;
    use crate::metadata::creator::ClassCreator;
    use crate::metadata::registry::RefRegistry;

    #[test]
    fn test_update_class_counts_static_methods() {
        let registry = RefRegistry::new();
        let cls = ClassCreator::new(&registry, "Lcom/app/A;")
            .direct_method(
                "init",
                "()V",
                MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
                Vec::new(),
            )
            .direct_method("<init>", "()V", MethodAccessFlags::CONSTRUCTOR, Vec::new())
            .virtual_method("go", "()V", MethodAccessFlags::PUBLIC, Vec::new())
            .create();

        let mut stats = DexStats::default();
        stats.update_class(&cls);
        assert_eq!(stats.dmeth_count, 2);
        assert_eq!(stats.smeth_count, 1);
        assert_eq!(stats.vmeth_count, 1);
    }

    #[test]
    fn test_reset() {
        let mut stats = DexStats {
            cls_count: 3,
            ..DexStats::default()
        };
        stats.update_dex(2, 10, 5);
        stats.reset();
        assert_eq!(stats, DexStats::default());
    }
}
