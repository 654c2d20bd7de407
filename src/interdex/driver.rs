//! The packing driver.
//!
//! A single pass walks the launch profile and the remaining scope, feeding classes to
//! the in-flight container through `emit_class`. Marker entries and capacity overflow
//! force container boundaries; the flush protocol closes a container by appending the
//! canary sentinel, collecting plugin contributions and verifying the predicted
//! reference sets. Residual classes, pruned cold-start classes and plugin leftovers
//! are swept up after the profile walk.
//!
//! # Container ordering
//!
//! The output sequence preserves: the primary container first, cold-start classes in
//! profile order (minus pruned ones), scroll classes contiguously, the mixed-mode
//! container at the last end marker (or at the tail of the profile walk when the
//! marker is absent), residual classes in scope order, and plugin leftovers last.

use std::io::Write;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::apk::ApkManager;
use crate::interdex::config::InterDexConfig;
use crate::interdex::estimator::estimate_linear_alloc;
use crate::interdex::mixed_mode::{DexStatus, MixedModeInfo};
use crate::interdex::plugin::{should_skip_class, InterDexPlugin};
use crate::interdex::profile::LaunchProfile;
use crate::interdex::pruner::find_unreferenced_coldstart_classes;
use crate::interdex::refs::{gather_refs, set_difference, FieldRefs, MethodRefs};
use crate::interdex::stats::DexStats;
use crate::interdex::tracker::DexEmitTracker;
use crate::metadata::class::{ClassAccessFlags, DexClassRc, DexClasses, DexClassesVector};
use crate::metadata::creator::ClassCreator;
use crate::metadata::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics,
};
use crate::metadata::registry::RefRegistry;
use crate::metadata::token::Token;
use crate::{Error, Result};

/// Hard limit on distinct method references per container
pub const MAX_METHOD_REFS: usize = 64 * 1024 - 1;
/// Hard limit on distinct field references per container
pub const MAX_FIELD_REFS: usize = 64 * 1024 - 1;
/// Name prefix shared by all canary sentinel classes
pub const CANARY_PREFIX: &str = "Lsecondary/dex";
/// Highest container index the canary naming scheme can express
pub const MAX_DEX_NUM: usize = 99;

/// Canary class name for the given container index, e.g. `Lsecondary/dex01/Canary;`.
fn canary_class_name(dexnum: usize) -> String {
    format!("Lsecondary/dex{dexnum:02}/Canary;")
}

/// True if the class is a canary sentinel.
fn is_canary(clazz: &DexClassRc) -> bool {
    clazz.name().starts_with(CANARY_PREFIX)
}

/// Flags describing which profile sections contributed to the in-flight container.
///
/// Advertised to the flush protocol, which uses them to count cold-start, extended
/// and scroll containers and to recognize the mixed-mode container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DexConfig {
    /// Container holds cold-start classes
    pub is_coldstart: bool,
    /// Container holds extended-set classes
    pub is_extended_set: bool,
    /// Container holds scroll classes
    pub has_scroll_cls: bool,
}

impl DexConfig {
    /// The all-false config used for containers outside any profile section.
    pub const EMPTY: DexConfig = DexConfig {
        is_coldstart: false,
        is_extended_set: false,
        has_scroll_cls: false,
    };

    /// Clears all flags.
    pub fn reset(&mut self) {
        *self = DexConfig::EMPTY;
    }
}

/// The inter-dex allocator.
///
/// Owns its inputs, counters and statistics for the duration of a run; see the
/// crate-level documentation for the overall data flow.
pub struct InterDex {
    registry: Arc<RefRegistry>,
    dexen: DexClassesVector,
    profile: LaunchProfile,
    mixed_mode_info: MixedModeInfo,
    apk_manager: ApkManager,
    config: InterDexConfig,
    plugins: Vec<Box<dyn InterDexPlugin>>,
    diagnostics: Arc<Diagnostics>,

    secondary_dexes: usize,
    coldstart_dexes: usize,
    extended_set_dexes: usize,
    scroll_dexes: usize,
    num_mixed_mode_dexes: usize,
    cold_start_set_dex_count: usize,
    scroll_set_dex_count: usize,
    stats: DexStats,
}

impl InterDex {
    /// Creates an allocator over the given input containers.
    ///
    /// `dexen[0]` is the primary container; `coldstart_classes` is the launch
    /// profile, possibly containing section markers.
    #[must_use]
    pub fn new(
        registry: Arc<RefRegistry>,
        dexen: DexClassesVector,
        coldstart_classes: Vec<String>,
        mixed_mode_info: MixedModeInfo,
        apk_manager: ApkManager,
        config: InterDexConfig,
        plugins: Vec<Box<dyn InterDexPlugin>>,
    ) -> Self {
        InterDex {
            registry,
            dexen,
            profile: LaunchProfile::new(coldstart_classes),
            mixed_mode_info,
            apk_manager,
            config,
            plugins,
            diagnostics: Arc::new(Diagnostics::new()),
            secondary_dexes: 0,
            coldstart_dexes: 0,
            extended_set_dexes: 0,
            scroll_dexes: 0,
            num_mixed_mode_dexes: 0,
            cold_start_set_dex_count: 0,
            scroll_set_dex_count: 0,
            stats: DexStats::default(),
        }
    }

    /// Statistics of the last run.
    #[must_use]
    pub fn stats(&self) -> &DexStats {
        &self.stats
    }

    /// Diagnostics collected so far.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Number of output containers holding the cold-start set after the last run.
    #[must_use]
    pub fn cold_start_set_dex_count(&self) -> usize {
        self.cold_start_set_dex_count
    }

    /// Number of output containers holding the scroll set after the last run.
    #[must_use]
    pub fn scroll_set_dex_count(&self) -> usize {
        self.scroll_set_dex_count
    }

    /// Executes the allocation pass and returns the output container sequence.
    ///
    /// # Errors
    ///
    /// Returns an error on any fatal invariant violation: capacity overflow in the
    /// frozen primary dex, container count past the canary naming limit, a second
    /// mixed-mode container, or an extended mixed-mode class that should have been
    /// cleared. I/O failures on the side-channel manifest also abort the run.
    pub fn run(&mut self) -> Result<DexClassesVector> {
        self.stats.reset();
        self.secondary_dexes = 0;
        self.coldstart_dexes = 0;
        self.extended_set_dexes = 0;
        self.scroll_dexes = 0;
        self.num_mixed_mode_dexes = 0;
        self.cold_start_set_dex_count = 0;
        self.scroll_set_dex_count = 0;

        let mut outdex = DexClassesVector::new();
        if self.dexen.is_empty() {
            return Ok(outdex);
        }

        let mut profile = self.profile.clone();

        let mut det = DexEmitTracker::new();
        for dex in &self.dexen {
            for clazz in dex {
                det.clookup.insert(clazz.name().to_string(), clazz.clone());
            }
        }

        let scope: DexClasses = self.dexen.iter().flatten().cloned().collect();
        let mut class_by_type: FxHashMap<Token, DexClassRc> = FxHashMap::default();
        for clazz in &scope {
            class_by_type.insert(clazz.token(), clazz.clone());
        }

        let unreferenced_classes = find_unreferenced_coldstart_classes(
            &scope,
            &det.clookup,
            &profile,
            self.config.static_prune_classes,
            &class_by_type,
            &self.diagnostics,
        );

        let primary_dex = self.dexen[0].clone();

        // The primary dex gets special treatment when we can't touch it: an isolated
        // tracker seeded with only its classes, flushed without a canary.
        if !self.config.normal_primary_dex {
            let mut primary_det = DexEmitTracker::new();
            for clazz in &primary_dex {
                primary_det
                    .clookup
                    .insert(clazz.name().to_string(), clazz.clone());
            }

            // First emit just the primary dex, sorted according to the profile order.
            let mut coldstart_classes_in_primary = 0;
            for entry in profile.entries() {
                let Some(clazz) = primary_det.clookup.get(entry.as_str()).cloned() else {
                    self.diagnostics.info(
                        DiagnosticCategory::Profile,
                        format!("no such entry {entry}"),
                    );
                    continue;
                };
                if unreferenced_classes.contains(&clazz) {
                    self.diagnostics.info(
                        DiagnosticCategory::Prune,
                        format!("{clazz} no longer linked to coldstart set"),
                    );
                    self.stats.cls_skipped_in_primary += 1;
                    continue;
                }
                self.emit_class(&mut primary_det, &mut outdex, &clazz, &DexConfig::EMPTY, true, true)?;
                coldstart_classes_in_primary += 1;
            }
            // Now add the rest.
            for clazz in &primary_dex {
                self.emit_class(&mut primary_det, &mut outdex, clazz, &DexConfig::EMPTY, true, true)?;
            }
            self.diagnostics.info(
                DiagnosticCategory::Emit,
                format!(
                    "{coldstart_classes_in_primary} out of {} classes in primary dex in interdex list",
                    primary_det.outs.len()
                ),
            );
            self.flush_out_dex(&mut primary_det, &mut outdex);

            // Record the primary dex classes in the main tracker, so they are not
            // emitted again.
            for clazz in &primary_dex {
                det.emitted.insert(clazz.clone());
            }
        }

        // If we have end markers, we use them to demarcate the end of the cold-start
        // set. Otherwise we calculate it on the basis of the whole list.
        let mut end_markers_present = false;

        if self.config.normal_primary_dex && !profile.is_empty() {
            // The primary dex is modified like any other, but its classes still have
            // to load first: any primary class that is not in the profile before the
            // first end marker moves to the head of the list.
            if profile.first_end().is_none() {
                self.diagnostics.info(
                    DiagnosticCategory::Profile,
                    "couldn't find first dex end marker",
                );
            }
            let mut not_already_included = Vec::new();
            for pclass in &primary_dex {
                let in_order = match (profile.position(pclass.name()), profile.first_end()) {
                    (None, _) => false,
                    (Some(pos), Some(first_end)) => pos < first_end,
                    (Some(_), None) => true,
                };
                if in_order {
                    self.diagnostics.info(
                        DiagnosticCategory::Profile,
                        format!("class {pclass} is in the interdex order, no change required"),
                    );
                } else {
                    self.diagnostics.info(
                        DiagnosticCategory::Profile,
                        format!("class {pclass} is not in the interdex order"),
                    );
                    not_already_included.push(pclass.name().to_string());
                }
            }
            profile.prepend(not_already_included);
        }

        // We know we start with the coldstart set whenever we have a profile.
        let mut dconfig = DexConfig {
            is_coldstart: !profile.is_empty(),
            ..DexConfig::EMPTY
        };
        let mut previous_dex = self.secondary_dexes;

        for idx in 0..profile.len() {
            let entry = profile.entries()[idx].clone();
            let Some(clazz) = det.clookup.get(entry.as_str()).cloned() else {
                self.diagnostics.info(
                    DiagnosticCategory::Profile,
                    format!("no such entry {entry}"),
                );
                if LaunchProfile::is_end_marker(&entry) {
                    self.diagnostics.info(
                        DiagnosticCategory::Profile,
                        "terminating dex due to DexEndMarker",
                    );
                    self.flush_out_secondary(&mut det, &mut outdex, &dconfig, false)?;
                    if !end_markers_present {
                        self.cold_start_set_dex_count = outdex.len();
                    }
                    end_markers_present = true;

                    if profile.is_last_end(idx) && self.mixed_mode_info.has_predefined_classes() {
                        // Emit the mixed-mode dex between the coldstart set and the
                        // extended set of classes.
                        let can_touch_interdex_order = self.mixed_mode_info.can_touch_coldstart_set()
                            || self.mixed_mode_info.can_touch_coldstart_extended_set();
                        self.emit_mixed_mode_classes(
                            &profile,
                            &mut det,
                            &mut outdex,
                            can_touch_interdex_order,
                        )?;
                    }
                }
                if self.config.emit_scroll_set_marker && profile.is_scroll_end(idx) {
                    // Have a separate dex for scroll.
                    self.flush_out_secondary(&mut det, &mut outdex, &dconfig, false)?;
                    self.scroll_set_dex_count = outdex.len() - self.secondary_dexes;
                }
                continue;
            };

            // If we can't touch coldstart classes, simply remove the class from the
            // mixed-mode class list; otherwise it would move into the mixed-mode dex.
            if !self.mixed_mode_info.can_touch_coldstart_set()
                && self.mixed_mode_info.is_mixed_mode_class(&clazz)
            {
                if profile.before_last_end(idx) {
                    self.diagnostics.info(
                        DiagnosticCategory::MixedMode,
                        format!(
                            "{clazz} is part of coldstart classes, removing it from the list of mixed mode classes"
                        ),
                    );
                    self.mixed_mode_info.remove_mixed_mode_class(&clazz);
                } else if !self.mixed_mode_info.can_touch_coldstart_extended_set() {
                    return Err(Error::MixedModeOrder(clazz.name().to_string()));
                }
            }

            if unreferenced_classes.contains(&clazz) {
                self.diagnostics.info(
                    DiagnosticCategory::Prune,
                    format!("{clazz} no longer linked to coldstart set"),
                );
                self.stats.cls_skipped_in_secondary += 1;
                continue;
            }

            if previous_dex != self.secondary_dexes {
                dconfig.reset();
                previous_dex = self.secondary_dexes;
            }

            // Only the last emit_class per dex reaches flush_out_secondary, which is
            // what checks the dex flags. Coldstart is separated by a flush of its
            // own, so it is safe to recompute per class; extended and scroll
            // accumulate per dex.
            dconfig.is_coldstart = profile.cold_start_section(idx);
            dconfig.is_extended_set |= profile.extended_section(idx);
            dconfig.has_scroll_cls |= profile.in_scroll(idx);

            self.emit_class(&mut det, &mut outdex, &clazz, &dconfig, false, true)?;
        }

        if self.mixed_mode_info.has_predefined_classes() && !profile.last_end_found() {
            // No delimiter found; the mixed-mode classes go right after the profile
            // walk.
            self.diagnostics.info(
                DiagnosticCategory::MixedMode,
                "emitting the mixed mode dex after the interdex order",
            );
            let can_touch_interdex_order = self.mixed_mode_info.can_touch_coldstart_set()
                || self.mixed_mode_info.can_touch_coldstart_extended_set();
            self.emit_mixed_mode_classes(&profile, &mut det, &mut outdex, can_touch_interdex_order)?;
        }

        // Now emit the classes omitted from the original coldstart set.
        for entry in profile.entries() {
            let Some(clazz) = det.clookup.get(entry.as_str()).cloned() else {
                continue;
            };
            if unreferenced_classes.contains(&clazz) {
                self.emit_class(&mut det, &mut outdex, &clazz, &DexConfig::EMPTY, false, true)?;
            }
        }

        if !end_markers_present {
            self.cold_start_set_dex_count = outdex.len();
            self.scroll_set_dex_count = 0;
        }

        // Now emit the classes that weren't specified in the head or primary list.
        for clazz in &scope {
            self.emit_class(&mut det, &mut outdex, clazz, &DexConfig::EMPTY, false, true)?;
        }

        let leftover_classes: DexClasses = self
            .plugins
            .iter()
            .flat_map(|plugin| plugin.leftover_classes())
            .collect();
        for clazz in &leftover_classes {
            self.diagnostics.info(
                DiagnosticCategory::Emit,
                format!("emitting plugin generated leftover class {clazz}"),
            );
            self.emit_class(&mut det, &mut outdex, clazz, &DexConfig::EMPTY, false, false)?;
        }

        // Finally, flush the left-over pending classes.
        if !det.outs.is_empty() {
            self.flush_out_secondary(&mut det, &mut outdex, &DexConfig::EMPTY, false)?;
        }

        self.diagnostics.info(
            DiagnosticCategory::Flush,
            format!(
                "secondary dex count {}",
                outdex.len().saturating_sub(1)
            ),
        );
        self.diagnostics.info(
            DiagnosticCategory::Flush,
            format!(
                "global stats: {} mrefs, {} frefs, {} cls, {} dmeth, {} smeth, {} vmeth",
                self.stats.methref_count,
                self.stats.fieldref_count,
                self.stats.cls_count,
                self.stats.dmeth_count,
                self.stats.smeth_count,
                self.stats.vmeth_count
            ),
        );
        self.diagnostics.info(
            DiagnosticCategory::Prune,
            format!(
                "removed {} classes from coldstart list in primary dex, {} in secondary dexes due to static analysis",
                self.stats.cls_skipped_in_primary, self.stats.cls_skipped_in_secondary
            ),
        );

        Ok(outdex)
    }

    /// Tries to fit `clazz` into the in-flight container. If that would overflow a
    /// capacity limit, the container is flushed as a secondary first and `clazz`
    /// starts the next one.
    fn emit_class(
        &mut self,
        det: &mut DexEmitTracker,
        outdex: &mut DexClassesVector,
        clazz: &DexClassRc,
        dconfig: &DexConfig,
        is_primary: bool,
        check_if_skip: bool,
    ) -> Result<()> {
        if det.emitted.contains(clazz) || is_canary(clazz) {
            return Ok(());
        }
        if check_if_skip && should_skip_class(&self.plugins, clazz) {
            self.diagnostics
                .info(DiagnosticCategory::Emit, format!("skipping class {clazz}"));
            return Ok(());
        }
        if !is_primary && check_if_skip && self.mixed_mode_info.is_mixed_mode_class(clazz) {
            self.diagnostics.info(
                DiagnosticCategory::Emit,
                format!("skipping mixed mode class {clazz}"),
            );
            return Ok(());
        }

        let laclazz = u64::from(estimate_linear_alloc(clazz));

        // The extra method and field refs the current dex would need if clazz were
        // defined in it.
        let mut clazz_mrefs = MethodRefs::default();
        let mut clazz_frefs = FieldRefs::default();
        gather_refs(&self.plugins, clazz, &mut clazz_mrefs, &mut clazz_frefs);
        let extra_mrefs = set_difference(&clazz_mrefs, &det.mrefs);
        let extra_frefs = set_difference(&clazz_frefs, &det.frefs);

        // If those extra refs would overflow, start a new dex. The ref comparisons
        // stay at >= to keep one slot of headroom for plugin additions and the
        // canary class at flush time.
        if det.la_size + laclazz > self.config.linear_alloc_limit
            || det.mrefs.len() + extra_mrefs.len() >= MAX_METHOD_REFS
            || det.frefs.len() + extra_frefs.len() >= MAX_FIELD_REFS
        {
            if is_primary {
                return Err(Error::PrimaryOverflow {
                    la_size: det.la_size + laclazz,
                    la_limit: self.config.linear_alloc_limit,
                    mrefs: det.mrefs.len() + extra_mrefs.len(),
                    mref_limit: MAX_METHOD_REFS,
                    frefs: det.frefs.len() + extra_frefs.len(),
                    fref_limit: MAX_FIELD_REFS,
                });
            }
            self.flush_out_secondary(det, outdex, dconfig, false)?;
        }

        det.mrefs.extend(clazz_mrefs);
        det.frefs.extend(clazz_frefs);
        det.la_size += laclazz;
        det.outs.push(clazz.clone());
        det.emitted.insert(clazz.clone());
        self.stats.update_class(clazz);
        Ok(())
    }

    /// Closes the in-flight container unconditionally: collects plugin
    /// contributions, verifies the predicted reference sets, appends the container
    /// to the output sequence and resets the tracker.
    fn flush_out_dex(&mut self, det: &mut DexEmitTracker, outdex: &mut DexClassesVector) {
        let mut dc: DexClasses = det.outs.clone();
        for plugin in &self.plugins {
            let add_classes = plugin.additional_classes(outdex, &det.outs);
            for add_class in &add_classes {
                self.diagnostics.info(
                    DiagnosticCategory::Emit,
                    format!("emitting plugin-generated class {add_class}"),
                );
                det.emitted.insert(add_class.clone());
            }
            dc.extend(add_classes);
        }
        self.check_refs_count(det, &dc);

        outdex.push(dc);

        self.stats
            .update_dex(det.outs.len(), det.mrefs.len(), det.frefs.len());
        det.start_new_dex();
    }

    /// Closes the in-flight container as a secondary dex: updates the section
    /// counters, appends the canary sentinel (synthesizing one when the input has
    /// none), records the mixed-mode container in the side-channel manifest and
    /// delegates to [`InterDex::flush_out_dex`].
    ///
    /// A flush with no pending classes is a no-op and does not consume a container
    /// index.
    fn flush_out_secondary(
        &mut self,
        det: &mut DexEmitTracker,
        outdex: &mut DexClassesVector,
        dconfig: &DexConfig,
        mixed_mode_dex: bool,
    ) -> Result<()> {
        if det.outs.is_empty() {
            return Ok(());
        }

        let mixed_mode_dex = mixed_mode_dex || self.is_mixed_mode_dex(dconfig);

        self.secondary_dexes += 1;
        if dconfig.is_coldstart {
            self.coldstart_dexes += 1;
        }
        if dconfig.is_extended_set {
            self.extended_set_dexes += 1;
        }
        if dconfig.has_scroll_cls {
            self.scroll_dexes += 1;
        }
        self.diagnostics.info(
            DiagnosticCategory::Flush,
            format!(
                "writing out secondary dex number {}, which is {} of coldstart, {} of extended set, {} scroll classes",
                self.secondary_dexes,
                if dconfig.is_coldstart { "part" } else { "not part" },
                if dconfig.is_extended_set { "part" } else { "not part" },
                if dconfig.has_scroll_cls { "has" } else { "doesn't have" }
            ),
        );

        if self.config.emit_canaries {
            let dexnum = outdex.len();
            if dexnum > MAX_DEX_NUM {
                return Err(Error::DexLimit(dexnum));
            }
            let canary_name = canary_class_name(dexnum);
            match det.clookup.get(canary_name.as_str()).cloned() {
                Some(clazz) => det.outs.push(clazz),
                None => {
                    // The class doesn't exist; this happens whenever the run grows
                    // the number of dexes.
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            DiagnosticCategory::Canary,
                            "no canary class found, synthesizing one",
                        )
                        .with_class(canary_name.clone())
                        .with_dex_index(dexnum),
                    );
                    let canary_cls = ClassCreator::new(&self.registry, &canary_name)
                        .set_access(
                            ClassAccessFlags::PUBLIC
                                | ClassAccessFlags::INTERFACE
                                | ClassAccessFlags::ABSTRACT,
                        )
                        .set_super(self.registry.object_type())
                        .create();
                    det.outs.push(canary_cls);
                }
            }

            if mixed_mode_dex {
                if self.num_mixed_mode_dexes != 0 {
                    return Err(Error::MixedModeDexCount);
                }
                self.diagnostics.info(
                    DiagnosticCategory::MixedMode,
                    format!(
                        "secondary dex {} is considered for mixed mode",
                        self.secondary_dexes
                    ),
                );
                self.num_mixed_mode_dexes += 1;
                let mut mixed_mode_file = self.apk_manager.new_asset_file("mixed_mode.txt")?;
                writeln!(mixed_mode_file, "{canary_name}")?;
            }
        }

        self.flush_out_dex(det, outdex);
        Ok(())
    }

    /// Emits the dedicated mixed-mode container.
    ///
    /// Mixed-mode classes appearing in the profile keep their relative order (and
    /// are only moved at all when the touch permissions allow it); the remaining
    /// ones follow, and the whole set is cleared afterwards.
    fn emit_mixed_mode_classes(
        &mut self,
        profile: &LaunchProfile,
        det: &mut DexEmitTracker,
        outdex: &mut DexClassesVector,
        can_touch_interdex_order: bool,
    ) -> Result<()> {
        // Coldstart mixed-mode classes were already removed when they could not be
        // touched; whatever remains in the set here is movable or extended.
        for entry in profile.entries() {
            let Some(clazz) = det.clookup.get(entry.as_str()).cloned() else {
                continue;
            };
            if self.mixed_mode_info.is_mixed_mode_class(&clazz) {
                if can_touch_interdex_order {
                    self.diagnostics.info(
                        DiagnosticCategory::MixedMode,
                        format!("emitting mixed mode class {clazz}, which is also in the interdex list"),
                    );
                    self.emit_class(det, outdex, &clazz, &DexConfig::EMPTY, false, false)?;
                }
                self.mixed_mode_info.remove_mixed_mode_class(&clazz);
            }
        }

        for clazz in self.mixed_mode_info.mixed_mode_classes() {
            if !det.clookup.contains_key(clazz.name()) {
                self.diagnostics.warning(
                    DiagnosticCategory::MixedMode,
                    format!("ignoring mixed mode class {clazz} as it is not found in dexes"),
                );
                continue;
            }
            self.diagnostics.info(
                DiagnosticCategory::MixedMode,
                format!("emitting mixed mode class {clazz}"),
            );
            self.emit_class(det, outdex, &clazz, &DexConfig::EMPTY, false, false)?;
        }

        if !det.outs.is_empty() {
            self.flush_out_secondary(det, outdex, &DexConfig::EMPTY, true)?;
        }

        self.mixed_mode_info.remove_all_mixed_mode_classes();
        Ok(())
    }

    /// True exactly when the container being flushed is the first of a section the
    /// mixed-mode status asked for. The section counters are read before the same
    /// flush increments them.
    fn is_mixed_mode_dex(&self, dconfig: &DexConfig) -> bool {
        if self.coldstart_dexes == 0
            && dconfig.is_coldstart
            && self.mixed_mode_info.has_status(DexStatus::FirstColdstartDex)
        {
            return true;
        }

        if self.extended_set_dexes == 0
            && dconfig.is_extended_set
            && self.mixed_mode_info.has_status(DexStatus::FirstExtendedDex)
        {
            return true;
        }

        if self.scroll_dexes == 0
            && dconfig.has_scroll_cls
            && self.mixed_mode_info.has_status(DexStatus::ScrollDex)
        {
            return true;
        }

        false
    }

    /// Sanity check: did emission accounting predict all the refs that ended up in
    /// the finished container?
    fn check_refs_count(&self, det: &DexEmitTracker, dc: &DexClasses) {
        let mut mrefs_vec = Vec::new();
        for clazz in dc {
            clazz.gather_methods(&mut mrefs_vec);
        }
        let mrefs_set: FxHashSet<_> = mrefs_vec.into_iter().collect();
        if mrefs_set.len() > det.mrefs.len() {
            for mref in &mrefs_set {
                if !det.mrefs.contains(mref) {
                    self.diagnostics.warning(
                        DiagnosticCategory::Flush,
                        format!("could not find {mref} in predicted mrefs set"),
                    );
                }
            }
        }

        let mut frefs_vec = Vec::new();
        for clazz in dc {
            clazz.gather_fields(&mut frefs_vec);
        }
        let frefs_set: FxHashSet<_> = frefs_vec.into_iter().collect();
        if frefs_set.len() > det.frefs.len() {
            for fref in &frefs_set {
                if !det.frefs.contains(fref) {
                    self.diagnostics.warning(
                        DiagnosticCategory::Flush,
                        format!("could not find {fref} in predicted frefs set"),
                    );
                }
            }
        }

        self.diagnostics.info(
            DiagnosticCategory::Flush,
            format!(
                "terminating dex at classes {}, lin alloc {}:{}, mrefs {}:{}:{}, frefs {}:{}:{}",
                det.outs.len(),
                det.la_size,
                self.config.linear_alloc_limit,
                det.mrefs.len(),
                mrefs_set.len(),
                MAX_METHOD_REFS,
                det.frefs.len(),
                frefs_set.len(),
                MAX_FIELD_REFS
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canary_class_name_zero_padded() {
        assert_eq!(canary_class_name(1), "Lsecondary/dex01/Canary;");
        assert_eq!(canary_class_name(42), "Lsecondary/dex42/Canary;");
    }

    #[test]
    fn test_is_canary_by_prefix() {
        let registry = RefRegistry::new();
        let canary = ClassCreator::new(&registry, "Lsecondary/dex03/Canary;").create();
        let plain = ClassCreator::new(&registry, "Lcom/app/A;").create();
        assert!(is_canary(&canary));
        assert!(!is_canary(&plain));
    }

    #[test]
    fn test_dex_config_reset() {
        let mut dconfig = DexConfig {
            is_coldstart: true,
            is_extended_set: true,
            has_scroll_cls: true,
        };
        dconfig.reset();
        assert_eq!(dconfig, DexConfig::EMPTY);
    }
}
