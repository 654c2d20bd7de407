//! Launch profile and marker positions.
//!
//! The launch profile is an ordered list of class descriptors, optionally interleaved
//! with section markers. Marker positions are resolved once at construction; every
//! section query afterwards is a position comparison against those pre-computed
//! indices, where an absent marker compares as "past the end".

/// First end marker; terminates the primary cold-start section.
pub const FIRST_END_MARKER: &str = "LDexEndMarker0;";
/// Last end marker; terminates the extended cold-start section.
pub const LAST_END_MARKER: &str = "LDexEndMarker1;";
/// Opens the scroll subset.
pub const SCROLL_LIST_START: &str = "LScrollListStart;";
/// Closes the scroll subset.
pub const SCROLL_LIST_END: &str = "LScrollListEnd;";

/// Fragment shared by both end markers; entries containing it force a container flush.
const END_MARKER_FRAGMENT: &str = "DexEndMarker";

/// The launch profile with pre-computed marker positions.
#[derive(Debug, Clone, Default)]
pub struct LaunchProfile {
    entries: Vec<String>,
    first_end: Option<usize>,
    last_end: Option<usize>,
    scroll_start: Option<usize>,
    scroll_end: Option<usize>,
}

impl LaunchProfile {
    /// Builds a profile from the raw cold-start order.
    #[must_use]
    pub fn new(entries: Vec<String>) -> Self {
        let mut profile = LaunchProfile {
            entries,
            ..LaunchProfile::default()
        };
        profile.locate_markers();
        profile
    }

    fn locate_markers(&mut self) {
        self.first_end = self.position(FIRST_END_MARKER);
        self.last_end = self.position(LAST_END_MARKER);
        self.scroll_start = self.position(SCROLL_LIST_START);
        self.scroll_end = self.position(SCROLL_LIST_END);
    }

    /// Index of the first entry equal to `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry == name)
    }

    /// The profile entries in order
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries, markers included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the profile has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the entry is one of the end markers (matched on the shared fragment).
    #[must_use]
    pub fn is_end_marker(entry: &str) -> bool {
        entry.contains(END_MARKER_FRAGMENT)
    }

    /// True if `idx` is the position of the last end marker.
    #[must_use]
    pub fn is_last_end(&self, idx: usize) -> bool {
        self.last_end == Some(idx)
    }

    /// True if `idx` is the position of the scroll-end marker.
    #[must_use]
    pub fn is_scroll_end(&self, idx: usize) -> bool {
        self.scroll_end == Some(idx)
    }

    /// True if the last end marker exists.
    #[must_use]
    pub fn last_end_found(&self) -> bool {
        self.last_end.is_some()
    }

    /// Position of the first end marker, if present.
    #[must_use]
    pub fn first_end(&self) -> Option<usize> {
        self.first_end
    }

    /// True if `idx` lies in the cold-start section: at or before the last end
    /// marker, or anywhere when that marker is absent.
    #[must_use]
    pub fn cold_start_section(&self, idx: usize) -> bool {
        match self.last_end {
            None => true,
            Some(last_end) => last_end >= idx,
        }
    }

    /// True if `idx` lies in the extended section, strictly after the last end
    /// marker. Always false when that marker is absent.
    #[must_use]
    pub fn extended_section(&self, idx: usize) -> bool {
        match self.last_end {
            None => false,
            Some(last_end) => last_end < idx,
        }
    }

    /// True if `idx` lies strictly between the scroll markers.
    #[must_use]
    pub fn in_scroll(&self, idx: usize) -> bool {
        match (self.scroll_start, self.scroll_end) {
            (Some(start), Some(end)) => start < idx && idx < end,
            _ => false,
        }
    }

    /// True if `idx` precedes the last end marker, or the marker is absent.
    #[must_use]
    pub fn before_last_end(&self, idx: usize) -> bool {
        match self.last_end {
            None => true,
            Some(last_end) => last_end > idx,
        }
    }

    /// Prepends entries to the front of the profile and re-resolves markers.
    pub fn prepend(&mut self, names: Vec<String>) {
        let mut entries = names;
        entries.append(&mut self.entries);
        self.entries = entries;
        self.locate_markers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(entries: &[&str]) -> LaunchProfile {
        LaunchProfile::new(entries.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_marker_positions() {
        let p = profile(&[
            "LA;",
            "LDexEndMarker0;",
            "LScrollListStart;",
            "LB;",
            "LScrollListEnd;",
            "LDexEndMarker1;",
            "LC;",
        ]);
        assert_eq!(p.first_end(), Some(1));
        assert!(p.is_last_end(5));
        assert!(p.is_scroll_end(4));
        assert!(p.last_end_found());
    }

    #[test]
    fn test_end_marker_fragment() {
        assert!(LaunchProfile::is_end_marker("LDexEndMarker0;"));
        assert!(LaunchProfile::is_end_marker("LDexEndMarker1;"));
        assert!(!LaunchProfile::is_end_marker("LScrollListEnd;"));
        assert!(!LaunchProfile::is_end_marker("Lcom/app/A;"));
    }

    #[test]
    fn test_sections_with_all_markers() {
        let p = profile(&[
            "LA;",
            "LScrollListStart;",
            "LB;",
            "LScrollListEnd;",
            "LDexEndMarker1;",
            "LC;",
        ]);
        assert!(p.cold_start_section(0));
        assert!(p.cold_start_section(4));
        assert!(!p.cold_start_section(5));
        assert!(!p.extended_section(3));
        assert!(p.extended_section(5));
        assert!(!p.in_scroll(1));
        assert!(p.in_scroll(2));
        assert!(!p.in_scroll(3));
        assert!(p.before_last_end(3));
        assert!(!p.before_last_end(4));
    }

    #[test]
    fn test_sections_without_markers() {
        let p = profile(&["LA;", "LB;"]);
        assert!(p.cold_start_section(0));
        assert!(p.cold_start_section(1));
        assert!(!p.extended_section(1));
        assert!(!p.in_scroll(0));
        assert!(p.before_last_end(1));
        assert!(!p.last_end_found());
    }

    #[test]
    fn test_prepend_shifts_markers() {
        let mut p = profile(&["LA;", "LDexEndMarker1;"]);
        assert!(p.is_last_end(1));
        p.prepend(vec!["LX;".to_string(), "LY;".to_string()]);
        assert_eq!(p.entries()[0], "LX;");
        assert!(p.is_last_end(3));
        assert_eq!(p.len(), 4);
    }
}
