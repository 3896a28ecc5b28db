//! Placements shared across cohorts.
//!
//! The first cohort to place a minor class, combined class or elective
//! fixes its placements here; every later cohort reuses them.

use std::collections::HashMap;

use crate::models::{Component, Placement};

/// Identity of one combined-class component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombinedKey {
    /// Semester number.
    pub semester: u32,
    /// Combined group name.
    pub group: String,
    /// Course code.
    pub course: String,
    /// Component kind.
    pub component: Component,
}

impl CombinedKey {
    /// Creates a key.
    pub fn new(
        semester: u32,
        group: impl Into<String>,
        course: impl Into<String>,
        component: Component,
    ) -> Self {
        Self {
            semester,
            group: group.into(),
            course: course.into(),
            component,
        }
    }
}

/// Store of shared placements.
#[derive(Debug, Clone, Default)]
pub struct CrossGroupSynchronizer {
    minor: HashMap<u32, Vec<Placement>>,
    combined: HashMap<CombinedKey, Vec<Placement>>,
    elective: HashMap<(u32, Component), Vec<Placement>>,
}

impl CrossGroupSynchronizer {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minor placements fixed for a semester.
    pub fn minor_slots(&self, semester: u32) -> Option<&[Placement]> {
        self.minor.get(&semester).map(Vec::as_slice)
    }

    /// Fixes a semester's minor placements. Later calls are ignored.
    pub fn record_minor(&mut self, semester: u32, placements: Vec<Placement>) -> bool {
        if self.minor.contains_key(&semester) {
            return false;
        }
        self.minor.insert(semester, placements);
        true
    }

    /// Combined placements found so far for a key.
    pub fn combined_slots(&self, key: &CombinedKey) -> &[Placement] {
        self.combined.get(key).map_or(&[], Vec::as_slice)
    }

    /// Appends a combined placement.
    pub fn push_combined(&mut self, key: CombinedKey, placement: Placement) {
        self.combined.entry(key).or_default().push(placement);
    }

    /// Common elective placements of a semester and component.
    pub fn elective_slots(&self, semester: u32, component: Component) -> Option<&[Placement]> {
        self.elective.get(&(semester, component)).map(Vec::as_slice)
    }

    /// Fixes the common elective placements. Later calls are ignored.
    pub fn record_elective(
        &mut self,
        semester: u32,
        component: Component,
        placements: Vec<Placement>,
    ) -> bool {
        if self.elective.contains_key(&(semester, component)) {
            return false;
        }
        self.elective.insert((semester, component), placements);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_written_once() {
        let mut sync = CrossGroupSynchronizer::new();
        assert!(sync.minor_slots(3).is_none());
        assert!(sync.record_minor(3, vec![Placement::new(0, 0, 2)]));
        assert!(!sync.record_minor(3, vec![Placement::new(1, 0, 2)]));
        assert_eq!(sync.minor_slots(3), Some(&[Placement::new(0, 0, 2)][..]));
    }

    #[test]
    fn test_elective_per_component() {
        let mut sync = CrossGroupSynchronizer::new();
        sync.record_elective(5, Component::Lecture, vec![Placement::new(2, 2, 3)]);
        assert!(sync.elective_slots(5, Component::Tutorial).is_none());
        assert_eq!(sync.elective_slots(5, Component::Lecture).map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_combined_accumulates() {
        let mut sync = CrossGroupSynchronizer::new();
        let key = CombinedKey::new(3, "CSE", "CS301", Component::Lecture);
        assert!(sync.combined_slots(&key).is_empty());
        sync.push_combined(key.clone(), Placement::new(0, 2, 3));
        sync.push_combined(key.clone(), Placement::new(2, 2, 3));
        assert_eq!(sync.combined_slots(&key).len(), 2);
        let other = CombinedKey::new(3, "CSE", "CS301", Component::Tutorial);
        assert!(sync.combined_slots(&other).is_empty());
    }
}
