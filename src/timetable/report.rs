//! Allocation outcomes.
//!
//! The scheduler never fails on an infeasible load. It places what it can
//! and records everything it could not as a [`Deficiency`], so the gap
//! between requested and achieved meetings is always explicit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Component, ComponentCounts, Course, Placement, Session};

/// Identity of one allocated course offering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllocationKey {
    /// Semester number.
    pub semester: u32,
    /// Department.
    pub department: String,
    /// Session.
    pub session: Session,
    /// Course code.
    pub course: String,
}

impl AllocationKey {
    /// Creates a key.
    pub fn new(
        semester: u32,
        department: impl Into<String>,
        session: Session,
        course: impl Into<String>,
    ) -> Self {
        Self {
            semester,
            department: department.into(),
            session,
            course: course.into(),
        }
    }
}

/// What one course received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAllocation {
    /// Course code.
    pub course: String,
    /// Weekly load asked for.
    pub requested: ComponentCounts,
    /// Weekly load placed.
    pub achieved: ComponentCounts,
    /// First lecture/tutorial room assigned.
    pub room: Option<String>,
    /// First lab room assigned.
    pub lab_room: Option<String>,
    /// Whether the course asked to be combined.
    pub combined: bool,
    /// Whether every meeting ran jointly in the combined room.
    pub combined_honored: bool,
    /// Placed meetings.
    pub placements: Vec<(Component, Placement)>,
}

impl CourseAllocation {
    /// Starts an empty allocation for a course.
    pub fn new(course: &Course) -> Self {
        Self {
            course: course.code.clone(),
            requested: course.weekly,
            achieved: ComponentCounts::default(),
            room: None,
            lab_room: None,
            combined: course.is_combined,
            combined_honored: course.is_combined,
            placements: Vec::new(),
        }
    }

    /// Records one placed meeting and the room it got.
    pub fn add(&mut self, component: Component, placement: Placement, room: Option<String>) {
        if let Some(count) = self.achieved.get_mut(component) {
            *count += 1;
        }
        self.placements.push((component, placement));
        if let Some(room) = room {
            let slot = if component == Component::Lab {
                &mut self.lab_room
            } else {
                &mut self.room
            };
            if slot.is_none() {
                *slot = Some(room);
            }
        }
    }

    /// Whether achieved meets requested for every component.
    pub fn is_complete(&self) -> bool {
        self.achieved.covers(&self.requested)
    }

    /// Days used by one component.
    pub fn days_of(&self, component: Component) -> Vec<usize> {
        self.placements
            .iter()
            .filter(|(k, _)| *k == component)
            .map(|(_, p)| p.day)
            .collect()
    }

    /// Placements of one component, in placement order.
    pub fn placements_of(&self, component: Component) -> Vec<Placement> {
        self.placements
            .iter()
            .filter(|(k, _)| *k == component)
            .map(|(_, p)| *p)
            .collect()
    }
}

/// Classification of allocation gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeficiencyKind {
    /// Fewer meetings placed than requested.
    AllocationShortfall,
    /// The configuration makes a request unsatisfiable.
    ConfigurationDeficiency,
    /// A shared placement could not be reused by a later cohort.
    SynchronizationConflict,
    /// A meeting was placed without a room.
    MissingRoom,
}

/// A recorded gap between what was asked and what was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deficiency {
    /// Type of gap.
    pub kind: DeficiencyKind,
    /// Semester number.
    pub semester: u32,
    /// Department.
    pub department: String,
    /// Session, if the gap is session-specific.
    pub session: Option<Session>,
    /// Course code, if any.
    pub course: Option<String>,
    /// Component, if any.
    pub component: Option<Component>,
    /// Meetings requested.
    pub requested: u32,
    /// Meetings achieved.
    pub achieved: u32,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

impl Deficiency {
    fn base(kind: DeficiencyKind, severity: i32, message: String) -> Self {
        Self {
            kind,
            semester: 0,
            department: String::new(),
            session: None,
            course: None,
            component: None,
            requested: 0,
            achieved: 0,
            message,
            severity,
        }
    }

    /// Creates an allocation shortfall.
    pub fn shortfall(
        key: &AllocationKey,
        component: Component,
        requested: u32,
        achieved: u32,
    ) -> Self {
        let message = format!(
            "{} {} for {} {} sem {}: placed {achieved} of {requested}",
            key.course, component, key.department, key.session, key.semester
        );
        Self {
            semester: key.semester,
            department: key.department.clone(),
            session: Some(key.session),
            course: Some(key.course.clone()),
            component: Some(component),
            requested,
            achieved,
            ..Self::base(DeficiencyKind::AllocationShortfall, 80, message)
        }
    }

    /// Creates a configuration deficiency.
    pub fn configuration(
        semester: u32,
        department: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            semester,
            department: department.into(),
            ..Self::base(DeficiencyKind::ConfigurationDeficiency, 60, message.into())
        }
    }

    /// Creates a synchronization conflict.
    pub fn sync_conflict(
        key: &AllocationKey,
        component: Component,
        message: impl Into<String>,
    ) -> Self {
        Self {
            semester: key.semester,
            department: key.department.clone(),
            session: Some(key.session),
            course: Some(key.course.clone()),
            component: Some(component),
            ..Self::base(DeficiencyKind::SynchronizationConflict, 70, message.into())
        }
    }

    /// Creates a missing-room deficiency.
    pub fn missing_room(
        key: &AllocationKey,
        component: Component,
        message: impl Into<String>,
    ) -> Self {
        Self {
            semester: key.semester,
            department: key.department.clone(),
            session: Some(key.session),
            course: Some(key.course.clone()),
            component: Some(component),
            ..Self::base(DeficiencyKind::MissingRoom, 40, message.into())
        }
    }

    /// Sets the session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }
}

/// Every allocation and deficiency of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationReport {
    allocations: BTreeMap<AllocationKey, CourseAllocation>,
    deficiencies: Vec<Deficiency>,
}

impl AllocationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a course allocation, replacing any earlier one under the key.
    pub fn record(&mut self, key: AllocationKey, allocation: CourseAllocation) {
        self.allocations.insert(key, allocation);
    }

    /// Adds a deficiency.
    pub fn add_deficiency(&mut self, deficiency: Deficiency) {
        self.deficiencies.push(deficiency);
    }

    /// Allocation of one course offering.
    pub fn allocation(
        &self,
        semester: u32,
        department: &str,
        session: Session,
        course: &str,
    ) -> Option<&CourseAllocation> {
        self.allocations
            .get(&AllocationKey::new(semester, department, session, course))
    }

    /// All allocations, ordered by key.
    pub fn allocations(&self) -> impl Iterator<Item = (&AllocationKey, &CourseAllocation)> {
        self.allocations.iter()
    }

    /// Allocations of one (semester, department, session) grid.
    pub fn allocations_for(
        &self,
        semester: u32,
        department: &str,
        session: Session,
    ) -> Vec<&CourseAllocation> {
        self.allocations
            .iter()
            .filter(|(k, _)| {
                k.semester == semester && k.department == department && k.session == session
            })
            .map(|(_, a)| a)
            .collect()
    }

    /// All deficiencies, in the order they were found.
    pub fn deficiencies(&self) -> &[Deficiency] {
        &self.deficiencies
    }

    /// Deficiencies naming a course.
    pub fn deficiencies_for(&self, course: &str) -> Vec<&Deficiency> {
        self.deficiencies
            .iter()
            .filter(|d| d.course.as_deref() == Some(course))
            .collect()
    }

    /// Deficiencies of one kind.
    pub fn deficiencies_of(&self, kind: &DeficiencyKind) -> Vec<&Deficiency> {
        self.deficiencies.iter().filter(|d| &d.kind == kind).collect()
    }

    /// Whether every course got its full load and nothing was recorded.
    pub fn is_complete(&self) -> bool {
        self.deficiencies.is_empty() && self.allocations.values().all(CourseAllocation::is_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> AllocationKey {
        AllocationKey::new(3, "CSE-A", Session::PreMid, "CS301")
    }

    #[test]
    fn test_allocation_tracks_rooms_and_counts() {
        let course = Course::new("CS301", "CSE-A", 3).with_load(2, 0, 1);
        let mut alloc = CourseAllocation::new(&course);
        assert!(!alloc.is_complete());

        alloc.add(Component::Lecture, Placement::new(0, 2, 3), Some("C101".into()));
        alloc.add(Component::Lecture, Placement::new(2, 2, 3), Some("C102".into()));
        alloc.add(Component::Lab, Placement::new(1, 11, 4), Some("L1".into()));

        assert!(alloc.is_complete());
        assert_eq!(alloc.room.as_deref(), Some("C101"));
        assert_eq!(alloc.lab_room.as_deref(), Some("L1"));
        assert_eq!(alloc.days_of(Component::Lecture), vec![0, 2]);
    }

    #[test]
    fn test_shortfall_factory() {
        let d = Deficiency::shortfall(&key(), Component::Lecture, 3, 1);
        assert_eq!(d.kind, DeficiencyKind::AllocationShortfall);
        assert_eq!(d.requested, 3);
        assert_eq!(d.achieved, 1);
        assert_eq!(d.course.as_deref(), Some("CS301"));
        assert!(d.message.contains("placed 1 of 3"));
        assert!(d.severity > Deficiency::missing_room(&key(), Component::Lecture, "x").severity);
    }

    #[test]
    fn test_report_queries() {
        let mut report = AllocationReport::new();
        let course = Course::new("CS301", "CSE-A", 3).with_load(1, 0, 0);
        report.record(key(), CourseAllocation::new(&course));
        assert!(!report.is_complete());
        assert!(report.allocation(3, "CSE-A", Session::PreMid, "CS301").is_some());
        assert!(report.allocation(3, "CSE-A", Session::PostMid, "CS301").is_none());
        assert_eq!(report.allocations_for(3, "CSE-A", Session::PreMid).len(), 1);

        report.add_deficiency(Deficiency::configuration(3, "CSE-A", "no minor window"));
        report.add_deficiency(Deficiency::shortfall(&key(), Component::Lecture, 1, 0));
        assert_eq!(report.deficiencies_for("CS301").len(), 1);
        assert_eq!(report.deficiencies_of(&DeficiencyKind::ConfigurationDeficiency).len(), 1);
    }
}
