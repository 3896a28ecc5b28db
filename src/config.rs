//! Run configuration.
//!
//! Every institution-specific constant the allocators depend on lives here:
//! the weekly time grid, component durations, department groupings, lab
//! pools, search budgets, and the exam layout. [`SchedulerConfig::default`]
//! reproduces the reference institution; callers override individual parts
//! with the `with_*` builders or deserialize a whole config with serde.
//!
//! # Validation
//! [`SchedulerConfig::validate`] rejects configurations that would make the
//! allocators meaningless (no days, unknown lunch labels, zero durations).
//! It does not check the catalog; see [`crate::validation`] for that.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{RoomKind, TimeGrid};

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The weekly grid has no teaching days.
    #[error("time grid has no days")]
    EmptyDays,
    /// The weekly grid has no teaching slots.
    #[error("time grid has no slots")]
    EmptySlots,
    /// The same weekday label appears twice.
    #[error("duplicate day label: {0}")]
    DuplicateDay(String),
    /// A slot label is not of the form `HH:MM-HH:MM` with start < end.
    #[error("malformed slot label: {0}")]
    MalformedSlot(String),
    /// Teaching slots are not in strictly increasing time order.
    #[error("slot {0} does not start after the previous slot")]
    UnorderedSlot(String),
    /// A lunch or minor label does not name a teaching slot.
    #[error("{role} slot {label} is not a teaching slot")]
    UnknownSlot {
        /// Which reservation list referenced the label.
        role: &'static str,
        /// The offending label.
        label: String,
    },
    /// A component duration is zero.
    #[error("{0} duration must be at least one slot")]
    ZeroDuration(&'static str),
    /// A department belongs to more than one combined group.
    #[error("department {0} appears in more than one combined group")]
    OverlappingCombinedGroups(String),
    /// The exam calendar has no days.
    #[error("exam calendar has no days")]
    EmptyExamCalendar,
    /// The bench layout seats nobody.
    #[error("exam bench layout must have at least one row, column and seat")]
    ZeroBenchLayout,
}

/// Weekly time grid definition (labels as they appear in the timetable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Teaching days in display order.
    pub days: Vec<String>,
    /// Teaching slots (`HH:MM-HH:MM`) in time order.
    pub slots: Vec<String>,
    /// Permanently reserved lunch slots.
    pub lunch_slots: Vec<String>,
    /// Early window reserved for the recurring minor subject.
    pub minor_slots: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        let slots = [
            "07:30-08:00",
            "08:00-08:30",
            "09:00-09:30",
            "09:30-10:00",
            "10:00-10:30",
            "10:30-11:00",
            "11:00-11:30",
            "11:30-12:00",
            "12:00-12:30",
            "12:30-13:00",
            "13:00-13:30",
            "13:30-14:00",
            "14:00-14:30",
            "14:30-15:00",
            "15:00-15:30",
            "15:30-16:00",
            "16:00-16:30",
            "16:30-17:00",
            "17:00-17:30",
            "17:30-18:00",
        ];
        Self {
            days: ["MON", "TUE", "WED", "THU", "FRI"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            slots: slots.iter().map(|s| s.to_string()).collect(),
            lunch_slots: vec!["13:00-13:30".into(), "13:30-14:00".into()],
            minor_slots: vec!["07:30-08:00".into(), "08:00-08:30".into()],
        }
    }
}

/// Length of each component kind, in slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    /// Lecture length (default 3 slots = 1.5 h).
    pub lecture: usize,
    /// Tutorial length (default 2 slots = 1 h).
    pub tutorial: usize,
    /// Lab length (default 4 slots = 2 h).
    pub lab: usize,
    /// Minor class length (default 2 slots = 1 h).
    pub minor: usize,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            lecture: 3,
            tutorial: 2,
            lab: 4,
            minor: 2,
        }
    }
}

/// Recurring minor subject settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinorConfig {
    /// Label written into grid cells.
    pub subject: String,
    /// Placements per week.
    pub classes_per_week: usize,
    /// Semesters that never get minor classes.
    pub exempt_semesters: Vec<u32>,
}

impl Default for MinorConfig {
    fn default() -> Self {
        Self {
            subject: "Minor".into(),
            classes_per_week: 2,
            exempt_semesters: vec![1],
        }
    }
}

/// A named set of departments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentGroup {
    /// Group key (e.g. `"CSE"`).
    pub name: String,
    /// Member departments.
    pub departments: Vec<String>,
}

impl DepartmentGroup {
    /// Creates a group.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        departments: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            departments: departments.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a department belongs to this group.
    pub fn contains(&self, department: &str) -> bool {
        self.departments.iter().any(|d| d == department)
    }
}

/// Maps departments to the lab pool their lab sessions draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabPoolRule {
    /// Departments covered by this rule.
    pub departments: Vec<String>,
    /// Lab kind these departments use.
    pub kind: RoomKind,
}

/// Attempt ceilings for every bounded search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBudgets {
    /// Minor placement attempts per semester.
    pub minor: usize,
    /// Combined-slot search attempts per component.
    pub combined: usize,
    /// Regular lecture attempts per course.
    pub lecture: usize,
    /// Regular tutorial attempts per course.
    pub tutorial: usize,
    /// Regular lab attempts per course.
    pub lab: usize,
    /// Fresh elective-slot attempts per component.
    pub elective: usize,
}

impl Default for SearchBudgets {
    fn default() -> Self {
        Self {
            minor: 200,
            combined: 500,
            lecture: 2000,
            tutorial: 1000,
            lab: 1000,
            elective: 1000,
        }
    }
}

/// Candidate ordering used by every placement search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Shuffle candidates within each preference tier.
    #[default]
    Randomized,
    /// Keep grid order (day-major, earliest slot first).
    Ordered,
}

/// Exam calendar, room layout, and invigilation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Exam day labels; a label may repeat (two different Mondays).
    pub days: Vec<String>,
    /// Bench rows per exam room.
    pub bench_rows: usize,
    /// Bench columns per exam room.
    pub bench_columns: usize,
    /// Seats per bench.
    pub seats_per_bench: usize,
    /// Exam capacity for rooms that declare none.
    pub default_capacity: u32,
    /// Invigilators assigned to each room.
    pub invigilators_per_room: usize,
    /// Rooms staffed per day and session.
    pub rooms_per_session: usize,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            days: [
                "Saturday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Monday",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
            bench_rows: 6,
            bench_columns: 4,
            seats_per_bench: 2,
            default_capacity: 48,
            invigilators_per_room: 2,
            rooms_per_session: 15,
        }
    }
}

impl ExamConfig {
    /// Physical bench count of one exam room.
    pub fn max_benches(&self) -> usize {
        self.bench_rows * self.bench_columns
    }

    /// Physical seat count of one exam room.
    pub fn max_seats(&self) -> usize {
        self.max_benches() * self.seats_per_bench
    }
}

/// Complete configuration for one scheduling session.
///
/// # Example
///
/// ```
/// use campus_alloc::config::SchedulerConfig;
///
/// let config = SchedulerConfig::default().with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.departments.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Weekly grid.
    pub grid: GridConfig,
    /// Component durations.
    pub durations: Durations,
    /// Minor subject settings.
    pub minor: MinorConfig,
    /// Departments, in build order.
    pub departments: Vec<String>,
    /// Groups that attend combined classes together.
    pub combined_groups: Vec<DepartmentGroup>,
    /// Departments explicitly allowed to occupy identical slots.
    pub slot_sharing_groups: Vec<DepartmentGroup>,
    /// Department-specific lab pools.
    pub lab_pools: Vec<LabPoolRule>,
    /// Attempt ceilings.
    pub budgets: SearchBudgets,
    /// Candidate ordering.
    pub search: SearchStrategy,
    /// Exam settings.
    pub exam: ExamConfig,
    /// Seed for the session RNG (`None` = fresh entropy per run).
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            durations: Durations::default(),
            minor: MinorConfig::default(),
            departments: ["CSE-A", "CSE-B", "DSAI", "ECE"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            combined_groups: vec![
                DepartmentGroup::new("CSE", ["CSE-A", "CSE-B"]),
                DepartmentGroup::new("DSAI_ECE", ["DSAI", "ECE"]),
            ],
            slot_sharing_groups: vec![DepartmentGroup::new("CSE", ["CSE-A", "CSE-B"])],
            lab_pools: vec![
                LabPoolRule {
                    departments: ["CSE-A", "CSE-B", "CSE", "DSAI"]
                        .iter()
                        .map(|d| d.to_string())
                        .collect(),
                    kind: RoomKind::SoftwareLab,
                },
                LabPoolRule {
                    departments: vec!["ECE".into()],
                    kind: RoomKind::HardwareLab,
                },
            ],
            budgets: SearchBudgets::default(),
            search: SearchStrategy::default(),
            exam: ExamConfig::default(),
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the department list.
    pub fn with_departments<S: Into<String>>(
        mut self,
        departments: impl IntoIterator<Item = S>,
    ) -> Self {
        self.departments = departments.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the combined-class groups.
    pub fn with_combined_groups(mut self, groups: Vec<DepartmentGroup>) -> Self {
        self.combined_groups = groups;
        self
    }

    /// Replaces the weekly grid.
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Replaces the attempt budgets.
    pub fn with_budgets(mut self, budgets: SearchBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    /// Sets the candidate ordering.
    pub fn with_search(mut self, search: SearchStrategy) -> Self {
        self.search = search;
        self
    }

    /// Sets the minor classes per week.
    pub fn with_minor_classes(mut self, classes_per_week: usize) -> Self {
        self.minor.classes_per_week = classes_per_week;
        self
    }

    /// Replaces the exam settings.
    pub fn with_exam(mut self, exam: ExamConfig) -> Self {
        self.exam = exam;
        self
    }

    /// Combined group a department attends combined classes with.
    pub fn combined_group_of(&self, department: &str) -> Option<&DepartmentGroup> {
        self.combined_groups.iter().find(|g| g.contains(department))
    }

    /// Whether two distinct departments are explicitly allowed to share slots.
    pub fn departments_share_slots(&self, a: &str, b: &str) -> bool {
        a != b
            && self
                .slot_sharing_groups
                .iter()
                .any(|g| g.contains(a) && g.contains(b))
    }

    /// Lab kind a department draws from (`None` = every lab).
    pub fn lab_pool_for(&self, department: &str) -> Option<RoomKind> {
        self.lab_pools
            .iter()
            .find(|rule| rule.departments.iter().any(|d| d == department))
            .map(|rule| rule.kind)
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        TimeGrid::from_config(&self.grid)?;

        let d = &self.durations;
        for (name, value) in [
            ("lecture", d.lecture),
            ("tutorial", d.tutorial),
            ("lab", d.lab),
            ("minor", d.minor),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDuration(name));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for group in &self.combined_groups {
            for dept in &group.departments {
                if !seen.insert(dept.as_str()) {
                    return Err(ConfigError::OverlappingCombinedGroups(dept.clone()));
                }
            }
        }

        if self.exam.days.is_empty() {
            return Err(ConfigError::EmptyExamCalendar);
        }
        if self.exam.max_seats() == 0 {
            return Err(ConfigError::ZeroBenchLayout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SchedulerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.exam.max_benches(), 24);
        assert_eq!(config.exam.max_seats(), 48);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_combined_group_lookup() {
        let config = SchedulerConfig::default();
        assert_eq!(config.combined_group_of("CSE-B").map(|g| g.name.as_str()), Some("CSE"));
        assert_eq!(config.combined_group_of("ECE").map(|g| g.name.as_str()), Some("DSAI_ECE"));
        assert!(config.combined_group_of("MECH").is_none());
    }

    #[test]
    fn test_slot_sharing_requires_distinct_departments() {
        let config = SchedulerConfig::default();
        assert!(config.departments_share_slots("CSE-A", "CSE-B"));
        assert!(!config.departments_share_slots("CSE-A", "CSE-A"));
        assert!(!config.departments_share_slots("CSE-A", "ECE"));
    }

    #[test]
    fn test_lab_pool_lookup() {
        let config = SchedulerConfig::default();
        assert_eq!(config.lab_pool_for("DSAI"), Some(RoomKind::SoftwareLab));
        assert_eq!(config.lab_pool_for("ECE"), Some(RoomKind::HardwareLab));
        assert_eq!(config.lab_pool_for("MECH"), None);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut config = SchedulerConfig::default();
        config.durations.lab = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration("lab")));
    }

    #[test]
    fn test_overlapping_groups_rejected() {
        let config = SchedulerConfig::default().with_combined_groups(vec![
            DepartmentGroup::new("A", ["CSE-A", "DSAI"]),
            DepartmentGroup::new("B", ["DSAI", "ECE"]),
        ]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::OverlappingCombinedGroups("DSAI".into()))
        );
    }

    #[test]
    fn test_unknown_lunch_slot_rejected() {
        let mut grid = GridConfig::default();
        grid.lunch_slots.push("19:00-19:30".into());
        let config = SchedulerConfig::default().with_grid(grid);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownSlot { role: "lunch", .. })
        ));
    }

    #[test]
    fn test_empty_exam_calendar_rejected() {
        let mut exam = ExamConfig::default();
        exam.days.clear();
        let config = SchedulerConfig::default().with_exam(exam);
        assert_eq!(config.validate(), Err(ConfigError::EmptyExamCalendar));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = SchedulerConfig::default().with_seed(99);
        let json = serde_json::to_string(&config).unwrap();
        let back: SchedulerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
