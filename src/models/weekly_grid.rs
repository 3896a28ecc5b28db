//! Weekly grid (solution) model.
//!
//! A weekly grid is the Day × TimeSlot timetable of one
//! (semester, department, session) triple. Each cell is free, lunch,
//! held by one course component, or an elective block.
//!
//! # Invariant
//! [`WeeklyGrid::occupy`] refuses to write over a non-free cell, so no
//! cell is ever held by two required courses. Electives are the one
//! exception by construction: every elective of a semester runs in the same
//! slots, so parallel electives share a single [`ScheduleEntry::Elective`]
//! block listing the alternatives a student chooses between.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Component, DayIndex, Placement, Session, SlotIndex, TimeGrid};

/// Content of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEntry {
    /// Available.
    Free,
    /// Permanently reserved lunch.
    Lunch,
    /// Held by a course component.
    Occupied {
        /// Course code (or the minor subject label).
        course: String,
        /// Component kind.
        component: Component,
    },
    /// Common elective slot shared by parallel elective offerings.
    Elective {
        /// Elective course codes running in this cell.
        courses: Vec<String>,
        /// Component kind (lecture or tutorial).
        component: Component,
    },
}

impl ScheduleEntry {
    /// Whether the cell is available.
    pub fn is_free(&self) -> bool {
        matches!(self, ScheduleEntry::Free)
    }

    /// Course code, if held by a single course.
    pub fn course(&self) -> Option<&str> {
        match self {
            ScheduleEntry::Occupied { course, .. } => Some(course),
            _ => None,
        }
    }

    /// Whether the cell holds a course (alone or as an elective alternative).
    pub fn holds(&self, code: &str) -> bool {
        match self {
            ScheduleEntry::Occupied { course, .. } => course == code,
            ScheduleEntry::Elective { courses, .. } => courses.iter().any(|c| c == code),
            _ => false,
        }
    }
}

/// The weekly timetable of one department and session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyGrid {
    /// Semester number.
    pub semester: u32,
    /// Department.
    pub department: String,
    /// Session.
    pub session: Session,
    cells: Vec<Vec<ScheduleEntry>>,
}

impl WeeklyGrid {
    /// Creates a grid with every non-lunch cell free.
    pub fn new(
        semester: u32,
        department: impl Into<String>,
        session: Session,
        grid: &TimeGrid,
    ) -> Self {
        let row: Vec<ScheduleEntry> = (0..grid.slot_count())
            .map(|slot| {
                if grid.is_lunch(slot) {
                    ScheduleEntry::Lunch
                } else {
                    ScheduleEntry::Free
                }
            })
            .collect();
        Self {
            semester,
            department: department.into(),
            session,
            cells: vec![row; grid.day_count()],
        }
    }

    /// Number of days.
    pub fn day_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of slots per day.
    pub fn slot_count(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Cell content.
    pub fn entry(&self, day: DayIndex, slot: SlotIndex) -> Option<&ScheduleEntry> {
        self.cells.get(day).and_then(|row| row.get(slot))
    }

    /// One day's row.
    pub fn row(&self, day: DayIndex) -> Option<&[ScheduleEntry]> {
        self.cells.get(day).map(Vec::as_slice)
    }

    /// Whether every cell of a placement is free.
    pub fn is_free(&self, placement: &Placement) -> bool {
        placement
            .cells()
            .all(|(d, s)| self.entry(d, s).is_some_and(ScheduleEntry::is_free))
    }

    /// Writes a component into every cell of a placement.
    ///
    /// Returns `false` and leaves the grid untouched if any cell is not free.
    pub fn occupy(&mut self, placement: &Placement, course: &str, component: Component) -> bool {
        if !self.is_free(placement) {
            return false;
        }
        for (d, s) in placement.cells() {
            self.cells[d][s] = ScheduleEntry::Occupied {
                course: course.to_string(),
                component,
            };
        }
        true
    }

    /// Whether an elective can join every cell of a placement.
    ///
    /// Cells must be free or already an elective block of the same component.
    pub fn can_join_elective(&self, placement: &Placement, component: Component) -> bool {
        placement.cells().all(|(d, s)| match self.entry(d, s) {
            Some(ScheduleEntry::Free) => true,
            Some(ScheduleEntry::Elective { component: k, .. }) => *k == component,
            _ => false,
        })
    }

    /// Adds an elective to the block at a placement, creating it on free cells.
    ///
    /// Returns `false` and leaves the grid untouched if any cell cannot join.
    pub fn join_elective(
        &mut self,
        placement: &Placement,
        course: &str,
        component: Component,
    ) -> bool {
        if !self.can_join_elective(placement, component) {
            return false;
        }
        for (d, s) in placement.cells() {
            let cell = &mut self.cells[d][s];
            match cell {
                ScheduleEntry::Elective { courses, .. } => {
                    if !courses.iter().any(|c| c == course) {
                        courses.push(course.to_string());
                    }
                }
                _ => {
                    *cell = ScheduleEntry::Elective {
                        courses: vec![course.to_string()],
                        component,
                    };
                }
            }
        }
        true
    }

    /// Cells held by a course (any component).
    pub fn cells_of(&self, course: &str) -> BTreeSet<(DayIndex, SlotIndex)> {
        self.iter_occupied()
            .filter(|(_, _, c, _)| *c == course)
            .map(|(d, s, _, _)| (d, s))
            .collect()
    }

    /// Number of cells held by one component of a course.
    pub fn cell_count(&self, course: &str, component: Component) -> usize {
        self.iter_occupied()
            .filter(|(_, _, c, k)| *c == course && *k == component)
            .count()
    }

    /// All occupied cells.
    pub fn occupied_cells(&self) -> BTreeSet<(DayIndex, SlotIndex)> {
        self.iter_occupied().map(|(d, s, _, _)| (d, s)).collect()
    }

    /// Distinct course codes present in the grid.
    pub fn courses(&self) -> BTreeSet<&str> {
        self.iter_occupied().map(|(_, _, c, _)| c).collect()
    }

    /// Fraction of non-lunch cells that are occupied.
    pub fn utilization(&self) -> f64 {
        let mut usable = 0usize;
        let mut used = 0usize;
        for entry in self.cells.iter().flatten() {
            match entry {
                ScheduleEntry::Lunch => {}
                ScheduleEntry::Free => usable += 1,
                ScheduleEntry::Occupied { .. } | ScheduleEntry::Elective { .. } => {
                    usable += 1;
                    used += 1;
                }
            }
        }
        if usable == 0 {
            0.0
        } else {
            used as f64 / usable as f64
        }
    }

    fn iter_occupied(&self) -> impl Iterator<Item = (DayIndex, SlotIndex, &str, Component)> + '_ {
        self.cells.iter().enumerate().flat_map(|(d, row)| {
            row.iter().enumerate().flat_map(move |(s, entry)| {
                let held: Vec<(DayIndex, SlotIndex, &str, Component)> = match entry {
                    ScheduleEntry::Occupied { course, component } => {
                        vec![(d, s, course.as_str(), *component)]
                    }
                    ScheduleEntry::Elective { courses, component } => courses
                        .iter()
                        .map(|c| (d, s, c.as_str(), *component))
                        .collect(),
                    _ => Vec::new(),
                };
                held
            })
        })
    }
}
