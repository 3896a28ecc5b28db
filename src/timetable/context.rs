//! Shared allocation state.
//!
//! One [`SchedulingContext`] lives for a whole run. Every weekly grid built
//! in the run reads and writes it, which is how cross-department rules
//! (combined classes, common elective slots, room exclusivity) hold.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::report::AllocationReport;
use super::sync::CrossGroupSynchronizer;
use crate::config::SchedulerConfig;
use crate::models::{DayIndex, Placement, Session, SlotIndex};

/// A (day, slot) cell.
pub type Cell = (DayIndex, SlotIndex);

/// Cells held per (department, session) within each semester.
///
/// A cell conflicts only with the same department in the same session;
/// different departments never block each other here. Room exclusivity is
/// tracked separately by [`RoomOccupancy`].
#[derive(Debug, Clone, Default)]
pub struct GlobalOccupancy {
    held: HashMap<u32, HashMap<(String, Session), BTreeSet<Cell>>>,
}

impl GlobalOccupancy {
    /// Creates an empty occupancy map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a department may use every cell of a placement.
    pub fn is_available(
        &self,
        config: &SchedulerConfig,
        semester: u32,
        department: &str,
        session: Session,
        placement: &Placement,
    ) -> bool {
        let Some(cohorts) = self.held.get(&semester) else {
            return true;
        };
        cohorts.iter().all(|((holder, held_session), cells)| {
            let blocks = *held_session == session
                && holder == department
                && !config.departments_share_slots(holder, department);
            !blocks || placement.cells().all(|cell| !cells.contains(&cell))
        })
    }

    /// Marks every cell of a placement as held by a department.
    pub fn mark(
        &mut self,
        semester: u32,
        department: &str,
        session: Session,
        placement: &Placement,
    ) {
        self.held
            .entry(semester)
            .or_default()
            .entry((department.to_string(), session))
            .or_default()
            .extend(placement.cells());
    }

    /// Cells held by one department in one session.
    pub fn cells(
        &self,
        semester: u32,
        department: &str,
        session: Session,
    ) -> Option<&BTreeSet<Cell>> {
        self.held
            .get(&semester)
            .and_then(|c| c.get(&(department.to_string(), session)))
    }
}

/// Who holds a room at a slot.
///
/// The combined room is held under the (group, course) tag so the other
/// departments of the group can join the same booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomHolder {
    /// An ordinary booking.
    Exclusive,
    /// A combined class shared by a department group.
    Combined {
        /// Group name.
        group: String,
        /// Course code.
        course: String,
    },
}

/// One logged room booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBooking {
    /// Semester number.
    pub semester: u32,
    /// Day index.
    pub day: DayIndex,
    /// Slot index.
    pub slot: SlotIndex,
    /// Room name.
    pub room: String,
    /// Booking department.
    pub department: String,
    /// Course code.
    pub course: String,
    /// Session.
    pub session: Session,
}

/// Room holders per (semester, day, slot), plus the booking log.
#[derive(Debug, Clone, Default)]
pub struct RoomOccupancy {
    held: HashMap<(u32, DayIndex, SlotIndex), HashMap<String, RoomHolder>>,
    log: Vec<RoomBooking>,
}

impl RoomOccupancy {
    /// Creates an empty occupancy map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a room can be taken for every cell of a placement.
    ///
    /// A held cell is only reusable by a combined booking with the same tag.
    pub fn is_free_for(
        &self,
        semester: u32,
        placement: &Placement,
        room: &str,
        holder: &RoomHolder,
    ) -> bool {
        placement.cells().all(|(day, slot)| {
            match self.held.get(&(semester, day, slot)).and_then(|r| r.get(room)) {
                None => true,
                Some(current) => {
                    matches!(current, RoomHolder::Combined { .. }) && current == holder
                }
            }
        })
    }

    /// Holds a room for every cell of a placement.
    pub fn hold(&mut self, semester: u32, placement: &Placement, room: &str, holder: RoomHolder) {
        for (day, slot) in placement.cells() {
            self.held
                .entry((semester, day, slot))
                .or_default()
                .insert(room.to_string(), holder.clone());
        }
    }

    /// Appends one log entry per cell of a placement.
    pub fn log(
        &mut self,
        semester: u32,
        placement: &Placement,
        room: &str,
        department: &str,
        course: &str,
        session: Session,
    ) {
        for (day, slot) in placement.cells() {
            self.log.push(RoomBooking {
                semester,
                day,
                slot,
                room: room.to_string(),
                department: department.to_string(),
                course: course.to_string(),
                session,
            });
        }
    }

    /// The booking log.
    pub fn bookings(&self) -> &[RoomBooking] {
        &self.log
    }

    /// Number of held (semester, day, slot) cells per room.
    pub fn held_cells_by_room(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for rooms in self.held.values() {
            for room in rooms.keys() {
                *counts.entry(room.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Run-wide allocation state.
#[derive(Debug)]
pub struct SchedulingContext {
    /// Department occupancy.
    pub occupancy: GlobalOccupancy,
    /// Room occupancy and booking log.
    pub rooms: RoomOccupancy,
    /// Shared minor, combined and elective placements.
    pub sync: CrossGroupSynchronizer,
    /// Allocations and deficiencies.
    pub report: AllocationReport,
    /// Randomness source for searches, exam days and seating.
    pub rng: SmallRng,
}

impl SchedulingContext {
    /// Creates a fresh context.
    ///
    /// With a seed the run is reproducible; without one the generator is
    /// seeded from the operating system.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            occupancy: GlobalOccupancy::new(),
            rooms: RoomOccupancy::new(),
            sync: CrossGroupSynchronizer::new(),
            report: AllocationReport::new(),
            rng,
        }
    }
}
