//! Allocation domain models.
//!
//! Provides the catalog records the allocators consume and the weekly
//! grid they produce.
//!
//! # Domain Mappings
//!
//! | campus-alloc | Meaning |
//! |--------------|---------|
//! | Course | One catalog row: code × department × semester |
//! | Room | Classroom, lab, or the combined-class hall |
//! | TimeGrid | Days × 30-minute slots, with lunch and minor reservations |
//! | Placement | A run of consecutive slots on one day |
//! | WeeklyGrid | The timetable of one (semester, department, session) |

mod catalog;
mod course;
mod room;
mod student;
mod time_grid;
mod weekly_grid;

pub use catalog::Catalog;
pub use course::{Component, ComponentCounts, Course, Session};
pub use room::{Room, RoomKind};
pub use student::Student;
pub use time_grid::{DayIndex, Placement, SlotIndex, TimeGrid, TimeSlot};
pub use weekly_grid::{ScheduleEntry, WeeklyGrid};
