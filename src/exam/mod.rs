//! Exam timetabling.
//!
//! Three independent steps run per exam period:
//!
//! - [`ExamDayScheduler`] spreads the period's courses over exam days and
//!   forenoon/afternoon sessions.
//! - [`SeatingAllocator`] seats the students of each sitting on benches
//!   across the exam rooms.
//! - [`InvigilationPlanner`] staffs the rooms of each sitting.
//!
//! The mid-semester period examines Pre-Mid courses and the end-semester
//! period examines Post-Mid courses.

mod days;
mod invigilation;
mod seating;

pub use days::{ExamAssignment, ExamDayScheduler, ExamSession, ExamTimetable, departments_on};
pub use invigilation::{InvigilationDuty, InvigilationPlanner};
pub use seating::{Bench, CourseRoster, ExamCandidate, SeatingAllocator, SeatingPlan};
