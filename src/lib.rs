//! Academic resource allocation for a multi-department institute.
//!
//! Builds weekly class timetables per (semester, department, session),
//! assigns exams to days and half-day sittings, seats students on two-seat
//! benches and staffs exam rooms with invigilators. Every run is owned by
//! one [`SchedulingSession`]; shortfalls are recorded as deficiencies rather
//! than raised as errors.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Room`, `Student`, `Catalog`,
//!   `TimeGrid`, `Placement`, `WeeklyGrid`, `ScheduleEntry`
//! - **`config`**: `SchedulerConfig` with the institution's grid, groups,
//!   room pools, attempt budgets and exam layout
//! - **`timetable`**: Weekly grid construction over a shared
//!   `SchedulingContext` (occupancy, room bookings, cross-group sync)
//! - **`exam`**: Exam days, bench seating and invigilation duties
//! - **`validation`**: Catalog integrity checks and the room conflict audit
//! - **`session`**: The run-scoped entry point
//!
//! # Architecture
//!
//! Loading input tables and exporting timetables are left to the caller.
//! The crate consumes a normalized [`models::Catalog`] and hands back typed
//! grids, reports and plans.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

pub mod config;
pub mod exam;
pub mod models;
pub mod session;
pub mod timetable;
pub mod validation;

pub use config::SchedulerConfig;
pub use session::SchedulingSession;
