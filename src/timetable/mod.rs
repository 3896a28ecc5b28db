//! Weekly class timetabling.
//!
//! Builds one [`WeeklyGrid`](crate::models::WeeklyGrid) per
//! (semester, department, session) against shared run state, so that rooms
//! are never double-booked and combined classes, electives and minor
//! classes line up across cohorts.
//!
//! # Usage
//!
//! ```
//! use campus_alloc::config::SchedulerConfig;
//! use campus_alloc::models::{Catalog, Course, Room, Session, TimeGrid};
//! use campus_alloc::timetable::{ClassScheduler, RoomAllocator, SchedulingContext};
//!
//! let config = SchedulerConfig::default();
//! let grid = TimeGrid::from_config(&config.grid).unwrap();
//! let catalog = Catalog::new()
//!     .with_course(Course::new("CS301", "CSE-A", 3).with_load(3, 0, 0))
//!     .with_room(Room::classroom("C101", 60));
//! let rooms = RoomAllocator::new(&catalog.rooms);
//! let mut ctx = SchedulingContext::new(Some(7));
//!
//! let weekly = ClassScheduler::new(&config, &grid, &rooms)
//!     .build_weekly_grid(&mut ctx, &catalog, 3, "CSE-A", Session::PreMid);
//! assert_eq!(weekly.cells_of("CS301").len(), 9);
//! ```

mod builder;
mod context;
mod kpi;
mod report;
mod rooms;
pub mod search;
mod sync;

pub use builder::ClassScheduler;
pub use context::{Cell, GlobalOccupancy, RoomBooking, RoomHolder, RoomOccupancy, SchedulingContext};
pub use kpi::TimetableKpi;
pub use report::{AllocationKey, AllocationReport, CourseAllocation, Deficiency, DeficiencyKind};
pub use rooms::{RoomAllocator, RoomRequest, RoomRequestKind};
pub use search::BoundedSearch;
pub use sync::{CombinedKey, CrossGroupSynchronizer};
