//! Run-scoped scheduling session.
//!
//! [`SchedulingSession`] owns everything one generation run shares: the
//! configuration, the catalog, the room pools and the [`SchedulingContext`]
//! with its occupancy maps and random source. Weekly grids are built once
//! per (semester, department, session) and cached, so asking for the same
//! grid twice never books its courses twice.
//!
//! # Example
//!
//! ```
//! use campus_alloc::models::{Catalog, Course, Room, Session};
//! use campus_alloc::{SchedulerConfig, SchedulingSession};
//!
//! let catalog = Catalog::new()
//!     .with_course(Course::new("CS301", "CSE-A", 3).with_load(3, 0, 0))
//!     .with_room(Room::classroom("C101", 60));
//! let config = SchedulerConfig::default().with_seed(1);
//! let mut session = SchedulingSession::new(config, catalog).unwrap();
//!
//! session.build_all();
//! let alloc = session.allocation(3, "CSE-A", Session::PreMid, "CS301").unwrap();
//! assert_eq!(alloc.achieved.lectures, 3);
//! assert!(session.conflict_report().is_empty());
//! ```

use log::{info, warn};
use std::collections::BTreeMap;

use crate::config::{ConfigError, SchedulerConfig};
use crate::exam::{
    CourseRoster, ExamDayScheduler, ExamTimetable, InvigilationDuty, InvigilationPlanner,
    SeatingAllocator, SeatingPlan,
};
use crate::models::{Catalog, Session, TimeGrid, WeeklyGrid};
use crate::timetable::{
    AllocationReport, ClassScheduler, CourseAllocation, RoomAllocator, SchedulingContext,
    TimetableKpi,
};
use crate::validation::{ConflictValidator, RoomConflict, validate_catalog};

type GridKey = (u32, String, Session);

/// Owner of all state for one generation run.
#[derive(Debug)]
pub struct SchedulingSession {
    config: SchedulerConfig,
    grid: TimeGrid,
    catalog: Catalog,
    rooms: RoomAllocator,
    context: SchedulingContext,
    grids: BTreeMap<GridKey, WeeklyGrid>,
}

impl SchedulingSession {
    /// Creates a session.
    ///
    /// Fails only on an inconsistent configuration. Catalog problems are
    /// logged and the run continues with what the catalog provides.
    pub fn new(config: SchedulerConfig, catalog: Catalog) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = TimeGrid::from_config(&config.grid)?;

        if let Err(errors) = validate_catalog(&catalog, &config) {
            for error in &errors {
                warn!("catalog: {}", error.message);
            }
        }

        let rooms = RoomAllocator::new(&catalog.rooms);
        let context = SchedulingContext::new(config.seed);
        info!(
            "session: {} courses, {} rooms, {} students",
            catalog.courses.len(),
            catalog.rooms.len(),
            catalog.students.len()
        );
        Ok(Self {
            config,
            grid,
            catalog,
            rooms,
            context,
            grids: BTreeMap::new(),
        })
    }

    /// Builds (or returns the cached) grid of one department in one
    /// semester and session.
    pub fn build_weekly_grid(
        &mut self,
        semester: u32,
        department: &str,
        session: Session,
    ) -> &WeeklyGrid {
        let key = (semester, department.to_string(), session);
        if !self.grids.contains_key(&key) {
            let scheduler = ClassScheduler::new(&self.config, &self.grid, &self.rooms);
            let weekly = scheduler.build_weekly_grid(
                &mut self.context,
                &self.catalog,
                semester,
                department,
                session,
            );
            self.grids.insert(key.clone(), weekly);
        }
        &self.grids[&key]
    }

    /// Builds every grid: semesters ascending, then sessions, then
    /// departments in configuration order.
    pub fn build_all(&mut self) {
        let departments = self.config.departments.clone();
        for semester in self.catalog.semesters() {
            for session in Session::ALL {
                for department in &departments {
                    self.build_weekly_grid(semester, department, session);
                }
            }
        }
        let kpi = self.kpi();
        info!(
            "built {} grids: {}/{} meetings placed, {} deficiencies",
            self.grids.len(),
            kpi.achieved_meetings,
            kpi.requested_meetings,
            kpi.deficiency_count
        );
    }

    /// A built grid.
    pub fn grid(&self, semester: u32, department: &str, session: Session) -> Option<&WeeklyGrid> {
        self.grids.get(&(semester, department.to_string(), session))
    }

    /// Every built grid, in key order.
    pub fn grids(&self) -> impl Iterator<Item = &WeeklyGrid> {
        self.grids.values()
    }

    /// The time grid in use.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// The configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Allocations and deficiencies so far.
    pub fn report(&self) -> &AllocationReport {
        &self.context.report
    }

    /// One course's allocation summary.
    pub fn allocation(
        &self,
        semester: u32,
        department: &str,
        session: Session,
        course: &str,
    ) -> Option<&CourseAllocation> {
        self.context
            .report
            .allocation(semester, department, session, course)
    }

    /// The shared run state.
    pub fn context(&self) -> &SchedulingContext {
        &self.context
    }

    /// KPIs over everything built so far.
    pub fn kpi(&self) -> TimetableKpi {
        let horizon =
            self.catalog.semesters().len() * self.grid.day_count() * self.grid.slot_count();
        TimetableKpi::calculate(
            &self.context.report,
            self.grids.values(),
            &self.context.rooms,
            horizon,
        )
    }

    /// Audits the room booking log.
    pub fn conflict_report(&self) -> Vec<RoomConflict> {
        let conflicts = ConflictValidator::validate(self.context.rooms.bookings());
        for conflict in &conflicts {
            warn!(
                "room {} double-booked: sem {} day {} slot {} ({} entries)",
                conflict.room,
                conflict.semester,
                conflict.day,
                conflict.slot,
                conflict.entries.len()
            );
        }
        conflicts
    }

    /// Exam timetable for one period: Pre-Mid courses for the mid-semester
    /// exams, Post-Mid courses for the end-semester exams.
    pub fn exam_timetable(&mut self, period: Session) -> ExamTimetable {
        let courses = self.catalog.courses_in_session(period);
        ExamDayScheduler::new(&self.config.exam.days).assign_exam_days(
            &courses,
            self.config.exam.days.len(),
            period,
            &mut self.context.rng,
        )
    }

    /// Seats every sitting of an exam timetable in the catalog's exam rooms.
    pub fn plan_seating(&mut self, timetable: &ExamTimetable) -> SeatingPlan {
        let roster = CourseRoster::from_catalog(&self.catalog);
        let rooms = self.catalog.exam_rooms();
        SeatingAllocator::new(&self.config.exam).plan(
            timetable,
            &roster,
            &rooms,
            &mut self.context.rng,
        )
    }

    /// Staffs every sitting of an exam timetable from the catalog's faculty.
    pub fn plan_invigilation(&mut self, timetable: &ExamTimetable) -> Vec<InvigilationDuty> {
        let rooms = self.catalog.exam_rooms();
        InvigilationPlanner::new(&self.config.exam).plan(
            timetable,
            &rooms,
            &self.catalog.faculty,
            &mut self.context.rng,
        )
    }
}
