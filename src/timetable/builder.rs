//! Weekly grid construction.
//!
//! [`ClassScheduler`] fills one (semester, department, session) grid at a
//! time against the run-wide [`SchedulingContext`].
//!
//! # Algorithm
//!
//! 1. Minor classes first, reusing the semester's fixed placements when an
//!    earlier grid already chose them.
//! 2. Combined and elective courses next, then the rest in catalog order.
//! 3. Per course, lectures then tutorials then labs. Each component goes
//!    through exactly one tier:
//!    - combined courses of a grouped department through the combined tier
//!      (same placements for the whole group, combined hall only),
//!    - elective lectures and tutorials through the elective tier (one
//!      common placement set per semester and component),
//!    - everything else through the regular tier.
//! 4. Whatever a tier cannot place is recorded as a shortfall.

use log::{debug, info, warn};
use std::collections::BTreeSet;

use super::context::{GlobalOccupancy, SchedulingContext};
use super::report::{AllocationKey, CourseAllocation, Deficiency};
use super::rooms::{RoomAllocator, RoomRequest, RoomRequestKind};
use super::search::{BoundedSearch, candidate_tiers};
use super::sync::{CombinedKey, CrossGroupSynchronizer};
use crate::config::{DepartmentGroup, SchedulerConfig};
use crate::models::{
    Catalog, Component, Course, DayIndex, Placement, Session, TimeGrid, WeeklyGrid,
};

/// The grid currently being filled.
#[derive(Debug, Clone)]
struct Cohort {
    semester: u32,
    department: String,
    session: Session,
    /// (department, session) pairs of the semester that offer electives.
    elective_cohorts: Vec<(String, Session)>,
}

impl Cohort {
    fn of(weekly: &WeeklyGrid, catalog: &Catalog) -> Self {
        let mut elective_cohorts: Vec<(String, Session)> = Vec::new();
        for course in &catalog.courses {
            let cohort = (course.department.clone(), course.session);
            if course.semester == weekly.semester
                && course.is_elective
                && !elective_cohorts.contains(&cohort)
            {
                elective_cohorts.push(cohort);
            }
        }
        Self {
            semester: weekly.semester,
            department: weekly.department.clone(),
            session: weekly.session,
            elective_cohorts,
        }
    }

    fn offers_electives(&self, department: &str) -> bool {
        self.elective_cohorts
            .iter()
            .any(|(d, s)| d == department && *s == self.session)
    }

    fn key(&self, course: &str) -> AllocationKey {
        AllocationKey::new(self.semester, &self.department, self.session, course)
    }

    fn request<'r>(
        &'r self,
        course: &'r Course,
        placement: Placement,
        kind: RoomRequestKind<'r>,
    ) -> RoomRequest<'r> {
        RoomRequest {
            semester: self.semester,
            department: &self.department,
            session: self.session,
            course: &course.code,
            placement,
            kind,
            required_capacity: course.registered_students,
        }
    }
}

/// Meetings of one course component still to place.
#[derive(Debug, Clone, Copy)]
struct Demand<'c> {
    course: &'c Course,
    component: Component,
    requested: usize,
}

/// Builds weekly grids.
#[derive(Debug, Clone, Copy)]
pub struct ClassScheduler<'a> {
    config: &'a SchedulerConfig,
    grid: &'a TimeGrid,
    rooms: &'a RoomAllocator,
}

impl<'a> ClassScheduler<'a> {
    /// Creates a scheduler over a validated configuration.
    pub fn new(config: &'a SchedulerConfig, grid: &'a TimeGrid, rooms: &'a RoomAllocator) -> Self {
        Self { config, grid, rooms }
    }

    /// Builds the grid of one department in one semester and session.
    ///
    /// Never fails: unplaced meetings end up as deficiencies in
    /// `ctx.report`. Building the same triple twice books its courses twice,
    /// so callers build each triple once per context.
    pub fn build_weekly_grid(
        &self,
        ctx: &mut SchedulingContext,
        catalog: &Catalog,
        semester: u32,
        department: &str,
        session: Session,
    ) -> WeeklyGrid {
        let mut weekly = WeeklyGrid::new(semester, department, session, self.grid);
        let courses = catalog.courses_for(semester, department, session);
        if courses.is_empty() {
            debug!("no courses for {department} sem {semester} {session}");
            return weekly;
        }
        info!(
            "building {department} sem {semester} {session}: {} courses",
            courses.len()
        );

        let cohort = Cohort::of(&weekly, catalog);
        self.place_minor(ctx, &mut weekly, &cohort);

        let (priority, regular): (Vec<&Course>, Vec<&Course>) =
            courses.into_iter().partition(|c| c.is_priority());
        for course in priority.into_iter().chain(regular) {
            self.place_course(ctx, &mut weekly, &cohort, course);
        }
        weekly
    }

    fn duration(&self, component: Component) -> usize {
        let d = &self.config.durations;
        match component {
            Component::Lecture => d.lecture,
            Component::Tutorial => d.tutorial,
            Component::Lab => d.lab,
            Component::Minor => d.minor,
        }
    }

    fn budget(&self, component: Component) -> usize {
        let b = &self.config.budgets;
        match component {
            Component::Lecture => b.lecture,
            Component::Tutorial => b.tutorial,
            Component::Lab => b.lab,
            Component::Minor => b.minor,
        }
    }

    fn place_minor(&self, ctx: &mut SchedulingContext, weekly: &mut WeeklyGrid, cohort: &Cohort) {
        let minor = &self.config.minor;
        if minor.classes_per_week == 0 || minor.exempt_semesters.contains(&cohort.semester) {
            return;
        }

        if let Some(shared) = ctx.sync.minor_slots(cohort.semester).map(<[_]>::to_vec) {
            for placement in &shared {
                if weekly.occupy(placement, &minor.subject, Component::Minor) {
                    ctx.occupancy
                        .mark(cohort.semester, &cohort.department, cohort.session, placement);
                } else {
                    let message = format!(
                        "minor slot {} already taken in {}",
                        self.grid.describe(placement),
                        cohort.department
                    );
                    warn!("{message}");
                    ctx.report.add_deficiency(Deficiency::sync_conflict(
                        &cohort.key(&minor.subject),
                        Component::Minor,
                        message,
                    ));
                }
            }
            return;
        }

        let len = self.config.durations.minor;
        let starts = self.grid.minor_starts(len);
        if starts.is_empty() {
            warn!("no minor window fits {len} slots");
            ctx.report.add_deficiency(
                Deficiency::configuration(
                    cohort.semester,
                    &cohort.department,
                    format!("no minor window fits a {len}-slot class"),
                )
                .with_session(cohort.session),
            );
            return;
        }

        let mut search = BoundedSearch::new(self.config.search, self.budget(Component::Minor));
        let mut used_days = BTreeSet::new();
        let mut chosen = Vec::new();
        while chosen.len() < minor.classes_per_week {
            let tiers = candidate_tiers(self.grid.day_count(), &starts, &[], len, &used_days);
            let occupancy = &ctx.occupancy;
            let found = search.find(tiers, &mut ctx.rng, |p| {
                weekly.is_free(p) && self.department_free(occupancy, cohort, &cohort.department, p)
            });
            let Some(placement) = found else {
                break;
            };
            weekly.occupy(&placement, &minor.subject, Component::Minor);
            ctx.occupancy
                .mark(cohort.semester, &cohort.department, cohort.session, &placement);
            used_days.insert(placement.day);
            chosen.push(placement);
        }

        if chosen.len() < minor.classes_per_week {
            let key = cohort.key(&minor.subject);
            warn!(
                "minor for sem {}: placed {} of {}",
                cohort.semester,
                chosen.len(),
                minor.classes_per_week
            );
            ctx.report.add_deficiency(Deficiency::shortfall(
                &key,
                Component::Minor,
                minor.classes_per_week as u32,
                chosen.len() as u32,
            ));
        }
        if !chosen.is_empty() {
            debug!("fixed {} minor slots for sem {}", chosen.len(), cohort.semester);
            ctx.sync.record_minor(cohort.semester, chosen);
        }
    }

    fn department_free(
        &self,
        occupancy: &GlobalOccupancy,
        cohort: &Cohort,
        department: &str,
        placement: &Placement,
    ) -> bool {
        occupancy.is_available(
            self.config,
            cohort.semester,
            department,
            cohort.session,
            placement,
        )
    }

    /// Whether a placement would cover a common elective slot that one of
    /// the group's departments still has to join.
    fn blocks_electives(
        &self,
        sync: &CrossGroupSynchronizer,
        cohort: &Cohort,
        group: &DepartmentGroup,
        placement: &Placement,
    ) -> bool {
        if !group.departments.iter().any(|d| cohort.offers_electives(d)) {
            return false;
        }
        [Component::Lecture, Component::Tutorial].into_iter().any(|component| {
            sync.elective_slots(cohort.semester, component)
                .is_some_and(|slots| slots.iter().any(|e| e.overlaps(placement)))
        })
    }

    fn place_course(
        &self,
        ctx: &mut SchedulingContext,
        weekly: &mut WeeklyGrid,
        cohort: &Cohort,
        course: &Course,
    ) {
        let key = cohort.key(&course.code);
        let mut alloc = CourseAllocation::new(course);

        let group = if course.is_combined {
            self.config.combined_group_of(&cohort.department)
        } else {
            None
        };
        if course.is_combined && group.is_none() {
            alloc.combined_honored = false;
            let message = format!(
                "{} is combined but {} has no combined group",
                course.code, cohort.department
            );
            warn!("{message}");
            ctx.report.add_deficiency(
                Deficiency::configuration(cohort.semester, &cohort.department, message)
                    .with_session(cohort.session),
            );
        }

        for component in Component::TEACHING {
            let requested = course.weekly.get(component) as usize;
            if requested == 0 {
                continue;
            }
            let demand = Demand {
                course,
                component,
                requested,
            };
            let placed = match group {
                Some(group) => self.place_combined(ctx, weekly, cohort, group, demand, &mut alloc),
                None if course.is_elective && component != Component::Lab => {
                    self.place_elective(ctx, weekly, cohort, demand, &mut alloc)
                }
                None => self.place_regular(ctx, weekly, cohort, demand, &mut alloc),
            };
            if placed < requested {
                if group.is_some() {
                    alloc.combined_honored = false;
                }
                warn!(
                    "{} {component} for {} sem {} {}: placed {placed} of {requested}",
                    course.code, cohort.department, cohort.semester, cohort.session
                );
                ctx.report.add_deficiency(Deficiency::shortfall(
                    &key,
                    component,
                    requested as u32,
                    placed as u32,
                ));
            }
        }
        ctx.report.record(key, alloc);
    }

    fn place_combined(
        &self,
        ctx: &mut SchedulingContext,
        weekly: &mut WeeklyGrid,
        cohort: &Cohort,
        group: &DepartmentGroup,
        demand: Demand<'_>,
        alloc: &mut CourseAllocation,
    ) -> usize {
        let Demand {
            course,
            component,
            requested,
        } = demand;
        let Some(hall) = self.rooms.combined_room() else {
            let message = format!("no combined hall for {}", course.code);
            warn!("{message}");
            ctx.report.add_deficiency(
                Deficiency::configuration(cohort.semester, &cohort.department, message)
                    .with_session(cohort.session),
            );
            return 0;
        };
        if hall.capacity < course.registered_students {
            let message = format!(
                "combined hall {} seats {} but {} needs {}",
                hall.name, hall.capacity, course.code, course.registered_students
            );
            warn!("{message}");
            ctx.report.add_deficiency(
                Deficiency::configuration(cohort.semester, &cohort.department, message)
                    .with_session(cohort.session),
            );
            return 0;
        }

        let kind = RoomRequestKind::Combined { group: &group.name };
        let key = cohort.key(&course.code);
        let sync_key = CombinedKey::new(cohort.semester, &group.name, &course.code, component);
        let mut placed = 0;

        let shared = ctx.sync.combined_slots(&sync_key).to_vec();
        for placement in shared.into_iter().take(requested) {
            if !weekly.is_free(&placement) {
                let message = format!(
                    "combined {} at {} already taken in {}",
                    course.code,
                    self.grid.describe(&placement),
                    cohort.department
                );
                warn!("{message}");
                ctx.report
                    .add_deficiency(Deficiency::sync_conflict(&key, component, message));
                continue;
            }
            let request = cohort.request(course, placement, kind);
            let Some(room) = self.rooms.assign(&mut ctx.rooms, &request) else {
                let message = format!(
                    "combined hall busy for {} at {}",
                    course.code,
                    self.grid.describe(&placement)
                );
                warn!("{message}");
                ctx.report
                    .add_deficiency(Deficiency::sync_conflict(&key, component, message));
                continue;
            };
            weekly.occupy(&placement, &course.code, component);
            ctx.occupancy
                .mark(cohort.semester, &cohort.department, cohort.session, &placement);
            alloc.add(component, placement, Some(room));
            placed += 1;
        }
        if placed > 0 {
            debug!("{} reused {placed} combined {component} slots", cohort.department);
        }

        let len = self.duration(component);
        let (preferred, remaining) = self.grid.regular_starts(len);
        let mut used_days: BTreeSet<DayIndex> = alloc.days_of(component).into_iter().collect();
        let mut search = BoundedSearch::new(self.config.search, self.config.budgets.combined);
        while placed < requested {
            let tiers =
                candidate_tiers(self.grid.day_count(), &preferred, &remaining, len, &used_days);
            let occupancy = &ctx.occupancy;
            let rooms = &ctx.rooms;
            let sync = &ctx.sync;
            let found = search.find(tiers, &mut ctx.rng, |p| {
                weekly.is_free(p)
                    && group
                        .departments
                        .iter()
                        .all(|d| self.department_free(occupancy, cohort, d, p))
                    && !self.blocks_electives(sync, cohort, group, p)
                    && self
                        .rooms
                        .select(rooms, &cohort.request(course, *p, kind))
                        .is_some()
            });
            let Some(placement) = found else {
                break;
            };
            let request = cohort.request(course, placement, kind);
            let Some(room) = self.rooms.assign(&mut ctx.rooms, &request) else {
                break;
            };
            for department in &group.departments {
                ctx.occupancy
                    .mark(cohort.semester, department, cohort.session, &placement);
            }
            weekly.occupy(&placement, &course.code, component);
            ctx.sync.push_combined(sync_key.clone(), placement);
            debug!(
                "combined {} {component} for {} at {}",
                course.code,
                group.name,
                self.grid.describe(&placement)
            );
            alloc.add(component, placement, Some(room));
            used_days.insert(placement.day);
            placed += 1;
        }
        placed
    }

    fn place_elective(
        &self,
        ctx: &mut SchedulingContext,
        weekly: &mut WeeklyGrid,
        cohort: &Cohort,
        demand: Demand<'_>,
        alloc: &mut CourseAllocation,
    ) -> usize {
        let Demand {
            course,
            component,
            requested,
        } = demand;
        let key = cohort.key(&course.code);

        let shared = ctx
            .sync
            .elective_slots(cohort.semester, component)
            .map(<[_]>::to_vec);
        if let Some(shared) = shared {
            let mut placed = 0;
            for placement in shared.into_iter().take(requested) {
                let joinable = weekly.can_join_elective(&placement, component)
                    && (!weekly.is_free(&placement)
                        || self.department_free(
                            &ctx.occupancy,
                            cohort,
                            &cohort.department,
                            &placement,
                        ));
                if !joinable {
                    let message = format!(
                        "elective {} cannot use common slot {} in {}",
                        course.code,
                        self.grid.describe(&placement),
                        cohort.department
                    );
                    warn!("{message}");
                    ctx.report
                        .add_deficiency(Deficiency::sync_conflict(&key, component, message));
                    continue;
                }
                weekly.join_elective(&placement, &course.code, component);
                ctx.occupancy
                    .mark(cohort.semester, &cohort.department, cohort.session, &placement);
                let room = self.elective_room(ctx, cohort, course, component, placement);
                alloc.add(component, placement, room);
                placed += 1;
            }
            return placed;
        }

        // every cohort offering electives must be able to join later
        let len = self.duration(component);
        let (preferred, remaining) = self.grid.regular_starts(len);
        let mut search = BoundedSearch::new(self.config.search, self.config.budgets.elective);
        let mut used_days = BTreeSet::new();
        let mut chosen = Vec::new();
        while chosen.len() < requested {
            let tiers =
                candidate_tiers(self.grid.day_count(), &preferred, &remaining, len, &used_days);
            let occupancy = &ctx.occupancy;
            let found = search.find(tiers, &mut ctx.rng, |p| {
                weekly.is_free(p)
                    && cohort.elective_cohorts.iter().all(|(d, s)| {
                        occupancy.is_available(self.config, cohort.semester, d, *s, p)
                    })
                    && self.department_free(occupancy, cohort, &cohort.department, p)
            });
            let Some(placement) = found else {
                break;
            };
            weekly.join_elective(&placement, &course.code, component);
            ctx.occupancy
                .mark(cohort.semester, &cohort.department, cohort.session, &placement);
            let room = self.elective_room(ctx, cohort, course, component, placement);
            alloc.add(component, placement, room);
            used_days.insert(placement.day);
            chosen.push(placement);
        }

        let placed = chosen.len();
        if placed > 0 {
            info!(
                "common elective {component} slots for sem {}: {}",
                cohort.semester,
                chosen
                    .iter()
                    .map(|p| self.grid.describe(p))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            ctx.sync.record_elective(cohort.semester, component, chosen);
        }
        placed
    }

    /// Electives keep their common slot even without a room.
    fn elective_room(
        &self,
        ctx: &mut SchedulingContext,
        cohort: &Cohort,
        course: &Course,
        component: Component,
        placement: Placement,
    ) -> Option<String> {
        let request = cohort.request(course, placement, RoomRequestKind::Regular);
        let room = self.rooms.assign(&mut ctx.rooms, &request);
        if room.is_none() {
            let message = format!(
                "no room for elective {} at {}",
                course.code,
                self.grid.describe(&placement)
            );
            warn!("{message}");
            ctx.report.add_deficiency(Deficiency::missing_room(
                &cohort.key(&course.code),
                component,
                message,
            ));
        }
        room
    }

    fn place_regular(
        &self,
        ctx: &mut SchedulingContext,
        weekly: &mut WeeklyGrid,
        cohort: &Cohort,
        demand: Demand<'_>,
        alloc: &mut CourseAllocation,
    ) -> usize {
        let Demand {
            course,
            component,
            requested,
        } = demand;
        let len = self.duration(component);
        let (preferred, remaining) = self.grid.regular_starts(len);
        let lab_pool = self.config.lab_pool_for(&cohort.department);
        let kind = if component == Component::Lab {
            RoomRequestKind::Lab { pool: lab_pool }
        } else {
            RoomRequestKind::Regular
        };
        let needs_room = !course.is_minor;
        if component == Component::Lab && needs_room && !self.rooms.has_lab_in(lab_pool) {
            let message = format!("no lab room serves {} for {}", cohort.department, course.code);
            warn!("{message}");
            ctx.report.add_deficiency(
                Deficiency::configuration(cohort.semester, &cohort.department, message)
                    .with_session(cohort.session),
            );
            return 0;
        }

        let mut search = BoundedSearch::new(self.config.search, self.budget(component));
        let mut used_days: BTreeSet<DayIndex> = alloc.days_of(component).into_iter().collect();
        let mut placed = 0;
        while placed < requested {
            let tiers =
                candidate_tiers(self.grid.day_count(), &preferred, &remaining, len, &used_days);
            let occupancy = &ctx.occupancy;
            let rooms = &ctx.rooms;
            let found = search.find(tiers, &mut ctx.rng, |p| {
                weekly.is_free(p)
                    && self.department_free(occupancy, cohort, &cohort.department, p)
                    && (!needs_room
                        || self
                            .rooms
                            .select(rooms, &cohort.request(course, *p, kind))
                            .is_some())
            });
            let Some(placement) = found else {
                break;
            };
            let room = if needs_room {
                let request = cohort.request(course, placement, kind);
                match self.rooms.assign(&mut ctx.rooms, &request) {
                    Some(room) => Some(room),
                    None => break,
                }
            } else {
                None
            };
            weekly.occupy(&placement, &course.code, component);
            ctx.occupancy
                .mark(cohort.semester, &cohort.department, cohort.session, &placement);
            debug!(
                "{} {component} at {} in {}",
                course.code,
                self.grid.describe(&placement),
                room.as_deref().unwrap_or("-")
            );
            alloc.add(component, placement, room);
            used_days.insert(placement.day);
            placed += 1;
        }
        if search.is_exhausted() && placed < requested {
            debug!(
                "{} {component}: budget of {} attempts spent",
                course.code,
                search.attempts()
            );
        }
        placed
    }
}
