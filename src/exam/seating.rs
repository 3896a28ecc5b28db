//! Exam seating.
//!
//! Students sit on two-seat benches. Two students may share a bench only if
//! they are from different semesters, or from the same semester with no
//! exam course of the sitting in common.
//!
//! # Algorithm
//!
//! For each room the candidate pool is shuffled and benches are filled
//! greedily: take the first student, then look for a partner from another
//! semester, then for a same-semester partner with no shared course.
//! Without a partner the student sits alone. Rooms draw from one shared
//! pool, so a student is seated at most once per session.

use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::days::{ExamSession, ExamTimetable};
use crate::config::ExamConfig;
use crate::models::{Catalog, Room};

/// A student waiting for a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamCandidate {
    /// Roll number.
    pub roll_no: String,
    /// Semester number.
    pub semester: u32,
    /// Courses of the sitting this student writes (empty if unknown).
    pub courses: BTreeSet<String>,
}

impl ExamCandidate {
    /// Creates a candidate writing one course.
    pub fn new(roll_no: impl Into<String>, semester: u32, course: impl Into<String>) -> Self {
        let course = course.into();
        let mut courses = BTreeSet::new();
        if !course.is_empty() {
            courses.insert(course);
        }
        Self {
            roll_no: roll_no.into(),
            semester,
            courses,
        }
    }

    /// Adds another course written in the same sitting.
    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.courses.insert(course.into());
        self
    }

    /// Whether two candidates may share a bench.
    ///
    /// Same-semester students may share only when both course sets are
    /// known and have no course in common.
    pub fn can_share_with(&self, other: &ExamCandidate) -> bool {
        self.semester != other.semester
            || (!self.courses.is_empty()
                && !other.courses.is_empty()
                && self.courses.is_disjoint(&other.courses))
    }
}

/// Reverse index from course code to enrolled (semester, roll number) pairs.
#[derive(Debug, Clone, Default)]
pub struct CourseRoster {
    enrolled: HashMap<String, Vec<(u32, String)>>,
}

impl CourseRoster {
    /// Derives enrolment from the catalog: a student writes every course of
    /// their semester and department.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut enrolled: HashMap<String, Vec<(u32, String)>> = HashMap::new();
        for student in &catalog.students {
            for code in catalog.enrolled_courses(student) {
                enrolled
                    .entry(code.to_string())
                    .or_default()
                    .push((student.semester, student.roll_no.clone()));
            }
        }
        Self { enrolled }
    }

    /// Adds one enrolment explicitly.
    pub fn enroll(&mut self, course: impl Into<String>, semester: u32, roll_no: impl Into<String>) {
        self.enrolled
            .entry(course.into())
            .or_default()
            .push((semester, roll_no.into()));
    }

    /// Students writing a course.
    pub fn students_for(&self, course: &str) -> &[(u32, String)] {
        self.enrolled.get(course).map_or(&[], Vec::as_slice)
    }

    /// Candidates for a set of concurrent exams, one entry per student.
    ///
    /// A student enrolled in several of the courses carries all of them.
    pub fn candidates_for(&self, courses: &[&str]) -> Vec<ExamCandidate> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut out: Vec<ExamCandidate> = Vec::new();
        for course in courses {
            for (semester, roll_no) in self.students_for(course) {
                match index.get(roll_no.as_str()) {
                    Some(&i) => {
                        out[i].courses.insert(course.to_string());
                    }
                    None => {
                        index.insert(roll_no.as_str(), out.len());
                        out.push(ExamCandidate::new(roll_no.clone(), *semester, *course));
                    }
                }
            }
        }
        out
    }
}

/// One bench.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bench {
    /// 1-based bench number within the room.
    pub number: usize,
    /// First occupant.
    pub first: ExamCandidate,
    /// Second occupant, if any.
    pub second: Option<ExamCandidate>,
}

impl Bench {
    /// Occupants on the bench.
    pub fn occupants(&self) -> impl Iterator<Item = &ExamCandidate> {
        std::iter::once(&self.first).chain(self.second.as_ref())
    }
}

/// Seating of one exam period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatingPlan {
    /// Benches per (day, session), then per room.
    pub rooms: BTreeMap<(usize, ExamSession), BTreeMap<String, Vec<Bench>>>,
    /// Students left without a seat per (day, session).
    pub unseated: BTreeMap<(usize, ExamSession), Vec<ExamCandidate>>,
}

impl SeatingPlan {
    /// Benches of one room in one sitting.
    pub fn benches(&self, day: usize, session: ExamSession, room: &str) -> &[Bench] {
        self.rooms
            .get(&(day, session))
            .and_then(|r| r.get(room))
            .map_or(&[], Vec::as_slice)
    }

    /// Seated students across the whole plan.
    pub fn seated_count(&self) -> usize {
        self.rooms
            .values()
            .flat_map(|by_room| by_room.values())
            .flatten()
            .map(|b| b.occupants().count())
            .sum()
    }

    /// One room's benches, keyed by sitting.
    pub fn room_schedule(&self, room: &str) -> BTreeMap<(usize, ExamSession), &[Bench]> {
        self.rooms
            .iter()
            .filter_map(|(sitting, by_room)| by_room.get(room).map(|b| (*sitting, b.as_slice())))
            .collect()
    }

    /// Unseated students across the whole plan.
    pub fn unseated_count(&self) -> usize {
        self.unseated.values().map(Vec::len).sum()
    }
}

/// Fills benches under the pairing rule.
#[derive(Debug, Clone)]
pub struct SeatingAllocator<'a> {
    layout: &'a ExamConfig,
}

impl<'a> SeatingAllocator<'a> {
    /// Creates an allocator for a bench layout.
    pub fn new(layout: &'a ExamConfig) -> Self {
        Self { layout }
    }

    /// Benches usable in a room of the given exam capacity.
    pub fn bench_limit(&self, capacity: u32) -> usize {
        let seats = (capacity as usize).min(self.layout.max_seats());
        seats
            .div_ceil(self.layout.seats_per_bench.max(1))
            .min(self.layout.max_benches())
    }

    /// Exam capacity of a room (declared or the default layout).
    pub fn capacity_of(&self, room: &Room) -> u32 {
        room.exam_capacity.unwrap_or(self.layout.default_capacity)
    }

    /// Seats students from `pool` into one room, removing them from the pool.
    pub fn assign_seats<R: Rng + ?Sized>(
        &self,
        capacity: u32,
        pool: &mut Vec<ExamCandidate>,
        rng: &mut R,
    ) -> Vec<Bench> {
        let limit = self.bench_limit(capacity);
        pool.shuffle(rng);

        let mut benches = Vec::new();
        while benches.len() < limit && !pool.is_empty() {
            let first = pool.remove(0);
            let partner = pool
                .iter()
                .position(|c| c.semester != first.semester)
                .or_else(|| pool.iter().position(|c| first.can_share_with(c)));
            let second = partner.map(|i| pool.remove(i));
            benches.push(Bench {
                number: benches.len() + 1,
                first,
                second,
            });
        }
        benches
    }

    /// Seats one sitting's candidates across rooms, in the given order.
    ///
    /// Each room draws from what earlier rooms left. Returns the benches per
    /// room and the students nobody could seat.
    pub fn plan_session<R: Rng + ?Sized>(
        &self,
        mut pool: Vec<ExamCandidate>,
        rooms: &[&Room],
        rng: &mut R,
    ) -> (BTreeMap<String, Vec<Bench>>, Vec<ExamCandidate>) {
        let mut by_room = BTreeMap::new();
        for room in rooms {
            if pool.is_empty() {
                break;
            }
            let benches = self.assign_seats(self.capacity_of(room), &mut pool, rng);
            if !benches.is_empty() {
                by_room.insert(room.name.clone(), benches);
            }
        }
        (by_room, pool)
    }

    /// Seats every sitting of a timetable across the exam rooms.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        timetable: &ExamTimetable,
        roster: &CourseRoster,
        rooms: &[&Room],
        rng: &mut R,
    ) -> SeatingPlan {
        let mut plan = SeatingPlan::default();
        for day in 0..timetable.day_count() {
            for session in ExamSession::ALL {
                let courses = timetable.courses(day, session);
                if courses.is_empty() {
                    continue;
                }
                let pool = roster.candidates_for(&courses);
                let total = pool.len();
                let (by_room, unseated) = self.plan_session(pool, rooms, rng);
                debug!(
                    "day {day} {session}: {} of {total} students seated in {} rooms",
                    total - unseated.len(),
                    by_room.len()
                );
                if !unseated.is_empty() {
                    warn!("day {day} {session}: {} students without a seat", unseated.len());
                    plan.unseated.insert((day, session), unseated);
                }
                if !by_room.is_empty() {
                    plan.rooms.insert((day, session), by_room);
                }
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::ExamDayScheduler;
    use crate::models::{Course, Session, Student};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    fn same_course(n: usize) -> Vec<ExamCandidate> {
        (0..n)
            .map(|i| ExamCandidate::new(format!("R{i:03}"), 3, "CS301"))
            .collect()
    }

    fn assert_benches_compatible(benches: &[Bench]) {
        for bench in benches {
            if let Some(second) = &bench.second {
                assert!(
                    bench.first.can_share_with(second),
                    "bench {} pairs {:?}",
                    bench.number,
                    bench
                );
            }
        }
    }

    #[test]
    fn test_bench_limit() {
        let layout = ExamConfig::default();
        let seating = SeatingAllocator::new(&layout);
        assert_eq!(seating.bench_limit(48), 24);
        assert_eq!(seating.bench_limit(100), 24);
        assert_eq!(seating.bench_limit(7), 4);
        assert_eq!(seating.bench_limit(0), 0);
    }

    #[test]
    fn test_share_rule() {
        let a = ExamCandidate::new("A", 3, "CS301");
        assert!(a.can_share_with(&ExamCandidate::new("B", 5, "CS301")));
        assert!(a.can_share_with(&ExamCandidate::new("B", 3, "CS302")));
        assert!(!a.can_share_with(&ExamCandidate::new("B", 3, "CS301")));
        assert!(!a.can_share_with(&ExamCandidate::new("B", 3, "")));

        // both write CS305 alongside different department papers
        let both = ExamCandidate::new("C", 3, "CS301").with_course("CS305");
        assert!(!both.can_share_with(&ExamCandidate::new("D", 3, "CS305")));
        assert!(both.can_share_with(&ExamCandidate::new("E", 3, "CS311")));
    }

    #[test]
    fn test_same_semester_same_course_sit_alone() {
        let layout = ExamConfig::default();
        let seating = SeatingAllocator::new(&layout);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pool = same_course(50);

        let benches = seating.assign_seats(48, &mut pool, &mut rng);

        assert_eq!(benches.len(), 24);
        assert!(benches.iter().all(|b| b.second.is_none()));
        assert_eq!(pool.len(), 26);
    }

    #[test]
    fn test_mixed_semesters_pair_up() {
        let layout = ExamConfig::default();
        let seating = SeatingAllocator::new(&layout);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pool: Vec<ExamCandidate> = (0..10)
            .map(|i| ExamCandidate::new(format!("A{i}"), 3, "CS301"))
            .chain((0..10).map(|i| ExamCandidate::new(format!("B{i}"), 5, "CS501")))
            .collect();

        let benches = seating.assign_seats(48, &mut pool, &mut rng);

        assert_eq!(benches.len(), 10);
        assert!(benches.iter().all(|b| b.second.is_some()));
        assert_benches_compatible(&benches);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_same_semester_different_courses_pair() {
        let layout = ExamConfig::default();
        let seating = SeatingAllocator::new(&layout);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pool = vec![
            ExamCandidate::new("A", 3, "CS301"),
            ExamCandidate::new("B", 3, "EC301"),
        ];
        let benches = seating.assign_seats(48, &mut pool, &mut rng);
        assert_eq!(benches.len(), 1);
        assert!(benches[0].second.is_some());
    }

    #[test]
    fn test_roster_dedupes_candidates() {
        let catalog = Catalog::new()
            .with_course(Course::new("CS301", "CSE-A", 3))
            .with_course(Course::new("CS302", "CSE-A", 3))
            .with_course(Course::new("CS501", "CSE-A", 5))
            .with_student(Student::new("S1", 3, "CSE-A"))
            .with_student(Student::new("S2", 5, "CSE-A"));
        let roster = CourseRoster::from_catalog(&catalog);

        assert_eq!(roster.students_for("CS301").len(), 1);
        let pool = roster.candidates_for(&["CS301", "CS302", "CS501"]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0], ExamCandidate::new("S1", 3, "CS301").with_course("CS302"));
        assert_eq!(pool[1].courses, BTreeSet::from(["CS501".to_string()]));
    }

    #[test]
    fn test_plan_session_reports_unseated() {
        let layout = ExamConfig::default();
        let seating = SeatingAllocator::new(&layout);
        let mut rng = SmallRng::seed_from_u64(42);
        let room = Room::classroom("C101", 60).with_exam_capacity(6);

        let (by_room, unseated) = seating.plan_session(same_course(5), &[&room], &mut rng);
        assert_eq!(by_room["C101"].len(), 3);
        assert_eq!(unseated.len(), 2);
    }

    #[test]
    fn test_plan_spreads_over_rooms_without_reseating() {
        let layout = ExamConfig::default();
        let seating = SeatingAllocator::new(&layout);
        let mut rng = SmallRng::seed_from_u64(42);

        let mut catalog = Catalog::new().with_course(Course::new("CS301", "CSE-A", 3));
        for i in 0..50 {
            catalog = catalog.with_student(Student::new(format!("R{i:03}"), 3, "CSE-A"));
        }
        let roster = CourseRoster::from_catalog(&catalog);
        let owned = catalog.courses.clone();
        let refs: Vec<&Course> = owned.iter().collect();
        let calendar = vec!["Monday".to_string()];
        let timetable = ExamDayScheduler::new(&calendar).assign_exam_days(
            &refs,
            1,
            Session::PreMid,
            &mut rng,
        );

        let r1 = Room::classroom("C101", 60);
        let r2 = Room::classroom("C102", 60).with_exam_capacity(10);
        let plan = seating.plan(&timetable, &roster, &[&r1, &r2], &mut rng);

        assert_eq!(plan.benches(0, ExamSession::Forenoon, "C101").len(), 24);
        assert_eq!(plan.benches(0, ExamSession::Forenoon, "C102").len(), 5);
        assert_eq!(plan.seated_count(), 29);
        assert_eq!(plan.unseated_count(), 21);
        assert_eq!(plan.room_schedule("C102").len(), 1);

        let mut seen = HashSet::new();
        for rooms in plan.rooms.values() {
            for benches in rooms.values() {
                assert_benches_compatible(benches);
                for student in benches.iter().flat_map(|b| b.occupants()) {
                    assert!(seen.insert(student.roll_no.clone()));
                }
            }
        }
    }

    #[test]
    fn test_shared_combined_paper_blocks_pairing() {
        let layout = ExamConfig::default();
        let seating = SeatingAllocator::new(&layout);
        let mut catalog = Catalog::new()
            .with_course(Course::new("CS301", "CSE-A", 3))
            .with_course(Course::new("CS305", "CSE-A", 3).combined())
            .with_course(Course::new("CS305", "CSE-B", 3).combined());
        for i in 0..10 {
            catalog = catalog
                .with_student(Student::new(format!("A{i}"), 3, "CSE-A"))
                .with_student(Student::new(format!("B{i}"), 3, "CSE-B"));
        }
        let roster = CourseRoster::from_catalog(&catalog);
        let refs: Vec<&Course> = catalog.courses.iter().collect();
        let calendar = vec!["Monday".to_string()];
        let room = Room::classroom("C101", 60);

        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let timetable = ExamDayScheduler::new(&calendar).assign_exam_days(
                &refs,
                1,
                Session::PreMid,
                &mut rng,
            );
            assert_eq!(timetable.courses(0, ExamSession::Forenoon).len(), 2);

            let plan = seating.plan(&timetable, &roster, &[&room], &mut rng);
            let benches = plan.benches(0, ExamSession::Forenoon, "C101");
            assert_eq!(benches.len(), 20);
            // every pair of students shares CS305 or CS301, so all sit alone
            assert!(benches.iter().all(|b| b.second.is_none()), "seed {seed}");
            assert_benches_compatible(benches);
        }
    }
}
