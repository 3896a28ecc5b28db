//! Exam day assignment.
//!
//! # Algorithm
//!
//! Courses are deduplicated by code and grouped by department, and each
//! group is shuffled. For each exam day the department order is shuffled.
//! The first half of the departments (at least one) take the forenoon
//! session and the rest the afternoon. Each department contributes at most
//! one course per day. Courses still unassigned after the last day are
//! shuffled and spread round-robin over the days, alternating forenoon and
//! afternoon.

use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::models::{Course, Session};

/// Half-day exam session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExamSession {
    /// Forenoon.
    Forenoon,
    /// Afternoon.
    Afternoon,
}

impl ExamSession {
    /// Both sessions, in day order.
    pub const ALL: [ExamSession; 2] = [ExamSession::Forenoon, ExamSession::Afternoon];

    /// Short label (`FN` / `AN`).
    pub fn label(&self) -> &'static str {
        match self {
            ExamSession::Forenoon => "FN",
            ExamSession::Afternoon => "AN",
        }
    }
}

impl fmt::Display for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One scheduled exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAssignment {
    /// Exam day index.
    pub day: usize,
    /// Half-day session.
    pub session: ExamSession,
    /// Course code.
    pub course: String,
    /// Department the course belongs to.
    pub department: String,
}

/// The exam timetable of one period (mid- or end-semester).
///
/// Days are identified by index, so a calendar that repeats a weekday
/// label still yields distinct exam days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamTimetable {
    /// Teaching session whose courses are examined.
    pub period: Option<Session>,
    /// Day labels, one per exam day.
    pub days: Vec<String>,
    forenoon: Vec<Vec<ExamAssignment>>,
    afternoon: Vec<Vec<ExamAssignment>>,
}

impl ExamTimetable {
    fn new(period: Session, days: &[String]) -> Self {
        Self {
            period: Some(period),
            days: days.to_vec(),
            forenoon: vec![Vec::new(); days.len()],
            afternoon: vec![Vec::new(); days.len()],
        }
    }

    fn push(&mut self, day: usize, session: ExamSession, course: &str, department: &str) {
        let assignment = ExamAssignment {
            day,
            session,
            course: course.to_string(),
            department: department.to_string(),
        };
        match session {
            ExamSession::Forenoon => self.forenoon[day].push(assignment),
            ExamSession::Afternoon => self.afternoon[day].push(assignment),
        }
    }

    /// Number of exam days.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Exams held on one day and session.
    pub fn exams(&self, day: usize, session: ExamSession) -> &[ExamAssignment] {
        let column = match session {
            ExamSession::Forenoon => &self.forenoon,
            ExamSession::Afternoon => &self.afternoon,
        };
        column.get(day).map_or(&[], Vec::as_slice)
    }

    /// Course codes examined on one day and session.
    pub fn courses(&self, day: usize, session: ExamSession) -> Vec<&str> {
        self.exams(day, session).iter().map(|e| e.course.as_str()).collect()
    }

    /// Every exam, by day then session.
    pub fn entries(&self) -> impl Iterator<Item = &ExamAssignment> {
        (0..self.days.len()).flat_map(move |day| {
            ExamSession::ALL
                .into_iter()
                .flat_map(move |session| self.exams(day, session).iter())
        })
    }

    /// When a course is examined.
    pub fn slot_of(&self, course: &str) -> Option<(usize, ExamSession)> {
        self.entries()
            .find(|e| e.course == course)
            .map(|e| (e.day, e.session))
    }

    /// Number of exams scheduled.
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spreads a period's exams over the exam calendar.
#[derive(Debug, Clone)]
pub struct ExamDayScheduler<'a> {
    calendar: &'a [String],
}

impl<'a> ExamDayScheduler<'a> {
    /// Creates a scheduler over an exam calendar.
    pub fn new(calendar: &'a [String]) -> Self {
        Self { calendar }
    }

    /// Assigns every course of a period to a day and half-day session.
    ///
    /// Uses at most `num_days` days of the calendar. With zero days nothing
    /// is scheduled.
    pub fn assign_exam_days<R: Rng + ?Sized>(
        &self,
        courses: &[&Course],
        num_days: usize,
        period: Session,
        rng: &mut R,
    ) -> ExamTimetable {
        let days = &self.calendar[..num_days.min(self.calendar.len())];
        let mut timetable = ExamTimetable::new(period, days);
        if days.is_empty() {
            return timetable;
        }

        // department -> pending codes, in first-seen order
        let mut seen = HashSet::new();
        let mut departments: Vec<String> = Vec::new();
        let mut pending: HashMap<String, Vec<String>> = HashMap::new();
        for course in courses {
            if !seen.insert(course.code.as_str()) {
                continue;
            }
            if !pending.contains_key(&course.department) {
                departments.push(course.department.clone());
            }
            pending
                .entry(course.department.clone())
                .or_default()
                .push(course.code.clone());
        }
        for department in &departments {
            if let Some(codes) = pending.get_mut(department) {
                codes.shuffle(rng);
            }
        }

        for day in 0..days.len() {
            let mut order: Vec<&String> = departments
                .iter()
                .filter(|d| pending.get(*d).is_some_and(|c| !c.is_empty()))
                .collect();
            if order.is_empty() {
                break;
            }
            order.shuffle(rng);
            let forenoon_count = if order.len() > 1 { order.len() / 2 } else { 1 };
            for (i, department) in order.into_iter().enumerate() {
                let session = if i < forenoon_count {
                    ExamSession::Forenoon
                } else {
                    ExamSession::Afternoon
                };
                if let Some(code) = pending.get_mut(department).and_then(Vec::pop) {
                    timetable.push(day, session, &code, department);
                }
            }
        }

        let mut leftovers: Vec<(String, String)> = departments
            .iter()
            .flat_map(|d| {
                pending
                    .get(d)
                    .into_iter()
                    .flatten()
                    .map(move |code| (d.clone(), code.clone()))
            })
            .collect();
        if !leftovers.is_empty() {
            debug!("{} exams left after one pass, spreading round-robin", leftovers.len());
            leftovers.shuffle(rng);
            for (idx, (department, code)) in leftovers.iter().enumerate() {
                let session = if idx % 2 == 0 {
                    ExamSession::Forenoon
                } else {
                    ExamSession::Afternoon
                };
                timetable.push(idx % days.len(), session, code, department);
            }
        }

        info!(
            "{} exams over {} days for {}",
            timetable.len(),
            days.len(),
            period
        );
        timetable
    }
}

/// Departments examined on a day (both sessions).
pub fn departments_on(timetable: &ExamTimetable, day: usize) -> BTreeSet<&str> {
    ExamSession::ALL
        .into_iter()
        .flat_map(|s| timetable.exams(day, s))
        .map(|e| e.department.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn calendar() -> Vec<String> {
        ["Saturday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Monday"]
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    fn courses() -> Vec<Course> {
        let mut out = Vec::new();
        for dept in ["CSE-A", "CSE-B", "DSAI", "ECE"] {
            for i in 0..4 {
                out.push(Course::new(format!("{dept}-{i}"), dept, 3));
            }
        }
        out
    }

    #[test]
    fn test_every_course_scheduled_once() {
        let cal = calendar();
        let owned = courses();
        let refs: Vec<&Course> = owned.iter().collect();
        let mut rng = SmallRng::seed_from_u64(42);

        let tt = ExamDayScheduler::new(&cal).assign_exam_days(&refs, 7, Session::PreMid, &mut rng);

        assert_eq!(tt.day_count(), 7);
        assert_eq!(tt.len(), 16);
        for c in &owned {
            assert!(tt.slot_of(&c.code).is_some(), "{} missing", c.code);
        }
        let codes: HashSet<&str> = tt.entries().map(|e| e.course.as_str()).collect();
        assert_eq!(codes.len(), 16);
    }

    #[test]
    fn test_one_course_per_department_per_day() {
        let cal = calendar();
        let owned = courses();
        let refs: Vec<&Course> = owned.iter().collect();
        let mut rng = SmallRng::seed_from_u64(42);

        let tt = ExamDayScheduler::new(&cal).assign_exam_days(&refs, 7, Session::PostMid, &mut rng);

        for day in 0..tt.day_count() {
            let exams: Vec<&ExamAssignment> = ExamSession::ALL
                .into_iter()
                .flat_map(|s| tt.exams(day, s))
                .collect();
            assert_eq!(exams.len(), departments_on(&tt, day).len());
        }
        // 4 departments: two in each session on the first day
        assert_eq!(tt.exams(0, ExamSession::Forenoon).len(), 2);
        assert_eq!(tt.exams(0, ExamSession::Afternoon).len(), 2);
    }

    #[test]
    fn test_uneven_supply_keeps_one_exam_per_department() {
        let cal = calendar();
        let mut owned: Vec<Course> = (0..2)
            .map(|i| Course::new(format!("CS30{i}"), "CSE-A", 3))
            .collect();
        owned.extend((0..6).map(|i| Course::new(format!("EC30{i}"), "ECE", 3)));
        let refs: Vec<&Course> = owned.iter().collect();

        for seed in 0..10 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let tt =
                ExamDayScheduler::new(&cal).assign_exam_days(&refs, 7, Session::PreMid, &mut rng);
            assert_eq!(tt.len(), 8);

            for day in 0..tt.day_count() {
                let expected: BTreeSet<&str> = match day {
                    0 | 1 => BTreeSet::from(["CSE-A", "ECE"]),
                    2..=5 => BTreeSet::from(["ECE"]),
                    _ => BTreeSet::new(),
                };
                assert_eq!(departments_on(&tt, day), expected, "seed {seed} day {day}");

                let forenoon = tt.exams(day, ExamSession::Forenoon).len();
                let afternoon = tt.exams(day, ExamSession::Afternoon).len();
                assert_eq!(forenoon + afternoon, expected.len(), "seed {seed} day {day}");
                // a lone department always sits in the forenoon
                if expected.len() == 1 {
                    assert_eq!((forenoon, afternoon), (1, 0));
                }
                if expected.len() == 2 {
                    assert_eq!((forenoon, afternoon), (1, 1));
                }
            }
        }
    }

    #[test]
    fn test_single_department_goes_forenoon() {
        let cal = calendar();
        let owned = vec![Course::new("CS301", "CSE-A", 3), Course::new("CS302", "CSE-A", 3)];
        let refs: Vec<&Course> = owned.iter().collect();
        let mut rng = SmallRng::seed_from_u64(42);

        let tt = ExamDayScheduler::new(&cal).assign_exam_days(&refs, 7, Session::PreMid, &mut rng);
        assert_eq!(tt.exams(0, ExamSession::Forenoon).len(), 1);
        assert_eq!(tt.exams(1, ExamSession::Forenoon).len(), 1);
        assert!(tt.exams(0, ExamSession::Afternoon).is_empty());
    }

    #[test]
    fn test_duplicate_codes_collapsed() {
        let cal = calendar();
        let owned = vec![Course::new("CS205", "CSE-A", 3), Course::new("CS205", "CSE-B", 3)];
        let refs: Vec<&Course> = owned.iter().collect();
        let mut rng = SmallRng::seed_from_u64(42);

        let tt = ExamDayScheduler::new(&cal).assign_exam_days(&refs, 7, Session::PreMid, &mut rng);
        assert_eq!(tt.len(), 1);
        assert_eq!(tt.entries().next().map(|e| e.department.as_str()), Some("CSE-A"));
    }

    #[test]
    fn test_leftovers_spread_round_robin() {
        let cal = calendar();
        let owned: Vec<Course> = (0..5)
            .map(|i| Course::new(format!("CS{i}"), "CSE-A", 3))
            .collect();
        let refs: Vec<&Course> = owned.iter().collect();
        let mut rng = SmallRng::seed_from_u64(42);

        let tt = ExamDayScheduler::new(&cal).assign_exam_days(&refs, 2, Session::PreMid, &mut rng);
        assert_eq!(tt.day_count(), 2);
        assert_eq!(tt.len(), 5);
        // first pass: one per day; leftovers 3 -> day 0 FN, day 1 AN, day 0 FN
        assert_eq!(tt.exams(0, ExamSession::Forenoon).len(), 3);
        assert_eq!(tt.exams(1, ExamSession::Forenoon).len(), 1);
        assert_eq!(tt.exams(1, ExamSession::Afternoon).len(), 1);
    }

    #[test]
    fn test_zero_days_schedules_nothing() {
        let cal = calendar();
        let owned = courses();
        let refs: Vec<&Course> = owned.iter().collect();
        let mut rng = SmallRng::seed_from_u64(42);
        let tt = ExamDayScheduler::new(&cal).assign_exam_days(&refs, 0, Session::PreMid, &mut rng);
        assert!(tt.is_empty());
    }
}
