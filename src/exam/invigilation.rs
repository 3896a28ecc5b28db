//! Invigilation duties.
//!
//! For every sitting that has exams, a random subset of exam rooms is
//! staffed from a shuffled faculty list, round-robin, with distinct
//! invigilators inside a room whenever the faculty list is long enough.

use log::warn;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use super::days::{ExamSession, ExamTimetable};
use crate::config::ExamConfig;
use crate::models::Room;

/// Invigilators assigned to one room for one sitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvigilationDuty {
    /// Exam day index.
    pub day: usize,
    /// Half-day session.
    pub session: ExamSession,
    /// Room name.
    pub room: String,
    /// Faculty on duty.
    pub invigilators: Vec<String>,
}

/// Staffs exam rooms.
#[derive(Debug, Clone)]
pub struct InvigilationPlanner<'a> {
    layout: &'a ExamConfig,
}

impl<'a> InvigilationPlanner<'a> {
    /// Creates a planner.
    pub fn new(layout: &'a ExamConfig) -> Self {
        Self { layout }
    }

    /// Plans duties for every sitting of a timetable.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        timetable: &ExamTimetable,
        rooms: &[&Room],
        faculty: &[String],
        rng: &mut R,
    ) -> Vec<InvigilationDuty> {
        if rooms.is_empty() {
            warn!("no exam rooms available for invigilation");
            return Vec::new();
        }
        if faculty.is_empty() {
            warn!("no faculty available for invigilation");
            return Vec::new();
        }

        let per_room = self.layout.invigilators_per_room.min(faculty.len());
        let room_count = self.layout.rooms_per_session.min(rooms.len());
        let mut duties = Vec::new();

        for day in 0..timetable.day_count() {
            for session in ExamSession::ALL {
                if timetable.exams(day, session).is_empty() {
                    continue;
                }
                let mut selected: Vec<&Room> =
                    rooms.choose_multiple(rng, room_count).copied().collect();
                selected.sort_by(|a, b| a.name.cmp(&b.name));

                let mut staff: Vec<&String> = faculty.iter().collect();
                staff.shuffle(rng);
                let mut cursor = 0;

                for room in selected {
                    let mut invigilators: Vec<String> = Vec::with_capacity(per_room);
                    // at most one pass over the faculty list per room
                    for _ in 0..staff.len() {
                        if invigilators.len() == per_room {
                            break;
                        }
                        let candidate = staff[cursor % staff.len()];
                        cursor += 1;
                        if !invigilators.contains(candidate) {
                            invigilators.push(candidate.clone());
                        }
                    }
                    duties.push(InvigilationDuty {
                        day,
                        session,
                        room: room.name.clone(),
                        invigilators,
                    });
                }
            }
        }
        duties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::ExamDayScheduler;
    use crate::models::{Course, Session};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn timetable(rng: &mut SmallRng) -> ExamTimetable {
        let calendar = vec!["Monday".to_string(), "Tuesday".to_string()];
        let owned = vec![Course::new("CS301", "CSE-A", 3), Course::new("EC301", "ECE", 3)];
        let refs: Vec<&Course> = owned.iter().collect();
        ExamDayScheduler::new(&calendar).assign_exam_days(&refs, 2, Session::PreMid, rng)
    }

    #[test]
    fn test_two_distinct_invigilators_per_room() {
        let mut rng = SmallRng::seed_from_u64(42);
        let tt = timetable(&mut rng);
        let layout = ExamConfig::default();
        let rooms = [Room::classroom("C101", 60), Room::classroom("C102", 60)];
        let room_refs: Vec<&Room> = rooms.iter().collect();
        let faculty: Vec<String> = ["F1", "F2", "F3"].iter().map(|f| f.to_string()).collect();

        let duties = InvigilationPlanner::new(&layout).plan(&tt, &room_refs, &faculty, &mut rng);

        // day 0 has one exam in each session, day 1 none
        assert_eq!(duties.len(), 4);
        for duty in &duties {
            assert_eq!(duty.day, 0);
            assert_eq!(duty.invigilators.len(), 2);
            assert_ne!(duty.invigilators[0], duty.invigilators[1]);
        }
    }

    #[test]
    fn test_single_faculty_member() {
        let mut rng = SmallRng::seed_from_u64(42);
        let tt = timetable(&mut rng);
        let layout = ExamConfig::default();
        let rooms = [Room::classroom("C101", 60)];
        let room_refs: Vec<&Room> = rooms.iter().collect();
        let faculty = vec!["F1".to_string()];

        let duties = InvigilationPlanner::new(&layout).plan(&tt, &room_refs, &faculty, &mut rng);
        assert!(duties.iter().all(|d| d.invigilators == vec!["F1".to_string()]));
    }

    #[test]
    fn test_no_faculty_no_duties() {
        let mut rng = SmallRng::seed_from_u64(42);
        let tt = timetable(&mut rng);
        let layout = ExamConfig::default();
        let rooms = [Room::classroom("C101", 60)];
        let room_refs: Vec<&Room> = rooms.iter().collect();
        assert!(InvigilationPlanner::new(&layout).plan(&tt, &room_refs, &[], &mut rng).is_empty());
    }
}
