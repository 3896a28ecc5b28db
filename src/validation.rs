//! Input validation and post-run auditing.
//!
//! [`validate_catalog`] checks the structural integrity of a catalog before
//! scheduling. Detects:
//! - Duplicate course rows, room names and roll numbers
//! - Courses for departments the configuration does not know
//! - More than one combined-only room, or combined courses with none
//! - Rooms that seat nobody
//!
//! [`ConflictValidator`] audits the room booking log after a run and
//! reports any room held twice at the same (semester, day, slot).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::config::SchedulerConfig;
use crate::models::{Catalog, DayIndex, RoomKind, Session, SlotIndex};
use crate::timetable::RoomBooking;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two records share the same key.
    DuplicateId,
    /// A course names a department outside the configuration.
    UnknownDepartment,
    /// More than one combined-only room.
    MultipleCombinedRooms,
    /// Combined courses exist but no combined-only room does.
    MissingCombinedRoom,
    /// A room has zero capacity.
    ZeroCapacity,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a catalog against a configuration.
///
/// Checks:
/// 1. No duplicate (code, department, semester) course rows
/// 2. No duplicate room names
/// 3. No duplicate roll numbers
/// 4. Every course department is configured
/// 5. At most one combined-only room, and one exists if any course is combined
/// 6. Every room has a positive capacity
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(catalog: &Catalog, config: &SchedulerConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let mut rows = HashSet::new();
    for course in &catalog.courses {
        if !rows.insert((course.code.as_str(), course.department.as_str(), course.semester)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!(
                    "Duplicate course: {} for {} in semester {}",
                    course.code, course.department, course.semester
                ),
            ));
        }
        if !config.departments.iter().any(|d| d == &course.department) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownDepartment,
                format!(
                    "Course '{}' names unknown department '{}'",
                    course.code, course.department
                ),
            ));
        }
    }

    let mut room_names = HashSet::new();
    for room in &catalog.rooms {
        if !room_names.insert(room.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room: {}", room.name),
            ));
        }
        if room.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!("Room '{}' has zero capacity", room.name),
            ));
        }
    }

    let mut rolls = HashSet::new();
    for student in &catalog.students {
        if !rolls.insert(student.roll_no.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate roll number: {}", student.roll_no),
            ));
        }
    }

    let halls = catalog
        .rooms
        .iter()
        .filter(|r| r.kind == RoomKind::CombinedOnly)
        .count();
    if halls > 1 {
        errors.push(ValidationError::new(
            ValidationErrorKind::MultipleCombinedRooms,
            format!("{halls} combined-only rooms; only the first is used"),
        ));
    }
    if halls == 0 && catalog.courses.iter().any(|c| c.is_combined) {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingCombinedRoom,
            "Combined courses exist but no combined-only room is defined",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// One party to a room conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// Booking department.
    pub department: String,
    /// Course code.
    pub course: String,
    /// Session.
    pub session: Session,
}

/// A room held more than once at the same (semester, day, slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConflict {
    /// Semester number.
    pub semester: u32,
    /// Day index.
    pub day: DayIndex,
    /// Slot index.
    pub slot: SlotIndex,
    /// Room name.
    pub room: String,
    /// Every booking of the room at that cell.
    pub entries: Vec<ConflictEntry>,
}

/// Audits a booking log for double-booked rooms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictValidator;

impl ConflictValidator {
    /// Groups bookings by (semester, day, slot, room) and reports every
    /// group with more than one entry, in key order.
    pub fn validate(bookings: &[RoomBooking]) -> Vec<RoomConflict> {
        let mut groups: BTreeMap<(u32, DayIndex, SlotIndex, &str), Vec<&RoomBooking>> =
            BTreeMap::new();
        for booking in bookings {
            let key = (booking.semester, booking.day, booking.slot, booking.room.as_str());
            groups
                .entry(key)
                .or_default()
                .push(booking);
        }
        groups
            .into_iter()
            .filter(|(_, group)| group.len() > 1)
            .map(|((semester, day, slot, room), group)| RoomConflict {
                semester,
                day,
                slot,
                room: room.to_string(),
                entries: group
                    .into_iter()
                    .map(|b| ConflictEntry {
                        department: b.department.clone(),
                        course: b.course.clone(),
                        session: b.session,
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Room, Student};

    fn valid_catalog() -> Catalog {
        Catalog::new()
            .with_course(Course::new("CS301", "CSE-A", 3).with_load(3, 1, 0))
            .with_course(Course::new("CS301", "CSE-B", 3).with_load(3, 1, 0).combined())
            .with_room(Room::classroom("C101", 60))
            .with_room(Room::combined_hall("C004", 240))
            .with_student(Student::new("23BCS001", 3, "CSE-A"))
    }

    #[test]
    fn test_valid_catalog() {
        assert!(validate_catalog(&valid_catalog(), &SchedulerConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_records() {
        let catalog = valid_catalog()
            .with_course(Course::new("CS301", "CSE-A", 3))
            .with_room(Room::classroom("C101", 40))
            .with_student(Student::new("23BCS001", 3, "CSE-A"));
        let errors = validate_catalog(&catalog, &SchedulerConfig::default()).unwrap_err();
        let dups = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::DuplicateId)
            .count();
        assert_eq!(dups, 3);
    }

    #[test]
    fn test_unknown_department() {
        let catalog = valid_catalog().with_course(Course::new("ME201", "MECH", 3));
        let errors = validate_catalog(&catalog, &SchedulerConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownDepartment);

        let config = SchedulerConfig::default()
            .with_departments(["CSE-A", "CSE-B", "DSAI", "ECE", "MECH"]);
        assert!(validate_catalog(&catalog, &config).is_ok());
    }

    #[test]
    fn test_combined_hall_checks() {
        let mut catalog = valid_catalog();
        catalog.rooms.retain(|r| r.kind != RoomKind::CombinedOnly);
        let errors = validate_catalog(&catalog, &SchedulerConfig::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::MissingCombinedRoom));

        let catalog = valid_catalog().with_room(Room::combined_hall("C005", 200));
        let errors = validate_catalog(&catalog, &SchedulerConfig::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::MultipleCombinedRooms));
    }

    #[test]
    fn test_zero_capacity_room() {
        let catalog = valid_catalog().with_room(Room::classroom("C999", 0));
        let errors = validate_catalog(&catalog, &SchedulerConfig::default()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::ZeroCapacity);
    }

    fn booking(day: usize, slot: usize, room: &str, dept: &str, course: &str) -> RoomBooking {
        RoomBooking {
            semester: 3,
            day,
            slot,
            room: room.into(),
            department: dept.into(),
            course: course.into(),
            session: Session::PreMid,
        }
    }

    #[test]
    fn test_conflict_validator_clean_log() {
        let log = vec![
            booking(0, 2, "C101", "CSE-A", "CS301"),
            booking(0, 3, "C101", "CSE-A", "CS301"),
            booking(0, 2, "C102", "ECE", "EC301"),
        ];
        assert!(ConflictValidator::validate(&log).is_empty());
    }

    #[test]
    fn test_conflict_validator_reports_double_booking() {
        let log = vec![
            booking(1, 4, "C101", "CSE-A", "CS301"),
            booking(1, 4, "C101", "ECE", "EC301"),
            booking(1, 5, "C101", "ECE", "EC301"),
        ];
        let conflicts = ConflictValidator::validate(&log);
        assert_eq!(conflicts.len(), 1);
        assert_eq!((conflicts[0].day, conflicts[0].slot), (1, 4));
        assert_eq!(conflicts[0].room, "C101");
        assert_eq!(conflicts[0].entries.len(), 2);
        assert_eq!(conflicts[0].entries[1].department, "ECE");
    }
}
