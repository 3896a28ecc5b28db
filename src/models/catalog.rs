//! Catalog model.
//!
//! [`Catalog`] bundles the normalized input records a run consumes. It is
//! produced by an external loader and treated as immutable for the run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Course, Room, Session, Student};

/// Normalized input for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Course offerings.
    pub courses: Vec<Course>,
    /// Rooms.
    pub rooms: Vec<Room>,
    /// Students.
    pub students: Vec<Student>,
    /// Faculty names available for invigilation.
    pub faculty: Vec<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a student.
    pub fn with_student(mut self, student: Student) -> Self {
        self.students.push(student);
        self
    }

    /// Adds a faculty member.
    pub fn with_faculty(mut self, name: impl Into<String>) -> Self {
        self.faculty.push(name.into());
        self
    }

    /// Distinct semesters with at least one course, ascending.
    pub fn semesters(&self) -> Vec<u32> {
        self.courses
            .iter()
            .map(|c| c.semester)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Courses of one department in one semester and session, in catalog order.
    pub fn courses_for(&self, semester: u32, department: &str, session: Session) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|c| {
                c.semester == semester && c.department == department && c.session == session
            })
            .collect()
    }

    /// Courses running in a session across all semesters and departments.
    pub fn courses_in_session(&self, session: Session) -> Vec<&Course> {
        self.courses.iter().filter(|c| c.session == session).collect()
    }

    /// Course codes a student sits: every course of their semester and department.
    pub fn enrolled_courses(&self, student: &Student) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for course in &self.courses {
            if course.semester == student.semester
                && course.department == student.department
                && !codes.contains(&course.code.as_str())
            {
                codes.push(&course.code);
            }
        }
        codes
    }

    /// Rooms that can host exams, sorted by name.
    pub fn exam_rooms(&self) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self.rooms.iter().filter(|r| r.is_exam_room()).collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new()
            .with_course(Course::new("CS301", "CSE-A", 3).with_load(3, 0, 0))
            .with_course(Course::new("CS302", "CSE-A", 3).with_session(Session::PostMid))
            .with_course(Course::new("EC301", "ECE", 3))
            .with_course(Course::new("CS101", "CSE-A", 1))
            .with_room(Room::classroom("C102", 60))
            .with_room(Room::classroom("C101", 60))
            .with_room(Room::software_lab("L1", 30))
            .with_student(Student::new("23BCS001", 3, "CSE-A").with_name("Asha"))
    }

    #[test]
    fn test_semesters_sorted_unique() {
        assert_eq!(catalog().semesters(), vec![1, 3]);
    }

    #[test]
    fn test_courses_for_filters_all_keys() {
        let cat = catalog();
        let pre = cat.courses_for(3, "CSE-A", Session::PreMid);
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].code, "CS301");
        assert_eq!(cat.courses_for(3, "CSE-A", Session::PostMid).len(), 1);
        assert!(cat.courses_for(5, "CSE-A", Session::PreMid).is_empty());
        assert_eq!(cat.courses_in_session(Session::PreMid).len(), 3);
    }

    #[test]
    fn test_enrolled_courses() {
        let cat = catalog();
        let student = &cat.students[0];
        assert_eq!(cat.enrolled_courses(student), vec!["CS301", "CS302"]);
    }

    #[test]
    fn test_exam_rooms_exclude_labs() {
        let cat = catalog();
        let names: Vec<&str> = cat.exam_rooms().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C101", "C102"]);
    }
}
