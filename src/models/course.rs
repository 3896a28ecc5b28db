//! Course model.
//!
//! A course is one row of the normalized course catalog: a code taught to
//! one department in one semester and session, with a weekly load derived
//! from its LTPSC figure.
//!
//! The same course code may appear once per department (a combined class
//! shared by two departments is listed for both); the identity of a
//! catalog row is therefore `(code, department, semester)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half of a semester; each has its own weekly timetable and exam period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Session {
    /// Before the mid-semester exams.
    PreMid,
    /// After the mid-semester exams.
    PostMid,
}

impl Session {
    /// Both sessions, in timetable order.
    pub const ALL: [Session; 2] = [Session::PreMid, Session::PostMid];

    /// Display label (`Pre-Mid` / `Post-Mid`).
    pub fn label(&self) -> &'static str {
        match self {
            Session::PreMid => "Pre-Mid",
            Session::PostMid => "Post-Mid",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The kind of a weekly class meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    /// Lecture.
    Lecture,
    /// Tutorial.
    Tutorial,
    /// Lab (practical).
    Lab,
    /// Recurring minor subject.
    Minor,
}

impl Component {
    /// The three LTPSC components, in scheduling order.
    pub const TEACHING: [Component; 3] = [Component::Lecture, Component::Tutorial, Component::Lab];
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Component::Lecture => "Lecture",
            Component::Tutorial => "Tutorial",
            Component::Lab => "Lab",
            Component::Minor => "Minor",
        };
        f.write_str(s)
    }
}

/// Weekly meeting counts per teaching component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentCounts {
    /// Lectures per week.
    pub lectures: u32,
    /// Tutorials per week.
    pub tutorials: u32,
    /// Labs per week.
    pub labs: u32,
}

impl ComponentCounts {
    /// Creates counts from an L-T-P triple.
    pub fn new(lectures: u32, tutorials: u32, labs: u32) -> Self {
        Self {
            lectures,
            tutorials,
            labs,
        }
    }

    /// Count for one component (`0` for [`Component::Minor`]).
    pub fn get(&self, component: Component) -> u32 {
        match component {
            Component::Lecture => self.lectures,
            Component::Tutorial => self.tutorials,
            Component::Lab => self.labs,
            Component::Minor => 0,
        }
    }

    /// Mutable count for one teaching component.
    pub fn get_mut(&mut self, component: Component) -> Option<&mut u32> {
        match component {
            Component::Lecture => Some(&mut self.lectures),
            Component::Tutorial => Some(&mut self.tutorials),
            Component::Lab => Some(&mut self.labs),
            Component::Minor => None,
        }
    }

    /// Sum over all components.
    pub fn total(&self) -> u32 {
        self.lectures + self.tutorials + self.labs
    }

    /// Whether every component of `self` is at least `other`'s.
    pub fn covers(&self, other: &Self) -> bool {
        self.lectures >= other.lectures
            && self.tutorials >= other.tutorials
            && self.labs >= other.labs
    }
}

/// A course offering in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course code.
    pub code: String,
    /// Course title.
    pub name: String,
    /// Owning department.
    pub department: String,
    /// Semester number.
    pub semester: u32,
    /// Session the course runs in.
    pub session: Session,
    /// Weekly load.
    pub weekly: ComponentCounts,
    /// Must run at the semester-wide common elective time.
    pub is_elective: bool,
    /// Taught jointly to the department's combined group.
    pub is_combined: bool,
    /// A minor-subject course (placed without a room).
    pub is_minor: bool,
    /// Registered student count (room capacity requirement).
    pub registered_students: u32,
}

impl Course {
    /// Creates a Pre-Mid course with no weekly load.
    pub fn new(code: impl Into<String>, department: impl Into<String>, semester: u32) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            department: department.into(),
            semester,
            session: Session::PreMid,
            weekly: ComponentCounts::default(),
            is_elective: false,
            is_combined: false,
            is_minor: false,
            registered_students: 0,
        }
    }

    /// Sets the course title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Sets lectures, tutorials and labs per week.
    pub fn with_load(mut self, lectures: u32, tutorials: u32, labs: u32) -> Self {
        self.weekly = ComponentCounts::new(lectures, tutorials, labs);
        self
    }

    /// Marks the course as an elective.
    pub fn elective(mut self) -> Self {
        self.is_elective = true;
        self
    }

    /// Marks the course as a combined class.
    pub fn combined(mut self) -> Self {
        self.is_combined = true;
        self
    }

    /// Marks the course as a minor-subject course.
    pub fn minor(mut self) -> Self {
        self.is_minor = true;
        self
    }

    /// Sets the registered student count.
    pub fn with_students(mut self, count: u32) -> Self {
        self.registered_students = count;
        self
    }

    /// Combined and elective courses claim slots before regular ones.
    pub fn is_priority(&self) -> bool {
        self.is_combined || self.is_elective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_builder() {
        let c = Course::new("CS301", "CSE-A", 3)
            .with_name("Operating Systems")
            .with_session(Session::PostMid)
            .with_load(3, 1, 1)
            .combined()
            .with_students(120);

        assert_eq!(c.code, "CS301");
        assert_eq!(c.department, "CSE-A");
        assert_eq!(c.session, Session::PostMid);
        assert_eq!(c.weekly.get(Component::Lecture), 3);
        assert_eq!(c.weekly.get(Component::Lab), 1);
        assert_eq!(c.weekly.get(Component::Minor), 0);
        assert_eq!(c.weekly.total(), 5);
        assert!(c.is_combined && !c.is_elective);
        assert!(c.is_priority());
        assert_eq!(c.registered_students, 120);
    }

    #[test]
    fn test_component_counts() {
        let mut achieved = ComponentCounts::default();
        let requested = ComponentCounts::new(2, 1, 0);
        assert!(!achieved.covers(&requested));

        *achieved.get_mut(Component::Lecture).unwrap() += 2;
        *achieved.get_mut(Component::Tutorial).unwrap() += 1;
        assert!(achieved.covers(&requested));
        assert!(achieved.get_mut(Component::Minor).is_none());
    }

    #[test]
    fn test_session_labels() {
        assert_eq!(Session::PreMid.to_string(), "Pre-Mid");
        assert_eq!(Session::PostMid.label(), "Post-Mid");
        assert_eq!(Component::Tutorial.to_string(), "Tutorial");
    }
}
