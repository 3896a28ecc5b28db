//! Student model.

use serde::{Deserialize, Serialize};

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique roll number.
    pub roll_no: String,
    /// Display name (may be empty).
    pub name: String,
    /// Semester number.
    pub semester: u32,
    /// Department.
    pub department: String,
}

impl Student {
    /// Creates a student.
    pub fn new(roll_no: impl Into<String>, semester: u32, department: impl Into<String>) -> Self {
        Self {
            roll_no: roll_no.into(),
            name: String::new(),
            semester,
            department: department.into(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_builder() {
        let student = Student::new("23BCS001", 3, "CSE-A").with_name("Asha");
        assert_eq!(student.roll_no, "23BCS001");
        assert_eq!((student.semester, student.department.as_str()), (3, "CSE-A"));
        assert_eq!(student.name, "Asha");
        assert!(Student::new("23BCS002", 3, "CSE-A").name.is_empty());
    }
}
