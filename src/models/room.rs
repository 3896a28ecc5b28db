//! Room model.
//!
//! Rooms are the physical resources every class meeting and exam sitting
//! occupies. Each room has one kind; exactly one room is expected to be
//! [`RoomKind::CombinedOnly`], reserved for classes taught jointly to a
//! combined department group.

use serde::{Deserialize, Serialize};

/// Room classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    /// Ordinary lecture room; also used for exams.
    Classroom,
    /// Computer lab.
    SoftwareLab,
    /// Electronics / hardware lab.
    HardwareLab,
    /// Large hall reserved for combined classes.
    CombinedOnly,
}

impl RoomKind {
    /// Whether this is any kind of lab.
    pub fn is_lab(&self) -> bool {
        matches!(self, RoomKind::SoftwareLab | RoomKind::HardwareLab)
    }
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room name.
    pub name: String,
    /// Teaching capacity (seats).
    pub capacity: u32,
    /// Classification.
    pub kind: RoomKind,
    /// Declared exam capacity, if different from the default layout.
    pub exam_capacity: Option<u32>,
}

impl Room {
    /// Creates a room.
    pub fn new(name: impl Into<String>, capacity: u32, kind: RoomKind) -> Self {
        Self {
            name: name.into(),
            capacity,
            kind,
            exam_capacity: None,
        }
    }

    /// Creates a classroom.
    pub fn classroom(name: impl Into<String>, capacity: u32) -> Self {
        Self::new(name, capacity, RoomKind::Classroom)
    }

    /// Creates a software lab.
    pub fn software_lab(name: impl Into<String>, capacity: u32) -> Self {
        Self::new(name, capacity, RoomKind::SoftwareLab)
    }

    /// Creates a hardware lab.
    pub fn hardware_lab(name: impl Into<String>, capacity: u32) -> Self {
        Self::new(name, capacity, RoomKind::HardwareLab)
    }

    /// Creates the combined-class hall.
    pub fn combined_hall(name: impl Into<String>, capacity: u32) -> Self {
        Self::new(name, capacity, RoomKind::CombinedOnly)
    }

    /// Sets the exam capacity.
    pub fn with_exam_capacity(mut self, capacity: u32) -> Self {
        self.exam_capacity = Some(capacity);
        self
    }

    /// Whether the room can host exams (classrooms only).
    pub fn is_exam_room(&self) -> bool {
        self.kind == RoomKind::Classroom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_constructors() {
        let r = Room::classroom("C101", 60).with_exam_capacity(40);
        assert_eq!(r.kind, RoomKind::Classroom);
        assert_eq!(r.exam_capacity, Some(40));
        assert!(r.is_exam_room());

        assert!(Room::software_lab("L1", 30).kind.is_lab());
        assert!(Room::hardware_lab("L2", 30).kind.is_lab());
        let hall = Room::combined_hall("C004", 240);
        assert!(!hall.kind.is_lab());
        assert!(!hall.is_exam_room());
    }
}
