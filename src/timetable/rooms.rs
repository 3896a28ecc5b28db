//! Room selection.
//!
//! # Algorithm
//!
//! Each request draws from one pool: classrooms for lectures and
//! tutorials, the lab kind configured for the department, and the combined hall
//! for combined classes. Within the pool, rooms free for the whole
//! placement are considered in ascending capacity. The smallest room that
//! seats the registered students wins. If none seats them, the smallest
//! free room is taken anyway and the overflow is logged. Combined requests
//! are the exception and are refused when the hall is too small.

use log::{debug, warn};

use super::context::{RoomHolder, RoomOccupancy};
use crate::models::{Placement, Room, RoomKind, Session};

/// Which pool a request draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomRequestKind<'a> {
    /// Lecture or tutorial.
    Regular,
    /// Lab, restricted to one lab kind (`None` = every lab).
    Lab {
        /// Lab kind the department draws from.
        pool: Option<RoomKind>,
    },
    /// Combined class of a department group.
    Combined {
        /// Group name.
        group: &'a str,
    },
}

/// One room request.
#[derive(Debug, Clone, Copy)]
pub struct RoomRequest<'a> {
    /// Semester number.
    pub semester: u32,
    /// Requesting department.
    pub department: &'a str,
    /// Session.
    pub session: Session,
    /// Course code.
    pub course: &'a str,
    /// Placement to cover.
    pub placement: Placement,
    /// Pool selector.
    pub kind: RoomRequestKind<'a>,
    /// Seats needed.
    pub required_capacity: u32,
}

impl RoomRequest<'_> {
    fn holder(&self) -> RoomHolder {
        match self.kind {
            RoomRequestKind::Combined { group } => RoomHolder::Combined {
                group: group.to_string(),
                course: self.course.to_string(),
            },
            _ => RoomHolder::Exclusive,
        }
    }
}

/// Selects and books rooms from fixed, capacity-sorted pools.
#[derive(Debug, Clone)]
pub struct RoomAllocator {
    classrooms: Vec<Room>,
    labs: Vec<Room>,
    combined: Option<Room>,
}

impl RoomAllocator {
    /// Builds the pools from the room list.
    ///
    /// Only the first combined hall is used; extra halls are ignored with a
    /// warning.
    pub fn new(rooms: &[Room]) -> Self {
        let by_size =
            |a: &Room, b: &Room| a.capacity.cmp(&b.capacity).then_with(|| a.name.cmp(&b.name));

        let mut classrooms: Vec<Room> = rooms
            .iter()
            .filter(|r| r.kind == RoomKind::Classroom)
            .cloned()
            .collect();
        classrooms.sort_by(by_size);
        let mut labs: Vec<Room> = rooms.iter().filter(|r| r.kind.is_lab()).cloned().collect();
        labs.sort_by(by_size);

        let mut halls = rooms.iter().filter(|r| r.kind == RoomKind::CombinedOnly);
        let combined = halls.next().cloned();
        for extra in halls {
            warn!("ignoring extra combined hall {}", extra.name);
        }

        Self {
            classrooms,
            labs,
            combined,
        }
    }

    /// The combined hall, if any.
    pub fn combined_room(&self) -> Option<&Room> {
        self.combined.as_ref()
    }

    /// Whether any room belongs to a lab pool.
    pub fn has_lab_in(&self, pool: Option<RoomKind>) -> bool {
        !self.lab_pool(pool).is_empty()
    }

    /// Picks a room without booking it.
    pub fn select<'r>(
        &'r self,
        occupancy: &RoomOccupancy,
        request: &RoomRequest<'_>,
    ) -> Option<&'r Room> {
        let holder = request.holder();
        let is_free = |room: &&Room| {
            occupancy.is_free_for(request.semester, &request.placement, &room.name, &holder)
        };

        match request.kind {
            RoomRequestKind::Combined { .. } => self
                .combined
                .as_ref()
                .filter(|hall| hall.capacity >= request.required_capacity)
                .filter(is_free),
            RoomRequestKind::Regular => {
                let pool: Vec<&Room> = self.classrooms.iter().collect();
                Self::smallest_fit(&pool, is_free, request)
            }
            RoomRequestKind::Lab { pool } => {
                Self::smallest_fit(&self.lab_pool(pool), is_free, request)
            }
        }
    }

    /// Picks a room, holds it for the placement and logs the booking.
    ///
    /// Combined bookings are held under the group tag and not logged, since
    /// several departments legitimately share them.
    pub fn assign(
        &self,
        occupancy: &mut RoomOccupancy,
        request: &RoomRequest<'_>,
    ) -> Option<String> {
        let Some(room) = self.select(occupancy, request) else {
            debug!(
                "no room for {} ({}, sem {}) at day {} slot {}",
                request.course,
                request.department,
                request.semester,
                request.placement.day,
                request.placement.start
            );
            return None;
        };
        if room.capacity < request.required_capacity {
            warn!(
                "{} seats {} but {} needs {}",
                room.name, room.capacity, request.course, request.required_capacity
            );
        }
        let holder = request.holder();
        let is_combined = matches!(holder, RoomHolder::Combined { .. });
        occupancy.hold(request.semester, &request.placement, &room.name, holder);
        if !is_combined {
            occupancy.log(
                request.semester,
                &request.placement,
                &room.name,
                request.department,
                request.course,
                request.session,
            );
        }
        Some(room.name.clone())
    }

    fn lab_pool(&self, pool: Option<RoomKind>) -> Vec<&Room> {
        self.labs
            .iter()
            .filter(|r| pool.is_none() || pool == Some(r.kind))
            .collect()
    }

    fn smallest_fit<'r>(
        pool: &[&'r Room],
        is_free: impl Fn(&&Room) -> bool,
        request: &RoomRequest<'_>,
    ) -> Option<&'r Room> {
        let free: Vec<&'r Room> = pool.iter().copied().filter(|r| is_free(r)).collect();
        free.iter()
            .copied()
            .find(|r| r.capacity >= request.required_capacity)
            .or_else(|| free.first().copied())
    }
}
