//! Timetable quality metrics (KPIs).
//!
//! Computes allocation indicators from a finished run.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fulfilment Rate | Achieved meetings / requested meetings |
//! | Complete Courses | Courses whose whole weekly load was placed |
//! | Deficiencies | Recorded gaps of any kind |
//! | Grid Utilization | Mean occupied share of non-lunch cells per grid |
//! | Room Utilization | Held cells / bookable cells, per room |

use std::collections::HashMap;

use super::context::RoomOccupancy;
use super::report::AllocationReport;
use crate::models::WeeklyGrid;

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Meetings requested across all courses.
    pub requested_meetings: u32,
    /// Meetings placed across all courses.
    pub achieved_meetings: u32,
    /// `achieved / requested` (1.0 when nothing was requested).
    pub fulfilment_rate: f64,
    /// Courses with their full load placed.
    pub complete_courses: usize,
    /// Courses with part of their load missing.
    pub incomplete_courses: usize,
    /// Fulfilment per department.
    pub fulfilment_by_department: HashMap<String, f64>,
    /// Total recorded deficiencies.
    pub deficiency_count: usize,
    /// Mean grid utilization (0.0..1.0).
    pub avg_grid_utilization: f64,
    /// Per-room utilization over the bookable horizon.
    pub utilization_by_room: HashMap<String, f64>,
}

impl TimetableKpi {
    /// Computes KPIs.
    ///
    /// # Arguments
    /// * `report` - Allocations and deficiencies of the run.
    /// * `grids` - Every weekly grid built.
    /// * `rooms` - Room occupancy of the run.
    /// * `horizon_cells` - Bookable (semester, day, slot) cells per room.
    pub fn calculate<'g>(
        report: &AllocationReport,
        grids: impl IntoIterator<Item = &'g WeeklyGrid>,
        rooms: &RoomOccupancy,
        horizon_cells: usize,
    ) -> Self {
        let mut requested: u32 = 0;
        let mut achieved: u32 = 0;
        let mut complete = 0;
        let mut incomplete = 0;
        let mut per_department: HashMap<String, (u32, u32)> = HashMap::new();

        for (key, alloc) in report.allocations() {
            let r = alloc.requested.total();
            // over-placement never counts beyond the request
            let a = alloc.achieved.total().min(r);
            requested += r;
            achieved += a;
            if alloc.is_complete() {
                complete += 1;
            } else {
                incomplete += 1;
            }
            let entry = per_department.entry(key.department.clone()).or_insert((0, 0));
            entry.0 += r;
            entry.1 += a;
        }

        let rate = |r: u32, a: u32| if r == 0 { 1.0 } else { a as f64 / r as f64 };
        let fulfilment_by_department = per_department
            .into_iter()
            .map(|(dept, (r, a))| (dept, rate(r, a)))
            .collect();

        let utilizations: Vec<f64> = grids.into_iter().map(WeeklyGrid::utilization).collect();
        let avg_grid_utilization = if utilizations.is_empty() {
            0.0
        } else {
            utilizations.iter().sum::<f64>() / utilizations.len() as f64
        };

        let utilization_by_room = if horizon_cells == 0 {
            HashMap::new()
        } else {
            rooms
                .held_cells_by_room()
                .into_iter()
                .map(|(room, held)| (room, held as f64 / horizon_cells as f64))
                .collect()
        };

        Self {
            requested_meetings: requested,
            achieved_meetings: achieved,
            fulfilment_rate: rate(requested, achieved),
            complete_courses: complete,
            incomplete_courses: incomplete,
            fulfilment_by_department,
            deficiency_count: report.deficiencies().len(),
            avg_grid_utilization,
            utilization_by_room,
        }
    }

    /// Whether the run meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_fulfilment: f64, max_deficiencies: usize) -> bool {
        self.fulfilment_rate >= min_fulfilment && self.deficiency_count <= max_deficiencies
    }
}
