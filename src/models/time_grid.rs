//! Weekly time grid model.
//!
//! The fixed universe of (day, slot) pairs a weekly timetable is built on.
//! Days and slots are addressed by their index in the configured lists;
//! labels are only needed for display.
//!
//! # Slot classes
//! - **Lunch** slots are permanently reserved.
//! - **Minor** slots form the early window reserved for the minor subject.
//! - **Regular** slots are everything else. Lectures, tutorials and labs
//!   are placed on regular slots only.
//!
//! # Consecutive slots
//! A placement of `len` slots starting at `start` covers `start..start + len`
//! and is valid only if each slot ends exactly when the next begins. The
//! reference grid has no `08:30-09:00` slot, so no placement may cross from
//! the minor window into the morning block.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::{ConfigError, GridConfig};

/// Index into the day list.
pub type DayIndex = usize;
/// Index into the slot list.
pub type SlotIndex = usize;

/// A half-open wall-clock interval, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Start (inclusive).
    pub start_minute: u16,
    /// End (exclusive).
    pub end_minute: u16,
}

impl TimeSlot {
    /// Creates a slot.
    pub fn new(start_minute: u16, end_minute: u16) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    /// Parses `HH:MM-HH:MM`.
    pub fn parse(label: &str) -> Option<Self> {
        let (start, end) = label.split_once('-')?;
        let slot = Self::new(parse_clock(start)?, parse_clock(end)?);
        (slot.start_minute < slot.end_minute).then_some(slot)
    }

    /// Formats as `HH:MM-HH:MM`.
    pub fn label(&self) -> String {
        format!(
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }

    /// Length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u16 {
        self.end_minute - self.start_minute
    }

    /// Whether this slot ends at `:30`.
    #[inline]
    pub fn ends_on_half_hour(&self) -> bool {
        self.end_minute % 60 == 30
    }
}

fn parse_clock(text: &str) -> Option<u16> {
    let (h, m) = text.trim().split_once(':')?;
    let h: u16 = h.parse().ok()?;
    let m: u16 = m.parse().ok()?;
    (h < 24 && m < 60).then_some(h * 60 + m)
}

/// A run of consecutive slots on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    /// Day index.
    pub day: DayIndex,
    /// First slot index.
    pub start: SlotIndex,
    /// Number of slots.
    pub len: usize,
}

impl Placement {
    /// Creates a placement.
    pub fn new(day: DayIndex, start: SlotIndex, len: usize) -> Self {
        Self { day, start, len }
    }

    /// One past the last slot.
    #[inline]
    pub fn end(&self) -> SlotIndex {
        self.start + self.len
    }

    /// Covered slot indices.
    #[inline]
    pub fn slots(&self) -> Range<SlotIndex> {
        self.start..self.end()
    }

    /// Covered (day, slot) cells.
    pub fn cells(&self) -> impl Iterator<Item = (DayIndex, SlotIndex)> {
        let day = self.day;
        self.slots().map(move |slot| (day, slot))
    }

    /// Whether two placements share a cell.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.start < other.end() && other.start < self.end()
    }
}

/// The weekly day × slot universe with its reserved slots.
///
/// # Example
///
/// ```
/// use campus_alloc::config::GridConfig;
/// use campus_alloc::models::TimeGrid;
///
/// let grid = TimeGrid::from_config(&GridConfig::default()).unwrap();
/// assert_eq!(grid.day_count(), 5);
/// assert!(grid.is_lunch(10));
/// assert!(grid.consecutive(1, 2).is_none()); // 08:00-08:30 and 09:00-09:30 are not adjacent
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    days: Vec<String>,
    slots: Vec<TimeSlot>,
    lunch: Vec<bool>,
    minor: Vec<bool>,
}

impl TimeGrid {
    /// Builds the grid from its label-based definition.
    pub fn from_config(config: &GridConfig) -> Result<Self, ConfigError> {
        if config.days.is_empty() {
            return Err(ConfigError::EmptyDays);
        }
        for (i, day) in config.days.iter().enumerate() {
            if config.days[..i].contains(day) {
                return Err(ConfigError::DuplicateDay(day.clone()));
            }
        }
        if config.slots.is_empty() {
            return Err(ConfigError::EmptySlots);
        }

        let mut slots: Vec<TimeSlot> = Vec::with_capacity(config.slots.len());
        for label in &config.slots {
            let slot =
                TimeSlot::parse(label).ok_or_else(|| ConfigError::MalformedSlot(label.clone()))?;
            if let Some(prev) = slots.last() {
                if slot.start_minute < prev.end_minute {
                    return Err(ConfigError::UnorderedSlot(label.clone()));
                }
            }
            slots.push(slot);
        }

        let mark = |role: &'static str, labels: &[String]| -> Result<Vec<bool>, ConfigError> {
            let mut flags = vec![false; slots.len()];
            for label in labels {
                let parsed = TimeSlot::parse(label);
                let idx = slots
                    .iter()
                    .position(|s| Some(*s) == parsed)
                    .ok_or_else(|| ConfigError::UnknownSlot {
                        role,
                        label: label.clone(),
                    })?;
                flags[idx] = true;
            }
            Ok(flags)
        };
        let lunch = mark("lunch", &config.lunch_slots)?;
        let minor = mark("minor", &config.minor_slots)?;

        Ok(Self {
            days: config.days.clone(),
            slots,
            lunch,
            minor,
        })
    }

    /// Number of days.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Number of slots per day.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Day labels.
    pub fn days(&self) -> &[String] {
        &self.days
    }

    /// Label of a day.
    pub fn day_label(&self, day: DayIndex) -> Option<&str> {
        self.days.get(day).map(String::as_str)
    }

    /// Slot at an index.
    pub fn slot(&self, slot: SlotIndex) -> Option<&TimeSlot> {
        self.slots.get(slot)
    }

    /// All slots.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Whether a slot is a lunch slot.
    pub fn is_lunch(&self, slot: SlotIndex) -> bool {
        self.lunch.get(slot).copied().unwrap_or(false)
    }

    /// Whether a slot is in the minor window.
    pub fn is_minor(&self, slot: SlotIndex) -> bool {
        self.minor.get(slot).copied().unwrap_or(false)
    }

    /// Whether a slot can hold a lecture, tutorial or lab.
    pub fn is_regular(&self, slot: SlotIndex) -> bool {
        slot < self.slots.len() && !self.is_lunch(slot) && !self.is_minor(slot)
    }

    /// The `len` slots starting at `start`, if they exist and are contiguous.
    pub fn consecutive(&self, start: SlotIndex, len: usize) -> Option<Range<SlotIndex>> {
        if len == 0 || start + len > self.slots.len() {
            return None;
        }
        let contiguous = self.slots[start..start + len]
            .windows(2)
            .all(|w| w[0].end_minute == w[1].start_minute);
        contiguous.then_some(start..start + len)
    }

    /// Whether a placement ends at `:30`.
    pub fn ends_on_half_hour(&self, placement: &Placement) -> bool {
        placement.len > 0
            && self
                .slots
                .get(placement.end() - 1)
                .is_some_and(TimeSlot::ends_on_half_hour)
    }

    /// Valid start slots for a regular component of `len` slots.
    ///
    /// Returns `(preferred, remaining)`: starts whose run ends on `:30`
    /// come first, as the timetable convention prefers them.
    pub fn regular_starts(&self, len: usize) -> (Vec<SlotIndex>, Vec<SlotIndex>) {
        let mut preferred = Vec::new();
        let mut remaining = Vec::new();
        for start in 0..self.slots.len() {
            let Some(range) = self.consecutive(start, len) else {
                continue;
            };
            if !range.clone().all(|s| self.is_regular(s)) {
                continue;
            }
            if self.slots[range.end - 1].ends_on_half_hour() {
                preferred.push(start);
            } else {
                remaining.push(start);
            }
        }
        (preferred, remaining)
    }

    /// Valid start slots for a minor class of `len` slots.
    pub fn minor_starts(&self, len: usize) -> Vec<SlotIndex> {
        (0..self.slots.len())
            .filter(|&start| {
                self.consecutive(start, len)
                    .is_some_and(|mut range| range.all(|s| self.is_minor(s)))
            })
            .collect()
    }

    /// Human-readable placement, e.g. `MON 09:00-10:30`.
    pub fn describe(&self, placement: &Placement) -> String {
        let day = self.day_label(placement.day).unwrap_or("?");
        match (
            self.slots.get(placement.start),
            placement.end().checked_sub(1).and_then(|last| self.slots.get(last)),
        ) {
            (Some(first), Some(last)) => {
                let span = TimeSlot::new(first.start_minute, last.end_minute);
                format!("{day} {}", span.label())
            }
            _ => format!("{day} #{}+{}", placement.start, placement.len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TimeGrid {
        TimeGrid::from_config(&GridConfig::default()).unwrap()
    }

    #[test]
    fn test_time_slot_parse() {
        let s = TimeSlot::parse("07:30-08:00").unwrap();
        assert_eq!(s.start_minute, 450);
        assert_eq!(s.end_minute, 480);
        assert_eq!(s.duration_minutes(), 30);
        assert_eq!(s.label(), "07:30-08:00");
        assert!(!s.ends_on_half_hour());
        assert!(TimeSlot::new(450, 510).ends_on_half_hour());

        assert!(TimeSlot::parse("08:00").is_none());
        assert!(TimeSlot::parse("09:00-08:00").is_none());
        assert!(TimeSlot::parse("25:00-26:00").is_none());
    }

    #[test]
    fn test_placement_overlap() {
        let a = Placement::new(0, 2, 3);
        let b = Placement::new(0, 4, 2);
        let c = Placement::new(0, 5, 2); // touching, not overlapping
        let d = Placement::new(1, 2, 3); // other day
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
        assert_eq!(a.cells().collect::<Vec<_>>(), vec![(0, 2), (0, 3), (0, 4)]);
    }

    #[test]
    fn test_slot_classes() {
        let g = grid();
        assert_eq!(g.slot_count(), 20);
        assert!(g.is_minor(0) && g.is_minor(1));
        assert!(g.is_lunch(10) && g.is_lunch(11));
        assert!(g.is_regular(2));
        assert!(!g.is_regular(10));
        assert!(!g.is_regular(20));
    }

    #[test]
    fn test_consecutive_respects_gaps() {
        let g = grid();
        assert_eq!(g.consecutive(0, 2), Some(0..2));
        assert_eq!(g.consecutive(1, 2), None); // 08:30-09:00 missing
        assert_eq!(g.consecutive(18, 3), None); // runs past the day
        assert_eq!(g.consecutive(2, 0), None);
    }

    #[test]
    fn test_regular_starts_exclude_lunch_and_minor() {
        let g = grid();
        let (preferred, remaining) = g.regular_starts(3);
        for start in preferred.iter().chain(remaining.iter()) {
            for s in *start..*start + 3 {
                assert!(g.is_regular(s), "start {start} covers reserved slot {s}");
            }
        }
        // 09:00-10:30 ends on :30
        assert!(preferred.contains(&2));
        // 09:30-11:00 does not
        assert!(remaining.contains(&3));
        // 12:00-13:30 would cross lunch
        assert!(!preferred.contains(&8) && !remaining.contains(&8));
    }

    #[test]
    fn test_minor_starts() {
        let g = grid();
        assert_eq!(g.minor_starts(2), vec![0]);
        assert_eq!(g.minor_starts(1), vec![0, 1]);
        assert!(g.minor_starts(3).is_empty());
    }

    #[test]
    fn test_describe() {
        let g = grid();
        assert_eq!(g.describe(&Placement::new(0, 2, 3)), "MON 09:00-10:30");
    }

    #[test]
    fn test_invalid_grids() {
        let mut cfg = GridConfig::default();
        cfg.days.push("MON".into());
        assert_eq!(
            TimeGrid::from_config(&cfg),
            Err(ConfigError::DuplicateDay("MON".into()))
        );

        let mut cfg = GridConfig::default();
        cfg.slots[3] = "bad".into();
        assert_eq!(
            TimeGrid::from_config(&cfg),
            Err(ConfigError::MalformedSlot("bad".into()))
        );

        let mut cfg = GridConfig::default();
        cfg.slots.swap(4, 5);
        assert!(matches!(
            TimeGrid::from_config(&cfg),
            Err(ConfigError::UnorderedSlot(_))
        ));
    }
}
