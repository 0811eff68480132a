//! Occupancy statistics and name search over the roster.
//!
//! Everything here is recomputed from scratch on each call.

use crate::domain::model::{DormId, Roster, RoomStatus, Scope, Student, ROOM_CAPACITY};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

/// Queries shorter than this (in characters) return no hits.
pub const MIN_SEARCH_LEN: usize = 2;

pub const ALL_SCOPE_LABEL: &str = "Umumiy (Barcha Yotoqxonalar)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancyStats {
    pub scope: String,
    pub total_capacity: usize,
    pub occupied: usize,
    pub free: usize,
    pub total_rooms: usize,
    pub empty_rooms: usize,
    pub full_rooms: usize,
    pub partial_rooms: usize,
    /// Students per course; index 0 is the first course.
    pub by_course: [usize; 4],
    pub by_faculty: BTreeMap<String, usize>,
}

/// The figures the chat assistant is given as context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssistantSummary {
    pub capacity: usize,
    pub occupied: usize,
    pub free: usize,
    pub empty_rooms: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: usize,
}

impl OccupancyStats {
    pub fn compute(roster: &Roster, scope: Scope) -> Self {
        let dorms = roster.scoped(scope);
        let scope_label = match scope {
            Scope::All => ALL_SCOPE_LABEL.to_string(),
            Scope::Dormitory(id) => dorms
                .first()
                .map(|d| d.name.clone())
                .unwrap_or_else(|| format!("{}-yotoqxona", id)),
        };

        let mut stats = Self {
            scope: scope_label,
            total_capacity: 0,
            occupied: 0,
            free: 0,
            total_rooms: 0,
            empty_rooms: 0,
            full_rooms: 0,
            partial_rooms: 0,
            by_course: [0; 4],
            by_faculty: BTreeMap::new(),
        };

        for dorm in &dorms {
            stats.total_capacity += dorm.total_rooms * ROOM_CAPACITY;
            stats.total_rooms += dorm.total_rooms;

            for room in &dorm.rooms {
                stats.occupied += room.occupancy();
                match room.status() {
                    RoomStatus::Empty => stats.empty_rooms += 1,
                    RoomStatus::Full => stats.full_rooms += 1,
                    RoomStatus::Partial => {}
                }

                for student in &room.students {
                    if (1..=4).contains(&student.course) {
                        stats.by_course[usize::from(student.course) - 1] += 1;
                    }
                    *stats.by_faculty.entry(student.faculty.clone()).or_insert(0) += 1;
                }
            }
        }

        stats.free = stats.total_capacity.saturating_sub(stats.occupied);
        stats.partial_rooms = stats
            .total_rooms
            .saturating_sub(stats.empty_rooms + stats.full_rooms);
        stats
    }

    /// Occupied share of capacity as a rounded percentage. A scope without
    /// capacity reports 0.
    pub fn occupancy_rate(&self) -> u32 {
        if self.total_capacity == 0 {
            return 0;
        }
        ((self.occupied as f64 / self.total_capacity as f64) * 100.0).round() as u32
    }

    pub fn summary(&self) -> AssistantSummary {
        AssistantSummary {
            capacity: self.total_capacity,
            occupied: self.occupied,
            free: self.free,
            empty_rooms: self.empty_rooms,
        }
    }

    pub fn occupancy_series(&self) -> Vec<ChartPoint> {
        vec![
            ChartPoint {
                name: "Band joylar".to_string(),
                value: self.occupied,
            },
            ChartPoint {
                name: "Bo'sh joylar".to_string(),
                value: self.free,
            },
        ]
    }

    pub fn course_series(&self) -> Vec<ChartPoint> {
        self.by_course
            .iter()
            .enumerate()
            .map(|(i, count)| ChartPoint {
                name: format!("{}-kurs", i + 1),
                value: *count,
            })
            .collect()
    }

    pub fn faculty_series(&self) -> Vec<ChartPoint> {
        self.by_faculty
            .iter()
            .map(|(name, count)| ChartPoint {
                name: name.clone(),
                value: *count,
            })
            .collect()
    }

    /// The statistics object handed to the report generator.
    pub fn analysis_payload(&self) -> serde_json::Value {
        let by_course: BTreeMap<String, usize> = self
            .by_course
            .iter()
            .enumerate()
            .map(|(i, count)| ((i + 1).to_string(), *count))
            .collect();

        json!({
            "scope": self.scope,
            "totalCapacity": self.total_capacity,
            "occupied": self.occupied,
            "vacant": self.free,
            "occupancyRate": format!("{}%", self.occupancy_rate()),
            "rooms": {
                "total": self.total_rooms,
                "empty": self.empty_rooms,
                "full": self.full_rooms,
                "partial": self.partial_rooms,
            },
            "demographics": {
                "byCourse": by_course,
                "byFaculty": self.by_faculty,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub student: Student,
    pub room_number: u32,
    pub dorm_name: String,
    pub dorm_id: DormId,
}

/// Case-insensitive substring search on full names across every dormitory,
/// whatever scope is currently selected.
pub fn search(roster: &Roster, query: &str) -> Vec<SearchHit> {
    if query.chars().count() < MIN_SEARCH_LEN {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    roster
        .dormitories
        .iter()
        .flat_map(|dorm| {
            dorm.students()
                .filter(|(_, s)| s.full_name.to_lowercase().contains(&needle))
                .map(|(room, s)| SearchHit {
                    student: s.clone(),
                    room_number: room.number,
                    dorm_name: dorm.name.clone(),
                    dorm_id: dorm.id,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
