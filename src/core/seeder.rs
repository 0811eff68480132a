//! Mock roster generation.
//!
//! Rooms are filled one student at a time; every student goes to a uniformly
//! chosen room that still has space. Full rooms leave the candidate pool, so
//! the loop runs at most `target_students` times.

use crate::core::catalog::{FACULTIES, FIRST_NAMES, SURNAMES};
use crate::core::roster::normalize_name;
use crate::domain::model::{DormId, Dormitory, Roster, Room, Student};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const NAME_ATTEMPTS: usize = 8;

/// How one dormitory should be seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DormitoryLayout {
    pub id: u32,
    pub name: String,
    pub total_rooms: usize,
    pub seed_students: usize,
}

impl DormitoryLayout {
    /// The two residence buildings of the institute.
    pub fn defaults() -> Vec<Self> {
        (1..=2)
            .map(|id| Self {
                id,
                name: format!("{}-Talabalar turar joyi", id),
                total_rooms: 100,
                seed_students: 390,
            })
            .collect()
    }
}

fn seed_joined_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 9, 1).unwrap_or_default()
}

pub fn random_full_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let name = FIRST_NAMES.choose(rng).copied().unwrap_or("Aziz");
    let surname = SURNAMES.choose(rng).copied().unwrap_or("Karimov");
    format!("{} {}", surname, name)
}

/// Draws names until one is not in `taken`; once the attempts run out the
/// last draw gets a numeric suffix. The result is recorded in `taken`.
fn unique_full_name<R: Rng + ?Sized>(rng: &mut R, taken: &mut HashSet<String>) -> String {
    let mut name = random_full_name(rng);
    for _ in 1..NAME_ATTEMPTS {
        if !taken.contains(&normalize_name(&name)) {
            break;
        }
        name = random_full_name(rng);
    }

    let base = name.clone();
    let mut suffix = 2;
    while !taken.insert(normalize_name(&name)) {
        name = format!("{} {}", base, suffix);
        suffix += 1;
    }
    name
}

fn random_student<R: Rng + ?Sized>(
    rng: &mut R,
    dorm_tag: u32,
    counter: usize,
    taken: &mut HashSet<String>,
) -> Student {
    let (faculty, directions) = FACULTIES[rng.gen_range(0..FACULTIES.len())];
    let direction = directions[rng.gen_range(0..directions.len())];
    let course: u8 = rng.gen_range(1..=4);
    let group_suffix: u8 = rng.gen_range(1..=5);
    let avatar_salt: f64 = rng.gen();

    Student {
        id: format!("d{}-s{}", dorm_tag, counter + 1000),
        full_name: unique_full_name(rng, taken),
        course,
        group: format!("{}0{}", course, group_suffix),
        faculty: faculty.to_string(),
        direction: direction.to_string(),
        image_url: Some(format!(
            "https://api.dicebear.com/9.x/avataaars/png?seed={}-{}-{}",
            dorm_tag, counter, avatar_salt
        )),
        joined_date: seed_joined_date(),
    }
}

/// Builds `room_count` rooms numbered from 1 and places up to
/// `target_students` random students into them. Names already in `taken`
/// are not reused.
pub fn generate_rooms<R: Rng + ?Sized>(
    rng: &mut R,
    room_count: usize,
    dorm_tag: u32,
    target_students: usize,
    taken: &mut HashSet<String>,
) -> Vec<Room> {
    let mut rooms: Vec<Room> = (1..=room_count as u32).map(Room::new).collect();
    let mut available: Vec<usize> = (0..room_count).collect();
    let mut added = 0;

    while added < target_students && !available.is_empty() {
        let pick = rng.gen_range(0..available.len());
        let room = &mut rooms[available[pick]];

        room.students.push(random_student(rng, dorm_tag, added, taken));
        added += 1;

        if room.is_full() {
            available.swap_remove(pick);
        }
    }

    if added < target_students {
        tracing::warn!(
            "Dormitory {} ran out of space: placed {} of {} requested students",
            dorm_tag,
            added,
            target_students
        );
    }

    rooms
}

pub fn seed_roster<R: Rng + ?Sized>(rng: &mut R, layouts: &[DormitoryLayout]) -> Roster {
    let mut taken = HashSet::new();
    let dormitories = layouts
        .iter()
        .map(|layout| {
            let rooms = generate_rooms(
                rng,
                layout.total_rooms,
                layout.id,
                layout.seed_students,
                &mut taken,
            );
            tracing::debug!(
                "Seeded {} with {} rooms and {} students",
                layout.name,
                rooms.len(),
                rooms.iter().map(Room::occupancy).sum::<usize>()
            );
            Dormitory::new(DormId(layout.id), layout.name.clone(), rooms)
        })
        .collect();

    Roster::new(dormitories)
}
