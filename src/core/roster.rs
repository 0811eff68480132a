use crate::core::catalog::{is_known_faculty, OTHER_DIRECTION};
use crate::domain::model::{DormId, Dormitory, Roster, Room, Student, ROOM_CAPACITY};
use crate::utils::error::{DashboardError, Result};
use chrono::NaiveDate;
use rand::distributions::Uniform;
use rand::Rng;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

const STUDENT_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const STUDENT_ID_LEN: usize = 9;

/// Trims, lowercases and collapses inner whitespace, so that
/// `"  Karimov   AZIZ "` and `"karimov aziz"` compare equal.
pub fn normalize_name(name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re.replace_all(name.trim(), " ").to_lowercase()
}

pub fn random_student_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let dist = Uniform::from(0..STUDENT_ID_ALPHABET.len());
    (0..STUDENT_ID_LEN)
        .map(|_| STUDENT_ID_ALPHABET[rng.sample(dist)] as char)
        .collect()
}

pub fn default_avatar_url<R: Rng + ?Sized>(rng: &mut R) -> String {
    let salt: f64 = rng.gen();
    format!("https://api.dicebear.com/9.x/avataaars/png?seed={}", salt)
}

/// Data collected by the "add student" form before it becomes a [`Student`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStudent {
    pub full_name: String,
    pub course: u8,
    pub group: String,
    pub faculty: String,
    pub direction: String,
    /// Used instead of `direction` when `direction` is [`OTHER_DIRECTION`].
    pub custom_direction: Option<String>,
    pub image_url: Option<String>,
}

impl NewStudent {
    fn final_direction(&self) -> &str {
        if self.direction == OTHER_DIRECTION {
            self.custom_direction.as_deref().unwrap_or("")
        } else {
            &self.direction
        }
    }

    pub fn into_student<R: Rng + ?Sized>(self, rng: &mut R, today: NaiveDate) -> Result<Student> {
        let full_name = self.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(DashboardError::MissingField {
                field: "full_name".to_string(),
            });
        }
        if self.faculty.trim().is_empty() {
            return Err(DashboardError::MissingField {
                field: "faculty".to_string(),
            });
        }
        let direction = self.final_direction().trim().to_string();
        if direction.is_empty() {
            return Err(DashboardError::MissingField {
                field: "direction".to_string(),
            });
        }
        if self.group.trim().is_empty() {
            return Err(DashboardError::MissingField {
                field: "group".to_string(),
            });
        }
        if !(1..=4).contains(&self.course) {
            return Err(DashboardError::InvalidCourse {
                course: self.course,
            });
        }
        if !is_known_faculty(&self.faculty) {
            tracing::debug!("Adding student with unlisted faculty '{}'", self.faculty);
        }

        let image_url = match self.image_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => url,
            None => default_avatar_url(rng),
        };

        Ok(Student {
            id: random_student_id(rng),
            full_name,
            course: self.course,
            group: self.group.trim().to_string(),
            faculty: self.faculty,
            direction,
            image_url: Some(image_url),
            joined_date: today,
        })
    }
}

/// Owner of the roster. Every edit swaps in new room/dormitory values, so a
/// [`Roster`] taken with [`RosterStore::snapshot`] stays as it was.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    roster: Roster,
}

impl RosterStore {
    pub fn new(roster: Roster) -> Self {
        Self { roster }
    }

    /// Accepts a roster loaded from elsewhere after checking its shape.
    pub fn from_roster(roster: Roster) -> Result<Self> {
        check_invariants(&roster)?;
        Ok(Self { roster })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn snapshot(&self) -> Roster {
        self.roster.clone()
    }

    /// Finds a student whose normalized name equals `full_name`, anywhere in
    /// the roster.
    pub fn find_by_name(&self, full_name: &str) -> Option<(&Dormitory, &Room, &Student)> {
        let target = normalize_name(full_name);
        self.roster.dormitories.iter().find_map(|dorm| {
            dorm.students()
                .find(|(_, s)| normalize_name(&s.full_name) == target)
                .map(|(room, s)| (dorm.as_ref(), room, s))
        })
    }

    pub fn add_student(&mut self, dorm_id: DormId, room_number: u32, student: Student) -> Result<()> {
        let room = self.room(dorm_id, room_number)?;
        if room.is_full() {
            return Err(DashboardError::RoomFull {
                dorm_id: dorm_id.0,
                room: room_number,
            });
        }

        if let Some((dorm, room, _)) = self.find_by_name(&student.full_name) {
            return Err(DashboardError::DuplicateStudent {
                name: student.full_name.clone(),
                dormitory: dorm.name.clone(),
                room: room.number,
            });
        }

        tracing::info!(
            "Assigning '{}' ({}) to room {} of dormitory {}",
            student.full_name,
            student.id,
            room_number,
            dorm_id
        );
        let slot = self.room_slot_mut(dorm_id, room_number)?;
        Arc::make_mut(slot).students.push(student);
        Ok(())
    }

    /// Validates the form data and adds the resulting student.
    pub fn add_new_student<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        dorm_id: DormId,
        room_number: u32,
        form: NewStudent,
        today: NaiveDate,
    ) -> Result<Student> {
        let student = form.into_student(rng, today)?;
        self.add_student(dorm_id, room_number, student.clone())?;
        Ok(student)
    }

    /// Removes the student with `student_id`; an unknown id leaves the room
    /// untouched and returns `Ok(None)`.
    pub fn remove_student(
        &mut self,
        dorm_id: DormId,
        room_number: u32,
        student_id: &str,
    ) -> Result<Option<Student>> {
        let position = self
            .room(dorm_id, room_number)?
            .students
            .iter()
            .position(|s| s.id == student_id);

        let Some(position) = position else {
            tracing::debug!(
                "Student {} not found in room {} of dormitory {}",
                student_id,
                room_number,
                dorm_id
            );
            return Ok(None);
        };

        let slot = self.room_slot_mut(dorm_id, room_number)?;
        let removed = Arc::make_mut(slot).students.remove(position);
        tracing::info!(
            "Removed '{}' ({}) from room {} of dormitory {}",
            removed.full_name,
            removed.id,
            room_number,
            dorm_id
        );
        Ok(Some(removed))
    }

    fn room(&self, dorm_id: DormId, room_number: u32) -> Result<&Room> {
        let dorm = self
            .roster
            .dormitory(dorm_id)
            .ok_or(DashboardError::UnknownDormitory { dorm_id: dorm_id.0 })?;
        dorm.room(room_number).ok_or(DashboardError::UnknownRoom {
            dorm_id: dorm_id.0,
            room: room_number,
        })
    }

    fn room_slot_mut(&mut self, dorm_id: DormId, room_number: u32) -> Result<&mut Arc<Room>> {
        let dorm = self
            .roster
            .dormitories
            .iter_mut()
            .find(|d| d.id == dorm_id)
            .ok_or(DashboardError::UnknownDormitory { dorm_id: dorm_id.0 })?;
        Arc::make_mut(dorm)
            .room_slot_mut(room_number)
            .ok_or(DashboardError::UnknownRoom {
                dorm_id: dorm_id.0,
                room: room_number,
            })
    }
}

/// Rooms numbered exactly `1..=total_rooms`, none over capacity, dormitory
/// ids unique. Student ids and normalized names are unique across the whole
/// roster.
pub fn check_invariants(roster: &Roster) -> Result<()> {
    let mut seen = HashSet::new();
    let mut ids = HashSet::new();
    let mut names: HashMap<String, (&str, u32)> = HashMap::new();
    for dorm in &roster.dormitories {
        if !seen.insert(dorm.id) {
            return Err(DashboardError::ValidationError {
                message: format!("dormitory id {} appears twice", dorm.id),
            });
        }
        if dorm.rooms.len() != dorm.total_rooms {
            return Err(DashboardError::ValidationError {
                message: format!(
                    "{} declares {} rooms but has {}",
                    dorm.name,
                    dorm.total_rooms,
                    dorm.rooms.len()
                ),
            });
        }
        for (index, room) in dorm.rooms.iter().enumerate() {
            if room.number as usize != index + 1 {
                return Err(DashboardError::ValidationError {
                    message: format!(
                        "{}: expected room {} at position {}, found {}",
                        dorm.name,
                        index + 1,
                        index,
                        room.number
                    ),
                });
            }
            if room.capacity != ROOM_CAPACITY || room.students.len() > room.capacity {
                return Err(DashboardError::ValidationError {
                    message: format!(
                        "{}: room {} holds {} of {} places",
                        dorm.name,
                        room.number,
                        room.students.len(),
                        room.capacity
                    ),
                });
            }
            for student in &room.students {
                if !ids.insert(student.id.as_str()) {
                    return Err(DashboardError::ValidationError {
                        message: format!("student id '{}' appears twice", student.id),
                    });
                }
                let key = normalize_name(&student.full_name);
                if let Some((other_dorm, other_room)) = names.get(&key) {
                    return Err(DashboardError::ValidationError {
                        message: format!(
                            "'{}' is listed in room {} of {} and in room {} of {}",
                            student.full_name, other_room, other_dorm, room.number, dorm.name
                        ),
                    });
                }
                names.insert(key, (dorm.name.as_str(), room.number));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 2).unwrap()
    }

    fn student(id: &str, name: &str) -> Student {
        Student {
            id: id.to_string(),
            full_name: name.to_string(),
            course: 2,
            group: "201".to_string(),
            faculty: "Pedagogika".to_string(),
            direction: "Pedagogika".to_string(),
            image_url: None,
            joined_date: today(),
        }
    }

    fn store() -> RosterStore {
        RosterStore::new(Roster::new(vec![
            Dormitory::new(DormId(1), "1-TTJ", (1..=3).map(Room::new).collect()),
            Dormitory::new(DormId(2), "2-TTJ", (1..=3).map(Room::new).collect()),
        ]))
    }

    fn form(name: &str) -> NewStudent {
        NewStudent {
            full_name: name.to_string(),
            course: 1,
            group: "101".to_string(),
            faculty: "Pedagogika".to_string(),
            direction: "Pedagogika".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Karimov \t  AZIZ "), "karimov aziz");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_add_then_remove() {
        let mut store = store();
        store.add_student(DormId(1), 2, student("a", "Aliyev Bobur")).unwrap();
        assert_eq!(store.roster().dormitory(DormId(1)).unwrap().room(2).unwrap().occupancy(), 1);

        let removed = store.remove_student(DormId(1), 2, "a").unwrap();
        assert_eq!(removed.map(|s| s.id), Some("a".to_string()));
        assert_eq!(store.roster().student_count(), 0);
    }

    #[test]
    fn test_full_room_rejects_fifth_student() {
        let mut store = store();
        for i in 0..4 {
            store
                .add_student(DormId(1), 1, student(&i.to_string(), &format!("Talaba {}", i)))
                .unwrap();
        }
        let before = store.snapshot();

        let err = store
            .add_student(DormId(1), 1, student("x", "Boshqa Talaba"))
            .unwrap_err();
        assert!(matches!(err, DashboardError::RoomFull { dorm_id: 1, room: 1 }));
        assert_eq!(store.roster(), &before);
    }

    #[test]
    fn test_duplicate_name_rejected_across_dormitories() {
        let mut store = store();
        store.add_student(DormId(1), 3, student("a", "Karimov Aziz")).unwrap();

        let err = store
            .add_student(DormId(2), 1, student("b", "  karimov   aziz"))
            .unwrap_err();
        match err {
            DashboardError::DuplicateStudent { dormitory, room, .. } => {
                assert_eq!(dormitory, "1-TTJ");
                assert_eq!(room, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.roster().student_count(), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut store = store();
        store.add_student(DormId(1), 1, student("a", "Aliyev Aziz")).unwrap();
        let before = store.snapshot();

        assert!(store.remove_student(DormId(1), 1, "nope").unwrap().is_none());
        assert_eq!(store.roster(), &before);
    }

    #[test]
    fn test_unknown_room_and_dormitory() {
        let mut store = store();
        assert!(matches!(
            store.add_student(DormId(9), 1, student("a", "A B")),
            Err(DashboardError::UnknownDormitory { dorm_id: 9 })
        ));
        assert!(matches!(
            store.remove_student(DormId(1), 4, "a"),
            Err(DashboardError::UnknownRoom { room: 4, .. })
        ));
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_edits() {
        let mut store = store();
        store.add_student(DormId(1), 1, student("a", "Aliyev Aziz")).unwrap();
        let snapshot = store.snapshot();

        store.add_student(DormId(1), 1, student("b", "Umarov Jasur")).unwrap();
        store.remove_student(DormId(1), 1, "a").unwrap();

        let snap_room = snapshot.dormitory(DormId(1)).unwrap().room(1).unwrap();
        assert_eq!(snap_room.students.len(), 1);
        assert_eq!(snap_room.students[0].id, "a");
        // untouched dormitories stay shared between snapshot and store
        assert!(Arc::ptr_eq(
            &snapshot.dormitories[1],
            &store.roster().dormitories[1]
        ));
    }

    #[test]
    fn test_new_student_form_validation() {
        let mut rng = StdRng::seed_from_u64(9);

        let mut missing_group = form("Aliyev Aziz");
        missing_group.group = "  ".to_string();
        assert!(matches!(
            missing_group.into_student(&mut rng, today()),
            Err(DashboardError::MissingField { .. })
        ));

        let mut other = form("Aliyev Aziz");
        other.direction = OTHER_DIRECTION.to_string();
        assert!(other.clone().into_student(&mut rng, today()).is_err());
        other.custom_direction = Some("Psixologiya".to_string());
        let student = other.into_student(&mut rng, today()).unwrap();
        assert_eq!(student.direction, "Psixologiya");

        let mut bad_course = form("Aliyev Aziz");
        bad_course.course = 5;
        assert!(matches!(
            bad_course.into_student(&mut rng, today()),
            Err(DashboardError::InvalidCourse { course: 5 })
        ));
    }

    #[test]
    fn test_add_new_student_fills_defaults() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut store = store();
        let student = store
            .add_new_student(&mut rng, DormId(2), 1, form("  Saidov   Lola "), today())
            .unwrap();

        assert_eq!(student.full_name, "Saidov   Lola");
        assert_eq!(student.id.len(), 9);
        assert!(student.id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(student.image_url.unwrap().starts_with("https://api.dicebear.com/"));
        assert_eq!(student.joined_date, today());
    }

    #[test]
    fn test_check_invariants_rejects_bad_numbering() {
        let good = store().snapshot();
        assert!(check_invariants(&good).is_ok());

        let bad = Roster::new(vec![Dormitory::new(
            DormId(1),
            "X",
            vec![Room::new(1), Room::new(3)],
        )]);
        assert!(check_invariants(&bad).is_err());
    }

    #[test]
    fn test_check_invariants_rejects_repeated_students() {
        let mut room = Room::new(1);
        room.students.push(student("a", "Karimov Aziz"));
        let mut other = Room::new(1);
        other.students.push(student("b", "  KARIMOV  aziz"));
        let same_name = Roster::new(vec![
            Dormitory::new(DormId(1), "1-TTJ", vec![room.clone()]),
            Dormitory::new(DormId(2), "2-TTJ", vec![other]),
        ]);
        let err = check_invariants(&same_name).unwrap_err();
        assert!(matches!(err, DashboardError::ValidationError { .. }));
        assert!(err.to_string().contains("room 1 of 1-TTJ"));
        assert!(RosterStore::from_roster(same_name).is_err());

        let mut clash = Room::new(1);
        clash.students.push(student("a", "Umarov Jasur"));
        let same_id = Roster::new(vec![
            Dormitory::new(DormId(1), "1-TTJ", vec![room]),
            Dormitory::new(DormId(2), "2-TTJ", vec![clash]),
        ]);
        let err = check_invariants(&same_id).unwrap_err();
        assert!(err.to_string().contains("student id 'a'"));
    }
}
