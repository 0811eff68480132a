use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Every room in both buildings seats four students.
pub const ROOM_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DormId(pub u32);

impl fmt::Display for DormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub full_name: String,
    pub course: u8,
    pub group: String,
    pub faculty: String,
    pub direction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub joined_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Empty,
    Partial,
    Full,
}

impl RoomStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RoomStatus::Empty => "Bo'sh",
            RoomStatus::Partial => "Band",
            RoomStatus::Full => "To'la",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub number: u32,
    pub capacity: usize,
    pub students: Vec<Student>,
}

impl Room {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            capacity: ROOM_CAPACITY,
            students: Vec::new(),
        }
    }

    pub fn occupancy(&self) -> usize {
        self.students.len()
    }

    pub fn free_places(&self) -> usize {
        self.capacity.saturating_sub(self.students.len())
    }

    pub fn is_full(&self) -> bool {
        self.students.len() >= self.capacity
    }

    pub fn status(&self) -> RoomStatus {
        match self.students.len() {
            0 => RoomStatus::Empty,
            n if n >= self.capacity => RoomStatus::Full,
            _ => RoomStatus::Partial,
        }
    }
}

/// A residence building. Rooms are numbered `1..=total_rooms` and stored in
/// that order, so room `n` lives at index `n - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dormitory {
    pub id: DormId,
    pub name: String,
    pub total_rooms: usize,
    pub rooms: Vec<Arc<Room>>,
}

impl Dormitory {
    pub fn new(id: DormId, name: impl Into<String>, rooms: Vec<Room>) -> Self {
        Self {
            id,
            name: name.into(),
            total_rooms: rooms.len(),
            rooms: rooms.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn room(&self, number: u32) -> Option<&Room> {
        let index = (number as usize).checked_sub(1)?;
        self.rooms.get(index).map(Arc::as_ref)
    }

    pub(crate) fn room_slot_mut(&mut self, number: u32) -> Option<&mut Arc<Room>> {
        let index = (number as usize).checked_sub(1)?;
        self.rooms.get_mut(index)
    }

    pub fn students(&self) -> impl Iterator<Item = (&Room, &Student)> {
        self.rooms
            .iter()
            .flat_map(|room| room.students.iter().map(move |s| (room.as_ref(), s)))
    }

    pub fn student_count(&self) -> usize {
        self.rooms.iter().map(|r| r.occupancy()).sum()
    }
}

/// The whole in-memory roster. Cloning is cheap and yields a snapshot that
/// later edits never touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub dormitories: Vec<Arc<Dormitory>>,
}

impl Roster {
    pub fn new(dormitories: Vec<Dormitory>) -> Self {
        Self {
            dormitories: dormitories.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn dormitory(&self, id: DormId) -> Option<&Dormitory> {
        self.dormitories
            .iter()
            .find(|d| d.id == id)
            .map(Arc::as_ref)
    }

    /// Dormitories selected by `scope`, as shared handles.
    pub fn scoped(&self, scope: Scope) -> Vec<Arc<Dormitory>> {
        self.dormitories
            .iter()
            .filter(|d| scope.includes(d.id))
            .cloned()
            .collect()
    }

    pub fn student_count(&self) -> usize {
        self.dormitories.iter().map(|d| d.student_count()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    Dormitory(DormId),
}

impl Scope {
    pub fn includes(&self, id: DormId) -> bool {
        match self {
            Scope::All => true,
            Scope::Dormitory(selected) => *selected == id,
        }
    }
}
