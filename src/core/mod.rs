pub mod aggregator;
pub mod assistant;
pub mod avatar;
pub mod catalog;
pub mod export;
pub mod roster;
pub mod seeder;
pub mod snapshot;

pub use crate::domain::model::{DormId, Dormitory, Room, Roster, Scope, Student};
pub use crate::domain::ports::{ImageSource, Storage, TextGenerator};
pub use crate::utils::error::Result;
