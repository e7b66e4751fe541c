//! Roadmap domain module: initiatives and their scheduling records.

pub mod initiative;
pub mod item;
pub mod schedule;

pub use initiative::{Initiative, InitiativeId};
pub use item::{Priority, RoadmapItem, RoadmapItemId, RoadmapStatus};
pub use schedule::DateRange;
