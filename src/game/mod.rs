pub mod skirmish;

pub use skirmish::{Direction, Skirmish, SkirmishMove, UnitKind};
