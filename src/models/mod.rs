//! Data models
//!
//! Rust structs representing database entities.

pub mod dates;
mod drink;
mod intake;
mod profile;
mod water_goal;

pub use drink::Drink;
pub use intake::{
    AggregateFunction, AmountParts, DrinkTotal, GroupingUnit, Intake, IntakeCreate, IntakeUpdate,
};
pub use profile::{ProfileUpdate, UserProfile};
pub use water_goal::{GoalFactors, WaterGoal};
