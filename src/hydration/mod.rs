//! Hydration domain logic
//!
//! Water goal estimation, drink catalogue and unit conversion. Nothing in
//! here touches the database.

pub mod calculator;
pub mod drink_type;
pub mod units;

pub use calculator::{
    calc_daily_water_intake, calc_lost_water, calc_supply_water, Country, Gender,
    PhysicalActivity, WaterGoalData,
};
pub use drink_type::DrinkType;
pub use units::{
    adjust_metric_amount_for_storing, convert, convert_metric_amount_to_displayed,
    format_metric_amount, Unit, UnitType,
};
