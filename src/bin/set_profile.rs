//! Utility to set profile fields and recalculate today's water goal
//!
//! Usage: set_profile gender=woman age=34 height_cm=168 weight_kg=61 physical_activity=weekly

use waterlog::tools::profile::{self, ProfileFields};

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid number for {}: '{}'", key, value))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ProfileFields, String> {
    let mut fields = ProfileFields::default();

    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{}'", arg))?;
        let value = value.trim();

        match key.trim() {
            "gender" => fields.gender = Some(value.to_string()),
            "age" => fields.age = Some(parse_number(key, value)?),
            "height_cm" | "height" => fields.height_cm = Some(parse_number(key, value)?),
            "weight_kg" | "weight" => fields.weight_kg = Some(parse_number(key, value)?),
            "physical_activity" | "activity" => fields.physical_activity = Some(value.to_string()),
            "country" => fields.country = Some(value.to_string()),
            "daily_water_intake" => fields.daily_water_intake = Some(parse_number(key, value)?),
            "hot_day_extra_factor" => fields.hot_day_extra_factor = Some(parse_number(key, value)?),
            "high_activity_extra_factor" => {
                fields.high_activity_extra_factor = Some(parse_number(key, value)?)
            }
            "day_offset_hours" => fields.day_offset_hours = Some(parse_number(key, value)?),
            "volume_units" => fields.volume_units = Some(value.to_string()),
            "weight_units" => fields.weight_units = Some(value.to_string()),
            "length_units" => fields.length_units = Some(value.to_string()),
            other => return Err(format!("Unknown profile field: '{}'", other)),
        }
    }

    Ok(fields)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fields = parse_args(std::env::args().skip(1))?;

    let db_path = waterlog::db::database_path();
    println!("Database path: {}", db_path.display());

    let database = waterlog::db::open(&db_path)?;

    let saved = profile::set_profile(&database, fields)?;
    println!("Profile set:");
    println!("  Gender: {}", saved.gender);
    println!("  Age: {}", saved.age);
    println!("  Height: {}", saved.height_formatted);
    println!("  Weight: {}", saved.weight_formatted);
    println!("  Activity: {}", saved.physical_activity);
    println!("  Country: {}", saved.country);

    let result = profile::recalculate_water_goal(&database, None)?;
    println!("Water goal for {}:", result.date);
    println!("  Lost water: {} ml", result.calculation.lost_water);
    println!("  Supplied by food: {} ml", result.calculation.supply_water);
    println!("  Daily intake: {}", result.calculation.daily_water_intake_formatted);
    println!("  Goal today: {}", result.goal_amount_formatted);

    Ok(())
}
