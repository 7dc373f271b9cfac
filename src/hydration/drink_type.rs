//! Drink types
//!
//! Static catalogue of drink kinds and how much each contributes to (or takes
//! away from) the body's water balance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkType {
    Water,
    Coffee,
    Tea,
    Soda,
    Juice,
    Milk,
    Sport,
    Energy,
    Beer,
    Wine,
    HardLiquor,
}

const ALL_DRINK_TYPES: [DrinkType; 11] = [
    DrinkType::Water,
    DrinkType::Coffee,
    DrinkType::Tea,
    DrinkType::Soda,
    DrinkType::Juice,
    DrinkType::Milk,
    DrinkType::Sport,
    DrinkType::Energy,
    DrinkType::Beer,
    DrinkType::Wine,
    DrinkType::HardLiquor,
];

impl DrinkType {
    /// All drink types in index order
    pub fn all() -> &'static [DrinkType] {
        &ALL_DRINK_TYPES
    }

    /// Stable index used for ordering and storage
    pub fn index(&self) -> i64 {
        match self {
            DrinkType::Water => 0,
            DrinkType::Coffee => 1,
            DrinkType::Tea => 2,
            DrinkType::Soda => 3,
            DrinkType::Juice => 4,
            DrinkType::Milk => 5,
            DrinkType::Sport => 6,
            DrinkType::Energy => 7,
            DrinkType::Beer => 8,
            DrinkType::Wine => 9,
            DrinkType::HardLiquor => 10,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| ALL_DRINK_TYPES.get(i).copied())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkType::Water => "water",
            DrinkType::Coffee => "coffee",
            DrinkType::Tea => "tea",
            DrinkType::Soda => "soda",
            DrinkType::Juice => "juice",
            DrinkType::Milk => "milk",
            DrinkType::Sport => "sport",
            DrinkType::Energy => "energy",
            DrinkType::Beer => "beer",
            DrinkType::Wine => "wine",
            DrinkType::HardLiquor => "hard_liquor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "water" => Some(DrinkType::Water),
            "coffee" | "espresso" => Some(DrinkType::Coffee),
            "tea" => Some(DrinkType::Tea),
            "soda" | "pop" | "soft_drink" => Some(DrinkType::Soda),
            "juice" => Some(DrinkType::Juice),
            "milk" => Some(DrinkType::Milk),
            "sport" | "sports_drink" | "isotonic" => Some(DrinkType::Sport),
            "energy" | "energy_drink" => Some(DrinkType::Energy),
            "beer" => Some(DrinkType::Beer),
            "wine" => Some(DrinkType::Wine),
            "hard_liquor" | "strong_liquor" | "liquor" | "spirits" => Some(DrinkType::HardLiquor),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DrinkType::Water => "Water",
            DrinkType::Coffee => "Coffee",
            DrinkType::Tea => "Tea",
            DrinkType::Soda => "Soda",
            DrinkType::Juice => "Juice",
            DrinkType::Milk => "Milk",
            DrinkType::Sport => "Sport",
            DrinkType::Energy => "Energy",
            DrinkType::Beer => "Beer",
            DrinkType::Wine => "Wine",
            DrinkType::HardLiquor => "Hard Liquor",
        }
    }

    /// Share of the drunk volume that hydrates
    pub fn hydration_factor(&self) -> f64 {
        match self {
            DrinkType::Water => 1.00,
            DrinkType::Coffee => 0.98,
            DrinkType::Tea => 0.99,
            DrinkType::Soda => 0.89,
            DrinkType::Juice => 0.85,
            DrinkType::Milk => 0.87,
            DrinkType::Sport => 0.95,
            DrinkType::Energy => 0.90,
            DrinkType::Beer => 0.95,
            DrinkType::Wine => 0.85,
            DrinkType::HardLiquor => 0.60,
        }
    }

    /// Extra water lost per ml drunk (alcohol only)
    pub fn dehydration_factor(&self) -> f64 {
        match self {
            DrinkType::Beer => 0.5,
            DrinkType::Wine => 1.5,
            DrinkType::HardLiquor => 4.0,
            _ => 0.0,
        }
    }

    pub fn is_alcoholic(&self) -> bool {
        self.dehydration_factor() > 0.0
    }
}
