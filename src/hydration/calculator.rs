//! Daily water intake estimation
//!
//! Body-surface-area water balance model. Daily losses (urine, faeces, skin,
//! respiration, sweat) minus metabolic water gain give the gross need; water
//! supplied by food is then subtracted.
//!
//! Lost water and food supply are each rounded to 100 ml before the final
//! subtraction; the difference is rounded again.

use serde::{Deserialize, Serialize};

/// Gender and reproductive state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Man,
    Woman,
    PregnantFemale,
    BreastfeedingFemale,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Man => "man",
            Gender::Woman => "woman",
            Gender::PregnantFemale => "pregnant_female",
            Gender::BreastfeedingFemale => "breastfeeding_female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "man" | "male" | "m" => Some(Gender::Man),
            "woman" | "female" | "f" => Some(Gender::Woman),
            "pregnant_female" | "pregnant" => Some(Gender::PregnantFemale),
            "breastfeeding_female" | "breastfeeding" | "lactating" => {
                Some(Gender::BreastfeedingFemale)
            }
            _ => None,
        }
    }

    /// Extra daily need while pregnant or lactating, in ml
    fn pregnancy_and_lactation_extra(&self) -> f64 {
        match self {
            Gender::PregnantFemale => 300.0,
            Gender::BreastfeedingFemale => 700.0,
            Gender::Man | Gender::Woman => 0.0,
        }
    }
}

/// How often the person exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalActivity {
    Rare,
    Occasional,
    Weekly,
    Daily,
}

impl PhysicalActivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhysicalActivity::Rare => "rare",
            PhysicalActivity::Occasional => "occasional",
            PhysicalActivity::Weekly => "weekly",
            PhysicalActivity::Daily => "daily",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rare" | "rarely" | "sedentary" => Some(PhysicalActivity::Rare),
            "occasional" | "occasionally" => Some(PhysicalActivity::Occasional),
            "weekly" => Some(PhysicalActivity::Weekly),
            "daily" => Some(PhysicalActivity::Daily),
            _ => None,
        }
    }

    /// Multiplier applied to resting caloric expenditure
    fn factor(&self) -> f64 {
        match self {
            PhysicalActivity::Rare => 1.4,
            PhysicalActivity::Occasional => 1.53,
            PhysicalActivity::Weekly => 1.76,
            PhysicalActivity::Daily => 2.25,
        }
    }
}

/// Country selecting the typical daily water supply from food
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    Argentina,
    Mexico,
    Brazil,
    Uruguay,
    China,
    Indonesia,
    Singapore,
    Dubai,
    Russia,
    France,
    UnitedKingdom,
    Spain,
    Japan,
    Germany,
    Poland,
    Turkey,
    #[default]
    Average,
}

impl Country {
    pub const ALL: [Country; 17] = [
        Country::Argentina,
        Country::Mexico,
        Country::Brazil,
        Country::Uruguay,
        Country::China,
        Country::Indonesia,
        Country::Singapore,
        Country::Dubai,
        Country::Russia,
        Country::France,
        Country::UnitedKingdom,
        Country::Spain,
        Country::Japan,
        Country::Germany,
        Country::Poland,
        Country::Turkey,
        Country::Average,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Argentina => "argentina",
            Country::Mexico => "mexico",
            Country::Brazil => "brazil",
            Country::Uruguay => "uruguay",
            Country::China => "china",
            Country::Indonesia => "indonesia",
            Country::Singapore => "singapore",
            Country::Dubai => "dubai",
            Country::Russia => "russia",
            Country::France => "france",
            Country::UnitedKingdom => "united_kingdom",
            Country::Spain => "spain",
            Country::Japan => "japan",
            Country::Germany => "germany",
            Country::Poland => "poland",
            Country::Turkey => "turkey",
            Country::Average => "average",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "uk" | "gb" | "great_britain" => return Some(Country::UnitedKingdom),
            "uae" => return Some(Country::Dubai),
            "" | "default" => return Some(Country::Average),
            _ => {}
        }
        Self::ALL.iter().copied().find(|c| c.as_str() == normalized)
    }

    /// Typical daily water taken in with food, in ml
    pub fn water_from_food(&self) -> f64 {
        match self {
            Country::Argentina => 623.0,
            Country::Mexico => 557.0,
            Country::Brazil => 470.0,
            Country::Uruguay => 550.0,
            Country::China => 1000.0,
            Country::Indonesia => 468.0,
            Country::Singapore => 533.0,
            Country::Dubai => 711.0,
            Country::Russia => 926.0,
            Country::France => 840.0,
            Country::UnitedKingdom => 683.0,
            Country::Spain => 794.0,
            Country::Japan => 855.0,
            Country::Germany => 780.0,
            Country::Poland => 780.0,
            Country::Turkey => 830.0,
            Country::Average => 711.0,
        }
    }
}

/// Calculator input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterGoalData {
    pub physical_activity: PhysicalActivity,
    pub gender: Gender,
    /// Years
    pub age: i32,
    /// Centimetres
    pub height: f64,
    /// Kilograms
    pub weight: f64,
    pub country: Country,
}

// ============================================================================
// Model constants
// ============================================================================

const LOSSES_URINE_ML: f64 = 1500.0;
const LOSSES_FAECES_ML: f64 = 200.0;
const SWEAT_BASELINE_ML: f64 = 500.0;

/// (weight factor, extra calories) per age band: <30, 30..60, >=60
const MAN_CALORY_FACTORS: [(f64, f64); 3] = [(15.057, 692.2), (11.472, 873.1), (11.711, 587.7)];
const WOMAN_CALORY_FACTORS: [(f64, f64); 3] = [(14.818, 486.6), (8.126, 845.6), (9.082, 658.5)];

// ============================================================================
// Public API
// ============================================================================

/// Recommended daily water intake in ml, a multiple of 100
pub fn calc_daily_water_intake(data: &WaterGoalData) -> f64 {
    let lost_water = calc_lost_water(data);
    let supply_water = calc_supply_water(data);
    round_amount(lost_water - supply_water)
}

/// Total daily water loss in ml, rounded to 100
pub fn calc_lost_water(data: &WaterGoalData) -> f64 {
    round_amount(calc_net_water_losses(data, true, false))
}

/// Water supplied by food in ml, rounded to 100
pub fn calc_supply_water(data: &WaterGoalData) -> f64 {
    let without_food = calc_net_water_losses(data, false, false);
    let with_food = calc_net_water_losses(data, false, true);
    round_amount(without_food - with_food)
}

// ============================================================================
// Model terms
// ============================================================================

fn round_amount(amount: f64) -> f64 {
    (amount / 100.0).round() * 100.0
}

fn calc_net_water_losses(
    data: &WaterGoalData,
    pregnancy_and_lactation: bool,
    water_in_food: bool,
) -> f64 {
    let body_surface = calc_body_surface(data.weight, data.height);
    let calory_expenditure =
        calc_calory_expenditure(data.physical_activity, data.weight, data.gender, data.age);
    let calory_expenditure_rare =
        calc_calory_expenditure(PhysicalActivity::Rare, data.weight, data.gender, data.age);

    let losses_skin = calc_losses_skin(body_surface);
    let losses_respiratory = calc_losses_respiratory(calory_expenditure);
    let sweat = calc_sweat_amount(data.physical_activity, calory_expenditure, calory_expenditure_rare);
    let metabolic_water = calc_gain_metabolic_water(calory_expenditure);

    let mut water_intake = LOSSES_URINE_ML + LOSSES_FAECES_ML + losses_skin + losses_respiratory
        + sweat
        - metabolic_water;

    if pregnancy_and_lactation {
        water_intake += data.gender.pregnancy_and_lactation_extra();
    }

    if water_in_food {
        water_intake -= data.country.water_from_food();
    }

    water_intake
}

/// Body surface area in m² (DuBois)
fn calc_body_surface(weight: f64, height: f64) -> f64 {
    0.007184 * height.powf(0.725) * weight.powf(0.425)
}

fn calc_calory_expenditure(
    physical_activity: PhysicalActivity,
    weight: f64,
    gender: Gender,
    age: i32,
) -> f64 {
    let factors = match gender {
        Gender::Man => &MAN_CALORY_FACTORS,
        Gender::Woman | Gender::PregnantFemale | Gender::BreastfeedingFemale => {
            &WOMAN_CALORY_FACTORS
        }
    };

    let (weight_factor, extra_calory) = factors[age_band(age)];

    physical_activity.factor() * (weight_factor * weight + extra_calory)
}

/// Index into the calory factor tables; bands are half-open
fn age_band(age: i32) -> usize {
    match age {
        i32::MIN..=29 => 0,
        30..=59 => 1,
        _ => 2,
    }
}

fn calc_losses_skin(body_surface: f64) -> f64 {
    body_surface * 7.0 * 24.0
}

fn calc_losses_respiratory(calory_expenditure: f64) -> f64 {
    0.107 * calory_expenditure + 92.2
}

fn calc_sweat_amount(
    physical_activity: PhysicalActivity,
    calory_expenditure: f64,
    calory_expenditure_rare: f64,
) -> f64 {
    match physical_activity {
        PhysicalActivity::Rare => SWEAT_BASELINE_ML,
        PhysicalActivity::Occasional | PhysicalActivity::Weekly | PhysicalActivity::Daily => {
            SWEAT_BASELINE_ML + (calory_expenditure - calory_expenditure_rare) * 0.75 / 0.58
        }
    }
}

fn calc_gain_metabolic_water(calory_expenditure: f64) -> f64 {
    0.119 * calory_expenditure - 2.25
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(
        age: i32,
        gender: Gender,
        height: f64,
        weight: f64,
        physical_activity: PhysicalActivity,
        country: Country,
    ) -> WaterGoalData {
        WaterGoalData {
            physical_activity,
            gender,
            age,
            height,
            weight,
            country,
        }
    }

    fn check(d: WaterGoalData, daily: f64, lost: f64, supply: f64) {
        assert_eq!(calc_daily_water_intake(&d), daily, "daily intake for {:?}", d);
        assert_eq!(calc_lost_water(&d), lost, "lost water for {:?}", d);
        assert_eq!(calc_supply_water(&d), supply, "supply water for {:?}", d);
    }

    #[test]
    fn test_reference_fixtures_united_kingdom() {
        use Gender::*;
        use PhysicalActivity::*;
        let uk = Country::UnitedKingdom;

        check(data(18, Man, 130.0, 35.0, Rare, uk), 1800.0, 2500.0, 700.0);
        check(data(18, Woman, 130.0, 35.0, Rare, uk), 1800.0, 2500.0, 700.0);
        check(data(18, PregnantFemale, 130.0, 35.0, Rare, uk), 2100.0, 2800.0, 700.0);
        check(data(18, BreastfeedingFemale, 130.0, 35.0, Rare, uk), 2500.0, 3200.0, 700.0);

        check(data(30, Man, 170.0, 60.0, Occasional, uk), 2100.0, 2800.0, 700.0);
        check(data(40, Woman, 160.0, 55.0, Daily, uk), 3200.0, 3900.0, 700.0);
        check(data(50, PregnantFemale, 180.0, 80.0, Weekly, uk), 2900.0, 3600.0, 700.0);
        check(data(25, BreastfeedingFemale, 190.0, 90.0, Occasional, uk), 2900.0, 3600.0, 700.0);
    }

    #[test]
    fn test_default_profile_scenario() {
        let d = data(30, Gender::Man, 170.0, 70.0, PhysicalActivity::Occasional, Country::Average);
        let daily = calc_daily_water_intake(&d);
        assert!((2000.0..=2600.0).contains(&daily));
        assert_eq!(daily, 2100.0);
        assert_eq!(calc_lost_water(&d), 2800.0);
        assert_eq!(calc_supply_water(&d), 700.0);
    }

    #[test]
    fn test_deterministic() {
        let d = data(44, Gender::Woman, 168.0, 63.5, PhysicalActivity::Weekly, Country::Japan);
        let first = calc_daily_water_intake(&d);
        for _ in 0..10 {
            assert_eq!(calc_daily_water_intake(&d), first);
        }
    }

    #[test]
    fn test_results_are_multiples_of_100() {
        for &country in Country::ALL.iter() {
            for age in [17, 29, 30, 45, 59, 60, 81] {
                for weight in [48.0, 61.3, 77.7, 102.0] {
                    let d = data(age, Gender::Woman, 163.0, weight, PhysicalActivity::Weekly, country);
                    for value in [
                        calc_daily_water_intake(&d),
                        calc_lost_water(&d),
                        calc_supply_water(&d),
                    ] {
                        assert_eq!(value % 100.0, 0.0, "{} not rounded for {:?}", value, d);
                    }
                }
            }
        }
    }

    #[test]
    fn test_activity_is_monotonic() {
        let activities = [
            PhysicalActivity::Rare,
            PhysicalActivity::Occasional,
            PhysicalActivity::Weekly,
            PhysicalActivity::Daily,
        ];
        for gender in [Gender::Man, Gender::Woman] {
            let results: Vec<f64> = activities
                .iter()
                .map(|&a| calc_daily_water_intake(&data(30, gender, 170.0, 70.0, a, Country::Average)))
                .collect();
            assert!(results.windows(2).all(|w| w[0] <= w[1]), "{:?}", results);
        }
    }

    #[test]
    fn test_pregnancy_and_lactation_extras() {
        let base = |g| data(30, g, 165.0, 60.0, PhysicalActivity::Occasional, Country::Average);
        let woman = calc_daily_water_intake(&base(Gender::Woman));
        let pregnant = calc_daily_water_intake(&base(Gender::PregnantFemale));
        let breastfeeding = calc_daily_water_intake(&base(Gender::BreastfeedingFemale));

        assert_eq!(woman, 2100.0);
        assert_eq!(pregnant, 2400.0);
        assert_eq!(breastfeeding, 2800.0);
        assert!((pregnant - woman - 300.0).abs() <= 100.0);
        assert!((breastfeeding - woman - 700.0).abs() <= 100.0);
    }

    #[test]
    fn test_age_band_edges() {
        assert_eq!(age_band(29), 0);
        assert_eq!(age_band(30), 1);
        assert_eq!(age_band(59), 1);
        assert_eq!(age_band(60), 2);
        assert_eq!(age_band(-5), 0);

        let at = |age| {
            calc_net_water_losses(
                &data(age, Gender::Woman, 165.0, 60.0, PhysicalActivity::Weekly, Country::Average),
                true,
                false,
            )
        };
        // 30 and 59 share a band, 29 and 60 do not
        assert_eq!(at(30), at(59));
        assert!((at(29) - at(30)).abs() > 1.0);
        assert!((at(59) - at(60)).abs() > 1.0);
    }

    #[test]
    fn test_food_water_by_country() {
        let d = |country| data(30, Gender::Man, 170.0, 70.0, PhysicalActivity::Occasional, country);
        assert_eq!(calc_supply_water(&d(Country::China)), 1000.0);
        assert_eq!(calc_daily_water_intake(&d(Country::China)), 1800.0);
        assert_eq!(calc_supply_water(&d(Country::Brazil)), 500.0);
        assert_eq!(calc_daily_water_intake(&d(Country::Brazil)), 2300.0);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(Gender::from_str("Pregnant"), Some(Gender::PregnantFemale));
        assert_eq!(Gender::from_str("breastfeeding-female"), Some(Gender::BreastfeedingFemale));
        assert_eq!(Gender::from_str("robot"), None);
        assert_eq!(PhysicalActivity::from_str("Daily"), Some(PhysicalActivity::Daily));
        assert_eq!(Country::from_str("United Kingdom"), Some(Country::UnitedKingdom));
        assert_eq!(Country::from_str("uk"), Some(Country::UnitedKingdom));
        assert_eq!(Country::from_str("atlantis"), None);
        for country in Country::ALL {
            assert_eq!(Country::from_str(country.as_str()), Some(country));
        }
    }
}
