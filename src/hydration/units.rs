//! Measurement units
//!
//! Volume, weight and length units with conversion between metric storage
//! values and the user's display units. Everything is stored metric (ml, kg,
//! cm); conversion happens only at the display boundary.

use serde::{Deserialize, Serialize};

/// Kind of physical quantity a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Volume,
    Weight,
    Length,
}

/// A concrete unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Milliliters,
    FluidOunces,
    Kilograms,
    Pounds,
    Centimeters,
    Feet,
}

// ============================================================================
// Conversion factors (to litres, kilograms and metres)
// ============================================================================

/// Litres per millilitre
pub const L_PER_ML: f64 = 0.001;
/// Litres per US fluid ounce
pub const L_PER_FL_OZ: f64 = 0.0295735295625;
/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.45359237;
/// Metres per centimetre
pub const M_PER_CM: f64 = 0.01;
/// Metres per foot
pub const M_PER_FT: f64 = 0.3048;

impl Unit {
    pub fn unit_type(&self) -> UnitType {
        match self {
            Unit::Milliliters | Unit::FluidOunces => UnitType::Volume,
            Unit::Kilograms | Unit::Pounds => UnitType::Weight,
            Unit::Centimeters | Unit::Feet => UnitType::Length,
        }
    }

    /// Size of one unit in the base unit of its type
    pub fn factor(&self) -> f64 {
        match self {
            Unit::Milliliters => L_PER_ML,
            Unit::FluidOunces => L_PER_FL_OZ,
            Unit::Kilograms => 1.0,
            Unit::Pounds => KG_PER_LB,
            Unit::Centimeters => M_PER_CM,
            Unit::Feet => M_PER_FT,
        }
    }

    /// Short form used after numbers
    pub fn contraction(&self) -> &'static str {
        match self {
            Unit::Milliliters => "ml",
            Unit::FluidOunces => "fl oz",
            Unit::Kilograms => "kg",
            Unit::Pounds => "lbs",
            Unit::Centimeters => "cm",
            Unit::Feet => "ft",
        }
    }

    /// Metric unit in which values of this type are stored
    pub fn metric(unit_type: UnitType) -> Unit {
        match unit_type {
            UnitType::Volume => Unit::Milliliters,
            UnitType::Weight => Unit::Kilograms,
            UnitType::Length => Unit::Centimeters,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.trim() {
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(Unit::Milliliters)
            }
            "fl oz" | "floz" | "fl_oz" | "oz" | "fluid ounce" | "fluid ounces" => {
                Some(Unit::FluidOunces)
            }
            "kg" | "kilogram" | "kilograms" => Some(Unit::Kilograms),
            "lb" | "lbs" | "pound" | "pounds" => Some(Unit::Pounds),
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Some(Unit::Centimeters)
            }
            "ft" | "foot" | "feet" => Some(Unit::Feet),
            _ => None,
        }
    }

    /// Parse and require a specific unit type
    pub fn from_str_of_type(s: &str, unit_type: UnitType) -> Option<Self> {
        Self::from_str(s).filter(|u| u.unit_type() == unit_type)
    }
}

/// Convert an amount between two units of the same type
pub fn convert(amount: f64, from: Unit, to: Unit) -> Option<f64> {
    if from.unit_type() != to.unit_type() {
        return None;
    }
    Some(amount * from.factor() / to.factor())
}

fn round_to_precision(amount: f64, precision: f64) -> f64 {
    (amount / precision).round() * precision
}

/// Convert a stored metric amount to the display unit, rounded to `round_precision`
pub fn convert_metric_amount_to_displayed(
    metric_amount: f64,
    displayed_unit: Unit,
    round_precision: f64,
) -> Option<f64> {
    if round_precision <= 0.0 {
        return None;
    }
    let metric_unit = Unit::metric(displayed_unit.unit_type());
    let displayed = convert(metric_amount, metric_unit, displayed_unit)?;
    Some(round_to_precision(displayed, round_precision))
}

/// Snap a metric amount so that it shows as a round number in the display unit
///
/// 500 ml shown in fluid ounces is 16.9 fl oz; with precision 1 this stores
/// the metric equivalent of exactly 17 fl oz.
pub fn adjust_metric_amount_for_storing(
    metric_amount: f64,
    displayed_unit: Unit,
    round_precision: f64,
) -> Option<f64> {
    let displayed = convert_metric_amount_to_displayed(metric_amount, displayed_unit, round_precision)?;
    let metric_unit = Unit::metric(displayed_unit.unit_type());
    convert(displayed, displayed_unit, metric_unit)
}

/// Format a metric amount in the display unit, e.g. "2,000 ml" or "67.6 fl oz"
pub fn format_metric_amount(
    metric_amount: f64,
    displayed_unit: Unit,
    round_precision: f64,
    decimals: usize,
    display_units: bool,
) -> Option<String> {
    let displayed = convert_metric_amount_to_displayed(metric_amount, displayed_unit, round_precision)?;
    let mut text = format_decimal(displayed, decimals);
    if display_units {
        text.push(' ');
        text.push_str(displayed_unit.contraction());
    }
    Some(text)
}

/// Decimal style number: grouped thousands, fixed fraction digits
pub fn format_decimal(amount: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, amount.abs());
    let (integer_part, fraction_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, ch) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let mut result = String::new();
    if amount < 0.0 && !is_zero {
        result.push('-');
    }
    result.push_str(&grouped);
    if let Some(fraction) = fraction_part {
        result.push('.');
        result.push_str(fraction);
    }
    result
}
