//! Display units and conversion from the model's internal units.
//!
//! Internal units follow the host: feet for length, square and cubic feet for
//! area and volume, radians for angles, kilograms for mass.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayUnit {
    General,
    Feet,
    Inches,
    Meters,
    Centimeters,
    Millimeters,
    SquareFeet,
    SquareMeters,
    CubicFeet,
    CubicMeters,
    Radians,
    Degrees,
    Percentage,
    Kilograms,
    KilogramsPerCubicMeter,
}

impl DisplayUnit {
    /// Multiplier from internal to display units.
    fn factor(self) -> f64 {
        match self {
            DisplayUnit::General
            | DisplayUnit::Feet
            | DisplayUnit::SquareFeet
            | DisplayUnit::CubicFeet
            | DisplayUnit::Radians
            | DisplayUnit::Percentage
            | DisplayUnit::Kilograms => 1.0,
            DisplayUnit::Inches => 12.0,
            DisplayUnit::Meters => 0.3048,
            DisplayUnit::Centimeters => 30.48,
            DisplayUnit::Millimeters => 304.8,
            DisplayUnit::SquareMeters => 0.092_903_04,
            DisplayUnit::CubicMeters => 0.028_316_846_592,
            DisplayUnit::Degrees => 180.0 / std::f64::consts::PI,
            DisplayUnit::KilogramsPerCubicMeter => 1.0 / 0.028_316_846_592,
        }
    }

    pub fn to_display(self, internal: f64) -> f64 {
        internal * self.factor()
    }

    pub fn to_internal(self, display: f64) -> f64 {
        display / self.factor()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DisplayUnit::General => "",
            DisplayUnit::Feet => "'",
            DisplayUnit::Inches => "\"",
            DisplayUnit::Meters => "m",
            DisplayUnit::Centimeters => "cm",
            DisplayUnit::Millimeters => "mm",
            DisplayUnit::SquareFeet => "SF",
            DisplayUnit::SquareMeters => "m²",
            DisplayUnit::CubicFeet => "CF",
            DisplayUnit::CubicMeters => "m³",
            DisplayUnit::Radians => "rad",
            DisplayUnit::Degrees => "°",
            DisplayUnit::Percentage => "%",
            DisplayUnit::Kilograms => "kg",
            DisplayUnit::KilogramsPerCubicMeter => "kg/m³",
        }
    }

    fn decimals(self) -> usize {
        match self {
            DisplayUnit::Millimeters => 0,
            DisplayUnit::Centimeters | DisplayUnit::Degrees => 1,
            _ => 2,
        }
    }

    /// The host's rendering of zero in this unit, e.g. `0 mm` or `0.00%`.
    pub fn label(self) -> String {
        let zero = if self.decimals() == 0 {
            "0".to_string()
        } else {
            format!("0.{}", "0".repeat(self.decimals()))
        };
        match self {
            DisplayUnit::General => String::new(),
            DisplayUnit::Feet | DisplayUnit::Inches | DisplayUnit::Degrees | DisplayUnit::Percentage => {
                format!("{}{}", zero, self.symbol())
            }
            _ => format!("{} {}", zero, self.symbol()),
        }
    }

    pub fn is_percentage(self) -> bool {
        self == DisplayUnit::Percentage
    }
}

/// Turn a unit label into a spreadsheet number format by quoting the symbol
/// that follows the first space.
pub fn number_format(label: &str) -> Option<String> {
    if label.is_empty() {
        return None;
    }
    match label.find(' ') {
        Some(idx) if idx > 0 => Some(format!("{}\"", label.replace(' ', " \""))),
        _ => Some(label.to_string()),
    }
}

/// Round to four decimals, the tolerance used for write-skip comparisons.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversion_round_trip() {
        let internal = 10.0;
        let mm = DisplayUnit::Millimeters.to_display(internal);
        assert!((mm - 3048.0).abs() < 1e-9);
        assert!((DisplayUnit::Millimeters.to_internal(mm) - internal).abs() < 1e-12);
    }

    #[test]
    fn test_area_conversion() {
        let m2 = DisplayUnit::SquareMeters.to_display(100.0);
        assert!((m2 - 9.290304).abs() < 1e-9);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DisplayUnit::Millimeters.label(), "0 mm");
        assert_eq!(DisplayUnit::SquareMeters.label(), "0.00 m²");
        assert_eq!(DisplayUnit::Percentage.label(), "0.00%");
        assert_eq!(DisplayUnit::General.label(), "");
    }

    #[test]
    fn test_number_format_quotes_symbol() {
        assert_eq!(number_format("0 mm").as_deref(), Some("0 \"mm\""));
        assert_eq!(number_format("0.00%").as_deref(), Some("0.00%"));
        assert_eq!(number_format(""), None);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.234_56), 1.2346);
        assert_eq!(round4(2.0), 2.0);
    }
}
