//! Semantic unit types for type-safe physical quantity handling
//!
//! Newtype wrappers keep temperatures, altitudes and proportions from being mixed up inside
//! the radiative model.
//!
//! # Design Philosophy
//! - Every quantity is `f64`: the model raises temperatures to the fourth power every step
//! - Total ordering via `Ord` (NaN sorts above all values)
//! - Private inner fields with validated constructors
//! - Explicit conversion methods between the three temperature scales
//! - Serde support for snapshots and configuration
//!
//! # Usage
//! ```
//! use greenhouse_core::core_types::units::{Celsius, Fahrenheit, Kelvin};
//!
//! let surface = Kelvin::new(288.15);
//! let celsius: Celsius = surface.into();
//! assert!((*celsius - 15.0).abs() < 1e-9);
//!
//! let fahrenheit: Fahrenheit = surface.into();
//! assert!((*fahrenheit - 59.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Mul, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Celsius to Kelvin conversion offset (0°C = 273.15 K)
const CELSIUS_KELVIN_OFFSET: f64 = 273.15;

/// Fahrenheit value of absolute zero
const FAHRENHEIT_ABSOLUTE_ZERO: f64 = -459.67;

/// Degrees Fahrenheit per Kelvin
const FAHRENHEIT_PER_KELVIN: f64 = 1.8;

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Temperature in Kelvin (absolute scale)
///
/// All model state is kept in Kelvin; the other scales only exist for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kelvin(f64);

impl Eq for Kelvin {}

impl PartialOrd for Kelvin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Kelvin {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Kelvin {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Kelvin {
    /// Absolute zero
    pub const ABSOLUTE_ZERO: Kelvin = Kelvin(0.0);

    /// Create a new Kelvin temperature. Asserts value >= absolute zero (0 K).
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn new(value: f64) -> Self {
        assert!(
            value >= 0.0,
            "Kelvin::new: value is below absolute zero (0 K)"
        );
        Kelvin(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius::new(self.0 - CELSIUS_KELVIN_OFFSET)
    }

    /// Convert to Fahrenheit
    #[inline]
    #[must_use]
    pub fn to_fahrenheit(self) -> Fahrenheit {
        Fahrenheit::new(self.0 * FAHRENHEIT_PER_KELVIN + FAHRENHEIT_ABSOLUTE_ZERO)
    }

    /// Fourth power of the temperature, the quantity radiated by a blackbody
    #[inline]
    #[must_use]
    pub fn fourth_power(self) -> f64 {
        self.0.powi(4)
    }
}

impl From<Kelvin> for Celsius {
    fn from(k: Kelvin) -> Celsius {
        k.to_celsius()
    }
}

impl From<Kelvin> for Fahrenheit {
    fn from(k: Kelvin) -> Fahrenheit {
        k.to_fahrenheit()
    }
}

impl From<f64> for Kelvin {
    fn from(v: f64) -> Self {
        Kelvin::new(v)
    }
}

impl From<Kelvin> for f64 {
    fn from(k: Kelvin) -> f64 {
        k.0
    }
}

impl fmt::Display for Kelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} K", self.0)
    }
}

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Eq for Celsius {}

impl PartialOrd for Celsius {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Celsius {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Absolute zero in Celsius
    pub const ABSOLUTE_ZERO: Celsius = Celsius(-CELSIUS_KELVIN_OFFSET);

    /// Create a new Celsius temperature. Asserts value >= absolute zero (-273.15°C).
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn new(value: f64) -> Self {
        assert!(
            value >= -CELSIUS_KELVIN_OFFSET,
            "Celsius::new: value is below absolute zero (-273.15°C)"
        );
        Celsius(value)
    }

    /// Convert to Kelvin
    ///
    /// Rounding can leave a value a few ulps below zero near absolute zero, so the result
    /// is floored at 0 K.
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin((self.0 + CELSIUS_KELVIN_OFFSET).max(0.0))
    }
}

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Kelvin {
        c.to_kelvin()
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°C", self.0)
    }
}

/// Temperature in degrees Fahrenheit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Fahrenheit(f64);

impl Eq for Fahrenheit {}

impl PartialOrd for Fahrenheit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fahrenheit {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Fahrenheit {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Fahrenheit {
    /// Absolute zero in Fahrenheit
    pub const ABSOLUTE_ZERO: Fahrenheit = Fahrenheit(FAHRENHEIT_ABSOLUTE_ZERO);

    /// Create a new Fahrenheit temperature. Asserts value >= absolute zero (-459.67°F).
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn new(value: f64) -> Self {
        assert!(
            value >= FAHRENHEIT_ABSOLUTE_ZERO,
            "Fahrenheit::new: value is below absolute zero (-459.67°F)"
        );
        Fahrenheit(value)
    }

    /// Convert to Kelvin (floored at 0 K like [`Celsius::to_kelvin`])
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(((self.0 - FAHRENHEIT_ABSOLUTE_ZERO) / FAHRENHEIT_PER_KELVIN).max(0.0))
    }
}

impl From<Fahrenheit> for Kelvin {
    fn from(f: Fahrenheit) -> Kelvin {
        f.to_kelvin()
    }
}

impl fmt::Display for Fahrenheit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°F", self.0)
    }
}

/// Temperature scale selected for display of the surface temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemperatureUnits {
    /// Absolute scale, the model's native unit
    #[default]
    Kelvin,
    /// Degrees Celsius
    Celsius,
    /// Degrees Fahrenheit
    Fahrenheit,
}

impl TemperatureUnits {
    /// Express a Kelvin temperature as a raw value in this scale
    #[must_use]
    pub fn from_kelvin(self, temperature: Kelvin) -> f64 {
        match self {
            Self::Kelvin => temperature.value(),
            Self::Celsius => *temperature.to_celsius(),
            Self::Fahrenheit => *temperature.to_fahrenheit(),
        }
    }

    /// Interpret a raw value in this scale as a Kelvin temperature
    #[must_use]
    #[track_caller]
    pub fn to_kelvin(self, value: f64) -> Kelvin {
        match self {
            Self::Kelvin => Kelvin::new(value),
            Self::Celsius => Celsius::new(value).to_kelvin(),
            Self::Fahrenheit => Fahrenheit::new(value).to_kelvin(),
        }
    }

    /// Unit symbol used in reports
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Kelvin => "K",
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

// ============================================================================
// SPATIAL TYPES
// ============================================================================

/// Distance or altitude in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Meters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Meters {
    /// Zero distance
    pub const ZERO: Meters = Meters(0.0);

    /// Create a new distance
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Add for Meters {
    type Output = Meters;
    fn add(self, rhs: Meters) -> Meters {
        Meters(self.0 + rhs.0)
    }
}

impl Sub for Meters {
    type Output = Meters;
    fn sub(self, rhs: Meters) -> Meters {
        Meters(self.0 - rhs.0)
    }
}

impl Mul<f64> for Meters {
    type Output = Meters;
    fn mul(self, rhs: f64) -> Meters {
        Meters(self.0 * rhs)
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} m", self.0)
    }
}

// ============================================================================
// DIMENSIONLESS
// ============================================================================

/// Fraction in [0, 1] (absorption proportions, albedo, reflectivity)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Fraction(f64);

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Fraction {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Fraction {
    /// Zero fraction
    pub const ZERO: Fraction = Fraction(0.0);

    /// Full/complete (1.0)
    pub const ONE: Fraction = Fraction(1.0);

    /// Create a new fraction. Asserts value is within [0, 1].
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn new(value: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&value),
            "Fraction::new: value not in [0, 1]"
        );
        Fraction(value)
    }

    /// Create a fraction, clamping into [0, 1] (NaN becomes 0)
    #[inline]
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Fraction(0.0)
        } else {
            Fraction(value.clamp(0.0, 1.0))
        }
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// The complementary fraction `1 - self`
    #[inline]
    #[must_use]
    pub fn complement(self) -> Fraction {
        Fraction(1.0 - self.0)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin_to_celsius() {
        let k = Kelvin(273.15);
        let c = k.to_celsius();
        assert!((c.0 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_kelvin_to_fahrenheit() {
        let k = Kelvin(373.15);
        let f = k.to_fahrenheit();
        assert!((f.0 - 212.0).abs() < 1e-9);
    }

    #[test]
    fn test_absolute_zero_in_every_scale() {
        assert_eq!(Kelvin::ABSOLUTE_ZERO.to_celsius(), Celsius::ABSOLUTE_ZERO);
        assert_eq!(Kelvin::ABSOLUTE_ZERO.to_fahrenheit(), Fahrenheit::ABSOLUTE_ZERO);
        assert_eq!(Celsius::ABSOLUTE_ZERO.to_kelvin(), Kelvin::ABSOLUTE_ZERO);
        assert_eq!(Fahrenheit::ABSOLUTE_ZERO.to_kelvin(), Kelvin::ABSOLUTE_ZERO);
    }

    #[test]
    fn test_temperature_units_round_trip() {
        let mut kelvin = 0.0;
        while kelvin <= 999.0 {
            let temperature = Kelvin::new(kelvin);
            for units in [
                TemperatureUnits::Kelvin,
                TemperatureUnits::Celsius,
                TemperatureUnits::Fahrenheit,
            ] {
                let back = units.to_kelvin(units.from_kelvin(temperature));
                assert!(
                    (back.value() - kelvin).abs() < 1e-9,
                    "{units:?} round trip of {kelvin} gave {back}"
                );
            }
            kelvin += 0.37;
        }
    }

    #[test]
    #[should_panic(expected = "Kelvin::new: value is below absolute zero (0 K)")]
    fn test_kelvin_new_panics_below_zero() {
        let _ = Kelvin::new(-0.5);
    }

    #[test]
    #[should_panic(expected = "Fraction::new: value not in [0, 1]")]
    fn test_fraction_new_panics_on_too_large() {
        let _ = Fraction::new(1.5);
    }

    #[test]
    fn test_fraction_clamped_and_complement() {
        assert_eq!(Fraction::clamped(1.7), Fraction::ONE);
        assert_eq!(Fraction::clamped(-0.2), Fraction::ZERO);
        assert_eq!(Fraction::clamped(f64::NAN), Fraction::ZERO);
        assert!((Fraction::new(0.3).complement().value() - 0.7).abs() < 1e-12);
    }
}
