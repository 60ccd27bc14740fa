//! Directional energy packets
//!
//! The energy representation that drives layer temperatures. A packet is a slab of
//! electromagnetic energy (J/m²) travelling vertically through the atmosphere at the model
//! speed of light.

use crate::constants::{INFRARED_WAVELENGTH, SPEED_OF_LIGHT, VISIBLE_WAVELENGTH};
use serde::{Deserialize, Serialize};

/// Wavelength class of a packet or photon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wavelength {
    /// Sunlight
    Visible,
    /// Thermal radiation from the ground and atmosphere
    Infrared,
}

impl Wavelength {
    /// Nominal wavelength in meters
    pub const fn nominal(self) -> f64 {
        match self {
            Wavelength::Visible => VISIBLE_WAVELENGTH,
            Wavelength::Infrared => INFRARED_WAVELENGTH,
        }
    }

    /// Whether this is the infrared class
    pub const fn is_infrared(self) -> bool {
        matches!(self, Wavelength::Infrared)
    }
}

/// Vertical direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Away from the ground
    Up,
    /// Towards the ground
    Down,
}

impl Direction {
    /// +1 for upward travel, -1 for downward travel
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }

    /// The opposite direction
    #[must_use]
    pub const fn reversed(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// A directional packet of electromagnetic energy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmEnergyPacket {
    /// Wavelength class
    pub wavelength: Wavelength,
    /// Energy carried (J/m²)
    pub energy: f64,
    /// Current altitude (m)
    pub altitude: f64,
    /// Altitude before the most recent update (m)
    pub previous_altitude: f64,
    /// Direction of travel
    pub direction: Direction,
}

impl EmEnergyPacket {
    /// Create a packet at `altitude` that has not moved yet
    pub fn new(wavelength: Wavelength, energy: f64, altitude: f64, direction: Direction) -> Self {
        debug_assert!(
            energy.is_finite() && energy >= 0.0,
            "packet energy must be finite and non-negative, got {energy}"
        );
        Self {
            wavelength,
            energy,
            altitude,
            previous_altitude: altitude,
            direction,
        }
    }

    /// Move the packet for `dt` seconds
    pub fn update(&mut self, dt: f64) {
        self.previous_altitude = self.altitude;
        self.altitude += self.direction.sign() * SPEED_OF_LIGHT * dt;
    }

    /// Whether the most recent update carried the packet across `altitude` in its direction
    /// of travel. The starting point itself does not count, so a packet never crosses the
    /// layer that emitted it.
    pub fn crossed(&self, altitude: f64) -> bool {
        match self.direction {
            Direction::Up => self.previous_altitude < altitude && self.altitude >= altitude,
            Direction::Down => self.previous_altitude > altitude && self.altitude <= altitude,
        }
    }

    /// Mirror the packet about `altitude` and reverse its direction
    pub fn reflect_at(&mut self, altitude: f64) {
        self.altitude = 2.0 * altitude - self.altitude;
        self.previous_altitude = altitude;
        self.direction = self.direction.reversed();
    }

    /// Whether the packet carries no energy
    pub fn is_depleted(&self) -> bool {
        self.energy <= 0.0
    }
}
