//! Flux meter: a movable sensor measuring energy flow through a horizontal plane

use super::packet::{Direction, EmEnergyPacket, Wavelength};
use super::rate_tracker::EnergyRateTracker;
use crate::constants::HEIGHT_OF_ATMOSPHERE;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Horizontal sensor plane with one rate tracker per wavelength and direction
#[derive(Debug, Clone)]
pub struct FluxSensor {
    altitude: f64,
    initial_altitude: f64,
    visible_down: EnergyRateTracker,
    visible_up: EnergyRateTracker,
    infrared_down: EnergyRateTracker,
    infrared_up: EnergyRateTracker,
}

/// Flux rates measured by a sensor (W/m², all non-negative)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluxReading {
    pub altitude: f64,
    pub visible_down: f64,
    pub visible_up: f64,
    pub infrared_down: f64,
    pub infrared_up: f64,
}

impl FluxReading {
    /// Downward minus upward flux across all wavelengths
    pub fn net_downward(&self) -> f64 {
        self.visible_down + self.infrared_down - self.visible_up - self.infrared_up
    }
}

impl FluxSensor {
    pub fn new(altitude: f64) -> Self {
        let altitude = clamp_altitude(altitude);
        Self {
            altitude,
            initial_altitude: altitude,
            visible_down: EnergyRateTracker::new(),
            visible_up: EnergyRateTracker::new(),
            infrared_down: EnergyRateTracker::new(),
            infrared_up: EnergyRateTracker::new(),
        }
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Move the sensor, clamped to the atmosphere
    pub fn set_altitude(&mut self, altitude: f64) {
        self.altitude = clamp_altitude(altitude);
    }

    /// Log every packet that crossed the sensor plane during its latest update
    pub fn measure(&mut self, packets: &[EmEnergyPacket]) {
        let altitude = self.altitude;
        for packet in packets.iter().filter(|p| p.crossed(altitude)) {
            self.tracker_mut(packet.wavelength, packet.direction)
                .log_energy(packet.energy);
        }
    }

    fn tracker_mut(
        &mut self,
        wavelength: Wavelength,
        direction: Direction,
    ) -> &mut EnergyRateTracker {
        match (wavelength, direction) {
            (Wavelength::Visible, Direction::Down) => &mut self.visible_down,
            (Wavelength::Visible, Direction::Up) => &mut self.visible_up,
            (Wavelength::Infrared, Direction::Down) => &mut self.infrared_down,
            (Wavelength::Infrared, Direction::Up) => &mut self.infrared_up,
        }
    }

    pub fn step_trackers(&mut self, dt: f64) {
        self.visible_down.step(dt);
        self.visible_up.step(dt);
        self.infrared_down.step(dt);
        self.infrared_up.step(dt);
    }

    pub fn reading(&self) -> FluxReading {
        FluxReading {
            altitude: self.altitude,
            visible_down: self.visible_down.energy_rate(),
            visible_up: self.visible_up.energy_rate(),
            infrared_down: self.infrared_down.energy_rate(),
            infrared_up: self.infrared_up.energy_rate(),
        }
    }

    pub fn reset(&mut self) {
        self.altitude = self.initial_altitude;
        self.visible_down.reset();
        self.visible_up.reset();
        self.infrared_down.reset();
        self.infrared_up.reset();
    }
}

fn clamp_altitude(altitude: f64) -> f64 {
    if (0.0..=HEIGHT_OF_ATMOSPHERE).contains(&altitude) {
        return altitude;
    }
    let clamped = if altitude.is_nan() {
        0.0
    } else {
        altitude.clamp(0.0, HEIGHT_OF_ATMOSPHERE)
    };
    warn!(requested = altitude, clamped, "Flux sensor altitude outside the atmosphere");
    clamped
}

/// A flux sensor plus whether consumers should show it
#[derive(Debug, Clone)]
pub struct FluxMeter {
    pub sensor: FluxSensor,
    visible: bool,
}

impl FluxMeter {
    /// Meter placed halfway up the atmosphere, initially hidden
    pub fn new() -> Self {
        Self {
            sensor: FluxSensor::new(HEIGHT_OF_ATMOSPHERE / 2.0),
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn reset(&mut self) {
        self.sensor.reset();
        self.visible = false;
    }
}

impl Default for FluxMeter {
    fn default() -> Self {
        Self::new()
    }
}
