//! The sun: source of all visible energy entering the model

use super::packet::{Direction, EmEnergyPacket, Wavelength};
use super::rate_tracker::EnergyRateTracker;
use crate::constants::HEIGHT_OF_ATMOSPHERE;
use std::ops::RangeInclusive;
use tracing::warn;

/// Energy reaching a square meter of the ground per second at intensity 1, averaged over the
/// whole globe (total solar irradiance / 4) (W/m²)
pub const OUTPUT_ENERGY_RATE: f64 = 1361.0 / 4.0;

/// Permitted range of the solar intensity proportion
pub const SOLAR_INTENSITY_RANGE: RangeInclusive<f64> = 0.5..=2.0;

/// Emits downward visible packets at the top of the atmosphere
#[derive(Debug, Clone)]
pub struct SunEnergySource {
    is_shining: bool,
    proportion_of_max: f64,
    initial_proportion: f64,
    output_tracker: EnergyRateTracker,
}

impl SunEnergySource {
    /// A sun that is not yet shining, at the given intensity proportion
    pub fn new(proportion_of_max: f64) -> Self {
        let proportion_of_max = clamp_intensity(proportion_of_max);
        Self {
            is_shining: false,
            proportion_of_max,
            initial_proportion: proportion_of_max,
            output_tracker: EnergyRateTracker::new(),
        }
    }

    /// Whether the sun is emitting
    pub fn is_shining(&self) -> bool {
        self.is_shining
    }

    /// Turn the sun on or off
    pub fn set_shining(&mut self, shining: bool) {
        self.is_shining = shining;
    }

    /// Intensity relative to the baseline output
    pub fn proportion_of_max(&self) -> f64 {
        self.proportion_of_max
    }

    /// Set the intensity, clamping to [`SOLAR_INTENSITY_RANGE`]
    pub fn set_proportion_of_max(&mut self, proportion: f64) {
        self.proportion_of_max = clamp_intensity(proportion);
    }

    /// Output while shining (W/m²)
    pub fn nominal_output_rate(&self) -> f64 {
        OUTPUT_ENERGY_RATE * self.proportion_of_max
    }

    /// Emit one downward visible packet carrying this step's output
    pub fn produce_energy(&mut self, dt: f64, packets: &mut Vec<EmEnergyPacket>) {
        if !self.is_shining {
            return;
        }
        let energy = self.nominal_output_rate() * dt;
        packets.push(EmEnergyPacket::new(
            Wavelength::Visible,
            energy,
            HEIGHT_OF_ATMOSPHERE,
            Direction::Down,
        ));
        self.output_tracker.log_energy(energy);
    }

    /// Advance the output tracker
    pub fn step_tracker(&mut self, dt: f64) {
        self.output_tracker.step(dt);
    }

    /// Measured output over the trailing window (W/m²)
    pub fn output_energy_rate(&self) -> f64 {
        self.output_tracker.energy_rate()
    }

    /// Stop shining and restore the construction intensity
    pub fn reset(&mut self) {
        self.is_shining = false;
        self.proportion_of_max = self.initial_proportion;
        self.output_tracker.reset();
    }
}

fn clamp_intensity(proportion: f64) -> f64 {
    debug_assert!(
        SOLAR_INTENSITY_RANGE.contains(&proportion),
        "solar intensity {proportion} outside {SOLAR_INTENSITY_RANGE:?}"
    );
    if SOLAR_INTENSITY_RANGE.contains(&proportion) {
        proportion
    } else {
        let clamped = if proportion.is_nan() {
            1.0
        } else {
            proportion.clamp(*SOLAR_INTENSITY_RANGE.start(), *SOLAR_INTENSITY_RANGE.end())
        };
        warn!(requested = proportion, clamped, "Solar intensity out of range, clamping");
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_output_until_shining() {
        let mut sun = SunEnergySource::new(1.0);
        let mut packets = Vec::new();
        sun.produce_energy(0.1, &mut packets);
        assert!(packets.is_empty());

        sun.set_shining(true);
        sun.produce_energy(0.1, &mut packets);
        assert_eq!(packets.len(), 1);
        assert_relative_eq!(packets[0].energy, OUTPUT_ENERGY_RATE * 0.1);
        assert_eq!(packets[0].direction, Direction::Down);
        assert_eq!(packets[0].wavelength, Wavelength::Visible);
    }

    #[test]
    fn test_output_rate_tracks_intensity() {
        let mut sun = SunEnergySource::new(2.0);
        sun.set_shining(true);
        let mut packets = Vec::new();
        for _ in 0..120 {
            sun.produce_energy(1.0 / 60.0, &mut packets);
            sun.step_tracker(1.0 / 60.0);
        }
        assert_relative_eq!(sun.output_energy_rate(), 2.0 * OUTPUT_ENERGY_RATE, max_relative = 1e-9);
    }

    #[test]
    fn test_reset_restores_initial_intensity() {
        let mut sun = SunEnergySource::new(1.0);
        sun.set_shining(true);
        sun.set_proportion_of_max(1.5);
        sun.reset();
        assert!(!sun.is_shining());
        assert_relative_eq!(sun.proportion_of_max(), 1.0);
    }
}
