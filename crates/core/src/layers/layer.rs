//! State and behavior shared by every energy absorbing/emitting layer

use super::material::LayerMaterial;
use super::{PacketInteraction, PhotonInteraction};
use crate::constants::{
    AT_EQUILIBRIUM_THRESHOLD, EQUILIBRATION_TIME, PHOTON_ENERGY, STEFAN_BOLTZMANN,
};
use crate::core_types::{Fraction, Kelvin, Meters};
use crate::energy::{EmEnergyPacket, EnergyRateTracker, Wavelength};
use crate::photons::Photon;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

/// Construction parameters for a layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOptions {
    /// Temperature at construction and after a reset
    pub initial_temperature: Kelvin,
    /// Floor the temperature is clamped to
    pub minimum_temperature: Kelvin,
    pub visible_absorption: Fraction,
    /// Also the emissivity of the layer
    pub infrared_absorption: Fraction,
    pub initially_active: bool,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            initial_temperature: Kelvin::ABSOLUTE_ZERO,
            minimum_temperature: Kelvin::ABSOLUTE_ZERO,
            visible_absorption: Fraction::ZERO,
            infrared_absorption: Fraction::ONE,
            initially_active: true,
        }
    }
}

/// A horizontal slab at a fixed altitude that absorbs energy, warms, and re-radiates
/// infrared energy according to the Stefan-Boltzmann law
///
/// Temperatures are integrated with an explicit Euler step:
/// `ΔT = (absorbed − surfaces · ε · σ · T⁴ · dt) / C`, where the emissivity `ε` equals the
/// infrared absorption proportion and `C` is the material's heat capacity per square meter.
#[derive(Debug, Clone)]
pub struct EnergyAbsorbingEmittingLayer {
    altitude: f64,
    material: LayerMaterial,
    options: LayerOptions,

    temperature: Kelvin,
    visible_absorption: Fraction,
    infrared_absorption: Fraction,
    active: bool,

    at_equilibrium: bool,
    time_below_threshold: f64,
    /// Energy-budget rate of the last update, before clamping to the minimum (K/s)
    temperature_change_rate: f64,

    energy_absorbed_this_step: f64,
    absorbed_photon_energy: f64,
    absorbed_tracker: EnergyRateTracker,
    emitted_tracker: EnergyRateTracker,
}

impl EnergyAbsorbingEmittingLayer {
    pub fn new(altitude: Meters, material: LayerMaterial, options: LayerOptions) -> Self {
        Self {
            altitude: altitude.value(),
            material,
            options,
            temperature: options.initial_temperature,
            visible_absorption: options.visible_absorption,
            infrared_absorption: options.infrared_absorption,
            active: options.initially_active,
            at_equilibrium: false,
            time_below_threshold: 0.0,
            temperature_change_rate: 0.0,
            energy_absorbed_this_step: 0.0,
            absorbed_photon_energy: 0.0,
            absorbed_tracker: EnergyRateTracker::new(),
            emitted_tracker: EnergyRateTracker::new(),
        }
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn material(&self) -> &LayerMaterial {
        &self.material
    }

    pub fn temperature(&self) -> Kelvin {
        self.temperature
    }

    pub fn minimum_temperature(&self) -> Kelvin {
        self.options.minimum_temperature
    }

    pub fn initial_temperature(&self) -> Kelvin {
        self.options.initial_temperature
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_at_equilibrium(&self) -> bool {
        self.at_equilibrium
    }

    /// Unclamped temperature change rate from the last update (K/s)
    pub fn temperature_change_rate(&self) -> f64 {
        self.temperature_change_rate
    }

    pub fn visible_absorption(&self) -> Fraction {
        self.visible_absorption
    }

    pub fn infrared_absorption(&self) -> Fraction {
        self.infrared_absorption
    }

    /// Proportion of incident energy of `wavelength` the layer captures
    pub fn absorption_proportion(&self, wavelength: Wavelength) -> f64 {
        match wavelength {
            Wavelength::Visible => self.visible_absorption.value(),
            Wavelength::Infrared => self.infrared_absorption.value(),
        }
    }

    pub fn set_visible_absorption(&mut self, proportion: Fraction) {
        if proportion != self.visible_absorption {
            self.visible_absorption = proportion;
            self.perturb();
        }
    }

    pub fn set_infrared_absorption(&mut self, proportion: Fraction) {
        if proportion != self.infrared_absorption {
            self.infrared_absorption = proportion;
            self.perturb();
        }
    }

    /// Activate or deactivate the layer. A deactivated layer returns to its initial
    /// temperature and forgets everything it had absorbed.
    pub fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        self.active = active;
        if !active {
            self.temperature = self.options.initial_temperature;
            self.temperature_change_rate = 0.0;
            self.energy_absorbed_this_step = 0.0;
            self.absorbed_photon_energy = 0.0;
            self.absorbed_tracker.reset();
            self.emitted_tracker.reset();
        }
        self.perturb();
    }

    /// Absorb this layer's share of a packet that crossed it during its latest update
    pub fn absorb_packet(&mut self, packet: &mut EmEnergyPacket) -> PacketInteraction {
        if !self.active || !packet.crossed(self.altitude) {
            return PacketInteraction::pass_through(packet.energy);
        }
        let absorbed_energy = packet.energy * self.absorption_proportion(packet.wavelength);
        if absorbed_energy <= 0.0 {
            return PacketInteraction::pass_through(packet.energy);
        }
        packet.energy -= absorbed_energy;
        self.credit_energy(absorbed_energy);
        PacketInteraction {
            absorbed: true,
            absorbed_energy,
            residual_energy: packet.energy,
        }
    }

    /// Add energy to this step's budget
    pub fn credit_energy(&mut self, energy: f64) {
        debug_assert!(
            energy.is_finite() && energy >= 0.0,
            "absorbed energy must be finite and non-negative, got {energy}"
        );
        self.energy_absorbed_this_step += energy;
        self.absorbed_tracker.log_energy(energy);
    }

    /// Absorb a photon that crossed the layer with probability equal to its absorption
    /// proportion
    pub fn capture_photon(
        &mut self,
        photon: &Photon,
        previous_altitude: f64,
        rng: &mut StdRng,
    ) -> PhotonInteraction {
        if !self.active || !photon.crossed(previous_altitude, self.altitude) {
            return PhotonInteraction::PassThrough;
        }
        let proportion = self.absorption_proportion(photon.wavelength);
        if proportion > 0.0 && rng.random::<f64>() < proportion {
            self.absorbed_photon_energy += PHOTON_ENERGY;
            PhotonInteraction::Absorbed
        } else {
            PhotonInteraction::PassThrough
        }
    }

    /// Energy held from absorbed photons, awaiting re-emission (J/m²)
    pub fn absorbed_photon_energy(&self) -> f64 {
        self.absorbed_photon_energy
    }

    /// Whole photons' worth of energy awaiting re-emission
    pub fn held_photon_count(&self) -> usize {
        (self.absorbed_photon_energy / PHOTON_ENERGY).floor() as usize
    }

    #[cfg(test)]
    pub(crate) fn add_photon_energy(&mut self, energy: f64) {
        self.absorbed_photon_energy += energy;
    }

    /// Withdraw one photon's worth of absorbed energy if the layer holds that much
    pub fn take_photon_energy(&mut self) -> bool {
        if self.absorbed_photon_energy >= PHOTON_ENERGY {
            self.absorbed_photon_energy -= PHOTON_ENERGY;
            true
        } else {
            false
        }
    }

    /// Integrate the temperature over `dt` and radiate one infrared packet per face
    pub fn update_temperature(&mut self, dt: f64, emitted: &mut Vec<EmEnergyPacket>) {
        let absorbed = std::mem::take(&mut self.energy_absorbed_this_step);
        if !self.active || dt <= 0.0 {
            return;
        }

        let directions = self.material.radiation_directions.directions();
        let per_surface = self.infrared_absorption.value()
            * STEFAN_BOLTZMANN
            * self.temperature.fourth_power()
            * dt;
        let radiated = per_surface * directions.len() as f64;

        let delta = (absorbed - radiated) / self.material.heat_capacity();
        let candidate = self.temperature.value() + delta;
        debug_assert!(
            candidate.is_finite(),
            "layer at {} m produced a non-finite temperature",
            self.altitude
        );
        let new_temperature = if candidate.is_finite() {
            candidate.max(self.options.minimum_temperature.value())
        } else {
            warn!(
                altitude = self.altitude,
                absorbed, radiated, "Non-finite layer temperature, clamping to minimum"
            );
            self.options.minimum_temperature.value()
        };

        self.temperature_change_rate = if delta.is_finite() {
            delta / dt
        } else {
            f64::INFINITY
        };
        self.temperature = Kelvin::new(new_temperature);

        if per_surface > 0.0 && per_surface.is_finite() {
            for &direction in directions {
                emitted.push(EmEnergyPacket::new(
                    Wavelength::Infrared,
                    per_surface,
                    self.altitude,
                    direction,
                ));
            }
            self.emitted_tracker.log_energy(radiated);
        }
    }

    /// Update the equilibrium flag from the last temperature change rate
    pub fn check_equilibrium(&mut self, dt: f64) -> bool {
        if !self.active {
            self.time_below_threshold = 0.0;
            self.at_equilibrium = false;
            return false;
        }
        if self.temperature_change_rate.abs() < AT_EQUILIBRIUM_THRESHOLD {
            self.time_below_threshold += dt;
        } else {
            self.time_below_threshold = 0.0;
        }
        self.at_equilibrium = self.time_below_threshold >= EQUILIBRATION_TIME;
        self.at_equilibrium
    }

    /// Clear the equilibrium flag after a configuration change
    pub fn perturb(&mut self) {
        self.at_equilibrium = false;
        self.time_below_threshold = 0.0;
    }

    pub fn step_trackers(&mut self, dt: f64) {
        self.absorbed_tracker.step(dt);
        self.emitted_tracker.step(dt);
    }

    /// Absorbed energy rate over the trailing window (W/m²)
    pub fn absorbed_energy_rate(&self) -> f64 {
        self.absorbed_tracker.energy_rate()
    }

    /// Emitted energy rate over the trailing window, both faces combined (W/m²)
    pub fn emitted_energy_rate(&self) -> f64 {
        self.emitted_tracker.energy_rate()
    }

    /// Emission rate from each radiating face at the current temperature (W/m²)
    pub fn emission_rate_per_surface(&self) -> f64 {
        if self.active {
            self.infrared_absorption.value() * STEFAN_BOLTZMANN * self.temperature.fourth_power()
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(Meters::new(self.altitude), self.material, self.options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::Direction;
    use approx::assert_relative_eq;

    fn glass_layer() -> EnergyAbsorbingEmittingLayer {
        EnergyAbsorbingEmittingLayer::new(
            Meters::new(10_000.0),
            LayerMaterial::GLASS,
            LayerOptions::default(),
        )
    }

    fn crossing_packet(energy: f64) -> EmEnergyPacket {
        let mut packet =
            EmEnergyPacket::new(Wavelength::Infrared, energy, 9_900.0, Direction::Up);
        packet.update(0.01);
        packet
    }

    #[test]
    fn test_absorbs_proportion_of_crossing_packet() {
        let mut layer = glass_layer();
        layer.set_infrared_absorption(Fraction::new(0.25));
        let mut packet = crossing_packet(8.0);

        let interaction = layer.absorb_packet(&mut packet);

        assert!(interaction.absorbed);
        assert_relative_eq!(interaction.absorbed_energy, 2.0);
        assert_relative_eq!(interaction.residual_energy, 6.0);
        assert_relative_eq!(packet.energy, 6.0);
    }

    #[test]
    fn test_zero_absorption_is_pure_pass_through() {
        let mut layer = glass_layer();
        layer.set_infrared_absorption(Fraction::ZERO);
        let mut packet = crossing_packet(8.0);
        let interaction = layer.absorb_packet(&mut packet);
        assert!(!interaction.absorbed);
        assert_relative_eq!(packet.energy, 8.0);

        let mut emitted = Vec::new();
        layer.update_temperature(0.1, &mut emitted);
        assert!(emitted.is_empty());
        assert_relative_eq!(layer.temperature().value(), 0.0);
    }

    #[test]
    fn test_inactive_layer_ignores_packets() {
        let mut layer = glass_layer();
        layer.set_active(false);
        let mut packet = crossing_packet(8.0);
        assert!(!layer.absorb_packet(&mut packet).absorbed);
        assert_relative_eq!(packet.energy, 8.0);
    }

    #[test]
    fn test_absorbed_energy_warms_layer() {
        let mut layer = glass_layer();
        let mut emitted = Vec::new();
        layer.credit_energy(1.05);
        layer.update_temperature(0.01, &mut emitted);
        assert_relative_eq!(layer.temperature().value(), 1.0, max_relative = 1e-12);
        assert_relative_eq!(layer.temperature_change_rate(), 100.0, max_relative = 1e-9);
    }

    #[test]
    fn test_warm_layer_radiates_both_ways() {
        let mut layer = EnergyAbsorbingEmittingLayer::new(
            Meters::new(10_000.0),
            LayerMaterial::GLASS,
            LayerOptions {
                initial_temperature: Kelvin::new(250.0),
                ..LayerOptions::default()
            },
        );
        let mut emitted = Vec::new();
        layer.update_temperature(0.01, &mut emitted);

        let per_surface = STEFAN_BOLTZMANN * 250.0_f64.powi(4) * 0.01;
        assert_eq!(emitted.len(), 2);
        assert_relative_eq!(emitted[0].energy, per_surface, max_relative = 1e-12);
        assert!(emitted.iter().any(|p| p.direction == Direction::Down));
        let expected = 250.0 - 2.0 * per_surface / LayerMaterial::GLASS.heat_capacity();
        assert_relative_eq!(layer.temperature().value(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_temperature_clamps_to_minimum() {
        let mut layer = EnergyAbsorbingEmittingLayer::new(
            Meters::new(0.0),
            LayerMaterial::EARTH,
            LayerOptions {
                initial_temperature: Kelvin::new(245.0),
                minimum_temperature: Kelvin::new(245.0),
                ..LayerOptions::default()
            },
        );
        let mut emitted = Vec::new();
        layer.update_temperature(1.0 / 30.0, &mut emitted);
        assert_relative_eq!(layer.temperature().value(), 245.0);
        assert!(layer.temperature_change_rate() < 0.0);
    }

    #[test]
    fn test_equilibrium_requires_sustained_small_rate() {
        let mut layer = glass_layer();
        let mut emitted = Vec::new();
        let dt = 0.1;
        for _ in 0..19 {
            layer.update_temperature(dt, &mut emitted);
            layer.check_equilibrium(dt);
        }
        assert!(!layer.is_at_equilibrium());

        for _ in 0..2 {
            layer.update_temperature(dt, &mut emitted);
            layer.check_equilibrium(dt);
        }
        assert!(layer.is_at_equilibrium());

        layer.perturb();
        assert!(!layer.is_at_equilibrium());
    }

    #[test]
    fn test_deactivation_restores_initial_temperature() {
        let mut layer = glass_layer();
        let mut emitted = Vec::new();
        layer.credit_energy(10.0);
        layer.update_temperature(0.1, &mut emitted);
        assert!(layer.temperature().value() > 0.0);

        layer.set_active(false);
        assert_relative_eq!(layer.temperature().value(), 0.0);
        assert!(!layer.is_at_equilibrium());
    }

    #[test]
    fn test_photon_energy_withdrawal() {
        let mut layer = glass_layer();
        assert!(!layer.take_photon_energy());
        layer.add_photon_energy(PHOTON_ENERGY * 1.5);
        assert!(layer.take_photon_energy());
        assert!(!layer.take_photon_energy());
    }
}
