//! The ground: absorbs what it does not reflect and radiates upward

use super::layer::{EnergyAbsorbingEmittingLayer, LayerOptions};
use super::material::LayerMaterial;
use super::{EnergyLayer, PacketInteraction, PhotonInteraction};
use crate::core_types::{Fraction, Kelvin, Meters};
use crate::energy::{Direction, EmEnergyPacket, Wavelength};
use crate::photons::Photon;
use rand::rngs::StdRng;
use rand::Rng;

/// Temperature floor of the ground, also its temperature before the sun comes up (K)
pub const GROUND_MINIMUM_TEMPERATURE: f64 = 245.0;

/// Ground surface at altitude zero
///
/// Absorbs `1 − albedo` of incoming sunlight and reflects the rest straight back up,
/// absorbs all infrared, and only ever radiates from its top face.
#[derive(Debug, Clone)]
pub struct GroundLayer {
    layer: EnergyAbsorbingEmittingLayer,
    albedo: Fraction,
    initial_albedo: Fraction,
}

impl GroundLayer {
    pub fn new(albedo: Fraction) -> Self {
        let minimum = Kelvin::new(GROUND_MINIMUM_TEMPERATURE);
        Self {
            layer: EnergyAbsorbingEmittingLayer::new(
                Meters::ZERO,
                LayerMaterial::EARTH,
                LayerOptions {
                    initial_temperature: minimum,
                    minimum_temperature: minimum,
                    visible_absorption: albedo.complement(),
                    infrared_absorption: Fraction::ONE,
                    initially_active: true,
                },
            ),
            albedo,
            initial_albedo: albedo,
        }
    }

    pub fn albedo(&self) -> Fraction {
        self.albedo
    }

    /// Change the albedo, keeping visible absorption at its complement
    pub fn set_albedo(&mut self, albedo: Fraction) {
        self.albedo = albedo;
        self.layer.set_visible_absorption(albedo.complement());
    }
}

impl EnergyLayer for GroundLayer {
    fn core(&self) -> &EnergyAbsorbingEmittingLayer {
        &self.layer
    }

    fn core_mut(&mut self) -> &mut EnergyAbsorbingEmittingLayer {
        &mut self.layer
    }

    fn interact_with_energy_packet(&mut self, packet: &mut EmEnergyPacket) -> PacketInteraction {
        if packet.direction != Direction::Down || !packet.crossed(self.layer.altitude()) {
            return PacketInteraction::pass_through(packet.energy);
        }
        let interaction = self.layer.absorb_packet(packet);
        if packet.wavelength == Wavelength::Visible && !packet.is_depleted() {
            packet.reflect_at(self.layer.altitude());
        } else {
            // Nothing passes through the ground.
            packet.energy = 0.0;
        }
        PacketInteraction {
            residual_energy: packet.energy,
            ..interaction
        }
    }

    fn interact_with_photon(
        &mut self,
        photon: &Photon,
        previous_altitude: f64,
        rng: &mut StdRng,
    ) -> PhotonInteraction {
        if photon.direction() != Direction::Down
            || !photon.crossed(previous_altitude, self.layer.altitude())
        {
            return PhotonInteraction::PassThrough;
        }
        if photon.wavelength == Wavelength::Visible && rng.random::<f64>() < self.albedo.value() {
            PhotonInteraction::Reflected
        } else {
            // Ground emission follows its temperature, so absorbed photons are not re-emitted.
            PhotonInteraction::Absorbed
        }
    }

    fn reset(&mut self) {
        self.albedo = self.initial_albedo;
        self.layer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STEFAN_BOLTZMANN;
    use approx::assert_relative_eq;

    fn falling(wavelength: Wavelength, energy: f64) -> EmEnergyPacket {
        let mut packet = EmEnergyPacket::new(wavelength, energy, 100.0, Direction::Down);
        packet.update(0.01);
        packet
    }

    #[test]
    fn test_visible_split_by_albedo() {
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        let mut packet = falling(Wavelength::Visible, 10.0);

        let interaction = ground.interact_with_energy_packet(&mut packet);

        assert_relative_eq!(interaction.absorbed_energy, 7.0, max_relative = 1e-12);
        assert_relative_eq!(packet.energy, 3.0, max_relative = 1e-12);
        assert_eq!(packet.direction, Direction::Up);
        assert!(packet.altitude > 0.0);
    }

    #[test]
    fn test_infrared_fully_absorbed() {
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        let mut packet = falling(Wavelength::Infrared, 10.0);
        let interaction = ground.interact_with_energy_packet(&mut packet);
        assert_relative_eq!(interaction.absorbed_energy, 10.0);
        assert!(packet.is_depleted());
    }

    #[test]
    fn test_ignores_upward_packets() {
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        let mut packet = EmEnergyPacket::new(Wavelength::Infrared, 1.0, 0.0, Direction::Up);
        packet.update(0.01);
        assert!(!ground.interact_with_energy_packet(&mut packet).absorbed);
        assert_relative_eq!(packet.energy, 1.0);
    }

    #[test]
    fn test_radiates_upward_only_from_minimum() {
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        let mut emitted = Vec::new();
        ground.update_temperature(0.1, &mut emitted);

        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].direction, Direction::Up);
        assert_relative_eq!(
            emitted[0].energy,
            STEFAN_BOLTZMANN * 245.0_f64.powi(4) * 0.1,
            max_relative = 1e-12
        );
        assert_relative_eq!(ground.temperature().value(), 245.0);
    }

    #[test]
    fn test_albedo_reset() {
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        ground.set_albedo(Fraction::new(0.9));
        assert_relative_eq!(ground.core().visible_absorption().value(), 0.1, max_relative = 1e-12);
        ground.reset();
        assert_relative_eq!(ground.albedo().value(), 0.3);
        assert_relative_eq!(ground.core().visible_absorption().value(), 0.7, max_relative = 1e-12);
    }
}
