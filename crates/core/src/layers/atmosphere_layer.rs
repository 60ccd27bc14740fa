//! Atmosphere layers: transparent to sunlight, partially opaque to infrared

use super::layer::{EnergyAbsorbingEmittingLayer, LayerOptions};
use super::material::LayerMaterial;
use super::EnergyLayer;
use crate::core_types::{Fraction, Kelvin, Meters};

/// A horizontal atmosphere layer made of the glass material
#[derive(Debug, Clone)]
pub struct AtmosphereLayer {
    layer: EnergyAbsorbingEmittingLayer,
}

impl AtmosphereLayer {
    /// Layer at `altitude` starting at absolute zero
    pub fn new(altitude: Meters, infrared_absorption: Fraction, initially_active: bool) -> Self {
        Self {
            layer: EnergyAbsorbingEmittingLayer::new(
                altitude,
                LayerMaterial::GLASS,
                LayerOptions {
                    initial_temperature: Kelvin::ABSOLUTE_ZERO,
                    minimum_temperature: Kelvin::ABSOLUTE_ZERO,
                    visible_absorption: Fraction::ZERO,
                    infrared_absorption,
                    initially_active,
                },
            ),
        }
    }

    pub fn set_active(&mut self, active: bool) {
        self.layer.set_active(active);
    }

    /// Proportion of crossing infrared energy the layer absorbs (and its emissivity)
    pub fn infrared_absorption(&self) -> Fraction {
        self.layer.infrared_absorption()
    }

    pub fn set_infrared_absorption(&mut self, proportion: Fraction) {
        self.layer.set_infrared_absorption(proportion);
    }
}

impl EnergyLayer for AtmosphereLayer {
    fn core(&self) -> &EnergyAbsorbingEmittingLayer {
        &self.layer
    }

    fn core_mut(&mut self) -> &mut EnergyAbsorbingEmittingLayer {
        &mut self.layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::{Direction, EmEnergyPacket, Wavelength};
    use crate::photons::{Photon, PhotonId, ShowState};
    use crate::core_types::Vec2;
    use crate::layers::PhotonInteraction;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sunlight_passes_through() {
        let mut layer = AtmosphereLayer::new(Meters::new(5_000.0), Fraction::ONE, true);
        let mut packet = EmEnergyPacket::new(Wavelength::Visible, 4.0, 5_100.0, Direction::Down);
        packet.update(0.01);

        let interaction = layer.interact_with_energy_packet(&mut packet);

        assert!(!interaction.absorbed);
        assert_relative_eq!(packet.energy, 4.0);
    }

    #[test]
    fn test_fully_absorbing_layer_takes_all_infrared() {
        let mut layer = AtmosphereLayer::new(Meters::new(5_000.0), Fraction::ONE, true);
        let mut packet = EmEnergyPacket::new(Wavelength::Infrared, 4.0, 4_900.0, Direction::Up);
        packet.update(0.01);

        let interaction = layer.interact_with_energy_packet(&mut packet);

        assert!(interaction.absorbed);
        assert!(packet.is_depleted());
    }

    #[test]
    fn test_photon_absorption_follows_proportion() {
        let mut layer = AtmosphereLayer::new(Meters::new(5_000.0), Fraction::new(0.5), true);
        let mut rng = StdRng::seed_from_u64(7);
        let mut absorbed = 0;
        for i in 0..2_000 {
            let mut photon = Photon::new(
                PhotonId(i),
                Vec2::new(0.0, 4_900.0),
                Vec2::new(0.0, 20_000.0),
                Wavelength::Infrared,
                ShowState::Always,
            );
            let previous = photon.advance(0.01);
            if layer.interact_with_photon(&photon, previous, &mut rng) == PhotonInteraction::Absorbed
            {
                absorbed += 1;
            }
        }
        assert!((850..1_150).contains(&absorbed), "absorbed {absorbed} of 2000");
        assert!(layer.core().absorbed_photon_energy() > 0.0);
    }

    #[test]
    fn test_reset_restores_construction_state() {
        let mut layer = AtmosphereLayer::new(Meters::new(5_000.0), Fraction::ONE, true);
        layer.set_infrared_absorption(Fraction::new(0.2));
        layer.set_active(false);
        layer.reset();
        assert!(layer.is_active());
        assert_relative_eq!(layer.infrared_absorption().value(), 1.0);
    }
}
