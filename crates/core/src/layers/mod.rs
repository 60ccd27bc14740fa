//! Energy absorbing and emitting layers
//!
//! The ground and every atmosphere layer share [`EnergyAbsorbingEmittingLayer`] for their
//! state and temperature integration. The [`EnergyLayer`] trait is the seam the model steps
//! them through; each layer kind overrides only the interactions that differ.

pub mod atmosphere_layer;
pub mod ground_layer;
pub mod layer;
pub mod material;

pub use atmosphere_layer::AtmosphereLayer;
pub use ground_layer::{GroundLayer, GROUND_MINIMUM_TEMPERATURE};
pub use layer::{EnergyAbsorbingEmittingLayer, LayerOptions};
pub use material::{LayerMaterial, RadiationDirections};

use crate::core_types::Kelvin;
use crate::energy::EmEnergyPacket;
use crate::photons::Photon;
use rand::rngs::StdRng;

/// Result of offering an energy packet to a layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketInteraction {
    /// Whether the layer took any energy from the packet
    pub absorbed: bool,
    /// Energy the layer took (J/m²)
    pub absorbed_energy: f64,
    /// Energy left in the packet (J/m²)
    pub residual_energy: f64,
}

impl PacketInteraction {
    pub fn pass_through(energy: f64) -> Self {
        Self {
            absorbed: false,
            absorbed_energy: 0.0,
            residual_energy: energy,
        }
    }
}

/// Outcome of a photon crossing a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotonInteraction {
    PassThrough,
    /// The photon is consumed and its energy credited to the layer
    Absorbed,
    /// The photon bounces back the way it came
    Reflected,
}

/// Behavior shared by the ground and the atmosphere layers
pub trait EnergyLayer {
    fn core(&self) -> &EnergyAbsorbingEmittingLayer;

    fn core_mut(&mut self) -> &mut EnergyAbsorbingEmittingLayer;

    /// Absorb energy from a packet that crossed the layer during its latest update
    fn interact_with_energy_packet(&mut self, packet: &mut EmEnergyPacket) -> PacketInteraction {
        self.core_mut().absorb_packet(packet)
    }

    /// Decide the fate of a photon that moved from `previous_altitude` to its current position
    fn interact_with_photon(
        &mut self,
        photon: &Photon,
        previous_altitude: f64,
        rng: &mut StdRng,
    ) -> PhotonInteraction {
        self.core_mut().capture_photon(photon, previous_altitude, rng)
    }

    /// Integrate temperature over `dt`, pushing radiated packets onto `emitted`
    fn update_temperature(&mut self, dt: f64, emitted: &mut Vec<EmEnergyPacket>) {
        self.core_mut().update_temperature(dt, emitted);
    }

    fn check_equilibrium(&mut self, dt: f64) -> bool {
        self.core_mut().check_equilibrium(dt)
    }

    fn perturb(&mut self) {
        self.core_mut().perturb();
    }

    fn reset(&mut self) {
        self.core_mut().reset();
    }

    fn temperature(&self) -> Kelvin {
        self.core().temperature()
    }

    fn altitude(&self) -> f64 {
        self.core().altitude()
    }

    fn is_active(&self) -> bool {
        self.core().is_active()
    }

    fn is_at_equilibrium(&self) -> bool {
        self.core().is_at_equilibrium()
    }
}
