//! Outer space: sink for energy leaving the top of the atmosphere

use super::packet::{Direction, EmEnergyPacket};
use super::rate_tracker::EnergyRateTracker;
use crate::constants::HEIGHT_OF_ATMOSPHERE;

/// Absorbs every upward packet that reaches the top of the atmosphere
#[derive(Debug, Clone, Default)]
pub struct OuterSpace {
    incoming_tracker: EnergyRateTracker,
}

impl OuterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb escaping packets, leaving them depleted. Returns the energy absorbed.
    pub fn absorb_energy(&mut self, packets: &mut [EmEnergyPacket]) -> f64 {
        let mut absorbed = 0.0;
        for packet in packets
            .iter_mut()
            .filter(|p| p.direction == Direction::Up && p.altitude >= HEIGHT_OF_ATMOSPHERE)
        {
            absorbed += packet.energy;
            packet.energy = 0.0;
        }
        self.incoming_tracker.log_energy(absorbed);
        absorbed
    }

    pub fn step_tracker(&mut self, dt: f64) {
        self.incoming_tracker.step(dt);
    }

    /// Rate at which energy leaves the planet (W/m²)
    pub fn incoming_energy_rate(&self) -> f64 {
        self.incoming_tracker.energy_rate()
    }

    pub fn reset(&mut self) {
        self.incoming_tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::packet::Wavelength;
    use approx::assert_relative_eq;

    #[test]
    fn test_only_upward_packets_above_top_are_absorbed() {
        let mut space = OuterSpace::new();
        let mut packets = vec![
            EmEnergyPacket::new(Wavelength::Infrared, 2.0, HEIGHT_OF_ATMOSPHERE + 10.0, Direction::Up),
            EmEnergyPacket::new(Wavelength::Infrared, 3.0, HEIGHT_OF_ATMOSPHERE - 10.0, Direction::Up),
            EmEnergyPacket::new(Wavelength::Visible, 4.0, HEIGHT_OF_ATMOSPHERE, Direction::Down),
        ];

        let absorbed = space.absorb_energy(&mut packets);

        assert_relative_eq!(absorbed, 2.0);
        assert!(packets[0].is_depleted());
        assert!(!packets[1].is_depleted());
        assert!(!packets[2].is_depleted());

        space.step_tracker(0.5);
        assert_relative_eq!(space.incoming_energy_rate(), 4.0);
    }
}
