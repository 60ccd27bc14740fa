//! Cloud: an elliptical reflector of incoming sunlight

use crate::config::CloudConfig;
use crate::constants::SUNLIGHT_SPAN_WIDTH;
use crate::core_types::{Fraction, Vec2};
use crate::energy::{Direction, EmEnergyPacket, Wavelength};
use crate::layers::PhotonInteraction;
use crate::photons::Photon;
use rand::rngs::StdRng;
use rand::Rng;

/// An ellipse in model space that reflects part of the sunlight passing down through it
#[derive(Debug, Clone)]
pub struct Cloud {
    center: Vec2,
    width: f64,
    height: f64,
    reflectivity: Fraction,
    enabled: bool,
    initially_enabled: bool,
}

impl Cloud {
    pub fn new(config: &CloudConfig) -> Self {
        Self {
            center: Vec2::new(config.center_x, config.altitude),
            width: config.width,
            height: config.height,
            reflectivity: Fraction::clamped(config.reflectivity),
            enabled: config.initially_enabled,
            initially_enabled: config.initially_enabled,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn altitude(&self) -> f64 {
        self.center.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn reflectivity(&self) -> Fraction {
        self.reflectivity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Proportion of the sunlit span the cloud covers
    pub fn coverage(&self) -> Fraction {
        Fraction::clamped(self.width / SUNLIGHT_SPAN_WIDTH)
    }

    /// Proportion of the incoming sunlight energy the cloud sends back up
    pub fn reflected_proportion(&self) -> f64 {
        self.reflectivity.value() * self.coverage().value()
    }

    /// Whether `point` lies inside (or on) the ellipse
    pub fn contains_point(&self, point: Vec2) -> bool {
        let semi_x = self.width / 2.0;
        let semi_y = self.height / 2.0;
        if semi_x <= 0.0 || semi_y <= 0.0 {
            return false;
        }
        let dx = (point.x - self.center.x) / semi_x;
        let dy = (point.y - self.center.y) / semi_y;
        dx * dx + dy * dy <= 1.0
    }

    /// Split every downward visible packet crossing the cloud, sending the reflected part
    /// back up as a new packet. Returns the energy reflected.
    pub fn interact_with_energy_packets(&self, packets: &mut Vec<EmEnergyPacket>) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        let proportion = self.reflected_proportion();
        let mut reflected = Vec::new();
        for packet in packets.iter_mut().filter(|p| {
            p.wavelength == Wavelength::Visible
                && p.direction == Direction::Down
                && p.crossed(self.center.y)
        }) {
            let energy = packet.energy * proportion;
            if energy > 0.0 {
                packet.energy -= energy;
                reflected.push(EmEnergyPacket::new(
                    Wavelength::Visible,
                    energy,
                    self.center.y,
                    Direction::Up,
                ));
            }
        }
        let total = reflected.iter().map(|p| p.energy).sum();
        packets.extend(reflected);
        total
    }

    /// Reflect a downward sunlight photon crossing the cloud with probability equal to the
    /// cloud's reflectivity
    pub fn interact_with_photon(
        &self,
        photon: &Photon,
        previous_altitude: f64,
        rng: &mut StdRng,
    ) -> PhotonInteraction {
        let within_span = (photon.position.x - self.center.x).abs() <= self.width / 2.0;
        if self.enabled
            && photon.wavelength == Wavelength::Visible
            && photon.direction() == Direction::Down
            && within_span
            && photon.crossed(previous_altitude, self.center.y)
            && rng.random::<f64>() < self.reflectivity.value()
        {
            PhotonInteraction::Reflected
        } else {
            PhotonInteraction::PassThrough
        }
    }

    pub fn reset(&mut self) {
        self.enabled = self.initially_enabled;
    }
}
