//! A single photon

use crate::core_types::Vec2;
use crate::energy::{Direction, Wavelength};
use serde::{Deserialize, Serialize};

/// Identifier unique within a photon collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhotonId(pub u64);

/// Controls whether a view shows a photon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShowState {
    /// Shown in every mode
    Always,
    /// Shown only while "more photons" is on
    OnlyInMorePhotonsMode,
}

/// A photon: position in model space (x horizontal, y altitude), velocity in m/s
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photon {
    pub id: PhotonId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub wavelength: Wavelength,
    pub show_state: ShowState,
}

impl Photon {
    pub fn new(
        id: PhotonId,
        position: Vec2,
        velocity: Vec2,
        wavelength: Wavelength,
        show_state: ShowState,
    ) -> Self {
        Self {
            id,
            position,
            velocity,
            wavelength,
            show_state,
        }
    }

    pub fn is_infrared(&self) -> bool {
        self.wavelength.is_infrared()
    }

    pub fn altitude(&self) -> f64 {
        self.position.y
    }

    /// Vertical direction of travel (a horizontal photon counts as rising)
    pub fn direction(&self) -> Direction {
        if self.velocity.y < 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Move for `dt` seconds, returning the altitude before the move
    pub fn advance(&mut self, dt: f64) -> f64 {
        let previous_altitude = self.position.y;
        self.position += self.velocity * dt;
        previous_altitude
    }

    /// Whether the move from `previous_altitude` crossed `altitude` (start point excluded)
    pub fn crossed(&self, previous_altitude: f64, altitude: f64) -> bool {
        match self.direction() {
            Direction::Up => previous_altitude < altitude && self.position.y >= altitude,
            Direction::Down => previous_altitude > altitude && self.position.y <= altitude,
        }
    }

    /// Mirror the photon about `altitude` and reverse its vertical velocity
    pub fn reflect_at(&mut self, altitude: f64) {
        self.position.y = 2.0 * altitude - self.position.y;
        self.velocity.y = -self.velocity.y;
    }

    /// Whether the photon should be shown given the "more photons" setting
    pub fn is_shown(&self, more_photons: bool) -> bool {
        match self.show_state {
            ShowState::Always => true,
            ShowState::OnlyInMorePhotonsMode => more_photons,
        }
    }
}
