//! Layer materials

use crate::constants::LAYER_THICKNESS;
use crate::energy::Direction;
use serde::{Deserialize, Serialize};

/// Which faces of a layer radiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadiationDirections {
    /// Top face only (the ground)
    Up,
    /// Both faces (atmosphere layers)
    UpAndDown,
}

impl RadiationDirections {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            RadiationDirections::Up => &[Direction::Up],
            RadiationDirections::UpAndDown => &[Direction::Up, Direction::Down],
        }
    }

    pub fn surface_count(self) -> usize {
        self.directions().len()
    }
}

/// Thermal properties of a layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerMaterial {
    /// kg/m³
    pub density: f64,
    /// J/(kg·K)
    pub specific_heat: f64,
    pub radiation_directions: RadiationDirections,
}

impl LayerMaterial {
    /// Atmosphere layers behave like thin panes of glass
    pub const GLASS: LayerMaterial = LayerMaterial {
        density: 2500.0,
        specific_heat: 840.0,
        radiation_directions: RadiationDirections::UpAndDown,
    };

    pub const EARTH: LayerMaterial = LayerMaterial {
        density: 1250.0,
        specific_heat: 1200.0,
        radiation_directions: RadiationDirections::Up,
    };

    /// Heat capacity of one square meter of layer (J/K)
    pub fn heat_capacity(&self) -> f64 {
        self.density * self.specific_heat * LAYER_THICKNESS
    }
}
