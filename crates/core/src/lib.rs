//! Greenhouse Effect Model Core Library
//!
//! A radiative energy transport model of a simplified planet: a sun, a ground surface, a
//! stack of partially transparent atmosphere layers, an optional cloud, and outer space.
//!
//! ## Energy Pipeline
//!
//! Every step the model:
//! - releases sunlight at the top of the atmosphere as directional energy packets
//! - moves packets, reflects part of them off the cloud and the ground
//! - lets the ground and active atmosphere layers absorb what crosses them
//! - integrates layer temperatures and re-radiates infrared (Stefan-Boltzmann)
//! - tracks energy rates over a sliding window and detects equilibrium
//! - advances the photon collection, the particle view of the same radiation
//!
//! ## Example
//! ```
//! use greenhouse_core::{LayersModel, ModelConfig};
//!
//! let mut model = LayersModel::new(ModelConfig::default()).unwrap();
//! model.start_sunlight();
//! for _ in 0..60 {
//!     model.step(1.0 / 60.0);
//! }
//! assert!(model.surface_temperature().value() >= 245.0);
//! ```

// Core types and utilities
pub mod config;
pub mod constants;
pub mod core_types;
pub mod error;
pub mod observable;

// Physical model elements
pub mod cloud;
pub mod energy;
pub mod layers;
pub mod photons;

// Top-level models
pub mod model;

// Re-export core types
pub use config::{CloudConfig, ModelConfig};
pub use core_types::{Celsius, Fahrenheit, Fraction, Kelvin, TemperatureUnits, Vec2};
pub use error::ConfigError;
pub use observable::{Emitter, ListenerId, Property};

// Re-export model elements
pub use cloud::Cloud;
pub use energy::{
    Direction, EmEnergyPacket, EnergyRateTracker, FluxMeter, FluxSensor, OuterSpace,
    SunEnergySource, Wavelength,
};
pub use layers::{AtmosphereLayer, EnergyLayer, GroundLayer};
pub use photons::{Photon, PhotonCollection, PhotonEvent, ShowState};

// Re-export top-level models
pub use model::{
    ConcentrationControlMode, ConcentrationDate, ConcentrationModel, LayerModelModel,
    LayersModel, ModelSnapshot, PhotonsModel, SimulationState, WaveField, WaveSegment, WaveSource,
    WavesModel,
};
