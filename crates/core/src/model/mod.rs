//! Top-level models
//!
//! [`LayersModel`] runs the physics. The concentration model and the three screen models
//! wrap it with the controls each screen offers.

pub mod concentration;
pub mod layer_model;
pub mod layers_model;
pub mod photons_model;
pub mod waves;

pub use concentration::{
    ConcentrationControlMode, ConcentrationDate, ConcentrationModel, ConcentrationObservables,
    GasConcentrations,
};
pub use layer_model::LayerModelModel;
pub use layers_model::{
    LayerObservables, LayerSnapshot, LayersModel, ModelObservables, ModelSnapshot,
    SimulationState,
};
pub use photons_model::PhotonsModel;
pub use waves::{WaveField, WaveSegment, WaveSource, WavesModel};
