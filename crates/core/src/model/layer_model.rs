//! Layer model screen: a few fully configurable atmosphere layers

use super::layers_model::LayersModel;
use crate::config::ModelConfig;
use crate::core_types::TemperatureUnits;
use crate::energy::FluxReading;
use crate::error::ConfigError;

/// Layers model with three layers, photons and a flux meter, where every physical parameter
/// is adjustable
#[derive(Debug)]
pub struct LayerModelModel {
    layers: LayersModel,
}

impl LayerModelModel {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(ModelConfig::layer_model())
    }

    pub fn with_config(config: ModelConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            layers: LayersModel::new(config)?,
        })
    }

    pub fn layers(&self) -> &LayersModel {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayersModel {
        &mut self.layers
    }

    pub fn set_solar_intensity(&mut self, proportion: f64) {
        self.layers.set_solar_intensity(proportion);
    }

    pub fn set_surface_albedo(&mut self, albedo: f64) {
        self.layers.set_ground_albedo(albedo);
    }

    /// Infrared absorbance shared by every atmosphere layer
    pub fn set_layers_infrared_absorbance(&mut self, proportion: f64) {
        self.layers.set_infrared_absorbance(proportion);
    }

    pub fn set_number_of_active_layers(&mut self, count: usize) {
        self.layers.set_number_of_active_layers(count);
    }

    pub fn set_temperature_units(&mut self, units: TemperatureUnits) {
        self.layers.set_temperature_units(units);
    }

    pub fn set_flux_meter_visible(&mut self, visible: bool) {
        self.layers.set_flux_meter_visible(visible);
    }

    pub fn flux_reading(&self) -> Option<FluxReading> {
        self.layers
            .flux_meter()
            .map(|flux_meter| flux_meter.sensor.reading())
    }

    pub fn step(&mut self, dt: f64) {
        self.layers.step(dt);
    }

    pub fn reset(&mut self) {
        self.layers.reset();
    }
}
