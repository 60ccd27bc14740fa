//! Model configuration
//!
//! `ModelConfig` carries everything fixed at construction time. Values the user can change
//! while the simulation runs (albedo, absorbance, solar intensity, active layer count, cloud)
//! start from here and are restored from here on reset.

use crate::constants::{HEIGHT_OF_ATMOSPHERE, MAX_ATMOSPHERE_LAYERS, MAX_TIME_STEP};
use crate::core_types::TemperatureUnits;
use crate::energy::sun::SOLAR_INTENSITY_RANGE;
use crate::error::ConfigError;
use crate::model::concentration::{concentration_to_infrared_absorption, DEFAULT_CONCENTRATION};
use serde::{Deserialize, Serialize};

/// Placement and optics of the cloud
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Horizontal offset of the cloud center from the middle of the sunlight span (m)
    pub center_x: f64,
    /// Altitude of the cloud center (m)
    pub altitude: f64,
    /// Width of the cloud ellipse (m)
    pub width: f64,
    /// Height of the cloud ellipse (m)
    pub height: f64,
    /// Proportion of sunlight striking the cloud that it reflects
    pub reflectivity: f64,
    /// Whether the cloud starts out enabled
    pub initially_enabled: bool,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            center_x: -8_000.0,
            altitude: 20_000.0,
            width: 30_000.0,
            height: 4_000.0,
            reflectivity: 0.25,
            initially_enabled: false,
        }
    }
}

/// Construction parameters for a [`LayersModel`](crate::LayersModel)
///
/// # Example
/// ```
/// use greenhouse_core::ModelConfig;
///
/// let config = ModelConfig::from_json_str(r#"{ "initially_active_layers": 2 }"#).unwrap();
/// assert_eq!(config.initially_active_layers, 2);
/// assert_eq!(config.atmosphere_layer_capacity, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of atmosphere layers allocated (fixed for the model's lifetime)
    pub atmosphere_layer_capacity: usize,
    /// Number of layers, counted from the bottom, that start out active
    pub initially_active_layers: usize,
    /// Infrared absorption proportion every atmosphere layer starts with
    pub initial_infrared_absorption: f64,
    /// Fraction of sunlight reflected by the ground
    pub ground_albedo: f64,
    /// Sun output relative to the baseline output rate
    pub solar_intensity: f64,
    /// Cloud, if the model has one
    pub cloud: Option<CloudConfig>,
    /// Whether the model carries a flux meter
    pub flux_meter: bool,
    /// Whether the model runs a photon collection
    pub photons: bool,
    /// Seed for the photon collection's random number generator
    pub photon_seed: u64,
    /// Largest integration sub-step used by `step` (s)
    pub max_time_step: f64,
    /// Units the surface temperature is initially displayed in
    pub temperature_units: TemperatureUnits,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            atmosphere_layer_capacity: 3,
            initially_active_layers: 1,
            initial_infrared_absorption: 1.0,
            ground_albedo: 0.3,
            solar_intensity: 1.0,
            cloud: None,
            flux_meter: false,
            photons: false,
            photon_seed: 0x5EED_CAFE,
            max_time_step: MAX_TIME_STEP,
            temperature_units: TemperatureUnits::Kelvin,
        }
    }
}

impl ModelConfig {
    /// Configuration of the layer model screen: three layers, one active, with photons and
    /// a flux meter
    #[must_use]
    pub fn layer_model() -> Self {
        Self {
            flux_meter: true,
            photons: true,
            ..Self::default()
        }
    }

    /// Configuration of the concentration-driven screens: twelve layers all active, a cloud,
    /// infrared absorption derived from the default concentration
    #[must_use]
    pub fn concentration() -> Self {
        Self {
            atmosphere_layer_capacity: 12,
            initially_active_layers: 12,
            initial_infrared_absorption: concentration_to_infrared_absorption(
                DEFAULT_CONCENTRATION,
            ),
            cloud: Some(CloudConfig::default()),
            temperature_units: TemperatureUnits::Celsius,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document. Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter against its permitted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.atmosphere_layer_capacity > MAX_ATMOSPHERE_LAYERS {
            return Err(ConfigError::TooManyLayers {
                requested: self.atmosphere_layer_capacity,
                max: MAX_ATMOSPHERE_LAYERS,
            });
        }
        if self.initially_active_layers > self.atmosphere_layer_capacity {
            return Err(ConfigError::TooManyActiveLayers {
                requested: self.initially_active_layers,
                capacity: self.atmosphere_layer_capacity,
            });
        }
        ConfigError::check_range(
            "initial_infrared_absorption",
            self.initial_infrared_absorption,
            0.0,
            1.0,
        )?;
        ConfigError::check_range("ground_albedo", self.ground_albedo, 0.0, 1.0)?;
        ConfigError::check_range(
            "solar_intensity",
            self.solar_intensity,
            *SOLAR_INTENSITY_RANGE.start(),
            *SOLAR_INTENSITY_RANGE.end(),
        )?;
        if !(self.max_time_step.is_finite()
            && self.max_time_step > 0.0
            && self.max_time_step <= MAX_TIME_STEP)
        {
            return Err(ConfigError::InvalidTimeStep {
                value: self.max_time_step,
                max: MAX_TIME_STEP,
            });
        }
        if let Some(cloud) = &self.cloud {
            ConfigError::check_range("cloud.reflectivity", cloud.reflectivity, 0.0, 1.0)?;
            ConfigError::check_range("cloud.altitude", cloud.altitude, 0.0, HEIGHT_OF_ATMOSPHERE)?;
            ConfigError::check_range("cloud.width", cloud.width, f64::MIN_POSITIVE, f64::MAX)?;
            ConfigError::check_range("cloud.height", cloud.height, f64::MIN_POSITIVE, f64::MAX)?;
        }
        Ok(())
    }
}
