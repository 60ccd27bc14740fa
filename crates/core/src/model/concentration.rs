//! Concentration-driven model used by the waves and photons screens
//!
//! A single greenhouse-gas concentration value in `[0, 1]`, chosen directly or from a
//! historical date, sets the infrared absorption of every atmosphere layer.

use super::layers_model::{checked_proportion, LayersModel};
use crate::config::ModelConfig;
use crate::error::ConfigError;
use crate::observable::Property;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Concentration the model starts with
pub const DEFAULT_CONCENTRATION: f64 = 0.5;

/// Infrared absorption of a single layer at concentration 1
pub const MAX_LAYER_INFRARED_ABSORPTION: f64 = 0.15;

/// Per-layer infrared absorption for a concentration in `[0, 1]`
pub fn concentration_to_infrared_absorption(concentration: f64) -> f64 {
    concentration * MAX_LAYER_INFRARED_ABSORPTION
}

/// How the concentration is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConcentrationControlMode {
    #[default]
    ByValue,
    ByDate,
}

/// Historical dates with tabulated concentrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConcentrationDate {
    IceAge,
    SeventeenFifty,
    NineteenFifty,
    #[default]
    TwentyTwenty,
}

/// Greenhouse gas concentrations for a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasConcentrations {
    /// Carbon dioxide (ppm)
    pub co2_ppm: f64,
    /// Methane (ppb × 1000)
    pub ch4: f64,
    /// Nitrous oxide (ppb × 1000)
    pub n2o: f64,
}

impl ConcentrationDate {
    pub const ALL: [ConcentrationDate; 4] = [
        ConcentrationDate::IceAge,
        ConcentrationDate::SeventeenFifty,
        ConcentrationDate::NineteenFifty,
        ConcentrationDate::TwentyTwenty,
    ];

    /// Model concentration representing this date
    pub const fn concentration(self) -> f64 {
        match self {
            ConcentrationDate::IceAge => 0.57,
            ConcentrationDate::SeventeenFifty => 0.65,
            ConcentrationDate::NineteenFifty => 0.67,
            ConcentrationDate::TwentyTwenty => 0.72,
        }
    }

    pub const fn gas_concentrations(self) -> GasConcentrations {
        match self {
            ConcentrationDate::IceAge => GasConcentrations {
                co2_ppm: 180.0,
                ch4: 380.0 * 1000.0,
                n2o: 215.0 * 1000.0,
            },
            ConcentrationDate::SeventeenFifty => GasConcentrations {
                co2_ppm: 277.0,
                ch4: 729.0 * 1000.0,
                n2o: 270.0 * 1000.0,
            },
            ConcentrationDate::NineteenFifty => GasConcentrations {
                co2_ppm: 311.0,
                ch4: 1116.0 * 1000.0,
                n2o: 289.0 * 1000.0,
            },
            ConcentrationDate::TwentyTwenty => GasConcentrations {
                co2_ppm: 413.0,
                ch4: 1889.0 * 1000.0,
                n2o: 333.0 * 1000.0,
            },
        }
    }
}

/// Observables added on top of the layers model's
#[derive(Debug)]
pub struct ConcentrationObservables {
    pub concentration: Property<f64>,
    pub control_mode: Property<ConcentrationControlMode>,
    pub date: Property<ConcentrationDate>,
    /// Concentration currently applied to the layers (value or date)
    pub effective_concentration: Property<f64>,
}

/// A layers model whose layer absorption follows a greenhouse-gas concentration
#[derive(Debug)]
pub struct ConcentrationModel {
    layers: LayersModel,
    concentration: f64,
    control_mode: ConcentrationControlMode,
    date: ConcentrationDate,
    observables: ConcentrationObservables,
}

impl ConcentrationModel {
    /// Model with the standard concentration configuration, with or without photons
    pub fn new(photons: bool) -> Result<Self, ConfigError> {
        Self::with_config(ModelConfig {
            photons,
            ..ModelConfig::concentration()
        })
    }

    /// Model built on a custom layers configuration
    pub fn with_config(config: ModelConfig) -> Result<Self, ConfigError> {
        let layers = LayersModel::new(config)?;
        let mut model = Self {
            layers,
            concentration: DEFAULT_CONCENTRATION,
            control_mode: ConcentrationControlMode::ByValue,
            date: ConcentrationDate::default(),
            observables: ConcentrationObservables {
                concentration: Property::new(DEFAULT_CONCENTRATION),
                control_mode: Property::new(ConcentrationControlMode::ByValue),
                date: Property::new(ConcentrationDate::default()),
                effective_concentration: Property::new(DEFAULT_CONCENTRATION),
            },
        };
        model.apply_concentration();
        info!(
            "Concentration model created with concentration {:.2}",
            model.concentration
        );
        Ok(model)
    }

    pub fn layers(&self) -> &LayersModel {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayersModel {
        &mut self.layers
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    pub fn control_mode(&self) -> ConcentrationControlMode {
        self.control_mode
    }

    pub fn date(&self) -> ConcentrationDate {
        self.date
    }

    /// Concentration applied to the layers: the value or the selected date's
    pub fn effective_concentration(&self) -> f64 {
        match self.control_mode {
            ConcentrationControlMode::ByValue => self.concentration,
            ConcentrationControlMode::ByDate => self.date.concentration(),
        }
    }

    /// The selected date's gas concentrations, when controlling by date
    pub fn gas_concentrations(&self) -> Option<GasConcentrations> {
        match self.control_mode {
            ConcentrationControlMode::ByValue => None,
            ConcentrationControlMode::ByDate => Some(self.date.gas_concentrations()),
        }
    }

    pub fn set_concentration(&mut self, concentration: f64) {
        self.concentration = checked_proportion("concentration", concentration).value();
        self.apply_concentration();
    }

    pub fn set_control_mode(&mut self, mode: ConcentrationControlMode) {
        self.control_mode = mode;
        self.apply_concentration();
    }

    pub fn set_date(&mut self, date: ConcentrationDate) {
        self.date = date;
        self.apply_concentration();
    }

    pub fn set_cloud_enabled(&mut self, enabled: bool) {
        self.layers.set_cloud_enabled(enabled);
    }

    pub fn is_cloud_enabled(&self) -> bool {
        self.layers.cloud().is_some_and(crate::cloud::Cloud::is_enabled)
    }

    pub fn observables(&self) -> &ConcentrationObservables {
        &self.observables
    }

    pub fn observables_mut(&mut self) -> &mut ConcentrationObservables {
        &mut self.observables
    }

    pub fn step(&mut self, dt: f64) {
        self.layers.step(dt);
    }

    pub fn reset(&mut self) {
        self.layers.reset();
        self.concentration = DEFAULT_CONCENTRATION;
        self.control_mode = ConcentrationControlMode::ByValue;
        self.date = ConcentrationDate::default();
        self.observables.concentration.reset();
        self.observables.control_mode.reset();
        self.observables.date.reset();
        self.observables.effective_concentration.reset();
        self.apply_concentration();
    }

    fn apply_concentration(&mut self) {
        let effective = self.effective_concentration();
        let absorption = concentration_to_infrared_absorption(effective);
        let current = self
            .layers
            .atmosphere_layers()
            .first()
            .map(|layer| layer.infrared_absorption().value());
        if current != Some(absorption) {
            self.layers.set_infrared_absorbance(absorption);
        }

        self.observables.concentration.set(self.concentration);
        self.observables.control_mode.set(self.control_mode);
        self.observables.date.set(self.date);
        self.observables.effective_concentration.set(effective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ice_age_gas_concentrations() {
        let mut model = ConcentrationModel::new(false).unwrap();
        assert!(model.gas_concentrations().is_none());

        model.set_control_mode(ConcentrationControlMode::ByDate);
        model.set_date(ConcentrationDate::IceAge);

        let gases = model.gas_concentrations().unwrap();
        assert_relative_eq!(gases.co2_ppm, 180.0);
        assert_relative_eq!(gases.ch4, 380.0 * 1000.0);
        assert_relative_eq!(gases.n2o, 215.0 * 1000.0);
    }

    #[test]
    fn test_concentration_sets_layer_absorption() {
        let mut model = ConcentrationModel::new(false).unwrap();
        model.set_concentration(1.0);
        for layer in model.layers().atmosphere_layers() {
            assert_relative_eq!(layer.infrared_absorption().value(), 0.15);
        }

        model.set_control_mode(ConcentrationControlMode::ByDate);
        model.set_date(ConcentrationDate::NineteenFifty);
        assert_relative_eq!(model.effective_concentration(), 0.67);
        assert_relative_eq!(
            model.layers().atmosphere_layers()[0]
                .infrared_absorption()
                .value(),
            0.67 * 0.15
        );
        assert_relative_eq!(*model.observables().effective_concentration.get(), 0.67);
    }

    #[test]
    fn test_dates_increase_concentration() {
        let concentrations: Vec<f64> = ConcentrationDate::ALL
            .iter()
            .map(|date| date.concentration())
            .collect();
        assert!(concentrations.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_reset_restores_concentration_state() {
        let mut model = ConcentrationModel::new(false).unwrap();
        model.set_concentration(0.9);
        model.set_control_mode(ConcentrationControlMode::ByDate);
        model.set_cloud_enabled(true);
        model.reset();

        assert_relative_eq!(model.concentration(), DEFAULT_CONCENTRATION);
        assert_eq!(model.control_mode(), ConcentrationControlMode::ByValue);
        assert!(!model.is_cloud_enabled());
        assert_relative_eq!(
            model.layers().atmosphere_layers()[11]
                .infrared_absorption()
                .value(),
            concentration_to_infrared_absorption(DEFAULT_CONCENTRATION)
        );
    }
}
