//! Waves screen model: radiation shown as continuous wave segments

use super::concentration::ConcentrationModel;
use super::layers_model::LayersModel;
use crate::constants::HEIGHT_OF_ATMOSPHERE;
use crate::core_types::Fraction;
use crate::energy::{Direction, Wavelength, OUTPUT_ENERGY_RATE, SOLAR_INTENSITY_RANGE};
use crate::error::ConfigError;
use crate::layers::EnergyLayer;
use serde::{Deserialize, Serialize};

/// What produced a wave segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveSource {
    /// Incoming sunlight
    Sun,
    CloudReflection,
    GroundReflection,
    /// Infrared rising from the ground, attenuated and reinforced by each layer it crosses
    UpwardInfrared,
    /// Infrared radiated downward by the atmosphere layer with this index
    LayerEmission(usize),
}

/// A vertical stretch of wave with uniform intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveSegment {
    pub source: WaveSource,
    pub wavelength: Wavelength,
    pub direction: Direction,
    pub bottom_altitude: f64,
    pub top_altitude: f64,
    /// Energy flow carried (W/m²)
    pub energy_rate: f64,
    /// Energy rate relative to the strongest possible sunlight
    pub intensity: Fraction,
}

/// Every wave segment for the current model state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveField {
    segments: Vec<WaveSegment>,
}

impl WaveField {
    /// Derive the wave segments from the layers model's current rates and temperatures
    pub fn compute(model: &LayersModel) -> Self {
        let mut field = WaveField::default();
        let sun = model.sun();

        if sun.is_shining() {
            let incoming = sun.output_energy_rate();
            let at_ground = match model.cloud().filter(|cloud| cloud.is_enabled()) {
                Some(cloud) => {
                    let reflected = incoming * cloud.reflected_proportion();
                    field.push(
                        WaveSource::Sun,
                        Wavelength::Visible,
                        Direction::Down,
                        cloud.altitude(),
                        HEIGHT_OF_ATMOSPHERE,
                        incoming,
                    );
                    field.push(
                        WaveSource::CloudReflection,
                        Wavelength::Visible,
                        Direction::Up,
                        cloud.altitude(),
                        HEIGHT_OF_ATMOSPHERE,
                        reflected,
                    );
                    field.push(
                        WaveSource::Sun,
                        Wavelength::Visible,
                        Direction::Down,
                        0.0,
                        cloud.altitude(),
                        incoming - reflected,
                    );
                    incoming - reflected
                }
                None => {
                    field.push(
                        WaveSource::Sun,
                        Wavelength::Visible,
                        Direction::Down,
                        0.0,
                        HEIGHT_OF_ATMOSPHERE,
                        incoming,
                    );
                    incoming
                }
            };
            let ground_reflected = at_ground * model.ground().albedo().value();
            field.push(
                WaveSource::GroundReflection,
                Wavelength::Visible,
                Direction::Up,
                0.0,
                HEIGHT_OF_ATMOSPHERE,
                ground_reflected,
            );
        }

        let mut upward = model.ground().core().emission_rate_per_surface();
        let mut bottom = model.ground().altitude();
        for layer in model.active_layers() {
            field.push(
                WaveSource::UpwardInfrared,
                Wavelength::Infrared,
                Direction::Up,
                bottom,
                layer.altitude(),
                upward,
            );
            let core = layer.core();
            upward = upward * (1.0 - core.infrared_absorption().value())
                + core.emission_rate_per_surface();
            bottom = layer.altitude();
        }
        field.push(
            WaveSource::UpwardInfrared,
            Wavelength::Infrared,
            Direction::Up,
            bottom,
            HEIGHT_OF_ATMOSPHERE,
            upward,
        );

        for (index, layer) in model
            .atmosphere_layers()
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.is_active())
        {
            let emission = layer.core().emission_rate_per_surface();
            field.push(
                WaveSource::LayerEmission(index),
                Wavelength::Infrared,
                Direction::Down,
                0.0,
                layer.altitude(),
                emission,
            );
        }

        field
    }

    pub fn segments(&self) -> &[WaveSegment] {
        &self.segments
    }

    pub fn segments_of(&self, wavelength: Wavelength) -> impl Iterator<Item = &WaveSegment> {
        self.segments
            .iter()
            .filter(move |segment| segment.wavelength == wavelength)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn push(
        &mut self,
        source: WaveSource,
        wavelength: Wavelength,
        direction: Direction,
        bottom_altitude: f64,
        top_altitude: f64,
        energy_rate: f64,
    ) {
        if energy_rate <= 0.0 || top_altitude <= bottom_altitude {
            return;
        }
        let reference = OUTPUT_ENERGY_RATE * SOLAR_INTENSITY_RANGE.end();
        self.segments.push(WaveSegment {
            source,
            wavelength,
            direction,
            bottom_altitude,
            top_altitude,
            energy_rate,
            intensity: Fraction::clamped(energy_rate / reference),
        });
    }
}

/// Concentration model presented as waves, without photons
#[derive(Debug)]
pub struct WavesModel {
    concentration: ConcentrationModel,
    wave_field: WaveField,
}

impl WavesModel {
    pub fn new() -> Result<Self, ConfigError> {
        let concentration = ConcentrationModel::new(false)?;
        let wave_field = WaveField::compute(concentration.layers());
        Ok(Self {
            concentration,
            wave_field,
        })
    }

    pub fn concentration(&self) -> &ConcentrationModel {
        &self.concentration
    }

    pub fn concentration_mut(&mut self) -> &mut ConcentrationModel {
        &mut self.concentration
    }

    pub fn wave_field(&self) -> &WaveField {
        &self.wave_field
    }

    pub fn step(&mut self, dt: f64) {
        self.concentration.step(dt);
        self.wave_field = WaveField::compute(self.concentration.layers());
    }

    pub fn reset(&mut self) {
        self.concentration.reset();
        self.wave_field = WaveField::compute(self.concentration.layers());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_sunlight_waves_before_start() {
        let model = WavesModel::new().unwrap();
        assert_eq!(model.wave_field().segments_of(Wavelength::Visible).count(), 0);
        // The ground already glows at its minimum temperature
        assert!(model.wave_field().segments_of(Wavelength::Infrared).count() > 0);
    }

    #[test]
    fn test_cloud_splits_sunlight() {
        let mut model = WavesModel::new().unwrap();
        model.concentration_mut().layers_mut().start_sunlight();
        model.concentration_mut().set_cloud_enabled(true);
        model.step(0.5);

        let field = model.wave_field();
        assert!(field
            .segments()
            .iter()
            .any(|segment| segment.source == WaveSource::CloudReflection));
        let incoming: Vec<&WaveSegment> = field
            .segments()
            .iter()
            .filter(|segment| segment.source == WaveSource::Sun)
            .collect();
        assert_eq!(incoming.len(), 2);
        assert!(incoming[1].energy_rate < incoming[0].energy_rate);
    }

    #[test]
    fn test_intensities_are_normalized() {
        let mut model = WavesModel::new().unwrap();
        model.concentration_mut().layers_mut().start_sunlight();
        for _ in 0..120 {
            model.step(1.0 / 30.0);
        }
        for segment in model.wave_field().segments() {
            assert!((0.0..=1.0).contains(&segment.intensity.value()));
            assert!(segment.top_altitude > segment.bottom_altitude);
        }
    }
}
