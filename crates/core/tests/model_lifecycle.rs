//! Lifecycle, reset and configuration tests for the top-level models

mod common;

use common::{run_for, FRAME};
use greenhouse_core::{
    ConcentrationControlMode, ConcentrationDate, ConcentrationModel, ConfigError, EnergyLayer,
    LayersModel, ModelConfig, SimulationState, TemperatureUnits, WaveSource, WavesModel,
};

#[test]
fn test_reset_restores_fresh_snapshot() {
    let config = ModelConfig::layer_model();
    let fresh = LayersModel::new(config.clone()).unwrap().snapshot();

    let mut model = LayersModel::new(config).unwrap();
    model.start_sunlight();
    model.set_number_of_active_layers(3);
    model.set_ground_albedo(0.1);
    model.set_solar_intensity(1.5);
    run_for(&mut model, 5.0);
    assert_ne!(model.snapshot(), fresh);

    model.reset();
    assert_eq!(model.snapshot(), fresh);

    // Resetting twice changes nothing further
    model.reset();
    assert_eq!(model.snapshot(), fresh);
}

#[test]
fn test_reset_runs_repeat_exactly() {
    let mut model = LayersModel::new(ModelConfig::layer_model()).unwrap();
    model.start_sunlight();
    run_for(&mut model, 3.0);
    let first = model.snapshot();

    model.reset();
    model.start_sunlight();
    run_for(&mut model, 3.0);
    assert_eq!(model.snapshot(), first);
}

#[test]
fn test_pause_freezes_model() {
    let mut model = LayersModel::new(ModelConfig::default()).unwrap();
    model.start_sunlight();
    run_for(&mut model, 1.0);

    model.set_playing(false);
    assert_eq!(model.state(), SimulationState::Paused);
    let paused = model.snapshot();
    run_for(&mut model, 1.0);
    assert_eq!(model.snapshot(), paused);
}

#[test]
fn test_config_validation() {
    let too_many = ModelConfig {
        atmosphere_layer_capacity: 2,
        initially_active_layers: 3,
        ..ModelConfig::default()
    };
    assert!(matches!(
        LayersModel::new(too_many),
        Err(ConfigError::TooManyActiveLayers { .. })
    ));

    let dim_sun = ModelConfig {
        solar_intensity: 0.1,
        ..ModelConfig::default()
    };
    assert!(matches!(
        LayersModel::new(dim_sun),
        Err(ConfigError::OutOfRange {
            name: "solar_intensity",
            ..
        })
    ));
}

#[test]
fn test_temperature_units_follow_selection() {
    let mut model = LayersModel::new(ModelConfig::default()).unwrap();
    model.start_sunlight();
    run_for(&mut model, 2.0);

    let kelvin = model.surface_temperature();
    for units in [
        TemperatureUnits::Kelvin,
        TemperatureUnits::Celsius,
        TemperatureUnits::Fahrenheit,
    ] {
        model.set_temperature_units(units);
        let shown = model.snapshot().surface_temperature_display;
        let back = units.to_kelvin(shown);
        assert!(
            (back.value() - kelvin.value()).abs() < 1e-9,
            "{units:?} display {shown} does not round-trip to {kelvin:?}"
        );
    }
}

#[test]
fn test_concentration_by_date_applies_table() {
    let mut model = ConcentrationModel::new(false).unwrap();
    assert!(model.gas_concentrations().is_none());

    model.set_control_mode(ConcentrationControlMode::ByDate);
    model.set_date(ConcentrationDate::IceAge);

    let gases = model.gas_concentrations().unwrap();
    assert!((gases.co2_ppm - 180.0).abs() < 1e-9);
    assert!((model.effective_concentration() - 0.57).abs() < 1e-9);

    let expected_absorption = 0.57 * 0.15;
    for layer in model.layers().atmosphere_layers() {
        assert!((layer.infrared_absorption().value() - expected_absorption).abs() < 1e-9);
    }
}

#[test]
fn test_higher_concentration_warms_faster() {
    let mut low = ConcentrationModel::new(false).unwrap();
    let mut high = ConcentrationModel::new(false).unwrap();
    low.set_concentration(0.1);
    high.set_concentration(1.0);

    low.layers_mut().start_sunlight();
    high.layers_mut().start_sunlight();
    for _ in 0..(60.0 / FRAME) as usize {
        low.step(FRAME);
        high.step(FRAME);
    }

    let low_surface = low.layers().surface_temperature().value();
    let high_surface = high.layers().surface_temperature().value();
    assert!(
        high_surface > low_surface,
        "concentration 1.0 gave {high_surface:.2}K, 0.1 gave {low_surface:.2}K"
    );
}

#[test]
fn test_waves_track_active_layers() {
    let mut model = WavesModel::new().unwrap();
    model.concentration_mut().layers_mut().start_sunlight();
    model.step(1.0);

    let active = model.concentration().layers().active_layers().count();
    let emissions = model
        .wave_field()
        .segments()
        .iter()
        .filter(|segment| matches!(segment.source, WaveSource::LayerEmission(_)))
        .count();
    assert!(emissions <= active);
    assert!(model
        .concentration()
        .layers()
        .active_layers()
        .all(|layer| layer.is_active()));
}
