//! The layers model: orchestrates the sun, ground, atmosphere layers and outer space
//!
//! `LayersModel` owns every model element and is their only mutator. Each call to
//! [`LayersModel::step_model`] runs the energy pipeline in a fixed order, then publishes the
//! derived observables so that listeners always see a consistent state.

use crate::cloud::Cloud;
use crate::config::ModelConfig;
use crate::constants::{HEIGHT_OF_ATMOSPHERE, NOMINAL_TIME_STEP, RADIATIVE_BALANCE_THRESHOLD};
use crate::core_types::{Celsius, Fahrenheit, Fraction, Kelvin, Meters, TemperatureUnits};
use crate::energy::{EmEnergyPacket, FluxMeter, FluxReading, OuterSpace, SunEnergySource};
use crate::error::ConfigError;
use crate::layers::{AtmosphereLayer, EnergyAbsorbingEmittingLayer, EnergyLayer, GroundLayer};
use crate::observable::{ListenerId, Property};
use crate::photons::{PhotonCollection, PhotonEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Lifecycle of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationState {
    /// Sunlight has not been started; stepping does nothing
    NotStarted,
    Running,
    Paused,
}

/// Observable view of one layer
#[derive(Debug)]
pub struct LayerObservables {
    pub temperature: Property<Kelvin>,
    pub is_active: Property<bool>,
    pub at_equilibrium: Property<bool>,
    /// Infrared absorption proportion (the energy absorption proportion shown to users)
    pub infrared_absorption: Property<f64>,
    pub absorbed_energy_rate: Property<f64>,
    pub emitted_energy_rate: Property<f64>,
}

impl LayerObservables {
    fn new(layer: &EnergyAbsorbingEmittingLayer) -> Self {
        Self {
            temperature: Property::new(layer.temperature()),
            is_active: Property::new(layer.is_active()),
            at_equilibrium: Property::new(layer.is_at_equilibrium()),
            infrared_absorption: Property::new(layer.infrared_absorption().value()),
            absorbed_energy_rate: Property::new(layer.absorbed_energy_rate()),
            emitted_energy_rate: Property::new(layer.emitted_energy_rate()),
        }
    }

    fn publish(&mut self, layer: &EnergyAbsorbingEmittingLayer) {
        self.temperature.set(layer.temperature());
        self.is_active.set(layer.is_active());
        self.at_equilibrium.set(layer.is_at_equilibrium());
        self.infrared_absorption
            .set(layer.infrared_absorption().value());
        self.absorbed_energy_rate.set(layer.absorbed_energy_rate());
        self.emitted_energy_rate.set(layer.emitted_energy_rate());
    }

    fn reset(&mut self) {
        self.temperature.reset();
        self.is_active.reset();
        self.at_equilibrium.reset();
        self.infrared_absorption.reset();
        self.absorbed_energy_rate.reset();
        self.emitted_energy_rate.reset();
    }
}

/// Every observable a `LayersModel` publishes
#[derive(Debug)]
pub struct ModelObservables {
    pub surface_temperature_kelvin: Property<Kelvin>,
    pub surface_temperature_celsius: Property<Celsius>,
    pub surface_temperature_fahrenheit: Property<Fahrenheit>,
    /// Units selected for display; set by the user, not derived
    pub temperature_units: Property<TemperatureUnits>,
    /// Incoming sunlight rate minus the rate energy leaves to space (W/m²)
    pub net_inflow_of_energy: Property<f64>,
    pub in_radiative_balance: Property<bool>,
    pub sun_is_shining: Property<bool>,
    pub is_playing: Property<bool>,
    pub simulation_state: Property<SimulationState>,
    pub sun_output_rate: Property<f64>,
    pub outgoing_energy_rate: Property<f64>,
    pub number_of_active_layers: Property<usize>,
    pub ground_albedo: Property<f64>,
    pub solar_intensity: Property<f64>,
    pub cloud_enabled: Property<bool>,
    pub ground: LayerObservables,
    /// Ordered bottom to top
    pub atmosphere_layers: Vec<LayerObservables>,
}

impl ModelObservables {
    fn reset(&mut self) {
        self.surface_temperature_kelvin.reset();
        self.surface_temperature_celsius.reset();
        self.surface_temperature_fahrenheit.reset();
        self.temperature_units.reset();
        self.net_inflow_of_energy.reset();
        self.in_radiative_balance.reset();
        self.sun_is_shining.reset();
        self.is_playing.reset();
        self.simulation_state.reset();
        self.sun_output_rate.reset();
        self.outgoing_energy_rate.reset();
        self.number_of_active_layers.reset();
        self.ground_albedo.reset();
        self.solar_intensity.reset();
        self.cloud_enabled.reset();
        self.ground.reset();
        for layer in &mut self.atmosphere_layers {
            layer.reset();
        }
    }
}

/// Serializable state of one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub altitude: f64,
    pub temperature: Kelvin,
    pub is_active: bool,
    pub at_equilibrium: bool,
    pub infrared_absorption: f64,
    pub absorbed_energy_rate: f64,
    pub emitted_energy_rate: f64,
}

impl LayerSnapshot {
    fn of(layer: &EnergyAbsorbingEmittingLayer) -> Self {
        Self {
            altitude: layer.altitude(),
            temperature: layer.temperature(),
            is_active: layer.is_active(),
            at_equilibrium: layer.is_at_equilibrium(),
            infrared_absorption: layer.infrared_absorption().value(),
            absorbed_energy_rate: layer.absorbed_energy_rate(),
            emitted_energy_rate: layer.emitted_energy_rate(),
        }
    }
}

/// Serializable state of a whole model, for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub time: f64,
    pub state: SimulationState,
    pub surface_temperature: Kelvin,
    pub temperature_units: TemperatureUnits,
    /// Surface temperature in the selected units
    pub surface_temperature_display: f64,
    pub ground: LayerSnapshot,
    pub atmosphere_layers: Vec<LayerSnapshot>,
    pub sun_output_rate: f64,
    pub outgoing_energy_rate: f64,
    pub net_inflow_of_energy: f64,
    pub in_radiative_balance: bool,
    pub cloud_enabled: Option<bool>,
    pub flux: Option<FluxReading>,
    pub photon_count: Option<usize>,
    pub packet_count: usize,
}

/// Sun, ground, a stack of atmosphere layers and outer space, stepped together
pub struct LayersModel {
    config: ModelConfig,

    ground: GroundLayer,
    /// Ordered bottom to top, evenly spaced
    atmosphere_layers: Vec<AtmosphereLayer>,
    sun: SunEnergySource,
    outer_space: OuterSpace,
    cloud: Option<Cloud>,
    flux_meter: Option<FluxMeter>,
    photons: Option<PhotonCollection>,

    /// Energy packets in flight
    packets: Vec<EmEnergyPacket>,

    number_of_active_layers: usize,
    sunlight_started: bool,
    is_playing: bool,
    time: f64,

    observables: ModelObservables,
}

impl LayersModel {
    /// Create a model from a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Construction parameters; rejected if any is out of range
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let capacity = config.atmosphere_layer_capacity;
        let infrared_absorption = Fraction::new(config.initial_infrared_absorption);
        let atmosphere_layers: Vec<AtmosphereLayer> = (0..capacity)
            .map(|index| {
                let altitude =
                    HEIGHT_OF_ATMOSPHERE * (index + 1) as f64 / (capacity + 1) as f64;
                AtmosphereLayer::new(
                    Meters::new(altitude),
                    infrared_absorption,
                    index < config.initially_active_layers,
                )
            })
            .collect();

        let ground = GroundLayer::new(Fraction::new(config.ground_albedo));
        let sun = SunEnergySource::new(config.solar_intensity);
        let cloud = config.cloud.as_ref().map(Cloud::new);
        let flux_meter = config.flux_meter.then(FluxMeter::new);
        let photons = config
            .photons
            .then(|| PhotonCollection::new(config.photon_seed));

        let observables = ModelObservables {
            surface_temperature_kelvin: Property::new(ground.temperature()),
            surface_temperature_celsius: Property::new(ground.temperature().to_celsius()),
            surface_temperature_fahrenheit: Property::new(ground.temperature().to_fahrenheit()),
            temperature_units: Property::new(config.temperature_units),
            net_inflow_of_energy: Property::new(0.0),
            in_radiative_balance: Property::new(true),
            sun_is_shining: Property::new(false),
            is_playing: Property::new(true),
            simulation_state: Property::new(SimulationState::NotStarted),
            sun_output_rate: Property::new(0.0),
            outgoing_energy_rate: Property::new(0.0),
            number_of_active_layers: Property::new(config.initially_active_layers),
            ground_albedo: Property::new(config.ground_albedo),
            solar_intensity: Property::new(sun.proportion_of_max()),
            cloud_enabled: Property::new(cloud.as_ref().is_some_and(Cloud::is_enabled)),
            ground: LayerObservables::new(ground.core()),
            atmosphere_layers: atmosphere_layers
                .iter()
                .map(|layer| LayerObservables::new(layer.core()))
                .collect(),
        };

        info!(
            "Layers model created: {} atmosphere layers ({} active), albedo={:.2}, cloud={}, photons={}",
            capacity,
            config.initially_active_layers,
            config.ground_albedo,
            cloud.is_some(),
            photons.is_some()
        );

        Ok(Self {
            number_of_active_layers: config.initially_active_layers,
            config,
            ground,
            atmosphere_layers,
            sun,
            outer_space: OuterSpace::new(),
            cloud,
            flux_meter,
            photons,
            packets: Vec::new(),
            sunlight_started: false,
            is_playing: true,
            time: 0.0,
            observables,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> SimulationState {
        if !self.sunlight_started {
            SimulationState::NotStarted
        } else if self.is_playing {
            SimulationState::Running
        } else {
            SimulationState::Paused
        }
    }

    /// Turn the sun on. One-way until the next reset.
    pub fn start_sunlight(&mut self) {
        if self.sunlight_started {
            return;
        }
        info!("Starting sunlight");
        self.sunlight_started = true;
        self.is_playing = true;
        self.sun.set_shining(true);
        self.publish();
    }

    /// Play or pause
    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
        self.publish();
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Advance by `dt` seconds if running, in sub-steps no longer than the configured
    /// maximum
    ///
    /// # Arguments
    ///
    /// * `dt` - Elapsed wall time in seconds
    pub fn step(&mut self, dt: f64) {
        if self.state() != SimulationState::Running {
            return;
        }
        if !dt.is_finite() || dt <= 0.0 {
            warn!("Ignoring invalid time step {}", dt);
            return;
        }
        let sub_steps = (dt / self.config.max_time_step).ceil().max(1.0) as usize;
        let sub_dt = dt / sub_steps as f64;
        for _ in 0..sub_steps {
            self.step_model(sub_dt);
        }
    }

    /// Advance one nominal step regardless of play/pause, once sunlight has started
    pub fn step_once(&mut self) {
        if self.sunlight_started {
            self.step_model(NOMINAL_TIME_STEP);
        }
    }

    /// Run the energy pipeline for one integration step
    ///
    /// # Arguments
    ///
    /// * `dt` - Step in seconds. Stability needs `dt` no longer than the configured maximum;
    ///   [`LayersModel::step`] guarantees that.
    pub fn step_model(&mut self, dt: f64) {
        if !self.sunlight_started {
            return;
        }
        debug_assert!(dt > 0.0, "step must be positive, got {dt}");
        self.time += dt;

        // 1. Sunlight enters at the top of the atmosphere
        self.sun.produce_energy(dt, &mut self.packets);

        // 2. Propagate packets
        for packet in &mut self.packets {
            packet.update(dt);
        }

        // 3. Flux meter sees every crossing before anything is absorbed
        if let Some(flux_meter) = &mut self.flux_meter {
            flux_meter.sensor.measure(&self.packets);
        }

        // 4. Cloud reflection
        if let Some(cloud) = &self.cloud {
            cloud.interact_with_energy_packets(&mut self.packets);
        }

        // 5. Ground, then active atmosphere layers bottom to top
        for packet in &mut self.packets {
            self.ground.interact_with_energy_packet(packet);
            for layer in self
                .atmosphere_layers
                .iter_mut()
                .filter(|layer| layer.is_active())
            {
                if packet.is_depleted() {
                    break;
                }
                layer.interact_with_energy_packet(packet);
            }
        }

        // 6. Outer space takes whatever escapes
        self.outer_space.absorb_energy(&mut self.packets);
        self.packets
            .retain(|packet| !packet.is_depleted() && packet.altitude >= 0.0);

        // 7. Temperatures and emission, bottom to top
        let mut emitted = Vec::new();
        self.ground.update_temperature(dt, &mut emitted);
        self.ground.check_equilibrium(dt);
        for layer in &mut self.atmosphere_layers {
            layer.update_temperature(dt, &mut emitted);
            layer.check_equilibrium(dt);
        }
        self.packets.extend(emitted);

        // 8. Energy rate trackers
        self.sun.step_tracker(dt);
        self.outer_space.step_tracker(dt);
        self.ground.core_mut().step_trackers(dt);
        for layer in &mut self.atmosphere_layers {
            layer.core_mut().step_trackers(dt);
        }
        if let Some(flux_meter) = &mut self.flux_meter {
            flux_meter.sensor.step_trackers(dt);
        }

        // 9. Photons
        if let Some(photons) = &mut self.photons {
            let cloud = self.cloud.as_ref().filter(|cloud| cloud.is_enabled());
            photons.step(
                dt,
                &self.sun,
                &mut self.ground,
                &mut self.atmosphere_layers,
                cloud,
            );
        }

        // 10. Derived observables
        self.publish();

        debug!(
            "Model step: t={:.3}s, dt={:.4}s, surface={:.2}K, net inflow={:.2}W/m², packets={}",
            self.time,
            dt,
            self.ground.temperature().value(),
            self.net_inflow_of_energy(),
            self.packets.len()
        );
    }

    /// Activate the lowest `count` atmosphere layers and deactivate the rest
    pub fn set_number_of_active_layers(&mut self, count: usize) {
        let capacity = self.atmosphere_layers.len();
        debug_assert!(
            count <= capacity,
            "requested {count} active layers but only {capacity} are allocated"
        );
        let count = if count > capacity {
            warn!(
                "Requested {} active layers, clamping to capacity {}",
                count, capacity
            );
            capacity
        } else {
            count
        };
        self.number_of_active_layers = count;
        for (index, layer) in self.atmosphere_layers.iter_mut().enumerate() {
            layer.set_active(index < count);
        }
        self.perturb_all();
        self.publish();
    }

    pub fn set_ground_albedo(&mut self, albedo: f64) {
        let albedo = checked_proportion("ground albedo", albedo);
        self.ground.set_albedo(albedo);
        self.perturb_all();
        self.publish();
    }

    /// Set the sun's intensity relative to its baseline output
    pub fn set_solar_intensity(&mut self, proportion: f64) {
        self.sun.set_proportion_of_max(proportion);
        self.perturb_all();
        self.publish();
    }

    /// Set the infrared absorption proportion of every atmosphere layer
    pub fn set_infrared_absorbance(&mut self, proportion: f64) {
        let proportion = checked_proportion("infrared absorbance", proportion);
        for layer in &mut self.atmosphere_layers {
            layer.set_infrared_absorption(proportion);
        }
        self.perturb_all();
        self.publish();
    }

    pub fn set_cloud_enabled(&mut self, enabled: bool) {
        match &mut self.cloud {
            Some(cloud) => cloud.set_enabled(enabled),
            None => {
                warn!("Model has no cloud to enable");
                return;
            }
        }
        self.perturb_all();
        self.publish();
    }

    pub fn set_temperature_units(&mut self, units: TemperatureUnits) {
        self.observables.temperature_units.set(units);
    }

    /// Move the flux sensor, if the model has a flux meter
    pub fn set_flux_sensor_altitude(&mut self, altitude: f64) {
        if let Some(flux_meter) = &mut self.flux_meter {
            flux_meter.sensor.set_altitude(altitude);
        }
    }

    pub fn set_flux_meter_visible(&mut self, visible: bool) {
        if let Some(flux_meter) = &mut self.flux_meter {
            flux_meter.set_visible(visible);
        }
    }

    /// Listen for photon additions and removals. Returns `None` if the model has no photons.
    pub fn subscribe_to_photons(
        &mut self,
        listener: impl FnMut(&PhotonEvent) + 'static,
    ) -> Option<ListenerId> {
        self.photons
            .as_mut()
            .map(|photons| photons.subscribe(listener))
    }

    /// Restore the post-construction state. Listeners stay registered.
    pub fn reset(&mut self) {
        info!("Resetting layers model");
        self.ground.reset();
        for layer in &mut self.atmosphere_layers {
            layer.reset();
        }
        self.sun.reset();
        self.outer_space.reset();
        if let Some(cloud) = &mut self.cloud {
            cloud.reset();
        }
        if let Some(flux_meter) = &mut self.flux_meter {
            flux_meter.reset();
        }
        if let Some(photons) = &mut self.photons {
            photons.reset();
        }
        self.packets.clear();
        self.number_of_active_layers = self.config.initially_active_layers;
        self.sunlight_started = false;
        self.is_playing = true;
        self.time = 0.0;
        self.observables.reset();
        self.publish();
    }

    // ====== Accessors ======

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn ground(&self) -> &GroundLayer {
        &self.ground
    }

    /// All allocated layers, bottom to top
    pub fn atmosphere_layers(&self) -> &[AtmosphereLayer] {
        &self.atmosphere_layers
    }

    pub fn active_layers(&self) -> impl Iterator<Item = &AtmosphereLayer> {
        self.atmosphere_layers
            .iter()
            .filter(|layer| layer.is_active())
    }

    pub fn number_of_active_layers(&self) -> usize {
        self.number_of_active_layers
    }

    pub fn sun(&self) -> &SunEnergySource {
        &self.sun
    }

    pub fn outer_space(&self) -> &OuterSpace {
        &self.outer_space
    }

    pub fn cloud(&self) -> Option<&Cloud> {
        self.cloud.as_ref()
    }

    pub fn flux_meter(&self) -> Option<&FluxMeter> {
        self.flux_meter.as_ref()
    }

    pub fn photons(&self) -> Option<&PhotonCollection> {
        self.photons.as_ref()
    }

    pub fn photons_mut(&mut self) -> Option<&mut PhotonCollection> {
        self.photons.as_mut()
    }

    pub fn packets(&self) -> &[EmEnergyPacket] {
        &self.packets
    }

    /// Simulated time since sunlight started (s)
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn surface_temperature(&self) -> Kelvin {
        self.ground.temperature()
    }

    /// Sunlight rate minus the rate energy leaves to space (W/m²)
    pub fn net_inflow_of_energy(&self) -> f64 {
        self.sun.output_energy_rate() - self.outer_space.incoming_energy_rate()
    }

    pub fn in_radiative_balance(&self) -> bool {
        self.net_inflow_of_energy().abs() < RADIATIVE_BALANCE_THRESHOLD
    }

    pub fn observables(&self) -> &ModelObservables {
        &self.observables
    }

    /// Register listeners here. Listeners only receive values, never the model.
    pub fn observables_mut(&mut self) -> &mut ModelObservables {
        &mut self.observables
    }

    /// Serializable summary of the current state
    pub fn snapshot(&self) -> ModelSnapshot {
        let units = *self.observables.temperature_units.get();
        ModelSnapshot {
            time: self.time,
            state: self.state(),
            surface_temperature: self.surface_temperature(),
            temperature_units: units,
            surface_temperature_display: units.from_kelvin(self.surface_temperature()),
            ground: LayerSnapshot::of(self.ground.core()),
            atmosphere_layers: self
                .atmosphere_layers
                .iter()
                .map(|layer| LayerSnapshot::of(layer.core()))
                .collect(),
            sun_output_rate: self.sun.output_energy_rate(),
            outgoing_energy_rate: self.outer_space.incoming_energy_rate(),
            net_inflow_of_energy: self.net_inflow_of_energy(),
            in_radiative_balance: self.in_radiative_balance(),
            cloud_enabled: self.cloud.as_ref().map(Cloud::is_enabled),
            flux: self
                .flux_meter
                .as_ref()
                .map(|flux_meter| flux_meter.sensor.reading()),
            photon_count: self.photons.as_ref().map(PhotonCollection::len),
            packet_count: self.packets.len(),
        }
    }

    // ====== Private Methods ======

    fn perturb_all(&mut self) {
        self.ground.perturb();
        for layer in &mut self.atmosphere_layers {
            layer.perturb();
        }
    }

    /// Push the current state into the observables. Every value is computed before any
    /// listener runs.
    fn publish(&mut self) {
        let surface = self.ground.temperature();
        let sun_rate = self.sun.output_energy_rate();
        let outgoing = self.outer_space.incoming_energy_rate();
        let net_inflow = sun_rate - outgoing;
        let in_balance = net_inflow.abs() < RADIATIVE_BALANCE_THRESHOLD;
        let state = self.state();
        let cloud_enabled = self.cloud.as_ref().is_some_and(Cloud::is_enabled);

        let observables = &mut self.observables;
        observables.surface_temperature_kelvin.set(surface);
        observables
            .surface_temperature_celsius
            .set(surface.to_celsius());
        observables
            .surface_temperature_fahrenheit
            .set(surface.to_fahrenheit());
        observables.net_inflow_of_energy.set(net_inflow);
        observables.in_radiative_balance.set(in_balance);
        observables.sun_is_shining.set(self.sun.is_shining());
        observables.is_playing.set(self.is_playing);
        observables.simulation_state.set(state);
        observables.sun_output_rate.set(sun_rate);
        observables.outgoing_energy_rate.set(outgoing);
        observables
            .number_of_active_layers
            .set(self.number_of_active_layers);
        observables
            .ground_albedo
            .set(self.ground.albedo().value());
        observables
            .solar_intensity
            .set(self.sun.proportion_of_max());
        observables.cloud_enabled.set(cloud_enabled);
        observables.ground.publish(self.ground.core());
        for (layer_observables, layer) in observables
            .atmosphere_layers
            .iter_mut()
            .zip(&self.atmosphere_layers)
        {
            layer_observables.publish(layer.core());
        }
    }
}

impl std::fmt::Debug for LayersModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayersModel")
            .field("state", &self.state())
            .field("time", &self.time)
            .field("surface_temperature", &self.ground.temperature())
            .field("active_layers", &self.number_of_active_layers)
            .field("packets", &self.packets.len())
            .finish_non_exhaustive()
    }
}

/// Validate a user-supplied proportion: fatal in debug builds, clamped in release builds
pub(crate) fn checked_proportion(name: &str, value: f64) -> Fraction {
    debug_assert!(
        (0.0..=1.0).contains(&value),
        "{name} must lie in [0, 1], got {value}"
    );
    if (0.0..=1.0).contains(&value) {
        Fraction::new(value)
    } else {
        let clamped = Fraction::clamped(value);
        warn!("{} {} out of range, clamping to {}", name, value, clamped);
        clamped
    }
}
