//! Physical and model-wide constants
//!
//! The layer materials, the model speed of light and the layer thickness are artificial: they
//! are chosen so that the model settles within tens of simulated seconds while keeping the
//! Stefan-Boltzmann energy balance exact.

/// Stefan-Boltzmann constant (W/m²K⁴)
pub const STEFAN_BOLTZMANN: f64 = 5.670374419e-8;

/// Altitude of the boundary with outer space (m)
pub const HEIGHT_OF_ATMOSPHERE: f64 = 50_000.0;

/// Horizontal width of the region lit by the sun (m)
pub const SUNLIGHT_SPAN_WIDTH: f64 = 60_000.0;

/// Propagation speed of energy packets and photons in model space (m/s)
pub const SPEED_OF_LIGHT: f64 = 20_000.0;

/// Nominal wavelength of sunlight (m)
pub const VISIBLE_WAVELENGTH: f64 = 580e-9;

/// Nominal wavelength of infrared radiation (m)
pub const INFRARED_WAVELENGTH: f64 = 10e-6;

/// Thickness of every energy absorbing/emitting layer (m)
pub const LAYER_THICKNESS: f64 = 5e-7;

/// Temperature change rate below which a layer counts as settling (K/s)
pub const AT_EQUILIBRIUM_THRESHOLD: f64 = 0.004;

/// Time a layer must stay below the threshold to be at equilibrium (s)
pub const EQUILIBRATION_TIME: f64 = 2.0;

/// Trailing window used by energy rate trackers (s)
pub const ENERGY_ACCUMULATION_PERIOD: f64 = 1.0;

/// Net energy flow at the top of the atmosphere considered balanced (W/m²)
pub const RADIATIVE_BALANCE_THRESHOLD: f64 = 5.0;

/// Step used by `step_once` and as the nominal frame duration (s)
pub const NOMINAL_TIME_STEP: f64 = 1.0 / 60.0;

/// Largest integration sub-step the explicit temperature update stays stable with (s)
pub const MAX_TIME_STEP: f64 = 1.0 / 30.0;

/// Largest number of atmosphere layers a model may allocate
pub const MAX_ATMOSPHERE_LAYERS: usize = 20;

/// Energy carried by a single photon (J/m²), sized so the sun emits 20 photons/s
pub const PHOTON_ENERGY: f64 = crate::energy::sun::OUTPUT_ENERGY_RATE / VISIBLE_PHOTONS_PER_SECOND;

/// Visible photons emitted per second by the sun at full intensity
pub const VISIBLE_PHOTONS_PER_SECOND: f64 = 20.0;

/// One photon out of this many is shown outside "more photons" mode
pub const PHOTON_SHOW_CADENCE: u64 = 3;

/// Mean time a layer holds absorbed photon energy before re-emitting it (s)
pub const PHOTON_REEMISSION_MEAN_DELAY: f64 = 0.25;
