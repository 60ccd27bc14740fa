//! Energy transport: packets, sources, sinks and rate measurement
//!
//! Energy packets are the representation that drives temperatures. They are produced by
//! [`SunEnergySource`] and by the layers, travel vertically, and end up absorbed by a layer
//! or by [`OuterSpace`]. [`EnergyRateTracker`] converts the discrete amounts that pass any
//! boundary into rates, and [`FluxMeter`] measures the flow through a movable plane.

pub mod flux_meter;
pub mod outer_space;
pub mod packet;
pub mod rate_tracker;
pub mod sun;

pub use flux_meter::{FluxMeter, FluxReading, FluxSensor};
pub use outer_space::OuterSpace;
pub use packet::{Direction, EmEnergyPacket, Wavelength};
pub use rate_tracker::EnergyRateTracker;
pub use sun::{SunEnergySource, OUTPUT_ENERGY_RATE, SOLAR_INTENSITY_RANGE};
