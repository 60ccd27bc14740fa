//! Shared helpers for integration tests

#![allow(dead_code)]

use greenhouse_core::LayersModel;

/// Route `tracing` output through the test harness so `RUST_LOG=debug` shows model logs
#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Frame duration used by the integration tests (s)
pub const FRAME: f64 = 1.0 / 30.0;

/// Step `model` until the ground and every active layer report equilibrium, or until
/// `max_seconds` of model time have passed. Returns the model time at which it stopped.
pub fn run_to_equilibrium(model: &mut LayersModel, max_seconds: f64) -> f64 {
    let frames = (max_seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        model.step(FRAME);
        if is_settled(model) {
            break;
        }
    }
    model.time()
}

/// Step `model` for `seconds` of model time
pub fn run_for(model: &mut LayersModel, seconds: f64) {
    let frames = (seconds / FRAME).round() as usize;
    for _ in 0..frames {
        model.step(FRAME);
    }
}

pub fn is_settled(model: &LayersModel) -> bool {
    use greenhouse_core::EnergyLayer;

    model.ground().is_at_equilibrium()
        && model.active_layers().all(|layer| layer.is_at_equilibrium())
}
