//! Sliding-window energy rate tracking

use crate::constants::ENERGY_ACCUMULATION_PERIOD;
use std::collections::VecDeque;

/// Slack applied at the window's trailing edge so that accumulated clock rounding does not
/// change how many fixed-size steps fit in the window.
const WINDOW_EDGE_TOLERANCE: f64 = 1e-9;

/// A timestamped energy contribution
#[derive(Debug, Clone, Copy, PartialEq)]
struct EnergySample {
    timestamp: f64,
    amount: f64,
}

/// Converts discrete energy events into a smoothed rate (W/m²)
///
/// Energy logged during a step is recorded when the tracker steps, and the rate is always
/// the sum over the trailing window divided by the time that window covers.
///
/// # Example
/// ```
/// use greenhouse_core::energy::EnergyRateTracker;
///
/// let mut tracker = EnergyRateTracker::new();
/// for _ in 0..30 {
///     tracker.log_energy(2.0);
///     tracker.step(0.1);
/// }
/// assert!((tracker.energy_rate() - 20.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct EnergyRateTracker {
    window: f64,
    clock: f64,
    pending_energy: f64,
    samples: VecDeque<EnergySample>,
    energy_rate: f64,
}

impl Default for EnergyRateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl EnergyRateTracker {
    /// Tracker over the standard accumulation period
    pub fn new() -> Self {
        Self::with_window(ENERGY_ACCUMULATION_PERIOD)
    }

    /// Tracker over a custom window (s)
    pub fn with_window(window: f64) -> Self {
        debug_assert!(window > 0.0, "rate window must be positive, got {window}");
        Self {
            window,
            clock: 0.0,
            pending_energy: 0.0,
            samples: VecDeque::new(),
            energy_rate: 0.0,
        }
    }

    /// Record `amount` at an explicit time
    pub fn add_energy_amount(&mut self, amount: f64, timestamp: f64) {
        debug_assert!(amount.is_finite(), "energy amount must be finite");
        self.samples.push_back(EnergySample { timestamp, amount });
    }

    /// Add energy to the sample recorded by the next `step`
    pub fn log_energy(&mut self, amount: f64) {
        debug_assert!(amount.is_finite(), "energy amount must be finite");
        self.pending_energy += amount;
    }

    /// Advance the clock by `dt`, record pending energy, evict old samples and recompute the
    /// rate
    pub fn step(&mut self, dt: f64) {
        self.clock += dt;
        let pending = std::mem::take(&mut self.pending_energy);
        self.add_energy_amount(pending, self.clock);

        let trailing_edge = self.clock - self.window + WINDOW_EDGE_TOLERANCE;
        self.samples.retain(|sample| sample.timestamp > trailing_edge);

        let covered = self.window.min(self.clock);
        let total: f64 = self.samples.iter().map(|sample| sample.amount).sum();
        self.energy_rate = if covered > 0.0 { total / covered } else { 0.0 };
    }

    /// Rate over the trailing window (W/m²)
    pub fn energy_rate(&self) -> f64 {
        self.energy_rate
    }

    /// Internal clock (s)
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Window length (s)
    pub fn window(&self) -> f64 {
        self.window
    }

    /// Discard all samples and restart the clock
    pub fn reset(&mut self) {
        self.clock = 0.0;
        self.pending_energy = 0.0;
        self.samples.clear();
        self.energy_rate = 0.0;
    }
}
