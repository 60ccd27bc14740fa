//! Photon lifecycle management

use super::photon::{Photon, PhotonId, ShowState};
use crate::cloud::Cloud;
use crate::constants::{
    HEIGHT_OF_ATMOSPHERE, PHOTON_ENERGY, PHOTON_REEMISSION_MEAN_DELAY, PHOTON_SHOW_CADENCE,
    SPEED_OF_LIGHT, SUNLIGHT_SPAN_WIDTH, VISIBLE_PHOTONS_PER_SECOND,
};
use crate::core_types::Vec2;
use crate::energy::{SunEnergySource, Wavelength};
use crate::layers::{AtmosphereLayer, EnergyLayer, GroundLayer, PhotonInteraction};
use crate::observable::{Emitter, ListenerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Largest angle from vertical at which infrared photons are emitted (rad)
const MAX_INFRARED_EMISSION_ANGLE: f64 = 0.5;

/// Structural change to a photon collection
#[derive(Debug, Clone, PartialEq)]
pub enum PhotonEvent {
    Added(Photon),
    Removed(Photon),
}

impl PhotonEvent {
    pub fn photon(&self) -> &Photon {
        match self {
            PhotonEvent::Added(photon) | PhotonEvent::Removed(photon) => photon,
        }
    }
}

/// Owns every live photon and moves them through the layer stack
///
/// Photons are the particle view of the radiation: sunlight photons are released at a rate
/// proportional to the sun's output, infrared photons at the ground's Stefan-Boltzmann rate,
/// and atmosphere layers re-emit photons they absorbed after a random delay. Additions and
/// removals are announced through [`PhotonEvent`]s; no other structural change happens.
#[derive(Debug)]
pub struct PhotonCollection {
    photons: Vec<Photon>,
    next_id: u64,
    seed: u64,
    rng: StdRng,
    events: Emitter<PhotonEvent>,
    sun_photon_accumulator: f64,
    ground_photon_accumulator: f64,
    show_counter: u64,
    more_photons: bool,
    added_count: u64,
    removed_count: u64,
}

impl PhotonCollection {
    pub fn new(seed: u64) -> Self {
        Self {
            photons: Vec::new(),
            next_id: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
            events: Emitter::new(),
            sun_photon_accumulator: 0.0,
            ground_photon_accumulator: 0.0,
            show_counter: 0,
            more_photons: false,
            added_count: 0,
            removed_count: 0,
        }
    }

    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// Photons added since construction or the last reset
    pub fn added_count(&self) -> u64 {
        self.added_count
    }

    /// Photons removed since construction or the last reset
    pub fn removed_count(&self) -> u64 {
        self.removed_count
    }

    pub fn more_photons(&self) -> bool {
        self.more_photons
    }

    pub fn set_more_photons(&mut self, more_photons: bool) {
        self.more_photons = more_photons;
    }

    /// Photons a view should currently draw
    pub fn shown_photons(&self) -> impl Iterator<Item = &Photon> {
        let more_photons = self.more_photons;
        self.photons.iter().filter(move |p| p.is_shown(more_photons))
    }

    /// Listen for additions and removals
    pub fn subscribe(&mut self, listener: impl FnMut(&PhotonEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Advance every photon, resolve interactions, then emit new photons
    pub fn step(
        &mut self,
        dt: f64,
        sun: &SunEnergySource,
        ground: &mut GroundLayer,
        layers: &mut [AtmosphereLayer],
        cloud: Option<&Cloud>,
    ) {
        let photons = std::mem::take(&mut self.photons);
        let mut survivors = Vec::with_capacity(photons.len());
        let mut removed = Vec::new();

        for mut photon in photons {
            let previous_altitude = photon.advance(dt);
            wrap_horizontally(&mut photon.position);

            match self.resolve_interaction(&photon, previous_altitude, ground, layers, cloud) {
                Some((PhotonInteraction::Absorbed, _)) => removed.push(photon),
                Some((PhotonInteraction::Reflected, altitude)) => {
                    photon.reflect_at(altitude);
                    survivors.push(photon);
                }
                Some((PhotonInteraction::PassThrough, _)) | None => {
                    // Escape: leaving the vertical extent is not an absorption.
                    if photon.altitude() > HEIGHT_OF_ATMOSPHERE || photon.altitude() < 0.0 {
                        removed.push(photon);
                    } else {
                        survivors.push(photon);
                    }
                }
            }
        }
        self.photons = survivors;
        for photon in removed {
            self.removed_count += 1;
            self.events.emit(&PhotonEvent::Removed(photon));
        }

        self.emit_sunlight(dt, sun);
        self.emit_from_ground(dt, ground);
        self.reemit_from_layers(dt, layers);

        debug_assert_eq!(
            self.added_count - self.removed_count,
            self.photons.len() as u64,
            "photon accounting out of balance"
        );
    }

    /// First reflector or absorber the photon met on its latest move, with the altitude of
    /// the interaction
    fn resolve_interaction(
        &mut self,
        photon: &Photon,
        previous_altitude: f64,
        ground: &mut GroundLayer,
        layers: &mut [AtmosphereLayer],
        cloud: Option<&Cloud>,
    ) -> Option<(PhotonInteraction, f64)> {
        if let Some(cloud) = cloud {
            let interaction = cloud.interact_with_photon(photon, previous_altitude, &mut self.rng);
            if interaction != PhotonInteraction::PassThrough {
                return Some((interaction, cloud.altitude()));
            }
        }
        let interaction = ground.interact_with_photon(photon, previous_altitude, &mut self.rng);
        if interaction != PhotonInteraction::PassThrough {
            return Some((interaction, ground.altitude()));
        }
        for layer in layers.iter_mut().filter(|layer| layer.is_active()) {
            let interaction = layer.interact_with_photon(photon, previous_altitude, &mut self.rng);
            if interaction != PhotonInteraction::PassThrough {
                return Some((interaction, layer.altitude()));
            }
        }
        None
    }

    fn emit_sunlight(&mut self, dt: f64, sun: &SunEnergySource) {
        if !sun.is_shining() {
            return;
        }
        self.sun_photon_accumulator += VISIBLE_PHOTONS_PER_SECOND * sun.proportion_of_max() * dt;
        while self.sun_photon_accumulator >= 1.0 {
            self.sun_photon_accumulator -= 1.0;
            let x = self.random_x();
            self.add_photon(
                Vec2::new(x, HEIGHT_OF_ATMOSPHERE),
                Vec2::new(0.0, -SPEED_OF_LIGHT),
                Wavelength::Visible,
            );
        }
    }

    fn emit_from_ground(&mut self, dt: f64, ground: &GroundLayer) {
        self.ground_photon_accumulator +=
            ground.core().emission_rate_per_surface() / PHOTON_ENERGY * dt;
        while self.ground_photon_accumulator >= 1.0 {
            self.ground_photon_accumulator -= 1.0;
            let x = self.random_x();
            let velocity = self.infrared_velocity(true);
            self.add_photon(Vec2::new(x, ground.altitude()), velocity, Wavelength::Infrared);
        }
    }

    /// Every photon a layer holds is re-emitted independently with probability
    /// `dt / mean delay` per step, so emission keeps pace with absorption.
    fn reemit_from_layers(&mut self, dt: f64, layers: &mut [AtmosphereLayer]) {
        let probability = (dt / PHOTON_REEMISSION_MEAN_DELAY).min(1.0);
        for layer in layers.iter_mut().filter(|layer| layer.is_active()) {
            let held = layer.core().held_photon_count();
            for _ in 0..held {
                if self.rng.random::<f64>() >= probability {
                    continue;
                }
                if !layer.core_mut().take_photon_energy() {
                    break;
                }
                let upward = self.rng.random_bool(0.5);
                let x = self.random_x();
                let velocity = self.infrared_velocity(upward);
                self.add_photon(Vec2::new(x, layer.altitude()), velocity, Wavelength::Infrared);
            }
        }
    }

    fn random_x(&mut self) -> f64 {
        self.rng
            .random_range(-SUNLIGHT_SPAN_WIDTH / 2.0..SUNLIGHT_SPAN_WIDTH / 2.0)
    }

    fn infrared_velocity(&mut self, upward: bool) -> Vec2 {
        let angle = self
            .rng
            .random_range(-MAX_INFRARED_EMISSION_ANGLE..=MAX_INFRARED_EMISSION_ANGLE);
        let vertical = if upward { angle.cos() } else { -angle.cos() };
        Vec2::new(angle.sin(), vertical) * SPEED_OF_LIGHT
    }

    fn add_photon(&mut self, position: Vec2, velocity: Vec2, wavelength: Wavelength) {
        let show_state = if self.show_counter % PHOTON_SHOW_CADENCE == 0 {
            ShowState::Always
        } else {
            ShowState::OnlyInMorePhotonsMode
        };
        self.show_counter += 1;

        let photon = Photon::new(PhotonId(self.next_id), position, velocity, wavelength, show_state);
        self.next_id += 1;
        self.photons.push(photon.clone());
        self.added_count += 1;
        self.events.emit(&PhotonEvent::Added(photon));
    }

    /// Remove every photon (announcing each removal) and reseed the random number generator
    pub fn reset(&mut self) {
        let photons = std::mem::take(&mut self.photons);
        debug!(count = photons.len(), "Clearing photons");
        for photon in photons {
            self.events.emit(&PhotonEvent::Removed(photon));
        }
        self.next_id = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
        self.sun_photon_accumulator = 0.0;
        self.ground_photon_accumulator = 0.0;
        self.show_counter = 0;
        self.more_photons = false;
        self.added_count = 0;
        self.removed_count = 0;
    }
}

/// Photons that drift past either side of the sunlit span re-enter from the other side
fn wrap_horizontally(position: &mut Vec2) {
    let half_span = SUNLIGHT_SPAN_WIDTH / 2.0;
    if position.x < -half_span || position.x >= half_span {
        position.x = (position.x + half_span).rem_euclid(SUNLIGHT_SPAN_WIDTH) - half_span;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Fraction, Meters};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn shining_sun() -> SunEnergySource {
        let mut sun = SunEnergySource::new(1.0);
        sun.set_shining(true);
        sun
    }

    #[test]
    fn test_sun_emits_twenty_photons_per_second() {
        let mut collection = PhotonCollection::new(1);
        let sun = shining_sun();
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        let added = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&added);
        collection.subscribe(move |event| {
            if let PhotonEvent::Added(photon) = event {
                if !photon.is_infrared() {
                    *sink.borrow_mut() += 1;
                }
            }
        });

        for _ in 0..60 {
            collection.step(1.0 / 60.0, &sun, &mut ground, &mut [], None);
        }

        let visible = *added.borrow();
        assert!((19..=20).contains(&visible), "emitted {visible} sunlight photons");
    }

    #[test]
    fn test_accounting_balances_through_absorption_and_escape() {
        let mut collection = PhotonCollection::new(42);
        let sun = shining_sun();
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        let mut layers = vec![AtmosphereLayer::new(Meters::new(25_000.0), Fraction::new(0.5), true)];
        let events = Rc::new(RefCell::new((0_u64, 0_u64)));
        let sink = Rc::clone(&events);
        collection.subscribe(move |event| {
            let mut counts = sink.borrow_mut();
            match event {
                PhotonEvent::Added(_) => counts.0 += 1,
                PhotonEvent::Removed(_) => counts.1 += 1,
            }
        });

        for _ in 0..600 {
            collection.step(1.0 / 60.0, &sun, &mut ground, &mut layers, None);
            let (added, removed) = *events.borrow();
            assert_eq!(added - removed, collection.len() as u64);
        }
        assert!(collection.removed_count() > 0);
        assert_eq!(
            collection.added_count() - collection.removed_count(),
            collection.len() as u64
        );
    }

    #[test]
    fn test_layer_releases_every_held_photon() {
        let mut collection = PhotonCollection::new(7);
        let sun = SunEnergySource::new(1.0);
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        let altitude = 25_000.0;
        // Transparent to infrared so ground photons pass and only the preloaded ones count
        let mut layers = vec![AtmosphereLayer::new(Meters::new(altitude), Fraction::ZERO, true)];
        layers[0].core_mut().add_photon_energy(PHOTON_ENERGY * 10.0);

        let reemitted = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&reemitted);
        collection.subscribe(move |event| {
            if let PhotonEvent::Added(photon) = event {
                if photon.altitude() == altitude {
                    *sink.borrow_mut() += 1;
                }
            }
        });

        // Mean delay is 0.25 s; three seconds drains ten photons with near certainty
        for _ in 0..90 {
            collection.step(1.0 / 30.0, &sun, &mut ground, &mut layers, None);
        }

        assert_eq!(layers[0].core().held_photon_count(), 0);
        assert_eq!(*reemitted.borrow(), 10);
    }

    #[test]
    fn test_every_third_photon_always_shown() {
        let mut collection = PhotonCollection::new(3);
        for _ in 0..9 {
            collection.add_photon(Vec2::zeros(), Vec2::new(0.0, 1.0), Wavelength::Visible);
        }
        assert_eq!(collection.shown_photons().count(), 3);
        collection.set_more_photons(true);
        assert_eq!(collection.shown_photons().count(), 9);
    }

    #[test]
    fn test_reset_removes_all_and_reseeds() {
        let mut collection = PhotonCollection::new(9);
        let sun = shining_sun();
        let mut ground = GroundLayer::new(Fraction::new(0.3));
        for _ in 0..30 {
            collection.step(1.0 / 60.0, &sun, &mut ground, &mut [], None);
        }
        let first_run: Vec<Vec2> = collection.photons().iter().map(|p| p.position).collect();
        let removed = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&removed);
        collection.subscribe(move |event| {
            if matches!(event, PhotonEvent::Removed(_)) {
                *sink.borrow_mut() += 1;
            }
        });

        let live = collection.len();
        collection.reset();
        assert!(collection.is_empty());
        assert_eq!(*removed.borrow(), live);

        let mut ground = GroundLayer::new(Fraction::new(0.3));
        for _ in 0..30 {
            collection.step(1.0 / 60.0, &sun, &mut ground, &mut [], None);
        }
        let second_run: Vec<Vec2> = collection.photons().iter().map(|p| p.position).collect();
        assert_eq!(first_run, second_run);
    }

    #[test]
    fn test_wrap_horizontally() {
        let mut position = Vec2::new(SUNLIGHT_SPAN_WIDTH / 2.0 + 100.0, 10.0);
        wrap_horizontally(&mut position);
        assert!((position.x - (-SUNLIGHT_SPAN_WIDTH / 2.0 + 100.0)).abs() < 1e-6);
    }
}
