//! Photon collection tests through the public model API
//!
//! A listener that counts additions and removals must always agree with the collection's
//! own count of live photons.

mod common;

use common::{run_for, FRAME};
use greenhouse_core::constants::{HEIGHT_OF_ATMOSPHERE, SUNLIGHT_SPAN_WIDTH};
use greenhouse_core::{EnergyLayer, LayerModelModel, PhotonEvent, PhotonsModel};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Tally {
    added: u64,
    removed: u64,
}

#[test]
fn test_listener_tally_matches_collection() {
    let mut model = LayerModelModel::new().unwrap();
    let tally = Rc::new(RefCell::new(Tally::default()));
    let sink = Rc::clone(&tally);
    model
        .layers_mut()
        .subscribe_to_photons(move |event| {
            let mut tally = sink.borrow_mut();
            match event {
                PhotonEvent::Added(_) => tally.added += 1,
                PhotonEvent::Removed(_) => tally.removed += 1,
            }
        })
        .expect("layer model carries photons");

    model.layers_mut().start_sunlight();
    for frame in 0..900 {
        model.step(FRAME);
        let photons = model.layers().photons().unwrap();
        let tally = tally.borrow();
        assert_eq!(
            tally.added - tally.removed,
            photons.len() as u64,
            "listener and collection disagree at frame {frame}"
        );
        assert_eq!(tally.added, photons.added_count());
        assert_eq!(tally.removed, photons.removed_count());
    }

    // Thirty seconds of sunlight: photons have reached space and been removed
    assert!(tally.borrow().removed > 0);

    model.reset();
    let tally = tally.borrow();
    assert_eq!(
        tally.added, tally.removed,
        "reset must announce the removal of every live photon"
    );
    assert!(model.layers().photons().unwrap().is_empty());
}

#[test]
fn test_photons_stay_inside_the_atmosphere_box() {
    let mut model = LayerModelModel::new().unwrap();
    model.set_number_of_active_layers(3);
    model.layers_mut().start_sunlight();

    let half_span = SUNLIGHT_SPAN_WIDTH / 2.0;
    for _ in 0..600 {
        model.step(FRAME);
        for photon in model.layers().photons().unwrap().photons() {
            assert!(
                (-half_span..half_span).contains(&photon.position.x),
                "photon {:?} left the horizontal span",
                photon.id
            );
            assert!(photon.altitude() >= 0.0);
            assert!(photon.altitude() <= HEIGHT_OF_ATMOSPHERE + photon.velocity.y.abs() * FRAME);
        }
    }
}

#[test]
fn test_infrared_photons_appear_once_ground_is_lit() {
    let mut model = LayerModelModel::new().unwrap();
    model.layers_mut().start_sunlight();
    run_for(model.layers_mut(), 10.0);

    let photons = model.layers().photons().unwrap();
    assert!(photons.photons().iter().any(|photon| photon.is_infrared()));
    assert!(photons.photons().iter().any(|photon| !photon.is_infrared()));
}

#[test]
fn test_photon_runs_are_reproducible() {
    let run = || {
        let mut model = PhotonsModel::new().unwrap();
        model.concentration_mut().layers_mut().start_sunlight();
        for _ in 0..300 {
            model.step(FRAME);
        }
        model
            .photon_collection()
            .unwrap()
            .photons()
            .iter()
            .map(|photon| (photon.position.x, photon.position.y))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_layer_photon_backlog_stays_bounded() {
    let mut model = LayerModelModel::new().unwrap();
    model.layers_mut().start_sunlight();

    // A fully absorbing layer takes in a few dozen photons a second; with a 0.25 s mean
    // re-emission delay only a handful should be waiting at any time
    let mut peak = 0;
    for second in 1..=180 {
        run_for(model.layers_mut(), 1.0);
        let held = model.layers().atmosphere_layers()[0]
            .core()
            .held_photon_count();
        if second >= 30 {
            peak = peak.max(held);
        }
    }
    println!("Peak layer photon backlog: {peak}");
    assert!(peak < 40, "layer photon backlog reached {peak}");
}
