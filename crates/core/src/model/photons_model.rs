//! Photons screen model

use super::concentration::ConcentrationModel;
use crate::error::ConfigError;
use crate::observable::Property;
use crate::photons::{Photon, PhotonCollection};

/// Concentration model with a photon collection and a "more photons" toggle
#[derive(Debug)]
pub struct PhotonsModel {
    concentration: ConcentrationModel,
    /// Whether every photon is shown, rather than one in three
    pub more_photons: Property<bool>,
}

impl PhotonsModel {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            concentration: ConcentrationModel::new(true)?,
            more_photons: Property::new(false),
        })
    }

    pub fn concentration(&self) -> &ConcentrationModel {
        &self.concentration
    }

    pub fn concentration_mut(&mut self) -> &mut ConcentrationModel {
        &mut self.concentration
    }

    pub fn photon_collection(&self) -> Option<&PhotonCollection> {
        self.concentration.layers().photons()
    }

    pub fn set_more_photons(&mut self, more_photons: bool) {
        if let Some(photons) = self.concentration.layers_mut().photons_mut() {
            photons.set_more_photons(more_photons);
        }
        self.more_photons.set(more_photons);
    }

    /// Photons a view should draw under the current "more photons" setting
    pub fn shown_photons(&self) -> impl Iterator<Item = &Photon> {
        self.photon_collection()
            .into_iter()
            .flat_map(PhotonCollection::shown_photons)
    }

    pub fn step(&mut self, dt: f64) {
        self.concentration.step(dt);
    }

    pub fn reset(&mut self) {
        self.concentration.reset();
        self.more_photons.reset();
    }
}
