//! Photons: the particle representation of radiation

pub mod collection;
pub mod photon;

pub use collection::{PhotonCollection, PhotonEvent};
pub use photon::{Photon, PhotonId, ShowState};
