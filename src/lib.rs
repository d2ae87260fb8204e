// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Monte Carlo photon generation for astronomical X-ray sources.

Sources are described declaratively (position, reference-band flux, spectrum,
optional image, optional light curve or power spectral density). Given an
instrument's effective area, a [`PhotonEngine`] turns these descriptions into a
stream of photons (arrival time, energy, sky position).
 */

pub mod cache;
pub mod config;
pub mod constants;
pub mod coord;
pub mod engine;
mod error;
pub mod extension;
pub mod image;
pub mod io;
pub mod light_curve;
pub mod photon_list;
pub mod psd;
pub mod random;
pub mod response;
pub mod source;
pub mod spectrum;
pub mod units;
pub mod wcs;

// Re-exports.
pub use config::EngineConfig;
pub use coord::RADec;
pub use engine::{Photon, PhotonEngine};
pub use error::SimputError;
pub use extension::{ExtType, ExtensionLoader, FileLoader, MemoryLoader};
pub use random::{RandomSource, SeededRng};
pub use response::{Arf, ArfBin};
pub use source::{Source, SourceCatalog, SourceTable};
