// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all photon-generation errors. This should be the *only*
//! error enum that callers of the engine need to handle.

use thiserror::Error;

use crate::{
    cache::CacheError, config::ConfigError, extension::ReadExtensionError, image::ImageError,
    light_curve::LightCurveError, photon_list::PhotonListError, psd::SynthesisError,
    response::ResponseError, source::SourceError, spectrum::SpectrumError, units::UnitParseError,
    wcs::WcsError,
};

/// Every failure that makes a request impossible to serve. Running out of a
/// light curve is *not* an error; photon-producing functions signal it with
/// `Ok(None)`.
#[derive(Error, Debug)]
pub enum SimputError {
    #[error("No instrument response (ARF) has been set")]
    NoResponse,

    #[error("Source {src_id}: the flux in the reference band {e_min}-{e_max} keV is zero; cannot normalise the photon rate")]
    ZeroReferenceFlux { src_id: i64, e_min: f64, e_max: f64 },

    #[error("Source {src_id}: could not find a valid spectrum (reference: '{reference}')")]
    NoSpectrum { src_id: i64, reference: String },

    #[error("Reference '{reference}' was expected to be {expected}, but it is {found}")]
    UnexpectedExtension {
        reference: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Photon lists are currently not supported as timing extensions ('{0}')")]
    PhotonListTiming(String),

    #[error("Light curve '{reference}' has a blank entry in its {column} column")]
    BlankColumnEntry {
        reference: String,
        column: &'static str,
    },

    #[error("{0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    ReadExtension(#[from] ReadExtensionError),

    #[error("{0}")]
    Image(#[from] ImageError),

    #[error("{0}")]
    LightCurve(#[from] LightCurveError),

    #[error("{0}")]
    PhotonList(#[from] PhotonListError),

    #[error("{0}")]
    Synthesis(#[from] SynthesisError),

    #[error("{0}")]
    Response(#[from] ResponseError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Spectrum(#[from] SpectrumError),

    #[error("{0}")]
    UnitParse(#[from] UnitParseError),

    #[error("{0}")]
    Wcs(#[from] WcsError),
}
