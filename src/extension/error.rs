// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{
    image::ImageError, io::DocumentError, light_curve::LightCurveError, psd::SynthesisError,
    spectrum::SpectrumError, units::UnitParseError, wcs::WcsError,
};

#[derive(Error, Debug)]
pub enum ReadExtensionError {
    #[error("Could not find an extension for reference '{0}'")]
    NotFound(String),

    #[error("'{path}' contains {count} extensions; the reference must name one of them, e.g. '{path}[name]'")]
    Ambiguous { path: String, count: usize },

    #[error("Light curve '{0}' must have exactly one of a 'time' or a 'phase' column")]
    BadTimeAxis(String),

    #[error("Light curve '{0}' has a 'phase' column, but no 'period'")]
    MissingPeriod(String),

    #[error("Extension '{reference}': the {column} column has {got} entries, but {expected} were expected")]
    LengthMismatch {
        reference: String,
        column: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("Image '{reference}': CTYPE1 and CTYPE2 use different projections ('{ctype1}', '{ctype2}')")]
    MixedProjection {
        reference: String,
        ctype1: String,
        ctype2: String,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    UnitParse(#[from] UnitParseError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),

    #[error(transparent)]
    LightCurve(#[from] LightCurveError),

    #[error(transparent)]
    Psd(#[from] SynthesisError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Wcs(#[from] WcsError),
}
