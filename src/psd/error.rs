// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with power spectral densities and the light curves
//! synthesised from them.

use thiserror::Error;

use crate::light_curve::LightCurveError;

#[derive(Error, Debug, PartialEq)]
pub enum SynthesisError {
    #[error("A PSD needs at least one entry")]
    Empty,

    #[error("The PSD has {frequency} frequencies but {power} power values")]
    LengthMismatch { frequency: usize, power: usize },

    #[error("PSD frequencies must be positive and strictly increasing (index {0})")]
    BadFrequency(usize),

    #[error("PSD power at index {index} is negative or not finite ({power})")]
    BadPower { index: usize, power: f64 },

    #[error("Cannot synthesise a light curve from {0} frequency bins; the number of bins must be a power of two")]
    NotPowerOfTwo(usize),

    #[error("The light curve synthesised from the PSD has zero flux everywhere")]
    ZeroFlux,

    #[error("{0}")]
    LightCurve(#[from] LightCurveError),
}
