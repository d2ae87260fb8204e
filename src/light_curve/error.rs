// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with light curves.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum LightCurveError {
    #[error("A light curve needs at least two entries, but this one has {0}")]
    TooShort(usize),

    #[error("The light curve's {column} column has {got} entries, but its time axis has {expected}")]
    LengthMismatch {
        column: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("Light curve flux at index {index} is negative ({flux})")]
    NegativeFlux { index: usize, flux: f64 },

    #[error("Light curve {axis} values are not strictly increasing at index {index}")]
    NotIncreasing { axis: &'static str, index: usize },

    #[error("Light curve FLUXSCAL must be positive, but it is {0}")]
    InvalidFluxScale(f64),

    #[error("A periodic light curve needs a positive period, but it is {0} s")]
    InvalidPeriod(f64),

    #[error("A periodic light curve must have non-zero flux somewhere, otherwise no photon would ever be produced")]
    PeriodicWithoutFlux,

    #[error("Requested time ({time} s) is outside the interval covered by the light curve ({start} s to {end} s)")]
    TimeOutOfRange { time: f64, start: f64, end: f64 },
}
