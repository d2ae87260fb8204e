// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::wcs::WcsError;

#[derive(Error, Debug, PartialEq)]
pub enum ImageError {
    #[error("Image '{0}' has no pixels")]
    Empty(String),

    #[error("Image '{name}': pixel ({x}, {y}) is negative or not finite ({value})")]
    BadPixel {
        name: String,
        x: usize,
        y: usize,
        value: f64,
    },

    #[error("Image '{0}' has no flux in any pixel")]
    NoFlux(String),

    #[error("Image '{name}' has {got} pixel values, but its dimensions are {naxis1}x{naxis2}")]
    ShapeMismatch {
        name: String,
        got: usize,
        naxis1: usize,
        naxis2: usize,
    },

    #[error("{0}")]
    Wcs(#[from] WcsError),
}
