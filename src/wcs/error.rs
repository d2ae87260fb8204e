// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum WcsError {
    #[error("Unsupported sky projection '{0}'; supported projections are: {1}")]
    UnsupportedProjection(String, String),

    #[error("CDELT values must be non-zero and finite (got {0}, {1})")]
    BadScale(f64, f64),

    #[error("Image scaling factor must be non-zero (got {0})")]
    BadImageScale(f64),

    #[error("Pixel ({x}, {y}) lies outside the valid region of the {projection} projection")]
    OutsideProjection {
        x: f64,
        y: f64,
        projection: &'static str,
    },
}
