// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SpectrumError {
    #[error("Spectrum '{0}' has no entries")]
    Empty(String),

    #[error("Spectrum '{name}' has {energy} energies but {flux} flux values")]
    LengthMismatch {
        name: String,
        energy: usize,
        flux: usize,
    },

    #[error("Spectrum '{name}': energies must be non-negative and strictly increasing (index {index})")]
    BadEnergy { name: String, index: usize },

    #[error("Spectrum '{name}': photon flux density at index {index} is negative or not finite ({flux})")]
    BadFlux {
        name: String,
        index: usize,
        flux: f64,
    },
}
