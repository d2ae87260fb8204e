// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{io::DocumentError, units::UnitParseError};

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("The instrument response has no energy bins")]
    Empty,

    #[error("ARF bin {index} has invalid energy bounds ({e_low} keV to {e_high} keV)")]
    BadBounds { index: usize, e_low: f64, e_high: f64 },

    #[error("ARF bins must be sorted by energy without overlaps (bin {0} starts before the previous one ends)")]
    NotSorted(usize),

    #[error("ARF bin {index} has a negative or non-finite effective area ({area} cm^2)")]
    BadArea { index: usize, area: f64 },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    UnitParse(#[from] UnitParseError),
}
