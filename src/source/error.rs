// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{io::DocumentError, units::UnitParseError};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Row {row} does not exist; the catalog has {len} sources")]
    NoSuchRow { row: usize, len: usize },

    #[error("Source {src_id}: the reference band {e_min}-{e_max} keV is invalid")]
    BadBand { src_id: i64, e_min: f64, e_max: f64 },

    #[error("Source {src_id}: the reference flux must be non-negative and finite (got {flux})")]
    BadFlux { src_id: i64, flux: f64 },

    #[error("Source {src_id}: the image scaling factor must be non-zero (got {imgscal})")]
    BadImageScale { src_id: i64, imgscal: f64 },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    UnitParse(#[from] UnitParseError),
}
