// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Handle (right ascension, declination) coordinates.
 */

use serde::{Deserialize, Serialize};

use crate::constants::TAU;

/// A struct containing a Right Ascension and Declination. All units are in
/// radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RADec {
    /// Right ascension [radians]
    pub ra: f64,
    /// Declination [radians]
    pub dec: f64,
}

impl RADec {
    /// Make a new `RADec` struct from values in radians.
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Make a new `RADec` struct from values in degrees.
    pub fn new_degrees(ra: f64, dec: f64) -> Self {
        Self::new(ra.to_radians(), dec.to_radians())
    }

    /// Return a copy of these coordinates with the right ascension wrapped into
    /// [0, 2pi).
    pub fn normalised(self) -> Self {
        let mut ra = self.ra.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs.
        if ra >= TAU {
            ra = 0.0;
        }
        Self { ra, dec: self.dec }
    }

    /// Calculate the angular distance between two sets of coordinates
    /// (radians), using the haversine formula.
    pub fn separation(&self, b: &Self) -> f64 {
        let s_ddec = ((b.dec - self.dec) / 2.0).sin();
        let s_dra = ((b.ra - self.ra) / 2.0).sin();
        let h = s_ddec * s_ddec + self.dec.cos() * b.dec.cos() * s_dra * s_dra;
        2.0 * h.sqrt().min(1.0).asin()
    }
}

impl std::fmt::Display for RADec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}°, {}°)", self.ra.to_degrees(), self.dec.to_degrees())
    }
}
