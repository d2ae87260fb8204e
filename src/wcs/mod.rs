// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Pixel to sky coordinate transforms for images (a small subset of the FITS
world coordinate system conventions).

Only zenithal projections with the native pole at the reference point are
handled, and there is no PC/CD matrix; pixel axes are aligned with the sky
axes.
 */

mod error;

pub use error::WcsError;

use std::str::FromStr;

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::{
    coord::RADec,
    units::{AngleUnit, Unit},
};

/// Supported sky projections, named by their FITS CTYPE suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Projection {
    /// Gnomonic.
    #[strum(serialize = "TAN")]
    Tan,

    /// Orthographic.
    #[strum(serialize = "SIN")]
    Sin,
}

impl Projection {
    /// Parse a projection from a CTYPE value like "RA---TAN" or just "TAN".
    pub fn from_ctype(ctype: &str) -> Result<Projection, WcsError> {
        let code = ctype.trim().rsplit('-').next().unwrap_or("");
        Projection::from_str(code).map_err(|_| {
            WcsError::UnsupportedProjection(
                ctype.to_string(),
                Projection::iter()
                    .map(|p| -> &'static str { p.into() })
                    .join(", "),
            )
        })
    }
}

/// The world coordinate system of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Wcs {
    /// Reference pixel (1-based, FITS convention).
    pub crpix: [f64; 2],

    /// Sky coordinates of the reference pixel, in units of `cunit`.
    pub crval: [f64; 2],

    /// Pixel size, in units of `cunit`.
    pub cdelt: [f64; 2],

    pub cunit: [AngleUnit; 2],

    pub projection: Projection,
}

impl Wcs {
    pub fn new(
        crpix: [f64; 2],
        crval: [f64; 2],
        cdelt: [f64; 2],
        cunit: [AngleUnit; 2],
        projection: Projection,
    ) -> Result<Wcs, WcsError> {
        if !cdelt.iter().all(|d| d.is_finite() && *d != 0.0) {
            return Err(WcsError::BadScale(cdelt[0], cdelt[1]));
        }
        Ok(Wcs {
            crpix,
            crval,
            cdelt,
            cunit,
            projection,
        })
    }

    /// A copy of this WCS with the reference pixel moved to `position` and
    /// the pixel size divided by `imgscal`. This is how an image is placed on
    /// the sky for a particular source.
    pub fn placed_at(&self, position: RADec, imgscal: f64) -> Result<Wcs, WcsError> {
        if !(imgscal != 0.0 && imgscal.is_finite()) {
            return Err(WcsError::BadImageScale(imgscal));
        }
        let mut wcs = self.clone();
        wcs.crval = [
            position.ra / self.cunit[0].factor(),
            position.dec / self.cunit[1].factor(),
        ];
        wcs.cdelt = [self.cdelt[0] / imgscal, self.cdelt[1] / imgscal];
        Ok(wcs)
    }

    /// Convert (1-based) pixel coordinates into sky coordinates. The right
    /// ascension is wrapped into [0, 2pi).
    pub fn pixel_to_sky(&self, x: f64, y: f64) -> Result<RADec, WcsError> {
        let (f1, f2) = (self.cunit[0].factor(), self.cunit[1].factor());
        // Standard coordinates in the tangent plane [radians].
        let xi = self.cdelt[0] * (x - self.crpix[0]) * f1;
        let eta = self.cdelt[1] * (y - self.crpix[1]) * f2;
        let ra0 = self.crval[0] * f1;
        let dec0 = self.crval[1] * f2;

        let rho = xi.hypot(eta);
        if rho == 0.0 {
            return Ok(RADec::new(ra0, dec0).normalised());
        }
        let c = match self.projection {
            Projection::Tan => rho.atan(),
            Projection::Sin => {
                if rho > 1.0 {
                    return Err(WcsError::OutsideProjection {
                        x,
                        y,
                        projection: self.projection.into(),
                    });
                }
                rho.asin()
            }
        };
        let (s_c, c_c) = c.sin_cos();
        let (s_dec0, c_dec0) = dec0.sin_cos();
        let dec = (c_c * s_dec0 + eta * s_c * c_dec0 / rho).clamp(-1.0, 1.0).asin();
        let ra = ra0 + (xi * s_c).atan2(rho * c_dec0 * c_c - eta * s_dec0 * s_c);
        Ok(RADec::new(ra, dec).normalised())
    }
}
