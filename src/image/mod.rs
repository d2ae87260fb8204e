// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Source images, and drawing photon positions from them.

mod error;

pub use error::ImageError;

use log::trace;
use ndarray::prelude::*;

use crate::{
    constants::{PI, TAU},
    coord::RADec,
    random::RandomSource,
    wcs::Wcs,
};

/// An image that describes the surface brightness of extended sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SimputImage {
    pub name: String,

    /// The cumulative pixel distribution, indexed `[x, y]` (0-based). Pixels
    /// are accumulated with `y` varying fastest, so `dist[[x, naxis2 - 1]]`
    /// grows with `x` and the last element holds the total.
    dist: Array2<f64>,

    pub fluxscal: f64,

    pub wcs: Wcs,
}

impl SimputImage {
    /// Create a new image from pixel values indexed `[x, y]`.
    pub fn new(
        name: String,
        pixels: ArrayView2<f64>,
        fluxscal: f64,
        wcs: Wcs,
    ) -> Result<SimputImage, ImageError> {
        if pixels.is_empty() {
            return Err(ImageError::Empty(name));
        }

        let mut dist = Array2::zeros(pixels.dim());
        let mut total = 0.0;
        for ((x, y), &value) in pixels.indexed_iter() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ImageError::BadPixel { name, x, y, value });
            }
            total += value;
            dist[[x, y]] = total;
        }
        if !(total > 0.0) {
            return Err(ImageError::NoFlux(name));
        }

        Ok(SimputImage {
            name,
            dist,
            fluxscal,
            wcs,
        })
    }

    /// Create a new image from pixel values stored row by row (all `x` values
    /// for `y = 0` first, as in a FITS file).
    pub fn from_rows(
        name: String,
        naxis1: usize,
        naxis2: usize,
        values: Vec<f64>,
        fluxscal: f64,
        wcs: Wcs,
    ) -> Result<SimputImage, ImageError> {
        let got = values.len();
        let pixels = Array2::from_shape_vec((naxis2, naxis1), values).map_err(|_| {
            ImageError::ShapeMismatch {
                name: name.clone(),
                got,
                naxis1,
                naxis2,
            }
        })?;
        SimputImage::new(name, pixels.t(), fluxscal, wcs)
    }

    pub fn naxis1(&self) -> usize {
        self.dist.len_of(Axis(0))
    }

    pub fn naxis2(&self) -> usize {
        self.dist.len_of(Axis(1))
    }

    pub fn dist(&self) -> ArrayView2<f64> {
        self.dist.view()
    }

    /// The sum of all pixel values.
    pub fn total(&self) -> f64 {
        self.dist[[self.naxis1() - 1, self.naxis2() - 1]]
    }

    /// Find the (0-based) pixel holding the fraction `u` of the cumulative
    /// distribution: first the `x` column, then `y` within it.
    pub fn sample_pixel(&self, u: f64) -> (usize, usize) {
        let target = u * self.total();
        let ymax = self.naxis2() - 1;

        let mut xl = 0;
        let mut high = self.naxis1() - 1;
        while high > xl {
            let mid = (xl + high) / 2;
            if self.dist[[mid, ymax]] < target {
                xl = mid + 1;
            } else {
                high = mid;
            }
        }

        let mut yl = 0;
        let mut high = ymax;
        while high > yl {
            let mid = (yl + high) / 2;
            if self.dist[[xl, mid]] < target {
                yl = mid + 1;
            } else {
                high = mid;
            }
        }
        (xl, yl)
    }

    /// Draw a photon position for a source at `position` that uses this
    /// image, rotated by `imgrota` \[rad\] about the reference pixel and
    /// scaled by `imgscal`.
    pub fn sample_position(
        &self,
        position: RADec,
        imgrota: f64,
        imgscal: f64,
        rng: &mut dyn RandomSource,
    ) -> Result<RADec, ImageError> {
        let wcs = self.wcs.placed_at(position, imgscal)?;
        let (xl, yl) = self.sample_pixel(rng.uniform());

        // FITS pixel centres are at integer positions counting from 1.
        let xd = xl as f64 + 0.5 + rng.uniform();
        let yd = yl as f64 + 0.5 + rng.uniform();

        let (s, c) = imgrota.sin_cos();
        let dx = xd - wcs.crpix[0];
        let dy = yd - wcs.crpix[1];
        let x = dx * c + dy * s + wcs.crpix[0];
        let y = -dx * s + dy * c + wcs.crpix[1];
        trace!("Image '{}': pixel ({xl}, {yl}) -> ({x}, {y})", self.name);

        Ok(wcs.pixel_to_sky(x, y)?)
    }

    /// The largest angular distance of any image corner from the reference
    /// point, after scaling by `imgscal` \[rad\].
    pub fn extension(&self, imgscal: f64) -> Result<f64, ImageError> {
        let wcs = self.wcs.placed_at(RADec::new(0.0, 0.0), imgscal)?;
        let x_edges = [0.5, self.naxis1() as f64 + 0.5];
        let y_edges = [0.5, self.naxis2() as f64 + 0.5];
        let mut max_ext: f64 = 0.0;
        for x in x_edges {
            for y in y_edges {
                let corner = wcs.pixel_to_sky(x, y)?;
                let mut ra = corner.ra;
                if ra > PI {
                    ra -= TAU;
                }
                max_ext = max_ext.max(ra.hypot(corner.dec));
            }
        }
        Ok(max_ext)
    }
}
