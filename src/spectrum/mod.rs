// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Mission-independent spectra, and the instrument-weighted spectral
distributions derived from them.
 */

mod error;

pub use error::SpectrumError;

use log::{trace, warn};

use crate::{constants::KEV2ERG, random::RandomSource, response::Arf};

/// A photon spectrum that doesn't depend on any instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionIndependentSpectrum {
    pub name: String,

    /// \[keV\]
    pub energy: Vec<f64>,

    /// Photon flux density \[photons/s/cm^2/keV\]
    pub pflux: Vec<f64>,
}

impl MissionIndependentSpectrum {
    pub fn new(
        name: String,
        energy: Vec<f64>,
        pflux: Vec<f64>,
    ) -> Result<MissionIndependentSpectrum, SpectrumError> {
        if energy.len() != pflux.len() {
            return Err(SpectrumError::LengthMismatch {
                name,
                energy: energy.len(),
                flux: pflux.len(),
            });
        }
        if energy.is_empty() {
            return Err(SpectrumError::Empty(name));
        }
        if !(energy[0] >= 0.0) {
            return Err(SpectrumError::BadEnergy { name, index: 0 });
        }
        if let Some(i) = energy.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(SpectrumError::BadEnergy { name, index: i + 1 });
        }
        if let Some((index, &flux)) = pflux
            .iter()
            .enumerate()
            .find(|(_, f)| !(f.is_finite() && **f >= 0.0))
        {
            return Err(SpectrumError::BadFlux { name, index, flux });
        }

        Ok(MissionIndependentSpectrum {
            name,
            energy,
            pflux,
        })
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    /// The energy range represented by tabulated point `i` \[keV\]. Bins
    /// extend halfway to the neighbouring points; the outermost points are
    /// their own outer edges.
    pub fn bounds(&self, i: usize) -> (f64, f64) {
        let e = &self.energy;
        let low = if i > 0 { 0.5 * (e[i] + e[i - 1]) } else { e[i] };
        let high = if i + 1 < e.len() {
            0.5 * (e[i + 1] + e[i])
        } else {
            e[i]
        };
        (low, high)
    }

    /// The energy flux in the band `e_min` to `e_max` \[erg/s/cm^2\].
    pub fn band_flux(&self, e_min: f64, e_max: f64) -> f64 {
        let flux: f64 = (0..self.len())
            .filter_map(|i| {
                let (low, high) = self.bounds(i);
                if e_min < high && e_max > low {
                    let width = high.min(e_max) - low.max(e_min);
                    Some(width * self.pflux[i] * self.energy[i])
                } else {
                    None
                }
            })
            .sum();
        flux * KEV2ERG
    }
}

/// A spectrum convolved with an instrument's effective area, as a cumulative
/// distribution over the ARF's energy bins.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralDistribution {
    /// Cumulative photon rate up to and including each ARF bin
    /// \[photons/s\].
    pub distribution: Vec<f64>,
}

impl SpectralDistribution {
    /// Convolve `spectrum` with `arf`. Parts of the ARF not covered by the
    /// spectrum contribute nothing, and a warning is emitted.
    pub fn build(spectrum: &MissionIndependentSpectrum, arf: &Arf) -> SpectralDistribution {
        let n = spectrum.len();
        let mut distribution = Vec::with_capacity(arf.len());
        let mut j = 0;
        let mut incomplete = false;
        let mut total = 0.0;

        for bin in arf.bins() {
            let mut sum = 0.0;
            let mut lo = bin.e_low;
            loop {
                // The first spectral bin reaching above `lo`.
                while j < n && spectrum.bounds(j).1 <= lo {
                    j += 1;
                }
                if j == n {
                    incomplete = true;
                    break;
                }

                let (spec_low, spec_high) = spectrum.bounds(j);
                if spec_low > lo {
                    // Only possible below the first tabulated energy.
                    incomplete = true;
                    if spec_low >= bin.e_high {
                        break;
                    }
                    lo = spec_low;
                }

                let hi = spec_high.min(bin.e_high);
                sum += (hi - lo) * bin.area * spectrum.pflux[j];
                lo = hi;
                if lo >= bin.e_high {
                    break;
                }
            }

            total += sum;
            distribution.push(total);
        }

        if incomplete {
            warn!(
                "The spectrum '{}' does not cover the full energy range of the ARF",
                spectrum.name
            );
        }
        trace!(
            "Spectral distribution for '{}' has total {total}",
            spectrum.name
        );

        SpectralDistribution { distribution }
    }

    /// The total photon rate \[photons/s\].
    pub fn total(&self) -> f64 {
        self.distribution.last().copied().unwrap_or(0.0)
    }

    /// The smallest bin index `k` with `distribution[k] >= u * total`.
    pub fn sample_bin(&self, u: f64) -> usize {
        let target = u * self.total();
        self.distribution
            .partition_point(|&d| d < target)
            .min(self.distribution.len().saturating_sub(1))
    }

    /// Draw a photon energy \[keV\]: an ARF bin according to this
    /// distribution, then uniformly within the bin.
    pub fn sample_energy(&self, arf: &Arf, rng: &mut dyn RandomSource) -> f64 {
        let k = self.sample_bin(rng.uniform());
        let bin = arf.bins()[k];
        bin.e_low + rng.uniform() * (bin.e_high - bin.e_low)
    }
}
