// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Power spectral densities, and the Timmer & Koenig (1995) algorithm for
synthesising a light curve with a given PSD.
 */

mod error;

pub use error::SynthesisError;

use log::{debug, trace};
use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::{
    light_curve::{LightCurve, TimeAxis},
    random::{gauss_pair, RandomSource},
};

/// A power spectral density in Miyamoto normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Psd {
    /// \[Hz\]
    pub frequency: Vec<f64>,

    /// \[rms^2/Hz\]
    pub power: Vec<f64>,
}

impl Psd {
    pub fn new(frequency: Vec<f64>, power: Vec<f64>) -> Result<Psd, SynthesisError> {
        if frequency.len() != power.len() {
            return Err(SynthesisError::LengthMismatch {
                frequency: frequency.len(),
                power: power.len(),
            });
        }
        if frequency.is_empty() {
            return Err(SynthesisError::Empty);
        }
        if !(frequency[0] > 0.0) {
            return Err(SynthesisError::BadFrequency(0));
        }
        if let Some(i) = frequency.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(SynthesisError::BadFrequency(i + 1));
        }
        if let Some((index, &power)) = power
            .iter()
            .enumerate()
            .find(|(_, p)| !(p.is_finite() && **p >= 0.0))
        {
            return Err(SynthesisError::BadPower { index, power });
        }
        Ok(Psd { frequency, power })
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    pub fn max_frequency(&self) -> f64 {
        self.frequency[self.len() - 1]
    }

    /// The power per frequency bin (PSD value times bin width) on the PSD's
    /// own frequencies. The first bin extends down to zero frequency.
    pub fn binned_power(&self) -> Vec<f64> {
        let mut prev = 0.0;
        self.frequency
            .iter()
            .zip(self.power.iter())
            .map(|(&f, &p)| {
                let df = f - prev;
                prev = f;
                p * df
            })
            .collect()
    }

    /// The power per frequency bin after linearly interpolating the PSD onto
    /// `n` uniform bins up to the maximum frequency. Bins below the first
    /// tabulated frequency get no power.
    pub fn resampled_power(&self, n: usize) -> Vec<f64> {
        let df = self.max_frequency() / n as f64;
        let mut j = 0;
        (0..n)
            .map(|i| {
                let f = (i + 1) as f64 * df;
                while f > self.frequency[j] && j < self.len() - 1 {
                    j += 1;
                }
                if j == 0 {
                    0.0
                } else {
                    let (f0, f1) = (self.frequency[j - 1], self.frequency[j]);
                    let (p0, p1) = (self.power[j - 1], self.power[j]);
                    (p0 + (f - f0) / (f1 - f0) * (p1 - p0)) * df
                }
            })
            .collect()
    }
}

/// Synthesise a light curve whose power spectrum follows `psd`, starting at
/// `t0` (seconds relative to `mjdref`). The light curve is tagged with
/// `src_id`, because it is a random realisation that belongs to one source
/// only.
///
/// If `grid_len` is given, the PSD is first interpolated onto that many
/// uniform frequency bins; otherwise the PSD's own bins are used. Either way
/// the number of frequency bins must be a power of two, and the light curve
/// has twice as many time bins.
pub fn synthesize(
    psd: &Psd,
    grid_len: Option<usize>,
    t0: f64,
    mjdref: f64,
    src_id: i64,
    rng: &mut dyn RandomSource,
) -> Result<LightCurve, SynthesisError> {
    let power = match grid_len {
        Some(n) => {
            if !n.is_power_of_two() {
                return Err(SynthesisError::NotPowerOfTwo(n));
            }
            psd.resampled_power(n)
        }
        None => {
            if !psd.len().is_power_of_two() {
                return Err(SynthesisError::NotPowerOfTwo(psd.len()));
            }
            psd.binned_power()
        }
    };
    let n_freq = power.len();
    let n_time = 2 * n_freq;
    debug!("Synthesising a light curve with {n_time} bins for source {src_id}");

    let mut spectrum = fourier_coefficients(&power, rng);
    let mut planner = FftPlanner::new();
    let inverse_fft = planner.plan_fft_inverse(n_time);
    inverse_fft.process(&mut spectrum);

    // Scale the series to the RMS that the PSD demands.
    let required_rms = (1.0 + power.iter().sum::<f64>() / 2.0).sqrt();
    let actual_rms = (spectrum.iter().map(|c| c.re * c.re).sum::<f64>() / n_time as f64).sqrt();
    trace!("Required RMS {required_rms}, actual RMS {actual_rms}");
    let scale = if actual_rms > 0.0 {
        required_rms / actual_rms
    } else {
        1.0
    };

    // Negative fluxes have no physical meaning.
    let flux: Vec<f64> = spectrum.iter().map(|c| (c.re * scale).max(0.0)).collect();
    if !flux.iter().any(|&f| f > 0.0) {
        return Err(SynthesisError::ZeroFlux);
    }

    let dt = 1.0 / (2.0 * psd.max_frequency());
    let time = (0..n_time).map(|i| i as f64 * dt).collect();
    let mut lc = LightCurve::new(TimeAxis::NonPeriodic { time }, flux, 1.0, mjdref, t0)?;
    lc.src_id = Some(src_id);
    Ok(lc)
}

/// Draw the Hermitian spectrum of a real series with `2 * power.len()`
/// samples. The zero-frequency term is 1; every other term has Gaussian real
/// and imaginary parts with variance `power / 2`, and the Nyquist term is
/// real.
fn fourier_coefficients(power: &[f64], rng: &mut dyn RandomSource) -> Vec<Complex64> {
    let n = power.len();
    let mut spectrum = vec![Complex64::new(0.0, 0.0); 2 * n];
    spectrum[0] = Complex64::new(1.0, 0.0);

    let (_, nyquist) = gauss_pair(rng);
    spectrum[n] = Complex64::new(nyquist * (power[n - 1] / 2.0).sqrt(), 0.0);

    for k in 1..n {
        let (re, im) = gauss_pair(rng);
        let sigma = (power[k - 1] / 2.0).sqrt();
        let c = Complex64::new(re * sigma, im * sigma);
        spectrum[k] = c;
        spectrum[2 * n - k] = c.conj();
    }
    spectrum
}
