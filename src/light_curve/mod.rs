// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Light curves, the time indexer that maps a query time onto a light-curve bin,
and the Klein & Roberts sampler that draws photon arrival times from the
piecewise-linear rate of a light curve.

All times handed to and returned from this module are in seconds relative to
the caller's MJDREF (in days).
 */

mod error;

pub use error::LightCurveError;

use crate::constants::{DAYSEC, KR_LINEAR_THRESHOLD};

/// The time axis of a light curve. Either a list of times or a list of phases
/// of a periodic signal.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeAxis {
    NonPeriodic {
        /// \[s\] relative to the light curve's `timezero`.
        time: Vec<f64>,
    },

    Periodic {
        /// Phase values, usually covering one full period.
        phase: Vec<f64>,
        /// The phase at the light curve's `timezero`.
        phase0: f64,
        /// \[s\]
        period: f64,
    },
}

impl TimeAxis {
    pub fn len(&self) -> usize {
        match self {
            TimeAxis::NonPeriodic { time } => time.len(),
            TimeAxis::Periodic { phase, .. } => phase.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, TimeAxis::Periodic { .. })
    }

    /// The duration of the interval between entries `k` and `k + 1` \[s\].
    fn step(&self, k: usize) -> f64 {
        match self {
            TimeAxis::NonPeriodic { time } => time[k + 1] - time[k],
            TimeAxis::Periodic { phase, period, .. } => (phase[k + 1] - phase[k]) * period,
        }
    }

    fn validate(&self) -> Result<(), LightCurveError> {
        let (values, axis) = match self {
            TimeAxis::NonPeriodic { time } => (time, "time"),
            TimeAxis::Periodic { phase, period, .. } => {
                if !(*period > 0.0) {
                    return Err(LightCurveError::InvalidPeriod(*period));
                }
                (phase, "phase")
            }
        };
        if values.len() < 2 {
            return Err(LightCurveError::TooShort(values.len()));
        }
        if let Some(i) = values.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(LightCurveError::NotIncreasing { axis, index: i + 1 });
        }
        Ok(())
    }
}

/// A time axis anchored to an epoch. Shared by [`LightCurve`] and
/// [`KrLightCurve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub axis: TimeAxis,

    /// \[days\]
    pub mjdref: f64,

    /// \[s\]
    pub timezero: f64,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    /// The time of entry `k` after `nperiods` full periods, relative to
    /// `mjdref` \[s\]. `nperiods` is ignored for non-periodic curves.
    pub fn time_at(&self, k: usize, nperiods: i64, mjdref: f64) -> f64 {
        let offset = self.timezero + (self.mjdref - mjdref) * DAYSEC;
        match &self.axis {
            TimeAxis::NonPeriodic { time } => time[k] + offset,
            TimeAxis::Periodic {
                phase,
                phase0,
                period,
            } => (phase[k] - phase0 + nperiods as f64) * period + offset,
        }
    }

    /// The time of the last entry, without any period added.
    pub fn end_time(&self, mjdref: f64) -> f64 {
        self.time_at(self.len() - 1, 0, mjdref)
    }

    /// Find the bin containing `time`, i.e. the smallest index `k` with
    /// `time_at(k + 1) >= time`, along with the number of full periods
    /// elapsed (always zero for non-periodic curves).
    pub fn bin_at(&self, time: f64, mjdref: f64) -> Result<(usize, i64), LightCurveError> {
        let nperiods = match &self.axis {
            TimeAxis::NonPeriodic { .. } => {
                let start = self.time_at(0, 0, mjdref);
                let end = self.end_time(mjdref);
                if time < start || time > end {
                    return Err(LightCurveError::TimeOutOfRange { time, start, end });
                }
                0
            }

            TimeAxis::Periodic { period, .. } => {
                let dt = time - self.time_at(0, 0, mjdref);
                (dt / period).floor() as i64
            }
        };

        let mut lower = 0;
        let mut upper = self.len() - 2;
        while upper > lower {
            let mid = (lower + upper) / 2;
            if self.time_at(mid + 1, nperiods, mjdref) < time {
                lower = mid + 1;
            } else {
                upper = mid;
            }
        }
        Ok((lower, nperiods))
    }
}

/// A light curve as tabulated in a timing extension, or as synthesised from a
/// PSD.
#[derive(Debug, Clone, PartialEq)]
pub struct LightCurve {
    pub timeline: Timeline,

    /// Flux values in units of `fluxscal`.
    pub flux: Vec<f64>,

    pub fluxscal: f64,

    /// Optional per-bin references to the spectrum in effect during each bin.
    pub spectrum: Option<Vec<String>>,

    /// Optional per-bin references to the image in effect during each bin.
    pub image: Option<Vec<String>>,

    /// If this light curve was synthesised for a particular source, that
    /// source's ID. Such light curves must never be handed to other sources.
    pub src_id: Option<i64>,
}

impl LightCurve {
    /// Create a new light curve, checking that its contents are physical.
    pub fn new(
        axis: TimeAxis,
        flux: Vec<f64>,
        fluxscal: f64,
        mjdref: f64,
        timezero: f64,
    ) -> Result<LightCurve, LightCurveError> {
        axis.validate()?;
        if flux.len() != axis.len() {
            return Err(LightCurveError::LengthMismatch {
                column: "FLUX",
                got: flux.len(),
                expected: axis.len(),
            });
        }
        if let Some((index, &flux)) = flux.iter().enumerate().find(|(_, f)| !(**f >= 0.0)) {
            return Err(LightCurveError::NegativeFlux { index, flux });
        }
        if !(fluxscal > 0.0) {
            return Err(LightCurveError::InvalidFluxScale(fluxscal));
        }
        if axis.is_periodic() && flux.iter().all(|f| *f == 0.0) {
            return Err(LightCurveError::PeriodicWithoutFlux);
        }

        Ok(LightCurve {
            timeline: Timeline {
                axis,
                mjdref,
                timezero,
            },
            flux,
            fluxscal,
            spectrum: None,
            image: None,
            src_id: None,
        })
    }

    /// Attach a per-bin spectrum reference column.
    pub fn with_spectrum_column(mut self, refs: Vec<String>) -> Result<Self, LightCurveError> {
        self.check_column_len("SPECTRUM", refs.len())?;
        self.spectrum = Some(refs);
        Ok(self)
    }

    /// Attach a per-bin image reference column.
    pub fn with_image_column(mut self, refs: Vec<String>) -> Result<Self, LightCurveError> {
        self.check_column_len("IMAGE", refs.len())?;
        self.image = Some(refs);
        Ok(self)
    }

    fn check_column_len(&self, column: &'static str, got: usize) -> Result<(), LightCurveError> {
        if got == self.len() {
            Ok(())
        } else {
            Err(LightCurveError::LengthMismatch {
                column,
                got,
                expected: self.len(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}

/// The per-bin linear model of a light curve that the Klein & Roberts
/// sampler works on: within bin `k` the rate is `(a[k] * t + b[k]) * avg_rate`
/// with `t` measured from the start of the bin.
#[derive(Debug, Clone, PartialEq)]
pub struct KrLightCurve {
    pub timeline: Timeline,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
    pub src_id: Option<i64>,
}

impl KrLightCurve {
    pub fn from_light_curve(lc: &LightCurve) -> KrLightCurve {
        let n = lc.len();
        let mut a = Vec::with_capacity(n);
        let mut b = Vec::with_capacity(n);
        for k in 0..n - 1 {
            let dt = lc.timeline.axis.step(k);
            a.push((lc.flux[k + 1] - lc.flux[k]) / dt / lc.fluxscal);
            b.push(lc.flux[k] / lc.fluxscal);
        }
        a.push(0.0);
        b.push(lc.flux[n - 1] / lc.fluxscal);

        KrLightCurve {
            timeline: lc.timeline.clone(),
            a,
            b,
            src_id: lc.src_id,
        }
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Can this light curve be regenerated once a sampled time runs past its
    /// end?
    pub fn is_extendable(&self) -> bool {
        self.src_id.is_some()
    }
}

/// The outcome of [`draw_time`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KrStep {
    /// The time of the next photon.
    Found(f64),

    /// The light curve ended before an event occurred. Sampling may continue
    /// on a light curve that starts at `resume_time`, using `residual_u` as
    /// the uniform variate.
    Exhausted { resume_time: f64, residual_u: f64 },
}

/// Draw the time of the next event after `prev_time` from the inhomogeneous
/// Poisson process described by `lc` and `avg_rate`, inverting the cumulative
/// distribution at `u` (Klein & Roberts 1984).
pub fn draw_time(
    lc: &KrLightCurve,
    prev_time: f64,
    mjdref: f64,
    avg_rate: f64,
    u: f64,
) -> Result<KrStep, LightCurveError> {
    let tl = &lc.timeline;
    let last = lc.len() - 1;
    let (mut k, mut nperiods) = tl.bin_at(prev_time, mjdref)?;
    let mut prev_time = prev_time;
    let mut u = u;

    while k < last {
        let start = tl.time_at(k, nperiods, mjdref);
        let t = prev_time - start;
        let stepwidth = tl.time_at(k + 1, nperiods, mjdref) - start;
        let (a, b) = (lc.a[k], lc.b[k]);

        // Probability for the next event to happen within the rest of this
        // bin.
        let exponent =
            (-a / 2.0 * (stepwidth * stepwidth - t * t) - b * (stepwidth - t)) * avg_rate;
        let uk = 1.0 - exponent.exp();

        if u <= uk && uk > 0.0 {
            let ln = (1.0 - u).ln();
            let time = if (a * stepwidth).abs() > (b * KR_LINEAR_THRESHOLD).abs() {
                let discriminant =
                    b * b + (a * t).powi(2) + 2.0 * a * b * t - 2.0 * a * ln / avg_rate;
                start + (-b + discriminant.sqrt()) / a
            } else {
                // The rate is approximately constant within this bin.
                prev_time - ln / (b * avg_rate)
            };
            return Ok(KrStep::Found(time));
        }

        u = (u - uk) / (1.0 - uk);
        k += 1;
        if k >= last && tl.axis.is_periodic() {
            k = 0;
            nperiods += 1;
        }
        prev_time = tl.time_at(k, nperiods, mjdref);
    }

    Ok(KrStep::Exhausted {
        resume_time: prev_time,
        residual_u: u,
    })
}
