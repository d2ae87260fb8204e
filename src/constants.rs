// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Internally, angles are always in
radians, energies in keV, times in seconds, frequencies in Hz and energy fluxes
in erg/s/cm^2.
 */

pub use std::f64::consts::{PI, TAU};

/// Energy of one keV in erg.
pub const KEV2ERG: f64 = 1.602_176_634e-9;

/// Seconds per day (86400)
pub const DAYSEC: f64 = 86400.0;

/// The Klein & Roberts sampler treats the rate in a light-curve bin as constant
/// when `|a * stepwidth| <= |b| * KR_LINEAR_THRESHOLD`.
pub const KR_LINEAR_THRESHOLD: f64 = 1e-6;

// Cache capacities.

/// Maximum number of sources kept in memory.
pub const MAX_SOURCES: usize = 1_000_000;
/// Maximum number of mission-independent spectra kept in memory.
pub const MAX_MIDP_SPECTRA: usize = 300;
/// Maximum number of instrument-weighted spectral distributions kept in memory.
pub const MAX_SPECTRAL_DISTRIBUTIONS: usize = 30_000;
/// Maximum number of light curves kept in memory.
pub const MAX_LIGHT_CURVES: usize = 1_000;
/// Maximum number of Klein & Roberts light curves kept in memory.
pub const MAX_KR_LIGHT_CURVES: usize = 10;
/// Maximum number of images kept in memory.
pub const MAX_IMAGES: usize = 200;
/// Maximum number of power spectral densities kept in memory.
pub const MAX_PSDS: usize = 200;
/// Maximum number of photon lists kept open.
pub const MAX_PHOTON_LISTS: usize = 200;

/// The number of frequency bins a PSD is interpolated onto before a light
/// curve is synthesised from it. The synthesised light curve has twice as many
/// time bins. Must be a power of two.
pub const DEFAULT_PSD_LEN: usize = 1 << 16;
