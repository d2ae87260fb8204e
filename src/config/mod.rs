// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Engine configuration: how many of each kind of extension may be held in
//! memory, how PSDs are turned into light curves and how the random number
//! generator is seeded.

mod error;

pub use error::ConfigError;

use std::{fs::File, io::Read, path::Path, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumString, IntoStaticStr};

use crate::constants::*;

pub const CONFIG_FILE_TYPES_COMMA_SEPARATED: &str = "toml, yaml, yml, json";

#[derive(Debug, Clone, Copy, EnumString, IntoStaticStr)]
enum ConfigFileType {
    #[strum(serialize = "toml")]
    Toml,

    #[strum(serialize = "yaml", serialize = "yml")]
    Yaml,

    #[strum(serialize = "json")]
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_sources: usize,
    pub max_midp_spectra: usize,
    pub max_spectral_distributions: usize,
    pub max_light_curves: usize,
    pub max_kr_light_curves: usize,
    pub max_images: usize,
    pub max_psds: usize,
    pub max_photon_lists: usize,

    /// The number of frequency bins a PSD is interpolated onto before
    /// synthesis. If this is `None`, the PSD's own bins are used.
    pub psd_len: Option<usize>,

    /// Seed for the default random number generator. If this is `None`, the
    /// generator is seeded from the clock.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_sources: MAX_SOURCES,
            max_midp_spectra: MAX_MIDP_SPECTRA,
            max_spectral_distributions: MAX_SPECTRAL_DISTRIBUTIONS,
            max_light_curves: MAX_LIGHT_CURVES,
            max_kr_light_curves: MAX_KR_LIGHT_CURVES,
            max_images: MAX_IMAGES,
            max_psds: MAX_PSDS,
            max_photon_lists: MAX_PHOTON_LISTS,
            psd_len: Some(DEFAULT_PSD_LEN),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, capacity) in [
            ("source", self.max_sources),
            ("spectrum", self.max_midp_spectra),
            ("spectral distribution", self.max_spectral_distributions),
            ("light curve", self.max_light_curves),
            ("K&R light curve", self.max_kr_light_curves),
            ("image", self.max_images),
            ("PSD", self.max_psds),
            ("photon list", self.max_photon_lists),
        ] {
            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity(name));
            }
        }
        match self.psd_len {
            Some(n) if !n.is_power_of_two() => Err(ConfigError::PsdLenNotPowerOfTwo(n)),
            _ => Ok(()),
        }
    }
}

/// Read an [`EngineConfig`] from a toml, yaml or json file. Missing fields
/// take their default values.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    debug!("Attempting to parse config file {}", path.display());
    let file_type = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|e| ConfigFileType::from_str(&e).ok())
        .ok_or_else(|| ConfigError::UnknownFileType(path.display().to_string()))?;

    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    let decode_err = |err: String| ConfigError::Decode {
        file_type: file_type.into(),
        path: path.display().to_string(),
        err,
    };
    let config: EngineConfig = match file_type {
        ConfigFileType::Toml => toml::from_str(&contents).map_err(|e| decode_err(e.to_string()))?,
        ConfigFileType::Yaml => {
            serde_yaml::from_str(&contents).map_err(|e| decode_err(e.to_string()))?
        }
        ConfigFileType::Json => {
            serde_json::from_str(&contents).map_err(|e| decode_err(e.to_string()))?
        }
    };
    config.validate()?;
    Ok(config)
}
