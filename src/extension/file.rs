// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Extensions stored in yaml or json files.
//!
//! A file holds an `extensions` map from names to extensions, each tagged with
//! its `type`. Catalog files may carry such a map too, next to their
//! `sources`.

use std::{cell::RefCell, collections::BTreeMap, collections::HashMap, rc::Rc};

use log::debug;
use serde::Deserialize;

use super::{split_reference, ExtType, Extension, ExtensionLoader, ReadExtensionError};
use crate::{
    image::SimputImage,
    io::read_document,
    light_curve::{LightCurve, TimeAxis},
    photon_list::Event,
    psd::Psd,
    spectrum::MissionIndependentSpectrum,
    units::{parse_unit, to_internal, AngleUnit, EnergyUnit, FreqUnit, TimeUnit},
    wcs::{Projection, Wcs},
};

#[derive(Debug, Default, Deserialize)]
struct ExtensionDocument {
    #[serde(default)]
    extensions: BTreeMap<String, ExtensionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ExtensionRecord {
    Spectrum {
        #[serde(default = "default_energy_unit")]
        energy_unit: String,
        energy: Vec<f64>,
        /// \[photons/s/cm^2/keV\]
        flux: Vec<f64>,
    },

    LightCurve {
        #[serde(default = "default_time_unit")]
        time_unit: String,
        #[serde(default)]
        time: Option<Vec<f64>>,
        #[serde(default)]
        phase: Option<Vec<f64>>,
        #[serde(default)]
        phase0: f64,
        #[serde(default)]
        period: Option<f64>,
        flux: Vec<f64>,
        #[serde(default = "one")]
        fluxscal: f64,
        /// \[d\]
        #[serde(default)]
        mjdref: f64,
        #[serde(default)]
        timezero: f64,
        #[serde(default)]
        spectrum: Option<Vec<String>>,
        #[serde(default)]
        image: Option<Vec<String>>,
    },

    Psd {
        #[serde(default = "default_freq_unit")]
        frequency_unit: String,
        frequency: Vec<f64>,
        power: Vec<f64>,
    },

    Image {
        naxis1: usize,
        naxis2: usize,
        /// Row by row, i.e. all `x` values of the first row first.
        pixels: Vec<f64>,
        #[serde(default = "one")]
        fluxscal: f64,
        #[serde(default = "default_ctype")]
        ctype: [String; 2],
        #[serde(default = "default_cunit")]
        cunit: [String; 2],
        crpix: [f64; 2],
        crval: [f64; 2],
        cdelt: [f64; 2],
    },

    PhotonList {
        #[serde(default = "default_energy_unit")]
        energy_unit: String,
        #[serde(default = "default_angle_unit")]
        angle_unit: String,
        energy: Vec<f64>,
        ra: Vec<f64>,
        dec: Vec<f64>,
    },
}

fn default_energy_unit() -> String {
    "keV".to_string()
}

fn default_time_unit() -> String {
    "s".to_string()
}

fn default_freq_unit() -> String {
    "Hz".to_string()
}

fn default_angle_unit() -> String {
    "deg".to_string()
}

fn default_ctype() -> [String; 2] {
    ["RA---TAN".to_string(), "DEC--TAN".to_string()]
}

fn default_cunit() -> [String; 2] {
    [default_angle_unit(), default_angle_unit()]
}

fn one() -> f64 {
    1.0
}

impl ExtensionRecord {
    fn ext_type(&self) -> ExtType {
        match self {
            ExtensionRecord::Spectrum { .. } => ExtType::Spectrum,
            ExtensionRecord::LightCurve { .. } => ExtType::LightCurve,
            ExtensionRecord::Psd { .. } => ExtType::Psd,
            ExtensionRecord::Image { .. } => ExtType::Image,
            ExtensionRecord::PhotonList { .. } => ExtType::PhotonList,
        }
    }

    /// Convert into internal units and check the contents.
    fn to_extension(&self, reference: &str) -> Result<Extension, ReadExtensionError> {
        let ext = match self {
            ExtensionRecord::Spectrum {
                energy_unit,
                energy,
                flux,
            } => {
                let factor = to_internal::<EnergyUnit>(1.0, energy_unit)?;
                Extension::Spectrum(MissionIndependentSpectrum::new(
                    reference.to_string(),
                    energy.iter().map(|e| e * factor).collect(),
                    flux.clone(),
                )?)
            }

            ExtensionRecord::LightCurve {
                time_unit,
                time,
                phase,
                phase0,
                period,
                flux,
                fluxscal,
                mjdref,
                timezero,
                spectrum,
                image,
            } => {
                let factor = to_internal::<TimeUnit>(1.0, time_unit)?;
                let axis = match (time, phase) {
                    (Some(time), None) => TimeAxis::NonPeriodic {
                        time: time.iter().map(|t| t * factor).collect(),
                    },
                    (None, Some(phase)) => TimeAxis::Periodic {
                        phase: phase.clone(),
                        phase0: *phase0,
                        period: period.ok_or_else(|| {
                            ReadExtensionError::MissingPeriod(reference.to_string())
                        })? * factor,
                    },
                    _ => return Err(ReadExtensionError::BadTimeAxis(reference.to_string())),
                };
                let mut lc =
                    LightCurve::new(axis, flux.clone(), *fluxscal, *mjdref, timezero * factor)?;
                if let Some(refs) = spectrum {
                    lc = lc.with_spectrum_column(refs.clone())?;
                }
                if let Some(refs) = image {
                    lc = lc.with_image_column(refs.clone())?;
                }
                Extension::LightCurve(lc)
            }

            ExtensionRecord::Psd {
                frequency_unit,
                frequency,
                power,
            } => {
                let factor = to_internal::<FreqUnit>(1.0, frequency_unit)?;
                Extension::Psd(Psd::new(
                    frequency.iter().map(|f| f * factor).collect(),
                    power.clone(),
                )?)
            }

            ExtensionRecord::Image {
                naxis1,
                naxis2,
                pixels,
                fluxscal,
                ctype,
                cunit,
                crpix,
                crval,
                cdelt,
            } => {
                let projection = Projection::from_ctype(&ctype[0])?;
                if Projection::from_ctype(&ctype[1])? != projection {
                    return Err(ReadExtensionError::MixedProjection {
                        reference: reference.to_string(),
                        ctype1: ctype[0].clone(),
                        ctype2: ctype[1].clone(),
                    });
                }
                let cunit = [
                    parse_unit::<AngleUnit>(&cunit[0])?,
                    parse_unit::<AngleUnit>(&cunit[1])?,
                ];
                let wcs = Wcs::new(*crpix, *crval, *cdelt, cunit, projection)?;
                Extension::Image(SimputImage::from_rows(
                    reference.to_string(),
                    *naxis1,
                    *naxis2,
                    pixels.clone(),
                    *fluxscal,
                    wcs,
                )?)
            }

            ExtensionRecord::PhotonList {
                energy_unit,
                angle_unit,
                energy,
                ra,
                dec,
            } => {
                let e_factor = to_internal::<EnergyUnit>(1.0, energy_unit)?;
                let a_factor = to_internal::<AngleUnit>(1.0, angle_unit)?;
                for (column, got) in [("RA", ra.len()), ("DEC", dec.len())] {
                    if got != energy.len() {
                        return Err(ReadExtensionError::LengthMismatch {
                            reference: reference.to_string(),
                            column,
                            got,
                            expected: energy.len(),
                        });
                    }
                }
                Extension::PhotonList(
                    energy
                        .iter()
                        .zip(ra)
                        .zip(dec)
                        .map(|((e, ra), dec)| Event {
                            energy: e * e_factor,
                            ra: ra * a_factor,
                            dec: dec * a_factor,
                        })
                        .collect(),
                )
            }
        };
        Ok(ext)
    }
}

/// Loads extensions from yaml and json files. Each file is only read once.
#[derive(Debug, Default)]
pub struct FileLoader {
    documents: RefCell<HashMap<String, Rc<ExtensionDocument>>>,
}

impl FileLoader {
    pub fn new() -> FileLoader {
        FileLoader::default()
    }

    fn document(&self, path: &str) -> Result<Rc<ExtensionDocument>, ReadExtensionError> {
        if let Some(doc) = self.documents.borrow().get(path) {
            return Ok(Rc::clone(doc));
        }
        let doc: Rc<ExtensionDocument> = Rc::new(read_document(path)?);
        debug!("{path} holds {} extensions", doc.extensions.len());
        self.documents
            .borrow_mut()
            .insert(path.to_string(), Rc::clone(&doc));
        Ok(doc)
    }

    /// Look up the record that `reference` points at and hand it to `f`.
    fn with_record<T, F>(&self, reference: &str, f: F) -> Result<T, ReadExtensionError>
    where
        F: FnOnce(&ExtensionRecord) -> Result<T, ReadExtensionError>,
    {
        let (path, name) = split_reference(reference);
        if path.is_empty() {
            return Err(ReadExtensionError::NotFound(reference.to_string()));
        }
        let doc = self.document(path)?;
        let record = match name {
            Some(name) => doc.extensions.get(name),
            None if doc.extensions.len() == 1 => doc.extensions.values().next(),
            None if doc.extensions.is_empty() => None,
            None => {
                return Err(ReadExtensionError::Ambiguous {
                    path: path.to_string(),
                    count: doc.extensions.len(),
                })
            }
        };
        match record {
            Some(record) => f(record),
            None => Err(ReadExtensionError::NotFound(reference.to_string())),
        }
    }
}

impl ExtensionLoader for FileLoader {
    fn ext_type(&self, reference: &str) -> Result<ExtType, ReadExtensionError> {
        self.with_record(reference, |r| Ok(r.ext_type()))
    }

    fn load(&self, reference: &str) -> Result<Extension, ReadExtensionError> {
        debug!("Loading extension {reference}");
        self.with_record(reference, |r| r.to_extension(reference))
    }
}
