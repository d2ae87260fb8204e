// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Source catalogs.

A catalog is a table of [`Source`]s. Each source refers to its spectrum, image
and light curve by reference strings; these are resolved relative to the
catalog's own location (see [`crate::extension`]), so a catalog read from disk
remembers where it came from.
 */

mod error;

pub use error::SourceError;

use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde::Deserialize;

use crate::{
    coord::RADec,
    io::read_document,
    units::{to_internal, AngleUnit, EnergyFluxUnit, EnergyUnit},
};

/// One row of a source catalog. All quantities are in internal units.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub src_id: i64,
    pub src_name: Option<String>,
    pub position: RADec,
    /// \[rad\]
    pub imgrota: f64,
    pub imgscal: f64,
    /// Lower edge of the reference energy band \[keV\].
    pub e_min: f64,
    /// Upper edge of the reference energy band \[keV\].
    pub e_max: f64,
    /// The energy flux in the reference band \[erg/s/cm^2\].
    pub eflux: f64,
    pub spectrum: String,
    pub image: String,
    pub timing: String,
}

impl Source {
    /// A point source with a spectrum and nothing else.
    pub fn point(
        src_id: i64,
        position: RADec,
        e_min: f64,
        e_max: f64,
        eflux: f64,
        spectrum: &str,
    ) -> Source {
        Source {
            src_id,
            src_name: None,
            position,
            imgrota: 0.0,
            imgscal: 1.0,
            e_min,
            e_max,
            eflux,
            spectrum: spectrum.to_string(),
            image: String::new(),
            timing: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), SourceError> {
        if !(self.e_min >= 0.0 && self.e_max > self.e_min) {
            return Err(SourceError::BadBand {
                src_id: self.src_id,
                e_min: self.e_min,
                e_max: self.e_max,
            });
        }
        if !(self.eflux.is_finite() && self.eflux >= 0.0) {
            return Err(SourceError::BadFlux {
                src_id: self.src_id,
                flux: self.eflux,
            });
        }
        if !(self.imgscal.is_finite() && self.imgscal != 0.0) {
            return Err(SourceError::BadImageScale {
                src_id: self.src_id,
                imgscal: self.imgscal,
            });
        }
        Ok(())
    }
}

/// Where a catalog was read from. Relative references are resolved against
/// this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLocation {
    pub dir: PathBuf,
    pub file_name: String,
}

impl CatalogLocation {
    pub fn from_path(path: &Path) -> CatalogLocation {
        CatalogLocation {
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            file_name: path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// The catalog file itself.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Read-only, row-indexed access to sources.
pub trait SourceCatalog {
    fn len(&self) -> usize;

    fn source(&self, row: usize) -> Result<Source, SourceError>;

    /// Where the catalog lives, if it lives anywhere.
    fn location(&self) -> Option<&CatalogLocation>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    sources: Vec<Source>,
    location: Option<CatalogLocation>,
}

impl SourceTable {
    pub fn new(sources: Vec<Source>) -> Result<SourceTable, SourceError> {
        for s in &sources {
            s.validate()?;
        }
        Ok(SourceTable {
            sources,
            location: None,
        })
    }

    pub fn with_location(mut self, location: CatalogLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

impl SourceCatalog for SourceTable {
    fn len(&self) -> usize {
        self.sources.len()
    }

    fn source(&self, row: usize) -> Result<Source, SourceError> {
        trace!("Reading catalog row {row}");
        self.sources
            .get(row)
            .cloned()
            .ok_or(SourceError::NoSuchRow {
                row,
                len: self.sources.len(),
            })
    }

    fn location(&self) -> Option<&CatalogLocation> {
        self.location.as_ref()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    units: CatalogUnits,
    sources: Vec<SourceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CatalogUnits {
    angle: String,
    energy: String,
    flux: String,
}

impl Default for CatalogUnits {
    fn default() -> Self {
        CatalogUnits {
            angle: "deg".to_string(),
            energy: "keV".to_string(),
            flux: "erg/s/cm**2".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SourceRecord {
    src_id: i64,
    #[serde(default)]
    src_name: Option<String>,
    ra: f64,
    dec: f64,
    #[serde(default)]
    imgrota: f64,
    #[serde(default = "default_imgscal")]
    imgscal: f64,
    e_min: f64,
    e_max: f64,
    flux: f64,
    #[serde(default)]
    spectrum: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    timing: String,
}

fn default_imgscal() -> f64 {
    1.0
}

/// Read a catalog from a yaml or json file. The file holds a list of
/// `sources` and optionally a `units` block naming the `angle`, `energy` and
/// `flux` units the sources are given in (degrees, keV and erg/s/cm^2 by
/// default).
pub fn read_catalog_file<P: AsRef<Path>>(path: P) -> Result<SourceTable, SourceError> {
    let path = path.as_ref();
    let doc: CatalogDocument = read_document(path)?;
    let angle = to_internal::<AngleUnit>(1.0, &doc.units.angle)?;
    let energy = to_internal::<EnergyUnit>(1.0, &doc.units.energy)?;
    let flux = to_internal::<EnergyFluxUnit>(1.0, &doc.units.flux)?;

    let sources = doc
        .sources
        .into_iter()
        .map(|r| Source {
            src_id: r.src_id,
            src_name: r.src_name,
            position: RADec::new(r.ra * angle, r.dec * angle).normalised(),
            imgrota: r.imgrota * angle,
            imgscal: r.imgscal,
            e_min: r.e_min * energy,
            e_max: r.e_max * energy,
            eflux: r.flux * flux,
            spectrum: r.spectrum,
            image: r.image,
            timing: r.timing,
        })
        .collect();
    let table = SourceTable::new(sources)?.with_location(CatalogLocation::from_path(path));
    debug!("Read {} sources from {}", table.len(), path.display());
    Ok(table)
}
