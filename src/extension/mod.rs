// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Extensions: the spectra, light curves, PSDs, images and photon lists that
sources refer to.

A source refers to each of these with a reference string, e.g.
`spectra.yaml[hard]`. References are first resolved against the location of
the catalog (see [`resolve_reference`]) and then handed to an
[`ExtensionLoader`], which determines what kind of extension they point at and
loads them.
 */

mod error;
mod file;

pub use error::ReadExtensionError;
pub use file::FileLoader;

use std::{collections::HashMap, path::Path};

use strum_macros::IntoStaticStr;

use crate::{
    image::SimputImage, light_curve::LightCurve, photon_list::Event, psd::Psd,
    source::CatalogLocation, spectrum::MissionIndependentSpectrum,
};

/// What a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum ExtType {
    #[strum(serialize = "nothing")]
    None,

    #[strum(serialize = "a spectrum")]
    Spectrum,

    #[strum(serialize = "a light curve")]
    LightCurve,

    #[strum(serialize = "a PSD")]
    Psd,

    #[strum(serialize = "an image")]
    Image,

    #[strum(serialize = "a photon list")]
    PhotonList,
}

/// A loaded extension.
#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    Spectrum(MissionIndependentSpectrum),
    LightCurve(LightCurve),
    Psd(Psd),
    Image(SimputImage),
    PhotonList(Vec<Event>),
}

impl Extension {
    pub fn ext_type(&self) -> ExtType {
        match self {
            Extension::Spectrum(_) => ExtType::Spectrum,
            Extension::LightCurve(_) => ExtType::LightCurve,
            Extension::Psd(_) => ExtType::Psd,
            Extension::Image(_) => ExtType::Image,
            Extension::PhotonList(_) => ExtType::PhotonList,
        }
    }
}

/// Something that can turn resolved references into extensions.
pub trait ExtensionLoader {
    /// Determine what kind of extension `reference` points at without
    /// loading all of it.
    fn ext_type(&self, reference: &str) -> Result<ExtType, ReadExtensionError>;

    fn load(&self, reference: &str) -> Result<Extension, ReadExtensionError>;
}

/// Extensions kept in memory, keyed by their reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    extensions: HashMap<String, Extension>,
}

impl MemoryLoader {
    pub fn new() -> MemoryLoader {
        MemoryLoader::default()
    }

    pub fn insert<S: Into<String>>(&mut self, reference: S, extension: Extension) {
        self.extensions.insert(reference.into(), extension);
    }

    pub fn with<S: Into<String>>(mut self, reference: S, extension: Extension) -> Self {
        self.insert(reference, extension);
        self
    }
}

impl ExtensionLoader for MemoryLoader {
    fn ext_type(&self, reference: &str) -> Result<ExtType, ReadExtensionError> {
        self.extensions
            .get(reference)
            .map(Extension::ext_type)
            .ok_or_else(|| ReadExtensionError::NotFound(reference.to_string()))
    }

    fn load(&self, reference: &str) -> Result<Extension, ReadExtensionError> {
        self.extensions
            .get(reference)
            .cloned()
            .ok_or_else(|| ReadExtensionError::NotFound(reference.to_string()))
    }
}

/// Does this reference refer to nothing?
pub fn is_blank(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw == "NULL"
}

/// Split a reference like `file.yaml[name]` into its path and extension name.
pub fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.find('[') {
        Some(i) if reference.ends_with(']') => {
            (&reference[..i], Some(&reference[i + 1..reference.len() - 1]))
        }
        _ => (reference, None),
    }
}

/// Resolve a reference from a catalog row. References starting with `[` point
/// into the catalog file itself, relative paths are relative to the catalog's
/// directory. Without a location, references are used as they are.
pub fn resolve_reference(location: Option<&CatalogLocation>, raw: &str) -> Option<String> {
    if is_blank(raw) {
        return None;
    }
    let raw = raw.trim();
    let location = match location {
        Some(l) => l,
        None => return Some(raw.to_string()),
    };

    if raw.starts_with('[') {
        Some(format!("{}{raw}", location.path().display()))
    } else if Path::new(raw).is_absolute() {
        Some(raw.to_string())
    } else {
        Some(location.dir.join(raw).display().to_string())
    }
}

/// Resolve a reference found in a column of the extension at `base` (e.g. the
/// per-bin spectra of a light curve). A reference starting with `[` points into
/// the same file as `base`, a relative path is relative to `base`'s directory.
pub fn resolve_relative_to(base: &str, raw: &str) -> Option<String> {
    if is_blank(raw) {
        return None;
    }
    let raw = raw.trim();
    let (base_path, _) = split_reference(base);

    if raw.starts_with('[') {
        Some(format!("{base_path}{raw}"))
    } else if Path::new(raw).is_absolute() {
        Some(raw.to_string())
    } else {
        match base_path.rfind('/') {
            Some(i) => Some(format!("{}{raw}", &base_path[..=i])),
            None => Some(raw.to_string()),
        }
    }
}
