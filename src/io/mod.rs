// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff. Catalogs, responses and extensions are all stored as yaml or
//! json documents; which one is determined by the file extension.

mod error;

pub use error::DocumentError;

use std::{fs::File, io::BufReader, path::Path};

use log::debug;
use serde::de::DeserializeOwned;

/// The file extensions that can be read as documents.
pub const DOCUMENT_FILE_TYPES_COMMA_SEPARATED: &str = "yaml, yml, json";

/// Read and deserialise a yaml or json file.
pub(crate) fn read_document<T: DeserializeOwned, P: AsRef<Path>>(
    path: P,
) -> Result<T, DocumentError> {
    fn inner<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
        let ext = path
            .extension()
            .and_then(|os_str| os_str.to_str())
            .map(|s| s.to_lowercase());
        let open = || -> Result<BufReader<File>, DocumentError> {
            let f = File::open(path).map_err(|err| DocumentError::Io {
                path: path.display().to_string(),
                err,
            })?;
            Ok(BufReader::new(f))
        };
        match ext.as_deref() {
            Some("yaml" | "yml") => {
                debug!("Reading {} as yaml", path.display());
                Ok(serde_yaml::from_reader(open()?)?)
            }
            Some("json") => {
                debug!("Reading {} as json", path.display());
                Ok(serde_json::from_reader(open()?)?)
            }
            _ => Err(DocumentError::UnknownFileType(path.display().to_string())),
        }
    }
    inner(path.as_ref())
}
