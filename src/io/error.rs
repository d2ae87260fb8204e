// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::DOCUMENT_FILE_TYPES_COMMA_SEPARATED;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not determine the type of '{0}'; supported file types are: {}", DOCUMENT_FILE_TYPES_COMMA_SEPARATED)]
    UnknownFileType(String),

    #[error("Couldn't read '{path}': {err}")]
    Io { path: String, err: std::io::Error },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
