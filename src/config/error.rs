// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::CONFIG_FILE_TYPES_COMMA_SEPARATED;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the type of config file '{0}'; supported types are: {}", CONFIG_FILE_TYPES_COMMA_SEPARATED)]
    UnknownFileType(String),

    #[error("Couldn't decode {file_type} structure from '{path}':\n{err}")]
    Decode {
        file_type: &'static str,
        path: String,
        err: String,
    },

    #[error("The capacity of the {0} store must be at least 1")]
    ZeroCapacity(&'static str),

    #[error("The PSD synthesis length must be a power of two (got {0})")]
    PsdLenNotPowerOfTwo(usize),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
