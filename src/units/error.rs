// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnitParseError {
    #[error("Successfully parsed a unit ({unit}), but could not parse the numerical component of '{input}'")]
    GotUnitButCantParse { input: String, unit: &'static str },

    #[error("Could not parse '{input}' as a {unit_type}")]
    Unknown {
        input: String,
        unit_type: &'static str,
    },

    #[error("'{input}' is not a supported {unit_type} unit; supported units are: {supported}")]
    UnknownUnit {
        input: String,
        unit_type: &'static str,
        supported: String,
    },
}
