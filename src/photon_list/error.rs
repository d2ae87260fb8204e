// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PhotonListError {
    #[error("Photon list '{0}' is empty")]
    Empty(String),

    #[error("No photon in photon list '{0}' has an energy where the instrument has effective area")]
    NoDetectableEvents(String),
}
