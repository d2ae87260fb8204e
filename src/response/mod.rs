// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The instrument response: the effective area as a function of energy
//! (ARF).

mod error;

pub use error::ResponseError;

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use vec1::Vec1;

use crate::{
    io::read_document,
    units::{to_internal, EnergyUnit},
};

/// One energy bin of an ARF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArfBin {
    /// \[keV\]
    pub e_low: f64,
    /// \[keV\]
    pub e_high: f64,
    /// \[cm^2\]
    pub area: f64,
}

/// An effective-area table, sorted by energy.
#[derive(Debug, Clone, PartialEq)]
pub struct Arf {
    bins: Vec1<ArfBin>,
    max_area: f64,
}

impl Arf {
    pub fn new(bins: Vec<ArfBin>) -> Result<Arf, ResponseError> {
        let bins = Vec1::try_from_vec(bins).map_err(|_| ResponseError::Empty)?;
        for (index, bin) in bins.iter().enumerate() {
            if !(bin.e_low >= 0.0 && bin.e_high > bin.e_low) {
                return Err(ResponseError::BadBounds {
                    index,
                    e_low: bin.e_low,
                    e_high: bin.e_high,
                });
            }
            if !(bin.area.is_finite() && bin.area >= 0.0) {
                return Err(ResponseError::BadArea {
                    index,
                    area: bin.area,
                });
            }
        }
        if let Some(i) = bins.windows(2).position(|w| w[1].e_low < w[0].e_high) {
            return Err(ResponseError::NotSorted(i + 1));
        }
        let max_area = bins.iter().map(|b| b.area).fold(0.0, f64::max);
        Ok(Arf { bins, max_area })
    }

    pub fn bins(&self) -> &[ArfBin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The lower edge of the first bin \[keV\].
    pub fn e_min(&self) -> f64 {
        self.bins.first().e_low
    }

    /// The upper edge of the last bin \[keV\].
    pub fn e_max(&self) -> f64 {
        self.bins.last().e_high
    }

    /// The largest effective area of any bin \[cm^2\].
    pub fn max_area(&self) -> f64 {
        self.max_area
    }

    /// The index of the first bin whose upper edge is not below `energy`.
    /// Energies above the last bin map onto the last bin.
    pub fn bin_index(&self, energy: f64) -> usize {
        let mut lower = 0;
        let mut upper = self.len() - 1;
        while upper > lower {
            let mid = (lower + upper) / 2;
            if self.bins[mid].e_high < energy {
                lower = mid + 1;
            } else {
                upper = mid;
            }
        }
        lower
    }

    /// The effective area at `energy` \[cm^2\]. Zero outside the response's
    /// energy range.
    pub fn area_at(&self, energy: f64) -> f64 {
        if energy < self.e_min() || energy > self.e_max() {
            0.0
        } else {
            self.bins[self.bin_index(energy)].area
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArfDocument {
    #[serde(default = "default_energy_unit")]
    energy_unit: String,
    bins: Vec<ArfBin>,
}

fn default_energy_unit() -> String {
    "keV".to_string()
}

/// Read an ARF from a yaml or json file holding `bins` (each with `e_low`,
/// `e_high` and `area`) and an optional `energy_unit` (keV by default).
pub fn read_arf_file<P: AsRef<Path>>(path: P) -> Result<Arf, ResponseError> {
    let doc: ArfDocument = read_document(path.as_ref())?;
    let factor = to_internal::<EnergyUnit>(1.0, &doc.energy_unit)?;
    let bins = doc
        .bins
        .into_iter()
        .map(|b| ArfBin {
            e_low: b.e_low * factor,
            e_high: b.e_high * factor,
            area: b.area,
        })
        .collect();
    let arf = Arf::new(bins)?;
    debug!(
        "Read ARF with {} bins ({} keV to {} keV)",
        arf.len(),
        arf.e_min(),
        arf.e_max()
    );
    Ok(arf)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use approx::assert_abs_diff_eq;
    use indoc::indoc;
    use tempfile::Builder;

    use super::*;

    fn arf() -> Arf {
        Arf::new(vec![
            ArfBin {
                e_low: 0.5,
                e_high: 1.0,
                area: 10.0,
            },
            ArfBin {
                e_low: 1.0,
                e_high: 2.0,
                area: 50.0,
            },
            ArfBin {
                e_low: 2.0,
                e_high: 4.0,
                area: 20.0,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_bin_lookup() {
        let arf = arf();
        assert_eq!(arf.bin_index(0.1), 0);
        assert_eq!(arf.bin_index(0.75), 0);
        assert_eq!(arf.bin_index(1.0), 0);
        assert_eq!(arf.bin_index(1.5), 1);
        assert_eq!(arf.bin_index(3.9), 2);
        assert_eq!(arf.bin_index(100.0), 2);

        assert_abs_diff_eq!(arf.area_at(1.5), 50.0);
        assert_abs_diff_eq!(arf.area_at(0.1), 0.0);
        assert_abs_diff_eq!(arf.area_at(4.5), 0.0);
        assert_abs_diff_eq!(arf.max_area(), 50.0);
        assert_abs_diff_eq!(arf.e_min(), 0.5);
        assert_abs_diff_eq!(arf.e_max(), 4.0);
    }

    #[test]
    fn test_invalid_arfs() {
        assert!(matches!(Arf::new(vec![]), Err(ResponseError::Empty)));

        let bad = ArfBin {
            e_low: 2.0,
            e_high: 1.0,
            area: 1.0,
        };
        assert!(matches!(
            Arf::new(vec![bad]),
            Err(ResponseError::BadBounds { index: 0, .. })
        ));

        let mut bins = arf().bins().to_vec();
        bins.swap(0, 2);
        assert!(matches!(Arf::new(bins), Err(ResponseError::NotSorted(1))));

        let mut bins = arf().bins().to_vec();
        bins[1].area = f64::NAN;
        assert!(matches!(
            Arf::new(bins),
            Err(ResponseError::BadArea { index: 1, .. })
        ));
    }

    #[test]
    fn test_read_yaml_arf() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(
            indoc! {"
                energy_unit: eV
                bins:
                  - e_low: 500
                    e_high: 1000
                    area: 10.0
                  - e_low: 1000
                    e_high: 2000
                    area: 30.0
            "}
            .as_bytes(),
        )
        .unwrap();
        file.flush().unwrap();

        let arf = read_arf_file(file.path()).unwrap();
        assert_eq!(arf.len(), 2);
        assert_abs_diff_eq!(arf.bins()[0].e_low, 0.5);
        assert_abs_diff_eq!(arf.bins()[1].e_high, 2.0);
        assert_abs_diff_eq!(arf.max_area(), 30.0);
    }

    #[test]
    fn test_read_json_arf() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"bins": [{"e_low": 1.0, "e_high": 2.0, "area": 5.0}]}"#)
            .unwrap();
        file.flush().unwrap();

        let arf = read_arf_file(file.path()).unwrap();
        assert_eq!(arf.len(), 1);
        assert_abs_diff_eq!(arf.area_at(1.5), 5.0);
    }

    #[test]
    fn test_unknown_file_type() {
        let file = Builder::new().suffix(".fits").tempfile().unwrap();
        assert!(matches!(
            read_arf_file(file.path()),
            Err(ResponseError::Document(
                crate::io::DocumentError::UnknownFileType(_)
            ))
        ));
    }
}
