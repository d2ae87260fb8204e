// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod catalogs;
mod variability;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use indoc::indoc;
use simput_photons::{
    response::read_arf_file, source::read_catalog_file, EngineConfig, FileLoader, Photon,
    PhotonEngine, SeededRng,
};

fn make_file_in_dir<T: AsRef<Path>, U: AsRef<Path>>(
    filename: T,
    dir: U,
    contents: &str,
) -> PathBuf {
    let path = dir.as_ref().join(filename);
    let mut f = File::create(&path).expect("couldn't make file");
    f.write_all(contents.as_bytes()).unwrap();
    path
}

/// A response with 0.5-10 keV coverage.
fn write_arf<T: AsRef<Path>>(dir: T) -> PathBuf {
    make_file_in_dir(
        "arf.yaml",
        dir,
        indoc! {"
            energy_unit: keV
            bins:
              - {e_low: 0.5, e_high: 1.0, area: 100.0}
              - {e_low: 1.0, e_high: 2.0, area: 200.0}
              - {e_low: 2.0, e_high: 10.0, area: 100.0}
        "},
    )
}

/// Build an engine for the catalog at `catalog`, reading extensions from
/// files.
fn engine(catalog: &Path, arf: &Path, config: EngineConfig) -> PhotonEngine {
    let catalog = read_catalog_file(catalog).unwrap();
    let arf = read_arf_file(arf).unwrap();
    let mut engine = PhotonEngine::new(Box::new(catalog), Box::new(FileLoader::new()), config)
        .unwrap()
        .with_arf(arf);
    engine.set_rng(Box::new(SeededRng::new(1234)));
    engine
}

/// All photons of catalog row `row` between `tstart` and `tstop`.
fn photons(engine: &mut PhotonEngine, row: usize, tstart: f64, tstop: f64) -> Vec<Photon> {
    let mut photons = vec![];
    let mut time = tstart;
    while let Some(photon) = engine.get_photon(row, time, 0.0).unwrap() {
        if photon.time > tstop {
            break;
        }
        time = photon.time;
        photons.push(photon);
    }
    photons
}
