// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Catalogs and extensions read from disk.

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::TempDir;

use simput_photons::{EngineConfig, SimputError, SourceCatalog};

use super::*;

const CATALOG: &str = indoc! {"
    sources:
      - src_id: 10
        src_name: point
        ra: 30.0
        dec: 45.0
        e_min: 0.5
        e_max: 10.0
        flux: 1.0e-10
        spectrum: '[flat]'
      - src_id: 11
        src_name: blob
        ra: 30.0
        dec: 45.0
        e_min: 0.5
        e_max: 10.0
        flux: 1.0e-10
        spectrum: '[flat]'
        image: images/blob.yaml
      - src_id: 12
        ra: 0.0
        dec: 0.0
        e_min: 0.5
        e_max: 10.0
        flux: 1.0e-10
        spectrum: missing.yaml[nope]
    extensions:
      flat:
        type: spectrum
        energy: [0.5, 1.0, 2.0, 5.0, 10.0]
        flux: [1, 1, 1, 1, 1]
"};

const IMAGE: &str = indoc! {"
    extensions:
      blob:
        type: image
        naxis1: 4
        naxis2: 4
        pixels: [0, 0, 0, 0,
                 0, 1, 1, 0,
                 0, 1, 1, 0,
                 0, 0, 0, 0]
        crpix: [2.5, 2.5]
        crval: [0.0, 0.0]
        cdelt: [-0.01, 0.01]
"};

#[test]
fn test_catalog_with_local_extensions() {
    let dir = TempDir::new().unwrap();
    let catalog = make_file_in_dir("catalog.yaml", &dir, CATALOG);
    std::fs::create_dir(dir.path().join("images")).unwrap();
    make_file_in_dir("blob.yaml", dir.path().join("images"), IMAGE);
    let arf = write_arf(&dir);
    let mut engine = engine(&catalog, &arf, EngineConfig::default());
    assert_eq!(engine.catalog().len(), 3);

    // Point source.
    let point = photons(&mut engine, 0, 0.0, 1000.0);
    assert!(!point.is_empty());
    for p in &point {
        assert_eq!(p.src_id, 10);
        assert_abs_diff_eq!(p.ra.to_degrees(), 30.0, epsilon = 1e-10);
        assert_abs_diff_eq!(p.dec.to_degrees(), 45.0, epsilon = 1e-10);
        assert!((0.5..=10.0).contains(&p.energy));
    }
    assert_abs_diff_eq!(engine.source_extension(0, 0.0, 0.0).unwrap(), 0.0);

    // Extended source: only the central 2x2 pixels are bright, so photons
    // are within one pixel diagonal of the source position.
    let blob = photons(&mut engine, 1, 0.0, 1000.0);
    assert!(!blob.is_empty());
    let max_offset = (0.01_f64 * 2f64.sqrt()).to_radians();
    let centre = simput_photons::RADec::new_degrees(30.0, 45.0);
    for p in &blob {
        let offset = simput_photons::RADec::new(p.ra, p.dec).separation(&centre);
        assert!(offset <= max_offset * 1.001, "{offset}");
    }
    let extension = engine.source_extension(1, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(
        extension,
        (0.02_f64 * 2f64.sqrt()).to_radians(),
        epsilon = 1e-8
    );

    // Same spectrum and flux, so the same rate.
    assert_abs_diff_eq!(
        engine.photon_rate(0, 0.0, 0.0).unwrap(),
        engine.photon_rate(1, 0.0, 0.0).unwrap()
    );

    // A reference to a file that doesn't exist.
    assert!(matches!(
        engine.get_photon(2, 0.0, 0.0),
        Err(SimputError::ReadExtension(_))
    ));
}

#[test]
fn test_photon_list_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = make_file_in_dir(
        "catalog.json",
        &dir,
        r#"{
            "units": {"angle": "rad"},
            "sources": [
                {"src_id": 1, "ra": 0.0, "dec": 0.0, "e_min": 0.5, "e_max": 10.0,
                 "flux": 1e-10, "spectrum": "events.json", "image": "events.json"}
            ]
        }"#,
    );
    make_file_in_dir(
        "events.json",
        &dir,
        r#"{"extensions": {"events": {
            "type": "photon_list",
            "angle_unit": "arcmin",
            "energy": [0.7, 1.2, 40.0],
            "ra": [1.0, -1.0, 0.0],
            "dec": [0.0, 2.0, 0.0]
        }}}"#,
    );
    let arf = write_arf(&dir);
    let mut engine = engine(&catalog, &arf, EngineConfig::default());

    let photons = photons(&mut engine, 0, 0.0, 100.0);
    assert!(!photons.is_empty());
    for p in &photons {
        // The 40 keV photon is outside the response and never accepted.
        assert!(p.energy == 0.7 || p.energy == 1.2, "{p:?}");
    }
    let arcmin = 1f64.to_radians() / 60.0;
    assert_abs_diff_eq!(
        engine.source_extension(0, 0.0, 0.0).unwrap(),
        5f64.sqrt() * arcmin,
        epsilon = 1e-12
    );
}
