// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sources with light curves and PSDs.

use indoc::indoc;
use tempfile::TempDir;

use simput_photons::config::read_config_file;

use super::*;

#[test]
fn test_light_curve_with_per_bin_spectra() {
    let dir = TempDir::new().unwrap();
    let catalog = make_file_in_dir(
        "catalog.yaml",
        &dir,
        indoc! {"
            sources:
              - src_id: 1
                ra: 10.0
                dec: 10.0
                e_min: 0.5
                e_max: 1.0
                flux: 1.0e-9
                spectrum: spectra.yaml[soft]
                timing: lcs.yaml[flare]
        "},
    );
    make_file_in_dir(
        "lcs.yaml",
        &dir,
        indoc! {"
            extensions:
              flare:
                type: light_curve
                time_unit: ms
                time: [0, 10000, 20000, 30000]
                flux: [0, 4, 0, 0]
                spectrum: ['spectra.yaml[soft]', 'spectra.yaml[hard]', 'spectra.yaml[soft]', 'spectra.yaml[soft]']
        "},
    );
    make_file_in_dir(
        "spectra.yaml",
        &dir,
        indoc! {"
            extensions:
              soft:
                type: spectrum
                energy: [0.5, 1.0]
                flux: [1, 1]
              hard:
                type: spectrum
                energy: [3.0, 6.0]
                flux: [1, 1]
        "},
    );
    let arf = write_arf(&dir);
    let mut engine = engine(&catalog, &arf, EngineConfig::default());

    let photons = photons(&mut engine, 0, 0.0, 100.0);
    assert!(photons.len() > 10);
    // The flux rises from zero at 0 s to a peak at 10 s and is zero again at
    // 20 s.
    for p in &photons {
        assert!(p.time > 0.0 && p.time < 20.0, "{p:?}");
        if p.time > 10.0 {
            assert!(p.energy >= 2.0, "{p:?}");
        } else if p.time < 10.0 {
            assert!(p.energy <= 1.0, "{p:?}");
        }
    }
    // More photons near the peak than near the edges.
    let near_peak = photons
        .iter()
        .filter(|p| (p.time - 10.0).abs() < 5.0)
        .count();
    assert!(near_peak * 2 > photons.len());
}

#[test]
fn test_psd_source_keeps_going() {
    let dir = TempDir::new().unwrap();
    let catalog = make_file_in_dir(
        "catalog.yaml",
        &dir,
        indoc! {"
            sources:
              - src_id: 5
                ra: 10.0
                dec: 10.0
                e_min: 0.5
                e_max: 10.0
                flux: 1.0e-9
                spectrum: '[flat]'
                timing: '[noise]'
            extensions:
              flat:
                type: spectrum
                energy: [0.5, 10.0]
                flux: [1, 1]
              noise:
                type: psd
                frequency_unit: Hz
                frequency: [0.25, 0.5, 1.0]
                power: [0.05, 0.02, 0.01]
        "},
    );
    let config = make_file_in_dir("config.toml", &dir, "psd_len = 32\n");
    let config = read_config_file(config).unwrap();
    let arf = write_arf(&dir);
    let mut engine = engine(&catalog, &arf, config);

    // Each synthesised light curve covers 64 bins of 0.5 s.
    let photons = photons(&mut engine, 0, 0.0, 200.0);
    let last = photons.last().unwrap();
    assert!(last.time > 150.0, "{last:?}");
    assert!(photons.windows(2).all(|w| w[1].time > w[0].time));
}
