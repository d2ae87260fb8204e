// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;
use crate::{
    cache::CacheError,
    constants::KEV2ERG,
    extension::MemoryLoader,
    light_curve::TimeAxis,
    photon_list::Event,
    response::ArfBin,
    source::SourceTable,
    units::{AngleUnit, Unit},
    wcs::{Projection, Wcs},
};

fn arf(scale: f64) -> Arf {
    Arf::new(vec![
        ArfBin {
            e_low: 0.5,
            e_high: 1.0,
            area: 100.0 * scale,
        },
        ArfBin {
            e_low: 1.0,
            e_high: 2.0,
            area: 200.0 * scale,
        },
        ArfBin {
            e_low: 2.0,
            e_high: 10.0,
            area: 100.0 * scale,
        },
    ])
    .unwrap()
}

fn spectrum(name: &str, energy: &[f64]) -> MissionIndependentSpectrum {
    MissionIndependentSpectrum::new(name.to_string(), energy.to_vec(), vec![1.0; energy.len()])
        .unwrap()
}

fn flat() -> MissionIndependentSpectrum {
    spectrum("flat", &[0.5, 1.0, 2.0, 5.0, 10.0])
}

fn light_curve(flux: &[f64]) -> LightCurve {
    let time = (0..flux.len()).map(|i| 10.0 * i as f64).collect();
    LightCurve::new(TimeAxis::NonPeriodic { time }, flux.to_vec(), 1.0, 0.0, 0.0).unwrap()
}

fn image(name: &str) -> SimputImage {
    let wcs = Wcs::new(
        [2.0, 2.0],
        [0.0, 0.0],
        [-1.0, 1.0],
        [AngleUnit::Arcmin, AngleUnit::Arcmin],
        Projection::Tan,
    )
    .unwrap();
    SimputImage::from_rows(name.to_string(), 3, 3, vec![1.0; 9], 1.0, wcs).unwrap()
}

fn events() -> Vec<Event> {
    vec![
        Event {
            energy: 1.0,
            ra: 0.01,
            dec: 0.02,
        },
        Event {
            energy: 1.5,
            ra: 0.03,
            dec: -0.01,
        },
        Event {
            energy: 3.0,
            ra: 0.0,
            dec: 0.0,
        },
    ]
}

fn loader() -> MemoryLoader {
    MemoryLoader::new()
        .with("flat", Extension::Spectrum(flat()))
        .with("soft", Extension::Spectrum(spectrum("soft", &[0.5, 1.0])))
        .with("hard", Extension::Spectrum(spectrum("hard", &[3.0, 5.0])))
        .with("lc", Extension::LightCurve(light_curve(&[1.0, 1.0, 1.0])))
        .with(
            "lc_spectra",
            Extension::LightCurve(
                light_curve(&[1.0, 1.0, 1.0])
                    .with_spectrum_column(vec!["soft".into(), "hard".into(), "hard".into()])
                    .unwrap(),
            ),
        )
        .with(
            "lc_blank",
            Extension::LightCurve(
                light_curve(&[1.0, 1.0, 1.0])
                    .with_spectrum_column(vec!["soft".into(), "".into(), "".into()])
                    .unwrap(),
            ),
        )
        .with(
            "noise",
            Extension::Psd(Psd::new(vec![0.5, 1.0], vec![0.01, 0.01]).unwrap()),
        )
        .with("img1", Extension::Image(image("img1")))
        .with("img2", Extension::Image(image("img2")))
        .with("events", Extension::PhotonList(events()))
}

fn source(src_id: i64, eflux: f64) -> Source {
    Source::point(src_id, RADec::new(1.0, 0.5), 0.5, 10.0, eflux, "flat")
}

fn engine_with(sources: Vec<Source>, config: EngineConfig) -> PhotonEngine {
    let mut engine = PhotonEngine::new(
        Box::new(SourceTable::new(sources).unwrap()),
        Box::new(loader()),
        config,
    )
    .unwrap()
    .with_arf(arf(1.0));
    engine.set_rng(Box::new(SeededRng::new(1)));
    engine
}

fn engine_for(sources: Vec<Source>) -> PhotonEngine {
    engine_with(sources, EngineConfig::default())
}

/// The rate a source with `eflux` and the "flat" spectrum should have.
fn expected_rate(eflux: f64, arf: &Arf) -> f64 {
    let spec = flat();
    eflux / spec.band_flux(0.5, 10.0) * SpectralDistribution::build(&spec, arf).total()
}

#[test]
fn test_point_source_rate() {
    let mut engine = engine_for(vec![source(1, 1e-11)]);
    let rate = engine.photon_rate(0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(rate, expected_rate(1e-11, &arf(1.0)), epsilon = 1e-12);
    assert!(rate > 0.0);
    // The rate is remembered.
    assert_eq!(engine.sources.get(&0).unwrap().rate.get(), Some(rate));
}

#[test]
fn test_point_source_photons() {
    let mut engine = engine_for(vec![source(1, 1e-10)]);
    let rate = engine.photon_rate(0, 0.0, 0.0).unwrap();

    let n = 5000;
    let mut time = 0.0;
    for _ in 0..n {
        let photon = engine.get_photon(0, time, 0.0).unwrap().unwrap();
        assert!(photon.time > time);
        assert!((0.5..=10.0).contains(&photon.energy));
        assert_eq!(photon.src_id, 1);
        assert_abs_diff_eq!(photon.ra, 1.0);
        assert_abs_diff_eq!(photon.dec, 0.5);
        time = photon.time;
    }
    // Mean waiting time is 1/rate, with a relative standard error of
    // 1/sqrt(n).
    let mean = time / n as f64;
    assert_abs_diff_eq!(mean * rate, 1.0, epsilon = 0.1);
}

#[test]
fn test_missing_arf() {
    let mut engine = PhotonEngine::new(
        Box::new(SourceTable::new(vec![source(1, 1e-11)]).unwrap()),
        Box::new(loader()),
        EngineConfig::default(),
    )
    .unwrap();
    assert!(matches!(
        engine.get_photon(0, 0.0, 0.0),
        Err(SimputError::NoResponse)
    ));
    assert!(matches!(
        engine.photon_rate(0, 0.0, 0.0),
        Err(SimputError::NoResponse)
    ));
}

#[test]
fn test_zero_flux_gives_no_photons() {
    let mut engine = engine_for(vec![source(1, 0.0)]);
    assert_eq!(engine.get_photon(0, 0.0, 0.0).unwrap(), None);
}

#[test]
fn test_zero_reference_band() {
    let mut src = source(1, 1e-11);
    src.e_min = 20.0;
    src.e_max = 30.0;
    let mut engine = engine_for(vec![src]);
    assert!(matches!(
        engine.photon_rate(0, 0.0, 0.0),
        Err(SimputError::ZeroReferenceFlux { src_id: 1, .. })
    ));
}

#[test]
fn test_spectrum_reference_to_wrong_extension() {
    let mut src = source(3, 1e-11);
    src.spectrum = "img1".to_string();
    let mut engine = engine_for(vec![src]);
    assert!(matches!(
        engine.get_photon(0, 0.0, 0.0),
        Err(SimputError::NoSpectrum { src_id: 3, .. })
    ));

    let mut src = source(4, 1e-11);
    src.spectrum = String::new();
    let mut engine = engine_for(vec![src]);
    assert!(matches!(
        engine.photon_rate(0, 0.0, 0.0),
        Err(SimputError::NoSpectrum { src_id: 4, .. })
    ));
}

#[test]
fn test_light_curve_source_ends() {
    let mut src = source(1, 1e-8);
    src.timing = "lc".to_string();
    let mut engine = engine_for(vec![src]);
    let rate = engine.photon_rate(0, 0.0, 0.0).unwrap();

    let mut time = 0.0;
    let mut count = 0;
    while let Some(photon) = engine.get_photon(0, time, 0.0).unwrap() {
        assert!(photon.time > time);
        assert!(photon.time <= 20.0);
        time = photon.time;
        count += 1;
    }
    // Poisson with mean 20 * rate.
    let expected = 20.0 * rate;
    assert!(
        (count as f64 - expected).abs() < 5.0 * expected.sqrt(),
        "{count} photons, expected about {expected}"
    );

    // The light curve is not extendable.
    assert_eq!(engine.get_photon(0, 25.0, 0.0).unwrap(), None);
    assert_eq!(engine.get_photon(0, -5.0, 0.0).unwrap(), None);
}

#[test]
fn test_psd_light_curves_are_extended_and_per_source() {
    let config = EngineConfig {
        psd_len: Some(16),
        ..Default::default()
    };
    let mut a = source(1, 1e-9);
    a.timing = "noise".to_string();
    let mut b = source(2, 1e-9);
    b.timing = "noise".to_string();
    let mut engine = engine_with(vec![a, b], config);

    // 32 time bins of 0.5 s each; keep going well past the first light
    // curve.
    let mut time = 0.0;
    while time < 50.0 {
        let photon = engine
            .get_photon(0, time, 0.0)
            .unwrap()
            .expect("PSD light curves never run out");
        assert!(photon.time > time);
        time = photon.time;
    }

    let key_a = ("noise".to_string(), Some(1));
    let kr = engine.kr_light_curves.get(&key_a).unwrap();
    assert!(kr.is_extendable());
    assert!(kr.timeline.time_at(0, 0, 0.0) > 15.0);
    assert!(covers(&kr.timeline, time, 0.0));

    // Source 2 gets its own realisation.
    assert!(engine.get_photon(1, 0.0, 0.0).unwrap().is_some());
    let key_b = ("noise".to_string(), Some(2));
    assert!(engine.light_curves.contains_key(&key_b));
    assert!(engine.kr_light_curves.contains_key(&key_b));
    assert!(!engine.light_curves.contains_key(&("noise".to_string(), None)));
    assert_eq!(
        engine.light_curves.get(&key_b).unwrap().src_id,
        Some(2)
    );
}

#[test]
fn test_time_dependent_spectrum() {
    let mut src = source(1, 1e-8);
    src.timing = "lc_spectra".to_string();
    let mut engine = engine_for(vec![src.clone()]);

    assert_eq!(
        engine
            .extension_ref(&src, 5.0, 0.0, RefColumn::Spectrum)
            .unwrap()
            .as_deref(),
        Some("soft")
    );
    assert_eq!(
        engine
            .extension_ref(&src, 15.0, 0.0, RefColumn::Spectrum)
            .unwrap()
            .as_deref(),
        Some("hard")
    );
    // No image column; the source's own (empty) reference is used.
    assert_eq!(
        engine
            .extension_ref(&src, 15.0, 0.0, RefColumn::Image)
            .unwrap(),
        None
    );

    let mut time = 0.0;
    let (mut soft, mut hard) = (0, 0);
    while let Some(photon) = engine.get_photon(0, time, 0.0).unwrap() {
        if photon.time < 10.0 {
            assert!(photon.energy <= 1.0, "{photon:?}");
            soft += 1;
        } else if photon.time > 10.0 {
            assert!(photon.energy >= 2.0, "{photon:?}");
            hard += 1;
        }
        time = photon.time;
    }
    assert!(soft > 0);
    assert!(hard > 0);
}

#[test]
fn test_blank_spectrum_column_entry() {
    let mut src = source(1, 1e-8);
    src.timing = "lc_blank".to_string();
    let mut engine = engine_for(vec![src]);
    assert!(matches!(
        engine.get_photon(0, 12.0, 0.0),
        Err(SimputError::BlankColumnEntry {
            column: "SPECTRUM",
            ..
        })
    ));
}

#[test]
fn test_photon_list_timing_is_an_error() {
    let mut src = source(1, 1e-8);
    src.timing = "events".to_string();
    let mut engine = engine_for(vec![src]);
    assert!(matches!(
        engine.get_photon(0, 0.0, 0.0),
        Err(SimputError::PhotonListTiming(_))
    ));
}

#[test]
fn test_image_source() {
    let mut src = source(1, 1e-10);
    src.image = "img1".to_string();
    let mut engine = engine_for(vec![src]);

    let extension = engine.source_extension(0, 0.0, 0.0).unwrap();
    // The corners of a 3x3 image of 1 arcmin pixels, centred on the source.
    let arcmin = AngleUnit::Arcmin.factor();
    assert_abs_diff_eq!(extension, 1.5 * 2f64.sqrt() * arcmin, epsilon = 1e-3 * arcmin);

    let centre = RADec::new(1.0, 0.5);
    let mut time = 0.0;
    for _ in 0..500 {
        let photon = engine.get_photon(0, time, 0.0).unwrap().unwrap();
        let offset = RADec::new(photon.ra, photon.dec).separation(&centre);
        assert!(offset <= extension * 1.001, "{offset} > {extension}");
        time = photon.time;
    }
}

#[test]
fn test_point_source_extension() {
    let mut engine = engine_for(vec![source(1, 1e-10)]);
    assert_abs_diff_eq!(engine.source_extension(0, 0.0, 0.0).unwrap(), 0.0);
}

#[test]
fn test_photon_list_source() {
    let mut src = source(1, 1e-10);
    src.spectrum = "events".to_string();
    src.image = "events".to_string();
    let mut engine = engine_for(vec![src]);

    let arf = arf(1.0);
    let band_energy = (1.0 + 1.5 + 3.0) * KEV2ERG;
    // 1 keV is the top of the first ARF bin.
    let expected = 1e-10 / band_energy * (100.0 + 200.0 + 100.0);
    assert_abs_diff_eq!(
        engine.photon_rate(0, 0.0, 0.0).unwrap(),
        expected,
        epsilon = 1e-9 * expected
    );

    let list = events();
    let mut time = 0.0;
    for _ in 0..200 {
        let photon = engine.get_photon(0, time, 0.0).unwrap().unwrap();
        let event = list
            .iter()
            .find(|e| e.energy == photon.energy)
            .expect("energies come from the list");
        assert_abs_diff_eq!(photon.ra, event.ra);
        assert_abs_diff_eq!(photon.dec, event.dec);
        assert!(arf.area_at(photon.energy) > 0.0);
        time = photon.time;
    }

    let extension = engine.source_extension(0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(extension, 0.03f64.hypot(0.01));
}

#[test]
fn test_image_store_cannot_evict() {
    let config = EngineConfig {
        max_images: 1,
        ..Default::default()
    };
    let mut a = source(1, 1e-10);
    a.image = "img1".to_string();
    let mut b = source(2, 1e-10);
    b.image = "img2".to_string();
    let mut engine = engine_with(vec![a, b], config);

    assert!(engine.get_photon(0, 0.0, 0.0).is_ok());
    assert!(matches!(
        engine.get_photon(1, 0.0, 0.0),
        Err(SimputError::Cache(CacheError::Full {
            kind: "image",
            capacity: 1
        }))
    ));
    // The stored image is still usable.
    assert!(engine.get_photon(0, 0.0, 0.0).is_ok());
}

#[test]
fn test_source_store_evicts() {
    let config = EngineConfig {
        max_sources: 1,
        ..Default::default()
    };
    let mut engine = engine_with(vec![source(1, 1e-10), source(2, 2e-10)], config);
    let r1 = engine.photon_rate(0, 0.0, 0.0).unwrap();
    let r2 = engine.photon_rate(1, 0.0, 0.0).unwrap();
    assert!(!engine.sources.contains_key(&0));
    assert_abs_diff_eq!(r2, 2.0 * r1, epsilon = 1e-9 * r2);
    assert_abs_diff_eq!(engine.photon_rate(0, 0.0, 0.0).unwrap(), r1);
    assert!(matches!(
        engine.photon_rate(2, 0.0, 0.0),
        Err(SimputError::Source(_))
    ));
}

#[test]
fn test_replacing_the_arf() {
    let mut engine = engine_for(vec![source(1, 1e-10)]);
    let before = engine.photon_rate(0, 0.0, 0.0).unwrap();
    engine.set_arf(arf(2.0));
    let after = engine.photon_rate(0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(after, 2.0 * before, epsilon = 1e-9 * after);
}

#[test]
fn test_invalid_config() {
    let config = EngineConfig {
        psd_len: Some(100),
        ..Default::default()
    };
    let result = PhotonEngine::new(
        Box::new(SourceTable::default()),
        Box::new(MemoryLoader::new()),
        config,
    );
    assert!(matches!(result, Err(SimputError::Config(_))));
}
