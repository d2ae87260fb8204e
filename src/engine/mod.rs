// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The photon engine: turns the sources of a catalog into photons.

A [`PhotonEngine`] owns everything a simulation needs besides the catalog
itself: the instrument response, the random number generator and one
fixed-capacity store per kind of derived object (spectra, spectral
distributions, light curves, images, ...). Objects are created the first
time they are needed and stay in their store until they are evicted.

Running out of a light curve is not an error. Photon-producing functions
return `Ok(None)` in that case, and the caller may carry on with another
source or another time.
 */

#[cfg(test)]
mod tests;

use std::{cell::Cell, collections::HashMap, rc::Rc};

use log::{debug, trace};

use crate::{
    cache::{Overflow, SlotStore},
    config::EngineConfig,
    coord::RADec,
    extension::{
        is_blank, resolve_reference, resolve_relative_to, ExtType, Extension, ExtensionLoader,
    },
    image::SimputImage,
    light_curve::{draw_time, KrLightCurve, KrStep, LightCurve, LightCurveError, Timeline},
    photon_list::PhotonList,
    psd::{synthesize, Psd},
    random::{exponential, RandomSource, SeededRng},
    response::Arf,
    source::{Source, SourceCatalog},
    spectrum::{MissionIndependentSpectrum, SpectralDistribution},
    SimputError,
};

/// A simulated photon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub src_id: i64,
    /// Arrival time \[s\].
    pub time: f64,
    /// \[keV\]
    pub energy: f64,
    /// \[rad\]
    pub ra: f64,
    /// \[rad\]
    pub dec: f64,
}

/// A catalog row along with its average photon rate, once that is known.
#[derive(Debug)]
struct SourceEntry {
    source: Source,
    rate: Cell<Option<f64>>,
}

/// Light curves are keyed by their reference and, if they were synthesised
/// for one source only, that source's ID.
type LightCurveKey = (String, Option<i64>);

#[derive(Debug, Clone, Copy)]
enum RefColumn {
    Spectrum,
    Image,
}

impl RefColumn {
    fn name(self) -> &'static str {
        match self {
            RefColumn::Spectrum => "SPECTRUM",
            RefColumn::Image => "IMAGE",
        }
    }
}

pub struct PhotonEngine {
    catalog: Box<dyn SourceCatalog>,
    loader: Box<dyn ExtensionLoader>,
    arf: Option<Arf>,
    /// Created on first use if none was given.
    rng: Option<Box<dyn RandomSource>>,
    config: EngineConfig,

    ext_types: HashMap<String, ExtType>,
    sources: SlotStore<usize, SourceEntry>,
    spectra: SlotStore<String, MissionIndependentSpectrum>,
    distributions: SlotStore<String, SpectralDistribution>,
    light_curves: SlotStore<LightCurveKey, LightCurve>,
    kr_light_curves: SlotStore<LightCurveKey, KrLightCurve>,
    images: SlotStore<String, SimputImage>,
    psds: SlotStore<String, Psd>,
    photon_lists: SlotStore<String, PhotonList>,
}

impl PhotonEngine {
    pub fn new(
        catalog: Box<dyn SourceCatalog>,
        loader: Box<dyn ExtensionLoader>,
        config: EngineConfig,
    ) -> Result<PhotonEngine, SimputError> {
        config.validate()?;
        let rng = config
            .seed
            .map(|seed| Box::new(SeededRng::new(seed)) as Box<dyn RandomSource>);
        debug!("New photon engine for a catalog of {} sources", catalog.len());

        Ok(PhotonEngine {
            catalog,
            loader,
            arf: None,
            rng,
            ext_types: HashMap::new(),
            sources: SlotStore::new("source", config.max_sources, Overflow::Evict),
            spectra: SlotStore::new("spectrum", config.max_midp_spectra, Overflow::Evict),
            distributions: SlotStore::new(
                "spectral distribution",
                config.max_spectral_distributions,
                Overflow::Evict,
            ),
            light_curves: SlotStore::new("light curve", config.max_light_curves, Overflow::Evict),
            kr_light_curves: SlotStore::new(
                "K&R light curve",
                config.max_kr_light_curves,
                Overflow::Evict,
            ),
            images: SlotStore::new("image", config.max_images, Overflow::Fail),
            psds: SlotStore::new("PSD", config.max_psds, Overflow::Fail),
            photon_lists: SlotStore::new("photon list", config.max_photon_lists, Overflow::Fail),
            config,
        })
    }

    pub fn with_arf(mut self, arf: Arf) -> Self {
        self.set_arf(arf);
        self
    }

    /// Use a new instrument response. Everything derived from the previous
    /// one is forgotten.
    pub fn set_arf(&mut self, arf: Arf) {
        if self.arf.is_some() {
            debug!("Replacing the ARF; dropping spectral distributions, photon lists and rates");
            let c = &self.config;
            self.sources = SlotStore::new("source", c.max_sources, Overflow::Evict);
            self.distributions = SlotStore::new(
                "spectral distribution",
                c.max_spectral_distributions,
                Overflow::Evict,
            );
            self.photon_lists =
                SlotStore::new("photon list", c.max_photon_lists, Overflow::Fail);
        }
        self.arf = Some(arf);
    }

    /// Use `rng` for all random numbers from now on.
    pub fn set_rng(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = Some(rng);
    }

    pub fn catalog(&self) -> &dyn SourceCatalog {
        self.catalog.as_ref()
    }

    pub fn arf(&self) -> Option<&Arf> {
        self.arf.as_ref()
    }

    /// Produce the next photon of the source in catalog row `row` after
    /// `prev_time` \[s\], with times relative to `mjdref` \[d\]. `Ok(None)`
    /// means the source emits no further photons after `prev_time`.
    pub fn get_photon(
        &mut self,
        row: usize,
        prev_time: f64,
        mjdref: f64,
    ) -> Result<Option<Photon>, SimputError> {
        let entry = self.source_entry(row)?;
        let time = match self.photon_time(&entry, prev_time, mjdref)? {
            Some(t) => t,
            None => return Ok(None),
        };
        let (energy, position) = self.energy_and_position(&entry, time, mjdref)?;
        trace!(
            "Source {}: photon at {time} s, {energy} keV, {position}",
            entry.source.src_id
        );

        Ok(Some(Photon {
            src_id: entry.source.src_id,
            time,
            energy,
            ra: position.ra,
            dec: position.dec,
        }))
    }

    /// The average rate of detected photons of the source in catalog row
    /// `row` \[photons/s\]. `time` and `mjdref` select the spectrum if the
    /// source's light curve has a spectrum column.
    pub fn photon_rate(&mut self, row: usize, time: f64, mjdref: f64) -> Result<f64, SimputError> {
        let entry = self.source_entry(row)?;
        self.rate_of(&entry, time, mjdref)
    }

    /// The largest angular distance of any photon of the source in catalog
    /// row `row` from the source's position \[rad\]. Point sources have an
    /// extension of zero.
    pub fn source_extension(
        &mut self,
        row: usize,
        time: f64,
        mjdref: f64,
    ) -> Result<f64, SimputError> {
        let entry = self.source_entry(row)?;
        let imgref = self.extension_ref(&entry.source, time, mjdref, RefColumn::Image)?;
        match (self.ext_type(imgref.as_deref())?, imgref) {
            (ExtType::None, _) => Ok(0.0),
            (ExtType::Image, Some(r)) => Ok(self.image(&r)?.extension(entry.source.imgscal)?),
            (ExtType::PhotonList, Some(r)) => Ok(self.photon_list(&r)?.extension()),
            (found, r) => Err(unexpected(&r.unwrap_or_default(), "an image", found)),
        }
    }

    fn source_entry(&mut self, row: usize) -> Result<Rc<SourceEntry>, SimputError> {
        let catalog = &self.catalog;
        self.sources.get_or_try_insert_with(&row, || {
            Ok(SourceEntry {
                source: catalog.source(row)?,
                rate: Cell::new(None),
            })
        })
    }

    fn ext_type(&mut self, reference: Option<&str>) -> Result<ExtType, SimputError> {
        let reference = match reference {
            Some(r) => r,
            None => return Ok(ExtType::None),
        };
        if let Some(t) = self.ext_types.get(reference) {
            return Ok(*t);
        }
        let t = self.loader.ext_type(reference)?;
        trace!("'{reference}' is {}", <&str>::from(t));
        self.ext_types.insert(reference.to_string(), t);
        Ok(t)
    }

    /// The resolved spectrum or image reference of `src` at `time`. If the
    /// source's light curve has a column for it, the entry of the bin
    /// containing `time` is used.
    fn extension_ref(
        &mut self,
        src: &Source,
        time: f64,
        mjdref: f64,
        column: RefColumn,
    ) -> Result<Option<String>, SimputError> {
        let timeref = resolve_reference(self.catalog.location(), &src.timing);
        if let Some(timeref) = timeref {
            if self.ext_type(Some(&timeref))? == ExtType::LightCurve {
                let lc = self.light_curve(&timeref, src, time, mjdref)?;
                let entries = match column {
                    RefColumn::Spectrum => lc.spectrum.as_ref(),
                    RefColumn::Image => lc.image.as_ref(),
                };
                if let Some(entries) = entries {
                    let (k, _) = lc.timeline.bin_at(time, mjdref)?;
                    let raw = &entries[k];
                    if is_blank(raw) {
                        return Err(SimputError::BlankColumnEntry {
                            reference: timeref,
                            column: column.name(),
                        });
                    }
                    return Ok(resolve_relative_to(&timeref, raw));
                }
            }
        }

        let raw = match column {
            RefColumn::Spectrum => &src.spectrum,
            RefColumn::Image => &src.image,
        };
        Ok(resolve_reference(self.catalog.location(), raw))
    }

    fn rate_of(
        &mut self,
        entry: &SourceEntry,
        time: f64,
        mjdref: f64,
    ) -> Result<f64, SimputError> {
        if let Some(rate) = entry.rate.get() {
            return Ok(rate);
        }
        if self.arf.is_none() {
            return Err(SimputError::NoResponse);
        }
        let src = &entry.source;
        let specref = self.extension_ref(src, time, mjdref, RefColumn::Spectrum)?;

        let rate = match (self.ext_type(specref.as_deref())?, specref) {
            (ExtType::Spectrum, Some(reference)) => {
                let spectrum = self.spectrum(&reference)?;
                let band_flux = spectrum.band_flux(src.e_min, src.e_max);
                if !(band_flux > 0.0) {
                    return Err(zero_reference_flux(src));
                }
                let dist = self.distribution(&reference)?;
                src.eflux / band_flux * dist.total()
            }

            (ExtType::PhotonList, Some(reference)) => {
                let list = self.photon_list(&reference)?;
                let band_energy = list.band_energy(src.e_min, src.e_max);
                if !(band_energy > 0.0) {
                    return Err(zero_reference_flux(src));
                }
                let arf = self.arf.as_ref().ok_or(SimputError::NoResponse)?;
                src.eflux / band_energy * list.detected_area(arf)
            }

            (_, reference) => {
                return Err(SimputError::NoSpectrum {
                    src_id: src.src_id,
                    reference: reference.unwrap_or_default(),
                })
            }
        };

        debug!("Source {}: average photon rate {rate} /s", src.src_id);
        entry.rate.set(Some(rate));
        Ok(rate)
    }

    fn photon_time(
        &mut self,
        entry: &SourceEntry,
        prev_time: f64,
        mjdref: f64,
    ) -> Result<Option<f64>, SimputError> {
        let rate = match self.rate_of(entry, prev_time, mjdref) {
            Ok(rate) => rate,
            // The light curve holding the spectrum column has ended.
            Err(SimputError::LightCurve(LightCurveError::TimeOutOfRange { .. })) => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };
        if rate == 0.0 {
            return Ok(None);
        }

        let src = &entry.source;
        let timeref = match resolve_reference(self.catalog.location(), &src.timing) {
            Some(t) => t,
            // Constant brightness.
            None => {
                let rng = default_rng(&mut self.rng);
                return Ok(Some(prev_time + exponential(rng, 1.0 / rate)));
            }
        };
        if self.ext_type(Some(&timeref))? == ExtType::PhotonList {
            return Err(SimputError::PhotonListTiming(timeref));
        }

        let mut kr = self.kr_light_curve(&timeref, src, prev_time, mjdref)?;
        let mut time = prev_time;
        let mut u = default_rng(&mut self.rng).uniform();
        loop {
            match draw_time(&kr, time, mjdref, rate, u) {
                Ok(KrStep::Found(t)) => return Ok(Some(t)),

                Ok(KrStep::Exhausted {
                    resume_time,
                    residual_u,
                }) if kr.is_extendable() => {
                    trace!("Source {}: light curve ended at {resume_time} s", src.src_id);
                    time = resume_time;
                    u = residual_u;
                    kr = self.kr_light_curve(&timeref, src, time, mjdref)?;
                }

                Ok(KrStep::Exhausted { .. }) | Err(LightCurveError::TimeOutOfRange { .. }) => {
                    return Ok(None)
                }

                Err(e) => return Err(e.into()),
            }
        }
    }

    fn energy_and_position(
        &mut self,
        entry: &SourceEntry,
        time: f64,
        mjdref: f64,
    ) -> Result<(f64, RADec), SimputError> {
        let src = &entry.source;
        let specref = self.extension_ref(src, time, mjdref, RefColumn::Spectrum)?;
        let imgref = self.extension_ref(src, time, mjdref, RefColumn::Image)?;
        let spectype = self.ext_type(specref.as_deref())?;
        let imgtype = self.ext_type(imgref.as_deref())?;

        // A photon list provides the energy and the position together.
        let event = match (spectype, &specref, imgtype, &imgref) {
            (ExtType::PhotonList, Some(r), ..) | (_, _, ExtType::PhotonList, Some(r)) => {
                let list = self.photon_list(r)?;
                let arf = self.arf.as_ref().ok_or(SimputError::NoResponse)?;
                Some(list.draw(arf, default_rng(&mut self.rng)))
            }
            _ => None,
        };

        let energy = match (event, spectype, &specref) {
            (Some(event), ExtType::PhotonList, _) => event.energy,
            (_, ExtType::Spectrum, Some(r)) => {
                let dist = self.distribution(r)?;
                let arf = self.arf.as_ref().ok_or(SimputError::NoResponse)?;
                dist.sample_energy(arf, default_rng(&mut self.rng))
            }
            _ => {
                return Err(SimputError::NoSpectrum {
                    src_id: src.src_id,
                    reference: specref.clone().unwrap_or_default(),
                })
            }
        };

        let position = match (event, imgtype, &imgref) {
            (Some(event), ExtType::PhotonList, _) => RADec::new(event.ra, event.dec),
            (_, ExtType::None, _) => src.position,
            (_, ExtType::Image, Some(r)) => {
                let image = self.image(r)?;
                image.sample_position(
                    src.position,
                    src.imgrota,
                    src.imgscal,
                    default_rng(&mut self.rng),
                )?
            }
            (_, found, r) => {
                return Err(unexpected(
                    r.as_deref().unwrap_or_default(),
                    "an image",
                    found,
                ))
            }
        };

        Ok((energy, position))
    }

    fn light_curve(
        &mut self,
        timeref: &str,
        src: &Source,
        time: f64,
        mjdref: f64,
    ) -> Result<Rc<LightCurve>, SimputError> {
        match self.ext_type(Some(timeref))? {
            ExtType::LightCurve => {
                let loader = &self.loader;
                self.light_curves
                    .get_or_try_insert_with(&(timeref.to_string(), None), || {
                        match loader.load(timeref)? {
                            Extension::LightCurve(lc) => Ok(lc),
                            other => Err(unexpected(timeref, "a light curve", other.ext_type())),
                        }
                    })
            }

            ExtType::Psd => {
                // Synthesised light curves belong to one source, and are
                // replaced by a new realisation once `time` leaves them.
                let key = (timeref.to_string(), Some(src.src_id));
                if let Some(lc) = self.light_curves.get(&key) {
                    if covers(&lc.timeline, time, mjdref) {
                        return Ok(lc);
                    }
                }
                let psd = self.psd(timeref)?;
                let rng = default_rng(&mut self.rng);
                let lc = synthesize(&psd, self.config.psd_len, time, mjdref, src.src_id, rng)?;
                debug!(
                    "Source {}: synthesised a light curve from '{timeref}' covering {time} s to {} s",
                    src.src_id,
                    lc.timeline.end_time(mjdref)
                );
                Ok(self.light_curves.insert(key, lc)?)
            }

            ExtType::PhotonList => Err(SimputError::PhotonListTiming(timeref.to_string())),

            found => Err(unexpected(timeref, "a light curve or a PSD", found)),
        }
    }

    fn kr_light_curve(
        &mut self,
        timeref: &str,
        src: &Source,
        time: f64,
        mjdref: f64,
    ) -> Result<Rc<KrLightCurve>, SimputError> {
        let per_source = self.ext_type(Some(timeref))? == ExtType::Psd;
        let key = (timeref.to_string(), per_source.then_some(src.src_id));
        if let Some(kr) = self.kr_light_curves.get(&key) {
            if !per_source || covers(&kr.timeline, time, mjdref) {
                return Ok(kr);
            }
        }
        let lc = self.light_curve(timeref, src, time, mjdref)?;
        let kr = KrLightCurve::from_light_curve(&lc);
        Ok(self.kr_light_curves.insert(key, kr)?)
    }

    fn spectrum(&mut self, reference: &str) -> Result<Rc<MissionIndependentSpectrum>, SimputError> {
        let loader = &self.loader;
        self.spectra
            .get_or_try_insert_with(&reference.to_string(), || match loader.load(reference)? {
                Extension::Spectrum(s) => Ok(s),
                other => Err(unexpected(reference, "a spectrum", other.ext_type())),
            })
    }

    fn distribution(&mut self, reference: &str) -> Result<Rc<SpectralDistribution>, SimputError> {
        let key = reference.to_string();
        if let Some(dist) = self.distributions.get(&key) {
            return Ok(dist);
        }
        let spectrum = self.spectrum(reference)?;
        let arf = self.arf.as_ref().ok_or(SimputError::NoResponse)?;
        let dist = SpectralDistribution::build(&spectrum, arf);
        Ok(self.distributions.insert(key, dist)?)
    }

    fn image(&mut self, reference: &str) -> Result<Rc<SimputImage>, SimputError> {
        let loader = &self.loader;
        self.images
            .get_or_try_insert_with(&reference.to_string(), || match loader.load(reference)? {
                Extension::Image(img) => Ok(img),
                other => Err(unexpected(reference, "an image", other.ext_type())),
            })
    }

    fn psd(&mut self, reference: &str) -> Result<Rc<Psd>, SimputError> {
        let loader = &self.loader;
        self.psds
            .get_or_try_insert_with(&reference.to_string(), || match loader.load(reference)? {
                Extension::Psd(psd) => Ok(psd),
                other => Err(unexpected(reference, "a PSD", other.ext_type())),
            })
    }

    fn photon_list(&mut self, reference: &str) -> Result<Rc<PhotonList>, SimputError> {
        let key = reference.to_string();
        if let Some(list) = self.photon_lists.get(&key) {
            return Ok(list);
        }
        let arf = self.arf.as_ref().ok_or(SimputError::NoResponse)?;
        let events = match self.loader.load(reference)? {
            Extension::PhotonList(events) => events,
            other => return Err(unexpected(reference, "a photon list", other.ext_type())),
        };
        let list = PhotonList::new(key.clone(), Box::new(events), arf)?;
        Ok(self.photon_lists.insert(key, list)?)
    }
}

/// The engine's generator, creating the default one if necessary.
fn default_rng(rng: &mut Option<Box<dyn RandomSource>>) -> &mut dyn RandomSource {
    rng.get_or_insert_with(|| Box::new(SeededRng::from_clock()) as Box<dyn RandomSource>)
        .as_mut()
}

/// Is `time` within the interval of a synthesised light curve?
fn covers(timeline: &Timeline, time: f64, mjdref: f64) -> bool {
    time >= timeline.time_at(0, 0, mjdref) && time < timeline.end_time(mjdref)
}

fn unexpected(reference: &str, expected: &'static str, found: ExtType) -> SimputError {
    SimputError::UnexpectedExtension {
        reference: reference.to_string(),
        expected,
        found: found.into(),
    }
}

fn zero_reference_flux(src: &Source) -> SimputError {
    SimputError::ZeroReferenceFlux {
        src_id: src.src_id,
        e_min: src.e_min,
        e_max: src.e_max,
    }
}

impl std::fmt::Debug for PhotonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotonEngine")
            .field("sources", &self.catalog.len())
            .field("arf", &self.arf)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
