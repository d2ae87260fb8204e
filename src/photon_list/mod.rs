// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Photon lists: sources given as a list of individual photons rather than a
spectral model and image. Photons are drawn from the list at random and kept
with a probability proportional to the instrument's effective area at their
energy.
 */

mod error;

pub use error::PhotonListError;

use log::debug;

use crate::{
    constants::{KEV2ERG, PI, TAU},
    random::RandomSource,
    response::Arf,
};

/// One tabulated photon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// \[keV\]
    pub energy: f64,
    /// \[rad\]
    pub ra: f64,
    /// \[rad\]
    pub dec: f64,
}

/// Random access to the photons of a list, which may be too large to keep in
/// memory.
pub trait EventSource {
    fn len(&self) -> usize;

    fn event(&self, index: usize) -> Event;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSource for Vec<Event> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn event(&self, index: usize) -> Event {
        self[index]
    }
}

pub struct PhotonList {
    pub name: String,
    events: Box<dyn EventSource>,
    /// The largest effective area of the instrument; the acceptance
    /// probability of a photon is its effective area divided by this.
    refarea: f64,
}

impl PhotonList {
    /// Wrap `events` for sampling with the instrument response `arf`. Fails if
    /// no photon in the list could ever be accepted, because sampling would
    /// never finish.
    pub fn new(
        name: String,
        events: Box<dyn EventSource>,
        arf: &Arf,
    ) -> Result<PhotonList, PhotonListError> {
        if events.is_empty() {
            return Err(PhotonListError::Empty(name));
        }
        let detectable = (0..events.len()).any(|i| arf.area_at(events.event(i).energy) > 0.0);
        if !detectable {
            return Err(PhotonListError::NoDetectableEvents(name));
        }
        debug!("Photon list '{name}' has {} photons", events.len());

        Ok(PhotonList {
            name,
            events,
            refarea: arf.max_area(),
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn event(&self, index: usize) -> Event {
        self.events.event(index)
    }

    /// Draw a photon. Photons are picked uniformly from the list and accepted
    /// with probability `area(energy) / max_area`; rejected photons are
    /// redrawn until one is accepted.
    pub fn draw(&self, arf: &Arf, rng: &mut dyn RandomSource) -> Event {
        let n = self.len();
        loop {
            let index = ((rng.uniform() * n as f64) as usize).min(n - 1);
            let event = self.events.event(index);
            if rng.uniform() < arf.area_at(event.energy) / self.refarea {
                return event;
            }
        }
    }

    /// The energy carried by the photons with energies between `e_min` and
    /// `e_max` (inclusive) \[erg\].
    pub fn band_energy(&self, e_min: f64, e_max: f64) -> f64 {
        (0..self.len())
            .map(|i| self.events.event(i).energy)
            .filter(|e| (e_min..=e_max).contains(e))
            .sum::<f64>()
            * KEV2ERG
    }

    /// The sum of the effective areas seen by all photons \[cm^2\].
    pub fn detected_area(&self, arf: &Arf) -> f64 {
        (0..self.len())
            .map(|i| arf.area_at(self.events.event(i).energy))
            .sum()
    }

    /// The largest angular offset of any photon from the list's origin
    /// \[rad\].
    pub fn extension(&self) -> f64 {
        (0..self.len())
            .map(|i| {
                let e = self.events.event(i);
                let ra = if e.ra > PI { e.ra - TAU } else { e.ra };
                ra.hypot(e.dec)
            })
            .fold(0.0, f64::max)
    }
}

impl std::fmt::Debug for PhotonList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotonList")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("refarea", &self.refarea)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        random::{Replay, SeededRng},
        response::ArfBin,
    };

    fn arf() -> Arf {
        Arf::new(vec![
            ArfBin {
                e_low: 1.0,
                e_high: 2.0,
                area: 100.0,
            },
            ArfBin {
                e_low: 2.0,
                e_high: 3.0,
                area: 25.0,
            },
        ])
        .unwrap()
    }

    fn event(energy: f64, ra: f64, dec: f64) -> Event {
        Event { energy, ra, dec }
    }

    #[test]
    fn test_rejects_undetectable_lists() {
        let arf = arf();
        assert_eq!(
            PhotonList::new("a".to_string(), Box::new(Vec::<Event>::new()), &arf).unwrap_err(),
            PhotonListError::Empty("a".to_string())
        );
        let events = vec![event(0.5, 0.0, 0.0), event(10.0, 0.0, 0.0)];
        assert_eq!(
            PhotonList::new("a".to_string(), Box::new(events), &arf).unwrap_err(),
            PhotonListError::NoDetectableEvents("a".to_string())
        );
    }

    #[test]
    fn test_rejection_sampling() {
        let arf = arf();
        let events = vec![event(1.5, 0.1, 0.2), event(2.5, 0.3, 0.4), event(5.0, 0.0, 0.0)];
        let list = PhotonList::new("a".to_string(), Box::new(events), &arf).unwrap();

        // Pick index 1 (u = 0.5), reject (0.3 >= 0.25), pick index 0, accept.
        let mut rng = Replay::new(&[0.5, 0.3, 0.1, 0.99]);
        assert_eq!(list.draw(&arf, &mut rng), event(1.5, 0.1, 0.2));

        let mut rng = SeededRng::new(8);
        let mut counts = [0usize; 3];
        let n = 40_000;
        for _ in 0..n {
            let e = list.draw(&arf, &mut rng);
            let i = [1.5, 2.5, 5.0].iter().position(|&x| x == e.energy).unwrap();
            counts[i] += 1;
        }
        // Acceptance is proportional to 100 : 25 : 0.
        assert_eq!(counts[2], 0);
        assert_abs_diff_eq!(counts[0] as f64 / n as f64, 0.8, epsilon = 0.01);
        assert_abs_diff_eq!(counts[1] as f64 / n as f64, 0.2, epsilon = 0.01);
    }

    #[test]
    fn test_rate_ingredients() {
        let arf = arf();
        let events = vec![event(1.5, 0.0, 0.0), event(2.5, 0.0, 0.0), event(5.0, 0.0, 0.0)];
        let list = PhotonList::new("a".to_string(), Box::new(events), &arf).unwrap();
        assert_abs_diff_eq!(list.band_energy(1.0, 2.5), 4.0 * KEV2ERG, epsilon = 1e-20);
        assert_abs_diff_eq!(list.detected_area(&arf), 125.0);
    }

    #[test]
    fn test_extension() {
        let arf = arf();
        let events = vec![
            event(1.5, 0.01, 0.0),
            event(1.5, TAU - 0.03, 0.04),
            event(1.5, 0.0, -0.02),
        ];
        let list = PhotonList::new("a".to_string(), Box::new(events), &arf).unwrap();
        assert_abs_diff_eq!(list.extension(), 0.05, epsilon = 1e-12);
    }
}
