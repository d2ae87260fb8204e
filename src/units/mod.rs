// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse unit tags and convert quantities into the units used
//! internally: radians, keV, seconds, Hz and erg/s/cm^2.

mod error;

pub use error::UnitParseError;

use std::str::FromStr;

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::constants::PI;

/// A unit that can be converted into this crate's internal unit of the same
/// kind by multiplication.
pub trait Unit: Copy + FromStr + IntoEnumIterator + Into<&'static str> {
    /// What kind of quantity this is, e.g. "angle".
    const KIND: &'static str;

    /// The factor that converts a value in this unit into the internal unit.
    fn factor(self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum AngleUnit {
    #[strum(to_string = "rad", serialize = "radian", serialize = "radians")]
    Rad,

    #[strum(to_string = "deg", serialize = "degree", serialize = "degrees")]
    Deg,

    #[strum(to_string = "arcmin")]
    Arcmin,

    #[strum(to_string = "arcsec")]
    Arcsec,
}

impl Unit for AngleUnit {
    const KIND: &'static str = "angle";

    fn factor(self) -> f64 {
        match self {
            AngleUnit::Rad => 1.0,
            AngleUnit::Deg => PI / 180.0,
            AngleUnit::Arcmin => PI / 180.0 / 60.0,
            AngleUnit::Arcsec => PI / 180.0 / 3600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum EnergyUnit {
    #[strum(to_string = "keV")]
    KeV,

    #[strum(to_string = "eV")]
    EV,

    #[strum(to_string = "MeV")]
    MeV,
}

impl Unit for EnergyUnit {
    const KIND: &'static str = "energy";

    fn factor(self) -> f64 {
        match self {
            EnergyUnit::KeV => 1.0,
            EnergyUnit::EV => 1e-3,
            EnergyUnit::MeV => 1e3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum TimeUnit {
    #[strum(to_string = "s", serialize = "sec")]
    S,

    #[strum(to_string = "ms")]
    Ms,

    #[strum(to_string = "d", serialize = "day")]
    D,
}

impl Unit for TimeUnit {
    const KIND: &'static str = "time";

    fn factor(self) -> f64 {
        match self {
            TimeUnit::S => 1.0,
            TimeUnit::Ms => 1e-3,
            TimeUnit::D => crate::constants::DAYSEC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
#[allow(non_camel_case_types)]
pub enum FreqUnit {
    #[strum(to_string = "Hz")]
    Hz,

    #[strum(to_string = "kHz")]
    kHz,
}

impl Unit for FreqUnit {
    const KIND: &'static str = "frequency";

    fn factor(self) -> f64 {
        match self {
            FreqUnit::Hz => 1.0,
            FreqUnit::kHz => 1e3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum EnergyFluxUnit {
    #[strum(
        to_string = "erg/s/cm**2",
        serialize = "erg/cm**2/s",
        serialize = "erg/s/cm^2"
    )]
    ErgPerSecPerCm2,
}

impl Unit for EnergyFluxUnit {
    const KIND: &'static str = "energy flux";

    fn factor(self) -> f64 {
        1.0
    }
}

/// Parse a unit tag (e.g. a FITS TUNITn value). Surrounding whitespace is
/// ignored, as is case.
pub fn parse_unit<U: Unit>(s: &str) -> Result<U, UnitParseError> {
    U::from_str(s.trim()).map_err(|_| UnitParseError::UnknownUnit {
        input: s.to_string(),
        unit_type: U::KIND,
        supported: U::iter().map(|u| -> &'static str { u.into() }).join(", "),
    })
}

/// Convert a value tagged with the unit `unit` into the internal unit.
pub fn to_internal<U: Unit>(value: f64, unit: &str) -> Result<f64, UnitParseError> {
    Ok(value * parse_unit::<U>(unit)?.factor())
}

/// Parse a string that may have a unit attached to it, e.g. "10 arcmin". If
/// there is no unit, the number is returned as-is along with `None`.
pub fn parse_quantity<U: Unit>(s: &str) -> Result<(f64, Option<U>), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, None));
    };

    let trimmed = s.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .unwrap_or(trimmed.len());
    // An "e" directly followed by a letter belongs to the unit (e.g. "eV").
    let split = match trimmed[..split].rfind(['e', 'E']) {
        Some(i) if trimmed[..split].len() == i + 1 => i,
        _ => split,
    };
    let (prefix, suffix) = trimmed.split_at(split);
    let unit = match U::from_str(suffix.trim()) {
        Ok(u) => u,
        Err(_) => {
            return Err(UnitParseError::Unknown {
                input: s.to_string(),
                unit_type: U::KIND,
            })
        }
    };
    match prefix.trim().parse() {
        Ok(n) => Ok((n, Some(unit))),
        Err(_) => Err(UnitParseError::GotUnitButCantParse {
            input: s.to_string(),
            unit: unit.into(),
        }),
    }
}
