// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! # Natural units and cosmology
//!
//! Potentials are evaluated in natural units where lengths are measured in `ro`
//! and velocities in `vo`, so that G = 1. This module converts between those and
//! physical units.

use crate::{GRAVITATIONAL_CONSTANT, JULIAN_YEAR, PARSEC};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Length and velocity scales defining natural units
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields, default)
)]
pub struct NaturalUnits {
    /// Length scale (kpc)
    pub ro: f64,
    /// Velocity scale (km/s)
    pub vo: f64,
}

impl Default for NaturalUnits {
    fn default() -> Self {
        Self {
            ro: 8.0,
            vo: 220.0,
        }
    }
}

impl NaturalUnits {
    pub fn new(ro: f64, vo: f64) -> Self {
        Self { ro, vo }
    }

    /// Density unit expressed in units of the critical density
    ///
    /// `hubble` is the Hubble constant in km/s/Mpc.
    pub fn density_in_critical_density(&self, hubble: f64) -> f64 {
        (self.vo / self.ro).powi(2) * 1e6 / hubble.powi(2) * 8.0 * PI / 3.0
    }

    /// Density unit expressed in units of the mean matter density
    pub fn density_in_mean_matter_density(&self, hubble: f64, omega_matter: f64) -> f64 {
        self.density_in_critical_density(hubble) / omega_matter
    }

    /// Mass unit in 10¹⁰ M☉
    ///
    /// # Examples
    /// ~~~
    /// use twopower::units::NaturalUnits;
    /// let mass = NaturalUnits::default().mass_in_1e10_msun();
    /// assert!((mass - 9.0).abs() < 0.05);
    /// ~~~
    pub fn mass_in_1e10_msun(&self) -> f64 {
        self.vo.powi(2) * self.ro / GRAVITATIONAL_CONSTANT * 1e-7
    }

    /// Velocity unit in kpc/Gyr
    pub fn velocity_in_kpc_per_gyr(&self) -> f64 {
        self.vo * 1e3 * (1e9 * JULIAN_YEAR) / (1e3 * PARSEC)
    }
}

/// Background cosmology
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields, default)
)]
pub struct Cosmology {
    /// Hubble constant (km/s/Mpc)
    #[cfg_attr(feature = "serde", serde(rename = "H"))]
    pub hubble: f64,
    /// Matter density parameter, Ωₘ
    #[cfg_attr(feature = "serde", serde(rename = "Om"))]
    pub omega_matter: f64,
}

impl Default for Cosmology {
    fn default() -> Self {
        Self {
            hubble: 70.0,
            omega_matter: 0.3,
        }
    }
}

/// Reference density for an overdensity contrast
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(rename_all = "snake_case")
)]
pub enum DensityReference {
    /// Critical density of the universe
    Critical,
    /// Mean matter density, Ωₘ times the critical density
    #[default]
    MeanMatter,
}

/// Overdensity contrast defining the virial radius
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields, default)
)]
pub struct Overdensity {
    /// Mean density within the virial radius in units of the reference density
    pub contrast: f64,
    pub reference: DensityReference,
}

impl Default for Overdensity {
    fn default() -> Self {
        Self {
            contrast: 200.0,
            reference: DensityReference::MeanMatter,
        }
    }
}

impl Overdensity {
    pub fn new(contrast: f64, reference: DensityReference) -> Self {
        Self {
            contrast,
            reference,
        }
    }

    /// Overdensity in natural density units
    pub fn in_natural_units(&self, units: &NaturalUnits, cosmology: &Cosmology) -> f64 {
        let reference = match self.reference {
            DensityReference::Critical => units.density_in_critical_density(cosmology.hubble),
            DensityReference::MeanMatter => {
                units.density_in_mean_matter_density(cosmology.hubble, cosmology.omega_matter)
            }
        };
        self.contrast / reference
    }
}
