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

//! # Twopower
//!
//! A library for evaluating gravitational potentials generated by spherical
//! mass distributions whose density is a product of two power laws,
//!
//! $$ \rho(r) = \frac{A}{4\pi a^3} \frac{1}{(r/a)^\alpha (1 + r/a)^{\beta - \alpha}}. $$
//!
//! Potential, forces, second derivatives, enclosed mass and surface density are
//! evaluated in closed form at cylindrical coordinates $(R, z)$. Every profile picks
//! the cheapest valid formula family for its exponents: elementary expressions for
//! the Hernquist, Jaffe and NFW profiles, and Γ/₂F₁ expressions otherwise.
//!
//! ## Examples
//! ~~~
//! use twopower::{AxisymmetricPotential, spherical::{Hernquist, TwoPowerSpherical}};
//! let hernquist = Hernquist::new(1.0, 1.0);
//! assert_eq!(hernquist.potential(0.0, 0.0), -0.5);
//!
//! // The same profile reached through the general constructor
//! let generic = TwoPowerSpherical::new(1.0, 1.0, 1.0, 4.0);
//! assert_eq!(generic.potential(0.3, 0.4), hernquist.potential(0.3, 0.4));
//! ~~~

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Vector3 = nalgebra::Vector3<f64>;

mod error;
pub mod roots;
pub(crate) mod special;
pub mod spherical;
pub mod units;

pub use error::{PotentialError, Result};

use dyn_clone::DynClone;
use physical_constants::NEWTONIAN_CONSTANT_OF_GRAVITATION;
use std::fmt::Debug;

/// Solar mass (kg), IAU 2015 nominal value divided by CODATA G.
pub const SOLAR_MASS: f64 = 1.988_409_870_698_051e30;

/// Parsec (m), IAU 2015 definition.
pub const PARSEC: f64 = 3.085_677_581_491_367_3e16;

/// Julian year (s)
pub const JULIAN_YEAR: f64 = 365.25 * 86400.0;

/// Gravitational constant in pc × (km/s)² / M☉.
///
/// Examples:
/// ```
/// use twopower::GRAVITATIONAL_CONSTANT;
/// assert!((GRAVITATIONAL_CONSTANT - 4.3009e-3).abs() < 1e-6);
/// ```
pub const GRAVITATIONAL_CONSTANT: f64 =
    NEWTONIAN_CONSTANT_OF_GRAVITATION * SOLAR_MASS / (PARSEC * 1.0e6);

/// Defines information about a concept, like a short name, citation, url etc.
pub trait Info {
    /// Returns a short name for the concept. Use `_` for spaces and avoid weird characters.
    /// This is typically used as keywords in user input and output, e.g. in JSON files.
    fn short_name(&self) -> Option<&'static str> {
        None
    }
    /// Returns a long name for the concept. Spaces are allowed.
    fn long_name(&self) -> Option<&'static str> {
        None
    }
    /// Returns a citation string which should be a
    /// 1. Digital Object Identifier (DOI) in the format `doi:...` (preferred)
    /// 2. URL in the format `https://...`
    fn citation(&self) -> Option<&'static str> {
        None
    }
    /// Tries to extract a URL from the citation string
    fn url(&self) -> Option<String> {
        match self.citation() {
            Some(c) => {
                if c.starts_with("doi:") {
                    Some(format!("https://doi.org/{}", &c[4..]))
                } else if c.starts_with("https://") || c.starts_with("http://") {
                    Some(c.to_string())
                } else {
                    None
                }
            }
            None => None,
        }
    }
}

/// Static, axisymmetric gravitational potential evaluated at cylindrical coordinates.
///
/// `radius` is the cylindrical radius $R \geq 0$ and `height` the vertical coordinate $z$.
/// Azimuth and time are not arguments since all potentials here are static and
/// axisymmetric. Querying never mutates the potential, so a shared reference may be
/// used from several threads as long as nobody mutates it concurrently.
pub trait AxisymmetricPotential: Debug + DynClone + Send + Sync {
    /// Potential, Φ(R, z)
    fn potential(&self, radius: f64, height: f64) -> f64;

    /// Radial force, F_R = -∂Φ/∂R
    fn radial_force(&self, radius: f64, height: f64) -> f64;

    /// Vertical force, F_z = -∂Φ/∂z
    fn vertical_force(&self, radius: f64, height: f64) -> f64;

    /// Mass density, ρ(R, z)
    fn density(&self, radius: f64, height: f64) -> f64;

    /// Mass enclosed within the sphere of radius √(R² + z²)
    fn mass(&self, radius: f64, height: f64) -> f64;

    /// Second radial derivative, ∂²Φ/∂R²
    fn radial_second_derivative(&self, radius: f64, height: f64) -> Result<f64>;

    /// Second vertical derivative, ∂²Φ/∂z²
    fn vertical_second_derivative(&self, radius: f64, height: f64) -> Result<f64>;

    /// Mixed derivative, ∂²Φ/∂R∂z
    fn mixed_derivative(&self, radius: f64, height: f64) -> Result<f64>;

    /// Surface density, Σ(R, z) = ∫ρ(R, z') dz' over -z ≤ z' ≤ z
    fn surface_density(&self, radius: f64, height: f64) -> Result<f64>;

    /// Circular velocity in the plane, v_c = √(R (-F_R))
    fn circular_velocity(&self, radius: f64) -> f64 {
        (-radius * self.radial_force(radius, 0.0)).sqrt()
    }

    /// Force vector at a Cartesian position
    fn cartesian_force(&self, position: &Vector3) -> Vector3 {
        let radius = position.x.hypot(position.y);
        let vertical = self.vertical_force(radius, position.z);
        if radius == 0.0 {
            return Vector3::new(0.0, 0.0, vertical);
        }
        let radial = self.radial_force(radius, position.z) / radius;
        Vector3::new(radial * position.x, radial * position.y, vertical)
    }
}

dyn_clone::clone_trait_object!(AxisymmetricPotential);
