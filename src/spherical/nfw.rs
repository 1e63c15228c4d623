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

use super::{
    impl_preset, integrate_density, near_scale_radius, real_part, surface_angle, Preset, Quantity,
    TwoPowerSpherical, UnitProfile,
};
use crate::roots::{brent, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::units::{Cosmology, NaturalUnits, Overdensity};
use crate::{AxisymmetricPotential, PotentialError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Radius of maximum circular velocity in units of the scale radius
const RMAX_OVER_SCALE_RADIUS: f64 = 2.162_581_587_064_609_8;

/// Maximum of (ln(1 + x) - x/(1 + x))/x, reached at x = rmax/a
const VMAX_SQUARED_FACTOR: f64 = 0.216_216_595_501_873_12;

/// Bracket for the virial radius in units of the scale radius
const VIRIAL_BRACKET: (f64, f64) = (0.01, 100.0);

/// Elementary closed forms for α = 1, β = 3
///
/// $$ \Phi(r) = -\frac{\ln(1 + r/a)}{r}, \quad M(r) = \ln(1 + r/a) - \frac{r/a}{1 + r/a} $$
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NfwProfile {
    scale_radius: f64,
}

impl NfwProfile {
    pub fn new(scale_radius: f64) -> Self {
        Self { scale_radius }
    }
}

impl UnitProfile for NfwProfile {
    #[inline]
    fn potential(&self, radius: f64, height: f64) -> f64 {
        let r = radius.hypot(height);
        -(r / self.scale_radius).ln_1p() / r
    }

    #[inline]
    fn radial_force(&self, radius: f64, height: f64) -> f64 {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        radius * (1.0 / (r * r * (a + r)) - (r / a).ln_1p() / r.powi(3))
    }

    fn density(&self, radius: f64, height: f64) -> f64 {
        let r = radius.hypot(height);
        1.0 / (4.0 * PI * r * (self.scale_radius + r).powi(2))
    }

    fn mass(&self, radius: f64, height: f64) -> f64 {
        let x = radius.hypot(height) / self.scale_radius;
        x.ln_1p() - x / (1.0 + x)
    }

    fn radial_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        let (rr, zz) = (radius * radius, height * height);
        let log = (r / a).ln_1p();
        Ok((3.0 * rr * rr + 2.0 * rr * (zz + a * r)
            - zz * (zz + a * r)
            - (2.0 * rr - zz) * (a + r).powi(2) * log)
            / (r.powi(5) * (a + r).powi(2)))
    }

    fn mixed_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        let log = (r / a).ln_1p();
        Ok(-radius * height * (-4.0 * r * r - 3.0 * a * r + 3.0 * (a + r).powi(2) * log)
            / (r.powi(5) * (a + r).powi(2)))
    }

    fn surface_density(&self, radius: f64, height: f64) -> Result<f64> {
        let a = self.scale_radius;
        if height == 0.0 {
            return Ok(0.0);
        }
        if radius == a {
            let za2 = (height / a).powi(2);
            return Ok(a * (2.0 + (za2 + 1.0).sqrt() * (za2 - 2.0)) / (6.0 * PI * height.powi(3)));
        }
        if near_scale_radius(radius, a) {
            return Ok(integrate_density(|z| self.density(radius, z), radius, height));
        }
        let z = height.abs();
        let r = radius.hypot(z);
        let rr = radius * radius;
        let (rma, angle) = surface_angle(radius, z, a);
        let value = z / ((r + a) * (rr - a * a)) - a * rma.powi(-3) * angle;
        Ok(height.signum() * real_part(Quantity::SurfaceDensity, value)? / (2.0 * PI))
    }
}

/// Navarro-Frenk-White potential
///
/// Two-power profile with α = 1 and β = 3 describing dark matter halos,
/// [doi:10.1086/304888](https://doi.org/10.1086/304888).
/// The enclosed mass grows logarithmically so the halo is usually truncated at its
/// virial radius, see [`Nfw::from_concentration`] and [`Nfw::virial_radius`].
///
/// # Examples:
/// ~~~
/// use twopower::{AxisymmetricPotential, spherical::Nfw};
/// let nfw = Nfw::new(1.0, 1.0);
/// assert!((nfw.potential(1.0, 0.0) + std::f64::consts::LN_2).abs() < 1e-15);
/// ~~~
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "TwoPowerSpherical", into = "TwoPowerSpherical")
)]
pub struct Nfw(TwoPowerSpherical);

impl Nfw {
    pub fn new(amplitude: f64, scale_radius: f64) -> Self {
        Self(TwoPowerSpherical::with_preset(
            Preset::Nfw,
            amplitude,
            scale_radius,
            1.0,
            3.0,
        ))
    }

    /// Halo from its concentration and virial mass.
    ///
    /// `virial_mass` is in 10¹² M☉; `overdensity` defines the virial radius relative
    /// to the critical or mean matter density of `cosmology`.
    ///
    /// # Examples:
    /// ~~~
    /// use twopower::spherical::Nfw;
    /// use twopower::units::{Cosmology, NaturalUnits, Overdensity};
    /// let (units, cosmology, overdensity) =
    ///     (NaturalUnits::default(), Cosmology::default(), Overdensity::default());
    /// let nfw = Nfw::from_concentration(10.0, 1.0, &units, &cosmology, &overdensity).unwrap();
    /// let rvir = nfw.virial_radius(&units, &cosmology, &overdensity).unwrap();
    /// assert!((rvir / nfw.scale_radius() - 10.0).abs() < 1e-8);
    /// ~~~
    pub fn from_concentration(
        concentration: f64,
        virial_mass: f64,
        units: &NaturalUnits,
        cosmology: &Cosmology,
        overdensity: &Overdensity,
    ) -> Result<Self> {
        for (name, value) in [("concentration", concentration), ("virial mass", virial_mass)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(PotentialError::InvalidParameter { name, value });
            }
        }
        let density = overdensity.in_natural_units(units, cosmology);
        let mass = virial_mass * 100.0 / units.mass_in_1e10_msun();
        let virial_radius = (3.0 * mass / (4.0 * PI * density)).cbrt();
        let amplitude = mass / (concentration.ln_1p() - concentration / (1.0 + concentration));
        let scale_radius = virial_radius / concentration;
        log::trace!(
            "NFW halo with c = {concentration}, rvir = {virial_radius}, a = {scale_radius}"
        );
        Ok(Self::new(amplitude, scale_radius))
    }

    /// Radius within which the mean density equals the overdensity
    pub fn virial_radius(
        &self,
        units: &NaturalUnits,
        cosmology: &Cosmology,
        overdensity: &Overdensity,
    ) -> Result<f64> {
        let scale_radius = self.scale_radius();
        let contrast =
            12.0 * self.density(scale_radius, 0.0) / overdensity.in_natural_units(units, cosmology);
        let (lower, upper) = VIRIAL_BRACKET;
        let root = brent(
            |x| (x.ln_1p() - x / (1.0 + x)) / x.powi(3) - 1.0 / contrast,
            lower,
            upper,
            DEFAULT_TOLERANCE,
            DEFAULT_MAX_ITERATIONS,
        )
        .map_err(|err| {
            log::warn!("virial radius of NFW halo with a = {scale_radius}: {err}");
            err
        })?;
        Ok(root.root * scale_radius)
    }

    /// Radius of the maximum circular velocity
    pub fn rmax(&self) -> f64 {
        RMAX_OVER_SCALE_RADIUS * self.scale_radius()
    }

    /// Maximum circular velocity
    pub fn vmax(&self) -> f64 {
        (self.amplitude() / self.scale_radius() * VMAX_SQUARED_FACTOR).sqrt()
    }

    /// Name of the matching NEMO accelerator
    pub fn nemo_accname(&self) -> &'static str {
        "NFW"
    }

    /// NEMO accelerator parameters, `0,a,vmax` in kpc and kpc/Gyr
    pub fn nemo_accpars(&self, units: &NaturalUnits) -> String {
        format!(
            "0,{:?},{:?}",
            self.scale_radius() * units.ro,
            self.vmax() * units.velocity_in_kpc_per_gyr()
        )
    }
}

impl_preset!(Nfw, Preset::Nfw);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::DensityReference;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_values() {
        let profile = NfwProfile::new(1.0);
        assert_relative_eq!(profile.potential(1.0, 0.0), -std::f64::consts::LN_2);
        assert_relative_eq!(profile.mass(1.0, 0.0), std::f64::consts::LN_2 - 0.5);
        assert_relative_eq!(profile.density(1.0, 0.0), 1.0 / (16.0 * PI));
    }

    #[test]
    fn test_second_derivatives() {
        const STEP: f64 = 1e-5;
        let profile = NfwProfile::new(1.5);
        for (radius, height) in [(0.3, 0.4), (2.0, 1.0), (4.0, -3.0)] {
            let numeric = -(profile.radial_force(radius + STEP, height)
                - profile.radial_force(radius - STEP, height))
                / (2.0 * STEP);
            assert_relative_eq!(
                profile.radial_second_derivative(radius, height).unwrap(),
                numeric,
                max_relative = 1e-6
            );
            let numeric = -(profile.radial_force(radius, height + STEP)
                - profile.radial_force(radius, height - STEP))
                / (2.0 * STEP);
            assert_relative_eq!(
                profile.mixed_derivative(radius, height).unwrap(),
                numeric,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn test_virial_round_trip() {
        let units = NaturalUnits::default();
        let cosmology = Cosmology::default();
        for overdensity in [
            Overdensity::default(),
            Overdensity::new(200.0, DensityReference::Critical),
        ] {
            let nfw = Nfw::from_concentration(10.0, 1.0, &units, &cosmology, &overdensity).unwrap();
            let rvir = nfw.virial_radius(&units, &cosmology, &overdensity).unwrap();
            assert_relative_eq!(rvir / nfw.scale_radius(), 10.0, max_relative = 1e-9);
            // mass within rvir is the virial mass
            let mass = nfw.mass(rvir, 0.0) * units.mass_in_1e10_msun() / 100.0;
            assert_relative_eq!(mass, 1.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_invalid_concentration() {
        let err = Nfw::from_concentration(
            -1.0,
            1.0,
            &NaturalUnits::default(),
            &Cosmology::default(),
            &Overdensity::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PotentialError::InvalidParameter {
                name: "concentration",
                value: -1.0
            }
        );
    }

    #[test]
    fn test_virial_radius_outside_bracket() {
        // a halo so dense that rvir/a exceeds the bracket
        let nfw = Nfw::new(1e12, 1.0);
        let result = nfw.virial_radius(
            &NaturalUnits::default(),
            &Cosmology::default(),
            &Overdensity::default(),
        );
        assert!(matches!(result, Err(PotentialError::NotBracketed { .. })));
    }

    #[test]
    fn test_vmax() {
        let nfw = Nfw::new(2.0, 1.5);
        let vc = nfw.circular_velocity(nfw.rmax());
        assert_relative_eq!(vc, nfw.vmax(), max_relative = 1e-12);
        for radius in [0.5 * nfw.rmax(), 2.0 * nfw.rmax()] {
            assert!(nfw.circular_velocity(radius) < nfw.vmax());
        }
    }

    #[test]
    fn test_nemo() {
        let nfw = Nfw::new(1.0, 2.0);
        let units = NaturalUnits::default();
        assert_eq!(nfw.nemo_accname(), "NFW");
        let pars = nfw.nemo_accpars(&units);
        let fields: Vec<f64> = pars.split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(fields[..2], [0.0, 16.0]);
        assert_relative_eq!(
            fields[2],
            (0.216_216_595_501_873_12_f64 / 2.0).sqrt() * 224.996_676_310_052_9,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_frozen() {
        let mut nfw = Nfw::new(1.0, 1.0);
        for _ in 0..3 {
            assert_eq!(
                nfw.set_alpha(1.5),
                Err(PotentialError::FrozenExponent {
                    profile: "NFW",
                    exponent: crate::spherical::Exponent::Alpha
                })
            );
        }
        assert_eq!(nfw.alpha(), 1.0);
    }
}
