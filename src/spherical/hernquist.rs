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
use crate::units::NaturalUnits;
use crate::Result;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Elementary closed forms for α = 1, β = 4
///
/// $$ \Phi(r) = -\frac{1}{2(r + a)}, \quad M(r) = \frac{r^2}{2(r + a)^2} $$
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HernquistProfile {
    scale_radius: f64,
}

impl HernquistProfile {
    pub fn new(scale_radius: f64) -> Self {
        Self { scale_radius }
    }
}

impl UnitProfile for HernquistProfile {
    #[inline]
    fn potential(&self, radius: f64, height: f64) -> f64 {
        let a = self.scale_radius;
        -1.0 / (2.0 * a * (1.0 + radius.hypot(height) / a))
    }

    #[inline]
    fn radial_force(&self, radius: f64, height: f64) -> f64 {
        let r = radius.hypot(height);
        -radius / (2.0 * r * (self.scale_radius + r).powi(2))
    }

    fn density(&self, radius: f64, height: f64) -> f64 {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        a / (4.0 * PI * r * (a + r).powi(3))
    }

    fn mass(&self, radius: f64, height: f64) -> f64 {
        let x = radius.hypot(height) / self.scale_radius;
        x * x / (2.0 * (1.0 + x).powi(2))
    }

    fn radial_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        let zz = height * height;
        Ok((a * zz + (zz - 2.0 * radius * radius) * r) / (2.0 * r.powi(3) * (a + r).powi(3)))
    }

    fn mixed_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        Ok(-radius * height * (a + 3.0 * r) / (2.0 * (r * (a + r)).powi(3)))
    }

    fn surface_density(&self, radius: f64, height: f64) -> Result<f64> {
        let a = self.scale_radius;
        if height == 0.0 {
            return Ok(0.0);
        }
        let zz = height * height;
        if radius == a {
            let a3 = a.powi(3);
            return Ok((-12.0 * a3 - 5.0 * a * zz
                + (1.0 + zz / (a * a)).sqrt() * (12.0 * a3 - a * zz + 2.0 * zz * zz / a))
                / (30.0 * PI * height.powi(5)));
        }
        if near_scale_radius(radius, a) {
            return Ok(integrate_density(|z| self.density(radius, z), radius, height));
        }
        let z = height.abs();
        let r = radius.hypot(z);
        let rr = radius * radius;
        // rma is imaginary for R < a; the imaginary parts cancel
        let (rma, angle) = surface_angle(radius, z, a);
        let rational =
            z * (rr - a * (3.0 * r + 4.0 * a)) / ((a * a - rr).powi(2) * (r + a).powi(2));
        let value = a * ((2.0 * a * a + rr) * rma.powi(-5) * angle + rational);
        Ok(height.signum() * real_part(Quantity::SurfaceDensity, value)? / (4.0 * PI))
    }
}

/// Hernquist potential
///
/// Two-power profile with α = 1 and β = 4, introduced by L. Hernquist,
/// [doi:10.1086/168845](https://doi.org/10.1086/168845). The total mass is half the amplitude.
///
/// # Examples:
/// ~~~
/// use twopower::{AxisymmetricPotential, spherical::Hernquist};
/// let mut hernquist = Hernquist::new(2.0, 1.0);
/// assert_eq!(hernquist.potential(1.0, 0.0), -0.5);
/// assert!(hernquist.set_alpha(1.5).is_err());
/// ~~~
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "TwoPowerSpherical", into = "TwoPowerSpherical")
)]
pub struct Hernquist(TwoPowerSpherical);

impl Hernquist {
    pub fn new(amplitude: f64, scale_radius: f64) -> Self {
        Self(TwoPowerSpherical::with_preset(
            Preset::Hernquist,
            amplitude,
            scale_radius,
            1.0,
            4.0,
        ))
    }

    /// Name of the matching NEMO accelerator
    pub fn nemo_accname(&self) -> &'static str {
        "Dehnen"
    }

    /// NEMO accelerator parameters, `0,1,GM,a,0` in kpc and Gyr
    pub fn nemo_accpars(&self, units: &NaturalUnits) -> String {
        let velocity = units.velocity_in_kpc_per_gyr();
        let gm = self.amplitude() * velocity.powi(2) * units.ro / 2.0;
        format!("0,1,{:?},{:?},0", gm, self.scale_radius() * units.ro)
    }
}

impl_preset!(Hernquist, Preset::Hernquist);
