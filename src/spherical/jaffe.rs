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
use crate::Result;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Elementary closed forms for α = 2, β = 4
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JaffeProfile {
    scale_radius: f64,
}

impl JaffeProfile {
    pub fn new(scale_radius: f64) -> Self {
        Self { scale_radius }
    }
}

impl UnitProfile for JaffeProfile {
    #[inline]
    fn potential(&self, radius: f64, height: f64) -> f64 {
        let a = self.scale_radius;
        -(1.0 + a / radius.hypot(height)).ln() / a
    }

    #[inline]
    fn radial_force(&self, radius: f64, height: f64) -> f64 {
        let r = radius.hypot(height);
        -radius / (r.powi(3) * (1.0 + self.scale_radius / r))
    }

    fn density(&self, radius: f64, height: f64) -> f64 {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        a / (4.0 * PI * r * r * (a + r).powi(2))
    }

    fn mass(&self, radius: f64, height: f64) -> f64 {
        let x = radius.hypot(height) / self.scale_radius;
        x / (1.0 + x)
    }

    fn radial_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        let (rr, zz) = (radius * radius, height * height);
        Ok((a * (zz - rr) + (zz - 2.0 * rr) * r) / (r.powi(4) * (a + r).powi(2)))
    }

    fn mixed_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, r) = (self.scale_radius, radius.hypot(height));
        Ok(-radius * height * (2.0 * a + 3.0 * r) / (r.powi(4) * (a + r).powi(2)))
    }

    fn surface_density(&self, radius: f64, height: f64) -> Result<f64> {
        let a = self.scale_radius;
        if height == 0.0 {
            return Ok(0.0);
        }
        let zz = height * height;
        if radius == a {
            return Ok((3.0 * zz - 2.0 * a * a
                + 2.0 * (1.0 + zz / (a * a)).sqrt() * (a * a - 2.0 * zz)
                + 3.0 * height.powi(3) / a * (height / a).atan())
                / (6.0 * PI * a * height.powi(3)));
        }
        if near_scale_radius(radius, a) {
            return Ok(integrate_density(|z| self.density(radius, z), radius, height));
        }
        let z = height.abs();
        let r = radius.hypot(z);
        let rr = radius * radius;
        let (rma, angle) = surface_angle(radius, z, a);
        let value = (2.0 * a * a - rr) * rma.powi(-3) * angle + (z / radius).atan() / radius
            - a * z / ((rr - a * a) * (r + a));
        Ok(height.signum() * real_part(Quantity::SurfaceDensity, value)? / (2.0 * PI * a))
    }
}

/// Jaffe potential
///
/// Two-power profile with α = 2 and β = 4 due to W. Jaffe,
/// [doi:10.1093/mnras/202.4.995](https://doi.org/10.1093/mnras/202.4.995).
/// The total mass equals the amplitude.
///
/// # Examples:
/// ~~~
/// use twopower::{AxisymmetricPotential, spherical::Jaffe};
/// let jaffe = Jaffe::new(1.0, 1.0);
/// assert_eq!(jaffe.mass(1.0, 0.0), 0.5);
/// ~~~
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "TwoPowerSpherical", into = "TwoPowerSpherical")
)]
pub struct Jaffe(TwoPowerSpherical);

impl Jaffe {
    pub fn new(amplitude: f64, scale_radius: f64) -> Self {
        Self(TwoPowerSpherical::with_preset(
            Preset::Jaffe,
            amplitude,
            scale_radius,
            2.0,
            4.0,
        ))
    }
}

impl_preset!(Jaffe, Preset::Jaffe);
