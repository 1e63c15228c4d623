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

use super::{impl_preset, two_power_density, Preset, Quantity, TwoPowerSpherical, UnitProfile};
use crate::{PotentialError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed forms for β = 4 and any inner slope α < 3
///
/// $$ \Phi(r) = -\frac{1 - \left(\frac{r}{r + a}\right)^{2-\alpha}}{(2-\alpha)(3-\alpha)\,a},
///    \quad M(r) = \frac{1}{3-\alpha} \left(\frac{r}{r + a}\right)^{3-\alpha} $$
/// with the logarithmic limit at α = 2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DehnenProfile {
    scale_radius: f64,
    alpha: f64,
}

impl DehnenProfile {
    pub fn new(scale_radius: f64, alpha: f64) -> Self {
        Self {
            scale_radius,
            alpha,
        }
    }

    /// (1 + a/r)^α / (r³ (a + r)⁴ (α - 3)), shared by the second derivatives
    fn hessian_prefactor(&self, r: f64) -> f64 {
        let a = self.scale_radius;
        (1.0 + a / r).powf(self.alpha) / (r.powi(3) * (a + r).powi(4) * (self.alpha - 3.0))
    }
}

impl UnitProfile for DehnenProfile {
    fn potential(&self, radius: f64, height: f64) -> f64 {
        let (a, alpha) = (self.scale_radius, self.alpha);
        let r = radius.hypot(height);
        if alpha == 2.0 {
            return -(1.0 + a / r).ln() / a;
        }
        -(1.0 - (r / (r + a)).powf(2.0 - alpha)) / ((2.0 - alpha) * (3.0 - alpha) * a)
    }

    fn radial_force(&self, radius: f64, height: f64) -> f64 {
        let r = radius.hypot(height);
        -radius * self.mass(radius, height) / r.powi(3)
    }

    fn density(&self, radius: f64, height: f64) -> f64 {
        two_power_density(radius.hypot(height), self.scale_radius, self.alpha, 4.0)
    }

    fn mass(&self, radius: f64, height: f64) -> f64 {
        let r = radius.hypot(height);
        (r / (r + self.scale_radius)).powf(3.0 - self.alpha) / (3.0 - self.alpha)
    }

    fn radial_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, alpha) = (self.scale_radius, self.alpha);
        let r = radius.hypot(height);
        let (rr, zz) = (radius * radius, height * height);
        Ok(self.hessian_prefactor(r)
            * (2.0 * rr * rr - zz * (zz + a * r) + rr * (zz + a * r * (alpha - 1.0))))
    }

    fn vertical_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, alpha) = (self.scale_radius, self.alpha);
        let r = radius.hypot(height);
        let (rr, zz) = (radius * radius, height * height);
        Ok(-self.hessian_prefactor(r)
            * (rr * rr - 2.0 * zz * zz + rr * (a * r - zz) - a * zz * r * (alpha - 1.0)))
    }

    fn mixed_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        let (a, alpha) = (self.scale_radius, self.alpha);
        let r = radius.hypot(height);
        Ok(radius * height * self.hessian_prefactor(r) * (3.0 * r * r + a * alpha * r))
    }

    fn surface_density(&self, _radius: f64, _height: f64) -> Result<f64> {
        Err(PotentialError::Unsupported {
            quantity: Quantity::SurfaceDensity,
            alpha: self.alpha,
            beta: 4.0,
        })
    }
}

/// Dehnen potential
///
/// Family of two-power profiles with outer slope β = 4 and free inner slope α,
/// introduced by W. Dehnen, [doi:10.1093/mnras/265.1.250](https://doi.org/10.1093/mnras/265.1.250).
/// Hernquist (α = 1) and Jaffe (α = 2) are members.
///
/// # Examples:
/// ~~~
/// use twopower::{AxisymmetricPotential, spherical::Dehnen};
/// let mut dehnen = Dehnen::with_total_mass(1.0, 1.0, 1.5);
/// assert!((dehnen.mass(1e9, 0.0) - 1.0).abs() < 1e-8);
/// dehnen.set_alpha(0.5).unwrap();
/// assert!(dehnen.set_beta(3.0).is_err());
/// ~~~
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "TwoPowerSpherical", into = "TwoPowerSpherical")
)]
pub struct Dehnen(TwoPowerSpherical);

impl Dehnen {
    /// Total mass is `amplitude / (3 - alpha)`
    pub fn new(amplitude: f64, scale_radius: f64, alpha: f64) -> Self {
        Self(TwoPowerSpherical::with_preset(
            Preset::Dehnen,
            amplitude,
            scale_radius,
            alpha,
            4.0,
        ))
    }

    /// Profile normalized to a given total mass
    pub fn with_total_mass(mass: f64, scale_radius: f64, alpha: f64) -> Self {
        Self::new(mass * (3.0 - alpha), scale_radius, alpha)
    }
}

impl_preset!(Dehnen, Preset::Dehnen);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spherical::{Backend, ElementaryKind, GeneralTwoPower, HernquistProfile, Path};
    use crate::AxisymmetricPotential;
    use approx::assert_relative_eq;

    #[test]
    fn test_matches_general() {
        for alpha in [0.0, 0.5, 1.5, 2.0, 2.5] {
            let dehnen = DehnenProfile::new(1.3, alpha);
            let general = GeneralTwoPower::new(1.3, alpha, 4.0);
            for (radius, height) in [(0.3, 0.4), (1.0, 0.2), (2.5, 1.7)] {
                for quantity in Quantity::ALL {
                    if quantity == Quantity::SurfaceDensity {
                        continue;
                    }
                    assert_relative_eq!(
                        dehnen.evaluate(quantity, radius, height).unwrap(),
                        general.evaluate(quantity, radius, height).unwrap(),
                        max_relative = 1e-11
                    );
                }
            }
        }
    }

    #[test]
    fn test_hernquist_member() {
        let dehnen = DehnenProfile::new(0.8, 1.0);
        let hernquist = HernquistProfile::new(0.8);
        let (radius, height) = (0.6, -0.9);
        assert_relative_eq!(
            dehnen.potential(radius, height),
            hernquist.potential(radius, height),
            max_relative = 1e-14
        );
        assert_relative_eq!(
            dehnen.vertical_second_derivative(radius, height).unwrap(),
            hernquist.vertical_second_derivative(radius, height).unwrap(),
            max_relative = 1e-13
        );
    }

    #[test]
    fn test_preset_dispatch() {
        let mut dehnen = Dehnen::new(1.0, 1.0, 0.5);
        assert_eq!(dehnen.backend(), Backend::Dehnen);
        dehnen.set_alpha(2.0).unwrap();
        assert_eq!(dehnen.backend(), Backend::Elementary(ElementaryKind::Jaffe));
        dehnen.set_alpha(0.0).unwrap();
        assert_eq!(dehnen.backend(), Backend::Dehnen);
        assert_eq!(
            dehnen.set_beta(5.0),
            Err(PotentialError::FrozenExponent {
                profile: "Dehnen",
                exponent: crate::spherical::Exponent::Beta
            })
        );
        let (radius, height) = (0.4, 0.7);
        assert_relative_eq!(
            dehnen.mixed_derivative(radius, height).unwrap(),
            dehnen
                .evaluate(Quantity::MixedDerivative, radius, height, Path::General)
                .unwrap(),
            max_relative = 1e-11
        );
    }

    #[test]
    fn test_total_mass() {
        let dehnen = Dehnen::with_total_mass(2.0, 1.0, 0.5);
        assert_relative_eq!(dehnen.amplitude(), 5.0);
        assert_relative_eq!(dehnen.mass(1e10, 0.0), 2.0, max_relative = 1e-9);
    }
}
