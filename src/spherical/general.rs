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

use super::{two_power_density, Quantity, UnitProfile};
use crate::special::{gamma, hyp2f1, rgamma};
use crate::{PotentialError, Result};

/// Two-power profile for arbitrary real exponents
///
/// The potential is
/// $$ \Phi(r) = \frac{\Gamma(\beta-3)}{r} \left[ \frac{(r/a)^{3-\beta}}{\Gamma(\beta-1)}
///    {}_2F_1\left(\beta-3, \beta-\alpha; \beta-1; -a/r\right)
///    - \frac{\Gamma(3-\alpha)}{\Gamma(\beta-\alpha)} \right] $$
/// with a separate expression at β = 3, and the enclosed mass is
/// $$ M(r) = \frac{(r/a)^{3-\alpha}}{3-\alpha}\,{}_2F_1\left(3-\alpha, \beta-\alpha; 4-\alpha; -r/a\right). $$
///
/// Second derivatives have no closed form here for β = 3 and β = 5.
/// Surface density is not available.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneralTwoPower {
    scale_radius: f64,
    alpha: f64,
    beta: f64,
}

impl GeneralTwoPower {
    pub fn new(scale_radius: f64, alpha: f64, beta: f64) -> Self {
        Self {
            scale_radius,
            alpha,
            beta,
        }
    }

    /// Radial force divided by R; F_R = R f(r), F_z = z f(r)
    #[inline]
    fn force_per_length(&self, r: f64) -> f64 {
        let (a, alpha, beta) = (self.scale_radius, self.alpha, self.beta);
        -r.powf(-alpha) * a.powf(alpha - 3.0) / (3.0 - alpha)
            * hyp2f1(3.0 - alpha, beta - alpha, 4.0 - alpha, -r / a)
    }

    fn unsupported(&self, quantity: Quantity) -> PotentialError {
        PotentialError::Unsupported {
            quantity,
            alpha: self.alpha,
            beta: self.beta,
        }
    }

    /// ₂F₁(β-2, β-α+1; β; -a/r)/Γ(β) and ₂F₁(β-1, β-α+1; β; -a/r)/Γ(β)
    fn hessian_hypergeometrics(&self, r: f64) -> (f64, f64) {
        let (a, alpha, beta) = (self.scale_radius, self.alpha, self.beta);
        let x = -a / r;
        (
            hyp2f1(beta - 2.0, beta - alpha + 1.0, beta, x) * rgamma(beta),
            hyp2f1(beta - 1.0, beta - alpha + 1.0, beta, x) * rgamma(beta),
        )
    }

    fn check_hessian(&self, quantity: Quantity) -> Result<()> {
        if self.beta == 3.0 || self.beta == 5.0 {
            return Err(self.unsupported(quantity));
        }
        Ok(())
    }
}

/// Distance to β = 3 below which the potential is interpolated across the logarithmic case
const LOGARITHMIC_BRIDGE: f64 = 3e-4;

/// Potential at spherical radius `r`
fn potential_at(r: f64, a: f64, alpha: f64, beta: f64) -> f64 {
    if beta == 3.0 {
        let inner = a * (r / a).powf(3.0 - alpha) / (3.0 - alpha)
            * hyp2f1(3.0 - alpha, 2.0 - alpha, 4.0 - alpha, -r / a);
        return (r - inner) / (a * (alpha - 2.0) * r);
    }
    gamma(beta - 3.0)
        * ((r / a).powf(3.0 - beta) * rgamma(beta - 1.0)
            * hyp2f1(beta - 3.0, beta - alpha, beta - 1.0, -a / r)
            - gamma(3.0 - alpha) * rgamma(beta - alpha))
        / r
}

impl UnitProfile for GeneralTwoPower {
    fn potential(&self, radius: f64, height: f64) -> f64 {
        let (a, alpha, beta) = (self.scale_radius, self.alpha, self.beta);
        let r = radius.hypot(height);
        let offset = beta - 3.0;
        if offset != 0.0 && offset.abs() < LOGARITHMIC_BRIDGE {
            // Γ(β - 3) cancels against the bracket; interpolate across β = 3 instead
            let h = LOGARITHMIC_BRIDGE;
            let center = potential_at(r, a, alpha, 3.0);
            let above = potential_at(r, a, alpha, 3.0 + h);
            let below = potential_at(r, a, alpha, 3.0 - h);
            let slope = (above - below) / (2.0 * h);
            let curvature = (above - 2.0 * center + below) / (h * h);
            return center + offset * slope + 0.5 * offset * offset * curvature;
        }
        potential_at(r, a, alpha, beta)
    }

    fn radial_force(&self, radius: f64, height: f64) -> f64 {
        radius * self.force_per_length(radius.hypot(height))
    }

    fn density(&self, radius: f64, height: f64) -> f64 {
        two_power_density(
            radius.hypot(height),
            self.scale_radius,
            self.alpha,
            self.beta,
        )
    }

    fn mass(&self, radius: f64, height: f64) -> f64 {
        let (a, alpha, beta) = (self.scale_radius, self.alpha, self.beta);
        let x = radius.hypot(height) / a;
        x.powf(3.0 - alpha) / (3.0 - alpha) * hyp2f1(3.0 - alpha, beta - alpha, 4.0 - alpha, -x)
    }

    fn radial_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.check_hessian(Quantity::RadialSecondDerivative)?;
        let (a, alpha, beta) = (self.scale_radius, self.alpha, self.beta);
        let r = radius.hypot(height);
        let (rr, zz) = (radius * radius, height * height);
        let (f1, f2) = self.hessian_hypergeometrics(r);
        let t1 = (zz * (a * (alpha - beta) - r * (beta - 2.0))
            + rr * (r * (beta - 2.0) * (beta - 1.0) + 2.0 * a * (beta - alpha)))
            * f1;
        let t2 = (a * (rr * (2.0 + alpha * (beta - 3.0)) - zz * (beta - 2.0))
            + r * (rr * (beta - 1.0) - zz) * (beta - 2.0))
            * (beta - 2.0)
            * f2;
        Ok(gamma(beta - 3.0) / r.powi(5)
            * ((zz - 2.0 * rr) * gamma(3.0 - alpha) * rgamma(beta - alpha)
                + a.powf(beta - 3.0) * r.powf(2.0 - beta) * (t1 + t2)))
    }

    fn vertical_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.check_hessian(Quantity::VerticalSecondDerivative)?;
        self.radial_second_derivative(height, radius)
    }

    fn mixed_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.check_hessian(Quantity::MixedDerivative)?;
        let (a, alpha, beta) = (self.scale_radius, self.alpha, self.beta);
        let r = radius.hypot(height);
        let (f1, f2) = self.hessian_hypergeometrics(r);
        let t1 = (r * (beta - 2.0) * beta + 3.0 * a * (beta - alpha)) * f1;
        let t2 = (beta - 2.0) * (r * (beta - 2.0) * beta + a * (alpha * (beta - 3.0) + beta)) * f2;
        Ok(radius * height * gamma(beta - 3.0) / r.powi(5)
            * (-3.0 * gamma(3.0 - alpha) * rgamma(beta - alpha)
                + a.powf(beta - 3.0) * r.powf(2.0 - beta) * (t1 + t2)))
    }

    fn surface_density(&self, _radius: f64, _height: f64) -> Result<f64> {
        Err(self.unsupported(Quantity::SurfaceDensity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spherical::NfwProfile;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const STEP: f64 = 1e-5;

    #[test]
    fn test_hernquist_limit() {
        let (a, radius, height) = (1.3, 0.3, 0.4);
        let r = 0.5;
        let profile = GeneralTwoPower::new(a, 1.0, 4.0);
        assert_relative_eq!(
            profile.potential(radius, height),
            -0.5 / (a + r),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            profile.mass(radius, height),
            (r / (r + a)).powi(2) / 2.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_beta_three_potential() {
        // NFW through the β = 3 branch
        let profile = GeneralTwoPower::new(1.0, 1.0, 3.0);
        for r in [0.2, 1.0, 4.0] {
            assert_relative_eq!(
                profile.potential(r, 0.0),
                -(1.0 + r).ln() / r,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_close_to_beta_three() {
        let nfw = NfwProfile::new(1.0);
        for offset in [1e-8, 1e-10, 1e-11, -1e-10, -1e-8] {
            let profile = GeneralTwoPower::new(1.0, 1.0, 3.0 + offset);
            for (radius, height) in [(2.0, 0.0), (0.7, 0.4), (15.0, -3.0)] {
                assert_relative_eq!(
                    profile.potential(radius, height),
                    nfw.potential(radius, height),
                    max_relative = 1e-7
                );
                assert_relative_eq!(
                    profile.radial_force(radius + 0.1, height),
                    nfw.radial_force(radius + 0.1, height),
                    max_relative = 1e-7
                );
                assert_relative_eq!(
                    profile.mass(radius, height),
                    nfw.mass(radius, height),
                    max_relative = 1e-7
                );
            }
        }
    }

    #[test]
    fn test_force_is_gradient() {
        for (alpha, beta) in [(0.5, 3.5), (1.5, 4.5), (1.0, 3.0), (0.0, 4.0)] {
            let profile = GeneralTwoPower::new(1.3, alpha, beta);
            for (radius, height) in [(0.3, 0.4), (2.5, 1.7)] {
                let numeric = -(profile.potential(radius + STEP, height)
                    - profile.potential(radius - STEP, height))
                    / (2.0 * STEP);
                assert_relative_eq!(
                    profile.radial_force(radius, height),
                    numeric,
                    max_relative = 1e-7
                );
                let numeric = -(profile.potential(radius, height + STEP)
                    - profile.potential(radius, height - STEP))
                    / (2.0 * STEP);
                assert_relative_eq!(
                    profile.vertical_force(radius, height),
                    numeric,
                    max_relative = 1e-7
                );
            }
        }
    }

    #[test]
    fn test_second_derivatives() {
        for (alpha, beta) in [(1.5, 4.5), (0.5, 3.5), (2.5, 6.3), (1.0, 3.2)] {
            let profile = GeneralTwoPower::new(1.3, alpha, beta);
            for (radius, height) in [(0.3, 0.4), (1.0, 0.2), (2.5, 1.7)] {
                let numeric = -(profile.radial_force(radius + STEP, height)
                    - profile.radial_force(radius - STEP, height))
                    / (2.0 * STEP);
                assert_relative_eq!(
                    profile.radial_second_derivative(radius, height).unwrap(),
                    numeric,
                    max_relative = 1e-6
                );
                let numeric = -(profile.vertical_force(radius, height + STEP)
                    - profile.vertical_force(radius, height - STEP))
                    / (2.0 * STEP);
                assert_relative_eq!(
                    profile.vertical_second_derivative(radius, height).unwrap(),
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
    }

    #[test]
    fn test_unsupported() {
        for beta in [3.0, 5.0] {
            let profile = GeneralTwoPower::new(1.0, 0.5, beta);
            let err = profile.radial_second_derivative(1.0, 0.5).unwrap_err();
            assert_eq!(
                err,
                PotentialError::Unsupported {
                    quantity: Quantity::RadialSecondDerivative,
                    alpha: 0.5,
                    beta
                }
            );
            assert!(profile.vertical_second_derivative(1.0, 0.5).is_err());
            assert!(profile.mixed_derivative(1.0, 0.5).is_err());
        }
        let profile = GeneralTwoPower::new(1.0, 0.5, 4.5);
        assert!(matches!(
            profile.surface_density(1.0, 0.5),
            Err(PotentialError::Unsupported {
                quantity: Quantity::SurfaceDensity,
                ..
            })
        ));
    }

    #[test]
    fn test_density() {
        let profile = GeneralTwoPower::new(2.0, 0.5, 3.5);
        let r: f64 = 1.0;
        let expected = (2.0 / r).powf(0.5) / (1.0 + r / 2.0).powi(3) / (4.0 * PI * 8.0);
        assert_relative_eq!(profile.density(0.6, 0.8), expected, max_relative = 1e-14);
    }
}
