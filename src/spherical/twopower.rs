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
    Backend, DehnenProfile, Exponent, Formulas, GeneralTwoPower, IntegerTwoPower, Path, Preset,
    Quantity, UnitProfile,
};
use crate::{AxisymmetricPotential, Info, PotentialError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Spherical potential of a two-power density profile
///
/// Holds the amplitude, scale radius and the two exponents, and binds the cheapest
/// formula family valid for the exponents: elementary closed forms for
/// (α, β) = (1, 4), (2, 4) and (1, 3), Γ/₂F₁ expressions specialized to integers when
/// both exponents are integers, and general Γ/₂F₁ expressions otherwise. The binding
/// is recomputed whenever an exponent changes.
///
/// Queries take `&self` and may run concurrently; mutators take `&mut self`.
///
/// # Examples:
/// ~~~
/// use twopower::AxisymmetricPotential;
/// use twopower::spherical::{Backend, ElementaryKind, TwoPowerSpherical};
/// let mut profile = TwoPowerSpherical::new(1.0, 1.0, 1.5, 4.0);
/// assert_eq!(profile.backend(), Backend::General);
/// profile.set_alpha(1.0).unwrap();
/// assert_eq!(profile.backend(), Backend::Elementary(ElementaryKind::Hernquist));
/// assert_eq!(profile.potential(0.0, 0.0), -0.5);
/// ~~~
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "Parameters", into = "Parameters")
)]
pub struct TwoPowerSpherical {
    amplitude: f64,
    scale_radius: f64,
    alpha: f64,
    beta: f64,
    preset: Preset,
    backend: Backend,
}

impl TwoPowerSpherical {
    /// New profile with both exponents free
    pub fn new(amplitude: f64, scale_radius: f64, alpha: f64, beta: f64) -> Self {
        Self::with_preset(Preset::TwoPower, amplitude, scale_radius, alpha, beta)
    }

    pub(crate) fn with_preset(
        preset: Preset,
        amplitude: f64,
        scale_radius: f64,
        alpha: f64,
        beta: f64,
    ) -> Self {
        let backend = preset.backend(alpha, beta);
        log::trace!(
            "{} profile with a = {scale_radius}, alpha = {alpha}, beta = {beta} bound to {backend:?}",
            preset.name()
        );
        Self {
            amplitude,
            scale_radius,
            alpha,
            beta,
            preset,
            backend,
        }
    }

    /// Re-tag as `preset`; fails if the exponents disagree with it
    pub(crate) fn into_preset(self, preset: Preset) -> Result<Self> {
        preset.check(self.alpha, self.beta)?;
        Ok(Self::with_preset(
            preset,
            self.amplitude,
            self.scale_radius,
            self.alpha,
            self.beta,
        ))
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn scale_radius(&self) -> f64 {
        self.scale_radius
    }

    /// Inner slope, α
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Outer slope, β
    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Formula family currently bound
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Set the inner slope and rebind.
    ///
    /// Fails without mutating if α is frozen or not finite.
    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        self.check_mutable(Exponent::Alpha, alpha)?;
        self.alpha = alpha;
        self.rebind();
        Ok(())
    }

    /// Set the outer slope and rebind.
    ///
    /// Fails without mutating if β is frozen or not finite.
    pub fn set_beta(&mut self, beta: f64) -> Result<()> {
        self.check_mutable(Exponent::Beta, beta)?;
        self.beta = beta;
        self.rebind();
        Ok(())
    }

    /// Set the scale radius; the bound formula family is unaffected
    pub fn set_scale_radius(&mut self, scale_radius: f64) -> Result<()> {
        if !(scale_radius > 0.0 && scale_radius.is_finite()) {
            return Err(PotentialError::InvalidParameter {
                name: "scale radius",
                value: scale_radius,
            });
        }
        self.scale_radius = scale_radius;
        Ok(())
    }

    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    /// Rescale the amplitude so that -F_R(R = 1, z = 0) equals `fraction`.
    ///
    /// With `fraction = 1` the circular velocity at unit radius is one.
    pub fn normalize(&mut self, fraction: f64) -> Result<()> {
        if !(fraction > 0.0 && fraction.is_finite()) {
            return Err(PotentialError::InvalidParameter {
                name: "normalization",
                value: fraction,
            });
        }
        let force = self.radial_force(1.0, 0.0);
        if !(force.is_finite() && force != 0.0) {
            return Err(PotentialError::InvalidParameter {
                name: "radial force at unit radius",
                value: force,
            });
        }
        self.amplitude *= fraction / force.abs();
        Ok(())
    }

    /// Unit-amplitude formulas used for a query along `path`
    pub fn formulas(&self, path: Path) -> Formulas {
        let a = self.scale_radius;
        let backend = match path {
            Path::Dispatched => self.backend,
            Path::General => Backend::General,
        };
        match backend {
            Backend::General => Formulas::General(GeneralTwoPower::new(a, self.alpha, self.beta)),
            Backend::Integer => Formulas::Integer(IntegerTwoPower::with_exponents(
                a,
                self.alpha as i32,
                self.beta as i32,
            )),
            Backend::Dehnen => Formulas::Dehnen(DehnenProfile::new(a, self.alpha)),
            Backend::Elementary(kind) => kind.formulas(a),
        }
    }

    /// Evaluate a quantity, optionally bypassing the bound formula family
    pub fn evaluate(&self, quantity: Quantity, radius: f64, height: f64, path: Path) -> Result<f64> {
        let value = self.formulas(path).evaluate(quantity, radius, height)?;
        Ok(self.amplitude * value)
    }

    fn check_mutable(&self, exponent: Exponent, value: f64) -> Result<()> {
        if self.preset.frozen(exponent).is_some() {
            return Err(PotentialError::FrozenExponent {
                profile: self.preset.name(),
                exponent,
            });
        }
        if !value.is_finite() {
            return Err(PotentialError::InvalidParameter {
                name: match exponent {
                    Exponent::Alpha => "alpha",
                    Exponent::Beta => "beta",
                },
                value,
            });
        }
        Ok(())
    }

    fn rebind(&mut self) {
        let backend = self.preset.backend(self.alpha, self.beta);
        if backend != self.backend {
            log::debug!(
                "{} profile rebound from {:?} to {:?} for alpha = {}, beta = {}",
                self.preset.name(),
                self.backend,
                backend,
                self.alpha,
                self.beta
            );
            self.backend = backend;
        }
    }
}

impl AxisymmetricPotential for TwoPowerSpherical {
    #[inline]
    fn potential(&self, radius: f64, height: f64) -> f64 {
        self.amplitude * self.formulas(Path::Dispatched).potential(radius, height)
    }
    #[inline]
    fn radial_force(&self, radius: f64, height: f64) -> f64 {
        self.amplitude * self.formulas(Path::Dispatched).radial_force(radius, height)
    }
    #[inline]
    fn vertical_force(&self, radius: f64, height: f64) -> f64 {
        self.amplitude * self.formulas(Path::Dispatched).vertical_force(radius, height)
    }
    fn density(&self, radius: f64, height: f64) -> f64 {
        self.amplitude * self.formulas(Path::Dispatched).density(radius, height)
    }
    fn mass(&self, radius: f64, height: f64) -> f64 {
        self.amplitude * self.formulas(Path::Dispatched).mass(radius, height)
    }
    fn radial_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.evaluate(Quantity::RadialSecondDerivative, radius, height, Path::Dispatched)
    }
    fn vertical_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.evaluate(Quantity::VerticalSecondDerivative, radius, height, Path::Dispatched)
    }
    fn mixed_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.evaluate(Quantity::MixedDerivative, radius, height, Path::Dispatched)
    }
    fn surface_density(&self, radius: f64, height: f64) -> Result<f64> {
        self.evaluate(Quantity::SurfaceDensity, radius, height, Path::Dispatched)
    }
}

impl Info for TwoPowerSpherical {
    fn short_name(&self) -> Option<&'static str> {
        Some(match self.preset {
            Preset::TwoPower => "two_power_spherical",
            Preset::Dehnen => "dehnen",
            Preset::Hernquist => "hernquist",
            Preset::Jaffe => "jaffe",
            Preset::Nfw => "nfw",
        })
    }
    fn long_name(&self) -> Option<&'static str> {
        Some(match self.preset {
            Preset::TwoPower => "Two-power spherical potential",
            Preset::Dehnen => "Dehnen potential",
            Preset::Hernquist => "Hernquist potential",
            Preset::Jaffe => "Jaffe potential",
            Preset::Nfw => "Navarro-Frenk-White potential",
        })
    }
    fn citation(&self) -> Option<&'static str> {
        Some(match self.preset {
            Preset::TwoPower => "doi:10.1093/mnras/278.2.488",
            Preset::Dehnen => "doi:10.1093/mnras/265.1.250",
            Preset::Hernquist => "doi:10.1086/168845",
            Preset::Jaffe => "doi:10.1093/mnras/202.4.995",
            Preset::Nfw => "doi:10.1086/304888",
        })
    }
}

/// Serialized form; the binding is rebuilt on deserialization
#[cfg(feature = "serde")]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct Parameters {
    #[serde(default = "unit_amplitude")]
    amplitude: f64,
    #[serde(alias = "a")]
    scale_radius: f64,
    alpha: f64,
    beta: f64,
    #[serde(default)]
    preset: Preset,
}

#[cfg(feature = "serde")]
fn unit_amplitude() -> f64 {
    1.0
}

#[cfg(feature = "serde")]
impl TryFrom<Parameters> for TwoPowerSpherical {
    type Error = PotentialError;
    fn try_from(parameters: Parameters) -> Result<Self> {
        if !(parameters.scale_radius > 0.0 && parameters.scale_radius.is_finite()) {
            return Err(PotentialError::InvalidParameter {
                name: "scale radius",
                value: parameters.scale_radius,
            });
        }
        Self::new(
            parameters.amplitude,
            parameters.scale_radius,
            parameters.alpha,
            parameters.beta,
        )
        .into_preset(parameters.preset)
    }
}

#[cfg(feature = "serde")]
impl From<TwoPowerSpherical> for Parameters {
    fn from(profile: TwoPowerSpherical) -> Self {
        Self {
            amplitude: profile.amplitude,
            scale_radius: profile.scale_radius,
            alpha: profile.alpha,
            beta: profile.beta,
            preset: profile.preset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spherical::{ElementaryKind, Hernquist, Nfw};
    use approx::assert_relative_eq;

    #[test]
    fn test_rebinding() {
        let mut profile = TwoPowerSpherical::new(1.0, 1.0, 1.5, 4.0);
        assert_eq!(profile.backend(), Backend::General);
        profile.set_alpha(1.0).unwrap();
        assert_eq!(
            profile.backend(),
            Backend::Elementary(ElementaryKind::Hernquist)
        );
        let hernquist = Hernquist::new(1.0, 1.0);
        for (radius, height) in [(0.3, 0.4), (1.0, 0.0), (2.0, -1.5)] {
            for quantity in Quantity::ALL {
                assert_eq!(
                    profile.evaluate(quantity, radius, height, Path::Dispatched),
                    hernquist.evaluate(quantity, radius, height, Path::Dispatched)
                );
            }
        }
        profile.set_beta(3.0).unwrap();
        assert_eq!(profile.backend(), Backend::Elementary(ElementaryKind::Nfw));
        profile.set_alpha(0.0).unwrap();
        assert_eq!(profile.backend(), Backend::Integer);
        profile.set_beta(3.25).unwrap();
        assert_eq!(profile.backend(), Backend::General);
    }

    #[test]
    fn test_huge_integer_exponent_stays_general() {
        let mut profile = TwoPowerSpherical::new(1.0, 1.0, 0.0, 3e9);
        assert_eq!(profile.backend(), Backend::General);
        profile.set_beta(5.0).unwrap();
        assert_eq!(profile.backend(), Backend::Integer);
        profile.set_alpha(-3e9).unwrap();
        assert_eq!(profile.backend(), Backend::General);
        assert_eq!(Backend::select(0.0, f64::from(i32::MAX)), Backend::Integer);
        assert_eq!(Backend::select(0.0, f64::from(i32::MAX) + 1.0), Backend::General);
    }

    #[test]
    fn test_scale_radius_keeps_binding() {
        let mut profile = TwoPowerSpherical::new(1.0, 1.0, 2.0, 4.0);
        profile.set_scale_radius(3.0).unwrap();
        assert_eq!(profile.backend(), Backend::Elementary(ElementaryKind::Jaffe));
        assert!(profile.set_scale_radius(-1.0).is_err());
        assert!(profile.set_scale_radius(f64::NAN).is_err());
        assert_eq!(profile.scale_radius(), 3.0);
        assert!(profile.set_alpha(f64::INFINITY).is_err());
        assert_eq!(profile.alpha(), 2.0);
    }

    #[test]
    fn test_general_path_agrees() {
        for (alpha, beta) in [(1.0, 4.0), (2.0, 4.0), (1.0, 3.0), (0.0, 6.0)] {
            let profile = TwoPowerSpherical::new(2.5, 1.7, alpha, beta);
            for quantity in [
                Quantity::Potential,
                Quantity::RadialForce,
                Quantity::VerticalForce,
                Quantity::Density,
                Quantity::Mass,
            ] {
                assert_relative_eq!(
                    profile.evaluate(quantity, 0.7, 0.45, Path::Dispatched).unwrap(),
                    profile.evaluate(quantity, 0.7, 0.45, Path::General).unwrap(),
                    max_relative = 1e-10
                );
            }
        }
    }

    #[test]
    fn test_amplitude_scales_everything() {
        let unit = TwoPowerSpherical::new(1.0, 1.2, 0.5, 3.5);
        let scaled = TwoPowerSpherical::new(3.0, 1.2, 0.5, 3.5);
        let (radius, height) = (0.8, 0.6);
        for quantity in Quantity::ALL {
            if quantity == Quantity::SurfaceDensity {
                continue;
            }
            let path = Path::Dispatched;
            assert_relative_eq!(
                scaled.evaluate(quantity, radius, height, path).unwrap(),
                3.0 * unit.evaluate(quantity, radius, height, path).unwrap(),
                max_relative = 1e-14
            );
        }
    }

    #[test]
    fn test_normalize() {
        let mut profile = TwoPowerSpherical::new(7.0, 2.0, 0.5, 3.5);
        profile.normalize(0.35).unwrap();
        assert_relative_eq!(profile.radial_force(1.0, 0.0), -0.35, max_relative = 1e-14);
        assert_relative_eq!(profile.circular_velocity(1.0), 0.35f64.sqrt(), max_relative = 1e-14);
        assert!(profile.normalize(-1.0).is_err());
    }

    #[test]
    fn test_preset_conversion() {
        let nfw = Nfw::try_from(TwoPowerSpherical::new(1.0, 2.0, 1.0, 3.0)).unwrap();
        assert_eq!(nfw.preset(), Preset::Nfw);
        assert!(Nfw::try_from(TwoPowerSpherical::new(1.0, 2.0, 1.0, 4.0)).is_err());
        let generic: TwoPowerSpherical = nfw.into();
        assert_eq!(generic.preset(), Preset::Nfw);
    }

    #[test]
    fn test_info() {
        let profile = TwoPowerSpherical::new(1.0, 1.0, 0.5, 3.5);
        assert_eq!(profile.short_name(), Some("two_power_spherical"));
        assert_eq!(
            Nfw::new(1.0, 1.0).url().as_deref(),
            Some("https://doi.org/10.1086/304888")
        );
    }

    #[test]
    fn test_boxed() {
        let potentials: Vec<Box<dyn AxisymmetricPotential>> = vec![
            Box::new(Hernquist::new(1.0, 1.0)),
            Box::new(TwoPowerSpherical::new(1.0, 1.0, 1.0, 4.0)),
        ];
        let cloned = potentials.clone();
        assert_eq!(cloned[0].potential(0.3, 0.4), cloned[1].potential(0.3, 0.4));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let profile = TwoPowerSpherical::new(2.0, 1.5, 1.0, 3.0);
        let json = serde_json::to_string(&profile).unwrap();
        let restored: TwoPowerSpherical = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, profile);
        assert_eq!(restored.backend(), Backend::Elementary(ElementaryKind::Nfw));

        let profile: TwoPowerSpherical =
            serde_json::from_str(r#"{"a": 2.0, "alpha": 0.0, "beta": 4.0}"#).unwrap();
        assert_eq!(profile.amplitude(), 1.0);
        assert_eq!(profile.backend(), Backend::Integer);

        let nfw: Nfw = serde_json::from_str(r#"{"a": 2.0, "alpha": 1.0, "beta": 3.0}"#).unwrap();
        assert_eq!(nfw.preset(), Preset::Nfw);
        assert!(serde_json::from_str::<Nfw>(r#"{"a": 2.0, "alpha": 1.5, "beta": 3.0}"#).is_err());
        assert!(serde_json::from_str::<TwoPowerSpherical>(
            r#"{"a": -2.0, "alpha": 1.5, "beta": 3.0}"#
        )
        .is_err());
    }
}
