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

use super::{is_integer, ElementaryKind, Exponent, Formulas, GeneralTwoPower, UnitProfile};
use crate::{PotentialError, Result};
use std::f64::consts::PI;

/// Two-power profile restricted to integer exponents
///
/// When (α, β) is one of the elementary pairs every call is handed to the
/// elementary formulas, otherwise the Γ/₂F₁ expressions of [`GeneralTwoPower`]
/// are used. The exponents can only be changed to other integers.
///
/// # Examples
/// ~~~
/// use twopower::spherical::{IntegerTwoPower, UnitProfile};
/// let mut profile = IntegerTwoPower::try_new(1.0, 0.0, 4.0).unwrap();
/// assert!(profile.shortcut().is_none());
/// profile.set_alpha(1.0).unwrap();
/// assert_eq!(profile.potential(0.0, 0.0), -0.5);
/// assert!(profile.set_beta(3.5).is_err());
/// ~~~
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegerTwoPower {
    scale_radius: f64,
    alpha: i32,
    beta: i32,
    shortcut: Option<ElementaryKind>,
}

impl IntegerTwoPower {
    /// New profile; fails if an exponent is not an integer
    pub fn try_new(scale_radius: f64, alpha: f64, beta: f64) -> Result<Self> {
        Ok(Self::with_exponents(
            scale_radius,
            to_integer(Exponent::Alpha, alpha)?,
            to_integer(Exponent::Beta, beta)?,
        ))
    }

    pub(super) fn with_exponents(scale_radius: f64, alpha: i32, beta: i32) -> Self {
        Self {
            scale_radius,
            alpha,
            beta,
            shortcut: ElementaryKind::from_exponents(alpha as f64, beta as f64),
        }
    }

    pub fn alpha(&self) -> i32 {
        self.alpha
    }

    pub fn beta(&self) -> i32 {
        self.beta
    }

    /// Elementary family that services the calls, if any
    pub fn shortcut(&self) -> Option<ElementaryKind> {
        self.shortcut
    }

    /// Set the inner slope; fails without mutating if `alpha` is not an integer
    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        let alpha = to_integer(Exponent::Alpha, alpha)?;
        *self = Self::with_exponents(self.scale_radius, alpha, self.beta);
        Ok(())
    }

    /// Set the outer slope; fails without mutating if `beta` is not an integer
    pub fn set_beta(&mut self, beta: f64) -> Result<()> {
        let beta = to_integer(Exponent::Beta, beta)?;
        *self = Self::with_exponents(self.scale_radius, self.alpha, beta);
        Ok(())
    }

    fn delegate(&self) -> Formulas {
        match self.shortcut {
            Some(kind) => kind.formulas(self.scale_radius),
            None => Formulas::General(GeneralTwoPower::new(
                self.scale_radius,
                self.alpha as f64,
                self.beta as f64,
            )),
        }
    }
}

fn to_integer(exponent: Exponent, value: f64) -> Result<i32> {
    if is_integer(value) {
        Ok(value as i32)
    } else {
        Err(PotentialError::NonIntegerExponent { exponent, value })
    }
}

impl UnitProfile for IntegerTwoPower {
    fn potential(&self, radius: f64, height: f64) -> f64 {
        self.delegate().potential(radius, height)
    }
    fn radial_force(&self, radius: f64, height: f64) -> f64 {
        self.delegate().radial_force(radius, height)
    }
    fn vertical_force(&self, radius: f64, height: f64) -> f64 {
        self.delegate().vertical_force(radius, height)
    }
    fn density(&self, radius: f64, height: f64) -> f64 {
        if let Some(kind) = self.shortcut {
            return kind.formulas(self.scale_radius).density(radius, height);
        }
        let a = self.scale_radius;
        let x = radius.hypot(height) / a;
        1.0 / (4.0 * PI * a.powi(3) * x.powi(self.alpha) * (1.0 + x).powi(self.beta - self.alpha))
    }
    fn mass(&self, radius: f64, height: f64) -> f64 {
        self.delegate().mass(radius, height)
    }
    fn radial_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.delegate().radial_second_derivative(radius, height)
    }
    fn vertical_second_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.delegate().vertical_second_derivative(radius, height)
    }
    fn mixed_derivative(&self, radius: f64, height: f64) -> Result<f64> {
        self.delegate().mixed_derivative(radius, height)
    }
    fn surface_density(&self, radius: f64, height: f64) -> Result<f64> {
        self.delegate().surface_density(radius, height)
    }
}
