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

//! Typed errors for profile construction, mutation and evaluation.

use crate::spherical::{Exponent, Quantity};
use std::fmt;

/// Errors arising from profile mutation, unsupported evaluations and root finding.
///
/// None of these are retried internally; all evaluations are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum PotentialError {
    /// Attempt to change an exponent that a named profile keeps fixed.
    FrozenExponent {
        profile: &'static str,
        exponent: Exponent,
    },
    /// Integer-exponent profile given a non-integer exponent.
    NonIntegerExponent { exponent: Exponent, value: f64 },
    /// No closed form is available for this quantity and exponent pair.
    Unsupported {
        quantity: Quantity,
        alpha: f64,
        beta: f64,
    },
    /// Parameter outside its valid domain, e.g. a non-positive scale radius.
    InvalidParameter { name: &'static str, value: f64 },
    /// Root finder was given an interval without a sign change.
    NotBracketed { lower: f64, upper: f64 },
    /// Root finder hit its iteration cap.
    NoConvergence { iterations: usize },
    /// Complex intermediate left a non-negligible imaginary part.
    ComplexResidual { quantity: Quantity, imaginary: f64 },
}

impl fmt::Display for PotentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrozenExponent { profile, exponent } => {
                write!(f, "Cannot modify {exponent} of the {profile} profile")
            }
            Self::NonIntegerExponent { exponent, value } => {
                write!(f, "{exponent} must be an integer, got {value}")
            }
            Self::Unsupported {
                quantity,
                alpha,
                beta,
            } => write!(
                f,
                "{quantity} is not implemented for alpha = {alpha}, beta = {beta}"
            ),
            Self::InvalidParameter { name, value } => {
                write!(f, "Invalid value for {name}: {value}")
            }
            Self::NotBracketed { lower, upper } => {
                write!(f, "No sign change in the interval [{lower}, {upper}]")
            }
            Self::NoConvergence { iterations } => {
                write!(f, "Root finding did not converge in {iterations} iterations")
            }
            Self::ComplexResidual {
                quantity,
                imaginary,
            } => write!(
                f,
                "{quantity} left an imaginary residual of {imaginary:e}"
            ),
        }
    }
}

impl std::error::Error for PotentialError {}

/// Result type with [`PotentialError`] as the error
pub type Result<T> = std::result::Result<T, PotentialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_frozen_exponent() {
        let err = PotentialError::FrozenExponent {
            profile: "NFW",
            exponent: Exponent::Alpha,
        };
        assert_eq!(err.to_string(), "Cannot modify alpha of the NFW profile");
    }

    #[test]
    fn display_unsupported_names_exponents() {
        let err = PotentialError::Unsupported {
            quantity: Quantity::MixedDerivative,
            alpha: 1.5,
            beta: 3.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("mixed derivative"));
        assert!(msg.contains("alpha = 1.5"));
        assert!(msg.contains("beta = 3"));
    }

    #[test]
    fn error_trait_works() {
        let err = PotentialError::NoConvergence { iterations: 100 };
        let dyn_err: &dyn std::error::Error = &err;
        assert_eq!(
            dyn_err.to_string(),
            "Root finding did not converge in 100 iterations"
        );
    }
}
