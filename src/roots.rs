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

//! Bracketed scalar root finding.

use crate::{PotentialError, Result};

/// Default absolute tolerance on the root
pub const DEFAULT_TOLERANCE: f64 = 2e-12;

/// Default cap on the number of iterations
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Relative tolerance, four machine epsilons
const RELATIVE_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// Converged root of a scalar function
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Root {
    /// Location of the root
    pub root: f64,
    /// Iterations spent
    pub iterations: usize,
}

/// Brent's method with inverse quadratic extrapolation.
///
/// The interval `[lower, upper]` must bracket a sign change of `f`. Iteration
/// stops when the bracket is narrower than `tolerance` plus four machine epsilons
/// relative to the current estimate.
///
/// # Examples
/// ~~~
/// use twopower::roots::brent;
/// let root = brent(|x| x * x - 2.0, 0.0, 2.0, 1e-12, 100).unwrap().root;
/// assert!((root - 2f64.sqrt()).abs() < 1e-11);
/// ~~~
pub fn brent<F: Fn(f64) -> f64>(
    f: F,
    lower: f64,
    upper: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Root> {
    let (mut x_previous, mut x_current) = (lower, upper);
    let (mut f_previous, mut f_current) = (f(x_previous), f(x_current));
    let (mut x_block, mut f_block) = (0.0, 0.0);
    let (mut step_previous, mut step_current) = (0.0_f64, 0.0_f64);

    if f_previous * f_current > 0.0 {
        return Err(PotentialError::NotBracketed { lower, upper });
    }
    if f_previous == 0.0 {
        return Ok(Root {
            root: x_previous,
            iterations: 0,
        });
    }
    if f_current == 0.0 {
        return Ok(Root {
            root: x_current,
            iterations: 0,
        });
    }

    for iteration in 0..max_iterations {
        if f_previous != 0.0
            && f_current != 0.0
            && f_previous.is_sign_negative() != f_current.is_sign_negative()
        {
            x_block = x_previous;
            f_block = f_previous;
            step_current = x_current - x_previous;
            step_previous = step_current;
        }
        // keep the best estimate in x_current
        if f_block.abs() < f_current.abs() {
            x_previous = x_current;
            x_current = x_block;
            x_block = x_previous;
            f_previous = f_current;
            f_current = f_block;
            f_block = f_previous;
        }

        let delta = 0.5 * (tolerance + RELATIVE_TOLERANCE * x_current.abs());
        let bisection = 0.5 * (x_block - x_current);
        if f_current == 0.0 || bisection.abs() < delta {
            return Ok(Root {
                root: x_current,
                iterations: iteration,
            });
        }

        if step_previous.abs() > delta && f_current.abs() < f_previous.abs() {
            let trial = if x_previous == x_block {
                // secant
                -f_current * (x_current - x_previous) / (f_current - f_previous)
            } else {
                // inverse quadratic
                let d_previous = (f_previous - f_current) / (x_previous - x_current);
                let d_block = (f_block - f_current) / (x_block - x_current);
                -f_current * (f_block * d_block - f_previous * d_previous)
                    / (d_block * d_previous * (f_block - f_previous))
            };
            if 2.0 * trial.abs() < step_previous.abs().min(3.0 * bisection.abs() - delta) {
                step_previous = step_current;
                step_current = trial;
            } else {
                step_previous = bisection;
                step_current = bisection;
            }
        } else {
            step_previous = bisection;
            step_current = bisection;
        }

        x_previous = x_current;
        f_previous = f_current;
        if step_current.abs() > delta {
            x_current += step_current;
        } else {
            x_current += delta.copysign(bisection);
        }
        f_current = f(x_current);
    }
    Err(PotentialError::NoConvergence {
        iterations: max_iterations,
    })
}
