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

//! Gamma and Gauss hypergeometric functions for real arguments.
//!
//! ₂F₁(a, b; c; z) is evaluated for z < 1, which covers every call made by the
//! profiles since they only ever pass -r/a or -a/r. The strategy is
//!
//! 1. terminating polynomial if `a` or `b` is a non-positive integer,
//! 2. the Pfaff transformation z → z/(z - 1) which maps z < 0 onto [0, 1),
//! 3. the Gauss series for 0 ≤ z ≤ ½,
//! 4. the 1 - z connection formula for ½ < z < 1, using the logarithmic form
//!    (Abramowitz & Stegun 15.3.10-12) when c - a - b is an integer and a
//!    quadratic bridge between the two when c - a - b is nearly an integer.
//!
//! References:
//! - Abramowitz & Stegun, Handbook of Mathematical Functions, ch. 15
//! - <https://dlmf.nist.gov/15.8>

use statrs::function::gamma::digamma;

/// Relative truncation threshold for the series
const SERIES_EPSILON: f64 = 1e-16;

/// Upper bound on series terms; the series are only used where |x| ≤ ½
const MAX_TERMS: usize = 10_000;

/// Gap to the nearest integer below which c - a - b is treated as degenerate
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Gap to the nearest integer below which c - a - b is bridged to the degenerate limit
const DEGENERATE_BRIDGE: f64 = 3e-4;

/// Euler-Mascheroni constant, -ψ(1)
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[inline]
fn is_non_positive_integer(x: f64) -> bool {
    x <= 0.0 && x == x.round()
}

/// Gamma function, returning +∞ at the poles
pub(crate) fn gamma(x: f64) -> f64 {
    if is_non_positive_integer(x) {
        f64::INFINITY
    } else {
        statrs::function::gamma::gamma(x)
    }
}

/// Reciprocal gamma function, exactly zero at the poles
pub(crate) fn rgamma(x: f64) -> f64 {
    if is_non_positive_integer(x) {
        0.0
    } else {
        1.0 / statrs::function::gamma::gamma(x)
    }
}

/// Gauss hypergeometric function ₂F₁(a, b; c; z) for real z < 1.
///
/// Returns NaN for z > 1 which lies on the branch cut.
pub(crate) fn hyp2f1(a: f64, b: f64, c: f64, z: f64) -> f64 {
    if z == 0.0 {
        return 1.0;
    }
    if is_non_positive_integer(a) || is_non_positive_integer(b) {
        return terminating(a, b, c, z);
    }
    if z < 0.0 {
        return (1.0 - z).powf(-a) * unit_interval(a, c - b, c, z / (z - 1.0));
    }
    if z < 1.0 {
        return unit_interval(a, b, c, z);
    }
    if z == 1.0 {
        // Gauss' summation theorem
        let s = c - a - b;
        return if s > 0.0 {
            gamma(c) * gamma(s) * rgamma(c - a) * rgamma(c - b)
        } else {
            f64::INFINITY
        };
    }
    f64::NAN
}

/// ₂F₁ for 0 ≤ x < 1
fn unit_interval(a: f64, b: f64, c: f64, x: f64) -> f64 {
    if is_non_positive_integer(a) || is_non_positive_integer(b) {
        terminating(a, b, c, x)
    } else if x <= 0.5 {
        series(a, b, c, x)
    } else {
        near_one(a, b, c, x)
    }
}

/// Polynomial case where `a` or `b` is a non-positive integer
fn terminating(a: f64, b: f64, c: f64, z: f64) -> f64 {
    let order = [a, b]
        .into_iter()
        .filter(|&x| is_non_positive_integer(x))
        .map(|x| (-x) as usize)
        .min()
        .unwrap_or(0);
    let mut term = 1.0;
    let mut sum = 1.0;
    for n in 0..order {
        let n = n as f64;
        term *= (a + n) * (b + n) / ((c + n) * (n + 1.0)) * z;
        sum += term;
    }
    sum
}

/// Gauss series, Σ (a)ₙ(b)ₙ/((c)ₙ n!) xⁿ
fn series(a: f64, b: f64, c: f64, x: f64) -> f64 {
    let mut term = 1.0;
    let mut sum = 1.0;
    for n in 0..MAX_TERMS {
        let n = n as f64;
        term *= (a + n) * (b + n) / ((c + n) * (n + 1.0)) * x;
        sum += term;
        if term.abs() <= SERIES_EPSILON * sum.abs() {
            break;
        }
    }
    sum
}

/// Expansion around x = 1 for ½ < x < 1
///
/// Close to an integer c - a - b the Γ factors of the connection formula cancel
/// catastrophically, so within [`DEGENERATE_BRIDGE`] of the integer the result is
/// interpolated quadratically in c between the logarithmic limit and two well
/// separated connection values.
fn near_one(a: f64, b: f64, c: f64, x: f64) -> f64 {
    let s = c - a - b;
    let m = s.round();
    let offset = s - m;
    if offset.abs() < DEGENERATE_TOLERANCE {
        return degenerate(a, b, m as i32, x);
    }
    if offset.abs() < DEGENERATE_BRIDGE {
        let (c0, h) = (a + b + m, DEGENERATE_BRIDGE);
        let center = degenerate(a, b, m as i32, x);
        let above = connection(a, b, c0 + h, x);
        let below = connection(a, b, c0 - h, x);
        let slope = (above - below) / (2.0 * h);
        let curvature = (above - 2.0 * center + below) / (h * h);
        return center + offset * slope + 0.5 * offset * offset * curvature;
    }
    connection(a, b, c, x)
}

/// Connection formula in y = 1 - x for non-integer c - a - b
fn connection(a: f64, b: f64, c: f64, x: f64) -> f64 {
    let s = c - a - b;
    let y = 1.0 - x;
    gamma(c)
        * (gamma(s) * rgamma(c - a) * rgamma(c - b) * series(a, b, 1.0 - s, y)
            + y.powf(s) * gamma(-s) * rgamma(a) * rgamma(b) * series(c - a, c - b, 1.0 + s, y))
}

/// ₂F₁(a, b; a + b + m; x) for any integer m
fn degenerate(a: f64, b: f64, m: i32, x: f64) -> f64 {
    if m >= 0 {
        return logarithmic(a, b, m as usize, x);
    }
    // Euler's transformation swaps the sign of c - a - b
    let c = a + b + f64::from(m);
    let inner = if is_non_positive_integer(c - a) || is_non_positive_integer(c - b) {
        terminating(c - a, c - b, c, x)
    } else {
        logarithmic(c - a, c - b, m.unsigned_abs() as usize, x)
    };
    (1.0 - x).powi(m) * inner
}

/// ₂F₁(a, b; a + b + m; x) for integer m ≥ 0, expanded around x = 1
fn logarithmic(a: f64, b: f64, m: usize, x: f64) -> f64 {
    let y = 1.0 - x;
    let mf = m as f64;

    // finite part, Σ_{k<m} (a)ₖ(b)ₖ (m-k-1)!/k! (x-1)ᵏ
    let mut finite = 0.0;
    let mut term = 1.0;
    for k in 0..m {
        finite += term * factorial(m - k - 1);
        let k = k as f64;
        term *= (a + k) * (b + k) / (k + 1.0) * (x - 1.0);
    }
    finite *= rgamma(a + mf) * rgamma(b + mf);

    let log_y = y.ln();
    let mut psi_k = -EULER_GAMMA; // ψ(k + 1)
    let mut psi_km = -EULER_GAMMA + (1..=m).map(|j| 1.0 / j as f64).sum::<f64>(); // ψ(k + m + 1)
    let mut psi_a = digamma(a + mf); // ψ(a + k + m)
    let mut psi_b = digamma(b + mf); // ψ(b + k + m)
    let mut term = 1.0 / factorial(m);
    let mut sum = 0.0;
    for k in 0..MAX_TERMS {
        let delta = term * (log_y - psi_k - psi_km + psi_a + psi_b);
        sum += delta;
        if k > 0 && delta.abs() <= SERIES_EPSILON * sum.abs() {
            break;
        }
        let k = k as f64;
        term *= (a + mf + k) * (b + mf + k) / ((k + 1.0) * (k + mf + 1.0)) * y;
        psi_k += 1.0 / (k + 1.0);
        psi_km += 1.0 / (k + mf + 1.0);
        psi_a += 1.0 / (a + k + mf);
        psi_b += 1.0 / (b + k + mf);
    }
    let logarithmic = (x - 1.0).powi(m as i32) * rgamma(a) * rgamma(b) * sum;
    gamma(a + b + mf) * (finite - logarithmic)
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}
