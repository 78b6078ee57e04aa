// Copyright Materialize, Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository, or online at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use num_bigint::BigInt;

use crate::decimal::Big;
use crate::error::InvalidOperationError;

/// Converts from an integer type that always fits the compact mantissa.
macro_rules! from_small_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Big {
                fn from(n: $t) -> Big {
                    Big::new(i64::from(n), 0)
                }
            }
        )*
    };
}

/// Converts from an integer type that may exceed the compact mantissa.
macro_rules! from_large_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Big {
                fn from(n: $t) -> Big {
                    match i64::try_from(n) {
                        Ok(v) => Big::new(v, 0),
                        Err(_) => Big::from_bigint(BigInt::from(n), 0),
                    }
                }
            }
        )*
    };
}

from_small_int!(i8, i16, i32, i64, u8, u16, u32);
from_large_int!(u64, i128, u128);

impl From<BigInt> for Big {
    fn from(n: BigInt) -> Big {
        Big::from_bigint(n, 0)
    }
}

impl TryFrom<f64> for Big {
    type Error = InvalidOperationError;

    /// Converts a float to a decimal, lossily.
    ///
    /// A non-integral float is scaled up by the smallest power of ten
    /// that survives a round trip through rounding, so `3.1415` converts
    /// as if `Big::new(31415, 4)` had been called. Scaling involves
    /// floating-point rounding: roughly 2% of conversions are off by one
    /// unit in the last place.
    ///
    /// NaN has no decimal counterpart and fails; infinities convert to
    /// the decimal infinity.
    fn try_from(value: f64) -> Result<Big, InvalidOperationError> {
        if value.is_nan() {
            return Err(InvalidOperationError {
                reason: "conversion of NaN to decimal",
            });
        }
        if value == 0.0 {
            return Ok(Big::zero());
        }
        if value.is_infinite() {
            return Ok(signed_infinity(value));
        }

        let mut value = value;
        let mut scale = 0;
        if value.fract() != 0.0 {
            scale = find_scale(value);
            value *= 10f64.powi(scale);
        }
        // Scaling a number near the top of the float range can push it
        // over the edge.
        if value.is_infinite() {
            return Ok(signed_infinity(value));
        }

        let magnitude = value.abs();
        if magnitude < 9_223_372_036_854_775_808.0 {
            // 2^63: `value` is integral here, so the cast is exact.
            Ok(Big::new(value as i64, scale))
        } else if magnitude < 18_446_744_073_709_551_616.0 {
            // 2^64.
            let m = BigInt::from(magnitude as u64);
            Ok(Big::from_bigint(if value < 0.0 { -m } else { m }, scale))
        } else {
            let m = big_from_f64(magnitude);
            Ok(Big::from_bigint(if value < 0.0 { -m } else { m }, scale))
        }
    }
}

impl TryFrom<f32> for Big {
    type Error = InvalidOperationError;

    /// Converts through `f64`, with the same lossy scaling as the `f64`
    /// conversion.
    fn try_from(value: f32) -> Result<Big, InvalidOperationError> {
        Big::try_from(f64::from(value))
    }
}

fn signed_infinity(value: f64) -> Big {
    if value < 0.0 {
        -Big::infinity()
    } else {
        Big::infinity()
    }
}

/// Determines the scale needed to absorb the fractional part of `f`,
/// capped at 17 (the precision of a double).
fn find_scale(f: f64) -> i32 {
    if f == 0.0 || f.floor() == f {
        return 0;
    }
    let mut e = 1f64;
    let mut scale = 0;
    while scale < 17 {
        let cmp = round_half_even(f * e) / e;
        if cmp.is_nan() || cmp == f {
            break;
        }
        e *= 10.0;
        scale += 1;
    }
    scale
}

/// Unbiased (half-to-even) rounding of a float to an integral float.
fn round_half_even(f: f64) -> f64 {
    let d = f.trunc();
    let frac = f - d;
    if f > 0.0 && (frac > 0.5 || (frac == 0.5 && (d as i64) % 2 != 0)) {
        return d + 1.0;
    }
    if f < 0.0 && (frac < -0.5 || (frac == -0.5 && (d as i64) % 2 != 0)) {
        return d - 1.0;
    }
    d
}

/// Decomposes a finite, integral, positive float into an unbounded
/// integer via its IEEE 754 mantissa and exponent.
fn big_from_f64(f: f64) -> BigInt {
    const EXP_MASK: u64 = (1 << 11) - 1;
    let bits = f.to_bits();
    let mut mantissa = bits & ((1 << 52) - 1);
    let mut exp = ((bits >> 52) & EXP_MASK) as i64;
    if exp == 0 {
        // Denormal.
        exp -= 1022;
    } else {
        mantissa |= 1 << 52;
        exp -= 1023;
    }

    let mut shift = 52 - exp;
    while mantissa & 1 == 0 && shift > 0 {
        mantissa >>= 1;
        shift -= 1;
    }

    let a = BigInt::from(mantissa);
    if shift < 0 {
        a << ((-shift) as u64)
    } else {
        a >> (shift as u64)
    }
}
