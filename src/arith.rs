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

//! Machine-integer arithmetic helpers: powers of ten, digit and bit
//! lengths, and magnitude comparisons in the normalised range.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::Zero;

/// Sentinel stored in the compact mantissa field when the mantissa lives
/// in the unbounded field instead.
pub(crate) const INFLATED: i64 = i64::MIN;

/// The powers of ten representable in an `i64`.
const POW10: [i64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// Returns `10^k` if it is representable in an `i64`.
pub(crate) fn pow10(k: i64) -> Option<i64> {
    usize::try_from(k).ok().and_then(|k| POW10.get(k).copied())
}

/// Returns `10^k` as an unbounded integer.
pub(crate) fn big_pow10(k: u64) -> BigInt {
    num_traits::pow(BigInt::from(10), k as usize)
}

/// Computes `x * 10^k`, reporting failure on overflow.
pub(crate) fn mul_pow10(x: i64, k: i64) -> Option<i64> {
    x.checked_mul(pow10(k)?)
}

/// Computes `x * 10^k` over unbounded integers.
pub(crate) fn big_mul_pow10(x: &BigInt, k: u64) -> BigInt {
    x * big_pow10(k)
}

/// Returns the number of decimal digits in `|x|`. Zero has one digit.
pub(crate) fn length(x: i64) -> i32 {
    let mut n = x.unsigned_abs();
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Returns the number of decimal digits in `|x|`.
pub(crate) fn big_length(x: &BigInt) -> i32 {
    if x.is_zero() {
        return 1;
    }
    x.magnitude().to_str_radix(10).len() as i32
}

/// Returns the length of `|x|` in bits.
pub(crate) fn bit_len(x: i64) -> u64 {
    u64::from(64 - x.unsigned_abs().leading_zeros())
}

/// Returns the sign of `x` without branching.
///
/// Hacker's Delight, section 2-8; unlike `x / |x|` formulations this is
/// also correct for `i64::MIN`.
pub(crate) fn sign(x: i64) -> i32 {
    ((x >> 63) | ((x as u64).wrapping_neg() >> 63) as i64) as i32
}

/// Compares `|x|` and `|y|`.
pub(crate) fn abs_cmp(x: i64, y: i64) -> Ordering {
    x.unsigned_abs().cmp(&y.unsigned_abs())
}

/// Checked narrowing of a widened scale computation back to `i32`.
pub(crate) fn to_i32(x: i64) -> Option<i32> {
    i32::try_from(x).ok()
}

/// Compares `x` and `y` as if both were scaled into `[0.1, 1.0)`,
/// returning `true` when the normalised `|x|` exceeds the normalised
/// `|y|`. `xp` and `yp` are the operands' digit counts.
pub(crate) fn cmp_norm(x: i64, xp: i32, y: i64, yp: i32) -> bool {
    debug_assert!(x != 0 && y != 0);
    let diff = i64::from(xp) - i64::from(yp);
    match diff.cmp(&0) {
        Ordering::Equal => abs_cmp(x, y) == Ordering::Greater,
        Ordering::Less => match mul_pow10(x, -diff) {
            Some(x) => abs_cmp(x, y) == Ordering::Greater,
            None => cmp_norm_big(&BigInt::from(x), xp, &BigInt::from(y), yp),
        },
        Ordering::Greater => match mul_pow10(y, diff) {
            Some(y) => abs_cmp(x, y) == Ordering::Greater,
            None => cmp_norm_big(&BigInt::from(x), xp, &BigInt::from(y), yp),
        },
    }
}

/// `cmp_norm` over unbounded integers.
pub(crate) fn cmp_norm_big(x: &BigInt, xp: i32, y: &BigInt, yp: i32) -> bool {
    let diff = i64::from(xp) - i64::from(yp);
    match diff.cmp(&0) {
        Ordering::Equal => x.magnitude() > y.magnitude(),
        Ordering::Less => {
            big_mul_pow10(x, (-diff) as u64).magnitude() > y.magnitude()
        }
        Ordering::Greater => {
            *x.magnitude() > *big_mul_pow10(y, diff as u64).magnitude()
        }
    }
}

/// Reports whether a quotient requires a half-even increment: true when
/// twice the remainder exceeds the divisor in magnitude, or equals it and
/// the quotient is odd. Compares against half the divisor so the test
/// cannot itself overflow.
pub(crate) fn needs_inc(d: i64, r: i64, odd: bool) -> bool {
    let d = d.unsigned_abs();
    let r = r.unsigned_abs();
    let half = d / 2;
    r > half || (r == half && d % 2 == 0 && odd)
}

/// `needs_inc` over unbounded integers.
pub(crate) fn needs_inc_big(d: &BigInt, r: &BigInt, odd: bool) -> bool {
    match (r.magnitude() << 1u32).cmp(d.magnitude()) {
        Ordering::Greater => true,
        Ordering::Equal => odd,
        Ordering::Less => false,
    }
}
