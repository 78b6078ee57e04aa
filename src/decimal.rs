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

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{Product, Sum};
use std::num::IntErrorKind;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::arith::{self, INFLATED};
use crate::context::{Context, Rounding};
use crate::error::{InvalidOperationError, ParseDecimalError};

// log2(10), for estimating the bit length of numbers held as digits.
const LN2_10: f64 = 3.321928094887362;

/// Whether a decimal is zero, finite and nonzero, or infinite.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Form {
    Zero,
    Finite,
    Inf,
}

/// An arbitrary-precision, fixed-point decimal number.
///
/// A `Big` is a signed integer mantissa paired with a 32-bit scale; the
/// value represented is `mantissa × 10^(-scale)`. A negative scale
/// indicates the lack of a radix point, typically a very large number.
/// Mantissas that fit in 63 bits are stored inline in a machine integer;
/// operations promote to an unbounded mantissa transparently when a result
/// no longer fits, and demote again when it does.
///
/// Each value carries a [`Context`] specifying the precision and rounding
/// algorithm that lossy operations (division, square root, explicit
/// rounding) apply to their results. Binary operations consult the context
/// of the left-hand operand.
///
/// Two values compare equal when they denote the same number, regardless
/// of representation:
///
/// ```
/// use bigdec::Big;
///
/// assert_eq!(Big::new(12, 1), Big::new(1200, 3)); // 1.2 == 1.200
/// ```
///
/// For convenience, `Big` overloads the standard arithmetic operators.
/// The overloads panic on operations with no representable result, like
/// `Inf - Inf`; use the `checked_*` methods to handle those cases instead:
///
/// ```
/// use bigdec::Big;
///
/// let a = Big::new(25, 1);
/// let b = Big::new(75, 1);
/// assert_eq!(a + b, Big::new(10, 0));
/// ```
#[derive(Clone)]
pub struct Big {
    compact: i64,
    scale: i32,
    ctx: Context,
    form: Form,
    mantissa: BigInt,
}

impl Big {
    /// Creates a finite decimal with the given mantissa and scale.
    ///
    /// ```
    /// use bigdec::Big;
    ///
    /// assert_eq!(Big::new(42, 1).to_string(), "4.2");
    /// assert_eq!(Big::new(42, -1).to_plain_string(), "420");
    /// ```
    pub fn new(mantissa: i64, scale: i32) -> Big {
        let mut z = Big::zero();
        z.scale = scale;
        if mantissa == 0 {
            return z;
        }
        z.form = Form::Finite;
        if mantissa == INFLATED {
            // The sentinel value itself is stored through the unbounded
            // field.
            z.compact = INFLATED;
            z.mantissa = BigInt::from(mantissa);
        } else {
            z.compact = mantissa;
        }
        z
    }

    /// Creates a finite decimal with the given unbounded mantissa and
    /// scale.
    pub fn from_bigint(mantissa: BigInt, scale: i32) -> Big {
        let mut z = Big::zero();
        z.scale = scale;
        z.set_big_mant(mantissa);
        z
    }

    /// Creates a decimal representing the number 0.
    pub fn zero() -> Big {
        Big {
            compact: 0,
            scale: 0,
            ctx: Context::default(),
            form: Form::Zero,
            mantissa: BigInt::default(),
        }
    }

    /// Creates a decimal representing positive infinity.
    pub fn infinity() -> Big {
        let mut z = Big::zero();
        z.set_inf_signed(false);
        z
    }

    fn zero_ctx(ctx: Context) -> Big {
        let mut z = Big::zero();
        z.ctx = ctx;
        z
    }

    fn inf_ctx(ctx: Context, negative: bool) -> Big {
        let mut z = Big::zero();
        z.ctx = ctx;
        z.set_inf_signed(negative);
        z
    }

    /// Clones `self` and stamps the clone with `ctx`.
    fn with_ctx(&self, ctx: Context) -> Big {
        let mut z = self.clone();
        z.ctx = ctx;
        z
    }

    fn is_compact(&self) -> bool {
        self.compact != INFLATED
    }

    /// Installs `m` as the mantissa of `self`, demoting to the compact
    /// field when it fits. `i64::MIN` stays inflated so the sentinel
    /// remains unambiguous.
    fn set_big_mant(&mut self, m: BigInt) {
        if m.is_zero() {
            self.compact = 0;
            self.form = Form::Zero;
            return;
        }
        self.form = Form::Finite;
        match m.to_i64() {
            Some(v) if v != INFLATED => self.compact = v,
            _ => {
                self.compact = INFLATED;
                self.mantissa = m;
            }
        }
    }

    fn set_inf_signed(&mut self, negative: bool) {
        self.form = Form::Inf;
        self.compact = if negative { -1 } else { 1 };
    }

    /// The mantissa as an unbounded integer, borrowing it when already
    /// inflated.
    fn big_mantissa(&self) -> Cow<'_, BigInt> {
        if self.is_compact() {
            Cow::Owned(BigInt::from(self.compact))
        } else {
            Cow::Borrowed(&self.mantissa)
        }
    }

    /// Reports whether the number is finite and nonzero.
    pub fn is_finite(&self) -> bool {
        self.form == Form::Finite
    }

    /// Reports whether the number is an infinity.
    pub fn is_infinite(&self) -> bool {
        self.form == Form::Inf
    }

    /// Reports whether the number is zero.
    pub fn is_zero(&self) -> bool {
        self.form == Form::Zero
    }

    /// Reports whether the number is negative.
    pub fn is_negative(&self) -> bool {
        self.sign() < 0
    }

    /// Reports whether the number is an integer. Infinities are not
    /// integers.
    pub fn is_int(&self) -> bool {
        match self.form {
            Form::Zero => true,
            Form::Inf => false,
            Form::Finite => {
                if self.scale <= 0 {
                    return true;
                }
                // A mantissa with no more digits than the scale cannot
                // absorb the scale's trailing zeros.
                let scale = i64::from(self.scale);
                if scale >= i64::from(self.prec()) {
                    return false;
                }
                if self.is_compact() {
                    match arith::pow10(scale) {
                        Some(p) => self.compact % p == 0,
                        None => false,
                    }
                } else {
                    (&self.mantissa % arith::big_pow10(scale as u64)).is_zero()
                }
            }
        }
    }

    /// Reports whether the number, with its fractional part truncated,
    /// does not fit in an `i64`.
    pub fn is_big(&self) -> bool {
        self.to_i64().is_none()
    }

    /// Returns the sign of the number: -1 if it is negative, 0 if it is
    /// zero, and +1 if it is positive.
    pub fn sign(&self) -> i32 {
        if self.form == Form::Zero {
            return 0;
        }
        if self.is_compact() {
            arith::sign(self.compact)
        } else {
            match self.mantissa.sign() {
                Sign::Minus => -1,
                Sign::NoSign => 0,
                Sign::Plus => 1,
            }
        }
    }

    /// Returns the number of decimal digits in the mantissa. Zero and
    /// infinity have zero digits.
    ///
    /// This is distinct from the *context* precision configured with
    /// [`Big::set_prec`], which bounds the digits that lossy operations
    /// retain.
    pub fn prec(&self) -> i32 {
        if self.form != Form::Finite {
            return 0;
        }
        if self.is_compact() {
            arith::length(self.compact)
        } else {
            arith::big_length(&self.mantissa)
        }
    }

    /// Returns the length of the absolute value of the number in bits.
    ///
    /// For numbers with trailing implicit zeros (negative scale) the
    /// length is estimated from the digit count.
    pub fn bit_len(&self) -> u64 {
        if self.form != Form::Finite {
            return 0;
        }
        if self.scale < 0 {
            let d = -i64::from(self.scale) + i64::from(self.prec());
            ((d - 1) as f64 * LN2_10).ceil() as u64
        } else if self.is_compact() {
            arith::bit_len(self.compact)
        } else {
            self.mantissa.bits()
        }
    }

    /// Returns the number's scale.
    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Sets the number's scale.
    pub fn set_scale(&mut self, scale: i32) {
        self.scale = scale;
    }

    /// Returns the number's context.
    pub fn context(&self) -> Context {
        self.ctx
    }

    /// Sets the number's context.
    pub fn set_context(&mut self, ctx: Context) {
        self.ctx = ctx;
    }

    /// Returns the rounding algorithm of the number's context.
    pub fn mode(&self) -> Rounding {
        self.ctx.rounding()
    }

    /// Sets the rounding algorithm of the number's context.
    pub fn set_mode(&mut self, rounding: Rounding) {
        self.ctx.set_rounding(rounding);
    }

    /// Sets the precision of the number's context, which dictates how
    /// many digits lossy operations retain. See [`Big::prec`] for the
    /// digit count of the mantissa itself.
    pub fn set_prec(&mut self, precision: i32) {
        self.ctx.set_precision(precision);
    }

    /// Replaces the number with an infinity of the same sign.
    pub fn set_inf(&mut self) {
        let negative = self.is_negative();
        self.set_inf_signed(negative);
    }

    /// Returns the number as an `i64`, truncating the fractional portion,
    /// or `None` if the integer portion does not fit or the number is
    /// infinite.
    ///
    /// ```
    /// use bigdec::Big;
    ///
    /// assert_eq!(Big::new(1234, 2).to_i64(), Some(12));
    /// assert_eq!(Big::infinity().to_i64(), None);
    /// ```
    pub fn to_i64(&self) -> Option<i64> {
        match self.form {
            Form::Zero => Some(0),
            Form::Inf => None,
            Form::Finite if self.is_compact() => {
                if self.scale == 0 {
                    Some(self.compact)
                } else if self.scale < 0 {
                    arith::mul_pow10(self.compact, -i64::from(self.scale))
                } else {
                    Some(arith::pow10(i64::from(self.scale)).map_or(0, |p| self.compact / p))
                }
            }
            Form::Finite => {
                if self.scale == 0 {
                    self.mantissa.to_i64()
                } else if self.scale < 0 {
                    // Inflating an already-oversized mantissa cannot
                    // bring it back into range.
                    None
                } else {
                    (&self.mantissa / arith::big_pow10(self.scale as u64)).to_i64()
                }
            }
        }
    }

    /// Returns the number as an unbounded integer, truncating the
    /// fractional portion, or `None` if the number is infinite.
    pub fn to_bigint(&self) -> Option<BigInt> {
        match self.form {
            Form::Zero => Some(BigInt::zero()),
            Form::Inf => None,
            Form::Finite => {
                let m = self.big_mantissa();
                Some(match self.scale.cmp(&0) {
                    Ordering::Equal => m.into_owned(),
                    Ordering::Less => arith::big_mul_pow10(&m, -i64::from(self.scale) as u64),
                    Ordering::Greater => &*m / arith::big_pow10(self.scale as u64),
                })
            }
        }
    }

    /// Returns the absolute value of the number.
    pub fn abs(&self) -> Big {
        let mut z = self.clone();
        if z.is_compact() {
            z.compact = z.compact.abs();
        } else {
            z.mantissa = z.mantissa.abs();
        }
        z
    }

    fn neg_mut(&mut self) {
        if self.is_compact() {
            self.compact = -self.compact;
        } else {
            self.mantissa = -std::mem::take(&mut self.mantissa);
        }
    }

    /// Computes `self + rhs`.
    ///
    /// # Errors
    ///
    /// Fails when adding infinities with opposing signs.
    pub fn checked_add(&self, rhs: &Big) -> Result<Big, InvalidOperationError> {
        let (x, y) = (self, rhs);
        if x.form == Form::Finite && y.form == Form::Finite {
            let mut z = Big::zero_ctx(x.ctx);
            if x.is_compact() {
                if y.is_compact() {
                    z.add_compact(x.compact, x.scale, y.compact, y.scale);
                } else {
                    z.add_mixed(x.compact, x.scale, &y.mantissa, y.scale);
                }
            } else if y.is_compact() {
                z.add_mixed(y.compact, y.scale, &x.mantissa, x.scale);
            } else {
                z.add_big(&x.mantissa, x.scale, &y.mantissa, y.scale);
            }
            return Ok(z);
        }
        match (x.form, y.form) {
            (Form::Inf, Form::Inf) if x.is_negative() != y.is_negative() => {
                Err(InvalidOperationError {
                    reason: "addition of infinities with opposing signs",
                })
            }
            (Form::Inf, _) | (_, Form::Zero) => Ok(x.with_ctx(x.ctx)),
            _ => Ok(y.with_ctx(x.ctx)),
        }
    }

    /// Computes `self - rhs`.
    ///
    /// # Errors
    ///
    /// Fails when subtracting infinities with equal signs.
    pub fn checked_sub(&self, rhs: &Big) -> Result<Big, InvalidOperationError> {
        let (x, y) = (self, rhs);
        if x.form == Form::Finite && y.form == Form::Finite {
            let mut z = Big::zero_ctx(x.ctx);
            // Negate y on the way into the shared addition path; compact
            // mantissas never hold i64::MIN, so the negation cannot
            // overflow.
            match (x.is_compact(), y.is_compact()) {
                (true, true) => z.add_compact(x.compact, x.scale, -y.compact, y.scale),
                (true, false) => {
                    let ym = -&y.mantissa;
                    z.add_mixed(x.compact, x.scale, &ym, y.scale);
                }
                (false, true) => z.add_mixed(-y.compact, y.scale, &x.mantissa, x.scale),
                (false, false) => {
                    let ym = -&y.mantissa;
                    z.add_big(&x.mantissa, x.scale, &ym, y.scale);
                }
            }
            return Ok(z);
        }
        match (x.form, y.form) {
            (Form::Inf, Form::Inf) if x.is_negative() == y.is_negative() => {
                Err(InvalidOperationError {
                    reason: "subtraction of infinities with equal signs",
                })
            }
            (Form::Inf, _) | (_, Form::Zero) => Ok(x.with_ctx(x.ctx)),
            _ => {
                let mut z = y.with_ctx(x.ctx);
                z.neg_mut();
                Ok(z)
            }
        }
    }

    /// Computes `self * rhs`.
    ///
    /// # Errors
    ///
    /// Fails when multiplying zero with an infinity.
    pub fn checked_mul(&self, rhs: &Big) -> Result<Big, InvalidOperationError> {
        let (x, y) = (self, rhs);
        if x.form == Form::Finite && y.form == Form::Finite {
            let mut z = Big::zero_ctx(x.ctx);
            if x.is_compact() {
                if y.is_compact() {
                    z.mul_compact(x.compact, x.scale, y.compact, y.scale);
                } else {
                    z.mul_mixed(x.compact, x.scale, &y.mantissa, y.scale);
                }
            } else if y.is_compact() {
                z.mul_mixed(y.compact, y.scale, &x.mantissa, x.scale);
            } else {
                z.mul_big(&x.mantissa, x.scale, &y.mantissa, y.scale);
            }
            return Ok(z);
        }
        match (x.form, y.form) {
            (Form::Zero, Form::Inf) | (Form::Inf, Form::Zero) => Err(InvalidOperationError {
                reason: "multiplication of zero with infinity",
            }),
            (Form::Inf, _) | (_, Form::Inf) => {
                Ok(Big::inf_ctx(x.ctx, x.is_negative() != y.is_negative()))
            }
            _ => Ok(Big::zero_ctx(x.ctx)),
        }
    }

    /// Computes `self / rhs`, rounded to the precision of `self`'s
    /// context.
    ///
    /// ```
    /// # use std::error::Error;
    /// use bigdec::Big;
    ///
    /// let mut x = Big::new(1, 0);
    /// x.set_prec(10);
    /// let q = x.checked_quo(&Big::new(3, 0))?;
    /// assert_eq!(q.to_string(), "0.3333333333");
    /// # Ok::<_, Box<dyn Error>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails when dividing zero by zero or infinity by infinity.
    pub fn checked_quo(&self, rhs: &Big) -> Result<Big, InvalidOperationError> {
        let (x, y) = (self, rhs);
        match (x.form, y.form) {
            (Form::Finite, Form::Finite) => {
                let mut z = Big::zero_ctx(x.ctx);
                if x.is_compact() && y.is_compact() {
                    z.quo_compact(x.compact, x.scale, y.compact, y.scale);
                } else {
                    z.quo_big(&x.big_mantissa(), x.scale, &y.big_mantissa(), y.scale);
                }
                Ok(z)
            }
            (Form::Zero, Form::Zero) => Err(InvalidOperationError {
                reason: "division of zero by zero",
            }),
            (Form::Inf, Form::Inf) => Err(InvalidOperationError {
                reason: "division of infinity by infinity",
            }),
            (Form::Zero, _) | (_, Form::Inf) => Ok(Big::zero_ctx(x.ctx)),
            _ => Ok(Big::inf_ctx(x.ctx, x.is_negative() != y.is_negative())),
        }
    }

    /// Computes the square root of `self`, rounded to the precision of
    /// `self`'s context.
    ///
    /// # Errors
    ///
    /// Fails when the number is negative.
    pub fn checked_sqrt(&self) -> Result<Big, InvalidOperationError> {
        if self.sign() < 0 {
            return Err(InvalidOperationError {
                reason: "square root of negative number",
            });
        }
        match self.form {
            Form::Inf => return Ok(Big::inf_ctx(self.ctx, false)),
            Form::Zero => return Ok(Big::zero_ctx(self.ctx)),
            Form::Finite => {}
        }

        // Fast path: an exact root of a perfect square needs no
        // iteration.
        if let Some(root) = self.perfect_square() {
            let mut z = Big::new(root, 0);
            z.ctx = self.ctx;
            return Ok(z);
        }

        let zp = self.ctx.prec();
        // Shift the radix right far enough that the integer square root
        // carries zp digits after the radix.
        let padj = 2 * i64::from(zp);
        let shifted_scale = match arith::to_i32(i64::from(self.scale) - padj) {
            Some(s) => s,
            None => return Ok(Big::inf_ctx(self.ctx, false)),
        };
        let k = -i64::from(shifted_scale);

        if self.is_compact() {
            let n = if k >= 0 {
                arith::mul_pow10(self.compact, k)
            } else {
                arith::pow10(-k).map(|p| self.compact / p)
            };
            if let Some(n) = n {
                if n == 0 {
                    return Ok(Big::zero_ctx(self.ctx));
                }
                let mut z = Big::new(isqrt64(n), zp);
                z.ctx = self.ctx;
                return Ok(z);
            }
        }

        let m = self.big_mantissa();
        let n = if k >= 0 {
            arith::big_mul_pow10(&m, k as u64)
        } else {
            &*m / arith::big_pow10((-k) as u64)
        };
        if n.is_zero() {
            return Ok(Big::zero_ctx(self.ctx));
        }
        let mut z = Big::from_bigint(isqrt_big(&n), zp);
        z.ctx = self.ctx;
        Ok(z)
    }

    /// Computes the square root of `self`, rounded to the precision of
    /// `self`'s context.
    ///
    /// ```
    /// use bigdec::Big;
    ///
    /// let mut two = Big::new(2, 0);
    /// two.set_prec(20);
    /// assert_eq!(two.sqrt().to_string(), "1.4142135623730950488");
    /// ```
    ///
    /// # Panics
    ///
    /// Panics when the number is negative. Use [`Big::checked_sqrt`] to
    /// handle that case.
    pub fn sqrt(&self) -> Big {
        self.checked_sqrt().unwrap_or_else(|e| panic!("{}", e))
    }

    /// Reports whether the integer value of `self` is a perfect square,
    /// and if so returns its root.
    fn perfect_square(&self) -> Option<i64> {
        if !self.is_int() {
            return None;
        }
        let xc = self.to_i64()?;
        // Squares end in 0, 1, 4, 5, 6, or 9 in base 16; anything else
        // cannot be one.
        if !matches!(xc & 0xF, 0 | 1 | 4 | 5 | 6 | 9) {
            return None;
        }
        let tst = (xc as f64).sqrt() as i64;
        match tst.checked_mul(tst) {
            Some(sq) if sq == xc => Some(tst),
            _ => None,
        }
    }

    /// Rounds the number to at most `n` significant digits, using the
    /// rounding algorithm of its context.
    ///
    /// Has no effect if `n` is zero or less, if the mantissa already has
    /// no more than `n` digits, or if the number is not finite.
    ///
    /// ```
    /// use bigdec::Big;
    ///
    /// let mut x = Big::new(12345, 0);
    /// x.round(3);
    /// assert_eq!(x.to_plain_string(), "12300");
    /// ```
    pub fn round(&mut self, n: i32) {
        let prec = self.prec();
        if n <= 0 || prec <= n || self.form != Form::Finite {
            return;
        }
        let shift = prec - n;
        match self.scale.checked_sub(shift) {
            Some(s) => self.scale = s,
            None => {
                let negative = self.is_negative();
                return self.set_inf_signed(negative);
            }
        }
        if self.is_compact() {
            if let Some(p) = arith::pow10(i64::from(shift)) {
                return self.quo_and_round(self.compact, p);
            }
            self.mantissa = BigInt::from(self.compact);
            self.compact = INFLATED;
        }
        let m = std::mem::take(&mut self.mantissa);
        self.quo_big_and_round(m, arith::big_pow10(shift as u64));
    }

    fn add_compact(&mut self, xc: i64, xs: i32, yc: i64, ys: i32) {
        // Fast path: equal scales add without any alignment.
        if xs == ys {
            self.scale = xs;
            match xc.checked_add(yc) {
                Some(sum) if sum != INFLATED => {
                    self.compact = sum;
                    self.form = if sum == 0 { Form::Zero } else { Form::Finite };
                }
                _ => self.set_big_mant(BigInt::from(xc) + yc),
            }
            return;
        }

        // Align by inflating the operand with the smaller scale.
        let (hc, hs, lc, ls) = if xs > ys {
            (xc, xs, yc, ys)
        } else {
            (yc, ys, xc, xs)
        };
        let inc = i64::from(hs) - i64::from(ls);
        self.scale = hs;
        if let Some(scaled) = arith::mul_pow10(lc, inc) {
            if let Some(sum) = hc.checked_add(scaled) {
                if sum != INFLATED {
                    self.compact = sum;
                    self.form = if sum == 0 { Form::Zero } else { Form::Finite };
                    return;
                }
            }
        }
        self.set_big_mant(arith::big_mul_pow10(&BigInt::from(lc), inc as u64) + hc);
    }

    fn add_mixed(&mut self, comp: i64, cs: i32, non: &BigInt, ns: i32) {
        if cs == ns {
            self.scale = cs;
            self.set_big_mant(non + comp);
        } else {
            self.add_big(&BigInt::from(comp), cs, non, ns);
        }
    }

    fn add_big(&mut self, xm: &BigInt, xs: i32, ym: &BigInt, ys: i32) {
        let (hm, hs, lm, ls) = if xs > ys {
            (xm, xs, ym, ys)
        } else {
            (ym, ys, xm, xs)
        };
        let inc = i64::from(hs) - i64::from(ls);
        self.scale = hs;
        self.set_big_mant(arith::big_mul_pow10(lm, inc as u64) + hm);
    }

    fn mul_compact(&mut self, xc: i64, xs: i32, yc: i64, ys: i32) {
        let scale = match xs.checked_add(ys) {
            Some(s) => s,
            None => return self.set_inf_signed((xc < 0) != (yc < 0)),
        };
        self.scale = scale;
        match xc.checked_mul(yc) {
            Some(prod) if prod != INFLATED => {
                self.compact = prod;
                self.form = Form::Finite;
            }
            _ => self.set_big_mant(BigInt::from(xc) * yc),
        }
    }

    fn mul_mixed(&mut self, comp: i64, cs: i32, non: &BigInt, ns: i32) {
        let scale = match cs.checked_add(ns) {
            Some(s) => s,
            None => return self.set_inf_signed((comp < 0) != non.is_negative()),
        };
        self.scale = scale;
        self.set_big_mant(non * comp);
    }

    fn mul_big(&mut self, xm: &BigInt, xs: i32, ym: &BigInt, ys: i32) {
        let scale = match xs.checked_add(ys) {
            Some(s) => s,
            None => return self.set_inf_signed(xm.is_negative() != ym.is_negative()),
        };
        self.scale = scale;
        self.set_big_mant(xm * ym);
    }

    fn quo_compact(&mut self, xc: i64, xs: i32, yc: i64, ys: i32) {
        let negative = (xc < 0) != (yc < 0);
        let scale = match xs.checked_sub(ys) {
            Some(s) => s,
            None => return self.set_inf_signed(negative),
        };

        let zp = self.ctx.prec();
        let xp = arith::length(xc);
        let mut yp = arith::length(yc);

        // Reserve an extra quotient digit when the normalised dividend
        // exceeds the normalised divisor.
        if arith::cmp_norm(xc, xp, yc, yp) {
            yp -= 1;
        }

        let scale = i64::from(scale) + i64::from(yp) - i64::from(xp) + i64::from(zp);
        match arith::to_i32(scale) {
            Some(s) => self.scale = s,
            None => return self.set_inf_signed(negative),
        }

        let shift = i64::from(zp) + i64::from(yp) - i64::from(xp);
        if shift > 0 {
            return match arith::mul_pow10(xc, shift) {
                Some(xs) => self.quo_and_round(xs, yc),
                None => self.quo_big_and_round(
                    arith::big_mul_pow10(&BigInt::from(xc), shift as u64),
                    BigInt::from(yc),
                ),
            };
        }

        // shift <= 0: the divisor is inflated instead.
        let ns = i64::from(xp) - i64::from(zp);
        if ns == i64::from(yp) {
            return self.quo_and_round(xc, yc);
        }
        let shift = ns - i64::from(yp);
        match arith::mul_pow10(yc, shift) {
            Some(ys) => self.quo_and_round(xc, ys),
            None => self.quo_big_and_round(
                BigInt::from(xc),
                arith::big_mul_pow10(&BigInt::from(yc), shift as u64),
            ),
        }
    }

    fn quo_big(&mut self, xm: &BigInt, xs: i32, ym: &BigInt, ys: i32) {
        let negative = xm.is_negative() != ym.is_negative();
        let scale = match xs.checked_sub(ys) {
            Some(s) => s,
            None => return self.set_inf_signed(negative),
        };

        let zp = self.ctx.prec();
        let xp = arith::big_length(xm);
        let mut yp = arith::big_length(ym);

        if arith::cmp_norm_big(xm, xp, ym, yp) {
            yp -= 1;
        }

        let scale = i64::from(scale) + i64::from(yp) - i64::from(xp) + i64::from(zp);
        match arith::to_i32(scale) {
            Some(s) => self.scale = s,
            None => return self.set_inf_signed(negative),
        }

        let shift = i64::from(zp) + i64::from(yp) - i64::from(xp);
        if shift > 0 {
            return self.quo_big_and_round(arith::big_mul_pow10(xm, shift as u64), ym.clone());
        }
        let shift = i64::from(xp) - i64::from(zp) - i64::from(yp);
        if shift == 0 {
            self.quo_big_and_round(xm.clone(), ym.clone());
        } else {
            self.quo_big_and_round(xm.clone(), arith::big_mul_pow10(ym, shift as u64));
        }
    }

    fn quo_and_round(&mut self, x: i64, y: i64) {
        let mut q = x / y;
        let r = x % y;
        if r != 0
            && self.ctx.rounding() == Rounding::HalfEven
            && arith::needs_inc(y, r, q & 1 != 0)
        {
            q += if (x < 0) != (y < 0) { -1 } else { 1 };
        }
        self.compact = q;
        self.form = if q == 0 { Form::Zero } else { Form::Finite };
        self.round(self.ctx.prec());
    }

    fn quo_big_and_round(&mut self, x: BigInt, y: BigInt) {
        let mut q = &x / &y;
        let r = &x % &y;
        if !r.is_zero() && self.ctx.rounding() == Rounding::HalfEven {
            let odd = !(&q % 2i32).is_zero();
            if arith::needs_inc_big(&y, &r, odd) {
                if x.is_negative() != y.is_negative() {
                    q = q - 1;
                } else {
                    q = q + 1;
                }
            }
        }
        self.set_big_mant(q);
        self.round(self.ctx.prec());
    }

    /// Compares the numeric values, ignoring representation and context.
    fn value_cmp(&self, other: &Big) -> Ordering {
        if std::ptr::eq(self, other) {
            return Ordering::Equal;
        }

        match (self.form, other.form) {
            (Form::Inf, Form::Inf) => return self.sign().cmp(&other.sign()),
            (Form::Inf, _) => {
                return if self.sign() > 0 {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (_, Form::Inf) => {
                return if other.sign() > 0 {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            _ => {}
        }

        // Equal scales compare straight across.
        if self.scale == other.scale {
            return match (self.is_compact(), other.is_compact()) {
                (true, true) => self.compact.cmp(&other.compact),
                (true, false) => BigInt::from(self.compact).cmp(&other.mantissa),
                (false, true) => self.mantissa.cmp(&BigInt::from(other.compact)),
                (false, false) => self.mantissa.cmp(&other.mantissa),
            };
        }

        let zs = self.sign();
        let xs = other.sign();
        if zs != xs {
            return zs.cmp(&xs);
        }
        if zs == 0 {
            return Ordering::Equal;
        }

        // Same sign, both nonzero: order by decimal magnitude first.
        let zl = i64::from(self.prec()) - i64::from(self.scale);
        let xl = i64::from(other.prec()) - i64::from(other.scale);
        if zl != xl {
            let by_magnitude = if zl > xl {
                Ordering::Greater
            } else {
                Ordering::Less
            };
            return if zs > 0 {
                by_magnitude
            } else {
                by_magnitude.reverse()
            };
        }

        // Equal magnitudes: align the mantissa with the smaller scale and
        // compare. Temporaries only; the operands stay untouched.
        let (hi, lo, swapped) = if self.scale > other.scale {
            (self, other, false)
        } else {
            (other, self, true)
        };
        let diff = i64::from(hi.scale) - i64::from(lo.scale);
        let ord = if hi.is_compact() && lo.is_compact() {
            match arith::mul_pow10(lo.compact, diff) {
                Some(scaled) => hi.compact.cmp(&scaled),
                None => BigInt::from(hi.compact)
                    .cmp(&arith::big_mul_pow10(&BigInt::from(lo.compact), diff as u64)),
            }
        } else {
            hi.big_mantissa()
                .cmp(&Cow::Owned(arith::big_mul_pow10(&lo.big_mantissa(), diff as u64)))
        };
        if swapped {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// Integer square root by Newton's method, seeded with a power of two at
/// least as large as the root so the iteration descends monotonically.
fn isqrt64(n: i64) -> i64 {
    debug_assert!(n > 0);
    let mut x0 = 1i64 << ((arith::bit_len(n) + 1) >> 1);
    loop {
        let x1 = (x0 + n / x0) >> 1;
        if x1 >= x0 {
            return x0;
        }
        x0 = x1;
    }
}

/// `isqrt64` over unbounded integers.
fn isqrt_big(n: &BigInt) -> BigInt {
    debug_assert!(n.is_positive());
    let mut x0: BigInt = BigInt::one() << ((n.bits() + 1) >> 1);
    loop {
        let x1: BigInt = (&x0 + n / &x0) >> 1;
        if x1 >= x0 {
            return x0;
        }
        x0 = x1;
    }
}

impl Default for Big {
    fn default() -> Big {
        Big::zero()
    }
}

impl PartialEq for Big {
    fn eq(&self, other: &Big) -> bool {
        self.value_cmp(other) == Ordering::Equal
    }
}

impl Eq for Big {}

impl PartialOrd for Big {
    fn partial_cmp(&self, other: &Big) -> Option<Ordering> {
        Some(self.value_cmp(other))
    }
}

impl Ord for Big {
    fn cmp(&self, other: &Big) -> Ordering {
        self.value_cmp(other)
    }
}

impl Hash for Big {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        // Equal values must hash equally, so hash the canonical form:
        // sign, digits with trailing zeros stripped, and the decimal
        // magnitude (which equal values share regardless of scale).
        match self.form {
            Form::Zero => state.write_u8(0),
            Form::Inf => {
                state.write_u8(2);
                state.write_i32(self.sign());
            }
            Form::Finite => {
                state.write_u8(1);
                state.write_i32(self.sign());
                let digits = if self.is_compact() {
                    self.compact.unsigned_abs().to_string()
                } else {
                    self.mantissa.magnitude().to_str_radix(10)
                };
                state.write_i64(i64::from(self.prec()) - i64::from(self.scale));
                state.write(digits.trim_end_matches('0').as_bytes());
            }
        }
    }
}

impl FromStr for Big {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Big, ParseDecimalError> {
        let mut z = Big::zero();

        // Inf, +Inf, -Inf, case-insensitively.
        if s.len() == 3 && s.eq_ignore_ascii_case("inf") {
            z.set_inf_signed(false);
            return Ok(z);
        }
        if s.len() == 4
            && (s.starts_with('+') || s.starts_with('-'))
            && s[1..].eq_ignore_ascii_case("inf")
        {
            z.set_inf_signed(s.starts_with('-'));
            return Ok(z);
        }

        let mut scale: i32 = 0;
        let mut rest = s;

        // The scientific exponent subtracts from the scale.
        if let Some(i) = rest.rfind(|c| c == 'e' || c == 'E') {
            if i == 0 {
                return Err(ParseDecimalError);
            }
            let exp: i32 = rest[i + 1..].parse().map_err(|_| ParseDecimalError)?;
            scale = exp.checked_neg().ok_or(ParseDecimalError)?;
            rest = &rest[..i];
        }

        // At most one radix point; its fractional digits add to the
        // scale.
        let digits = match rest.matches('.').count() {
            0 => Cow::Borrowed(rest),
            1 => {
                let i = rest.find('.').unwrap();
                let frac = i32::try_from(rest.len() - i - 1).map_err(|_| ParseDecimalError)?;
                scale = scale.checked_add(frac).ok_or(ParseDecimalError)?;
                let mut joined = String::with_capacity(rest.len() - 1);
                joined.push_str(&rest[..i]);
                joined.push_str(&rest[i + 1..]);
                Cow::Owned(joined)
            }
            _ => return Err(ParseDecimalError),
        };

        // 19 characters hold any i64; fall back to the unbounded parse
        // only on range overflow.
        if digits.len() <= 19 {
            match digits.parse::<i64>() {
                Ok(v) => {
                    z.scale = scale;
                    if v == 0 {
                        z.form = Form::Zero;
                    } else {
                        z.compact = v;
                        z.form = Form::Finite;
                    }
                    return Ok(z);
                }
                Err(e)
                    if !matches!(
                        e.kind(),
                        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                    ) =>
                {
                    return Err(ParseDecimalError);
                }
                Err(_) => {}
            }
        }
        let m = digits.parse::<BigInt>().map_err(|_| ParseDecimalError)?;
        z.scale = scale;
        z.set_big_mant(m);
        Ok(z)
    }
}

impl Big {
    /// Returns the plain-notation string for the number, never using an
    /// exponent: trailing zeros for a negative scale, a padded radix
    /// point otherwise.
    ///
    /// The `Display` implementation produces the scientific form instead.
    ///
    /// ```
    /// use bigdec::Big;
    ///
    /// let x: Big = "1.234e+5".parse().unwrap();
    /// assert_eq!(x.to_plain_string(), "123400");
    /// assert_eq!(x.to_string(), "1.234e+5");
    /// ```
    pub fn to_plain_string(&self) -> String {
        self.format(false, false)
    }

    fn format(&self, sci: bool, upper: bool) -> String {
        if self.form == Form::Inf {
            return "Inf".into();
        }
        if self.form == Form::Zero {
            return "0".into();
        }

        let digits = if self.is_compact() {
            self.compact.unsigned_abs().to_string()
        } else {
            self.mantissa.magnitude().to_str_radix(10)
        };
        let mut buf = String::with_capacity(digits.len() + 8);
        if self.is_negative() {
            buf.push('-');
        }
        if self.scale == 0 {
            buf.push_str(&digits);
            return buf;
        }
        if sci {
            self.format_sci(&digits, buf, upper)
        } else {
            self.format_plain(&digits, buf)
        }
    }

    // Quotes below are from
    // http://speleotrove.com/decimal/daconvs.html#reftostr
    fn format_sci(&self, digits: &str, mut buf: String, upper: bool) -> String {
        let adj = -i64::from(self.scale) + (digits.len() as i64 - 1);

        // "If the exponent is less than or equal to zero and the adjusted
        // exponent is greater than or equal to -6, the number will be
        // converted to a character form without using exponential
        // notation."
        if self.scale >= 0 && adj >= -6 {
            return self.format_norm(digits, buf);
        }

        buf.push_str(&digits[..1]);
        if digits.len() > 1 {
            buf.push('.');
            buf.push_str(&digits[1..]);
            trim_fraction(&mut buf);
        }
        if adj != 0 {
            buf.push(if upper { 'E' } else { 'e' });
            if adj > 0 {
                buf.push('+');
            }
            buf.push_str(&adj.to_string());
        }
        buf
    }

    fn format_plain(&self, digits: &str, mut buf: String) -> String {
        // No radix: the mantissa followed by the scale's worth of zeros.
        if self.scale < 0 {
            buf.push_str(digits);
            for _ in 0..-i64::from(self.scale) {
                buf.push('0');
            }
            return buf;
        }
        self.format_norm(digits, buf)
    }

    fn format_norm(&self, digits: &str, mut buf: String) -> String {
        let pad = digits.len() as i64 - i64::from(self.scale);
        if pad > 0 {
            // The radix falls inside the digits.
            buf.push_str(&digits[..pad as usize]);
            buf.push('.');
            buf.push_str(&digits[pad as usize..]);
        } else {
            buf.push_str("0.");
            for _ in 0..-pad {
                buf.push('0');
            }
            buf.push_str(digits);
        }
        trim_fraction(&mut buf);
        buf
    }
}

/// Trims trailing fractional zeros, and the radix point itself if nothing
/// follows it. Must only be called on buffers that end in a fraction.
fn trim_fraction(buf: &mut String) {
    while buf.ends_with('0') {
        buf.pop();
    }
    if buf.ends_with('.') {
        buf.pop();
    }
}

impl fmt::Display for Big {
    /// Formats the number in scientific notation, using `E` in alternate
    /// (`{:#}`) mode. Infinities format as `Inf`, without a sign.
    ///
    /// ```
    /// use bigdec::Big;
    ///
    /// assert_eq!(Big::new(1234, 5).to_string(), "0.01234");
    /// assert_eq!(Big::new(1234, 12).to_string(), "1.234e-9");
    /// assert_eq!(format!("{:#}", Big::new(1234, 12)), "1.234E-9");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.format(true, f.alternate()))
    }
}

impl fmt::Debug for Big {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Neg for Big {
    type Output = Big;

    fn neg(mut self) -> Big {
        self.neg_mut();
        self
    }
}

impl Neg for &Big {
    type Output = Big;

    fn neg(self) -> Big {
        let mut z = self.clone();
        z.neg_mut();
        z
    }
}

impl Add<&Big> for &Big {
    type Output = Big;

    fn add(self, rhs: &Big) -> Big {
        self.checked_add(rhs).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl Add for Big {
    type Output = Big;

    fn add(self, rhs: Big) -> Big {
        &self + &rhs
    }
}

impl Add<&Big> for Big {
    type Output = Big;

    fn add(self, rhs: &Big) -> Big {
        &self + rhs
    }
}

impl Add<Big> for &Big {
    type Output = Big;

    fn add(self, rhs: Big) -> Big {
        self + &rhs
    }
}

impl Sub<&Big> for &Big {
    type Output = Big;

    fn sub(self, rhs: &Big) -> Big {
        self.checked_sub(rhs).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl Sub for Big {
    type Output = Big;

    fn sub(self, rhs: Big) -> Big {
        &self - &rhs
    }
}

impl Sub<&Big> for Big {
    type Output = Big;

    fn sub(self, rhs: &Big) -> Big {
        &self - rhs
    }
}

impl Sub<Big> for &Big {
    type Output = Big;

    fn sub(self, rhs: Big) -> Big {
        self - &rhs
    }
}

impl Mul<&Big> for &Big {
    type Output = Big;

    fn mul(self, rhs: &Big) -> Big {
        self.checked_mul(rhs).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl Mul for Big {
    type Output = Big;

    fn mul(self, rhs: Big) -> Big {
        &self * &rhs
    }
}

impl Mul<&Big> for Big {
    type Output = Big;

    fn mul(self, rhs: &Big) -> Big {
        &self * rhs
    }
}

impl Mul<Big> for &Big {
    type Output = Big;

    fn mul(self, rhs: Big) -> Big {
        self * &rhs
    }
}

impl Div<&Big> for &Big {
    type Output = Big;

    fn div(self, rhs: &Big) -> Big {
        self.checked_quo(rhs).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl Div for Big {
    type Output = Big;

    fn div(self, rhs: Big) -> Big {
        &self / &rhs
    }
}

impl Div<&Big> for Big {
    type Output = Big;

    fn div(self, rhs: &Big) -> Big {
        &self / rhs
    }
}

impl Div<Big> for &Big {
    type Output = Big;

    fn div(self, rhs: Big) -> Big {
        self / &rhs
    }
}

impl AddAssign for Big {
    fn add_assign(&mut self, rhs: Big) {
        *self += &rhs;
    }
}

impl AddAssign<&Big> for Big {
    fn add_assign(&mut self, rhs: &Big) {
        *self = self.checked_add(rhs).unwrap_or_else(|e| panic!("{}", e));
    }
}

impl SubAssign for Big {
    fn sub_assign(&mut self, rhs: Big) {
        *self -= &rhs;
    }
}

impl SubAssign<&Big> for Big {
    fn sub_assign(&mut self, rhs: &Big) {
        *self = self.checked_sub(rhs).unwrap_or_else(|e| panic!("{}", e));
    }
}

impl MulAssign for Big {
    fn mul_assign(&mut self, rhs: Big) {
        *self *= &rhs;
    }
}

impl MulAssign<&Big> for Big {
    fn mul_assign(&mut self, rhs: &Big) {
        *self = self.checked_mul(rhs).unwrap_or_else(|e| panic!("{}", e));
    }
}

impl DivAssign for Big {
    fn div_assign(&mut self, rhs: Big) {
        *self /= &rhs;
    }
}

impl DivAssign<&Big> for Big {
    fn div_assign(&mut self, rhs: &Big) {
        *self = self.checked_quo(rhs).unwrap_or_else(|e| panic!("{}", e));
    }
}

impl Sum for Big {
    fn sum<I>(iter: I) -> Big
    where
        I: Iterator<Item = Big>,
    {
        iter.fold(Big::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Big> for Big {
    fn sum<I>(iter: I) -> Big
    where
        I: Iterator<Item = &'a Big>,
    {
        iter.fold(Big::zero(), |acc, x| &acc + x)
    }
}

impl Product for Big {
    fn product<I>(iter: I) -> Big
    where
        I: Iterator<Item = Big>,
    {
        iter.fold(Big::new(1, 0), Mul::mul)
    }
}

impl<'a> Product<&'a Big> for Big {
    fn product<I>(iter: I) -> Big
    where
        I: Iterator<Item = &'a Big>,
    {
        iter.fold(Big::new(1, 0), |acc, x| &acc * x)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Big {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Big {
    fn deserialize<D>(deserializer: D) -> Result<Big, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BigVisitor;

        impl de::Visitor<'_> for BigVisitor {
            type Value = Big;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal number in string form")
            }

            fn visit_str<E>(self, v: &str) -> Result<Big, E>
            where
                E: de::Error,
            {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(BigVisitor)
    }
}
