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

/// A context for performing decimal operations.
///
/// A context configures the two policy knobs of decimal arithmetic:
///
///   * the number of significant digits retained by lossy operations
///     (division, square root, explicit rounding), and
///
///   * the rounding algorithm used to discard excess digits.
///
/// Every [`Big`](crate::Big) value carries its own context. Binary
/// operations consult the context of the value the method is invoked on,
/// so `x.checked_quo(&y)` rounds the quotient to `x`'s precision.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Context {
    precision: i32,
    rounding: Rounding,
}

impl Context {
    /// The number of significant digits used by lossy operations when the
    /// context does not specify a precision of its own.
    pub const DEFAULT_PRECISION: i32 = 16;

    /// Creates a context with the given precision and rounding algorithm.
    pub fn new(precision: i32, rounding: Rounding) -> Context {
        Context {
            precision,
            rounding,
        }
    }

    /// Returns the context's precision.
    ///
    /// A precision of zero or less means "unset": lossy operations fall
    /// back to [`Context::DEFAULT_PRECISION`], while explicit rounding via
    /// [`Big::round`](crate::Big::round) becomes a no-op.
    pub fn precision(&self) -> i32 {
        self.precision
    }

    /// Sets the context's precision.
    pub fn set_precision(&mut self, precision: i32) {
        self.precision = precision;
    }

    /// Returns the context's rounding algorithm.
    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Sets the context's rounding algorithm.
    pub fn set_rounding(&mut self, rounding: Rounding) {
        self.rounding = rounding;
    }

    /// The precision that lossy operations actually use, with an unset
    /// precision resolved to the default.
    pub(crate) fn prec(&self) -> i32 {
        if self.precision <= 0 {
            Context::DEFAULT_PRECISION
        } else {
            self.precision
        }
    }
}

/// Algorithms for rounding decimal numbers.
///
/// The rounding modes are precisely defined in [The Arithmetic Model][model]
/// chapter of the General Decimal Arithmetic specification.
///
/// [model]: http://speleotrove.com/decimal/damodel.html
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Rounding {
    /// Round towards zero (truncation).
    Down,
    /// Round to nearest; if equidistant, round so that the final digit is
    /// even.
    HalfEven,
}

impl Default for Rounding {
    fn default() -> Rounding {
        Rounding::HalfEven
    }
}
