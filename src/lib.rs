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

//! bigdec is an arbitrary-precision, fixed-point decimal arithmetic
//! library for Rust.
//!
//! # Introduction
//!
//! Binary floating-point numbers can only approximate common decimal
//! numbers. The value 0.1, for example, would need an infinitely
//! recurring binary fraction, and so `0.1 + 0.2 != 0.3` in `f64`
//! arithmetic. A decimal number system represents such values exactly,
//! which makes it the right tool for financial calculations, or indeed
//! for any calculation whose results are required to match those
//! computed by hand.
//!
//! # Details
//!
//! bigdec represents a number as a signed integer *mantissa* and a
//! 32-bit *scale*; the value denoted is `mantissa × 10^(-scale)`.
//! Mantissas that fit a machine integer are stored inline; arithmetic
//! transparently promotes to an unbounded integer (via [`num_bigint`])
//! when a result overflows 64 bits. Precision is therefore limited only
//! by memory, while the common case pays no allocation at all.
//!
//! The main types exposed by this library are as follows:
//!
//!  * [`Big`], the decimal number: a tagged value that is zero, finite,
//!    or infinite, with the full set of arithmetic operations, string
//!    conversion in plain and scientific notation, and a total order.
//!
//!  * [`Context`], the policy attached to each value: the precision (in
//!    significant digits) that lossy operations retain, and the
//!    [`Rounding`] algorithm used to discard excess digits.
//!
//! Operations that have no representable decimal result, like
//! `Inf - Inf` or the square root of a negative number, are reported as
//! [`InvalidOperationError`] by the `checked_*` methods; the
//! corresponding operator overloads panic instead.
//!
//! # Examples
//!
//! The following example demonstrates the basic usage of the library:
//!
//! ```
//! # use std::error::Error;
//! use bigdec::Big;
//!
//! let x: Big = "0.1".parse()?;
//! let y: Big = "0.2".parse()?;
//! let z: Big = "0.3".parse()?;
//!
//! assert_eq!(&x + &y, z);
//! assert_eq!((x + y).to_string(), "0.3");
//!
//! # Ok::<_, Box<dyn Error>>(())
//! ```

#![deny(missing_debug_implementations, missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod arith;
mod context;
mod conv;
mod decimal;
mod error;

pub use context::{Context, Rounding};
pub use decimal::Big;
pub use error::{InvalidOperationError, ParseDecimalError};
