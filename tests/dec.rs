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

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::error::Error;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;

use bigdec::{Big, Context, Rounding};

fn hash_data<H>(h: H) -> u64
where
    H: Hash,
{
    let mut hasher = DefaultHasher::new();
    h.hash(&mut hasher);
    hasher.finish()
}

const PARSE_TESTS: &[(&str, i64, i32)] = &[
    ("0", 0, 0),
    ("00.00", 0, 2),
    ("1", 1, 0),
    ("-1", -1, 0),
    ("+42", 42, 0),
    ("12.34", 1234, 2),
    ("-0.001", -1, 3),
    (".5", 5, 1),
    ("5.", 5, 0),
    ("1e3", 1, -3),
    ("1E3", 1, -3),
    ("1.2e-3", 12, 4),
    ("-1.2E+3", -12, -2),
    ("9223372036854775807", i64::MAX, 0),
];

#[test]
fn test_parse() -> Result<(), Box<dyn Error>> {
    for (input, mantissa, scale) in PARSE_TESTS {
        println!("parse({:?}): expected mantissa {}, scale {}", input, mantissa, scale);
        let d: Big = input.parse()?;
        assert_eq!(d.scale(), *scale);
        assert_eq!(d, Big::new(*mantissa, *scale));
    }
    Ok(())
}

const PARSE_ERRORS: &[&str] = &[
    "", " ", "abc", "1.2.3", "e5", "1e", "1e+", "--1", "1 2", "0x10", "1,2", "Infinity", "++Inf",
    "1.2e4.5",
];

#[test]
fn test_parse_errors() {
    for input in PARSE_ERRORS {
        println!("parse({:?}): expected error", input);
        assert!(input.parse::<Big>().is_err());
    }
}

#[test]
fn test_parse_infinities() -> Result<(), Box<dyn Error>> {
    for input in ["Inf", "inf", "INF", "+Inf", "+inf"] {
        let d: Big = input.parse()?;
        assert!(d.is_infinite());
        assert!(!d.is_negative());
    }
    for input in ["-Inf", "-inf", "-INF"] {
        let d: Big = input.parse()?;
        assert!(d.is_infinite());
        assert!(d.is_negative());
    }
    Ok(())
}

#[test]
fn test_parse_big_mantissa() -> Result<(), Box<dyn Error>> {
    // One past i64::MAX must take the unbounded path.
    let x: Big = "9223372036854775808".parse()?;
    assert!(x.is_big());
    assert_eq!(
        x.to_bigint(),
        Some("9223372036854775808".parse::<BigInt>()?)
    );

    // i64::MIN round-trips even though it collides with the compact
    // sentinel.
    let x: Big = "-9223372036854775808".parse()?;
    assert_eq!(x.to_i64(), Some(i64::MIN));
    assert_eq!(x.to_string(), "-9223372036854775808");

    let x: Big = "99999999999999999999999999999999999999".parse()?;
    assert_eq!(
        x.to_plain_string(),
        "99999999999999999999999999999999999999"
    );
    Ok(())
}

const FORMAT_TESTS: &[(&str, &str, &str)] = &[
    // input, scientific, plain
    ("0", "0", "0"),
    ("5", "5", "5"),
    ("-5", "-5", "-5"),
    ("0.5", "0.5", "0.5"),
    ("-0.001", "-0.001", "-0.001"),
    ("123.456", "123.456", "123.456"),
    ("1e3", "1e+3", "1000"),
    ("1.234e+5", "1.234e+5", "123400"),
    ("1.234e-5", "0.00001234", "0.00001234"),
    ("1.234e-7", "1.234e-7", "0.0000001234"),
    ("120e-2", "1.2", "1.2"),
    ("100", "100", "100"),
    ("-1.5", "-1.5", "-1.5"),
    ("0.000001", "0.000001", "0.000001"),
    ("1e-7", "1e-7", "0.0000001"),
    ("-4.2e+30", "-4.2e+30", "-4200000000000000000000000000000"),
];

#[test]
fn test_format() -> Result<(), Box<dyn Error>> {
    for (input, sci, plain) in FORMAT_TESTS {
        println!("format({:?}): expected {:?} and {:?}", input, sci, plain);
        let d: Big = input.parse()?;
        assert_eq!(d.to_string(), *sci);
        assert_eq!(d.to_plain_string(), *plain);
        // Both forms parse back to the same value.
        assert_eq!(sci.parse::<Big>()?, d);
        assert_eq!(plain.parse::<Big>()?, d);
    }

    // Infinities format without a sign, in both notations.
    let inf: Big = "-Inf".parse()?;
    assert_eq!(inf.to_string(), "Inf");
    assert_eq!(inf.to_plain_string(), "Inf");

    assert_eq!(format!("{:#}", "1.234e-7".parse::<Big>()?), "1.234E-7");
    assert_eq!(format!("{:?}", Big::new(15, 1)), "1.5");
    Ok(())
}

#[test]
fn test_add() -> Result<(), Box<dyn Error>> {
    let z = Big::new(1, 0).checked_add(&Big::new(1, 0))?;
    assert_eq!(z.to_string(), "2");
    assert_eq!(z.scale(), 0);

    let z = Big::new(1, 1).checked_add(&Big::new(2, 1))?;
    assert_eq!(z.to_string(), "0.3");
    assert_eq!(z.scale(), 1);

    // Mixed scales align to the larger one.
    let z = Big::new(15, 1).checked_add(&Big::new(25, 2))?;
    assert_eq!(z.to_string(), "1.75");
    assert_eq!(z.scale(), 2);

    let z = Big::new(-15, 1).checked_add(&Big::new(5, 1))?;
    assert_eq!(z.to_string(), "-1");

    // Compact addition promotes on overflow.
    let z = Big::new(i64::MAX, 0).checked_add(&Big::new(i64::MAX, 0))?;
    assert_eq!(z.to_plain_string(), "18446744073709551614");
    assert!(z.is_big());

    // And the promoted result interoperates with compact values.
    let z = z.checked_add(&Big::new(2, 0))?;
    assert_eq!(z.to_plain_string(), "18446744073709551616");
    Ok(())
}

#[test]
fn test_add_infinities() {
    let pinf: Big = "+Inf".parse().unwrap();
    let ninf: Big = "-Inf".parse().unwrap();

    let err = pinf.checked_add(&ninf).unwrap_err();
    assert_eq!(err.reason(), "addition of infinities with opposing signs");
    assert_eq!(
        err.to_string(),
        "invalid decimal operation: addition of infinities with opposing signs"
    );
    assert!(ninf.checked_add(&pinf).is_err());

    assert_eq!(pinf.checked_add(&pinf).unwrap(), pinf);
    assert_eq!(pinf.checked_add(&Big::new(1, 0)).unwrap(), pinf);
    assert_eq!(Big::new(1, 0).checked_add(&ninf).unwrap(), ninf);

    assert!(pinf.checked_sub(&pinf).is_err());
    assert!(ninf.checked_sub(&ninf).is_err());
    assert_eq!(pinf.checked_sub(&ninf).unwrap(), pinf);
    assert_eq!(Big::new(1, 0).checked_sub(&pinf).unwrap(), ninf);
}

#[test]
#[should_panic(expected = "invalid decimal operation")]
fn test_opposing_infinities_panic() {
    let _ = Big::infinity() + -Big::infinity();
}

#[test]
fn test_sub() -> Result<(), Box<dyn Error>> {
    assert_eq!(Big::new(3, 0) - Big::new(1, 0), Big::new(2, 0));
    assert_eq!(Big::new(1, 0) - Big::new(3, 0), Big::new(-2, 0));
    assert_eq!(Big::new(25, 2) - Big::new(5, 1), Big::new(-25, 2));
    assert_eq!(Big::zero() - Big::new(7, 0), Big::new(-7, 0));
    assert_eq!(Big::new(7, 0) - Big::zero(), Big::new(7, 0));

    // Subtraction of a promoted value.
    let big: Big = "18446744073709551616".parse()?;
    let z = big.checked_sub(&Big::new(i64::MAX, 0))?;
    assert_eq!(z.to_string(), "9223372036854775809");
    Ok(())
}

#[test]
fn test_identities() -> Result<(), Box<dyn Error>> {
    let values = [
        "0",
        "1",
        "-1",
        "12.34",
        "-0.007",
        "1e10",
        "123456789123456789123456789",
        "5e-12",
    ];
    let zero = Big::zero();
    let one = Big::new(1, 0);
    for v in values {
        let x: Big = v.parse()?;

        assert_eq!(x.checked_add(&zero)?, x, "{} + 0", v);
        assert_eq!(zero.checked_add(&x)?, x, "0 + {}", v);
        assert_eq!(x.checked_mul(&one)?, x, "{} * 1", v);
        assert!(x.checked_mul(&zero)?.is_zero(), "{} * 0", v);

        let sum = x.checked_add(&(-&x))?;
        assert!(sum.is_zero(), "{} + (-{})", v, v);
        assert_eq!(sum.sign(), 0);

        assert_eq!((-&x).sign(), -x.sign(), "sign(-{})", v);
    }
    Ok(())
}

#[test]
fn test_commutativity() -> Result<(), Box<dyn Error>> {
    let values = ["0", "2", "-3.5", "0.125", "9e5", "98765432109876543210", "-1e-9"];
    for a in values {
        for b in values {
            let x: Big = a.parse()?;
            let y: Big = b.parse()?;
            assert_eq!(x.checked_add(&y)?, y.checked_add(&x)?, "{} + {}", a, b);
            assert_eq!(x.checked_mul(&y)?, y.checked_mul(&x)?, "{} * {}", a, b);
        }
    }
    Ok(())
}

#[test]
fn test_distribution() -> Result<(), Box<dyn Error>> {
    // Addition and multiplication are exact, so distribution holds
    // without any precision juggling.
    let triples = [
        ("1.5", "2.25", "-0.125"),
        ("-3", "7", "11"),
        ("9999999999999999999", "123.456", "-0.000789"),
    ];
    for (a, b, c) in triples {
        let x: Big = a.parse()?;
        let y: Big = b.parse()?;
        let z: Big = c.parse()?;
        let lhs = x.checked_mul(&y.checked_add(&z)?)?;
        let rhs = x.checked_mul(&y)?.checked_add(&x.checked_mul(&z)?)?;
        assert_eq!(lhs, rhs, "{} * ({} + {})", a, b, c);
    }
    Ok(())
}

#[test]
fn test_mul() -> Result<(), Box<dyn Error>> {
    assert_eq!(Big::new(15, 1) * Big::new(2, 0), Big::new(3, 0));
    assert_eq!((Big::new(-3, 0) * Big::new(4, 0)).to_string(), "-12");

    // Scales add.
    let z = Big::new(2, 1) * Big::new(3, 2);
    assert_eq!(z.scale(), 3);
    assert_eq!(z.to_string(), "0.006");

    // Overflowing products promote to the unbounded path.
    let z = Big::new(i64::MAX, 0) * Big::new(10, 0);
    assert_eq!(z.to_plain_string(), "92233720368547758070");
    assert!(z.is_big());

    // Specials.
    assert!(Big::zero().checked_mul(&Big::infinity()).is_err());
    assert!(Big::infinity().checked_mul(&Big::zero()).is_err());
    let z = Big::infinity().checked_mul(&Big::new(-2, 0))?;
    assert!(z.is_infinite() && z.is_negative());
    let z = Big::infinity().checked_mul(&Big::infinity())?;
    assert!(z.is_infinite() && !z.is_negative());
    Ok(())
}

#[test]
fn test_quo() -> Result<(), Box<dyn Error>> {
    let mut x = Big::new(1, 0);
    x.set_prec(10);
    assert_eq!(x.checked_quo(&Big::new(3, 0))?.to_string(), "0.3333333333");

    // An unset precision defaults to 16 significant digits.
    let q = Big::new(2, 0).checked_quo(&Big::new(3, 0))?;
    assert_eq!(q.to_string(), "0.6666666666666667");

    // Truncation.
    let mut x = Big::new(2, 0);
    x.set_prec(4);
    x.set_mode(Rounding::Down);
    assert_eq!(x.checked_quo(&Big::new(3, 0))?.to_string(), "0.6666");

    // Exact quotients shed their trailing zeros in display.
    let q = Big::new(1, 0).checked_quo(&Big::new(4, 0))?;
    assert_eq!(q.to_string(), "0.25");

    let q = Big::new(-1, 0).checked_quo(&Big::new(3, 0))?;
    assert_eq!(q.to_string(), "-0.3333333333333333");

    // Half-even at the last retained digit.
    let mut x = Big::new(5, 0);
    x.set_prec(1);
    assert_eq!(x.checked_quo(&Big::new(4, 0))?.to_string(), "1"); // 1.25
    let mut x = Big::new(6, 0);
    x.set_prec(1);
    assert_eq!(x.checked_quo(&Big::new(4, 0))?.to_string(), "2"); // 1.5
    let mut x = Big::new(10, 0);
    x.set_prec(1);
    assert_eq!(x.checked_quo(&Big::new(4, 0))?.to_string(), "2"); // 2.5
    let mut x = Big::new(14, 0);
    x.set_prec(2);
    assert_eq!(x.checked_quo(&Big::new(4, 0))?.to_string(), "3.5");

    // Unbounded operands.
    let mut x: Big = "123456789012345678901234567890".parse()?;
    x.set_prec(10);
    let q = x.checked_quo(&Big::new(3, 0))?;
    assert_eq!(q.to_string(), "4.1152263e+28");
    assert_eq!(q, "4115226300e+19".parse()?);

    // Specials.
    assert!(Big::zero().checked_quo(&Big::zero()).is_err());
    assert!(Big::infinity().checked_quo(&Big::infinity()).is_err());
    assert!(Big::new(1, 0).checked_quo(&Big::zero())?.is_infinite());
    assert!(Big::zero().checked_quo(&Big::new(5, 0))?.is_zero());
    assert!(Big::new(1, 0).checked_quo(&Big::infinity())?.is_zero());
    let q = Big::new(-1, 0).checked_quo(&Big::zero())?;
    assert!(q.is_infinite() && q.is_negative());
    Ok(())
}

/// Checks the rounding error bound of division under half-even rounding:
/// `|x - q*y| <= |y| * 10^(prec(q) - p) / 2`.
fn assert_quo_bound(a: &str, b: &str, p: i32) {
    let x: Big = a.parse().unwrap();
    let y: Big = b.parse().unwrap();
    let mut dividend = x.clone();
    dividend.set_prec(p);
    let q = dividend.checked_quo(&y).unwrap();
    let resid = x
        .checked_sub(&q.checked_mul(&y).unwrap())
        .unwrap()
        .abs();
    let bound = y.abs().checked_mul(&Big::new(5, p - q.prec() + 1)).unwrap();
    assert!(resid <= bound, "{} / {}: residual {} > bound {}", a, b, resid, bound);
}

#[test]
fn test_quo_error_bound() {
    for (a, b) in [("1", "3"), ("2", "7"), ("-5", "9"), ("22", "7"), ("1", "998")] {
        assert_quo_bound(a, b, 10);
    }
}

#[test]
fn test_sqrt() -> Result<(), Box<dyn Error>> {
    let mut two = Big::new(2, 0);
    two.set_prec(20);
    assert_eq!(two.sqrt().to_string(), "1.4142135623730950488");

    // Perfect squares take the exact path.
    assert_eq!(Big::new(144, 0).sqrt().to_string(), "12");
    assert_eq!(Big::new(1, 0).sqrt().to_string(), "1");
    assert_eq!(Big::new(4, 0).sqrt().to_string(), "2");
    assert_eq!(Big::new(25, 0).sqrt().to_string(), "5");
    assert_eq!(Big::new(10000, 0).sqrt().to_string(), "100");

    // A fractional perfect square is still irrational in the mantissa.
    assert_eq!(Big::new(225, 2).sqrt().to_string(), "1.5");

    let mut x = Big::new(10, 0);
    x.set_prec(10);
    assert_eq!(x.sqrt().to_string(), "3.1622776601");

    let mut x = Big::new(25, 3);
    x.set_prec(4);
    assert_eq!(x.sqrt().to_string(), "0.1581");

    // sqrt(x^2) == |x| when the square is exact.
    let x = Big::new(-12345, 2);
    let sq = x.checked_mul(&x)?;
    assert_eq!(sq.sqrt(), x.abs());

    // sqrt(x)^2 is within one unit in the last place of x.
    let mut x = Big::new(7, 0);
    x.set_prec(12);
    let r = x.sqrt();
    let resid = x.checked_sub(&r.checked_mul(&r)?)?.abs();
    assert!(resid <= Big::new(1, 11));

    // Specials.
    assert!(Big::zero().checked_sqrt()?.is_zero());
    assert!(Big::infinity().checked_sqrt()?.is_infinite());
    let err = Big::new(-4, 0).checked_sqrt().unwrap_err();
    assert_eq!(err.reason(), "square root of negative number");
    assert!((-Big::infinity()).checked_sqrt().is_err());
    Ok(())
}

#[test]
fn test_scale_overflow_is_infinity() {
    let x = Big::new(1, i32::MAX);
    let z = x.checked_mul(&x).unwrap();
    assert!(z.is_infinite());

    let y = Big::new(1, i32::MIN);
    let z = x.checked_quo(&y).unwrap();
    assert!(z.is_infinite());

    let mut w = Big::new(2, i32::MIN);
    w.set_prec(5);
    assert!(w.checked_sqrt().unwrap().is_infinite());
}

const CMP_TESTS: &[(&str, &str, Ordering)] = &[
    ("1.2", "1.2", Ordering::Equal),
    ("1.2", "1.200", Ordering::Equal),
    ("1", "2", Ordering::Less),
    ("2", "1", Ordering::Greater),
    ("-1", "1", Ordering::Less),
    ("-2", "-1", Ordering::Less),
    ("-100", "-1", Ordering::Less),
    ("0.00001", "1e-5", Ordering::Equal),
    ("100", "99.9999", Ordering::Greater),
    ("-1.3", "-1.2", Ordering::Less),
    ("0", "0.000", Ordering::Equal),
    ("0", "-1", Ordering::Greater),
    ("Inf", "Inf", Ordering::Equal),
    ("-Inf", "Inf", Ordering::Less),
    ("Inf", "12345678901234567890123456789", Ordering::Greater),
    ("-Inf", "-12345678901234567890123456789", Ordering::Less),
    ("12345678901234567890", "12345678901234567891", Ordering::Less),
    ("12345678901234567890", "12345678901234567890.000", Ordering::Equal),
];

#[test]
fn test_cmp() -> Result<(), Box<dyn Error>> {
    for (lhs, rhs, expected) in CMP_TESTS {
        println!("cmp({}, {}): expected {:?}", lhs, rhs, expected);
        let l: Big = lhs.parse()?;
        let r: Big = rhs.parse()?;
        assert_eq!(l.cmp(&r), *expected);
        assert_eq!(r.cmp(&l), expected.reverse());
    }

    // Equal values hash equally, whatever their representation.
    for (lhs, rhs, expected) in CMP_TESTS {
        let l: Big = lhs.parse()?;
        let r: Big = rhs.parse()?;
        if *expected == Ordering::Equal {
            assert_eq!(hash_data(&l), hash_data(&r), "hash({}) != hash({})", lhs, rhs);
        }
    }

    assert_eq!(Big::new(1, 5).cmp(&Big::new(100, 7)), Ordering::Equal);
    Ok(())
}

#[test]
fn test_ord_total() -> Result<(), Box<dyn Error>> {
    let expected = ["-Inf", "-2", "-1.5", "0", "0.1", "3", "1e10", "Inf"];
    let mut values: Vec<Big> = ["3", "Inf", "-1.5", "1e10", "0.1", "-Inf", "0", "-2"]
        .iter()
        .map(|s| s.parse())
        .collect::<Result<_, _>>()?;
    values.sort();
    let sorted: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    // Infinity formats without its sign, so compare by value instead.
    for (v, e) in values.iter().zip(expected.iter()) {
        assert_eq!(v, &e.parse::<Big>()?, "sorted as {:?}", sorted);
    }
    Ok(())
}

#[test]
fn test_sign() -> Result<(), Box<dyn Error>> {
    assert_eq!(Big::new(5, 0).sign(), 1);
    assert_eq!(Big::new(-5, 0).sign(), -1);
    assert_eq!(Big::zero().sign(), 0);
    assert_eq!(Big::infinity().sign(), 1);
    assert_eq!((-Big::infinity()).sign(), -1);

    let x: Big = "-12345678901234567890".parse()?;
    assert_eq!(x.sign(), -1);
    assert!(x.is_negative());
    Ok(())
}

#[test]
fn test_neg_abs() -> Result<(), Box<dyn Error>> {
    assert_eq!(-Big::new(5, 1), Big::new(-5, 1));
    assert_eq!(Big::new(-5, 1).abs(), Big::new(5, 1));
    assert_eq!(Big::zero().abs(), Big::zero());
    assert_eq!((-Big::infinity()).abs(), Big::infinity());

    let x: Big = "-99999999999999999999".parse()?;
    assert_eq!(x.abs().to_string(), "99999999999999999999");
    assert_eq!((-&x).to_string(), "99999999999999999999");
    Ok(())
}

#[test]
fn test_assign_ops() {
    // The assign operators let the destination alias an operand.
    let mut x = Big::new(15, 1);
    let y = x.clone();
    x += &y;
    assert_eq!(x, Big::new(3, 0));

    let mut x = Big::new(2, 0);
    let c = x.clone();
    x *= &c;
    assert_eq!(x, Big::new(4, 0));
    x -= &c;
    assert_eq!(x, Big::new(2, 0));
    x /= &c;
    assert_eq!(x, Big::new(1, 0));
    x += &c;
    assert_eq!(x, Big::new(3, 0));

    let mut x = Big::new(7, 0);
    let c = x.clone();
    x -= &c;
    assert!(x.is_zero());
}

#[test]
fn test_accessors() -> Result<(), Box<dyn Error>> {
    let x = Big::new(1234, 2);
    assert_eq!(x.to_i64(), Some(12));
    assert_eq!(Big::new(-1234, 2).to_i64(), Some(-12));
    assert_eq!(Big::new(5, -3).to_i64(), Some(5000));
    assert_eq!(Big::new(i64::MAX, 0).to_i64(), Some(i64::MAX));
    assert_eq!(Big::infinity().to_i64(), None);

    assert!(!x.is_int());
    assert!(Big::new(1200, 2).is_int());
    assert!(Big::new(5, 0).is_int());
    assert!(Big::new(5, -3).is_int());
    assert!(!Big::new(5, 1).is_int());
    assert!(Big::zero().is_int());
    assert!(!Big::infinity().is_int());

    assert!(Big::new(i64::MAX, -1).is_big());
    assert!(!Big::new(i64::MAX, 0).is_big());
    assert!(Big::infinity().is_big());

    assert_eq!(Big::zero().to_bigint(), Some(BigInt::from(0)));
    assert_eq!(Big::infinity().to_bigint(), None);
    assert_eq!("123.456".parse::<Big>()?.to_bigint(), Some(BigInt::from(123)));

    assert_eq!(x.prec(), 4);
    assert_eq!(Big::zero().prec(), 0);
    assert_eq!(Big::infinity().prec(), 0);

    assert_eq!(Big::new(255, 0).bit_len(), 8);
    assert_eq!(Big::new(256, 0).bit_len(), 9);
    assert_eq!(Big::zero().bit_len(), 0);

    let mut x = Big::new(5, 2);
    x.set_scale(1);
    assert_eq!(x, Big::new(5, 1));
    x.set_inf();
    assert!(x.is_infinite() && !x.is_negative());
    Ok(())
}

#[test]
fn test_context() {
    let ctx = Context::default();
    assert_eq!(ctx.precision(), 0);
    assert_eq!(ctx.rounding(), Rounding::HalfEven);

    let mut ctx = Context::new(8, Rounding::Down);
    assert_eq!(ctx.precision(), 8);
    ctx.set_rounding(Rounding::HalfEven);
    assert_eq!(ctx.rounding(), Rounding::HalfEven);
    ctx.set_precision(4);

    let mut x = Big::new(1, 0);
    x.set_context(ctx);
    assert_eq!(x.context(), ctx);
    assert_eq!(x.mode(), Rounding::HalfEven);
    assert_eq!(x.checked_quo(&Big::new(3, 0)).unwrap().to_string(), "0.3333");

    // The left-hand operand's context flows into the result.
    let z = x.checked_add(&Big::new(1, 0)).unwrap();
    assert_eq!(z.context(), ctx);
}

#[test]
fn test_round() {
    let mut x = Big::new(12345, 0);
    x.round(3);
    assert_eq!(x, Big::new(123, -2));

    // Half-even ties.
    let mut x = Big::new(12350, 0);
    x.round(3);
    assert_eq!(x, Big::new(124, -2));
    let mut x = Big::new(12450, 0);
    x.round(3);
    assert_eq!(x, Big::new(124, -2));
    let mut x = Big::new(-12350, 0);
    x.round(3);
    assert_eq!(x, Big::new(-124, -2));

    // Truncation.
    let mut x = Big::new(19999, 0);
    x.set_mode(Rounding::Down);
    x.round(2);
    assert_eq!(x, Big::new(19, -3));

    // Rounding crosses the radix point.
    let mut x = Big::new(66666, 5);
    x.round(3);
    assert_eq!(x, Big::new(667, 3));

    // No-ops.
    let mut x = Big::new(12345, 0);
    x.round(0);
    assert_eq!(x, Big::new(12345, 0));
    x.round(7);
    assert_eq!(x, Big::new(12345, 0));
    let mut z = Big::zero();
    z.round(2);
    assert!(z.is_zero());

    // The unbounded path.
    let mut x: Big = "123456789012345678901234567890".parse().unwrap();
    x.round(10);
    assert_eq!(
        x.to_plain_string(),
        "123456789000000000000000000000"
    );
}

#[test]
fn test_from_f64() -> Result<(), Box<dyn Error>> {
    assert_eq!(Big::try_from(0.0)?, Big::zero());
    assert_eq!(Big::try_from(1.0)?, Big::new(1, 0));
    assert_eq!(Big::try_from(-42.0)?, Big::new(-42, 0));
    assert_eq!(Big::try_from(3.1415)?.to_string(), "3.1415");
    assert_eq!(Big::try_from(0.5)?, Big::new(5, 1));
    assert_eq!(Big::try_from(-0.25)?, Big::new(-25, 2));

    assert!(Big::try_from(f64::NAN).is_err());
    assert!(Big::try_from(f64::INFINITY)?.is_infinite());
    let ninf = Big::try_from(f64::NEG_INFINITY)?;
    assert!(ninf.is_infinite() && ninf.is_negative());

    // Magnitudes beyond 64 bits go through the IEEE decomposition, sign
    // included.
    let big = Big::try_from((2f64).powi(70))?;
    assert_eq!(big.to_bigint(), Some(BigInt::from(1u128 << 70)));
    let big = Big::try_from(-(2f64).powi(70))?;
    assert_eq!(big.to_bigint(), Some(-BigInt::from(1u128 << 70)));

    // The 64-bit-but-not-63-bit range.
    let big = Big::try_from(1.5e19)?;
    assert_eq!(big.to_plain_string(), "15000000000000000000");

    assert_eq!(Big::try_from(2.5f32)?, Big::new(25, 1));
    Ok(())
}

#[test]
fn test_sum_product() {
    let v = vec![Big::new(1, 0), Big::new(25, 1), Big::new(-5, 1)];
    let sum: Big = v.iter().sum();
    assert_eq!(sum, Big::new(3, 0));
    let product: Big = v.into_iter().product();
    assert_eq!(product, Big::new(-125, 2));
}

#[test]
fn test_from_ints() {
    assert_eq!(Big::from(42u8), Big::new(42, 0));
    assert_eq!(Big::from(-7i32), Big::new(-7, 0));
    assert_eq!(Big::from(i64::MIN).to_string(), "-9223372036854775808");
    assert_eq!(Big::from(u64::MAX).to_plain_string(), "18446744073709551615");
    assert_eq!(
        Big::from(i128::MIN).to_plain_string(),
        "-170141183460469231731687303715884105728"
    );
    assert_eq!(Big::from(BigInt::from(7) << 100).scale(), 0);
}
