//! Exact rational arithmetic for bond labels.
//!
//! A bond label `m` fixes the dihedral angle `π/m` between two mirrors.
//! Star polytopes need fractional labels such as `5/2`, and "no relation"
//! needs an infinite label, so labels are kept as reduced fractions where a
//! zero denominator means infinity.

use crate::error::KaleidoError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

/// A reduced fraction `num / den` with `den >= 0`.
///
/// - `den == 0` is infinity, with `num` normalized to `1` or `-1`
/// - `0/1` is the true zero
/// - `0/0` has no meaning and normalizes to zero
///
/// Arithmetic runs in `i128`. The operators never overflow: a result whose
/// reduced terms do not fit in `i64` is rounded by halving both terms, so
/// it underflows toward zero or overflows toward infinity. The `checked_*`
/// methods return `None` instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i64,
    den: i64,
}

/// Unreduced `(num, den)` in wide integers; `den == 0` is infinity
type Wide = (i128, i128);

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Lowest terms with a non-negative denominator
fn reduce((num, den): Wide) -> Wide {
    if den == 0 {
        return match num.signum() {
            0 => (0, 1),
            s => (s, 0),
        };
    }
    if num == 0 {
        return (0, 1);
    }
    let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
    let sign = den.signum();
    (sign * (num / g), sign * (den / g))
}

fn fits((num, den): Wide) -> bool {
    i64::try_from(num).is_ok() && i64::try_from(den).is_ok()
}

impl Rational {
    /// Zero
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    /// One (the diagonal entry of every Coxeter matrix)
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    /// Positive infinity (unbounded bond)
    pub const INFINITY: Rational = Rational { num: 1, den: 0 };

    /// Create a reduced rational
    pub fn new(num: i64, den: i64) -> Self {
        Self::rounded((num as i128, den as i128))
    }

    /// Exact value of `wide`, or `None` when it does not fit
    fn exact(wide: Wide) -> Option<Self> {
        let (num, den) = reduce(wide);
        Some(Self {
            num: i64::try_from(num).ok()?,
            den: i64::try_from(den).ok()?,
        })
    }

    /// Nearest value of `wide` reachable by halving both terms
    fn rounded(wide: Wide) -> Self {
        let (mut num, mut den) = reduce(wide);
        while !fits((num, den)) {
            num /= 2;
            den /= 2;
        }
        let (num, den) = reduce((num, den));
        Self {
            num: num as i64,
            den: den as i64,
        }
    }

    fn wide(&self) -> Wide {
        (self.num as i128, self.den as i128)
    }

    /// Integer rational `n/1`
    pub const fn integer(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Numerator (carries the sign)
    #[inline]
    pub fn num(&self) -> i64 {
        self.num
    }

    /// Denominator (never negative)
    #[inline]
    pub fn den(&self) -> i64 {
        self.den
    }

    /// True for `±∞`
    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.den == 0
    }

    /// True for `n/1`
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// Reciprocal; `1/0` is infinity and `1/∞` is zero
    pub fn recip(&self) -> Self {
        Self::rounded(recip_wide(self.wide()))
    }

    /// Sign as -1, 0 or 1
    pub fn signum(&self) -> i64 {
        self.num.signum()
    }

    /// Floating approximation (`±inf` for infinite values)
    pub fn to_f64(&self) -> f64 {
        if self.den == 0 {
            if self.num < 0 {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }
        } else {
            self.num as f64 / self.den as f64
        }
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Self::exact(sum_wide(self.wide(), rhs.wide()))
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        Self::exact(sum_wide(self.wide(), neg_wide(rhs.wide())))
    }

    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        Self::exact(product_wide(self.wide(), rhs.wide()))
    }

    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        Self::exact(product_wide(self.wide(), recip_wide(rhs.wide())))
    }

    pub fn checked_recip(self) -> Option<Self> {
        Self::exact(recip_wide(self.wide()))
    }
}

// Terms of `Rational` are at most 2^63 in magnitude, so every product of two
// terms and every sum of two such products fits in i128.

fn sum_wide(a: Wide, b: Wide) -> Wide {
    match (a.1 == 0, b.1 == 0) {
        // ∞ - ∞ has no value and collapses to zero like 0/0
        (true, true) if a.0.signum() != b.0.signum() => (0, 1),
        (true, _) => a,
        (false, true) => b,
        (false, false) => (a.0 * b.1 + b.0 * a.1, a.1 * b.1),
    }
}

fn product_wide(a: Wide, b: Wide) -> Wide {
    (a.0 * b.0, a.1 * b.1)
}

fn neg_wide(a: Wide) -> Wide {
    (-a.0, a.1)
}

fn recip_wide((num, den): Wide) -> Wide {
    if num == 0 {
        return (1, 0);
    }
    (den * num.signum(), num.abs())
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::integer(n)
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::rounded(sum_wide(self.wide(), rhs.wide()))
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::rounded(sum_wide(self.wide(), neg_wide(rhs.wide())))
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::rounded(product_wide(self.wide(), rhs.wide()))
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::rounded(product_wide(self.wide(), recip_wide(rhs.wide())))
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self {
        Self::rounded(neg_wide(self.wide()))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_infinite(), other.is_infinite()) {
            (true, true) => self.num.cmp(&other.num),
            (true, false) => self.num.cmp(&0).then(Ordering::Greater),
            (false, true) => 0.cmp(&other.num).then(Ordering::Less),
            (false, false) => (self.num as i128 * other.den as i128)
                .cmp(&(other.num as i128 * self.den as i128)),
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.num, self.den) {
            (n, 0) if n < 0 => write!(f, "-∞"),
            (_, 0) => write!(f, "∞"),
            (n, 1) => write!(f, "{}", n),
            (n, d) => write!(f, "{}/{}", n, d),
        }
    }
}

impl FromStr for Rational {
    type Err = KaleidoError;

    /// Accepts `"5"`, `"5/2"`, `"-3/4"`, `"inf"`, `"∞"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || KaleidoError::ParseRational {
            input: s.to_string(),
        };
        let t = s.trim();
        match t {
            "inf" | "∞" | "+inf" => return Ok(Self::INFINITY),
            "-inf" | "-∞" => return Ok(-Self::INFINITY),
            _ => {}
        }
        match t.split_once('/') {
            Some((n, d)) => {
                let n: i64 = n.trim().parse().map_err(|_| err())?;
                let d: i64 = d.trim().parse().map_err(|_| err())?;
                Ok(Self::new(n, d))
            }
            None => t.parse::<i64>().map(Self::integer).map_err(|_| err()),
        }
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.den {
            0 if self.num < 0 => serializer.serialize_str("-inf"),
            0 => serializer.serialize_str("inf"),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Int(n) => Ok(Self::integer(n)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let r = Rational::new(6, -4);
        assert_eq!((r.num(), r.den()), (-3, 2));

        let inf = Rational::new(-7, 0);
        assert_eq!((inf.num(), inf.den()), (-1, 0));

        assert_eq!(Rational::new(0, -5), Rational::ZERO);
        assert_eq!(Rational::new(0, 0), Rational::ZERO);
    }

    #[test]
    fn test_arithmetic() {
        let a = Rational::new(1, 3);
        let b = Rational::new(1, 6);
        assert_eq!(a + b, Rational::new(1, 2));
        assert_eq!(a - b, Rational::new(1, 6));
        assert_eq!(a * b, Rational::new(1, 18));
        assert_eq!(a / b, Rational::integer(2));
        assert_eq!(Rational::new(5, 2).recip(), Rational::new(2, 5));
        assert_eq!(Rational::new(-5, 2).recip(), Rational::new(-2, 5));
    }

    #[test]
    fn test_division_by_zero_is_infinity() {
        let q = Rational::ONE / Rational::ZERO;
        assert!(q.is_infinite());
        assert_eq!(q, Rational::INFINITY);
        assert_eq!(Rational::INFINITY.recip(), Rational::ZERO);
        assert_eq!(Rational::ZERO.recip(), Rational::INFINITY);
    }

    #[test]
    fn test_infinite_sums() {
        assert_eq!(Rational::INFINITY + Rational::ONE, Rational::INFINITY);
        assert_eq!(Rational::INFINITY - Rational::INFINITY, Rational::ZERO);
    }

    #[test]
    fn test_sign_and_float() {
        assert_eq!(Rational::new(-1, 3).signum(), -1);
        assert_eq!(Rational::ZERO.signum(), 0);
        assert!((Rational::new(5, 2).to_f64() - 2.5).abs() < 1e-12);
        assert!(Rational::INFINITY.to_f64().is_infinite());
    }

    #[test]
    fn test_ordering() {
        assert!(Rational::new(5, 2) < Rational::integer(3));
        assert!(Rational::integer(1000) < Rational::INFINITY);
        assert!(-Rational::INFINITY < Rational::integer(-1000));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("5/2".parse::<Rational>().unwrap(), Rational::new(5, 2));
        assert_eq!(" 4 ".parse::<Rational>().unwrap(), Rational::integer(4));
        assert_eq!("inf".parse::<Rational>().unwrap(), Rational::INFINITY);
        assert!("five".parse::<Rational>().is_err());

        assert_eq!(Rational::new(10, 4).to_string(), "5/2");
        assert_eq!(Rational::integer(3).to_string(), "3");
        assert_eq!(Rational::INFINITY.to_string(), "∞");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&vec![Rational::new(5, 2), Rational::INFINITY]).unwrap();
        assert_eq!(json, r#"["5/2","inf"]"#);
        let back: Vec<Rational> = serde_json::from_str(r#"[3, "5/2", "inf"]"#).unwrap();
        assert_eq!(back, vec![Rational::integer(3), Rational::new(5, 2), Rational::INFINITY]);
    }

    #[test]
    fn test_extreme_terms_do_not_overflow() {
        let min: Rational = "-9223372036854775808/1".parse().unwrap();
        assert_eq!(min.num(), i64::MIN);
        assert_eq!(Rational::new(i64::MIN, -1), -min);
        assert_eq!(-min, Rational::INFINITY);
        assert_eq!(min.recip(), Rational::ZERO);
        assert_eq!(Rational::new(i64::MIN, i64::MIN), Rational::ONE);

        let tiny = Rational::new(1, 4_000_000_000);
        assert_eq!(tiny * tiny, Rational::ZERO);
        assert!(tiny.checked_mul(tiny).is_none());

        let big = Rational::integer(4_000_000_000);
        assert_eq!(big * big, Rational::INFINITY);
        assert_eq!((-big) * big, -Rational::INFINITY);
        assert_eq!(big.checked_mul(Rational::integer(2)), Some(Rational::integer(8_000_000_000)));
    }

    #[test]
    fn test_wide_sums_reduce_exactly() {
        let a = Rational::new(1, 3_037_000_500);
        let sum = a + a;
        assert_eq!(sum, Rational::new(1, 1_518_500_250));
        assert_eq!(a.checked_sub(a), Some(Rational::ZERO));

        // 1/p + 1/q with coprime p, q near 2^32 has a denominator past i64
        let p = Rational::new(1, 4_294_967_291);
        let q = Rational::new(1, 4_294_967_279);
        assert!(p.checked_add(q).is_none());
        let rounded = p + q;
        assert!((rounded.to_f64() - (p.to_f64() + q.to_f64())).abs() < 1e-15);
    }
}
