//! Chain work as exact rationals.
//!
//! The work of a block is `genesis_target / target`: a harder (smaller)
//! target contributes proportionally more work. Fork choice compares sums
//! of such ratios across 256-bit targets, which no machine float can carry
//! without rounding, so work stays an arbitrary-precision rational from
//! creation through comparison.

use std::fmt;
use std::ops::Add;

use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::One;

use crate::hash::U256;

/// Exact (cumulative) proof-of-work.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Work(BigRational);

impl Work {
    /// One unit of work: the fixed sentinel assigned to a genesis block.
    pub fn unit() -> Self {
        Work(BigRational::one())
    }

    /// `genesis_target / target`.
    ///
    /// # Panics
    ///
    /// Panics on a zero `target`; callers reject zero targets before any
    /// work is computed.
    pub fn ratio(genesis_target: U256, target: U256) -> Self {
        Work(BigRational::new(to_bigint(genesis_target), to_bigint(target)))
    }
}

fn to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_big_endian())
}

impl Add for Work {
    type Output = Work;

    fn add(self, rhs: Work) -> Work {
        Work(self.0 + rhs.0)
    }
}

impl Add<&Work> for &Work {
    type Output = Work;

    fn add(self, rhs: &Work) -> Work {
        Work(&self.0 + &rhs.0)
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
