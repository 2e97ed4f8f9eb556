//! Galois Field GF(2^8) arithmetic
//!
//! All shard math happens in the field GF(2)[x] / (x⁸ + x⁴ + x³ + x² + 1),
//! whose 256 elements are exactly the byte values. Addition and subtraction
//! are bitwise XOR; multiplication and division go through log/exp tables
//! built from the generator element `2`.
//!
//! Three tables are built once per process and shared read-only afterwards:
//!
//! - `log[a]`: the discrete log of `a` to base 2, for `a != 0`
//! - `exp[i]`: `2^i`, duplicated to length 512 so that
//!   `exp[log[a] + log[b]]` needs no reduction modulo 255
//! - `mul[a][b]`: the full 256×256 product table, used by the table-driven
//!   coding loops which hoist one 256-entry row per matrix coefficient

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use std::sync::OnceLock;

/// Primitive polynomial x⁸ + x⁴ + x³ + x² + 1 defining the field
const FIELD_POLYNOMIAL: u16 = 0x11D;

/// Order of the multiplicative group (every nonzero element is 2^i for some i < 255)
const GROUP_ORDER: usize = 255;

/// Galois field lookup tables, built once and shared process-wide
pub struct GaloisTable {
    log: [u8; 256],
    exp: [u8; 512],
    mul: Box<[[u8; 256]; 256]>,
}

impl GaloisTable {
    /// Get the process-wide table, building it on first use
    pub fn get() -> &'static GaloisTable {
        static TABLE: OnceLock<GaloisTable> = OnceLock::new();
        TABLE.get_or_init(GaloisTable::build)
    }

    fn build() -> GaloisTable {
        let mut log = [0u8; 256];
        let mut exp = [0u8; 512];

        let mut b: u16 = 1;
        for i in 0..GROUP_ORDER {
            exp[i] = b as u8;
            log[b as usize] = i as u8;
            b <<= 1;
            if b & 0x100 != 0 {
                b ^= FIELD_POLYNOMIAL;
            }
        }
        // log[0] stays 0 as a sentinel; multiply and divide guard the zero
        // operands before ever reading it.
        for i in GROUP_ORDER..512 {
            exp[i] = exp[i - GROUP_ORDER];
        }

        let mut mul = Box::new([[0u8; 256]; 256]);
        for a in 1..256 {
            for b in 1..256 {
                mul[a][b] = exp[log[a] as usize + log[b] as usize];
            }
        }

        GaloisTable { log, exp, mul }
    }

    /// Multiply two field elements via the log/exp tables
    #[inline]
    pub fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
    }

    /// Multiply two field elements via the product table
    #[inline]
    pub fn mul_table(&self, a: u8, b: u8) -> u8 {
        self.mul[a as usize][b as usize]
    }

    /// One row of the product table: all 256 multiples of `c`
    #[inline]
    pub fn mul_row(&self, c: u8) -> &[u8; 256] {
        &self.mul[c as usize]
    }

    /// Divide `a` by `b`
    ///
    /// # Panics
    ///
    /// Panics if `b == 0`; zero has no multiplicative inverse.
    #[inline]
    pub fn div(&self, a: u8, b: u8) -> u8 {
        if b == 0 {
            panic!("division by zero in GF(2^8)");
        }
        if a == 0 {
            return 0;
        }
        let idx = self.log[a as usize] as usize + GROUP_ORDER - self.log[b as usize] as usize;
        self.exp[idx]
    }

    /// Raise `a` to the power `n`
    ///
    /// The empty product convention applies: `exp(a, 0) = 1` for every `a`,
    /// including zero.
    #[inline]
    pub fn exp(&self, a: u8, n: usize) -> u8 {
        if n == 0 {
            return 1;
        }
        if a == 0 {
            return 0;
        }
        let idx = self.log[a as usize] as usize * n % GROUP_ORDER;
        self.exp[idx]
    }
}

/// Field addition (bitwise XOR)
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Field subtraction (identical to addition in characteristic 2)
#[inline]
pub fn sub(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Field multiplication
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    GaloisTable::get().mul(a, b)
}

/// Field division; panics if `b == 0`
#[inline]
pub fn div(a: u8, b: u8) -> u8 {
    GaloisTable::get().div(a, b)
}

/// Field exponentiation with `exp(a, 0) = 1`
#[inline]
pub fn exp(a: u8, n: usize) -> u8 {
    GaloisTable::get().exp(a, n)
}

/// A single GF(2^8) element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Gf8(u8);

impl Gf8 {
    /// The additive identity
    pub const ZERO: Gf8 = Gf8(0);

    /// The multiplicative identity
    pub const ONE: Gf8 = Gf8(1);

    pub const fn new(value: u8) -> Self {
        Gf8(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Power operation, with `pow(0) = 1`
    pub fn pow(self, n: usize) -> Gf8 {
        Gf8(exp(self.0, n))
    }
}

// Addition (XOR in fields of characteristic 2)
impl Add for Gf8 {
    type Output = Gf8;

    fn add(self, rhs: Gf8) -> Gf8 {
        Gf8(self.0 ^ rhs.0)
    }
}

impl AddAssign for Gf8 {
    fn add_assign(&mut self, rhs: Gf8) {
        self.0 ^= rhs.0;
    }
}

// Subtraction (same as addition)
impl Sub for Gf8 {
    type Output = Gf8;

    fn sub(self, rhs: Gf8) -> Gf8 {
        Gf8(self.0 ^ rhs.0)
    }
}

impl SubAssign for Gf8 {
    fn sub_assign(&mut self, rhs: Gf8) {
        self.0 ^= rhs.0;
    }
}

// Multiplication via the log/exp tables
impl Mul for Gf8 {
    type Output = Gf8;

    fn mul(self, rhs: Gf8) -> Gf8 {
        Gf8(mul(self.0, rhs.0))
    }
}

impl MulAssign for Gf8 {
    fn mul_assign(&mut self, rhs: Gf8) {
        *self = *self * rhs;
    }
}

// Division via the log/exp tables; panics on a zero divisor
impl Div for Gf8 {
    type Output = Gf8;

    fn div(self, rhs: Gf8) -> Gf8 {
        Gf8(div(self.0, rhs.0))
    }
}

impl DivAssign for Gf8 {
    fn div_assign(&mut self, rhs: Gf8) {
        *self = *self / rhs;
    }
}

impl From<u8> for Gf8 {
    fn from(value: u8) -> Self {
        Gf8(value)
    }
}

impl From<Gf8> for u8 {
    fn from(val: Gf8) -> Self {
        val.0
    }
}

impl std::fmt::Display for Gf8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
