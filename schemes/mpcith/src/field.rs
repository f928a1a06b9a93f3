//! Finite fields consumed by the engine.
//!
//! The engine only needs the small [`Field`] interface: ring operations,
//! a canonical byte encoding, a byte-aligned map for challenge expansion, and
//! uniform sampling from an XOF stream for random tapes. Two fields are
//! provided:
//!
//! - [`Gf256`]: GF(2^8) with the AES polynomial x^8 + x^4 + x^3 + x + 1
//! - [`Gf251`]: the prime field Z/251Z, as used by SDitH

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use sha3::digest::XofReader;
use zeroize::Zeroize;

/// Field interface required by the MPC-in-the-Head engine.
pub trait Field:
    Copy
    + Clone
    + Default
    + Debug
    + PartialEq
    + Eq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + Zeroize
    + 'static
{
    /// The additive identity.
    const ZERO: Self;

    /// The multiplicative identity.
    const ONE: Self;

    /// Length of the canonical encoding in bytes.
    const BYTES: usize;

    /// Bytes consumed by [`Field::from_uniform_bytes`].
    const UNIFORM_BYTES: usize;

    /// Writes the canonical encoding into `out[..Self::BYTES]`.
    fn write_bytes(&self, out: &mut [u8]);

    /// Parses a canonical encoding; `None` for out-of-range values.
    fn from_bytes(bytes: &[u8]) -> Option<Self>;

    /// Maps `Self::UNIFORM_BYTES` uniform bytes to a (nearly) uniform element.
    fn from_uniform_bytes(bytes: &[u8]) -> Self;

    /// Draws a uniform element from an XOF stream.
    fn sample<R: XofReader>(reader: &mut R) -> Self;

    /// Returns true if this is the zero element.
    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Computes the square of this element.
    fn square(self) -> Self {
        self * self
    }
}

/// Encodes a slice of field elements back to back.
pub fn encode_elements<F: Field>(elems: &[F]) -> Vec<u8> {
    let mut out = vec![0u8; elems.len() * F::BYTES];
    for (e, chunk) in elems.iter().zip(out.chunks_exact_mut(F::BYTES)) {
        e.write_bytes(chunk);
    }
    out
}

/// Decodes exactly `count` field elements; `None` on length or range errors.
pub fn decode_elements<F: Field>(bytes: &[u8], count: usize) -> Option<Vec<F>> {
    if bytes.len() != count * F::BYTES {
        return None;
    }
    bytes.chunks_exact(F::BYTES).map(F::from_bytes).collect()
}

/// Samples `count` elements from an XOF stream.
pub fn sample_elements<F: Field, R: XofReader>(reader: &mut R, count: usize) -> Vec<F> {
    (0..count).map(|_| F::sample(reader)).collect()
}

/// Inner product of two equal-length vectors.
pub fn inner_product<F: Field>(a: &[F], b: &[F]) -> F {
    a.iter()
        .zip(b)
        .fold(F::ZERO, |acc, (&x, &y)| acc + x * y)
}

// ============================================================================
// GF(2^8)
// ============================================================================

/// An element of GF(2^8) under the AES polynomial.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash, Zeroize)]
pub struct Gf256(pub u8);

impl Gf256 {
    /// Computes the multiplicative inverse as a^254.
    ///
    /// Returns zero for zero input.
    pub fn inverse(self) -> Gf256 {
        let x2 = self.square();
        let x4 = x2.square();
        let x8 = x4.square();
        let x16 = x8.square();
        let x32 = x16.square();
        let x64 = x32.square();
        let x128 = x64.square();
        x128 * x64 * x32 * x16 * x8 * x4 * x2
    }
}

/// Addition in GF(2^8) is XOR.
#[allow(clippy::suspicious_arithmetic_impl)]
impl Add for Gf256 {
    type Output = Gf256;

    #[inline]
    fn add(self, rhs: Gf256) -> Gf256 {
        Gf256(self.0 ^ rhs.0)
    }
}

#[allow(clippy::suspicious_op_assign_impl)]
impl AddAssign for Gf256 {
    #[inline]
    fn add_assign(&mut self, rhs: Gf256) {
        self.0 ^= rhs.0;
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Sub for Gf256 {
    type Output = Gf256;

    #[inline]
    fn sub(self, rhs: Gf256) -> Gf256 {
        Gf256(self.0 ^ rhs.0)
    }
}

#[allow(clippy::suspicious_op_assign_impl)]
impl SubAssign for Gf256 {
    #[inline]
    fn sub_assign(&mut self, rhs: Gf256) {
        self.0 ^= rhs.0;
    }
}

impl Neg for Gf256 {
    type Output = Gf256;

    #[inline]
    fn neg(self) -> Gf256 {
        self
    }
}

/// Constant-time carry-less multiplication with reduction by 0x11B.
impl Mul for Gf256 {
    type Output = Gf256;

    #[inline]
    fn mul(self, rhs: Gf256) -> Gf256 {
        let mut result = 0u8;
        let mut a = self.0;
        let mut b = rhs.0;

        for _ in 0..8 {
            let mask = 0u8.wrapping_sub(b & 1);
            result ^= a & mask;

            let high_bit_mask = 0u8.wrapping_sub((a >> 7) & 1);
            a = (a << 1) ^ (0x1b & high_bit_mask);

            b >>= 1;
        }

        Gf256(result)
    }
}

impl MulAssign for Gf256 {
    #[inline]
    fn mul_assign(&mut self, rhs: Gf256) {
        *self = *self * rhs;
    }
}

impl Field for Gf256 {
    const ZERO: Self = Gf256(0);
    const ONE: Self = Gf256(1);
    const BYTES: usize = 1;
    const UNIFORM_BYTES: usize = 1;

    fn write_bytes(&self, out: &mut [u8]) {
        out[0] = self.0;
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytes.first().map(|&b| Gf256(b))
    }

    fn from_uniform_bytes(bytes: &[u8]) -> Self {
        Gf256(bytes[0])
    }

    fn sample<R: XofReader>(reader: &mut R) -> Self {
        let mut b = [0u8; 1];
        reader.read(&mut b);
        Gf256(b[0])
    }
}

// ============================================================================
// GF(251)
// ============================================================================

/// The GF(251) modulus.
pub const Q251: u16 = 251;

/// An element of GF(251), always held in canonical form `[0, 251)`.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash, Zeroize)]
pub struct Gf251(u8);

impl Gf251 {
    /// Creates an element, reducing `v` modulo 251.
    pub const fn new(v: u16) -> Self {
        Gf251((v % Q251) as u8)
    }

    /// Returns the canonical representative.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Computes the multiplicative inverse as a^249 (Fermat).
    ///
    /// Returns zero for zero input.
    pub fn inverse(self) -> Gf251 {
        let mut result = Gf251::ONE;
        let mut base = self;
        let mut e = (Q251 - 2) as u32;
        while e > 0 {
            if e & 1 == 1 {
                result *= base;
            }
            base = base.square();
            e >>= 1;
        }
        result
    }

    #[inline]
    fn reduce_once(v: u16) -> Gf251 {
        // v < 2q: subtract q when v >= q, without a branch
        let t = v.wrapping_sub(Q251);
        let mask = 0u16.wrapping_sub(t >> 15);
        Gf251(((t & !mask) | (v & mask)) as u8)
    }
}

impl Add for Gf251 {
    type Output = Gf251;

    #[inline]
    fn add(self, rhs: Gf251) -> Gf251 {
        Gf251::reduce_once(self.0 as u16 + rhs.0 as u16)
    }
}

impl AddAssign for Gf251 {
    #[inline]
    fn add_assign(&mut self, rhs: Gf251) {
        *self = *self + rhs;
    }
}

impl Sub for Gf251 {
    type Output = Gf251;

    #[inline]
    fn sub(self, rhs: Gf251) -> Gf251 {
        Gf251::reduce_once(self.0 as u16 + Q251 - rhs.0 as u16)
    }
}

impl SubAssign for Gf251 {
    #[inline]
    fn sub_assign(&mut self, rhs: Gf251) {
        *self = *self - rhs;
    }
}

impl Neg for Gf251 {
    type Output = Gf251;

    #[inline]
    fn neg(self) -> Gf251 {
        Gf251::ZERO - self
    }
}

impl Mul for Gf251 {
    type Output = Gf251;

    #[inline]
    fn mul(self, rhs: Gf251) -> Gf251 {
        Gf251::new(self.0 as u16 * rhs.0 as u16)
    }
}

impl MulAssign for Gf251 {
    #[inline]
    fn mul_assign(&mut self, rhs: Gf251) {
        *self = *self * rhs;
    }
}

impl Field for Gf251 {
    const ZERO: Self = Gf251(0);
    const ONE: Self = Gf251(1);
    const BYTES: usize = 1;
    const UNIFORM_BYTES: usize = 4;

    fn write_bytes(&self, out: &mut [u8]) {
        out[0] = self.0;
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes.first() {
            Some(&b) if (b as u16) < Q251 => Some(Gf251(b)),
            _ => None,
        }
    }

    fn from_uniform_bytes(bytes: &[u8]) -> Self {
        let v = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Gf251((v % Q251 as u32) as u8)
    }

    fn sample<R: XofReader>(reader: &mut R) -> Self {
        let mut b = [0u8; 1];
        loop {
            reader.read(&mut b);
            if (b[0] as u16) < Q251 {
                return Gf251(b[0]);
            }
        }
    }
}
