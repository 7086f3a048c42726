//! 4x64 limb backend for arithmetic modulo the secp256k1 group order n.

use core::convert::TryInto;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

use crate::util::{adc, sbb};

const LIMBS: usize = 4;

/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
pub(crate) const MODULUS: [u64; LIMBS] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// Limbs of `2^256 - n`.
const NEG_MODULUS: [u64; LIMBS] = [!MODULUS[0] + 1, !MODULUS[1], 1, 0];

/// `n / 2`, used to decide whether a scalar is in the "high" half of the range.
const FRAC_MODULUS_2: [u64; LIMBS] = [
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
];

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Scalar4x64(pub(crate) [u64; LIMBS]);

/// Adds `a` to the number defined by `(c0, c1, c2)`. `c2` must never overflow.
fn sumadd(a: u64, c0: u64, c1: u64, c2: u64) -> (u64, u64, u64) {
    let new_c0 = c0.wrapping_add(a);
    let over: u64 = if new_c0 < a { 1 } else { 0 };
    let new_c1 = c1.wrapping_add(over);
    let new_c2 = c2 + if new_c1 < over { 1 } else { 0 };
    (new_c0, new_c1, new_c2)
}

/// Adds `a` to the number defined by `(c0, c1)`. `c1` must never overflow.
fn sumadd_fast(a: u64, c0: u64, c1: u64) -> (u64, u64) {
    let new_c0 = c0.wrapping_add(a);
    let new_c1 = c1 + if new_c0 < a { 1 } else { 0 };
    debug_assert!((new_c1 != 0) | (new_c0 >= a));
    (new_c0, new_c1)
}

/// Adds `a * b` to the number defined by `(c0, c1, c2)`. `c2` must never overflow.
fn muladd(a: u64, b: u64, c0: u64, c1: u64, c2: u64) -> (u64, u64, u64) {
    let t = (a as u128) * (b as u128);
    let th = (t >> 64) as u64;
    let tl = t as u64;

    let new_c0 = c0.wrapping_add(tl);
    let new_th = th + if new_c0 < tl { 1 } else { 0 };
    let new_c1 = c1.wrapping_add(new_th);
    let new_c2 = c2 + if new_c1 < new_th { 1 } else { 0 };
    debug_assert!((new_c1 >= new_th) || (new_c2 != 0));
    (new_c0, new_c1, new_c2)
}

/// Adds `a * b` to the number defined by `(c0, c1)`. `c1` must never overflow.
fn muladd_fast(a: u64, b: u64, c0: u64, c1: u64) -> (u64, u64) {
    let t = (a as u128) * (b as u128);
    let th = (t >> 64) as u64;
    let tl = t as u64;

    let new_c0 = c0.wrapping_add(tl);
    let new_th = th + if new_c0 < tl { 1 } else { 0 };
    let new_c1 = c1 + new_th;
    debug_assert!(new_c1 >= new_th);
    (new_c0, new_c1)
}

impl Scalar4x64 {
    pub(crate) const fn zero() -> Self {
        Self([0, 0, 0, 0])
    }

    pub(crate) const fn one() -> Self {
        Self([1, 0, 0, 0])
    }

    /// Parses a big-endian 32-byte array. Returns `None` if the encoded
    /// integer is not in `[0, n)`.
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let mut w = [0u64; LIMBS];
        w[3] = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        w[2] = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        w[1] = u64::from_be_bytes(bytes[16..24].try_into().unwrap());
        w[0] = u64::from_be_bytes(bytes[24..32].try_into().unwrap());
        Self::from_words(w)
    }

    pub(crate) fn from_words(w: [u64; 4]) -> CtOption<Self> {
        // w - n underflows (borrow = 2^64 - 1 on the top limb) iff w < n.
        let (_, borrow) = sbb(w[0], MODULUS[0], 0);
        let (_, borrow) = sbb(w[1], MODULUS[1], borrow);
        let (_, borrow) = sbb(w[2], MODULUS[2], borrow);
        let (_, borrow) = sbb(w[3], MODULUS[3], borrow);
        let is_some = (borrow as u8) & 1;

        CtOption::new(Self(w), Choice::from(is_some))
    }

    /// Reduces a big-endian 32-byte array mod n. Unlike [`Scalar4x64::from_bytes`]
    /// this never rejects its input: since n is within 2^128 of 2^256, a
    /// single conditional subtraction always suffices.
    pub(crate) fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let mut w = [0u64; LIMBS];
        w[3] = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        w[2] = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        w[1] = u64::from_be_bytes(bytes[16..24].try_into().unwrap());
        w[0] = u64::from_be_bytes(bytes[24..32].try_into().unwrap());
        let raw = Self(w);
        let overflow = raw.get_overflow();
        raw.reduce(overflow)
    }

    pub(crate) fn to_bytes(&self) -> [u8; 32] {
        let mut ret = [0; 32];
        ret[0..8].copy_from_slice(&self.0[3].to_be_bytes());
        ret[8..16].copy_from_slice(&self.0[2].to_be_bytes());
        ret[16..24].copy_from_slice(&self.0[1].to_be_bytes());
        ret[24..32].copy_from_slice(&self.0[0].to_be_bytes());
        ret
    }

    /// Is this scalar `>= n / 2`?
    pub(crate) fn is_high(&self) -> Choice {
        let (_, borrow) = sbb(self.0[0], FRAC_MODULUS_2[0], 0);
        let (_, borrow) = sbb(self.0[1], FRAC_MODULUS_2[1], borrow);
        let (_, borrow) = sbb(self.0[2], FRAC_MODULUS_2[2], borrow);
        let (_, borrow) = sbb(self.0[3], FRAC_MODULUS_2[3], borrow);
        (borrow & 1).ct_eq(&0)
    }

    pub(crate) fn is_zero(&self) -> Choice {
        self.0
            .iter()
            .fold(Choice::from(1), |acc, &limb| acc & limb.ct_eq(&0))
    }

    /// Negates this scalar mod n. The negation of zero is zero.
    pub(crate) fn negate(&self) -> Self {
        let nonzero = (0xFFFFFFFFFFFFFFFFu64 * (!self.is_zero()).unwrap_u8() as u64) as u128;
        let mut t = (!self.0[0]) as u128 + (MODULUS[0] + 1) as u128;
        let r0 = (t & nonzero) as u64;
        t >>= 64;
        t += (!self.0[1]) as u128 + MODULUS[1] as u128;
        let r1 = (t & nonzero) as u64;
        t >>= 64;
        t += (!self.0[2]) as u128 + MODULUS[2] as u128;
        let r2 = (t & nonzero) as u64;
        t >>= 64;
        t += (!self.0[3]) as u128 + MODULUS[3] as u128;
        let r3 = (t & nonzero) as u64;
        Self([r0, r1, r2, r3])
    }

    pub(crate) fn add(&self, rhs: &Self) -> Self {
        let mut t = (self.0[0] as u128) + (rhs.0[0] as u128);
        let r0 = (t & 0xFFFFFFFFFFFFFFFFu128) as u64;
        t >>= 64;
        t += (self.0[1] as u128) + (rhs.0[1] as u128);
        let r1 = (t & 0xFFFFFFFFFFFFFFFFu128) as u64;
        t >>= 64;
        t += (self.0[2] as u128) + (rhs.0[2] as u128);
        let r2 = (t & 0xFFFFFFFFFFFFFFFFu128) as u64;
        t >>= 64;
        t += (self.0[3] as u128) + (rhs.0[3] as u128);
        let r3 = (t & 0xFFFFFFFFFFFFFFFFu128) as u64;
        t >>= 64;
        let r = Self([r0, r1, r2, r3]);
        let overflow = t as u8 + r.get_overflow();
        debug_assert!(overflow == 0 || overflow == 1);

        r.reduce(overflow)
    }

    pub(crate) fn sub(&self, rhs: &Self) -> Self {
        let mut res = [0u64; 4];
        let mut borrow = 0;
        for i in 0..4 {
            let (r, b) = sbb(self.0[i], rhs.0[i], borrow);
            res[i] = r;
            borrow = b;
        }

        // A non-zero final borrow means we underflowed; add back the
        // modulus, masked by `borrow` (all-ones or all-zeros).
        let mut carry = 0;
        for i in 0..4 {
            let (r, c) = adc(res[i], MODULUS[i] & borrow, carry);
            res[i] = r;
            carry = c;
        }

        Self(res)
    }

    pub(crate) fn mul_wide(&self, rhs: &Self) -> WideScalar8x64 {
        let (c0, c1) = muladd_fast(self.0[0], rhs.0[0], 0, 0);
        let (l0, c0, c1) = (c0, c1, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[1], c0, c1, 0);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[0], c0, c1, c2);
        let (l1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[0], c0, c1, c2);
        let (l2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[0], c0, c1, c2);
        let (l3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[1], c0, c1, c2);
        let (l4, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[2], c0, c1, c2);
        let (l5, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = muladd_fast(self.0[3], rhs.0[3], c0, c1);
        let (l6, c0, _c1) = (c0, c1, 0);
        let l7 = c0;

        WideScalar8x64([l0, l1, l2, l3, l4, l5, l6, l7])
    }

    pub(crate) fn mul(&self, rhs: &Self) -> Self {
        self.mul_wide(rhs).reduce()
    }

    fn get_overflow(&self) -> u8 {
        let mut yes = 0u8;
        let mut no = 0u8;
        no |= (self.0[3] < MODULUS[3]) as u8;
        no |= (self.0[2] < MODULUS[2]) as u8;
        yes |= (self.0[2] > MODULUS[2]) as u8 & !no;
        no |= (self.0[1] < MODULUS[1]) as u8;
        yes |= (self.0[1] > MODULUS[1]) as u8 & !no;
        yes |= (self.0[0] >= MODULUS[0]) as u8 & !no;
        yes
    }

    fn reduce(&self, overflow: u8) -> Self {
        debug_assert!(overflow <= 1);

        let mut t = (self.0[0] as u128) + ((overflow as u64 * NEG_MODULUS[0]) as u128);
        let r0 = (t & 0xFFFFFFFFFFFFFFFFu128) as u64;
        t >>= 64;
        t += (self.0[1] as u128) + ((overflow as u64 * NEG_MODULUS[1]) as u128);
        let r1 = (t & 0xFFFFFFFFFFFFFFFFu128) as u64;
        t >>= 64;
        t += (self.0[2] as u128) + ((overflow as u64 * NEG_MODULUS[2]) as u128);
        let r2 = (t & 0xFFFFFFFFFFFFFFFFu128) as u64;
        t >>= 64;
        t += self.0[3] as u128;
        let r3 = (t & 0xFFFFFFFFFFFFFFFFu128) as u64;

        Self([r0, r1, r2, r3])
    }

    #[cfg(feature = "zeroize")]
    pub(crate) fn zeroize(&mut self) {
        self.0.as_mut().zeroize()
    }
}

impl ConditionallySelectable for Scalar4x64 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Scalar4x64([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl ConstantTimeEq for Scalar4x64 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

/// Accumulator for the unreduced 512-bit product of two scalars.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WideScalar8x64([u64; 8]);

impl WideScalar8x64 {
    pub(crate) fn reduce(&self) -> Scalar4x64 {
        let n0 = self.0[4];
        let n1 = self.0[5];
        let n2 = self.0[6];
        let n3 = self.0[7];

        // Reduce 512 bits into 385: m[0..6] = self[0..3] + n[0..3] * NEG_MODULUS.
        let (c0, c1) = muladd_fast(n0, NEG_MODULUS[0], self.0[0], 0);
        let (m0, c0, c1) = (c0, c1, 0);
        let (c0, c1) = sumadd_fast(self.0[1], c0, c1);
        let (c0, c1, c2) = muladd(n1, NEG_MODULUS[0], c0, c1, 0);
        let (c0, c1, c2) = muladd(n0, NEG_MODULUS[1], c0, c1, c2);
        let (m1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(self.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(n2, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(n1, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n0, c0, c1, c2);
        let (m2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(self.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(n3, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(n2, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n1, c0, c1, c2);
        let (m3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(n3, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n2, c0, c1, c2);
        let (m4, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = sumadd_fast(n3, c0, c1);
        let (m5, c0, _c1) = (c0, c1, 0);
        debug_assert!(c0 <= 1);
        let m6 = c0;

        // Reduce 385 bits into 258: p[0..4] = m[0..3] + m[4..6] * NEG_MODULUS.
        let (c0, c1) = muladd_fast(m4, NEG_MODULUS[0], m0, 0);
        let (p0, c0, c1) = (c0, c1, 0);
        let (c0, c1) = sumadd_fast(m1, c0, c1);
        let (c0, c1, c2) = muladd(m5, NEG_MODULUS[0], c0, c1, 0);
        let (c0, c1, c2) = muladd(m4, NEG_MODULUS[1], c0, c1, c2);
        let (p1, c0, c1) = (c0, c1, 0);
        let (c0, c1, c2) = sumadd(m2, c0, c1, c2);
        let (c0, c1, c2) = muladd(m6, NEG_MODULUS[0], c0, c1, c2);
        let (c0, c1, c2) = muladd(m5, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(m4, c0, c1, c2);
        let (p2, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = sumadd_fast(m3, c0, c1);
        let (c0, c1) = muladd_fast(m6, NEG_MODULUS[1], c0, c1);
        let (c0, c1) = sumadd_fast(m5, c0, c1);
        let (p3, c0, _c1) = (c0, c1, 0);
        let p4 = c0 + m6;
        debug_assert!(p4 <= 2);

        // Reduce 258 bits into 256: r[0..3] = p[0..3] + p[4] * NEG_MODULUS.
        let mut c = (p0 as u128) + (NEG_MODULUS[0] as u128) * (p4 as u128);
        let r0 = (c & 0xFFFFFFFFFFFFFFFFu128) as u64;
        c >>= 64;
        c += (p1 as u128) + (NEG_MODULUS[1] as u128) * (p4 as u128);
        let r1 = (c & 0xFFFFFFFFFFFFFFFFu128) as u64;
        c >>= 64;
        c += (p2 as u128) + (p4 as u128);
        let r2 = (c & 0xFFFFFFFFFFFFFFFFu128) as u64;
        c >>= 64;
        c += p3 as u128;
        let r3 = (c & 0xFFFFFFFFFFFFFFFFu128) as u64;
        c >>= 64;

        let s = Scalar4x64([r0, r1, r2, r3]);
        s.reduce((c as u8) + s.get_overflow())
    }
}

impl ConstantTimeEq for WideScalar8x64 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(Choice::from(1), |acc, (a, b)| acc & a.ct_eq(b))
    }
}
