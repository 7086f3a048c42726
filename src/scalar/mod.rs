//! Arithmetic mod n, the order of the secp256k1 group.

mod backend;

use backend::Scalar4x64;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// An element of the scalar field GF(n), used for private keys, nonces,
/// and signature components.
#[derive(Clone, Copy, Debug)]
pub struct Scalar(Scalar4x64);

impl Scalar {
    /// The additive identity.
    pub const ZERO: Self = Self(Scalar4x64::zero());

    /// The multiplicative identity.
    pub const ONE: Self = Self(Scalar4x64::one());

    /// Returns `true` (as a `Choice`) if this scalar is zero.
    pub fn is_zero(&self) -> Choice {
        self.0.is_zero()
    }

    /// Returns `true` (as a `Choice`) if this scalar is `>= n / 2`.
    ///
    /// Used to enforce low-s normalization in ECDSA signatures.
    pub fn is_high(&self) -> Choice {
        self.0.is_high()
    }

    /// Parses a big-endian 32-byte array as a scalar.
    ///
    /// Returns `None` if the value does not represent an integer in `[0, n)`.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        Scalar4x64::from_bytes(bytes).map(Self)
    }

    /// Returns the big-endian SEC1 encoding of this scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Reduces a 32-byte big-endian integer into `[0, n)`, wrapping around
    /// the modulus rather than rejecting out-of-range inputs. Used for
    /// deriving nonces and message hashes, which are not guaranteed to
    /// already be less than n.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        Self(Scalar4x64::from_bytes_reduced(bytes))
    }

    /// Negates this scalar mod n. The negation of zero is zero.
    pub fn negate(&self) -> Self {
        Self(self.0.negate())
    }

    /// Returns `self + rhs mod n`.
    pub fn add(&self, rhs: &Self) -> Self {
        Self(self.0.add(&rhs.0))
    }

    /// Returns `self - rhs mod n`.
    pub fn sub(&self, rhs: &Self) -> Self {
        Self(self.0.sub(&rhs.0))
    }

    /// Returns `self * rhs mod n`.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self(self.0.mul(&rhs.0))
    }

    /// Returns `self * self mod n`.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Computes the multiplicative inverse via Fermat's little theorem
    /// (`self^(n-2) mod n`), using a fixed addition chain so the running
    /// time does not depend on the bit pattern of `n - 2`.
    ///
    /// Returns `None` (as a `CtOption`) if `self` is zero.
    pub fn invert(&self) -> CtOption<Self> {
        // https://briansmith.org/ecc-inversion-addition-chains-01#secp256k1_scalar_inversion
        let x_1 = *self;
        let x_10 = self.pow2k(1);
        let x_11 = x_10.mul(&x_1);
        let x_101 = x_10.mul(&x_11);
        let x_111 = x_10.mul(&x_101);
        let x_1001 = x_10.mul(&x_111);
        let x_1011 = x_10.mul(&x_1001);
        let x_1101 = x_10.mul(&x_1011);

        let x6 = x_1101.pow2k(2).mul(&x_1011);
        let x8 = x6.pow2k(2).mul(&x_11);
        let x14 = x8.pow2k(6).mul(&x6);
        let x28 = x14.pow2k(14).mul(&x14);
        let x56 = x28.pow2k(28).mul(&x28);

        #[rustfmt::skip]
        let res = x56
            .pow2k(56).mul(&x56)
            .pow2k(14).mul(&x14)
            .pow2k(3).mul(&x_101)
            .pow2k(4).mul(&x_111)
            .pow2k(4).mul(&x_101)
            .pow2k(5).mul(&x_1011)
            .pow2k(4).mul(&x_1011)
            .pow2k(4).mul(&x_111)
            .pow2k(5).mul(&x_111)
            .pow2k(6).mul(&x_1101)
            .pow2k(4).mul(&x_101)
            .pow2k(3).mul(&x_111)
            .pow2k(5).mul(&x_1001)
            .pow2k(6).mul(&x_101)
            .pow2k(10).mul(&x_111)
            .pow2k(4).mul(&x_111)
            .pow2k(9).mul(&x8)
            .pow2k(5).mul(&x_1001)
            .pow2k(6).mul(&x_1011)
            .pow2k(4).mul(&x_1101)
            .pow2k(5).mul(&x_11)
            .pow2k(6).mul(&x_1101)
            .pow2k(10).mul(&x_1101)
            .pow2k(4).mul(&x_1001)
            .pow2k(6).mul(&x_1)
            .pow2k(8).mul(&x6);

        CtOption::new(res, !self.is_zero())
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(Scalar4x64::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl Default for Scalar {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        self.negate()
    }
}

impl Add<&Scalar> for &Scalar {
    type Output = Scalar;

    fn add(self, rhs: &Scalar) -> Scalar {
        Scalar::add(self, rhs)
    }
}

impl Add for Scalar {
    type Output = Scalar;

    fn add(self, rhs: Scalar) -> Scalar {
        Scalar::add(&self, &rhs)
    }
}

impl AddAssign<&Scalar> for Scalar {
    fn add_assign(&mut self, rhs: &Scalar) {
        *self = Scalar::add(self, rhs);
    }
}

impl Sub<&Scalar> for &Scalar {
    type Output = Scalar;

    fn sub(self, rhs: &Scalar) -> Scalar {
        Scalar::sub(self, rhs)
    }
}

impl Sub for Scalar {
    type Output = Scalar;

    fn sub(self, rhs: Scalar) -> Scalar {
        Scalar::sub(&self, &rhs)
    }
}

impl SubAssign<&Scalar> for Scalar {
    fn sub_assign(&mut self, rhs: &Scalar) {
        *self = Scalar::sub(self, rhs);
    }
}

impl Mul<&Scalar> for &Scalar {
    type Output = Scalar;

    fn mul(self, rhs: &Scalar) -> Scalar {
        Scalar::mul(self, rhs)
    }
}

impl Mul for Scalar {
    type Output = Scalar;

    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar::mul(&self, &rhs)
    }
}

impl MulAssign<&Scalar> for Scalar {
    fn mul_assign(&mut self, rhs: &Scalar) {
        *self = Scalar::mul(self, rhs);
    }
}

#[cfg(feature = "zeroize")]
impl zeroize::Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize()
    }
}

#[cfg(test)]
mod tests {
    use super::Scalar;
    use num_bigint::{BigUint, ToBigUint};
    use proptest::prelude::*;

    fn order() -> BigUint {
        let bytes = [
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c,
            0xd0, 0x36, 0x41, 0x41,
        ];
        BigUint::from_bytes_be(&bytes)
    }

    fn to_biguint(s: &Scalar) -> BigUint {
        BigUint::from_bytes_be(&s.to_bytes())
    }

    fn from_biguint(x: &BigUint) -> Scalar {
        let mut bytes = [0u8; 32];
        let be = x.to_bytes_be();
        bytes[32 - be.len()..].copy_from_slice(&be);
        Scalar::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn zero_is_additive_identity() {
        let a = Scalar::from_bytes(&[7u8; 32]).unwrap();
        assert_eq!(a + Scalar::ZERO, a);
    }

    #[test]
    fn one_is_multiplicative_identity() {
        let a = Scalar::from_bytes(&[7u8; 32]).unwrap();
        assert_eq!(a * Scalar::ONE, a);
    }

    #[test]
    fn from_bytes_rejects_overflow() {
        assert!(bool::from(Scalar::from_bytes(&[0xffu8; 32]).is_none()));
    }

    #[test]
    fn invert_one_is_one() {
        assert_eq!(Scalar::ONE.invert().unwrap(), Scalar::ONE);
    }

    #[test]
    fn negate_is_additive_inverse() {
        let a = Scalar::from_bytes(&[11u8; 32]).unwrap();
        assert!(bool::from((a + a.negate()).is_zero()));
    }

    prop_compose! {
        fn scalar()(bytes in any::<[u8; 32]>()) -> Scalar {
            let mut n = BigUint::from_bytes_be(&bytes);
            let m = order();
            if n >= m {
                n %= &m;
            }
            from_biguint(&n)
        }
    }

    proptest! {
        #[test]
        fn fuzzy_add(a in scalar(), b in scalar()) {
            let expected = (to_biguint(&a) + to_biguint(&b)) % order();
            let actual = to_biguint(&(a + b));
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn fuzzy_mul(a in scalar(), b in scalar()) {
            let expected = (to_biguint(&a) * to_biguint(&b)) % order();
            let actual = to_biguint(&(a * b));
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn fuzzy_invert(a in scalar()) {
            let a = if bool::from(a.is_zero()) { Scalar::ONE } else { a };
            let inv = a.invert().unwrap();
            let product = to_biguint(&(a * inv));
            prop_assert_eq!(product, 1.to_biguint().unwrap());
        }
    }
}
