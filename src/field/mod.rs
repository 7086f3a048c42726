//! Arithmetic mod p = 2^256 - 2^32 - 977, the base field of secp256k1.

mod backend;

use backend::FieldElement5x52;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// An element of the base field GF(p).
///
/// Values are always stored internally with magnitude tracked implicitly by
/// the surrounding arithmetic; every operation that crosses an API boundary
/// (equality, byte encoding, conditional selection) normalizes first.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(FieldElement5x52);

impl FieldElement {
    /// The additive identity.
    pub const ZERO: Self = Self(FieldElement5x52::zero());

    /// The multiplicative identity.
    pub const ONE: Self = Self(FieldElement5x52::one());

    /// `b = 7`, the constant term of the secp256k1 curve equation `y^2 = x^3 + 7`.
    pub const CURVE_EQUATION_B: Self = Self(FieldElement5x52([7, 0, 0, 0, 0]));

    /// Returns `true` (as a `Choice`) if this element is zero.
    pub fn is_zero(&self) -> Choice {
        self.0.normalize_weak().is_zero()
    }

    /// Returns `true` (as a `Choice`) if this element is odd.
    pub fn is_odd(&self) -> Choice {
        self.0.normalize().is_odd()
    }

    /// Parses a big-endian 32-byte array as a field element.
    ///
    /// Returns `None` if the value does not represent an integer in `[0, p)`.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        FieldElement5x52::from_bytes(bytes).map(Self)
    }

    /// Builds a field element from a big-endian 32-byte array known in
    /// advance to be in `[0, p)`, without the runtime range check. Used
    /// only for fixed curve constants.
    pub(crate) const fn from_bytes_unchecked(bytes: &[u8; 32]) -> Self {
        Self(FieldElement5x52::from_bytes_unchecked(bytes))
    }

    /// Returns the big-endian SEC1 encoding of this element.
    ///
    /// The value is normalized first, so the encoding is always canonical.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.normalize().to_bytes()
    }

    /// Fully reduces this element to its canonical representative.
    pub fn normalize(&self) -> Self {
        Self(self.0.normalize())
    }

    /// Partially reduces this element, bringing its magnitude down to 1
    /// without paying for a full normalization. Sufficient for feeding back
    /// into further arithmetic; not sufficient for byte encoding or equality.
    pub(crate) fn normalize_weak(&self) -> Self {
        Self(self.0.normalize_weak())
    }

    /// Returns `true` (as a `Choice`) if this element normalizes to zero,
    /// without the cost of a full normalization.
    pub(crate) fn normalizes_to_zero(&self) -> Choice {
        self.0.normalizes_to_zero()
    }

    /// Negates this element. `magnitude` must be an upper bound on the
    /// current magnitude of `self`; the result's magnitude is `magnitude + 1`.
    pub const fn negate(&self, magnitude: u32) -> Self {
        Self(self.0.negate(magnitude))
    }

    /// Returns `self + rhs`.
    pub const fn add(&self, rhs: &Self) -> Self {
        Self(self.0.add(&rhs.0))
    }

    /// Returns `2 * self`.
    pub const fn double(&self) -> Self {
        Self(self.0.double())
    }

    /// Returns `self * rhs`.
    pub const fn mul(&self, rhs: &Self) -> Self {
        Self(self.0.mul(&rhs.0))
    }

    /// Returns `self * self`.
    pub fn square(&self) -> Self {
        Self(self.0.square())
    }

    /// Multiplies by a small (non-secret) constant.
    pub const fn mul_single(&self, rhs: u32) -> Self {
        Self(self.0.mul_single(rhs))
    }

    /// Computes the multiplicative inverse via Fermat's little theorem
    /// (`self^(p-2) mod p`), using a fixed addition chain so the running
    /// time does not depend on the bit pattern of `p - 2`.
    ///
    /// Returns `None` (as a `CtOption`) if `self` is zero.
    pub fn invert(&self) -> CtOption<Self> {
        let x1 = *self;
        let x2 = x1.square().mul(&x1);
        let x3 = x2.square().mul(&x1);
        let x6 = {
            let mut x = x3;
            for _ in 0..3 {
                x = x.square();
            }
            x.mul(&x3)
        };
        let x9 = {
            let mut x = x6;
            for _ in 0..3 {
                x = x.square();
            }
            x.mul(&x3)
        };
        let x11 = {
            let mut x = x9;
            for _ in 0..2 {
                x = x.square();
            }
            x.mul(&x2)
        };
        let x22 = {
            let mut x = x11;
            for _ in 0..11 {
                x = x.square();
            }
            x.mul(&x11)
        };
        let x44 = {
            let mut x = x22;
            for _ in 0..22 {
                x = x.square();
            }
            x.mul(&x22)
        };
        let x88 = {
            let mut x = x44;
            for _ in 0..44 {
                x = x.square();
            }
            x.mul(&x44)
        };
        let x176 = {
            let mut x = x88;
            for _ in 0..88 {
                x = x.square();
            }
            x.mul(&x88)
        };
        let x220 = {
            let mut x = x176;
            for _ in 0..44 {
                x = x.square();
            }
            x.mul(&x44)
        };
        let x223 = {
            let mut x = x220;
            for _ in 0..3 {
                x = x.square();
            }
            x.mul(&x3)
        };

        // The final 23 bits of p - 2 are 0b11010101001 for t1, then a final
        // assembly mirroring libsecp256k1's `secp256k1_fe_inv_var` chain.
        let mut t1 = x223;
        for _ in 0..23 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x22);
        for _ in 0..5 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x1);
        for _ in 0..3 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x2);
        for _ in 0..2 {
            t1 = t1.square();
        }
        let res = t1.mul(&x1);

        CtOption::new(res, !self.is_zero())
    }

    /// Computes a square root via the closed form `self^((p+1)/4)`, valid
    /// because `p ≡ 3 (mod 4)`. The result is verified by squaring; if
    /// `self` is not a quadratic residue, returns `None`.
    pub fn sqrt(&self) -> CtOption<Self> {
        let x1 = *self;
        let x2 = x1.square().mul(&x1);
        let x3 = x2.square().mul(&x1);
        let x6 = {
            let mut x = x3;
            for _ in 0..3 {
                x = x.square();
            }
            x.mul(&x3)
        };
        let x9 = {
            let mut x = x6;
            for _ in 0..3 {
                x = x.square();
            }
            x.mul(&x3)
        };
        let x11 = {
            let mut x = x9;
            for _ in 0..2 {
                x = x.square();
            }
            x.mul(&x2)
        };
        let x22 = {
            let mut x = x11;
            for _ in 0..11 {
                x = x.square();
            }
            x.mul(&x11)
        };
        let x44 = {
            let mut x = x22;
            for _ in 0..22 {
                x = x.square();
            }
            x.mul(&x22)
        };
        let x88 = {
            let mut x = x44;
            for _ in 0..44 {
                x = x.square();
            }
            x.mul(&x44)
        };
        let x176 = {
            let mut x = x88;
            for _ in 0..88 {
                x = x.square();
            }
            x.mul(&x88)
        };
        let x220 = {
            let mut x = x176;
            for _ in 0..44 {
                x = x.square();
            }
            x.mul(&x44)
        };
        let x223 = {
            let mut x = x220;
            for _ in 0..3 {
                x = x.square();
            }
            x.mul(&x3)
        };

        // (p + 1) / 4's bit pattern, assembled the same way as `invert`'s
        // exponent but stopping two squarings short and without the final
        // `x1` multiply (Fermat exponent for inversion is p - 2; for square
        // root it is (p + 1) / 4).
        let mut t1 = x223;
        for _ in 0..23 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x22);
        for _ in 0..6 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x2);
        t1 = t1.square();
        let sqrt = t1.square();

        CtOption::new(sqrt, sqrt.mul(&sqrt).ct_eq(self))
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(FieldElement5x52::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.normalize().ct_eq(&other.0.normalize())
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}

impl Default for FieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        self.negate(1)
    }
}

impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: &FieldElement) -> FieldElement {
        FieldElement::add(self, rhs)
    }
}

impl Add for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: FieldElement) -> FieldElement {
        FieldElement::add(&self, &rhs)
    }
}

impl AddAssign<&FieldElement> for FieldElement {
    fn add_assign(&mut self, rhs: &FieldElement) {
        *self = FieldElement::add(self, rhs);
    }
}

impl Sub<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: &FieldElement) -> FieldElement {
        FieldElement::add(self, &rhs.negate(1))
    }
}

impl Sub for FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: FieldElement) -> FieldElement {
        &self - &rhs
    }
}

impl SubAssign<&FieldElement> for FieldElement {
    fn sub_assign(&mut self, rhs: &FieldElement) {
        *self = &*self - rhs;
    }
}

impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: &FieldElement) -> FieldElement {
        FieldElement::mul(self, rhs)
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: FieldElement) -> FieldElement {
        FieldElement::mul(&self, &rhs)
    }
}

impl MulAssign<&FieldElement> for FieldElement {
    fn mul_assign(&mut self, rhs: &FieldElement) {
        *self = FieldElement::mul(self, rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::FieldElement;
    use num_bigint::{BigUint, ToBigUint};
    use proptest::prelude::*;

    fn to_biguint(fe: &FieldElement) -> BigUint {
        BigUint::from_bytes_be(&fe.to_bytes())
    }

    fn from_biguint(x: &BigUint) -> FieldElement {
        let mut bytes = [0u8; 32];
        let be = x.to_bytes_be();
        bytes[32 - be.len()..].copy_from_slice(&be);
        FieldElement::from_bytes(&bytes).unwrap()
    }

    fn modulus() -> BigUint {
        let mut bytes = [0xffu8; 32];
        bytes[31] = 0x2f;
        bytes[30] = 0xfc;
        bytes[29] = 0xff;
        bytes[28] = 0xff;
        bytes[27] = 0xfe;
        BigUint::from_bytes_be(&bytes)
    }

    #[test]
    fn zero_is_additive_identity() {
        let a = FieldElement::from_bytes(&[3u8; 32]).unwrap();
        assert_eq!(a + FieldElement::ZERO, a);
    }

    #[test]
    fn one_is_multiplicative_identity() {
        let a = FieldElement::from_bytes(&[3u8; 32]).unwrap();
        assert_eq!(a * FieldElement::ONE, a);
    }

    #[test]
    fn from_bytes_rejects_overflow() {
        assert!(bool::from(FieldElement::from_bytes(&[0xffu8; 32]).is_none()));
    }

    #[test]
    fn negation_round_trips() {
        let a = FieldElement::from_bytes(&[5u8; 32]).unwrap();
        let neg_neg_a = (-(-a)).normalize();
        assert_eq!(neg_neg_a, a.normalize());
    }

    #[test]
    fn invert_known_value() {
        let one = FieldElement::ONE;
        assert_eq!(one.invert().unwrap().normalize(), one);
    }

    #[test]
    fn sqrt_of_square_round_trips() {
        let a = FieldElement::from_bytes(&[9u8; 32]).unwrap();
        let sq = a.square();
        let root = sq.sqrt().unwrap();
        assert_eq!(root.square().normalize(), sq.normalize());
    }

    prop_compose! {
        fn field_element()(bytes in any::<[u8; 32]>()) -> FieldElement {
            let mut n = BigUint::from_bytes_be(&bytes);
            let m = modulus();
            if n >= m {
                n %= &m;
            }
            from_biguint(&n)
        }
    }

    proptest! {
        #[test]
        fn fuzzy_add(a in field_element(), b in field_element()) {
            let expected = (to_biguint(&a) + to_biguint(&b)) % modulus();
            let actual = to_biguint(&(a + b).normalize());
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn fuzzy_mul(a in field_element(), b in field_element()) {
            let expected = (to_biguint(&a) * to_biguint(&b)) % modulus();
            let actual = to_biguint(&(a * b).normalize());
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn fuzzy_square(a in field_element()) {
            let expected = (&to_biguint(&a) * &to_biguint(&a)) % modulus();
            let actual = to_biguint(&a.square().normalize());
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn fuzzy_invert(a in field_element()) {
            let a = if bool::from(a.is_zero()) { FieldElement::ONE } else { a };
            let inv = a.invert().unwrap();
            let product = to_biguint(&(a * inv).normalize());
            prop_assert_eq!(product, 1.to_biguint().unwrap());
        }
    }
}
