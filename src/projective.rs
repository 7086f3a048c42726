//! Points on the curve in Jacobian-style projective coordinates.
//!
//! `(X, Y, Z)` represents the affine point `(X/Z^2, Y/Z^3)` when `Z != 0`;
//! `Z == 0` is the point at infinity. This representation lets point
//! addition avoid a field inversion, at the cost of points no longer having
//! a unique representative (equality must cross-multiply rather than
//! compare coordinates directly).

#![allow(clippy::op_ref)]

use crate::affine::AffinePoint;
use crate::field::FieldElement;
use crate::scalar::Scalar;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// `b = 7` as a small constant, for the `mul_single` fast path used by the
/// complete addition/doubling formulas below.
const CURVE_EQUATION_B_SINGLE: u32 = 7;

/// A point on secp256k1 in Jacobian projective coordinates.
#[derive(Clone, Copy, Debug)]
pub struct JacobianPoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl JacobianPoint {
    /// The point at infinity, the additive identity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// The curve's base point `G`.
    pub const GENERATOR: Self = Self {
        x: AffinePoint::GENERATOR.x,
        y: AffinePoint::GENERATOR.y,
        z: FieldElement::ONE,
    };

    pub(crate) const fn from_affine_coords(x: FieldElement, y: FieldElement) -> Self {
        Self {
            x,
            y,
            z: FieldElement::ONE,
        }
    }

    /// Returns `true` (as a `Choice`) if this is the point at infinity.
    pub fn is_identity(&self) -> Choice {
        self.z.normalizes_to_zero()
    }

    /// Converts to the affine `(x, y)` representation.
    ///
    /// The point at infinity has no affine representation; it is mapped to
    /// [`AffinePoint::IDENTITY`], a distinct sentinel value never produced
    /// by a valid on-wire decode.
    pub fn to_affine(&self) -> AffinePoint {
        self.z
            .invert()
            .map(|zinv| {
                let x = self.x * zinv.square();
                let y = self.y * zinv.square() * zinv;
                AffinePoint::new(x.normalize(), y.normalize())
            })
            .unwrap_or(AffinePoint::IDENTITY)
    }

    /// Returns `-self`.
    pub fn negate(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.negate(1).normalize_weak(),
            z: self.z,
        }
    }

    /// Doubles this point.
    ///
    /// Complete formula (Renes-Costello-Batina 2015, Algorithm 9) for
    /// short-Weierstrass curves with `a = 0`; correct even when `self` is
    /// the identity.
    pub fn double(&self) -> Self {
        let yy = self.y.square();
        let zz = self.z.square();
        let xy2 = (self.x * self.y).double();

        let bzz = zz.mul_single(CURVE_EQUATION_B_SINGLE);
        let bzz3 = (bzz.double() + bzz).normalize_weak();
        let bzz9 = (bzz3.double() + bzz3).normalize_weak();

        let yy_m_bzz9 = yy + bzz9.negate(1);
        let yy_p_bzz3 = yy + bzz3;

        let yy_zz = yy * zz;
        let yy_zz8 = yy_zz.double().double().double();
        let t = (yy_zz8.double() + yy_zz8)
            .normalize_weak()
            .mul_single(CURVE_EQUATION_B_SINGLE);

        Self {
            x: xy2 * yy_m_bzz9,
            y: ((yy_m_bzz9 * yy_p_bzz3) + t).normalize_weak(),
            z: ((yy * self.y) * self.z).double().double().double().normalize_weak(),
        }
    }

    /// Adds two points in Jacobian coordinates.
    ///
    /// Complete formula (Renes-Costello-Batina 2015, Algorithm 7): correct
    /// for any combination of identity, equal, and opposite operands, with
    /// no branch on which case applies.
    fn add(&self, other: &Self) -> Self {
        let xx = self.x * other.x;
        let yy = self.y * other.y;
        let zz = self.z * other.z;

        let n_xx_yy = (xx + yy).negate(2);
        let n_yy_zz = (yy + zz).negate(2);
        let n_xx_zz = (xx + zz).negate(2);
        let xy_pairs = ((self.x + self.y) * (other.x + other.y)) + n_xx_yy;
        let yz_pairs = ((self.y + self.z) * (other.y + other.z)) + n_yy_zz;
        let xz_pairs = ((self.x + self.z) * (other.x + other.z)) + n_xx_zz;

        let bzz = zz.mul_single(CURVE_EQUATION_B_SINGLE);
        let bzz3 = (bzz.double() + bzz).normalize_weak();

        let yy_m_bzz3 = yy + bzz3.negate(1);
        let yy_p_bzz3 = yy + bzz3;

        let byz = yz_pairs.mul_single(CURVE_EQUATION_B_SINGLE).normalize_weak();
        let byz3 = (byz.double() + byz).normalize_weak();

        let xx3 = xx.double() + xx;
        let bxx9 = (xx3.double() + xx3)
            .normalize_weak()
            .mul_single(CURVE_EQUATION_B_SINGLE)
            .normalize_weak();

        Self {
            x: ((xy_pairs * yy_m_bzz3) + (byz3 * xz_pairs).negate(1)).normalize_weak(),
            y: ((yy_p_bzz3 * yy_m_bzz3) + (bxx9 * xz_pairs)).normalize_weak(),
            z: ((yz_pairs * yy_p_bzz3) + (xx3 * xy_pairs)).normalize_weak(),
        }
    }

    /// Adds a projective point to an affine one (`other.z` implicitly `1`).
    ///
    /// Complete formula (Renes-Costello-Batina 2015, Algorithm 8).
    fn add_mixed(&self, other: &AffinePoint) -> Self {
        let xx = self.x * other.x;
        let yy = self.y * other.y;
        let xy_pairs = ((self.x + self.y) * (other.x + other.y)) + (xx + yy).negate(2);
        let yz_pairs = (other.y * self.z) + self.y;
        let xz_pairs = (other.x * self.z) + self.x;

        let bzz = self.z.mul_single(CURVE_EQUATION_B_SINGLE);
        let bzz3 = (bzz.double() + bzz).normalize_weak();

        let yy_m_bzz3 = yy + bzz3.negate(1);
        let yy_p_bzz3 = yy + bzz3;

        let byz = yz_pairs.mul_single(CURVE_EQUATION_B_SINGLE).normalize_weak();
        let byz3 = (byz.double() + byz).normalize_weak();

        let xx3 = xx.double() + xx;
        let bxx9 = (xx3.double() + xx3)
            .normalize_weak()
            .mul_single(CURVE_EQUATION_B_SINGLE)
            .normalize_weak();

        let sum = Self {
            x: ((xy_pairs * yy_m_bzz3) + (byz3 * xz_pairs).negate(1)).normalize_weak(),
            y: ((yy_p_bzz3 * yy_m_bzz3) + (bxx9 * xz_pairs)).normalize_weak(),
            z: ((yz_pairs * yy_p_bzz3) + (xx3 * xy_pairs)).normalize_weak(),
        };

        Self::conditional_select(&sum, self, other.is_identity())
    }

    /// Compares `self` to an affine point without normalizing `self` first.
    pub fn eq_affine(&self, other: &AffinePoint) -> Choice {
        let both_identity = self.is_identity() & other.is_identity();
        let rhs_identity = other.is_identity();

        let rhs_x = other.x * self.z;
        let x_eq = (rhs_x.negate(1) + self.x).normalizes_to_zero();

        let rhs_y = other.y * self.z;
        let y_eq = (rhs_y.negate(1) + self.y).normalizes_to_zero();

        both_identity | (!rhs_identity & x_eq & y_eq)
    }
}

impl From<AffinePoint> for JacobianPoint {
    fn from(p: AffinePoint) -> Self {
        let projective = JacobianPoint {
            x: p.x,
            y: p.y,
            z: FieldElement::ONE,
        };
        JacobianPoint::conditional_select(&projective, &JacobianPoint::IDENTITY, p.is_identity())
    }
}

impl From<&AffinePoint> for JacobianPoint {
    fn from(p: &AffinePoint) -> Self {
        Self::from(*p)
    }
}

impl ConditionallySelectable for JacobianPoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for JacobianPoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        let lhs_x = self.x * other.z;
        let rhs_x = other.x * self.z;
        let x_eq = (rhs_x.negate(1) + lhs_x).normalizes_to_zero();

        let lhs_y = self.y * other.z;
        let rhs_y = other.y * self.z;
        let y_eq = (rhs_y.negate(1) + lhs_y).normalizes_to_zero();

        x_eq & y_eq
    }
}

impl PartialEq for JacobianPoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl PartialEq<AffinePoint> for JacobianPoint {
    fn eq(&self, other: &AffinePoint) -> bool {
        self.eq_affine(other).into()
    }
}

impl Eq for JacobianPoint {}

impl Default for JacobianPoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Neg for JacobianPoint {
    type Output = JacobianPoint;

    fn neg(self) -> JacobianPoint {
        JacobianPoint::negate(&self)
    }
}

impl Add for JacobianPoint {
    type Output = JacobianPoint;

    fn add(self, other: JacobianPoint) -> JacobianPoint {
        JacobianPoint::add(&self, &other)
    }
}

impl Add<&JacobianPoint> for JacobianPoint {
    type Output = JacobianPoint;

    fn add(self, other: &JacobianPoint) -> JacobianPoint {
        JacobianPoint::add(&self, other)
    }
}

impl AddAssign for JacobianPoint {
    fn add_assign(&mut self, rhs: JacobianPoint) {
        *self = JacobianPoint::add(self, &rhs);
    }
}

impl AddAssign<&JacobianPoint> for JacobianPoint {
    fn add_assign(&mut self, rhs: &JacobianPoint) {
        *self = JacobianPoint::add(self, rhs);
    }
}

impl Add<AffinePoint> for JacobianPoint {
    type Output = JacobianPoint;

    fn add(self, other: AffinePoint) -> JacobianPoint {
        JacobianPoint::add_mixed(&self, &other)
    }
}

impl Add<&AffinePoint> for JacobianPoint {
    type Output = JacobianPoint;

    fn add(self, other: &AffinePoint) -> JacobianPoint {
        JacobianPoint::add_mixed(&self, other)
    }
}

impl AddAssign<AffinePoint> for JacobianPoint {
    fn add_assign(&mut self, rhs: AffinePoint) {
        *self = JacobianPoint::add_mixed(self, &rhs);
    }
}

impl Sub for JacobianPoint {
    type Output = JacobianPoint;

    fn sub(self, other: JacobianPoint) -> JacobianPoint {
        JacobianPoint::add(&self, &other.negate())
    }
}

impl Sub<&JacobianPoint> for JacobianPoint {
    type Output = JacobianPoint;

    fn sub(self, other: &JacobianPoint) -> JacobianPoint {
        JacobianPoint::add(&self, &other.negate())
    }
}

impl SubAssign for JacobianPoint {
    fn sub_assign(&mut self, rhs: JacobianPoint) {
        *self = JacobianPoint::add(self, &rhs.negate());
    }
}

impl Sub<AffinePoint> for JacobianPoint {
    type Output = JacobianPoint;

    fn sub(self, other: AffinePoint) -> JacobianPoint {
        JacobianPoint::add_mixed(&self, &other.negate())
    }
}

#[cfg(test)]
mod tests {
    use super::JacobianPoint;
    use crate::affine::AffinePoint;
    use crate::scalar_mul;

    #[test]
    fn identity_is_additive_identity() {
        let g = JacobianPoint::GENERATOR;
        assert_eq!(g + JacobianPoint::IDENTITY, g);
        assert_eq!(JacobianPoint::IDENTITY + g, g);
    }

    #[test]
    fn double_equals_self_add_self() {
        let g = JacobianPoint::GENERATOR;
        assert_eq!(g.double(), g + g);
    }

    #[test]
    fn add_negate_is_identity() {
        let g = JacobianPoint::GENERATOR;
        assert!(bool::from((g + g.negate()).is_identity()));
    }

    #[test]
    fn mixed_addition_matches_projective_addition() {
        let g = JacobianPoint::GENERATOR;
        let g_affine = AffinePoint::GENERATOR;
        assert_eq!(g + g_affine, g + g);
    }

    #[test]
    fn generator_round_trips_through_affine() {
        let g = JacobianPoint::GENERATOR;
        assert_eq!(g.to_affine(), AffinePoint::GENERATOR);
    }

    #[test]
    fn identity_to_affine_is_sentinel() {
        assert!(bool::from(
            JacobianPoint::IDENTITY.to_affine().is_identity()
        ));
    }

    #[test]
    fn scalar_mul_matches_repeated_addition() {
        let g = JacobianPoint::GENERATOR;
        let mut acc = JacobianPoint::IDENTITY;
        for _ in 0..5 {
            acc += g;
        }
        let five = crate::scalar::Scalar::from_bytes(&{
            let mut b = [0u8; 32];
            b[31] = 5;
            b
        })
        .unwrap();
        assert_eq!(scalar_mul::mul(&g, &five), acc);
    }
}
