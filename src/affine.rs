//! The public `(x, y)` point representation, and its SEC1 byte encodings.

use crate::field::FieldElement;
use crate::projective::JacobianPoint;
use core::ops::Neg;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// `b = 7`, the constant term of `y^2 = x^3 + 7`.
const CURVE_EQUATION_B: FieldElement = FieldElement::CURVE_EQUATION_B;

/// A point on secp256k1 in affine `(x, y)` coordinates.
///
/// The point at infinity is represented by a dedicated sentinel
/// ([`AffinePoint::IDENTITY`]) rather than by any `(x, y)` pair, and is
/// never produced by decoding a wire encoding.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    infinity: u8,
}

impl AffinePoint {
    /// The point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: 1,
    };

    /// The curve's base point.
    ///
    /// ```text
    /// Gx = 79be667e f9dcbbac 55a06295 ce870b07 029bfcdb 2dce28d9 59f2815b 16f81798
    /// Gy = 483ada77 26a3c465 5da4fbfc 0e1108a8 fd17b448 a6855419 9c47d08f fb10d4b8
    /// ```
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_bytes_unchecked(&[
            0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87,
            0x0b, 0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b,
            0x16, 0xf8, 0x17, 0x98,
        ]),
        y: FieldElement::from_bytes_unchecked(&[
            0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11,
            0x08, 0xa8, 0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f,
            0xfb, 0x10, 0xd4, 0xb8,
        ]),
        infinity: 0,
    };

    pub(crate) const fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y, infinity: 0 }
    }

    /// Returns `true` (as a `Choice`) if this is the point at infinity.
    pub fn is_identity(&self) -> Choice {
        Choice::from(self.infinity)
    }

    /// Returns the x-coordinate, as a 32-byte big-endian SEC1 field element.
    pub fn x(&self) -> [u8; 32] {
        self.x.to_bytes()
    }

    /// Returns the x-coordinate as a [`FieldElement`], for callers (such as
    /// Schnorr's x-only public keys) that work with field elements directly
    /// rather than their byte encoding.
    pub(crate) fn x_field(&self) -> FieldElement {
        self.x
    }

    /// Returns `true` (as a `Choice`) if the y-coordinate is odd.
    pub fn y_is_odd(&self) -> Choice {
        self.y.normalize().is_odd()
    }

    /// Checks `y^2 == x^3 + 7`.
    fn satisfies_curve_equation(x: &FieldElement, y: &FieldElement) -> Choice {
        let lhs = y.square();
        let rhs = (x.square() * x) + CURVE_EQUATION_B;
        (lhs.negate(1) + rhs).normalizes_to_zero()
    }

    /// Reconstructs `y` from `x` and the desired parity, via
    /// `y = sqrt(x^3 + 7)`, negating the root if its parity doesn't match.
    ///
    /// Returns `None` if `x` does not correspond to a point on the curve.
    fn decompress(x: FieldElement, y_is_odd: Choice) -> CtOption<Self> {
        let alpha = (x.square() * x) + CURVE_EQUATION_B;
        alpha.sqrt().map(|beta| {
            let beta = beta.normalize();
            let y = FieldElement::conditional_select(
                &beta.negate(1).normalize(),
                &beta,
                beta.is_odd().ct_eq(&y_is_odd),
            );
            Self::new(x, y)
        })
    }

    /// Decodes a SEC1 uncompressed (65-byte, `0x04 || x || y`) or compressed
    /// (33-byte, `0x02`/`0x03 || x`) point.
    ///
    /// Rejects: wrong length, unrecognized prefix byte, `x` (or, for the
    /// uncompressed form, `y`) not in `[0, p)`, and a point not on the
    /// curve. Never produces [`AffinePoint::IDENTITY`] — there is no valid
    /// wire encoding of the point at infinity in this scheme.
    pub fn from_encoded_point(bytes: &[u8]) -> Option<Self> {
        match bytes.first()? {
            0x02 | 0x03 if bytes.len() == 33 => {
                let x_bytes: [u8; 32] = bytes[1..33].try_into().ok()?;
                let x = FieldElement::from_bytes(&x_bytes);
                let y_is_odd = Choice::from(bytes[0] & 0x01);
                Option::from(x.and_then(|x| Self::decompress(x, y_is_odd)))
            }
            0x04 if bytes.len() == 65 => {
                let x_bytes: [u8; 32] = bytes[1..33].try_into().ok()?;
                let y_bytes: [u8; 32] = bytes[33..65].try_into().ok()?;
                let x = FieldElement::from_bytes(&x_bytes);
                let y = FieldElement::from_bytes(&y_bytes);
                Option::from(x.and_then(|x| {
                    y.and_then(|y| {
                        let on_curve = Self::satisfies_curve_equation(&x, &y);
                        CtOption::new(Self::new(x, y), on_curve)
                    })
                }))
            }
            _ => None,
        }
    }

    /// Encodes this point as a 33-byte SEC1 compressed point
    /// (`0x02`/`0x03 || x`).
    ///
    /// The point at infinity has no valid SEC1 encoding; callers must not
    /// call this on [`AffinePoint::IDENTITY`].
    pub fn to_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = if bool::from(self.y_is_odd()) { 0x03 } else { 0x02 };
        out[1..].copy_from_slice(&self.x.to_bytes());
        out
    }

    /// Encodes this point as a 65-byte SEC1 uncompressed point
    /// (`0x04 || x || y`).
    ///
    /// The point at infinity has no valid SEC1 encoding; callers must not
    /// call this on [`AffinePoint::IDENTITY`].
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out[33..].copy_from_slice(&self.y.to_bytes());
        out
    }
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: u8::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        (self.x.negate(1) + other.x).normalizes_to_zero()
            & (self.y.negate(1) + other.y).normalizes_to_zero()
            & self.infinity.ct_eq(&other.infinity)
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffinePoint {}

impl Default for AffinePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Neg for AffinePoint {
    type Output = AffinePoint;

    fn neg(self) -> AffinePoint {
        AffinePoint {
            x: self.x,
            y: self.y.negate(1).normalize_weak(),
            infinity: self.infinity,
        }
    }
}

impl From<JacobianPoint> for AffinePoint {
    fn from(p: JacobianPoint) -> Self {
        p.to_affine()
    }
}

impl From<&JacobianPoint> for AffinePoint {
    fn from(p: &JacobianPoint) -> Self {
        p.to_affine()
    }
}

#[cfg(test)]
mod tests {
    use super::AffinePoint;

    const UNCOMPRESSED_GENERATOR: [u8; 65] = {
        let mut out = [0u8; 65];
        out[0] = 0x04;
        let x = [
            0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87,
            0x0b, 0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b,
            0x16, 0xf8, 0x17, 0x98,
        ];
        let y = [
            0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11,
            0x08, 0xa8, 0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f,
            0xfb, 0x10, 0xd4, 0xb8,
        ];
        let mut i = 0;
        while i < 32 {
            out[1 + i] = x[i];
            out[33 + i] = y[i];
            i += 1;
        }
        out
    };

    #[test]
    fn generator_compressed_is_02_then_gx() {
        let encoded = AffinePoint::GENERATOR.to_compressed();
        assert_eq!(encoded[0], 0x02);
        assert_eq!(&encoded[1..], &UNCOMPRESSED_GENERATOR[1..33]);
    }

    #[test]
    fn uncompressed_round_trips() {
        let p = AffinePoint::from_encoded_point(&UNCOMPRESSED_GENERATOR).unwrap();
        assert_eq!(p, AffinePoint::GENERATOR);
        assert_eq!(p.to_uncompressed(), UNCOMPRESSED_GENERATOR);
    }

    #[test]
    fn compressed_round_trips_through_uncompressed() {
        let compressed = AffinePoint::GENERATOR.to_compressed();
        let p = AffinePoint::from_encoded_point(&compressed).unwrap();
        assert_eq!(p.to_uncompressed(), UNCOMPRESSED_GENERATOR);
    }

    #[test]
    fn rejects_bad_prefix() {
        let mut bad = UNCOMPRESSED_GENERATOR;
        bad[0] = 0x05;
        assert!(AffinePoint::from_encoded_point(&bad).is_none());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(AffinePoint::from_encoded_point(&UNCOMPRESSED_GENERATOR[..64]).is_none());
    }

    #[test]
    fn rejects_point_not_on_curve() {
        let mut bad = UNCOMPRESSED_GENERATOR;
        bad[64] ^= 0x01;
        assert!(AffinePoint::from_encoded_point(&bad).is_none());
    }

    #[test]
    fn rejects_x_out_of_range() {
        let mut bad = UNCOMPRESSED_GENERATOR;
        bad[1..33].copy_from_slice(&[0xff; 32]);
        assert!(AffinePoint::from_encoded_point(&bad).is_none());
    }

    #[test]
    fn negation_round_trips() {
        let g = AffinePoint::GENERATOR;
        assert_eq!(-(-g), g);
    }
}
