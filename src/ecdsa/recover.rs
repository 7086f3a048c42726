//! Public-key recovery from an ECDSA signature.

use super::{RecoveryId, Signature};
use crate::affine::AffinePoint;
use crate::field::FieldElement;
use crate::projective::JacobianPoint;
use crate::scalar::Scalar;
use crate::scalar_mul;
use subtle::{Choice, ConditionallySelectable};

/// The order of the secp256k1 group, as a 32-byte big-endian array.
const ORDER_BYTES: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Recovers the public key used to produce `sig` over message hash `h`,
/// given the signature's paired [`RecoveryId`].
///
/// Returns `None` if the recovery id's x-reduction bit is set and `r + n`
/// does not fit in the base field, if `R` does not reconstruct to a point on
/// the curve, or if the recovered public key is the identity.
pub fn recover_public_key(h: &[u8; 32], sig: &Signature, rec_id: RecoveryId) -> Option<AffinePoint> {
    let mut x_bytes = sig.r.to_bytes();
    if rec_id.is_x_reduced() {
        x_bytes = add_order(&x_bytes)?;
    }
    let x = Option::<FieldElement>::from(FieldElement::from_bytes(&x_bytes))?;

    let r_point = Option::<AffinePoint>::from(decompress(x, Choice::from(rec_id.is_y_odd() as u8)))?;

    let r_inv = Option::<Scalar>::from(sig.r.invert())?;
    let z = Scalar::from_bytes_reduced(h);

    let u1 = (r_inv * z).negate();
    let u2 = r_inv * sig.s;

    let q = scalar_mul::mul_base(&u1) + scalar_mul::mul(&JacobianPoint::from(r_point), &u2);
    if bool::from(q.is_identity()) {
        return None;
    }

    Some(AffinePoint::from(q))
}

/// Adds the group order to a 32-byte big-endian value, returning `None` if
/// the result would not fit back in 32 bytes (i.e. it overflows the base
/// field's range check downstream).
fn add_order(x: &[u8; 32]) -> Option<[u8; 32]> {
    let mut out = [0u8; 32];
    let mut carry = 0u16;
    for i in (0..32).rev() {
        let sum = x[i] as u16 + ORDER_BYTES[i] as u16 + carry;
        out[i] = sum as u8;
        carry = sum >> 8;
    }
    if carry != 0 {
        None
    } else {
        Some(out)
    }
}

/// Reconstructs a point on the curve from its x-coordinate and the desired
/// y-parity. Mirrors [`AffinePoint`]'s internal decompression, duplicated
/// here since that routine is private to the `affine` module.
fn decompress(x: FieldElement, y_is_odd: Choice) -> subtle::CtOption<AffinePoint> {
    let b = FieldElement::CURVE_EQUATION_B;
    let alpha = (x.square() * x) + b;
    alpha.sqrt().map(|beta| {
        let beta = beta.normalize();
        use subtle::ConstantTimeEq;
        let y = FieldElement::conditional_select(
            &beta.negate(1).normalize(),
            &beta,
            beta.is_odd().ct_eq(&y_is_odd),
        );
        AffinePoint::new(x, y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecdsa::sign::sign;
    use crate::scalar_mul::mul_base;

    #[test]
    fn recovers_own_public_key() {
        let d = Scalar::from_bytes(&[21u8; 32]).unwrap();
        let q = AffinePoint::from(mul_base(&d));
        let h = [55u8; 32];
        let (sig, rec_id) = sign(&h, &d).unwrap();
        let recovered = recover_public_key(&h, &sig, rec_id).unwrap();
        assert_eq!(recovered, q);
    }

    #[test]
    fn wrong_recovery_id_yields_different_key() {
        let d = Scalar::from_bytes(&[21u8; 32]).unwrap();
        let q = AffinePoint::from(mul_base(&d));
        let h = [55u8; 32];
        let (sig, rec_id) = sign(&h, &d).unwrap();
        let flipped = RecoveryId::new(u8::from(rec_id) ^ 1).unwrap();
        let recovered = recover_public_key(&h, &sig, flipped);
        assert_ne!(recovered, Some(q));
    }
}
