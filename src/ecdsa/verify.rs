//! ECDSA signature verification.

use super::Signature;
use crate::affine::AffinePoint;
use crate::projective::JacobianPoint;
use crate::scalar::Scalar;
use crate::scalar_mul;

/// Verifies that `sig` is a valid ECDSA signature over message hash `h` by
/// public key `q`.
///
/// Never returns an error: any malformed input (out-of-range `r`/`s`, `q`
/// off-curve or the identity) is simply rejected, per ECDSA's usual
/// verification contract.
pub fn verify(sig: &Signature, h: &[u8; 32], q: &AffinePoint) -> bool {
    if bool::from(sig.r.is_zero()) || bool::from(sig.s.is_zero()) {
        return false;
    }
    if bool::from(q.is_identity()) {
        return false;
    }

    let Some(w) = Option::<Scalar>::from(sig.s.invert()) else {
        return false;
    };

    let z = Scalar::from_bytes_reduced(h);
    let u1 = z * w;
    let u2 = sig.r * w;

    let r_point = scalar_mul::mul_base(&u1) + scalar_mul::mul(&JacobianPoint::from(*q), &u2);
    if bool::from(r_point.is_identity()) {
        return false;
    }

    let r_affine = AffinePoint::from(r_point);
    let candidate_r = Scalar::from_bytes_reduced(&r_affine.x());
    candidate_r == sig.r
}
