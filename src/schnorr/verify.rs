//! BIP-340 Schnorr signature verification.

use super::{tagged_hash, Signature, CHALLENGE_TAG};
use crate::affine::AffinePoint;
use crate::field::FieldElement;
use crate::projective::JacobianPoint;
use crate::scalar::Scalar;
use crate::scalar_mul;

/// Verifies that `sig` is a valid BIP-340 Schnorr signature over `msg` for
/// the x-only public key `px`.
///
/// Never returns an error: malformed or off-curve input is simply rejected.
pub fn verify(msg: &[u8], sig: &Signature, px: &FieldElement) -> bool {
    // Reconstruct the even-y public point from its x-only encoding, by
    // reusing the compressed-point decoder with an explicit "even" prefix.
    let mut encoded = [0u8; 33];
    encoded[0] = 0x02;
    encoded[1..].copy_from_slice(&px.to_bytes());
    let Some(p) = AffinePoint::from_encoded_point(&encoded) else {
        return false;
    };

    let challenge_hash = tagged_hash(CHALLENGE_TAG)
        .chain_update(sig.r.to_bytes())
        .chain_update(px.to_bytes())
        .chain_update(msg)
        .finalize();
    let e = Scalar::from_bytes_reduced(&challenge_hash.into());

    let r_prime = scalar_mul::mul_base(&sig.s) - scalar_mul::mul(&JacobianPoint::from(p), &e);
    if bool::from(r_prime.is_identity()) {
        return false;
    }

    let r_prime = AffinePoint::from(r_prime);
    if bool::from(r_prime.y_is_odd()) {
        return false;
    }

    r_prime.x_field() == sig.r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schnorr::sign::sign;

    #[test]
    fn rejects_tampered_message() {
        let d = Scalar::from_bytes(&[17u8; 32]).unwrap();
        let p = AffinePoint::from(scalar_mul::mul_base(&d));
        let sig = sign(b"message one", &d, &[0u8; 32]).unwrap();
        assert!(!verify(b"message two", &sig, &p.x_field()));
    }

    #[test]
    fn rejects_tampered_s() {
        let d = Scalar::from_bytes(&[17u8; 32]).unwrap();
        let p = AffinePoint::from(scalar_mul::mul_base(&d));
        let mut sig = sign(b"message", &d, &[0u8; 32]).unwrap();
        sig.s = sig.s + Scalar::ONE;
        assert!(!verify(b"message", &sig, &p.x_field()));
    }
}
