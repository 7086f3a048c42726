//! Elliptic Curve Diffie-Hellman key agreement.

use crate::affine::AffinePoint;
use crate::error::{Error, ErrorKind, Result};
use crate::projective::JacobianPoint;
use crate::scalar::Scalar;
use crate::scalar_mul;

/// The shared point `d · Q` computed by [`get_shared_secret`].
///
/// Serializes to the same SEC1 compressed encoding as a public key by
/// default; [`SharedSecret::x_only`] exposes just the x-coordinate for
/// callers who feed it into a KDF (e.g. `SHA256(x)`) rather than treating it
/// as a point.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SharedSecret(AffinePoint);

impl SharedSecret {
    /// The full SEC1 compressed encoding of the shared point (33 bytes).
    pub fn to_bytes(&self) -> [u8; 33] {
        self.0.to_compressed()
    }

    /// Just the x-coordinate of the shared point (32 bytes).
    pub fn x_only(&self) -> [u8; 32] {
        self.0.x()
    }
}

/// Computes the ECDH shared secret `d · q` for private scalar `d` and
/// counterparty public point `q`, using the same constant-time scalar
/// multiplication as ECDSA/Schnorr signing (`d` is secret, so this must not
/// branch on or index by its bits).
///
/// Rejects a zero private key, an identity or off-curve public point, and
/// the (cryptographically negligible, but theoretically reachable for a
/// maliciously chosen `q`) case where the product is the identity.
pub fn get_shared_secret(d: &Scalar, q: &AffinePoint) -> Result<SharedSecret> {
    if bool::from(d.is_zero()) {
        return Err(Error::new(ErrorKind::InvalidScalar));
    }
    if bool::from(q.is_identity()) {
        return Err(Error::new(ErrorKind::InvalidPoint));
    }

    let shared = scalar_mul::mul(&JacobianPoint::from(*q), d);
    if bool::from(shared.is_identity()) {
        return Err(Error::new(ErrorKind::InvalidPoint));
    }

    Ok(SharedSecret(AffinePoint::from(shared)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar_mul::mul_base;

    #[test]
    fn agrees_both_directions() {
        let d1 = Scalar::from_bytes(&[1u8; 32]).unwrap();
        let d2 = Scalar::from_bytes(&[2u8; 32]).unwrap();
        let q1 = AffinePoint::from(mul_base(&d1));
        let q2 = AffinePoint::from(mul_base(&d2));

        let s1 = get_shared_secret(&d1, &q2).unwrap();
        let s2 = get_shared_secret(&d2, &q1).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn rejects_zero_private_key() {
        let d2 = Scalar::from_bytes(&[2u8; 32]).unwrap();
        let q2 = AffinePoint::from(mul_base(&d2));
        assert!(get_shared_secret(&Scalar::ZERO, &q2).is_err());
    }

    #[test]
    fn rejects_identity_public_point() {
        let d1 = Scalar::from_bytes(&[1u8; 32]).unwrap();
        assert!(get_shared_secret(&d1, &AffinePoint::IDENTITY).is_err());
    }

    #[test]
    fn x_only_matches_full_encoding_prefix() {
        let d1 = Scalar::from_bytes(&[1u8; 32]).unwrap();
        let d2 = Scalar::from_bytes(&[2u8; 32]).unwrap();
        let q2 = AffinePoint::from(mul_base(&d2));
        let shared = get_shared_secret(&d1, &q2).unwrap();
        assert_eq!(&shared.to_bytes()[1..], &shared.x_only()[..]);
    }
}
