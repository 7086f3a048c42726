//! ECDSA signature generation.

use super::{RecoveryId, Signature};
use crate::affine::AffinePoint;
use crate::error::{Error, ErrorKind, Result};
use crate::rfc6979;
use crate::scalar::Scalar;
use crate::scalar_mul;

/// Safety cap on the RFC 6979 nonce-retry loop. Drawing a second candidate
/// at all requires a contrived `(h, d)` pair; 1000 bounds the loop without
/// ever being reachable in practice.
const MAX_NONCE_ATTEMPTS: usize = 1000;

/// Signs a 32-byte message hash with private key `d`, returning a low-`s`
/// ("canonical", per [BIP 62]) signature paired with the recovery id needed
/// to reconstruct the public key from the signature alone.
///
/// `d` must be a nonzero scalar in `[1, n)`; use
/// [`crate::utils::is_valid_private_key`] to check candidates ahead of time.
///
/// [BIP 62]: https://github.com/bitcoin/bips/blob/master/bip-0062.mediawiki
pub fn sign(h: &[u8; 32], d: &Scalar) -> Result<(Signature, RecoveryId)> {
    if bool::from(d.is_zero()) {
        return Err(Error::new(ErrorKind::InvalidScalar));
    }

    let z = Scalar::from_bytes_reduced(h);
    let mut additional_data: [u8; 1] = [0];

    for attempt in 0..MAX_NONCE_ATTEMPTS {
        additional_data[0] = attempt as u8;
        let extra: &[u8] = if attempt == 0 { &[] } else { &additional_data };
        let k = rfc6979::generate_k(d, h, extra);

        let Some(k_inv) = Option::<Scalar>::from(k.invert()) else {
            continue;
        };

        let r_point = AffinePoint::from(scalar_mul::mul_base(&k));
        if bool::from(r_point.is_identity()) {
            continue;
        }

        let x_reduced = Option::<Scalar>::from(Scalar::from_bytes(&r_point.x())).is_none();
        let r = Scalar::from_bytes_reduced(&r_point.x());
        if bool::from(r.is_zero()) {
            continue;
        }

        let s = k_inv * (z + r * *d);
        if bool::from(s.is_zero()) {
            continue;
        }

        let mut signature = Signature::from_scalars(r, s);
        let s_was_flipped = signature.normalize_s();
        let recovery_id = RecoveryId::from_parts(
            bool::from(r_point.y_is_odd()) ^ s_was_flipped,
            x_reduced,
        );

        return Ok((signature, recovery_id));
    }

    Err(Error::new(ErrorKind::RandomSourceFailure))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_private_key() {
        assert!(sign(&[1u8; 32], &Scalar::ZERO).is_err());
    }

    #[test]
    fn sign_is_deterministic() {
        let d = Scalar::from_bytes(&[7u8; 32]).unwrap();
        let h = [9u8; 32];
        let (sig1, id1) = sign(&h, &d).unwrap();
        let (sig2, id2) = sign(&h, &d).unwrap();
        assert_eq!(sig1, sig2);
        assert_eq!(id1, id2);
    }

    #[test]
    fn signature_s_is_always_low() {
        let d = Scalar::from_bytes(&[42u8; 32]).unwrap();
        let h = [100u8; 32];
        let (sig, _) = sign(&h, &d).unwrap();
        assert!(!bool::from(sig.s().is_high()));
    }

    #[test]
    fn recovery_id_x_reduced_bit_matches_r_point_x_range() {
        // For ordinary inputs R.x < n, so the x-reduced bit stays unset;
        // this pins that the common case isn't spuriously marked.
        let d = Scalar::from_bytes(&[13u8; 32]).unwrap();
        let h = [200u8; 32];
        let (_, id) = sign(&h, &d).unwrap();
        assert!(!id.is_x_reduced());
    }
}
