//! BIP-340 Schnorr signature generation.

use super::{tagged_hash, Signature, AUX_TAG, CHALLENGE_TAG, NONCE_TAG};
use crate::affine::AffinePoint;
use crate::error::{Error, ErrorKind, Result};
use crate::scalar::Scalar;
use crate::scalar_mul;
use sha2::Digest;
use subtle::ConditionallySelectable;

/// Signs `msg` with private key `d`, per BIP-340.
///
/// `aux_rand` folds auxiliary randomness into nonce generation so that
/// signing remains secure even with a low-quality RNG; pass `[0u8; 32]` to
/// reproduce the reference test vectors, which specify an all-zero aux.
pub fn sign(msg: &[u8], d: &Scalar, aux_rand: &[u8; 32]) -> Result<Signature> {
    if bool::from(d.is_zero()) {
        return Err(Error::new(ErrorKind::InvalidScalar));
    }

    // Negate the private key so the public point always has an even y, per
    // BIP-340's x-only key convention.
    let p = AffinePoint::from(scalar_mul::mul_base(d));
    let d = Scalar::conditional_select(d, &d.negate(), p.y_is_odd());
    let px = p.x();

    let mut t = tagged_hash(AUX_TAG).chain_update(aux_rand).finalize();
    for (byte, key_byte) in t.iter_mut().zip(d.to_bytes().iter()) {
        *byte ^= key_byte;
    }

    let nonce_hash = tagged_hash(NONCE_TAG)
        .chain_update(t)
        .chain_update(px)
        .chain_update(msg)
        .finalize();
    let k0 = Scalar::from_bytes_reduced(&nonce_hash.into());
    if bool::from(k0.is_zero()) {
        return Err(Error::new(ErrorKind::RandomSourceFailure));
    }

    let r_point = AffinePoint::from(scalar_mul::mul_base(&k0));
    let k = Scalar::conditional_select(&k0, &k0.negate(), r_point.y_is_odd());

    let challenge_hash = tagged_hash(CHALLENGE_TAG)
        .chain_update(r_point.x())
        .chain_update(px)
        .chain_update(msg)
        .finalize();
    let e = Scalar::from_bytes_reduced(&challenge_hash.into());

    let r = r_point.x_field();
    let s = k + e * d;

    Ok(Signature { r, s })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schnorr::verify;

    #[test]
    fn rejects_zero_private_key() {
        assert!(sign(b"msg", &Scalar::ZERO, &[0u8; 32]).is_err());
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let d = Scalar::from_bytes(&[11u8; 32]).unwrap();
        let p = AffinePoint::from(scalar_mul::mul_base(&d));
        let sig = sign(b"hello schnorr", &d, &[0u8; 32]).unwrap();
        assert!(verify(b"hello schnorr", &sig, &p.x_field()));
    }

    #[test]
    fn different_aux_rand_changes_signature() {
        let d = Scalar::from_bytes(&[11u8; 32]).unwrap();
        let sig1 = sign(b"hello schnorr", &d, &[0u8; 32]).unwrap();
        let sig2 = sign(b"hello schnorr", &d, &[1u8; 32]).unwrap();
        assert_ne!(sig1, sig2);
    }

    #[test]
    fn public_key_is_always_even_y() {
        // Exercise both branches of the negation: a key whose raw public
        // point has odd y, and one whose raw public point has even y.
        for seed in [3u8, 4u8] {
            let d = Scalar::from_bytes(&[seed; 32]).unwrap();
            let p = AffinePoint::from(scalar_mul::mul_base(&d));
            let sig = sign(b"m", &d, &[0u8; 32]).unwrap();
            // Whatever the raw key's parity, signing must still verify
            // against the even-y public key used internally.
            let px = if bool::from(p.y_is_odd()) {
                AffinePoint::from(scalar_mul::mul_base(&d.negate())).x_field()
            } else {
                p.x_field()
            };
            assert!(verify(b"m", &sig, &px));
        }
    }
}
