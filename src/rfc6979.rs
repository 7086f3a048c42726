//! Deterministic ECDSA nonce generation per RFC 6979 (Section 3.2), using
//! HMAC-SHA-256 as the underlying DRBG.
//!
//! Both the private key and the message hash are 32 bytes on this curve, so
//! the general `int2octets` conversion of the RFC collapses to a plain
//! fixed-size byte array; `bits2octets`, which additionally reduces its
//! input mod `n`, is implemented as [`Scalar::from_bytes_reduced`] followed
//! by [`Scalar::to_bytes`]. This module only implements that
//! specialization, not the general-length variant.

use crate::scalar::Scalar;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generates the deterministic ECDSA nonce `k` for private key `d` and
/// message hash `h`, per RFC 6979 Section 3.2, retrying internally until a
/// candidate lands in `[1, n)`.
///
/// `additional_data` is folded into the initial HMAC state alongside `d` and
/// `bits2octets(h)`; passing an empty slice reproduces the plain RFC 6979
/// nonce.
pub(crate) fn generate_k(d: &Scalar, h: &[u8; 32], additional_data: &[u8]) -> Scalar {
    let bits2octets_h = Scalar::from_bytes_reduced(h).to_bytes();
    let mut drbg = HmacDrbg::new(&d.to_bytes(), &bits2octets_h, additional_data);
    loop {
        let candidate = drbg.next();
        if let Some(k) = Option::<Scalar>::from(Scalar::from_bytes(&candidate)) {
            if !bool::from(k.is_zero()) {
                return k;
            }
        }
    }
}

/// HMAC-DRBG as described in NIST SP 800-90A, specialized to a 32-byte
/// chaining value (`Hmac<Sha256>`'s output size).
struct HmacDrbg {
    k: HmacSha256,
    v: [u8; 32],
}

impl HmacDrbg {
    fn new(entropy_input: &[u8], nonce: &[u8], additional_data: &[u8]) -> Self {
        let mut v = [0x01u8; 32];
        let mut k = HmacSha256::new_from_slice(&[0x00u8; 32]).expect("HMAC accepts any key length");

        for round in 0..=1u8 {
            k.update(&v);
            k.update(&[round]);
            k.update(entropy_input);
            k.update(nonce);
            k.update(additional_data);
            k = HmacSha256::new_from_slice(&k.finalize_reset().into_bytes())
                .expect("HMAC accepts any key length");

            k.update(&v);
            v.copy_from_slice(&k.finalize_reset().into_bytes());
        }

        Self { k, v }
    }

    /// Produces the next 32-byte `HMAC_DRBG` output, per steps 3.2.e/g/h.
    fn next(&mut self) -> [u8; 32] {
        self.k.update(&self.v);
        self.v.copy_from_slice(&self.k.finalize_reset().into_bytes());

        self.k.update(&self.v);
        self.k.update(&[0x00]);
        self.k = HmacSha256::new_from_slice(&self.k.finalize_reset().into_bytes())
            .expect("HMAC accepts any key length");
        self.k.update(&self.v);
        self.v.copy_from_slice(&self.k.finalize_reset().into_bytes());

        self.v
    }
}

#[cfg(test)]
mod tests {
    use super::generate_k;
    use crate::scalar::Scalar;

    fn private_key() -> Scalar {
        Scalar::from_bytes(&hex_literal::hex!(
            "fbc438aae65999388e895388de212b4c93142704770b1bcd9906b0b34b3295bb"
        ))
        .unwrap()
    }

    fn message_hash() -> [u8; 32] {
        hex_literal::hex!("e8972d80f3de8b7d6eef0b616bc40273c879add100f4f723b7d453a6671fa036")
    }

    /// Deterministic: the same (private key, hash) always yields the same k.
    #[test]
    fn deterministic() {
        let d = private_key();
        let h = message_hash();
        let k1 = generate_k(&d, &h, &[]);
        let k2 = generate_k(&d, &h, &[]);
        assert_eq!(k1, k2);
    }

    /// Different additional data perturbs the nonce.
    #[test]
    fn additional_data_changes_nonce() {
        let d = private_key();
        let h = message_hash();
        let k1 = generate_k(&d, &h, &[]);
        let k2 = generate_k(&d, &h, b"extra");
        assert_ne!(k1, k2);
    }

    /// Different messages yield different nonces for the same key.
    #[test]
    fn different_hash_changes_nonce() {
        let d = private_key();
        let k1 = generate_k(&d, &message_hash(), &[]);
        let k2 = generate_k(&d, &[0u8; 32], &[]);
        assert_ne!(k1, k2);
    }

    /// The nonce is never zero.
    #[test]
    fn nonce_is_never_zero() {
        let k = generate_k(&Scalar::ONE, &[0u8; 32], &[]);
        assert!(!bool::from(k.is_zero()));
    }

    /// `n` and `0` are distinct raw byte strings, but `n mod n == 0`, so
    /// `bits2octets` must make them produce the same nonce.
    #[test]
    fn hash_at_the_order_reduces_like_zero() {
        let d = private_key();
        let k_from_order = generate_k(&d, &crate::utils::CURVE_ORDER, &[]);
        let k_from_zero = generate_k(&d, &[0u8; 32], &[]);
        assert_eq!(k_from_order, k_from_zero);
    }
}
