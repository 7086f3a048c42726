//! BIP-340 Schnorr signatures over secp256k1, using x-only public keys.

mod sign;
mod verify;

pub use sign::sign;
pub use verify::verify;

use crate::field::FieldElement;
use crate::scalar::Scalar;
use sha2::{Digest, Sha256};

const AUX_TAG: &[u8] = b"BIP0340/aux";
const NONCE_TAG: &[u8] = b"BIP0340/nonce";
const CHALLENGE_TAG: &[u8] = b"BIP0340/challenge";

/// A 64-byte BIP-340 Schnorr signature: `r` (32 bytes) `‖` `s` (32 bytes).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature {
    r: FieldElement,
    s: Scalar,
}

impl Signature {
    /// Serializes this signature as `r ‖ s`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.to_bytes());
        out[32..].copy_from_slice(&self.s.to_bytes());
        out
    }

    /// Parses a signature from its 64-byte `r ‖ s` encoding.
    ///
    /// Returns `None` if either half does not represent a value in range,
    /// or if `r >= p`. (Unlike ECDSA's `r`, a Schnorr `r` is a bare field
    /// element, not reduced mod `n`.)
    pub fn from_bytes(bytes: &[u8; 64]) -> Option<Self> {
        let r_bytes: [u8; 32] = bytes[..32].try_into().ok()?;
        let s_bytes: [u8; 32] = bytes[32..].try_into().ok()?;
        let r = Option::<FieldElement>::from(FieldElement::from_bytes(&r_bytes))?;
        let s = Option::<Scalar>::from(Scalar::from_bytes(&s_bytes))?;
        Some(Self { r, s })
    }
}

/// `tagged_hash(tag, msg) = SHA256(SHA256(tag) ‖ SHA256(tag) ‖ msg)`, per
/// BIP-340's domain separation scheme.
fn tagged_hash(tag: &[u8]) -> Sha256 {
    let tag_hash = Sha256::digest(tag);
    let mut digest = Sha256::new();
    digest.update(tag_hash);
    digest.update(tag_hash);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips_through_bytes() {
        let r = FieldElement::ONE;
        let s = Scalar::from_bytes(&[5u8; 32]).unwrap();
        let sig = Signature { r, s };
        let bytes = sig.to_bytes();
        assert_eq!(Signature::from_bytes(&bytes), Some(sig));
    }

    #[test]
    fn tagged_hash_is_deterministic() {
        let a = tagged_hash(b"BIP0340/challenge").finalize();
        let b = tagged_hash(b"BIP0340/challenge").finalize();
        assert_eq!(a, b);
    }
}
