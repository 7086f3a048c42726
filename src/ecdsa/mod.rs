//! ECDSA signing, verification, and public-key recovery.

mod der;
mod recover;
mod sign;
mod verify;

pub use recover::recover_public_key;
pub use sign::sign;
pub use verify::verify;

use crate::error::{Error, ErrorKind, Result};
use crate::scalar::Scalar;
use subtle::ConditionallySelectable;

/// A fixed-size ECDSA signature: a pair of scalars `(r, s)`.
///
/// Serializes to and from ASN.1 DER (see [`Signature::to_der`] /
/// [`Signature::from_der`]), the wire format used by [`sign`]/[`verify`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature {
    pub(crate) r: Scalar,
    pub(crate) s: Scalar,
}

impl Signature {
    pub(crate) fn from_scalars(r: Scalar, s: Scalar) -> Self {
        Self { r, s }
    }

    /// The `r` component.
    pub fn r(&self) -> Scalar {
        self.r
    }

    /// The `s` component.
    pub fn s(&self) -> Scalar {
        self.s
    }

    /// Normalizes `s` into the lower half of `[1, n)`, per [BIP 62]'s
    /// malleability fix, negating it (`s -> n - s`) when it is not already
    /// there. Returns whether a flip occurred, so the caller can keep a
    /// paired recovery id in sync.
    ///
    /// [BIP 62]: https://github.com/bitcoin/bips/blob/master/bip-0062.mediawiki
    fn normalize_s(&mut self) -> bool {
        let is_high = self.s.is_high();
        self.s = Scalar::conditional_select(&self.s, &self.s.negate(), is_high);
        bool::from(is_high)
    }
}

/// The recovery identifier paired with a [`Signature`] by [`sign`], used by
/// [`recover_public_key`] to reconstruct the signer's public key.
///
/// Unlike Ethereum-style recoverable signatures, which only ever emit `0` or
/// `1`, the full `0..=3` range is supported: bit 0 is `R.y`'s parity, bit 1
/// indicates that `R.x` overflowed the scalar field's modulus and had to be
/// recovered as `r + n`. The second case is vanishingly rare in practice but
/// is not rejected here.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Builds a recovery id from its raw value, rejecting anything outside
    /// `0..=3`.
    pub fn new(byte: u8) -> Result<Self> {
        if byte <= 3 {
            Ok(Self(byte))
        } else {
            Err(Error::new(ErrorKind::InvalidEncoding))
        }
    }

    /// Returns `true` if the recovered `R.y` is odd.
    fn is_y_odd(self) -> bool {
        self.0 & 1 != 0
    }

    /// Returns `true` if `R.x` overflowed the scalar modulus.
    fn is_x_reduced(self) -> bool {
        self.0 & 2 != 0
    }

    fn from_parts(y_odd: bool, x_reduced: bool) -> Self {
        Self((y_odd as u8) | ((x_reduced as u8) << 1))
    }
}

impl From<RecoveryId> for u8 {
    fn from(id: RecoveryId) -> u8 {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_id_round_trips_parts() {
        for y_odd in [false, true] {
            for x_reduced in [false, true] {
                let id = RecoveryId::from_parts(y_odd, x_reduced);
                assert_eq!(id.is_y_odd(), y_odd);
                assert_eq!(id.is_x_reduced(), x_reduced);
            }
        }
    }

    #[test]
    fn recovery_id_rejects_out_of_range() {
        assert!(RecoveryId::new(4).is_err());
    }

    #[test]
    fn normalize_s_flips_high_s() {
        let r = Scalar::ONE;
        let s = Scalar::ONE.negate();
        let mut sig = Signature::from_scalars(r, s);
        assert!(bool::from(sig.s.is_high()));
        let flipped = sig.normalize_s();
        assert!(flipped);
        assert!(!bool::from(sig.s.is_high()));
    }

    #[test]
    fn normalize_s_is_noop_for_low_s() {
        let r = Scalar::ONE;
        let s = Scalar::ONE;
        let mut sig = Signature::from_scalars(r, s);
        let flipped = sig.normalize_s();
        assert!(!flipped);
        assert_eq!(sig.s, s);
    }
}
