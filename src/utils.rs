//! Standalone helpers that don't belong to any one algorithm: private-key
//! validation and generation, caller-driven precomputation, and the curve's
//! defining constants.

use crate::affine::AffinePoint;
use crate::projective::JacobianPoint;
use crate::scalar::Scalar;

#[cfg(feature = "alloc")]
use crate::scalar_mul::{self, InvalidWindowWidth, PrecomputedTable};

/// `p`, the field modulus: `2^256 - 2^32 - 977`.
pub const FIELD_MODULUS: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

/// `n`, the order of the base point `G`.
pub const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// `Gx`, the x-coordinate of the base point.
pub const GENERATOR_X: [u8; 32] = [
    0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
    0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

/// `Gy`, the y-coordinate of the base point.
pub const GENERATOR_Y: [u8; 32] = [
    0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
    0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
];

/// The curve's base point, as an [`AffinePoint`].
pub const BASE_POINT: AffinePoint = AffinePoint::GENERATOR;

/// Returns `true` if `bytes` encodes a valid private key: a 32-byte
/// big-endian integer in `[1, n)`.
///
/// This is a thin, public-facing wrapper around [`Scalar::from_bytes`]; it
/// exists so callers validating key material (e.g. imported from another
/// system) don't need to reach for the scalar type directly.
pub fn is_valid_private_key(bytes: &[u8; 32]) -> bool {
    match Option::<Scalar>::from(Scalar::from_bytes(bytes)) {
        Some(scalar) => !bool::from(scalar.is_zero()),
        None => false,
    }
}

/// Generates a uniformly random private key in `[1, n)` via rejection
/// sampling: fill 32 bytes from `rng`, retry if the result is `0` or
/// `>= n`.
///
/// With an unbiased RNG the probability of needing more than a handful of
/// attempts is vanishingly small, but the loop is otherwise unbounded, so
/// `rng` must not be adversarially controlled.
#[cfg(feature = "rand_core")]
pub fn generate_random_private_key(mut rng: impl rand_core::CryptoRng + rand_core::RngCore) -> Scalar {
    let mut bytes = [0u8; 32];
    loop {
        rng.fill_bytes(&mut bytes);
        if let Some(scalar) = Option::<Scalar>::from(Scalar::from_bytes(&bytes)) {
            if !bool::from(scalar.is_zero()) {
                return scalar;
            }
        }
    }
}

/// Builds a caller-owned precomputed table for `point` at window width `w`,
/// for repeated multiplication by the same non-generator point.
///
/// Thin wrapper over [`scalar_mul::precompute`]; see there for the
/// window-width contract.
#[cfg(feature = "alloc")]
pub fn precompute(w: u32, point: &JacobianPoint) -> Result<PrecomputedTable, InvalidWindowWidth> {
    scalar_mul::precompute(w, point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_valid_private_key() {
        assert!(!is_valid_private_key(&[0u8; 32]));
    }

    #[test]
    fn order_is_not_a_valid_private_key() {
        assert!(!is_valid_private_key(&CURVE_ORDER));
    }

    #[test]
    fn one_is_a_valid_private_key() {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        assert!(is_valid_private_key(&bytes));
    }

    #[test]
    fn generator_matches_published_coordinates() {
        assert_eq!(BASE_POINT.x(), GENERATOR_X);
        assert_eq!(BASE_POINT.to_uncompressed()[33..], GENERATOR_Y);
    }

    #[cfg(feature = "rand_core")]
    #[test]
    fn generated_private_keys_are_valid() {
        use rand_core::OsRng;
        for _ in 0..8 {
            let key = generate_random_private_key(OsRng);
            assert!(is_valid_private_key(&key.to_bytes()));
        }
    }
}
