#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! A self-contained secp256k1 elliptic curve implementation: field and
//! scalar arithmetic, constant-time scalar multiplication, ECDSA (signing,
//! verification, and public-key recovery) with deterministic RFC 6979
//! nonces, BIP-340 Schnorr signatures, and Diffie-Hellman key agreement.
//!
//! The curve is the short Weierstrass curve `y^2 = x^3 + 7` over the
//! 256-bit prime field of order
//! `p = 2^256 - 2^32 - 977`, with base point order
//! `n = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141`.
//!
//! ## Feature flags
//!
//! - `arithmetic` (default): [`FieldElement`], [`Scalar`], [`AffinePoint`],
//!   [`JacobianPoint`], and constant-time scalar multiplication.
//! - `ecdsa` (default): the [`ecdsa`] module.
//! - `ecdh` (default): the [`ecdh`] module.
//! - `schnorr` (default): the [`schnorr`] module.
//! - `precomputed-tables` (default): a process-wide cached table for
//!   multiplication by the base point, backed by `once_cell`.
//! - `std` (default): enables `alloc` and std-only pieces of the above
//!   dependencies. Disable for `no_std` targets.
//! - `alloc`: required by `precompute`/`PrecomputedTable` and by ECDSA's DER
//!   codec, both of which own a heap-allocated buffer.
//! - `getrandom`: pulls in `rand_core`'s `getrandom` backend, enabling
//!   [`utils::generate_random_private_key`] to be called with `OsRng`.

#[cfg(feature = "alloc")]
#[allow(unused_imports)]
#[macro_use]
extern crate alloc;

#[cfg(feature = "arithmetic")]
mod affine;
#[cfg(feature = "arithmetic")]
mod field;
#[cfg(feature = "arithmetic")]
mod projective;
#[cfg(feature = "arithmetic")]
mod scalar;
#[cfg(feature = "arithmetic")]
pub mod scalar_mul;
#[cfg(feature = "arithmetic")]
mod util;

pub mod error;

#[cfg(feature = "ecdh")]
pub mod ecdh;

#[cfg(feature = "ecdsa")]
pub mod ecdsa;

#[cfg(feature = "ecdsa")]
mod rfc6979;

#[cfg(feature = "schnorr")]
pub mod schnorr;

#[cfg(feature = "arithmetic")]
pub mod utils;

#[cfg(feature = "arithmetic")]
pub use affine::AffinePoint;
#[cfg(feature = "arithmetic")]
pub use field::FieldElement;
#[cfg(feature = "arithmetic")]
pub use projective::JacobianPoint;
#[cfg(feature = "arithmetic")]
pub use scalar::Scalar;

pub use error::{Error, ErrorKind, Result};
