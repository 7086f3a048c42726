//! Constant-time scalar multiplication.
//!
//! Two paths are provided:
//!
//! - [`mul`]: a general-purpose windowed method for an arbitrary point,
//!   building a small lookup table fresh on every call.
//! - [`mul_base`]: multiplication by the fixed generator `G`, using a
//!   process-wide table of precomputed multiples so no per-call table build
//!   or doubling is needed.
//!
//! [`precompute`] additionally exposes a caller-owned table for a
//! caller-chosen point and window width, per the `utils.precompute(W, P)`
//! entry in the external interface.

use crate::projective::JacobianPoint;
use crate::scalar::Scalar;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Width (in bits) of the signed digit window used by [`mul`] and
/// [`mul_base`]'s internal table. Each digit covers one hex nibble of the
/// scalar and ranges over `[-8, 7]`.
///
/// Smaller than the `W = 8` named as this library's default in the external
/// spec: a `W = 8` table holds 128 `JacobianPoint`s per digit, which would
/// force [`LookupTable`] off the stack and behind `alloc` even for the
/// fixed-size [`mul`]/[`mul_base`] paths. `W = 4` keeps those two paths
/// `alloc`-free; callers who want the larger window for a repeatedly-used
/// point get it from the heap-backed [`precompute`] instead.
const WINDOW_BITS: u32 = 4;

/// `2^(WINDOW_BITS - 1)`: the number of stored multiples `[P, 2P, ..., 8P]`.
const HALF: usize = 1 << (WINDOW_BITS - 1);

/// `ceil(256 / WINDOW_BITS) + 1`: one digit per nibble, plus a carry slot
/// for the recentering step below to overflow into.
const DIGITS: usize = 256 / WINDOW_BITS as usize + 1;

/// A table of `[P, 2P, ..., 8P]` for some point `P`, supporting constant-time
/// selection of `d * P` for `d` in `[-8, 8]`.
#[derive(Clone, Copy)]
struct LookupTable([JacobianPoint; HALF]);

impl LookupTable {
    /// Builds the table from `p`, at the cost of `HALF - 1` point additions.
    fn new(p: &JacobianPoint) -> Self {
        let mut points = [*p; HALF];
        for j in 0..HALF - 1 {
            points[j + 1] = *p + points[j];
        }
        Self(points)
    }

    /// Returns `digit * P` in constant time: every entry is compared against
    /// `|digit|` and conditionally selected, so no memory access or branch
    /// depends on the value of `digit` beyond its final sign flip.
    fn select(&self, digit: i8) -> JacobianPoint {
        debug_assert!((-(HALF as i16)..=HALF as i16).contains(&(digit as i16)));

        let sign_mask = digit >> 7;
        let abs_digit = ((digit as i16) + (sign_mask as i16)) ^ (sign_mask as i16);

        let mut t = JacobianPoint::IDENTITY;
        for j in 1..=HALF {
            let c = (abs_digit as u8).ct_eq(&(j as u8));
            t = JacobianPoint::conditional_select(&t, &self.0[j - 1], c);
        }

        let negate = Choice::from((sign_mask & 1) as u8);
        JacobianPoint::conditional_select(&t, &t.negate(), negate)
    }
}

/// Splits a scalar into `DIGITS` signed nibbles `d_0, ..., d_{DIGITS-1}` in
/// `[-8, 7]` (the last one in `[-1, 1]`) such that
/// `scalar = sum(d_i * 16^i)`.
fn radix16_decompose(scalar: &Scalar) -> [i8; DIGITS] {
    let bytes = scalar.to_bytes();
    let mut digits = [0i8; DIGITS];

    for byte_index in 0..32 {
        let byte = bytes[31 - byte_index];
        digits[2 * byte_index] = (byte & 0xf) as i8;
        digits[2 * byte_index + 1] = ((byte >> 4) & 0xf) as i8;
    }

    for i in 0..DIGITS - 1 {
        let carry = (digits[i] + 8) >> 4;
        digits[i] -= carry << 4;
        digits[i + 1] += carry;
    }

    digits
}

/// Multiplies an arbitrary point by a scalar in constant time.
///
/// Builds an 8-entry table for `point` (7 additions), then folds in one
/// nibble of `scalar` per step with a fixed 4 doublings + 1 conditional
/// addition per nibble — the number of group operations performed does not
/// depend on the value of `scalar`.
pub fn mul(point: &JacobianPoint, scalar: &Scalar) -> JacobianPoint {
    let table = LookupTable::new(point);
    let digits = radix16_decompose(scalar);

    let mut acc = table.select(digits[DIGITS - 1]);
    for i in (0..DIGITS - 1).rev() {
        for _ in 0..WINDOW_BITS {
            acc = acc.double();
        }
        acc += table.select(digits[i]);
    }
    acc
}

/// Multiplies the generator `G` by a scalar, using the process-wide
/// precomputed table when the `precomputed-tables` feature is enabled.
pub fn mul_base(scalar: &Scalar) -> JacobianPoint {
    #[cfg(feature = "precomputed-tables")]
    {
        basepoint_table::mul_base(scalar)
    }
    #[cfg(not(feature = "precomputed-tables"))]
    {
        mul(&JacobianPoint::GENERATOR, scalar)
    }
}

#[cfg(feature = "precomputed-tables")]
mod basepoint_table {
    use super::{radix16_decompose, LookupTable, DIGITS, WINDOW_BITS};
    use crate::projective::JacobianPoint;
    use crate::scalar::Scalar;
    use once_cell::sync::OnceCell;

    /// `tables[i]` holds `[16^i * G, 2*16^i * G, ..., 8*16^i * G]`, so that
    /// multiplying `G` by a scalar reduces to one table lookup per nibble
    /// and zero doublings.
    ///
    /// Built lazily on first use and never invalidated: `G` never changes,
    /// so the table is valid for the lifetime of the process. Concurrent
    /// first-callers race harmlessly to the same result; [`OnceCell`]
    /// ensures only one survives to be read.
    static TABLES: OnceCell<[LookupTable; DIGITS]> = OnceCell::new();

    fn tables() -> &'static [LookupTable; DIGITS] {
        TABLES.get_or_init(|| {
            let mut tables = [LookupTable::new(&JacobianPoint::GENERATOR); DIGITS];
            let mut spaced = JacobianPoint::GENERATOR;
            for table in tables.iter_mut() {
                *table = LookupTable::new(&spaced);
                for _ in 0..WINDOW_BITS {
                    spaced = spaced.double();
                }
            }
            tables
        })
    }

    pub(super) fn mul_base(scalar: &Scalar) -> JacobianPoint {
        let digits = radix16_decompose(scalar);
        let tables = tables();

        let mut acc = JacobianPoint::IDENTITY;
        for (table, digit) in tables.iter().zip(digits.iter()) {
            acc += table.select(*digit);
        }
        acc
    }
}

/// An opaque, caller-owned precomputed table for a chosen point and window
/// width, as returned by [`precompute`].
///
/// Unlike the internal generator table, this is not cached process-wide: it
/// is built once by the caller and reused for as many multiplications by
/// the same point as needed.
#[cfg(feature = "alloc")]
pub struct PrecomputedTable {
    window_bits: u32,
    digits: usize,
    entries: alloc::vec::Vec<JacobianPoint>,
}

#[cfg(feature = "alloc")]
impl PrecomputedTable {
    /// Returns `digit * point` in constant time, scanning every stored
    /// entry rather than indexing directly by `digit`.
    fn select(&self, digit: i32) -> JacobianPoint {
        let sign_mask = digit >> 31;
        let abs_digit = (digit + sign_mask) ^ sign_mask;

        let mut t = JacobianPoint::IDENTITY;
        for (j, entry) in self.entries.iter().enumerate() {
            let c = (abs_digit as u32).ct_eq(&((j + 1) as u32));
            t = JacobianPoint::conditional_select(&t, entry, c);
        }

        let negate = Choice::from((sign_mask & 1) as u8);
        JacobianPoint::conditional_select(&t, &t.negate(), negate)
    }

    /// Multiplies this table's point by `scalar`, using this table's window
    /// width instead of the library's internal default.
    pub fn mul(&self, scalar: &Scalar) -> JacobianPoint {
        let bytes = scalar.to_bytes();
        let mut digits = alloc::vec![0i32; self.digits + 1];

        // Extract `self.digits` signed windows of `self.window_bits` bits
        // each from the 256-bit scalar, least-significant window first.
        let mut bit_pos: u32 = 0;
        for digit in digits.iter_mut().take(self.digits) {
            let mut window = 0u32;
            for b in 0..self.window_bits {
                let bit_index = bit_pos + b as u32;
                if bit_index >= 256 {
                    break;
                }
                let byte = bytes[31 - (bit_index / 8) as usize];
                let bit = (byte >> (bit_index % 8)) & 1;
                window |= (bit as u32) << b;
            }
            *digit = window as i32;
            bit_pos += self.window_bits;
        }

        let half = 1i32 << (self.window_bits - 1);
        for i in 0..self.digits {
            let carry = (digits[i] + half) >> self.window_bits;
            digits[i] -= carry << self.window_bits;
            digits[i + 1] += carry;
        }

        let mut acc = self.select(digits[self.digits]);
        for i in (0..self.digits).rev() {
            for _ in 0..self.window_bits {
                acc = acc.double();
            }
            acc += self.select(digits[i]);
        }
        acc
    }
}

/// Errors returned by [`precompute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidWindowWidth;

/// Builds a caller-owned precomputed table for `point` at window width `w`.
///
/// `w` must be in `[1, 16]`, matching the external `utils.precompute`
/// contract; values outside that range are rejected rather than silently
/// clamped. Building the table costs `2^(w-1) - 1` point additions.
#[cfg(feature = "alloc")]
pub fn precompute(w: u32, point: &JacobianPoint) -> Result<PrecomputedTable, InvalidWindowWidth> {
    if w == 0 || w > 16 {
        return Err(InvalidWindowWidth);
    }

    let half = 1usize << (w - 1);
    let mut entries = alloc::vec![*point; half];
    for j in 0..half - 1 {
        entries[j + 1] = *point + entries[j];
    }

    let digits = (256 + w as usize - 1) / w as usize;

    Ok(PrecomputedTable {
        window_bits: w,
        digits,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affine::AffinePoint;

    fn scalar_from_u64(x: u64) -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&x.to_be_bytes());
        Scalar::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn mul_by_one_is_identity_map() {
        let g = JacobianPoint::GENERATOR;
        let one = scalar_from_u64(1);
        assert_eq!(mul(&g, &one), g);
    }

    #[test]
    fn mul_by_two_equals_double() {
        let g = JacobianPoint::GENERATOR;
        let two = scalar_from_u64(2);
        assert_eq!(mul(&g, &two), g.double());
    }

    #[test]
    fn mul_matches_repeated_addition() {
        let g = JacobianPoint::GENERATOR;
        let mut acc = JacobianPoint::IDENTITY;
        for _ in 0..37 {
            acc += g;
        }
        assert_eq!(mul(&g, &scalar_from_u64(37)), acc);
    }

    #[test]
    fn mul_base_matches_generic_mul() {
        let k = scalar_from_u64(123_456_789);
        assert_eq!(mul_base(&k), mul(&JacobianPoint::GENERATOR, &k));
    }

    #[test]
    fn scalar_mul_is_distributive() {
        let g = JacobianPoint::GENERATOR;
        let a = scalar_from_u64(7);
        let b = scalar_from_u64(11);
        let lhs = mul(&g, &a) + mul(&g, &b);
        let rhs = mul(&g, &(a + b));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn scalar_mul_is_associative_with_scalar_mul() {
        let g = JacobianPoint::GENERATOR;
        let a = scalar_from_u64(5);
        let b = scalar_from_u64(9);
        let lhs = mul(&mul(&g, &a), &b);
        let rhs = mul(&g, &(a * b));
        assert_eq!(lhs, rhs);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn precompute_matches_generic_mul() {
        let g = JacobianPoint::GENERATOR;
        let table = precompute(4, &g).unwrap();
        let k = scalar_from_u64(999_999);
        assert_eq!(table.mul(&k), mul(&g, &k));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn precompute_rejects_out_of_range_width() {
        assert!(precompute(0, &JacobianPoint::GENERATOR).is_err());
        assert!(precompute(17, &JacobianPoint::GENERATOR).is_err());
    }

    #[test]
    fn generator_public_key_for_d_equals_one_is_g() {
        let g_affine: AffinePoint = JacobianPoint::GENERATOR.into();
        assert_eq!(mul_base(&scalar_from_u64(1)).to_affine(), g_affine);
    }
}
