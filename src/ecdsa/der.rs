//! ASN.1 DER encoding for ECDSA signatures, per [RFC 5912 Section 6]:
//!
//! ```text
//! ECDSA-Sig-Value ::= SEQUENCE {
//!   r  INTEGER,
//!   s  INTEGER
//! }
//! ```
//!
//! [RFC 5912 Section 6]: https://www.rfc-editor.org/rfc/rfc5912#section-6

use super::Signature;
use crate::error::{Error, ErrorKind, Result};
use crate::scalar::Scalar;
use alloc::vec::Vec;
use der::asn1::UintRef;
use der::{Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence, Writer};

struct SignatureRef<'a> {
    r: UintRef<'a>,
    s: UintRef<'a>,
}

impl EncodeValue for SignatureRef<'_> {
    fn value_len(&self) -> der::Result<Length> {
        self.r.encoded_len()? + self.s.encoded_len()?
    }

    fn encode_value(&self, encoder: &mut impl Writer) -> der::Result<()> {
        self.r.encode(encoder)?;
        self.s.encode(encoder)?;
        Ok(())
    }
}

impl<'a> DecodeValue<'a> for SignatureRef<'a> {
    type Error = der::Error;

    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> der::Result<Self> {
        Ok(Self {
            r: UintRef::decode(reader)?,
            s: UintRef::decode(reader)?,
        })
    }
}

impl<'a> Sequence<'a> for SignatureRef<'a> {}

/// Strips leading zero bytes, leaving `[0]` for an all-zero input.
fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    &bytes[nonzero..]
}

/// Left-pads a big-endian integer up to 32 DER-decoded bytes back into a
/// fixed-size scalar array, rejecting anything that would overflow it.
fn scalar_from_der_bytes(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() > 32 {
        return Err(Error::new(ErrorKind::InvalidEncoding));
    }
    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(bytes);
    Option::from(Scalar::from_bytes(&padded)).ok_or_else(|| Error::new(ErrorKind::InvalidEncoding))
}

impl Signature {
    /// Encodes this signature as ASN.1 DER, per [RFC 5912 Section 6].
    ///
    /// [RFC 5912 Section 6]: https://www.rfc-editor.org/rfc/rfc5912#section-6
    pub fn to_der(&self) -> Vec<u8> {
        let r_bytes = self.r.to_bytes();
        let s_bytes = self.s.to_bytes();
        let sig = SignatureRef {
            r: UintRef::new(trim_leading_zeros(&r_bytes)).expect("32-byte integer fits a UintRef"),
            s: UintRef::new(trim_leading_zeros(&s_bytes)).expect("32-byte integer fits a UintRef"),
        };
        sig.to_der().expect("DER encoding of a fixed-size signature cannot fail")
    }

    /// Decodes a signature from ASN.1 DER, per [RFC 5912 Section 6].
    ///
    /// Rejects malformed framing and `r`/`s` values that do not fit in 32
    /// bytes or do not represent a valid scalar.
    ///
    /// [RFC 5912 Section 6]: https://www.rfc-editor.org/rfc/rfc5912#section-6
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let SignatureRef { r, s } =
            SignatureRef::from_der(bytes).map_err(|_| Error::new(ErrorKind::InvalidEncoding))?;
        let r = scalar_from_der_bytes(r.as_bytes())?;
        let s = scalar_from_der_bytes(s.as_bytes())?;
        Ok(Self { r, s })
    }
}
