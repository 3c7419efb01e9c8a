//! Minimal ASN.1/DER primitives: validated OBJECT IDENTIFIER views and
//! output-buffer finalization.
//!
//! This module never parses attacker-supplied structures; it only checks
//! that caller inputs which *claim* to be DER-encoded OIDs actually are,
//! and keeps output buffers free of stray copies of sensitive bytes.

use tracing::warn;
use zeroize::Zeroize;

use crate::errors::{Error, Result};

/// ASN.1 identifier octet for OBJECT IDENTIFIER.
const TAG_OID: u8 = 0x06;

/// An immutable view of a DER-encoded OBJECT IDENTIFIER.
///
/// The invariant held by every value of this type: the first byte is the
/// OBJECT IDENTIFIER tag (`0x06`), the second byte is a short-form length
/// octet (high bit unset), and exactly that many payload bytes follow.
/// See <http://luca.ntop.org/Teaching/Appunti/asn1.html>, sections 2 and 3.1.
/// Long-form lengths are rejected rather than parsed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Asn1Oid<'a> {
    der: &'a [u8],
}

impl<'a> Asn1Oid<'a> {
    /// ecPublicKey named curve secp256r1 (P-256): `1.2.840.10045.3.1.7`.
    pub const SECP256R1: Asn1Oid<'static> = Asn1Oid {
        der: &[0x06, 0x08, 0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07],
    };

    /// ecPublicKey named curve secp384r1 (P-384): `1.3.132.0.34`.
    pub const SECP384R1: Asn1Oid<'static> = Asn1Oid {
        der: &[0x06, 0x05, 0x2B, 0x81, 0x04, 0x00, 0x22],
    };

    /// X.520 commonName attribute type: `2.5.4.3`.
    pub const COMMON_NAME: Asn1Oid<'static> = Asn1Oid {
        der: &[0x06, 0x03, 0x55, 0x04, 0x03],
    };

    /// X.520 organizationName attribute type: `2.5.4.10`.
    pub const ORGANIZATION: Asn1Oid<'static> = Asn1Oid {
        der: &[0x06, 0x03, 0x55, 0x04, 0x0A],
    };

    /// X.520 organizationalUnitName attribute type: `2.5.4.11`.
    pub const ORGANIZATIONAL_UNIT: Asn1Oid<'static> = Asn1Oid {
        der: &[0x06, 0x03, 0x55, 0x04, 0x0B],
    };

    /// Validates `der` as a syntactically well-formed OID and wraps it.
    ///
    /// Returns [`Error::InvalidArgument`] if the tag octet is not `0x06`,
    /// the length octet uses the long form, or the payload length does not
    /// match the length octet. Pure validation; nothing is handed to any
    /// backend before this check passes.
    pub fn from_der(der: &'a [u8]) -> Result<Self> {
        match der {
            [TAG_OID, len, payload @ ..] if *len <= 0x7F && payload.len() == usize::from(*len) => {
                Ok(Self { der })
            }
            _ => {
                warn!("something that is not a syntactically valid OID passed");
                Err(Error::InvalidArgument)
            }
        }
    }

    /// The full encoding, tag and length octets included.
    pub fn as_der(&self) -> &'a [u8] {
        self.der
    }

    /// The payload bytes after the tag and length octets.
    pub fn payload(&self) -> &'a [u8] {
        &self.der[2..]
    }
}

impl<'a> TryFrom<&'a [u8]> for Asn1Oid<'a> {
    type Error = Error;

    fn try_from(der: &'a [u8]) -> Result<Self> {
        Self::from_der(der)
    }
}

/// Moves `data_len` encoded bytes starting at `data_start` to the front of
/// `buf` and zeroizes every byte after them. Returns `data_len`.
///
/// DER builders that encode innermost-outward leave their result at the end
/// of the buffer; this relocates it to offset 0 without leaving stale copies
/// of sensitive material (private keys, signed structures) behind. Backends
/// that encode forward pass `data_start == 0`, which makes re-application
/// with the already-finalized length a no-op.
///
/// `data_start + data_len <= buf.len()` is a caller contract; violations
/// panic in debug builds and are clamped in release builds.
pub fn finalize_buffer(buf: &mut [u8], data_start: usize, data_len: usize) -> usize {
    debug_assert!(
        data_start.saturating_add(data_len) <= buf.len(),
        "finalized region out of bounds"
    );
    let data_start = data_start.min(buf.len());
    let data_len = data_len.min(buf.len() - data_start);

    buf.copy_within(data_start..data_start + data_len, 0);
    buf[data_len..].zeroize();
    data_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn accepts_well_formed_oid() {
        let der = hex!("06 03 55 04 03");
        let oid = Asn1Oid::from_der(&der).unwrap();
        assert_eq!(oid.payload(), &der[2..]);
        assert_eq!(oid.as_der(), &der);
    }

    #[test]
    fn accepts_zero_length_payload() {
        assert!(Asn1Oid::from_der(&[0x06, 0x00]).is_ok());
    }

    #[test]
    fn rejects_empty_and_truncated_input() {
        assert_eq!(Asn1Oid::from_der(&[]), Err(Error::InvalidArgument));
        assert_eq!(Asn1Oid::from_der(&[0x06]), Err(Error::InvalidArgument));
        assert_eq!(
            Asn1Oid::from_der(&[0x06, 0x03, 0x55]),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn rejects_wrong_tag() {
        // SEQUENCE tag in place of OBJECT IDENTIFIER
        assert_eq!(
            Asn1Oid::from_der(&[0x30, 0x01, 0x00]),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn rejects_long_form_length() {
        let mut der = vec![0x06, 0x81, 0x80];
        der.extend_from_slice(&[0u8; 0x80]);
        assert_eq!(Asn1Oid::from_der(&der), Err(Error::InvalidArgument));
    }

    #[test]
    fn rejects_payload_length_mismatch() {
        assert_eq!(
            Asn1Oid::from_der(&[0x06, 0x02, 0x55, 0x04, 0x03]),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn well_known_constants_are_valid() {
        for oid in [
            Asn1Oid::SECP256R1,
            Asn1Oid::SECP384R1,
            Asn1Oid::COMMON_NAME,
            Asn1Oid::ORGANIZATION,
            Asn1Oid::ORGANIZATIONAL_UNIT,
        ] {
            assert!(Asn1Oid::from_der(oid.as_der()).is_ok());
        }
    }

    #[test]
    fn finalize_moves_tail_data_to_front_and_zeroes_rest() {
        let mut buf = [0xAAu8; 8];
        buf[5..].copy_from_slice(&[1, 2, 3]);
        let len = finalize_buffer(&mut buf, 5, 3);
        assert_eq!(len, 3);
        assert_eq!(buf, [1, 2, 3, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn finalize_is_idempotent_on_relocated_region() {
        let mut buf = [0xAAu8; 8];
        buf[5..].copy_from_slice(&[1, 2, 3]);
        let len = finalize_buffer(&mut buf, 5, 3);
        let before = buf;
        assert_eq!(finalize_buffer(&mut buf, 0, len), len);
        assert_eq!(buf, before);
    }

    #[test]
    fn finalize_full_buffer_is_a_plain_no_op() {
        let mut buf = [7u8; 4];
        assert_eq!(finalize_buffer(&mut buf, 0, 4), 4);
        assert_eq!(buf, [7; 4]);
    }

    #[test]
    fn finalize_zero_length_wipes_everything() {
        let mut buf = [0xAAu8; 4];
        assert_eq!(finalize_buffer(&mut buf, 4, 0), 0);
        assert_eq!(buf, [0; 4]);
    }
}
