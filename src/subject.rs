//! Distinguished Name construction for CSR subjects.

use const_oid::ObjectIdentifier;
use der::Tag;
use tracing::warn;

use crate::asn1::Asn1Oid;
use crate::errors::{Error, Result};

/// ASN.1 identifier octets for the string types commonly used as DN
/// attribute values. Any other universal tag accepted by the DER encoder
/// may be passed as well; the engine never guesses a string type on the
/// caller's behalf.
pub mod tags {
    /// PrintableString (`0x13`).
    pub const PRINTABLE_STRING: u8 = 0x13;
    /// UTF8String (`0x0C`).
    pub const UTF8_STRING: u8 = 0x0C;
    /// IA5String (`0x16`).
    pub const IA5_STRING: u8 = 0x16;
}

/// One attribute of a subject Distinguished Name, e.g. the Common Name.
///
/// Entry order is significant and preserved in the encoded subject. The
/// `tag` selects the value's ASN.1 string type (see [`tags`]); `value` is
/// the attribute text, or `None` for an empty value.
#[derive(Copy, Clone, Debug)]
pub struct SubjectNameEntry<'a> {
    /// Attribute type, e.g. [`Asn1Oid::COMMON_NAME`].
    pub oid: Asn1Oid<'a>,
    /// Attribute value.
    pub value: Option<&'a str>,
    /// ASN.1 identifier octet for the value's string type.
    pub tag: u8,
}

/// A single validated subject attribute, in backend-native form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubjectAttr {
    oid: ObjectIdentifier,
    tag: Tag,
    value: Vec<u8>,
}

impl SubjectAttr {
    /// Attribute type.
    pub fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    /// Value string type.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Value contents, possibly empty.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// An ordered, validated subject Distinguished Name.
///
/// Built once from caller entries via [`SubjectName::from_entries`] and then
/// only read by backends. Construction fails fast on the first invalid
/// entry, leaving no partial output observable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubjectName {
    attrs: Vec<SubjectAttr>,
}

impl SubjectName {
    /// Validates `entries` and assembles the name list, preserving order.
    ///
    /// Each entry's OID must convert to the backend-native OID form and its
    /// tag must be a valid ASN.1 identifier octet, otherwise
    /// [`Error::InvalidArgument`] is returned. Allocation failure is
    /// reported as [`Error::OutOfMemory`].
    pub fn from_entries(entries: &[SubjectNameEntry<'_>]) -> Result<Self> {
        let mut attrs = Vec::new();
        attrs
            .try_reserve_exact(entries.len())
            .map_err(|_| Error::OutOfMemory)?;

        for entry in entries {
            let oid = ObjectIdentifier::from_bytes(entry.oid.payload()).map_err(|err| {
                warn!(%err, "subject entry OID not convertible to backend form");
                Error::InvalidArgument
            })?;
            let tag = Tag::try_from(entry.tag).map_err(|err| {
                warn!(%err, "subject entry carries an invalid value tag");
                Error::InvalidArgument
            })?;
            attrs.push(SubjectAttr {
                oid,
                tag,
                value: entry.value.unwrap_or_default().as_bytes().to_vec(),
            });
        }

        Ok(Self { attrs })
    }

    /// The validated attributes, in caller order.
    pub fn attrs(&self) -> &[SubjectAttr] {
        &self.attrs
    }

    /// Whether the name carries no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}
