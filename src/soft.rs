//! Software backend over the pure-Rust EC stack.
//!
//! Curves come from the `p256`/`p384` crates, PKCS#10 structures from
//! `x509-cert`, and signatures are hedged randomized ECDSA. This is the
//! backend embedded clients without a secure element use; hardware-bound
//! backends implement the same two traits.

use std::io;

use const_oid::{AssociatedOid, ObjectIdentifier};
use der::asn1::{Any, BitString, SetOfVec};
use der::Encode;
use pkcs8::DecodePrivateKey;
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256, Sha384, Sha512};
use signature::hazmat::RandomizedPrehashSigner;
use signature::RandomizedDigestSigner;
use spki::{AlgorithmIdentifierOwned, EncodePublicKey, SubjectPublicKeyInfoOwned};
use tracing::warn;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};
use x509_cert::request::{CertReq, CertReqInfo, Version};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::asn1::Asn1Oid;
use crate::backend::{ClientKeyReference, CryptoBackend, KeyLoader};
use crate::errors::{Error, Result};
use crate::subject::SubjectName;

/// ecdsa-with-SHA256: `1.2.840.10045.4.3.2`.
const ECDSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

/// ecdsa-with-SHA384: `1.2.840.10045.4.3.3`.
const ECDSA_WITH_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");

/// ecdsa-with-SHA512: `1.2.840.10045.4.3.4`.
const ECDSA_WITH_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");

/// The software backend. Stateless; every call is independent.
#[derive(Copy, Clone, Debug, Default)]
pub struct SoftBackend;

impl SoftBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

/// Named curves in the software backend's registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SoftCurve {
    /// secp256r1 / NIST P-256.
    P256,
    /// secp384r1 / NIST P-384.
    P384,
}

/// Digest algorithms in the software backend's registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SoftDigest {
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl SoftDigest {
    fn ecdsa_signature_oid(self) -> ObjectIdentifier {
        match self {
            SoftDigest::Sha256 => ECDSA_WITH_SHA256,
            SoftDigest::Sha384 => ECDSA_WITH_SHA384,
            SoftDigest::Sha512 => ECDSA_WITH_SHA512,
        }
    }
}

/// A resolved private-key signing handle.
///
/// Wraps the secret scalar; zeroized when dropped.
#[derive(Clone)]
pub enum SoftSigningKey {
    /// P-256 private key.
    P256(p256::SecretKey),
    /// P-384 private key.
    P384(p384::SecretKey),
}

impl ZeroizeOnDrop for SoftSigningKey {}

impl CryptoBackend for SoftBackend {
    type Curve = SoftCurve;
    type Digest = SoftDigest;
    type SigningKey = SoftSigningKey;

    fn lookup_curve(&self, oid: &Asn1Oid<'_>) -> Option<SoftCurve> {
        let oid = ObjectIdentifier::from_bytes(oid.payload()).ok()?;
        if oid == p256::NistP256::OID {
            Some(SoftCurve::P256)
        } else if oid == p384::NistP384::OID {
            Some(SoftCurve::P384)
        } else {
            None
        }
    }

    fn lookup_digest(&self, name: &str) -> Option<SoftDigest> {
        match name.to_ascii_uppercase().as_str() {
            "SHA256" | "SHA-256" => Some(SoftDigest::Sha256),
            "SHA384" | "SHA-384" => Some(SoftDigest::Sha384),
            "SHA512" | "SHA-512" => Some(SoftDigest::Sha512),
            _ => None,
        }
    }

    fn generate_key<R: CryptoRngCore>(
        &self,
        rng: &mut R,
        curve: &SoftCurve,
        out: &mut [u8],
    ) -> Result<usize> {
        use pkcs8::EncodePrivateKey;

        let doc = match curve {
            SoftCurve::P256 => p256::SecretKey::random(rng).to_pkcs8_der(),
            SoftCurve::P384 => p384::SecretKey::random(rng).to_pkcs8_der(),
        }
        .map_err(|err| {
            warn!(%err, "private key DER serialization failed");
            Error::Protocol
        })?;

        // SecretDocument zeroizes the intermediate copy on drop.
        write_right_aligned(out, doc.as_bytes())
    }

    fn sign_csr<R: CryptoRngCore>(
        &self,
        rng: &mut R,
        key: &SoftSigningKey,
        digest: &SoftDigest,
        subject: &SubjectName,
        out: &mut [u8],
    ) -> Result<usize> {
        let info = CertReqInfo {
            version: Version::V1,
            subject: encode_subject(subject)?,
            public_key: public_key_info(key)?,
            attributes: Default::default(),
        };

        let msg = info.to_der().map_err(|err| {
            warn!(%err, "CertificationRequestInfo encoding failed");
            Error::Protocol
        })?;

        let sig_der = sign_message(rng, key, *digest, &msg)?;

        let csr = CertReq {
            info,
            algorithm: AlgorithmIdentifierOwned {
                oid: digest.ecdsa_signature_oid(),
                parameters: None,
            },
            signature: BitString::from_bytes(&sig_der).map_err(|err| {
                warn!(%err, "signature BIT STRING construction failed");
                Error::Protocol
            })?,
        };

        let der = csr.to_der().map_err(|err| {
            warn!(%err, "CertificationRequest encoding failed");
            Error::Protocol
        })?;
        write_right_aligned(out, &der)
    }
}

impl KeyLoader for SoftBackend {
    type Key = SoftSigningKey;

    fn load_key(&self, reference: &ClientKeyReference<'_>) -> Result<SoftSigningKey> {
        match reference {
            ClientKeyReference::Der(der) => parse_private_key(der),
            ClientKeyReference::File(path) => {
                let der = Zeroizing::new(std::fs::read(path).map_err(|err| {
                    warn!(%err, path = %path.display(), "reading key file failed");
                    if err.kind() == io::ErrorKind::NotFound {
                        Error::NotFound
                    } else {
                        Error::Protocol
                    }
                })?);
                parse_private_key(&der)
            }
        }
    }
}

fn parse_private_key(der: &[u8]) -> Result<SoftSigningKey> {
    if let Ok(key) = p256::SecretKey::from_pkcs8_der(der) {
        return Ok(SoftSigningKey::P256(key));
    }
    if let Ok(key) = p384::SecretKey::from_pkcs8_der(der) {
        return Ok(SoftSigningKey::P384(key));
    }
    if let Ok(key) = p256::SecretKey::from_sec1_der(der) {
        return Ok(SoftSigningKey::P256(key));
    }
    if let Ok(key) = p384::SecretKey::from_sec1_der(der) {
        return Ok(SoftSigningKey::P384(key));
    }
    warn!("key reference does not parse as an EC private key");
    Err(Error::InvalidArgument)
}

/// One RDN per entry, in caller order; the value keeps the caller's tag.
fn encode_subject(subject: &SubjectName) -> Result<Name> {
    let mut rdns = Vec::with_capacity(subject.attrs().len());
    for attr in subject.attrs() {
        let value = Any::new(attr.tag(), attr.value()).map_err(|err| {
            warn!(%err, "subject attribute value not encodable");
            Error::InvalidArgument
        })?;
        let atv = AttributeTypeAndValue {
            oid: attr.oid(),
            value,
        };
        let set = SetOfVec::try_from(vec![atv]).map_err(|err| {
            warn!(%err, "RDN set construction failed");
            Error::Protocol
        })?;
        rdns.push(RelativeDistinguishedName(set));
    }
    Ok(RdnSequence(rdns))
}

fn public_key_info(key: &SoftSigningKey) -> Result<SubjectPublicKeyInfoOwned> {
    let doc = match key {
        SoftSigningKey::P256(key) => key.public_key().to_public_key_der(),
        SoftSigningKey::P384(key) => key.public_key().to_public_key_der(),
    }
    .map_err(|err| {
        warn!(%err, "public key encoding failed");
        Error::Protocol
    })?;
    doc.decode_msg::<SubjectPublicKeyInfoOwned>().map_err(|err| {
        warn!(%err, "SubjectPublicKeyInfo decoding failed");
        Error::Protocol
    })
}

/// Hedged randomized ECDSA over `msg`, DER signature encoding.
fn sign_message<R: CryptoRngCore>(
    rng: &mut R,
    key: &SoftSigningKey,
    digest: SoftDigest,
    msg: &[u8],
) -> Result<Vec<u8>> {
    let sig_der = match key {
        SoftSigningKey::P256(key) => {
            let signer = p256::ecdsa::SigningKey::from(key);
            let sig: p256::ecdsa::Signature = match digest {
                SoftDigest::Sha256 => {
                    signer.try_sign_digest_with_rng(rng, Sha256::new_with_prefix(msg))
                }
                // `ecdsa` only implements the digest-signer trait when the
                // digest output matches the field size; other digests go
                // through the prehash signer, which applies the standard
                // hash truncation.
                SoftDigest::Sha384 => signer.sign_prehash_with_rng(rng, &Sha384::digest(msg)),
                SoftDigest::Sha512 => signer.sign_prehash_with_rng(rng, &Sha512::digest(msg)),
            }
            .map_err(|err| {
                warn!(%err, "ECDSA signing failed");
                Error::Protocol
            })?;
            sig.to_der().as_bytes().to_vec()
        }
        SoftSigningKey::P384(key) => {
            let signer = p384::ecdsa::SigningKey::from(key);
            let sig: p384::ecdsa::Signature = match digest {
                SoftDigest::Sha256 => signer.sign_prehash_with_rng(rng, &Sha256::digest(msg)),
                SoftDigest::Sha384 => {
                    signer.try_sign_digest_with_rng(rng, Sha384::new_with_prefix(msg))
                }
                SoftDigest::Sha512 => signer.sign_prehash_with_rng(rng, &Sha512::digest(msg)),
            }
            .map_err(|err| {
                warn!(%err, "ECDSA signing failed");
                Error::Protocol
            })?;
            sig.to_der().as_bytes().to_vec()
        }
    };
    Ok(sig_der)
}

fn write_right_aligned(out: &mut [u8], der: &[u8]) -> Result<usize> {
    if der.len() > out.len() {
        warn!(
            needed = der.len(),
            capacity = out.len(),
            "output buffer too small for DER result"
        );
        return Err(Error::Protocol);
    }
    let start = out.len() - der.len();
    out[start..].copy_from_slice(der);
    Ok(der.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_registry_matches_named_curve_oids() {
        let backend = SoftBackend::new();
        assert_eq!(
            backend.lookup_curve(&Asn1Oid::SECP256R1),
            Some(SoftCurve::P256)
        );
        assert_eq!(
            backend.lookup_curve(&Asn1Oid::SECP384R1),
            Some(SoftCurve::P384)
        );
        // curve25519 is not in the registry
        let x25519 = [0x06, 0x03, 0x2B, 0x65, 0x6E];
        let oid = Asn1Oid::from_der(&x25519).unwrap();
        assert_eq!(backend.lookup_curve(&oid), None);
    }

    #[test]
    fn digest_registry_accepts_aliases() {
        let backend = SoftBackend::new();
        assert_eq!(backend.lookup_digest("SHA256"), Some(SoftDigest::Sha256));
        assert_eq!(backend.lookup_digest("sha-384"), Some(SoftDigest::Sha384));
        assert_eq!(backend.lookup_digest("Sha512"), Some(SoftDigest::Sha512));
        assert_eq!(backend.lookup_digest("no-such-digest"), None);
        assert_eq!(backend.lookup_digest("MD5"), None);
    }

    #[test]
    fn right_aligned_write_rejects_overflow() {
        let mut buf = [0u8; 4];
        assert_eq!(
            write_right_aligned(&mut buf, &[1, 2, 3, 4, 5]),
            Err(Error::Protocol)
        );
        assert_eq!(buf, [0; 4]);
        assert_eq!(write_right_aligned(&mut buf, &[9, 9]), Ok(2));
        assert_eq!(buf, [0, 0, 9, 9]);
    }
}
