//! The credential issuance engine.

use rand_core::CryptoRngCore;
use tracing::warn;

use crate::asn1::{finalize_buffer, Asn1Oid};
use crate::backend::{ClientKeyReference, CryptoBackend, KeyLoader};
use crate::errors::{Error, Result};
use crate::subject::{SubjectName, SubjectNameEntry};

/// Issues EC private keys and PKCS#10 CSRs against a [`CryptoBackend`].
///
/// Both operations are single-shot, synchronous calls: no state persists
/// between a key-generation call and a CSR call, and linking the two (sign
/// this CSR with the key just generated) is the caller's responsibility via
/// the key reference it passes. `&self` methods with caller-exclusive
/// buffers make concurrent calls on independent inputs safe by construction.
#[derive(Clone, Debug)]
pub struct Issuer<B> {
    backend: B,
}

impl<B: CryptoBackend> Issuer<B> {
    /// Creates an issuer over `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generates a fresh EC key pair on the curve identified by `curve_oid`
    /// and writes the private key, DER-encoded, to the start of `out`.
    /// Returns the encoded length; every byte of `out` past it is zero.
    ///
    /// `rng` is the sole entropy source for the new key. Unrecognized curve
    /// OIDs fail with [`Error::Unsupported`] before anything is written, so
    /// `out` is left untouched on that path. Backend generation or encoding
    /// failures map to [`Error::Protocol`] and leave `out` as scratch.
    ///
    /// On success `out[..len]` is private key material; the caller owns its
    /// eventual secure erasure.
    pub fn generate_ec_key<R: CryptoRngCore>(
        &self,
        rng: &mut R,
        curve_oid: &Asn1Oid<'_>,
        out: &mut [u8],
    ) -> Result<usize> {
        let curve = self.backend.lookup_curve(curve_oid).ok_or_else(|| {
            warn!("specified EC group is not supported");
            Error::Unsupported
        })?;

        let written = self.backend.generate_key(rng, &curve, out)?;
        Ok(finalize_buffer(out, out.len().saturating_sub(written), written))
    }

    /// Builds and signs a PKCS#10 CertificationRequest and writes it,
    /// DER-encoded, to the start of `out`. Returns the encoded length.
    ///
    /// Gates fire in order, first failure short-circuiting: digest lookup
    /// ([`Error::Unsupported`]), subject validation, key resolution through
    /// `loader` (its error is surfaced verbatim), then backend signing and
    /// encoding ([`Error::Protocol`]). The resolved signing handle is
    /// dropped, and its key material zeroized, before this method returns,
    /// on the success path and every failure path alike.
    pub fn create_csr<R, L>(
        &self,
        rng: &mut R,
        loader: &L,
        key_ref: &ClientKeyReference<'_>,
        digest_name: &str,
        subject: &[SubjectNameEntry<'_>],
        out: &mut [u8],
    ) -> Result<usize>
    where
        R: CryptoRngCore,
        L: KeyLoader<Key = B::SigningKey>,
    {
        let digest = self.backend.lookup_digest(digest_name).ok_or_else(|| {
            warn!(digest = digest_name, "backend has no such digest algorithm");
            Error::Unsupported
        })?;

        let subject = SubjectName::from_entries(subject)?;

        // Zeroized on drop, whichever way this function exits.
        let key = loader.load_key(key_ref)?;

        let written = self.backend.sign_csr(rng, &key, &digest, &subject, out)?;
        Ok(finalize_buffer(out, out.len().saturating_sub(written), written))
    }
}
