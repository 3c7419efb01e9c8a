//! Capability traits at the crypto-provider seam.
//!
//! The issuance engine is generic over two collaborators: a
//! [`CryptoBackend`] providing curve/digest registries and the actual key
//! generation and CSR signing, and a [`KeyLoader`] resolving opaque
//! [`ClientKeyReference`]s to signing handles. Concrete implementations are
//! selected at build or startup configuration time; there is no runtime
//! type inspection anywhere on this seam.

use std::path::Path;

use rand_core::CryptoRngCore;
use zeroize::ZeroizeOnDrop;

use crate::asn1::Asn1Oid;
use crate::errors::Result;
use crate::subject::SubjectName;

/// An opaque descriptor identifying private key material.
///
/// Resolution via a [`KeyLoader`] produces a signing handle exclusively
/// owned by the issuance call; the handle is destroyed, and any copied key
/// material zeroized, before the call returns on every exit path.
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ClientKeyReference<'a> {
    /// In-memory DER private key (PKCS#8 or SEC1).
    Der(&'a [u8]),
    /// DER private key read from a file.
    File(&'a Path),
}

/// Resolves [`ClientKeyReference`]s to usable signing handles.
///
/// Fails with [`Error::InvalidArgument`](crate::Error::InvalidArgument) for
/// references that do not parse as key material and
/// [`Error::NotFound`](crate::Error::NotFound) when the referenced material
/// does not exist.
pub trait KeyLoader {
    /// The signing handle produced by resolution.
    type Key;

    /// Resolves `reference` to a signing handle.
    fn load_key(&self, reference: &ClientKeyReference<'_>) -> Result<Self::Key>;
}

/// A pluggable cryptographic provider.
///
/// Output convention: [`generate_key`](Self::generate_key) and
/// [`sign_csr`](Self::sign_csr) place their DER result right-aligned in the
/// caller's buffer and return its length; DER builders encode
/// innermost-outward, so the total length is only known at the end. The
/// engine relocates the result to the front and zeroizes the remainder; a
/// backend must never leave key bytes in the buffer outside the region it
/// reports. A result larger than the buffer is a
/// [`Error::Protocol`](crate::Error::Protocol) failure with the buffer
/// treated as scratch.
pub trait CryptoBackend {
    /// A curve resolved from the backend's OID registry.
    type Curve;
    /// A digest algorithm resolved from the backend's name registry.
    type Digest;
    /// A private-key signing handle. The `ZeroizeOnDrop` bound is what
    /// guarantees the engine's unconditional-cleanup contract.
    type SigningKey: ZeroizeOnDrop;

    /// Looks up `oid` in the backend's named-curve table.
    fn lookup_curve(&self, oid: &Asn1Oid<'_>) -> Option<Self::Curve>;

    /// Looks up a digest algorithm by registry name, e.g. `"SHA256"`.
    fn lookup_digest(&self, name: &str) -> Option<Self::Digest>;

    /// Generates a fresh EC key pair on `curve`, with `rng` as the sole
    /// entropy source, and serializes the private key as DER into `out`
    /// (right-aligned). Returns the encoded length.
    fn generate_key<R: CryptoRngCore>(
        &self,
        rng: &mut R,
        curve: &Self::Curve,
        out: &mut [u8],
    ) -> Result<usize>;

    /// Builds a PKCS#10 CertificationRequest over `subject` and the public
    /// half of `key`, signs it with `key` using `digest` and `rng` (required
    /// for randomized signature schemes), and encodes it as DER into `out`
    /// (right-aligned). Returns the encoded length.
    fn sign_csr<R: CryptoRngCore>(
        &self,
        rng: &mut R,
        key: &Self::SigningKey,
        digest: &Self::Digest,
        subject: &SubjectName,
        out: &mut [u8],
    ) -> Result<usize>;
}
