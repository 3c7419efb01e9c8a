#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs)]

//! Credential issuance for embedded TLS/DTLS clients: EC key-pair
//! generation and PKCS#10 Certificate Signing Requests, DER-encoded,
//! against a pluggable cryptographic backend.
//!
//! Both operations take an injected RNG (never process-global randomness),
//! a caller-allocated output buffer, and leave no key material in the
//! buffer beyond the returned length. The produced DER is byte-compatible
//! with standard X.509 tooling.
//!
//! # Usage
//!
//! Note: requires the `soft` feature (on by default) for the software
//! backend.
//!
#![cfg_attr(feature = "soft", doc = "```")]
#![cfg_attr(not(feature = "soft"), doc = "```ignore")]
//! use devcred::{tags, Asn1Oid, ClientKeyReference, Issuer, SoftBackend, SubjectNameEntry};
//!
//! # fn main() -> Result<(), devcred::Error> {
//! let mut rng = rand::thread_rng(); // rand@0.8
//! let issuer = Issuer::new(SoftBackend::new());
//!
//! // Generate a P-256 key pair; the private key lands DER-encoded at the
//! // start of the buffer.
//! let mut key_buf = [0u8; 256];
//! let key_len = issuer.generate_ec_key(&mut rng, &Asn1Oid::SECP256R1, &mut key_buf)?;
//!
//! // Issue a CSR signed with that key.
//! let subject = [SubjectNameEntry {
//!     oid: Asn1Oid::COMMON_NAME,
//!     value: Some("device-42"),
//!     tag: tags::PRINTABLE_STRING,
//! }];
//! let mut csr_buf = [0u8; 1024];
//! let csr_len = issuer.create_csr(
//!     &mut rng,
//!     issuer.backend(),
//!     &ClientKeyReference::Der(&key_buf[..key_len]),
//!     "SHA256",
//!     &subject,
//!     &mut csr_buf,
//! )?;
//!
//! // DER SEQUENCE, ready for any CA.
//! assert_eq!(csr_buf[0], 0x30);
//! # let _ = csr_len;
//! # Ok(())
//! # }
//! ```
//!
//! # Backends
//!
//! The engine is generic over a [`CryptoBackend`] (curve and digest
//! registries, key generation, CSR signing) and a [`KeyLoader`] (resolution
//! of opaque key references to signing handles). [`SoftBackend`] implements
//! both over the pure-Rust `p256`/`p384` stack; hardware-bound providers
//! plug in at the same seams.

pub use rand_core;

pub mod asn1;
pub mod backend;
pub mod errors;
pub mod subject;

mod issuer;

#[cfg(feature = "soft")]
pub mod soft;

#[cfg(feature = "soft")]
pub use pkcs8;
#[cfg(feature = "soft")]
pub use sha2;
#[cfg(feature = "soft")]
pub use signature;
#[cfg(feature = "soft")]
pub use x509_cert;

pub use crate::{
    asn1::Asn1Oid,
    backend::{ClientKeyReference, CryptoBackend, KeyLoader},
    errors::{Error, Result},
    issuer::Issuer,
    subject::{tags, SubjectName, SubjectNameEntry},
};

#[cfg(feature = "soft")]
pub use crate::soft::SoftBackend;
