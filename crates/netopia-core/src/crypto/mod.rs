//! Cryptography required by the gateway protocol.
//!
//! - [`envelope`]: RSA + RC4 hybrid envelope protecting form-post and IPN payloads.
//! - [`keys`]: PEM key loading (SPKI, PKCS#1, PKCS#8 and X.509 certificates).
//! - [`signature`]: SHA1-over-MD5 hash authenticating signed SOAP calls.
//!
//! The algorithm choices are fixed by the gateway and are not configurable.

pub mod envelope;
pub mod keys;
pub mod signature;

pub use envelope::{Envelope, decrypt, encrypt};
pub use keys::{private_key_from_pem, public_key_from_pem};
pub use signature::{password_digest, sign};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
