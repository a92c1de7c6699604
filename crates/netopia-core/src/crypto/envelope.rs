//! RSA + RC4 hybrid envelope.
//!
//! A fresh symmetric key encrypts the payload with RC4 (no IV), and the key
//! itself is encrypted under the counterparty's RSA public key with PKCS#1
//! v1.5 padding. Both halves travel base64 encoded. This is the scheme the
//! gateway uses for the direct-payment form and for IPN notifications.

use base64::{Engine, engine::general_purpose::STANDARD};
use rc4::{
    KeyInit, Rc4, StreamCipher,
    consts::{U16, U32},
};
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Length of the symmetric keys this SDK generates.
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// Length of the symmetric keys the gateway seals its own payloads with.
pub const GATEWAY_KEY_LEN: usize = 16;

/// An encrypted payload, as carried by the `env_key` and `data` form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Symmetric key encrypted under the counterparty public key, base64.
    pub env_key: String,
    /// RC4 ciphertext of the payload, base64.
    #[serde(rename = "data")]
    pub env_data: String,
}

impl Envelope {
    /// Seal `plaintext` for the holder of the private half of `public_key`.
    pub fn seal(public_key: &RsaPublicKey, plaintext: impl AsRef<[u8]>) -> Result<Self> {
        encrypt(public_key, plaintext)
    }

    /// Open the envelope with `private_key`, returning the UTF-8 payload.
    pub fn open(&self, private_key: &RsaPrivateKey) -> Result<String> {
        decrypt(private_key, &self.env_key, &self.env_data)
    }
}

/// Encrypt `plaintext` under a fresh 32-byte RC4 key sealed with `public_key`.
pub fn encrypt(public_key: &RsaPublicKey, plaintext: impl AsRef<[u8]>) -> Result<Envelope> {
    let key = Zeroizing::new(rand::random::<[u8; SYMMETRIC_KEY_LEN]>());

    let mut data = plaintext.as_ref().to_vec();
    apply_keystream(key.as_slice(), &mut data)?;

    let sealed_key = public_key
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, key.as_slice())
        .map_err(Error::Encryption)?;

    Ok(Envelope {
        env_key: STANDARD.encode(sealed_key),
        env_data: STANDARD.encode(data),
    })
}

/// Recover the payload sealed in `env_key` / `env_data` with `private_key`.
///
/// Fails with [`Error::Decryption`] when the key does not unwrap, and with
/// [`Error::Utf8DecodeError`] when the recovered bytes are not text, so a
/// wrong key never yields garbage.
pub fn decrypt(private_key: &RsaPrivateKey, env_key: &str, env_data: &str) -> Result<String> {
    let sealed_key = STANDARD.decode(env_key.trim())?;
    let key = Zeroizing::new(
        private_key
            .decrypt(Pkcs1v15Encrypt, &sealed_key)
            .map_err(|e| Error::Decryption(e.to_string()))?,
    );

    let mut data = STANDARD.decode(env_data.trim())?;
    apply_keystream(&key, &mut data)?;

    Ok(String::from_utf8(data)?)
}

fn apply_keystream(key: &[u8], data: &mut [u8]) -> Result<()> {
    match key.len() {
        SYMMETRIC_KEY_LEN => Rc4::<U32>::new_from_slice(key).map(|mut rc4| rc4.apply_keystream(data)),
        GATEWAY_KEY_LEN => Rc4::<U16>::new_from_slice(key).map(|mut rc4| rc4.apply_keystream(data)),
        len => {
            return Err(Error::Decryption(format!(
                "unsupported symmetric key length {len}"
            )));
        }
    }
    .map_err(|e| Error::Decryption(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use crate::crypto::keys::{private_key_from_pem, public_key_from_pem};

    use super::*;

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/seller_private_pkcs8.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/seller_public.pem");

    fn keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
        static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
        KEYS.get_or_init(|| {
            (
                private_key_from_pem(PRIVATE_KEY).unwrap(),
                public_key_from_pem(PUBLIC_KEY).unwrap(),
            )
        })
    }

    #[test]
    fn test_keystream_vectors() {
        let gateway_key: Vec<u8> = (1..=16).collect();
        let mut data = b"Plaintext".to_vec();
        apply_keystream(&gateway_key, &mut data).unwrap();
        assert_eq!(hex::encode(&data), "caabadf30ee97b8fc6");

        let sdk_key: Vec<u8> = (1..=32).collect();
        let mut data = b"Plaintext".to_vec();
        apply_keystream(&sdk_key, &mut data).unwrap();
        assert_eq!(hex::encode(&data), "bacadc4ce67f9c454b");

        apply_keystream(&sdk_key, &mut data).unwrap();
        assert_eq!(data, b"Plaintext");
    }

    #[test]
    fn test_round_trip() {
        let (private_key, public_key) = keypair();
        let plaintext = "<order id=\"abc\"/>";

        let envelope = encrypt(public_key, plaintext).unwrap();

        assert!(STANDARD.decode(&envelope.env_key).is_ok());
        assert!(STANDARD.decode(&envelope.env_data).is_ok());
        assert_eq!(STANDARD.decode(&envelope.env_key).unwrap().len(), 256);
        assert_eq!(decrypt(private_key, &envelope.env_key, &envelope.env_data).unwrap(), plaintext);
    }

    #[test]
    fn test_round_trip_multibyte_and_empty() {
        let (private_key, public_key) = keypair();

        for plaintext in ["", "ă î ș ț ok", &"x".repeat(10_000)] {
            let envelope = Envelope::seal(public_key, plaintext).unwrap();
            assert_eq!(envelope.open(private_key).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_fresh_key_per_call() {
        let (_, public_key) = keypair();

        let first = encrypt(public_key, "same").unwrap();
        let second = encrypt(public_key, "same").unwrap();

        assert_ne!(first.env_key, second.env_key);
        assert_ne!(first.env_data, second.env_data);
    }

    #[test]
    fn test_wrong_private_key_is_an_error() {
        let (_, public_key) = keypair();
        let other = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();

        let envelope = encrypt(public_key, "<order/>").unwrap();

        assert!(matches!(
            envelope.open(&other),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn test_corrupted_input_is_an_error() {
        let (private_key, public_key) = keypair();
        let envelope = encrypt(public_key, "<order/>").unwrap();

        assert!(matches!(
            decrypt(private_key, "***", &envelope.env_data),
            Err(Error::Base64DecodeError(_))
        ));
        assert!(matches!(
            decrypt(private_key, &envelope.env_key, "not base64!"),
            Err(Error::Base64DecodeError(_))
        ));

        let mut sealed = STANDARD.decode(&envelope.env_key).unwrap();
        sealed[10] ^= 0xff;
        assert!(matches!(
            decrypt(private_key, &STANDARD.encode(sealed), &envelope.env_data),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn test_unsupported_key_length() {
        let mut data = vec![0u8; 4];
        assert!(matches!(
            apply_keystream(&[1, 2, 3], &mut data),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn test_serde_field_names() {
        let envelope = Envelope {
            env_key: "a2V5".to_owned(),
            env_data: "ZGF0YQ==".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            serde_json::json!({ "env_key": "a2V5", "data": "ZGF0YQ==" })
        );
    }
}
