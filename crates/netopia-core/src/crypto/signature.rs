use md5::{Digest, Md5};
use sha1::Sha1;

/// `uppercase(hex(MD5(password)))`, the form in which the account password enters the hash.
pub fn password_digest(account_password: &str) -> String {
    hex::encode_upper(Md5::digest(account_password.as_bytes()))
}

/// Compute the request hash for a signed SOAP call.
///
/// `amount` is hashed exactly as given, so it must be rendered the same way it
/// is sent in the request body (see [`crate::types::Amount`]).
pub fn sign(
    order_id: &str,
    amount: &str,
    currency: &str,
    account_password: &str,
    account_id: &str,
) -> String {
    let mut hasher = Sha1::new();
    hasher.update(password_digest(account_password).as_bytes());
    hasher.update(order_id.as_bytes());
    hasher.update(amount.as_bytes());
    hasher.update(currency.as_bytes());
    hasher.update(account_id.as_bytes());
    hex::encode_upper(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(password_digest("secret"), "5EBE2294ECD0E0F08EAB7690D2A6EE69");
        assert_eq!(
            sign("ORDER123", "15.00", "RON", "secret", "SAC001"),
            "83B0E444AD8D097EE62B9F9F5810F48F1455584D"
        );
    }

    #[test]
    fn test_matches_independent_digest() {
        let md5 = hex::encode_upper(Md5::digest(b"secret"));
        let text = format!("{md5}ORDER123{}RON{}", "15.00", "SAC001");
        let expected = hex::encode_upper(Sha1::digest(text.as_bytes()));

        assert_eq!(sign("ORDER123", "15.00", "RON", "secret", "SAC001"), expected);
    }

    #[test]
    fn test_deterministic_uppercase_hex() {
        let first = sign("A1", "10", "EUR", "pw", "SAC");
        let second = sign("A1", "10", "EUR", "pw", "SAC");

        assert_eq!(first, second);
        assert_eq!(first.len(), 40);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[test]
    fn test_sensitive_to_every_input() {
        let base = sign("ORDER123", "15", "RON", "secret", "SAC001");
        let variants = [
            sign("ORDER124", "15", "RON", "secret", "SAC001"),
            sign("ORDER123", "15.01", "RON", "secret", "SAC001"),
            sign("ORDER123", "15", "EUR", "secret", "SAC001"),
            sign("ORDER123", "15", "RON", "Secret", "SAC001"),
            sign("ORDER123", "15", "RON", "secret", "SAC002"),
        ];

        for variant in &variants {
            assert_ne!(&base, variant);
        }
    }

    #[test]
    fn test_amount_formatting_is_part_of_the_hash() {
        assert_ne!(
            sign("ORDER123", "15", "RON", "secret", "SAC001"),
            sign("ORDER123", "15.00", "RON", "secret", "SAC001")
        );
    }
}
