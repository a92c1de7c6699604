//! Protocol building blocks for the Netopia mobilPay card gateway.
//!
//! This crate holds everything that does not need a network: the RSA + RC4
//! envelope, the request signature, the XML element tree, the SOAP codec for
//! the `payment2` API, the direct-payment form and IPN decoding. The async
//! client lives in `netopia-kit`.

pub mod crypto;
pub mod direct;
pub mod errors;
pub mod ipn;
pub mod soap;
pub mod types;
pub mod xml;
