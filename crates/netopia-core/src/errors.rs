/// Error types for Netopia core operations.
///
/// Counterparty-reported business errors are not represented here: those
/// travel as data inside [`crate::soap::RpcResult::Fault`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied RSA key material could not be parsed.
    #[error("Invalid key format: {0}")]
    KeyFormat(String),

    /// The RSA step of the envelope encryption failed.
    #[error("Encryption error: {0}")]
    Encryption(#[source] rsa::Error),

    /// The envelope could not be opened with the given private key.
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Base64 encoding/decoding errors.
    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    /// UTF-8 decoding errors.
    #[error("UTF-8 decode error: {0}")]
    Utf8DecodeError(#[from] std::string::FromUtf8Error),

    /// Malformed XML document.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Failure while serializing an XML document.
    #[error("XML write error: {0}")]
    XmlWrite(String),

    /// Well-formed XML that lacks the node the caller expected.
    #[error("Unexpected XML shape: missing `{0}`")]
    UnexpectedXml(String),

    /// A value that should be a decimal amount could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] rust_decimal::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

/// A specialized `Result` type for Netopia core operations.
pub type Result<T> = std::result::Result<T, Error>;
