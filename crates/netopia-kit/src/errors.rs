use crate::config::ConfigError;

/// Errors raised by [`crate::client::NetopiaClient`].
///
/// Gateway faults are not errors; they come back as
/// [`netopia_core::soap::RpcResult::Fault`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Core(#[from] netopia_core::errors::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

impl ClientError {
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::Transport(Box::new(err))
    }
}
