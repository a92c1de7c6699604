use std::fmt::Debug;

use bon::Builder;
use netopia_core::{
    crypto::{RsaPrivateKey, RsaPublicKey, private_key_from_pem, public_key_from_pem},
    soap::PAYMENT_API_PATH,
};
use serde::{Deserialize, Serialize};
use url::Url;

pub const PRODUCTION_URL: &str = "https://secure.mobilpay.ro";
pub const SANDBOX_URL: &str = "http://sandboxsecure.mobilpay.ro";

pub const DEFAULT_CURRENCY: &str = "RON";

/// Gateway environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Sandbox,
}

impl Environment {
    /// `production` selects the live gateway, any other value the sandbox.
    pub fn from_name(name: &str) -> Self {
        if name.trim() == "production" {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        match self {
            Environment::Production => Url::parse(PRODUCTION_URL),
            Environment::Sandbox => Url::parse(SANDBOX_URL),
        }
    }
}

/// Seller account credentials.
#[derive(Builder, Clone)]
pub struct SellerAccount {
    /// Seller account identifier, sent as `signature` and `sacId`.
    #[builder(into)]
    pub id: String,
    /// Merchant console user.
    #[builder(into)]
    pub username: String,
    #[builder(into)]
    pub password: String,
}

impl Debug for SellerAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SellerAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client configuration, loaded once and immutable afterwards.
#[derive(Builder, Clone)]
pub struct NetopiaConfig {
    /// Gateway base URL; the payment form posts here.
    pub base_url: Url,
    pub account: SellerAccount,
    /// Public key the gateway decrypts with, usually its certificate.
    pub public_key: RsaPublicKey,
    /// Seller key opening IPN payloads.
    pub private_key: RsaPrivateKey,
    /// Where the buyer lands after the payment page.
    pub return_url: Url,
    /// IPN endpoint.
    pub confirm_url: Url,
    #[builder(into, default = DEFAULT_CURRENCY.to_owned())]
    pub currency: String,
}

impl Debug for NetopiaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetopiaConfig")
            .field("base_url", &self.base_url.as_str())
            .field("account", &self.account)
            .field("private_key", &"<redacted>")
            .field("return_url", &self.return_url.as_str())
            .field("confirm_url", &self.confirm_url.as_str())
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid URL in {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid key in {name}: {source}")]
    InvalidKey {
        name: &'static str,
        #[source]
        source: netopia_core::errors::Error,
    },
}

impl NetopiaConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// | Variable                   | Meaning                                  |
    /// |----------------------------|------------------------------------------|
    /// | `ENVIRONMENT`              | `production` or anything else (sandbox)  |
    /// | `NETOPIA_BASE_URL`         | return URL                               |
    /// | `NETOPIA_WEBHOOK_URL`      | confirm (IPN) URL                        |
    /// | `NETOPIA_SELLER_ID`        | seller account identifier                |
    /// | `NETOPIA_PUBLIC_KEY`       | gateway public key / certificate PEM     |
    /// | `NETOPIA_PRIVATE_KEY`      | seller private key PEM                   |
    /// | `NETOPIA_ACCOUNT_USERNAME` | merchant console user                    |
    /// | `NETOPIA_ACCOUNT_PASSWORD` | merchant console password                |
    /// | `NETOPIA_CURRENCY`         | currency code, `RON` when unset          |
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let url = |name: &'static str| {
            Url::parse(require(name)?.trim())
                .map_err(|source| ConfigError::InvalidUrl { name, source })
        };

        let environment = lookup("ENVIRONMENT")
            .map(|name| Environment::from_name(&name))
            .unwrap_or_default();
        let base_url = environment
            .base_url()
            .map_err(|source| ConfigError::InvalidUrl {
                name: "ENVIRONMENT",
                source,
            })?;

        let public_key = public_key_from_pem(&require("NETOPIA_PUBLIC_KEY")?).map_err(|source| {
            ConfigError::InvalidKey {
                name: "NETOPIA_PUBLIC_KEY",
                source,
            }
        })?;
        let private_key =
            private_key_from_pem(&require("NETOPIA_PRIVATE_KEY")?).map_err(|source| {
                ConfigError::InvalidKey {
                    name: "NETOPIA_PRIVATE_KEY",
                    source,
                }
            })?;

        Ok(NetopiaConfig {
            base_url,
            account: SellerAccount {
                id: require("NETOPIA_SELLER_ID")?,
                username: require("NETOPIA_ACCOUNT_USERNAME")?,
                password: require("NETOPIA_ACCOUNT_PASSWORD")?,
            },
            public_key,
            private_key,
            return_url: url("NETOPIA_BASE_URL")?,
            confirm_url: url("NETOPIA_WEBHOOK_URL")?,
            currency: lookup("NETOPIA_CURRENCY")
                .map(|currency| currency.trim().to_owned())
                .filter(|currency| !currency.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
        })
    }

    /// SOAP endpoint, which is also the operation namespace.
    pub fn api_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(PAYMENT_API_PATH)
    }
}
