//! Instant payment notifications (IPN) posted by the gateway to the confirm URL.
//!
//! The callback body carries the same `env_key` / `data` pair as the payment
//! form, sealed under the seller's public key. Opening it yields the order
//! document extended with a `mobilpay` status block.

use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};

use crate::{
    crypto::Envelope,
    errors::Result,
    types::{Amount, Record},
    xml::{self, XmlElement},
};

/// Form fields of an inbound IPN callback.
pub type IpnRequest = Envelope;

/// Error code the gateway reports for an approved transaction.
pub const SUCCESS_CODE: &str = "0";

/// Decoded IPN notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpnNotification {
    pub order_id: String,
    /// Transaction state, e.g. `confirmed`, `paid_pending` or `canceled`.
    pub action: Option<String>,
    pub error_code: String,
    pub error_message: String,
    /// `true` when the gateway reports error code `0`.
    pub success: bool,
    /// Order params echoed back, flattened to name -> value.
    pub params: Record<String>,
    pub token_id: Option<String>,
    pub token_expiration_date: Option<String>,
    pub original_amount: Option<Amount>,
    pub processed_amount: Option<Amount>,
    /// The whole decrypted `order` document.
    pub document: XmlElement,
}

impl IpnNotification {
    /// Read a notification from its decrypted XML.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = xml::parse(xml)?;
        let mobilpay = document.require(&["mobilpay"])?;
        let error = mobilpay.require(&["error"])?;
        let error_code = error.attribute("code").unwrap_or_default().to_owned();

        let params = document
            .find("params")
            .map(|params| {
                params
                    .find_all("param")
                    .filter_map(|param| {
                        let name = param.child_text("name")?;
                        Some((
                            name.to_owned(),
                            param.child_text("value").unwrap_or_default().to_owned(),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(IpnNotification {
            order_id: document.attribute("id").unwrap_or_default().to_owned(),
            action: mobilpay.child_text("action").map(str::to_owned),
            success: error_code == SUCCESS_CODE,
            error_code,
            error_message: error.text_content().to_owned(),
            params,
            token_id: mobilpay.child_text("token_id").map(str::to_owned),
            token_expiration_date: mobilpay
                .child_text("token_expiration_date")
                .map(str::to_owned),
            original_amount: parse_amount(mobilpay, "original_amount")?,
            processed_amount: parse_amount(mobilpay, "processed_amount")?,
            document,
        })
    }
}

fn parse_amount(element: &XmlElement, name: &str) -> Result<Option<Amount>> {
    match element.child_text(name).filter(|text| !text.trim().is_empty()) {
        Some(text) => Ok(Some(text.parse()?)),
        None => Ok(None),
    }
}

/// Open an IPN callback with the seller private key and decode it.
pub fn decode_ipn(private_key: &RsaPrivateKey, request: &IpnRequest) -> Result<IpnNotification> {
    IpnNotification::from_xml(&request.open(private_key)?)
}

/// Body the merchant returns to acknowledge an IPN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpnAcknowledgement {
    pub crc: String,
}

impl IpnAcknowledgement {
    pub const CONTENT_TYPE: &'static str = "application/xml";

    pub fn success() -> Self {
        IpnAcknowledgement {
            crc: "success".to_owned(),
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        XmlElement::leaf("crc", &self.crc).to_xml()
    }
}

impl Default for IpnAcknowledgement {
    fn default() -> Self {
        Self::success()
    }
}
