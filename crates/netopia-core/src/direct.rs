//! Direct card payment over the encrypted form-post channel.
//!
//! The order document is never sent in the clear: it is sealed with the
//! seller's public key into an [`Envelope`] and posted by the buyer's browser
//! to the gateway as the `env_key` / `data` form fields.

use bon::Builder;
use quick_xml::escape::escape;
use rsa::RsaPublicKey;

use crate::{
    crypto::Envelope,
    errors::Result,
    types::{Amount, Billing, OrderId, Params, epoch_millis},
    xml::XmlElement,
};

/// Card payment order sent through the payment form.
///
/// The first successful payment also registers the card, and the gateway
/// reports the resulting payment token in the IPN.
#[derive(Builder, Debug, Clone)]
pub struct CardPaymentOrder {
    #[builder(into, default = OrderId::generate())]
    pub id: OrderId,
    /// Milliseconds since the Unix epoch.
    #[builder(default = epoch_millis())]
    pub timestamp: u64,
    /// Seller account identifier.
    #[builder(into)]
    pub signature: String,
    #[builder(into)]
    pub return_url: String,
    #[builder(into)]
    pub confirm_url: String,
    #[builder(into)]
    pub currency: String,
    #[builder(into)]
    pub amount: Amount,
    pub billing: Billing,
    #[builder(default)]
    pub params: Params,
}

impl CardPaymentOrder {
    pub fn to_document(&self) -> XmlElement {
        let billing = &self.billing;
        let contact = XmlElement::new("billing")
            .with_attr("type", billing.kind.as_str())
            .with_optional_leaf("first_name", billing.first_name.as_deref())
            .with_optional_leaf("last_name", billing.last_name.as_deref())
            .with_child(XmlElement::leaf("address", &billing.address))
            .with_child(XmlElement::leaf("email", &billing.email))
            .with_child(XmlElement::leaf("mobile_phone", &billing.phone));

        let invoice = XmlElement::new("invoice")
            .with_attr("currency", &self.currency)
            .with_attr("amount", self.amount.to_string())
            .with_optional_leaf("details", billing.description.as_deref())
            .with_child(XmlElement::new("contact_info").with_child(contact));

        let mut order = XmlElement::new("order")
            .with_attr("id", self.id.as_str())
            .with_attr("timestamp", self.timestamp.to_string())
            .with_attr("type", "card")
            .with_child(XmlElement::leaf("signature", &self.signature))
            .with_child(
                XmlElement::new("url")
                    .with_child(XmlElement::leaf("return", &self.return_url))
                    .with_child(XmlElement::leaf("confirm", &self.confirm_url)),
            )
            .with_child(invoice);

        if !self.params.is_empty() {
            order = order.with_child(XmlElement::new("params").with_children(
                self.params.iter().map(|param| {
                    XmlElement::new("param")
                        .with_child(XmlElement::leaf("name", &param.name))
                        .with_child(XmlElement::leaf("value", &param.value))
                }),
            ));
        }

        order
    }

    /// Serialize and seal the order for the gateway.
    pub fn seal(&self, public_key: &RsaPublicKey) -> Result<Envelope> {
        Envelope::seal(public_key, self.to_document().to_xml()?)
    }
}

/// Self-submitting payment form handed to the buyer's browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentForm {
    /// Gateway URL the form posts to.
    pub action: String,
    pub order_id: OrderId,
    pub envelope: Envelope,
}

impl PaymentForm {
    pub const FORM_ID: &'static str = "paymentForm";

    /// Build the sealed form for `order`.
    pub fn new(
        action: impl Into<String>,
        order: &CardPaymentOrder,
        public_key: &RsaPublicKey,
    ) -> Result<Self> {
        Ok(PaymentForm {
            action: action.into(),
            order_id: order.id.clone(),
            envelope: order.seal(public_key)?,
        })
    }

    /// HTML fragment with hidden `env_key` / `data` inputs and an auto-submit script.
    pub fn to_html(&self) -> String {
        format!(
            r#"<form id="{id}" method="post" action="{action}">
  <input type="hidden" name="env_key" value="{env_key}"/>
  <input type="hidden" name="data" value="{data}"/>
  <script type="text/javascript">document.getElementById("{id}").submit();</script>
</form>"#,
            id = Self::FORM_ID,
            action = escape(self.action.as_str()),
            env_key = escape(self.envelope.env_key.as_str()),
            data = escape(self.envelope.env_data.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use rsa::RsaPrivateKey;
    use rust_decimal_macros::dec;

    use crate::{
        crypto::{private_key_from_pem, public_key_from_pem},
        types::{BillingKind, Param},
        xml,
    };

    use super::*;

    fn keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
        static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
        KEYS.get_or_init(|| {
            (
                private_key_from_pem(include_str!(
                    "../tests/fixtures/seller_private_pkcs8.pem"
                ))
                .unwrap(),
                public_key_from_pem(include_str!("../tests/fixtures/seller_certificate.pem"))
                    .unwrap(),
            )
        })
    }

    fn order() -> CardPaymentOrder {
        CardPaymentOrder::builder()
            .id("lx2k9a1b3c")
            .timestamp(1_717_171_717_000)
            .signature("SAC001")
            .return_url("https://shop.example/return")
            .confirm_url("https://shop.example/ipn")
            .currency("RON")
            .amount(Amount::new(dec!(15.50)))
            .billing(
                Billing::builder()
                    .kind(BillingKind::Company)
                    .address("Str. Exemplu 1")
                    .email("billing@example.com")
                    .phone("0700000000")
                    .description("Subscription & setup")
                    .build(),
            )
            .params(Params(vec![Param::new("userId", "42")]))
            .build()
    }

    #[test]
    fn test_order_document() {
        let document = order().to_document();

        assert_eq!(document.name, "order");
        assert_eq!(document.attribute("id"), Some("lx2k9a1b3c"));
        assert_eq!(document.attribute("timestamp"), Some("1717171717000"));
        assert_eq!(document.attribute("type"), Some("card"));
        assert_eq!(document.child_text("signature"), Some("SAC001"));
        assert_eq!(
            document
                .path(&["url", "confirm"])
                .map(XmlElement::text_content),
            Some("https://shop.example/ipn")
        );

        let invoice = document.require(&["invoice"]).unwrap();
        assert_eq!(invoice.attribute("currency"), Some("RON"));
        assert_eq!(invoice.attribute("amount"), Some("15.5"));
        assert_eq!(invoice.child_text("details"), Some("Subscription & setup"));

        let billing = invoice.require(&["contact_info", "billing"]).unwrap();
        assert_eq!(billing.attribute("type"), Some("company"));
        assert!(billing.find("first_name").is_none());
        assert_eq!(billing.child_text("mobile_phone"), Some("0700000000"));

        let param = document.require(&["params", "param"]).unwrap();
        assert_eq!(param.child_text("name"), Some("userId"));
        assert_eq!(param.child_text("value"), Some("42"));
    }

    #[test]
    fn test_no_params_block_when_empty() {
        let mut order = order();
        order.params = Params::new();

        assert!(order.to_document().find("params").is_none());
    }

    #[test]
    fn test_form_carries_sealed_order() {
        let (private_key, public_key) = keypair();
        let order = order();

        let form = PaymentForm::new("http://sandboxsecure.mobilpay.ro", &order, public_key).unwrap();
        let html = form.to_html();

        assert!(html.contains(r#"action="http://sandboxsecure.mobilpay.ro""#));
        assert!(html.contains(&format!(r#"name="env_key" value="{}""#, form.envelope.env_key)));
        assert!(html.contains(&format!(r#"name="data" value="{}""#, form.envelope.env_data)));
        assert!(html.contains(r#"document.getElementById("paymentForm").submit();"#));

        let opened = xml::parse(&form.envelope.open(private_key).unwrap()).unwrap();
        assert_eq!(opened, order.to_document());
        assert_eq!(form.order_id, order.id);
    }

    #[test]
    fn test_form_escapes_action() {
        let form = PaymentForm {
            action: r#"https://x.example/?a=1&b="2""#.to_owned(),
            order_id: OrderId::from("o"),
            envelope: Envelope {
                env_key: "k".to_owned(),
                env_data: "d".to_owned(),
            },
        };

        assert!(
            form.to_html()
                .contains(r#"action="https://x.example/?a=1&amp;b=&quot;2&quot;""#)
        );
    }
}
