use bon::Builder;

use crate::{
    crypto,
    errors::Result,
    soap::SoapOperation,
    types::{Amount, Billing, OrderId, Params},
    xml::XmlElement,
};

/// Location defaults applied to token-payment billing records.
const DEFAULT_COUNTRY: &str = "Romania";
const DEFAULT_COUNTY: &str = "Bucharest";
const DEFAULT_CITY: &str = "Bucharest";
const DEFAULT_POSTAL_CODE: &str = "000000";

/// `logIn`: open an API session with the merchant console credentials.
#[derive(Builder, Debug, Clone)]
pub struct LogIn {
    #[builder(into)]
    pub username: String,
    #[builder(into)]
    pub password: String,
}

/// Session opened by [`LogIn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub session_id: String,
}

impl SoapOperation for LogIn {
    const NAME: &'static str = "logIn";
    type Output = LoginSession;

    fn request_fields(&self) -> Vec<XmlElement> {
        vec![
            XmlElement::leaf("username", &self.username),
            XmlElement::leaf("password", &self.password),
        ]
    }

    fn parse_result(result: &XmlElement) -> Result<Self::Output> {
        Ok(LoginSession {
            session_id: result.require(&["id"])?.text_content().to_owned(),
        })
    }
}

/// Order block of a token payment.
#[derive(Builder, Debug, Clone)]
pub struct TokenOrder {
    #[builder(into, default = OrderId::generate())]
    pub id: OrderId,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(into)]
    pub amount: Amount,
    #[builder(into)]
    pub currency: String,
    pub billing: Option<Billing>,
}

impl TokenOrder {
    /// Request hash over this order for the given account.
    pub fn signature(&self, account_password: &str, account_id: &str) -> String {
        crypto::sign(
            self.id.as_str(),
            &self.amount.to_string(),
            &self.currency,
            account_password,
            account_id,
        )
    }

    fn to_element(&self) -> XmlElement {
        let order = XmlElement::new("order")
            .with_child(XmlElement::leaf("id", self.id.as_str()))
            .with_optional_leaf("description", self.description.as_deref())
            .with_child(XmlElement::leaf("amount", self.amount.to_string()))
            .with_child(XmlElement::leaf("currency", &self.currency));

        match &self.billing {
            Some(billing) => order.with_child(token_billing(billing)),
            None => order,
        }
    }
}

fn token_billing(billing: &Billing) -> XmlElement {
    XmlElement::new("billing")
        .with_child(XmlElement::leaf(
            "country",
            billing.country.as_deref().unwrap_or(DEFAULT_COUNTRY),
        ))
        .with_child(XmlElement::leaf(
            "county",
            billing.county.as_deref().unwrap_or(DEFAULT_COUNTY),
        ))
        .with_child(XmlElement::leaf(
            "city",
            billing.city.as_deref().unwrap_or(DEFAULT_CITY),
        ))
        .with_child(XmlElement::leaf(
            "postal_code",
            billing.postal_code.as_deref().unwrap_or(DEFAULT_POSTAL_CODE),
        ))
        .with_child(XmlElement::leaf("phone", &billing.phone))
        .with_optional_leaf("first_name", billing.first_name.as_deref())
        .with_optional_leaf("last_name", billing.last_name.as_deref())
        .with_child(XmlElement::leaf("address", &billing.address))
        .with_child(XmlElement::leaf("email", &billing.email))
}

/// `doPayT`: charge (or pre-authorize) a previously issued payment token.
///
/// Whether the call captures immediately depends on the seller account's
/// pre-authorization setting.
#[derive(Builder, Debug, Clone)]
pub struct TokenPayment {
    /// Seller account identifier.
    #[builder(into)]
    pub account_id: String,
    #[builder(into)]
    pub username: String,
    /// Request hash, see [`TokenOrder::signature`].
    #[builder(into)]
    pub hash: String,
    #[builder(into)]
    pub confirm_url: Option<String>,
    /// IP address of the buyer.
    #[builder(into)]
    pub customer_ip: Option<String>,
    #[builder(into)]
    pub payment_token: String,
    pub order: TokenOrder,
    #[builder(default)]
    pub params: Params,
}

/// Error block carried inside a successful response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub code: String,
    pub message: String,
}

impl GatewayError {
    fn from_element(element: &XmlElement) -> Option<Self> {
        let errors = element.find("errors")?;
        Some(GatewayError {
            code: errors.child_text("code").unwrap_or_default().to_owned(),
            message: errors.child_text("message").unwrap_or_default().to_owned(),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.code == "0"
    }
}

/// Payload of a `doPayT` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResult {
    pub order_id: Option<String>,
    pub errors: Option<GatewayError>,
    /// The whole `doPayTResult` element.
    pub document: XmlElement,
}

impl PaymentResult {
    /// `true` unless the result carries a non-zero error code.
    pub fn is_approved(&self) -> bool {
        self.errors.as_ref().is_none_or(GatewayError::is_ok)
    }
}

impl SoapOperation for TokenPayment {
    const NAME: &'static str = "doPayT";
    type Output = PaymentResult;

    fn request_fields(&self) -> Vec<XmlElement> {
        let account = XmlElement::new("account")
            .with_child(XmlElement::leaf("id", &self.account_id))
            .with_child(XmlElement::leaf("user_name", &self.username))
            .with_optional_leaf("customer_ip", self.customer_ip.as_deref())
            .with_child(XmlElement::leaf("hash", &self.hash))
            .with_optional_leaf("confirm_url", self.confirm_url.as_deref());

        let transaction = XmlElement::new("transaction")
            .with_child(XmlElement::leaf("paymentToken", &self.payment_token));

        let params = XmlElement::new("params").with_children(self.params.iter().map(|param| {
            XmlElement::new("item")
                .with_child(XmlElement::leaf("name", &param.name))
                .with_child(XmlElement::leaf("value", &param.value))
        }));

        vec![account, transaction, self.order.to_element(), params]
    }

    fn parse_result(result: &XmlElement) -> Result<Self::Output> {
        Ok(PaymentResult {
            order_id: result
                .path(&["order", "id"])
                .map(|id| id.text_content().to_owned()),
            errors: GatewayError::from_element(result),
            document: result.clone(),
        })
    }
}

/// Fields shared by the session-authenticated settlement calls.
#[derive(Builder, Debug, Clone)]
pub struct SettlementRequest {
    #[builder(into)]
    pub session_id: String,
    #[builder(into)]
    pub order_id: OrderId,
    #[builder(into)]
    pub amount: Amount,
    /// Seller account identifier.
    #[builder(into)]
    pub sac_id: String,
}

impl SettlementRequest {
    fn fields(&self) -> Vec<XmlElement> {
        vec![
            XmlElement::leaf("sessionId", &self.session_id),
            XmlElement::leaf("orderId", self.order_id.as_str()),
            XmlElement::leaf("amount", self.amount.to_string()),
            XmlElement::leaf("sacId", &self.sac_id),
        ]
    }
}

/// Payload of a `capture` or `credit` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementResult {
    pub code: Option<String>,
    pub message: Option<String>,
    /// The whole `<operation>Result` element.
    pub document: XmlElement,
}

impl SettlementResult {
    fn from_element(result: &XmlElement) -> Self {
        let code = result
            .child_text("code")
            .or_else(|| result.path(&["errors", "code"]).map(XmlElement::text_content));
        let message = result
            .child_text("message")
            .or_else(|| result.path(&["errors", "message"]).map(XmlElement::text_content));

        SettlementResult {
            code: code.map(str::to_owned),
            message: message.map(str::to_owned),
            document: result.clone(),
        }
    }

    /// `true` unless the result carries a non-zero code.
    pub fn is_ok(&self) -> bool {
        self.code.as_deref().is_none_or(|code| code == "0")
    }
}

/// `capture`: settle a pre-authorized token payment.
#[derive(Debug, Clone)]
pub struct Capture(pub SettlementRequest);

impl SoapOperation for Capture {
    const NAME: &'static str = "capture";
    type Output = SettlementResult;

    fn request_fields(&self) -> Vec<XmlElement> {
        self.0.fields()
    }

    fn parse_result(result: &XmlElement) -> Result<Self::Output> {
        Ok(SettlementResult::from_element(result))
    }
}

/// `credit`: cancel a pre-authorization or refund a captured payment.
///
/// An amount of `0` asks the gateway for the full amount.
#[derive(Debug, Clone)]
pub struct Credit(pub SettlementRequest);

impl SoapOperation for Credit {
    const NAME: &'static str = "credit";
    type Output = SettlementResult;

    fn request_fields(&self) -> Vec<XmlElement> {
        self.0.fields()
    }

    fn parse_result(result: &XmlElement) -> Result<Self::Output> {
        Ok(SettlementResult::from_element(result))
    }
}
