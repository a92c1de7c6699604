use bon::Builder;
use netopia_core::{
    direct::{CardPaymentOrder, PaymentForm},
    ipn::{IpnNotification, IpnRequest, decode_ipn},
    soap::{
        self, Capture, Credit, LogIn, LoginSession, PaymentResult, RpcResult, SettlementRequest,
        SettlementResult, SoapOperation, TokenOrder, TokenPayment,
    },
    types::{Amount, Billing, OrderId, Params},
};
use url::Url;

#[cfg(feature = "reqwest-transport")]
use crate::transport::ReqwestTransport;
use crate::{config::NetopiaConfig, errors::ClientError, transport::SoapTransport};

/// A charge against a stored card token.
#[derive(Builder, Debug, Clone)]
pub struct TokenCharge {
    #[builder(into)]
    pub amount: Amount,
    /// Token reported by the IPN of the card registration payment.
    #[builder(into)]
    pub payment_token: String,
    #[builder(into)]
    pub description: Option<String>,
    pub billing: Option<Billing>,
    #[builder(into)]
    pub customer_ip: Option<String>,
    #[builder(default)]
    pub params: Params,
}

/// A one-shot card payment through the hosted payment page.
#[derive(Builder, Debug, Clone)]
pub struct CardPayment {
    #[builder(into)]
    pub amount: Amount,
    pub billing: Billing,
    #[builder(default)]
    pub params: Params,
}

/// Success payload of [`NetopiaClient::authorize_and_capture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPayment {
    /// Order id the authorization was made under.
    pub order_id: OrderId,
    pub authorization: PaymentResult,
    pub capture: SettlementResult,
}

/// Async client for the gateway.
///
/// Holds read-only configuration and a transport; every call is independent,
/// and session ids are never cached.
#[derive(Debug, Clone)]
pub struct NetopiaClient<T> {
    config: NetopiaConfig,
    api_url: Url,
    transport: T,
}

#[cfg(feature = "reqwest-transport")]
impl NetopiaClient<ReqwestTransport> {
    pub fn new(config: NetopiaConfig) -> Result<Self, ClientError> {
        Self::with_transport(config, ReqwestTransport::default())
    }

    /// Build a client from the process environment, see [`NetopiaConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(NetopiaConfig::from_env()?)
    }
}

impl<T: SoapTransport> NetopiaClient<T> {
    pub fn with_transport(config: NetopiaConfig, transport: T) -> Result<Self, ClientError> {
        let api_url = config.api_url()?;
        Ok(NetopiaClient {
            config,
            api_url,
            transport,
        })
    }

    pub fn config(&self) -> &NetopiaConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// SOAP endpoint the operations are posted to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Post `operation` and decode the response.
    pub async fn call<O: SoapOperation>(
        &self,
        operation: &O,
    ) -> Result<RpcResult<O::Output>, ClientError> {
        let body = soap::encode_request(operation, self.api_url.as_str())?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Calling `{}` at {}", O::NAME, self.api_url);

        let response = self
            .transport
            .post(&self.api_url, body)
            .await
            .map_err(ClientError::transport)?;

        #[cfg(feature = "tracing")]
        if !response.status.is_success() {
            tracing::warn!(
                "`{}` returned HTTP {}; parsing the body anyway",
                O::NAME,
                response.status
            );
        }

        let result = soap::decode_response::<O>(&response.body)?;

        #[cfg(feature = "tracing")]
        if let RpcResult::Fault(fault) = &result {
            tracing::debug!("`{}` faulted: {fault}", O::NAME);
        }

        Ok(result)
    }

    /// Open a session with the merchant console credentials.
    pub async fn login(&self) -> Result<RpcResult<LoginSession>, ClientError> {
        let account = &self.config.account;
        self.call(
            &LogIn::builder()
                .username(account.username.as_str())
                .password(account.password.as_str())
                .build(),
        )
        .await
    }

    /// Build the signed `doPayT` request for `charge` under a fresh order id.
    pub fn token_payment(&self, charge: TokenCharge) -> TokenPayment {
        let account = &self.config.account;
        let order = TokenOrder::builder()
            .amount(charge.amount)
            .currency(self.config.currency.as_str())
            .maybe_description(charge.description)
            .maybe_billing(charge.billing)
            .build();
        let hash = order.signature(&account.password, &account.id);

        TokenPayment::builder()
            .account_id(account.id.as_str())
            .username(account.username.as_str())
            .hash(hash)
            .confirm_url(self.config.confirm_url.as_str())
            .maybe_customer_ip(charge.customer_ip)
            .payment_token(charge.payment_token)
            .order(order)
            .params(charge.params)
            .build()
    }

    /// Charge a stored card token.
    ///
    /// On accounts with pre-authorization enabled this only authorizes, and
    /// the funds are settled later with [`NetopiaClient::capture`].
    pub async fn authorize(
        &self,
        charge: TokenCharge,
    ) -> Result<RpcResult<PaymentResult>, ClientError> {
        self.call(&self.token_payment(charge)).await
    }

    /// Same call as [`NetopiaClient::authorize`], for accounts without pre-authorization.
    pub async fn capture_without_authorization(
        &self,
        charge: TokenCharge,
    ) -> Result<RpcResult<PaymentResult>, ClientError> {
        self.authorize(charge).await
    }

    /// Settle a pre-authorized payment.
    pub async fn capture(
        &self,
        order_id: impl Into<OrderId>,
        amount: impl Into<Amount>,
    ) -> Result<RpcResult<SettlementResult>, ClientError> {
        self.settle(Capture, order_id.into(), amount.into()).await
    }

    /// Cancel a pre-authorization or refund a payment.
    ///
    /// Without an amount the gateway credits the full amount.
    pub async fn credit(
        &self,
        order_id: impl Into<OrderId>,
        amount: Option<Amount>,
    ) -> Result<RpcResult<SettlementResult>, ClientError> {
        self.settle(Credit, order_id.into(), amount.unwrap_or(Amount::ZERO))
            .await
    }

    pub async fn cancel(
        &self,
        order_id: impl Into<OrderId>,
        amount: Option<Amount>,
    ) -> Result<RpcResult<SettlementResult>, ClientError> {
        self.credit(order_id, amount).await
    }

    pub async fn refund(
        &self,
        order_id: impl Into<OrderId>,
        amount: Option<Amount>,
    ) -> Result<RpcResult<SettlementResult>, ClientError> {
        self.credit(order_id, amount).await
    }

    /// Log in, then run a settlement operation in the new session.
    ///
    /// A login fault is returned as is and the settlement call is skipped.
    async fn settle<O>(
        &self,
        operation: impl FnOnce(SettlementRequest) -> O,
        order_id: OrderId,
        amount: Amount,
    ) -> Result<RpcResult<O::Output>, ClientError>
    where
        O: SoapOperation,
    {
        let session = match self.login().await? {
            RpcResult::Success(session) => session,
            RpcResult::Fault(fault) => return Ok(RpcResult::Fault(fault)),
        };

        let request = SettlementRequest::builder()
            .session_id(session.session_id)
            .order_id(order_id)
            .amount(amount)
            .sac_id(self.config.account.id.as_str())
            .build();

        self.call(&operation(request)).await
    }

    /// Authorize a token charge, then capture it under the authorized order id.
    ///
    /// A fault from the authorization short-circuits the capture.
    pub async fn authorize_and_capture(
        &self,
        charge: TokenCharge,
    ) -> Result<RpcResult<CapturedPayment>, ClientError> {
        let amount = charge.amount;
        let payment = self.token_payment(charge);
        let requested_id = payment.order.id.clone();

        let authorization = match self.call(&payment).await? {
            RpcResult::Success(authorization) => authorization,
            RpcResult::Fault(fault) => return Ok(RpcResult::Fault(fault)),
        };

        let order_id = authorization
            .order_id
            .clone()
            .map(OrderId::from)
            .unwrap_or(requested_id);

        #[cfg(feature = "tracing")]
        tracing::debug!("Authorized order {order_id}, capturing {amount}");

        Ok(self
            .capture(order_id.clone(), amount)
            .await?
            .map(|capture| CapturedPayment {
                order_id,
                authorization,
                capture,
            }))
    }

    /// Build the sealed order for a hosted-page card payment.
    pub fn card_payment_order(&self, payment: CardPayment) -> CardPaymentOrder {
        CardPaymentOrder::builder()
            .signature(self.config.account.id.as_str())
            .return_url(self.config.return_url.as_str())
            .confirm_url(self.config.confirm_url.as_str())
            .currency(self.config.currency.as_str())
            .amount(payment.amount)
            .billing(payment.billing)
            .params(payment.params)
            .build()
    }

    /// Self-submitting payment form for the buyer's browser.
    pub fn create_payment(&self, payment: CardPayment) -> Result<PaymentForm, ClientError> {
        let order = self.card_payment_order(payment);

        #[cfg(feature = "tracing")]
        tracing::debug!("Sealing card payment order {}", order.id);

        Ok(PaymentForm::new(
            self.config.base_url.as_str(),
            &order,
            &self.config.public_key,
        )?)
    }

    pub fn create_simple_payment(&self, payment: CardPayment) -> Result<PaymentForm, ClientError> {
        self.create_payment(payment)
    }

    /// Payment form whose first payment registers the card; the IPN carries the token.
    pub fn register_card(&self, payment: CardPayment) -> Result<PaymentForm, ClientError> {
        self.create_payment(payment)
    }

    /// Decrypt and decode an IPN callback.
    pub fn parse_ipn(&self, request: &IpnRequest) -> Result<IpnNotification, ClientError> {
        let notification = decode_ipn(&self.config.private_key, request)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "IPN for order {}: action={:?}, code={}",
            notification.order_id,
            notification.action,
            notification.error_code
        );

        Ok(notification)
    }
}
