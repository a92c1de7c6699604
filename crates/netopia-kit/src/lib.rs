//! # Netopia Kit
//!
//! Async client SDK for the Netopia mobilPay card gateway. It covers the two
//! channels the gateway exposes:
//!
//! - the **hosted payment page**: an order document sealed with the gateway
//!   public key and posted by the buyer's browser ([`client::NetopiaClient::create_payment`]);
//! - the **`payment2` SOAP API**: token charges, captures, cancellations and
//!   refunds ([`client::NetopiaClient::authorize`] and friends).
//!
//! Payment outcomes arrive asynchronously as IPN callbacks, decoded with
//! [`client::NetopiaClient::parse_ipn`].
//!
//! ## Core Components Overview
//!
//! - **[`config`]**: seller account and gateway configuration, loadable from environment variables.
//! - **[`client`]**: the async client and its request types.
//! - **[`transport`]**: the HTTP seam, with a `reqwest` implementation.
//! - **[`crypto`]**, **[`soap`]**, **[`direct`]**, **[`ipn`]**, **[`types`]**, **[`xml`]**: re-exported
//!   from `netopia-core`.
//!
//! ## Hosted Payment Page
//!
//! ```no_run
//! use netopia_kit::{
//!     client::{CardPayment, NetopiaClient},
//!     types::{Billing, Params},
//! };
//!
//! # fn render() -> Result<(), netopia_kit::errors::ClientError> {
//! let client = NetopiaClient::from_env()?;
//!
//! let form = client.register_card(
//!     CardPayment::builder()
//!         .amount(15u32)
//!         .billing(
//!             Billing::builder()
//!                 .address("Str. Exemplu 1")
//!                 .email("ana@example.com")
//!                 .phone("0700000000")
//!                 .build(),
//!         )
//!         .params([("userId", Some("42"))].into_iter().collect::<Params>())
//!         .build(),
//! )?;
//!
//! // Serve `form.to_html()` to the buyer; the browser submits it to the gateway.
//! let html = form.to_html();
//! # let _ = html;
//! # Ok(())
//! # }
//! ```
//!
//! ## Token Payments
//!
//! ```no_run
//! use netopia_kit::{client::{NetopiaClient, TokenCharge}, soap::RpcResult};
//!
//! # async fn charge() -> Result<(), netopia_kit::errors::ClientError> {
//! let client = NetopiaClient::from_env()?;
//!
//! match client
//!     .authorize_and_capture(
//!         TokenCharge::builder()
//!             .amount(15u32)
//!             .payment_token("TOKEN-abc123")
//!             .build(),
//!     )
//!     .await?
//! {
//!     RpcResult::Success(captured) => println!("captured order {}", captured.order_id),
//!     RpcResult::Fault(fault) => println!("gateway fault {fault}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod transport;

#[cfg(feature = "axum")]
pub mod axum;

pub use netopia_core::{crypto, direct, ipn, soap, types, xml};
