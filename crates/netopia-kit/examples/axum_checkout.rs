use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use netopia_kit::{
    axum::IpnResponse,
    client::{CardPayment, NetopiaClient},
    ipn::{IpnAcknowledgement, IpnRequest},
    transport::ReqwestTransport,
    types::{Billing, Params},
};

type Client = Arc<NetopiaClient<ReqwestTransport>>;

async fn checkout(State(client): State<Client>) -> Result<Html<String>, StatusCode> {
    let form = client
        .register_card(
            CardPayment::builder()
                .amount(15u32)
                .billing(
                    Billing::builder()
                        .first_name("Ana")
                        .last_name("Pop")
                        .address("Str. Exemplu 1")
                        .email("ana@example.com")
                        .phone("0700000000")
                        .description("Pro plan")
                        .build(),
                )
                .params([("userId", Some("42"))].into_iter().collect::<Params>())
                .build(),
        )
        .map_err(|err| {
            tracing::error!("Failed to build payment form: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!("Checkout for order {}", form.order_id);

    Ok(Html(form.to_html()))
}

async fn ipn(
    State(client): State<Client>,
    Form(request): Form<IpnRequest>,
) -> Result<IpnResponse, StatusCode> {
    let notification = client.parse_ipn(&request).map_err(|err| {
        tracing::warn!("Rejected IPN: {err}");
        StatusCode::BAD_REQUEST
    })?;

    if notification.success {
        tracing::info!(
            "Order {} {}: token {:?}",
            notification.order_id,
            notification.action.as_deref().unwrap_or("updated"),
            notification.token_id
        );
    } else {
        tracing::warn!(
            "Order {} declined: {} {}",
            notification.order_id,
            notification.error_code,
            notification.error_message
        );
    }

    Ok(IpnAcknowledgement::success().into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let client = Arc::new(NetopiaClient::from_env()?);

    let app = Router::new()
        .route("/checkout", get(checkout))
        .route("/ipn", post(ipn))
        .with_state(client);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
