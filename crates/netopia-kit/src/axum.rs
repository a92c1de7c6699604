use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use netopia_core::ipn::IpnAcknowledgement;

/// `application/xml` acknowledgement body for the IPN callback.
pub struct IpnResponse(pub IpnAcknowledgement);

impl From<IpnAcknowledgement> for IpnResponse {
    fn from(acknowledgement: IpnAcknowledgement) -> Self {
        IpnResponse(acknowledgement)
    }
}

impl IntoResponse for IpnResponse {
    fn into_response(self) -> Response {
        match self.0.to_xml() {
            Ok(body) => {
                let mut response = (StatusCode::OK, body).into_response();
                response.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static(IpnAcknowledgement::CONTENT_TYPE),
                );
                response
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Failed to render IPN acknowledgement: {err}");

                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}
