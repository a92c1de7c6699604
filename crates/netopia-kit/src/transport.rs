//! HTTP seam between the client and the gateway.

use http::StatusCode;
use url::Url;

#[cfg(feature = "reqwest-transport")]
pub use reqwest_transport::ReqwestTransport;

/// Raw HTTP response of a SOAP call.
///
/// Any status is a response: the body of a non-2xx reply is still parsed,
/// since the gateway reports SOAP faults with error statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Posts SOAP documents to the gateway.
pub trait SoapTransport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn post(
        &self,
        url: &Url,
        body: String,
    ) -> impl Future<Output = Result<TransportResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport {
    use http::{HeaderMap, HeaderName, HeaderValue, header::CONTENT_TYPE};
    use url::Url;

    use super::{SoapTransport, TransportResponse};

    /// [`SoapTransport`] over a `reqwest` client.
    ///
    /// Headers are held per transport and sent with every request; the
    /// default set only declares `Content-Type: application/xml`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        pub client: reqwest::Client,
        pub headers: HeaderMap,
    }

    impl Default for ReqwestTransport {
        fn default() -> Self {
            Self::new(reqwest::Client::new())
        }
    }

    impl ReqwestTransport {
        /// Wrap `client`; timeouts and proxies are configured on it.
        pub fn new(client: reqwest::Client) -> Self {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
            ReqwestTransport { client, headers }
        }

        pub fn header(mut self, key: &HeaderName, value: &HeaderValue) -> Self {
            self.headers.insert(key, value.to_owned());
            self
        }
    }

    impl SoapTransport for ReqwestTransport {
        type Error = reqwest::Error;

        async fn post(&self, url: &Url, body: String) -> Result<TransportResponse, Self::Error> {
            let response = self
                .client
                .post(url.clone())
                .headers(self.headers.clone())
                .body(body)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;

            Ok(TransportResponse { status, body })
        }
    }

}
