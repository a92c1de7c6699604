//! SOAP wire envelope for the gateway's `payment2` API.
//!
//! Every call is wrapped the same way:
//!
//! ```text
//! Envelope[xmlns=http://schemas.xmlsoap.org/soap/envelope/]
//!   Body
//!     <operation>[xmlns=<api namespace>]
//!       request[xmlns=""]
//! ```
//!
//! and every response is either a `Body/Fault` or a
//! `Body/<operation>Response/<operation>Result` node. [`decode_response`]
//! folds both into one [`RpcResult`].

mod operations;

pub use operations::*;

use crate::{
    errors::{Error, Result},
    xml::{self, XmlElement},
};

/// Namespace of the SOAP 1.1 envelope.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Path of the SOAP endpoint relative to the gateway base URL.
pub const PAYMENT_API_PATH: &str = "api/payment2/";

/// A SOAP operation of the `payment2` API.
pub trait SoapOperation {
    /// Operation element name, e.g. `logIn`.
    const NAME: &'static str;
    /// Payload of a successful response.
    type Output;

    /// Children of the `request` element.
    fn request_fields(&self) -> Vec<XmlElement>;

    /// Read the payload from the `<operation>Result` element.
    fn parse_result(result: &XmlElement) -> Result<Self::Output>;
}

/// Structured error reported by the gateway inside a well-formed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
}

impl SoapFault {
    /// Read a SOAP 1.1 (`faultcode`/`faultstring`) or 1.2 (`Code`/`Reason`) fault.
    pub fn from_element(fault: &XmlElement) -> Self {
        let code = fault
            .child_text("faultcode")
            .or_else(|| fault.path(&["Code", "Value"]).map(XmlElement::text_content))
            .unwrap_or_default();
        let message = fault
            .child_text("faultstring")
            .or_else(|| fault.path(&["Reason", "Text"]).map(XmlElement::text_content))
            .unwrap_or_default();

        SoapFault {
            code: code.to_owned(),
            message: message.to_owned(),
        }
    }
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Outcome of a SOAP call that produced a parseable response.
///
/// A fault is data, not an error: callers must match on it before touching
/// the operation payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResult<T> {
    Fault(SoapFault),
    Success(T),
}

impl<T> RpcResult<T> {
    pub fn success(value: T) -> Self {
        RpcResult::Success(value)
    }

    pub fn fault(fault: SoapFault) -> Self {
        RpcResult::Fault(fault)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RpcResult::Success(_))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, RpcResult::Fault(_))
    }

    pub fn as_success(&self) -> Option<&T> {
        match self {
            RpcResult::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_fault(&self) -> Option<&SoapFault> {
        match self {
            RpcResult::Fault(f) => Some(f),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RpcResult<U> {
        match self {
            RpcResult::Success(v) => RpcResult::Success(f(v)),
            RpcResult::Fault(fault) => RpcResult::Fault(fault),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, SoapFault> {
        match self {
            RpcResult::Success(v) => Ok(v),
            RpcResult::Fault(fault) => Err(fault),
        }
    }
}

/// Wrap `operation` in a SOAP envelope under the API `namespace`.
pub fn envelope<O: SoapOperation>(operation: &O, namespace: &str) -> XmlElement {
    let request = XmlElement::new("request")
        .with_attr("xmlns", "")
        .with_children(operation.request_fields());

    XmlElement::new("Envelope")
        .with_attr("xmlns", SOAP_ENVELOPE_NS)
        .with_child(
            XmlElement::new("Body").with_child(
                XmlElement::new(O::NAME)
                    .with_attr("xmlns", namespace)
                    .with_child(request),
            ),
        )
}

/// Serialize the request document for `operation`.
pub fn encode_request<O: SoapOperation>(operation: &O, namespace: &str) -> Result<String> {
    envelope(operation, namespace).to_xml()
}

/// Parse a response document for operation `O`.
///
/// A `Fault` node always wins: its presence yields [`RpcResult::Fault`]
/// regardless of anything else in the body.
pub fn decode_response<O: SoapOperation>(response: &str) -> Result<RpcResult<O::Output>> {
    let document = xml::parse(response)?;
    if document.name != "Envelope" {
        return Err(Error::UnexpectedXml("Envelope".to_owned()));
    }

    let body = document.require(&["Body"])?;
    if let Some(fault) = body.find("Fault") {
        return Ok(RpcResult::Fault(SoapFault::from_element(fault)));
    }

    let response_name = format!("{}Response", O::NAME);
    let result_name = format!("{}Result", O::NAME);
    let result = body.require(&[response_name.as_str(), result_name.as_str()])?;

    O::parse_result(result).map(RpcResult::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACE: &str = "http://sandboxsecure.mobilpay.ro/api/payment2/";

    #[test]
    fn test_envelope_shape() {
        let login = LogIn::builder().username("merchant").password("pw").build();

        let document = envelope(&login, NAMESPACE);

        assert_eq!(document.name, "Envelope");
        assert_eq!(document.attribute("xmlns"), Some(SOAP_ENVELOPE_NS));
        let operation = document.require(&["Body", "logIn"]).unwrap();
        assert_eq!(operation.attribute("xmlns"), Some(NAMESPACE));
        let request = operation.require(&["request"]).unwrap();
        assert_eq!(request.attribute("xmlns"), Some(""));
        assert_eq!(request.child_text("username"), Some("merchant"));
        assert_eq!(request.child_text("password"), Some("pw"));
    }

    #[test]
    fn test_encoded_request_round_trips() {
        let login = LogIn::builder().username("merchant").password("p&w").build();

        let xml = encode_request(&login, NAMESPACE).unwrap();
        let parsed = xml::parse(&xml).unwrap();

        assert_eq!(
            parsed
                .path(&["Body", "logIn", "request", "password"])
                .map(XmlElement::text_content),
            Some("p&w")
        );
    }

    #[test]
    fn test_fault_wins_over_payload() {
        let response = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <SOAP-ENV:Fault>
      <faultcode>SOAP-ENV:Server</faultcode>
      <faultstring>Invalid credentials</faultstring>
    </SOAP-ENV:Fault>
    <ns1:logInResponse xmlns:ns1="urn:x">
      <logInResult><id>should-not-be-read</id></logInResult>
    </ns1:logInResponse>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

        let result = decode_response::<LogIn>(response).unwrap();

        assert_eq!(
            result,
            RpcResult::Fault(SoapFault {
                code: "SOAP-ENV:Server".to_owned(),
                message: "Invalid credentials".to_owned(),
            })
        );
        assert!(result.as_success().is_none());
    }

    #[test]
    fn test_soap12_fault() {
        let response = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <env:Fault>
      <env:Code><env:Value>env:Sender</env:Value></env:Code>
      <env:Reason><env:Text xml:lang="en">Bad token</env:Text></env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#;

        let fault = decode_response::<LogIn>(response)
            .unwrap()
            .into_result()
            .unwrap_err();

        assert_eq!(fault.code, "env:Sender");
        assert_eq!(fault.message, "Bad token");
        assert_eq!(fault.to_string(), "env:Sender: Bad token");
    }

    #[test]
    fn test_missing_result_is_unexpected_xml() {
        let response = r#"<Envelope><Body><somethingElse/></Body></Envelope>"#;

        assert!(matches!(
            decode_response::<LogIn>(response),
            Err(Error::UnexpectedXml(path)) if path == "Body/logInResponse/logInResult"
        ));
        assert!(matches!(
            decode_response::<LogIn>("<html><body>502</body></html>"),
            Err(Error::UnexpectedXml(_))
        ));
        assert!(matches!(
            decode_response::<LogIn>("Bad Gateway"),
            Err(Error::XmlParse(_))
        ));
    }

    #[test]
    fn test_rpc_result_map() {
        let success: RpcResult<u32> = RpcResult::success(2);
        assert_eq!(success.map(|v| v * 2), RpcResult::Success(4));

        let fault: RpcResult<u32> = RpcResult::fault(SoapFault {
            code: "c".to_owned(),
            message: "m".to_owned(),
        });
        assert!(fault.map(|v| v * 2).is_fault());
    }
}
