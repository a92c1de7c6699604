use std::{
    fmt::Display,
    time::{SystemTime, UNIX_EPOCH},
};

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Merchant order identifier.
///
/// Must be unique per seller account for the lifetime of the account. The
/// gateway enforces this, the SDK only generates candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generate a candidate id: base36 epoch millis followed by a base36 random suffix.
    pub fn generate() -> Self {
        let millis = epoch_millis();
        let suffix: u64 = rand::random();
        OrderId(format!("{}{}", to_base36(millis as u128), to_base36(suffix as u128)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        OrderId(value)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        OrderId(value.to_owned())
    }
}

/// Milliseconds since the Unix epoch, `0` if the clock is before it.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Billing contact type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingKind {
    #[default]
    Person,
    Company,
}

impl BillingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingKind::Person => "person",
            BillingKind::Company => "company",
        }
    }
}

/// Billing record attached to an order.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    #[builder(default)]
    pub kind: BillingKind,
    #[builder(into)]
    pub first_name: Option<String>,
    #[builder(into)]
    pub last_name: Option<String>,
    #[builder(into)]
    pub address: String,
    #[builder(into)]
    pub email: String,
    #[builder(into)]
    pub phone: String,
    /// Payment descriptor shown to the buyer.
    #[builder(into)]
    pub description: Option<String>,
    #[builder(into)]
    pub country: Option<String>,
    #[builder(into)]
    pub county: Option<String>,
    #[builder(into)]
    pub city: Option<String>,
    #[builder(into)]
    pub postal_code: Option<String>,
}
