//! Miscellaneous common types used throughout the Netopia codebase.

use serde::{Deserialize, Serialize};

/// Represents a key-value map keyed by `String`.
pub type Record<V> = std::collections::HashMap<String, V>;

/// A single name/value parameter attached to an order.
///
/// The gateway echoes order parameters back in the IPN notification, which
/// makes them the usual place to carry merchant-side references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: String,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of order parameters.
///
/// Entries without a value are dropped on construction, so optional
/// merchant fields can be passed straight through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params(pub Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Params(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Param::new(name, value));
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        Params(
            iter.into_iter()
                .filter_map(|(name, value)| value.map(|value| Param::new(name, value)))
                .collect(),
        )
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Params(params)
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
