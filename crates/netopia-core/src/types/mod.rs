//! Core types shared by the SOAP operations, the direct payment builder and IPN decoding.

mod amount;
mod common;
mod order;

pub use amount::*;
pub use common::*;
pub use order::*;
