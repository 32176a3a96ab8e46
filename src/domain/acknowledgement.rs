use super::credentials::SecretKey;
use super::signature;
use serde::Serialize;

pub const ACCEPT_STATUS: &str = "accept";

/// Reply sent back to the gateway once a callback has been taken in.
///
/// Without it the gateway keeps re-delivering the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub order_reference: String,
    pub status: String,
    pub time: i64,
    pub signature: String,
}

impl Acknowledgement {
    /// Signs `orderReference;accept;time`.
    pub fn accept(order_reference: impl Into<String>, time: i64, key: &SecretKey) -> Self {
        let order_reference = order_reference.into();
        let timestamp = time.to_string();
        let signature = signature::sign(
            [order_reference.as_str(), ACCEPT_STATUS, timestamp.as_str()],
            key,
        );
        Self {
            order_reference,
            status: ACCEPT_STATUS.to_string(),
            time,
            signature,
        }
    }
}
