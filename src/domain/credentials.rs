use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::fmt;

/// Shared secret issued by the gateway.
///
/// Only the signing code reads the raw bytes. `Debug` is redacted; there is no
/// `Serialize` or `Display` impl.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// Merchant identity used to sign outbound requests and verify callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MerchantCredentials {
    #[serde(rename = "merchantAccount")]
    pub account: String,
    #[serde(rename = "merchantSecretKey")]
    pub secret_key: SecretKey,
}

impl MerchantCredentials {
    /// Creates credentials, rejecting an empty account or key.
    pub fn new(account: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let credentials = Self {
            account: account.into(),
            secret_key: SecretKey::new(secret_key),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<()> {
        if self.account.trim().is_empty() {
            return Err(GatewayError::InvalidConfig(
                "merchant account must not be empty".to_string(),
            ));
        }
        if self.secret_key.is_empty() {
            return Err(GatewayError::InvalidConfig(
                "merchant secret key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
