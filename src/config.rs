use crate::domain::credentials::MerchantCredentials;
use crate::error::{GatewayError, Result};
use url::Url;

/// Payment page that purchase forms are posted to.
pub const DEFAULT_ENDPOINT: &str = "https://secure.wayforpay.com/pay";

/// Everything needed to talk to the gateway on behalf of one merchant.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub credentials: MerchantCredentials,
    pub endpoint: Url,
    /// Payment page language applied to orders that do not set one.
    pub language: Option<String>,
}

impl GatewayConfig {
    pub fn new(credentials: MerchantCredentials) -> Result<Self> {
        credentials.validate()?;
        Ok(Self {
            credentials,
            endpoint: parse_endpoint(DEFAULT_ENDPOINT)?,
            language: None,
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| GatewayError::InvalidConfig(format!("endpoint `{endpoint}`: {e}")))?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        scheme => Err(GatewayError::InvalidConfig(format!(
            "endpoint `{endpoint}` has unsupported scheme `{scheme}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> MerchantCredentials {
        MerchantCredentials::new("merch1", "secret").unwrap()
    }

    #[test]
    fn test_default_endpoint() {
        let config = GatewayConfig::new(credentials()).unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.language, None);
    }

    #[test]
    fn test_custom_endpoint() {
        let config = GatewayConfig::new(credentials())
            .unwrap()
            .with_endpoint("http://localhost:8080/pay")
            .unwrap();
        assert_eq!(config.endpoint.as_str(), "http://localhost:8080/pay");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = GatewayConfig::new(credentials()).unwrap();
        assert!(matches!(
            config.clone().with_endpoint("not a url"),
            Err(GatewayError::InvalidConfig(_))
        ));
        assert!(matches!(
            config.with_endpoint("ftp://secure.wayforpay.com/pay"),
            Err(GatewayError::InvalidConfig(_))
        ));
    }
}
