use crate::config::GatewayConfig;
use crate::domain::acknowledgement::Acknowledgement;
use crate::domain::fields::FieldMap;
use crate::domain::notification::{PaymentNotification, Verification};
use crate::domain::order::{DescriptiveField, Order};
use crate::domain::ports::Clock;
use crate::domain::purchase::PurchaseRequest;
use crate::error::Result;
use crate::infrastructure::clock::SystemClock;
use serde::Serialize;
use url::Url;

/// A signed purchase, ready to be rendered as a form posting to `endpoint`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseForm {
    pub endpoint: Url,
    pub fields: FieldMap,
}

/// What the merchant learns from one callback.
///
/// `successful` reflects the reported status only. `trusted` additionally
/// requires a valid signature and is what callers should act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackOutcome {
    pub notification: PaymentNotification,
    pub verification: Verification,
    pub successful: bool,
    pub trusted: bool,
}

/// The merchant-side entry point to the gateway.
///
/// `Gateway` signs outbound purchases and checks inbound callbacks for a
/// single merchant configuration. It holds no mutable state, so one instance
/// can serve any number of requests; several instances with different
/// credentials can live side by side.
pub struct Gateway<C: Clock = SystemClock> {
    config: GatewayConfig,
    clock: C,
}

impl Gateway {
    /// Creates a `Gateway` that reads the system clock.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Gateway<C> {
    pub fn with_clock(config: GatewayConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Signs `order` and returns the form to submit to the payment page.
    ///
    /// The configured language is applied when the order has none. Any
    /// missing signed field aborts with `MissingRequiredField`.
    pub fn purchase(&self, mut order: Order) -> Result<PurchaseForm> {
        if let Some(language) = &self.config.language
            && order.detail(DescriptiveField::Language).is_none()
        {
            order.set_detail(DescriptiveField::Language, language.clone());
        }

        let mut request = PurchaseRequest::new(&self.config.credentials, order);
        let fields = request.build(&self.clock)?;

        tracing::info!(
            order_reference = %request.order().reference,
            "purchase form prepared"
        );
        Ok(PurchaseForm {
            endpoint: self.config.endpoint.clone(),
            fields,
        })
    }

    /// Parses and classifies one callback payload.
    ///
    /// Never fails: a bad signature or an unknown status is reported in the
    /// outcome, not as an error.
    pub fn receive<I, K, V>(&self, payload: I) -> CallbackOutcome
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let notification = PaymentNotification::parse(payload);
        let verification = notification.verify(&self.config.credentials);
        let successful = notification.is_successful();
        let trusted = verification.is_valid() && successful;

        tracing::info!(
            order_reference = ?notification.order_reference(),
            status = ?notification.transaction_status().map(|s| s.to_string()),
            %verification,
            successful,
            "callback received"
        );
        CallbackOutcome {
            notification,
            verification,
            successful,
            trusted,
        }
    }

    /// Builds the `accept` reply for a callback.
    ///
    /// Returns `None` when the callback carries no order reference.
    pub fn acknowledge(&self, notification: &PaymentNotification) -> Option<Acknowledgement> {
        let order_reference = notification.order_reference()?;
        Some(Acknowledgement::accept(
            order_reference,
            self.clock.now(),
            &self.config.credentials.secret_key,
        ))
    }
}
