use super::credentials::MerchantCredentials;
use super::schema::field_schema;
use super::signature::{self, EmptyField, Signable};
use super::status::TransactionStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

field_schema! {
    /// Every field the gateway sends in a payment callback.
    pub enum NotificationField {
        MerchantAccount => "merchantAccount",
        OrderReference => "orderReference",
        MerchantSignature => "merchantSignature",
        Amount => "amount",
        Currency => "currency",
        AuthCode => "authCode",
        Email => "email",
        Phone => "phone",
        CreatedDate => "createdDate",
        ProcessingDate => "processingDate",
        CardPan => "cardPan",
        CardType => "cardType",
        IssuerBankCountry => "issuerBankCountry",
        IssuerBankName => "issuerBankName",
        RecToken => "recToken",
        TransactionStatus => "transactionStatus",
        Reason => "reason",
        ReasonCode => "reasonCode",
        Fee => "fee",
        PaymentSystem => "paymentSystem",
    }
}

/// Canonical signing order for payment callbacks.
pub const RESPONSE_SIGNATURE_FIELDS: [NotificationField; 7] = [
    NotificationField::MerchantAccount,
    NotificationField::OrderReference,
    NotificationField::Amount,
    NotificationField::Currency,
    NotificationField::AuthCode,
    NotificationField::TransactionStatus,
    NotificationField::ReasonCode,
];

/// Outcome of checking a callback's `merchantSignature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    Valid,
    /// The callback carried no signature.
    Missing,
    /// The callback names a different merchant account.
    AccountMismatch,
    Mismatch,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verification::Valid => "valid",
            Verification::Missing => "missing",
            Verification::AccountMismatch => "account mismatch",
            Verification::Mismatch => "mismatch",
        };
        f.write_str(label)
    }
}

/// A payment callback received from the gateway.
///
/// Only fields named by [`NotificationField`] are kept. Signature checking
/// and success classification are separate: [`verify`](Self::verify) says
/// whether the payload is authentic, [`is_successful`](Self::is_successful)
/// what it claims happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentNotification {
    fields: BTreeMap<NotificationField, String>,
}

impl PaymentNotification {
    /// Copies known, non-empty fields from a flat payload.
    ///
    /// Unknown keys are ignored and absent fields stay unset. This never fails.
    pub fn parse<I, K, V>(payload: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut fields = BTreeMap::new();
        let mut ignored = 0usize;
        for (key, value) in payload {
            let value = value.as_ref();
            match NotificationField::from_name(key.as_ref()) {
                Some(field) if !value.is_empty() => {
                    fields.insert(field, value.to_string());
                }
                Some(_) => {}
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            tracing::debug!(ignored, "ignored unknown callback fields");
        }
        Self { fields }
    }

    pub fn get(&self, field: NotificationField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn merchant_account(&self) -> Option<&str> {
        self.get(NotificationField::MerchantAccount)
    }

    pub fn order_reference(&self) -> Option<&str> {
        self.get(NotificationField::OrderReference)
    }

    pub fn merchant_signature(&self) -> Option<&str> {
        self.get(NotificationField::MerchantSignature)
    }

    pub fn amount(&self) -> Option<&str> {
        self.get(NotificationField::Amount)
    }

    pub fn currency(&self) -> Option<&str> {
        self.get(NotificationField::Currency)
    }

    pub fn auth_code(&self) -> Option<&str> {
        self.get(NotificationField::AuthCode)
    }

    pub fn reason(&self) -> Option<&str> {
        self.get(NotificationField::Reason)
    }

    pub fn reason_code(&self) -> Option<&str> {
        self.get(NotificationField::ReasonCode)
    }

    pub fn rec_token(&self) -> Option<&str> {
        self.get(NotificationField::RecToken)
    }

    pub fn transaction_status(&self) -> Option<TransactionStatus> {
        self.get(NotificationField::TransactionStatus)
            .map(TransactionStatus::parse)
    }

    /// `createdDate` as a UTC time, when it holds a Unix timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(NotificationField::CreatedDate)
    }

    /// `processingDate` as a UTC time, when it holds a Unix timestamp.
    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(NotificationField::ProcessingDate)
    }

    fn timestamp(&self, field: NotificationField) -> Option<DateTime<Utc>> {
        let seconds = self.get(field)?.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp(seconds, 0)
    }

    /// Signature the gateway should have sent for this payload.
    ///
    /// Unset fields are left out of the signed string. The configured account
    /// stands in when the payload has none.
    pub fn expected_signature(&self, credentials: &MerchantCredentials) -> String {
        let subject = SignedCallback {
            notification: self,
            account: &credentials.account,
        };
        let values =
            signature::collect_values(&subject, &RESPONSE_SIGNATURE_FIELDS, EmptyField::Skip)
                .unwrap_or_default();
        signature::sign(values, &credentials.secret_key)
    }

    /// Checks `merchantSignature` against the expected signature.
    pub fn verify(&self, credentials: &MerchantCredentials) -> Verification {
        let Some(received) = self.merchant_signature() else {
            tracing::warn!(order_reference = ?self.order_reference(), "callback has no signature");
            return Verification::Missing;
        };

        if let Some(account) = self.merchant_account()
            && account != credentials.account
        {
            tracing::warn!(
                order_reference = ?self.order_reference(),
                account,
                "callback addressed to another merchant account"
            );
            return Verification::AccountMismatch;
        }

        let expected = self.expected_signature(credentials);
        if signature::signatures_match(&expected, received) {
            Verification::Valid
        } else {
            tracing::warn!(
                order_reference = ?self.order_reference(),
                "callback signature mismatch"
            );
            Verification::Mismatch
        }
    }

    /// True iff the reported status is one of the success statuses.
    ///
    /// Says nothing about authenticity; pair it with [`verify`](Self::verify).
    pub fn is_successful(&self) -> bool {
        self.transaction_status()
            .is_some_and(|status| status.is_success())
    }
}

impl Serialize for PaymentNotification {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.name(), value)?;
        }
        map.end()
    }
}

struct SignedCallback<'a> {
    notification: &'a PaymentNotification,
    account: &'a str,
}

impl Signable<NotificationField> for SignedCallback<'_> {
    fn field_values(&self, field: NotificationField) -> Vec<Cow<'_, str>> {
        let value = match field {
            NotificationField::MerchantAccount => {
                Some(self.notification.merchant_account().unwrap_or(self.account))
            }
            other => self.notification.get(other),
        };
        value.map(Cow::Borrowed).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn credentials() -> MerchantCredentials {
        MerchantCredentials::new("merch1", "secret").unwrap()
    }

    fn approved_payload() -> HashMap<String, String> {
        [
            ("merchantAccount", "merch1"),
            ("orderReference", "55"),
            // HMAC-MD5("merch1;55;1547.36;UAH;541963;Approved;1100", "secret")
            ("merchantSignature", "fc22c5fd86bd9723ac5f22e22794c2a2"),
            ("amount", "1547.36"),
            ("currency", "UAH"),
            ("authCode", "541963"),
            ("email", "client@mail.ua"),
            ("phone", "380501234567"),
            ("createdDate", "1415379863"),
            ("processingDate", "1415379865"),
            ("cardPan", "41****8217"),
            ("cardType", "Visa"),
            ("issuerBankCountry", "980"),
            ("issuerBankName", "Privatbank"),
            ("transactionStatus", "Approved"),
            ("reason", "Ok"),
            ("reasonCode", "1100"),
            ("fee", "0"),
            ("paymentSystem", "card"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_parse_keeps_known_fields() {
        let notification = PaymentNotification::parse(&approved_payload());

        assert_eq!(notification.order_reference(), Some("55"));
        assert_eq!(notification.amount(), Some("1547.36"));
        assert_eq!(notification.auth_code(), Some("541963"));
        assert_eq!(notification.get(NotificationField::CardPan), Some("41****8217"));
        assert_eq!(
            notification.transaction_status(),
            Some(TransactionStatus::Approved)
        );
        assert_eq!(
            notification.processed_at().map(|t| t.timestamp()),
            Some(1415379865)
        );
    }

    #[test]
    fn test_parse_ignores_unknown_and_empty_fields() {
        let payload = vec![
            ("orderReference", "55"),
            ("merchantSecretKey", "attacker"),
            ("isAdmin", "1"),
            ("authCode", ""),
        ];

        let notification = PaymentNotification::parse(payload);

        assert_eq!(notification.order_reference(), Some("55"));
        assert_eq!(notification.auth_code(), None);
        assert_eq!(notification.transaction_status(), None);
        assert_eq!(notification.fields.len(), 1);
    }

    #[test]
    fn test_verified_and_successful() {
        let notification = PaymentNotification::parse(&approved_payload());

        assert_eq!(notification.verify(&credentials()), Verification::Valid);
        assert!(notification.is_successful());
    }

    #[test]
    fn test_tampered_field_fails_verification_only() {
        let mut payload = approved_payload();
        payload.insert("amount".to_string(), "1.00".to_string());
        let notification = PaymentNotification::parse(&payload);

        assert_eq!(notification.verify(&credentials()), Verification::Mismatch);
        assert!(notification.is_successful());
    }

    #[test]
    fn test_unsigned_field_change_keeps_signature_valid() {
        let mut payload = approved_payload();
        payload.insert("email".to_string(), "other@mail.ua".to_string());
        payload.insert("fee".to_string(), "15.47".to_string());
        let notification = PaymentNotification::parse(&payload);

        assert_eq!(notification.verify(&credentials()), Verification::Valid);
    }

    #[test]
    fn test_empty_signed_fields_are_skipped() {
        let payload = vec![
            ("merchantAccount", "merch1"),
            ("orderReference", "55"),
            ("amount", "1547.36"),
            ("currency", "UAH"),
            ("authCode", ""),
            ("transactionStatus", "Declined"),
            ("reasonCode", "1101"),
            // HMAC-MD5("merch1;55;1547.36;UAH;Declined;1101", "secret")
            ("merchantSignature", "4b379d4d6b41edbaa3bed4fa7e8d8ae5"),
        ];
        let notification = PaymentNotification::parse(payload);

        assert_eq!(notification.verify(&credentials()), Verification::Valid);
        assert!(!notification.is_successful());
    }

    #[test]
    fn test_signature_comparison_is_case_sensitive() {
        let mut payload = approved_payload();
        payload.insert(
            "merchantSignature".to_string(),
            "FC22C5FD86BD9723AC5F22E22794C2A2".to_string(),
        );
        let notification = PaymentNotification::parse(&payload);

        assert_eq!(notification.verify(&credentials()), Verification::Mismatch);
    }

    #[test]
    fn test_missing_signature() {
        let mut payload = approved_payload();
        payload.remove("merchantSignature");
        let notification = PaymentNotification::parse(&payload);

        assert_eq!(notification.verify(&credentials()), Verification::Missing);
    }

    #[test]
    fn test_foreign_account_is_rejected() {
        let notification = PaymentNotification::parse(&approved_payload());
        let other = MerchantCredentials::new("merch2", "secret").unwrap();

        assert_eq!(notification.verify(&other), Verification::AccountMismatch);
    }

    #[test]
    fn test_configured_account_fills_missing_payload_account() {
        let mut payload = approved_payload();
        payload.remove("merchantAccount");
        let notification = PaymentNotification::parse(&payload);

        assert_eq!(notification.verify(&credentials()), Verification::Valid);
    }

    #[test]
    fn test_success_classification() {
        let status = |value: &str| {
            PaymentNotification::parse([("transactionStatus", value)]).is_successful()
        };

        assert!(status("Approved"));
        assert!(status("InProcessing"));
        assert!(!status("Declined"));
        assert!(!status("Pending"));
        assert!(!PaymentNotification::default().is_successful());
    }
}
