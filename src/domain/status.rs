use serde::{Serialize, Serializer};
use std::fmt;

/// Transaction status as reported by the gateway.
///
/// Statuses the gateway may add later parse into `Other` and are never
/// treated as successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    InProcessing,
    WaitingAuthComplete,
    Approved,
    Pending,
    Expired,
    Refunded,
    Voided,
    Declined,
    RefundInProcessing,
    Other(String),
}

impl TransactionStatus {
    /// Statuses that count as a successful payment.
    pub const SUCCESS: [TransactionStatus; 2] =
        [TransactionStatus::InProcessing, TransactionStatus::Approved];

    pub fn parse(value: &str) -> Self {
        match value {
            "InProcessing" => Self::InProcessing,
            "WaitingAuthComplete" => Self::WaitingAuthComplete,
            "Approved" => Self::Approved,
            "Pending" => Self::Pending,
            "Expired" => Self::Expired,
            "Refunded" => Self::Refunded,
            "Voided" => Self::Voided,
            "Declined" => Self::Declined,
            "RefundInProcessing" => Self::RefundInProcessing,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InProcessing => "InProcessing",
            Self::WaitingAuthComplete => "WaitingAuthComplete",
            Self::Approved => "Approved",
            Self::Pending => "Pending",
            Self::Expired => "Expired",
            Self::Refunded => "Refunded",
            Self::Voided => "Voided",
            Self::Declined => "Declined",
            Self::RefundInProcessing => "RefundInProcessing",
            Self::Other(value) => value,
        }
    }

    pub fn is_success(&self) -> bool {
        Self::SUCCESS.contains(self)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_set() {
        assert!(TransactionStatus::parse("Approved").is_success());
        assert!(TransactionStatus::parse("InProcessing").is_success());
        assert!(!TransactionStatus::parse("Declined").is_success());
        assert!(!TransactionStatus::parse("WaitingAuthComplete").is_success());
        assert!(!TransactionStatus::parse("Refunded").is_success());
    }

    #[test]
    fn test_unknown_status_is_not_success() {
        let status = TransactionStatus::parse("SettledSomehow");
        assert_eq!(status, TransactionStatus::Other("SettledSomehow".to_string()));
        assert!(!status.is_success());
    }

    #[test]
    fn test_status_match_is_case_sensitive() {
        assert!(!TransactionStatus::parse("approved").is_success());
        assert!(!TransactionStatus::parse("APPROVED").is_success());
    }
}
