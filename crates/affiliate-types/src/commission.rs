use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a commission, stored lowercase in the `commissions.status` column.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ToSchema,
    Hash,
    Eq,
    PartialEq,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    Pending,
    Processed,
    Paid,
    Refunded,
    Duplicate,
    Fraud,
    Canceled,
}

impl CommissionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
            Self::Duplicate => "duplicate",
            Self::Fraud => "fraud",
            Self::Canceled => "canceled",
        }
    }
}

/// The event a commission was earned on.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ToSchema,
    Hash,
    Eq,
    PartialEq,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommissionType {
    Click,
    Lead,
    Sale,
}

impl CommissionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Lead => "lead",
            Self::Sale => "sale",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_status_column_values() {
        assert_eq!(CommissionStatus::Canceled.as_ref(), "canceled");
        assert_eq!(
            CommissionStatus::from_str("processed").unwrap(),
            CommissionStatus::Processed
        );
        assert!(CommissionStatus::from_str("Processed").is_err());
        assert_eq!(CommissionStatus::iter().count(), 7);
    }

    #[test]
    fn test_as_str_matches_strum() {
        for status in CommissionStatus::iter() {
            assert_eq!(status.as_str(), status.as_ref());
        }
        for kind in CommissionType::iter() {
            assert_eq!(kind.as_str(), kind.as_ref());
        }
    }

    #[test]
    fn test_type_serde_matches_strum() {
        for kind in CommissionType::iter() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_ref()));
        }
    }
}
