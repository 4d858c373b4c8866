//! Transaction record and its closed enumerations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of an inventory movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Goods arriving at the site
    Inbound,
    /// Goods being retrieved by a robot
    Pickup,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Inbound, TransactionType::Pickup];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Inbound => "Inbound",
            TransactionType::Pickup => "Pickup",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inbound" => Ok(TransactionType::Inbound),
            "pickup" => Ok(TransactionType::Pickup),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 3] = [
        TransactionStatus::Completed,
        TransactionStatus::Pending,
        TransactionStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failed => "Failed",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(TransactionStatus::Completed),
            "pending" => Ok(TransactionStatus::Pending),
            "failed" => Ok(TransactionStatus::Failed),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Warehouse site code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "DHL_Mumbai")]
    DhlMumbai,
    #[serde(rename = "DHL_HSR")]
    DhlHsr,
    #[serde(rename = "DHL_Kochi")]
    DhlKochi,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::DhlMumbai, Location::DhlHsr, Location::DhlKochi];

    /// Site code as stored on the record
    pub fn code(&self) -> &'static str {
        match self {
            Location::DhlMumbai => "DHL_Mumbai",
            Location::DhlHsr => "DHL_HSR",
            Location::DhlKochi => "DHL_Kochi",
        }
    }

    /// Human-readable label for selectors
    pub fn label(&self) -> &'static str {
        match self {
            Location::DhlMumbai => "DHL Mumbai",
            Location::DhlHsr => "DHL HSR",
            Location::DhlKochi => "DHL Kochi",
        }
    }
}

impl std::str::FromStr for Location {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .iter()
            .find(|l| l.code().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Invalid location: {}", s))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single robot-driven inventory movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier, `TXN-000001` style
    pub id: String,
    pub item_id: String,
    pub tray_id: String,
    pub created_at: DateTime<Utc>,
    /// Never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
    /// Always positive
    pub quantity: u32,
    pub username: String,
    pub transaction_type: TransactionType,
    pub robot_id: String,
    pub location_name: Location,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Case-insensitive substring match against item or tray id.
    /// `needle` must already be lowercased.
    pub fn matches_identifier(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.item_id.to_lowercase().contains(needle)
            || self.tray_id.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Transaction {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        Transaction {
            id: "TXN-000001".to_string(),
            item_id: "ITEM-500".to_string(),
            tray_id: "TRAY-42".to_string(),
            created_at: at,
            updated_at: at,
            quantity: 3,
            username: "John Doe".to_string(),
            transaction_type: TransactionType::Inbound,
            robot_id: "ROBOT-1".to_string(),
            location_name: Location::DhlHsr,
            status: TransactionStatus::Pending,
        }
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("pickup".parse::<TransactionType>(), Ok(TransactionType::Pickup));
        assert_eq!("FAILED".parse::<TransactionStatus>(), Ok(TransactionStatus::Failed));
        assert_eq!("dhl_kochi".parse::<Location>(), Ok(Location::DhlKochi));
        assert!("all".parse::<Location>().is_err());
    }

    #[test]
    fn test_location_display_uses_site_code() {
        assert_eq!(Location::DhlMumbai.to_string(), "DHL_Mumbai");
        assert_eq!(Location::DhlMumbai.label(), "DHL Mumbai");
    }

    #[test]
    fn test_matches_identifier() {
        let tx = sample();
        assert!(tx.matches_identifier("item-5"));
        assert!(tx.matches_identifier("tray-4"));
        assert!(tx.matches_identifier(""));
        assert!(!tx.matches_identifier("robot"));
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["itemId"], "ITEM-500");
        assert_eq!(json["transactionType"], "Inbound");
        assert_eq!(json["locationName"], "DHL_HSR");
        assert_eq!(json["status"], "Pending");
    }
}
