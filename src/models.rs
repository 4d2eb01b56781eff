use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An identity resolved against the external identity provider.
///
/// `external_id` is assigned by the provider and is the only globally
/// stable reference to the account; orders carry a denormalized copy of
/// it (plus the username) so the order store stays self-describing even
/// if the provider is unreachable later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub external_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A product row as read back from the catalog store. `product_id` is
/// assigned by the store on insert; a fresh snapshot of these rows is
/// what the order synthesizer references.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl CommandStatus {
    pub const ALL: [CommandStatus; 6] = [
        CommandStatus::Pending,
        CommandStatus::Confirmed,
        CommandStatus::Processing,
        CommandStatus::Shipped,
        CommandStatus::Delivered,
        CommandStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "PENDING",
            CommandStatus::Confirmed => "CONFIRMED",
            CommandStatus::Processing => "PROCESSING",
            CommandStatus::Shipped => "SHIPPED",
            CommandStatus::Delivered => "DELIVERED",
            CommandStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    /// Terminal statuses never transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CommandStatus::Delivered | CommandStatus::Cancelled)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
