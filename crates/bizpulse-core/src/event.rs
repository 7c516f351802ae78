use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Interaction kinds a visitor can take against a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Call,
    Whatsapp,
    Share,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 4] = [
        InteractionKind::View,
        InteractionKind::Call,
        InteractionKind::Whatsapp,
        InteractionKind::Share,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::View => "view",
            InteractionKind::Call => "call",
            InteractionKind::Whatsapp => "whatsapp",
            InteractionKind::Share => "share",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "view" => Some(InteractionKind::View),
            "call" => Some(InteractionKind::Call),
            "whatsapp" => Some(InteractionKind::Whatsapp),
            "share" => Some(InteractionKind::Share),
            _ => None,
        }
    }
}

/// Payment methods a directory listing can advertise. A listing may carry
/// several at once; distribution counting fans out over all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Wallet,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::Wallet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Wallet => "wallet",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Wallet => "Wallet",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "upi" => Some(PaymentMethod::Upi),
            "wallet" => Some(PaymentMethod::Wallet),
            _ => None,
        }
    }

    /// Parse the stored JSON-array form, e.g. `["cash","upi"]`.
    ///
    /// Listings are operator-entered reference data, so parsing is lenient:
    /// malformed JSON or unknown method names are skipped, never an error.
    pub fn parse_list(raw: &str) -> Vec<PaymentMethod> {
        let names: Vec<String> = serde_json::from_str(raw).unwrap_or_default();
        names.iter().filter_map(|n| PaymentMethod::parse(n)).collect()
    }
}

/// One page view, appended on every console-tracked visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitEvent {
    pub id: String,
    pub device_id: String,
    pub user_name: Option<String>,
    pub page_path: String,
    pub visited_at: DateTime<Utc>,
}

/// One visitor action against a directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub id: String,
    pub business_id: String,
    pub kind: InteractionKind,
    pub occurred_at: DateTime<Utc>,
}

/// One AI-assisted search, logged whether it succeeded or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEvent {
    pub id: String,
    pub query: String,
    pub succeeded: bool,
    pub result_count: i64,
    pub response_time_ms: i64,
    pub user_name: Option<String>,
    pub searched_at: DateTime<Utc>,
}

/// A directory listing. Reference data owned by the (external) CRUD
/// subsystem; read-only input to ranking and distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub payment_methods: Vec<PaymentMethod>,
    pub delivery_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Payload for POST /api/collect/visit.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitPayload {
    pub device_id: String,
    pub user_name: Option<String>,
    pub page_path: String,
}

/// Payload for POST /api/collect/interaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InteractionPayload {
    pub business_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Payload for POST /api/collect/search.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchPayload {
    pub query: String,
    pub succeeded: bool,
    pub result_count: i64,
    pub response_time_ms: i64,
    pub user_name: Option<String>,
}

/// Payload for POST /api/collect/heartbeat.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeartbeatPayload {
    pub device_id: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Fresh UUID v4 string for a newly recorded event row.
pub fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_kind_round_trips_through_parse() {
        for kind in InteractionKind::ALL {
            assert_eq!(InteractionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(InteractionKind::parse("email"), None);
    }

    #[test]
    fn payment_methods_parse_leniently() {
        assert_eq!(
            PaymentMethod::parse_list(r#"["cash","UPI","bitcoin"]"#),
            vec![PaymentMethod::Cash, PaymentMethod::Upi]
        );
        assert!(PaymentMethod::parse_list("not json").is_empty());
        assert!(PaymentMethod::parse_list("[]").is_empty());
    }
}
