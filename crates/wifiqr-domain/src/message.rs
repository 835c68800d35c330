use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Domain event published when a WiFi QR code is created upstream.
///
/// Canonical wire naming is camelCase, but the producer side matches
/// field names case-insensitively, so `from_json_value` accepts any
/// casing of the known keys (PascalCase from the .NET producer,
/// uppercase, mixed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiQrCreatedMessage {
    pub wifi_id: Uuid,
    pub ssid: String,
    pub encryption: String,
    #[serde(default)]
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

/// Canonical camelCase field names of the wire schema.
const FIELD_NAMES: [&str; 7] = [
    "wifiId",
    "ssid",
    "encryption",
    "hidden",
    "createdAt",
    "createdBy",
    "metadata",
];

impl WifiQrCreatedMessage {
    /// Deserialize from an already-parsed JSON value, matching the
    /// top-level field names case-insensitively. Nested objects such
    /// as `metadata` keep their keys untouched.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(canonicalize_field_names(value))
    }
}

/// Rewrite top-level object keys to their canonical camelCase
/// spelling, comparing case-insensitively. Unknown keys pass through
/// unchanged; non-object values are returned as-is.
fn canonicalize_field_names(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut canonical = serde_json::Map::with_capacity(map.len());
            for (key, field_value) in map {
                let name = FIELD_NAMES
                    .iter()
                    .find(|canonical_name| canonical_name.eq_ignore_ascii_case(&key))
                    .map(|canonical_name| (*canonical_name).to_string())
                    .unwrap_or(key);
                canonical.insert(name, field_value);
            }
            serde_json::Value::Object(canonical)
        }
        other => other,
    }
}

/// One record as handed over by the queue layer: an opaque body plus
/// the queue-assigned message id used for log correlation.
#[derive(Debug, Clone)]
pub struct QueueRecord {
    pub message_id: String,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "wifiId": "11111111-1111-1111-1111-111111111111",
            "ssid": "HomeNet",
            "encryption": "WPA2",
            "hidden": false,
            "createdAt": "2024-01-01T00:00:00Z",
            "createdBy": "alice",
            "metadata": null
        }"#
    }

    #[test]
    fn test_deserialize_camel_case() {
        let message: WifiQrCreatedMessage = serde_json::from_str(sample_json()).unwrap();

        assert_eq!(
            message.wifi_id,
            Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap()
        );
        assert_eq!(message.ssid, "HomeNet");
        assert_eq!(message.encryption, "WPA2");
        assert!(!message.hidden);
        assert_eq!(message.created_by, "alice");
        assert_eq!(message.metadata, None);
    }

    #[test]
    fn test_from_value_accepts_pascal_case() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "WifiId": "22222222-2222-2222-2222-222222222222",
                "Ssid": "OfficeNet",
                "Encryption": "WPA3",
                "Hidden": true,
                "CreatedAt": "2024-06-15T12:30:00Z",
                "CreatedBy": "bob"
            }"#,
        )
        .unwrap();

        let message = WifiQrCreatedMessage::from_json_value(value).unwrap();
        assert_eq!(message.ssid, "OfficeNet");
        assert!(message.hidden);
        assert_eq!(message.metadata, None);
    }

    #[test]
    fn test_from_value_accepts_arbitrary_casing() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "WIFIID": "33333333-3333-3333-3333-333333333333",
                "SSID": "CafeNet",
                "encryption": "WPA2",
                "HIDDEN": false,
                "createdAT": "2024-03-01T08:00:00Z",
                "createdby": "carol",
                "METADATA": {"SSID": "not-a-field"}
            }"#,
        )
        .unwrap();

        let message = WifiQrCreatedMessage::from_json_value(value).unwrap();
        assert_eq!(
            message.wifi_id,
            Uuid::parse_str("33333333-3333-3333-3333-333333333333").unwrap()
        );
        assert_eq!(message.ssid, "CafeNet");
        assert_eq!(message.created_by, "carol");

        // Only top-level keys are canonicalized
        let metadata = message.metadata.unwrap();
        assert_eq!(metadata.get("SSID").map(String::as_str), Some("not-a-field"));
    }

    #[test]
    fn test_round_trip() {
        let message: WifiQrCreatedMessage = serde_json::from_str(sample_json()).unwrap();
        let serialized = serde_json::to_string(&message).unwrap();
        let round_tripped: WifiQrCreatedMessage = serde_json::from_str(&serialized).unwrap();

        assert_eq!(message, round_tripped);
    }

    #[test]
    fn test_hidden_defaults_to_false() {
        let json = r#"{
            "wifiId": "11111111-1111-1111-1111-111111111111",
            "ssid": "HomeNet",
            "encryption": "WPA2",
            "createdAt": "2024-01-01T00:00:00Z",
            "createdBy": "alice"
        }"#;

        let message: WifiQrCreatedMessage = serde_json::from_str(json).unwrap();
        assert!(!message.hidden);
    }

    #[test]
    fn test_metadata_entries_preserved() {
        let json = r#"{
            "wifiId": "11111111-1111-1111-1111-111111111111",
            "ssid": "HomeNet",
            "encryption": "WPA2",
            "createdAt": "2024-01-01T00:00:00Z",
            "createdBy": "alice",
            "metadata": {"source": "mobile-app", "region": "eu-west-1"}
        }"#;

        let message: WifiQrCreatedMessage = serde_json::from_str(json).unwrap();
        let metadata = message.metadata.unwrap();
        assert_eq!(metadata.get("source").map(String::as_str), Some("mobile-app"));
        assert_eq!(metadata.get("region").map(String::as_str), Some("eu-west-1"));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let value: serde_json::Value = serde_json::from_str(r#"{"ssid": "HomeNet"}"#).unwrap();
        assert!(WifiQrCreatedMessage::from_json_value(value).is_err());
    }
}
