//! ==============================================================================
//! domain.rs - reading types and their wire/storage conversions
//! ==============================================================================
//!
//! purpose:
//!     a reading arrives as an arbitrary json object, is stored verbatim as a
//!     bson document, and leaves as the three-field wire format:
//!
//! ```text
//!         { "_id": "<string>", "timestamp": <passthrough|null>, "sensors": [...] }
//! ```
//!
//! relationships:
//!     - used by: store/ (encodes NewReading, decodes stored documents)
//!     - used by: gateway.rs (request and response bodies)
//!
//! ==============================================================================

use mongodb::bson::{self, Bson, Document};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// an incoming reading, as posted by a sensor node
///
/// only `timestamp` and `sensors` are known; everything else the node sent
/// lands in `extra` and is stored alongside them untouched.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewReading {
    /// caller-supplied timestamp, any json value
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,

    /// sensor sub-readings, any json value (normally an array)
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sensors: Option<Value>,

    /// every other field of the posted object
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// a stored reading in wire format
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// store-assigned identifier, always rendered as a string
    #[serde(rename = "_id")]
    pub id: String,

    /// passthrough; serialized as null when the reading had none
    pub timestamp: Option<Value>,

    /// passthrough; an empty array when the reading had none
    pub sensors: Value,
}

// an explicit `null` must survive the round trip, so a present field is
// always Some(..) even when its value is null.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl NewReading {
    /// encode as the bson document that gets inserted
    pub fn to_document(&self) -> Result<Document, bson::ser::Error> {
        bson::to_document(self)
    }
}

impl Reading {
    /// build the wire format from a raw stored document
    pub fn from_document(mut doc: Document) -> Self {
        let id = doc.remove("_id").map(|id| render_id(&id)).unwrap_or_default();
        let timestamp = doc.remove("timestamp").map(bson_to_wire);
        let sensors = doc
            .remove("sensors")
            .map(bson_to_wire)
            .unwrap_or_else(|| Value::Array(Vec::new()));

        Self { id, timestamp, sensors }
    }
}

/// json for a stored bson value
///
/// dates written straight into the collection by sensor firmware come out as
/// rfc 3339 strings and object ids as hex, at any depth, so a browser can
/// feed them to `new Date(..)`. every other type uses relaxed extended json.
pub fn bson_to_wire(value: Bson) -> Value {
    match value {
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_wire).collect()),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_wire(value)))
                .collect(),
        ),
        other => other.into_relaxed_extjson(),
    }
}

/// string form of a document id
///
/// object ids become their 24-char hex form, string ids are kept as they are,
/// and anything else (a caller may post its own `_id`) uses bson's display.
pub fn render_id(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId, DateTime};
    use serde_json::json;

    #[test]
    fn test_new_reading_keeps_unknown_fields() {
        let reading: NewReading = serde_json::from_value(json!({
            "timestamp": "2025-11-22T20:00:00Z",
            "sensors": [{"address": "0x5a", "object_temp": 5}],
            "device": "pi-01"
        }))
        .unwrap();

        assert_eq!(reading.timestamp, Some(json!("2025-11-22T20:00:00Z")));
        assert_eq!(reading.extra.get("device"), Some(&json!("pi-01")));
        assert!(!reading.extra.contains_key("timestamp"));
    }

    #[test]
    fn test_explicit_null_is_stored() {
        let reading: NewReading = serde_json::from_value(json!({"timestamp": null})).unwrap();
        assert_eq!(reading.timestamp, Some(Value::Null));

        let doc = reading.to_document().unwrap();
        assert_eq!(doc.get("timestamp"), Some(&Bson::Null));
        assert!(!doc.contains_key("sensors"));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(serde_json::from_value::<NewReading>(json!([1, 2, 3])).is_err());
        assert!(serde_json::from_value::<NewReading>(json!("reading")).is_err());
    }

    #[test]
    fn test_from_document_defaults() {
        let oid = ObjectId::new();
        let reading = Reading::from_document(doc! { "_id": oid });

        assert_eq!(reading.id, oid.to_hex());
        assert_eq!(reading.timestamp, None);
        assert_eq!(reading.sensors, json!([]));
        assert_eq!(
            serde_json::to_value(&reading).unwrap(),
            json!({"_id": oid.to_hex(), "timestamp": null, "sensors": []})
        );
    }

    #[test]
    fn test_from_document_drops_extra_fields() {
        let reading = Reading::from_document(doc! {
            "_id": "custom-id",
            "timestamp": 1_700_000_000_i64,
            "sensors": [{"id": 1, "tempC": 36.5}],
            "device": "pi-01",
        });

        assert_eq!(
            serde_json::to_value(&reading).unwrap(),
            json!({
                "_id": "custom-id",
                "timestamp": 1700000000,
                "sensors": [{"id": 1, "tempC": 36.5}]
            })
        );
    }

    #[test]
    fn test_dates_and_object_ids_render_as_strings() {
        let oid = ObjectId::new();
        let calibration_id = ObjectId::new();
        let reading = Reading::from_document(doc! {
            "_id": oid,
            "timestamp": DateTime::from_millis(1_763_841_600_000),
            "sensors": [{
                "address": "0x5a",
                "object_temp": 5.0,
                "calibration": calibration_id,
                "read_at": [DateTime::from_millis(1_763_841_600_000)],
            }],
        });

        assert_eq!(
            serde_json::to_value(&reading).unwrap(),
            json!({
                "_id": oid.to_hex(),
                "timestamp": "2025-11-22T20:00:00Z",
                "sensors": [{
                    "address": "0x5a",
                    "object_temp": 5.0,
                    "calibration": calibration_id.to_hex(),
                    "read_at": ["2025-11-22T20:00:00Z"],
                }]
            })
        );
    }

    #[test]
    fn test_other_bson_types_use_relaxed_extjson() {
        let value = bson_to_wire(Bson::RegularExpression(bson::Regex {
            pattern: "^0x5".to_string(),
            options: "i".to_string(),
        }));
        assert_eq!(
            value,
            json!({"$regularExpression": {"pattern": "^0x5", "options": "i"}})
        );
    }

    #[test]
    fn test_render_id_non_string() {
        assert_eq!(render_id(&Bson::Int32(7)), "7");
    }
}
