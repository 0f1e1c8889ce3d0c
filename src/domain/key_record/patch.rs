//! Partial update for key records
//!
//! Only the fields in [`KeyRecordPatch::FIELDS`] are mutable after creation.
//! Anything else in an update body is ignored, including `owner_id`.

use serde_json::{Map, Value};

use crate::domain::DomainError;

/// Parsed partial update restricted to the mutable allow-list.
///
/// `notes` and `order` are doubly optional: `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyRecordPatch {
    pub name: Option<String>,
    pub notes: Option<Option<String>>,
    pub favorite: Option<bool>,
    pub order: Option<Option<f64>>,
}

impl KeyRecordPatch {
    pub const FIELDS: [&'static str; 4] = ["name", "notes", "favorite", "order"];

    /// Parse an update body.
    ///
    /// Fails when the body is not an object, when no allow-listed field is
    /// present, or when a present field has the wrong JSON type.
    pub fn from_json(body: &Value) -> Result<Self, DomainError> {
        let object = body
            .as_object()
            .ok_or_else(|| DomainError::validation("Update body must be a JSON object"))?;

        if !Self::FIELDS.iter().any(|field| object.contains_key(*field)) {
            return Err(DomainError::validation(format!(
                "No valid fields to update. Allowed fields: {}",
                Self::FIELDS.join(", ")
            )));
        }

        let mut patch = Self::default();

        if let Some(name) = object.get("name") {
            let name = name
                .as_str()
                .ok_or_else(|| DomainError::validation("name must be a string"))?;
            patch.name = Some(name.to_string());
        }

        if let Some(notes) = object.get("notes") {
            patch.notes = Some(match notes {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                _ => return Err(DomainError::validation("notes must be a string or null")),
            });
        }

        if let Some(favorite) = object.get("favorite") {
            let favorite = favorite
                .as_bool()
                .ok_or_else(|| DomainError::validation("favorite must be a boolean"))?;
            patch.favorite = Some(favorite);
        }

        if let Some(order) = object.get("order") {
            patch.order = Some(match order {
                Value::Null => None,
                Value::Number(n) => Some(
                    n.as_f64()
                        .ok_or_else(|| DomainError::validation("order must be a number"))?,
                ),
                _ => return Err(DomainError::validation("order must be a number or null")),
            });
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.notes.is_none() && self.favorite.is_none() && self.order.is_none()
    }

    /// JSON object holding only the fields this patch sets, for document merges
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();

        if let Some(name) = &self.name {
            doc.insert("name".to_string(), Value::String(name.clone()));
        }

        if let Some(notes) = &self.notes {
            doc.insert(
                "notes".to_string(),
                notes.clone().map(Value::String).unwrap_or(Value::Null),
            );
        }

        if let Some(favorite) = self.favorite {
            doc.insert("favorite".to_string(), Value::Bool(favorite));
        }

        if let Some(order) = self.order {
            doc.insert("order".to_string(), order.map(Value::from).unwrap_or(Value::Null));
        }

        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_allow_list() {
        let patch = KeyRecordPatch::from_json(&json!({
            "name": "renamed",
            "notes": "rotated in March",
            "favorite": true,
            "order": 4
        }))
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("renamed"));
        assert_eq!(patch.notes, Some(Some("rotated in March".to_string())));
        assert_eq!(patch.favorite, Some(true));
        assert_eq!(patch.order, Some(Some(4.0)));
    }

    #[test]
    fn test_favorite_only() {
        let patch = KeyRecordPatch::from_json(&json!({ "favorite": false })).unwrap();
        assert_eq!(patch.favorite, Some(false));
        assert!(patch.name.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_no_recognized_field_rejected() {
        let err = KeyRecordPatch::from_json(&json!({})).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = KeyRecordPatch::from_json(&json!({ "value": "new-secret" })).unwrap_err();
        assert!(err.to_string().contains("No valid fields"));
    }

    #[test]
    fn test_owner_id_is_not_patchable() {
        let err = KeyRecordPatch::from_json(&json!({ "owner_id": "attacker" })).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let patch =
            KeyRecordPatch::from_json(&json!({ "owner_id": "attacker", "name": "x" })).unwrap();
        assert_eq!(patch.to_document(), json!({ "name": "x" }));
    }

    #[test]
    fn test_non_boolean_favorite_rejected() {
        let err = KeyRecordPatch::from_json(&json!({ "favorite": "yes" })).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: favorite must be a boolean");

        assert!(KeyRecordPatch::from_json(&json!({ "favorite": 1 })).is_err());
        assert!(KeyRecordPatch::from_json(&json!({ "favorite": null })).is_err());
    }

    #[test]
    fn test_wrong_types_rejected() {
        assert!(KeyRecordPatch::from_json(&json!({ "name": 5 })).is_err());
        assert!(KeyRecordPatch::from_json(&json!({ "notes": ["a"] })).is_err());
        assert!(KeyRecordPatch::from_json(&json!({ "order": "first" })).is_err());
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(KeyRecordPatch::from_json(&json!([{ "name": "x" }])).is_err());
        assert!(KeyRecordPatch::from_json(&json!("name")).is_err());
    }

    #[test]
    fn test_null_clears_notes_and_order() {
        let patch = KeyRecordPatch::from_json(&json!({ "notes": null, "order": null })).unwrap();

        assert_eq!(patch.notes, Some(None));
        assert_eq!(patch.order, Some(None));
        assert_eq!(patch.to_document(), json!({ "notes": null, "order": null }));
    }

    #[test]
    fn test_to_document_only_contains_set_fields() {
        let patch = KeyRecordPatch {
            favorite: Some(true),
            order: Some(Some(2.5)),
            ..Default::default()
        };

        assert_eq!(patch.to_document(), json!({ "favorite": true, "order": 2.5 }));
    }
}
