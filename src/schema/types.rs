//! Schema declaration types
//!
//! JSON shape of a record type declaration:
//!
//! ```json
//! {
//!   "name": "Person",
//!   "fields": [
//!     { "name": "name", "type": "string" },
//!     { "name": "hobbies",
//!       "type": { "array": { "type": { "structure": "Hobby" } } },
//!       "options": { "nullable": true, "nonempty": true } }
//!   ],
//!   "validate": ["name_starts_with_j"]
//! }
//! ```
//!
//! Every struct rejects unknown keys, so a misspelled option fails when the
//! declaration is loaded rather than being ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A record type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDecl {
    /// Record type name, unique within a loader
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the parent record type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Field declarations in order
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Ids of registered record validators
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validate: Vec<String>,
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: KindDecl,
    #[serde(default)]
    pub options: OptionsDecl,
}

/// A nested (element, key, value or position) descriptor declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorDecl {
    #[serde(rename = "type")]
    pub kind: KindDecl,
    #[serde(default)]
    pub options: OptionsDecl,
}

/// Descriptor kinds.
///
/// Scalars are bare strings (`"integer"`); composites are single-key objects
/// (`{"array": {...}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindDecl {
    String,
    Integer,
    Float,
    Decimal,
    Boolean,
    Array(Box<DescriptorDecl>),
    Map {
        key: Box<DescriptorDecl>,
        value: Box<DescriptorDecl>,
    },
    Tuple(Vec<DescriptorDecl>),
    Enum {
        element: Box<DescriptorDecl>,
        values: Vec<JsonValue>,
    },
    /// Name of the nested record type
    Structure(String),
    /// Discriminant id -> record type name, in declared order
    Polymorphic(IndexMap<String, String>),
}

/// Descriptor options.
///
/// Standard validators are flags; `validate` lists ids of registered
/// field predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsDecl {
    pub nullable: bool,
    pub positive: bool,
    pub negative: bool,
    pub nonpositive: bool,
    pub nonnegative: bool,
    pub nonempty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validate: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_and_composite_kinds_parse() {
        let decl: RecordDecl = serde_json::from_value(json!({
            "name": "Person",
            "fields": [
                { "name": "name", "type": "string" },
                { "name": "tags", "type": { "array": { "type": "string" } } },
                { "name": "scores", "type": { "map": {
                    "key": { "type": "string" },
                    "value": { "type": "integer", "options": { "nonnegative": true } }
                } } },
                { "name": "home", "type": { "structure": "Address" },
                  "options": { "nullable": true } }
            ]
        }))
        .unwrap();

        assert_eq!(decl.fields.len(), 4);
        assert_eq!(decl.fields[0].kind, KindDecl::String);
        assert!(matches!(decl.fields[1].kind, KindDecl::Array(_)));
        assert!(decl.fields[3].options.nullable);
        assert_eq!(decl.fields[3].kind, KindDecl::Structure("Address".into()));
    }

    #[test]
    fn test_polymorphic_candidates_keep_declared_order() {
        let field: FieldDecl = serde_json::from_value(json!({
            "name": "pet",
            "type": { "polymorphic": { "z": "Zebra", "a": "Ant" } }
        }))
        .unwrap();
        match field.kind {
            KindDecl::Polymorphic(candidates) => {
                let ids: Vec<&str> = candidates.keys().map(String::as_str).collect();
                assert_eq!(ids, ["z", "a"]);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_unknown_option_rejected() {
        let result: Result<FieldDecl, _> = serde_json::from_value(json!({
            "name": "age",
            "type": "integer",
            "options": { "postive": true }
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("postive"));
    }

    #[test]
    fn test_unknown_record_key_rejected() {
        let result: Result<RecordDecl, _> = serde_json::from_value(json!({
            "name": "X",
            "feilds": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<FieldDecl, _> = serde_json::from_value(json!({
            "name": "blob",
            "type": "bytes"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_declaration_serializes_back() {
        let decl = RecordDecl {
            name: "Hobby".into(),
            description: None,
            extends: None,
            fields: vec![FieldDecl {
                name: "difficulty".into(),
                kind: KindDecl::Integer,
                options: OptionsDecl {
                    positive: true,
                    ..OptionsDecl::default()
                },
            }],
            validate: vec![],
        };
        let plain = serde_json::to_value(&decl).unwrap();
        assert_eq!(plain["fields"][0]["type"], json!("integer"));
        let back: RecordDecl = serde_json::from_value(plain).unwrap();
        assert_eq!(back, decl);
    }
}
