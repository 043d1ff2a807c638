//! Airtable schema and record types.
//!
//! Field specifications sent to the metadata endpoints are strongly typed:
//! [`FieldType`] is the closed set of types this server knows how to create,
//! and [`FieldOptions`] the matching options union. Responses are kept
//! lenient (`type` as a plain string, options as raw JSON) because bases in
//! the wild contain many more field types than we create.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field types supported for field and table creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    SingleLineText,
    MultilineText,
    Number,
    SingleSelect,
    MultiSelect,
    Date,
    Checkbox,
    Email,
    PhoneNumber,
    Currency,
}

impl FieldType {
    /// Whether the Airtable API requires an `options` object for this type.
    pub fn requires_options(self) -> bool {
        match self {
            Self::Number | Self::SingleSelect | Self::MultiSelect | Self::Date | Self::Currency => {
                true
            }
            Self::SingleLineText
            | Self::MultilineText
            | Self::Checkbox
            | Self::Email
            | Self::PhoneNumber => false,
        }
    }

    /// Default options for types that require them, `None` otherwise.
    pub fn default_options(self) -> Option<FieldOptions> {
        match self {
            Self::Number => Some(FieldOptions::Number(NumberOptions { precision: 0 })),
            Self::Date => Some(FieldOptions::Date(DateOptions {
                date_format: DateFormat {
                    name: DateFormatName::Local,
                },
            })),
            Self::Currency => Some(FieldOptions::Currency(CurrencyOptions {
                precision: 2,
                symbol: "$".to_string(),
            })),
            Self::SingleSelect | Self::MultiSelect => Some(FieldOptions::Select(SelectOptions {
                choices: Vec::new(),
            })),
            Self::SingleLineText
            | Self::MultilineText
            | Self::Checkbox
            | Self::Email
            | Self::PhoneNumber => None,
        }
    }
}

/// Options for a `currency` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyOptions {
    pub precision: u8,
    pub symbol: String,
}

/// Options for a `number` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberOptions {
    pub precision: u8,
}

/// Options for a `date` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateOptions {
    #[serde(rename = "dateFormat")]
    pub date_format: DateFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFormat {
    pub name: DateFormatName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormatName {
    Local,
    Friendly,
    Us,
    European,
    Iso,
}

/// Options for `singleSelect` and `multiSelect` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOptions {
    pub choices: Vec<SelectChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectChoice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Type-specific field options, selected by [`FieldType`].
///
/// Untagged on the wire; `Currency` must stay ahead of `Number` so a payload
/// carrying both `precision` and `symbol` doesn't deserialize as a bare
/// number option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOptions {
    Currency(CurrencyOptions),
    Number(NumberOptions),
    Date(DateOptions),
    Select(SelectOptions),
}

/// A field specification for create-field and create-table requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<FieldOptions>,
}

impl FieldSpec {
    /// Normalize the specification against its field type.
    ///
    /// Types that take no options have them stripped even when supplied;
    /// types that require options get the type-specific default filled in
    /// when absent. A specification that already satisfies its type passes
    /// through unchanged.
    pub fn normalize(mut self) -> Self {
        if !self.field_type.requires_options() {
            self.options = None;
        } else if self.options.is_none() {
            self.options = self.field_type.default_options();
        }
        self
    }
}

/// A partial field update for the update-field endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<FieldOptions>,
}

impl FieldUpdate {
    /// Apply the same strip-or-default rule as [`FieldSpec::normalize`],
    /// but only when the update names a type. Type-less updates pass
    /// through untouched.
    pub fn normalize(mut self) -> Self {
        if let Some(field_type) = self.field_type {
            if !field_type.requires_options() {
                self.options = None;
            } else if self.options.is_none() {
                self.options = field_type.default_options();
            }
        }
        self
    }
}

/// An accessible Airtable base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base {
    pub id: String,
    pub name: String,
    pub permission_level: String,
}

/// A table within a base, as returned by the metadata endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub primary_field_id: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub views: Vec<View>,
}

/// A field as returned by the API. The type is kept as a plain string
/// because existing bases use many types outside [`FieldType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: String,
}

/// A record with its cell values keyed by field name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub created_time: DateTime<Utc>,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Acknowledgement returned by the delete-record endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedRecord {
    pub id: String,
    pub deleted: bool,
}

/// Body of a create-table request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTableRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSpec>>,
}

/// Body of an update-table request.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateTableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListBasesResponse {
    pub bases: Vec<Base>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListTablesResponse {
    pub tables: Vec<Table>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListRecordsResponse {
    pub records: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(field_type: FieldType, options: Option<FieldOptions>) -> FieldSpec {
        FieldSpec {
            name: "Test".to_string(),
            field_type,
            description: None,
            options,
        }
    }

    #[test]
    fn test_requires_options() {
        for field_type in [
            FieldType::Number,
            FieldType::SingleSelect,
            FieldType::MultiSelect,
            FieldType::Date,
            FieldType::Currency,
        ] {
            assert!(field_type.requires_options(), "{field_type:?}");
        }
        for field_type in [
            FieldType::SingleLineText,
            FieldType::MultilineText,
            FieldType::Checkbox,
            FieldType::Email,
            FieldType::PhoneNumber,
        ] {
            assert!(!field_type.requires_options(), "{field_type:?}");
        }
    }

    #[test]
    fn test_default_options_values() {
        assert_eq!(
            FieldType::Number.default_options(),
            Some(FieldOptions::Number(NumberOptions { precision: 0 }))
        );
        assert_eq!(
            FieldType::Date.default_options(),
            Some(FieldOptions::Date(DateOptions {
                date_format: DateFormat {
                    name: DateFormatName::Local
                }
            }))
        );
        assert_eq!(
            FieldType::Currency.default_options(),
            Some(FieldOptions::Currency(CurrencyOptions {
                precision: 2,
                symbol: "$".to_string()
            }))
        );
        assert_eq!(
            FieldType::SingleSelect.default_options(),
            Some(FieldOptions::Select(SelectOptions { choices: vec![] }))
        );
        assert_eq!(
            FieldType::MultiSelect.default_options(),
            Some(FieldOptions::Select(SelectOptions { choices: vec![] }))
        );
        assert_eq!(FieldType::Email.default_options(), None);
    }

    #[test]
    fn test_normalize_strips_options_from_plain_types() {
        let normalized = spec(
            FieldType::Checkbox,
            Some(FieldOptions::Number(NumberOptions { precision: 3 })),
        )
        .normalize();
        assert_eq!(normalized.options, None);
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let normalized = spec(FieldType::SingleSelect, None).normalize();
        assert_eq!(
            normalized.options,
            Some(FieldOptions::Select(SelectOptions { choices: vec![] }))
        );

        let normalized = spec(FieldType::Number, None).normalize();
        assert_eq!(
            normalized.options,
            Some(FieldOptions::Number(NumberOptions { precision: 0 }))
        );
    }

    #[test]
    fn test_normalize_keeps_supplied_options() {
        let options = FieldOptions::Currency(CurrencyOptions {
            precision: 1,
            symbol: "€".to_string(),
        });
        let normalized = spec(FieldType::Currency, Some(options.clone())).normalize();
        assert_eq!(normalized.options, Some(options));
    }

    #[test]
    fn test_update_normalize_requires_a_type() {
        let update = FieldUpdate {
            name: Some("Renamed".to_string()),
            field_type: None,
            description: None,
            options: Some(FieldOptions::Number(NumberOptions { precision: 5 })),
        };
        // Without a type there is nothing to normalize against.
        assert_eq!(update.clone().normalize(), update);

        let update = FieldUpdate {
            name: None,
            field_type: Some(FieldType::Email),
            description: None,
            options: Some(FieldOptions::Number(NumberOptions { precision: 5 })),
        };
        assert_eq!(update.normalize().options, None);
    }

    #[test]
    fn test_field_type_wire_names() {
        assert_eq!(
            serde_json::to_value(FieldType::SingleLineText).unwrap(),
            json!("singleLineText")
        );
        assert_eq!(
            serde_json::to_value(FieldType::PhoneNumber).unwrap(),
            json!("phoneNumber")
        );
        assert_eq!(
            serde_json::from_value::<FieldType>(json!("multiSelect")).unwrap(),
            FieldType::MultiSelect
        );
    }

    #[test]
    fn test_options_deserialization_picks_the_right_variant() {
        let currency: FieldOptions =
            serde_json::from_value(json!({"precision": 2, "symbol": "$"})).unwrap();
        assert!(matches!(currency, FieldOptions::Currency(_)));

        let number: FieldOptions = serde_json::from_value(json!({"precision": 0})).unwrap();
        assert!(matches!(number, FieldOptions::Number(_)));

        let date: FieldOptions =
            serde_json::from_value(json!({"dateFormat": {"name": "iso"}})).unwrap();
        assert!(matches!(date, FieldOptions::Date(_)));

        let select: FieldOptions =
            serde_json::from_value(json!({"choices": [{"name": "Open", "color": "blueBright"}]}))
                .unwrap();
        assert!(matches!(select, FieldOptions::Select(_)));
    }

    #[test]
    fn test_field_spec_serialization_shape() {
        let value = serde_json::to_value(spec(FieldType::SingleSelect, None).normalize()).unwrap();
        assert_eq!(
            value,
            json!({"name": "Test", "type": "singleSelect", "options": {"choices": []}})
        );
    }

    #[test]
    fn test_record_round_trip() {
        let record: Record = serde_json::from_value(json!({
            "id": "rec123",
            "createdTime": "2024-01-01T00:00:00.000Z",
            "fields": {"Name": "Test Record", "Status": "Active"}
        }))
        .unwrap();
        assert_eq!(record.id, "rec123");
        assert_eq!(record.fields["Name"], json!("Test Record"));

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("createdTime").is_some());
    }
}
