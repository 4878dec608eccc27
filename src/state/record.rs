/// In-progress form values
///
/// The record is the field collector: every input event overwrites the value
/// stored for its field. Nothing is validated here, that happens when the
/// orchestrator picks up a snapshot of the record on submit.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::schema::FieldName;

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    /// Never set
    #[default]
    Absent,
}

impl FieldValue {
    /// Whitespace-only text counts as empty, booleans never do
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Bool(_) => false,
            FieldValue::Absent => true,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            _ => "",
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }

    fn to_json(&self) -> Option<Value> {
        match self {
            FieldValue::Text(text) => Some(Value::String(text.clone())),
            FieldValue::Bool(flag) => Some(Value::Bool(*flag)),
            FieldValue::Absent => None,
        }
    }
}

/// Field values keyed by schema field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    values: BTreeMap<FieldName, FieldValue>,
    dirty: BTreeSet<FieldName>,
}

impl Record {
    /// Overwrite the value for `name` (last write wins)
    pub fn set_field(&mut self, name: FieldName, value: FieldValue) {
        self.values.insert(name, value);
        self.dirty.insert(name);
    }

    pub fn get(&self, name: FieldName) -> &FieldValue {
        static ABSENT: FieldValue = FieldValue::Absent;
        self.values.get(&name).unwrap_or(&ABSENT)
    }

    /// Whether the user has touched this field
    pub fn is_dirty(&self, name: FieldName) -> bool {
        self.dirty.contains(&name)
    }

    /// First required field (in display order) that is still empty
    pub fn first_missing_required(&self) -> Option<FieldName> {
        FieldName::required().find(|field| self.get(*field).is_empty())
    }

    /// Flat JSON object of every field that has a value
    pub fn to_document(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter_map(|(name, value)| value.to_json().map(|json| (name.key().to_string(), json)))
            .collect()
    }
}

/// Bangladeshi mobile number: `01`, an operator digit 3-9, then eight digits.
///
/// Only used as an inline hint; it never blocks submission.
pub fn is_valid_mobile(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes.starts_with(b"01")
        && (b'3'..=b'9').contains(&bytes[2])
}

/// Record with every required field filled in
#[cfg(test)]
pub(crate) fn complete_record() -> Record {
    let mut record = Record::default();
    for field in FieldName::required() {
        record.set_field(field, FieldValue::Text("x".to_string()));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    #[test]
    fn test_last_write_wins() {
        let mut record = Record::default();
        record.set_field(FieldName::NameEnglish, text("John"));
        record.set_field(FieldName::Mobile, text("01711111111"));
        record.set_field(FieldName::NameEnglish, text("Jon"));
        record.set_field(FieldName::Option1, FieldValue::Bool(true));
        record.set_field(FieldName::Option1, FieldValue::Bool(false));

        assert_eq!(record.get(FieldName::NameEnglish), &text("Jon"));
        assert_eq!(record.get(FieldName::Mobile), &text("01711111111"));
        assert_eq!(record.get(FieldName::Option1), &FieldValue::Bool(false));
        assert_eq!(record.get(FieldName::Email), &FieldValue::Absent);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut record = Record::default();
        assert!(!record.is_dirty(FieldName::Dob));

        record.set_field(FieldName::Dob, text(""));
        assert!(record.is_dirty(FieldName::Dob));
        assert!(!record.is_dirty(FieldName::Nid));
    }

    #[test]
    fn test_missing_required_field() {
        let mut record = complete_record();
        assert_eq!(record.first_missing_required(), None);

        record.set_field(FieldName::NameEnglish, text(""));
        assert_eq!(record.first_missing_required(), Some(FieldName::NameEnglish));

        record.set_field(FieldName::NameEnglish, text("   "));
        assert_eq!(record.first_missing_required(), Some(FieldName::NameEnglish));
    }

    #[test]
    fn test_optional_fields_may_stay_absent() {
        let record = complete_record();
        assert_eq!(record.get(FieldName::BloodGroup), &FieldValue::Absent);
        assert_eq!(record.first_missing_required(), None);
    }

    #[test]
    fn test_document_omits_absent_fields() {
        let mut record = Record::default();
        record.set_field(FieldName::NameBangla, text("জন"));
        record.set_field(FieldName::SingleSelect, FieldValue::Bool(true));
        record.set_field(FieldName::Email, FieldValue::Absent);

        let document = record.to_document();
        assert_eq!(document.len(), 2);
        assert_eq!(document["nameBangla"], Value::String("জন".into()));
        assert_eq!(document["singleSelect"], Value::Bool(true));
    }

    #[test]
    fn test_mobile_hint() {
        assert!(is_valid_mobile("01712345678"));
        assert!(is_valid_mobile("01312345678"));
        assert!(!is_valid_mobile("01212345678"));
        assert!(!is_valid_mobile("0171234567"));
        assert!(!is_valid_mobile("0171234567a"));
        assert!(!is_valid_mobile("+8801712345"));
    }
}
