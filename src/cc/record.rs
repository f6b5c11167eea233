use crate::error::{ItemError, ItemResult};
use crate::ident::Identifier;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record field holding the item kind tag in tagged records.
pub const TYPE_FIELD: &str = "type";

/// Input shape shared by multiple choice and multiple response records.
#[derive(Debug, Deserialize)]
pub struct ChoiceItemRecord {
    #[serde(default)]
    pub ident: Option<Identifier>,
    pub question: String,
    pub answers: Vec<ChoiceRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceRecord {
    pub answer: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct TrueFalseRecord {
    #[serde(default)]
    pub ident: Option<Identifier>,
    pub question: String,
    pub answer: bool,
}

#[derive(Debug, Deserialize)]
pub struct BlankItemRecord {
    #[serde(default)]
    pub ident: Option<Identifier>,
    pub question: String,
    pub answers: Vec<BlankRecord>,
}

#[derive(Debug, Deserialize)]
pub struct BlankRecord {
    pub answer: String,
    #[serde(default)]
    pub case: CaseFlag,
}

/// Case sensitivity flag as spelled on the wire, both in records and in the
/// `case` attribute of `varequal`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseFlag {
    Yes,
    #[default]
    No,
}

impl CaseFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseFlag::Yes => "Yes",
            CaseFlag::No => "No",
        }
    }

    pub fn is_sensitive(self) -> bool {
        matches!(self, CaseFlag::Yes)
    }

    /// Reads the QTI attribute value; anything but `Yes` means insensitive.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("yes") => CaseFlag::Yes,
            _ => CaseFlag::No,
        }
    }
}

impl From<bool> for CaseFlag {
    fn from(sensitive: bool) -> Self {
        if sensitive {
            CaseFlag::Yes
        } else {
            CaseFlag::No
        }
    }
}

/// Deserializes a canonical record, reporting the path of the first bad field.
pub fn decode<R: DeserializeOwned>(record: &Value) -> ItemResult<R> {
    serde_path_to_error::deserialize::<_, R>(record).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        if path.is_empty() || path == "." {
            ItemError::record(source.to_string())
        } else {
            ItemError::record(format!("{path}: {source}"))
        }
    })
}

/// Reads the kind tag of a tagged record.
pub fn type_tag(record: &Value) -> ItemResult<&str> {
    record
        .get(TYPE_FIELD)
        .ok_or_else(|| ItemError::record(format!("missing field `{TYPE_FIELD}`")))?
        .as_str()
        .ok_or_else(|| ItemError::record(format!("field `{TYPE_FIELD}` must be a string")))
}
