//! Common Cartridge QTI items.
//!
//! The four supported kinds form a closed set, [`Item`], dispatched on
//! [`ItemKind`]. Each kind converts between a canonical record (a
//! `serde_json::Value`) and its `item` element.

mod answers;
mod assessment;
mod bank;
mod condition;
mod fib;
mod layout;
mod mc;
mod mr;
mod record;
mod tf;

pub use answers::AnswerEncoding;
pub use assessment::Assessment;
pub use bank::{read_bank, Bank};
pub use condition::Condition;
pub use fib::{Blank, FillInTheBlank};
pub use layout::read_profile;
pub use mc::MultipleChoice;
pub use mr::{Choice, MultipleResponse};
pub use record::CaseFlag;
pub use tf::TrueFalse;

use crate::error::{ItemError, ItemResult};
use crate::ident::Identifier;
use crate::xml::Element;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    MultipleChoice,
    MultipleResponse,
    TrueFalse,
    FillInTheBlank,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::MultipleChoice,
        ItemKind::MultipleResponse,
        ItemKind::TrueFalse,
        ItemKind::FillInTheBlank,
    ];

    /// The `cc_profile` metadata value of this kind.
    pub fn profile(self) -> &'static str {
        match self {
            ItemKind::MultipleChoice => mc::PROFILE,
            ItemKind::MultipleResponse => mr::PROFILE,
            ItemKind::TrueFalse => tf::PROFILE,
            ItemKind::FillInTheBlank => fib::PROFILE,
        }
    }

    /// The `type` tag of this kind in tagged records.
    pub fn type_tag(self) -> &'static str {
        match self {
            ItemKind::MultipleChoice => "multiple choice",
            ItemKind::MultipleResponse => "multiple response",
            ItemKind::TrueFalse => "true/false",
            ItemKind::FillInTheBlank => "fill in the blank",
        }
    }

    pub fn from_profile(profile: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.profile() == profile)
    }

    pub fn from_type_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_tag() == tag)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    MultipleChoice(MultipleChoice),
    MultipleResponse(MultipleResponse),
    TrueFalse(TrueFalse),
    FillInTheBlank(FillInTheBlank),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::MultipleChoice(_) => ItemKind::MultipleChoice,
            Item::MultipleResponse(_) => ItemKind::MultipleResponse,
            Item::TrueFalse(_) => ItemKind::TrueFalse,
            Item::FillInTheBlank(_) => ItemKind::FillInTheBlank,
        }
    }

    pub fn ident(&self) -> &Identifier {
        match self {
            Item::MultipleChoice(item) => item.ident(),
            Item::MultipleResponse(item) => item.ident(),
            Item::TrueFalse(item) => item.ident(),
            Item::FillInTheBlank(item) => item.ident(),
        }
    }

    pub fn question(&self) -> &str {
        match self {
            Item::MultipleChoice(item) => item.question(),
            Item::MultipleResponse(item) => item.question(),
            Item::TrueFalse(item) => item.question(),
            Item::FillInTheBlank(item) => item.question(),
        }
    }

    /// Builds an item of the given kind from an untagged record.
    pub fn from_record(kind: ItemKind, record: &Value) -> ItemResult<Self> {
        Ok(match kind {
            ItemKind::MultipleChoice => Item::MultipleChoice(MultipleChoice::from_record(record)?),
            ItemKind::MultipleResponse => {
                Item::MultipleResponse(MultipleResponse::from_record(record)?)
            }
            ItemKind::TrueFalse => Item::TrueFalse(TrueFalse::from_record(record)?),
            ItemKind::FillInTheBlank => Item::FillInTheBlank(FillInTheBlank::from_record(record)?),
        })
    }

    /// Builds an item from a record carrying a `type` tag.
    pub fn from_tagged_record(record: &Value) -> ItemResult<Self> {
        let tag = record::type_tag(record)?;
        let kind = ItemKind::from_type_tag(tag)
            .ok_or_else(|| ItemError::record(format!("type: unknown item type '{tag}'")))?;
        Self::from_record(kind, record)
    }

    /// Builds an item from an `item` element, dispatching on its `cc_profile`.
    pub fn from_xml(item: &Element) -> ItemResult<Self> {
        let profile = read_profile(item)?;
        let kind = ItemKind::from_profile(profile).ok_or_else(|| {
            ItemError::UnrecognizedItemProfile {
                expected: format!(
                    "one of {}",
                    ItemKind::ALL
                        .iter()
                        .map(|k| format!("'{}'", k.profile()))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                found: profile.to_string(),
            }
        })?;

        Ok(match kind {
            ItemKind::MultipleChoice => Item::MultipleChoice(MultipleChoice::from_xml(item)?),
            ItemKind::MultipleResponse => Item::MultipleResponse(MultipleResponse::from_xml(item)?),
            ItemKind::TrueFalse => Item::TrueFalse(TrueFalse::from_xml(item)?),
            ItemKind::FillInTheBlank => Item::FillInTheBlank(FillInTheBlank::from_xml(item)?),
        })
    }

    pub fn from_xml_str(input: &str) -> ItemResult<Self> {
        Self::from_xml(&Element::parse(input)?)
    }

    pub fn to_record(&self) -> Value {
        match self {
            Item::MultipleChoice(item) => item.to_record(),
            Item::MultipleResponse(item) => item.to_record(),
            Item::TrueFalse(item) => item.to_record(),
            Item::FillInTheBlank(item) => item.to_record(),
        }
    }

    /// The record with its `type` tag added.
    pub fn to_tagged_record(&self) -> Value {
        let mut record = self.to_record();
        if let Value::Object(fields) = &mut record {
            fields.insert(
                record::TYPE_FIELD.to_string(),
                Value::String(self.kind().type_tag().to_string()),
            );
        }
        record
    }

    pub fn to_xml(&self) -> Element {
        match self {
            Item::MultipleChoice(item) => item.to_xml(),
            Item::MultipleResponse(item) => item.to_xml(),
            Item::TrueFalse(item) => item.to_xml(),
            Item::FillInTheBlank(item) => item.to_xml(),
        }
    }

    pub fn to_xml_string(&self) -> ItemResult<String> {
        self.to_xml().to_xml_string()
    }
}

impl From<MultipleChoice> for Item {
    fn from(item: MultipleChoice) -> Self {
        Item::MultipleChoice(item)
    }
}

impl From<MultipleResponse> for Item {
    fn from(item: MultipleResponse) -> Self {
        Item::MultipleResponse(item)
    }
}

impl From<TrueFalse> for Item {
    fn from(item: TrueFalse) -> Self {
        Item::TrueFalse(item)
    }
}

impl From<FillInTheBlank> for Item {
    fn from(item: FillInTheBlank) -> Self {
        Item::FillInTheBlank(item)
    }
}
