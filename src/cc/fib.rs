use super::condition::Condition;
use super::layout::{ItemLayout, ItemParts, ResponseLayout};
use super::record::{self, BlankItemRecord, CaseFlag};
use crate::error::{ItemError, ItemResult};
use crate::ident::{Identifier, BLANK_RESPONSE_SUFFIX};
use crate::xml::Element;
use serde_json::{json, Value};
use tracing::debug;

pub const PROFILE: &str = "cc.fib.v0p1";

/// One accepted answer string of a fill-in-the-blank item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blank {
    pub text: String,
    pub case_sensitive: bool,
}

impl Blank {
    pub fn new(text: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            text: text.into(),
            case_sensitive,
        }
    }
}

/// A fill-in-the-blank item. Any listed string is accepted, compared with its own
/// case sensitivity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillInTheBlank {
    ident: Identifier,
    question: String,
    blanks: Vec<Blank>,
}

impl FillInTheBlank {
    pub fn new(question: impl Into<String>, blanks: Vec<Blank>) -> ItemResult<Self> {
        Self::with_ident(Identifier::new(), question, blanks)
    }

    pub fn with_ident(
        ident: Identifier,
        question: impl Into<String>,
        blanks: Vec<Blank>,
    ) -> ItemResult<Self> {
        if blanks.is_empty() {
            return Err(ItemError::record("answers must list at least one accepted string"));
        }
        Ok(Self {
            ident,
            question: question.into(),
            blanks,
        })
    }

    pub fn from_record(value: &Value) -> ItemResult<Self> {
        let record: BlankItemRecord = record::decode(value)?;
        let blanks = record
            .answers
            .into_iter()
            .map(|a| Blank::new(a.answer, a.case.is_sensitive()))
            .collect();

        let item = Self::with_ident(record.ident.unwrap_or_default(), record.question, blanks)?;
        debug!(ident = %item.ident, "built fill in the blank item from record");
        Ok(item)
    }

    pub fn from_xml(item: &Element) -> ItemResult<Self> {
        let parts = ItemParts::read(item, PROFILE)?;
        let respident = parts
            .presentation
            .descend(&["response_str"])?
            .require_attr("ident")?;

        // Written as one `or`; older files list the varequal conditions bare.
        let conditions = match parts.conditions.as_slice() {
            [Condition::Or(items)] => items.as_slice(),
            items => items,
        };

        let blanks = conditions
            .iter()
            .map(|condition| match condition {
                Condition::Equal {
                    respident: found,
                    value,
                    case,
                } => {
                    Condition::check_respident(found.as_deref(), respident)?;
                    Ok(Blank::new(
                        value.as_str(),
                        case.unwrap_or_default().is_sensitive(),
                    ))
                }
                _ => Err(ItemError::xml(
                    "fill in the blank correctness must be a list of varequal conditions",
                )),
            })
            .collect::<ItemResult<Vec<_>>>()?;

        if blanks.is_empty() {
            return Err(ItemError::xml(format!(
                "response '{respident}' is not referenced by any correctness condition"
            )));
        }

        let item = Self::with_ident(parts.ident, parts.question, blanks)
            .map_err(|e| ItemError::xml(e.to_string()))?;
        debug!(ident = %item.ident, "parsed fill in the blank item");
        Ok(item)
    }

    pub fn to_record(&self) -> Value {
        json!({
            "question": self.question,
            "answers": self
                .blanks
                .iter()
                .map(|b| json!({
                    "answer": b.text,
                    "case": CaseFlag::from(b.case_sensitive).as_str(),
                }))
                .collect::<Vec<_>>(),
        })
    }

    pub fn to_xml(&self) -> Element {
        let response = self.ident.derive(BLANK_RESPONSE_SUFFIX);
        let accepted = self
            .blanks
            .iter()
            .map(|b| {
                Condition::equal_with_case(
                    response.as_str(),
                    b.text.as_str(),
                    CaseFlag::from(b.case_sensitive),
                )
            })
            .collect();

        ItemLayout {
            ident: &self.ident,
            profile: PROFILE,
            question: &self.question,
            response: ResponseLayout::Blank { ident: response },
            conditions: vec![Condition::Or(accepted)],
        }
        .render()
    }

    pub fn ident(&self) -> &Identifier {
        &self.ident
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn blanks(&self) -> &[Blank] {
        &self.blanks
    }
}
