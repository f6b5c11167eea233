use super::answers::{self, AnswerEncoding};
use super::layout::{Cardinality, ItemLayout, ItemParts, ResponseLayout, TextType};
use super::record::{self, ChoiceItemRecord};
use crate::error::{ItemError, ItemResult};
use crate::ident::Identifier;
use crate::xml::Element;
use serde_json::{json, Value};
use tracing::debug;

pub const PROFILE: &str = "cc.multiple_response.v0p1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
    pub correct: bool,
}

impl Choice {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

/// A multiple response item: any subset of the choices, including none or all
/// of them, may be correct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipleResponse {
    ident: Identifier,
    question: String,
    choices: Vec<Choice>,
}

impl MultipleResponse {
    pub fn new(question: impl Into<String>, choices: Vec<Choice>) -> ItemResult<Self> {
        Self::with_ident(Identifier::new(), question, choices)
    }

    pub fn with_ident(
        ident: Identifier,
        question: impl Into<String>,
        choices: Vec<Choice>,
    ) -> ItemResult<Self> {
        if choices.is_empty() {
            return Err(ItemError::record("answers must offer at least one choice"));
        }
        Ok(Self {
            ident,
            question: question.into(),
            choices,
        })
    }

    pub fn from_record(value: &Value) -> ItemResult<Self> {
        let record: ChoiceItemRecord = record::decode(value)?;
        let choices = record
            .answers
            .into_iter()
            .map(|a| Choice::new(a.answer, a.correct))
            .collect();

        let item = Self::with_ident(record.ident.unwrap_or_default(), record.question, choices)?;
        debug!(ident = %item.ident, "built multiple response item from record");
        Ok(item)
    }

    pub fn from_xml(item: &Element) -> ItemResult<Self> {
        Self::from_xml_with_encoding(item).map(|(item, _)| item)
    }

    /// Parses the item and reports which legacy answer encoding it used.
    pub fn from_xml_with_encoding(item: &Element) -> ItemResult<(Self, AnswerEncoding)> {
        let parts = ItemParts::read(item, PROFILE)?;
        let (respident, rendered) = parts.choices()?;

        let choice_ids: Vec<&str> = rendered.iter().map(|(ident, _)| ident.as_str()).collect();
        let decoded = answers::decode(&parts.conditions, &respident, &choice_ids)?;

        let choices = rendered
            .into_iter()
            .zip(decoded.states)
            .map(|((_, text), correct)| Choice::new(text, correct))
            .collect();

        let item = Self::with_ident(parts.ident, parts.question, choices)
            .map_err(|e| ItemError::xml(e.to_string()))?;
        debug!(ident = %item.ident, encoding = ?decoded.encoding, "parsed multiple response item");
        Ok((item, decoded.encoding))
    }

    pub fn to_record(&self) -> Value {
        json!({
            "question": self.question,
            "answers": self
                .choices
                .iter()
                .map(|c| json!({ "answer": c.text, "correct": c.correct }))
                .collect::<Vec<_>>(),
        })
    }

    pub fn to_xml(&self) -> Element {
        let choice_ids: Vec<Identifier> = (0..self.choices.len())
            .map(|index| self.ident.derive(index))
            .collect();

        let correctness = answers::encode(
            self.ident.as_str(),
            choice_ids
                .iter()
                .zip(&self.choices)
                .map(|(ident, choice)| (ident.as_str(), choice.correct)),
        );

        ItemLayout {
            ident: &self.ident,
            profile: PROFILE,
            question: &self.question,
            response: ResponseLayout::Choices {
                cardinality: Cardinality::Multiple,
                texttype: TextType::Html,
                choices: choice_ids
                    .iter()
                    .cloned()
                    .zip(self.choices.iter().map(|c| c.text.as_str()))
                    .collect(),
            },
            conditions: vec![correctness],
        }
        .render()
    }

    pub fn ident(&self) -> &Identifier {
        &self.ident
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }
}
