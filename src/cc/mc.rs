use super::condition::Condition;
use super::layout::{Cardinality, ItemLayout, ItemParts, ResponseLayout, TextType};
use super::record::{self, ChoiceItemRecord};
use crate::error::{ItemError, ItemResult};
use crate::ident::Identifier;
use crate::xml::Element;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const PROFILE: &str = "cc.multiple_choice.v0p1";

/// A single-answer multiple choice item.
///
/// Exactly one choice is correct. When a record marks several choices correct
/// the first one wins; when it marks none, the first choice is taken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipleChoice {
    ident: Identifier,
    question: String,
    choices: Vec<String>,
    correct: usize,
}

impl MultipleChoice {
    pub fn new(
        question: impl Into<String>,
        choices: Vec<String>,
        correct: usize,
    ) -> ItemResult<Self> {
        Self::with_ident(Identifier::new(), question, choices, correct)
    }

    pub fn with_ident(
        ident: Identifier,
        question: impl Into<String>,
        choices: Vec<String>,
        correct: usize,
    ) -> ItemResult<Self> {
        if choices.is_empty() {
            return Err(ItemError::record("answers must offer at least one choice"));
        }
        if correct >= choices.len() {
            return Err(ItemError::record(format!(
                "correct answer index {correct} is out of range for {} choices",
                choices.len()
            )));
        }

        Ok(Self {
            ident,
            question: question.into(),
            choices,
            correct,
        })
    }

    pub fn from_record(value: &Value) -> ItemResult<Self> {
        let record: ChoiceItemRecord = record::decode(value)?;

        let marked: Vec<usize> = record
            .answers
            .iter()
            .enumerate()
            .filter(|(_, answer)| answer.correct)
            .map(|(index, _)| index)
            .collect();

        let correct = match marked.as_slice() {
            [] if record.answers.is_empty() => {
                return Err(ItemError::record("answers must offer at least one choice"))
            }
            [] => {
                warn!("multiple choice record marks no answer correct, keeping the first");
                0
            }
            [only] => *only,
            [first, ..] => {
                warn!(
                    marked = marked.len(),
                    kept = first,
                    "multiple choice record marks several answers correct, keeping the first"
                );
                *first
            }
        };

        let ident = record.ident.unwrap_or_default();
        let choices = record.answers.into_iter().map(|a| a.answer).collect();
        let item = Self::with_ident(ident, record.question, choices, correct)?;
        debug!(ident = %item.ident, "built multiple choice item from record");
        Ok(item)
    }

    pub fn from_xml(item: &Element) -> ItemResult<Self> {
        let parts = ItemParts::read(item, PROFILE)?;
        let (respident, choices) = parts.choices()?;

        let correct = match parts.conditions.as_slice() {
            [Condition::Equal {
                respident: found,
                value,
                ..
            }] => {
                Condition::check_respident(found.as_deref(), &respident)?;
                let value = value.trim();
                choices
                    .iter()
                    .position(|(ident, _)| ident == value)
                    .ok_or_else(|| {
                        ItemError::xml(format!(
                            "correct answer '{value}' is not one of the rendered choices"
                        ))
                    })?
            }
            _ => {
                return Err(ItemError::xml(
                    "multiple choice correctness must be a single varequal condition",
                ))
            }
        };

        let choices = choices.into_iter().map(|(_, text)| text).collect();
        let item = Self::with_ident(parts.ident, parts.question, choices, correct)
            .map_err(|e| ItemError::xml(e.to_string()))?;
        debug!(ident = %item.ident, "parsed multiple choice item");
        Ok(item)
    }

    pub fn to_record(&self) -> Value {
        json!({
            "question": self.question,
            "answers": self
                .choices
                .iter()
                .enumerate()
                .map(|(index, answer)| json!({ "answer": answer, "correct": index == self.correct }))
                .collect::<Vec<_>>(),
        })
    }

    pub fn to_xml(&self) -> Element {
        let respident = self.ident.as_str();
        ItemLayout {
            ident: &self.ident,
            profile: PROFILE,
            question: &self.question,
            response: ResponseLayout::Choices {
                cardinality: Cardinality::Single,
                texttype: TextType::Plain,
                choices: self
                    .choices
                    .iter()
                    .enumerate()
                    .map(|(index, text)| (self.ident.derive(index), text.as_str()))
                    .collect(),
            },
            conditions: vec![Condition::equal(
                respident,
                self.ident.derive(self.correct).as_str(),
            )],
        }
        .render()
    }

    pub fn ident(&self) -> &Identifier {
        &self.ident
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Index of the correct choice.
    pub fn correct(&self) -> usize {
        self.correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> Value {
        json!({
            "question": "<p>The three primary additive colors, when combined, will create this kind of light.</p>",
            "answers": [
                { "answer": "white", "correct": true },
                { "answer": "black", "correct": false },
                { "answer": "colorless", "correct": false },
                { "answer": "clear", "correct": false },
            ],
        })
    }

    #[test]
    fn renders_single_varequal_for_correct_choice() {
        let mut record = colors();
        record["ident"] = json!("1");
        let item = MultipleChoice::from_record(&record).unwrap();

        let expected = concat!(
            r#"<item ident="1"><itemmetadata><qtimetadata><qtimetadatafield><fieldlabel>cc_profile</fieldlabel>"#,
            r#"<fieldentry>cc.multiple_choice.v0p1</fieldentry></qtimetadatafield></qtimetadata></itemmetadata>"#,
            r#"<presentation><material><mattext texttype="text/html">&lt;p&gt;The three primary additive colors, "#,
            r#"when combined, will create this kind of light.&lt;/p&gt;</mattext></material>"#,
            r#"<response_lid ident="1" rcardinality="Single"><render_choice>"#,
            r#"<response_label ident="1-0"><material><mattext texttype="text/plain">white</mattext></material></response_label>"#,
            r#"<response_label ident="1-1"><material><mattext texttype="text/plain">black</mattext></material></response_label>"#,
            r#"<response_label ident="1-2"><material><mattext texttype="text/plain">colorless</mattext></material></response_label>"#,
            r#"<response_label ident="1-3"><material><mattext texttype="text/plain">clear</mattext></material></response_label>"#,
            r#"</render_choice></response_lid></presentation><resprocessing><outcomes>"#,
            r#"<decvar maxvalue="100" minvalue="0" varname="SCORE" vartype="Decimal"/></outcomes>"#,
            r#"<respcondition continue="No"><conditionvar><varequal respident="1">1-0</varequal></conditionvar>"#,
            r#"<setvar action="Set" varname="SCORE">100</setvar></respcondition></resprocessing></item>"#,
        );
        assert_eq!(item.to_xml().to_xml_string().unwrap(), expected);
    }

    #[test]
    fn record_round_trips() {
        let record = colors();
        let item = MultipleChoice::from_record(&record).unwrap();
        assert_eq!(item.to_record(), record);
    }

    #[test]
    fn several_correct_answers_keep_the_first() {
        let record = json!({
            "question": "q",
            "answers": [
                { "answer": "a", "correct": false },
                { "answer": "b", "correct": true },
                { "answer": "c", "correct": true },
            ],
        });
        let item = MultipleChoice::from_record(&record).unwrap();
        assert_eq!(item.correct(), 1);

        let xml = item.to_xml();
        let conditions = xml
            .descend(&["resprocessing", "respcondition", "conditionvar"])
            .unwrap()
            .children();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].text(), Some(item.ident().derive(1).as_str()));
    }

    #[test]
    fn no_correct_answer_defaults_to_the_first() {
        let record = json!({
            "question": "q",
            "answers": [{ "answer": "a" }, { "answer": "b", "correct": false }],
        });
        let item = MultipleChoice::from_record(&record).unwrap();
        assert_eq!(item.correct(), 0);

        let xml = item.to_xml();
        let conditions = xml
            .descend(&["resprocessing", "respcondition", "conditionvar"])
            .unwrap()
            .children();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].name(), "varequal");
        assert_eq!(conditions[0].text(), Some(item.ident().derive(0).as_str()));
    }

    #[test]
    fn empty_choice_list_is_rejected() {
        let record = json!({ "question": "q", "answers": [] });
        assert!(matches!(
            MultipleChoice::from_record(&record),
            Err(ItemError::MalformedRecord(_))
        ));
    }

    #[test]
    fn missing_question_is_named() {
        let record = json!({ "answers": [{ "answer": "a", "correct": true }] });
        assert!(matches!(
            MultipleChoice::from_record(&record),
            Err(ItemError::MalformedRecord(ref msg)) if msg.contains("question")
        ));
    }

    #[test]
    fn xml_round_trip_preserves_identity() {
        let item = MultipleChoice::from_record(&colors()).unwrap();
        let parsed = MultipleChoice::from_xml(&item.to_xml()).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn reference_to_unrendered_choice_is_malformed() {
        let xml = MultipleChoice::with_ident("1".into(), "q", vec!["a".into(), "b".into()], 0)
            .unwrap()
            .to_xml()
            .to_xml_string()
            .unwrap()
            .replace(">1-0</varequal>", ">1-7</varequal>");

        let err = MultipleChoice::from_xml(&Element::parse(&xml).unwrap()).unwrap_err();
        assert!(matches!(err, ItemError::MalformedXml(ref msg) if msg.contains("1-7")));
    }

    #[test]
    fn missing_correctness_condition_is_malformed() {
        let xml = MultipleChoice::with_ident("1".into(), "q", vec!["a".into()], 0)
            .unwrap()
            .to_xml()
            .to_xml_string()
            .unwrap()
            .replace(r#"<varequal respident="1">1-0</varequal>"#, "");

        assert!(matches!(
            MultipleChoice::from_xml(&Element::parse(&xml).unwrap()),
            Err(ItemError::MalformedXml(_))
        ));
    }

    #[test]
    fn wrong_profile_is_unrecognized() {
        let xml = MultipleChoice::with_ident("1".into(), "q", vec!["a".into()], 0)
            .unwrap()
            .to_xml()
            .to_xml_string()
            .unwrap()
            .replace(PROFILE, "cc.true_false.v0p1");

        assert!(matches!(
            MultipleChoice::from_xml(&Element::parse(&xml).unwrap()),
            Err(ItemError::UnrecognizedItemProfile { .. })
        ));
    }
}
