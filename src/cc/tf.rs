use super::condition::Condition;
use super::layout::{Cardinality, ItemLayout, ItemParts, ResponseLayout, TextType};
use super::record::{self, TrueFalseRecord};
use crate::error::{ItemError, ItemResult};
use crate::ident::{Identifier, FALSE_SUFFIX, TRUE_SUFFIX};
use crate::xml::Element;
use serde_json::{json, Value};
use tracing::debug;

pub const PROFILE: &str = "cc.true_false.v0p1";

const TRUE_LABEL: &str = "True";
const FALSE_LABEL: &str = "False";

/// A true/false item. The two choices are synthesized at fixed suffixes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrueFalse {
    ident: Identifier,
    question: String,
    answer: bool,
}

impl TrueFalse {
    pub fn new(question: impl Into<String>, answer: bool) -> Self {
        Self::with_ident(Identifier::new(), question, answer)
    }

    pub fn with_ident(ident: Identifier, question: impl Into<String>, answer: bool) -> Self {
        Self {
            ident,
            question: question.into(),
            answer,
        }
    }

    pub fn from_record(value: &Value) -> ItemResult<Self> {
        let record: TrueFalseRecord = record::decode(value)?;
        let item = Self::with_ident(
            record.ident.unwrap_or_default(),
            record.question,
            record.answer,
        );
        debug!(ident = %item.ident, "built true/false item from record");
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
                value.trim().to_string()
            }
            _ => {
                return Err(ItemError::xml(
                    "true/false correctness must be a single varequal condition",
                ))
            }
        };

        let label = choices
            .iter()
            .find(|(ident, _)| *ident == correct)
            .map(|(_, label)| label.trim())
            .ok_or_else(|| {
                ItemError::xml(format!(
                    "correct answer '{correct}' is not one of the rendered choices"
                ))
            })?;

        let answer = if label.eq_ignore_ascii_case(TRUE_LABEL) {
            true
        } else if label.eq_ignore_ascii_case(FALSE_LABEL) {
            false
        } else {
            return Err(ItemError::xml(format!(
                "true/false choice label '{label}' is neither True nor False"
            )));
        };

        let item = Self::with_ident(parts.ident, parts.question, answer);
        debug!(ident = %item.ident, "parsed true/false item");
        Ok(item)
    }

    pub fn to_record(&self) -> Value {
        json!({
            "question": self.question,
            "answer": self.answer,
        })
    }

    pub fn to_xml(&self) -> Element {
        let true_ident = self.ident.derive(TRUE_SUFFIX);
        let false_ident = self.ident.derive(FALSE_SUFFIX);
        let correct = if self.answer {
            true_ident.clone()
        } else {
            false_ident.clone()
        };

        ItemLayout {
            ident: &self.ident,
            profile: PROFILE,
            question: &self.question,
            response: ResponseLayout::Choices {
                cardinality: Cardinality::Single,
                texttype: TextType::Plain,
                choices: vec![(true_ident, TRUE_LABEL), (false_ident, FALSE_LABEL)],
            },
            conditions: vec![Condition::equal(self.ident.as_str(), correct.as_str())],
        }
        .render()
    }

    pub fn ident(&self) -> &Identifier {
        &self.ident
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> bool {
        self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_choices_and_references_true() {
        let item = TrueFalse::with_ident("t".into(), "<p>1+1=2</p>", true);

        let expected = concat!(
            r#"<item ident="t"><itemmetadata><qtimetadata><qtimetadatafield><fieldlabel>cc_profile</fieldlabel>"#,
            r#"<fieldentry>cc.true_false.v0p1</fieldentry></qtimetadatafield></qtimetadata></itemmetadata>"#,
            r#"<presentation><material><mattext texttype="text/html">&lt;p&gt;1+1=2&lt;/p&gt;</mattext></material>"#,
            r#"<response_lid ident="t" rcardinality="Single"><render_choice>"#,
            r#"<response_label ident="t-01"><material><mattext texttype="text/plain">True</mattext></material></response_label>"#,
            r#"<response_label ident="t-02"><material><mattext texttype="text/plain">False</mattext></material></response_label>"#,
            r#"</render_choice></response_lid></presentation><resprocessing><outcomes>"#,
            r#"<decvar maxvalue="100" minvalue="0" varname="SCORE" vartype="Decimal"/></outcomes>"#,
            r#"<respcondition continue="No"><conditionvar><varequal respident="t">t-01</varequal></conditionvar>"#,
            r#"<setvar action="Set" varname="SCORE">100</setvar></respcondition></resprocessing></item>"#,
        );
        assert_eq!(item.to_xml().to_xml_string().unwrap(), expected);
    }

    #[test]
    fn false_answer_references_second_choice() {
        let item = TrueFalse::with_ident("t".into(), "q", false);
        let xml = item.to_xml().to_xml_string().unwrap();
        assert!(xml.contains(r#"<varequal respident="t">t-02</varequal>"#));
    }

    #[test]
    fn record_round_trips() {
        let record = json!({ "question": "<p>1+1=2</p>", "answer": true });
        let item = TrueFalse::from_record(&record).unwrap();
        assert_eq!(item.to_record(), record);
    }

    #[test]
    fn missing_answer_is_named() {
        let err = TrueFalse::from_record(&json!({ "question": "q" })).unwrap_err();
        assert!(matches!(err, ItemError::MalformedRecord(ref msg) if msg.contains("answer")));
    }

    #[test]
    fn xml_round_trip_preserves_answer() {
        for answer in [true, false] {
            let item = TrueFalse::new("<p>One is one more than zero.</p>", answer);
            assert_eq!(TrueFalse::from_xml(&item.to_xml()).unwrap(), item);
        }
    }

    #[test]
    fn labels_match_case_insensitively() {
        let xml = TrueFalse::with_ident("t".into(), "q", true)
            .to_xml()
            .to_xml_string()
            .unwrap()
            .replace(">True<", ">TRUE<");

        let parsed = TrueFalse::from_xml(&Element::parse(&xml).unwrap()).unwrap();
        assert!(parsed.answer());
    }

    #[test]
    fn foreign_choice_idents_are_resolved_by_label() {
        let xml = TrueFalse::with_ident("t".into(), "q", false)
            .to_xml()
            .to_xml_string()
            .unwrap()
            .replace("t-01", "yes")
            .replace("t-02", "no");

        let parsed = TrueFalse::from_xml(&Element::parse(&xml).unwrap()).unwrap();
        assert!(!parsed.answer());
        assert!(parsed
            .to_xml()
            .to_xml_string()
            .unwrap()
            .contains(r#"<varequal respident="t">t-02</varequal>"#));
    }

    #[test]
    fn unknown_label_is_malformed() {
        let xml = TrueFalse::with_ident("t".into(), "q", true)
            .to_xml()
            .to_xml_string()
            .unwrap()
            .replace(">True<", ">Maybe<");

        assert!(matches!(
            TrueFalse::from_xml(&Element::parse(&xml).unwrap()),
            Err(ItemError::MalformedXml(ref msg)) if msg.contains("Maybe")
        ));
    }
}
