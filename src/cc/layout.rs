//! Shared `item` skeleton.
//!
//! Every item kind is described by an [`ItemLayout`] computed up front and
//! rendered in one pass, in the fixed order: identifier, metadata, question,
//! response, correctness. The reading half of this module pulls the same pieces
//! back out of a parsed `item` element.

use super::condition::Condition;
use crate::error::{ItemError, ItemResult};
use crate::ident::Identifier;
use crate::xml::Element;
use std::collections::HashSet;

pub const PROFILE_LABEL: &str = "cc_profile";

const SCORE_VARIABLE: &str = "SCORE";
const FULL_CREDIT: &str = "100";
const NO_CREDIT: &str = "0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multiple,
}

impl Cardinality {
    fn as_str(self) -> &'static str {
        match self {
            Cardinality::Single => "Single",
            Cardinality::Multiple => "Multiple",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextType {
    Plain,
    Html,
}

impl TextType {
    fn as_str(self) -> &'static str {
        match self {
            TextType::Plain => "text/plain",
            TextType::Html => "text/html",
        }
    }
}

pub struct ItemLayout<'a> {
    pub ident: &'a Identifier,
    pub profile: &'static str,
    pub question: &'a str,
    pub response: ResponseLayout<'a>,
    pub conditions: Vec<Condition>,
}

pub enum ResponseLayout<'a> {
    /// `response_lid` with one `response_label` per choice, in order.
    Choices {
        cardinality: Cardinality,
        texttype: TextType,
        choices: Vec<(Identifier, &'a str)>,
    },
    /// `response_str` with a dashed blank.
    Blank { ident: Identifier },
}

impl ItemLayout<'_> {
    pub fn render(self) -> Element {
        Element::new("item")
            .with_attr("ident", self.ident.as_str())
            .with_child(metadata(self.profile))
            .with_child(
                Element::new("presentation")
                    .with_child(material(TextType::Html, self.question))
                    .with_child(self.response.render(self.ident)),
            )
            .with_child(resprocessing(self.conditions))
    }
}

impl ResponseLayout<'_> {
    fn render(self, item_ident: &Identifier) -> Element {
        match self {
            ResponseLayout::Choices {
                cardinality,
                texttype,
                choices,
            } => Element::new("response_lid")
                .with_attr("ident", item_ident.as_str())
                .with_attr("rcardinality", cardinality.as_str())
                .with_child(Element::new("render_choice").with_children(
                    choices.into_iter().map(|(ident, text)| {
                        Element::new("response_label")
                            .with_attr("ident", ident.as_str())
                            .with_child(material(texttype, text))
                    }),
                )),
            ResponseLayout::Blank { ident } => Element::new("response_str")
                .with_attr("rcardinality", Cardinality::Single.as_str())
                .with_attr("ident", ident.as_str())
                .with_child(Element::new("render_fib").with_attr("prompt", "Dashline")),
        }
    }
}

fn metadata(profile: &str) -> Element {
    Element::new("itemmetadata").with_child(
        Element::new("qtimetadata").with_child(
            Element::new("qtimetadatafield")
                .with_child(Element::new("fieldlabel").with_text(PROFILE_LABEL))
                .with_child(Element::new("fieldentry").with_text(profile)),
        ),
    )
}

fn material(texttype: TextType, text: &str) -> Element {
    Element::new("material").with_child(
        Element::new("mattext")
            .with_attr("texttype", texttype.as_str())
            .with_text(text),
    )
}

fn resprocessing(conditions: Vec<Condition>) -> Element {
    Element::new("resprocessing")
        .with_child(
            Element::new("outcomes").with_child(
                Element::new("decvar")
                    .with_attr("maxvalue", FULL_CREDIT)
                    .with_attr("minvalue", NO_CREDIT)
                    .with_attr("varname", SCORE_VARIABLE)
                    .with_attr("vartype", "Decimal"),
            ),
        )
        .with_child(
            Element::new("respcondition")
                .with_attr("continue", "No")
                .with_child(
                    Element::new("conditionvar")
                        .with_children(conditions.iter().map(Condition::to_element)),
                )
                .with_child(
                    Element::new("setvar")
                        .with_attr("action", "Set")
                        .with_attr("varname", SCORE_VARIABLE)
                        .with_text(FULL_CREDIT),
                ),
        )
}

/// Returns the `cc_profile` metadata entry of an `item` element.
pub fn read_profile(item: &Element) -> ItemResult<&str> {
    let qtimetadata = item.descend(&["itemmetadata", "qtimetadata"])?;
    qtimetadata
        .children_named("qtimetadatafield")
        .find(|field| {
            field
                .child("fieldlabel")
                .and_then(Element::text)
                .is_some_and(|label| label.trim() == PROFILE_LABEL)
        })
        .and_then(|field| field.child("fieldentry"))
        .and_then(Element::text)
        .map(str::trim)
        .ok_or_else(|| ItemError::xml(format!("item has no {PROFILE_LABEL} metadata field")))
}

/// Text of a `mattext`. Markup must arrive escaped or as CDATA; element children
/// would otherwise be lost.
fn mattext_content(mattext: &Element) -> ItemResult<String> {
    if let Some(child) = mattext.children().first() {
        return Err(ItemError::xml(format!(
            "mattext holds a <{}> element, expected escaped text or CDATA",
            child.name()
        )));
    }
    Ok(mattext.text().unwrap_or_default().to_string())
}

/// The kind-independent pieces of a parsed `item`.
pub struct ItemParts<'a> {
    pub ident: Identifier,
    pub question: String,
    pub presentation: &'a Element,
    pub conditions: Vec<Condition>,
}

impl<'a> ItemParts<'a> {
    /// Reads the common skeleton after checking the item declares `profile`.
    pub fn read(item: &'a Element, profile: &'static str) -> ItemResult<Self> {
        if item.name() != "item" {
            return Err(ItemError::xml(format!(
                "expected <item> element, found <{}>",
                item.name()
            )));
        }

        let ident = Identifier::from(item.require_attr("ident")?);

        let found = read_profile(item)?;
        if found != profile {
            return Err(ItemError::UnrecognizedItemProfile {
                expected: format!("'{profile}'"),
                found: found.to_string(),
            });
        }

        let presentation = item.descend(&["presentation"])?;
        let question = mattext_content(item.descend(&["presentation", "material", "mattext"])?)?;

        let conditionvar = item.descend(&["resprocessing", "respcondition", "conditionvar"])?;
        let conditions = Condition::list_from_element(conditionvar)?;

        Ok(Self {
            ident,
            question,
            presentation,
            conditions,
        })
    }

    /// Reads the `response_lid` choices as `(ident, text)` pairs in document order,
    /// returning the response ident alongside.
    pub fn choices(&self) -> ItemResult<(String, Vec<(String, String)>)> {
        let response = self.presentation.descend(&["response_lid"])?;
        let respident = response.require_attr("ident")?.to_string();
        let render_choice = response.descend(&["render_choice"])?;

        let choices = render_choice
            .children_named("response_label")
            .map(|label| {
                let ident = label.require_attr("ident")?.trim().to_string();
                let text = mattext_content(label.descend(&["material", "mattext"])?)?;
                Ok((ident, text))
            })
            .collect::<ItemResult<Vec<_>>>()?;

        if choices.is_empty() {
            return Err(ItemError::xml("render_choice offers no response_label"));
        }

        let mut seen = HashSet::new();
        if let Some((ident, _)) = choices.iter().find(|(ident, _)| !seen.insert(ident.as_str())) {
            return Err(ItemError::xml(format!(
                "response_label ident '{ident}' is used more than once"
            )));
        }
        Ok((respident, choices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout(ident: &Identifier) -> ItemLayout<'_> {
        ItemLayout {
            ident,
            profile: "cc.multiple_choice.v0p1",
            question: "<p>Q</p>",
            response: ResponseLayout::Choices {
                cardinality: Cardinality::Single,
                texttype: TextType::Plain,
                choices: vec![(ident.derive(0), "yes"), (ident.derive(1), "no")],
            },
            conditions: vec![Condition::equal(ident.as_str(), ident.derive(0).as_str())],
        }
    }

    #[test]
    fn renders_blocks_in_fixed_order() {
        let ident = Identifier::from("1");
        let item = sample_layout(&ident).render();

        let names: Vec<&str> = item.children().iter().map(Element::name).collect();
        assert_eq!(names, vec!["itemmetadata", "presentation", "resprocessing"]);
        assert_eq!(
            item.to_xml_string().unwrap(),
            concat!(
                r#"<item ident="1"><itemmetadata><qtimetadata><qtimetadatafield>"#,
                r#"<fieldlabel>cc_profile</fieldlabel><fieldentry>cc.multiple_choice.v0p1</fieldentry>"#,
                r#"</qtimetadatafield></qtimetadata></itemmetadata><presentation><material>"#,
                r#"<mattext texttype="text/html">&lt;p&gt;Q&lt;/p&gt;</mattext></material>"#,
                r#"<response_lid ident="1" rcardinality="Single"><render_choice>"#,
                r#"<response_label ident="1-0"><material><mattext texttype="text/plain">yes</mattext></material></response_label>"#,
                r#"<response_label ident="1-1"><material><mattext texttype="text/plain">no</mattext></material></response_label>"#,
                r#"</render_choice></response_lid></presentation><resprocessing><outcomes>"#,
                r#"<decvar maxvalue="100" minvalue="0" varname="SCORE" vartype="Decimal"/></outcomes>"#,
                r#"<respcondition continue="No"><conditionvar><varequal respident="1">1-0</varequal></conditionvar>"#,
                r#"<setvar action="Set" varname="SCORE">100</setvar></respcondition></resprocessing></item>"#,
            )
        );
    }

    #[test]
    fn reads_back_rendered_parts() {
        let ident = Identifier::from("1");
        let item = sample_layout(&ident).render();

        assert_eq!(read_profile(&item).unwrap(), "cc.multiple_choice.v0p1");

        let parts = ItemParts::read(&item, "cc.multiple_choice.v0p1").unwrap();
        assert_eq!(parts.ident, ident);
        assert_eq!(parts.question, "<p>Q</p>");
        assert_eq!(parts.conditions, vec![Condition::equal("1", "1-0")]);

        let (respident, choices) = parts.choices().unwrap();
        assert_eq!(respident, "1");
        assert_eq!(
            choices,
            vec![
                ("1-0".to_string(), "yes".to_string()),
                ("1-1".to_string(), "no".to_string())
            ]
        );
    }

    #[test]
    fn profile_mismatch_is_reported() {
        let ident = Identifier::from("1");
        let item = sample_layout(&ident).render();

        let err = ItemParts::read(&item, "cc.true_false.v0p1").err().unwrap();
        assert!(matches!(err, ItemError::UnrecognizedItemProfile { ref found, .. }
            if found == "cc.multiple_choice.v0p1"));
    }

    #[test]
    fn missing_metadata_is_malformed() {
        let item = Element::new("item").with_attr("ident", "1");
        assert!(matches!(read_profile(&item), Err(ItemError::MalformedXml(_))));
    }

    #[test]
    fn missing_ident_is_malformed() {
        let item = Element::new("item");
        assert!(matches!(
            ItemParts::read(&item, "cc.fib.v0p1"),
            Err(ItemError::MalformedXml(ref msg)) if msg.contains("ident")
        ));
    }

    #[test]
    fn question_markup_as_elements_is_malformed() {
        let ident = Identifier::from("1");
        let text = sample_layout(&ident)
            .render()
            .to_xml_string()
            .unwrap()
            .replace("&lt;p&gt;Q&lt;/p&gt;", "<p>Which is <b>true</b>?</p>");
        let item = Element::parse(&text).unwrap();

        assert!(matches!(
            ItemParts::read(&item, "cc.multiple_choice.v0p1"),
            Err(ItemError::MalformedXml(ref msg)) if msg.contains("<p>")
        ));
    }

    #[test]
    fn choice_markup_as_elements_is_malformed() {
        let ident = Identifier::from("1");
        let text = sample_layout(&ident)
            .render()
            .to_xml_string()
            .unwrap()
            .replace(">yes<", "><b>yes</b><");
        let item = Element::parse(&text).unwrap();
        let parts = ItemParts::read(&item, "cc.multiple_choice.v0p1").unwrap();

        assert!(matches!(parts.choices(), Err(ItemError::MalformedXml(_))));
    }

    #[test]
    fn cdata_question_is_read_verbatim() {
        let ident = Identifier::from("1");
        let text = sample_layout(&ident)
            .render()
            .to_xml_string()
            .unwrap()
            .replace("&lt;p&gt;Q&lt;/p&gt;", "<![CDATA[<p>Q</p>]]>");
        let item = Element::parse(&text).unwrap();

        let parts = ItemParts::read(&item, "cc.multiple_choice.v0p1").unwrap();
        assert_eq!(parts.question, "<p>Q</p>");
    }

    #[test]
    fn duplicate_choice_idents_are_malformed() {
        let ident = Identifier::from("1");
        let text = sample_layout(&ident)
            .render()
            .to_xml_string()
            .unwrap()
            .replace(r#"<response_label ident="1-1">"#, r#"<response_label ident="1-0">"#);
        let item = Element::parse(&text).unwrap();
        let parts = ItemParts::read(&item, "cc.multiple_choice.v0p1").unwrap();

        assert!(matches!(
            parts.choices(),
            Err(ItemError::MalformedXml(ref msg)) if msg.contains("1-0")
        ));
    }
}
