use super::bank::questestinterop;
use super::layout::PROFILE_LABEL;
use super::Item;
use crate::error::ItemResult;
use crate::xml::Element;

const EXAM_PROFILE: &str = "cc.exam.v0p1";
const DEFAULT_ATTEMPTS: &str = "1";
const ROOT_SECTION: &str = "root_section";

/// An assessment: exam metadata, instructions and one section of items.
///
/// Fields are kept as plain values and rendered in one pass by [`Assessment::to_xml`],
/// so setters may be called in any order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assessment {
    ident: String,
    title: Option<String>,
    attempts: String,
    instructions: Option<String>,
    items: Vec<Element>,
}

impl Assessment {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            title: None,
            attempts: DEFAULT_ATTEMPTS.to_string(),
            instructions: None,
            items: Vec::new(),
        }
    }

    pub fn set_ident(&mut self, ident: impl Into<String>) {
        self.ident = ident.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Allowed attempts, a count or `unlimited`.
    pub fn set_attempts(&mut self, attempts: impl Into<String>) {
        self.attempts = attempts.into();
    }

    /// HTML instructions shown before the questions.
    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.instructions = Some(instructions.into());
    }

    pub fn append(&mut self, item: &Item) {
        self.items.push(item.to_xml());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_xml(&self) -> Element {
        let mut assessment = Element::new("assessment").with_attr("ident", self.ident.as_str());
        if let Some(title) = &self.title {
            assessment = assessment.with_attr("title", title.as_str());
        }

        let metadata = [
            (PROFILE_LABEL, EXAM_PROFILE),
            ("qmd_assessmenttype", "Examination"),
            ("qmd_scoretype", "Percentage"),
            ("cc_maxattempts", self.attempts.as_str()),
        ];

        let mut mattext = Element::new("mattext").with_attr("texttype", "text/html");
        if let Some(instructions) = &self.instructions {
            mattext = mattext.with_text(instructions.as_str());
        }

        questestinterop().with_child(
            assessment
                .with_child(Element::new("qtimetadata").with_children(metadata.into_iter().map(
                    |(label, entry)| {
                        Element::new("qtimetadatafield")
                            .with_child(Element::new("fieldlabel").with_text(label))
                            .with_child(Element::new("fieldentry").with_text(entry))
                    },
                )))
                .with_child(Element::new("presentation_material").with_child(
                    Element::new("flow_mat").with_child(Element::new("material").with_child(mattext)),
                ))
                .with_child(
                    Element::new("section")
                        .with_attr("ident", ROOT_SECTION)
                        .with_children(self.items.iter().cloned()),
                ),
        )
    }

    pub fn to_xml_string(&self) -> ItemResult<String> {
        self.to_xml().to_xml_string()
    }
}
