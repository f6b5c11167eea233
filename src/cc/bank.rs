use super::Item;
use crate::error::{ItemError, ItemResult};
use crate::ident::Identifier;
use crate::xml::Element;
use tracing::debug;

pub(crate) const QTI_NAMESPACE: &str = "http://www.imsglobal.org/xsd/ims_qtiasiv1p2";
pub(crate) const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub(crate) const QTI_SCHEMA_LOCATION: &str = "http://www.imsglobal.org/xsd/ims_qtiasiv1p2 http://www.imsglobal.org/profile/cc/ccv1p2/ccv1p2_qtiasiv1p2p1_v1p0.xsd";

/// `questestinterop` root shared by banks and assessments.
pub(crate) fn questestinterop() -> Element {
    Element::new("questestinterop")
        .with_attr("xmlns", QTI_NAMESPACE)
        .with_attr("xmlns:xsi", XSI_NAMESPACE)
        .with_attr("xsi:schemaLocation", QTI_SCHEMA_LOCATION)
}

/// A question bank: an ordered list of serialized items under one `objectbank`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bank {
    ident: String,
    items: Vec<Element>,
}

impl Default for Bank {
    fn default() -> Self {
        Self::new(Identifier::new().to_string())
    }
}

impl Bank {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            items: Vec::new(),
        }
    }

    pub fn set_ident(&mut self, ident: impl Into<String>) {
        self.ident = ident.into();
    }

    pub fn ident(&self) -> &str {
        &self.ident
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
        questestinterop().with_child(
            Element::new("objectbank")
                .with_attr("ident", self.ident.as_str())
                .with_children(self.items.iter().cloned()),
        )
    }

    pub fn to_xml_string(&self) -> ItemResult<String> {
        self.to_xml().to_xml_string()
    }
}

/// Reads every item of a bank document.
///
/// Accepts a `questestinterop` root holding an `objectbank` (or an assessment
/// `section`), or a bare `item`.
pub fn read_bank(document: &Element) -> ItemResult<Vec<Item>> {
    let container = match document.name() {
        "item" => return Ok(vec![Item::from_xml(document)?]),
        "questestinterop" => document
            .child("objectbank")
            .or_else(|| {
                document
                    .child("assessment")
                    .and_then(|a| a.child("section"))
            })
            .ok_or_else(|| {
                ItemError::xml("questestinterop holds neither an objectbank nor an assessment")
            })?,
        "objectbank" => document,
        other => {
            return Err(ItemError::xml(format!(
                "expected questestinterop, objectbank or item, found <{other}>"
            )))
        }
    };

    let items = container
        .children_named("item")
        .map(Item::from_xml)
        .collect::<ItemResult<Vec<_>>>()?;
    debug!(count = items.len(), "read items from bank");
    Ok(items)
}
