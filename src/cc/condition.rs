//! Correctness conditions (`conditionvar` content).

use super::record::CaseFlag;
use crate::error::{ItemError, ItemResult};
use crate::xml::Element;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// `varequal`: the response named by `respident` equals `value`.
    Equal {
        respident: Option<String>,
        value: String,
        case: Option<CaseFlag>,
    },
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn equal(respident: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::Equal {
            respident: Some(respident.into()),
            value: value.into(),
            case: None,
        }
    }

    pub fn equal_with_case(
        respident: impl Into<String>,
        value: impl Into<String>,
        case: CaseFlag,
    ) -> Self {
        Condition::Equal {
            respident: Some(respident.into()),
            value: value.into(),
            case: Some(case),
        }
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    pub fn to_element(&self) -> Element {
        match self {
            Condition::Equal {
                respident,
                value,
                case,
            } => {
                let mut element = Element::new("varequal");
                if let Some(case) = case {
                    element = element.with_attr("case", case.as_str());
                }
                if let Some(respident) = respident {
                    element = element.with_attr("respident", respident.as_str());
                }
                element.with_text(value.as_str())
            }
            Condition::Not(inner) => Element::new("not").with_child(inner.to_element()),
            Condition::And(items) => {
                Element::new("and").with_children(items.iter().map(Condition::to_element))
            }
            Condition::Or(items) => {
                Element::new("or").with_children(items.iter().map(Condition::to_element))
            }
        }
    }

    pub fn from_element(element: &Element) -> ItemResult<Self> {
        match element.name() {
            "varequal" => Ok(Condition::Equal {
                respident: element.attr("respident").map(str::to_string),
                value: element.text().unwrap_or_default().to_string(),
                case: element.attr("case").map(|c| CaseFlag::from_attr(Some(c))),
            }),
            "not" => match element.children() {
                [inner] => Ok(Condition::from_element(inner)?.negate()),
                _ => Err(ItemError::xml("<not> must wrap exactly one condition")),
            },
            "and" => Ok(Condition::And(Self::list_from_element(element)?)),
            "or" => Ok(Condition::Or(Self::list_from_element(element)?)),
            other => Err(ItemError::xml(format!(
                "unsupported correctness condition <{other}>"
            ))),
        }
    }

    /// Reads every condition directly under `parent` (typically `conditionvar`).
    pub fn list_from_element(parent: &Element) -> ItemResult<Vec<Condition>> {
        parent
            .children()
            .iter()
            .map(Condition::from_element)
            .collect()
    }

    /// Checks that a `varequal` addresses the expected response slot.
    ///
    /// A missing `respident` is tolerated; a different one is not.
    pub fn check_respident(respident: Option<&str>, expected: &str) -> ItemResult<()> {
        match respident {
            Some(found) if found != expected => Err(ItemError::xml(format!(
                "varequal references response '{found}', expected '{expected}'"
            ))),
            _ => Ok(()),
        }
    }
}
