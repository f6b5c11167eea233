//! Answer-state normalization for multiple response items.
//!
//! Three legacy encodings of "which choices are correct" are accepted on read:
//!
//! 1. [`AnswerEncoding::AnyOf`]: an `or` listing only the correct choices.
//! 2. [`AnswerEncoding::ImplicitAll`]: bare `varequal` (correct) and `not/varequal`
//!    (incorrect) conditions directly under `conditionvar`.
//! 3. [`AnswerEncoding::ExplicitAll`]: the same mix wrapped in an `and`.
//!
//! Writing always produces the explicit `and` form, one condition per choice in
//! declaration order.

use super::condition::Condition;
use crate::error::{ItemError, ItemResult};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerEncoding {
    AnyOf,
    ImplicitAll,
    ExplicitAll,
}

/// Per-choice correctness aligned with the rendered choice order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerStates {
    pub encoding: AnswerEncoding,
    pub states: Vec<bool>,
}

/// Encodes choice states as `and` of positive and negated `varequal`s.
pub fn encode<'a>(
    respident: &str,
    choices: impl IntoIterator<Item = (&'a str, bool)>,
) -> Condition {
    Condition::And(
        choices
            .into_iter()
            .map(|(ident, correct)| {
                let equal = Condition::equal(respident, ident);
                if correct {
                    equal
                } else {
                    equal.negate()
                }
            })
            .collect(),
    )
}

/// Decodes the conditions under `conditionvar` into one state per choice id.
///
/// `respident` is the ident of the rendered `response_lid`; `choice_ids` are the
/// rendered `response_label` idents in order.
pub fn decode(
    conditions: &[Condition],
    respident: &str,
    choice_ids: &[&str],
) -> ItemResult<AnswerStates> {
    if let Some(listing) = conditions.iter().find_map(|c| match c {
        Condition::Or(items) => Some(items),
        _ => None,
    }) {
        let states = decode_any_of(listing, respident, choice_ids)?;
        debug!(encoding = ?AnswerEncoding::AnyOf, "decoded answer states");
        return Ok(AnswerStates {
            encoding: AnswerEncoding::AnyOf,
            states,
        });
    }

    let (encoding, items) = match conditions.iter().find_map(|c| match c {
        Condition::And(items) => Some(items),
        _ => None,
    }) {
        Some(items) => (AnswerEncoding::ExplicitAll, items.as_slice()),
        None => (AnswerEncoding::ImplicitAll, conditions),
    };

    let states = decode_all(items, respident, choice_ids)?;
    debug!(?encoding, "decoded answer states");
    Ok(AnswerStates { encoding, states })
}

fn decode_any_of(
    listing: &[Condition],
    respident: &str,
    choice_ids: &[&str],
) -> ItemResult<Vec<bool>> {
    let mut states = vec![false; choice_ids.len()];
    for condition in listing {
        match condition {
            Condition::Equal {
                respident: found,
                value,
                ..
            } => {
                Condition::check_respident(found.as_deref(), respident)?;
                states[position(choice_ids, value)?] = true;
            }
            _ => {
                return Err(ItemError::xml(
                    "<or> answer listing may only contain varequal conditions",
                ))
            }
        }
    }
    Ok(states)
}

fn decode_all(items: &[Condition], respident: &str, choice_ids: &[&str]) -> ItemResult<Vec<bool>> {
    let mut states: Vec<Option<bool>> = vec![None; choice_ids.len()];

    for condition in items {
        let (found, value, correct) = match condition {
            Condition::Equal {
                respident, value, ..
            } => (respident, value, true),
            Condition::Not(inner) => match inner.as_ref() {
                Condition::Equal {
                    respident, value, ..
                } => (respident, value, false),
                _ => return Err(ItemError::xml("<not> must wrap a varequal condition")),
            },
            _ => {
                return Err(ItemError::xml(
                    "answer conditions must be varequal or not/varequal",
                ))
            }
        };

        Condition::check_respident(found.as_deref(), respident)?;
        let index = position(choice_ids, value)?;
        match states[index] {
            Some(previous) if previous != correct => {
                return Err(ItemError::xml(format!(
                    "choice '{}' is marked both correct and incorrect",
                    choice_ids[index]
                )))
            }
            _ => states[index] = Some(correct),
        }
    }

    states
        .into_iter()
        .zip(choice_ids)
        .map(|(state, ident)| {
            state.ok_or_else(|| {
                ItemError::xml(format!(
                    "choice '{ident}' is not covered by any correctness condition"
                ))
            })
        })
        .collect()
}

fn position(choice_ids: &[&str], value: &str) -> ItemResult<usize> {
    let value = value.trim();
    choice_ids
        .iter()
        .position(|ident| *ident == value)
        .ok_or_else(|| {
            ItemError::xml(format!(
                "correctness condition references unknown choice '{value}'"
            ))
        })
}
