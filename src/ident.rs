//! Item identifiers.
//!
//! Every item owns one root identifier, a random 128-bit token rendered in the
//! hyphenated 8-4-4-4-12 hex form. All sub-identifiers inside an item (answer
//! choices, response slots) are derived from the root as `<root>-<suffix>`, so
//! only the root ever needs to be stored.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix of the synthesized "True" choice of a true/false item.
pub const TRUE_SUFFIX: &str = "01";

/// Suffix of the synthesized "False" choice of a true/false item.
pub const FALSE_SUFFIX: &str = "02";

/// Suffix of the fill-in-the-blank response slot.
pub const BLANK_RESPONSE_SUFFIX: &str = "resp";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Default for Identifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Identifier {
    /// Generates a fresh identifier from the thread-local random source.
    pub fn new() -> Self {
        Self::from_rng(&mut rand::thread_rng())
    }

    /// Generates a fresh identifier from the given random source.
    ///
    /// Seeded generators give reproducible identifiers, which is what tests want.
    pub fn from_rng<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Self(uuid.hyphenated().to_string())
    }

    /// Returns `<self>-<suffix>`.
    pub fn derive(&self, suffix: impl fmt::Display) -> Identifier {
        Identifier(format!("{}-{}", self.0, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn new_identifier_has_uuid_shape() {
        let ident = Identifier::new();
        let groups: Vec<usize> = ident.as_str().split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
        assert!(ident
            .as_str()
            .chars()
            .all(|c| c == '-' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn seeded_sources_are_reproducible() {
        let a = Identifier::from_rng(&mut StdRng::seed_from_u64(42));
        let b = Identifier::from_rng(&mut StdRng::seed_from_u64(42));
        let c = Identifier::from_rng(&mut StdRng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn independent_identifiers_do_not_collide() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Identifier::from_rng(&mut rng);
        let b = Identifier::from_rng(&mut rng);
        assert_ne!(a, b);
        assert_ne!(a.derive(0), b.derive(0));
    }

    #[test]
    fn derive_concatenates_suffix() {
        let ident = Identifier::from("abc");
        assert_eq!(ident.derive(3).as_str(), "abc-3");
        assert_eq!(ident.derive(TRUE_SUFFIX).as_str(), "abc-01");
        assert_eq!(ident.derive(BLANK_RESPONSE_SUFFIX).as_str(), "abc-resp");
    }
}
