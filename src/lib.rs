//! Conversion between canonical question records and Common Cartridge QTI items.
//!
//! Items live in [`cc`]; [`xml`] holds the element tree both directions go
//! through, and [`ident`] mints the identifiers the markup cross-references.

pub mod cc;
pub mod error;
pub mod ident;
pub mod xml;

pub use cc::{Item, ItemKind};
pub use error::{ItemError, ItemResult};
pub use ident::Identifier;
