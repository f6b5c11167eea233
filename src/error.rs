use thiserror::Error;

/// Errors raised while building an item from a record or from QTI-XML.
///
/// All of them are construction-time failures for a single item; nothing is
/// partially built when one is returned.
#[derive(Error, Debug)]
pub enum ItemError {
    /// A required record field is missing or has the wrong type.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A required element or attribute is missing, or the correctness encoding is
    /// ambiguous or incomplete.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// The `cc_profile` metadata field names a different item kind.
    #[error("unrecognized item profile '{found}', expected {expected}")]
    UnrecognizedItemProfile { expected: String, found: String },

    #[error("failed to write XML: {0}")]
    XmlWrite(String),
}

pub type ItemResult<T> = Result<T, ItemError>;

impl ItemError {
    pub(crate) fn record(message: impl Into<String>) -> Self {
        ItemError::MalformedRecord(message.into())
    }

    pub(crate) fn xml(message: impl Into<String>) -> Self {
        ItemError::MalformedXml(message.into())
    }
}

impl From<quick_xml::Error> for ItemError {
    fn from(err: quick_xml::Error) -> Self {
        ItemError::MalformedXml(err.to_string())
    }
}
