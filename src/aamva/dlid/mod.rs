/// AAMVA DL/ID Card Design Standard.
///
/// See: <https://www.aamva.org/assets/best-practices,-guides,-standards,-manuals,-whitepapers/aamva-dl-id-card-design-standard-(2020)>
mod macros;

pub(crate) use macros::*;

pub mod types;
use types::{ElementFormat, ValueTransform};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing data element `{0}`")]
pub struct MissingDataElement<T>(pub T);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data element `{0}`")]
pub struct UnknownElement(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// Always serialized, never excluded.
    Mandatory,

    /// Serialized unless excluded by the visibility configuration.
    Optional,
}

/// What to serialize when an included element has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmptyPolicy {
    /// The record is invalid.
    Reject,

    /// The configured substitute token (`NONE` by default).
    Substitute,

    /// A fixed value.
    Default(&'static str),

    /// The element is left out.
    Omit,
}

/// Catalog entry of a data element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementInfo {
    pub element: DataElement,
    pub label: &'static str,
    pub presence: Presence,
    pub format: ElementFormat,
    pub transform: ValueTransform,
    pub empty: EmptyPolicy,
}

impl ElementInfo {
    pub fn is_mandatory(&self) -> bool {
        self.presence == Presence::Mandatory
    }
}

mod dl;
pub use dl::*;

pub mod pdf_417;
pub use pdf_417::{CanonicalField, File, FormatVersion, Subfile};
