//! AAMVA DL/ID card data streams.
//!
//! A card's attributes go through four stages before they reach the PDF417
//! encoder:
//!
//! 1. [`record::build`] validates and normalizes the attributes into an
//!    ordered list of [`CanonicalField`]s, honoring the
//!    [`FieldVisibilityConfig`].
//! 2. [`Subfile::serialize`] lays each list out as a subfile.
//! 3. [`dlid::pdf_417::compose`] writes the header and subfile designators
//!    from the measured subfile lengths.
//! 4. [`assemble`] concatenates everything and reads the header back to
//!    check it against the assembled bytes.
//!
//! [`Encoder`] runs the whole pipeline.
use tracing::{debug, debug_span};

pub mod dlid;
pub use dlid::{
    pdf_417::{compose, CapacityError, EmptySubfile},
    CanonicalField, DataElement, DocumentKind, FormatVersion, Subfile,
};

mod jurisdiction;
pub use jurisdiction::*;

pub mod record;
pub use record::{
    AttributeSet, FieldVisibilityConfig, JurisdictionElement, RecordOptions, ValidationError,
};

mod stream;
pub use stream::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("stream self-check failed: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Card data stream encoder for one issuer.
#[derive(Debug, Clone)]
pub struct Encoder {
    issuer: IssuerProfile,
    format: FormatVersion,
    options: RecordOptions,
}

impl Encoder {
    pub fn new(issuer: IssuerProfile) -> Self {
        Self {
            issuer,
            format: FormatVersion::default(),
            options: RecordOptions::default(),
        }
    }

    pub fn with_format(mut self, format: FormatVersion) -> Self {
        self.format = format;
        self
    }

    pub fn with_options(mut self, options: RecordOptions) -> Self {
        self.options = options;
        self
    }

    pub fn issuer(&self) -> &IssuerProfile {
        &self.issuer
    }

    pub fn format(&self) -> FormatVersion {
        self.format
    }

    /// Encodes the attributes of a card.
    ///
    /// Elements excluded by `visibility` are left out of the stream. No
    /// bytes are produced unless every included element is valid.
    pub fn encode(
        &self,
        attrs: &AttributeSet,
        visibility: &FieldVisibilityConfig,
    ) -> Result<EncodedStream, EncodeError> {
        let _span = debug_span!(
            "encode",
            jurisdiction = %self.issuer.jurisdiction,
            format = %self.format,
        )
        .entered();

        let primary = record::build(attrs, visibility, &self.options)?;
        let jurisdiction = record::build_jurisdiction_fields(attrs, &self.options)?;

        let mut subfiles = vec![Subfile::serialize(attrs.document_kind.subfile_type(), &primary)
            .map_err(ValidationError::from)?];
        if let Some((subfile_type, fields)) = jurisdiction {
            subfiles.push(Subfile::serialize(subfile_type, &fields).map_err(ValidationError::from)?);
        }

        for subfile in &subfiles {
            debug!(
                subfile = %dlid::pdf_417::subfile_type_str(&subfile.subfile_type()),
                length = subfile.len(),
                "serialized subfile"
            );
        }

        let extents: Vec<_> = subfiles.iter().map(Subfile::extent).collect();
        let header = compose(&extents, &self.issuer, self.format)?;
        debug!(
            header_len = self.format.header_len(),
            total_length = header.total_length(),
            "composed header"
        );

        Ok(assemble(&header, &subfiles)?)
    }
}

/// Encodes the attributes of a card issued by `issuer`.
pub fn encode(
    attrs: &AttributeSet,
    visibility: &FieldVisibilityConfig,
    issuer: &IssuerProfile,
    format: FormatVersion,
) -> Result<EncodedStream, EncodeError> {
    Encoder::new(issuer.clone())
        .with_format(format)
        .encode(attrs, visibility)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes() -> AttributeSet {
        AttributeSet {
            document_number: "171625540".to_owned(),
            surname: "Gooding".to_owned(),
            given_name: "Lacey".to_owned(),
            issue_date: "04202021".to_owned(),
            date_of_birth: "09231990".to_owned(),
            expiry_date: "09232026".to_owned(),
            revision_date: "10302015".to_owned(),
            sex: "F".to_owned(),
            ..Default::default()
        }
    }

    fn colorado() -> IssuerProfile {
        IssuerProfile::lookup("CO").unwrap().clone()
    }

    #[test]
    fn encode_produces_consistent_stream() {
        let stream = encode(
            &attributes(),
            &FieldVisibilityConfig::default(),
            &colorado(),
            FormatVersion::Standard,
        )
        .unwrap();

        assert!(stream.as_bytes().starts_with(b"@\n\x1e\rANSI 636020100101DL"));
        assert_eq!(stream.regions()[0].offset, 31);
        assert_eq!(stream.regions()[0].end(), stream.len());
        assert_eq!(stream.as_bytes().last(), Some(&b'\r'));
    }

    #[test]
    fn validation_errors_produce_no_stream() {
        let mut attrs = attributes();
        attrs.date_of_birth = "02302020".to_owned();

        assert!(matches!(
            Encoder::new(colorado()).encode(&attrs, &FieldVisibilityConfig::default()),
            Err(EncodeError::Validation(ValidationError::MalformedDate { .. }))
        ));
    }

    #[test]
    fn jurisdiction_elements_get_their_own_subfile() {
        let mut attrs = attributes();
        attrs
            .jurisdiction_elements
            .push(JurisdictionElement::new("ZCA", "RESTRICTED"));

        let stream = Encoder::new(colorado())
            .with_format(FormatVersion::ControlField)
            .encode(&attrs, &FieldVisibilityConfig::default())
            .unwrap();

        assert_eq!(stream.regions().len(), 2);
        assert_eq!(stream.regions()[1].subfile_type, *b"ZC");
        assert_eq!(stream.subfile_bytes(1), Some(&b"ZCZCARESTRICTED\r"[..]));
        assert_eq!(stream.header().total_length, Some(stream.len() as u64));
    }
}
