//! Record builder: turns an [`AttributeSet`] into the ordered data elements
//! of the primary subfile.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::dlid::{
    pdf_417::{is_reserved, subfile_type_str, EmptySubfile},
    types::{encode_latin1, uppercase_latin1, EncodingError, TransformError},
    CanonicalField, DataElement, DocumentKind, EmptyPolicy, MissingDataElement, UnknownElement,
};

pub const DEFAULT_SUBSTITUTE_TOKEN: &str = "NONE";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Missing(#[from] MissingDataElement<DataElement>),

    #[error("{element}: malformed date {value:?}")]
    MalformedDate { element: DataElement, value: String },

    #[error("{element}: invalid value {value:?}")]
    InvalidValue { element: DataElement, value: String },

    #[error("{element}: value contains reserved separator byte {byte:#04x}")]
    ReservedByte { element: String, byte: u8 },

    #[error("{element}: character {character:?} has no single-byte encoding")]
    NotSingleByte { element: String, character: char },

    #[error("{0} is mandatory and cannot be excluded")]
    MandatoryExcluded(DataElement),

    #[error(transparent)]
    UnknownElement(#[from] UnknownElement),

    #[error("invalid jurisdiction element identifier {0:?}")]
    JurisdictionElementId(String),

    #[error("jurisdiction elements belong to different subfiles ({0} and {1})")]
    MixedJurisdictionSubfiles(String, String),

    #[error(transparent)]
    EmptySubfile(#[from] EmptySubfile),

    #[error("invalid substitute token: {0}")]
    SubstituteToken(EncodingError),

    #[error("substitute token is empty")]
    EmptySubstituteToken,
}

impl ValidationError {
    fn encoding(element: &str, e: EncodingError) -> Self {
        match e {
            EncodingError::ReservedByte(byte) => Self::ReservedByte {
                element: element.to_owned(),
                byte,
            },
            EncodingError::NotSingleByte(character) => Self::NotSingleByte {
                element: element.to_owned(),
                character,
            },
        }
    }
}

/// Personal and document attributes of one card.
///
/// Field names match the catalog element names. Dates are free-form strings,
/// normalized by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeSet {
    pub document_kind: DocumentKind,

    pub document_number: String,
    pub surname: String,
    pub given_name: String,
    pub middle_name: String,

    pub vehicle_class: String,
    pub restrictions: String,
    pub endorsements: String,

    pub issue_date: String,
    pub date_of_birth: String,
    pub expiry_date: String,
    pub revision_date: String,

    pub sex: String,
    pub height: String,
    pub eye_color: String,
    pub hair_color: String,
    pub weight: String,
    pub race: String,

    pub street: String,
    pub street_2: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,

    pub document_discriminator: String,
    pub country: String,
    pub audit_code: String,

    /// "REAL ID" compliant.
    pub compliant: bool,
    pub organ_donor: bool,
    pub veteran: bool,

    /// Elements of the jurisdiction-specific subfile.
    pub jurisdiction_elements: Vec<JurisdictionElement>,
}

impl AttributeSet {
    fn raw_value(&self, element: DataElement) -> &str {
        use DataElement::*;
        match element {
            CustomerIdNumber => &self.document_number,
            CustomerFamilyName => &self.surname,
            FamilyNameTruncation => truncation_flag(&self.surname),
            CustomerFirstName => &self.given_name,
            FirstNameTruncation => truncation_flag(&self.given_name),
            CustomerMiddleName => &self.middle_name,
            MiddleNameTruncation => truncation_flag(&self.middle_name),
            VehicleClass => &self.vehicle_class,
            RestrictionCodes => &self.restrictions,
            EndorsementCodes => &self.endorsements,
            DocumentIssueDate => &self.issue_date,
            DateOfBirth => &self.date_of_birth,
            DocumentExpirationDate => &self.expiry_date,
            Sex => &self.sex,
            Height => &self.height,
            EyeColor => &self.eye_color,
            HairColor => &self.hair_color,
            WeightInPounds => &self.weight,
            RaceOrEthnicity => &self.race,
            AddressStreet1 => &self.street,
            AddressStreet2 => &self.street_2,
            AddressCity => &self.city,
            AddressJurisdictionCode => &self.region,
            AddressPostalCode => &self.postal_code,
            DocumentDiscriminator => &self.document_discriminator,
            CountryIdentification => &self.country,
            InventoryControlNumber => &self.audit_code,
            CardRevisionDate => &self.revision_date,
            ComplianceType => {
                if self.compliant {
                    "F"
                } else {
                    "N"
                }
            }
            OrganDonorIndicator => indicator(self.organ_donor),
            VeteranIndicator => indicator(self.veteran),
        }
    }
}

fn indicator(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        ""
    }
}

/// Name elements longer than their field are truncated.
fn truncates(element: DataElement) -> bool {
    matches!(
        element,
        DataElement::CustomerFamilyName
            | DataElement::CustomerFirstName
            | DataElement::CustomerMiddleName
    )
}

fn truncation_flag(name: &str) -> &'static str {
    let max = DataElement::CustomerFamilyName.info().format.width.max();
    if uppercase_latin1(name.trim()).chars().count() > max {
        "T"
    } else {
        "N"
    }
}

/// Element of a jurisdiction-specific (`Z?`) subfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionElement {
    pub id: String,
    pub value: String,
}

impl JurisdictionElement {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    fn parse_id(&self) -> Result<[u8; 3], ValidationError> {
        let invalid = || ValidationError::JurisdictionElementId(self.id.clone());
        let id = <[u8; 3]>::try_from(self.id.as_bytes()).map_err(|_| invalid())?;
        if id[0] != b'Z'
            || !id[1].is_ascii_uppercase()
            || !id[2].is_ascii_uppercase() && !id[2].is_ascii_digit()
        {
            return Err(invalid());
        }

        Ok(id)
    }
}

/// Which optional elements are serialized.
///
/// Every element is visible unless excluded. Mandatory elements cannot be
/// excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, bool>",
    into = "BTreeMap<String, bool>"
)]
pub struct FieldVisibilityConfig {
    excluded: BTreeSet<DataElement>,
}

impl FieldVisibilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, element: DataElement, visible: bool) -> Result<(), ValidationError> {
        if visible {
            self.excluded.remove(&element);
        } else {
            if element.is_mandatory() {
                return Err(ValidationError::MandatoryExcluded(element));
            }
            self.excluded.insert(element);
        }

        Ok(())
    }

    pub fn exclude(&mut self, element: DataElement) -> Result<(), ValidationError> {
        self.set(element, false)
    }

    pub fn include(&mut self, element: DataElement) {
        self.excluded.remove(&element);
    }

    pub fn excluding(mut self, element: DataElement) -> Result<Self, ValidationError> {
        self.exclude(element)?;
        Ok(self)
    }

    pub fn is_visible(&self, element: DataElement) -> bool {
        !self.excluded.contains(&element)
    }

    pub fn excluded(&self) -> impl '_ + Iterator<Item = DataElement> {
        self.excluded.iter().copied()
    }
}

impl TryFrom<BTreeMap<String, bool>> for FieldVisibilityConfig {
    type Error = ValidationError;

    fn try_from(map: BTreeMap<String, bool>) -> Result<Self, Self::Error> {
        let mut config = Self::new();
        for (name, visible) in map {
            config.set(DataElement::parse(&name)?, visible)?;
        }

        Ok(config)
    }
}

impl From<FieldVisibilityConfig> for BTreeMap<String, bool> {
    fn from(config: FieldVisibilityConfig) -> Self {
        config
            .excluded
            .into_iter()
            .map(|e| (e.name().to_owned(), false))
            .collect()
    }
}

/// Builder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOptions {
    substitute_token: Vec<u8>,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            substitute_token: DEFAULT_SUBSTITUTE_TOKEN.as_bytes().to_vec(),
        }
    }
}

impl RecordOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value serialized for included elements left empty.
    pub fn with_substitute_token(mut self, token: &str) -> Result<Self, ValidationError> {
        let bytes = encode_latin1(token).map_err(ValidationError::SubstituteToken)?;
        if bytes.is_empty() {
            return Err(ValidationError::EmptySubstituteToken);
        }

        self.substitute_token = bytes;
        Ok(self)
    }

    pub fn substitute_token(&self) -> &[u8] {
        &self.substitute_token
    }
}

fn check_reserved(element: &str, raw: &str) -> Result<(), ValidationError> {
    match raw.bytes().find(|&b| is_reserved(b)) {
        Some(byte) => Err(ValidationError::ReservedByte {
            element: element.to_owned(),
            byte,
        }),
        None => Ok(()),
    }
}

/// Builds the data elements of the primary subfile, in canonical order.
///
/// Every value is validated here, so a record that builds always serializes.
pub fn build(
    attrs: &AttributeSet,
    visibility: &FieldVisibilityConfig,
    options: &RecordOptions,
) -> Result<Vec<CanonicalField>, ValidationError> {
    let mut fields = Vec::with_capacity(DataElement::COUNT);

    for element in DataElement::LIST {
        if !element.applies_to(attrs.document_kind) {
            continue;
        }

        let info = element.info();
        if !info.is_mandatory() && !visibility.is_visible(element) {
            trace!(id = element.string_id(), "excluded");
            continue;
        }

        let raw = attrs.raw_value(element);
        check_reserved(element.string_id(), raw)?;

        let value = if raw.trim().is_empty() {
            match info.empty {
                EmptyPolicy::Reject => return Err(MissingDataElement(element).into()),
                EmptyPolicy::Substitute => options.substitute_token.clone(),
                EmptyPolicy::Default(value) => value.as_bytes().to_vec(),
                EmptyPolicy::Omit => {
                    trace!(id = element.string_id(), "omitted");
                    continue;
                }
            }
        } else {
            normalize(element, raw)?
        };

        let field = CanonicalField::new(*element.id(), value)
            .map_err(|e| ValidationError::encoding(element.string_id(), e))?;
        trace!(id = element.string_id(), "included");
        fields.push(field);
    }

    Ok(fields)
}

fn normalize(element: DataElement, raw: &str) -> Result<Vec<u8>, ValidationError> {
    let info = element.info();

    let mut value = info.transform.apply(raw).map_err(|e| match e {
        TransformError::MalformedDate(value) => ValidationError::MalformedDate { element, value },
        TransformError::Malformed(value) => ValidationError::InvalidValue { element, value },
    })?;

    if truncates(element) {
        let max = info.format.width.max();
        if let Some((i, _)) = value.char_indices().nth(max) {
            value.truncate(i);
        }
    }

    let bytes = encode_latin1(&value).map_err(|e| ValidationError::encoding(element.string_id(), e))?;
    if !info.format.accepts(&bytes) {
        return Err(ValidationError::InvalidValue { element, value });
    }

    Ok(bytes)
}

/// Builds the jurisdiction-specific subfile, if the record has any
/// jurisdiction elements.
///
/// The subfile type is given by the first two characters of the element
/// identifiers, which must all agree.
pub fn build_jurisdiction_fields(
    attrs: &AttributeSet,
    options: &RecordOptions,
) -> Result<Option<([u8; 2], Vec<CanonicalField>)>, ValidationError> {
    let Some(first) = attrs.jurisdiction_elements.first() else {
        return Ok(None);
    };

    let first_id = first.parse_id()?;
    let subfile_type = [first_id[0], first_id[1]];

    let mut fields = Vec::with_capacity(attrs.jurisdiction_elements.len());
    for element in &attrs.jurisdiction_elements {
        let id = element.parse_id()?;
        if id[..2] != subfile_type {
            return Err(ValidationError::MixedJurisdictionSubfiles(
                subfile_type_str(&subfile_type),
                subfile_type_str(&[id[0], id[1]]),
            ));
        }

        check_reserved(&element.id, &element.value)?;
        let value = element.value.trim();
        let bytes = if value.is_empty() {
            options.substitute_token.clone()
        } else {
            encode_latin1(value).map_err(|e| ValidationError::encoding(&element.id, e))?
        };

        let field =
            CanonicalField::new(id, bytes).map_err(|e| ValidationError::encoding(&element.id, e))?;
        fields.push(field);
    }

    Ok(Some((subfile_type, fields)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> AttributeSet {
        AttributeSet {
            document_number: "171625540".to_owned(),
            surname: "gooding".to_owned(),
            given_name: "Lacey".to_owned(),
            date_of_birth: "09231990".to_owned(),
            issue_date: "04/20/2021".to_owned(),
            expiry_date: "09232026".to_owned(),
            revision_date: "10302015".to_owned(),
            sex: "F".to_owned(),
            ..Default::default()
        }
    }

    fn ids(fields: &[CanonicalField]) -> Vec<String> {
        fields.iter().map(CanonicalField::id_str).collect()
    }

    #[test]
    fn canonical_order_and_defaults() {
        let fields = build(&attrs(), &FieldVisibilityConfig::new(), &RecordOptions::new()).unwrap();

        assert_eq!(
            ids(&fields),
            [
                "DAQ", "DCS", "DDE", "DAC", "DDF", "DAD", "DDG", "DCA", "DCB", "DCD", "DBD",
                "DBB", "DBA", "DBC", "DAU", "DAY", "DAZ", "DAW", "DCL", "DAG", "DAI", "DAJ",
                "DAK", "DCF", "DCG", "DDB", "DDA"
            ]
        );

        let value = |id: &str| {
            fields
                .iter()
                .find(|f| f.id_str() == id)
                .map(CanonicalField::value_text)
                .unwrap()
        };
        assert_eq!(value("DCS"), "GOODING");
        assert_eq!(value("DBD"), "04202021");
        assert_eq!(value("DBC"), "2");
        assert_eq!(value("DAD"), "NONE");
        assert_eq!(value("DDE"), "N");
        assert_eq!(value("DCG"), "USA");
        assert_eq!(value("DDA"), "N");
    }

    #[test]
    fn id_cards_skip_privileges() {
        let attrs = AttributeSet {
            document_kind: DocumentKind::IdCard,
            ..attrs()
        };
        let fields = build(&attrs, &FieldVisibilityConfig::new(), &RecordOptions::new()).unwrap();
        let ids = ids(&fields);

        assert!(!ids.iter().any(|id| id == "DCA" || id == "DCB" || id == "DCD"));
    }

    #[test]
    fn blank_mandatory_element_is_an_error() {
        let attrs = AttributeSet {
            surname: "   ".to_owned(),
            ..attrs()
        };

        assert_eq!(
            build(&attrs, &FieldVisibilityConfig::new(), &RecordOptions::new()),
            Err(ValidationError::Missing(MissingDataElement(
                DataElement::CustomerFamilyName
            )))
        );
    }

    #[test]
    fn trailing_linefeed_is_rejected_not_trimmed() {
        let attrs = AttributeSet {
            surname: "GOODING\n".to_owned(),
            ..attrs()
        };

        assert_eq!(
            build(&attrs, &FieldVisibilityConfig::new(), &RecordOptions::new()),
            Err(ValidationError::ReservedByte {
                element: "DCS".to_owned(),
                byte: b'\n'
            })
        );
    }

    #[test]
    fn malformed_date() {
        let attrs = AttributeSet {
            expiry_date: "2026/09".to_owned(),
            ..attrs()
        };

        assert!(matches!(
            build(&attrs, &FieldVisibilityConfig::new(), &RecordOptions::new()),
            Err(ValidationError::MalformedDate {
                element: DataElement::DocumentExpirationDate,
                ..
            })
        ));
    }

    #[test]
    fn format_violations() {
        let attrs = AttributeSet {
            eye_color: "BLUE".to_owned(),
            ..attrs()
        };

        assert!(matches!(
            build(&attrs, &FieldVisibilityConfig::new(), &RecordOptions::new()),
            Err(ValidationError::InvalidValue {
                element: DataElement::EyeColor,
                ..
            })
        ));
    }

    #[test]
    fn long_names_are_truncated_and_flagged() {
        let attrs = AttributeSet {
            surname: "A".repeat(45),
            ..attrs()
        };
        let fields = build(&attrs, &FieldVisibilityConfig::new(), &RecordOptions::new()).unwrap();

        assert_eq!(fields[1].value(), "A".repeat(40).as_bytes());
        assert_eq!(fields[2].id(), b"DDE");
        assert_eq!(fields[2].value(), b"T");
    }

    #[test]
    fn flags() {
        let attrs = AttributeSet {
            compliant: true,
            organ_donor: true,
            ..attrs()
        };
        let fields = build(&attrs, &FieldVisibilityConfig::new(), &RecordOptions::new()).unwrap();
        let tail: Vec<_> = fields[fields.len() - 2..].iter().map(ToString::to_string).collect();

        assert_eq!(tail, ["DDA=\"F\"", "DDK=\"1\""]);
    }

    #[test]
    fn substitute_token_is_configurable() {
        let options = RecordOptions::new().with_substitute_token("unavl").unwrap();
        let fields = build(&attrs(), &FieldVisibilityConfig::new(), &options).unwrap();

        assert_eq!(fields[5].id(), b"DAD");
        assert_eq!(fields[5].value(), b"unavl");

        assert!(RecordOptions::new().with_substitute_token("NO\rNE").is_err());
        assert!(RecordOptions::new().with_substitute_token("").is_err());
    }

    #[test]
    fn mandatory_elements_cannot_be_excluded() {
        assert_eq!(
            FieldVisibilityConfig::new().exclude(DataElement::DateOfBirth),
            Err(ValidationError::MandatoryExcluded(DataElement::DateOfBirth))
        );
    }

    #[test]
    fn visibility_from_map() {
        let map = BTreeMap::from([
            ("height".to_owned(), false),
            ("DAY".to_owned(), false),
            ("weight".to_owned(), true),
        ]);
        let config = FieldVisibilityConfig::try_from(map).unwrap();

        assert!(!config.is_visible(DataElement::Height));
        assert!(!config.is_visible(DataElement::EyeColor));
        assert!(config.is_visible(DataElement::WeightInPounds));

        let map = BTreeMap::from([("sex".to_owned(), false)]);
        assert!(FieldVisibilityConfig::try_from(map).is_err());
    }

    #[test]
    fn jurisdiction_elements() {
        let with_elements = AttributeSet {
            jurisdiction_elements: vec![
                JurisdictionElement::new("ZCA", "BLK"),
                JurisdictionElement::new("ZCB", ""),
            ],
            ..attrs()
        };

        let (subfile_type, fields) = build_jurisdiction_fields(&with_elements, &RecordOptions::new())
            .unwrap()
            .unwrap();
        assert_eq!(subfile_type, *b"ZC");
        assert_eq!(fields[1].value(), b"NONE");

        let mixed = AttributeSet {
            jurisdiction_elements: vec![
                JurisdictionElement::new("ZCA", "1"),
                JurisdictionElement::new("ZVA", "2"),
            ],
            ..attrs()
        };
        assert!(matches!(
            build_jurisdiction_fields(&mixed, &RecordOptions::new()),
            Err(ValidationError::MixedJurisdictionSubfiles(..))
        ));

        let bad = AttributeSet {
            jurisdiction_elements: vec![JurisdictionElement::new("DAQ", "1")],
            ..attrs()
        };
        assert!(matches!(
            build_jurisdiction_fields(&bad, &RecordOptions::new()),
            Err(ValidationError::JurisdictionElementId(_))
        ));
    }
}
