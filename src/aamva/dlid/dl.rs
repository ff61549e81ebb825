use std::fmt;

use serde::{Deserialize, Serialize};

use super::{data_elements, ElementInfo, UnknownElement};

/// Kind of card, which selects the type of the primary subfile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    DriverLicense,
    IdCard,
}

impl DocumentKind {
    pub fn subfile_type(self) -> [u8; 2] {
        match self {
            Self::DriverLicense => *b"DL",
            Self::IdCard => *b"ID",
        }
    }
}

impl DataElement {
    /// Identification cards carry no driving privileges.
    pub fn applies_to(self, kind: DocumentKind) -> bool {
        match self {
            Self::VehicleClass | Self::RestrictionCodes | Self::EndorsementCodes => {
                kind == DocumentKind::DriverLicense
            }
            _ => true,
        }
    }

    pub fn is_mandatory(self) -> bool {
        self.info().is_mandatory()
    }

    /// Resolves either a 3 character identifier (`DAU`) or an element name
    /// (`height`).
    pub fn parse(s: &str) -> Result<Self, UnknownElement> {
        let by_id = <[u8; 3]>::try_from(s.as_bytes())
            .ok()
            .and_then(|id| Self::from_id(&id.map(|b| b.to_ascii_uppercase())));

        by_id
            .or_else(|| Self::from_name(&s.to_ascii_lowercase()))
            .ok_or_else(|| UnknownElement(s.to_owned()))
    }
}

impl fmt::Display for DataElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.info().label, self.string_id())
    }
}

/// Looks up the catalog entry of an element identifier.
pub fn lookup(identifier: &str) -> Result<ElementInfo, UnknownElement> {
    <[u8; 3]>::try_from(identifier.as_bytes())
        .ok()
        .and_then(|id| DataElement::from_id(&id))
        .map(|e| e.info())
        .ok_or_else(|| UnknownElement(identifier.to_owned()))
}

data_elements! {
    /// Data element of the primary (`DL`/`ID`) subfile.
    ///
    /// Declaration order is the order elements appear in the subfile.
    pub enum DataElement {
        /// Customer ID Number (DAQ).
        CustomerIdNumber: b"DAQ" => {
            name: "document_number",
            label: "Customer ID Number",
            presence: Mandatory,
            format: V25ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Reject,
        },

        /// Customer Family Name (DCS).
        CustomerFamilyName: b"DCS" => {
            name: "surname",
            label: "Customer Family Name",
            presence: Mandatory,
            format: V40ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Reject,
        },

        /// Family name truncation (DDE).
        FamilyNameTruncation: b"DDE" => {
            name: "family_name_truncation",
            label: "Family Name Truncation",
            presence: Optional,
            format: F1A,
            transform: ValueTransform::Verbatim,
            empty: EmptyPolicy::Default("N"),
        },

        /// Customer First Name (DAC).
        CustomerFirstName: b"DAC" => {
            name: "given_name",
            label: "Customer First Name",
            presence: Mandatory,
            format: V40ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Reject,
        },

        /// First name truncation (DDF).
        FirstNameTruncation: b"DDF" => {
            name: "first_name_truncation",
            label: "First Name Truncation",
            presence: Optional,
            format: F1A,
            transform: ValueTransform::Verbatim,
            empty: EmptyPolicy::Default("N"),
        },

        /// Customer Middle Name(s) (DAD).
        CustomerMiddleName: b"DAD" => {
            name: "middle_name",
            label: "Customer Middle Name",
            presence: Optional,
            format: V40ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Middle name truncation (DDG).
        MiddleNameTruncation: b"DDG" => {
            name: "middle_name_truncation",
            label: "Middle Name Truncation",
            presence: Optional,
            format: F1A,
            transform: ValueTransform::Verbatim,
            empty: EmptyPolicy::Default("N"),
        },

        /// Jurisdiction-specific vehicle class (DCA).
        VehicleClass: b"DCA" => {
            name: "vehicle_class",
            label: "Vehicle Class",
            presence: Optional,
            format: V6ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Jurisdiction-specific restriction codes (DCB).
        RestrictionCodes: b"DCB" => {
            name: "restrictions",
            label: "Restriction Codes",
            presence: Optional,
            format: V12ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Jurisdiction-specific endorsement codes (DCD).
        EndorsementCodes: b"DCD" => {
            name: "endorsements",
            label: "Endorsement Codes",
            presence: Optional,
            format: V5ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Document Issue Date (DBD).
        DocumentIssueDate: b"DBD" => {
            name: "issue_date",
            label: "Document Issue Date",
            presence: Mandatory,
            format: F8N,
            transform: ValueTransform::Date,
            empty: EmptyPolicy::Reject,
        },

        /// Date of Birth (DBB).
        DateOfBirth: b"DBB" => {
            name: "date_of_birth",
            label: "Date of Birth",
            presence: Mandatory,
            format: F8N,
            transform: ValueTransform::Date,
            empty: EmptyPolicy::Reject,
        },

        /// Document Expiration Date (DBA).
        DocumentExpirationDate: b"DBA" => {
            name: "expiry_date",
            label: "Document Expiration Date",
            presence: Mandatory,
            format: F8N,
            transform: ValueTransform::Date,
            empty: EmptyPolicy::Reject,
        },

        /// Physical Description – Sex (DBC).
        Sex: b"DBC" => {
            name: "sex",
            label: "Sex",
            presence: Mandatory,
            format: F1N,
            transform: ValueTransform::Sex,
            empty: EmptyPolicy::Reject,
        },

        /// Physical Description – Height (DAU).
        Height: b"DAU" => {
            name: "height",
            label: "Height",
            presence: Optional,
            format: F6ANS,
            transform: ValueTransform::Height,
            empty: EmptyPolicy::Substitute,
        },

        /// Physical Description – Eye Color (DAY).
        EyeColor: b"DAY" => {
            name: "eye_color",
            label: "Eye Color",
            presence: Optional,
            format: F3A,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Hair color (DAZ).
        HairColor: b"DAZ" => {
            name: "hair_color",
            label: "Hair Color",
            presence: Optional,
            format: V12A,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Cardholder weight in pounds (DAW).
        WeightInPounds: b"DAW" => {
            name: "weight",
            label: "Weight (pounds)",
            presence: Optional,
            format: F3N,
            transform: ValueTransform::PadNumeric(3),
            empty: EmptyPolicy::Substitute,
        },

        /// Codes for race or ethnicity of the cardholder, as defined in AAMVA
        /// D20 (DCL).
        RaceOrEthnicity: b"DCL" => {
            name: "race",
            label: "Race / Ethnicity",
            presence: Optional,
            format: V3A,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Address – Street 1 (DAG).
        AddressStreet1: b"DAG" => {
            name: "street",
            label: "Street 1",
            presence: Optional,
            format: V35ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Second line of street portion of the cardholder address (DAH).
        AddressStreet2: b"DAH" => {
            name: "street_2",
            label: "Street 2",
            presence: Optional,
            format: V35ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Omit,
        },

        /// Address – City (DAI).
        AddressCity: b"DAI" => {
            name: "city",
            label: "City",
            presence: Optional,
            format: V20ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Address – Jurisdiction Code (DAJ).
        AddressJurisdictionCode: b"DAJ" => {
            name: "region",
            label: "Jurisdiction Code",
            presence: Optional,
            format: F2A,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Address – Postal Code (DAK).
        AddressPostalCode: b"DAK" => {
            name: "postal_code",
            label: "Postal Code",
            presence: Optional,
            format: V11ANS,
            transform: ValueTransform::PostalCode,
            empty: EmptyPolicy::Substitute,
        },

        /// Document Discriminator (DCF).
        DocumentDiscriminator: b"DCF" => {
            name: "document_discriminator",
            label: "Document Discriminator",
            presence: Optional,
            format: V25ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Substitute,
        },

        /// Country Identification (DCG).
        CountryIdentification: b"DCG" => {
            name: "country",
            label: "Country Identification",
            presence: Optional,
            format: F3A,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Default("USA"),
        },

        /// String of letters and/or numbers that is affixed to the raw
        /// materials (card stock, laminate, etc.) used in producing driver
        /// licenses and ID cards (DCK).
        InventoryControlNumber: b"DCK" => {
            name: "audit_code",
            label: "Inventory Control Number",
            presence: Optional,
            format: V25ANS,
            transform: ValueTransform::UpperCase,
            empty: EmptyPolicy::Omit,
        },

        /// DHS required field that indicates date of the most recent version
        /// change or modification to the visible format of the DL/ID (DDB).
        CardRevisionDate: b"DDB" => {
            name: "revision_date",
            label: "Card Revision Date",
            presence: Mandatory,
            format: F8N,
            transform: ValueTransform::Date,
            empty: EmptyPolicy::Reject,
        },

        /// DHS required field that indicates compliance (DDA).
        ComplianceType: b"DDA" => {
            name: "compliance",
            label: "Compliance Type",
            presence: Optional,
            format: F1A,
            transform: ValueTransform::Verbatim,
            empty: EmptyPolicy::Omit,
        },

        /// Field that indicates that the cardholder is an organ donor = "1"
        /// (DDK).
        OrganDonorIndicator: b"DDK" => {
            name: "organ_donor",
            label: "Organ Donor Indicator",
            presence: Optional,
            format: F1N,
            transform: ValueTransform::Verbatim,
            empty: EmptyPolicy::Omit,
        },

        /// Field that indicates that the cardholder is a veteran = "1" (DDL).
        VeteranIndicator: b"DDL" => {
            name: "veteran",
            label: "Veteran Indicator",
            presence: Optional,
            format: F1N,
            transform: ValueTransform::Verbatim,
            empty: EmptyPolicy::Omit,
        },
    }
}
