//! This library encodes [AAMVA DL/ID card data streams][aamva], the payload
//! of the PDF417 barcode on the back of North American driver licenses and
//! identification cards.
//!
//! [aamva]: <https://www.aamva.org/identity/dl-id-card-design-standard>
//!
//! ```no_run
//! use aamva_barcodes::{encode, AttributeSet, FieldVisibilityConfig, FormatVersion, IssuerProfile};
//!
//! let attrs: AttributeSet = serde_json::from_str(r#"{
//!     "document_number": "171625540",
//!     "surname": "Gooding",
//!     "given_name": "Lacey",
//!     "issue_date": "04/20/2021",
//!     "date_of_birth": "09/23/1990",
//!     "expiry_date": "09/23/2026",
//!     "revision_date": "10/30/2015",
//!     "sex": "F"
//! }"#).unwrap();
//!
//! let issuer = IssuerProfile::lookup("CO").unwrap();
//! let stream = encode(&attrs, &FieldVisibilityConfig::default(), issuer, FormatVersion::Standard).unwrap();
//! std::fs::write("card.bin", stream.as_bytes()).unwrap();
//! ```
pub mod aamva;
pub mod dump;
pub mod logging;
pub mod symbol;

pub use aamva::{
    encode, AttributeSet, DataElement, DocumentKind, EncodeError, EncodedStream, Encoder,
    FieldVisibilityConfig, FormatVersion, IssuerProfile, RecordOptions,
};
pub use symbol::{encode_symbol, Pdf417Writer, SymbolEncoder, SymbolMatrix};
