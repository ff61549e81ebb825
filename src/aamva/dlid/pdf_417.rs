//! Byte layout of the data stream carried by the PDF417 symbol.
//!
//! A stream is a header, one designator per subfile, then the subfiles
//! themselves. Every number in the header and the designators is a fixed-width
//! zero-padded decimal string.
use std::{
    fmt,
    io::{self, BufRead, Seek},
};

use serde::{Deserialize, Serialize};

use crate::aamva::IssuerProfile;

use super::types::{decode_latin1, encode_latin1, EncodingError, MaybeAscii};

const DATA_ELEMENT_SEPARATOR: u8 = b'\n';

const RECORD_SEPARATOR: u8 = 0x1e;

const SEGMENT_TERMINATOR: u8 = b'\r';

/// Compliance indicator, data element separator, record separator, segment
/// terminator and file type.
const PREFIX: [u8; 9] = *b"@\n\x1e\rANSI ";

const ISSUER_ID_DIGITS: usize = 6;

const STANDARD_HEADER_SIZE: usize = PREFIX.len() + ISSUER_ID_DIGITS + 2 + 2 + 2;

const CONTROL_FIELD_HEADER_SIZE: usize = PREFIX.len() + ISSUER_ID_DIGITS + 1 + 2 + 2 + 5 + 1;

const SUBFILE_DESIGNATOR_SIZE: usize = 2 + 4 + 4;

/// Returns `true` for the bytes that delimit elements, records and segments.
pub fn is_reserved(b: u8) -> bool {
    matches!(
        b,
        DATA_ELEMENT_SEPARATOR | RECORD_SEPARATOR | SEGMENT_TERMINATOR
    )
}

/// Header layout variant.
///
/// Both variants use 10 byte subfile designators.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatVersion {
    /// `@ LF RS CR "ANSI "`, issuer identification number (6), AAMVA version
    /// (2), jurisdiction version (2), number of entries (2).
    #[default]
    Standard,

    /// `@ LF RS CR "ANSI "`, issuer identification number (6), jurisdiction
    /// version (1), then a control field: first subfile type (2), AAMVA
    /// version (2), total stream length (5), number of entries (1).
    ControlField,
}

impl FormatVersion {
    pub const fn aamva_version(self) -> u8 {
        match self {
            Self::Standard => 10,
            Self::ControlField => 3,
        }
    }

    pub const fn header_len(self) -> usize {
        match self {
            Self::Standard => STANDARD_HEADER_SIZE,
            Self::ControlField => CONTROL_FIELD_HEADER_SIZE,
        }
    }

    pub const fn designator_len(self) -> usize {
        SUBFILE_DESIGNATOR_SIZE
    }

    pub const fn max_subfiles(self) -> usize {
        match self {
            Self::Standard => 99,
            Self::ControlField => 9,
        }
    }

    pub const fn declares_total_length(self) -> bool {
        matches!(self, Self::ControlField)
    }

    /// Offset of the first subfile.
    pub const fn data_offset(self, subfile_count: usize) -> usize {
        self.header_len() + subfile_count * self.designator_len()
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::ControlField => f.write_str("control-field"),
        }
    }
}

/// Numeric header or designator field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    IssuerId,
    AamvaVersion,
    JurisdictionVersion,
    EntryCount,
    TotalLength,
    Offset,
    Length,
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IssuerId => "issuer identification number",
            Self::AamvaVersion => "AAMVA version",
            Self::JurisdictionVersion => "jurisdiction version",
            Self::EntryCount => "number of entries",
            Self::TotalLength => "total length",
            Self::Offset => "offset",
            Self::Length => "length",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("{field} of {region} is {value}, which does not fit in {width} digits")]
    Field {
        region: String,
        field: NumericField,
        value: u64,
        width: usize,
    },

    #[error("{count} subfiles do not fit in a {format} header (1 to {max})")]
    SubfileCount {
        count: usize,
        max: usize,
        format: FormatVersion,
    },
}

/// Subfile type as printable text.
pub fn subfile_type_str(subfile_type: &[u8; 2]) -> String {
    decode_latin1(subfile_type)
}

fn render<const N: usize>(
    value: u64,
    region: &str,
    field: NumericField,
) -> Result<[u8; N], CapacityError> {
    encode_digits(value).ok_or_else(|| CapacityError::Field {
        region: region.to_owned(),
        field,
        value,
        width: N,
    })
}

/// Header as declared at the start of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format: FormatVersion,
    pub issuer_id: u32,
    pub aamva_version: u8,
    pub jurisdiction_version: u8,
    pub entry_count: u8,

    /// Type of the first subfile, repeated in the control field.
    pub document_type: Option<[u8; 2]>,

    /// Declared length of the whole stream.
    pub total_length: Option<u64>,
}

impl Header {
    pub fn decode(reader: &mut impl BufRead) -> io::Result<Self> {
        if read_array(reader)? != PREFIX {
            return Err(io::ErrorKind::InvalidData.into());
        }

        let issuer_id = decode_digits::<ISSUER_ID_DIGITS>(read_array(reader)?)? as u32;
        let lookahead: [u8; 3] = read_array(reader)?;

        if lookahead[1].is_ascii_alphabetic() {
            let jurisdiction_version = decode_digits([lookahead[0]])? as u8;
            let aamva_version = decode_digits::<2>(read_array(reader)?)? as u8;
            let total_length = decode_digits::<5>(read_array(reader)?)?;
            let entry_count = decode_digits::<1>(read_array(reader)?)? as u8;

            Ok(Self {
                format: FormatVersion::ControlField,
                issuer_id,
                aamva_version,
                jurisdiction_version,
                entry_count,
                document_type: Some([lookahead[1], lookahead[2]]),
                total_length: Some(total_length),
            })
        } else {
            let aamva_version = decode_digits([lookahead[0], lookahead[1]])? as u8;
            let [last]: [u8; 1] = read_array(reader)?;
            let jurisdiction_version = decode_digits([lookahead[2], last])? as u8;
            let entry_count = decode_digits::<2>(read_array(reader)?)? as u8;

            Ok(Self {
                format: FormatVersion::Standard,
                issuer_id,
                aamva_version,
                jurisdiction_version,
                entry_count,
                document_type: None,
                total_length: None,
            })
        }
    }

    pub fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), CapacityError> {
        const REGION: &str = "header";

        buffer.extend(PREFIX);
        buffer.extend(render::<ISSUER_ID_DIGITS>(
            self.issuer_id.into(),
            REGION,
            NumericField::IssuerId,
        )?);

        match self.format {
            FormatVersion::Standard => {
                buffer.extend(render::<2>(
                    self.aamva_version.into(),
                    REGION,
                    NumericField::AamvaVersion,
                )?);
                buffer.extend(render::<2>(
                    self.jurisdiction_version.into(),
                    REGION,
                    NumericField::JurisdictionVersion,
                )?);
                buffer.extend(render::<2>(
                    self.entry_count.into(),
                    REGION,
                    NumericField::EntryCount,
                )?);
            }
            FormatVersion::ControlField => {
                buffer.extend(render::<1>(
                    self.jurisdiction_version.into(),
                    REGION,
                    NumericField::JurisdictionVersion,
                )?);
                buffer.extend(self.document_type.unwrap_or(*b"DL"));
                buffer.extend(render::<2>(
                    self.aamva_version.into(),
                    REGION,
                    NumericField::AamvaVersion,
                )?);
                buffer.extend(render::<5>(
                    self.total_length.unwrap_or_default(),
                    REGION,
                    NumericField::TotalLength,
                )?);
                buffer.extend(render::<1>(
                    self.entry_count.into(),
                    REGION,
                    NumericField::EntryCount,
                )?);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubfileDesignator {
    pub subfile_type: [u8; 2],
    pub offset: u64,
    pub length: u64,
}

impl SubfileDesignator {
    pub fn decode(reader: &mut impl BufRead) -> io::Result<Self> {
        Ok(Self {
            subfile_type: read_array(reader)?,
            offset: decode_digits::<4>(read_array(reader)?)?,
            length: decode_digits::<4>(read_array(reader)?)?,
        })
    }

    pub fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), CapacityError> {
        let region = format!("subfile {}", subfile_type_str(&self.subfile_type));
        let offset = render::<4>(self.offset, &region, NumericField::Offset)?;
        let length = render::<4>(self.length, &region, NumericField::Length)?;
        buffer.extend(self.subfile_type);
        buffer.extend(offset);
        buffer.extend(length);
        Ok(())
    }
}

/// Measured size of a serialized subfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubfileExtent {
    pub subfile_type: [u8; 2],
    pub length: usize,
}

/// Rendered header and designators, together with the values they declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedHeader {
    pub header: Header,
    pub designators: Vec<SubfileDesignator>,
    pub preamble: Vec<u8>,
    pub descriptors: Vec<Vec<u8>>,
}

impl ComposedHeader {
    /// Stream length implied by the designators.
    pub fn total_length(&self) -> u64 {
        self.designators
            .last()
            .map(|d| d.offset + d.length)
            .unwrap_or(self.preamble.len() as u64)
    }
}

/// Composes the header and designators of a stream from the measured length
/// of each subfile, in stream order.
pub fn compose(
    extents: &[SubfileExtent],
    issuer: &IssuerProfile,
    format: FormatVersion,
) -> Result<ComposedHeader, CapacityError> {
    let count = extents.len();
    if count == 0 || count > format.max_subfiles() {
        return Err(CapacityError::SubfileCount {
            count,
            max: format.max_subfiles(),
            format,
        });
    }

    let mut offset = format.data_offset(count) as u64;
    let mut designators = Vec::with_capacity(count);
    for extent in extents {
        let length = extent.length as u64;
        designators.push(SubfileDesignator {
            subfile_type: extent.subfile_type,
            offset,
            length,
        });
        offset += length;
    }

    let header = Header {
        format,
        issuer_id: issuer.iin,
        aamva_version: format.aamva_version(),
        jurisdiction_version: issuer.jurisdiction_version,
        entry_count: count as u8,
        document_type: format
            .declares_total_length()
            .then_some(extents[0].subfile_type),
        total_length: format.declares_total_length().then_some(offset),
    };

    let mut preamble = Vec::with_capacity(format.header_len());
    header.encode(&mut preamble)?;

    let descriptors = designators
        .iter()
        .map(|d| {
            let mut bytes = Vec::with_capacity(SUBFILE_DESIGNATOR_SIZE);
            d.encode(&mut bytes)?;
            Ok(bytes)
        })
        .collect::<Result<Vec<_>, CapacityError>>()?;

    Ok(ComposedHeader {
        header,
        designators,
        preamble,
        descriptors,
    })
}

/// Reader over an encoded stream.
pub struct File<'a, R> {
    header: Header,
    subfile_designators: Vec<SubfileDesignator>,
    reader: &'a mut R,
}

impl<'a, R: BufRead> File<'a, R> {
    pub fn new(reader: &'a mut R) -> io::Result<Self> {
        let header = Header::decode(reader)?;

        let entry_count = header.entry_count as usize;
        let mut subfile_designators = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            subfile_designators.push(SubfileDesignator::decode(reader)?);
        }

        Ok(Self {
            header,
            subfile_designators,
            reader,
        })
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn designators(&self) -> &[SubfileDesignator] {
        &self.subfile_designators
    }

    pub fn index_of(&self, subfile_type: &[u8; 2]) -> Option<usize> {
        self.subfile_designators
            .iter()
            .position(|d| d.subfile_type == *subfile_type)
    }
}

impl<'a, R: BufRead + Seek> File<'a, R> {
    pub fn read_subfile<D: DecodeSubfile>(
        &mut self,
        subfile_type: &[u8; 2],
    ) -> io::Result<Option<D>> {
        match self.index_of(subfile_type) {
            Some(i) => self.read_subfile_by_index(i).map(Some),
            None => Ok(None),
        }
    }

    pub fn read_subfile_by_index<D: DecodeSubfile>(&mut self, index: usize) -> io::Result<D> {
        let desc = self
            .subfile_designators
            .get(index)
            .ok_or(io::ErrorKind::NotFound)?;
        self.reader.seek(io::SeekFrom::Start(desc.offset))?;
        D::decode_subfile(self.reader)
    }

    /// Reads every subfile, in designator order.
    pub fn read_records(&mut self) -> io::Result<Vec<Record>> {
        (0..self.subfile_designators.len())
            .map(|i| self.read_subfile_by_index(i))
            .collect()
    }
}

pub trait DecodeSubfile: Sized {
    fn decode_subfile(reader: &mut impl BufRead) -> io::Result<Self>;

    fn decode_subfile_from_bytes(bytes: &[u8]) -> io::Result<Self> {
        let mut cursor = io::Cursor::new(bytes);
        Self::decode_subfile(&mut cursor)
    }
}

/// Decoded subfile: its type and its data elements in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub subfile_type: [u8; 2],
    pub entries: Vec<CanonicalField>,
}

impl Record {
    pub fn get(&self, id: &[u8; 3]) -> Option<&CanonicalField> {
        self.entries.iter().find(|e| e.id() == id)
    }
}

impl DecodeSubfile for Record {
    fn decode_subfile(reader: &mut impl BufRead) -> io::Result<Self> {
        let subfile_type = read_array(reader)?;
        let mut entries = Vec::new();

        loop {
            let (entry, last) = CanonicalField::decode(reader)?;
            entries.push(entry);

            if last {
                break Ok(Self {
                    subfile_type,
                    entries,
                });
            }
        }
    }
}

impl DecodeSubfile for Vec<u8> {
    fn decode_subfile(reader: &mut impl BufRead) -> io::Result<Self> {
        let mut result = Vec::new();

        loop {
            let b = read_u8(reader)?;
            result.push(b);
            if b == SEGMENT_TERMINATOR {
                break Ok(result);
            }
        }
    }
}

/// Serialized subfile: the type tag followed by its data elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfile {
    subfile_type: [u8; 2],
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subfile {0} has no data elements")]
pub struct EmptySubfile(pub String);

impl Subfile {
    /// Serializes `fields` under `subfile_type`.
    ///
    /// Every element is terminated by a data element separator except the
    /// last one, which carries the segment terminator instead.
    pub fn serialize(
        subfile_type: [u8; 2],
        fields: &[CanonicalField],
    ) -> Result<Self, EmptySubfile> {
        let Some(last) = fields.len().checked_sub(1) else {
            return Err(EmptySubfile(subfile_type_str(&subfile_type)));
        };

        let capacity = 2 + fields.iter().map(CanonicalField::encoded_len).sum::<usize>();
        let mut bytes = Vec::with_capacity(capacity);
        bytes.extend(subfile_type);
        for (i, field) in fields.iter().enumerate() {
            field.encode(&mut bytes, i == last);
        }

        Ok(Self {
            subfile_type,
            bytes,
        })
    }

    pub fn subfile_type(&self) -> [u8; 2] {
        self.subfile_type
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn extent(&self) -> SubfileExtent {
        SubfileExtent {
            subfile_type: self.subfile_type,
            length: self.bytes.len(),
        }
    }
}

/// Data element: a 3 character identifier and a single-byte encoded value.
///
/// The value never contains a separator or terminator byte. The terminator
/// is chosen by the position of the element in its subfile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalField {
    id: [u8; 3],
    value: Vec<u8>,
}

impl CanonicalField {
    pub fn new(id: [u8; 3], value: Vec<u8>) -> Result<Self, EncodingError> {
        if let Some(&b) = id.iter().chain(&value).find(|&&b| is_reserved(b)) {
            return Err(EncodingError::ReservedByte(b));
        }

        Ok(Self { id, value })
    }

    pub fn from_text(id: [u8; 3], value: &str) -> Result<Self, EncodingError> {
        Self::new(id, encode_latin1(value)?)
    }

    pub fn id(&self) -> &[u8; 3] {
        &self.id
    }

    pub fn id_str(&self) -> String {
        decode_latin1(&self.id)
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn value_text(&self) -> String {
        decode_latin1(&self.value)
    }

    /// Bytes taken by this element in a subfile, terminator included.
    pub fn encoded_len(&self) -> usize {
        self.id.len() + self.value.len() + 1
    }

    pub fn decode(reader: &mut impl BufRead) -> io::Result<(Self, bool)> {
        let id: [u8; 3] = read_array(reader)?;
        let mut value = Vec::new();

        let last = loop {
            match read_u8(reader)? {
                DATA_ELEMENT_SEPARATOR => break false,
                RECORD_SEPARATOR => return Err(io::ErrorKind::InvalidData.into()),
                SEGMENT_TERMINATOR => break true,
                b => value.push(b),
            }
        };

        Ok((Self { id, value }, last))
    }

    fn encode(&self, buffer: &mut Vec<u8>, last: bool) {
        buffer.extend(self.id);
        buffer.extend(&self.value);
        buffer.push(if last {
            SEGMENT_TERMINATOR
        } else {
            DATA_ELEMENT_SEPARATOR
        });
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id_str(), MaybeAscii(self.value.clone()))
    }
}

pub(crate) fn read_array<const N: usize>(reader: &mut impl BufRead) -> io::Result<[u8; N]> {
    let mut buffer = [0; N];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

fn decode_digit(d: u8) -> io::Result<u8> {
    if d.is_ascii_digit() {
        Ok(d - b'0')
    } else {
        Err(io::ErrorKind::InvalidData.into())
    }
}

fn decode_digits<const N: usize>(digits: [u8; N]) -> io::Result<u64> {
    digits
        .iter()
        .try_fold(0u64, |acc, &d| Ok(acc * 10 + decode_digit(d)? as u64))
}

/// Renders `value` as exactly `N` zero-padded decimal digits, or `None` if it
/// needs more.
fn encode_digits<const N: usize>(value: u64) -> Option<[u8; N]> {
    let mut digits = [b'0'; N];
    let mut rest = value;
    for d in digits.iter_mut().rev() {
        *d = b'0' + (rest % 10) as u8;
        rest /= 10;
    }

    (rest == 0).then_some(digits)
}

fn read_u8(reader: &mut impl BufRead) -> io::Result<u8> {
    let mut value = 0;
    reader.read_exact(std::slice::from_mut(&mut value))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: &[u8; 3], value: &str) -> CanonicalField {
        CanonicalField::from_text(*id, value).unwrap()
    }

    fn issuer() -> IssuerProfile {
        IssuerProfile::new("CO", "Colorado", 636020, 1).unwrap()
    }

    #[test]
    fn digits_are_fixed_width() {
        assert_eq!(encode_digits::<4>(42), Some(*b"0042"));
        assert_eq!(encode_digits::<4>(9999), Some(*b"9999"));
        assert_eq!(encode_digits::<4>(10000), None);
        assert_eq!(encode_digits::<1>(0), Some(*b"0"));
        assert_eq!(decode_digits(*b"00731").unwrap(), 731);
        assert!(decode_digits(*b"07a").is_err());
    }

    #[test]
    fn serialize_terminates_last_element_only_with_cr() {
        let subfile = Subfile::serialize(
            *b"DL",
            &[field(b"DAQ", "171625540"), field(b"DCS", "GOODING")],
        )
        .unwrap();

        assert_eq!(subfile.as_bytes(), b"DLDAQ171625540\nDCSGOODING\r");
        assert_eq!(subfile.len(), 26);
    }

    #[test]
    fn serialize_rejects_empty_subfiles() {
        assert_eq!(
            Subfile::serialize(*b"ZC", &[]),
            Err(EmptySubfile("ZC".to_owned()))
        );
    }

    #[test]
    fn canonical_field_rejects_reserved_bytes() {
        for b in [b'\n', b'\r', 0x1e] {
            assert_eq!(
                CanonicalField::new(*b"DAG", vec![b'A', b, b'B']),
                Err(EncodingError::ReservedByte(b))
            );
        }
    }

    #[test]
    fn compose_standard_header() {
        let composed = compose(
            &[SubfileExtent {
                subfile_type: *b"DL",
                length: 200,
            }],
            &issuer(),
            FormatVersion::Standard,
        )
        .unwrap();

        assert_eq!(composed.preamble, b"@\n\x1e\rANSI 636020100101");
        assert_eq!(composed.preamble.len(), FormatVersion::Standard.header_len());
        assert_eq!(composed.descriptors, vec![b"DL00310200".to_vec()]);
        assert_eq!(composed.total_length(), 31 + 200);
    }

    #[test]
    fn compose_control_field_header_declares_total() {
        let composed = compose(
            &[
                SubfileExtent {
                    subfile_type: *b"DL",
                    length: 250,
                },
                SubfileExtent {
                    subfile_type: *b"ZC",
                    length: 12,
                },
            ],
            &issuer(),
            FormatVersion::ControlField,
        )
        .unwrap();

        assert_eq!(composed.preamble, b"@\n\x1e\rANSI 6360201DL03003082");
        assert_eq!(composed.preamble.len(), FormatVersion::ControlField.header_len());
        assert_eq!(
            composed.descriptors,
            vec![b"DL00460250".to_vec(), b"ZC02960012".to_vec()]
        );
        assert_eq!(composed.header.total_length, Some(308));
    }

    #[test]
    fn compose_reports_overflow_instead_of_truncating() {
        let err = compose(
            &[SubfileExtent {
                subfile_type: *b"DL",
                length: 10_000,
            }],
            &issuer(),
            FormatVersion::Standard,
        )
        .unwrap_err();

        assert_eq!(
            err,
            CapacityError::Field {
                region: "subfile DL".to_owned(),
                field: NumericField::Length,
                value: 10_000,
                width: 4,
            }
        );
    }

    #[test]
    fn compose_checks_subfile_count() {
        let extent = SubfileExtent {
            subfile_type: *b"ZZ",
            length: 10,
        };
        assert!(matches!(
            compose(&[extent; 10], &issuer(), FormatVersion::ControlField),
            Err(CapacityError::SubfileCount { count: 10, max: 9, .. })
        ));
        assert!(matches!(
            compose(&[], &issuer(), FormatVersion::Standard),
            Err(CapacityError::SubfileCount { count: 0, .. })
        ));
    }

    #[test]
    fn header_decodes_both_layouts() {
        for format in [FormatVersion::Standard, FormatVersion::ControlField] {
            let composed = compose(
                &[SubfileExtent {
                    subfile_type: *b"ID",
                    length: 100,
                }],
                &issuer(),
                format,
            )
            .unwrap();

            let decoded = Header::decode(&mut io::Cursor::new(&composed.preamble)).unwrap();
            assert_eq!(decoded, composed.header);
        }
    }

    #[test]
    fn file_reads_back_records() {
        let subfile =
            Subfile::serialize(*b"DL", &[field(b"DAQ", "1"), field(b"DCS", "DOE")]).unwrap();
        let composed = compose(&[subfile.extent()], &issuer(), FormatVersion::Standard).unwrap();

        let mut bytes = composed.preamble.clone();
        bytes.extend(composed.descriptors.concat());
        bytes.extend(subfile.as_bytes());

        let mut cursor = io::Cursor::new(&bytes);
        let mut file = File::new(&mut cursor).unwrap();
        let record: Record = file.read_subfile(b"DL").unwrap().unwrap();

        assert_eq!(record.subfile_type, *b"DL");
        assert_eq!(record.get(b"DCS").unwrap().value(), b"DOE");
        assert!(file.read_subfile::<Record>(b"ZZ").unwrap().is_none());
    }
}
