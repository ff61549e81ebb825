use std::io;

use tracing::error;

use super::dlid::{
    pdf_417::{
        subfile_type_str, ComposedHeader, DecodeSubfile, File, Header, Record, SubfileDesignator,
    },
    FormatVersion, Subfile,
};

/// Position of a subfile in an encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubfileRegion {
    pub subfile_type: [u8; 2],
    pub offset: usize,
    pub length: usize,
}

impl SubfileRegion {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Encoded card data stream, ready to be handed to a PDF417 encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedStream {
    bytes: Vec<u8>,
    header: Header,
    regions: Vec<SubfileRegion>,
}

impl EncodedStream {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn format(&self) -> FormatVersion {
        self.header.format
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn regions(&self) -> &[SubfileRegion] {
        &self.regions
    }

    /// Bytes of the `i`-th subfile, type tag and terminator included.
    pub fn subfile_bytes(&self, i: usize) -> Option<&[u8]> {
        self.regions
            .get(i)
            .map(|r| &self.bytes[r.offset..r.end()])
    }

    pub fn parse(&self) -> io::Result<ParsedStream> {
        parse(&self.bytes)
    }
}

impl AsRef<[u8]> for EncodedStream {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("assembled header does not parse: {0}")]
    UnreadableHeader(String),

    #[error("declared total length is {declared} but the stream is {actual} bytes")]
    TotalLength { declared: u64, actual: usize },

    #[error("header declares {declared} entries but {actual} subfiles were assembled")]
    EntryCount { declared: u8, actual: usize },

    #[error("header declares document type {declared} but the first subfile is {actual}")]
    DocumentType { declared: String, actual: String },

    #[error("designator {index} declares subfile {declared} but {actual} was assembled")]
    SubfileType {
        index: usize,
        declared: String,
        actual: String,
    },

    #[error("subfile {subfile}: declared offset {declared}, actual offset {actual}")]
    Offset {
        subfile: String,
        declared: u64,
        actual: usize,
    },

    #[error("subfile {subfile}: declared length {declared}, actual length {actual}")]
    Length {
        subfile: String,
        declared: u64,
        actual: usize,
    },

    #[error("subfile {subfile}: region is not a single terminated segment")]
    Region { subfile: String },

    #[error("{0} bytes follow the last subfile")]
    Trailing(usize),
}

/// Concatenates the composed header and the serialized subfiles, then checks
/// every declared value against the assembled bytes.
pub fn assemble(
    header: &ComposedHeader,
    subfiles: &[Subfile],
) -> Result<EncodedStream, InvariantViolation> {
    let capacity = header.preamble.len()
        + header.descriptors.iter().map(Vec::len).sum::<usize>()
        + subfiles.iter().map(Subfile::len).sum::<usize>();

    let mut bytes = Vec::with_capacity(capacity);
    bytes.extend(&header.preamble);
    for descriptor in &header.descriptors {
        bytes.extend(descriptor);
    }

    let mut regions = Vec::with_capacity(subfiles.len());
    for subfile in subfiles {
        regions.push(SubfileRegion {
            subfile_type: subfile.subfile_type(),
            offset: bytes.len(),
            length: subfile.len(),
        });
        bytes.extend(subfile.as_bytes());
    }

    let header = check(&bytes, &regions).map_err(|violation| {
        error!(%violation, "stream self-check failed");
        violation
    })?;

    Ok(EncodedStream {
        bytes,
        header,
        regions,
    })
}

/// Reads the header back from `bytes` and compares it with the actual
/// layout of the subfiles.
fn check(bytes: &[u8], regions: &[SubfileRegion]) -> Result<Header, InvariantViolation> {
    let mut cursor = io::Cursor::new(bytes);
    let file =
        File::new(&mut cursor).map_err(|e| InvariantViolation::UnreadableHeader(e.to_string()))?;
    let header = file.header();

    if usize::from(header.entry_count) != regions.len() {
        return Err(InvariantViolation::EntryCount {
            declared: header.entry_count,
            actual: regions.len(),
        });
    }

    if let (Some(declared), Some(first)) = (header.document_type, regions.first()) {
        if declared != first.subfile_type {
            return Err(InvariantViolation::DocumentType {
                declared: subfile_type_str(&declared),
                actual: subfile_type_str(&first.subfile_type),
            });
        }
    }

    if let Some(declared) = header.total_length {
        if declared != bytes.len() as u64 {
            return Err(InvariantViolation::TotalLength {
                declared,
                actual: bytes.len(),
            });
        }
    }

    for (index, (designator, region)) in file.designators().iter().zip(regions).enumerate() {
        check_region(bytes, index, designator, region)?;
    }

    let end = regions
        .last()
        .map(SubfileRegion::end)
        .unwrap_or(bytes.len());
    if end != bytes.len() {
        return Err(InvariantViolation::Trailing(bytes.len() - end));
    }

    Ok(header)
}

fn check_region(
    bytes: &[u8],
    index: usize,
    designator: &SubfileDesignator,
    region: &SubfileRegion,
) -> Result<(), InvariantViolation> {
    let subfile = subfile_type_str(&region.subfile_type);

    if designator.subfile_type != region.subfile_type {
        return Err(InvariantViolation::SubfileType {
            index,
            declared: subfile_type_str(&designator.subfile_type),
            actual: subfile,
        });
    }

    if designator.offset != region.offset as u64 {
        return Err(InvariantViolation::Offset {
            subfile,
            declared: designator.offset,
            actual: region.offset,
        });
    }

    if designator.length != region.length as u64 {
        return Err(InvariantViolation::Length {
            subfile,
            declared: designator.length,
            actual: region.length,
        });
    }

    let data = bytes
        .get(region.offset..region.end())
        .ok_or_else(|| InvariantViolation::Region {
            subfile: subfile.clone(),
        })?;
    let segment = Vec::<u8>::decode_subfile_from_bytes(data)
        .map_err(|_| InvariantViolation::Region {
            subfile: subfile.clone(),
        })?;
    if !data.starts_with(&region.subfile_type) || segment.len() != data.len() {
        return Err(InvariantViolation::Region { subfile });
    }

    Ok(())
}

/// Stream read back element by element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStream {
    pub header: Header,
    pub designators: Vec<SubfileDesignator>,
    pub records: Vec<Record>,
}

impl ParsedStream {
    pub fn record(&self, subfile_type: &[u8; 2]) -> Option<&Record> {
        self.records.iter().find(|r| r.subfile_type == *subfile_type)
    }
}

/// Parses an encoded stream into its header, designators and records.
pub fn parse(bytes: &[u8]) -> io::Result<ParsedStream> {
    let mut cursor = io::Cursor::new(bytes);
    let mut file = File::new(&mut cursor)?;
    let header = file.header();
    let designators = file.designators().to_vec();
    let records = file.read_records()?;

    Ok(ParsedStream {
        header,
        designators,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aamva::{
        dlid::pdf_417::{compose, SubfileExtent},
        CanonicalField, IssuerProfile,
    };

    fn subfile(tag: &[u8; 2], values: &[(&[u8; 3], &str)]) -> Subfile {
        let fields: Vec<_> = values
            .iter()
            .map(|(id, v)| CanonicalField::from_text(**id, v).unwrap())
            .collect();
        Subfile::serialize(*tag, &fields).unwrap()
    }

    fn issuer() -> IssuerProfile {
        IssuerProfile::new("CO", "Colorado", 636020, 1).unwrap()
    }

    #[test]
    fn assembled_regions_match_designators() {
        let subfiles = [
            subfile(b"DL", &[(b"DAQ", "171625540"), (b"DCS", "GOODING")]),
            subfile(b"ZC", &[(b"ZCA", "X")]),
        ];
        let extents: Vec<_> = subfiles.iter().map(Subfile::extent).collect();

        for format in [FormatVersion::Standard, FormatVersion::ControlField] {
            let header = compose(&extents, &issuer(), format).unwrap();
            let stream = assemble(&header, &subfiles).unwrap();

            assert_eq!(stream.len() as u64, header.total_length());
            assert_eq!(stream.regions()[0].offset, format.data_offset(2));
            assert_eq!(stream.regions()[1].offset, stream.regions()[0].end());
            assert_eq!(stream.subfile_bytes(1), Some(&b"ZCZCAX\r"[..]));
        }
    }

    #[test]
    fn self_check_catches_hand_computed_lengths() {
        let subfiles = [subfile(b"DL", &[(b"DAQ", "1"), (b"DCS", "DOE")])];

        // Length predicted without the type tag.
        let predicted = [SubfileExtent {
            subfile_type: *b"DL",
            length: subfiles[0].len() - 2,
        }];
        let header = compose(&predicted, &issuer(), FormatVersion::Standard).unwrap();

        assert!(matches!(
            assemble(&header, &subfiles),
            Err(InvariantViolation::Length { .. })
        ));
    }

    #[test]
    fn self_check_catches_wrong_total() {
        let subfiles = [subfile(b"DL", &[(b"DAQ", "1")])];
        let mut header = compose(
            &[subfiles[0].extent()],
            &issuer(),
            FormatVersion::ControlField,
        )
        .unwrap();

        header.header.total_length = Some(header.total_length() + 1);
        header.preamble.clear();
        header.header.encode(&mut header.preamble).unwrap();

        assert!(matches!(
            assemble(&header, &subfiles),
            Err(InvariantViolation::TotalLength { .. })
        ));
    }

    #[test]
    fn self_check_catches_wrong_document_type() {
        let subfiles = [subfile(b"DL", &[(b"DAQ", "1")])];
        let mut header = compose(
            &[subfiles[0].extent()],
            &issuer(),
            FormatVersion::ControlField,
        )
        .unwrap();

        header.header.document_type = Some(*b"ID");
        header.preamble.clear();
        header.header.encode(&mut header.preamble).unwrap();

        assert_eq!(
            assemble(&header, &subfiles),
            Err(InvariantViolation::DocumentType {
                declared: "ID".to_owned(),
                actual: "DL".to_owned(),
            })
        );
    }

    #[test]
    fn self_check_catches_missing_subfiles() {
        let subfiles = [
            subfile(b"DL", &[(b"DAQ", "1")]),
            subfile(b"ZC", &[(b"ZCA", "1")]),
        ];
        let header = compose(&[subfiles[0].extent()], &issuer(), FormatVersion::Standard).unwrap();

        assert!(matches!(
            assemble(&header, &subfiles),
            Err(InvariantViolation::EntryCount {
                declared: 1,
                actual: 2
            })
        ));
    }
}
