use std::fmt;

use chrono::NaiveDate;

use super::pdf_417::is_reserved;

/// Byte string printed as text when it is printable ASCII, as raw bytes
/// otherwise.
pub struct MaybeAscii(pub Vec<u8>);

impl fmt::Display for MaybeAscii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if self.0.iter().all(u8::is_ascii) => write!(f, "{s:?}"),
            _ => write!(f, "{:?}", self.0),
        }
    }
}

impl fmt::Debug for MaybeAscii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Character class of a data element, following the AAMVA `A`/`N`/`ANS`
/// notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharClass {
    /// `A`: letters and spaces.
    Alpha,

    /// `N`: digits.
    Numeric,

    /// `AN`: letters, digits and spaces.
    AlphaNumeric,

    /// `ANS`: any printable single-byte character.
    AlphaNumericSpecial,
}

impl CharClass {
    pub fn contains(self, c: u8) -> bool {
        match self {
            Self::Alpha => c.is_ascii_alphabetic() || c == b' ',
            Self::Numeric => c.is_ascii_digit(),
            Self::AlphaNumeric => c.is_ascii_alphanumeric() || c == b' ',
            Self::AlphaNumericSpecial => !c.is_ascii_control() && !(0x80..0xa0).contains(&c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    Fixed(usize),
    Variable(usize),
}

impl Width {
    pub fn max(self) -> usize {
        match self {
            Self::Fixed(n) | Self::Variable(n) => n,
        }
    }
}

/// Value format of a data element: a character class and a width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementFormat {
    pub class: CharClass,
    pub width: Width,
}

impl ElementFormat {
    pub const fn fixed(class: CharClass, len: usize) -> Self {
        Self {
            class,
            width: Width::Fixed(len),
        }
    }

    pub const fn variable(class: CharClass, max: usize) -> Self {
        Self {
            class,
            width: Width::Variable(max),
        }
    }

    pub fn accepts(&self, value: &[u8]) -> bool {
        let len_ok = match self.width {
            Width::Fixed(n) => value.len() == n,
            Width::Variable(n) => value.len() <= n,
        };

        len_ok && value.iter().all(|&c| self.class.contains(c))
    }
}

pub const F1A: ElementFormat = ElementFormat::fixed(CharClass::Alpha, 1);
pub const F2A: ElementFormat = ElementFormat::fixed(CharClass::Alpha, 2);
pub const F3A: ElementFormat = ElementFormat::fixed(CharClass::Alpha, 3);

pub const F1N: ElementFormat = ElementFormat::fixed(CharClass::Numeric, 1);
pub const F3N: ElementFormat = ElementFormat::fixed(CharClass::Numeric, 3);
pub const F8N: ElementFormat = ElementFormat::fixed(CharClass::Numeric, 8);

pub const F6ANS: ElementFormat = ElementFormat::fixed(CharClass::AlphaNumericSpecial, 6);

pub const V3A: ElementFormat = ElementFormat::variable(CharClass::Alpha, 3);
pub const V12A: ElementFormat = ElementFormat::variable(CharClass::Alpha, 12);

pub const V5ANS: ElementFormat = ElementFormat::variable(CharClass::AlphaNumericSpecial, 5);
pub const V6ANS: ElementFormat = ElementFormat::variable(CharClass::AlphaNumericSpecial, 6);
pub const V11ANS: ElementFormat = ElementFormat::variable(CharClass::AlphaNumericSpecial, 11);
pub const V12ANS: ElementFormat = ElementFormat::variable(CharClass::AlphaNumericSpecial, 12);
pub const V20ANS: ElementFormat = ElementFormat::variable(CharClass::AlphaNumericSpecial, 20);
pub const V25ANS: ElementFormat = ElementFormat::variable(CharClass::AlphaNumericSpecial, 25);
pub const V35ANS: ElementFormat = ElementFormat::variable(CharClass::AlphaNumericSpecial, 35);
pub const V40ANS: ElementFormat = ElementFormat::variable(CharClass::AlphaNumericSpecial, 40);

/// Normalization applied to a raw attribute before it is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueTransform {
    /// Trimmed, otherwise untouched.
    Verbatim,

    /// Trimmed and upper-cased.
    UpperCase,

    /// Compacted to `MMDDCCYY`.
    Date,

    /// ZIP codes padded to the 9 digit ZIP+4 form.
    PostalCode,

    /// Inches, rendered as `NNN IN`.
    Height,

    /// Zero-padded to the given number of digits.
    PadNumeric(usize),

    /// `M`/`F`/`X` mapped to the numeric AAMVA D20 codes.
    Sex,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("malformed date {0:?}")]
    MalformedDate(String),

    #[error("malformed value {0:?}")]
    Malformed(String),
}

impl ValueTransform {
    /// Normalizes a non-empty raw value.
    pub fn apply(self, raw: &str) -> Result<String, TransformError> {
        let value = raw.trim();
        match self {
            Self::Verbatim => Ok(value.to_owned()),
            Self::UpperCase => Ok(uppercase_latin1(value)),
            Self::Date => normalize_date(value),
            Self::PostalCode => Ok(normalize_postal_code(value)),
            Self::Height => normalize_height(value),
            Self::PadNumeric(width) => {
                if value.is_empty() || !value.bytes().all(|c| c.is_ascii_digit()) {
                    return Err(TransformError::Malformed(value.to_owned()));
                }
                Ok(format!("{value:0>width$}"))
            }
            Self::Sex => match value.to_ascii_uppercase().as_str() {
                "1" | "M" | "MALE" => Ok("1".to_owned()),
                "2" | "F" | "FEMALE" => Ok("2".to_owned()),
                "9" | "X" => Ok("9".to_owned()),
                _ => Err(TransformError::Malformed(value.to_owned())),
            },
        }
    }
}

/// Compacts a date to the 8 digit `MMDDCCYY` form.
///
/// Accepts `/`, `-`, `.` or no separator at all. A leading four digit group
/// (`CCYY-MM-DD`) is read as an ISO 8601 date and reordered.
fn normalize_date(value: &str) -> Result<String, TransformError> {
    let malformed = || TransformError::MalformedDate(value.to_owned());

    let groups: Vec<&str> = value
        .split(|c| matches!(c, '/' | '-' | '.'))
        .map(str::trim)
        .collect();

    if !groups
        .iter()
        .all(|g| !g.is_empty() && g.bytes().all(|c| c.is_ascii_digit()))
    {
        return Err(malformed());
    }

    let digits = match groups.as_slice() {
        [compact] => (*compact).to_owned(),
        [year, month, day] if year.len() == 4 => format!("{month:0>2}{day:0>2}{year}"),
        [month, day, year] if year.len() == 4 => format!("{month:0>2}{day:0>2}{year}"),
        _ => return Err(malformed()),
    };

    if digits.len() != 8 {
        return Err(malformed());
    }

    NaiveDate::parse_from_str(&digits, "%m%d%Y").map_err(|_| malformed())?;
    Ok(digits)
}

fn normalize_postal_code(value: &str) -> String {
    let compact: String = value
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect::<String>();
    let compact = uppercase_latin1(&compact);

    if compact.len() == 5 && compact.bytes().all(|c| c.is_ascii_digit()) {
        format!("{compact}0000")
    } else {
        compact
    }
}

fn normalize_height(value: &str) -> Result<String, TransformError> {
    let malformed = || TransformError::Malformed(value.to_owned());
    let upper = value.to_ascii_uppercase();

    let inches: u32 = if let Some((feet, inches)) = upper.split_once('\'') {
        let feet: u32 = feet.trim().parse().map_err(|_| malformed())?;
        let inches = inches.trim().trim_end_matches('"').trim();
        let inches: u32 = if inches.is_empty() {
            0
        } else {
            inches.parse().map_err(|_| malformed())?
        };
        feet * 12 + inches
    } else if let Some(cm) = upper.strip_suffix("CM") {
        let cm: u32 = cm.trim().parse().map_err(|_| malformed())?;
        return if cm < 1000 {
            Ok(format!("{cm:03} CM"))
        } else {
            Err(malformed())
        };
    } else {
        let digits = upper.strip_suffix("IN").unwrap_or(&upper).trim();
        digits.parse().map_err(|_| malformed())?
    };

    if inches < 1000 {
        Ok(format!("{inches:03} IN"))
    } else {
        Err(malformed())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("reserved separator byte {0:#04x}")]
    ReservedByte(u8),

    #[error("character {0:?} has no single-byte encoding")]
    NotSingleByte(char),
}

/// Encodes text using one byte per character (ISO 8859-1).
///
/// Byte length and character count of the result are always equal, and the
/// result never contains a separator byte.
pub fn encode_latin1(value: &str) -> Result<Vec<u8>, EncodingError> {
    value
        .chars()
        .map(|c| {
            let b = u8::try_from(c).map_err(|_| EncodingError::NotSingleByte(c))?;
            if is_reserved(b) {
                Err(EncodingError::ReservedByte(b))
            } else {
                Ok(b)
            }
        })
        .collect()
}

/// Upper-cases `value` without leaving the single-byte range.
///
/// Characters whose upper-case form is not a single Latin-1 character
/// (`ß`, `ÿ`, `µ`) are kept as they are.
pub fn uppercase_latin1(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) if u32::from(u) <= 0xff => u,
                _ => c,
            }
        })
        .collect()
}

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}
