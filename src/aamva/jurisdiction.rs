use std::io::Cursor;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Issuing authority of a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuerProfile {
    /// Two letter jurisdiction code.
    #[serde(rename = "code")]
    pub jurisdiction: String,

    pub name: String,

    /// Issuer identification number, 6 digits.
    pub iin: u32,

    /// Jurisdiction-specific version of the card layout.
    pub jurisdiction_version: u8,

    /// Race or ethnicity code (`DCL`) used when a card leaves it blank.
    #[serde(rename = "race", default)]
    pub default_race: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidIssuer {
    #[error("jurisdiction code {0:?} is not two letters")]
    Code(String),

    #[error("issuer identification number {0} has more than 6 digits")]
    Iin(u32),

    #[error("jurisdiction version {0} has more than 2 digits")]
    Version(u8),

    #[error("default race code {0:?} is not 1 to 3 letters")]
    Race(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown jurisdiction `{0}`")]
pub struct UnknownJurisdiction(pub String);

impl IssuerProfile {
    pub fn new(
        jurisdiction: &str,
        name: &str,
        iin: u32,
        jurisdiction_version: u8,
    ) -> Result<Self, InvalidIssuer> {
        let profile = Self {
            jurisdiction: jurisdiction.to_owned(),
            name: name.to_owned(),
            iin,
            jurisdiction_version,
            default_race: String::new(),
        };
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<(), InvalidIssuer> {
        if self.jurisdiction.len() != 2 || !self.jurisdiction.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(InvalidIssuer::Code(self.jurisdiction.clone()));
        }

        if self.iin > 999_999 {
            return Err(InvalidIssuer::Iin(self.iin));
        }

        if self.jurisdiction_version > 99 {
            return Err(InvalidIssuer::Version(self.jurisdiction_version));
        }

        if self.default_race.len() > 3 || !self.default_race.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(InvalidIssuer::Race(self.default_race.clone()));
        }

        Ok(())
    }

    /// Finds the issuer of a US state, district or territory.
    pub fn lookup(jurisdiction: &str) -> Result<&'static Self, UnknownJurisdiction> {
        let code = jurisdiction.trim().to_ascii_uppercase();
        ISSUERS
            .iter()
            .find(|p| p.jurisdiction == code)
            .ok_or_else(|| UnknownJurisdiction(jurisdiction.to_owned()))
    }

    pub fn all() -> &'static [Self] {
        &ISSUERS
    }
}

lazy_static! {
    static ref ISSUERS: Vec<IssuerProfile> = {
        let cursor = Cursor::new(include_str!("jurisdictions.csv"));
        let mut reader = csv::Reader::from_reader(cursor);
        reader
            .deserialize()
            .map(|result| {
                let profile: IssuerProfile = result.expect("valid jurisdiction record");
                profile.validate().expect("valid issuer profile");
                profile
            })
            .collect()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_loads() {
        assert_eq!(IssuerProfile::all().len(), 56);

        let co = IssuerProfile::lookup("co").unwrap();
        assert_eq!(co.iin, 636020);
        assert_eq!(co.jurisdiction_version, 1);
        assert_eq!(co.name, "Colorado");

        assert_eq!(co.default_race, "CLW");

        assert_eq!(IssuerProfile::lookup("WA").unwrap().jurisdiction_version, 0);
        assert_eq!(IssuerProfile::lookup("WA").unwrap().default_race, "W");
        assert_eq!(IssuerProfile::lookup("PR").unwrap().iin, 604431);
    }

    #[test]
    fn unknown_jurisdiction() {
        assert_eq!(
            IssuerProfile::lookup("QQ"),
            Err(UnknownJurisdiction("QQ".to_owned()))
        );
    }

    #[test]
    fn issuer_numbers_are_unique() {
        let all = IssuerProfile::all();
        for (i, a) in all.iter().enumerate() {
            assert!(all[i + 1..].iter().all(|b| b.iin != a.iin), "{}", a.jurisdiction);
        }
    }

    #[test]
    fn new_validates() {
        assert_eq!(
            IssuerProfile::new("CO", "Colorado", 1_000_000, 1),
            Err(InvalidIssuer::Iin(1_000_000))
        );
        assert_eq!(
            IssuerProfile::new("Colorado", "Colorado", 636020, 1),
            Err(InvalidIssuer::Code("Colorado".to_owned()))
        );
        assert_eq!(
            IssuerProfile::new("CO", "Colorado", 636020, 100),
            Err(InvalidIssuer::Version(100))
        );

        let mut profile = IssuerProfile::new("CO", "Colorado", 636020, 1).unwrap();
        profile.default_race = "clw".to_owned();
        assert_eq!(profile.validate(), Err(InvalidIssuer::Race("clw".to_owned())));
    }
}
