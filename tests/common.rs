#![allow(dead_code)]
use std::{fs, path::Path};

use aamva_barcodes::{AttributeSet, FieldVisibilityConfig, IssuerProfile};
use serde::de::DeserializeOwned;

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> T {
    let content = fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

pub fn load_attributes(path: impl AsRef<Path>) -> AttributeSet {
    load_json(path)
}

pub fn load_visibility(path: impl AsRef<Path>) -> FieldVisibilityConfig {
    load_json(path)
}

pub fn colorado() -> &'static IssuerProfile {
    IssuerProfile::lookup("CO").unwrap()
}

/// Primary subfile of `tests/aamva/attributes.json`.
pub const PRIMARY_SUBFILE: &[u8] = b"DL\
DAQ171625540\nDCSGOODING\nDDEN\nDACLACEY\nDDFN\nDADLYNN\nDDGN\nDCAC\nDCBNONE\nDCDNONE\n\
DBD04202021\nDBB09231990\nDBA09232026\nDBC2\nDAU069 IN\nDAYBLU\nDAZBRO\nDAW140\nDCLNONE\n\
DAG8444 KALAMATH ST\nDAIFEDERAL HEIGHTS\nDAJCO\nDAK802600000\nDCF6358522\nDCGUSA\n\
DDB10302015\nDDAF\r";
