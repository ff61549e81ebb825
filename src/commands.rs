use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use aamva_barcodes::{
    aamva::{
        self, AttributeSet, DataElement, Encoder, FieldVisibilityConfig, IssuerProfile,
        RecordOptions,
    },
    dump::{field_table, header_summary, hex_dump, layout_table},
    symbol::{encode_symbol, Pdf417Error, Pdf417Layout, Pdf417Writer, SymbolError},
};
use anyhow::{Context, Result};
use image::ImageFormat;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL_CONDENSED, Table};
use tracing::{info, info_span, warn};

use crate::cli::{EncodeArgs, InspectArgs};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

pub fn run_encode(args: &EncodeArgs) -> Result<()> {
    let issuer = IssuerProfile::lookup(&args.jurisdiction)?;
    let _span = info_span!("encode", jurisdiction = %issuer.jurisdiction).entered();

    let mut attrs: AttributeSet = read_json(&args.input)?;
    if attrs.region.trim().is_empty() {
        attrs.region = issuer.jurisdiction.clone();
    }
    if attrs.race.trim().is_empty() {
        attrs.race = issuer.default_race.clone();
    }

    let mut visibility: FieldVisibilityConfig = match &args.visibility {
        Some(path) => read_json(path)?,
        None => FieldVisibilityConfig::default(),
    };
    for name in &args.exclude {
        visibility.exclude(DataElement::parse(name)?)?;
    }

    let mut options = RecordOptions::default();
    if let Some(token) = &args.substitute {
        options = options.with_substitute_token(token)?;
    }

    let stream = Encoder::new(issuer.clone())
        .with_format(args.format.into())
        .with_options(options)
        .encode(&attrs, &visibility)
        .context("encode card data")?;

    let layout = Pdf417Layout::plan(stream.len(), args.columns, args.ecc_level)
        .map_err(|error| symbol_error(error.into(), args))?;
    info!(
        bytes = stream.len(),
        subfiles = stream.regions().len(),
        columns = layout.columns,
        rows = layout.rows,
        "encoded card data"
    );

    match &args.output {
        Some(path) => fs::write(path, stream.as_bytes())
            .with_context(|| format!("write {}", path.display()))?,
        None if !args.hex => io::stdout()
            .write_all(stream.as_bytes())
            .context("write stream")?,
        None => {}
    }

    if args.hex {
        print!("{}", hex_dump(stream.as_bytes()));
    }

    if let Some(path) = &args.image {
        let symbol = encode_symbol(&Pdf417Writer, stream.as_bytes(), args.columns, args.ecc_level)
            .map_err(|error| symbol_error(error, args))?;
        symbol
            .to_image(args.scale)
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("write {}", path.display()))?;
        info!(
            path = %path.display(),
            width = symbol.width(),
            height = symbol.height(),
            "rendered PDF417 symbol"
        );
    }

    Ok(())
}

fn symbol_error(error: SymbolError<Pdf417Error>, args: &EncodeArgs) -> anyhow::Error {
    let context = if error.is_capacity_exceeded() {
        format!(
            "stream does not fit {} columns at error correction level {}, use more columns or a lower level",
            args.columns, args.ecc_level
        )
    } else {
        "encode PDF417 symbol".to_owned()
    };
    anyhow::Error::new(error).context(context)
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let bytes = fs::read(&args.input).with_context(|| format!("read {}", args.input.display()))?;
    let stream = aamva::parse(&bytes).context("parse card data stream")?;

    if let Some(declared) = stream.header.total_length {
        if declared != bytes.len() as u64 {
            warn!(declared, actual = bytes.len(), "declared length does not match file size");
        }
    }

    print!("{}", header_summary(&stream.header));
    println!("{}", layout_table(&stream));
    println!("{}", field_table(&stream));

    if !args.no_hex {
        print!("{}", hex_dump(&bytes));
    }

    Ok(())
}

pub fn run_jurisdictions() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Code", "Jurisdiction", "IIN", "Version", "Race"]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS);

    for issuer in IssuerProfile::all() {
        table.add_row(vec![
            issuer.jurisdiction.clone(),
            issuer.name.clone(),
            format!("{:06}", issuer.iin),
            format!("{:02}", issuer.jurisdiction_version),
            issuer.default_race.clone(),
        ]);
    }

    println!("{table}");
    Ok(())
}
