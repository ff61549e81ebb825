//! Diagnostic views of an encoded stream.
//!
//! Both views are read-only: the hex dump shows every byte of the stream, the
//! field table every element of every subfile.
use std::fmt::Write;

use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL_CONDENSED, Cell, CellAlignment,
    ContentArrangement, Table,
};

use crate::aamva::{
    dlid::pdf_417::{subfile_type_str, Header},
    DataElement, ParsedStream,
};

/// Bytes shown per hex dump row.
pub const BYTES_PER_ROW: usize = 16;

/// Hex dump with an offset column and a printable ASCII column.
///
/// ```text
/// 00000000  40 0A 1E 0D 41 4E 53 49 20 36 33 36 30 32 30 31  |@...ANSI 6360201|
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();

    for (row, chunk) in bytes.chunks(BYTES_PER_ROW).enumerate() {
        let hex = hex::encode_upper(chunk);
        let pairs: Vec<&str> = (0..chunk.len()).map(|i| &hex[2 * i..2 * i + 2]).collect();
        let ascii: String = chunk.iter().map(|&b| printable(b)).collect();

        // Writing to a `String` cannot fail.
        let _ = writeln!(
            out,
            "{:08X}  {:<width$}  |{ascii}|",
            row * BYTES_PER_ROW,
            pairs.join(" "),
            width = BYTES_PER_ROW * 3 - 1,
        );
    }

    out
}

fn printable(b: u8) -> char {
    if b.is_ascii_graphic() || b == b' ' {
        b as char
    } else {
        '.'
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

/// Header fields and subfile designators.
pub fn layout_table(stream: &ParsedStream) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Subfile", "Offset", "Length"]);
    apply_table_style(&mut table);

    for designator in &stream.designators {
        table.add_row(vec![
            Cell::new(subfile_type_str(&designator.subfile_type)),
            Cell::new(designator.offset).set_alignment(CellAlignment::Right),
            Cell::new(designator.length).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

pub fn header_summary(header: &Header) -> String {
    let mut out = format!(
        "Format: {}\nIssuer: {:06}\nAAMVA version: {:02}\nJurisdiction version: {:02}\nEntries: {}\n",
        header.format,
        header.issuer_id,
        header.aamva_version,
        header.jurisdiction_version,
        header.entry_count,
    );

    if let Some(total) = header.total_length {
        let _ = writeln!(out, "Declared length: {total}");
    }

    out
}

/// One row per element, in stream order.
pub fn field_table(stream: &ParsedStream) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Subfile", "ID", "Element", "Value"]);
    apply_table_style(&mut table);

    for record in &stream.records {
        let subfile = subfile_type_str(&record.subfile_type);
        for field in &record.entries {
            let label = match DataElement::from_id(field.id()) {
                Some(element) => element.info().label,
                None => "Jurisdiction-specific",
            };

            table.add_row(vec![
                subfile.clone(),
                field.id_str(),
                label.to_owned(),
                field.value_text(),
            ]);
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump_rows() {
        let bytes = b"@\n\x1e\rANSI 636020100101DL00310200";
        let dump = hex_dump(bytes);
        let lines: Vec<_> = dump.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "00000000  40 0A 1E 0D 41 4E 53 49 20 36 33 36 30 32 30 31  |@...ANSI 6360201|"
        );
        assert!(lines[1].starts_with("00000010  30 30 31 30 31 44 4C"));
        assert!(lines[1].ends_with("|00101DL00310200|"));
    }

    #[test]
    fn hex_dump_is_lossless() {
        let bytes: Vec<u8> = (0..=255).collect();
        let hex: String = hex_dump(&bytes)
            .lines()
            .map(|line| line[10..10 + BYTES_PER_ROW * 3 - 1].replace(' ', ""))
            .collect();

        assert_eq!(hex::decode(hex).unwrap(), bytes);
    }

    #[test]
    fn hex_dump_pads_last_row() {
        let dump = hex_dump(b"DL\r");
        assert_eq!(
            dump,
            format!("00000000  44 4C 0D{}  |DL.|\n", " ".repeat(39))
        );
    }
}
