//! Common test utilities for the equivalence-validator integration tests

use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// Re-export shared test utilities from src/test_utils.rs
// These are the core functions used by most tests
#[allow(unused_imports)]
pub use equivalence_validator::test_utils::*;

/// One worksheet for [`build_xlsx`]: its name and rows of text cells
pub type SheetSpec<'a> = (&'a str, Vec<Vec<&'a str>>);

/// Build a minimal `.xlsx` workbook in memory
///
/// Every non-empty cell is written as an inline string; empty strings leave the cell out.
/// A workbook with no sheets is valid and decodes to an empty collection.
#[allow(dead_code)]
pub fn build_xlsx(sheets: &[SheetSpec]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
"#,
    );
    let mut workbook_sheets = String::new();
    let mut workbook_rels = String::new();

    for (index, (name, _)) in sheets.iter().enumerate() {
        let number = index + 1;
        content_types.push_str(&format!(
            "  <Override PartName=\"/xl/worksheets/sheet{number}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\n"
        ));
        workbook_sheets.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{number}\" r:id=\"rId{number}\"/>",
            escape_xml(name)
        ));
        workbook_rels.push_str(&format!(
            "<Relationship Id=\"rId{number}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{number}.xml\"/>"
        ));
    }
    content_types.push_str("</Types>");

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(content_types.as_bytes()).unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
    )
    .unwrap();

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{workbook_sheets}</sheets></workbook>"#
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{workbook_rels}</Relationships>"#
        )
        .as_bytes(),
    )
    .unwrap();

    for (index, (_, rows)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)
            .unwrap();
        zip.write_all(worksheet_xml(rows).as_bytes()).unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}

/// Workbook whose single sheet has the given header row and one data row
#[allow(dead_code)]
pub fn build_single_sheet_xlsx(sheet_name: &str, headers: &[&str]) -> Vec<u8> {
    let data_row: Vec<&str> = headers.iter().map(|_| "x").collect();
    build_xlsx(&[(sheet_name, vec![headers.to_vec(), data_row])])
}

#[allow(dead_code)]
fn worksheet_xml(rows: &[Vec<&str>]) -> String {
    let mut sheet_data = String::new();
    for (row_index, row) in rows.iter().enumerate() {
        let row_number = row_index + 1;
        sheet_data.push_str(&format!("<row r=\"{row_number}\">"));
        for (col_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet_data.push_str(&format!(
                "<c r=\"{}{row_number}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                column_letter(col_index),
                escape_xml(value)
            ));
        }
        sheet_data.push_str("</row>");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_data}</sheetData></worksheet>"#
    )
}

/// 0 -> A, 25 -> Z, 26 -> AA
#[allow(dead_code)]
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[allow(dead_code)]
fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Install a test-friendly tracing subscriber once per test binary
#[allow(dead_code)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
