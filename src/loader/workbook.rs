use calamine::{Reader, Xlsx, XlsxError};
use std::io::{Read, Seek};
use tracing::debug;

use crate::table::{SheetCollection, Table};

/// Decode every sheet of an xlsx workbook, in workbook order
pub fn decode_workbook<RS: Read + Seek>(reader: RS) -> Result<SheetCollection, XlsxError> {
    let mut workbook: Xlsx<_> = Xlsx::new(reader)?;
    let mut sheets = SheetCollection::new();

    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name)?;
        let table = Table::from_range(&range);
        debug!(
            sheet = %sheet_name,
            columns = table.headers().len(),
            rows = table.rows().len(),
            "Decoded sheet"
        );
        sheets.insert(sheet_name, table);
    }

    Ok(sheets)
}
