use calamine::{Data, ExcelDateTime, Range};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Type alias for a parsed sheet row: 1-based row number in the sheet and its cells by column name
pub type ParsedRow = (usize, Map<String, Value>);

/// One decoded sheet: its header row and the non-empty data rows beneath it.
///
/// Tables are produced by a loader and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<ParsedRow>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<ParsedRow>) -> Self {
        Table { headers, rows }
    }

    /// Build a table that only has a header row
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Decode a calamine range, using its first row as the header row
    ///
    /// Blank header cells become `Unnamed: {index}` and repeated names get a `.1`, `.2`, ...
    /// suffix so the column set never loses a column. Data rows made only of blank cells
    /// are skipped.
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut range_rows = range.rows();
        let Some(header_row) = range_rows.next() else {
            return Table::default();
        };

        let raw_headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(index, cell)| header_name(index, cell))
            .collect();
        let headers = dedupe_headers(raw_headers);

        // Row numbers reported to users are 1-based and absolute within the sheet
        let header_row_number = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        let mut rows: Vec<ParsedRow> = Vec::new();
        for (offset, row) in range_rows.enumerate() {
            if row.iter().all(is_blank_cell) {
                continue;
            }

            let mut json_obj = Map::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                json_obj.insert(header.clone(), cell_to_json(cell));
            }

            rows.push((header_row_number + offset + 1, json_obj));
        }

        Table { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[ParsedRow] {
        &self.rows
    }

    /// The set of column names exposed by the header row
    pub fn columns(&self) -> HashSet<&str> {
        self.headers.iter().map(String::as_str).collect()
    }
}

/// All sheets of a workbook, in workbook order.
///
/// Names are unique: inserting an existing name replaces that sheet in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetCollection {
    sheets: Vec<(String, Table)>,
}

impl SheetCollection {
    pub fn new() -> Self {
        SheetCollection::default()
    }

    /// Add a sheet, returning the table it replaced if the name was already present
    pub fn insert(&mut self, name: impl Into<String>, table: Table) -> Option<Table> {
        let name = name.into();
        match self.sheets.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, table)),
            None => {
                self.sheets.push((name, table));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, table)| table)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(name, table)| (name.as_str(), table))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Table)> for SheetCollection {
    fn from_iter<T: IntoIterator<Item = (S, Table)>>(iter: T) -> Self {
        let mut collection = SheetCollection::new();
        for (name, table) in iter {
            collection.insert(name, table);
        }
        collection
    }
}

/// Convert a calamine cell to JSON
pub fn cell_to_json(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Float(f) => float_to_json(*f),
        Data::Int(i) => json!(*i),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => excel_datetime_to_chrono(dt)
            .map(|datetime| Value::String(datetime.to_string()))
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}

fn float_to_json(f: f64) -> Value {
    // Handle special float values
    if f.is_nan() || f.is_infinite() {
        return Value::Null;
    }

    // Integral floats are what Excel stores for whole numbers
    if (f.fract().abs() < f64::EPSILON) && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        json!(f as i64)
    } else {
        json!(f)
    }
}

fn excel_datetime_to_chrono(dt: &ExcelDateTime) -> Option<NaiveDateTime> {
    let excel_base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let value = dt.as_f64();
    let days = value.trunc() as i64;
    let seconds = ((value - days as f64) * 86400.0).round() as i64;
    excel_base
        .checked_add_signed(TimeDelta::try_days(days)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

fn is_blank_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        Data::Error(_) => true,
        _ => false,
    }
}

fn header_name(index: usize, cell: &Data) -> String {
    match cell_to_json(cell) {
        Value::Null => format!("Unnamed: {index}"),
        Value::String(s) if s.is_empty() => format!("Unnamed: {index}"),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn dedupe_headers(raw_headers: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::with_capacity(raw_headers.len());

    for (index, header) in raw_headers.into_iter().enumerate() {
        if taken.insert(header.clone()) {
            headers.push(header);
            continue;
        }

        let counter = suffixes.entry(header.clone()).or_insert(0);
        let renamed = loop {
            *counter += 1;
            let candidate = format!("{header}.{counter}");
            if !taken.contains(&candidate) {
                break candidate;
            }
        };

        debug!(
            header = %header,
            column = index + 1,
            renamed = %renamed,
            "Duplicate column header renamed"
        );
        taken.insert(renamed.clone());
        headers.push(renamed);
    }

    headers
}
