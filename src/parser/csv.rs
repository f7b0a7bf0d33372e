use crate::common::error::CsvParseError;
use crate::domain::NormalizedRecord;
use crate::observability::metrics;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;

/// Parse Movebank's CSV dialect into ordered records keyed by header name.
///
/// Values are kept as strings. An empty payload or a header without body rows
/// yields an empty Vec. Rows whose column count differs from the header, and
/// unterminated quotes, are rejected with the 1-based body-row index. A header
/// that repeats a column name is rejected as row 0, since records are keyed by
/// name and the second column would be lost.
pub fn normalize(text: &str) -> Result<Vec<NormalizedRecord>, CsvParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(false)
        .trim(Trim::None)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| parse_error(0, &e))?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let mut seen = HashSet::new();
    if let Some(name) = headers.iter().find(|name| !seen.insert(*name)) {
        metrics::parser::parse_error();
        return Err(CsvParseError {
            row: 0,
            message: format!("duplicate column '{name}'"),
        });
    }

    let bytes = text.as_bytes();
    let mut records = Vec::new();
    let mut row = StringRecord::new();
    let mut last_span = None;
    loop {
        let index = records.len() + 1;
        let start = reader.position().byte() as usize;
        match reader.read_record(&mut row) {
            Ok(true) => {
                let end = (reader.position().byte() as usize).min(bytes.len());
                last_span = Some((index, start, end));
                records.push(to_record(&headers, &row));
            }
            Ok(false) => break,
            Err(e) => {
                metrics::parser::parse_error();
                return Err(parse_error(index, &e));
            }
        }
    }

    // An opening quote that is never closed swallows the rest of the input into
    // the last record, so only that record can still be inside a quoted field.
    if let Some((index, start, end)) = last_span {
        if ends_inside_quoted_field(&bytes[start.min(end)..end]) {
            metrics::parser::parse_error();
            return Err(CsvParseError {
                row: index,
                message: "unterminated quoted field".to_string(),
            });
        }
    }

    metrics::parser::records_normalized(records.len());
    Ok(records)
}

/// Walk one raw record and report whether a quote that opened a field is
/// still unclosed at the end. Quotes inside unquoted fields are literal.
fn ends_inside_quoted_field(raw: &[u8]) -> bool {
    let mut quoted = false;
    let mut field_start = true;
    let mut iter = raw.iter().peekable();
    while let Some(&b) = iter.next() {
        if quoted {
            if b == b'"' {
                if iter.peek() == Some(&&b'"') {
                    iter.next();
                } else {
                    quoted = false;
                }
            }
            continue;
        }
        match b {
            b'"' if field_start => {
                quoted = true;
                field_start = false;
            }
            b',' | b'\n' | b'\r' => field_start = true,
            _ => field_start = false,
        }
    }
    quoted
}

fn to_record(headers: &StringRecord, row: &StringRecord) -> NormalizedRecord {
    headers
        .iter()
        .zip(row.iter())
        .map(|(h, v)| (h.to_string(), v.to_string()))
        .collect()
}

fn parse_error(row: usize, err: &csv::Error) -> CsvParseError {
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
            format!("expected {expected_len} columns, found {len}")
        }
        _ => err.to_string(),
    };
    CsvParseError { row, message }
}
