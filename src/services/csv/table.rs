use super::tokenizer::tokenize;
use super::types::{ParsedTable, Row};
use super::utils::{is_numeric, synthesized_header};
use crate::error::AppError;

const UNNAMED_HEADER: &str = "Sin nombre";

/// Headers chosen for a table and the rows left over as data.
#[derive(Debug, PartialEq, Eq)]
pub struct HeaderInference {
    pub headers: Vec<String>,
    pub data_rows: Vec<Row>,
    pub has_headers: bool,
}

/// A first line counts as a header row only if every cell is non-empty
/// and none of them parses as a number.
pub fn looks_like_header(first: &[String]) -> bool {
    first
        .iter()
        .all(|cell| !cell.trim().is_empty() && !is_numeric(cell))
}

pub fn infer_headers(mut lines: Vec<Row>, max_width: usize) -> HeaderInference {
    let has_headers = lines.first().map_or(false, |first| looks_like_header(first));

    let mut headers: Vec<String> = if has_headers {
        lines
            .remove(0)
            .into_iter()
            .map(|name| {
                if name.trim().is_empty() {
                    UNNAMED_HEADER.to_string()
                } else {
                    name
                }
            })
            .collect()
    } else {
        Vec::with_capacity(max_width)
    };

    while headers.len() < max_width {
        headers.push(synthesized_header(headers.len() + 1));
    }

    HeaderInference {
        headers,
        data_rows: lines,
        has_headers,
    }
}

/// Pads every row with empty cells up to `width`. Rows are never truncated.
pub fn normalize_rows(rows: Vec<Row>, width: usize) -> Vec<Row> {
    rows.into_iter()
        .map(|mut row| {
            if row.len() < width {
                row.resize(width, String::new());
            }
            row
        })
        .collect()
}

/// Runs the full pipeline: tokenize, infer headers, make rectangular.
pub fn parse_table(input: &str) -> Result<ParsedTable, AppError> {
    let lines = tokenize(input);
    if lines.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let max_width = lines.iter().map(Vec::len).max().unwrap_or(0);
    let inference = infer_headers(lines, max_width);
    let total_columns = inference.headers.len();
    let rows = normalize_rows(inference.data_rows, total_columns);

    tracing::debug!(
        "Parsed table: {} rows x {} columns (headers detected: {})",
        rows.len(),
        total_columns,
        inference.has_headers
    );

    Ok(ParsedTable {
        headers: inference.headers,
        total_rows: rows.len(),
        total_columns,
        rows,
        has_headers: inference.has_headers,
    })
}
