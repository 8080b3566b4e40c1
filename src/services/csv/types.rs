use serde::Serialize;
use smallvec::SmallVec;

pub const SAMPLE_SIZE: usize = 3;
pub const PREVIEW_ROWS: usize = 3;

/// One logical record: the cells of a line, possibly spanning several physical lines.
pub type Row = Vec<String>;

/// Rectangular table built from a single upload.
///
/// Every row in `rows` holds exactly `total_columns` cells, and `headers`
/// has the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub total_rows: usize,
    pub total_columns: usize,
    pub has_headers: bool,
}

impl ParsedTable {
    /// First `limit` rows, leaving the table itself untouched.
    pub fn preview_with(&self, limit: usize) -> TablePreview {
        TablePreview {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
            total_rows: self.total_rows,
            total_columns: self.total_columns,
            has_headers: self.has_headers,
        }
    }

    /// Cells of a single column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map(String::as_str).unwrap_or(""))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub total_rows: usize,
    pub total_columns: usize,
    pub has_headers: bool,
}

impl TablePreview {
    /// "Mostrando K de N filas" line, shown only when rows were cut off.
    pub fn truncation_notice(&self) -> Option<String> {
        (self.total_rows > self.rows.len())
            .then(|| format!("Mostrando {} de {} filas", self.rows.len(), self.total_rows))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub sample_values: SmallVec<[String; SAMPLE_SIZE]>,
    pub null_count: usize,
    pub unique_count: usize,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub has_duplicates: bool,
}
