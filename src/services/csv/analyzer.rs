use super::types::{ColumnInfo, ParsedTable, SAMPLE_SIZE};
use super::utils::{is_boolean, is_date_string, is_numeric};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::collections::HashSet;

const TYPE_DETECTION_ROWS: usize = 100;
const TYPE_THRESHOLD: f64 = 0.8;

/// Per-column profile of a parsed table.
pub struct ColumnAnalyzer;

impl ColumnAnalyzer {
    pub fn analyze(&self, table: &ParsedTable) -> Vec<ColumnInfo> {
        let start = std::time::Instant::now();

        let columns: Vec<ColumnInfo> = table
            .headers
            .par_iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<&str> = table.column(idx).collect();
                self.analyze_column(&values, name)
            })
            .collect();

        tracing::debug!(
            "Analyzed {} columns over {} rows in {:?}",
            columns.len(),
            table.total_rows,
            start.elapsed()
        );
        columns
    }

    fn analyze_column(&self, values: &[&str], name: &str) -> ColumnInfo {
        let mut null_count = 0;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut min_max: (Option<String>, Option<String>) = (None, None);

        for value in values {
            if value.is_empty() {
                null_count += 1;
            } else {
                seen.insert(*value);
                update_min_max(&mut min_max, value);
            }
        }

        let sample_values: SmallVec<[String; SAMPLE_SIZE]> = values
            .iter()
            .take(SAMPLE_SIZE)
            .map(|v| v.to_string())
            .collect();

        ColumnInfo {
            name: name.to_string(),
            data_type: self.detect_column_type(values).to_string(),
            sample_values,
            null_count,
            unique_count: seen.len(),
            min_value: min_max.0,
            max_value: min_max.1,
            has_duplicates: seen.len() < values.len() - null_count,
        }
    }

    fn detect_column_type(&self, values: &[&str]) -> &'static str {
        let (numeric_count, date_count, bool_count, total) = values
            .iter()
            .take(TYPE_DETECTION_ROWS)
            .filter(|v| !v.is_empty())
            .fold((0, 0, 0, 0), |(num, date, boolean, total), value| {
                (
                    num + is_numeric(value) as usize,
                    date + is_date_string(value) as usize,
                    boolean + is_boolean(value) as usize,
                    total + 1,
                )
            });

        if total == 0 {
            return "empty";
        }

        let threshold = total as f64 * TYPE_THRESHOLD;
        match () {
            _ if numeric_count as f64 >= threshold => "numeric",
            _ if date_count as f64 >= threshold => "date",
            _ if bool_count as f64 >= threshold => "boolean",
            _ => "string",
        }
    }
}

fn update_min_max(min_max: &mut (Option<String>, Option<String>), value: &str) {
    match &min_max.0 {
        Some(min_val) if value < min_val.as_str() => min_max.0 = Some(value.to_string()),
        None => min_max.0 = Some(value.to_string()),
        _ => {}
    }

    match &min_max.1 {
        Some(max_val) if value > max_val.as_str() => min_max.1 = Some(value.to_string()),
        None => min_max.1 = Some(value.to_string()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::csv::parse_table;

    #[test]
    fn test_column_profiles() {
        let table = parse_table(
            "codigo,fecha,ventas,activo\nA1,2024-01-01,10,si\nA2,2024-02-01,,no\nA1,2024-03-01,7,si",
        )
        .unwrap();
        let columns = ColumnAnalyzer.analyze(&table);

        assert_eq!(columns.len(), 4);

        let codigo = &columns[0];
        assert_eq!(codigo.name, "codigo");
        assert_eq!(codigo.data_type, "string");
        assert_eq!(codigo.unique_count, 2);
        assert!(codigo.has_duplicates);
        assert_eq!(codigo.min_value.as_deref(), Some("A1"));
        assert_eq!(codigo.max_value.as_deref(), Some("A2"));

        assert_eq!(columns[1].data_type, "date");

        let ventas = &columns[2];
        assert_eq!(ventas.data_type, "numeric");
        assert_eq!(ventas.null_count, 1);
        assert_eq!(ventas.sample_values.as_slice(), &["10", "", "7"]);
        assert!(!ventas.has_duplicates);

        assert_eq!(columns[3].data_type, "boolean");
    }

    #[test]
    fn test_all_empty_column() {
        let table = parse_table("a,b\n1\n2").unwrap();
        let columns = ColumnAnalyzer.analyze(&table);
        assert_eq!(columns[1].data_type, "empty");
        assert_eq!(columns[1].null_count, 2);
        assert!(columns[1].min_value.is_none());
    }
}
