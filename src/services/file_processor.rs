use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::error::AppError;
use crate::services::csv::{parse_table, ColumnAnalyzer, ColumnInfo, TablePreview};

const CSV_EXTENSION: &str = ".csv";
const CSV_MIME_TYPES: [&str; 2] = ["text/csv", "application/csv"];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Everything the dashboard needs after one file has been processed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAnalysis {
    pub file_name: String,
    pub size_bytes: usize,
    pub uploaded_at: DateTime<Utc>,
    pub preview: TablePreview,
    /// Set when the preview shows fewer rows than the file holds.
    pub notice: Option<String>,
    pub columns: Vec<ColumnInfo>,
}

pub fn validate_file_type(file_name: &str, content_type: Option<&str>) -> Result<(), AppError> {
    let has_csv_extension = file_name.to_lowercase().ends_with(CSV_EXTENSION);
    let has_csv_mime = content_type
        .map(|mime| {
            let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
            CSV_MIME_TYPES.contains(&essence.as_str())
        })
        .unwrap_or(false);

    if has_csv_extension || has_csv_mime {
        Ok(())
    } else {
        tracing::warn!("Rejected file {} ({:?})", file_name, content_type);
        Err(AppError::UnsupportedFileType(format!(
            "{} is not a CSV file",
            file_name
        )))
    }
}

/// Decodes raw bytes as UTF-8, dropping a leading byte order mark.
pub fn decode_text(data: &[u8]) -> Result<&str, AppError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    std::str::from_utf8(data)
        .map_err(|e| AppError::MalformedRead(format!("File is not valid UTF-8: {}", e)))
}

pub fn process_upload(
    file_name: &str,
    content_type: Option<&str>,
    file_data: &Bytes,
    max_file_size: usize,
    preview_rows: usize,
) -> Result<UploadAnalysis, AppError> {
    let start = std::time::Instant::now();
    validate_file_type(file_name, content_type)?;

    if file_data.len() > max_file_size {
        return Err(AppError::InvalidInput(format!(
            "File {} is {}KB, the limit is {}KB",
            file_name,
            file_data.len() / 1024,
            max_file_size / 1024
        )));
    }

    let text = decode_text(file_data)?;
    let table = parse_table(text)?;
    let columns = ColumnAnalyzer.analyze(&table);

    tracing::info!(
        "Processed {}: {} rows, {} columns, headers detected: {}, took {:?}",
        file_name,
        table.total_rows,
        table.total_columns,
        table.has_headers,
        start.elapsed()
    );

    let preview = table.preview_with(preview_rows);
    Ok(UploadAnalysis {
        file_name: file_name.to_string(),
        size_bytes: file_data.len(),
        uploaded_at: Utc::now(),
        notice: preview.truncation_notice(),
        preview,
        columns,
    })
}

pub async fn load_file_from_url(url: &str) -> Result<Bytes, AppError> {
    let client = Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::MalformedRead(format!("Failed to fetch file: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::MalformedRead(
            format!("Failed to fetch file. Status: {}", response.status())
        ));
    }

    response
        .bytes()
        .await
        .map_err(|e| AppError::MalformedRead(format!("Failed to read response bytes: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024 * 1024;

    #[test]
    fn test_validate_file_type() {
        tokio_test::assert_ok!(validate_file_type("ventas.csv", None));
        tokio_test::assert_ok!(validate_file_type("VENTAS.CSV", None));
        tokio_test::assert_ok!(validate_file_type("export", Some("text/csv; charset=utf-8")));
        assert!(matches!(
            validate_file_type("ventas.xlsx", Some("application/vnd.ms-excel")),
            Err(AppError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            validate_file_type("notes.txt", None),
            Err(AppError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_decode_strips_bom() {
        let data = b"\xEF\xBB\xBFcodigo,nombre";
        assert_eq!(decode_text(data).unwrap(), "codigo,nombre");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(matches!(
            decode_text(&[0x61, 0xFF, 0xFE]),
            Err(AppError::MalformedRead(_))
        ));
    }

    #[test]
    fn test_process_upload() {
        let data = Bytes::from_static(b"codigo,mes,ventas\nOUR1000,jul-24,78\nOUR1000,ago-24,35\n");
        let analysis = process_upload("ventas.csv", Some("text/csv"), &data, LIMIT, 3).unwrap();
        assert_eq!(analysis.file_name, "ventas.csv");
        assert_eq!(analysis.size_bytes, data.len());
        assert!(analysis.preview.has_headers);
        assert_eq!(analysis.preview.total_rows, 2);
        assert_eq!(analysis.columns.len(), 3);
        assert_eq!(analysis.columns[2].data_type, "numeric");
        assert!(analysis.notice.is_none());
    }

    #[test]
    fn test_process_upload_reports_truncated_preview() {
        let data = Bytes::from_static(b"1,2\n3,4\n5,6\n7,8\n9,10\n");
        let analysis = process_upload("datos.csv", None, &data, LIMIT, 3).unwrap();
        assert!(!analysis.preview.has_headers);
        assert_eq!(analysis.preview.rows.len(), 3);
        assert_eq!(analysis.notice.as_deref(), Some("Mostrando 3 de 5 filas"));
    }

    #[test]
    fn test_process_upload_empty_file() {
        let data = Bytes::from_static(b"\n\n");
        assert!(matches!(
            process_upload("vacio.csv", None, &data, LIMIT, 3),
            Err(AppError::EmptyInput)
        ));
    }

    #[test]
    fn test_process_upload_too_large() {
        let data = Bytes::from(vec![b'a'; 2048]);
        assert!(matches!(
            process_upload("grande.csv", None, &data, 1024, 3),
            Err(AppError::InvalidInput(_))
        ));
    }
}
